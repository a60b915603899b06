//! Resolution of domain items to indexes in `[0, d)`.
//!
//! The client never inspects domain values directly; it only asks an
//! [`IndexMapper`] for the index of an item. [`DomainIndex`] is the default
//! ordered-list lookup, [`LookupIndex`] trades memory for constant-time
//! lookups, and any `Fn(&T) -> Option<usize>` closure can be injected as well.

use std::{borrow::Borrow, collections::HashMap, hash::Hash};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("item is not part of the {domain_size}-value domain")]
    Unmapped { domain_size: usize },
}

/// Capability that maps an item to its domain index.
///
/// Implementations should be injective over the domain; the client assumes it
/// but does not check it.
pub trait IndexMapper<T: ?Sized>: Send + Sync {
    /// Index of `item`, or `None` when the item lies outside the domain.
    fn map_index(&self, item: &T) -> Option<usize>;
}

impl<T, F> IndexMapper<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> Option<usize> + Send + Sync,
{
    fn map_index(&self, item: &T) -> Option<usize> {
        self(item)
    }
}

/// Ordered domain; an item's index is its position in the list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainIndex<V> {
    values: Vec<V>,
}

impl<V> DomainIndex<V> {
    pub fn new(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Domain value stored at `index`.
    pub fn get(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }
}

impl<V> FromIterator<V> for DomainIndex<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<V, T> IndexMapper<T> for DomainIndex<V>
where
    V: Borrow<T> + Send + Sync,
    T: PartialEq + ?Sized,
{
    fn map_index(&self, item: &T) -> Option<usize> {
        self.values.iter().position(|value| value.borrow() == item)
    }
}

/// Hash-map backed domain built from an ordered list of values.
///
/// Duplicate values keep the index of their first occurrence, which matches
/// [`DomainIndex`].
#[derive(Clone, Debug)]
pub struct LookupIndex<V> {
    positions: HashMap<V, usize>,
}

impl<V: Hash + Eq> LookupIndex<V> {
    pub fn new(values: impl IntoIterator<Item = V>) -> Self {
        let mut positions = HashMap::new();
        for (index, value) in values.into_iter().enumerate() {
            positions.entry(value).or_insert(index);
        }
        Self { positions }
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl<V, T> IndexMapper<T> for LookupIndex<V>
where
    V: Borrow<T> + Hash + Eq + Send + Sync,
    T: Hash + Eq + ?Sized,
{
    fn map_index(&self, item: &T) -> Option<usize> {
        self.positions.get(item).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> Vec<String> {
        ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn domain_index_uses_list_position() {
        let domain = DomainIndex::new(letters());
        assert_eq!(IndexMapper::<str>::map_index(&domain, "a"), Some(0));
        assert_eq!(IndexMapper::<str>::map_index(&domain, "b"), Some(1));
        assert_eq!(IndexMapper::<str>::map_index(&domain, "z"), None);
        assert_eq!(domain.get(3).map(String::as_str), Some("d"));
    }

    #[test]
    fn lookup_index_agrees_with_domain_index() {
        let list = DomainIndex::new(letters());
        let lookup = LookupIndex::new(letters());
        for item in ["a", "b", "c", "d", "z"] {
            assert_eq!(
                IndexMapper::<str>::map_index(&lookup, item),
                IndexMapper::<str>::map_index(&list, item)
            );
        }
    }

    #[test]
    fn lookup_index_keeps_first_duplicate() {
        let lookup = LookupIndex::new(vec![7u32, 9, 7]);
        assert!(!lookup.is_empty());
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.map_index(&7u32), Some(0));
    }

    #[test]
    fn empty_lookup_maps_nothing() {
        let lookup = LookupIndex::<String>::new(Vec::new());
        assert!(lookup.is_empty());
        assert_eq!(IndexMapper::<str>::map_index(&lookup, "a"), None);
    }

    #[test]
    fn closures_are_mappers() {
        let mapper = |item: &u32| (*item < 10).then_some(*item as usize);
        assert_eq!(mapper.map_index(&3u32), Some(3));
        assert_eq!(mapper.map_index(&12u32), None);
    }

    #[test]
    fn domain_index_round_trips_as_plain_list() {
        let domain: DomainIndex<String> = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(domain.len(), 2);
        assert_eq!(IndexMapper::<str>::map_index(&domain, "y"), Some(1));
    }
}
