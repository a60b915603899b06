//! Library surface for the `ldp-lh` binary.
//!
//! The binary keeps argument parsing and output in `main.rs`; config loading
//! and the batch loop live here so tests and other tools can drive a batch
//! without spawning a process.

pub mod config;
pub mod service;
