use ldp_local_hashing::{DomainIndex, LocalHashingClient, ParameterUpdate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let domain = DomainIndex::new(["red", "green", "blue", "amber", "violet"].map(String::from));
    let client = LocalHashingClient::<str>::optimized(1.0, domain.len(), domain)?;
    let params = client.parameters();
    println!(
        "OLH epsilon={} g={} p={:.4} q={:.4}",
        params.epsilon(),
        params.hash_range(),
        params.p(),
        params.q()
    );

    for item in ["green", "blue", "green"] {
        let report = client.privatize(item)?;
        println!(
            "seed={:>10} encoded={} perturbed={}",
            report.seed, report.encoded, report.perturbed
        );
    }

    let params =
        client.update_parameters(ParameterUpdate::new().optimized(false).hash_range(2))?;
    println!(
        "BLH epsilon={} g={} p={:.4} q={:.4}",
        params.epsilon(),
        params.hash_range(),
        params.p(),
        params.q()
    );
    Ok(())
}
