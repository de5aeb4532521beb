use crate::output::print_json;
use anyhow::Context;
use faultline_core::extract::infer_services;
use faultline_core::scenario::Scenario;
use std::path::Path;

pub fn run(file: &Path, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let scenario = Scenario::from_json(&data)
        .with_context(|| format!("invalid scenario document {}", file.display()))?;

    let services = infer_services(&scenario);
    let tags: Vec<&str> = services.iter().map(|t| t.as_str()).collect();

    if json {
        print_json(&serde_json::json!({
            "scenario": scenario.name,
            "services": tags,
        }))?;
    } else if tags.is_empty() {
        println!("No services inferred for '{}'", scenario.name);
    } else {
        println!("Services inferred for '{}':", scenario.name);
        for tag in tags {
            println!("  {tag}");
        }
    }

    Ok(())
}
