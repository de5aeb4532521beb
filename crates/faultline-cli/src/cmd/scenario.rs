use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use faultline_core::scenario::Scenario;
use faultline_core::store::{ArtifactStore, FsStore};
use std::path::Path;

#[derive(Subcommand)]
pub enum ScenarioSubcommand {
    /// List stored scenarios
    List,
    /// Show one scenario document
    Show { id: String },
}

pub fn run(root: &Path, subcommand: ScenarioSubcommand, json: bool) -> anyhow::Result<()> {
    let store = FsStore::open(root).context("store not initialized")?;

    match subcommand {
        ScenarioSubcommand::List => {
            let mut rows = Vec::new();
            let mut entries = Vec::new();
            for key in store.list("scenarios/")? {
                let scenario: Scenario = serde_json::from_slice(&store.get(&key)?)?;
                let id = key
                    .trim_start_matches("scenarios/")
                    .trim_end_matches(".json")
                    .to_string();
                rows.push(vec![
                    id.clone(),
                    scenario.name.clone(),
                    scenario.purpose.clone(),
                ]);
                entries.push(serde_json::json!({
                    "id": id,
                    "name": scenario.name,
                    "purpose": scenario.purpose,
                }));
            }
            if json {
                print_json(&entries)?;
            } else if rows.is_empty() {
                println!("No scenarios stored. Run: faultline generate <scenario.json>");
            } else {
                print_table(&["ID", "NAME", "PURPOSE"], rows);
            }
        }
        ScenarioSubcommand::Show { id } => {
            let key = faultline_core::paths::scenario_key(&id);
            let data = store
                .get(&key)
                .with_context(|| format!("scenario '{id}' not found"))?;
            let value: serde_json::Value = serde_json::from_slice(&data)?;
            print_json(&value)?;
        }
    }

    Ok(())
}
