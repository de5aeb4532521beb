use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use faultline_core::experiment::ExperimentTemplate;
use faultline_core::store::{ArtifactStore, FsStore};
use std::path::Path;

#[derive(Subcommand)]
pub enum ExperimentSubcommand {
    /// List stored experiment templates
    List,
    /// Show one experiment template
    Show { id: String },
}

pub fn run(root: &Path, subcommand: ExperimentSubcommand, json: bool) -> anyhow::Result<()> {
    let store = FsStore::open(root).context("store not initialized")?;

    match subcommand {
        ExperimentSubcommand::List => {
            let mut rows = Vec::new();
            let mut entries = Vec::new();
            for key in store.list("generated/fis/")? {
                let template: ExperimentTemplate = serde_json::from_slice(&store.get(&key)?)?;
                let id = key
                    .trim_start_matches("generated/fis/")
                    .trim_end_matches(".json")
                    .to_string();
                rows.push(vec![
                    id.clone(),
                    template.actions.len().to_string(),
                    template.targets.len().to_string(),
                    template.description.clone(),
                ]);
                entries.push(serde_json::json!({
                    "id": id,
                    "description": template.description,
                    "actions": template.actions.len(),
                    "targets": template.targets.len(),
                }));
            }
            if json {
                print_json(&entries)?;
            } else if rows.is_empty() {
                println!("No experiment templates stored.");
            } else {
                print_table(&["ID", "ACTIONS", "TARGETS", "DESCRIPTION"], rows);
            }
        }
        ExperimentSubcommand::Show { id } => {
            let key = faultline_core::paths::fis_key(&id);
            let data = store
                .get(&key)
                .with_context(|| format!("experiment '{id}' not found"))?;
            let value: serde_json::Value = serde_json::from_slice(&data)?;
            print_json(&value)?;
        }
    }

    Ok(())
}
