use crate::output::{print_json, print_table};
use anyhow::Context;
use faultline_core::execution::ExecutionRecord;
use faultline_core::store::FsStore;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = FsStore::open(root).context("store not initialized")?;
    let records = ExecutionRecord::list(&store)?;

    if json {
        print_json(&records)?;
        return Ok(());
    }

    if records.is_empty() {
        println!("No executions recorded.");
        return Ok(());
    }

    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.id.chars().take(8).collect::<String>(),
                r.scenario.clone(),
                r.status.to_string(),
                r.started_at.to_rfc3339(),
            ]
        })
        .collect();
    print_table(&["ID", "SCENARIO", "STATUS", "STARTED"], rows);

    Ok(())
}
