use anyhow::Context;
use faultline_core::config::Config;
use faultline_core::paths;
use faultline_core::store::FsStore;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    FsStore::init(root).context("failed to create artifact store")?;

    if !paths::config_path(root).exists() {
        let project_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "faultline".to_string());
        Config::new(project_name)
            .save(root)
            .context("failed to write config")?;
    }

    println!("Initialized faultline store in {}", root.display());
    println!("Next: faultline generate <scenario.json>");
    Ok(())
}
