use anyhow::Context;
use faultline_core::config::Config;
use faultline_core::deploy::{AwsCliDeployer, StackDeployer};
use faultline_core::store::{ArtifactStore, FsStore};
use std::path::Path;

pub fn run(
    root: &Path,
    slug: &str,
    stack_name: Option<&str>,
    no_wait: bool,
    json: bool,
) -> anyhow::Result<()> {
    let store = FsStore::open(root).context("store not initialized")?;
    let config = Config::load(root).context("failed to load config")?;

    let key = faultline_core::paths::cdk_key(slug);
    let template_body = String::from_utf8(
        store
            .get(&key)
            .with_context(|| format!("no generated stack for scenario '{slug}'"))?,
    )
    .context("stored stack source is not valid UTF-8")?;

    let stack = match stack_name {
        Some(name) => name.to_string(),
        None => format!("{}-{}", config.deploy.stack_prefix, slug),
    };

    let deployer = AwsCliDeployer::new(&config.deploy);
    let result = deployer
        .deploy(&stack, &template_body)
        .context("deployment failed")?;

    if !no_wait {
        deployer
            .wait_for_completion(&stack, result.outcome)
            .context("waiting for stack completion failed")?;
    }

    if json {
        crate::output::print_json(&serde_json::json!({
            "stack": stack,
            "outcome": result.outcome.as_str(),
            "stack_id": result.stack_id,
        }))?;
    } else {
        println!("Stack:   {stack}");
        println!("Outcome: {}", result.outcome.as_str());
        if let Some(id) = result.stack_id {
            println!("Id:      {id}");
        }
    }

    Ok(())
}
