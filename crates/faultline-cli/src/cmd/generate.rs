use crate::output::print_json;
use anyhow::Context;
use bedrock_agent::{extract_scenario_json, InvokeConfig, ModelClient};
use faultline_core::config::Config;
use faultline_core::pipeline::{record_failure, run_generation};
use faultline_core::scenario::Scenario;
use faultline_core::store::{ArtifactStore, FsStore};
use faultline_core::FaultlineError;
use serde::Deserialize;
use std::path::Path;

/// Stored prompt-template document: `templates/<name>.json`.
#[derive(Debug, Deserialize)]
struct PromptTemplate {
    template: PromptSpec,
}

#[derive(Debug, Deserialize)]
struct PromptSpec {
    prompt: String,
    #[serde(default)]
    model_id: Option<String>,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    temperature: Option<f32>,
}

pub fn run(
    root: &Path,
    file: Option<&Path>,
    template: Option<&str>,
    endpoint: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let store = FsStore::open(root).context("store not initialized")?;

    let scenario = match (file, template) {
        (Some(path), _) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Scenario::from_json(&data)
                .with_context(|| format!("invalid scenario document {}", path.display()))?
        }
        (None, Some(name)) => generate_from_template(root, &store, name, endpoint)?,
        (None, None) => return Err(FaultlineError::MissingScenario.into()),
    };

    match run_generation(&store, &scenario) {
        Ok(outcome) => {
            if json {
                print_json(&outcome)?;
            } else {
                println!("Scenario:   {}", outcome.scenario_name);
                let services: Vec<&str> =
                    outcome.services.iter().map(|t| t.as_str()).collect();
                println!("Services:   {}", services.join(", "));
                println!("CDK stack:  {}", outcome.cdk_key);
                println!("Experiment: {}", outcome.fis_key);
                println!("Execution:  {}", outcome.execution_id);
            }
            Ok(())
        }
        Err(e) => {
            record_failure(&store, &scenario, &e.to_string());
            Err(e).context("scenario generation failed")
        }
    }
}

/// Fetch the stored prompt template, invoke the model collaborator, and
/// parse the completion into a scenario, substituting the fallback document
/// when the completion carries no valid JSON.
fn generate_from_template(
    root: &Path,
    store: &FsStore,
    name: &str,
    endpoint: Option<&str>,
) -> anyhow::Result<Scenario> {
    let config = Config::load(root).context("failed to load config")?;
    let endpoint = endpoint
        .map(String::from)
        .or_else(|| config.model.endpoint.clone())
        .context("no model endpoint configured: set model.endpoint or pass --endpoint")?;

    let key = faultline_core::paths::template_key(name);
    let data = store
        .get(&key)
        .with_context(|| format!("prompt template '{name}' not found"))?;
    let doc: PromptTemplate =
        serde_json::from_slice(&data).context("invalid prompt template document")?;

    let client = ModelClient::new(InvokeConfig {
        endpoint,
        model_id: doc.template.model_id.unwrap_or(config.model.model_id),
        max_tokens: doc.template.max_tokens.unwrap_or(config.model.max_tokens),
        temperature: doc.template.temperature.unwrap_or(config.model.temperature),
    });

    let completion = client
        .invoke(&doc.template.prompt)
        .context("model invocation failed")?;

    let scenario = match extract_scenario_json(&completion) {
        Some(value) => serde_json::from_value(value)
            .unwrap_or_else(|_| Scenario::fallback(&completion)),
        None => {
            tracing::warn!("completion carried no parseable JSON; using fallback scenario");
            Scenario::fallback(&completion)
        }
    };
    Ok(scenario)
}
