use std::path::{Path, PathBuf};

/// Directory that holds all stored artifacts for a project root.
pub fn store_dir(root: &Path) -> PathBuf {
    root.join(".faultline")
}

pub fn config_path(root: &Path) -> PathBuf {
    store_dir(root).join("config.yaml")
}

pub fn scenario_key(slug: &str) -> String {
    format!("scenarios/{slug}.json")
}

pub fn cdk_key(slug: &str) -> String {
    format!("generated/cdk/{slug}.ts")
}

pub fn fis_key(slug: &str) -> String {
    format!("generated/fis/{slug}.json")
}

pub fn execution_key(id: &str) -> String {
    format!("executions/{id}.json")
}

pub fn template_key(name: &str) -> String {
    format!("templates/{name}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic() {
        assert_eq!(scenario_key("order-failure"), "scenarios/order-failure.json");
        assert_eq!(cdk_key("order-failure"), "generated/cdk/order-failure.ts");
        assert_eq!(fis_key("order-failure"), "generated/fis/order-failure.json");
        assert_eq!(execution_key("abc"), "executions/abc.json");
    }
}
