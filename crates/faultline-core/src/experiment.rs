//! Experiment template generation: expand an inferred service set into a
//! fault-injection experiment document (actions, targets, stop conditions).
//!
//! Mirrors the registry + fresh-builder shape of [`crate::iac`]: a static
//! table of [`ActionRule`] fn pointers in [`ServiceTag`] declaration order,
//! accumulating into a per-call [`TemplateBuilder`]. Targets carry the same
//! fixed `Project` tag filter the infrastructure generator stamps on every
//! resource, which is what ties the two artifacts together.

use crate::error::{FaultlineError, Result};
use crate::scenario::Scenario;
use crate::types::{SelectionMode, ServiceTag, DEFAULT_ENVIRONMENT, PROJECT_TAG};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Template document (external JSON contract)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(rename = "actionId")]
    pub action_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    /// Role name → target name; every value must be a key of the template's
    /// target mapping.
    pub targets: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(rename = "resourceTags")]
    pub resource_tags: BTreeMap<String, String>,
    #[serde(rename = "selectionMode")]
    pub selection_mode: SelectionMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopCondition {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The experiment template document. Field order is the serialized key
/// order and is part of the external contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentTemplate {
    pub description: String,
    pub actions: BTreeMap<String, ActionSpec>,
    #[serde(rename = "stopConditions")]
    pub stop_conditions: Vec<StopCondition>,
    pub targets: BTreeMap<String, TargetSpec>,
    #[serde(rename = "roleArn")]
    pub role_arn: String,
    pub tags: BTreeMap<String, String>,
}

impl ExperimentTemplate {
    /// Referential integrity: every target name an action references must
    /// exist in the target mapping.
    pub fn validate(&self) -> Result<()> {
        for (action_name, action) in &self.actions {
            for target_name in action.targets.values() {
                if !self.targets.contains_key(target_name) {
                    return Err(FaultlineError::DanglingTarget {
                        action: action_name.clone(),
                        target: target_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TemplateBuilder
// ---------------------------------------------------------------------------

/// Accumulates actions and targets for one generation call.
pub struct TemplateBuilder {
    actions: BTreeMap<String, ActionSpec>,
    targets: BTreeMap<String, TargetSpec>,
}

impl TemplateBuilder {
    fn new() -> Self {
        Self {
            actions: BTreeMap::new(),
            targets: BTreeMap::new(),
        }
    }

    fn action(&mut self, name: &str, spec: ActionSpec) {
        self.actions.insert(name.to_string(), spec);
    }

    fn target(&mut self, name: &str, resource_type: &str, selection_mode: SelectionMode) {
        let mut resource_tags = BTreeMap::new();
        resource_tags.insert("Project".to_string(), PROJECT_TAG.to_string());
        self.targets.insert(
            name.to_string(),
            TargetSpec {
                resource_type: resource_type.to_string(),
                resource_tags,
                selection_mode,
            },
        );
    }
}

fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Action rules (registry, declared in ServiceTag order)
// ---------------------------------------------------------------------------

/// One entry of the experiment registry. Tags absent from the registry
/// contribute no actions or targets.
pub struct ActionRule {
    pub tag: ServiceTag,
    pub register: fn(&mut TemplateBuilder),
}

pub static ACTION_RULES: &[ActionRule] = &[
    ActionRule {
        tag: ServiceTag::ComputeInstance,
        register: register_compute_instance,
    },
    ActionRule {
        tag: ServiceTag::RelationalDatabase,
        register: register_relational_database,
    },
    ActionRule {
        tag: ServiceTag::FunctionCompute,
        register: register_function_compute,
    },
    ActionRule {
        tag: ServiceTag::LoadBalancer,
        register: register_load_balancer,
    },
    ActionRule {
        tag: ServiceTag::ContainerTasks,
        register: register_container_tasks,
    },
    ActionRule {
        tag: ServiceTag::Kubernetes,
        register: register_kubernetes,
    },
];

fn register_compute_instance(builder: &mut TemplateBuilder) {
    builder.action(
        "stop-instances",
        ActionSpec {
            action_id: "aws:ec2:stop-instances".to_string(),
            description: "Stop EC2 instances".to_string(),
            parameters: string_map(&[("startInstancesAfterDuration", "PT10M")]),
            targets: string_map(&[("Instances", "ec2-instances")]),
        },
    );
    builder.action(
        "reboot-instances",
        ActionSpec {
            action_id: "aws:ec2:reboot-instances".to_string(),
            description: "Reboot EC2 instances".to_string(),
            parameters: BTreeMap::new(),
            targets: string_map(&[("Instances", "ec2-instances")]),
        },
    );
    builder.action(
        "cpu-stress",
        ActionSpec {
            action_id: "aws:ssm:send-command".to_string(),
            description: "Run CPU stress on EC2 instances".to_string(),
            parameters: string_map(&[
                (
                    "documentArn",
                    "arn:aws:ssm:*:*:document/AWSFIS-Run-CPU-Stress",
                ),
                (
                    "documentParameters",
                    r#"{"DurationSeconds": "600", "CPU": "0"}"#,
                ),
                ("duration", "PT10M"),
            ]),
            targets: string_map(&[("Instances", "ec2-instances")]),
        },
    );
    builder.target("ec2-instances", "aws:ec2:instance", SelectionMode::All);
}

fn register_relational_database(builder: &mut TemplateBuilder) {
    builder.action(
        "reboot-db-instances",
        ActionSpec {
            action_id: "aws:rds:reboot-db-instances".to_string(),
            description: "Reboot RDS instances".to_string(),
            parameters: BTreeMap::new(),
            targets: string_map(&[("DBInstances", "rds-instances")]),
        },
    );
    builder.action(
        "failover-db-cluster",
        ActionSpec {
            action_id: "aws:rds:failover-db-cluster".to_string(),
            description: "Fail over RDS clusters".to_string(),
            parameters: BTreeMap::new(),
            targets: string_map(&[("Clusters", "rds-clusters")]),
        },
    );
    builder.target("rds-instances", "aws:rds:db", SelectionMode::All);
    builder.target("rds-clusters", "aws:rds:cluster", SelectionMode::All);
}

fn register_function_compute(builder: &mut TemplateBuilder) {
    builder.action(
        "throttle-lambda",
        ActionSpec {
            action_id: "aws:lambda:invocation-add-delay".to_string(),
            description: "Add invocation delay to Lambda functions".to_string(),
            parameters: string_map(&[("delay", "5000"), ("jitterRate", "0.1")]),
            targets: string_map(&[("Functions", "lambda-functions")]),
        },
    );
    builder.action(
        "lambda-error-injection",
        ActionSpec {
            action_id: "aws:lambda:invocation-error".to_string(),
            description: "Inject invocation errors into Lambda functions".to_string(),
            parameters: string_map(&[("errorType", "StatusCode"), ("errorValue", "500")]),
            targets: string_map(&[("Functions", "lambda-functions")]),
        },
    );
    builder.target("lambda-functions", "aws:lambda:function", SelectionMode::All);
}

fn register_load_balancer(builder: &mut TemplateBuilder) {
    builder.action(
        "deregister-targets",
        ActionSpec {
            action_id: "aws:elbv2:deregister-targets".to_string(),
            description: "Deregister ALB targets".to_string(),
            parameters: string_map(&[("reregisterTargetsAfterDuration", "PT10M")]),
            targets: string_map(&[("LoadBalancers", "alb-load-balancers")]),
        },
    );
    builder.target(
        "alb-load-balancers",
        "aws:elbv2:load-balancer",
        SelectionMode::All,
    );
}

fn register_container_tasks(builder: &mut TemplateBuilder) {
    builder.action(
        "stop-ecs-tasks",
        ActionSpec {
            action_id: "aws:ecs:stop-task".to_string(),
            description: "Stop ECS tasks".to_string(),
            parameters: BTreeMap::new(),
            targets: string_map(&[("Tasks", "ecs-tasks")]),
        },
    );
    // Stopping every task at once is not a realistic fault; take half.
    builder.target("ecs-tasks", "aws:ecs:task", SelectionMode::Percent(50));
}

fn register_kubernetes(builder: &mut TemplateBuilder) {
    builder.action(
        "kill-eks-pods",
        ActionSpec {
            action_id: "aws:eks:pod-delete".to_string(),
            description: "Delete EKS pods".to_string(),
            parameters: BTreeMap::new(),
            targets: string_map(&[("Pods", "eks-pods")]),
        },
    );
    builder.target("eks-pods", "aws:eks:pod", SelectionMode::Percent(25));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Generate the experiment template for the given service set.
///
/// Pure function; stop conditions are unconditional so a template is always
/// abortable even when the action mapping is empty.
pub fn generate(services: &BTreeSet<ServiceTag>, scenario: &Scenario) -> ExperimentTemplate {
    let mut builder = TemplateBuilder::new();
    for rule in ACTION_RULES {
        if services.contains(&rule.tag) {
            (rule.register)(&mut builder);
        }
    }

    let stop_conditions = vec![
        StopCondition {
            source: "aws:cloudwatch:alarm".to_string(),
            value: Some("arn:aws:cloudwatch:*:*:alarm:*".to_string()),
        },
        StopCondition {
            source: "none".to_string(),
            value: None,
        },
    ];

    let mut tags = BTreeMap::new();
    tags.insert("Project".to_string(), PROJECT_TAG.to_string());
    tags.insert("Scenario".to_string(), scenario.name.clone());
    tags.insert("Environment".to_string(), DEFAULT_ENVIRONMENT.to_string());

    ExperimentTemplate {
        description: format!("{}: {}", scenario.name, scenario.purpose),
        actions: builder.actions,
        stop_conditions,
        targets: builder.targets,
        role_arn: "arn:aws:iam::ACCOUNT_ID:role/FISRole".to_string(),
        tags,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::infer_services;

    fn scenario(name: &str, purpose: &str) -> Scenario {
        let mut s = Scenario::from_json("{}").unwrap();
        s.name = name.to_string();
        s.purpose = purpose.to_string();
        s
    }

    fn tags(list: &[ServiceTag]) -> BTreeSet<ServiceTag> {
        list.iter().copied().collect()
    }

    #[test]
    fn registry_in_declared_tag_order() {
        let order: Vec<ServiceTag> = ACTION_RULES.iter().map(|r| r.tag).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn empty_set_still_abortable() {
        let template = generate(&BTreeSet::new(), &scenario("Empty", "nothing"));
        assert!(template.actions.is_empty());
        assert!(template.targets.is_empty());
        assert_eq!(template.stop_conditions.len(), 2);
        assert_eq!(template.stop_conditions[0].source, "aws:cloudwatch:alarm");
        assert_eq!(template.stop_conditions[1].source, "none");
        template.validate().unwrap();
    }

    #[test]
    fn referential_integrity_for_every_tag_combination() {
        // Each tag alone, and all tags together.
        for tag in ServiceTag::all() {
            let template = generate(&tags(&[*tag]), &scenario("T", "p"));
            template.validate().unwrap();
        }
        let all: BTreeSet<ServiceTag> = ServiceTag::all().iter().copied().collect();
        generate(&all, &scenario("T", "p")).validate().unwrap();
    }

    #[test]
    fn validate_catches_dangling_target() {
        let mut template = generate(
            &tags(&[ServiceTag::ComputeInstance]),
            &scenario("T", "p"),
        );
        template.targets.remove("ec2-instances");
        let err = template.validate().unwrap_err();
        assert!(err.to_string().contains("ec2-instances"));
    }

    #[test]
    fn orchestration_tags_use_fractional_selection() {
        let template = generate(
            &tags(&[ServiceTag::ContainerTasks, ServiceTag::Kubernetes]),
            &scenario("T", "p"),
        );
        assert_eq!(
            template.targets["ecs-tasks"].selection_mode,
            SelectionMode::Percent(50)
        );
        assert_eq!(
            template.targets["eks-pods"].selection_mode,
            SelectionMode::Percent(25)
        );
    }

    #[test]
    fn targets_filter_on_project_tag() {
        let template = generate(&tags(&[ServiceTag::FunctionCompute]), &scenario("T", "p"));
        assert_eq!(
            template.targets["lambda-functions"].resource_tags["Project"],
            PROJECT_TAG
        );
    }

    #[test]
    fn description_joins_name_and_purpose() {
        let template = generate(
            &BTreeSet::new(),
            &scenario("Order Service Failure", "Validate retries"),
        );
        assert_eq!(
            template.description,
            "Order Service Failure: Validate retries"
        );
        assert_eq!(template.tags["Scenario"], "Order Service Failure");
        assert_eq!(template.tags["Environment"], "test");
    }

    #[test]
    fn deterministic_output() {
        let s = scenario("Det", "p");
        let set = tags(&[
            ServiceTag::ComputeInstance,
            ServiceTag::Kubernetes,
            ServiceTag::FunctionCompute,
        ]);
        let a = serde_json::to_string(&generate(&set, &s)).unwrap();
        let b = serde_json::to_string(&generate(&set, &s)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn repeated_calls_do_not_leak_actions() {
        let first = generate(
            &tags(&[ServiceTag::ComputeInstance]),
            &scenario("First", "p"),
        );
        let second = generate(&tags(&[ServiceTag::Queue]), &scenario("Second", "p"));
        assert!(first.actions.contains_key("stop-instances"));
        assert!(second.actions.is_empty());
        assert!(second.targets.is_empty());
    }

    #[test]
    fn lambda_example_has_exactly_one_target() {
        let s = Scenario::from_json(
            r#"{"scenario_name": "Order Service Failure", "target_services": ["Lambda"]}"#,
        )
        .unwrap();
        let services = infer_services(&s);
        let template = generate(&services, &s);
        assert_eq!(template.targets.len(), 1);
        assert_eq!(
            template.targets["lambda-functions"].resource_type,
            "aws:lambda:function"
        );
        assert!(!template.targets.keys().any(|k| k.contains("rds")));
    }

    #[test]
    fn wire_format_matches_contract() {
        let template = generate(
            &tags(&[ServiceTag::ComputeInstance]),
            &scenario("Wire", "check"),
        );
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(
            json["actions"]["stop-instances"]["actionId"],
            "aws:ec2:stop-instances"
        );
        assert_eq!(
            json["actions"]["stop-instances"]["parameters"]["startInstancesAfterDuration"],
            "PT10M"
        );
        assert_eq!(
            json["actions"]["stop-instances"]["targets"]["Instances"],
            "ec2-instances"
        );
        assert_eq!(
            json["targets"]["ec2-instances"]["selectionMode"],
            "ALL"
        );
        assert_eq!(json["roleArn"], "arn:aws:iam::ACCOUNT_ID:role/FISRole");
        // reboot-instances has no parameters; the key must be absent
        assert!(json["actions"]["reboot-instances"]
            .get("parameters")
            .is_none());
        // manual stop condition has no value
        assert!(json["stopConditions"][1].get("value").is_none());
        // serialized key order is part of the contract; actions nest their
        // own "targets" key, so the top-level one is the first match after
        // stopConditions
        let text = serde_json::to_string(&template).unwrap();
        let desc = text.find("\"description\"").unwrap();
        let actions = text.find("\"actions\"").unwrap();
        let stops = text.find("\"stopConditions\"").unwrap();
        let targets = stops + text[stops..].find("\"targets\"").unwrap();
        let role = text.find("\"roleArn\"").unwrap();
        assert!(desc < actions && actions < stops && stops < targets && targets < role);
    }
}
