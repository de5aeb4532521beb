use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of the fixed `Project` tag applied to every provisioned resource and
/// used as the target filter in experiment templates. Both generators must
/// agree on this string or targets select nothing.
pub const PROJECT_TAG: &str = "ChaosEngineering";

/// Default value for the `Environment` metadata tag.
pub const DEFAULT_ENVIRONMENT: &str = "test";

// ---------------------------------------------------------------------------
// ServiceTag
// ---------------------------------------------------------------------------

/// A normalized cloud-service category referenced by a scenario.
///
/// The declared order of variants is the fixed evaluation order of both
/// generators: output fragments and experiment actions are emitted by
/// iterating [`ServiceTag::all`], never by iterating the caller's set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceTag {
    ComputeInstance,
    RelationalDatabase,
    ObjectStorage,
    FunctionCompute,
    LoadBalancer,
    Network,
    Monitoring,
    PubSub,
    Queue,
    DocumentStore,
    ContainerTasks,
    Kubernetes,
    ApiGateway,
    Workflow,
}

impl ServiceTag {
    pub fn all() -> &'static [ServiceTag] {
        &[
            ServiceTag::ComputeInstance,
            ServiceTag::RelationalDatabase,
            ServiceTag::ObjectStorage,
            ServiceTag::FunctionCompute,
            ServiceTag::LoadBalancer,
            ServiceTag::Network,
            ServiceTag::Monitoring,
            ServiceTag::PubSub,
            ServiceTag::Queue,
            ServiceTag::DocumentStore,
            ServiceTag::ContainerTasks,
            ServiceTag::Kubernetes,
            ServiceTag::ApiGateway,
            ServiceTag::Workflow,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceTag::ComputeInstance => "compute-instance",
            ServiceTag::RelationalDatabase => "relational-database",
            ServiceTag::ObjectStorage => "object-storage",
            ServiceTag::FunctionCompute => "function-compute",
            ServiceTag::LoadBalancer => "load-balancer",
            ServiceTag::Network => "network",
            ServiceTag::Monitoring => "monitoring",
            ServiceTag::PubSub => "pub-sub",
            ServiceTag::Queue => "queue",
            ServiceTag::DocumentStore => "document-store",
            ServiceTag::ContainerTasks => "container-tasks",
            ServiceTag::Kubernetes => "kubernetes",
            ServiceTag::ApiGateway => "api-gateway",
            ServiceTag::Workflow => "workflow",
        }
    }
}

impl fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceTag {
    type Err = crate::error::FaultlineError;

    /// Parse a service hint as written by scenario authors. Accepts the
    /// canonical kebab-case name as well as the short cloud-service codes
    /// the original scenario documents use (`EC2`, `Lambda`, `SQS`, ...),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "compute-instance" | "ec2" => Ok(ServiceTag::ComputeInstance),
            "relational-database" | "rds" | "aurora" => Ok(ServiceTag::RelationalDatabase),
            "object-storage" | "s3" => Ok(ServiceTag::ObjectStorage),
            "function-compute" | "lambda" => Ok(ServiceTag::FunctionCompute),
            "load-balancer" | "elb" | "alb" => Ok(ServiceTag::LoadBalancer),
            "network" | "vpc" => Ok(ServiceTag::Network),
            "monitoring" | "cloudwatch" => Ok(ServiceTag::Monitoring),
            "pub-sub" | "sns" => Ok(ServiceTag::PubSub),
            "queue" | "sqs" => Ok(ServiceTag::Queue),
            "document-store" | "dynamodb" => Ok(ServiceTag::DocumentStore),
            "container-tasks" | "ecs" => Ok(ServiceTag::ContainerTasks),
            "kubernetes" | "eks" | "k8s" => Ok(ServiceTag::Kubernetes),
            "api-gateway" | "apigateway" => Ok(ServiceTag::ApiGateway),
            "workflow" | "step-functions" | "stepfunctions" => Ok(ServiceTag::Workflow),
            _ => Err(crate::error::FaultlineError::UnknownService(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionMode
// ---------------------------------------------------------------------------

/// How many of the matching resources an experiment target selects.
///
/// Serialized as the wire strings `ALL` / `PERCENT(n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    All,
    Percent(u8),
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::All => f.write_str("ALL"),
            SelectionMode::Percent(n) => write!(f, "PERCENT({n})"),
        }
    }
}

impl Serialize for SelectionMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SelectionMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == "ALL" {
            return Ok(SelectionMode::All);
        }
        if let Some(inner) = s.strip_prefix("PERCENT(").and_then(|r| r.strip_suffix(')')) {
            if let Ok(n) = inner.parse::<u8>() {
                return Ok(SelectionMode::Percent(n));
            }
        }
        Err(serde::de::Error::custom(format!(
            "invalid selection mode '{s}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_roundtrip() {
        use std::str::FromStr;
        for tag in ServiceTag::all() {
            let parsed = ServiceTag::from_str(tag.as_str()).unwrap();
            assert_eq!(*tag, parsed);
        }
    }

    #[test]
    fn tag_accepts_short_codes() {
        assert_eq!(
            "EC2".parse::<ServiceTag>().unwrap(),
            ServiceTag::ComputeInstance
        );
        assert_eq!(
            "Lambda".parse::<ServiceTag>().unwrap(),
            ServiceTag::FunctionCompute
        );
        assert_eq!("sqs".parse::<ServiceTag>().unwrap(), ServiceTag::Queue);
        assert_eq!(
            "Step Functions".parse::<ServiceTag>().unwrap(),
            ServiceTag::Workflow
        );
    }

    #[test]
    fn tag_rejects_unknown() {
        assert!("mainframe".parse::<ServiceTag>().is_err());
        assert!("".parse::<ServiceTag>().is_err());
    }

    #[test]
    fn tag_declared_order_is_ord_order() {
        let all = ServiceTag::all();
        for pair in all.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn tag_serde_kebab_case() {
        let json = serde_json::to_string(&ServiceTag::FunctionCompute).unwrap();
        assert_eq!(json, "\"function-compute\"");
        let tag: ServiceTag = serde_json::from_str("\"container-tasks\"").unwrap();
        assert_eq!(tag, ServiceTag::ContainerTasks);
    }

    #[test]
    fn selection_mode_wire_format() {
        assert_eq!(
            serde_json::to_string(&SelectionMode::All).unwrap(),
            "\"ALL\""
        );
        assert_eq!(
            serde_json::to_string(&SelectionMode::Percent(50)).unwrap(),
            "\"PERCENT(50)\""
        );
        let m: SelectionMode = serde_json::from_str("\"PERCENT(25)\"").unwrap();
        assert_eq!(m, SelectionMode::Percent(25));
        assert!(serde_json::from_str::<SelectionMode>("\"SOME\"").is_err());
    }
}
