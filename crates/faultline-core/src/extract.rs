//! Service extraction: map a scenario document to the set of service
//! categories it touches.
//!
//! Two signals feed the result: the explicit `target_services` hints
//! (authoritative) and case-insensitive whole-word synonym patterns evaluated
//! against the serialized document (best-effort). Inference is monotonic,
//! so a tag, once added, is never removed, and it never fails: no matches is
//! an empty set, not an error.

use crate::scenario::Scenario;
use crate::types::ServiceTag;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Synonym patterns per tag, in the fixed tag evaluation order. Adding a
/// service category is an entry here plus a rule in each generator registry.
const PATTERN_TABLE: &[(ServiceTag, &str)] = &[
    (
        ServiceTag::ComputeInstance,
        r"(?i)\b(ec2|elastic\s+compute|virtual\s+machine|instance)\b",
    ),
    (
        ServiceTag::RelationalDatabase,
        r"(?i)\b(rds|database|mysql|postgresql|aurora)\b",
    ),
    (
        ServiceTag::ObjectStorage,
        r"(?i)\b(s3|simple\s+storage|bucket|object\s+storage)\b",
    ),
    (
        ServiceTag::FunctionCompute,
        r"(?i)\b(lambda|serverless|function)\b",
    ),
    (
        ServiceTag::LoadBalancer,
        r"(?i)\b(elb|alb|elastic\s+load\s+balancer|load\s+balancer)\b",
    ),
    (
        ServiceTag::Network,
        r"(?i)\b(vpc|virtual\s+private\s+cloud|network)\b",
    ),
    (
        ServiceTag::Monitoring,
        r"(?i)\b(cloudwatch|monitoring|metrics|alarm)\b",
    ),
    (
        ServiceTag::PubSub,
        r"(?i)\b(sns|simple\s+notification|notification|topic)\b",
    ),
    (ServiceTag::Queue, r"(?i)\b(sqs|simple\s+queue|queue)\b"),
    (
        ServiceTag::DocumentStore,
        r"(?i)\b(dynamodb|nosql|document\s+database|key-value)\b",
    ),
    (
        ServiceTag::ContainerTasks,
        r"(?i)\b(ecs|elastic\s+container|container)\b",
    ),
    (ServiceTag::Kubernetes, r"(?i)\b(eks|kubernetes|k8s|pod)\b"),
    (
        ServiceTag::ApiGateway,
        r"(?i)\b(api\s+gateway|rest\s+api|api)\b",
    ),
    (
        ServiceTag::Workflow,
        r"(?i)\b(step\s+functions|state\s+machine|workflow)\b",
    ),
];

fn patterns() -> &'static [(ServiceTag, Regex)] {
    static PATTERNS: OnceLock<Vec<(ServiceTag, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PATTERN_TABLE
            .iter()
            .map(|(tag, pattern)| {
                // Table patterns are compile-time constants; a malformed one
                // is a programming error, caught by the tests below.
                (*tag, Regex::new(pattern).expect("invalid synonym pattern"))
            })
            .collect()
    })
}

/// Infer the set of service categories a scenario touches.
///
/// Seeds with the normalized explicit hints, then unions in every tag whose
/// synonym pattern matches the serialized document. Unrecognized explicit
/// hints are skipped; absence of a match is never an error.
pub fn infer_services(scenario: &Scenario) -> BTreeSet<ServiceTag> {
    let mut services: BTreeSet<ServiceTag> = scenario
        .target_services
        .iter()
        .filter_map(|hint| hint.parse().ok())
        .collect();

    let blob = scenario.to_search_blob();
    for (tag, pattern) in patterns() {
        if pattern.is_match(&blob) {
            services.insert(*tag);
        }
    }

    services
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
