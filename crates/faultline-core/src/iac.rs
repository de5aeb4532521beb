//! Infrastructure generation: expand an inferred service set into CDK
//! TypeScript stack source.
//!
//! Dispatch is a static registry of [`ResourceRule`] fn pointers iterated in
//! the fixed [`ServiceTag`] declaration order, so output is deterministic and
//! independent of how the caller's set was constructed. All accumulation
//! happens in a [`StackBuilder`] created fresh per call; nothing survives
//! between generations.
//!
//! Fragments that reference the shared `vpc` / `securityGroup` locals must
//! call [`StackBuilder::ensure_network`] first. The network block is emitted
//! exactly once, before any dependent fragment, so reordering rules can never
//! produce source that references an undeclared local.

use crate::scenario::Scenario;
use crate::types::{ServiceTag, DEFAULT_ENVIRONMENT, PROJECT_TAG};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// RenderCtx
// ---------------------------------------------------------------------------

/// Per-generation naming context handed to every resource rule.
pub struct RenderCtx<'a> {
    pub scenario: &'a Scenario,
    pub safe_name: String,
}

impl<'a> RenderCtx<'a> {
    fn new(scenario: &'a Scenario) -> Self {
        Self {
            scenario,
            safe_name: scenario.safe_name(),
        }
    }

    fn lower_name(&self) -> String {
        self.safe_name.to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// StackBuilder
// ---------------------------------------------------------------------------

/// Accumulates import lines and resource fragments for one generation call.
pub struct StackBuilder {
    imports: BTreeSet<String>,
    fragments: Vec<String>,
    network_emitted: bool,
}

impl StackBuilder {
    fn new() -> Self {
        let mut imports = BTreeSet::new();
        imports.insert("import * as cdk from 'aws-cdk-lib';".to_string());
        imports.insert("import { Construct } from 'constructs';".to_string());
        Self {
            imports,
            fragments: Vec::new(),
            network_emitted: false,
        }
    }

    fn import(&mut self, line: &str) {
        self.imports.insert(line.to_string());
    }

    fn fragment(&mut self, text: String) {
        self.fragments.push(text);
    }

    /// Emit the shared VPC and security-group fragments exactly once.
    ///
    /// Every rule whose fragment references the `vpc` or `securityGroup`
    /// locals calls this before emitting, which keeps the declaration ahead
    /// of all its uses regardless of registry order.
    pub fn ensure_network(&mut self, ctx: &RenderCtx) {
        if self.network_emitted {
            return;
        }
        self.network_emitted = true;
        self.import("import * as ec2 from 'aws-cdk-lib/aws-ec2';");

        let name = &ctx.safe_name;
        self.fragment(format!(
            r#"
    // VPC for {name}
    const vpc = new ec2.Vpc(this, '{name}Vpc', {{
      maxAzs: 2,
      subnetConfiguration: [
        {{
          cidrMask: 24,
          name: 'public',
          subnetType: ec2.SubnetType.PUBLIC,
        }},
        {{
          cidrMask: 24,
          name: 'private',
          subnetType: ec2.SubnetType.PRIVATE_WITH_EGRESS,
        }},
      ],
    }});"#
        ));
        self.fragment(format!(
            r#"
    // Security Group for {name}
    const securityGroup = new ec2.SecurityGroup(this, '{name}SecurityGroup', {{
      vpc,
      description: 'Security group for {name} chaos engineering test',
      allowAllOutbound: true,
    }});

    securityGroup.addIngressRule(
      ec2.Peer.anyIpv4(),
      ec2.Port.tcp(22),
      'SSH access'
    );"#
        ));
    }

    fn assemble(self, ctx: &RenderCtx) -> String {
        let imports_section = self
            .imports
            .into_iter()
            .collect::<Vec<_>>()
            .join("\n");
        let resources_section = self.fragments.join("\n");
        let name = &ctx.safe_name;
        let scenario_name = &ctx.scenario.name;

        format!(
            r#"{imports_section}

export interface {name}StackProps extends cdk.StackProps {{
  readonly environment?: string;
}}

export class {name}Stack extends cdk.Stack {{
  constructor(scope: Construct, id: string, props?: {name}StackProps) {{
    super(scope, id, props);

    // Generated resources for {scenario_name}
    {resources_section}

    // Tags for all resources
    cdk.Tags.of(this).add('Project', '{PROJECT_TAG}');
    cdk.Tags.of(this).add('Scenario', '{scenario_name}');
    cdk.Tags.of(this).add('Environment', props?.environment || '{DEFAULT_ENVIRONMENT}');
  }}
}}"#
        )
    }
}

// ---------------------------------------------------------------------------
// Resource rules (registry, declared in ServiceTag order)
// ---------------------------------------------------------------------------

/// One entry of the expansion registry: which tag it serves and the fragment
/// emitter. Tags absent from the registry expand to nothing.
pub struct ResourceRule {
    pub tag: ServiceTag,
    pub emit: fn(&mut StackBuilder, &RenderCtx),
}

pub static RESOURCE_RULES: &[ResourceRule] = &[
    ResourceRule {
        tag: ServiceTag::ComputeInstance,
        emit: emit_compute_instance,
    },
    ResourceRule {
        tag: ServiceTag::RelationalDatabase,
        emit: emit_relational_database,
    },
    ResourceRule {
        tag: ServiceTag::ObjectStorage,
        emit: emit_object_storage,
    },
    ResourceRule {
        tag: ServiceTag::FunctionCompute,
        emit: emit_function_compute,
    },
    ResourceRule {
        tag: ServiceTag::LoadBalancer,
        emit: emit_load_balancer,
    },
    ResourceRule {
        tag: ServiceTag::Network,
        emit: emit_network,
    },
    ResourceRule {
        tag: ServiceTag::Monitoring,
        emit: emit_monitoring,
    },
    ResourceRule {
        tag: ServiceTag::PubSub,
        emit: emit_pub_sub,
    },
    ResourceRule {
        tag: ServiceTag::Queue,
        emit: emit_queue,
    },
    ResourceRule {
        tag: ServiceTag::DocumentStore,
        emit: emit_document_store,
    },
];

fn emit_compute_instance(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.ensure_network(ctx);
    let name = &ctx.safe_name;
    let key_name = ctx.lower_name();
    builder.fragment(format!(
        r#"
    // EC2 Instance for {name}
    const instance = new ec2.Instance(this, '{name}Instance', {{
      instanceType: ec2.InstanceType.of(ec2.InstanceClass.T3, ec2.InstanceSize.MICRO),
      machineImage: ec2.MachineImage.latestAmazonLinux(),
      vpc,
      securityGroup,
      keyName: '{key_name}-key',
      vpcSubnets: {{
        subnetType: ec2.SubnetType.PUBLIC,
      }},
    }});"#
    ));
}

fn emit_network(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.ensure_network(ctx);
}

fn emit_relational_database(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.ensure_network(ctx);
    builder.import("import * as rds from 'aws-cdk-lib/aws-rds';");
    let name = &ctx.safe_name;
    builder.fragment(format!(
        r#"
    // RDS Database for {name}
    const database = new rds.DatabaseInstance(this, '{name}Database', {{
      engine: rds.DatabaseInstanceEngine.mysql({{
        version: rds.MysqlEngineVersion.VER_8_0,
      }}),
      instanceType: ec2.InstanceType.of(ec2.InstanceClass.T3, ec2.InstanceSize.MICRO),
      vpc,
      credentials: rds.Credentials.fromGeneratedSecret('admin'),
      multiAz: false,
      allocatedStorage: 20,
      deleteAutomatedBackups: true,
      deletionProtection: false,
      removalPolicy: cdk.RemovalPolicy.DESTROY,
    }});"#
    ));
}

fn emit_object_storage(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.import("import * as s3 from 'aws-cdk-lib/aws-s3';");
    let name = &ctx.safe_name;
    let bucket_prefix = ctx.lower_name();
    builder.fragment(format!(
        r#"
    // S3 Bucket for {name}
    const bucket = new s3.Bucket(this, '{name}Bucket', {{
      bucketName: `{bucket_prefix}-chaos-test-${{cdk.Aws.ACCOUNT_ID}}-${{cdk.Aws.REGION}}`,
      removalPolicy: cdk.RemovalPolicy.DESTROY,
      autoDeleteObjects: true,
      versioned: true,
      encryption: s3.BucketEncryption.S3_MANAGED,
    }});"#
    ));
}

fn emit_function_compute(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.import("import * as lambda from 'aws-cdk-lib/aws-lambda';");
    let name = &ctx.safe_name;
    builder.fragment(format!(
        r#"
    // Lambda Function for {name}
    const lambdaFunction = new lambda.Function(this, '{name}Function', {{
      runtime: lambda.Runtime.PYTHON_3_9,
      handler: 'index.lambda_handler',
      code: lambda.Code.fromInline(`
def lambda_handler(event, context):
    return {{
        'statusCode': 200,
        'body': 'Hello from {name} chaos test!'
    }}
`),
      timeout: cdk.Duration.seconds(30),
      memorySize: 128,
    }});"#
    ));
}

fn emit_load_balancer(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.ensure_network(ctx);
    builder.import("import * as elbv2 from 'aws-cdk-lib/aws-elasticloadbalancingv2';");
    let name = &ctx.safe_name;
    let lb_name = ctx.lower_name();
    builder.fragment(format!(
        r#"
    // Application Load Balancer for {name}
    const loadBalancer = new elbv2.ApplicationLoadBalancer(this, '{name}LoadBalancer', {{
      vpc,
      internetFacing: true,
      loadBalancerName: '{lb_name}-alb',
    }});

    const listener = loadBalancer.addListener('{name}Listener', {{
      port: 80,
      open: true,
    }});"#
    ));
}

fn emit_monitoring(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.import("import * as cloudwatch from 'aws-cdk-lib/aws-cloudwatch';");
    let name = &ctx.safe_name;
    let dash_name = ctx.lower_name();
    builder.fragment(format!(
        r#"
    // CloudWatch Dashboard for {name}
    const dashboard = new cloudwatch.Dashboard(this, '{name}Dashboard', {{
      dashboardName: '{dash_name}-chaos-dashboard',
    }});"#
    ));
}

fn emit_pub_sub(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.import("import * as sns from 'aws-cdk-lib/aws-sns';");
    let name = &ctx.safe_name;
    let topic_name = ctx.lower_name();
    builder.fragment(format!(
        r#"
    // SNS Topic for {name}
    const topic = new sns.Topic(this, '{name}Topic', {{
      topicName: '{topic_name}-chaos-notifications',
      displayName: '{name} Chaos Engineering Notifications',
    }});"#
    ));
}

fn emit_queue(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.import("import * as sqs from 'aws-cdk-lib/aws-sqs';");
    let name = &ctx.safe_name;
    let queue_name = ctx.lower_name();
    builder.fragment(format!(
        r#"
    // SQS Queue for {name}
    const queue = new sqs.Queue(this, '{name}Queue', {{
      queueName: '{queue_name}-chaos-queue',
      visibilityTimeout: cdk.Duration.seconds(300),
    }});"#
    ));
}

fn emit_document_store(builder: &mut StackBuilder, ctx: &RenderCtx) {
    builder.import("import * as dynamodb from 'aws-cdk-lib/aws-dynamodb';");
    let name = &ctx.safe_name;
    let table_name = ctx.lower_name();
    builder.fragment(format!(
        r#"
    // DynamoDB Table for {name}
    const table = new dynamodb.Table(this, '{name}Table', {{
      tableName: '{table_name}-chaos-table',
      partitionKey: {{
        name: 'id',
        type: dynamodb.AttributeType.STRING,
      }},
      billingMode: dynamodb.BillingMode.PAY_PER_REQUEST,
      removalPolicy: cdk.RemovalPolicy.DESTROY,
    }});"#
    ));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Generate the full CDK stack source for the given service set.
///
/// Pure function: no I/O, byte-identical output for identical input. An
/// empty set still yields the scaffolding wrapper and metadata tags.
pub fn generate(services: &BTreeSet<ServiceTag>, scenario: &Scenario) -> String {
    let ctx = RenderCtx::new(scenario);
    let mut builder = StackBuilder::new();
    for rule in RESOURCE_RULES {
        if services.contains(&rule.tag) {
            (rule.emit)(&mut builder, &ctx);
        }
    }
    builder.assemble(&ctx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
