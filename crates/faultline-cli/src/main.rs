mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{experiment::ExperimentSubcommand, scenario::ScenarioSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "faultline",
    about = "Turn chaos-engineering scenarios into infrastructure stacks and fault-injection experiments",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .faultline/ or .git/)
    #[arg(long, global = true, env = "FAULTLINE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the artifact store in the current project
    Init,

    /// Run the generation pipeline on a scenario document
    Generate {
        /// Scenario JSON file
        file: Option<PathBuf>,

        /// Generate the scenario itself from a stored prompt template
        #[arg(long, conflicts_with = "file")]
        template: Option<String>,

        /// Model runtime endpoint (overrides config)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Show the inferred service set for a scenario document
    Infer { file: PathBuf },

    /// Hand a generated stack to the deployment collaborator
    Deploy {
        /// Scenario id (storage slug)
        slug: String,

        /// Stack name (default: <stack_prefix>-<slug>)
        #[arg(long)]
        stack_name: Option<String>,

        /// Return without waiting for the stack to settle
        #[arg(long)]
        no_wait: bool,
    },

    /// Query stored scenarios
    Scenario {
        #[command(subcommand)]
        subcommand: ScenarioSubcommand,
    },

    /// Query stored experiment templates
    Experiment {
        #[command(subcommand)]
        subcommand: ExperimentSubcommand,
    },

    /// Show pipeline execution history
    Executions,

    /// Start the read API server
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3141")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Generate {
            file,
            template,
            endpoint,
        } => cmd::generate::run(
            &root,
            file.as_deref(),
            template.as_deref(),
            endpoint.as_deref(),
            cli.json,
        ),
        Commands::Infer { file } => cmd::infer::run(&file, cli.json),
        Commands::Deploy {
            slug,
            stack_name,
            no_wait,
        } => cmd::deploy::run(&root, &slug, stack_name.as_deref(), no_wait, cli.json),
        Commands::Scenario { subcommand } => cmd::scenario::run(&root, subcommand, cli.json),
        Commands::Experiment { subcommand } => cmd::experiment::run(&root, subcommand, cli.json),
        Commands::Executions => cmd::executions::run(&root, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
