mod commands;
mod utils;

use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use stackflow_cloud::StackError;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "stack")]
#[command(about = "Create, update and watch CloudFormation stacks", long_about = None)]
struct Cli {
    /// AWS region (default: settings file, AWS_DEFAULT_REGION, AWS_REGION, us-east-1)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Named profile from the shared AWS config
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Settings file (default: stackflow.yaml lookup)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by `create` and `update`
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Stack name
    pub name: String,

    /// Template body file
    pub template: PathBuf,

    /// Template parameter, repeatable
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Stack tag, repeatable. Tags are set at creation only.
    #[arg(long = "tag", value_name = "KEY=VALUE")]
    pub tags: Vec<String>,

    /// Stack policy in effect while the stack updates
    #[arg(long, value_name = "FILE")]
    pub policy_during_update: Option<PathBuf>,

    /// Wait until the operation finishes
    #[arg(short, long)]
    pub wait: bool,

    /// Wait timeout in seconds (default: timeout_secs setting)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a stack
    Create(DeployArgs),
    /// Update an existing stack
    Update(DeployArgs),
    /// Delete a stack
    Delete {
        /// Stack name
        name: String,
    },
    /// Wait for the current operation on a stack to finish
    Wait {
        /// Stack name
        name: String,
        /// Timeout in seconds (default: timeout_secs setting)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Accept any *_COMPLETE status, rollbacks included
        #[arg(long)]
        settled: bool,
    },
    /// Show a stack's status and parameters
    Status {
        /// Stack name
        name: String,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// List stacks
    List {
        /// Include deleted and inactive stacks
        #[arg(short, long)]
        all: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Exit 0 if the stack is active, 1 otherwise
    Exists {
        /// Stack name
        name: String,
    },
    /// Resource failures reported for a stack
    Failures {
        /// Stack name
        name: String,
        /// Look back this many seconds
        #[arg(long, value_name = "SECS", default_value = "3600")]
        since: u64,
    },
    /// Recent events of a stack, oldest first
    Events {
        /// Stack name
        name: String,
        /// Show at most this many events
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a stack policy
    Policy {
        /// Stack name
        name: String,
        /// Policy document file
        file: PathBuf,
    },
    /// Print the template a stack was deployed with
    Template {
        /// Stack name
        name: String,
    },
    /// List the resources of a stack
    Resources {
        /// Stack name
        name: String,
        /// Print only the VPC id
        #[arg(long)]
        vpc: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version information
    Version,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Cancel outstanding waits on Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            child.cancel();
        }
    });
    token
}

const EXIT_FAILURE: i32 = 1;
const EXIT_TIMEOUT: i32 = 2;

/// Exit status of `stack exists`
fn exists_status(exists: bool) -> i32 {
    if exists { 0 } else { EXIT_FAILURE }
}

/// Run a subcommand and return the process exit status
async fn run(cli: Cli) -> anyhow::Result<i32> {
    if matches!(cli.command, Commands::Version) {
        println!("stackflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(0);
    }

    let options = commands::GlobalOptions {
        region: cli.region,
        profile: cli.profile,
        config: cli.config,
    };
    let ctx = commands::Context::connect(&options, cancel_on_interrupt()).await?;

    match cli.command {
        Commands::Create(args) => commands::deploy::handle_create(&ctx, args).await?,
        Commands::Update(args) => commands::deploy::handle_update(&ctx, args).await?,
        Commands::Delete { name } => commands::deploy::handle_delete(&ctx, &name).await?,
        Commands::Policy { name, file } => {
            commands::deploy::handle_policy(&ctx, &name, &file).await?
        }
        Commands::Wait {
            name,
            timeout,
            settled,
        } => commands::watch::handle_wait(&ctx, &name, timeout, settled).await?,
        Commands::Failures { name, since } => {
            commands::watch::handle_failures(&ctx, &name, since).await?
        }
        Commands::Events { name, limit, json } => {
            commands::watch::handle_events(&ctx, &name, limit, json).await?
        }
        Commands::Status { name, json } => {
            commands::inspect::handle_status(&ctx, &name, json).await?
        }
        Commands::List { all, json } => commands::inspect::handle_list(&ctx, all, json).await?,
        Commands::Exists { name } => {
            let exists = commands::inspect::handle_exists(&ctx, &name).await?;
            return Ok(exists_status(exists));
        }
        Commands::Template { name } => commands::inspect::handle_template(&ctx, &name).await?,
        Commands::Resources { name, vpc, json } => {
            commands::inspect::handle_resources(&ctx, &name, vpc, json).await?
        }
        Commands::Version => unreachable!("Version is handled before connecting"),
    }

    Ok(0)
}

/// Print an error and pick the exit status: 2 for timeouts, 1 for the rest
fn report(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<StackError>() {
        Some(StackError::Timeout { stack }) => {
            eprintln!(
                "{} timed out waiting for stack {}",
                "Timeout:".yellow().bold(),
                stack.cyan()
            );
            EXIT_TIMEOUT
        }
        Some(StackError::Failures(failures)) if failures.len() > 1 => {
            eprintln!("{} {}", "Error:".red().bold(), failures);
            for message in failures.list() {
                eprintln!("  • {}", message);
            }
            EXIT_FAILURE
        }
        _ => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            EXIT_FAILURE
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let status = match run(cli).await {
        Ok(status) => status,
        Err(err) => report(&err),
    };
    if status != 0 {
        std::process::exit(status);
    }
}
