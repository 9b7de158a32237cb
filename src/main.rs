//! erk - pooled worktrees and PR submission
//!
//! CLI binary for managing a pool of git worktrees and submitting branches
//! as GitHub pull requests.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::{GlobalOpts, SubmitArgs};

#[derive(Parser)]
#[command(name = "erk")]
#[command(about = "Pooled git worktrees and PR submission for GitHub")]
#[command(version)]
struct Cli {
    /// Path inside the git repository (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// erk data directory (defaults to ~/.erk)
    #[arg(long, global = true, env = "ERK_HOME")]
    erk_home: Option<PathBuf>,

    /// Number of slots when creating a pool
    #[arg(long, global = true, env = "ERK_POOL_SIZE")]
    pool_size: Option<u32>,

    /// Emit JSON instead of styled text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push the current branch and create or update its PR
    Submit {
        /// Submit through Graphite (squash, restack, gt submit)
        #[arg(long)]
        graphite: bool,

        /// Force-push even if the remote has diverged
        #[arg(short, long)]
        force: bool,

        /// Keep scratch files and print extra detail
        #[arg(long)]
        debug: bool,

        /// Branch the PR should target (defaults to trunk)
        #[arg(long, conflicts_with = "graphite")]
        base: Option<String>,

        /// Trunk branch (defaults to the remote's HEAD)
        #[arg(long, env = "ERK_TRUNK")]
        trunk: Option<String>,

        /// Issue the PR closes
        #[arg(long)]
        issue: Option<u64>,

        /// PR title (defaults to the head commit subject)
        #[arg(long)]
        title: Option<String>,

        /// PR body (defaults to the head commit body)
        #[arg(long)]
        body: Option<String>,
    },

    /// Inspect the worktree pool
    Pool {
        #[command(subcommand)]
        action: PoolAction,
    },

    /// Manage individual slots
    Slot {
        #[command(subcommand)]
        action: SlotAction,
    },

    /// Squash-merge a branch's PR and release its slot
    Land {
        /// Branch to land (defaults to the current branch)
        branch: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// GitHub Actions workflows
    Workflow {
        #[command(subcommand)]
        action: WorkflowAction,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum PoolAction {
    /// Show slot occupancy
    Status,
    /// Check pool state against disk and git
    Check,
}

#[derive(Subcommand)]
enum SlotAction {
    /// Check out a branch in a slot
    Assign {
        /// Branch to check out
        branch: String,

        /// Slot to use (defaults to the next free slot)
        #[arg(long)]
        slot: Option<String>,
    },
    /// Return a slot to its placeholder branch
    Unassign {
        /// Slot name
        slot: String,
    },
    /// Set or clear the objective issue recorded for a slot
    Objective {
        /// Slot name
        slot: String,

        /// Issue number; omit to clear
        issue: Option<u64>,
    },
}

#[derive(Subcommand)]
enum WorkflowAction {
    /// Dispatch a workflow and wait for its run to appear
    Run {
        /// Workflow file name, e.g. `ci.yml`
        workflow: String,

        /// Branch to run on (defaults to the current branch)
        #[arg(long)]
        branch: Option<String>,

        /// Workflow input as key=value (repeatable)
        #[arg(long = "input")]
        inputs: Vec<String>,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

/// Install the stderr log subscriber
///
/// Reads `ERK_LOG`, then `RUST_LOG`. Defaults to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ERK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let opts = GlobalOpts {
        path: cli.path.unwrap_or_else(|| PathBuf::from(".")),
        erk_home: cli.erk_home,
        pool_size: cli.pool_size,
        json: cli.json,
    };

    let code = match cli.command {
        Commands::Submit {
            graphite,
            force,
            debug,
            base,
            trunk,
            issue,
            title,
            body,
        } => {
            let args = SubmitArgs {
                graphite,
                force,
                debug,
                base,
                trunk,
                issue,
                title,
                body,
            };
            cli::run_submit(&opts, args).await?
        }
        Commands::Pool { action } => match action {
            PoolAction::Status => {
                cli::run_pool_status(&opts).await?;
                ExitCode::SUCCESS
            }
            PoolAction::Check => cli::run_pool_check(&opts).await?,
        },
        Commands::Slot { action } => {
            match action {
                SlotAction::Assign { branch, slot } => {
                    cli::run_slot_assign(&opts, &branch, slot.as_deref()).await?;
                }
                SlotAction::Unassign { slot } => cli::run_slot_unassign(&opts, &slot).await?,
                SlotAction::Objective { slot, issue } => {
                    cli::run_slot_objective(&opts, &slot, issue).await?;
                }
            }
            ExitCode::SUCCESS
        }
        Commands::Land { branch, yes } => {
            cli::run_land(&opts, branch.as_deref(), yes).await?;
            ExitCode::SUCCESS
        }
        Commands::Workflow { action } => match action {
            WorkflowAction::Run {
                workflow,
                branch,
                inputs,
            } => {
                cli::run_workflow(&opts, &workflow, branch.as_deref(), &inputs).await?;
                ExitCode::SUCCESS
            }
        },
        Commands::Auth { action } => {
            let action_str = match action {
                AuthAction::Test => "test",
                AuthAction::Setup => "setup",
            };
            cli::run_auth(action_str).await?;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
