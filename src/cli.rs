use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lbmon")]
#[command(version)]
#[command(about = "Reconcile load-balancer health monitors against the LBaaS API", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $LBMON_CONFIG_DIR/lbmon.toml)
    #[arg(short, long, global = true, env = "LBMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// State file (default: $LBMON_STATE_DIR/state.json)
    #[arg(long, global = true, env = "LBMON_STATE")]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change (no remote calls)
    Plan(TargetArgs),

    /// Create, update, replace or delete monitors to match the config
    Apply(ApplyArgs),

    /// Read tracked monitors and fold remote values into state
    Refresh(TargetArgs),

    /// Delete tracked monitors
    Destroy(DestroyArgs),

    /// Show the recorded state of monitors
    Show(TargetArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// Only this monitor
    pub name: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Only this monitor
    pub name: Option<String>,

    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,

    /// Read each tracked monitor before planning its pass
    #[arg(short, long)]
    pub refresh: bool,

    /// Skip confirmation for replacements and deletions
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct DestroyArgs {
    /// Only this monitor
    pub name: Option<String>,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}
