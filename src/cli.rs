use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sysreq")]
#[command(version)]
#[command(about = "Converge kernel parameters, hostname and locales on Linux hosts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where to connect and which manifest to read
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Host manifest (default: <config dir>/host.toml)
    #[arg(short = 'f', long, global = true, env = "SYSREQ_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Remote host to manage over ssh (default: this machine)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// SSH login user
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// SSH port
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Run privileged commands directly instead of through sudo
    #[arg(long, global = true)]
    pub no_sudo: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show current vs desired state of every managed setting
    Status(StatusArgs),

    /// Preview what apply would change
    Diff(DiffArgs),

    /// Converge the host to the manifest
    Apply(ApplyArgs),

    /// Require a kernel parameter value
    Sysctl {
        /// Parameter name (e.g., net.ipv4.ip_forward)
        key: String,

        /// Desired value
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Only set the running kernel, don't write /etc/sysctl.d
        #[arg(long)]
        no_persist: bool,
    },

    /// Require the hostname
    Hostname {
        /// Desired hostname
        name: String,
    },

    /// Require one or more locales to be available
    Locale {
        /// Locale names (e.g., en_US.UTF-8)
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Require the system default locale
    DefaultLocale {
        /// Locale name (e.g., en_US.UTF-8)
        name: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct StatusArgs {
    /// Limit to a resource type or `type.name` (e.g., sysctl.vm.swappiness)
    pub target: Option<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Limit to a resource type or `type.name`
    pub target: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Limit to a resource type or `type.name`
    pub target: Option<String>,

    /// Show what would change without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Don't ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}
