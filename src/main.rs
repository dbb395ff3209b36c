mod cli;
mod commands;
mod config;
mod paths;
mod plan;
mod resource;
mod target;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match run(&ctx, cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("{:#}", e));
            if let Some(hint) = hint(&e) {
                ui::dim(hint);
            }
            ExitCode::FAILURE
        }
    }
}

/// Suggest a fix for failures the target reports in a recognizable way
fn hint(err: &anyhow::Error) -> Option<&'static str> {
    let err = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<sysconf::Error>())?;
    if err.is_sudo_denied() {
        Some("sudo needs a password on the target; allow passwordless sudo or use --no-sudo as root")
    } else if err.is_connection_failure() {
        Some("ssh could not reach the target; check `ssh <host> true` and --user/--port")
    } else {
        None
    }
}

fn run(ctx: &Context, cli: Cli) -> Result<()> {
    let conn = &cli.connection;
    match cli.command {
        Command::Status(args) => {
            commands::declarative::status(ctx, conn, args.target.as_deref(), args.json)
        }
        Command::Diff(args) => commands::declarative::diff(ctx, conn, args.target.as_deref()),
        Command::Apply(args) => commands::declarative::apply(
            ctx,
            conn,
            args.target.as_deref(),
            args.dry_run,
            args.yes,
        ),
        Command::Sysctl {
            key,
            value,
            no_persist,
        } => commands::direct::sysctl(ctx, conn, &key, &value, !no_persist),
        Command::Hostname { name } => commands::direct::hostname(ctx, conn, &name),
        Command::Locale { names } => commands::direct::locale(ctx, conn, &names),
        Command::DefaultLocale { name } => commands::direct::default_locale(ctx, conn, &name),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "sysreq", &mut io::stdout());
            Ok(())
        }
    }
}
