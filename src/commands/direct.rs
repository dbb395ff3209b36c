//! One-shot commands that converge a single setting without a manifest entry

use anyhow::{Context as AnyhowContext, Result};

use sysconf::{LocalesOutcome, Require, Target};

use crate::Context;
use crate::cli::ConnectionArgs;
use crate::config::{
    validate_hostname, validate_locale_name, validate_sysctl_key, validate_sysctl_value,
};
use crate::target::Session;
use crate::ui;

fn with_require<R>(
    args: &ConnectionArgs,
    f: impl FnOnce(&Require<'_, dyn Target + Send + Sync>, &str) -> Result<R>,
) -> Result<R> {
    let session = Session::open(args)?;
    let require = Require::new(session.target.as_ref()).with_layout(session.layout().clone());
    f(&require, &session.name)
}

pub fn sysctl(ctx: &Context, args: &ConnectionArgs, key: &str, value: &str, persist: bool) -> Result<()> {
    validate_sysctl_key(key)?;
    validate_sysctl_value(key, value)?;
    let outcome = with_require(args, |require, host| {
        require
            .sysctl(key, value, persist)
            .with_context(|| format!("Could not set {} on {}", key, host))
    })?;

    if !outcome.changed() {
        if !ctx.quiet {
            ui::success(&format!("{} = {} (unchanged)", key, value));
        }
        return Ok(());
    }
    ui::success(&format!("{} = {}", key, value));
    if outcome.live_updated {
        ui::dim("running kernel updated");
    }
    if outcome.persisted_changed {
        ui::dim("persisted and reloaded");
    }
    Ok(())
}

pub fn hostname(ctx: &Context, args: &ConnectionArgs, name: &str) -> Result<()> {
    validate_hostname(name)?;
    let changed = with_require(args, |require, host| {
        require
            .hostname(name)
            .with_context(|| format!("Could not set hostname on {}", host))
    })?;

    if changed {
        ui::success(&format!("Hostname set to {}", name));
    } else if !ctx.quiet {
        ui::success(&format!("Hostname is {} (unchanged)", name));
    }
    Ok(())
}

pub fn locale(ctx: &Context, args: &ConnectionArgs, names: &[String]) -> Result<()> {
    for name in names {
        validate_locale_name(name)?;
    }
    let outcome = with_require(args, |require, host| {
        require
            .locales(names)
            .with_context(|| format!("Could not configure locales on {}", host))
    })?;
    report_locales(ctx, &outcome);
    Ok(())
}

pub fn default_locale(ctx: &Context, args: &ConnectionArgs, name: &str) -> Result<()> {
    validate_locale_name(name)?;
    let outcome = with_require(args, |require, host| {
        require
            .default_locale(name)
            .with_context(|| format!("Could not set default locale on {}", host))
    })?;
    report_locales(ctx, &outcome.availability);

    if outcome.default_changed {
        ui::success(&format!("Default locale set to {}", name));
    } else if !ctx.quiet {
        ui::success(&format!("Default locale is {} (unchanged)", name));
    }
    Ok(())
}

fn report_locales(ctx: &Context, outcome: &LocalesOutcome) {
    for line in &outcome.added {
        ui::success(&format!("Added {}", line));
    }
    // Unsupported names were already logged as warnings
    if outcome.regenerated {
        ui::dim("locales regenerated");
    } else if outcome.added.is_empty() && outcome.unsupported.is_empty() && !ctx.quiet {
        ui::success("Locales already available");
    }
}
