//! Manifest-driven commands
//!
//! - `status` - Show current state vs desired state
//! - `diff` - Preview what apply would change
//! - `apply` - Make current state match desired state

use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;

use declarative::{
    ApplyResult, AutoConfirm, ConfirmCallback, DiffSummary, ExecuteOptions, ExecuteSummary,
    ExecutionPlan, ProgressCallback, ResourceDiff, ResourceState, compute_diffs, execute,
};

use crate::Context;
use crate::cli::ConnectionArgs;
use crate::plan;
use crate::target::Session;
use crate::ui;

fn open_plan(args: &ConnectionArgs, target: Option<&str>) -> Result<(Session, ExecutionPlan)> {
    let session = Session::open(args)?;
    if session.manifest.is_empty() {
        log::warn!("The manifest doesn't manage anything");
    }
    let plan = plan::build(&session.manifest, &session.target).filter_by_target(target);
    Ok((session, plan))
}

/// One row of `status --json`
#[derive(Debug, Serialize)]
struct StatusEntry {
    resource_type: &'static str,
    id: String,
    current: Option<ResourceState>,
    desired: ResourceState,
    in_sync: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn status(ctx: &Context, args: &ConnectionArgs, target: Option<&str>, json: bool) -> Result<()> {
    let (session, plan) = open_plan(args, target)?;

    let entries: Vec<StatusEntry> = plan
        .iter()
        .map(|resource| {
            let desired = resource.desired_state();
            let (current, error) = match resource.current_state() {
                Ok(state) => (Some(state), None),
                Err(e) => (None, Some(format!("{:#}", e))),
            };
            StatusEntry {
                resource_type: resource.resource_type(),
                id: resource.id(),
                in_sync: current.as_ref() == Some(&desired),
                current,
                desired,
                error,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    ui::header(&format!("Status of {}", session.name));
    if entries.is_empty() {
        ui::dim("Nothing managed");
        return Ok(());
    }

    let mut section = "";
    for entry in &entries {
        if entry.resource_type != section {
            section = entry.resource_type;
            ui::section(section_title(section));
        }
        let (icon, detail) = match (&entry.current, &entry.error) {
            (_, Some(error)) => ("✗".red(), error.red().to_string()),
            (Some(_), None) if entry.in_sync => ("✓".green(), entry.desired.to_string().dimmed().to_string()),
            (Some(current), None) => ("⚠".yellow(), describe_change(current, &entry.desired)),
            (None, None) => ("?".dimmed(), String::new()),
        };
        println!("  {} {:<32} {}", icon, entry.id, detail);
    }

    let out_of_sync = entries.iter().filter(|e| !e.in_sync).count();
    println!();
    if out_of_sync == 0 {
        ui::success("In sync");
    } else if !ctx.quiet {
        ui::warn(&format!(
            "{} of {} out of sync - run `sysreq apply`",
            out_of_sync,
            entries.len()
        ));
    }
    Ok(())
}

pub fn diff(_ctx: &Context, args: &ConnectionArgs, target: Option<&str>) -> Result<()> {
    let (session, plan) = open_plan(args, target)?;
    ui::header(&format!("Diff for {}", session.name));
    if session.manifest.is_empty() {
        ui::dim("Nothing managed");
        return Ok(());
    }

    let diffs = compute_diffs(plan.iter())?;
    display_diff(&diffs);
    Ok(())
}

pub fn apply(
    ctx: &Context,
    args: &ConnectionArgs,
    target: Option<&str>,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let (session, plan) = open_plan(args, target)?;
    ui::header(&format!("Applying to {}", session.name));
    if session.manifest.is_empty() {
        ui::dim("Nothing managed");
        return Ok(());
    }

    if dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let diffs = compute_diffs(plan.iter())?;
    display_diff(&diffs);
    if diffs.is_empty() {
        return Ok(());
    }

    let opts = ExecuteOptions {
        dry_run,
        verbose: ctx.verbose > 0,
    };
    let mut progress = TerminalProgress { quiet: ctx.quiet };
    let summary = if yes {
        execute(&plan, &opts, &mut progress, &mut AutoConfirm)?
    } else {
        execute(&plan, &opts, &mut progress, &mut PromptConfirm)?
    };

    print_summary(&summary);
    if !summary.is_success() {
        bail!("{} resource(s) failed", summary.failed);
    }
    Ok(())
}

/// Prints one line per applied resource
struct TerminalProgress {
    quiet: bool,
}

impl ProgressCallback for TerminalProgress {
    fn on_start(&mut self, count: usize) {
        if !self.quiet {
            println!();
            ui::info(&format!("Converging {} resource(s)", count));
        }
    }

    fn on_resource_start(&mut self, _id: &str, description: &str) {
        log::debug!("{}", description);
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        match result {
            ApplyResult::Failed { error } => println!("  {} {} {}", "✗".red(), id, error.red()),
            ApplyResult::Skipped { reason } => {
                println!("  {} {} {}", "⚠".yellow(), id, reason.dimmed());
            }
            r if r.is_change() => println!("  {} {}", "✓".green(), id),
            _ => {
                if !self.quiet {
                    println!("  {} {} {}", "·".dimmed(), id, "unchanged".dimmed());
                }
            }
        }
    }

    fn on_finish(&mut self) {}
}

/// Asks on the terminal
struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}

fn section_title(resource_type: &str) -> &str {
    match resource_type {
        "sysctl" => "Kernel parameters",
        "hostname" => "Hostname",
        "locales" => "Locales",
        "default_locale" => "Default locale",
        other => other,
    }
}

fn describe_change(current: &ResourceState, desired: &ResourceState) -> String {
    match current {
        ResourceState::Absent => format!("(unset) → {}", desired),
        ResourceState::Modified { from, to } => format!("{} → {}", from, to),
        other => format!("{} → {}", other, desired),
    }
}

fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    let mut section = "";
    for diff in diffs {
        if diff.resource_type != section {
            section = diff.resource_type.as_str();
            ui::section(section_title(section));
        }
        let symbol = if diff.is_addition() { "+".green() } else { "~".yellow() };
        println!(
            "  {} {:<32} {}",
            symbol,
            diff.resource_id,
            describe_change(&diff.current, &diff.desired).dimmed()
        );
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!();
    println!(
        "  Summary: {} change(s) ({} new, {} modified)",
        summary.total().to_string().bold(),
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow()
    );
}

fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        ui::success(&format!("{} change(s) applied", summary.total_changes()));
    } else {
        ui::warn("Applied with errors");
    }
    if summary.skipped > 0 {
        println!("    • {} resources skipped", summary.skipped);
    }
    for (id, error) in &summary.failures {
        println!("    • {} {}", id.red(), error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_change() {
        let desired = ResourceState::present("10");
        assert_eq!(describe_change(&ResourceState::Absent, &desired), "(unset) → 10");
        assert_eq!(
            describe_change(
                &ResourceState::Modified {
                    from: "60".into(),
                    to: "10".into()
                },
                &desired
            ),
            "60 → 10"
        );
    }

    #[test]
    fn test_section_titles() {
        assert_eq!(section_title("sysctl"), "Kernel parameters");
        assert_eq!(section_title("default_locale"), "Default locale");
        assert_eq!(section_title("other"), "other");
    }

    #[test]
    fn test_status_entry_json() {
        let entry = StatusEntry {
            resource_type: "sysctl",
            id: "vm.swappiness".into(),
            current: Some(ResourceState::present("60")),
            desired: ResourceState::present("10"),
            in_sync: false,
            error: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["current"]["state"], "present");
        assert_eq!(json["desired"]["details"], "10");
        assert!(json.get("error").is_none());
    }
}
