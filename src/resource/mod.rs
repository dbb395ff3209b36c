//! Resources for the settings a host manifest manages
//!
//! Each resource reads its current state through a shared [`SharedTarget`]
//! and converges through [`sysconf::Require`], so `apply` stays idempotent
//! even when the state changed between `diff` and `apply`.

mod hostname;
mod locale;
mod sysctl;

pub use hostname::Hostname;
pub use locale::{DefaultLocale, Locales};
pub use sysctl::SysctlParam;

pub use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};

use sysconf::{Layout, Require, Target};

use crate::target::SharedTarget;

fn require<'a>(target: &'a SharedTarget, layout: &Layout) -> Require<'a, dyn Target + Send + Sync> {
    Require::new(target.as_ref()).with_layout(layout.clone())
}

fn dry_run() -> ApplyResult {
    ApplyResult::Skipped {
        reason: "Dry run".to_string(),
    }
}

fn changed(changed: bool) -> ApplyResult {
    if changed {
        ApplyResult::Modified
    } else {
        ApplyResult::NoChange
    }
}
