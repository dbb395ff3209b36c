//! Locale resources: generated locales and the system default

use anyhow::Result;

use sysconf::files::contains_line;
use sysconf::layout::default_locale_contents;
use sysconf::{Layout, RemoteFs, SystemOps, Target};

use super::{ApplyContext, ApplyResult, Resource, ResourceState};
use crate::target::SharedTarget;

/// Requested locale names split by what is still to do
#[derive(Debug, Default, PartialEq, Eq)]
struct LocaleGaps {
    /// Supported but not yet in the locales config
    missing: Vec<String>,
    /// Not in the supported catalog; these can never converge
    unsupported: Vec<String>,
}

fn locale_gaps(target: &dyn Target, layout: &Layout, names: &[String]) -> Result<LocaleGaps> {
    let supported = target.supported_locales()?;
    let config = target
        .read_file(&layout.locales_config, true)?
        .unwrap_or_default();

    let mut gaps = LocaleGaps::default();
    for name in names {
        match supported.iter().find(|l| &l.name == name) {
            Some(locale) if contains_line(&config, &locale.config_line()) => {}
            Some(_) => gaps.missing.push(name.clone()),
            None => gaps.unsupported.push(name.clone()),
        }
    }
    Ok(gaps)
}

/// Every locale listed in the manifest, converged together so the
/// regeneration command runs at most once
#[derive(Clone)]
pub struct Locales {
    target: SharedTarget,
    layout: Layout,
    pub names: Vec<String>,
}

impl std::fmt::Debug for Locales {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locales")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl Locales {
    pub fn new(target: SharedTarget, layout: Layout, names: Vec<String>) -> Self {
        Self {
            target,
            layout,
            names,
        }
    }
}

impl Resource for Locales {
    fn id(&self) -> String {
        self.names.join(",")
    }

    fn description(&self) -> String {
        format!("Generate locales {}", self.names.join(", "))
    }

    fn resource_type(&self) -> &'static str {
        "locales"
    }

    fn current_state(&self) -> Result<ResourceState> {
        let gaps = locale_gaps(self.target.as_ref(), &self.layout, &self.names)?;
        for name in &gaps.unsupported {
            log::warn!("Unsupported locale name \"{}\"", name);
        }
        if gaps.missing.is_empty() {
            Ok(self.desired_state())
        } else {
            Ok(ResourceState::Modified {
                from: format!("missing {}", gaps.missing.join(", ")),
                to: self.names.join(", "),
            })
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::present(self.names.join(", "))
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(super::dry_run());
        }
        let outcome = super::require(&self.target, &self.layout).locales(&self.names)?;
        if !outcome.changed() && !outcome.unsupported.is_empty() {
            return Ok(ApplyResult::Skipped {
                reason: format!("unsupported: {}", outcome.unsupported.join(", ")),
            });
        }
        Ok(super::changed(outcome.changed()))
    }
}

/// The system default locale (`LANG`), made available first
#[derive(Clone)]
pub struct DefaultLocale {
    target: SharedTarget,
    layout: Layout,
    pub name: String,
}

impl std::fmt::Debug for DefaultLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultLocale")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl DefaultLocale {
    pub fn new(target: SharedTarget, layout: Layout, name: &str) -> Self {
        Self {
            target,
            layout,
            name: name.to_string(),
        }
    }
}

/// The `LANG` value from a default-locale file, if any
fn lang_value(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("LANG="))
        .map(|value| value.trim_matches('"'))
}

impl Resource for DefaultLocale {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Set default locale to {}", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "default_locale"
    }

    fn current_state(&self) -> Result<ResourceState> {
        let names = [self.name.clone()];
        let gaps = locale_gaps(self.target.as_ref(), &self.layout, &names)?;
        let Some(content) = self
            .target
            .read_file(&self.layout.default_locale_file, true)?
        else {
            return Ok(ResourceState::Absent);
        };
        let content = String::from_utf8_lossy(&content);

        if content != default_locale_contents(&self.name) {
            let from = lang_value(&content).unwrap_or("unset").to_string();
            return Ok(ResourceState::Modified {
                from,
                to: self.name.clone(),
            });
        }
        if !gaps.missing.is_empty() {
            return Ok(ResourceState::Modified {
                from: format!("{} (not generated)", self.name),
                to: self.name.clone(),
            });
        }
        Ok(self.desired_state())
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::present(&self.name)
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(super::dry_run());
        }
        let outcome = super::require(&self.target, &self.layout).default_locale(&self.name)?;
        Ok(super::changed(outcome.changed()))
    }
}
