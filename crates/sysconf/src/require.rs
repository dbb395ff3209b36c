//! Idempotent "require" operations for system settings.
//!
//! Each operation reads the current state, mutates the target only when it
//! differs from the request, and runs a follow-up command (parameter reload,
//! locale regeneration) only when a tracked file actually changed.

use serde::Serialize;

use crate::error::Result;
use crate::files::{RemoteFs, append_line, ensure_file};
use crate::layout::{Layout, default_locale_contents, sysctl_line};
use crate::system::{SystemOps, sysctl_values_equal};
use crate::watch::watch;

/// What [`Require::sysctl`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SysctlOutcome {
    /// The running kernel's value was set
    pub live_updated: bool,
    /// The persisted file was (re)written, and the reload command ran
    pub persisted_changed: bool,
}

impl SysctlOutcome {
    pub fn changed(&self) -> bool {
        self.live_updated || self.persisted_changed
    }
}

/// What [`Require::locales`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalesOutcome {
    /// Config lines appended, in request order
    pub added: Vec<String>,
    /// Requested names missing from the supported catalog
    pub unsupported: Vec<String>,
    /// Whether the regeneration command ran
    pub regenerated: bool,
}

impl LocalesOutcome {
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || self.regenerated
    }
}

/// What [`Require::default_locale`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefaultLocaleOutcome {
    /// Result of making the locale available
    pub availability: LocalesOutcome,
    /// Whether the default-locale file was rewritten
    pub default_changed: bool,
}

impl DefaultLocaleOutcome {
    pub fn changed(&self) -> bool {
        self.availability.changed() || self.default_changed
    }
}

/// Convergence operations bound to one target.
///
/// ```ignore
/// use sysconf::{LocalTransport, Require, ShellTarget};
///
/// let target = ShellTarget::new(LocalTransport::new());
/// let require = Require::new(&target);
/// require.sysctl("vm.swappiness", "10", true)?;
/// require.default_locale("en_US.UTF-8")?;
/// ```
pub struct Require<'a, T: ?Sized> {
    target: &'a T,
    layout: Layout,
}

impl<'a, T> Require<'a, T>
where
    T: SystemOps + RemoteFs + ?Sized,
{
    pub fn new(target: &'a T) -> Self {
        Self {
            target,
            layout: Layout::default(),
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Require kernel parameter `key` to equal `value`.
    ///
    /// With `persist`, also require `<sysctl_dir>/60-<key>.conf` to hold
    /// `<key> = <value>`, running the reload command if that file changed.
    pub fn sysctl(&self, key: &str, value: &str, persist: bool) -> Result<SysctlOutcome> {
        let mut outcome = SysctlOutcome::default();

        let current = self.target.get_sysctl(key)?;
        if !sysctl_values_equal(&current, value) {
            log::info!("{}: {:?} -> {:?}", key, current, value);
            self.target.set_sysctl(key, value)?;
            outcome.live_updated = true;
        }

        if persist {
            let path = self.layout.sysctl_file(key);
            let contents = sysctl_line(key, value);
            let reload = &self.layout.sysctl_reload_command;
            let watched = watch(
                self.target,
                &path,
                true,
                |t| ensure_file(t, &path, &contents, true),
                |t| t.run_privileged(reload),
            )?;
            outcome.persisted_changed = watched.changed;
        }

        Ok(outcome)
    }

    /// Require the hostname to be `name`. Returns `true` if it was changed.
    pub fn hostname(&self, name: &str) -> Result<bool> {
        let current = self.target.get_hostname()?;
        if current == name {
            return Ok(false);
        }
        log::info!("hostname: {:?} -> {:?}", current, name);
        self.target.set_hostname(name)?;
        Ok(true)
    }

    /// Require every supported locale in `names` to be available.
    ///
    /// Unsupported names are logged as warnings and skipped. The
    /// regeneration command runs at most once, after all appends, and only
    /// if the config file changed.
    pub fn locales<S: AsRef<str>>(&self, names: &[S]) -> Result<LocalesOutcome> {
        let config = &self.layout.locales_config;
        let regenerate = &self.layout.locales_regenerate_command;

        let watched = watch(
            self.target,
            config,
            true,
            |t| {
                let supported = t.supported_locales()?;
                let mut outcome = LocalesOutcome::default();
                for name in names {
                    let name: &str = name.as_ref();
                    match supported.iter().find(|l| l.name == name) {
                        Some(locale) => {
                            let line = locale.config_line();
                            if append_line(t, config, &line, true)? {
                                outcome.added.push(line);
                            }
                        }
                        None => {
                            log::warn!("Unsupported locale name \"{}\"", name);
                            outcome.unsupported.push(name.to_string());
                        }
                    }
                }
                Ok(outcome)
            },
            |t| t.run_privileged(regenerate),
        )?;

        let mut outcome = watched.value;
        outcome.regenerated = watched.changed;
        Ok(outcome)
    }

    /// Require a single locale to be available
    pub fn locale(&self, name: &str) -> Result<LocalesOutcome> {
        self.locales(&[name])
    }

    /// Require `name` to be available and the system default.
    ///
    /// The default-locale file is written even when `name` is unsupported
    /// (a warning has already been logged by then).
    pub fn default_locale(&self, name: &str) -> Result<DefaultLocaleOutcome> {
        let availability = self.locale(name)?;
        let default_changed = ensure_file(
            self.target,
            &self.layout.default_locale_file,
            &default_locale_contents(name),
            true,
        )?;
        Ok(DefaultLocaleOutcome {
            availability,
            default_changed,
        })
    }
}
