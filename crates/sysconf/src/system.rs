//! System value accessors.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A locale the target knows how to generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLocale {
    /// Locale name, e.g. `en_US.UTF-8`
    pub name: String,
    /// Character set, e.g. `UTF-8`
    pub charset: String,
}

impl SupportedLocale {
    pub fn new(name: &str, charset: &str) -> Self {
        Self {
            name: name.to_string(),
            charset: charset.to_string(),
        }
    }

    /// The `name charset` line used in the locales config file
    pub fn config_line(&self) -> String {
        format!("{} {}", self.name, self.charset)
    }
}

/// Get/set primitives for live system values
pub trait SystemOps {
    /// Current value of kernel parameter `key`
    fn get_sysctl(&self, key: &str) -> Result<String>;

    /// Set kernel parameter `key` for the running kernel
    fn set_sysctl(&self, key: &str, value: &str) -> Result<()>;

    /// Current hostname
    fn get_hostname(&self) -> Result<String>;

    /// Change the hostname
    fn set_hostname(&self, name: &str) -> Result<()>;

    /// Every locale the target can generate, in catalog order
    fn supported_locales(&self) -> Result<Vec<SupportedLocale>>;

    /// Run a command with elevated privileges, for its side effects
    fn run_privileged(&self, command: &str) -> Result<()>;
}

/// Parse a locale catalog (`/usr/share/i18n/SUPPORTED` format).
///
/// One `name charset` pair per line; blank lines, `#` comments and lines
/// without a charset are skipped.
pub fn parse_supported_locales(catalog: &str) -> Vec<SupportedLocale> {
    catalog
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(name), Some(charset)) => Some(SupportedLocale::new(name, charset)),
                _ => None,
            }
        })
        .collect()
}

/// Compare kernel parameter values the way `sysctl` prints them: runs of
/// whitespace (tabs between multi-valued fields) are equivalent.
pub fn sysctl_values_equal(current: &str, desired: &str) -> bool {
    current.split_whitespace().eq(desired.split_whitespace())
}
