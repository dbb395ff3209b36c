//! Well-known paths and commands on the target.
//!
//! Defaults match Debian and Ubuntu. Every field can be overridden (the CLI
//! reads overrides from the `[layout]` table of a host manifest).

use serde::{Deserialize, Serialize};

/// Paths and commands used by the convergence operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Directory holding persisted kernel parameters
    pub sysctl_dir: String,
    /// Run (privileged) after a persisted kernel parameter file changes
    pub sysctl_reload_command: String,
    /// File listing the locales to generate, one `name charset` per line
    pub locales_config: String,
    /// Run (privileged) after the locales config file changes
    pub locales_regenerate_command: String,
    /// Catalog of every locale the system can generate
    pub supported_locales_file: String,
    /// System-wide default locale file
    pub default_locale_file: String,
    /// Persistent hostname file
    pub hostname_file: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            sysctl_dir: "/etc/sysctl.d".to_string(),
            sysctl_reload_command: "service procps start".to_string(),
            locales_config: "/var/lib/locales/supported.d/local".to_string(),
            locales_regenerate_command: "dpkg-reconfigure locales".to_string(),
            supported_locales_file: "/usr/share/i18n/SUPPORTED".to_string(),
            default_locale_file: "/etc/default/locale".to_string(),
            hostname_file: "/etc/hostname".to_string(),
        }
    }
}

impl Layout {
    /// Path of the file that persists kernel parameter `key`.
    ///
    /// `/` separators become `.` so `net/ipv4/ip_forward` and
    /// `net.ipv4.ip_forward` share one file.
    pub fn sysctl_file(&self, key: &str) -> String {
        let name: String = key
            .trim_matches('/')
            .chars()
            .map(|c| match c {
                '/' => '.',
                c if c.is_whitespace() || c.is_control() => '_',
                c => c,
            })
            .collect();
        format!("{}/60-{}.conf", self.sysctl_dir.trim_end_matches('/'), name)
    }
}

/// Contents of a persisted kernel parameter file
pub fn sysctl_line(key: &str, value: &str) -> String {
    format!("{} = {}\n", key, value)
}

/// Contents of the default-locale file
pub fn default_locale_contents(name: &str) -> String {
    format!("LANG=\"{}\"\n", name)
}
