//! Host manifest - the desired state of one machine
//!
//! ```toml
//! hostname = "web1.example.com"
//! locales = ["en_US.UTF-8", "fr_FR.UTF-8"]
//! default_locale = "en_US.UTF-8"
//!
//! [target]
//! host = "web1.example.com"
//! user = "deploy"
//!
//! [sysctl]
//! persist = true
//!
//! [sysctl.params]
//! "net.ipv4.ip_forward" = 1
//! "net.ipv4.tcp_rmem" = "4096 87380 6291456"
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use sysconf::Layout;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default)]
    pub default_locale: Option<String>,
    #[serde(default)]
    pub target: Option<TargetConfig>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub sysctl: SysctlConfig,
}

/// How to reach the host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Absent or "localhost" means this machine
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Escalate privileged commands with `sudo -n`
    #[serde(default = "default_true")]
    pub sudo: bool,
    /// Extra arguments passed to ssh before the host
    #[serde(default)]
    pub ssh_options: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: None,
            user: None,
            port: None,
            sudo: true,
            ssh_options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SysctlConfig {
    /// Also write each parameter to the sysctl directory
    #[serde(default = "default_true")]
    pub persist: bool,
    #[serde(default)]
    pub params: BTreeMap<String, SysctlValue>,
}

impl Default for SysctlConfig {
    fn default() -> Self {
        Self {
            persist: true,
            params: BTreeMap::new(),
        }
    }
}

/// A kernel parameter value as written in TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SysctlValue {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for SysctlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Bool(b) => write!(f, "{}", u8::from(*b)),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Manifest {
    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let manifest: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid manifest {}", path.display()))?;
        manifest
            .validate()
            .with_context(|| format!("Invalid manifest {}", path.display()))?;
        Ok(manifest)
    }

    /// Load `path` if given, else the default manifest if it exists, else an
    /// empty manifest
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default = crate::paths::default_manifest()?;
        if default.exists() {
            log::debug!("Using manifest {}", default.display());
            Self::load(&default)
        } else {
            log::debug!("No manifest at {}", default.display());
            Ok(Self::default())
        }
    }

    /// Check values the target would reject or misinterpret
    pub fn validate(&self) -> Result<()> {
        for (key, value) in &self.sysctl.params {
            validate_sysctl_key(key)?;
            validate_sysctl_value(key, &value.to_string())?;
        }
        if let Some(name) = &self.hostname {
            validate_hostname(name)?;
        }
        for name in self.locales.iter().chain(&self.default_locale) {
            validate_locale_name(name)?;
        }
        Ok(())
    }

    /// Sysctl parameters as `(key, value)` strings, in key order
    pub fn sysctl_params(&self) -> impl Iterator<Item = (&str, String)> {
        self.sysctl
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_string()))
    }

    /// True if the manifest doesn't manage anything
    pub fn is_empty(&self) -> bool {
        self.hostname.is_none()
            && self.locales.is_empty()
            && self.default_locale.is_none()
            && self.sysctl.params.is_empty()
    }
}

pub fn validate_sysctl_key(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("sysctl key must not be empty");
    }
    if key.contains('=') || key.chars().any(char::is_whitespace) {
        bail!("Invalid sysctl key {:?}", key);
    }
    Ok(())
}

/// The persisted file holds exactly one `<key> = <value>` line
pub fn validate_sysctl_value(key: &str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        bail!("sysctl {}: value must be a single line", key);
    }
    Ok(())
}

pub fn validate_hostname(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        bail!("Invalid hostname {:?}", name);
    }
    Ok(())
}

pub fn validate_locale_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        bail!("Invalid locale name {:?}", name);
    }
    Ok(())
}
