//! In-memory target for tests.
//!
//! Holds kernel parameters, a hostname, a locale catalog and a file map,
//! and counts every mutation so tests can assert idempotence.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::files::RemoteFs;
use crate::system::{SupportedLocale, SystemOps};

#[derive(Debug, Default)]
struct State {
    sysctl: HashMap<String, String>,
    hostname: String,
    supported: Vec<SupportedLocale>,
    files: BTreeMap<String, Vec<u8>>,
    sysctl_sets: usize,
    hostname_sets: usize,
    writes: usize,
    privileged: Vec<String>,
}

/// A fake target backed by plain data structures
#[derive(Debug, Default)]
pub struct MemoryTarget {
    state: Mutex<State>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sysctl(self, key: &str, value: &str) -> Self {
        self.lock().sysctl.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_hostname(self, name: &str) -> Self {
        self.lock().hostname = name.to_string();
        self
    }

    pub fn with_supported(self, name: &str, charset: &str) -> Self {
        self.lock().supported.push(SupportedLocale::new(name, charset));
        self
    }

    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.lock().files.insert(path.to_string(), contents.as_bytes().to_vec());
        self
    }

    /// Current contents of a file, if present
    pub fn file(&self, path: &str) -> Option<String> {
        self.lock()
            .files
            .get(path)
            .map(|c| String::from_utf8_lossy(c).to_string())
    }

    /// Live value of a kernel parameter
    pub fn sysctl(&self, key: &str) -> Option<String> {
        self.lock().sysctl.get(key).cloned()
    }

    pub fn hostname(&self) -> String {
        self.lock().hostname.clone()
    }

    /// Number of `set_sysctl` calls
    pub fn sysctl_set_count(&self) -> usize {
        self.lock().sysctl_sets
    }

    /// Number of `set_hostname` calls
    pub fn hostname_set_count(&self) -> usize {
        self.lock().hostname_sets
    }

    /// Number of file writes and appends
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Privileged commands run so far, in order
    pub fn privileged_commands(&self) -> Vec<String> {
        self.lock().privileged.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A test that panicked while holding the lock already failed
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SystemOps for MemoryTarget {
    fn get_sysctl(&self, key: &str) -> Result<String> {
        Ok(self.lock().sysctl.get(key).cloned().unwrap_or_default())
    }

    fn set_sysctl(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.lock();
        state.sysctl_sets += 1;
        state.sysctl.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_hostname(&self) -> Result<String> {
        Ok(self.lock().hostname.clone())
    }

    fn set_hostname(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.hostname_sets += 1;
        state.hostname = name.to_string();
        Ok(())
    }

    fn supported_locales(&self) -> Result<Vec<SupportedLocale>> {
        Ok(self.lock().supported.clone())
    }

    fn run_privileged(&self, command: &str) -> Result<()> {
        if command.is_empty() {
            return Err(Error::Parse("empty command".to_string()));
        }
        self.lock().privileged.push(command.to_string());
        Ok(())
    }
}

impl RemoteFs for MemoryTarget {
    fn read_file(&self, path: &str, _use_sudo: bool) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().files.get(path).cloned())
    }

    fn write_file(&self, path: &str, contents: &[u8], _use_sudo: bool) -> Result<()> {
        let mut state = self.lock();
        state.writes += 1;
        state.files.insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    fn append_to_file(&self, path: &str, data: &[u8], _use_sudo: bool) -> Result<()> {
        let mut state = self.lock();
        state.writes += 1;
        state
            .files
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }
}
