//! Run commands on this machine.

use std::process::Command;

use super::{CommandOutput, Privilege, Transport};
use crate::error::{Error, Result};
use crate::shell;

/// Transport that executes commands locally through `sh -c`
#[derive(Debug, Clone, Default)]
pub struct LocalTransport {
    privilege: Privilege,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how privileged commands are escalated
    pub fn with_privilege(mut self, privilege: Privilege) -> Self {
        self.privilege = privilege;
        self
    }
}

impl Transport for LocalTransport {
    fn run(&self, command: &str, privileged: bool) -> Result<CommandOutput> {
        let argv = shell::wrap(command, self.privilege.escalate(privileged));
        log::debug!("local: {}", shell::join(&argv));

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .output()
            .map_err(|source| Error::Spawn {
                program: argv[0].clone(),
                source,
            })?;

        Ok(output.into())
    }

    fn describe(&self) -> String {
        "localhost".to_string()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_output() {
        let transport = LocalTransport::new();
        let out = transport.run("printf 'a\\nb'; echo err >&2; exit 3", false).unwrap();
        assert_eq!(out.stdout_str(), "a\nb");
        assert_eq!(out.stderr_str(), "err\n");
        assert_eq!(out.code, Some(3));
        assert!(!out.success());
    }

    #[test]
    fn test_direct_privilege_skips_sudo() {
        let transport = LocalTransport::new().with_privilege(Privilege::Direct);
        let out = transport.run("echo root-ish", true).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout_str(), "root-ish\n");
    }

    #[test]
    fn test_describe() {
        assert_eq!(LocalTransport::new().describe(), "localhost");
    }
}
