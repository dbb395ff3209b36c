//! Command transports.
//!
//! A transport runs one shell command on the target and reports what
//! happened. It knows nothing about sysctl, locales or files; that lives in
//! [`ShellTarget`](crate::target::ShellTarget).

use std::process::Output;

use crate::error::{Error, Result};

pub mod local;
pub mod ssh;

pub use local::LocalTransport;
pub use ssh::SshTransport;

/// Output from a command run on the target
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code, `None` if terminated by a signal
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            code: Some(0),
        }
    }

    /// Whether the command exited with status 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Turn a non-zero exit into [`Error::CommandFailed`]
    pub fn check(self, command: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::CommandFailed {
                command: command.to_string(),
                code: self.code,
                stderr: self.stderr_str().trim().to_string(),
            })
        }
    }
}

/// Executes shell commands on a target machine.
///
/// Implementations must run `command` through a POSIX shell and, when
/// `privileged` is set, with elevated privileges. A non-zero exit is not an
/// error at this level: callers decide via [`CommandOutput::check`].
pub trait Transport: Send + Sync {
    /// Run a shell command on the target
    fn run(&self, command: &str, privileged: bool) -> Result<CommandOutput>;

    /// Human-readable name of the target (for logs and UI)
    fn describe(&self) -> String;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn run(&self, command: &str, privileged: bool) -> Result<CommandOutput> {
        (**self).run(command, privileged)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// How privileged commands are escalated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privilege {
    /// Prefix with `sudo -n`
    #[default]
    Sudo,
    /// Already running as root; run privileged commands as-is
    Direct,
}

impl Privilege {
    /// Whether a privileged command needs the sudo wrapper under this mode
    pub fn escalate(self, privileged: bool) -> bool {
        privileged && self == Privilege::Sudo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_success() {
        let out = CommandOutput::ok("web1\n").check("hostname --fqdn").unwrap();
        assert_eq!(out.stdout_str(), "web1\n");
    }

    #[test]
    fn test_check_failure() {
        let out = CommandOutput {
            stdout: Vec::new(),
            stderr: b"sysctl: permission denied on key 'kernel.foo'\n".to_vec(),
            code: Some(255),
        };
        match out.check("sysctl -w kernel.foo=1") {
            Err(Error::CommandFailed { command, code, stderr }) => {
                assert_eq!(command, "sysctl -w kernel.foo=1");
                assert_eq!(code, Some(255));
                assert_eq!(stderr, "sysctl: permission denied on key 'kernel.foo'");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_privilege_escalate() {
        assert!(Privilege::Sudo.escalate(true));
        assert!(!Privilege::Sudo.escalate(false));
        assert!(!Privilege::Direct.escalate(true));
    }
}
