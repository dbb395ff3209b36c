use thiserror::Error;

/// Errors raised while inspecting or converging a target.
///
/// Convergence operations never translate these: whatever the transport or
/// file primitives return is handed back to the caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport program (`sh`, `ssh`) could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to launch
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// A command ran but exited unsuccessfully
    #[error("command failed{}: {command}: {stderr}", exit_suffix(.code))]
    CommandFailed {
        /// The command as sent to the target
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Trimmed standard error
        stderr: String,
    },

    /// Command output or file contents were expected to be text
    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(String),

    /// Command output could not be interpreted
    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Returns true if the failure looks like a missing sudo credential
    /// (`sudo -n` refuses to prompt).
    pub fn is_sudo_denied(&self) -> bool {
        match self {
            Error::CommandFailed { stderr, .. } => {
                stderr.contains("a password is required") || stderr.contains("a terminal is required")
            }
            _ => false,
        }
    }

    /// Returns true if the SSH client itself failed (exit 255) rather than
    /// the remote command.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Error::CommandFailed { code: Some(255), .. })
    }
}

fn exit_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" (exit {c})")).unwrap_or_default()
}

/// Result type for sysconf operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = Error::CommandFailed {
            command: "sysctl -n -e kernel.foo".to_string(),
            code: Some(1),
            stderr: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command failed (exit 1): sysctl -n -e kernel.foo: permission denied"
        );

        let signalled = Error::CommandFailed {
            command: "true".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(signalled.to_string(), "command failed: true: ");
    }

    #[test]
    fn test_error_classification() {
        let sudo = Error::CommandFailed {
            command: "sudo -n sh -c true".to_string(),
            code: Some(1),
            stderr: "sudo: a password is required".to_string(),
        };
        assert!(sudo.is_sudo_denied());
        assert!(!sudo.is_connection_failure());

        let ssh = Error::CommandFailed {
            command: "hostname --fqdn".to_string(),
            code: Some(255),
            stderr: "ssh: connect to host web1 port 22: Connection refused".to_string(),
        };
        assert!(ssh.is_connection_failure());
        assert!(!ssh.is_sudo_denied());

        assert!(!Error::Parse("x".to_string()).is_sudo_denied());
    }
}
