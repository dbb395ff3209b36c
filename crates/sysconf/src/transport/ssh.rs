//! Run commands on a remote host through the system `ssh` client.
//!
//! Authentication, host keys, multiplexing and timeouts are whatever the
//! user's ssh configuration says; extra `-o` options can be passed through.

use std::process::{Command, Stdio};

use super::{CommandOutput, Privilege, Transport};
use crate::error::{Error, Result};
use crate::shell;

/// Transport that executes commands on `host` via `ssh`
#[derive(Debug, Clone)]
pub struct SshTransport {
    host: String,
    user: Option<String>,
    port: Option<u16>,
    options: Vec<String>,
    privilege: Privilege,
}

impl SshTransport {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            user: None,
            port: None,
            options: Vec::new(),
            privilege: Privilege::Sudo,
        }
    }

    pub fn with_user(mut self, user: Option<&str>) -> Self {
        self.user = user.map(str::to_string);
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Extra arguments passed to `ssh` before the destination
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_privilege(mut self, privilege: Privilege) -> Self {
        self.privilege = privilege;
        self
    }

    /// Full `ssh` argument list for one command
    pub fn ssh_args(&self, command: &str, privileged: bool) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(user) = &self.user {
            args.push("-l".to_string());
            args.push(user.clone());
        }
        args.extend(self.options.iter().cloned());
        args.push("--".to_string());
        args.push(self.host.clone());

        // ssh concatenates its trailing arguments into one string for the
        // remote login shell, so the wrapped argv is sent pre-quoted.
        let remote = shell::wrap(command, self.privilege.escalate(privileged));
        args.push(shell::join(&remote));
        args
    }
}

impl Transport for SshTransport {
    fn run(&self, command: &str, privileged: bool) -> Result<CommandOutput> {
        let args = self.ssh_args(command, privileged);
        log::debug!("{}: {}", self.host, args.last().map(String::as_str).unwrap_or_default());

        let output = Command::new("ssh")
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                program: "ssh".to_string(),
                source,
            })?;

        Ok(output.into())
    }

    fn describe(&self) -> String {
        match (&self.user, self.port) {
            (Some(user), Some(port)) => format!("{}@{}:{}", user, self.host, port),
            (Some(user), None) => format!("{}@{}", user, self.host),
            (None, Some(port)) => format!("{}:{}", self.host, port),
            (None, None) => self.host.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_args_minimal() {
        let ssh = SshTransport::new("web1");
        assert_eq!(
            ssh.ssh_args("hostname --fqdn", false),
            vec!["--", "web1", "sh -c 'hostname --fqdn'"]
        );
    }

    #[test]
    fn test_ssh_args_full() {
        let ssh = SshTransport::new("10.0.0.5")
            .with_user(Some("deploy"))
            .with_port(Some(2222))
            .with_options(vec!["-o".to_string(), "BatchMode=yes".to_string()]);
        assert_eq!(
            ssh.ssh_args("sysctl -n -e vm.swappiness", true),
            vec![
                "-p",
                "2222",
                "-l",
                "deploy",
                "-o",
                "BatchMode=yes",
                "--",
                "10.0.0.5",
                "sudo -n sh -c 'sysctl -n -e vm.swappiness'",
            ]
        );
    }

    #[test]
    fn test_ssh_args_direct_privilege() {
        let ssh = SshTransport::new("root-box").with_privilege(Privilege::Direct);
        assert_eq!(
            ssh.ssh_args("hostname web2", true),
            vec!["--", "root-box", "sh -c 'hostname web2'"]
        );
    }

    #[test]
    fn test_describe() {
        assert_eq!(SshTransport::new("web1").describe(), "web1");
        assert_eq!(
            SshTransport::new("web1").with_user(Some("ops")).describe(),
            "ops@web1"
        );
        assert_eq!(
            SshTransport::new("web1").with_port(Some(2200)).describe(),
            "web1:2200"
        );
    }
}
