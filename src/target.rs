//! Resolve which host to manage and open a shell target for it

use anyhow::{Result, bail};
use std::sync::Arc;

use sysconf::{Layout, LocalTransport, Privilege, ShellTarget, SshTransport, Target, Transport};

use crate::cli::ConnectionArgs;
use crate::config::{Manifest, TargetConfig};

/// A target shared between the resources of one plan
pub type SharedTarget = Arc<dyn Target + Send + Sync>;

/// Connection settings after merging the manifest with command-line flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// `None` for this machine
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub sudo: bool,
    pub ssh_options: Vec<String>,
}

impl Connection {
    /// Command-line flags win over the manifest's `[target]` table
    pub fn resolve(args: &ConnectionArgs, config: Option<&TargetConfig>) -> Self {
        let config = config.cloned().unwrap_or_default();
        let host = args.host.clone().or(config.host).filter(|h| !is_local(h));
        Self {
            host,
            user: args.user.clone().or(config.user),
            port: args.port.or(config.port),
            sudo: config.sudo && !args.no_sudo,
            ssh_options: config.ssh_options,
        }
    }

    pub fn privilege(&self) -> Privilege {
        if self.sudo { Privilege::Sudo } else { Privilege::Direct }
    }

    /// Build the transport this connection describes
    pub fn transport(&self) -> Result<Box<dyn Transport>> {
        match &self.host {
            None => {
                if self.user.is_some() || self.port.is_some() {
                    bail!("--user and --port need a remote --host");
                }
                Ok(Box::new(LocalTransport::new().with_privilege(self.privilege())))
            }
            Some(host) => Ok(Box::new(
                SshTransport::new(host)
                    .with_user(self.user.as_deref())
                    .with_port(self.port)
                    .with_options(self.ssh_options.clone())
                    .with_privilege(self.privilege()),
            )),
        }
    }
}

fn is_local(host: &str) -> bool {
    host.is_empty() || host == "localhost" || host == "local"
}

/// Everything a command needs: the manifest, its layout, and a live target
pub struct Session {
    pub manifest: Manifest,
    pub target: SharedTarget,
    /// Human-readable name of the target (e.g. `deploy@web1:22`)
    pub name: String,
}

impl Session {
    pub fn open(args: &ConnectionArgs) -> Result<Self> {
        let manifest = Manifest::discover(args.manifest.as_deref())?;
        let connection = Connection::resolve(args, manifest.target.as_ref());
        let transport = connection.transport()?;
        let name = transport.describe();
        log::debug!("Managing {} (sudo: {})", name, connection.sudo);

        let target = ShellTarget::new(transport).with_layout(manifest.layout.clone());
        Ok(Self {
            manifest,
            target: Arc::new(target),
            name,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.manifest.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ConnectionArgs {
        ConnectionArgs::default()
    }

    #[test]
    fn test_resolve_defaults_to_local_with_sudo() {
        let conn = Connection::resolve(&args(), None);
        assert_eq!(conn.host, None);
        assert!(conn.sudo);
        assert_eq!(conn.privilege(), Privilege::Sudo);
    }

    #[test]
    fn test_flags_override_manifest() {
        let config = TargetConfig {
            host: Some("web1".into()),
            user: Some("deploy".into()),
            port: Some(22),
            sudo: true,
            ssh_options: vec!["-oBatchMode=yes".into()],
        };
        let cli = ConnectionArgs {
            host: Some("web2".into()),
            port: Some(2222),
            no_sudo: true,
            ..args()
        };
        let conn = Connection::resolve(&cli, Some(&config));
        assert_eq!(conn.host.as_deref(), Some("web2"));
        assert_eq!(conn.user.as_deref(), Some("deploy"));
        assert_eq!(conn.port, Some(2222));
        assert!(!conn.sudo);
        assert_eq!(conn.ssh_options, vec!["-oBatchMode=yes"]);
    }

    #[test]
    fn test_manifest_can_disable_sudo() {
        let config = TargetConfig {
            sudo: false,
            ..Default::default()
        };
        let conn = Connection::resolve(&args(), Some(&config));
        assert_eq!(conn.privilege(), Privilege::Direct);
    }

    #[test]
    fn test_localhost_means_local() {
        let cli = ConnectionArgs {
            host: Some("localhost".into()),
            ..args()
        };
        let conn = Connection::resolve(&cli, None);
        assert_eq!(conn.host, None);
        assert_eq!(conn.transport().unwrap().describe(), "localhost");
    }

    #[test]
    fn test_remote_transport_description() {
        let cli = ConnectionArgs {
            host: Some("web1".into()),
            user: Some("deploy".into()),
            ..args()
        };
        let conn = Connection::resolve(&cli, None);
        assert!(conn.transport().unwrap().describe().contains("deploy@web1"));
    }

    #[test]
    fn test_user_without_host_rejected() {
        let cli = ConnectionArgs {
            user: Some("deploy".into()),
            ..args()
        };
        assert!(Connection::resolve(&cli, None).transport().is_err());
    }
}
