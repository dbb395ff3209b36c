//! # sysconf
//!
//! Idempotent management of Linux system settings over a shell transport.
//!
//! Every operation follows the same shape: read the current value, compare
//! it with the requested one, change the target only on mismatch, and run a
//! follow-up command (reload, regenerate) only if a tracked file changed.
//!
//! ## Layers
//!
//! - [`Transport`]: runs one shell command, locally ([`LocalTransport`]) or
//!   over `ssh` ([`SshTransport`]), optionally through `sudo -n`
//! - [`SystemOps`] / [`RemoteFs`]: system accessors and raw file access;
//!   [`ShellTarget`] implements both over any transport
//! - [`files`] and [`watch`]: idempotent file writes and change detection
//! - [`Require`]: `sysctl`, `hostname`, `locales`, `locale`, `default_locale`
//!
//! ## Example
//!
//! ```no_run
//! use sysconf::{Require, ShellTarget, SshTransport};
//!
//! let target = ShellTarget::new(SshTransport::new("web1").with_user(Some("deploy")));
//! let require = Require::new(&target);
//!
//! require.sysctl("net.ipv4.ip_forward", "1", true)?;
//! require.hostname("web1")?;
//! let outcome = require.locales(&["en_US.UTF-8", "fr_FR.UTF-8"])?;
//! for name in &outcome.unsupported {
//!     eprintln!("skipped {name}");
//! }
//! # Ok::<(), sysconf::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod files;
pub mod layout;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod require;
pub mod shell;
pub mod system;
pub mod target;
pub mod transport;
pub mod watch;

pub use error::{Error, Result};
pub use files::{RemoteFs, append_line, ensure_file};
pub use layout::Layout;
pub use require::{DefaultLocaleOutcome, LocalesOutcome, Require, SysctlOutcome};
pub use system::{SupportedLocale, SystemOps};
pub use target::ShellTarget;
pub use transport::{CommandOutput, LocalTransport, Privilege, SshTransport, Transport};
pub use watch::{ChangeWatch, Fingerprint, Watched};

/// Everything the convergence operations need from a host
pub trait Target: SystemOps + RemoteFs {}

impl<T: SystemOps + RemoteFs + ?Sized> Target for T {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// End to end against the local shell, confined to a temp directory
    #[test]
    fn test_local_file_convergence() {
        let dir = tempfile::tempdir().unwrap();
        let target = ShellTarget::new(LocalTransport::new().with_privilege(Privilege::Direct));
        let path = dir.path().join("locales").display().to_string();

        assert_eq!(target.read_file(&path, false).unwrap(), None);

        let watched = watch::watch(
            &target,
            &path,
            false,
            |t| {
                append_line(t, &path, "en_US.UTF-8 UTF-8", false)?;
                append_line(t, &path, "it's quoted $HOME", false)?;
                append_line(t, &path, "en_US.UTF-8 UTF-8", false)
            },
            |_| Ok(()),
        )
        .unwrap();
        assert!(watched.changed);
        assert!(!watched.value);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "en_US.UTF-8 UTF-8\nit's quoted $HOME\n");

        assert!(!ensure_file(&target, &path, &contents, false).unwrap());
        assert!(ensure_file(&target, &path, "replaced\n", false).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "replaced\n");
    }

    #[test]
    fn test_local_default_locale_with_custom_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("SUPPORTED"), "en_US.UTF-8 UTF-8\nde_DE.UTF-8 UTF-8\n").unwrap();
        let marker = root.join("regenerated");

        let layout = Layout {
            supported_locales_file: root.join("SUPPORTED").display().to_string(),
            locales_config: root.join("local").display().to_string(),
            default_locale_file: root.join("default-locale").display().to_string(),
            locales_regenerate_command: format!("echo run >> {}", shell::quote(&marker.display().to_string())),
            ..Default::default()
        };
        let target = ShellTarget::new(LocalTransport::new().with_privilege(Privilege::Direct))
            .with_layout(layout.clone());
        let require = Require::new(&target).with_layout(layout);

        let outcome = require.default_locale("de_DE.UTF-8").unwrap();
        assert!(outcome.default_changed);
        assert_eq!(outcome.availability.added, vec!["de_DE.UTF-8 UTF-8"]);
        assert_eq!(
            std::fs::read_to_string(root.join("default-locale")).unwrap(),
            "LANG=\"de_DE.UTF-8\"\n"
        );

        assert!(!require.default_locale("de_DE.UTF-8").unwrap().changed());
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "run\n");
    }
}
