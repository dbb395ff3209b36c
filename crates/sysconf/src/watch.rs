//! Change detection around a block of operations.
//!
//! A [`ChangeWatch`] fingerprints a file when it begins and again when it
//! finishes. The callback given to [`watch`] runs once, and only if the
//! fingerprints differ: rewriting a file with identical bytes, or appending
//! nothing, never triggers it. The re-check also happens when the watched
//! block fails, so a partial write is never left without its follow-up.

use std::fmt;

use crate::error::Result;
use crate::files::RemoteFs;

/// Content fingerprint of a file, or the fact that it is absent
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Fingerprint {
    Absent,
    Present(blake3::Hash),
}

impl Fingerprint {
    /// Fingerprint `path` on the target
    pub fn of<F: RemoteFs + ?Sized>(fs: &F, path: &str, use_sudo: bool) -> Result<Self> {
        Ok(match fs.read_file(path, use_sudo)? {
            Some(contents) => Fingerprint::Present(blake3::hash(&contents)),
            None => Fingerprint::Absent,
        })
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Absent => write!(f, "absent"),
            Fingerprint::Present(hash) => write!(f, "{}", &hash.to_hex()[..16]),
        }
    }
}

/// An open watch on one file
#[derive(Debug)]
pub struct ChangeWatch {
    path: String,
    use_sudo: bool,
    before: Fingerprint,
}

impl ChangeWatch {
    /// Take the "before" fingerprint of `path`
    pub fn begin<F: RemoteFs + ?Sized>(fs: &F, path: &str, use_sudo: bool) -> Result<Self> {
        let before = Fingerprint::of(fs, path, use_sudo)?;
        log::trace!("watch {}: before {:?}", path, before);
        Ok(Self {
            path: path.to_string(),
            use_sudo,
            before,
        })
    }

    /// Path being watched
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Take the "after" fingerprint and report whether the file changed.
    ///
    /// Consumes the watch so a scope can only be closed once.
    pub fn finish<F: RemoteFs + ?Sized>(self, fs: &F) -> Result<bool> {
        let after = Fingerprint::of(fs, &self.path, self.use_sudo)?;
        log::trace!("watch {}: after {:?}", self.path, after);
        Ok(after != self.before)
    }
}

/// Result of a watched block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watched<R> {
    /// What the block returned
    pub value: R,
    /// Whether the file changed (and so the callback ran)
    pub changed: bool,
}

/// Run `body` with a watch on `path`; if the file changed, run `on_change`
/// once before returning.
///
/// The file is re-checked whether or not `body` succeeds. If `body` fails
/// after changing the file, `on_change` still runs and the body's error is
/// returned; a failure of the re-check or the callback on that path is only
/// logged.
pub fn watch<T, R>(
    target: &T,
    path: &str,
    use_sudo: bool,
    body: impl FnOnce(&T) -> Result<R>,
    on_change: impl FnOnce(&T) -> Result<()>,
) -> Result<Watched<R>>
where
    T: RemoteFs + ?Sized,
{
    let guard = ChangeWatch::begin(target, path, use_sudo)?;
    let value = match body(target) {
        Ok(value) => value,
        Err(e) => {
            match guard.finish(target) {
                Ok(true) => {
                    log::info!("{} changed before a failure", path);
                    if let Err(cb) = on_change(target) {
                        log::error!("change callback for {} failed: {}", path, cb);
                    }
                }
                Ok(false) => {}
                Err(check) => log::error!("could not re-check {}: {}", path, check),
            }
            return Err(e);
        }
    };
    let changed = guard.finish(target)?;
    if changed {
        log::info!("{} changed", path);
        on_change(target)?;
    }
    Ok(Watched { value, changed })
}
