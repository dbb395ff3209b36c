//! Remote file primitives and their idempotent wrappers.
//!
//! Targets implement the three raw operations of [`RemoteFs`];
//! [`ensure_file`] and [`append_line`] only touch the target when the
//! content actually has to change.

use crate::error::Result;

/// Raw file access on a target
pub trait RemoteFs {
    /// Read a file. `Ok(None)` if it does not exist.
    fn read_file(&self, path: &str, use_sudo: bool) -> Result<Option<Vec<u8>>>;

    /// Create or replace a file with `contents`
    fn write_file(&self, path: &str, contents: &[u8], use_sudo: bool) -> Result<()>;

    /// Append `data` verbatim, creating the file if needed
    fn append_to_file(&self, path: &str, data: &[u8], use_sudo: bool) -> Result<()>;
}

/// Make `path` contain exactly `contents`.
///
/// Returns `true` if the file was written.
pub fn ensure_file<F: RemoteFs + ?Sized>(
    fs: &F,
    path: &str,
    contents: &str,
    use_sudo: bool,
) -> Result<bool> {
    let current = fs.read_file(path, use_sudo)?;
    if current.as_deref() == Some(contents.as_bytes()) {
        log::debug!("{} already up to date", path);
        return Ok(false);
    }

    log::info!("Writing {}", path);
    fs.write_file(path, contents.as_bytes(), use_sudo)?;
    Ok(true)
}

/// Append `line` to `path` unless a line equal to it is already present.
///
/// A missing trailing newline on the existing content is added first so the
/// new entry always lands on its own line. Returns `true` if appended.
pub fn append_line<F: RemoteFs + ?Sized>(
    fs: &F,
    path: &str,
    line: &str,
    use_sudo: bool,
) -> Result<bool> {
    let current = fs.read_file(path, use_sudo)?.unwrap_or_default();
    if contains_line(&current, line) {
        log::debug!("{} already contains {:?}", path, line);
        return Ok(false);
    }

    let mut data = Vec::with_capacity(line.len() + 2);
    if !current.is_empty() && !current.ends_with(b"\n") {
        data.push(b'\n');
    }
    data.extend_from_slice(line.as_bytes());
    data.push(b'\n');

    log::info!("Appending {:?} to {}", line, path);
    fs.append_to_file(path, &data, use_sudo)?;
    Ok(true)
}

/// Whether `content` has a line exactly equal to `line` (ignoring a `\r`
/// before the newline)
pub fn contains_line(content: &[u8], line: &str) -> bool {
    content
        .split(|b| *b == b'\n')
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .any(|l| l == line.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTarget;

    #[test]
    fn test_ensure_file_creates_then_noop() {
        let target = MemoryTarget::new();
        assert!(ensure_file(&target, "/etc/default/locale", "LANG=\"C\"\n", true).unwrap());
        assert!(!ensure_file(&target, "/etc/default/locale", "LANG=\"C\"\n", true).unwrap());
        assert_eq!(target.file("/etc/default/locale").as_deref(), Some("LANG=\"C\"\n"));
        assert_eq!(target.write_count(), 1);
    }

    #[test]
    fn test_ensure_file_replaces_different_content() {
        let target = MemoryTarget::new().with_file("/etc/hostname", "old\n");
        assert!(ensure_file(&target, "/etc/hostname", "new\n", true).unwrap());
        assert_eq!(target.file("/etc/hostname").as_deref(), Some("new\n"));
    }

    #[test]
    fn test_append_line_to_missing_file() {
        let target = MemoryTarget::new();
        assert!(append_line(&target, "/tmp/local", "en_US.UTF-8 UTF-8", true).unwrap());
        assert_eq!(target.file("/tmp/local").as_deref(), Some("en_US.UTF-8 UTF-8\n"));
    }

    #[test]
    fn test_append_line_no_duplicate() {
        let target = MemoryTarget::new().with_file("/tmp/local", "en_US.UTF-8 UTF-8\n");
        assert!(!append_line(&target, "/tmp/local", "en_US.UTF-8 UTF-8", true).unwrap());
        assert_eq!(target.write_count(), 0);
    }

    #[test]
    fn test_append_line_adds_missing_newline() {
        let target = MemoryTarget::new().with_file("/tmp/local", "de_DE.UTF-8 UTF-8");
        assert!(append_line(&target, "/tmp/local", "fr_FR.UTF-8 UTF-8", true).unwrap());
        assert_eq!(
            target.file("/tmp/local").as_deref(),
            Some("de_DE.UTF-8 UTF-8\nfr_FR.UTF-8 UTF-8\n")
        );
    }

    #[test]
    fn test_contains_line() {
        let content = b"# comment\nen_US.UTF-8 UTF-8\r\nfr_FR ISO-8859-1\n";
        assert!(contains_line(content, "en_US.UTF-8 UTF-8"));
        assert!(contains_line(content, "fr_FR ISO-8859-1"));
        assert!(!contains_line(content, "fr_FR"));
        assert!(!contains_line(b"", "x"));
    }
}
