//! POSIX shell quoting and command wrapping.
//!
//! Every command sent to a target is a single `sh -c` string, so all
//! arguments built from user input go through [`quote`].

/// Quote a string for safe interpolation into a POSIX shell command.
///
/// Strings made only of characters the shell never interprets are returned
/// bare; everything else is wrapped in single quotes.
pub fn quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if s.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '%' | ':' | '=' | '+' | ',' | '@')
    }) {
        return s.to_string();
    }
    let escaped = s.replace('\'', "'\\''");
    format!("'{}'", escaped)
}

/// Wrap a command for execution, escalating through `sudo -n` when
/// `privileged` is set.
///
/// `sudo -n` never prompts: a missing credential fails fast instead of
/// hanging on a remote terminal.
pub fn wrap(command: &str, privileged: bool) -> Vec<String> {
    let mut argv = Vec::with_capacity(5);
    if privileged {
        argv.push("sudo".to_string());
        argv.push("-n".to_string());
    }
    argv.push("sh".to_string());
    argv.push("-c".to_string());
    argv.push(command.to_string());
    argv
}

/// Join an argv into one shell command line (what `ssh` sends to the remote
/// login shell).
pub fn join(argv: &[String]) -> String {
    argv.iter().map(|a| quote(a)).collect::<Vec<_>>().join(" ")
}

/// `printf '%s' <data>` with `data` quoted
pub fn printf_literal(data: &str) -> String {
    format!("printf '%s' {}", quote(data))
}
