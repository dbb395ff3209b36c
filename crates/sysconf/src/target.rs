//! A target driven entirely through shell commands.

use crate::error::{Error, Result};
use crate::files::{RemoteFs, ensure_file};
use crate::layout::Layout;
use crate::shell::{printf_literal, quote};
use crate::system::{SupportedLocale, SystemOps, parse_supported_locales};
use crate::transport::Transport;

const PRESENT: &str = "present";
const ABSENT: &str = "absent";

/// Implements [`SystemOps`] and [`RemoteFs`] with standard Linux tools
/// (`sysctl`, `hostname`, `cat`, `printf`) over any [`Transport`].
pub struct ShellTarget<T: Transport> {
    transport: T,
    layout: Layout,
}

impl<T: Transport> ShellTarget<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            layout: Layout::default(),
        }
    }

    /// Use non-default paths for the hostname file and locale catalog
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a command, failing on non-zero exit, and return its stdout
    fn exec(&self, command: &str, privileged: bool) -> Result<Vec<u8>> {
        let output = self.transport.run(command, privileged)?.check(command)?;
        Ok(output.stdout)
    }

    fn exec_text(&self, command: &str, privileged: bool) -> Result<String> {
        let stdout = self.exec(command, privileged)?;
        String::from_utf8(stdout).map_err(|_| Error::InvalidUtf8(format!("output of `{command}`")))
    }
}

impl<T: Transport> SystemOps for ShellTarget<T> {
    fn get_sysctl(&self, key: &str) -> Result<String> {
        let value = self.exec_text(&format!("sysctl -n -e {}", quote(key)), true)?;
        Ok(value.trim().to_string())
    }

    fn set_sysctl(&self, key: &str, value: &str) -> Result<()> {
        log::info!("Setting {} = {} on {}", key, value, self.transport.describe());
        let assignment = format!("{}={}", key, value);
        self.exec(&format!("sysctl -n -e -w {}", quote(&assignment)), true)?;
        Ok(())
    }

    fn get_hostname(&self) -> Result<String> {
        let name = self.exec_text("hostname --fqdn", false)?;
        Ok(name.trim().to_string())
    }

    fn set_hostname(&self, name: &str) -> Result<()> {
        log::info!("Setting hostname of {} to {}", self.transport.describe(), name);
        self.exec(&format!("hostname {}", quote(name)), true)?;
        ensure_file(self, &self.layout.hostname_file, &format!("{}\n", name), true)?;
        Ok(())
    }

    fn supported_locales(&self) -> Result<Vec<SupportedLocale>> {
        let catalog = self.exec_text(&format!("cat {}", quote(&self.layout.supported_locales_file)), false)?;
        Ok(parse_supported_locales(&catalog))
    }

    fn run_privileged(&self, command: &str) -> Result<()> {
        log::info!("Running `{}` on {}", command, self.transport.describe());
        self.exec(command, true)?;
        Ok(())
    }
}

impl<T: Transport> RemoteFs for ShellTarget<T> {
    fn read_file(&self, path: &str, use_sudo: bool) -> Result<Option<Vec<u8>>> {
        let p = quote(path);
        let command = format!(
            "if [ -e {p} ]; then echo {PRESENT}; cat -- {p}; else echo {ABSENT}; fi"
        );
        let stdout = self.exec(&command, use_sudo)?;
        parse_read_output(stdout, &command)
    }

    fn write_file(&self, path: &str, contents: &[u8], use_sudo: bool) -> Result<()> {
        let text = std::str::from_utf8(contents)
            .map_err(|_| Error::InvalidUtf8(format!("contents for {path}")))?;
        self.exec(&format!("{} > {}", printf_literal(text), quote(path)), use_sudo)?;
        Ok(())
    }

    fn append_to_file(&self, path: &str, data: &[u8], use_sudo: bool) -> Result<()> {
        let text = std::str::from_utf8(data)
            .map_err(|_| Error::InvalidUtf8(format!("data for {path}")))?;
        self.exec(&format!("{} >> {}", printf_literal(text), quote(path)), use_sudo)?;
        Ok(())
    }
}

/// Split the presence marker line off a read command's output
fn parse_read_output(mut stdout: Vec<u8>, command: &str) -> Result<Option<Vec<u8>>> {
    let newline = stdout
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| Error::Parse(format!("no presence marker in output of `{command}`")))?;
    let rest = stdout.split_off(newline + 1);
    stdout.truncate(newline);
    if stdout == PRESENT.as_bytes() {
        Ok(Some(rest))
    } else if stdout == ABSENT.as_bytes() {
        Ok(None)
    } else {
        Err(Error::Parse(format!(
            "unexpected presence marker {:?} in output of `{command}`",
            String::from_utf8_lossy(&stdout)
        )))
    }
}
