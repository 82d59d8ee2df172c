//! Shell family detection, argument quoting and child construction.

use std::borrow::Cow;
use std::path::PathBuf;
use std::process::Command;

/// Shell family used to interpret a built command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellKind {
    Unix,
    Windows,
}

impl ShellKind {
    /// Shell family of the platform this binary was built for.
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Quote `value` so the shell reads it back as exactly one word.
    pub fn quote<'a>(self, value: &'a str) -> Cow<'a, str> {
        match self {
            Self::Unix => shell_escape::unix::escape(Cow::Borrowed(value)),
            Self::Windows => quote_for_cmd(value),
        }
    }

    /// Location of the interpreter, if it can be found on this host.
    pub fn interpreter(self) -> Option<PathBuf> {
        let path = match self {
            Self::Unix => PathBuf::from("/bin/sh"),
            Self::Windows => std::env::var_os("ComSpec")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(r"C:\Windows\System32\cmd.exe")),
        };
        path.is_file().then_some(path)
    }

    /// A child that runs `command_line` through this shell.
    ///
    /// Stdio is left at the [`Command`] defaults; strategies configure it.
    pub fn command(self, command_line: &str) -> Command {
        match self {
            Self::Unix => {
                let mut command = Command::new("/bin/sh");
                command.arg("-c").arg(command_line);
                command
            }
            Self::Windows => {
                let program = self
                    .interpreter()
                    .unwrap_or_else(|| PathBuf::from("cmd.exe"));
                let mut command = Command::new(program);
                command.arg("/C");
                #[cfg(windows)]
                {
                    use std::os::windows::process::CommandExt;
                    // cmd.exe does its own parsing; the line is already quoted.
                    command.raw_arg(command_line);
                }
                #[cfg(not(windows))]
                command.arg(command_line);
                command
            }
        }
    }
}

/// `cmd.exe` quoting: anything beyond a plain word is wrapped in double quotes,
/// and `"`, `%` and `!` become spaces since cmd expands or ends quotes on them
/// even inside a quoted string.
fn quote_for_cmd(value: &str) -> Cow<'_, str> {
    let plain =
        |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '\\' | ':');
    if !value.is_empty() && value.chars().all(plain) {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    quoted.extend(value.chars().map(|c| match c {
        '"' | '%' | '!' => ' ',
        other => other,
    }));
    // A trailing backslash would escape the closing quote for the callee.
    let trailing = value.chars().rev().take_while(|c| *c == '\\').count();
    quoted.extend(std::iter::repeat_n('\\', trailing));
    quoted.push('"');
    Cow::Owned(quoted)
}

impl Default for ShellKind {
    fn default() -> Self {
        Self::host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_quote_leaves_plain_words_alone() {
        assert_eq!(ShellKind::Unix.quote("echo"), "echo");
        assert_eq!(ShellKind::Unix.quote("--flag=value"), "--flag=value");
    }

    #[test]
    fn unix_quote_wraps_metacharacters() {
        assert_eq!(ShellKind::Unix.quote("hello world"), "'hello world'");
        assert_eq!(ShellKind::Unix.quote("a;b"), "'a;b'");
        assert_eq!(ShellKind::Unix.quote(""), "''");
    }

    #[test]
    fn cmd_quote_wraps_operators_and_neutralizes_expansion() {
        assert_eq!(ShellKind::Windows.quote("dir"), "dir");
        assert_eq!(ShellKind::Windows.quote(r"C:\tmp\a.txt"), r"C:\tmp\a.txt");
        assert_eq!(ShellKind::Windows.quote("x|y"), "\"x|y\"");
        assert_eq!(ShellKind::Windows.quote("a&del x"), "\"a&del x\"");
        assert_eq!(ShellKind::Windows.quote("%PATH%"), "\" PATH \"");
        assert_eq!(ShellKind::Windows.quote("say \"hi\"!"), "\"say  hi  \"");
        assert_eq!(ShellKind::Windows.quote(""), "\"\"");
        assert_eq!(ShellKind::Windows.quote(r"C:\my dir\"), r#""C:\my dir\\""#);
    }

    #[cfg(unix)]
    #[test]
    fn unix_interpreter_exists() {
        assert!(ShellKind::host().interpreter().is_some());
    }
}
