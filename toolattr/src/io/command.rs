//! External command invocation.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use tracing::{debug, error, instrument};

use crate::attr::{AttributeSet, ValidatedAttribute};
use crate::core::value::Value;
use crate::error::{Error, Result};
use crate::io::encoding::Encoding;
use crate::io::pipe::Pipe;
use crate::io::process::Process;

/// Where a standard stream of the child goes.
#[derive(Debug)]
pub enum Redirect {
    /// Connect through a fresh anonymous pipe.
    Pipe(&'static Pipe),
    /// Share the parent's stream.
    Inherit,
    /// Discard (or read nothing).
    Null,
    /// Use an explicit handle, e.g. an open file.
    Handle(Stdio),
}

impl Default for Redirect {
    fn default() -> Self {
        Redirect::Pipe(Pipe::instance())
    }
}

impl Redirect {
    fn into_stdio(self) -> (Stdio, bool) {
        match self {
            Redirect::Pipe(_) => (Stdio::piped(), true),
            Redirect::Inherit => (Stdio::inherit(), false),
            Redirect::Null => (Stdio::null(), false),
            Redirect::Handle(stdio) => (stdio, false),
        }
    }
}

impl From<&'static Pipe> for Redirect {
    fn from(pipe: &'static Pipe) -> Self {
        Redirect::Pipe(pipe)
    }
}

impl From<Stdio> for Redirect {
    fn from(stdio: Stdio) -> Self {
        Redirect::Handle(stdio)
    }
}

impl From<File> for Redirect {
    fn from(file: File) -> Self {
        Redirect::Handle(file.into())
    }
}

/// Per-invocation stream, encoding and environment options.
///
/// Every stream defaults to a pipe; the encoding defaults to the command's own.
#[derive(Debug, Default)]
pub struct InvokeOptions {
    stdin: Redirect,
    stdout: Redirect,
    stderr: Redirect,
    encoding: Option<Option<Encoding>>,
    current_dir: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
    env_clear: bool,
}

impl InvokeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdin(mut self, redirect: impl Into<Redirect>) -> Self {
        self.stdin = redirect.into();
        self
    }

    pub fn stdout(mut self, redirect: impl Into<Redirect>) -> Self {
        self.stdout = redirect.into();
        self
    }

    pub fn stderr(mut self, redirect: impl Into<Redirect>) -> Self {
        self.stderr = redirect.into();
        self
    }

    /// Inherit all three standard streams.
    pub fn inherit_all(self) -> Self {
        self.stdin(Redirect::Inherit)
            .stdout(Redirect::Inherit)
            .stderr(Redirect::Inherit)
    }

    /// Decode and encode streams with `encoding` instead of the command's default.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(Some(encoding));
        self
    }

    /// Use raw bytes even if the command has a default encoding.
    pub fn bytes(mut self) -> Self {
        self.encoding = Some(None);
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Start the child from an empty environment (plus any `env` entries).
    pub fn env_clear(mut self) -> Self {
        self.env_clear = true;
        self
    }
}

static ATTRIBUTES: LazyLock<AttributeSet<ExternalCommand>> = LazyLock::new(|| {
    AttributeSet::new()
        .declare(
            "path",
            ValidatedAttribute::new()
                .with_getter(|cmd: &ExternalCommand| Ok(Value::from(&cmd.path)))
                .with_doc("executable path"),
        )
        .declare(
            "encoding",
            ValidatedAttribute::new()
                .with_getter(|cmd: &ExternalCommand| {
                    Ok(Value::from(cmd.encoding.map(Encoding::name)))
                })
                .with_doc("stdin/stdout/stderr encoding"),
        )
});

/// A command-line program or script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    path: String,
    encoding: Option<Encoding>,
}

impl ExternalCommand {
    /// Fails with a value error if `path` is empty.
    pub fn new(path: impl Into<String>, encoding: Option<Encoding>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(Error::invalid("path", "empty string"));
        }
        Ok(Self { path, encoding })
    }

    /// Like [`new`](Self::new), parsing the encoding from a label such as `"utf-8"`.
    pub fn with_encoding_label(path: impl Into<String>, encoding: Option<&str>) -> Result<Self> {
        let encoding = encoding.map(str::parse).transpose()?;
        Self::new(path, encoding)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    /// Read-only `path` and `encoding` attributes.
    pub fn attributes() -> &'static AttributeSet<ExternalCommand> {
        &ATTRIBUTES
    }

    /// Full argument vector: the program path followed by `args`.
    pub fn argv<I, S>(&self, args: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        std::iter::once(OsString::from(&self.path))
            .chain(args.into_iter().map(|arg| arg.as_ref().to_os_string()))
            .collect()
    }

    /// Spawn the program with `args`.
    ///
    /// Returns as soon as the process exists; nothing is waited for and no pipe
    /// is closed. The returned [`Process`] owns the child and its pipes.
    #[instrument(skip_all, fields(program = %self.path))]
    pub fn invoke<I, S>(&self, args: I, options: InvokeOptions) -> Result<Process>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let InvokeOptions {
            stdin,
            stdout,
            stderr,
            encoding,
            current_dir,
            env,
            env_clear,
        } = options;
        let encoding = encoding.unwrap_or(self.encoding);

        let argv = self.argv(args);
        let (program, rest) = argv
            .split_first()
            .ok_or_else(|| Error::invalid("path", "empty string"))?;
        let mut cmd = Command::new(program);
        cmd.args(rest);

        let (stdin, stdin_piped) = stdin.into_stdio();
        let (stdout, stdout_piped) = stdout.into_stdio();
        let (stderr, stderr_piped) = stderr.into_stdio();
        cmd.stdin(stdin).stdout(stdout).stderr(stderr);

        if env_clear {
            cmd.env_clear();
        }
        cmd.envs(env);
        if let Some(dir) = &current_dir {
            cmd.current_dir(dir);
        }

        debug!(
            stdin_piped,
            stdout_piped,
            stderr_piped,
            encoding = ?encoding.map(Encoding::name),
            "spawning child process"
        );
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                error!(err = %source, "failed to spawn command");
                return Err(Error::Spawn {
                    program: self.path.clone(),
                    source,
                });
            }
        };
        debug!(pid = child.id(), "child process spawned");
        Ok(Process::new(child, encoding))
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encoding {
            Some(encoding) => write!(
                f,
                "ExternalCommand(path={}, encoding={encoding})",
                self.path
            ),
            None => write!(f, "ExternalCommand(path={}, encoding=None)", self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn empty_path_is_rejected() {
        let err = ExternalCommand::new("", None).expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(err.to_string(), "path: empty string");
    }

    #[test]
    fn unknown_encoding_label_is_rejected() {
        let err = ExternalCommand::with_encoding_label("tar", Some("ebcdic")).expect_err("label");
        assert_eq!(err.kind(), ErrorKind::Value);
        let cmd = ExternalCommand::with_encoding_label("tar", Some("UTF8")).expect("utf8");
        assert_eq!(cmd.encoding(), Some(Encoding::utf8()));
    }

    #[test]
    fn argv_starts_with_program() {
        let cmd = ExternalCommand::new("/usr/bin/m4", None).expect("cmd");
        assert_eq!(
            cmd.argv(["--version", "-P"]),
            vec![
                OsString::from("/usr/bin/m4"),
                OsString::from("--version"),
                OsString::from("-P")
            ]
        );
        assert_eq!(cmd.argv(Vec::<&str>::new()).len(), 1);
    }

    #[test]
    fn attributes_are_read_only() {
        let mut cmd = ExternalCommand::new("autoconf", Some(Encoding::utf8())).expect("cmd");
        let attrs = ExternalCommand::attributes();
        assert_eq!(attrs.get(&cmd, "path").expect("path"), Value::from("autoconf"));
        assert_eq!(attrs.get(&cmd, "encoding").expect("enc"), Value::from("UTF-8"));
        assert_eq!(attrs.doc("path"), Some("executable path"));
        let err = attrs.set(&mut cmd, "path", "other").expect_err("read-only");
        assert_eq!(err.kind(), ErrorKind::Unwritable);
        assert_eq!(cmd.path(), "autoconf");

        let raw = ExternalCommand::new("autoconf", None).expect("cmd");
        assert_eq!(attrs.get(&raw, "encoding").expect("enc"), Value::None);
    }

    #[test]
    fn display_shows_path_and_encoding() {
        let cmd = ExternalCommand::new("git", Some(Encoding::utf8())).expect("cmd");
        assert_eq!(cmd.to_string(), "ExternalCommand(path=git, encoding=UTF-8)");
        let cmd = ExternalCommand::new("git", None).expect("cmd");
        assert_eq!(cmd.to_string(), "ExternalCommand(path=git, encoding=None)");
    }

    #[test]
    fn options_default_to_pipes_and_command_encoding() {
        let options = InvokeOptions::new();
        assert!(matches!(options.stdout, Redirect::Pipe(pipe) if pipe.is(Pipe::instance())));
        assert_eq!(options.encoding, None);
        let options = InvokeOptions::new().bytes();
        assert_eq!(options.encoding, Some(None));
        let options = InvokeOptions::new().stdin(Pipe::instance()).inherit_all();
        assert!(matches!(options.stdin, Redirect::Inherit));
    }
}
