//! Handle to a spawned child process.
//!
//! The handle never waits or kills on its own. Callers that redirect both
//! stdin and stdout through pipes should use [`Process::communicate`], which
//! drains stdout and stderr on their own threads so a chatty child cannot
//! deadlock on a full pipe.

use std::io::{self, Read, Write};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, ExitStatus};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

use crate::error::{Error, Result};
use crate::io::encoding::Encoding;

/// Everything read from one stream of a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Decoded with the invocation's encoding.
    Text(String),
    /// Raw bytes; the invocation had no encoding.
    Bytes(Vec<u8>),
}

impl Output {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(text) => Some(text.as_str()),
            Output::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Output::Text(text) => text.as_bytes(),
            Output::Bytes(bytes) => bytes.as_slice(),
        }
    }
}

/// Result of [`Process::communicate`]. Streams that were not piped are `None`.
#[derive(Debug)]
pub struct Completed {
    pub status: ExitStatus,
    pub stdout: Option<Output>,
    pub stderr: Option<Output>,
}

/// A live child process together with the encoding of its streams.
#[derive(Debug)]
pub struct Process {
    child: Child,
    encoding: Option<Encoding>,
}

impl Process {
    pub(crate) fn new(child: Child, encoding: Option<Encoding>) -> Self {
        Self { child, encoding }
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn stdin(&mut self) -> Option<&mut ChildStdin> {
        self.child.stdin.as_mut()
    }

    pub fn stdout(&mut self) -> Option<&mut ChildStdout> {
        self.child.stdout.as_mut()
    }

    pub fn stderr(&mut self) -> Option<&mut ChildStderr> {
        self.child.stderr.as_mut()
    }

    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Encode `text` and write it to the child's stdin pipe.
    pub fn write_stdin(&mut self, text: &str) -> Result<()> {
        let bytes = self.encode_input(text)?;
        self.write_stdin_bytes(&bytes)
    }

    pub fn write_stdin_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let stdin = self
            .child
            .stdin
            .as_mut()
            .ok_or_else(|| Error::invalid("stdin", "not piped"))?;
        stdin
            .write_all(bytes)
            .and_then(|()| stdin.flush())
            .map_err(|err| Error::io("write stdin", err))
    }

    /// Close the stdin pipe so the child sees end of input.
    pub fn close_stdin(&mut self) {
        drop(self.child.stdin.take());
    }

    /// Read stdout to end of stream and decode it.
    pub fn read_stdout(&mut self) -> Result<Output> {
        let stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| Error::invalid("stdout", "not piped"))?;
        let bytes = read_stream(stdout).map_err(|err| Error::io("read stdout", err))?;
        self.decode("stdout", bytes)
    }

    /// Read stderr to end of stream and decode it.
    pub fn read_stderr(&mut self) -> Result<Output> {
        let stderr = self
            .child
            .stderr
            .take()
            .ok_or_else(|| Error::invalid("stderr", "not piped"))?;
        let bytes = read_stream(stderr).map_err(|err| Error::io("read stderr", err))?;
        self.decode("stderr", bytes)
    }

    /// Block until the child exits. Closes stdin first.
    pub fn wait(&mut self) -> Result<ExitStatus> {
        self.child
            .wait()
            .map_err(|err| Error::io("wait for process", err))
    }

    /// Exit status if the child has already exited.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        self.child
            .try_wait()
            .map_err(|err| Error::io("poll process", err))
    }

    /// Wait at most `timeout`. Returns `None` if the child is still running;
    /// the child is left alone in that case.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Result<Option<ExitStatus>> {
        self.child
            .wait_timeout(timeout)
            .map_err(|err| Error::io("wait for process", err))
    }

    /// Feed `input` to stdin, close it, drain stdout and stderr, and wait.
    ///
    /// If a stream cannot be decoded the child has still been reaped: the
    /// returned [`Error::Undecoded`] carries the exit status and every stream,
    /// with the undecodable ones kept as raw bytes.
    #[instrument(skip_all, fields(pid = self.child.id(), input = input.is_some()))]
    pub fn communicate(mut self, input: Option<&str>) -> Result<Completed> {
        let input = input.map(|text| self.encode_input(text)).transpose()?;
        let writer = match (self.child.stdin.take(), input) {
            (Some(mut stdin), Some(bytes)) => Some(thread::spawn(move || stdin.write_all(&bytes))),
            (None, Some(_)) => return Err(Error::invalid("stdin", "not piped")),
            (_, None) => None,
        };

        let stdout = self
            .child
            .stdout
            .take()
            .map(|stream| thread::spawn(move || read_stream(stream)));
        let stderr = self
            .child
            .stderr
            .take()
            .map(|stream| thread::spawn(move || read_stream(stream)));

        let status = self.wait()?;

        if let Some(writer) = writer {
            match join(writer, "write stdin") {
                Err(Error::Io { source, .. }) if source.kind() == io::ErrorKind::BrokenPipe => {
                    warn!("child closed stdin before reading all input");
                }
                other => other?,
            }
        }
        let stdout = stdout
            .map(|handle| join(handle, "read stdout"))
            .transpose()?;
        let stderr = stderr
            .map(|handle| join(handle, "read stderr"))
            .transpose()?;
        debug!(exit_code = ?status.code(), "command finished");

        let mut failure = None;
        let completed = Completed {
            status,
            stdout: stdout.map(|bytes| self.decode_or_keep("stdout", bytes, &mut failure)),
            stderr: stderr.map(|bytes| self.decode_or_keep("stderr", bytes, &mut failure)),
        };
        match failure {
            None => Ok(completed),
            Some(error) => Err(Error::Undecoded {
                completed: Box::new(completed),
                error: Box::new(error),
            }),
        }
    }

    /// Give up the wrapper and keep the raw child.
    pub fn into_child(self) -> Child {
        self.child
    }

    fn encode_input(&self, text: &str) -> Result<Vec<u8>> {
        match self.encoding {
            Some(encoding) => encoding.encode("stdin", text),
            None => Ok(text.as_bytes().to_vec()),
        }
    }

    fn decode(&self, stream: &'static str, bytes: Vec<u8>) -> Result<Output> {
        match self.encoding {
            Some(encoding) => encoding.decode(stream, &bytes).map(Output::Text),
            None => Ok(Output::Bytes(bytes)),
        }
    }

    /// Like `decode`, but keeps undecodable bytes raw and records the first failure.
    fn decode_or_keep(
        &self,
        stream: &'static str,
        bytes: Vec<u8>,
        failure: &mut Option<Error>,
    ) -> Output {
        let Some(encoding) = self.encoding else {
            return Output::Bytes(bytes);
        };
        match encoding.decode(stream, &bytes) {
            Ok(text) => Output::Text(text),
            Err(err) => {
                failure.get_or_insert(err);
                Output::Bytes(bytes)
            }
        }
    }
}

fn read_stream<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

fn join<T>(handle: JoinHandle<io::Result<T>>, context: &'static str) -> Result<T> {
    match handle.join() {
        Ok(result) => result.map_err(|err| Error::io(context, err)),
        Err(_) => Err(Error::io(
            context,
            io::Error::other("stream thread panicked"),
        )),
    }
}
