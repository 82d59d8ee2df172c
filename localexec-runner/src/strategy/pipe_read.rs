#![allow(unsafe_code)]

use std::ffi::CString;
use std::io::{self, Read};
use std::ptr;

use tracing::debug;

use super::{ExecStrategy, Outcome, Primitive, decode};
use crate::error::ExecError;
use crate::last_error;

/// Opens a read pipe with `popen(3)`, drains it and checks the `pclose(3)`
/// status.
///
/// `popen` always goes through `/bin/sh -c`, so there is no shell choice here.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipeRead;

impl PipeRead {
    pub fn new() -> Self {
        Self
    }
}

/// Owned `FILE*` returned by `popen`. Closed exactly once, either through
/// [`PipeStream::close`] or on drop.
struct PipeStream {
    stream: *mut libc::FILE,
}

impl PipeStream {
    fn open(command_line: &CString) -> io::Result<Self> {
        // SAFETY: both arguments are valid NUL-terminated strings.
        let stream = unsafe { libc::popen(command_line.as_ptr(), c"r".as_ptr()) };
        if stream.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { stream })
    }

    /// Close the pipe and return the raw wait status of the child.
    fn close(mut self) -> io::Result<libc::c_int> {
        let stream = std::mem::replace(&mut self.stream, ptr::null_mut());
        // SAFETY: `stream` came from `popen` and has not been closed yet.
        let status = unsafe { libc::pclose(stream) };
        if status == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(status)
    }
}

impl Read for PipeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: `stream` is open and `buf` is valid for `buf.len()` bytes.
        let read = unsafe { libc::fread(buf.as_mut_ptr().cast(), 1, buf.len(), self.stream) };
        // SAFETY: `stream` is open; `ferror` only inspects its flags.
        let failed = read == 0 && unsafe { libc::ferror(self.stream) } != 0;
        if failed {
            let error = io::Error::last_os_error();
            // SAFETY: clears the sticky error flag so an interrupted read can
            // be retried.
            unsafe { libc::clearerr(self.stream) };
            return Err(error);
        }
        Ok(read)
    }
}

impl Drop for PipeStream {
    fn drop(&mut self) {
        if !self.stream.is_null() {
            // SAFETY: still open; the status is irrelevant on this path.
            unsafe { libc::pclose(self.stream) };
        }
    }
}

/// Exit code from a `pclose` wait status; `-1` for abnormal termination.
fn wait_status_code(status: libc::c_int) -> i32 {
    if libc::WIFEXITED(status) {
        libc::WEXITSTATUS(status)
    } else {
        -1
    }
}

impl ExecStrategy for PipeRead {
    fn primitive(&self) -> Primitive {
        Primitive::Popen
    }

    fn execute(&self, command_line: &str) -> Result<Outcome, ExecError> {
        let c_line = CString::new(command_line).map_err(|error| {
            ExecError::new(command_line, "command line contains a NUL byte", -1).with_source(error)
        })?;

        let mut pipe = match PipeStream::open(&c_line) {
            Ok(pipe) => pipe,
            Err(error) => {
                last_error::record(&error);
                return Err(ExecError::new(command_line, "", error.raw_os_error().unwrap_or(-1)));
            }
        };

        let mut buffer = Vec::new();
        if let Err(error) = pipe.read_to_end(&mut buffer) {
            last_error::record(&error);
            return Err(ExecError::new(command_line, "", -1));
        }

        let status = match pipe.close() {
            Ok(status) => status,
            Err(error) => {
                last_error::record(&error);
                return Err(ExecError::new(command_line, "", -1));
            }
        };

        let code = wait_status_code(status);
        let output = decode(buffer);
        debug!(code, bytes = output.len(), "popen finished");

        if code != 0 {
            return Err(ExecError::new(command_line, output, code));
        }
        Ok(Outcome::success(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_whole_stream() -> Result<(), ExecError> {
        let outcome = PipeRead::new().execute("printf 'x\\ny'")?;
        assert_eq!(outcome.output, "x\ny");
        Ok(())
    }

    #[test]
    fn non_zero_close_status_fails() {
        match PipeRead::new().execute("printf half; exit 4") {
            Err(error) => {
                assert_eq!(error.code(), 4);
                assert_eq!(error.message(), "half");
            }
            Ok(outcome) => panic!("expected failure, got {outcome:?}"),
        }
    }

    #[test]
    fn killed_child_reports_abnormal_termination() {
        match PipeRead::new().execute("kill -9 $$") {
            Err(error) => assert_eq!(error.code(), -1),
            Ok(outcome) => panic!("expected failure, got {outcome:?}"),
        }
    }

    #[test]
    fn nul_byte_is_rejected_before_spawning() {
        let error = PipeRead::new().execute("echo a\0b").err();
        assert_eq!(
            error.map(|error| error.message().to_string()),
            Some("command line contains a NUL byte".to_string())
        );
    }
}
