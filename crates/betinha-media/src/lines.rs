//! Line-oriented reader over a tool's output pipe.
//!
//! Tool output is read as raw bytes and decoded as Latin-1, so a stray
//! non-UTF-8 byte never aborts parsing. Reads only happen when the runtime
//! reports the pipe readable; the caller's task is never blocked.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// One read from a [`LineReader`].
#[derive(Debug)]
pub enum LineEvent {
    /// A complete line, without its terminator
    Line(String),
    /// The writer closed the pipe
    EndOfStream,
    /// Reading failed; the reader is closed afterwards
    Error(std::io::Error),
}

/// Splits a byte stream into newline-delimited lines.
pub struct LineReader<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
    closed: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
            closed: false,
        }
    }

    /// Read the next line.
    ///
    /// Cancel safe: bytes of a partially read line are kept until the line
    /// completes, so this can be used as a `tokio::select!` branch.
    pub async fn next_event(&mut self) -> LineEvent {
        if self.closed {
            return LineEvent::EndOfStream;
        }

        match self.reader.read_until(b'\n', &mut self.pending).await {
            Ok(_) if self.pending.is_empty() => {
                self.closed = true;
                LineEvent::EndOfStream
            }
            // Either a full line or the unterminated tail before EOF
            Ok(_) => LineEvent::Line(decode_line(std::mem::take(&mut self.pending))),
            Err(e) => {
                self.closed = true;
                self.pending.clear();
                LineEvent::Error(e)
            }
        }
    }
}

/// Latin-1 decode, dropping the `\n` / `\r\n` terminator.
fn decode_line(mut bytes: Vec<u8>) -> String {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    bytes.into_iter().map(char::from).collect()
}
