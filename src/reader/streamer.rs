use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::source::{ByteReader, LineSource};
use crate::common::errors::{LineError, Result};

/// Default line buffer capacity (64 KiB)
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

const READ_BUFFER_BYTES: usize = 8 * 1024;

/// One element of a line stream. An `Err` is always the last element.
pub type LineItem = std::result::Result<String, LineError>;

/// Builder for line streams
#[derive(Debug, Clone)]
pub struct LineStreamer {
    max_line_bytes: usize,
    cancel: Option<CancellationToken>,
}

impl Default for LineStreamer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineStreamer {
    pub fn new() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            cancel: None,
        }
    }

    /// Longest accepted line in bytes, excluding the newline
    pub fn max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max.max(1);
        self
    }

    /// Tie the stream to an outer token. Cancelling it stops the producer;
    /// dropping the stream does not cancel the outer token.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Open `source` and start producing lines on a background task.
    ///
    /// Must be called from within a Tokio runtime. Fails with
    /// [`FsError::Open`](crate::common::FsError::Open) if the source cannot be opened.
    pub async fn stream(self, source: impl Into<LineSource>) -> Result<LineStream> {
        let source = source.into();
        let label = source.describe();
        let reader = source.open().await?;

        let cancel = match self.cancel {
            Some(outer) => outer.child_token(),
            None => CancellationToken::new(),
        };
        let (tx, rx) = mpsc::channel(1);

        debug!(source = %label, max_line_bytes = self.max_line_bytes, "starting line stream");
        let producer = tokio::spawn(produce(
            reader,
            self.max_line_bytes,
            tx,
            cancel.clone(),
            label,
        ));

        Ok(LineStream {
            rx,
            cancel,
            producer: Some(producer),
        })
    }
}

/// Stream `source` line by line with an optional buffer capacity
pub async fn stream_lines(
    source: impl Into<LineSource>,
    max_line_bytes: Option<usize>,
) -> Result<LineStream> {
    let mut streamer = LineStreamer::new();
    if let Some(max) = max_line_bytes {
        streamer = streamer.max_line_bytes(max);
    }
    streamer.stream(source).await
}

/// Lazy, forward-only sequence of lines read by a background task.
///
/// The producer owns the source and closes it when it exits. Dropping the
/// stream cancels the producer, so abandoning it early never leaks the task.
pub struct LineStream {
    rx: mpsc::Receiver<LineItem>,
    cancel: CancellationToken,
    producer: Option<JoinHandle<()>>,
}

impl LineStream {
    /// Receive the next line; `None` once the stream has ended
    pub async fn next_line(&mut self) -> Option<LineItem> {
        self.rx.recv().await
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the producer and wait until it has released the source
    pub async fn cancel(mut self) {
        self.cancel.cancel();
        self.rx.close();
        if let Some(producer) = self.producer.take() {
            let _ = producer.await;
        }
    }
}

impl Stream for LineStream {
    type Item = LineItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for LineStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for LineStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineStream")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

enum ReadFailure {
    TooLong,
    Io(std::io::Error),
}

impl From<std::io::Error> for ReadFailure {
    fn from(e: std::io::Error) -> Self {
        ReadFailure::Io(e)
    }
}

async fn produce(
    reader: ByteReader,
    max_line_bytes: usize,
    tx: mpsc::Sender<LineItem>,
    cancel: CancellationToken,
    label: String,
) {
    let mut reader = BufReader::with_capacity(READ_BUFFER_BYTES, reader);
    let mut line = Vec::new();
    let mut emitted: u64 = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(source = %label, lines = emitted, "line stream cancelled");
                return;
            }
            next = read_line(&mut reader, &mut line, max_line_bytes) => next,
        };

        let item = match next {
            Ok(false) => {
                debug!(source = %label, lines = emitted, "line stream finished");
                return;
            }
            Ok(true) => Ok(String::from_utf8_lossy(&line).into_owned()),
            Err(ReadFailure::TooLong) => Err(LineError::TooLong {
                limit: max_line_bytes,
                line: emitted + 1,
            }),
            Err(ReadFailure::Io(source)) => Err(LineError::Read {
                line: emitted + 1,
                source,
            }),
        };

        let terminal = item.is_err();
        if let Err(e) = &item {
            warn!(source = %label, error = %e, "line stream ended early");
        }

        let delivered = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            sent = tx.send(item) => sent.is_ok(),
        };
        if !delivered {
            debug!(source = %label, lines = emitted, "line stream abandoned by consumer");
            return;
        }
        if terminal {
            return;
        }
        emitted += 1;
    }
}

/// Read one `\n`-terminated line into `line`, without the delimiter or a
/// trailing `\r`. Returns `Ok(false)` at end of input.
async fn read_line<R>(
    reader: &mut R,
    line: &mut Vec<u8>,
    max_line_bytes: usize,
) -> std::result::Result<bool, ReadFailure>
where
    R: AsyncBufRead + Unpin,
{
    line.clear();
    loop {
        let (used, complete) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                if line.is_empty() {
                    return Ok(false);
                }
                strip_cr(line);
                return Ok(true);
            }

            let (chunk, used, complete) = match available.iter().position(|b| *b == b'\n') {
                Some(i) => (&available[..i], i + 1, true),
                None => (available, available.len(), false),
            };
            if line.len() + chunk.len() > max_line_bytes {
                return Err(ReadFailure::TooLong);
            }
            line.extend_from_slice(chunk);
            (used, complete)
        };

        reader.consume(used);
        if complete {
            strip_cr(line);
            return Ok(true);
        }
    }
}

fn strip_cr(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
}
