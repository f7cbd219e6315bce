use std::io::Read;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;

use crate::common::errors::{FsError, Result};

/// Boxed byte stream handed to the producer task
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;

/// Where a line stream reads its bytes from
pub enum LineSource {
    /// A file opened by the streamer itself
    Path(PathBuf),
    /// An already-open byte stream (file, socket, network body, buffer)
    Reader(ByteReader),
    /// The process's standard input
    Stdin,
}

impl LineSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        LineSource::Path(path.into())
    }

    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        LineSource::Reader(Box::new(reader))
    }

    /// Short label for log lines
    pub fn describe(&self) -> String {
        match self {
            LineSource::Path(p) => p.display().to_string(),
            LineSource::Reader(_) => "<reader>".to_string(),
            LineSource::Stdin => "<stdin>".to_string(),
        }
    }

    /// Open the source. Paths that are missing or are directories fail here,
    /// before any background work starts.
    pub(crate) async fn open(self) -> Result<ByteReader> {
        match self {
            LineSource::Path(path) => {
                let metadata = tokio::fs::metadata(&path)
                    .await
                    .map_err(|source| FsError::Open {
                        path: path.clone(),
                        source,
                    })?;
                if metadata.is_dir() {
                    return Err(FsError::Open {
                        path,
                        source: std::io::Error::other("is a directory"),
                    });
                }
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|source| FsError::Open { path, source })?;
                Ok(Box::new(file))
            }
            LineSource::Reader(reader) => Ok(reader),
            LineSource::Stdin => Ok(Box::new(StdinPipe::spawn()?)),
        }
    }
}

impl From<PathBuf> for LineSource {
    fn from(path: PathBuf) -> Self {
        LineSource::Path(path)
    }
}

impl From<&std::path::Path> for LineSource {
    fn from(path: &std::path::Path) -> Self {
        LineSource::Path(path.to_path_buf())
    }
}

impl std::fmt::Debug for LineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LineSource({})", self.describe())
    }
}

const STDIN_CHUNK_BYTES: usize = 8 * 1024;

/// Stdin read on a detached thread and handed over in chunks.
///
/// `tokio::io::stdin()` reads on the runtime's blocking pool, and runtime
/// shutdown waits for a read stuck on a silent pipe. This thread is never
/// joined: once the pipe is dropped it exits after its current read, and
/// process exit does not wait for it.
struct StdinPipe {
    rx: mpsc::Receiver<std::io::Result<Vec<u8>>>,
    chunk: Vec<u8>,
    pos: usize,
}

impl StdinPipe {
    fn spawn() -> Result<Self> {
        let (tx, rx) = mpsc::channel(1);
        std::thread::Builder::new()
            .name("fileutil-stdin".to_string())
            .spawn(move || {
                let mut stdin = std::io::stdin().lock();
                let mut buf = vec![0u8; STDIN_CHUNK_BYTES];
                loop {
                    match stdin.read(&mut buf) {
                        Ok(0) => return,
                        Ok(n) => {
                            if tx.blocking_send(Ok(buf[..n].to_vec())).is_err() {
                                return;
                            }
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            let _ = tx.blocking_send(Err(e));
                            return;
                        }
                    }
                }
            })
            .map_err(|source| FsError::Open {
                path: PathBuf::from("<stdin>"),
                source,
            })?;

        Ok(Self {
            rx,
            chunk: Vec::new(),
            pos: 0,
        })
    }
}

impl AsyncRead for StdinPipe {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        loop {
            if self.pos < self.chunk.len() {
                let n = buf.remaining().min(self.chunk.len() - self.pos);
                let start = self.pos;
                buf.put_slice(&self.chunk[start..start + n]);
                self.pos += n;
                return Poll::Ready(Ok(()));
            }
            match self.rx.poll_recv(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Err(e)),
                // Sender gone: end of input
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
