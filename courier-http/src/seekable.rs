//! Partially seekable view over a read-once response body.
//!
//! Range-serving code typically seeks to the end to learn the size, seeks
//! back to the start and then reads. A network body cannot do that, so
//! [`SeekableBody`] fakes exactly those two seeks:
//!
//! - `SeekFrom::Start(0)` reports position 0 without touching the stream
//! - `SeekFrom::End(0)` reports the declared content length
//!
//! Every other seek fails with [`io::ErrorKind::Unsupported`].
//!
//! Content-type sniffing usually reads a fixed [`SNIFF_LEN`] probe before
//! seeking back. After [`SeekableBody::set_first_fake_chunk`] such probe
//! reads return end-of-stream so no real data is consumed; the first
//! successful seek switches reads back to the real body.
//!
//! Clones share both the stream and the probe state. A body is meant to be
//! driven by one consumer at a time.

use futures::TryStreamExt;
use parking_lot::Mutex;
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};
use tokio_util::io::StreamReader;
use tracing::trace;

/// Read size treated as a content-type sniffing probe.
pub const SNIFF_LEN: usize = 512;

type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug)]
struct ProbeState {
    ignore_first_read: AtomicBool,
    declared_size: AtomicI64,
}

/// Response body exposing start/end seeks over a sequential stream.
pub struct SeekableBody {
    body: Arc<Mutex<Option<BoxedReader>>>,
    status: Arc<ProbeState>,
    pending_seek: Option<u64>,
}

impl SeekableBody {
    /// Wrap a reader whose total size is `declared_size` bytes; negative
    /// means unknown.
    pub fn new<R>(reader: R, declared_size: i64) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            body: Arc::new(Mutex::new(Some(Box::pin(reader)))),
            status: Arc::new(ProbeState {
                ignore_first_read: AtomicBool::new(false),
                declared_size: AtomicI64::new(declared_size),
            }),
            pending_seek: None,
        }
    }

    /// Wrap a transport response, taking its size from the reported content
    /// length.
    pub fn from_response(response: reqwest::Response) -> Self {
        let declared_size = response
            .content_length()
            .map_or(-1, |length| i64::try_from(length).unwrap_or(i64::MAX));
        let stream = response.bytes_stream().map_err(io::Error::other);

        Self::new(StreamReader::new(stream), declared_size)
    }

    /// Make sniffing probe reads report end-of-stream until the next
    /// successful seek.
    pub fn set_first_fake_chunk(&self) {
        self.status.ignore_first_read.store(true, Ordering::Release);
    }

    /// Whether probe reads are currently being suppressed.
    pub fn is_faking_first_chunk(&self) -> bool {
        self.status.ignore_first_read.load(Ordering::Acquire)
    }

    /// Override the size reported by `SeekFrom::End(0)`.
    pub fn set_content_length(&self, size: i64) {
        self.status.declared_size.store(size, Ordering::Release);
    }

    /// Size reported by `SeekFrom::End(0)`; negative when unknown.
    pub fn content_length(&self) -> i64 {
        self.status.declared_size.load(Ordering::Acquire)
    }

    /// Release the underlying stream. Later reads fail.
    pub fn close(&self) -> io::Result<()> {
        self.body.lock().take();
        Ok(())
    }

    /// Whether [`close`](Self::close) has been called on any clone.
    pub fn is_closed(&self) -> bool {
        self.body.lock().is_none()
    }
}

impl Clone for SeekableBody {
    fn clone(&self) -> Self {
        Self {
            body: Arc::clone(&self.body),
            status: Arc::clone(&self.status),
            pending_seek: None,
        }
    }
}

impl std::fmt::Debug for SeekableBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeekableBody")
            .field("status", &self.status)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl AsyncRead for SeekableBody {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.is_faking_first_chunk() && buf.remaining() == SNIFF_LEN {
            trace!("Faking empty sniffing probe read");
            return Poll::Ready(Ok(()));
        }

        let mut body = self.body.lock();
        match body.as_mut() {
            Some(reader) => reader.as_mut().poll_read(cx, buf),
            None => Poll::Ready(Err(io::Error::other("read on closed response body"))),
        }
    }
}

impl AsyncSeek for SeekableBody {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        let this = self.get_mut();
        let offset = match position {
            SeekFrom::Start(0) => 0,
            SeekFrom::End(0) => u64::try_from(this.content_length()).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, "content length is unknown")
            })?,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("seek to {other:?} is not implemented"),
                ));
            }
        };

        this.status.ignore_first_read.store(false, Ordering::Release);
        this.pending_seek = Some(offset);
        Ok(())
    }

    fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Poll::Ready(Ok(self.get_mut().pending_seek.take().unwrap_or(0)))
    }
}
