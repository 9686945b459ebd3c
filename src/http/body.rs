//! Response body module
//!
//! `BoundedReader` caps how many bytes may be read from an inner reader, so a
//! range response can never run past its last byte. `FileBody` streams an
//! open file as a hyper body; the file handle lives exactly as long as the
//! body, and is closed when hyper finishes the response or drops it because
//! the client went away.

use futures_util::Stream;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::convert::Infallible;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::ReaderStream;

/// Body type of every response the server produces
pub type ResponseBody = BoxBody<Bytes, io::Error>;

/// In-memory body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never: Infallible| match never {})
        .boxed()
}

/// Zero-length body
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never: Infallible| match never {})
        .boxed()
}

/// Reader that yields at most `limit` bytes of its inner reader
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    remaining: u64,
}

impl<R> BoundedReader<R> {
    pub const fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }

    /// Bytes still allowed through
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for BoundedReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.remaining == 0 {
            return Poll::Ready(Ok(()));
        }

        let allowed = usize::try_from(this.remaining).unwrap_or(usize::MAX);
        let read = if buf.remaining() <= allowed {
            let before = buf.filled().len();
            ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
            buf.filled().len() - before
        } else {
            // caller offered more room than we may fill: read into a buffer
            // of exactly the allowed size
            let mut scratch = vec![0u8; allowed];
            let mut limited = ReadBuf::new(&mut scratch);
            ready!(Pin::new(&mut this.inner).poll_read(cx, &mut limited))?;
            buf.put_slice(limited.filled());
            limited.filled().len()
        };

        this.remaining -= read as u64;
        Poll::Ready(Ok(()))
    }
}

/// Streaming body over an open file
pub struct FileBody {
    stream: ReaderStream<BoundedReader<File>>,
    len: Option<u64>,
}

impl FileBody {
    /// Stream from the current position to end of file
    pub fn whole(file: File, chunk_size: usize) -> Self {
        Self {
            stream: ReaderStream::with_capacity(BoundedReader::new(file, u64::MAX), chunk_size),
            len: None,
        }
    }

    /// Stream exactly `len` bytes from the current position (fewer if the
    /// file is truncated underneath us)
    pub fn bounded(file: File, len: u64, chunk_size: usize) -> Self {
        Self {
            stream: ReaderStream::with_capacity(BoundedReader::new(file, len), chunk_size),
            len: Some(len),
        }
    }

    pub fn boxed(self) -> ResponseBody {
        BodyExt::boxed(self)
    }
}

impl Body for FileBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        let this = self.get_mut();
        Pin::new(&mut this.stream)
            .poll_next(cx)
            .map(|chunk| chunk.map(|res| res.map(Frame::data)))
    }

    fn size_hint(&self) -> SizeHint {
        match self.len {
            Some(len) => SizeHint::with_exact(len),
            None => SizeHint::default(),
        }
    }
}
