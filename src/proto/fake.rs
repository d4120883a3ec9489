use std::{
    pin::Pin,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// In-memory stand-in for a serial port or socket.
///
/// Reads are served from a canned response buffer, writes are
/// captured in `written`. With `stall` set, reads never complete
/// once the canned responses are used up. With `delay` set, nothing
/// is delivered before that much time has passed since the first read.
pub(crate) struct FakeBuffer {
    response_buf: Vec<u8>,
    written: Arc<Mutex<Vec<u8>>>,
    stall: bool,
    delay: Option<Duration>,
    first_read: Option<Instant>,
}

impl FakeBuffer {
    pub(crate) fn new(response_buf: impl Into<Vec<u8>>) -> Self {
        Self {
            response_buf: response_buf.into(),
            written: Arc::default(),
            stall: false,
            delay: None,
            first_read: None,
        }
    }

    pub(crate) fn stalling(mut self) -> Self {
        self.stall = true;
        self
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.written)
    }
}

impl tokio::io::AsyncRead for FakeBuffer {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        if let Some(delay) = self.delay {
            let first_read = *self.first_read.get_or_insert_with(Instant::now);
            if first_read.elapsed() < delay {
                cx.waker().wake_by_ref();
                return std::task::Poll::Pending;
            }
        }
        if !self.response_buf.is_empty() {
            let c = buf.remaining().min(self.response_buf.len());
            buf.put_slice(&self.response_buf[0..c]);
            self.response_buf.drain(0..c);
        } else if self.stall {
            return std::task::Poll::Pending;
        }
        std::task::Poll::Ready(Ok(()))
    }
}

impl tokio::io::AsyncWrite for FakeBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> std::task::Poll<std::result::Result<usize, std::io::Error>> {
        if let Ok(mut written) = self.written.lock() {
            written.extend_from_slice(buf);
        }
        std::task::Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), std::io::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), std::io::Error>> {
        std::task::Poll::Ready(Ok(()))
    }
}
