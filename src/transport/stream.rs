use futures::{SinkExt, StreamExt};
use std::{io, pin::Pin, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    runtime::Runtime,
};
use tokio_util::codec::Decoder;
use tracing::{debug, trace, warn};

use crate::proto::{codec::ScpiCodec, ProtoError, Result};
use crate::session::Session;

trait AsyncReadWrite<S>: futures::Sink<S> + futures::Stream {}

impl<T, S> AsyncReadWrite<S> for T where T: futures::Sink<S> + futures::Stream {}

#[allow(clippy::type_complexity)]
type LineStream = Pin<
    Box<
        dyn AsyncReadWrite<
            String,
            Error = io::Error,
            Item = std::result::Result<String, io::Error>,
        >,
    >,
>;

/// Response timeout until the owner configures one.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(5000);

/// [`Session`] over any byte stream, framed with [`ScpiCodec`].
///
/// The I/O is driven by a current-thread runtime shared with the
/// manager that opened the session, every call blocks on it.
pub struct StreamSession {
    resource: String,
    runtime: Arc<Runtime>,
    stream: Option<LineStream>,
    timeout: Duration,
}

impl StreamSession {
    pub(crate) fn new<T>(resource: impl Into<String>, runtime: Arc<Runtime>, io: T) -> Self
    where
        T: AsyncRead + AsyncWrite + 'static,
    {
        let stream = ScpiCodec::default().framed(io);

        Self {
            resource: resource.into(),
            runtime,
            stream: Some(Box::pin(stream)),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    fn exchange(&mut self, command: &str, reply: bool) -> Result<Option<String>> {
        let timeout = self.timeout;
        let stream = self.stream.as_mut().ok_or(ProtoError::Closed)?;
        trace!(resource = %self.resource, "> {}", command);

        let result = self.runtime.block_on(async move {
            tokio::time::timeout(timeout, exchange(stream, command.to_string(), reply)).await
        });

        match result {
            Ok(Ok(line)) => {
                if let Some(line) = &line {
                    trace!(resource = %self.resource, "< {}", line);
                }
                Ok(line)
            }
            Ok(Err(err)) => {
                self.abandon(&err);
                Err(err)
            }
            Err(_elapsed) => {
                let err = ProtoError::Timeout(timeout);
                self.abandon(&err);
                Err(err)
            }
        }
    }

    // A failed exchange may leave a late reply or half a command in the
    // framed buffers, the stream can no longer be trusted.
    fn abandon(&mut self, err: &ProtoError) {
        if self.stream.take().is_some() {
            warn!(resource = %self.resource, error = %err, "dropping session after failed exchange");
        }
    }
}

async fn exchange(stream: &mut LineStream, command: String, reply: bool) -> Result<Option<String>> {
    stream.send(command).await?;
    if !reply {
        return Ok(None);
    }
    match stream.next().await {
        Some(Ok(line)) => Ok(Some(line)),
        Some(Err(ioerr)) => Err(ioerr.into()),
        None => Err(ProtoError::Abort),
    }
}

impl Session for StreamSession {
    fn query(&mut self, command: &str) -> Result<String> {
        self.exchange(command, true)?.ok_or(ProtoError::Abort)
    }

    fn write(&mut self, command: &str) -> Result<()> {
        self.exchange(command, false).map(|_| ())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn close(&mut self) -> Result<()> {
        let mut stream = self.stream.take().ok_or(ProtoError::Closed)?;
        debug!(resource = %self.resource, "closing session");
        self.runtime.block_on(async move { stream.close().await })?;
        Ok(())
    }
}
