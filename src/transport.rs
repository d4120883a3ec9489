use std::{sync::Arc, time::Duration};
use tokio::{net::TcpStream, runtime::Runtime};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

pub mod resource;
pub mod stream;

pub use resource::Resource;
pub use stream::StreamSession;

use crate::proto::{ProtoError, Result};
use crate::session::ResourceManager;
use crate::DEFAULT_BAUDRATE;

/// Management timeout until the owner configures one.
pub const DEFAULT_MANAGEMENT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Opens serial ports and raw SCPI sockets without a VISA library.
///
/// All sessions opened by one manager share its current-thread runtime.
pub struct NativeResourceManager {
    runtime: Arc<Runtime>,
    timeout: Duration,
    baud_rate: u32,
    closed: bool,
}

impl NativeResourceManager {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            runtime: Arc::new(runtime),
            timeout: DEFAULT_MANAGEMENT_TIMEOUT,
            baud_rate: DEFAULT_BAUDRATE,
            closed: false,
        })
    }

    /// Baud rate for serial resources.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn open_serial(&self, resource: &str, port: &str) -> Result<StreamSession> {
        // Registering the port with the reactor requires a runtime context.
        let _guard = self.runtime.enter();
        let mut port = tokio_serial::new(port, self.baud_rate)
            .timeout(self.timeout)
            .open_native_async()?;

        #[cfg(unix)]
        port.set_exclusive(false)?;

        Ok(StreamSession::new(resource, Arc::clone(&self.runtime), port))
    }

    fn open_socket(&self, resource: &str, host: &str, port: u16) -> Result<StreamSession> {
        let timeout = self.timeout;
        let stream = self
            .runtime
            .block_on(async move {
                tokio::time::timeout(timeout, TcpStream::connect((host, port))).await
            })
            .map_err(|_elapsed| {
                ProtoError::connection(
                    resource,
                    format!("connect timed out after {} ms", timeout.as_millis()),
                )
            })?
            .map_err(|err| ProtoError::connection(resource, err))?;
        stream.set_nodelay(true)?;

        Ok(StreamSession::new(resource, Arc::clone(&self.runtime), stream))
    }
}

impl ResourceManager for NativeResourceManager {
    type Session = StreamSession;

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn open_resource(&mut self, resource: &str) -> Result<Self::Session> {
        if self.closed {
            return Err(ProtoError::connection(resource, "resource manager is closed"));
        }
        let session = match resource.parse::<Resource>()? {
            Resource::Serial { port } => self.open_serial(resource, &port)?,
            Resource::Socket { host, port } => self.open_socket(resource, &host, port)?,
        };
        info!(resource, "opened resource");
        Ok(session)
    }

    fn close(&mut self) -> Result<()> {
        debug!("closing resource manager");
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    #[test]
    fn test_defaults() {
        let rm = NativeResourceManager::new().unwrap().with_baud_rate(115200);
        assert_eq!(rm.timeout(), DEFAULT_MANAGEMENT_TIMEOUT);
        assert_eq!(rm.baud_rate(), 115200);
    }

    #[test]
    fn test_rejects_unsupported_resource() {
        let mut rm = NativeResourceManager::new().unwrap();
        let err = rm
            .open_resource("USB0::0x2A8D::0x2B18::MY12345678::INSTR")
            .err()
            .unwrap();
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_closed_manager_refuses_open() {
        let mut rm = NativeResourceManager::new().unwrap();
        rm.close().unwrap();
        assert!(matches!(
            rm.open_resource("TCPIP0::127.0.0.1::5025::SOCKET"),
            Err(ProtoError::Connection { .. })
        ));
    }

    #[test]
    fn test_socket_session() {
        // Instrument side, answers one query on its own thread.
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        let instrument = std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                std_listener.set_nonblocking(true).unwrap();
                let listener = TcpListener::from_std(std_listener).unwrap();
                let (socket, _) = listener.accept().await.unwrap();
                let (rd, mut wr) = socket.into_split();
                let mut lines = BufReader::new(rd).lines();
                let line = lines.next_line().await.unwrap().unwrap();
                assert_eq!(line, "MEASure?");
                wr.write_all(b"-3.25\r\n").await.unwrap();
                // Drain until the driver closes.
                while lines.next_line().await.unwrap().is_some() {}
            });
        });

        let mut rm = NativeResourceManager::new().unwrap();
        let resource = format!("TCPIP0::127.0.0.1::{}::SOCKET", addr.port());
        let mut session = rm.open_resource(&resource).unwrap();
        assert_eq!(session.resource(), resource);
        assert_eq!(session.query("MEASure?").unwrap(), "-3.25");
        session.close().unwrap();
        rm.close().unwrap();
        instrument.join().unwrap();
    }
}
