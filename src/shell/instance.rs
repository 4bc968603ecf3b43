use crate::core::error::AssistError;
use crate::shell::window::Window;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const FOCUS_REQUEST: &str = "acadchat:focus";
const FOCUS_ACK: &str = "acadchat:ok";
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of claiming the single-instance port.
pub enum InstanceRole {
    /// This process owns the port and should run the session.
    Primary(InstanceServer),
    /// Another session is running and has been asked to take focus.
    Secondary,
}

pub struct InstanceServer {
    listener: TcpListener,
}

impl InstanceServer {
    pub fn port(&self) -> Option<u16> {
        self.listener.local_addr().ok().map(|addr| addr.port())
    }

    /// Serves focus requests from later launches until the task is aborted.
    pub fn spawn(self, window: Arc<dyn Window>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let (stream, peer) = match self.listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!("instance server accept failed: {}", e);
                        continue;
                    }
                };
                tracing::debug!("instance connection from {}", peer);
                let window = window.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_request(stream, window.as_ref()).await {
                        tracing::warn!("instance request from {} failed: {}", peer, e);
                    }
                });
            }
        })
    }
}

async fn handle_request(stream: TcpStream, window: &dyn Window) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut line = String::new();
    let mut reader = BufReader::new(reader);
    tokio::time::timeout(HANDSHAKE_TIMEOUT, reader.read_line(&mut line))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no focus request received"))??;

    if line.trim() == FOCUS_REQUEST {
        window.focus();
        writer.write_all(format!("{}\n", FOCUS_ACK).as_bytes()).await?;
    }
    Ok(())
}

/// Binds the loopback instance port, or hands off to the session that holds it.
pub async fn acquire(port: u16) -> Result<InstanceRole, AssistError> {
    match TcpListener::bind(("127.0.0.1", port)).await {
        Ok(listener) => Ok(InstanceRole::Primary(InstanceServer { listener })),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            if request_focus(port).await {
                Ok(InstanceRole::Secondary)
            } else {
                Err(AssistError::Config(format!(
                    "instance port {} is held by another program",
                    port
                )))
            }
        }
        Err(e) => Err(e.into()),
    }
}

async fn request_focus(port: u16) -> bool {
    let exchange = async {
        let stream = TcpStream::connect(("127.0.0.1", port)).await?;
        let (reader, mut writer) = stream.into_split();
        writer
            .write_all(format!("{}\n", FOCUS_REQUEST).as_bytes())
            .await?;
        let mut reply = String::new();
        BufReader::new(reader).read_line(&mut reply).await?;
        Ok::<bool, io::Error>(reply.trim() == FOCUS_ACK)
    };

    match tokio::time::timeout(HANDSHAKE_TIMEOUT, exchange).await {
        Ok(Ok(acknowledged)) => acknowledged,
        Ok(Err(e)) => {
            tracing::debug!("focus handshake on port {} failed: {}", port, e);
            false
        }
        Err(_) => false,
    }
}
