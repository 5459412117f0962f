//! Submitting side: connect, read the handshake preamble, push results.
//!
//! [`Client`] is the reusable dial-and-send convenience; [`ClientConnection`]
//! is one live session. Write failures are fatal to the session and surface
//! to the caller; nothing here reconnects or retries.

use crate::core::cipher::PacketCipher;
use crate::core::packet::{CheckResult, PacketVersion};
use crate::error::Result;
use crate::protocol::handshake::{ServerPreamble, PREAMBLE_LEN};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Submission endpoint: collector address plus shared secret.
pub struct Client {
    addr: String,
    secret: Vec<u8>,
}

impl Client {
    pub fn new(addr: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            addr: addr.into(),
            secret: secret.into(),
        }
    }

    /// Dial the collector and complete the handshake.
    pub async fn connect(&self) -> Result<ClientConnection<TcpStream>> {
        let stream = TcpStream::connect(&self.addr).await?;
        ClientConnection::handshake(stream, self.secret.clone()).await
    }

    /// One-shot submission: connect, send every result in order, close.
    pub async fn send(&self, results: impl IntoIterator<Item = CheckResult>) -> Result<()> {
        let mut conn = self.connect().await?;
        conn.send_all(results).await?;
        conn.shutdown().await
    }
}

/// One live submission session.
pub struct ClientConnection<S> {
    stream: S,
    cipher: PacketCipher,
    server_timestamp: u32,
    version: &'static PacketVersion,
}

impl<S: AsyncRead + AsyncWrite + Unpin> ClientConnection<S> {
    /// Read the peer's 132-byte preamble and derive the cipher from its IV
    /// key. Blocks until the full preamble arrives.
    pub async fn handshake(mut stream: S, secret: impl Into<Vec<u8>>) -> Result<Self> {
        let mut buf = [0u8; PREAMBLE_LEN];
        stream.read_exact(&mut buf).await?;
        let preamble = ServerPreamble::from_bytes(&buf)?;
        debug!(server_time = preamble.timestamp, "handshake preamble received");

        Ok(Self {
            stream,
            cipher: PacketCipher::new(preamble.iv_key.to_vec(), secret.into()),
            server_timestamp: preamble.timestamp,
            version: &PacketVersion::CLASSIC,
        })
    }

    /// Override the packet layout used by [`Self::send_packet`]
    /// (default: classic).
    pub fn with_version(mut self, version: &'static PacketVersion) -> Self {
        self.version = version;
        self
    }

    /// The timestamp the collector sent in its preamble, used as the default
    /// for results that carry none.
    pub fn server_timestamp(&self) -> u32 {
        self.server_timestamp
    }

    /// Encode, encrypt, and write one check result.
    ///
    /// A zero timestamp is replaced by the collector's handshake timestamp.
    pub async fn send_packet(&mut self, result: &CheckResult) -> Result<()> {
        let version = self.version;
        self.send_packet_with(version, result).await
    }

    /// Like [`Self::send_packet`] with an explicit layout, e.g.
    /// [`PacketVersion::EXTENDED`] for long status lines.
    pub async fn send_packet_with(
        &mut self,
        version: &PacketVersion,
        result: &CheckResult,
    ) -> Result<()> {
        let mut effective = result.clone();
        if effective.timestamp == 0 {
            effective.timestamp = self.server_timestamp;
        }

        let mut raw = version.encode(&effective);
        // IV layer then secret layer, fresh cursors, one cipher pass per packet.
        self.cipher.apply(&mut raw);
        self.stream.write_all(&raw).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Send a batch of results as independent packets, in the given order.
    pub async fn send_all(&mut self, results: impl IntoIterator<Item = CheckResult>) -> Result<()> {
        for result in results {
            self.send_packet(&result).await?;
        }
        Ok(())
    }

    /// Close the session.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
