//! Receiving side: accept connections, hand out IV keys, decode packets.
//!
//! A [`Server`] owns the listening socket; each accepted connection becomes a
//! [`ServerConnection`] that owns its stream and its own freshly generated IV
//! key. No mutable state crosses connection boundaries, so connections need
//! no locking.

use crate::core::cipher::PacketCipher;
use crate::core::packet::{CheckResult, PacketVersion};
use crate::core::registry::VersionRegistry;
use crate::error::{ProtocolError, Result};
use crate::protocol::handshake::ServerPreamble;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Listening endpoint for check submissions.
pub struct Server {
    listener: TcpListener,
    secret: Vec<u8>,
    version: &'static PacketVersion,
}

impl Server {
    /// Bind a TCP listener. `secret` is the shared password; empty disables
    /// the secret cipher layer.
    pub async fn bind(addr: impl ToSocketAddrs, secret: impl Into<Vec<u8>>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            secret: secret.into(),
            version: &PacketVersion::CLASSIC,
        })
    }

    /// Override the expected packet layout (default: classic).
    pub fn with_version(mut self, version: &'static PacketVersion) -> Self {
        self.version = version;
        self
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept one connection and complete the handshake on it.
    pub async fn accept(&self) -> Result<ServerConnection<TcpStream>> {
        let (stream, peer) = self.listener.accept().await?;
        debug!(peer = %peer, "accepted connection");
        ServerConnection::open_with_version(stream, self.secret.clone(), self.version).await
    }

    /// Accept loop: one task per connection, parsed results forwarded to
    /// `results` in wire order. Returns when `shutdown_rx` fires or the
    /// listener dies.
    #[instrument(skip(self, results, shutdown_rx))]
    pub async fn serve_with_shutdown(
        self,
        results: mpsc::Sender<CheckResult>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> Result<()> {
        info!(addr = %self.listener.local_addr()?, "listening for check submissions");

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("shutdown requested, closing listener");
                    return Ok(());
                }

                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let secret = self.secret.clone();
                            let version = self.version;
                            let results = results.clone();

                            tokio::spawn(async move {
                                let mut conn = match ServerConnection::open_with_version(
                                    stream, secret, version,
                                )
                                .await
                                {
                                    Ok(conn) => conn,
                                    Err(e) => {
                                        warn!(peer = %peer, error = %e, "handshake write failed");
                                        return;
                                    }
                                };

                                loop {
                                    match conn.read_packet().await {
                                        Ok(Some(result)) => {
                                            debug!(
                                                peer = %peer,
                                                service = %result.service,
                                                code = %result.return_code,
                                                "check result received"
                                            );
                                            if results.send(result).await.is_err() {
                                                return;
                                            }
                                        }
                                        Ok(None) => {
                                            debug!(peer = %peer, "peer disconnected");
                                            return;
                                        }
                                        Err(e) => {
                                            warn!(peer = %peer, error = %e, "dropping connection");
                                            return;
                                        }
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "error accepting connection");
                        }
                    }
                }
            }
        }
    }

    /// [`Self::serve_with_shutdown`] wired to CTRL+C.
    pub async fn serve(self, results: mpsc::Sender<CheckResult>) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("received CTRL+C signal, shutting down");
                let _ = shutdown_tx.send(()).await;
            }
        });

        self.serve_with_shutdown(results, shutdown_rx).await
    }
}

/// One accepted submission stream.
///
/// Construction writes the 132-byte handshake preamble; afterwards
/// [`Self::read_packet`] yields results until the peer disconnects.
pub struct ServerConnection<S> {
    stream: S,
    cipher: PacketCipher,
    version: &'static PacketVersion,
}

impl<S: AsyncRead + AsyncWrite + Unpin> ServerConnection<S> {
    /// Take ownership of an accepted stream, generate the IV key, and send
    /// the handshake preamble.
    pub async fn open(stream: S, secret: impl Into<Vec<u8>>) -> Result<Self> {
        Self::open_with_version(stream, secret, &PacketVersion::CLASSIC).await
    }

    pub async fn open_with_version(
        mut stream: S,
        secret: impl Into<Vec<u8>>,
        version: &'static PacketVersion,
    ) -> Result<Self> {
        let preamble = ServerPreamble::generate()?;
        stream.write_all(&preamble.to_bytes()).await?;
        stream.flush().await?;

        Ok(Self {
            stream,
            cipher: PacketCipher::new(preamble.iv_key.to_vec(), secret.into()),
            version,
        })
    }

    /// Read, decrypt, and parse the next packet.
    ///
    /// Returns `Ok(None)` on a clean end-of-stream at a packet boundary; a
    /// disconnect mid-packet is an I/O error. On a checksum failure against
    /// the shortest registered layout, reads on to the next length and
    /// retries once with the longer layout, surfacing whatever that attempt
    /// produces. Any other parse failure propagates immediately.
    ///
    /// Note the inherited protocol quirk: a corrupted short packet and a
    /// valid long packet look identical until the fallback read has already
    /// consumed bytes, which can desynchronize the stream. Conformant peers
    /// never hit this; a misbehaving one loses the connection anyway.
    pub async fn read_packet(&mut self) -> Result<Option<CheckResult>> {
        let candidates = VersionRegistry::global()
            .candidates(self.version.version)
            .ok_or_else(|| {
                ProtocolError::ConfigError(format!(
                    "no packet layouts registered for version {}",
                    self.version.version
                ))
            })?;

        let first = candidates[0];
        let mut raw = vec![0u8; first.packet_len()];
        if !read_exact_or_eof(&mut self.stream, &mut raw).await? {
            return Ok(None);
        }

        let mut plain = raw.clone();
        self.cipher.apply(&mut plain);

        match first.decode(&plain) {
            Ok(result) => Ok(Some(result)),
            Err(err) if err.is_checksum_mismatch() => {
                let Some(&fallback) = candidates.get(1) else {
                    return Err(err);
                };
                debug!(
                    short = first.packet_len(),
                    long = fallback.packet_len(),
                    "checksum failed at short length, trying long layout"
                );

                let mut extra = vec![0u8; fallback.packet_len() - raw.len()];
                if !read_exact_or_eof(&mut self.stream, &mut extra).await? {
                    // Peer closed right at the short boundary, so no longer
                    // packet was ever coming: report the original failure.
                    return Err(err);
                }
                raw.extend_from_slice(&extra);

                // Fresh cipher over the whole concatenation, cursor back at 0.
                let mut plain = raw;
                self.cipher.apply(&mut plain);
                Ok(Some(fallback.decode(&plain)?))
            }
            Err(err) => Err(err),
        }
    }

    /// Close the underlying stream. Any concurrently blocked read fails
    /// promptly once the socket is gone.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

/// Fill `buf` completely, or report a clean end-of-stream.
///
/// `Ok(false)` means the peer closed before the first byte; closing after a
/// partial read is an `UnexpectedEof` error.
async fn read_exact_or_eof<S: AsyncRead + Unpin>(stream: &mut S, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed mid-packet",
            )
            .into());
        }
        filled += n;
    }
    Ok(true)
}
