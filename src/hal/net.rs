//! Non-blocking `std::net` implementation of the stream-bridge traits.
//!
//! [`TcpBridgeListener`] accepts plain TCP clients for the serial console
//! bridge. The listener and every accepted socket run in non-blocking mode
//! so the bridge tick never stalls waiting for the network: an accept or
//! read that would block reports "nothing pending" instead.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use crate::traits::{StreamConnection, StreamListener};

/// TCP listener for the console bridge.
pub struct TcpBridgeListener {
    listener: TcpListener,
}

impl TcpBridgeListener {
    /// Bind a non-blocking listener on `addr` (e.g. `0.0.0.0:23`).
    pub fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener })
    }

    /// The locally bound address (useful when binding port 0 in tests).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl StreamListener for TcpBridgeListener {
    type Conn = TcpBridgeConn;
    type Error = std::io::Error;

    fn try_accept(&mut self) -> Result<Option<TcpBridgeConn>, std::io::Error> {
        match self.listener.accept() {
            Ok((stream, _addr)) => Ok(Some(TcpBridgeConn::new(stream)?)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// One accepted TCP client of the console bridge.
pub struct TcpBridgeConn {
    stream: TcpStream,
    open: bool,
}

impl TcpBridgeConn {
    fn new(stream: TcpStream) -> std::io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, open: true })
    }
}

impl StreamConnection for TcpBridgeConn {
    type Error = std::io::Error;

    fn is_open(&self) -> bool {
        self.open
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, std::io::Error> {
        match self.stream.read(buf) {
            // A zero-length read on a readable socket means the peer
            // closed; the slot becomes stale for later reclaim.
            Ok(0) => {
                self.open = false;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => {
                self.open = false;
                Err(e)
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), std::io::Error> {
        // Blocking-ish write: retry on WouldBlock so a batch is never
        // partially dropped. A slow client can stall the tick; acceptable
        // for low-rate console traffic.
        let mut remaining = bytes;
        while !remaining.is_empty() {
            match self.stream.write(remaining) {
                Ok(0) => {
                    self.open = false;
                    return Err(ErrorKind::WriteZero.into());
                }
                Ok(n) => remaining = &remaining[n..],
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::yield_now();
                }
                Err(e) => {
                    self.open = false;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
    }
}
