//! Outbound channel to the visualisation
//!
//! The channel is connect-once and write-only. A send blocks until the
//! operating system accepts the bytes; a stalled reader stalls the bridge.

use log::info;
use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

/// A write-only byte channel carrying complete frames
///
/// Implementations may add buffering or a drop policy, but must deliver
/// frames in the order they were sent.
pub trait Transport {
    /// Write one complete frame
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;

    fn close(&mut self) -> io::Result<()>;
}

/// Plain TCP connection to the visualisation
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    pub fn connect(host: &str, port: u16) -> io::Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        info!("Connected to visualisation at {peer}");
        Ok(Self { stream, peer })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.stream.write_all(frame)
    }

    fn close(&mut self) -> io::Result<()> {
        self.stream.flush()?;
        match self.stream.shutdown(Shutdown::Both) {
            // The peer already hung up; nothing left to close
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}
