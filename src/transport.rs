//! The byte-level transport a [`crate::framing::Framing`] reads and writes
//! through.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::ConnectionError;

/// Connect timeout used by [`TcpTransport::connect`].
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The narrow byte-stream contract [`crate::framing::Framing`] needs.
///
/// Implement this to run the protocol over anything other than a real TCP
/// socket — an in-memory buffer for tests, a TLS stream, a serial link.
///
/// `Send` is required so a [`crate::Session`] built over a `Transport` can be
/// moved to another thread; `Session` carries no implicit cross-thread
/// sharing of its own, but it must not be trapped on the thread that created
/// it either.
pub trait Transport: Send {
    /// Writes the entirety of `buf`, blocking until done.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), ConnectionError>;
    /// Fills `buf` completely, blocking until done.
    ///
    /// A peer that closes the connection before `buf` is full is reported
    /// as [`ConnectionError::Closed`], not a short read.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ConnectionError>;
    /// Shuts the transport down. Always succeeds from the caller's
    /// perspective; a transport that is already closed, or that fails to
    /// shut down cleanly, is not an error worth reporting since the caller
    /// is discarding it either way.
    fn close(&mut self);
}

/// A blocking [`Transport`] over a plain TCP socket.
///
/// This is the reference transport used by [`crate::login`]. It carries no
/// TLS support; wrap a [`TcpStream`] (or any other [`Read`] + [`Write`]
/// stream) in your own [`Transport`] impl for that.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connects to `addr`, failing with [`ConnectionError::Timeout`] if the
    /// connection does not complete within 10 seconds.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, ConnectionError> {
        let addr = resolve(addr)?;
        let stream =
            TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(|err| match err.kind() {
                std::io::ErrorKind::TimedOut => ConnectionError::Timeout,
                _ => ConnectionError::Io(err),
            })?;
        stream.set_nodelay(true).map_err(ConnectionError::Io)?;
        Ok(Self { stream })
    }
}

fn resolve(addr: impl ToSocketAddrs) -> Result<SocketAddr, ConnectionError> {
    addr.to_socket_addrs()
        .map_err(ConnectionError::Io)?
        .next()
        .ok_or_else(|| {
            ConnectionError::Io(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "address did not resolve to anything",
            ))
        })
}

impl Transport for TcpTransport {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), ConnectionError> {
        self.stream.write_all(buf).map_err(ConnectionError::Io)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ConnectionError> {
        match self.stream.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(ConnectionError::Closed)
            }
            Err(err) => Err(ConnectionError::Io(err)),
        }
    }

    fn close(&mut self) {
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! An in-memory [`Transport`] for tests elsewhere in the crate.
    use super::*;
    use std::collections::VecDeque;

    /// A [`Transport`] backed by two in-memory byte queues: one the code
    /// under test writes into, one it reads from.
    #[derive(Default)]
    pub struct FakeTransport {
        pub written: Vec<u8>,
        pub to_read: VecDeque<u8>,
        pub closed: bool,
    }

    impl FakeTransport {
        /// Builds a fake transport pre-loaded with `scripted` bytes to read.
        pub fn with_script(scripted: &[u8]) -> Self {
            Self {
                written: Vec::new(),
                to_read: scripted.iter().copied().collect(),
                closed: false,
            }
        }
    }

    impl Transport for FakeTransport {
        fn write_all(&mut self, buf: &[u8]) -> Result<(), ConnectionError> {
            self.written.extend_from_slice(buf);
            Ok(())
        }

        fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ConnectionError> {
            if self.to_read.len() < buf.len() {
                return Err(ConnectionError::Closed);
            }
            for byte in buf {
                *byte = self.to_read.pop_front().expect("checked length above");
            }
            Ok(())
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeTransport;
    use super::*;

    #[test]
    fn fake_transport_round_trips_written_and_read_bytes() {
        let mut t = FakeTransport::with_script(&[1, 2, 3]);
        t.write_all(&[9, 9]).unwrap();
        assert_eq!(t.written, vec![9, 9]);

        let mut buf = [0u8; 2];
        t.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);

        let mut buf = [0u8; 2];
        assert!(matches!(
            t.read_exact(&mut buf),
            Err(ConnectionError::Closed)
        ));
    }

    #[test]
    fn close_marks_fake_transport_closed() {
        let mut t = FakeTransport::default();
        t.close();
        assert!(t.closed);
    }
}
