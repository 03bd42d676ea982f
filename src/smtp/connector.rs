//! Outbound connection establishment

use crate::smtp::error::SmtpError;

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// A duplex byte stream that can be closed explicitly
pub trait Transport: Read + Write {
    fn close(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// Opens transports to remote hosts
pub trait Dialer {
    type Conn: Transport;

    fn dial(&self, host: &str, port: u16, timeout: Duration) -> io::Result<Self::Conn>;
}

/// Plain TCP dialer; each resolved socket address is tried with `timeout`
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Conn = TcpStream;

    fn dial(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
        let mut last_error = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{host} has no addresses"))
        }))
    }
}

/// Connect to the first reachable host, in list order.
///
/// Hosts after the first success are never attempted. Individual failures
/// only surface as the attempted list in [`SmtpError::NoReachableHost`].
pub fn select_connection<D: Dialer>(
    dialer: &D,
    hosts: &[String],
    port: u16,
    timeout: Duration,
) -> Result<D::Conn, SmtpError> {
    let mut attempted = Vec::with_capacity(hosts.len());
    for host in hosts {
        attempted.push(host.clone());
        match dialer.dial(host, port, timeout) {
            Ok(conn) => {
                log::debug!("Connected to {host}:{port}");
                return Ok(conn);
            }
            Err(e) => log::debug!("Connection to {host}:{port} failed: {e}"),
        }
    }
    Err(SmtpError::NoReachableHost { hosts: attempted })
}
