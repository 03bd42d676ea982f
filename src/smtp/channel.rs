//! Command/response correlation over a client connection

use crate::smtp::connector::Transport;
use crate::smtp::error::SmtpError;
use crate::smtp::response::SmtpResponse;

use std::io::{self, BufRead, BufReader};

/// Handle for a command whose reply has not been read yet.
///
/// Replies are read strictly in the order commands were issued.
#[must_use = "every issued command has a reply that must be resolved"]
#[derive(Debug, PartialEq, Eq)]
pub struct PendingResponse {
    id: u64,
}

impl PendingResponse {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A connection session: one transport plus the command sequence counters
#[derive(Debug)]
pub struct CommandChannel<T: Transport> {
    stream: BufReader<T>,
    next_id: u64,
    next_response: u64,
}

impl<T: Transport> CommandChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            stream: BufReader::new(transport),
            next_id: 0,
            next_response: 0,
        }
    }

    /// Write `line` followed by CRLF and return a handle for its reply
    pub fn send_command(&mut self, line: &str) -> Result<PendingResponse, SmtpError> {
        let id = self.next_id;
        self.next_id += 1;

        log::debug!("C[{id}]: {line}");
        let writer = self.stream.get_mut();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\r\n")?;
        writer.flush()?;

        Ok(PendingResponse { id })
    }

    /// Read the reply for `pending` and require `expected` as its code.
    ///
    /// Returns the reply text on a match.
    pub fn resolve(
        &mut self,
        pending: PendingResponse,
        expected: u16,
    ) -> Result<String, SmtpError> {
        if pending.id != self.next_response {
            return Err(SmtpError::OutOfOrderResponse {
                id: pending.id,
                expected: self.next_response,
            });
        }
        self.next_response += 1;

        let response = self.read_response()?;
        log::debug!("S[{}]: {} {}", pending.id, response.code, response.message);
        if response.code != expected {
            return Err(SmtpError::UnexpectedResponse {
                got: response.code,
                want: expected,
                text: response.message,
            });
        }
        Ok(response.message)
    }

    /// Issue a command and resolve its reply in one step
    pub fn execute(&mut self, line: &str, expected: u16) -> Result<String, SmtpError> {
        let pending = self.send_command(line)?;
        self.resolve(pending, expected)
    }

    /// Read an unsolicited reply such as the connection banner
    pub fn read_reply(&mut self, expected: u16) -> Result<String, SmtpError> {
        let response = self.read_response()?;
        log::debug!("S: {} {}", response.code, response.message);
        if response.code != expected {
            return Err(SmtpError::UnexpectedResponse {
                got: response.code,
                want: expected,
                text: response.message,
            });
        }
        Ok(response.message)
    }

    /// Write raw bytes without line framing
    pub fn write_payload(&mut self, payload: &[u8]) -> Result<(), SmtpError> {
        let writer = self.stream.get_mut();
        writer.write_all(payload)?;
        writer.flush()?;
        Ok(())
    }

    /// Close the underlying transport
    pub fn close(mut self) -> io::Result<()> {
        self.stream.get_mut().close()
    }

    fn read_response(&mut self) -> Result<SmtpResponse, SmtpError> {
        let mut line = String::new();
        if self.stream.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while awaiting a reply",
            )
            .into());
        }
        SmtpResponse::parse(&line)
    }
}
