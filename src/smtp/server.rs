//! SMTP server: accept loop and per-connection state machine

use crate::smtp::commands::Command;
use crate::smtp::error::SmtpError;
use crate::smtp::handler::Handler;
use crate::smtp::response::SmtpResponse;
use crate::smtp::session::{SequencePolicy, ServerSession};

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

/// Accepts connections and serves each one on its own thread
#[derive(Debug, Clone)]
pub struct SmtpServer {
    /// Server hostname, announced in the greeting
    hostname: String,
    policy: SequencePolicy,
}

impl SmtpServer {
    /// Create a new SMTP server with the permissive command policy
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_owned(),
            policy: SequencePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SequencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bind `addr` and serve forever (blocking).
    ///
    /// `factory` builds one handler per accepted connection. Only a bind
    /// failure is returned; accept errors are logged and skipped.
    pub fn start<F, H>(&self, addr: &str, factory: F) -> Result<(), SmtpError>
    where
        F: Fn(&TcpStream) -> H,
        H: Handler + 'static,
    {
        let listener = TcpListener::bind(addr)?;
        self.start_with_listener(listener, factory)
    }

    /// Serve forever on an existing listener (blocking)
    pub fn start_with_listener<F, H>(
        &self,
        listener: TcpListener,
        factory: F,
    ) -> Result<(), SmtpError>
    where
        F: Fn(&TcpStream) -> H,
        H: Handler + 'static,
    {
        log::info!("SMTP server listening on {}", listener.local_addr()?);

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let handler = factory(&stream);
                    self.spawn_connection(stream, handler);
                }
                Err(e) => log::error!("Error accepting connection: {e}"),
            }
        }

        Ok(())
    }

    fn spawn_connection<H: Handler + 'static>(&self, stream: TcpStream, handler: H) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let hostname = self.hostname.clone();
        let policy = self.policy;

        log::debug!("Accepted connection from {peer}");
        let spawned = thread::Builder::new()
            .name(format!("smtp {peer}"))
            .spawn(move || {
                let result = stream
                    .try_clone()
                    .map_err(SmtpError::from)
                    .and_then(|reader| {
                        let reader = BufReader::new(reader);
                        Connection::new(reader, stream, handler, &hostname, policy).run()
                    });
                match result {
                    Ok(()) => log::debug!("Connection from {peer} closed"),
                    Err(e) => log::warn!("Connection from {peer} ended: {e}"),
                }
            });

        if let Err(e) = spawned {
            log::error!("Failed to spawn connection thread: {e}");
        }
    }
}

/// One server-side connection: the reader/writer pair, the session and the
/// handler serving it
pub struct Connection<'a, R: BufRead, W: Write, H: Handler> {
    reader: R,
    writer: W,
    handler: H,
    session: ServerSession,
    hostname: &'a str,
}

impl<'a, R: BufRead, W: Write, H: Handler> Connection<'a, R, W, H> {
    pub fn new(
        reader: R,
        writer: W,
        handler: H,
        hostname: &'a str,
        policy: SequencePolicy,
    ) -> Self {
        Self {
            reader,
            writer,
            handler,
            session: ServerSession::new(policy),
            hostname,
        }
    }

    /// Greet the client and process commands until QUIT or end of stream.
    ///
    /// Returns an error only for transport failures.
    pub fn run(mut self) -> Result<(), SmtpError> {
        self.send_response(&SmtpResponse::greeting(self.hostname))?;

        let mut line = Vec::new();
        loop {
            line.clear();
            if self.reader.read_until(b'\n', &mut line)? == 0 {
                break; // Connection closed
            }

            let text = String::from_utf8_lossy(&line);
            let command_line = text.trim();
            if command_line.is_empty() {
                continue;
            }
            log::debug!("C: {command_line}");

            let command = match Command::parse(command_line) {
                Ok(command) => command,
                Err(e) => {
                    self.send_response(&SmtpResponse::from_error(&e))?;
                    continue;
                }
            };

            match command {
                Command::Helo(domain) => {
                    let result = self.handler.on_helo(&mut self.session, &domain);
                    self.reply(result)?;
                }
                Command::Mail(from) => {
                    let result = self.handler.on_mail(&mut self.session, &from);
                    self.reply(result)?;
                }
                Command::Rcpt(to) => {
                    let result = self.handler.on_rcpt(&mut self.session, &to);
                    self.reply(result)?;
                }
                Command::Data => {
                    let result = self.handler.on_data(&mut self.session);
                    if self.reply(result)? == 354 && !self.receive_message()? {
                        break;
                    }
                }
                Command::Quit => {
                    let result = self.handler.on_quit(&mut self.session);
                    self.reply(result)?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Collect body lines up to the terminator and hand them to the handler.
    ///
    /// Returns `false` if the stream ended before the terminator.
    fn receive_message(&mut self) -> Result<bool, SmtpError> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(false);
            }
            if line == b".\r\n" || line == b".\n" {
                break;
            }
            self.session.add_data_line(&String::from_utf8_lossy(&line));
        }

        let session = &self.session;
        let result = self.handler.on_message(
            session.from.as_deref().unwrap_or_default(),
            &session.to,
            &session.data,
        );
        self.session.finish_data_collection();
        self.reply(result)?;
        Ok(true)
    }

    /// Send a hook's response, or the error reply if it failed.
    /// Returns the code that was sent.
    fn reply(&mut self, result: Result<SmtpResponse, SmtpError>) -> Result<u16, SmtpError> {
        let response = result.unwrap_or_else(|e| {
            log::warn!("Error handling command: {e}");
            SmtpResponse::from_error(&e)
        });
        self.send_response(&response)?;
        Ok(response.code)
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &SmtpResponse) -> Result<(), SmtpError> {
        log::debug!("S: {} {}", response.code, response.message);
        self.writer.write_all(response.format().as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}
