//! SMTP client: host selection and the outbound transaction driver

use crate::smtp::address::group_by_domain;
use crate::smtp::channel::CommandChannel;
use crate::smtp::connector::{Dialer, TcpDialer, Transport, select_connection};
use crate::smtp::error::SmtpError;
use crate::smtp::message::Message;
use crate::smtp::resolver::{MxResolver, resolve_mx_hosts};

use std::time::Duration;

/// Reply code the client requires for EHLO in [`Compatibility::Legacy`] mode
pub const LEGACY_EHLO_CODE: u16 = 220;

/// How the client opens a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compatibility {
    /// Do not wait for the banner; EHLO must be answered with 220.
    /// Against a standard server this reads the banner as the EHLO reply.
    #[default]
    Legacy,
    /// Read the 220 banner after connecting, then require 250 for EHLO
    Standard,
}

/// Client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Fixed relay host; when set, MX resolution is skipped entirely
    pub host: Option<String>,
    pub port: u16,
    /// Connect timeout for each candidate host
    pub timeout: Duration,
    /// Name announced with EHLO
    pub local_identity: String,
    pub compatibility: Compatibility,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 25,
            timeout: Duration::from_secs(30),
            local_identity: "localhost".to_string(),
            compatibility: Compatibility::default(),
        }
    }
}

/// Progress of a single outbound transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Connected,
    Greeted,
    SenderSet,
    RecipientsSet,
    DataStarted,
    DataSent,
    Closed,
}

/// Sends messages by resolving each recipient domain and running one
/// transaction per domain
pub struct SmtpClient<D: Dialer = TcpDialer> {
    config: ClientConfig,
    resolver: Box<dyn MxResolver>,
    dialer: D,
}

impl SmtpClient<TcpDialer> {
    /// Create a client connecting over TCP
    pub fn new(config: ClientConfig, resolver: Box<dyn MxResolver>) -> Self {
        Self::with_dialer(config, resolver, TcpDialer)
    }
}

impl<D: Dialer> SmtpClient<D> {
    pub fn with_dialer(config: ClientConfig, resolver: Box<dyn MxResolver>, dialer: D) -> Self {
        Self {
            config,
            resolver,
            dialer,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `message` to all of its recipients.
    ///
    /// Domains are handled one after another; the first failing domain stops
    /// the send and later domains are not attempted.
    pub fn send(&self, message: &Message) -> Result<(), SmtpError> {
        let groups = group_by_domain(message.recipients())?;
        let content = message.serialize();
        for (domain, recipients) in groups {
            self.post_message(&domain, &message.from, &recipients, &content)?;
        }
        Ok(())
    }

    /// Candidate hosts for `domain`, most preferred first.
    ///
    /// Without an override this is the MX host list followed by the domain
    /// itself as the implicit exchange.
    pub fn candidate_hosts(&self, domain: &str) -> Result<Vec<String>, SmtpError> {
        if let Some(host) = &self.config.host {
            return Ok(vec![host.clone()]);
        }
        let mut hosts = resolve_mx_hosts(self.resolver.as_ref(), domain)?;
        hosts.push(domain.to_string());
        Ok(hosts)
    }

    /// Run one transaction delivering `content` to `recipients` at `domain`
    pub fn post_message(
        &self,
        domain: &str,
        from: &str,
        recipients: &[String],
        content: &str,
    ) -> Result<(), SmtpError> {
        if recipients.is_empty() {
            return Err(SmtpError::NoRecipients);
        }
        let hosts = self.candidate_hosts(domain)?;
        let conn = select_connection(&self.dialer, &hosts, self.config.port, self.config.timeout)?;

        let mut transaction = ClientTransaction::new(conn, &self.config);
        let result = transaction.run(from, recipients, content);
        transaction.close();

        match &result {
            Ok(()) => log::info!("Delivered to {} recipient(s) at {domain}", recipients.len()),
            Err(e) => log::warn!("Delivery to {domain} failed: {e}"),
        }
        result
    }
}

/// One outbound transaction over an established connection.
///
/// Performs no retries; [`ClientTransaction::close`] must be called on both
/// success and failure.
pub struct ClientTransaction<'a, T: Transport> {
    channel: Option<CommandChannel<T>>,
    config: &'a ClientConfig,
    state: ClientState,
}

impl<'a, T: Transport> ClientTransaction<'a, T> {
    pub fn new(transport: T, config: &'a ClientConfig) -> Self {
        Self {
            channel: Some(CommandChannel::new(transport)),
            config,
            state: ClientState::Connected,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Drive the transaction from greeting to the end of DATA, then QUIT.
    ///
    /// An empty `recipients` slice fails with [`SmtpError::NoRecipients`]
    /// after MAIL, before any RCPT or DATA is sent.
    pub fn run(
        &mut self,
        from: &str,
        recipients: &[String],
        content: &str,
    ) -> Result<(), SmtpError> {
        let config = self.config;
        let channel = self.channel.as_mut().ok_or_else(closed_error)?;

        let ehlo = format!("EHLO {}", config.local_identity);
        match config.compatibility {
            Compatibility::Legacy => {
                channel.execute(&ehlo, LEGACY_EHLO_CODE)?;
            }
            Compatibility::Standard => {
                channel.read_reply(220)?;
                channel.execute(&ehlo, 250)?;
            }
        }
        self.state = ClientState::Greeted;

        channel.execute(&format!("MAIL FROM: {from}"), 250)?;
        self.state = ClientState::SenderSet;

        if recipients.is_empty() {
            return Err(SmtpError::NoRecipients);
        }
        for rcpt in recipients {
            channel.execute(&format!("RCPT TO:<{rcpt}>"), 250)?;
        }
        self.state = ClientState::RecipientsSet;

        channel.execute("DATA", 354)?;
        self.state = ClientState::DataStarted;

        channel.write_payload(content.as_bytes())?;
        channel.write_payload(b"\r\n")?;
        channel.execute(".", 250)?;
        self.state = ClientState::DataSent;

        if let Err(e) = channel.execute("QUIT", 221) {
            log::debug!("QUIT not acknowledged: {e}");
        }
        Ok(())
    }

    /// Close the connection. Errors are logged and otherwise ignored.
    pub fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close() {
                log::debug!("Error closing connection: {e}");
            }
        }
        self.state = ClientState::Closed;
    }
}

impl<T: Transport> Drop for ClientTransaction<'_, T> {
    fn drop(&mut self) {
        self.close();
    }
}

fn closed_error() -> SmtpError {
    SmtpError::Transport(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "transaction already closed",
    ))
}
