//! Pluggable per-connection command handlers

use crate::smtp::email::Email;
use crate::smtp::error::SmtpError;
use crate::smtp::response::SmtpResponse;
use crate::smtp::session::ServerSession;

use std::sync::mpsc;

/// Hooks invoked by a server connection for each command.
///
/// Only [`Handler::on_message`] is required. The other hooks implement the
/// default behaviour and can be overridden one command at a time. Any error
/// returned from a hook is reported to the client and the connection stays
/// open.
pub trait Handler: Send {
    /// Called once the terminator line of DATA has been read.
    ///
    /// The returned response is sent as the final reply to DATA. `data` holds
    /// the body lines with their terminators. Body bytes that are not valid
    /// UTF-8 arrive as U+FFFD replacement characters.
    fn on_message(
        &mut self,
        from: &str,
        to: &[String],
        data: &str,
    ) -> Result<SmtpResponse, SmtpError>;

    fn on_helo(
        &mut self,
        session: &mut ServerSession,
        domain: &str,
    ) -> Result<SmtpResponse, SmtpError> {
        session.set_client_domain(domain);
        Ok(SmtpResponse::helo(domain))
    }

    fn on_mail(
        &mut self,
        session: &mut ServerSession,
        from: &str,
    ) -> Result<SmtpResponse, SmtpError> {
        session.set_sender(from)?;
        Ok(SmtpResponse::ok())
    }

    fn on_rcpt(
        &mut self,
        session: &mut ServerSession,
        to: &str,
    ) -> Result<SmtpResponse, SmtpError> {
        session.add_recipient(to)?;
        Ok(SmtpResponse::ok())
    }

    /// Body lines are only read when the returned code is 354
    fn on_data(&mut self, session: &mut ServerSession) -> Result<SmtpResponse, SmtpError> {
        session.start_data_mode()?;
        Ok(SmtpResponse::data_start())
    }

    fn on_quit(&mut self, _session: &mut ServerSession) -> Result<SmtpResponse, SmtpError> {
        Ok(SmtpResponse::quit())
    }
}

/// Logs every received message and accepts it
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHandler;

impl Handler for LogHandler {
    fn on_message(
        &mut self,
        from: &str,
        to: &[String],
        data: &str,
    ) -> Result<SmtpResponse, SmtpError> {
        log::info!("Received message: from={from} to={to:?} size={}", data.len());
        Ok(SmtpResponse::ok())
    }
}

/// Forwards every received message to a channel
#[derive(Debug, Clone)]
pub struct ChannelHandler {
    sender: mpsc::Sender<Email>,
}

impl ChannelHandler {
    pub fn new(sender: mpsc::Sender<Email>) -> Self {
        Self { sender }
    }
}

impl Handler for ChannelHandler {
    fn on_message(
        &mut self,
        from: &str,
        to: &[String],
        data: &str,
    ) -> Result<SmtpResponse, SmtpError> {
        self.sender
            .send(Email::new(from, to, data))
            .map_err(|_| SmtpError::Rejected("no receiver for incoming mail".to_string()))?;
        Ok(SmtpResponse::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hooks_update_session() {
        let mut handler = LogHandler;
        let mut session = ServerSession::default();

        let response = handler.on_helo(&mut session, "client.local").unwrap();
        assert_eq!(response, SmtpResponse::helo("client.local"));
        assert_eq!(session.client_domain.as_deref(), Some("client.local"));

        handler.on_mail(&mut session, "a@x.com").unwrap();
        handler.on_rcpt(&mut session, "b@y.com").unwrap();
        assert_eq!(handler.on_data(&mut session).unwrap().code, 354);
        assert_eq!(handler.on_quit(&mut session).unwrap().code, 221);
    }

    #[test]
    fn test_channel_handler_forwards() {
        let (tx, rx) = mpsc::channel();
        let mut handler = ChannelHandler::new(tx);

        let response = handler
            .on_message("a@x.com", &["b@y.com".to_string()], "line1\n")
            .unwrap();
        assert_eq!(response.code, 250);

        let email = rx.try_recv().unwrap();
        assert_eq!(email.from, "a@x.com");
        assert_eq!(email.to, vec!["b@y.com"]);
        assert_eq!(email.data, "line1\n");
    }

    #[test]
    fn test_channel_handler_without_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut handler = ChannelHandler::new(tx);

        let result = handler.on_message("a@x.com", &["b@y.com".to_string()], "line1\n");
        assert!(matches!(result, Err(SmtpError::Rejected(_))));
    }
}
