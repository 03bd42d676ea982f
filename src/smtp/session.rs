//! SMTP session state management

use crate::smtp::error::SmtpError;

/// Represents the current state of an SMTP session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpState {
    /// Initial state - waiting for HELO
    Initial,
    /// HELO received - ready for MAIL command
    GreetingReceived,
    /// MAIL FROM received - ready for RCPT commands
    MailReceived,
    /// At least one RCPT TO received - ready for DATA or more RCPT commands
    RecipientsReceived,
    /// DATA command accepted - collecting message data
    DataMode,
}

/// How strictly command order is enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencePolicy {
    /// Commands are accepted in any order. The sender and recipients survive
    /// a completed DATA, so DATA may be repeated without a new MAIL/RCPT.
    /// DATA still needs at least one recipient.
    #[default]
    Permissive,
    /// HELO, MAIL, RCPT, DATA must come in order; every delivered message
    /// clears the transaction.
    Strict,
}

/// Manages the state and data for a single SMTP session
#[derive(Debug)]
pub struct ServerSession {
    /// Current state of the session
    pub state: SmtpState,
    /// Client domain from HELO/EHLO
    pub client_domain: Option<String>,
    /// Sender address from MAIL FROM command
    pub from: Option<String>,
    /// List of recipients from RCPT TO commands
    pub to: Vec<String>,
    /// Raw body lines collected during DATA, terminators included
    pub data: String,
    policy: SequencePolicy,
}

impl ServerSession {
    /// Create a new SMTP session
    pub fn new(policy: SequencePolicy) -> Self {
        Self {
            state: SmtpState::Initial,
            client_domain: None,
            from: None,
            to: Vec::new(),
            data: String::new(),
            policy,
        }
    }

    pub fn policy(&self) -> SequencePolicy {
        self.policy
    }

    /// Reset the session to post-HELO state (clears transaction data)
    pub fn reset(&mut self) {
        self.state = SmtpState::GreetingReceived;
        self.from = None;
        self.to.clear();
        self.data.clear();
    }

    /// Record the peer identity from HELO/EHLO
    pub fn set_client_domain(&mut self, domain: &str) {
        self.client_domain = Some(domain.to_string());
        match self.policy {
            SequencePolicy::Strict => self.reset(),
            SequencePolicy::Permissive => self.state = SmtpState::GreetingReceived,
        }
    }

    /// Set the sender address
    pub fn set_sender(&mut self, sender: &str) -> Result<(), SmtpError> {
        self.require("MAIL", "MAIL command requires HELO first")?;

        if self.policy == SequencePolicy::Strict {
            self.to.clear();
        }
        self.from = Some(sender.to_string());
        self.state = SmtpState::MailReceived;
        Ok(())
    }

    /// Add a recipient address
    pub fn add_recipient(&mut self, recipient: &str) -> Result<(), SmtpError> {
        self.require("RCPT", "RCPT command requires MAIL first")?;

        self.to.push(recipient.to_string());
        self.state = SmtpState::RecipientsReceived;
        Ok(())
    }

    /// Start data collection mode.
    ///
    /// Without recipients DATA is refused: a plain rejection when permissive,
    /// a sequence error when strict.
    pub fn start_data_mode(&mut self) -> Result<(), SmtpError> {
        if self.to.is_empty() && self.policy == SequencePolicy::Permissive {
            return Err(SmtpError::Rejected("no recipients".to_string()));
        }
        self.require("DATA", "DATA command requires RCPT first")?;

        self.data.clear();
        self.state = SmtpState::DataMode;
        Ok(())
    }

    /// Append one raw line of message data
    pub fn add_data_line(&mut self, line: &str) {
        self.data.push_str(line);
    }

    /// Leave data mode once the message has been handed off
    pub fn finish_data_collection(&mut self) {
        match self.policy {
            SequencePolicy::Strict => self.reset(),
            SequencePolicy::Permissive => self.state = SmtpState::RecipientsReceived,
        }
    }

    /// Check if the session is ready for a specific command
    pub fn can_execute_command(&self, command: &str) -> bool {
        match command.to_uppercase().as_str() {
            "HELO" | "EHLO" | "QUIT" => true,
            "DATA" if self.to.is_empty() => false,
            _ if self.policy == SequencePolicy::Permissive => true,
            "MAIL" => self.state == SmtpState::GreetingReceived,
            "RCPT" => {
                self.state == SmtpState::MailReceived || self.state == SmtpState::RecipientsReceived
            }
            "DATA" => self.state == SmtpState::RecipientsReceived,
            _ => false,
        }
    }

    fn require(&self, command: &str, reason: &str) -> Result<(), SmtpError> {
        if self.can_execute_command(command) {
            Ok(())
        } else {
            Err(SmtpError::InvalidState(reason.to_string()))
        }
    }
}

impl Default for ServerSession {
    fn default() -> Self {
        Self::new(SequencePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> ServerSession {
        ServerSession::new(SequencePolicy::Strict)
    }

    #[test]
    fn test_new_session() {
        let session = ServerSession::default();
        assert_eq!(session.state, SmtpState::Initial);
        assert_eq!(session.policy(), SequencePolicy::Permissive);
        assert!(session.from.is_none());
        assert!(session.to.is_empty());
        assert!(session.data.is_empty());
        assert!(session.client_domain.is_none());
    }

    #[test]
    fn test_permissive_accepts_rcpt_before_mail() {
        let mut session = ServerSession::default();
        session.add_recipient("b@y.com").unwrap();
        session.set_sender("a@x.com").unwrap();

        assert_eq!(session.from.as_deref(), Some("a@x.com"));
        assert_eq!(session.to, vec!["b@y.com".to_string()]);
        assert!(session.start_data_mode().is_ok());
    }

    #[test]
    fn test_data_requires_a_recipient() {
        let mut session = ServerSession::default();
        session.set_sender("a@x.com").unwrap();

        let result = session.start_data_mode();
        assert!(matches!(result, Err(SmtpError::Rejected(_))));
        assert_eq!(result.unwrap_err().to_response_code(), 550);
        assert_eq!(session.state, SmtpState::MailReceived);

        let mut session = strict();
        session.set_client_domain("client.local");
        session.set_sender("a@x.com").unwrap();

        let result = session.start_data_mode();
        assert!(matches!(result, Err(SmtpError::InvalidState(_))));
        assert_eq!(result.unwrap_err().to_response_code(), 503);
    }

    #[test]
    fn test_permissive_keeps_transaction_after_data() {
        let mut session = ServerSession::default();
        session.set_sender("a@x.com").unwrap();
        session.add_recipient("b@y.com").unwrap();
        session.start_data_mode().unwrap();
        session.add_data_line("line1\n");
        session.finish_data_collection();

        assert_eq!(session.state, SmtpState::RecipientsReceived);
        session.start_data_mode().unwrap();
        assert!(session.data.is_empty());
        assert_eq!(session.to, vec!["b@y.com".to_string()]);
    }

    #[test]
    fn test_strict_ordering() {
        let mut session = strict();
        assert!(matches!(
            session.set_sender("a@x.com"),
            Err(SmtpError::InvalidState(_))
        ));

        session.set_client_domain("client.local");
        assert!(matches!(
            session.add_recipient("b@y.com"),
            Err(SmtpError::InvalidState(_))
        ));

        session.set_sender("a@x.com").unwrap();
        assert!(session.start_data_mode().is_err());

        session.add_recipient("b@y.com").unwrap();
        session.start_data_mode().unwrap();
        assert_eq!(session.state, SmtpState::DataMode);
    }

    #[test]
    fn test_strict_resets_after_data() {
        let mut session = strict();
        session.set_client_domain("client.local");
        session.set_sender("a@x.com").unwrap();
        session.add_recipient("b@y.com").unwrap();
        session.start_data_mode().unwrap();
        session.finish_data_collection();

        assert_eq!(session.state, SmtpState::GreetingReceived);
        assert!(session.from.is_none());
        assert!(session.to.is_empty());
        assert!(session.start_data_mode().is_err());
        assert_eq!(session.client_domain.as_deref(), Some("client.local"));
    }

    #[test]
    fn test_can_execute_command() {
        let mut session = strict();

        // Initial state
        assert!(session.can_execute_command("HELO"));
        assert!(session.can_execute_command("ehlo"));
        assert!(session.can_execute_command("QUIT"));
        assert!(!session.can_execute_command("MAIL"));
        assert!(!session.can_execute_command("RCPT"));
        assert!(!session.can_execute_command("DATA"));

        // After HELO
        session.set_client_domain("client.local");
        assert!(session.can_execute_command("MAIL"));
        assert!(!session.can_execute_command("RCPT"));

        // After MAIL
        session.set_sender("sender@example.com").unwrap();
        assert!(session.can_execute_command("RCPT"));
        assert!(!session.can_execute_command("DATA"));

        // After RCPT
        session.add_recipient("recipient@example.com").unwrap();
        assert!(session.can_execute_command("DATA"));
        assert!(session.can_execute_command("RCPT"));
    }
}
