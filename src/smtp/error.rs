//! Error types shared by the client and server halves

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmtpError {
    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    #[error("Failed to resolve MX records for {domain}: {source}")]
    Resolution {
        domain: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No reachable host among {hosts:?}")]
    NoReachableHost { hosts: Vec<String> },

    #[error("Transaction has no recipients")]
    NoRecipients,

    #[error("Unexpected response {got} (expected {want}): {text}")]
    UnexpectedResponse { got: u16, want: u16, text: String },

    #[error("Malformed response line: {0:?}")]
    MalformedResponse(String),

    #[error("Response {id} resolved before response {expected}")]
    OutOfOrderResponse { id: u64, expected: u64 },

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Invalid command")]
    InvalidCommand,

    #[error("Invalid syntax")]
    InvalidSyntax(String),

    #[error("Invalid state for command")]
    InvalidState(String),

    #[error("Message rejected: {0}")]
    Rejected(String),
}

/// Maps SMTP errors to the reply sent back to a client
impl SmtpError {
    pub fn to_response_code(&self) -> u16 {
        match self {
            SmtpError::InvalidCommand => 500,
            SmtpError::InvalidSyntax(_) => 501,
            SmtpError::InvalidState(_) => 503,
            _ => 550,
        }
    }

    pub fn to_response_message(&self) -> String {
        match self {
            SmtpError::InvalidCommand => "Command not recognized".to_string(),
            SmtpError::InvalidSyntax(_) => "Syntax error in parameters or arguments".to_string(),
            SmtpError::InvalidState(msg) => format!("Bad sequence of commands: {msg}"),
            SmtpError::Rejected(msg) => format!("Requested action not taken: {msg}"),
            _ => "Error handling command".to_string(),
        }
    }

    /// Whether the error came from the transport rather than the peer
    pub fn is_transport(&self) -> bool {
        matches!(self, SmtpError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_side_codes() {
        assert_eq!(SmtpError::InvalidCommand.to_response_code(), 500);
        assert_eq!(
            SmtpError::InvalidSyntax("MAIL".to_string()).to_response_code(),
            501
        );
        assert_eq!(
            SmtpError::InvalidState("RCPT".to_string()).to_response_code(),
            503
        );
        assert_eq!(
            SmtpError::Rejected("mailbox full".to_string()).to_response_code(),
            550
        );
    }

    #[test]
    fn test_other_errors_map_to_550() {
        let err = SmtpError::MalformedAddress("nobody".to_string());
        assert_eq!(err.to_response_code(), 550);
        assert_eq!(err.to_response_message(), "Error handling command");
    }

    #[test]
    fn test_unexpected_response_display() {
        let err = SmtpError::UnexpectedResponse {
            got: 500,
            want: 250,
            text: "Command not recognized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected response 500 (expected 250): Command not recognized"
        );
    }

    #[test]
    fn test_is_transport() {
        let err: SmtpError = std::io::Error::from(std::io::ErrorKind::BrokenPipe).into();
        assert!(err.is_transport());
        assert!(!SmtpError::InvalidCommand.is_transport());
    }
}
