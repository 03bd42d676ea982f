//! SMTP reply lines, in both directions

use crate::smtp::error::SmtpError;

/// A single-line SMTP reply: a 3-digit code and free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpResponse {
    /// The SMTP reply code (e.g. 250, 354, 500)
    pub code: u16,
    /// The human-readable message
    pub message: String,
}

impl SmtpResponse {
    /// Create a new SMTP response
    pub fn new(code: u16, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    /// Create a success response (250 OK)
    pub fn ok() -> Self {
        Self::new(250, "OK")
    }

    /// Create a greeting response (220)
    pub fn greeting(hostname: &str) -> Self {
        Self::new(220, &format!("{hostname} SMTP Server Ready"))
    }

    /// Create a HELO/EHLO response (250)
    pub fn helo(client_domain: &str) -> Self {
        Self::new(250, &format!("Hello {client_domain}"))
    }

    /// Create a DATA intermediate response (354)
    pub fn data_start() -> Self {
        Self::new(354, "Start mail input; end with <CRLF>.<CRLF>")
    }

    /// Create a QUIT response (221)
    pub fn quit() -> Self {
        Self::new(221, "Bye")
    }

    /// Create a response describing a server-side error
    pub fn from_error(error: &SmtpError) -> Self {
        Self {
            code: error.to_response_code(),
            message: error.to_response_message(),
        }
    }

    /// Parse a reply line read from a server.
    ///
    /// Accepts both `250 text` and the continuation form `250-text`; the
    /// trailing line terminator is ignored.
    pub fn parse(line: &str) -> Result<Self, SmtpError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let digits = line.get(..3).unwrap_or_default();
        if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SmtpError::MalformedResponse(line.to_string()));
        }
        let code = digits
            .parse()
            .map_err(|_| SmtpError::MalformedResponse(line.to_string()))?;

        let message = match line[3..].chars().next() {
            None => "",
            Some(' ') | Some('-') => &line[4..],
            Some(_) => return Err(SmtpError::MalformedResponse(line.to_string())),
        };

        Ok(Self::new(code, message))
    }

    /// Format the response for sending over the wire
    pub fn format(&self) -> String {
        format!("{} {}\r\n", self.code, self.message)
    }

    /// Check if this is a success response (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Check if this is an error response (4xx or 5xx)
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code)
    }
}
