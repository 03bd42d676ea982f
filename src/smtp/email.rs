//! Messages as received by the server

use std::time::SystemTime;

/// A message captured at the end of DATA
#[derive(Debug, Clone)]
pub struct Email {
    /// The envelope sender
    pub from: String,

    /// Envelope recipients, in RCPT order
    pub to: Vec<String>,

    /// Raw message data, headers and body, line terminators preserved
    pub data: String,

    /// When the message was received
    pub timestamp: SystemTime,
}

impl Email {
    pub fn new(from: &str, to: &[String], data: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_vec(),
            data: data.to_string(),
            timestamp: SystemTime::now(),
        }
    }

    /// Check if this email was sent to a specific recipient
    pub fn has_recipient(&self, recipient: &str) -> bool {
        self.to.iter().any(|addr| addr == recipient)
    }

    /// Get the subject line from the header block (if present)
    pub fn get_subject(&self) -> Option<&str> {
        self.data
            .lines()
            .take_while(|line| !line.is_empty())
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("subject").then(|| value.trim())
            })
    }

    /// Get the message body (content after the first empty line)
    pub fn get_body(&self) -> Option<&str> {
        ["\r\n\r\n", "\n\n"]
            .into_iter()
            .filter_map(|sep| self.data.find(sep).map(|at| at + sep.len()))
            .min()
            .map(|start| &self.data[start..])
    }
}
