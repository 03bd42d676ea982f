//! Outbound messages and their wire form

/// A message to be sent.
///
/// `cc` and `bcc` only take part in routing: they become envelope
/// recipients but never appear in the header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub to: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub subject: String,
    pub body: String,
}

impl Message {
    pub fn new(from: &str) -> Self {
        Self {
            from: from.to_string(),
            ..Default::default()
        }
    }

    pub fn to(mut self, to: &str) -> Self {
        self.to = Some(to.to_string());
        self
    }

    pub fn cc(mut self, cc: &str) -> Self {
        self.cc = Some(cc.to_string());
        self
    }

    pub fn bcc(mut self, bcc: &str) -> Self {
        self.bcc = Some(bcc.to_string());
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Envelope recipients: primary, then secondary, then blind.
    /// Absent or empty fields are skipped.
    pub fn recipients(&self) -> Vec<&str> {
        [&self.to, &self.cc, &self.bcc]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .filter(|addr| !addr.is_empty())
            .collect()
    }

    /// Header block followed by a blank line and the body, verbatim
    pub fn serialize(&self) -> String {
        format!(
            "From: {}\nTo: {}\nSubject: {}\n\n{}",
            self.from,
            self.to.as_deref().unwrap_or_default(),
            self.subject,
            self.body
        )
    }
}
