//! Command line tokenizing

use crate::smtp::error::SmtpError;

/// A parsed client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// HELO or EHLO with the client's domain
    Helo(String),
    /// MAIL FROM with the reverse path
    Mail(String),
    /// RCPT TO with the forward path
    Rcpt(String),
    Data,
    Quit,
}

impl Command {
    /// Parse a trimmed command line.
    ///
    /// The verb is case-insensitive. Unknown verbs fail with
    /// [`SmtpError::InvalidCommand`]; known verbs with unusable arguments fail
    /// with [`SmtpError::InvalidSyntax`].
    pub fn parse(command_line: &str) -> Result<Self, SmtpError> {
        let mut parts = command_line.split_whitespace();
        let verb = parts.next().ok_or(SmtpError::InvalidCommand)?.to_uppercase();
        let args: Vec<&str> = parts.collect();

        match verb.as_str() {
            "HELO" | "EHLO" => args
                .first()
                .map(|domain| Command::Helo(domain.to_string()))
                .ok_or_else(|| {
                    SmtpError::InvalidSyntax(format!("{verb} requires domain argument"))
                }),
            "MAIL" => path_argument(&args, "FROM:")
                .map(Command::Mail)
                .ok_or_else(|| {
                    SmtpError::InvalidSyntax(
                        "MAIL command must be 'MAIL FROM:<address>'".to_string(),
                    )
                }),
            "RCPT" => path_argument(&args, "TO:")
                .map(Command::Rcpt)
                .ok_or_else(|| {
                    SmtpError::InvalidSyntax("RCPT command must be 'RCPT TO:<address>'".to_string())
                }),
            "DATA" => Ok(Command::Data),
            "QUIT" => Ok(Command::Quit),
            _ => Err(SmtpError::InvalidCommand),
        }
    }
}

/// Extract the address following `prefix` (matched case-insensitively).
///
/// Arguments are rejoined first so `FROM: a@x.com` and `FROM:<a@x.com>` both
/// work. Surrounding whitespace and one pair of angle brackets are removed.
fn path_argument(args: &[&str], prefix: &str) -> Option<String> {
    let joined = args.join(" ");
    let head = joined.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }

    let path = joined[prefix.len()..].trim();
    let path = path
        .strip_prefix('<')
        .and_then(|p| p.strip_suffix('>'))
        .unwrap_or(path);
    Some(path.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helo_and_ehlo() {
        assert_eq!(
            Command::parse("HELO client.local").unwrap(),
            Command::Helo("client.local".to_string())
        );
        assert_eq!(
            Command::parse("ehlo h").unwrap(),
            Command::Helo("h".to_string())
        );
    }

    #[test]
    fn test_helo_missing_domain() {
        assert!(matches!(
            Command::parse("HELO"),
            Err(SmtpError::InvalidSyntax(_))
        ));
    }

    #[test]
    fn test_mail_forms() {
        for line in [
            "MAIL FROM: a@x.com",
            "MAIL FROM:<a@x.com>",
            "mail from:a@x.com",
            "MAIL FROM: <a@x.com>",
        ] {
            assert_eq!(
                Command::parse(line).unwrap(),
                Command::Mail("a@x.com".to_string()),
                "{line}"
            );
        }
    }

    #[test]
    fn test_null_reverse_path() {
        assert_eq!(
            Command::parse("MAIL FROM:<>").unwrap(),
            Command::Mail(String::new())
        );
    }

    #[test]
    fn test_rcpt() {
        assert_eq!(
            Command::parse("RCPT TO:<b@y.com>").unwrap(),
            Command::Rcpt("b@y.com".to_string())
        );
        assert_eq!(
            Command::parse("Rcpt To: b@y.com").unwrap(),
            Command::Rcpt("b@y.com".to_string())
        );
    }

    #[test]
    fn test_missing_prefix_is_syntax_error() {
        assert!(matches!(
            Command::parse("MAIL sender@example.com"),
            Err(SmtpError::InvalidSyntax(_))
        ));
        assert!(matches!(
            Command::parse("RCPT"),
            Err(SmtpError::InvalidSyntax(_))
        ));
        assert!(matches!(
            Command::parse("RCPT FROM:<b@y.com>"),
            Err(SmtpError::InvalidSyntax(_))
        ));
    }

    #[test]
    fn test_data_and_quit() {
        assert_eq!(Command::parse("DATA").unwrap(), Command::Data);
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            Command::parse("VRFY someone"),
            Err(SmtpError::InvalidCommand)
        ));
        assert!(matches!(Command::parse(""), Err(SmtpError::InvalidCommand)));
    }
}
