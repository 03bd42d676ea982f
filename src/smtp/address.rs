//! Mailbox addresses and recipient grouping

use crate::smtp::error::SmtpError;

/// A `local@domain` mailbox address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub local: String,
    pub domain: String,
}

/// Split an address at its first `@`.
///
/// Everything after the first `@` belongs to the domain, further `@`
/// characters included.
pub fn parse_address(address: &str) -> Result<Address, SmtpError> {
    let (local, domain) = address
        .split_once('@')
        .ok_or_else(|| SmtpError::MalformedAddress(address.to_string()))?;

    if local.is_empty() || domain.is_empty() {
        return Err(SmtpError::MalformedAddress(address.to_string()));
    }

    Ok(Address {
        local: local.to_string(),
        domain: domain.to_string(),
    })
}

/// Recipients bucketed by domain.
///
/// Domains iterate in the order they were first seen and each bucket keeps
/// the order its recipients were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientGroup {
    buckets: Vec<(String, Vec<String>)>,
}

impl RecipientGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recipient to the bucket for `domain`
    pub fn insert(&mut self, domain: &str, recipient: String) {
        match self.buckets.iter_mut().find(|(d, _)| d == domain) {
            Some((_, recipients)) => recipients.push(recipient),
            None => self.buckets.push((domain.to_string(), vec![recipient])),
        }
    }

    /// Recipients for a single domain
    pub fn get(&self, domain: &str) -> Option<&[String]> {
        self.buckets
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, recipients)| recipients.as_slice())
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(domain, _)| domain.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.buckets
            .iter()
            .map(|(domain, recipients)| (domain.as_str(), recipients.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl IntoIterator for RecipientGroup {
    type Item = (String, Vec<String>);
    type IntoIter = std::vec::IntoIter<(String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

/// Group recipients by domain, failing on the first malformed address
pub fn group_by_domain<I, S>(recipients: I) -> Result<RecipientGroup, SmtpError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut group = RecipientGroup::new();
    for recipient in recipients {
        let recipient = recipient.as_ref();
        let address = parse_address(recipient)?;
        group.insert(&address.domain, recipient.to_string());
    }
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_address() {
        let address = parse_address("alice@example.com").unwrap();
        assert_eq!(address.local, "alice");
        assert_eq!(address.domain, "example.com");
    }

    #[test]
    fn test_parse_splits_at_first_at() {
        let address = parse_address("a@b@c.org").unwrap();
        assert_eq!(address.local, "a");
        assert_eq!(address.domain, "b@c.org");
    }

    #[test]
    fn test_parse_malformed() {
        for input in ["invalid", "", "@example.com", "user@", "@"] {
            assert!(
                matches!(
                    parse_address(input),
                    Err(SmtpError::MalformedAddress(ref s)) if s == input
                ),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_group_by_domain_preserves_order() {
        let recipients = [
            "a@x.com", "b@y.com", "c@x.com", "d@z.com", "e@y.com", "f@x.com",
        ];
        let group = group_by_domain(recipients).unwrap();

        assert_eq!(group.domains().collect::<Vec<_>>(), ["x.com", "y.com", "z.com"]);
        assert_eq!(group.get("x.com").unwrap(), ["a@x.com", "c@x.com", "f@x.com"]);
        assert_eq!(group.get("y.com").unwrap(), ["b@y.com", "e@y.com"]);
        assert_eq!(group.get("z.com").unwrap(), ["d@z.com"]);

        let mut flattened: Vec<&str> = group
            .iter()
            .flat_map(|(_, rcpts)| rcpts.iter().map(String::as_str))
            .collect();
        flattened.sort_unstable();
        let mut expected = recipients.to_vec();
        expected.sort_unstable();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_group_by_domain_fails_fast() {
        let result = group_by_domain(["a@x.com", "broken", "c@y.com"]);
        assert!(matches!(result, Err(SmtpError::MalformedAddress(ref s)) if s == "broken"));
    }

    #[test]
    fn test_group_empty() {
        let group = group_by_domain(Vec::<String>::new()).unwrap();
        assert!(group.is_empty());
        assert_eq!(group.len(), 0);
    }
}
