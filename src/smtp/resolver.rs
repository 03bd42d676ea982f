//! MX host resolution

use crate::smtp::error::SmtpError;

use trust_dns_resolver::Resolver;
use trust_dns_resolver::error::ResolveErrorKind;

/// One mail-exchange record: preference and exchange host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub host: String,
}

impl MxRecord {
    pub fn new(preference: u16, host: &str) -> Self {
        Self {
            preference,
            host: host.to_string(),
        }
    }
}

/// Source of MX records for a domain.
///
/// An empty record set is a valid answer, not an error.
pub trait MxResolver: Send {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, SmtpError>;
}

/// MX lookups through the system DNS configuration
pub struct DnsResolver {
    resolver: Resolver,
}

impl DnsResolver {
    /// Create a resolver from `/etc/resolv.conf` (or the platform equivalent)
    pub fn from_system_conf() -> Result<Self, SmtpError> {
        let resolver = Resolver::from_system_conf().map_err(|e| SmtpError::Resolution {
            domain: "<system configuration>".to_string(),
            source: Box::new(e),
        })?;
        Ok(Self { resolver })
    }
}

impl MxResolver for DnsResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, SmtpError> {
        match self.resolver.mx_lookup(domain) {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| MxRecord {
                    preference: mx.preference(),
                    host: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                })
                .collect()),
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                log::debug!("No MX records for {domain}");
                Ok(Vec::new())
            }
            Err(e) => Err(SmtpError::Resolution {
                domain: domain.to_string(),
                source: Box::new(e),
            }),
        }
    }
}

/// Resolve `domain` to its mail hosts, most preferred first.
///
/// The sort is stable so hosts sharing a preference keep their record order.
pub fn resolve_mx_hosts(resolver: &dyn MxResolver, domain: &str) -> Result<Vec<String>, SmtpError> {
    let mut records = resolver.lookup_mx(domain)?;
    records.sort_by_key(|record| record.preference);
    Ok(records.into_iter().map(|record| record.host).collect())
}
