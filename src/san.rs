//! Subject Alternative Name parsing and classification.

use der::asn1::Ia5String;
use url::Url;
use x509_cert::ext::pkix::name::GeneralName;

use crate::error::Result;

/// A single classified Subject Alternative Name entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanEntry {
    /// A DNS name, including wildcard names such as `*.example.com`.
    Dns(String),
    /// An absolute URI.
    Uri(Url),
}

impl SanEntry {
    /// Converts the entry into an X.509 general name.
    ///
    /// Fails with a format error when the entry cannot be represented as an
    /// IA5 string (non-ASCII input).
    pub fn to_general_name(&self) -> Result<GeneralName> {
        match self {
            SanEntry::Dns(name) => {
                Ok(GeneralName::DnsName(Ia5String::try_from(name.clone())?))
            }
            SanEntry::Uri(url) => Ok(GeneralName::UniformResourceIdentifier(Ia5String::try_from(
                url.to_string(),
            )?)),
        }
    }
}

/// Classifies one SAN entry as either a DNS name or a URI.
///
/// Anything that parses as an absolute URL counts as a URI; everything else
/// is taken as a DNS name. `a.com` has no scheme and stays DNS, while
/// `https://a.com/` becomes a URI.
pub fn classify(entry: &str) -> SanEntry {
    match Url::parse(entry) {
        Ok(url) => SanEntry::Uri(url),
        Err(_) => SanEntry::Dns(entry.to_string()),
    }
}

/// Parses a comma-separated SAN list into classified entries.
///
/// Entries are trimmed and empty or whitespace-only items are dropped.
pub fn parse_san_list(raw: &str) -> Vec<SanEntry> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(classify)
        .collect()
}
