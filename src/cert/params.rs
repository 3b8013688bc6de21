use core::str::FromStr;

use bon::Builder;
use const_oid::ObjectIdentifier;
use time::{Duration, OffsetDateTime};
use x509_cert::name::RdnSequence;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use super::extensions::ToAndFromX509Extension;
use crate::error::Result;
use crate::san::SanEntry;

/// Distinguished name parameters for a certificate subject or issuer.
///
/// Rendered as `CN=<cn>,O=<org>,L=<locality>,ST=<state>,C=<country>`, with
/// absent or empty parts skipped.
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
pub struct DistinguishedName {
    pub common_name: String,
    pub organization: Option<String>,
    pub locality: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl DistinguishedName {
    /// Renders the name into an X.509 RDN sequence.
    pub fn to_rdn_sequence(&self) -> Result<RdnSequence> {
        let mut parts = vec![format!("CN={}", self.common_name)];
        if let Some(organization) = non_empty(&self.organization) {
            parts.push(format!("O={organization}"));
        }
        if let Some(locality) = non_empty(&self.locality) {
            parts.push(format!("L={locality}"));
        }
        if let Some(state) = non_empty(&self.state) {
            parts.push(format!("ST={state}"));
        }
        if let Some(country) = non_empty(&self.country) {
            parts.push(format!("C={country}"));
        }
        Ok(RdnSequence::from_str(&parts.join(","))?)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Certificate validity period (`notBefore` .. `notAfter`).
#[derive(Clone, Copy, Debug)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// A validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }
}

/// The constraint role a certificate is signed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CertificateRole {
    /// Certificate authority: may sign other certificates.
    Ca,
    /// End-entity certificate: may not sign.
    Leaf,
}

/// A to-be-signed certificate description, alive for one signing call.
///
/// Signatures are always SHA-256 with PKCS#1 v1.5 padding; requests do not
/// vary the hash or padding, only the subject, role, SANs, and key size.
#[derive(Clone, Debug, Builder)]
pub struct CertificateRequest {
    pub subject: DistinguishedName,
    pub subject_public_key: SubjectPublicKeyInfoOwned,
    pub role: CertificateRole,
    #[builder(default)]
    pub sans: Vec<SanEntry>,
    /// RSA modulus size of the subject key, recorded for tracing.
    #[builder(default = 2048)]
    pub key_bits: u32,
}

/// A raw X.509 extension: OID, criticality, and DER-encoded value.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Encodes a typed extension into its raw form.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes the raw value back into a typed extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}
