use const_oid::AssociatedOid;
use der::asn1::OctetString;
use der::oid::ObjectIdentifier;
use der::{Decode, Encode};
use sha1::{Digest, Sha1};
use url::Url;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::{Error, Result};
use crate::san::SanEntry;

/// Trait for converting typed extensions to and from DER extension values.
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

/// The Subject Alternative Name extension: DNS names and absolute URIs.
#[derive(Debug, Clone)]
pub struct SubjectAltName {
    pub entries: Vec<SanEntry>,
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let san = x509_cert::ext::pkix::SubjectAltName(
            self.entries
                .iter()
                .map(SanEntry::to_general_name)
                .collect::<Result<Vec<_>>>()?,
        );
        Ok(san.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let entries = san
            .0
            .iter()
            .map(|name| match name {
                GeneralName::DnsName(dns) => Ok(SanEntry::Dns(dns.to_string())),
                GeneralName::UniformResourceIdentifier(uri) => Url::parse(&uri.to_string())
                    .map(SanEntry::Uri)
                    .map_err(|e| Error::Format(format!("invalid URI general name: {e}"))),
                _ => Err(Error::Format("unsupported general name type".to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }
}

/// The Basic Constraints extension: CA flag and optional path length.
#[derive(Debug, Clone, Default)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u32>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length.map(|v| v as u8),
        };
        Ok(bc.to_der()?)
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint.map(|v| v as u32),
        })
    }
}

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

/// The Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = X509KeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let ku = X509KeyUsage(self.0);
        Ok(ku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// The Extended Key Usage extension.
#[derive(Debug, Clone, Default)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let oids: Vec<ObjectIdentifier> = self.usage.iter().map(|v| (*v).into()).collect();
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(oids);
        Ok(eku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        let usage = eku
            .0
            .iter()
            .map(|v| ExtendedKeyUsageOption::try_from(*v))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { usage })
    }
}

/// Key purposes carried by the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
}

impl TryFrom<ObjectIdentifier> for ExtendedKeyUsageOption {
    type Error = Error;

    fn try_from(oid: ObjectIdentifier) -> Result<Self> {
        if oid == const_oid::db::rfc5912::ID_KP_SERVER_AUTH {
            Ok(ExtendedKeyUsageOption::ServerAuth)
        } else if oid == const_oid::db::rfc5912::ID_KP_CLIENT_AUTH {
            Ok(ExtendedKeyUsageOption::ClientAuth)
        } else if oid == const_oid::db::rfc5912::ID_KP_CODE_SIGNING {
            Ok(ExtendedKeyUsageOption::CodeSigning)
        } else if oid == const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION {
            Ok(ExtendedKeyUsageOption::EmailProtection)
        } else {
            Err(Error::Format(
                "unsupported extended key usage option".to_string(),
            ))
        }
    }
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsageOption::EmailProtection => {
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION
            }
        }
    }
}

/// The Subject Key Identifier extension.
///
/// The identifier is the SHA-1 digest of the subject public key bit string,
/// the RFC 5280 4.2.1.2 method (1) derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKeyIdentifier {
    pub key_identifier: Vec<u8>,
}

impl SubjectKeyIdentifier {
    /// Derives the identifier from a subject public key.
    pub fn from_spki(spki: &SubjectPublicKeyInfoOwned) -> Self {
        let digest = Sha1::digest(spki.subject_public_key.raw_bytes());
        Self {
            key_identifier: digest.to_vec(),
        }
    }
}

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier(OctetString::new(
            self.key_identifier.as_slice(),
        )?);
        Ok(ski.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self {
            key_identifier: ski.0.as_bytes().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_constraints_encode_and_decode() {
        let original = BasicConstraints {
            is_ca: true,
            max_path_length: Some(0),
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original.is_ca, decoded.is_ca);
        assert_eq!(original.max_path_length, decoded.max_path_length);
    }

    #[test]
    fn key_usage_encodes_and_decodes() {
        let original = KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment);
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = KeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn extended_key_usage_encodes_and_decodes() {
        let original = ExtendedKeyUsage {
            usage: vec![ExtendedKeyUsageOption::ServerAuth],
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = ExtendedKeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original.usage, decoded.usage);
    }

    #[test]
    fn subject_alt_name_carries_dns_and_uri_entries() {
        let original = SubjectAltName {
            entries: vec![
                SanEntry::Dns("a.com".to_string()),
                SanEntry::Uri(Url::parse("https://c.com/").unwrap()),
            ],
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original.entries, decoded.entries);
    }

    #[test]
    fn subject_key_identifier_is_a_sha1_digest() {
        let ski = SubjectKeyIdentifier {
            key_identifier: vec![7; 20],
        };
        let encoded = ski.to_x509_extension_value().unwrap();
        let decoded = SubjectKeyIdentifier::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(decoded.key_identifier.len(), 20);
        assert_eq!(ski, decoded);
    }
}
