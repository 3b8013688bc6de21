//! Root CA creation and certificate signing.

use std::fmt;
use std::sync::Arc;

use bon::Builder;
use der::Encode;
use der::asn1::BitString;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info};
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::extensions::{
    BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage, KeyUsages,
    SubjectAltName, SubjectKeyIdentifier,
};
use crate::cert::params::{
    CertificateRequest, CertificateRole, DistinguishedName, ExtensionParam, Validity,
};
use crate::error::{Error, Result};
use crate::key::KeyPair;
use crate::serial;
use crate::store::CaStore;
use crate::tbs_certificate::{TbsCertificate, sha256_with_rsa_encryption};

/// RSA modulus size for CA signing keys.
pub const CA_KEY_BITS: usize = 4096;
/// CA certificates are valid for ten years.
pub const CA_VALIDITY_DAYS: i64 = 3650;
/// Leaf certificates are valid for one year.
pub const LEAF_VALIDITY_DAYS: i64 = 365;

/// Identity attributes of a certificate authority.
#[derive(Clone, Debug, Builder)]
pub struct CaIdentity {
    pub name: String,
    pub common_name: String,
    pub organization: String,
    /// Two-letter country code.
    pub country: String,
    pub state: String,
    pub locality: String,
}

impl Default for CaIdentity {
    /// The identity used when bootstrapping a CA on first issuance.
    fn default() -> Self {
        Self {
            name: "CertA Root CA".to_string(),
            common_name: "CertA Root CA".to_string(),
            organization: "CertA Organization".to_string(),
            country: "US".to_string(),
            state: "California".to_string(),
            locality: "San Francisco".to_string(),
        }
    }
}

/// A persisted certificate authority row.
///
/// Created once by `create_root_ca` and never mutated afterwards; rotation
/// happens by activating a new record.
#[derive(Clone, Serialize, Deserialize)]
pub struct CaRecord {
    pub name: String,
    pub common_name: String,
    pub organization: String,
    pub country: String,
    pub state: String,
    pub locality: String,
    /// Self-signed CA certificate, PEM.
    pub certificate_pem: String,
    /// CA signing key, unencrypted PKCS#1 PEM.
    pub private_key_pem: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub is_active: bool,
}

impl CaRecord {
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_active && !self.is_expired()
    }
}

impl fmt::Debug for CaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaRecord")
            .field("name", &self.name)
            .field("common_name", &self.common_name)
            .field("organization", &self.organization)
            .field("country", &self.country)
            .field("state", &self.state)
            .field("locality", &self.locality)
            .field("certificate_pem", &self.certificate_pem)
            .field("private_key_pem", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// The certificate authority service: owns the active CA identity and signs
/// certificate requests against it.
#[derive(Clone)]
pub struct CertificateAuthority {
    store: Arc<dyn CaStore>,
}

impl CertificateAuthority {
    pub fn new(store: Arc<dyn CaStore>) -> Self {
        Self { store }
    }

    /// The most recently activated CA, if any. Pure read.
    pub fn get_active(&self) -> Result<Option<CaRecord>> {
        self.store.get_active()
    }

    /// Generates a new root CA: a 4096-bit RSA key and a self-signed
    /// ten-year certificate, persisted as the active CA. Any previously
    /// active record is deactivated in the same store transaction.
    pub fn create_root_ca(&self, identity: &CaIdentity) -> Result<CaRecord> {
        info!("Creating root CA: {}", identity.common_name);

        let key = KeyPair::generate(CA_KEY_BITS)?;
        let subject = DistinguishedName::builder()
            .common_name(identity.common_name.clone())
            .organization(identity.organization.clone())
            .locality(identity.locality.clone())
            .state(identity.state.clone())
            .country(identity.country.clone())
            .build();
        let request = CertificateRequest::builder()
            .subject(subject)
            .subject_public_key(key.spki()?)
            .role(CertificateRole::Ca)
            .key_bits(CA_KEY_BITS as u32)
            .build();

        let name = request.subject.to_rdn_sequence()?;
        let tbs = TbsCertificate {
            serial_number: serial::generate().to_vec(),
            issuer: name.clone(),
            validity: Validity::for_days(CA_VALIDITY_DAYS),
            subject: name,
            subject_public_key: request.subject_public_key.clone(),
            extensions: build_extensions(&request)?,
        };
        let cert = sign_tbs(&key, tbs)?;
        debug!("Root CA certificate serial: {}", cert.serial_hex());

        let record = CaRecord {
            name: identity.name.clone(),
            common_name: identity.common_name.clone(),
            organization: identity.organization.clone(),
            country: identity.country.clone(),
            state: identity.state.clone(),
            locality: identity.locality.clone(),
            certificate_pem: cert.to_pem()?,
            private_key_pem: key.private_key_pem()?,
            created_at: cert.not_before(),
            expires_at: cert.not_after(),
            is_active: true,
        };
        self.store.activate(record)
    }

    /// Signs a certificate request with the active CA's key.
    ///
    /// Fails with `NoActiveCa` when no CA is active. The issuer name is
    /// copied from the CA certificate's subject, so issued certificates
    /// chain byte-for-byte. Validity runs from now: one year for leaves,
    /// ten years for CA-role requests.
    pub fn sign(&self, request: &CertificateRequest) -> Result<Certificate> {
        let ca = self.store.get_active()?.ok_or(Error::NoActiveCa)?;
        info!(
            "Signing {:?} certificate for: {}",
            request.role, request.subject.common_name
        );
        debug!("Subject key size: {} bits", request.key_bits);

        let ca_cert = Certificate::from_pem(&ca.certificate_pem)?;
        let ca_key = KeyPair::from_private_key_pem(&ca.private_key_pem)?;

        let validity = match request.role {
            CertificateRole::Ca => Validity::for_days(CA_VALIDITY_DAYS),
            CertificateRole::Leaf => Validity::for_days(LEAF_VALIDITY_DAYS),
        };
        let tbs = TbsCertificate {
            serial_number: serial::generate().to_vec(),
            issuer: ca_cert.subject().clone(),
            validity,
            subject: request.subject.to_rdn_sequence()?,
            subject_public_key: request.subject_public_key.clone(),
            extensions: build_extensions(request)?,
        };
        sign_tbs(&ca_key, tbs)
    }
}

/// Role-appropriate extension set, plus the SAN extension when the request
/// carries entries. SAN stays non-critical: every subject here has a CN, and
/// validators reject unknown critical extensions.
fn build_extensions(request: &CertificateRequest) -> Result<Vec<ExtensionParam>> {
    let mut extensions = Vec::new();
    match request.role {
        CertificateRole::Ca => {
            extensions.push(ExtensionParam::from_extension(
                &BasicConstraints {
                    is_ca: true,
                    max_path_length: Some(0),
                },
                true,
            )?);
            extensions.push(ExtensionParam::from_extension(
                &KeyUsage(
                    KeyUsages::KeyCertSign | KeyUsages::CRLSign | KeyUsages::DigitalSignature,
                ),
                true,
            )?);
            extensions.push(ExtensionParam::from_extension(
                &SubjectKeyIdentifier::from_spki(&request.subject_public_key),
                false,
            )?);
        }
        CertificateRole::Leaf => {
            extensions.push(ExtensionParam::from_extension(
                &BasicConstraints {
                    is_ca: false,
                    max_path_length: None,
                },
                true,
            )?);
            extensions.push(ExtensionParam::from_extension(
                &KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment),
                true,
            )?);
            extensions.push(ExtensionParam::from_extension(
                &ExtendedKeyUsage {
                    usage: vec![ExtendedKeyUsageOption::ServerAuth],
                },
                true,
            )?);
        }
    }
    if !request.sans.is_empty() {
        extensions.push(ExtensionParam::from_extension(
            &SubjectAltName {
                entries: request.sans.clone(),
            },
            false,
        )?);
    }
    Ok(extensions)
}

/// Signs the TBS bytes and wraps them into a finished certificate.
fn sign_tbs(signing_key: &KeyPair, tbs: TbsCertificate) -> Result<Certificate> {
    let tbs_inner = tbs.to_tbs_certificate_inner()?;
    let signature = signing_key.sign(&tbs_inner.to_der()?)?;
    Ok(Certificate {
        inner: CertificateInner {
            tbs_certificate: tbs_inner,
            signature_algorithm: sha256_with_rsa_encryption(),
            signature: BitString::from_bytes(&signature)?,
        },
    })
}
