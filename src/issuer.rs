//! End-to-end leaf issuance: key generation, CA signing, record assembly.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ca::{CaIdentity, CertificateAuthority};
use crate::cert::params::{CertificateRequest, CertificateRole, DistinguishedName};
use crate::error::Result;
use crate::key::KeyPair;
use crate::pkcs12;
use crate::san;
use crate::store::CertificateStore;

/// RSA modulus size for subject keys unless the caller asks otherwise.
pub const LEAF_KEY_BITS: usize = 2048;

/// Fixed organization and country used in every leaf subject.
pub const LEAF_ORGANIZATION: &str = "CertA Organization";
pub const LEAF_COUNTRY: &str = "US";

/// Unique identifier for an issued certificate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificateId(Uuid);

impl CertificateId {
    /// Creates a new random certificate ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CertificateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an issued certificate. The engine only ever produces
/// `Issued`; the other states are set by callers after the fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateStatus {
    Pending,
    Issued,
    Revoked,
    Expired,
}

/// Intended use of an issued certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateType {
    Server,
    Client,
    CodeSigning,
    Email,
    Wildcard,
}

/// Which PEM blob of an [`IssuedCertificate`] to export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Certificate,
    PublicKey,
    PrivateKey,
}

/// The record assembled by one successful issuance. Immutable once built;
/// any later state changes happen in the caller's store, not here.
#[derive(Clone, Serialize, Deserialize)]
pub struct IssuedCertificate {
    pub id: CertificateId,
    pub common_name: String,
    /// Raw comma-separated SAN list as requested, if any.
    pub san: Option<String>,
    /// Serial number as uppercase hex.
    pub serial: String,
    pub certificate_pem: String,
    pub public_key_pem: String,
    pub private_key_pem: String,
    pub certificate_type: CertificateType,
    pub status: CertificateStatus,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    /// Identifier of the requesting principal, attached by the caller.
    pub owner_id: Option<String>,
}

impl IssuedCertificate {
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Attaches the requesting principal's identifier.
    #[must_use]
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// One of the record's PEM blobs as bytes, ready to serve as a download.
    #[must_use]
    pub fn export_pem(&self, kind: ExportKind) -> Vec<u8> {
        let pem = match kind {
            ExportKind::Certificate => &self.certificate_pem,
            ExportKind::PublicKey => &self.public_key_pem,
            ExportKind::PrivateKey => &self.private_key_pem,
        };
        pem.clone().into_bytes()
    }

    /// Repackages the certificate and private key into a password-protected
    /// PKCS#12 archive.
    pub fn export_pkcs12(&self, password: &str) -> Result<Vec<u8>> {
        pkcs12::to_pkcs12(&self.certificate_pem, &self.private_key_pem, password)
    }
}

impl fmt::Debug for IssuedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCertificate")
            .field("id", &self.id)
            .field("common_name", &self.common_name)
            .field("san", &self.san)
            .field("serial", &self.serial)
            .field("certificate_pem", &self.certificate_pem)
            .field("public_key_pem", &self.public_key_pem)
            .field("private_key_pem", &"[REDACTED]")
            .field("certificate_type", &self.certificate_type)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("owner_id", &self.owner_id)
            .finish()
    }
}

/// Orchestrates leaf issuance against a [`CertificateAuthority`].
#[derive(Clone)]
pub struct CertificateIssuer {
    ca: CertificateAuthority,
    store: Arc<dyn CertificateStore>,
}

impl CertificateIssuer {
    pub fn new(ca: CertificateAuthority, store: Arc<dyn CertificateStore>) -> Self {
        Self { ca, store }
    }

    /// Issues a certificate with a 2048-bit subject key.
    pub fn issue(
        &self,
        common_name: &str,
        sans: Option<&str>,
        certificate_type: CertificateType,
    ) -> Result<IssuedCertificate> {
        self.issue_with_key_size(common_name, sans, certificate_type, LEAF_KEY_BITS)
    }

    /// Issues a certificate with an explicit subject key size.
    ///
    /// Bootstraps a default root CA when none is active, generates a fresh
    /// subject key, signs with the active CA, and persists the record.
    /// Nothing is stored unless signing succeeds, so a failed issuance
    /// leaves no partial record behind.
    pub fn issue_with_key_size(
        &self,
        common_name: &str,
        sans: Option<&str>,
        certificate_type: CertificateType,
        key_bits: usize,
    ) -> Result<IssuedCertificate> {
        self.ensure_ca()?;
        info!(
            "Issuing {:?} certificate for: {}",
            certificate_type, common_name
        );

        let key = KeyPair::generate(key_bits)?;
        let request = CertificateRequest::builder()
            .subject(
                DistinguishedName::builder()
                    .common_name(common_name.to_string())
                    .organization(LEAF_ORGANIZATION.to_string())
                    .country(LEAF_COUNTRY.to_string())
                    .build(),
            )
            .subject_public_key(key.spki()?)
            .role(CertificateRole::Leaf)
            .sans(sans.map(san::parse_san_list).unwrap_or_default())
            .key_bits(key_bits as u32)
            .build();
        let cert = self.ca.sign(&request)?;

        let record = IssuedCertificate {
            id: CertificateId::new(),
            common_name: common_name.to_string(),
            san: sans.map(str::to_string),
            serial: cert.serial_hex(),
            certificate_pem: cert.to_pem()?,
            public_key_pem: key.public_key_pem()?,
            private_key_pem: key.private_key_pem()?,
            certificate_type,
            status: CertificateStatus::Issued,
            created_at: cert.not_before(),
            expires_at: cert.not_after(),
            owner_id: None,
        };
        self.store.insert(record.clone())?;
        debug!("Issued certificate {} (serial {})", record.id, record.serial);
        Ok(record)
    }

    /// Issues a wildcard certificate for `domain`.
    ///
    /// A leading `*.` on `domain` is accepted and stripped, so both
    /// `example.com` and `*.example.com` produce the common name
    /// `*.example.com`. The common name is prepended to the SAN list ahead
    /// of any additional entries.
    pub fn issue_wildcard(
        &self,
        domain: &str,
        additional_sans: Option<&str>,
    ) -> Result<IssuedCertificate> {
        let base = domain.strip_prefix("*.").unwrap_or(domain);
        let common_name = format!("*.{base}");
        let mut san_parts = vec![common_name.clone()];
        if let Some(extra) = additional_sans {
            san_parts.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string),
            );
        }
        let san_list = san_parts.join(",");
        self.issue_with_key_size(
            &common_name,
            Some(&san_list),
            CertificateType::Wildcard,
            LEAF_KEY_BITS,
        )
    }

    /// Issued certificates that expire within `threshold_days`, soonest
    /// first. Already-expired certificates are not included.
    pub fn list_expiring_soon(&self, threshold_days: i64) -> Result<Vec<IssuedCertificate>> {
        self.store.list_expiring_within(threshold_days)
    }

    /// Fetches a previously issued certificate by ID.
    pub fn get(&self, id: &CertificateId) -> Result<IssuedCertificate> {
        self.store.get(id)
    }

    fn ensure_ca(&self) -> Result<()> {
        if self.ca.get_active()?.is_none() {
            debug!("No active CA, bootstrapping the default root");
            self.ca.create_root_ca(&CaIdentity::default())?;
        }
        Ok(())
    }
}
