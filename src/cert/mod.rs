pub mod extensions;
pub mod params;

use der::{Decode, DecodePem, Encode, EncodePem};
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::RdnSequence;

use crate::error::Result;
use crate::serial;

/// A signed X.509 certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.inner.to_der()?)
    }

    /// Encodes the certificate into PEM (`BEGIN CERTIFICATE`), LF endings.
    pub fn to_pem(&self) -> Result<String> {
        Ok(self.inner.to_pem(pkcs8::LineEnding::LF)?)
    }

    /// Decodes a certificate from PEM.
    pub fn from_pem(pem: &str) -> Result<Self> {
        Ok(Self {
            inner: CertificateInner::from_pem(pem.as_bytes())?,
        })
    }

    /// Decodes a certificate from DER.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: CertificateInner::from_der(der)?,
        })
    }

    /// The serial number as uppercase hex.
    pub fn serial_hex(&self) -> String {
        serial::hex_upper(self.inner.tbs_certificate.serial_number.as_bytes())
    }

    pub fn subject(&self) -> &RdnSequence {
        &self.inner.tbs_certificate.subject
    }

    pub fn issuer(&self) -> &RdnSequence {
        &self.inner.tbs_certificate.issuer
    }

    /// True when the issuer name equals the subject name.
    pub fn is_self_signed(&self) -> bool {
        self.subject() == self.issuer()
    }

    pub fn not_before(&self) -> OffsetDateTime {
        to_offset_date_time(&self.inner.tbs_certificate.validity.not_before)
    }

    pub fn not_after(&self) -> OffsetDateTime {
        to_offset_date_time(&self.inner.tbs_certificate.validity.not_after)
    }
}

fn to_offset_date_time(time: &x509_cert::time::Time) -> OffsetDateTime {
    match time {
        x509_cert::time::Time::UtcTime(ut) => OffsetDateTime::from(ut.to_system_time()),
        x509_cert::time::Time::GeneralTime(gt) => OffsetDateTime::from(gt.to_system_time()),
    }
}
