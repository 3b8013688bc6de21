//! Assembly of the "to be signed" portion of an X.509 certificate.

use der::asn1::{GeneralizedTime, OctetString, UtcTime};
use der::{DateTime, Encode};
use time::{OffsetDateTime, UtcOffset};
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::name::RdnSequence;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::Time;

use crate::cert::params::{ExtensionParam, Validity};
use crate::error::Result;
use crate::serial;

/// The TBS portion of a certificate, prior to signing.
///
/// Every certificate produced here is version 3 and signed with
/// sha256WithRSAEncryption.
pub struct TbsCertificate {
    /// Certificate serial number, big-endian unsigned bytes.
    pub serial_number: Vec<u8>,
    /// Issuer distinguished name.
    pub issuer: RdnSequence,
    /// Validity window.
    pub validity: Validity,
    /// Subject distinguished name.
    pub subject: RdnSequence,
    /// Subject's public key.
    pub subject_public_key: SubjectPublicKeyInfoOwned,
    /// Certificate extensions.
    pub extensions: Vec<ExtensionParam>,
}

/// The sha256WithRSAEncryption algorithm identifier with its NULL parameters,
/// as RFC 4055 requires for RSA signature OIDs.
pub fn sha256_with_rsa_encryption() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
        parameters: Some(der::asn1::Any::from(der::asn1::AnyRef::NULL)),
    }
}

/// RFC 5280 4.1.2.5: dates through 2049 encode as UTCTime, later dates as
/// GeneralizedTime.
fn to_x509_time(ts: OffsetDateTime) -> Result<Time> {
    let ts = ts.to_offset(UtcOffset::UTC);
    let system_time: std::time::SystemTime = ts.into();
    if ts.year() < 2050 {
        Ok(Time::UtcTime(UtcTime::from_system_time(system_time)?))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_date_time(
            DateTime::from_system_time(system_time)?,
        )))
    }
}

impl TbsCertificate {
    /// Converts into the DER-ready `TbsCertificateInner` form.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.validity.not_before)?,
            not_after: to_x509_time(self.validity.not_after)?,
        };

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number: serial::to_serial_number(&self.serial_number)?,
            signature: sha256_with_rsa_encryption(),
            issuer: self.issuer.clone(),
            validity,
            subject: self.subject.clone(),
            subject_public_key_info: self.subject_public_key.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }

    /// DER encoding of the TBS certificate, the exact bytes that get signed.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_tbs_certificate_inner()?.to_der()?)
    }
}
