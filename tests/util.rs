use std::sync::Arc;

use certa::ca::CertificateAuthority;
use certa::issuer::CertificateIssuer;
use certa::store::{MemoryCaStore, MemoryCertificateStore};
use x509_parser::certificate::X509Certificate;

/// An issuance engine over fresh in-memory stores, together with the CA
/// service it signs through.
pub fn engine() -> (CertificateIssuer, CertificateAuthority) {
    let ca = CertificateAuthority::new(Arc::new(MemoryCaStore::new()));
    let issuer = CertificateIssuer::new(ca.clone(), Arc::new(MemoryCertificateStore::new()));
    (issuer, ca)
}

/// Parses certificate DER with the independent x509-parser crate.
pub fn parse(der: &[u8]) -> X509Certificate<'_> {
    let (rem, cert) = x509_parser::parse_x509_certificate(der).expect("certificate should parse");
    assert!(rem.is_empty(), "trailing bytes after certificate");
    cert
}

/// Uppercase hex, matching the serial form stored on issued records.
pub fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
