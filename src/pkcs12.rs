//! PKCS#12 container packing and unpacking.
//!
//! Bundles a certificate PEM and its PKCS#1 private key PEM into a single
//! password-protected archive, and recovers both from one. The private key
//! travels inside the archive as PKCS#8, which is what PKCS#12 consumers
//! expect; the PEM surface of this crate stays PKCS#1.

use p12_keystore::{KeyStore, KeyStoreEntry, PrivateKeyChain};
use rsa::RsaPublicKey;
use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};

use crate::cert::Certificate;
use crate::error::{Error, Result};
use crate::key::KeyPair;

const ENTRY_ALIAS: &str = "certa";

/// Certificate and private key recovered from a PKCS#12 archive.
#[derive(Clone, Debug)]
pub struct Pkcs12Bundle {
    pub certificate_pem: String,
    /// Unencrypted PKCS#1 PEM.
    pub private_key_pem: String,
}

/// Packs a certificate and its private key into a PKCS#12 archive.
///
/// The key must match the certificate's public key; a mismatched pair is
/// rejected before anything is written. The password protects the whole
/// archive and is required again to unpack it.
pub fn to_pkcs12(certificate_pem: &str, private_key_pem: &str, password: &str) -> Result<Vec<u8>> {
    let key = KeyPair::from_private_key_pem(private_key_pem)?;
    let cert_der = pem::parse(certificate_pem)
        .map_err(|e| Error::Format(format!("failed to parse certificate PEM: {e}")))?
        .into_contents();

    let cert = Certificate::from_der(&cert_der)?;
    let cert_public = RsaPublicKey::from_pkcs1_der(
        cert.inner
            .tbs_certificate
            .subject_public_key_info
            .subject_public_key
            .raw_bytes(),
    )?;
    if &cert_public != key.public_key() {
        return Err(Error::Format(
            "certificate does not match the private key".to_string(),
        ));
    }

    let key_der = key.private_key().to_pkcs8_der()?;
    let entry_cert = p12_keystore::Certificate::from_der(&cert_der)
        .map_err(|e| Error::Format(format!("failed to load certificate: {e}")))?;

    let mut keystore = KeyStore::new();
    let chain = PrivateKeyChain::new(key_der.as_bytes(), [], vec![entry_cert]);
    keystore.add_entry(ENTRY_ALIAS, KeyStoreEntry::PrivateKeyChain(chain));
    keystore
        .writer(password)
        .write()
        .map_err(|e| Error::Format(format!("failed to write PKCS#12 archive: {e}")))
}

/// Unpacks a PKCS#12 archive back into PEM material.
///
/// Fails when the password is wrong, the archive is malformed, or it holds
/// no private key entry. Only the first certificate of the key's chain is
/// returned; this engine never packs more than one.
pub fn from_pkcs12(data: &[u8], password: &str) -> Result<Pkcs12Bundle> {
    let keystore = KeyStore::from_pkcs12(data, password)
        .map_err(|e| Error::Format(format!("failed to read PKCS#12 archive: {e}")))?;
    let chain = keystore
        .entries()
        .find_map(|(_, entry)| match entry {
            KeyStoreEntry::PrivateKeyChain(chain) => Some(chain),
            _ => None,
        })
        .ok_or_else(|| Error::Format("PKCS#12 archive holds no private key".to_string()))?;

    let private = rsa::RsaPrivateKey::from_pkcs8_der(chain.key())?;
    let private_key_pem = private.to_pkcs1_pem(LineEnding::LF)?.to_string();

    let entry_cert = chain
        .chain()
        .first()
        .ok_or_else(|| Error::Format("PKCS#12 archive holds no certificate".to_string()))?;
    let certificate_pem = Certificate::from_der(entry_cert.as_der())?.to_pem()?;

    Ok(Pkcs12Bundle {
        certificate_pem,
        private_key_pem,
    })
}
