//! # CertA - A Pure Rust Private Certificate Authority
//!
//! CertA is a certificate authority and issuance engine built entirely with
//! rustcrypto libraries, with no dependency on ring or openssl. It creates a
//! self-signed root CA, signs leaf certificates against it, and repackages
//! the results into standard interchange formats for whatever persistence or
//! serving layer sits around it.
//!
//! ## Certificate Profiles
//!
//! Two profiles cover everything the engine signs:
//! - **Root CA**: 4096-bit RSA, self-signed, valid 10 years, constrained to
//!   path length 0 so it can only sign leaves
//! - **Leaf**: 2048-bit RSA by default, valid 1 year, marked for TLS server
//!   authentication, with DNS and URI subject alternative names
//!
//! All signatures are SHA-256 with PKCS#1 v1.5 padding.
//!
//! ## Supported Formats
//!
//! - **PEM**: certificates, PKCS#1 private keys, PKCS#1 public keys
//! - **DER**: certificates
//! - **PKCS#12**: password-protected certificate + key archives
//!
//! ## Key Features
//!
//! - **Pure Rust**: Built entirely with rustcrypto libraries
//! - **Self-Bootstrapping**: The first issuance creates a root CA if none is active
//! - **Wildcard Issuance**: `*.example.com` certificates with SAN handling
//! - **Expiry Tracking**: Query issued certificates by expiry window
//! - **Pluggable Storage**: CA and certificate rows live behind store traits
//!
//! ## Quick Start
//!
//! ### Issuing a Server Certificate
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use certa::ca::CertificateAuthority;
//! use certa::issuer::{CertificateIssuer, CertificateType, ExportKind};
//! use certa::store::{MemoryCaStore, MemoryCertificateStore};
//!
//! # fn main() -> Result<(), certa::error::Error> {
//! let ca = CertificateAuthority::new(Arc::new(MemoryCaStore::new()));
//! let issuer = CertificateIssuer::new(ca, Arc::new(MemoryCertificateStore::new()));
//!
//! // The first issuance bootstraps a default root CA automatically.
//! let record = issuer.issue(
//!     "web.internal",
//!     Some("web.internal,api.internal"),
//!     CertificateType::Server,
//! )?;
//! println!("Issued {} with serial {}", record.common_name, record.serial);
//!
//! // Serve the PEM blobs directly, or repackage as PKCS#12.
//! let cert_pem = record.export_pem(ExportKind::Certificate);
//! let archive = record.export_pkcs12("changeit")?;
//! println!("{} PEM bytes, {} PKCS#12 bytes", cert_pem.len(), archive.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### Creating the Root CA Explicitly
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use certa::ca::{CaIdentity, CertificateAuthority};
//! use certa::store::MemoryCaStore;
//!
//! # fn main() -> Result<(), certa::error::Error> {
//! let ca = CertificateAuthority::new(Arc::new(MemoryCaStore::new()));
//!
//! let identity = CaIdentity::builder()
//!     .name("Example Root".to_string())
//!     .common_name("Example Root CA".to_string())
//!     .organization("Example Corp".to_string())
//!     .country("US".to_string())
//!     .state("California".to_string())
//!     .locality("San Francisco".to_string())
//!     .build();
//!
//! let record = ca.create_root_ca(&identity)?;
//! println!("Active CA: {}", record.common_name);
//! # Ok(())
//! # }
//! ```
//!
//! ### Wildcard Certificates and Expiry Tracking
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use certa::ca::CertificateAuthority;
//! use certa::issuer::CertificateIssuer;
//! use certa::store::{MemoryCaStore, MemoryCertificateStore};
//!
//! # fn main() -> Result<(), certa::error::Error> {
//! let ca = CertificateAuthority::new(Arc::new(MemoryCaStore::new()));
//! let issuer = CertificateIssuer::new(ca, Arc::new(MemoryCertificateStore::new()));
//!
//! // Covers example.com subdomains; the apex is listed as an extra SAN.
//! let record = issuer.issue_wildcard("example.com", Some("example.com"))?;
//! println!("Issued {}", record.common_name);
//!
//! // Certificates expiring within 30 days, soonest first.
//! let expiring = issuer.list_expiring_soon(30)?;
//! println!("{} certificates expiring soon", expiring.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns the crate's closed [`error::Error`] enum:
//!
//! ```rust
//! use certa::{error::Error, key::KeyPair};
//!
//! match KeyPair::from_private_key_pem("invalid pem data") {
//!     Ok(_) => println!("Key imported successfully"),
//!     Err(Error::Format(msg)) => println!("Failed to decode key: {msg}"),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`ca`]: Root CA creation and certificate signing
//! - [`issuer`]: End-to-end leaf issuance and issued-certificate records
//! - [`key`]: RSA key generation and the PKCS#1 PEM codec
//! - [`cert`]: Certificate encoding/decoding, subject parameters, extensions
//! - [`san`]: Subject alternative name parsing and classification
//! - [`serial`]: Random serial number generation
//! - [`pkcs12`]: PKCS#12 archive packing and unpacking
//! - [`store`]: Storage traits and in-memory implementations
//! - [`error`]: The crate-wide error type
//! - [`tbs_certificate`]: Low-level certificate structure assembly

pub mod ca;
pub mod cert;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pkcs12;
pub mod san;
pub mod serial;
pub mod store;
pub mod tbs_certificate;
