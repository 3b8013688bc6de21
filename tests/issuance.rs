mod util;

use certa::ca::CaIdentity;
use certa::cert::Certificate;
use certa::cert::params::{CertificateRequest, CertificateRole, DistinguishedName};
use certa::error::Error;
use certa::issuer::CertificateType;
use certa::key::KeyPair;
use sha1::{Digest, Sha1};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension, X509Extension};

const EXT_SUBJECT_KEY_IDENTIFIER: &str = "2.5.29.14";
const EXT_KEY_USAGE: &str = "2.5.29.15";
const EXT_SUBJECT_ALT_NAME: &str = "2.5.29.17";
const EXT_BASIC_CONSTRAINTS: &str = "2.5.29.19";
const EXT_EXTENDED_KEY_USAGE: &str = "2.5.29.37";

fn extension_by_oid<'a, 'b>(cert: &'a X509Certificate<'b>, oid: &str) -> &'a X509Extension<'b> {
    cert.extensions()
        .iter()
        .find(|e| e.oid.to_id_string() == oid)
        .unwrap_or_else(|| panic!("extension {oid} should be present"))
}

fn has_extension(cert: &X509Certificate<'_>, oid: &str) -> bool {
    cert.extensions().iter().any(|e| e.oid.to_id_string() == oid)
}

fn der_of(pem: &str) -> Vec<u8> {
    Certificate::from_pem(pem).unwrap().to_der().unwrap()
}

/// A first issuance from an empty store bootstraps the default root CA and
/// returns a leaf whose chain, profile, and SAN contents all hold up under
/// an independent parser.
#[test]
fn bootstrap_issues_a_verified_server_certificate() {
    let (issuer, ca) = util::engine();
    let record = issuer
        .issue(
            "web.internal",
            Some("web.internal, ,api.internal,https://spiffe.internal/login"),
            CertificateType::Server,
        )
        .unwrap();

    let active = ca
        .get_active()
        .unwrap()
        .expect("bootstrap should activate a CA");
    assert_eq!(active.common_name, "CertA Root CA");

    let ca_der = der_of(&active.certificate_pem);
    let leaf_der = der_of(&record.certificate_pem);
    let ca_cert = util::parse(&ca_der);
    let leaf = util::parse(&leaf_der);

    assert_eq!(leaf.version().0, 2);
    assert_eq!(leaf.issuer().as_raw(), ca_cert.subject().as_raw());
    leaf.verify_signature(Some(ca_cert.public_key()))
        .expect("leaf should verify against the CA key");

    let subject = leaf.subject().to_string();
    assert!(subject.contains("CN=web.internal"));
    assert!(subject.contains("O=CertA Organization"));
    assert!(subject.contains("C=US"));

    assert_eq!(util::hex_upper(leaf.raw_serial()), record.serial);

    let validity = leaf.validity();
    assert_eq!(
        validity.not_after.timestamp() - validity.not_before.timestamp(),
        365 * 86_400
    );

    let bc_ext = extension_by_oid(&leaf, EXT_BASIC_CONSTRAINTS);
    assert!(bc_ext.critical);
    let ParsedExtension::BasicConstraints(bc) = bc_ext.parsed_extension() else {
        panic!("basic constraints should parse");
    };
    assert!(!bc.ca);

    let ku_ext = extension_by_oid(&leaf, EXT_KEY_USAGE);
    assert!(ku_ext.critical);
    let ParsedExtension::KeyUsage(ku) = ku_ext.parsed_extension() else {
        panic!("key usage should parse");
    };
    assert!(ku.digital_signature());
    assert!(ku.key_encipherment());
    assert!(!ku.key_cert_sign());

    let eku_ext = extension_by_oid(&leaf, EXT_EXTENDED_KEY_USAGE);
    assert!(eku_ext.critical);
    let ParsedExtension::ExtendedKeyUsage(eku) = eku_ext.parsed_extension() else {
        panic!("extended key usage should parse");
    };
    assert!(eku.server_auth);

    // Empty entries are dropped, URIs and DNS names are told apart.
    let san_ext = extension_by_oid(&leaf, EXT_SUBJECT_ALT_NAME);
    assert!(!san_ext.critical);
    let ParsedExtension::SubjectAlternativeName(san) = san_ext.parsed_extension() else {
        panic!("subject alternative name should parse");
    };
    let names: Vec<String> = san
        .general_names
        .iter()
        .map(|gn| match gn {
            GeneralName::DNSName(name) => format!("dns:{name}"),
            GeneralName::URI(uri) => format!("uri:{uri}"),
            other => panic!("unexpected general name {other:?}"),
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "dns:web.internal",
            "dns:api.internal",
            "uri:https://spiffe.internal/login"
        ]
    );

    // Leaves carry no subject key identifier.
    assert!(!has_extension(&leaf, EXT_SUBJECT_KEY_IDENTIFIER));
}

/// The self-signed root carries the full CA profile: constrained to signing
/// leaves only, marked for certificate and CRL signing, and identified by a
/// SHA-1 key identifier over its public key.
#[test]
fn root_ca_profile_is_complete() {
    let (_, ca) = util::engine();
    let identity = CaIdentity::builder()
        .name("Ops Root".to_string())
        .common_name("Ops Root CA".to_string())
        .organization("Ops Organization".to_string())
        .country("US".to_string())
        .state("Washington".to_string())
        .locality("Seattle".to_string())
        .build();
    let record = ca.create_root_ca(&identity).unwrap();

    let der = der_of(&record.certificate_pem);
    let cert = util::parse(&der);

    assert_eq!(cert.version().0, 2);
    assert_eq!(cert.issuer().as_raw(), cert.subject().as_raw());
    cert.verify_signature(None)
        .expect("root should verify against its own key");

    let subject = cert.subject().to_string();
    assert!(subject.contains("CN=Ops Root CA"));
    assert!(subject.contains("O=Ops Organization"));
    assert!(subject.contains("L=Seattle"));
    assert!(subject.contains("ST=Washington"));
    assert!(subject.contains("C=US"));

    let validity = cert.validity();
    assert_eq!(
        validity.not_after.timestamp() - validity.not_before.timestamp(),
        3650 * 86_400
    );

    let bc_ext = extension_by_oid(&cert, EXT_BASIC_CONSTRAINTS);
    assert!(bc_ext.critical);
    let ParsedExtension::BasicConstraints(bc) = bc_ext.parsed_extension() else {
        panic!("basic constraints should parse");
    };
    assert!(bc.ca);
    assert_eq!(bc.path_len_constraint, Some(0));

    let ku_ext = extension_by_oid(&cert, EXT_KEY_USAGE);
    assert!(ku_ext.critical);
    let ParsedExtension::KeyUsage(ku) = ku_ext.parsed_extension() else {
        panic!("key usage should parse");
    };
    assert!(ku.key_cert_sign());
    assert!(ku.crl_sign());
    assert!(ku.digital_signature());

    let ski_ext = extension_by_oid(&cert, EXT_SUBJECT_KEY_IDENTIFIER);
    assert!(!ski_ext.critical);
    let ParsedExtension::SubjectKeyIdentifier(ski) = ski_ext.parsed_extension() else {
        panic!("subject key identifier should parse");
    };
    let expected = Sha1::digest(cert.public_key().subject_public_key.data.as_ref());
    assert_eq!(ski.0, expected.as_slice());

    assert!(!has_extension(&cert, EXT_EXTENDED_KEY_USAGE));
    assert!(!has_extension(&cert, EXT_SUBJECT_ALT_NAME));
}

/// Signing directly, without the bootstrap path, demands an active CA.
#[test]
fn signing_without_an_active_ca_is_refused() {
    let (_, ca) = util::engine();
    let key = KeyPair::generate(2048).unwrap();
    let request = CertificateRequest::builder()
        .subject(
            DistinguishedName::builder()
                .common_name("orphan.local".to_string())
                .build(),
        )
        .subject_public_key(key.spki().unwrap())
        .role(CertificateRole::Leaf)
        .build();
    assert!(matches!(ca.sign(&request), Err(Error::NoActiveCa)));
}

/// Wildcard issuance names the whole domain plus any extra SANs.
#[test]
fn wildcard_covers_domain_and_extras() {
    let (issuer, _) = util::engine();
    let record = issuer
        .issue_wildcard("*.example.com", Some("api.example.com"))
        .unwrap();
    assert_eq!(record.common_name, "*.example.com");
    assert_eq!(record.certificate_type, CertificateType::Wildcard);

    let der = der_of(&record.certificate_pem);
    let cert = util::parse(&der);
    let san_ext = extension_by_oid(&cert, EXT_SUBJECT_ALT_NAME);
    let ParsedExtension::SubjectAlternativeName(san) = san_ext.parsed_extension() else {
        panic!("subject alternative name should parse");
    };
    let dns: Vec<&str> = san
        .general_names
        .iter()
        .filter_map(|gn| match gn {
            GeneralName::DNSName(name) => Some(*name),
            _ => None,
        })
        .collect();
    assert_eq!(dns, vec!["*.example.com", "api.example.com"]);
}

/// Client-type leaves reuse the server-authentication profile, and every
/// issuance draws its own serial.
#[test]
fn client_issuance_reuses_the_server_profile_with_fresh_serials() {
    let (issuer, _) = util::engine();
    let client = issuer
        .issue("client.internal", None, CertificateType::Client)
        .unwrap();
    let server = issuer
        .issue("server.internal", None, CertificateType::Server)
        .unwrap();

    assert_ne!(client.serial, server.serial);
    assert!(client.serial.len() <= 40);

    let der = der_of(&client.certificate_pem);
    let cert = util::parse(&der);
    assert_eq!(util::hex_upper(cert.raw_serial()), client.serial);

    let eku_ext = extension_by_oid(&cert, EXT_EXTENDED_KEY_USAGE);
    let ParsedExtension::ExtendedKeyUsage(eku) = eku_ext.parsed_extension() else {
        panic!("extended key usage should parse");
    };
    assert!(eku.server_auth);

    // No SANs were requested, so no SAN extension is added.
    assert!(!has_extension(&cert, EXT_SUBJECT_ALT_NAME));
}
