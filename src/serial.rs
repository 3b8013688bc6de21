//! Random certificate serial numbers.

use rand_core::{OsRng, RngCore};
use x509_cert::serial_number::SerialNumber;

use crate::error::Result;

/// Serial width in bytes (160 bits).
pub const SERIAL_LEN: usize = 20;

/// Draws a fresh 160-bit serial from the operating system RNG.
///
/// The top bit is cleared so the DER INTEGER stays non-negative within
/// RFC 5280's 20-octet ceiling. No ledger of previously issued serials is
/// kept; sequential counters would leak issuance volume, so collisions are
/// left to probability.
pub fn generate() -> [u8; SERIAL_LEN] {
    let mut bytes = [0u8; SERIAL_LEN];
    OsRng.fill_bytes(&mut bytes);
    bytes[0] &= 0x7f;
    bytes
}

/// Converts raw serial bytes into an X.509 serial number, trimming
/// redundant leading zero octets. A remaining high first bit would read
/// as a negative INTEGER, so one zero octet is kept in front of it.
pub fn to_serial_number(bytes: &[u8]) -> Result<SerialNumber> {
    let trimmed = match bytes.iter().position(|b| *b != 0) {
        Some(start) => &bytes[start..],
        None => &bytes[bytes.len().saturating_sub(1)..],
    };
    if trimmed.first().is_some_and(|b| b & 0x80 != 0) {
        let mut padded = Vec::with_capacity(trimmed.len() + 1);
        padded.push(0);
        padded.extend_from_slice(trimmed);
        return Ok(SerialNumber::new(&padded)?);
    }
    Ok(SerialNumber::new(trimmed)?)
}

/// Renders serial bytes as uppercase hex, the form stored on issued
/// certificate records.
pub fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
