//! Persistence traits and in-memory implementations.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::ca::CaRecord;
use crate::error::{Error, Result};
use crate::issuer::{CertificateId, CertificateStatus, IssuedCertificate};

/// Storage backend for certificate authority records.
pub trait CaStore: Send + Sync {
    /// The currently active CA, if one exists.
    fn get_active(&self) -> Result<Option<CaRecord>>;

    /// Persists `record` as the active CA and deactivates every other
    /// record in the same operation, so at most one CA is ever active.
    /// Returns the record as stored.
    fn activate(&self, record: CaRecord) -> Result<CaRecord>;
}

/// Storage backend for issued certificates.
pub trait CertificateStore: Send + Sync {
    fn insert(&self, certificate: IssuedCertificate) -> Result<()>;

    /// Fails with `NotFound` when `id` is unknown.
    fn get(&self, id: &CertificateId) -> Result<IssuedCertificate>;

    /// Certificates recorded for `owner_id`, oldest first.
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<IssuedCertificate>>;

    /// Issued certificates that are still valid now but expire within
    /// `days`, soonest expiry first. Already-expired certificates and
    /// non-issued statuses are excluded.
    fn list_expiring_within(&self, days: i64) -> Result<Vec<IssuedCertificate>>;
}

/// In-memory [`CaStore`] backed by a `RwLock`.
pub struct MemoryCaStore {
    records: RwLock<Vec<CaRecord>>,
}

impl MemoryCaStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Number of CA records, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CaStore for MemoryCaStore {
    fn get_active(&self) -> Result<Option<CaRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| Error::Storage(format!("failed to acquire read lock: {e}")))?;
        Ok(records.iter().rev().find(|r| r.is_active).cloned())
    }

    fn activate(&self, mut record: CaRecord) -> Result<CaRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|e| Error::Storage(format!("failed to acquire write lock: {e}")))?;
        for existing in records.iter_mut() {
            existing.is_active = false;
        }
        record.is_active = true;
        records.push(record.clone());
        debug!("Activated CA: {}", record.common_name);
        Ok(record)
    }
}

impl Default for MemoryCaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCaStore")
            .field("count", &self.len())
            .finish()
    }
}

/// In-memory [`CertificateStore`] backed by a `RwLock`.
pub struct MemoryCertificateStore {
    store: RwLock<HashMap<CertificateId, IssuedCertificate>>,
}

impl MemoryCertificateStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CertificateStore for MemoryCertificateStore {
    fn insert(&self, certificate: IssuedCertificate) -> Result<()> {
        let mut store = self
            .store
            .write()
            .map_err(|e| Error::Storage(format!("failed to acquire write lock: {e}")))?;
        debug!("Storing certificate: {}", certificate.id);
        store.insert(certificate.id.clone(), certificate);
        Ok(())
    }

    fn get(&self, id: &CertificateId) -> Result<IssuedCertificate> {
        let store = self
            .store
            .read()
            .map_err(|e| Error::Storage(format!("failed to acquire read lock: {e}")))?;
        store
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<IssuedCertificate>> {
        let store = self
            .store
            .read()
            .map_err(|e| Error::Storage(format!("failed to acquire read lock: {e}")))?;
        let mut matching: Vec<_> = store
            .values()
            .filter(|c| c.owner_id.as_deref() == Some(owner_id))
            .cloned()
            .collect();
        matching.sort_by_key(|c| c.created_at);
        Ok(matching)
    }

    fn list_expiring_within(&self, days: i64) -> Result<Vec<IssuedCertificate>> {
        let store = self
            .store
            .read()
            .map_err(|e| Error::Storage(format!("failed to acquire read lock: {e}")))?;
        let now = OffsetDateTime::now_utc();
        let threshold = now + Duration::days(days);
        let mut matching: Vec<_> = store
            .values()
            .filter(|c| c.status == CertificateStatus::Issued)
            .filter(|c| c.expires_at > now && c.expires_at <= threshold)
            .cloned()
            .collect();
        matching.sort_by_key(|c| c.expires_at);
        Ok(matching)
    }
}

impl Default for MemoryCertificateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCertificateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCertificateStore")
            .field("count", &self.len())
            .finish()
    }
}
