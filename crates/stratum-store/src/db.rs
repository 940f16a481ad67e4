//! Connection setup and shared row helpers

use crate::{StoreConfig, StoreError};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// A single resource's connection behind its own lock
///
/// Every mutation of a resource runs while holding this lock, which
/// serialises writers per resource without coordinating across resources.
pub(crate) struct Resource {
    name: &'static str,
    conn: Mutex<Connection>,
}

impl Resource {
    /// Open `<data_dir>/<name>.db` (or a private in-memory database) and apply `schema`
    pub(crate) fn open(
        config: &StoreConfig,
        name: &'static str,
        schema: &str,
    ) -> Result<Self, StoreError> {
        let conn = match &config.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let conn = Connection::open(dir.join(format!("{}.db", name)))?;
                conn.busy_timeout(config.busy_timeout())?;
                let _mode: String =
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
                conn.pragma_update(None, "synchronous", "FULL")?;
                conn
            }
            None => Connection::open_in_memory()?,
        };

        conn.execute_batch(schema)?;
        tracing::debug!("Opened {} store", name);

        Ok(Self {
            name,
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the resource lock
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned(self.name))
    }
}

/// Convert a u128 id to bytes for storage
pub(crate) fn id_to_bytes(value: u128) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Convert stored bytes back to a u128 id
pub(crate) fn bytes_to_id(bytes: &[u8]) -> Result<u128, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for id, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(u128::from_be_bytes(arr))
}

/// Read a 16-byte id column inside a row mapper
pub(crate) fn id_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<u128> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes_to_id(&bytes).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Blob, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_bytes_roundtrip() {
        let value = 0x0123_4567_89ab_cdef_0123_4567_89ab_cdefu128;
        assert_eq!(bytes_to_id(&id_to_bytes(value)).unwrap(), value);
    }

    #[test]
    fn test_bytes_to_id_rejects_wrong_length() {
        assert!(matches!(bytes_to_id(&[1, 2, 3]), Err(StoreError::InvalidData(_))));
    }
}
