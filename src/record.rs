//! deterministic synthetic records
//!
//! Record `i` has the value `value_<i>` and, depending on the candidate, a
//! text key `key_<i padded to 9 digits>` or the index itself as a native
//! endian `u32`. Populate and verify both derive records from here, so
//! nothing about the expected data is ever stored.

use std::fmt::Write;

/// Largest record count whose text keys still sort in index order.
pub const MAX_RECORDS: u64 = 999_999_999;

/// How a record index is turned into a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// `key_000000042`
    Text,
    /// `42u32.to_ne_bytes()`
    Integer,
}

impl KeyKind {
    /// Human readable form of the key of record `index`, used in diagnostics.
    pub fn describe(&self, index: u64) -> String {
        match self {
            KeyKind::Text => text_key(index),
            KeyKind::Integer => index.to_string(),
        }
    }
}

/// The text key of record `index`.
pub fn text_key(index: u64) -> String {
    format!("key_{:09}", index)
}

/// The value of record `index`.
pub fn value(index: u64) -> String {
    format!("value_{}", index)
}

/// Reusable buffers for formatting one record at a time.
///
/// The buffers grow as needed and are reused across records, so formatting
/// a large trial does not allocate per record.
pub struct RecordBuf {
    kind: KeyKind,
    key: String,
    int_key: [u8; 4],
    value: String,
}

impl RecordBuf {
    /// Buffers for keys of `kind`.
    pub fn new(kind: KeyKind) -> Self {
        RecordBuf {
            kind,
            key: String::with_capacity(16),
            int_key: [0; 4],
            value: String::with_capacity(16),
        }
    }

    /// Key kind of the records produced.
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Format record `index`, returning `(key, value)` bytes.
    pub fn format(&mut self, index: u64) -> (&[u8], &[u8]) {
        debug_assert!(index <= MAX_RECORDS);
        self.value.clear();
        // writing into a String cannot fail
        let _ = write!(self.value, "value_{}", index);
        let key: &[u8] = match self.kind {
            KeyKind::Text => {
                self.key.clear();
                let _ = write!(self.key, "key_{:09}", index);
                self.key.as_bytes()
            }
            KeyKind::Integer => {
                self.int_key = (index as u32).to_ne_bytes();
                &self.int_key
            }
        };
        (key, self.value.as_bytes())
    }
}
