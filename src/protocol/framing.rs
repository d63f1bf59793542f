//! Record-separated framing used by text hub protocols.

use serde::de::DeserializeOwned;

use crate::core::DecodeError;
use crate::core::constants::RECORD_SEPARATOR;

/// Append the record separator to `record`.
pub fn with_separator(record: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(record.len() + 1);
    out.extend_from_slice(record);
    out.push(RECORD_SEPARATOR);
    out
}

/// Split a payload into its records.
///
/// Empty records (including the one after a trailing separator) are skipped.
pub fn split_records(payload: &[u8]) -> impl Iterator<Item = &[u8]> {
    payload
        .split(|b| *b == RECORD_SEPARATOR)
        .filter(|record| !record.is_empty())
}

/// Decode every record of `payload` as a JSON value of type `T`.
pub fn decode_json_records<T: DeserializeOwned>(payload: &[u8]) -> Result<Vec<T>, DecodeError> {
    split_records(payload)
        .map(|record| {
            serde_json::from_slice(record)
                .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))
        })
        .collect()
}
