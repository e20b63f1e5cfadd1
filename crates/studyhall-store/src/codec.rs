//! Reversible encoding for stored values
//!
//! Values are JSON behind base64 so they read as opaque strings in the
//! underlying store. This is obfuscation, not security.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::StoreResult;

/// Encode a value as base64-over-JSON
pub fn encode<T: Serialize>(value: &T) -> StoreResult<String> {
    let json = serde_json::to_vec(value)?;
    Ok(STANDARD.encode(json))
}

/// Decode a stored string. Any failure (bad base64, bad JSON, wrong
/// shape, out-of-range numbers) yields `None`; the caller substitutes
/// its zero-valued default.
pub fn decode<T: DeserializeOwned>(encoded: &str) -> Option<T> {
    let bytes = STANDARD.decode(encoded.as_bytes()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyhall_api::LedgerRecord;

    #[test]
    fn test_round_trip_is_identity() {
        let record = LedgerRecord {
            total_ms: 3_600_000,
            sessions: 7,
        };

        let encoded = encode(&record).unwrap();
        let decoded: LedgerRecord = decode(&encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_encoded_value_is_opaque() {
        let record = LedgerRecord {
            total_ms: 1,
            sessions: 1,
        };
        let encoded = encode(&record).unwrap();
        assert!(!encoded.contains("total_ms"));
    }

    #[test]
    fn test_malformed_inputs_decode_to_none() {
        assert!(decode::<LedgerRecord>("not base64!!!").is_none());

        // Valid base64, invalid JSON
        let garbage = STANDARD.encode(b"garbage");
        assert!(decode::<LedgerRecord>(&garbage).is_none());

        // Valid JSON, wrong shape
        let wrong = STANDARD.encode(br#"{"total_ms":"abc","sessions":1}"#);
        assert!(decode::<LedgerRecord>(&wrong).is_none());

        // Negative numbers fail the unsigned fields
        let negative = STANDARD.encode(br#"{"total_ms":-1,"sessions":0}"#);
        assert!(decode::<LedgerRecord>(&negative).is_none());
    }
}
