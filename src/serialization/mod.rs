//! CBOR serialization for ledger snapshots.
//!
//! Snapshots exported by `parkvote export` use CBOR via `ciborium` (NOT
//! JSON): compact, cross-language, and schema evolution stays cheap with
//! `#[serde(default)]`.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Serialization errors.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// CBOR encoding failed.
    #[error("CBOR encoding failed: {0}")]
    Encode(String),

    /// CBOR decoding failed.
    #[error("CBOR decoding failed: {0}")]
    Decode(String),
}

/// Serialize to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SerializationError::Encode(format!("{:?}", e)))?;
    Ok(bytes)
}

/// Deserialize from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    ciborium::from_reader(bytes).map_err(|e| SerializationError::Decode(format!("{:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Identity, ManualClock, ProposalLedger, LedgerSnapshot, VotePolicy};
    use std::sync::Arc;

    #[test]
    fn test_snapshot_round_trip() {
        let clock = Arc::new(ManualClock::new(1_000));
        let mut ledger = ProposalLedger::with_clock(VotePolicy::SelfChecked, clock);
        let id = ledger
            .create_proposal(
                "East grove",
                "Thin the grove",
                60,
                "thread-4",
                9_000,
                &Identity::from("addr-C"),
            )
            .unwrap();
        ledger.vote(id, true, &Identity::from("addr-A")).unwrap();

        let snapshot = ledger.snapshot();
        let bytes = to_cbor(&snapshot).unwrap();
        let recovered: LedgerSnapshot = from_cbor(&bytes).unwrap();
        assert_eq!(snapshot, recovered);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result: Result<LedgerSnapshot, _> = from_cbor(&[0xff, 0x00, 0x13]);
        assert!(result.is_err());
    }
}
