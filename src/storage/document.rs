use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    schema_version: u8,
    records: &'a [T],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDocument<T> {
    Versioned { schema_version: u8, records: Vec<T> },
    /// Files written before documents carried a version were bare arrays.
    Legacy(Vec<T>),
}

/// Records decoded from one stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub schema_version: u8,
    pub legacy: bool,
}

pub fn encode<T: Serialize>(records: &[T]) -> Result<String> {
    let envelope = EnvelopeRef {
        schema_version: CURRENT_SCHEMA_VERSION,
        records,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<Decoded<T>> {
    if raw.trim().is_empty() {
        return Ok(Decoded {
            records: Vec::new(),
            schema_version: CURRENT_SCHEMA_VERSION,
            legacy: false,
        });
    }
    match serde_json::from_str::<StoredDocument<T>>(raw)? {
        StoredDocument::Versioned {
            schema_version,
            records,
        } => {
            if schema_version > CURRENT_SCHEMA_VERSION {
                return Err(LedgerError::Persistence(format!(
                    "document schema v{} is newer than supported v{}",
                    schema_version, CURRENT_SCHEMA_VERSION
                )));
            }
            Ok(Decoded {
                records,
                schema_version,
                legacy: false,
            })
        }
        StoredDocument::Legacy(records) => Ok(Decoded {
            records,
            schema_version: 0,
            legacy: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_documents_carry_the_schema_version() {
        let raw = encode(&[1u32, 2, 3]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["schema_version"], CURRENT_SCHEMA_VERSION);
        let decoded: Decoded<u32> = decode(&raw).unwrap();
        assert_eq!(decoded.records, vec![1, 2, 3]);
        assert!(!decoded.legacy);
    }

    #[test]
    fn bare_arrays_load_as_legacy() {
        let decoded: Decoded<u32> = decode("[4, 5]").unwrap();
        assert_eq!(decoded.records, vec![4, 5]);
        assert!(decoded.legacy);
        assert_eq!(decoded.schema_version, 0);
    }

    #[test]
    fn rejects_future_schema_versions() {
        let raw = format!(
            "{{\"schema_version\": {}, \"records\": []}}",
            CURRENT_SCHEMA_VERSION + 5
        );
        let err = decode::<u32>(&raw).expect_err("future schema should fail");
        assert!(matches!(err, LedgerError::Persistence(msg) if msg.contains("newer")));
    }

    #[test]
    fn blank_document_is_empty() {
        let decoded: Decoded<u32> = decode("  \n").unwrap();
        assert!(decoded.records.is_empty());
    }
}
