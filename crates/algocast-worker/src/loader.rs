//! Decoding of event and sync-plan files.
//!
//! Event files arrive as plain JSON, gzip-compressed JSON, or a JSON string
//! whose contents are themselves JSON. The decoded root must be a list or a
//! mapping; interpreting it is the normalizer's job.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use serde_json::Value;
use tracing::warn;

use algocast_models::SyncPlan;

use crate::error::{AssemblyError, AssemblyResult};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decode raw event-file bytes into a JSON list or mapping.
pub fn decode_events(bytes: &[u8]) -> AssemblyResult<Value> {
    let value = decode_json(bytes)?;
    match value {
        Value::Array(_) | Value::Object(_) => Ok(value),
        other => Err(AssemblyError::format(format!(
            "events root must be a list or mapping, got {}",
            json_type(&other)
        ))),
    }
}

/// Read and decode an event file.
pub async fn load_events(path: impl AsRef<Path>) -> AssemblyResult<Value> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    decode_events(&bytes)
}

/// Read a sync plan, ignoring files that cannot be decoded.
pub async fn load_sync_plan(path: impl AsRef<Path>) -> Option<SyncPlan> {
    let path = path.as_ref();
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) => {
            warn!("Sync plan {} unreadable: {}", path.display(), e);
            return None;
        }
    };
    match decode_json(&bytes).and_then(|v| {
        serde_json::from_value::<SyncPlan>(v).map_err(|e| AssemblyError::format(e.to_string()))
    }) {
        Ok(plan) => Some(plan),
        Err(e) => {
            warn!("Ignoring invalid sync plan {}: {}", path.display(), e);
            None
        }
    }
}

fn decode_json(bytes: &[u8]) -> AssemblyResult<Value> {
    let inflated;
    let bytes = if bytes.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut out)
            .map_err(|e| AssemblyError::format(format!("invalid gzip data: {}", e)))?;
        inflated = out;
        inflated.as_slice()
    } else {
        bytes
    };

    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');
    let value: Value =
        serde_json::from_str(text).map_err(|e| AssemblyError::format(format!("invalid JSON: {}", e)))?;

    // Double-encoded: the document is a JSON string holding JSON
    match value {
        Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| AssemblyError::format(format!("invalid inner JSON: {}", e))),
        other => Ok(other),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use serde_json::json;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_gzip_and_plain_decode_identically() {
        let doc = br#"{"scenes":[{"t":"TitleCard","text":"Two Sum"}],"input":{"nums":[2,7,11]}}"#;
        let plain = decode_events(doc).unwrap();
        let zipped = decode_events(&gzip(doc)).unwrap();
        assert_eq!(plain, zipped);
        assert_eq!(plain["input"]["nums"], json!([2, 7, 11]));
    }

    #[test]
    fn test_double_encoded() {
        let inner = r#"[{"type":"callout","args":{"text":"hi"}}]"#;
        let outer = serde_json::to_vec(&Value::String(inner.to_string())).unwrap();
        let value = decode_events(&outer).unwrap();
        assert_eq!(value[0]["args"]["text"], "hi");

        let zipped = decode_events(&gzip(&outer)).unwrap();
        assert_eq!(value, zipped);
    }

    #[test]
    fn test_bom_is_ignored() {
        let mut doc = "\u{feff}".as_bytes().to_vec();
        doc.extend_from_slice(b"[]");
        assert_eq!(decode_events(&doc).unwrap(), json!([]));
    }

    #[test]
    fn test_scalar_root_is_format_error() {
        assert!(matches!(decode_events(b"42"), Err(AssemblyError::Format(_))));
        assert!(matches!(decode_events(b"\"\\\"text\\\"\""), Err(AssemblyError::Format(_))));
        assert!(matches!(decode_events(b"{not json"), Err(AssemblyError::Format(_))));
    }

    #[tokio::test]
    async fn test_load_sync_plan() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("sync.json");
        tokio::fs::write(&good, br#"{"pairs":[[0],[1,2]],"breath_gap_sec":0.2}"#)
            .await
            .unwrap();
        let plan = load_sync_plan(&good).await.unwrap();
        assert_eq!(plan.pairs.len(), 2);

        let bad = dir.path().join("bad.json");
        tokio::fs::write(&bad, br#"{"pairs":"nope"}"#).await.unwrap();
        assert!(load_sync_plan(&bad).await.is_none());
        assert!(load_sync_plan(dir.path().join("missing.json")).await.is_none());
    }

    #[tokio::test]
    async fn test_sync_plan_with_float_index_keeps_grouping() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sync.json");
        tokio::fs::write(&path, br#"{"pairs":[[0,1],[2.0]],"breath_gap_sec":0.3}"#)
            .await
            .unwrap();

        let loaded = load_sync_plan(&path).await.unwrap();
        let resolved = crate::sync::plan(Some(&loaded), 2);
        assert_eq!(resolved.pairs, vec![vec![0, 1], vec![2]]);
        assert_eq!(resolved.gap, 0.3);
    }
}
