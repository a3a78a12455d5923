//! Narration sync plans.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Externally supplied mapping from scene index to narration line indices.
///
/// `pairs[i]` lists the narration clips concatenated to form scene `i`'s
/// audio, with `breath_gap_sec` of silence between consecutive lines.
/// Entries are kept as raw JSON so one malformed index does not discard
/// the whole plan; the planner resolves them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SyncPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, deserialize_with = "lenient_pairs")]
    pub pairs: Vec<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient_gap", skip_serializing_if = "Option::is_none")]
    pub breath_gap_sec: Option<f64>,
}

impl SyncPlan {
    /// Plan from integer index groups.
    pub fn from_indices(pairs: Vec<Vec<i64>>, breath_gap_sec: Option<f64>) -> Self {
        Self {
            version: None,
            pairs: pairs
                .into_iter()
                .map(|group| group.into_iter().map(Value::from).collect())
                .collect(),
            breath_gap_sec,
        }
    }
}

/// `pairs` must be a list; a scalar entry is read as a one-element group.
fn lenient_pairs<'de, D>(deserializer: D) -> Result<Vec<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Value::Array(items) => items,
            other => vec![other],
        })
        .collect())
}

/// Any non-numeric gap reads as absent.
fn lenient_gap<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plan() {
        let plan: SyncPlan =
            serde_json::from_str(r#"{"version":"1.0","pairs":[[0],[1,2]],"breath_gap_sec":0.3}"#).unwrap();
        assert_eq!(plan, {
            let mut expected = SyncPlan::from_indices(vec![vec![0], vec![1, 2]], Some(0.3));
            expected.version = Some(json!("1.0"));
            expected
        });
    }

    #[test]
    fn test_gap_is_optional() {
        let plan: SyncPlan = serde_json::from_str(r#"{"pairs":[]}"#).unwrap();
        assert!(plan.breath_gap_sec.is_none());
        assert!(plan.version.is_none());
    }

    #[test]
    fn test_malformed_indices_keep_the_plan() {
        let plan: SyncPlan = serde_json::from_str(
            r#"{"pairs":[[0,1],[2.0,"3",null,1e30],4],"breath_gap_sec":0.3}"#,
        )
        .unwrap();
        assert_eq!(plan.pairs.len(), 3);
        assert_eq!(plan.pairs[1].len(), 4);
        assert_eq!(plan.pairs[2], vec![json!(4)]);
        assert_eq!(plan.breath_gap_sec, Some(0.3));
    }

    #[test]
    fn test_non_numeric_gap_reads_as_absent() {
        let plan: SyncPlan = serde_json::from_str(r#"{"pairs":[[0]],"breath_gap_sec":"slow"}"#).unwrap();
        assert!(plan.breath_gap_sec.is_none());

        let plan: SyncPlan = serde_json::from_str(r#"{"pairs":[[0]],"breath_gap_sec":null}"#).unwrap();
        assert!(plan.breath_gap_sec.is_none());
    }

    #[test]
    fn test_pairs_must_be_a_list() {
        assert!(serde_json::from_str::<SyncPlan>(r#"{"pairs":"nope"}"#).is_err());
    }
}
