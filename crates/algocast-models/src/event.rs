//! Canonical timeline events.
//!
//! Every accepted event source is normalized into an ordered list of
//! [`CanonicalEvent`]s. The ordering is significant: one event drives one
//! rendered scene.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The fixed set of scene templates an event can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Title card with optional subtitle
    #[default]
    Title,
    /// Array tape with pointer markers
    ArrayState,
    /// Animated pointer move between two indices
    MovePointer,
    /// Boxed text callout
    Callout,
    /// Time/space complexity card
    Complexity,
    /// Final result card
    Result,
}

impl EventKind {
    /// Wire name used in `{type, args}` event lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Title => "title_card",
            EventKind::ArrayState => "array_tape",
            EventKind::MovePointer => "move_pointer",
            EventKind::Callout => "callout",
            EventKind::Complexity => "complexity_card",
            EventKind::Result => "result_card",
        }
    }

    /// Parse any known spelling of a kind.
    ///
    /// Accepts wire names (`title_card`), canonical names (`array_state`) and
    /// scene tags (`TitleCard`), case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "titlecard" | "title" => Some(EventKind::Title),
            "arraytape" | "arraystate" => Some(EventKind::ArrayState),
            "movepointer" => Some(EventKind::MovePointer),
            "callout" => Some(EventKind::Callout),
            "complexitycard" | "complexity" => Some(EventKind::Complexity),
            "resultcard" | "result" => Some(EventKind::Result),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unknown kinds fall back to a title card.
impl From<String> for EventKind {
    fn from(s: String) -> Self {
        EventKind::parse(&s).unwrap_or_default()
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A normalized `{type, args}` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    #[serde(rename = "type", alias = "kind")]
    pub kind: EventKind,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl CanonicalEvent {
    /// Create an event from a kind and an argument map.
    pub fn new(kind: EventKind, args: Map<String, Value>) -> Self {
        Self { kind, args }
    }

    /// Look up a string argument.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    /// Look up an integer argument.
    pub fn arg_i64(&self, key: &str) -> Option<i64> {
        self.args.get(key).and_then(Value::as_i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_spellings() {
        assert_eq!(EventKind::parse("title_card"), Some(EventKind::Title));
        assert_eq!(EventKind::parse("TitleCard"), Some(EventKind::Title));
        assert_eq!(EventKind::parse("array_state"), Some(EventKind::ArrayState));
        assert_eq!(EventKind::parse("MovePointer"), Some(EventKind::MovePointer));
        assert_eq!(EventKind::parse("big_o"), None);
    }

    #[test]
    fn test_unknown_kind_deserializes_as_title() {
        let ev: CanonicalEvent =
            serde_json::from_value(json!({"type": "hash_map", "args": {}})).unwrap();
        assert_eq!(ev.kind, EventKind::Title);
    }

    #[test]
    fn test_kind_alias_and_wire_name() {
        let ev: CanonicalEvent =
            serde_json::from_value(json!({"kind": "complexity_card", "args": {"time_complexity": "O(n)"}}))
                .unwrap();
        assert_eq!(ev.kind, EventKind::Complexity);
        assert_eq!(ev.arg_str("time_complexity"), Some("O(n)"));

        let out = serde_json::to_value(&ev).unwrap();
        assert_eq!(out["type"], "complexity_card");
    }
}
