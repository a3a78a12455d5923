//! Typed scene variants.
//!
//! A [`Scene`] is the fully coerced input to a scene renderer. Each variant
//! carries only the arguments its template needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::event::EventKind;

/// Name of an array pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerName {
    Left,
    Mid,
    Right,
}

impl PointerName {
    /// All pointer names in drawing order.
    pub const ALL: [PointerName; 3] = [PointerName::Left, PointerName::Mid, PointerName::Right];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(PointerName::Left),
            "mid" => Some(PointerName::Mid),
            "right" => Some(PointerName::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PointerName::Left => "left",
            PointerName::Mid => "mid",
            PointerName::Right => "right",
        }
    }
}

impl fmt::Display for PointerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pointer positions over an array tape. Unset pointers are not drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<i64>,
}

impl Pointers {
    pub fn get(&self, name: PointerName) -> Option<i64> {
        match name {
            PointerName::Left => self.left,
            PointerName::Mid => self.mid,
            PointerName::Right => self.right,
        }
    }

    pub fn set(&mut self, name: PointerName, index: Option<i64>) {
        match name {
            PointerName::Left => self.left = index,
            PointerName::Mid => self.mid = index,
            PointerName::Right => self.right = index,
        }
    }

    /// Iterate over the pointers that are set.
    pub fn iter(&self) -> impl Iterator<Item = (PointerName, i64)> + '_ {
        PointerName::ALL
            .into_iter()
            .filter_map(move |name| self.get(name).map(|idx| (name, idx)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// A renderable scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scene {
    Title {
        title: String,
        subtitle: String,
    },
    ArrayState {
        values: Vec<Value>,
        pointers: Pointers,
        highlight: Vec<i64>,
    },
    MovePointer {
        values: Vec<Value>,
        which: PointerName,
        from: i64,
        to: i64,
    },
    Callout {
        text: String,
    },
    Complexity {
        time: String,
        space: String,
    },
    Result {
        text: String,
    },
}

impl Scene {
    /// The scene substituted when a render fails.
    pub fn fallback() -> Self {
        Scene::Callout {
            text: "Step".to_string(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Scene::Title { .. } => EventKind::Title,
            Scene::ArrayState { .. } => EventKind::ArrayState,
            Scene::MovePointer { .. } => EventKind::MovePointer,
            Scene::Callout { .. } => EventKind::Callout,
            Scene::Complexity { .. } => EventKind::Complexity,
            Scene::Result { .. } => EventKind::Result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointers_iter_skips_unset() {
        let p = Pointers {
            left: Some(0),
            mid: None,
            right: Some(6),
        };
        let set: Vec<_> = p.iter().collect();
        assert_eq!(set, vec![(PointerName::Left, 0), (PointerName::Right, 6)]);
        assert!(Pointers::default().is_empty());
    }

    #[test]
    fn test_scene_serializes_with_kind_tag() {
        let scene = Scene::fallback();
        let v = serde_json::to_value(&scene).unwrap();
        assert_eq!(v, json!({"kind": "callout", "text": "Step"}));
        assert_eq!(scene.kind(), EventKind::Callout);
    }

    #[test]
    fn test_unset_pointers_are_omitted() {
        let scene = Scene::ArrayState {
            values: vec![json!(1), json!(2)],
            pointers: Pointers {
                mid: Some(1),
                ..Default::default()
            },
            highlight: vec![1],
        };
        let v = serde_json::to_value(&scene).unwrap();
        assert_eq!(v["pointers"], json!({"mid": 1}));
    }
}
