//! Scene-argument coercion.
//!
//! Turns a canonical event into the typed [`Scene`] its template consumes,
//! filling defaults for anything missing. Coercion never fails: a record
//! that matches no template becomes [`Scene::fallback`].

use serde_json::{Map, Value};

use algocast_models::{CanonicalEvent, EventKind, PointerName, Pointers, Scene};

use crate::value::{display, present, text};

/// Coerce a canonical event.
///
/// `root_nums` supplies array values for events that do not carry them.
pub fn coerce_event(event: &CanonicalEvent, root_nums: &Value) -> Scene {
    coerce_kind(event.kind, &event.args, root_nums)
}

/// Coerce a flat scene record tagged by `t` or `type`.
///
/// Unlike canonical events, flat records keep their arguments at the top
/// level and a pointer move is always narrated rather than animated.
#[cfg_attr(not(test), allow(dead_code))]
pub(crate) fn coerce_flat(record: &Value, root_nums: &Value) -> Scene {
    let Some(obj) = record.as_object() else {
        return Scene::fallback();
    };
    let tag = present(obj.get("t"))
        .or_else(|| present(obj.get("type")))
        .and_then(Value::as_str)
        .and_then(EventKind::parse);

    match tag {
        Some(EventKind::MovePointer) => narrated_move(obj),
        Some(EventKind::Title) => Scene::Title {
            title: text(obj.get("text"))
                .or_else(|| text(obj.get("title")))
                .unwrap_or_else(|| "Algorithm".to_string()),
            subtitle: text(obj.get("subtitle")).unwrap_or_default(),
        },
        Some(kind) => coerce_kind(kind, obj, root_nums),
        None => Scene::fallback(),
    }
}

fn coerce_kind(kind: EventKind, args: &Map<String, Value>, root_nums: &Value) -> Scene {
    match kind {
        EventKind::Title => Scene::Title {
            title: text(args.get("title")).unwrap_or_else(|| "Algorithm".to_string()),
            subtitle: text(args.get("subtitle")).unwrap_or_default(),
        },
        EventKind::ArrayState => array_scene(args, root_nums),
        EventKind::MovePointer => move_scene(args, root_nums),
        EventKind::Callout => Scene::Callout {
            text: text(args.get("text")).unwrap_or_else(|| "Note".to_string()),
        },
        EventKind::Complexity => Scene::Complexity {
            time: text(args.get("time"))
                .or_else(|| text(args.get("time_complexity")))
                .unwrap_or_else(|| "O(n)".to_string()),
            space: text(args.get("space"))
                .or_else(|| text(args.get("space_complexity")))
                .unwrap_or_else(|| "O(1)".to_string()),
        },
        EventKind::Result => Scene::Result {
            text: text(args.get("text")).unwrap_or_else(|| "Done".to_string()),
        },
    }
}

fn array_scene(args: &Map<String, Value>, root_nums: &Value) -> Scene {
    let mut pointers = Pointers::default();
    if let Some(Value::Object(inline)) = args.get("pointers") {
        for name in PointerName::ALL {
            pointers.set(name, inline.get(name.as_str()).and_then(Value::as_i64));
        }
    }
    // Top-level pointer keys win over the pointers mapping
    for name in PointerName::ALL {
        if let Some(v) = args.get(name.as_str()) {
            pointers.set(name, v.as_i64());
        }
    }

    let highlight: Vec<i64> = match args.get("highlight") {
        Some(Value::Array(items)) if !items.is_empty() => {
            items.iter().filter_map(Value::as_i64).collect()
        }
        _ => pointers.mid.into_iter().collect(),
    };

    Scene::ArrayState {
        values: values_of(args, root_nums),
        pointers,
        highlight,
    }
}

fn move_scene(args: &Map<String, Value>, root_nums: &Value) -> Scene {
    let which = args.get("which").and_then(Value::as_str).and_then(PointerName::parse);
    let from = args
        .get("frm")
        .or_else(|| args.get("from"))
        .and_then(Value::as_i64);
    let to = args.get("to").and_then(Value::as_i64);

    match (which, from, to) {
        (Some(which), Some(from), Some(to)) => Scene::MovePointer {
            values: values_of(args, root_nums),
            which,
            from,
            to,
        },
        _ => narrated_move(args),
    }
}

/// A pointer move described in words.
fn narrated_move(args: &Map<String, Value>) -> Scene {
    let which = text(args.get("which")).unwrap_or_else(|| "pointer".to_string());
    let to = args
        .get("to")
        .filter(|v| !v.is_null())
        .map(display)
        .unwrap_or_else(|| "?".to_string());
    Scene::Callout {
        text: format!("Move {} to index {}", which, to),
    }
}

/// Inline `values`, else the document's root numbers.
fn values_of(args: &Map<String, Value>, root_nums: &Value) -> Vec<Value> {
    match present(args.get("values")) {
        Some(Value::Array(items)) => items.clone(),
        _ => match root_nums {
            Value::Array(items) => items.clone(),
            _ => Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical(kind: EventKind, args: Value) -> CanonicalEvent {
        CanonicalEvent::new(kind, args.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_defaults() {
        let none = json!([]);
        assert_eq!(
            coerce_event(&canonical(EventKind::Title, json!({})), &none),
            Scene::Title { title: "Algorithm".into(), subtitle: String::new() }
        );
        assert_eq!(
            coerce_event(&canonical(EventKind::Callout, json!({"text": ""})), &none),
            Scene::Callout { text: "Note".into() }
        );
        assert_eq!(
            coerce_event(&canonical(EventKind::Result, json!({})), &none),
            Scene::Result { text: "Done".into() }
        );
        assert_eq!(
            coerce_event(&canonical(EventKind::Complexity, json!({})), &none),
            Scene::Complexity { time: "O(n)".into(), space: "O(1)".into() }
        );
    }

    #[test]
    fn test_complexity_accepts_both_spellings() {
        let scene = coerce_event(
            &canonical(EventKind::Complexity, json!({"time_complexity": "O(log n)", "space": "O(n)"})),
            &json!([]),
        );
        assert_eq!(scene, Scene::Complexity { time: "O(log n)".into(), space: "O(n)".into() });
    }

    #[test]
    fn test_array_state_pointer_precedence() {
        let scene = coerce_event(
            &canonical(
                EventKind::ArrayState,
                json!({"pointers": {"left": 0, "mid": 2, "right": 4}, "mid": 3, "right": null}),
            ),
            &json!([1, 3, 5, 7, 9]),
        );
        match scene {
            Scene::ArrayState { values, pointers, highlight } => {
                assert_eq!(values.len(), 5);
                assert_eq!(pointers, Pointers { left: Some(0), mid: Some(3), right: None });
                assert_eq!(highlight, vec![3]);
            }
            other => panic!("unexpected scene {:?}", other),
        }
    }

    #[test]
    fn test_array_state_inline_values_and_highlight() {
        let scene = coerce_event(
            &canonical(EventKind::ArrayState, json!({"values": [8, 9], "highlight": [0, 1]})),
            &json!([1, 2, 3]),
        );
        assert_eq!(
            scene,
            Scene::ArrayState {
                values: vec![json!(8), json!(9)],
                pointers: Pointers::default(),
                highlight: vec![0, 1],
            }
        );
    }

    #[test]
    fn test_array_state_without_mid_has_no_highlight() {
        let scene = coerce_event(&canonical(EventKind::ArrayState, json!({})), &json!(null));
        assert_eq!(
            scene,
            Scene::ArrayState { values: vec![], pointers: Pointers::default(), highlight: vec![] }
        );
    }

    #[test]
    fn test_complete_move_is_animated() {
        let scene = coerce_event(
            &canonical(EventKind::MovePointer, json!({"which": "left", "frm": 0, "to": 3})),
            &json!([1, 3, 5, 7]),
        );
        assert_eq!(
            scene,
            Scene::MovePointer {
                values: vec![json!(1), json!(3), json!(5), json!(7)],
                which: PointerName::Left,
                from: 0,
                to: 3,
            }
        );
    }

    #[test]
    fn test_incomplete_move_is_narrated() {
        let scene = coerce_event(&canonical(EventKind::MovePointer, json!({"which": "mid", "to": 2})), &json!([]));
        assert_eq!(scene, Scene::Callout { text: "Move mid to index 2".into() });

        let scene = coerce_event(&canonical(EventKind::MovePointer, json!({})), &json!([]));
        assert_eq!(scene, Scene::Callout { text: "Move pointer to index ?".into() });
    }

    #[test]
    fn test_flat_records() {
        let nums = json!([4, 5]);
        assert_eq!(
            coerce_flat(&json!({"t": "TitleCard", "text": "Two Sum"}), &nums),
            Scene::Title { title: "Two Sum".into(), subtitle: String::new() }
        );
        assert_eq!(
            coerce_flat(&json!({"t": "MovePointer", "which": "left", "frm": 0, "to": 1}), &nums),
            Scene::Callout { text: "Move left to index 1".into() }
        );
        assert_eq!(
            coerce_flat(&json!({"type": "ResultCard"}), &nums),
            Scene::Result { text: "Done".into() }
        );
        assert_eq!(
            coerce_flat(&json!({"t": "ArrayTape", "left": 0}), &nums),
            Scene::ArrayState {
                values: vec![json!(4), json!(5)],
                pointers: Pointers { left: Some(0), mid: None, right: None },
                highlight: vec![],
            }
        );
    }

    #[test]
    fn test_unknown_flat_record_falls_back() {
        assert_eq!(coerce_flat(&json!({"t": "Heap"}), &json!([])), Scene::fallback());
        assert_eq!(coerce_flat(&json!({}), &json!([])), Scene::fallback());
        assert_eq!(coerce_flat(&json!("x"), &json!([])), Scene::fallback());
    }
}
