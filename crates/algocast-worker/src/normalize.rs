//! Event Normalizer: any accepted event source to canonical events.
//!
//! Accepted shapes, in priority order:
//! 1. a list of `{type|kind, args}` records (passed through),
//! 2. a list of loosely typed `{step, ...}` records,
//! 3. a mapping with an `events` list,
//! 4. a mapping with a `scenes` list of tagged scenes (`{t: "ArrayTape", ...}`)
//!    plus optional `input.nums`, folded with pointer state,
//! 5. any other mapping, treated as a one-element list.
//!
//! Only a root that is neither list nor mapping is rejected.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use algocast_models::{CanonicalEvent, EventKind, PointerName};

use crate::error::{AssemblyError, AssemblyResult};
use crate::value::{present, text};

/// Normalize a decoded event document.
pub fn normalize_events(raw: &Value) -> AssemblyResult<Vec<CanonicalEvent>> {
    match raw {
        Value::Array(items) => Ok(normalize_list(items)),
        Value::Object(map) => {
            if let Some(Value::Array(events)) = map.get("events") {
                return Ok(normalize_list(events));
            }
            if let Some(Value::Array(scenes)) = map.get("scenes") {
                return Ok(normalize_scenes(scenes, root_nums(raw)));
            }
            Ok(vec![normalize_item(raw)])
        }
        _ => Err(AssemblyError::format("events root must be a list or mapping")),
    }
}

/// `input.nums` of a wrapped-scenes document, or an empty list.
pub fn root_nums(raw: &Value) -> Value {
    present(raw.get("input").and_then(|input| input.get("nums")))
        .cloned()
        .unwrap_or_else(|| json!([]))
}

fn normalize_list(items: &[Value]) -> Vec<CanonicalEvent> {
    items.iter().map(normalize_item).collect()
}

fn normalize_item(item: &Value) -> CanonicalEvent {
    let Some(obj) = item.as_object() else {
        return step_event("", &Map::new());
    };

    let tag = obj.get("type").or_else(|| obj.get("kind"));
    if let (Some(tag), Some(args)) = (tag, obj.get("args")) {
        let kind = tag
            .as_str()
            .map(|s| EventKind::from(s.to_string()))
            .unwrap_or_default();
        let args = args.as_object().cloned().unwrap_or_default();
        return CanonicalEvent::new(kind, args);
    }

    let step = obj
        .get("step")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();
    step_event(&step, obj)
}

fn step_event(step: &str, obj: &Map<String, Value>) -> CanonicalEvent {
    let get = |key: &str| present(obj.get(key)).cloned();

    match step {
        "title" | "intro" => event(
            EventKind::Title,
            json!({
                "title": get("title").unwrap_or_else(|| json!("Algorithm")),
                "subtitle": get("subtitle").unwrap_or_else(|| json!("")),
            }),
        ),
        "array" | "state" => event(
            EventKind::ArrayState,
            json!({
                "values": get("values").unwrap_or_else(|| json!([])),
                "pointers": get("pointers").unwrap_or_else(|| json!({})),
                "highlight": get("highlight").unwrap_or_else(|| json!([])),
            }),
        ),
        "complexity" | "big_o" => event(
            EventKind::Complexity,
            json!({
                "time_complexity": get("time").unwrap_or_else(|| json!("O(n)")),
                "space_complexity": get("space").unwrap_or_else(|| json!("O(1)")),
            }),
        ),
        _ => {
            let fallback = if step.is_empty() {
                "Step".to_string()
            } else {
                capitalize(step)
            };
            event(
                EventKind::Title,
                json!({
                    "title": get("title").unwrap_or_else(|| json!(fallback)),
                    "subtitle": get("subtitle").unwrap_or_else(|| json!("")),
                }),
            )
        }
    }
}

/// Pointer positions accumulated while folding over wrapped scenes.
#[derive(Debug, Clone, Default)]
struct PointerState(BTreeMap<PointerName, i64>);

impl PointerState {
    /// Fold one scene into the state, returning the event it emits, if any.
    fn apply(&mut self, scene: &Value, nums: &Value) -> Option<CanonicalEvent> {
        let obj = scene.as_object()?;
        let tag = obj.get("t");

        match tag.and_then(Value::as_str) {
            Some("MovePointer") => self.move_pointer(obj, nums),
            Some("TitleCard") => Some(event(
                EventKind::Title,
                json!({
                    "title": text(obj.get("text")).unwrap_or_else(|| "Algorithm".to_string()),
                    "subtitle": "",
                }),
            )),
            Some("ArrayTape") => {
                let mut pointers: Map<String, Value> = self
                    .0
                    .iter()
                    .map(|(name, idx)| (name.as_str().to_string(), json!(idx)))
                    .collect();
                for name in PointerName::ALL {
                    if let Some(v) = obj.get(name.as_str()) {
                        pointers.insert(name.as_str().to_string(), v.clone());
                    }
                }
                Some(event(
                    EventKind::ArrayState,
                    json!({ "values": nums, "pointers": pointers }),
                ))
            }
            Some("Callout") => Some(event(
                EventKind::Callout,
                json!({ "text": text(obj.get("text")).unwrap_or_default() }),
            )),
            Some("ComplexityCard") => Some(event(
                EventKind::Complexity,
                json!({
                    "time_complexity": text(obj.get("time")).unwrap_or_else(|| "O(log n)".to_string()),
                    "space_complexity": text(obj.get("space")).unwrap_or_else(|| "O(1)".to_string()),
                }),
            )),
            Some("ResultCard") => Some(event(
                EventKind::Result,
                json!({ "text": text(obj.get("text")).unwrap_or_else(|| "Result".to_string()) }),
            )),
            _ => Some(event(
                EventKind::Title,
                json!({
                    "title": text(tag).unwrap_or_else(|| "Step".to_string()),
                    "subtitle": "",
                }),
            )),
        }
    }

    /// Update a pointer; emit a move only when it already had a different position.
    fn move_pointer(&mut self, obj: &Map<String, Value>, nums: &Value) -> Option<CanonicalEvent> {
        let which = obj.get("which").and_then(Value::as_str).and_then(PointerName::parse)?;
        let to = obj.get("to").and_then(Value::as_i64)?;

        let prev = self.0.insert(which, to);
        match prev {
            Some(frm) if frm != to => Some(event(
                EventKind::MovePointer,
                json!({ "values": nums, "which": which.as_str(), "frm": frm, "to": to }),
            )),
            _ => None,
        }
    }
}

fn normalize_scenes(scenes: &[Value], nums: Value) -> Vec<CanonicalEvent> {
    let (_, events) = scenes.iter().fold(
        (PointerState::default(), Vec::new()),
        |(mut state, mut events), scene| {
            if let Some(ev) = state.apply(scene, &nums) {
                events.push(ev);
            }
            (state, events)
        },
    );
    events
}

fn event(kind: EventKind, args: Value) -> CanonicalEvent {
    let args = match args {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    CanonicalEvent::new(kind, args)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
