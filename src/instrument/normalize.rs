//! Checkpoint normalisation
//!
//! A checkpoint hands over whatever variables happen to be in scope. A
//! [`StepNormalizer`] turns that free-form bag into a snapshot of the
//! problem's mode by looking for conventional names: the array under
//! `nums`/`arr`/`array`/`a`, index pointers such as `left`, `mid` or `i`, and
//! for hash-map problems the first `Map` (or `Set`) in scope. Anything else
//! that is a plain scalar goes into the snapshot's data bag.
//!
//! When nothing recognisable is in scope the step is still recorded, as a
//! [`SnapshotState::Blank`] carrying only the message.

use crate::interpreter::{CheckpointHook, RuntimeError};
use crate::memory::stack::StackFrame;
use crate::memory::value::Value;
use crate::parser::ast::SourceLocation;
use crate::snapshot::{ArrayState, HashMapState, MapEntry, Mode, Snapshot, SnapshotState, TraceBuilder};
use std::collections::BTreeMap;

/// Preferred names for the array being visualised, in priority order
const ARRAY_NAMES: &[&str] = &["nums", "arr", "array", "a"];

/// Names drawn as index pointers under the array
const POINTER_NAMES: &[&str] = &[
    "left", "right", "mid", "lo", "hi", "low", "high", "i", "j", "k", "write", "read", "slow", "fast",
    "start", "end",
];

/// Names whose value is the key being looked up in a hash-map step
const ACTIVE_KEY_NAMES: &[&str] = &["complement", "key", "num"];

/// Longest map value or string scalar copied into a snapshot, in bytes
const MAX_CELL_TEXT: usize = 48;

/// Entry points that instrumented execution knows how to visualise
const ENTRY_POINTS: &[(&str, Mode)] = &[
    ("binarySearch", Mode::Array),
    ("moveZeroes", Mode::Array),
    ("bubbleSort", Mode::Array),
    ("twoSum", Mode::HashMap),
];

pub fn supported_entry_points() -> impl Iterator<Item = &'static str> {
    ENTRY_POINTS.iter().map(|(name, _)| *name)
}

/// Maps one checkpoint's variables to a snapshot for a given entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepNormalizer {
    entry_point: &'static str,
    mode: Mode,
}

impl StepNormalizer {
    pub fn for_entry_point(name: &str) -> Option<Self> {
        ENTRY_POINTS
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|&(entry_point, mode)| StepNormalizer { entry_point, mode })
    }

    pub fn entry_point(&self) -> &'static str {
        self.entry_point
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn normalize(&self, location: SourceLocation, vars: &[(&str, &Value)]) -> Snapshot {
        let message = describe(location, vars);
        let state = match self.mode {
            Mode::Array => array_state(vars).map(SnapshotState::Array),
            Mode::HashMap => hash_map_state(vars).map(SnapshotState::HashMap),
            _ => None,
        };
        Snapshot::new(message, state.unwrap_or(SnapshotState::Blank)).at_line(location.line)
    }
}

/// "Line 7: left = 0, right = 9, mid = 4"
fn describe(location: SourceLocation, vars: &[(&str, &Value)]) -> String {
    let scalars: Vec<String> = vars
        .iter()
        .filter(|(_, v)| is_scalar(v))
        .map(|(name, v)| match v {
            Value::Str(s) => format!("{} = \"{}\"", name, clip(s)),
            other => format!("{} = {}", name, other),
        })
        .collect();
    if scalars.is_empty() {
        format!("Line {}", location.line)
    } else {
        format!("Line {}: {}", location.line, scalars.join(", "))
    }
}

/// Cut `text` to at most [`MAX_CELL_TEXT`] bytes on a char boundary
fn clip(text: &str) -> String {
    if text.len() <= MAX_CELL_TEXT {
        return text.to_string();
    }
    let mut end = MAX_CELL_TEXT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

/// A container value's string form, cut short when it is long
fn cell_text(value: &Value) -> String {
    match value {
        Value::Str(s) => clip(s),
        other => other
            .to_string_within(MAX_CELL_TEXT)
            .unwrap_or_else(|| "…".to_string()),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::Str(_) | Value::Null)
}

fn int_array(value: &Value) -> Option<Vec<i64>> {
    match value {
        Value::Array(items) => items.borrow().iter().map(Value::as_int).collect(),
        _ => None,
    }
}

/// The conventionally named integer array, else the first one in scope
fn find_array(vars: &[(&str, &Value)]) -> Option<(&'static str, Vec<i64>)> {
    let named = ARRAY_NAMES.iter().find_map(|wanted| {
        vars.iter()
            .find(|(name, _)| name == wanted)
            .and_then(|(_, v)| int_array(v))
            .map(|array| (*wanted, array))
    });
    named.or_else(|| {
        vars.iter()
            .find_map(|(_, v)| int_array(v))
            .map(|array| ("", array))
    })
}

fn pointers(vars: &[(&str, &Value)]) -> BTreeMap<String, i64> {
    vars.iter()
        .filter(|(name, _)| POINTER_NAMES.contains(name))
        .filter_map(|(name, v)| v.as_int().map(|n| (name.to_string(), n)))
        .collect()
}

fn highlights(pointers: &BTreeMap<String, i64>, len: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = pointers
        .values()
        .filter_map(|&n| usize::try_from(n).ok())
        .filter(|&n| n < len)
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Scalars that are neither pointers nor the array
fn data_bag(vars: &[(&str, &Value)]) -> BTreeMap<String, serde_json::Value> {
    vars.iter()
        .filter(|(name, v)| is_scalar(v) && !POINTER_NAMES.contains(name))
        .map(|(name, v)| match v {
            Value::Str(s) => (name.to_string(), serde_json::Value::String(clip(s))),
            other => (name.to_string(), other.to_json()),
        })
        .collect()
}

fn array_state(vars: &[(&str, &Value)]) -> Option<ArrayState> {
    let (_, array) = find_array(vars)?;
    let pointers = pointers(vars);
    let highlights = highlights(&pointers, array.len());
    Some(ArrayState {
        array,
        highlights,
        pointers,
        data: data_bag(vars),
    })
}

fn hash_map_state(vars: &[(&str, &Value)]) -> Option<HashMapState> {
    let entries: Vec<MapEntry> = vars.iter().find_map(|(_, v)| match v {
        Value::Map(map) => Some(
            map.borrow()
                .iter()
                .map(|(k, v)| MapEntry {
                    key: cell_text(&k.to_value()),
                    value: cell_text(v),
                })
                .collect(),
        ),
        Value::Set(set) => Some(
            set.borrow()
                .iter()
                .map(|k| MapEntry {
                    key: cell_text(&k.to_value()),
                    value: "true".to_string(),
                })
                .collect(),
        ),
        _ => None,
    })?;

    let array = find_array(vars).map(|(_, a)| a).unwrap_or_default();
    let pointers = pointers(vars);
    let highlights = highlights(&pointers, array.len());
    let active_key = ACTIVE_KEY_NAMES.iter().find_map(|wanted| {
        vars.iter()
            .find(|(name, v)| name == wanted && is_scalar(v))
            .map(|(_, v)| cell_text(v))
    });

    Some(HashMapState {
        array,
        highlights,
        pointers,
        entries,
        active_key,
        data: data_bag(vars),
    })
}

/// Checkpoint hook that normalises every step into a growing trace
#[derive(Debug)]
pub struct Recorder {
    normalizer: StepNormalizer,
    builder: TraceBuilder,
    max_steps: usize,
    /// Array elements and map entries copied into snapshots so far
    recorded: usize,
    max_recorded: usize,
}

impl Recorder {
    /// `max_recorded` caps the array elements and map entries copied
    /// across all snapshots
    pub fn new(normalizer: StepNormalizer, max_steps: usize, max_recorded: usize) -> Self {
        Recorder {
            normalizer,
            // One extra slot for the terminal snapshot
            builder: TraceBuilder::new(max_steps.saturating_add(1)),
            max_steps,
            recorded: 0,
            max_recorded,
        }
    }

    pub fn steps(&self) -> usize {
        self.builder.len()
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn into_builder(self) -> TraceBuilder {
        self.builder
    }
}

impl CheckpointHook for Recorder {
    fn on_checkpoint(&mut self, location: SourceLocation, frame: &StackFrame) -> Result<(), RuntimeError> {
        if self.builder.len() >= self.max_steps {
            return Err(RuntimeError::CheckpointLimitExceeded { limit: self.max_steps });
        }
        let vars: Vec<(&str, &Value)> = frame.visible().collect();
        let copied: usize = vars
            .iter()
            .filter(|(_, v)| !matches!(v, Value::Str(_)))
            .map(|(_, v)| v.footprint())
            .sum();
        self.recorded = self.recorded.saturating_add(copied);
        if self.recorded > self.max_recorded {
            return Err(RuntimeError::AllocationLimitExceeded {
                limit: self.max_recorded,
                location,
            });
        }
        let snapshot = self.normalizer.normalize(location, &vars);
        self.builder
            .push(snapshot)
            .map_err(|_| RuntimeError::CheckpointLimitExceeded { limit: self.max_steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize) -> SourceLocation {
        SourceLocation::new(line, 1)
    }

    #[test]
    fn test_array_mode_picks_named_array_and_pointers() {
        let normalizer = StepNormalizer::for_entry_point("binarySearch").unwrap();
        let nums = Value::from_ints(&[1, 3, 5]);
        let scratch = Value::from_ints(&[9]);
        let left = Value::Number(0.0);
        let right = Value::Number(2.0);
        let target = Value::Number(5.0);
        let vars = [
            ("scratch", &scratch),
            ("nums", &nums),
            ("target", &target),
            ("left", &left),
            ("right", &right),
        ];

        let snapshot = normalizer.normalize(loc(4), &vars);
        assert_eq!(snapshot.source_line, Some(4));
        assert_eq!(snapshot.message, "Line 4: target = 5, left = 0, right = 2");
        match snapshot.state {
            SnapshotState::Array(state) => {
                assert_eq!(state.array, vec![1, 3, 5]);
                assert_eq!(state.pointers.get("left"), Some(&0));
                assert_eq!(state.highlights, vec![0, 2]);
                assert_eq!(state.data.get("target"), Some(&serde_json::json!(5)));
                assert!(!state.data.contains_key("left"));
            }
            other => panic!("Expected array state, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_pointer_is_kept_but_not_highlighted() {
        let normalizer = StepNormalizer::for_entry_point("binarySearch").unwrap();
        let nums = Value::from_ints(&[1, 3]);
        let right = Value::Number(-1.0);
        let snapshot = normalizer.normalize(loc(1), &[("nums", &nums), ("right", &right)]);
        match snapshot.state {
            SnapshotState::Array(state) => {
                assert_eq!(state.pointers.get("right"), Some(&-1));
                assert!(state.highlights.is_empty());
            }
            other => panic!("Expected array state, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_map_mode_reads_first_map() {
        let normalizer = StepNormalizer::for_entry_point("twoSum").unwrap();
        let seen = Value::new_map();
        if let Value::Map(map) = &seen {
            let key = crate::memory::value::MapKey::from_value(&Value::Number(2.0)).unwrap();
            map.borrow_mut().insert(key, Value::Number(0.0));
        }
        let nums = Value::from_ints(&[2, 7]);
        let complement = Value::Number(2.0);
        let i = Value::Number(1.0);
        let snapshot = normalizer.normalize(
            loc(5),
            &[("nums", &nums), ("seen", &seen), ("i", &i), ("complement", &complement)],
        );
        match snapshot.state {
            SnapshotState::HashMap(state) => {
                assert_eq!(state.get("2"), Some("0"));
                assert_eq!(state.active_key.as_deref(), Some("2"));
                assert_eq!(state.highlights, vec![1]);
            }
            other => panic!("Expected hash-map state, got {:?}", other),
        }
    }

    #[test]
    fn test_long_text_is_clipped() {
        let normalizer = StepNormalizer::for_entry_point("twoSum").unwrap();
        let long = Value::Str("é".repeat(100));
        let seen = Value::new_map();
        if let Value::Map(map) = &seen {
            let key = crate::memory::value::MapKey::from_value(&Value::Number(1.0)).unwrap();
            map.borrow_mut().insert(key, Value::from_ints(&[7; 100]));
        }
        let snapshot = normalizer.normalize(loc(3), &[("word", &long), ("seen", &seen)]);
        assert!(snapshot.message.len() < 80, "{}", snapshot.message);
        match snapshot.state {
            SnapshotState::HashMap(state) => {
                assert_eq!(state.get("1"), Some("…"));
                let word = state.data["word"].as_str().unwrap();
                assert!(word.ends_with('…') && word.len() <= MAX_CELL_TEXT + '…'.len_utf8());
            }
            other => panic!("Expected hash-map state, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognised_state_is_blank() {
        let normalizer = StepNormalizer::for_entry_point("twoSum").unwrap();
        let x = Value::Number(1.0);
        let snapshot = normalizer.normalize(loc(2), &[("x", &x)]);
        assert_eq!(snapshot.state, SnapshotState::Blank);
        assert_eq!(snapshot.message, "Line 2: x = 1");
    }

    #[test]
    fn test_unknown_entry_point() {
        assert!(StepNormalizer::for_entry_point("eval").is_none());
        assert_eq!(supported_entry_points().count(), 4);
    }
}
