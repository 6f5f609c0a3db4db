//! Snapshot model shared by every trace
//!
//! A [`Snapshot`] is one immutable point-in-time record of an algorithm's
//! execution. Its visual payload is a [`SnapshotState`] with one variant per
//! algorithm shape, so renderers match on the variant instead of probing
//! optional fields:
//!
//! - [`ArrayState`]: working array, highlighted indices, named pointers
//! - [`HashMapState`]: working array plus the observed key/value entries
//! - [`TextState`]: text and pattern with scan cursors and match positions
//! - [`LinkedListState`]: node arena with nullable named pointers
//! - [`TreeState`]: node arena with visited ids, the active node and the
//!   accumulated traversal order
//!
//! A [`Trace`] is the ordered, non-empty sequence of snapshots produced by one
//! generator call. See [`builder`] for how traces are assembled.

pub mod builder;

pub use builder::{Trace, TraceBuilder, TraceError, DEFAULT_STEP_LIMIT};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Open-ended bag of problem-specific extras (comparison results, running totals...)
pub type DataBag = BTreeMap<String, serde_json::Value>;

/// Semantic operation that produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Init,
    Compare,
    Swap,
    Move,
    Found,
    NotFound,
    Insert,
    Lookup,
    Expand,
    Shrink,
    Visit,
    Match,
    Mismatch,
    Relink,
    Done,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Init => "init",
            Action::Compare => "compare",
            Action::Swap => "swap",
            Action::Move => "move",
            Action::Found => "found",
            Action::NotFound => "not-found",
            Action::Insert => "insert",
            Action::Lookup => "lookup",
            Action::Expand => "expand",
            Action::Shrink => "shrink",
            Action::Visit => "visit",
            Action::Match => "match",
            Action::Mismatch => "mismatch",
            Action::Relink => "relink",
            Action::Done => "done",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which algorithm shape a snapshot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Array,
    HashMap,
    Text,
    LinkedList,
    Tree,
    Blank,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Array => "array",
            Mode::HashMap => "hash-map",
            Mode::Text => "text",
            Mode::LinkedList => "linked-list",
            Mode::Tree => "tree",
            Mode::Blank => "blank",
        }
    }

    /// `Blank` carries no visual state and can appear in a trace of any mode.
    pub fn is_compatible_with(self, other: Mode) -> bool {
        self == other || self == Mode::Blank || other == Mode::Blank
    }
}

/// Array/pointer algorithms (binary search, two pointers, sliding window, sorting)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayState {
    pub array: Vec<i64>,
    pub highlights: Vec<usize>,
    pub pointers: BTreeMap<String, i64>,
    pub data: DataBag,
}

impl ArrayState {
    pub fn new(array: Vec<i64>) -> Self {
        ArrayState {
            array,
            ..Default::default()
        }
    }

    pub fn pointer(mut self, name: &str, index: i64) -> Self {
        self.pointers.insert(name.to_string(), index);
        self
    }

    pub fn highlight(mut self, indices: &[usize]) -> Self {
        self.highlights.extend_from_slice(indices);
        self
    }

    pub fn data(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

/// One observed key/value pair, in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: String,
    pub value: String,
}

/// Hash-map algorithms (two-sum, duplicates, frequency counting)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HashMapState {
    pub array: Vec<i64>,
    pub highlights: Vec<usize>,
    pub pointers: BTreeMap<String, i64>,
    pub entries: Vec<MapEntry>,
    pub active_key: Option<String>,
    pub data: DataBag,
}

impl HashMapState {
    pub fn new(array: Vec<i64>) -> Self {
        HashMapState {
            array,
            ..Default::default()
        }
    }

    pub fn entries<K: ToString, V: ToString>(mut self, entries: &[(K, V)]) -> Self {
        self.entries = entries
            .iter()
            .map(|(k, v)| MapEntry {
                key: k.to_string(),
                value: v.to_string(),
            })
            .collect();
        self
    }

    pub fn pointer(mut self, name: &str, index: i64) -> Self {
        self.pointers.insert(name.to_string(), index);
        self
    }

    pub fn highlight(mut self, indices: &[usize]) -> Self {
        self.highlights.extend_from_slice(indices);
        self
    }

    pub fn active(mut self, key: impl ToString) -> Self {
        self.active_key = Some(key.to_string());
        self
    }

    pub fn data(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }
}

/// String/pattern algorithms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextState {
    pub text: String,
    pub pattern: String,
    pub text_index: Option<usize>,
    pub pattern_index: Option<usize>,
    /// Extra text positions to emphasise (e.g. both ends of a palindrome check)
    pub highlights: Vec<usize>,
    pub matches: Vec<usize>,
    pub data: DataBag,
}

impl TextState {
    pub fn new(text: &str, pattern: &str) -> Self {
        TextState {
            text: text.to_string(),
            pattern: pattern.to_string(),
            ..Default::default()
        }
    }

    pub fn at(mut self, text_index: Option<usize>, pattern_index: Option<usize>) -> Self {
        self.text_index = text_index;
        self.pattern_index = pattern_index;
        self
    }

    pub fn matches(mut self, matches: &[usize]) -> Self {
        self.matches = matches.to_vec();
        self
    }

    pub fn highlight(mut self, indices: &[usize]) -> Self {
        self.highlights.extend_from_slice(indices);
        self
    }

    pub fn data(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

/// A node in a linked-list arena. `next` indexes into the same arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNode {
    pub id: usize,
    pub value: i64,
    pub next: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedListState {
    pub nodes: Vec<ListNode>,
    pub head: Option<usize>,
    /// Named pointers (prev/current/next); `None` is a null pointer
    pub pointers: BTreeMap<String, Option<usize>>,
}

impl LinkedListState {
    /// Walk from `head` following `next`, stopping on cycles.
    pub fn values_from_head(&self) -> Vec<i64> {
        let mut out = Vec::new();
        let mut cursor = self.head;
        while let Some(id) = cursor {
            if out.len() > self.nodes.len() {
                break;
            }
            match self.nodes.get(id) {
                Some(node) => {
                    out.push(node.value);
                    cursor = node.next;
                }
                None => break,
            }
        }
        out
    }
}

/// A node in a binary-tree arena. Children index into the same arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: usize,
    pub value: i64,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeState {
    pub nodes: Vec<TreeNode>,
    pub root: Option<usize>,
    pub visited: Vec<usize>,
    pub current: Option<usize>,
    pub order: Vec<i64>,
}

/// Mode-specific visual payload of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum SnapshotState {
    Array(ArrayState),
    HashMap(HashMapState),
    Text(TextState),
    LinkedList(LinkedListState),
    Tree(TreeState),
    Blank,
}

impl SnapshotState {
    pub fn mode(&self) -> Mode {
        match self {
            SnapshotState::Array(_) => Mode::Array,
            SnapshotState::HashMap(_) => Mode::HashMap,
            SnapshotState::Text(_) => Mode::Text,
            SnapshotState::LinkedList(_) => Mode::LinkedList,
            SnapshotState::Tree(_) => Mode::Tree,
            SnapshotState::Blank => Mode::Blank,
        }
    }

    /// Working array for the modes that have one
    pub fn array(&self) -> Option<&[i64]> {
        match self {
            SnapshotState::Array(s) => Some(&s.array),
            SnapshotState::HashMap(s) => Some(&s.array),
            _ => None,
        }
    }
}

/// One immutable point-in-time record of algorithm state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub message: String,
    pub action: Option<Action>,
    pub is_complete: bool,
    /// Script line that produced this snapshot (instrumented runs only)
    pub source_line: Option<usize>,
    pub state: SnapshotState,
}

impl Snapshot {
    pub fn new(message: impl Into<String>, state: SnapshotState) -> Self {
        Snapshot {
            message: message.into(),
            action: None,
            is_complete: false,
            source_line: None,
            state,
        }
    }

    /// Message-only snapshot
    pub fn blank(message: impl Into<String>) -> Self {
        Self::new(message, SnapshotState::Blank)
    }

    pub fn array(message: impl Into<String>, state: ArrayState) -> Self {
        Self::new(message, SnapshotState::Array(state))
    }

    pub fn hash_map(message: impl Into<String>, state: HashMapState) -> Self {
        Self::new(message, SnapshotState::HashMap(state))
    }

    pub fn text(message: impl Into<String>, state: TextState) -> Self {
        Self::new(message, SnapshotState::Text(state))
    }

    pub fn linked_list(message: impl Into<String>, state: LinkedListState) -> Self {
        Self::new(message, SnapshotState::LinkedList(state))
    }

    pub fn tree(message: impl Into<String>, state: TreeState) -> Self {
        Self::new(message, SnapshotState::Tree(state))
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }

    pub fn complete(mut self) -> Self {
        self.is_complete = true;
        self
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_compatible_with_every_mode() {
        for mode in [Mode::Array, Mode::HashMap, Mode::Text, Mode::LinkedList, Mode::Tree] {
            assert!(Mode::Blank.is_compatible_with(mode));
            assert!(mode.is_compatible_with(Mode::Blank));
        }
        assert!(!Mode::Array.is_compatible_with(Mode::Tree));
    }

    #[test]
    fn test_linked_list_walk_stops_on_cycle() {
        let state = LinkedListState {
            nodes: vec![
                ListNode { id: 0, value: 1, next: Some(1) },
                ListNode { id: 1, value: 2, next: Some(0) },
            ],
            head: Some(0),
            pointers: BTreeMap::new(),
        };
        let values = state.values_from_head();
        assert!(values.len() <= 3);
        assert_eq!(&values[..2], &[1, 2]);
    }

    #[test]
    fn test_snapshot_serializes_with_mode_tag() {
        let snap = Snapshot::array("start", ArrayState::new(vec![1, 2]).pointer("left", 0))
            .with_action(Action::Init);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["state"]["mode"], "array");
        assert_eq!(json["action"], "init");
        assert_eq!(json["state"]["pointers"]["left"], 0);
    }
}
