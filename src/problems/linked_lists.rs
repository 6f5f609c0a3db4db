//! Linked-list problems

use crate::generator::{GenerationError, Inputs};
use crate::registry::{Approach, DefaultInput, Difficulty, ProblemEntry, ProblemMeta};
use crate::snapshot::{Action, LinkedListState, ListNode, Snapshot, Trace, TraceBuilder};
use crate::ui::panes::visual::render_linked_list;
use std::collections::BTreeMap;

pub const REVERSE_LINKED_LIST: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "reverse-linked-list",
        title: "Reverse Linked List",
        difficulty: Difficulty::Easy,
        description: "Reverse a singly linked list in place and return the new head.",
        constraints: &["0 <= number of nodes <= 5000"],
        default_inputs: &[("values", DefaultInput::Ints(&[1, 2, 3, 4, 5]))],
        default_code: r#"function reverseList(head) {
  let prev = null;
  let current = head;
  while (current !== null) {
    const next = current.next;
    current.next = prev;
    prev = current;
    current = next;
  }
  return prev;
}"#,
        entry_point: None,
        approaches: &[
            Approach {
                name: "Iterative three pointers",
                time: "O(n)",
                space: "O(1)",
                summary: "Save next, point current back at prev, then advance both.",
            },
            Approach {
                name: "Recursive",
                time: "O(n)",
                space: "O(n)",
                summary: "Reverse the tail first, then hook the head onto its end.",
            },
        ],
    },
    generate: reverse_linked_list,
    render: render_linked_list,
};

fn reverse_linked_list(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let values = inputs.int_array("values")?;
    generate_reverse_linked_list_steps(&values)
}

fn build_list(values: &[i64]) -> Vec<ListNode> {
    values
        .iter()
        .enumerate()
        .map(|(id, &value)| ListNode {
            id,
            value,
            next: if id + 1 < values.len() { Some(id + 1) } else { None },
        })
        .collect()
}

fn list_state(
    nodes: &[ListNode],
    head: Option<usize>,
    prev: Option<usize>,
    current: Option<usize>,
    next: Option<usize>,
) -> LinkedListState {
    let mut pointers = BTreeMap::new();
    pointers.insert("prev".to_string(), prev);
    pointers.insert("current".to_string(), current);
    pointers.insert("next".to_string(), next);
    LinkedListState {
        nodes: nodes.to_vec(),
        head,
        pointers,
    }
}

fn label(nodes: &[ListNode], id: Option<usize>) -> String {
    match id.and_then(|i| nodes.get(i)) {
        Some(node) => node.value.to_string(),
        None => "null".to_string(),
    }
}

pub fn generate_reverse_linked_list_steps(values: &[i64]) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let mut nodes = build_list(values);

    if nodes.is_empty() {
        return Ok(trace.finish(
            Snapshot::linked_list(
                "The list is empty: the reversed list is also empty",
                list_state(&nodes, None, None, None, None),
            )
            .with_action(Action::Done),
        )?);
    }

    let head = Some(0);
    let mut prev: Option<usize> = None;
    let mut current: Option<usize> = Some(0);

    trace.push(
        Snapshot::linked_list(
            "prev = null, current = head",
            list_state(&nodes, head, prev, current, None),
        )
        .with_action(Action::Init),
    )?;

    while let Some(cur) = current {
        let next = nodes[cur].next;
        trace.push(
            Snapshot::linked_list(
                format!("Save next = {}", label(&nodes, next)),
                list_state(&nodes, head, prev, current, next),
            )
            .with_action(Action::Move),
        )?;

        nodes[cur].next = prev;
        trace.push(
            Snapshot::linked_list(
                format!(
                    "Point {}.next back at {}",
                    nodes[cur].value,
                    label(&nodes, prev)
                ),
                list_state(&nodes, head, prev, current, next),
            )
            .with_action(Action::Relink),
        )?;

        prev = current;
        current = next;
        trace.push(
            Snapshot::linked_list(
                format!(
                    "Advance: prev = {}, current = {}",
                    label(&nodes, prev),
                    label(&nodes, current)
                ),
                list_state(&nodes, head, prev, current, next),
            )
            .with_action(Action::Move),
        )?;
    }

    let state = list_state(&nodes, prev, prev, None, None);
    let summary = format!("current is null: new head is {}, list {:?}", label(&nodes, prev), state.values_from_head());
    Ok(trace.finish(Snapshot::linked_list(summary, state).with_action(Action::Done))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotState;

    #[test]
    fn test_reverse_list() {
        let trace = generate_reverse_linked_list_steps(&[1, 2, 3]).unwrap();
        match &trace.last().state {
            SnapshotState::LinkedList(s) => assert_eq!(s.values_from_head(), vec![3, 2, 1]),
            other => panic!("unexpected state {:?}", other),
        }
        // init + 3 steps per node + terminal
        assert_eq!(trace.len(), 1 + 3 * 3 + 1);
    }

    #[test]
    fn test_reverse_empty_list() {
        let trace = generate_reverse_linked_list_steps(&[]).unwrap();
        assert_eq!(trace.len(), 1);
        assert!(trace.last().is_complete);
    }
}
