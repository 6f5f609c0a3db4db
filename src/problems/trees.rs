//! Binary-tree traversal problems
//!
//! Trees are supplied in level order with `null` holes, e.g. `[4, 2, 6, 1, 3, null, 7]`.

use crate::generator::{GenerationError, Inputs};
use crate::registry::{Approach, DefaultInput, Difficulty, ProblemEntry, ProblemMeta};
use crate::snapshot::{Action, Snapshot, Trace, TraceBuilder, TraceError, TreeNode, TreeState};
use crate::ui::panes::visual::render_tree;
use std::collections::VecDeque;

const DEFAULT_TREE: &[Option<i64>] = &[Some(4), Some(2), Some(6), Some(1), Some(3), None, Some(7)];

/// Decode a level-order encoding into an arena. Node ids are arena indices.
pub fn build_tree(level_order: &[Option<i64>]) -> TreeState {
    let mut state = TreeState::default();
    let Some(Some(root_value)) = level_order.first() else {
        return state;
    };

    state.nodes.push(TreeNode {
        id: 0,
        value: *root_value,
        left: None,
        right: None,
    });
    state.root = Some(0);

    let mut queue = VecDeque::from([0usize]);
    let mut values = level_order[1..].iter();
    while let Some(parent) = queue.pop_front() {
        for is_left in [true, false] {
            let Some(slot) = values.next() else {
                return state;
            };
            if let Some(value) = slot {
                let id = state.nodes.len();
                state.nodes.push(TreeNode {
                    id,
                    value: *value,
                    left: None,
                    right: None,
                });
                if is_left {
                    state.nodes[parent].left = Some(id);
                } else {
                    state.nodes[parent].right = Some(id);
                }
                queue.push_back(id);
            }
        }
    }
    state
}

pub const INORDER_TRAVERSAL: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "inorder-traversal",
        title: "Binary Tree Inorder Traversal",
        difficulty: Difficulty::Easy,
        description: "Visit the left subtree, then the node, then the right subtree. \
                      On a binary search tree this yields the values in sorted order.",
        constraints: &["0 <= number of nodes <= 100"],
        default_inputs: &[("tree", DefaultInput::Nullable(DEFAULT_TREE))],
        default_code: r#"function inorder(root, out) {
  if (root === null) {
    return out;
  }
  inorder(root.left, out);
  out.push(root.val);
  inorder(root.right, out);
  return out;
}"#,
        entry_point: None,
        approaches: &[
            Approach {
                name: "Recursive",
                time: "O(n)",
                space: "O(h)",
                summary: "The call stack remembers where to resume.",
            },
            Approach {
                name: "Explicit stack",
                time: "O(n)",
                space: "O(h)",
                summary: "Push the left spine, pop and visit, then move right.",
            },
        ],
    },
    generate: inorder_traversal,
    render: render_tree,
};

fn inorder_traversal(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let tree = inputs.nullable_int_array("tree")?;
    generate_inorder_traversal_steps(&tree)
}

fn descend(
    trace: &mut TraceBuilder,
    state: &mut TreeState,
    node: usize,
) -> Result<(), TraceError> {
    let value = state.nodes[node].value;
    state.current = Some(node);
    trace.push(
        Snapshot::tree(format!("Enter node {}: go left first", value), state.clone())
            .with_action(Action::Expand),
    )?;

    if let Some(left) = state.nodes[node].left {
        descend(trace, state, left)?;
    }

    state.current = Some(node);
    state.visited.push(node);
    state.order.push(value);
    trace.push(
        Snapshot::tree(format!("Visit {}: order is now {:?}", value, state.order), state.clone())
            .with_action(Action::Visit),
    )?;

    if let Some(right) = state.nodes[node].right {
        descend(trace, state, right)?;
    }
    Ok(())
}

pub fn generate_inorder_traversal_steps(level_order: &[Option<i64>]) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let mut state = build_tree(level_order);

    let Some(root) = state.root else {
        return Ok(trace.finish(
            Snapshot::tree("The tree is empty: the traversal is []", state).with_action(Action::Done),
        )?);
    };

    trace.push(
        Snapshot::tree("Start inorder traversal at the root", state.clone()).with_action(Action::Init),
    )?;
    descend(&mut trace, &mut state, root)?;

    state.current = None;
    let summary = format!("Inorder traversal: {:?}", state.order);
    Ok(trace.finish(Snapshot::tree(summary, state).with_action(Action::Done))?)
}

pub const LEVEL_ORDER_TRAVERSAL: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "level-order-traversal",
        title: "Binary Tree Level Order Traversal",
        difficulty: Difficulty::Medium,
        description: "Visit nodes level by level from left to right using a queue.",
        constraints: &["0 <= number of nodes <= 2000"],
        default_inputs: &[("tree", DefaultInput::Nullable(DEFAULT_TREE))],
        default_code: r#"function levelOrder(root) {
  const out = [];
  const queue = [root];
  let head = 0;
  while (head < queue.length) {
    const node = queue[head];
    head++;
    if (node !== null) {
      out.push(node.val);
      queue.push(node.left);
      queue.push(node.right);
    }
  }
  return out;
}"#,
        entry_point: None,
        approaches: &[Approach {
            name: "Breadth-first search",
            time: "O(n)",
            space: "O(w)",
            summary: "A FIFO queue holds the frontier; w is the widest level.",
        }],
    },
    generate: level_order_traversal,
    render: render_tree,
};

fn level_order_traversal(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let tree = inputs.nullable_int_array("tree")?;
    generate_level_order_traversal_steps(&tree)
}

pub fn generate_level_order_traversal_steps(level_order: &[Option<i64>]) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let mut state = build_tree(level_order);

    let Some(root) = state.root else {
        return Ok(trace.finish(
            Snapshot::tree("The tree is empty: the traversal is []", state).with_action(Action::Done),
        )?);
    };

    trace.push(
        Snapshot::tree("Queue starts with the root", state.clone()).with_action(Action::Init),
    )?;

    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        let value = state.nodes[node].value;
        state.current = Some(node);
        state.visited.push(node);
        state.order.push(value);
        trace.push(
            Snapshot::tree(format!("Dequeue and visit {}", value), state.clone())
                .with_action(Action::Visit),
        )?;

        let children: Vec<usize> = [state.nodes[node].left, state.nodes[node].right]
            .into_iter()
            .flatten()
            .collect();
        if !children.is_empty() {
            let labels: Vec<i64> = children.iter().map(|&c| state.nodes[c].value).collect();
            queue.extend(children);
            trace.push(
                Snapshot::tree(format!("Enqueue children {:?}", labels), state.clone())
                    .with_action(Action::Expand),
            )?;
        }
    }

    state.current = None;
    let summary = format!("Level order traversal: {:?}", state.order);
    Ok(trace.finish(Snapshot::tree(summary, state).with_action(Action::Done))?)
}
