//! Hash-map problems

use crate::generator::{GenerationError, Inputs};
use crate::registry::{Approach, DefaultInput, Difficulty, ProblemEntry, ProblemMeta};
use crate::snapshot::{Action, HashMapState, Snapshot, Trace, TraceBuilder};
use crate::ui::panes::visual::render_hash_map;
use indexmap::IndexMap;

pub const TWO_SUM: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "two-sum",
        title: "Two Sum",
        difficulty: Difficulty::Easy,
        description: "Return the indices of the two numbers that add up to target. \
                      Each input has exactly one solution and an element may not be used twice.",
        constraints: &[
            "2 <= nums.length <= 10^4",
            "-10^9 <= nums[i], target <= 10^9",
        ],
        default_inputs: &[
            ("nums", DefaultInput::Ints(&[2, 7, 11, 15])),
            ("target", DefaultInput::Int(9)),
        ],
        default_code: r#"function twoSum(nums, target) {
  const seen = new Map();
  for (let i = 0; i < nums.length; i++) {
    const complement = target - nums[i];
    if (seen.has(complement)) {
      return [seen.get(complement), i];
    }
    seen.set(nums[i], i);
  }
  return [];
}"#,
        entry_point: Some("twoSum"),
        approaches: &[
            Approach {
                name: "One-pass hash map",
                time: "O(n)",
                space: "O(n)",
                summary: "Before storing nums[i], ask whether its complement has already been seen.",
            },
            Approach {
                name: "Brute force",
                time: "O(n^2)",
                space: "O(1)",
                summary: "Try every pair.",
            },
        ],
    },
    generate: two_sum,
    render: render_hash_map,
};

fn two_sum(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let nums = inputs.int_array("nums")?;
    let target = inputs.int("target")?;
    generate_two_sum_steps(&nums, target)
}

fn map_state(nums: &[i64], seen: &IndexMap<i64, usize>) -> HashMapState {
    let entries: Vec<(i64, usize)> = seen.iter().map(|(k, v)| (*k, *v)).collect();
    HashMapState::new(nums.to_vec()).entries(&entries)
}

pub fn generate_two_sum_steps(nums: &[i64], target: i64) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let mut seen: IndexMap<i64, usize> = IndexMap::new();

    if nums.len() < 2 {
        return Ok(trace.finish(
            Snapshot::hash_map(
                format!("Need at least two numbers, got {}: no pair exists", nums.len()),
                map_state(nums, &seen).data("target", target),
            )
            .with_action(Action::NotFound),
        )?);
    }

    trace.push(
        Snapshot::hash_map(
            format!("Look for two numbers that sum to {}; the map starts empty", target),
            map_state(nums, &seen).data("target", target),
        )
        .with_action(Action::Init),
    )?;

    for (i, &num) in nums.iter().enumerate() {
        let complement = target
            .checked_sub(num)
            .ok_or_else(|| GenerationError::too_large("target"))?;
        let state = map_state(nums, &seen)
            .pointer("i", i as i64)
            .highlight(&[i])
            .active(complement)
            .data("target", target)
            .data("complement", complement);

        trace.push(
            Snapshot::hash_map(
                format!(
                    "nums[{}] = {} needs complement {} - {} = {}: is it in the map?",
                    i, num, target, num, complement
                ),
                state.clone(),
            )
            .with_action(Action::Lookup),
        )?;

        if let Some(&j) = seen.get(&complement) {
            return Ok(trace.finish(
                Snapshot::hash_map(
                    format!(
                        "{} was seen at index {}: {} + {} = {}, answer [{}, {}]",
                        complement, j, complement, num, target, j, i
                    ),
                    state.highlight(&[j]).data("result", vec![j, i]),
                )
                .with_action(Action::Found),
            )?);
        }

        seen.insert(num, i);
        trace.push(
            Snapshot::hash_map(
                format!("{} not seen yet: store {} -> {}", complement, num, i),
                map_state(nums, &seen)
                    .pointer("i", i as i64)
                    .highlight(&[i])
                    .active(num)
                    .data("target", target),
            )
            .with_action(Action::Insert),
        )?;
    }

    Ok(trace.finish(
        Snapshot::hash_map(
            format!("Scanned every number: no pair sums to {}", target),
            map_state(nums, &seen)
                .data("target", target)
                .data("result", Vec::<usize>::new()),
        )
        .with_action(Action::NotFound),
    )?)
}

pub const CONTAINS_DUPLICATE: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "contains-duplicate",
        title: "Contains Duplicate",
        difficulty: Difficulty::Easy,
        description: "Return true if any value appears at least twice in the array.",
        constraints: &["1 <= nums.length <= 10^5"],
        default_inputs: &[("nums", DefaultInput::Ints(&[1, 2, 3, 1]))],
        default_code: r#"function containsDuplicate(nums) {
  const seen = new Set();
  for (const num of nums) {
    if (seen.has(num)) {
      return true;
    }
    seen.add(num);
  }
  return false;
}"#,
        entry_point: None,
        approaches: &[
            Approach {
                name: "Hash set",
                time: "O(n)",
                space: "O(n)",
                summary: "Remember every value; the first repeat answers the question.",
            },
            Approach {
                name: "Sort then scan",
                time: "O(n log n)",
                space: "O(1)",
                summary: "Duplicates become neighbours after sorting.",
            },
        ],
    },
    generate: contains_duplicate,
    render: render_hash_map,
};

fn contains_duplicate(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let nums = inputs.int_array("nums")?;
    generate_contains_duplicate_steps(&nums)
}

pub fn generate_contains_duplicate_steps(nums: &[i64]) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let mut seen: IndexMap<i64, usize> = IndexMap::new();

    if nums.is_empty() {
        return Ok(trace.finish(
            Snapshot::hash_map(
                "The array is empty: no duplicates",
                map_state(nums, &seen).data("result", false),
            )
            .with_action(Action::NotFound),
        )?);
    }

    trace.push(
        Snapshot::hash_map("Remember each value with the index it was first seen at", map_state(nums, &seen))
            .with_action(Action::Init),
    )?;

    for (i, &num) in nums.iter().enumerate() {
        let state = map_state(nums, &seen)
            .pointer("i", i as i64)
            .highlight(&[i])
            .active(num);
        trace.push(
            Snapshot::hash_map(format!("Has {} been seen before?", num), state.clone())
                .with_action(Action::Lookup),
        )?;

        if let Some(&first) = seen.get(&num) {
            return Ok(trace.finish(
                Snapshot::hash_map(
                    format!("{} appears at index {} and index {}: duplicate found", num, first, i),
                    state.highlight(&[first]).data("result", true),
                )
                .with_action(Action::Found),
            )?);
        }

        seen.insert(num, i);
        trace.push(
            Snapshot::hash_map(
                format!("First time seeing {}: record it", num),
                map_state(nums, &seen).pointer("i", i as i64).active(num),
            )
            .with_action(Action::Insert),
        )?;
    }

    Ok(trace.finish(
        Snapshot::hash_map(
            "Every value is distinct",
            map_state(nums, &seen).data("result", false),
        )
        .with_action(Action::NotFound),
    )?)
}
