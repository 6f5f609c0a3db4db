//! Array and pointer problems: binary search, two pointers, sliding window, sorting

use crate::generator::{GenerationError, Inputs};
use crate::registry::{Approach, DefaultInput, Difficulty, ProblemEntry, ProblemMeta};
use crate::snapshot::{Action, ArrayState, Snapshot, Trace, TraceBuilder};
use crate::ui::panes::visual::render_array;

// ===== Binary search =====

pub const BINARY_SEARCH: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "binary-search-visualizer",
        title: "Binary Search",
        difficulty: Difficulty::Easy,
        description: "Given a sorted array of integers and a target, return the index of \
                      the target or -1 if it is absent. Each step halves the search window.",
        constraints: &[
            "1 <= nums.length <= 10^4",
            "nums is sorted in ascending order",
            "All values in nums are unique",
        ],
        default_inputs: &[
            ("nums", DefaultInput::Ints(&[2, 5, 8, 12, 16, 23, 38, 56, 72, 91])),
            ("target", DefaultInput::Int(23)),
        ],
        default_code: r#"function binarySearch(nums, target) {
  let left = 0;
  let right = nums.length - 1;
  while (left <= right) {
    const mid = Math.floor((left + right) / 2);
    if (nums[mid] === target) {
      return mid;
    } else if (nums[mid] < target) {
      left = mid + 1;
    } else {
      right = mid - 1;
    }
  }
  return -1;
}"#,
        entry_point: Some("binarySearch"),
        approaches: &[
            Approach {
                name: "Iterative halving",
                time: "O(log n)",
                space: "O(1)",
                summary: "Keep [left, right] as the live window and discard the half that cannot hold the target.",
            },
            Approach {
                name: "Linear scan",
                time: "O(n)",
                space: "O(1)",
                summary: "Check every element; ignores the sorted order.",
            },
        ],
    },
    generate: binary_search,
    render: render_array,
};

fn binary_search(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let nums = inputs.int_array("nums")?;
    let target = inputs.int("target")?;
    generate_binary_search_steps(&nums, target)
}

pub fn generate_binary_search_steps(nums: &[i64], target: i64) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();

    if nums.is_empty() {
        let state = ArrayState::new(Vec::new()).data("result", -1);
        return Ok(trace.finish(
            Snapshot::array(
                format!("The array is empty, so {} cannot be found", target),
                state,
            )
            .with_action(Action::NotFound),
        )?);
    }

    let base = ArrayState::new(nums.to_vec()).data("target", target);
    let mut left: i64 = 0;
    let mut right: i64 = nums.len() as i64 - 1;

    trace.push(
        Snapshot::array(
            format!(
                "Search for {} in {} sorted elements: left = {}, right = {}",
                target,
                nums.len(),
                left,
                right
            ),
            base.clone().pointer("left", left).pointer("right", right),
        )
        .with_action(Action::Init),
    )?;

    while left <= right {
        let mid = left + (right - left) / 2;
        let value = nums[mid as usize];
        let window = base
            .clone()
            .pointer("left", left)
            .pointer("right", right)
            .pointer("mid", mid)
            .highlight(&[mid as usize]);

        if value == target {
            return Ok(trace.finish(
                Snapshot::array(
                    format!("nums[{}] = {} equals the target: found {} at index {}", mid, value, target, mid),
                    window.data("result", mid),
                )
                .with_action(Action::Found),
            )?);
        }

        let cmp = if value < target { "<" } else { ">" };
        trace.push(
            Snapshot::array(
                format!("Compare nums[{}] = {} {} {}", mid, value, cmp, target),
                window.data("comparison", cmp),
            )
            .with_action(Action::Compare),
        )?;

        let message = if value < target {
            left = mid + 1;
            format!("{} is too small: move left to {}", value, left)
        } else {
            right = mid - 1;
            format!("{} is too large: move right to {}", value, right)
        };
        trace.push(
            Snapshot::array(
                message,
                base.clone().pointer("left", left).pointer("right", right),
            )
            .with_action(Action::Move),
        )?;
    }

    Ok(trace.finish(
        Snapshot::array(
            format!("Window is empty (left = {} > right = {}): {} not found", left, right, target),
            base.pointer("left", left)
                .pointer("right", right)
                .data("result", -1),
        )
        .with_action(Action::NotFound),
    )?)
}

// ===== Move zeros =====

pub const MOVE_ZEROS: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "move-zeros",
        title: "Move Zeroes",
        difficulty: Difficulty::Easy,
        description: "Move every 0 to the end of the array in place while keeping the \
                      relative order of the non-zero elements.",
        constraints: &["1 <= nums.length <= 10^4", "Must be done in place"],
        default_inputs: &[("nums", DefaultInput::Ints(&[0, 1, 0, 3, 12]))],
        default_code: r#"function moveZeroes(nums) {
  let write = 0;
  for (let i = 0; i < nums.length; i++) {
    if (nums[i] !== 0) {
      [nums[write], nums[i]] = [nums[i], nums[write]];
      write++;
    }
  }
  return nums;
}"#,
        entry_point: Some("moveZeroes"),
        approaches: &[Approach {
            name: "Read/write pointers",
            time: "O(n)",
            space: "O(1)",
            summary: "A write pointer marks where the next non-zero belongs; swapping pushes zeros right.",
        }],
    },
    generate: move_zeros,
    render: render_array,
};

fn move_zeros(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let nums = inputs.int_array("nums")?;
    generate_move_zeros_steps(&nums)
}

pub fn generate_move_zeros_steps(nums: &[i64]) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let mut arr = nums.to_vec();

    if arr.is_empty() {
        return Ok(trace.finish(
            Snapshot::array("The array is empty: nothing to move", ArrayState::new(arr))
                .with_action(Action::Done),
        )?);
    }

    let mut write = 0usize;
    trace.push(
        Snapshot::array(
            "Write pointer starts at 0; scan with i",
            ArrayState::new(arr.clone())
                .pointer("write", 0)
                .pointer("i", 0),
        )
        .with_action(Action::Init),
    )?;

    for i in 0..arr.len() {
        let state = ArrayState::new(arr.clone())
            .pointer("write", write as i64)
            .pointer("i", i as i64)
            .highlight(&[i]);
        if arr[i] == 0 {
            trace.push(
                Snapshot::array(format!("nums[{}] is 0: skip it", i), state)
                    .with_action(Action::Compare),
            )?;
            continue;
        }

        trace.push(
            Snapshot::array(format!("nums[{}] = {} is non-zero", i, arr[i]), state)
                .with_action(Action::Compare),
        )?;

        let advance = if i != write {
            arr.swap(i, write);
            trace.push(
                Snapshot::array(
                    format!("Swap nums[{}] and nums[{}]", write, i),
                    ArrayState::new(arr.clone())
                        .pointer("write", write as i64)
                        .pointer("i", i as i64)
                        .highlight(&[write, i]),
                )
                .with_action(Action::Swap),
            )?;
            format!("Advance write to {}", write + 1)
        } else {
            format!("Already in place: advance write to {}", write + 1)
        };
        write += 1;
        trace.push(
            Snapshot::array(
                advance,
                ArrayState::new(arr.clone())
                    .pointer("write", write as i64)
                    .pointer("i", i as i64),
            )
            .with_action(Action::Move),
        )?;
    }

    let summary = format!("All zeros moved to the end: {:?}", arr);
    Ok(trace.finish(
        Snapshot::array(summary, ArrayState::new(arr).pointer("write", write as i64))
            .with_action(Action::Done),
    )?)
}

// ===== Reverse array =====

pub const REVERSE_ARRAY: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "reverse-array",
        title: "Reverse Array In Place",
        difficulty: Difficulty::Easy,
        description: "Reverse an array in place by swapping elements from both ends.",
        constraints: &["0 <= nums.length <= 10^5"],
        default_inputs: &[("nums", DefaultInput::Ints(&[1, 2, 3, 4, 5, 6]))],
        default_code: r#"function reverse(nums) {
  let left = 0;
  let right = nums.length - 1;
  while (left < right) {
    [nums[left], nums[right]] = [nums[right], nums[left]];
    left++;
    right--;
  }
  return nums;
}"#,
        entry_point: None,
        approaches: &[Approach {
            name: "Converging pointers",
            time: "O(n)",
            space: "O(1)",
            summary: "Swap the outermost pair and step both pointers inward.",
        }],
    },
    generate: reverse_array,
    render: render_array,
};

fn reverse_array(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let nums = inputs.int_array("nums")?;
    generate_reverse_array_steps(&nums)
}

pub fn generate_reverse_array_steps(nums: &[i64]) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let mut arr = nums.to_vec();

    if arr.len() < 2 {
        return Ok(trace.finish(
            Snapshot::array(
                format!("An array of length {} is its own reverse", arr.len()),
                ArrayState::new(arr),
            )
            .with_action(Action::Done),
        )?);
    }

    let mut left = 0usize;
    let mut right = arr.len() - 1;
    trace.push(
        Snapshot::array(
            format!("Pointers at both ends: left = 0, right = {}", right),
            ArrayState::new(arr.clone())
                .pointer("left", 0)
                .pointer("right", right as i64),
        )
        .with_action(Action::Init),
    )?;

    while left < right {
        arr.swap(left, right);
        trace.push(
            Snapshot::array(
                format!("Swap nums[{}] and nums[{}]", left, right),
                ArrayState::new(arr.clone())
                    .pointer("left", left as i64)
                    .pointer("right", right as i64)
                    .highlight(&[left, right]),
            )
            .with_action(Action::Swap),
        )?;
        left += 1;
        right -= 1;
        trace.push(
            Snapshot::array(
                format!("Step inward: left = {}, right = {}", left, right),
                ArrayState::new(arr.clone())
                    .pointer("left", left as i64)
                    .pointer("right", right as i64),
            )
            .with_action(Action::Move),
        )?;
    }

    let summary = format!("Pointers met: reversed array is {:?}", arr);
    Ok(trace.finish(Snapshot::array(summary, ArrayState::new(arr)).with_action(Action::Done))?)
}

// ===== Maximum sum subarray of size k =====

pub const MAX_SUM_SUBARRAY: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "max-sum-subarray",
        title: "Maximum Sum Subarray of Size K",
        difficulty: Difficulty::Easy,
        description: "Find the largest sum of any contiguous subarray of exactly k elements.",
        constraints: &["1 <= k <= nums.length <= 10^5"],
        default_inputs: &[
            ("nums", DefaultInput::Ints(&[2, 1, 5, 1, 3, 2])),
            ("k", DefaultInput::Int(3)),
        ],
        default_code: r#"function maxSumSubarray(nums, k) {
  let sum = 0;
  for (let i = 0; i < k; i++) {
    sum += nums[i];
  }
  let best = sum;
  for (let right = k; right < nums.length; right++) {
    sum += nums[right] - nums[right - k];
    best = Math.max(best, sum);
  }
  return best;
}"#,
        entry_point: None,
        approaches: &[
            Approach {
                name: "Sliding window",
                time: "O(n)",
                space: "O(1)",
                summary: "Add the element entering the window and subtract the one leaving it.",
            },
            Approach {
                name: "Brute force",
                time: "O(n*k)",
                space: "O(1)",
                summary: "Recompute every window sum from scratch.",
            },
        ],
    },
    generate: max_sum_subarray,
    render: render_array,
};

fn max_sum_subarray(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let nums = inputs.int_array("nums")?;
    let k = inputs.int("k")?;
    generate_max_sum_subarray_steps(&nums, k)
}

pub fn generate_max_sum_subarray_steps(nums: &[i64], k: i64) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();

    if k <= 0 || k as usize > nums.len() {
        return Ok(trace.finish(
            Snapshot::array(
                format!("No window of size {} fits in an array of length {}", k, nums.len()),
                ArrayState::new(nums.to_vec()).data("k", k),
            )
            .with_action(Action::Done),
        )?);
    }

    let k = k as usize;
    let window = |left: usize, right: usize, sum: i64, best: i64| {
        ArrayState::new(nums.to_vec())
            .pointer("left", left as i64)
            .pointer("right", right as i64)
            .highlight(&(left..=right).collect::<Vec<_>>())
            .data("window_sum", sum)
            .data("best", best)
    };

    trace.push(
        Snapshot::array(
            format!("Find the best sum over {} consecutive elements", k),
            ArrayState::new(nums.to_vec()).data("k", k as i64),
        )
        .with_action(Action::Init),
    )?;

    let mut sum: i64 = 0;
    for i in 0..k {
        sum = sum
            .checked_add(nums[i])
            .ok_or_else(|| GenerationError::too_large("nums"))?;
        trace.push(
            Snapshot::array(
                format!("Grow the first window: add nums[{}] = {}, sum = {}", i, nums[i], sum),
                window(0, i, sum, sum),
            )
            .with_action(Action::Expand),
        )?;
    }

    let mut best = sum;
    let mut best_start = 0usize;
    for right in k..nums.len() {
        let left = right + 1 - k;
        sum = i64::try_from(i128::from(sum) + i128::from(nums[right]) - i128::from(nums[left - 1]))
            .map_err(|_| GenerationError::too_large("nums"))?;
        trace.push(
            Snapshot::array(
                format!(
                    "Slide: drop nums[{}] = {}, add nums[{}] = {}, sum = {}",
                    left - 1,
                    nums[left - 1],
                    right,
                    nums[right],
                    sum
                ),
                window(left, right, sum, best),
            )
            .with_action(Action::Move),
        )?;
        if sum > best {
            best = sum;
            best_start = left;
            trace.push(
                Snapshot::array(
                    format!("{} beats the previous best: best = {}", sum, best),
                    window(left, right, sum, best),
                )
                .with_action(Action::Compare),
            )?;
        }
    }

    Ok(trace.finish(
        Snapshot::array(
            format!(
                "Maximum sum of {} consecutive elements is {} (starting at index {})",
                k, best, best_start
            ),
            window(best_start, best_start + k - 1, best, best).data("result", best),
        )
        .with_action(Action::Found),
    )?)
}

// ===== Bubble sort =====

pub const BUBBLE_SORT: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "bubble-sort",
        title: "Bubble Sort",
        difficulty: Difficulty::Easy,
        description: "Sort an array by repeatedly swapping adjacent out-of-order pairs; \
                      after pass p the largest p elements are final.",
        constraints: &["0 <= nums.length <= 10^3"],
        default_inputs: &[("nums", DefaultInput::Ints(&[5, 1, 4, 2, 8]))],
        default_code: r#"function bubbleSort(nums) {
  for (let i = 0; i < nums.length; i++) {
    let swapped = false;
    for (let j = 0; j < nums.length - i - 1; j++) {
      if (nums[j] > nums[j + 1]) {
        const tmp = nums[j];
        nums[j] = nums[j + 1];
        nums[j + 1] = tmp;
        swapped = true;
      }
    }
    if (!swapped) {
      break;
    }
  }
  return nums;
}"#,
        entry_point: Some("bubbleSort"),
        approaches: &[Approach {
            name: "Bubble sort with early exit",
            time: "O(n^2)",
            space: "O(1)",
            summary: "Stop as soon as a full pass makes no swaps.",
        }],
    },
    generate: bubble_sort,
    render: render_array,
};

fn bubble_sort(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let nums = inputs.int_array("nums")?;
    generate_bubble_sort_steps(&nums)
}

pub fn generate_bubble_sort_steps(nums: &[i64]) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let mut arr = nums.to_vec();
    let n = arr.len();

    if n < 2 {
        return Ok(trace.finish(
            Snapshot::array(
                format!("An array of length {} is already sorted", n),
                ArrayState::new(arr),
            )
            .with_action(Action::Done),
        )?);
    }

    trace.push(
        Snapshot::array(
            format!("Start bubble sort on {} elements", n),
            ArrayState::new(arr.clone()).data("sorted_from", n as i64),
        )
        .with_action(Action::Init),
    )?;

    for pass in 0..n - 1 {
        let mut swapped = false;
        let sorted_from = (n - pass) as i64;
        for j in 0..n - pass - 1 {
            let state = |arr: &[i64]| {
                ArrayState::new(arr.to_vec())
                    .pointer("i", pass as i64)
                    .pointer("j", j as i64)
                    .highlight(&[j, j + 1])
                    .data("sorted_from", sorted_from)
            };
            let out_of_order = arr[j] > arr[j + 1];
            trace.push(
                Snapshot::array(
                    format!(
                        "Compare nums[{}] = {} and nums[{}] = {}",
                        j,
                        arr[j],
                        j + 1,
                        arr[j + 1]
                    ),
                    state(&arr).data("out_of_order", out_of_order),
                )
                .with_action(Action::Compare),
            )?;
            if out_of_order {
                arr.swap(j, j + 1);
                swapped = true;
                trace.push(
                    Snapshot::array(format!("Swap positions {} and {}", j, j + 1), state(&arr))
                        .with_action(Action::Swap),
                )?;
            }
        }
        if !swapped {
            trace.push(
                Snapshot::array(
                    format!("Pass {} made no swaps: the array is sorted", pass + 1),
                    ArrayState::new(arr.clone()).data("sorted_from", 0),
                )
                .with_action(Action::Done),
            )?;
            break;
        }
    }

    let summary = format!("Sorted: {:?}", arr);
    Ok(trace.finish(
        Snapshot::array(summary, ArrayState::new(arr).data("sorted_from", 0)).with_action(Action::Done),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotState;

    fn final_array(trace: &Trace) -> Vec<i64> {
        trace.last().state.array().unwrap().to_vec()
    }

    #[test]
    fn test_binary_search_found() {
        let trace = generate_binary_search_steps(&[2, 5, 8, 12, 16, 23, 38, 56, 72, 91], 23).unwrap();
        let last = trace.last();
        assert!(last.is_complete);
        assert_eq!(last.action, Some(Action::Found));
        assert!(last.message.contains("index 5"), "{}", last.message);
        assert_eq!(trace.first().action, Some(Action::Init));
    }

    #[test]
    fn test_binary_search_missing_and_empty() {
        let trace = generate_binary_search_steps(&[1, 3, 5], 4).unwrap();
        assert_eq!(trace.last().action, Some(Action::NotFound));

        let trace = generate_binary_search_steps(&[], 4).unwrap();
        assert_eq!(trace.len(), 1);
        assert!(trace.last().is_complete);
    }

    #[test]
    fn test_move_zeros() {
        let trace = generate_move_zeros_steps(&[0, 1, 0, 3, 12]).unwrap();
        assert_eq!(final_array(&trace), vec![1, 3, 12, 0, 0]);
    }

    #[test]
    fn test_move_zeros_swap_and_advance_are_separate_steps() {
        let trace = generate_move_zeros_steps(&[0, 1]).unwrap();
        let pointer = |step: &Snapshot, name: &str| match &step.state {
            SnapshotState::Array(s) => s.pointers.get(name).copied(),
            _ => None,
        };
        let swap = trace
            .steps()
            .iter()
            .position(|s| s.action == Some(Action::Swap))
            .unwrap();
        let steps = trace.steps();
        assert_eq!(steps[swap].state.array(), Some(&[1, 0][..]));
        assert_eq!(pointer(&steps[swap], "write"), Some(0));
        assert_eq!(steps[swap + 1].action, Some(Action::Move));
        assert_eq!(pointer(&steps[swap + 1], "write"), Some(1));
        assert_eq!(steps[swap + 1].state.array(), Some(&[1, 0][..]));
    }

    #[test]
    fn test_reverse_array() {
        let trace = generate_reverse_array_steps(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(final_array(&trace), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_max_sum_subarray() {
        let trace = generate_max_sum_subarray_steps(&[2, 1, 5, 1, 3, 2], 3).unwrap();
        match &trace.last().state {
            SnapshotState::Array(s) => assert_eq!(s.data["result"], 9),
            other => panic!("unexpected state {:?}", other),
        }
        let degenerate = generate_max_sum_subarray_steps(&[1], 3).unwrap();
        assert_eq!(degenerate.len(), 1);
    }

    #[test]
    fn test_max_sum_subarray_extreme_values() {
        let err = generate_max_sum_subarray_steps(&[i64::MAX, 1], 2).unwrap_err();
        assert_eq!(err, GenerationError::too_large("nums"));

        // The sliding update may not overflow when the window sum itself fits
        let trace = generate_max_sum_subarray_steps(&[i64::MIN, i64::MAX, i64::MAX], 1).unwrap();
        match &trace.last().state {
            SnapshotState::Array(s) => assert_eq!(s.data["result"], i64::MAX),
            other => panic!("unexpected state {:?}", other),
        }
        assert!(generate_max_sum_subarray_steps(&[i64::MAX, i64::MIN], 2).is_ok());
    }

    #[test]
    fn test_bubble_sort() {
        let trace = generate_bubble_sort_steps(&[5, 1, 4, 2, 8]).unwrap();
        assert_eq!(final_array(&trace), vec![1, 2, 4, 5, 8]);
        // Every swap is preceded by its comparison
        for pair in trace.steps().windows(2) {
            if pair[1].action == Some(Action::Swap) {
                assert_eq!(pair[0].action, Some(Action::Compare));
            }
        }
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let err = binary_search(&Inputs::new()).unwrap_err();
        assert!(matches!(err, GenerationError::MissingInput { .. }));
    }
}
