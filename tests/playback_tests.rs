// Playback controller tests

use algoscope::generator::{InputValue, Inputs};
use algoscope::playback::PlaybackController;
use algoscope::registry::resolve;
use algoscope::snapshot::{Snapshot, Trace, TraceBuilder};

fn two_sum() -> PlaybackController {
    PlaybackController::new(resolve("hashing", "hash-map", "two-sum"))
}

fn custom_trace(messages: &[&str]) -> Trace {
    let mut builder = TraceBuilder::default();
    let (last, rest) = messages.split_last().unwrap();
    for message in rest {
        builder.push(Snapshot::blank(*message)).unwrap();
    }
    builder.finish(Snapshot::blank(*last)).unwrap()
}

#[test]
fn test_override_replaces_current_trace() {
    let mut controller = two_sum();
    controller.go_to(2);
    controller.set_override(custom_trace(&["b0", "b1"]));

    assert!(controller.is_overridden());
    assert_eq!(controller.index(), 0);
    assert_eq!(controller.current().unwrap().message, "b0");
    assert_eq!(controller.len(), 2);
}

#[test]
fn test_load_clears_override() {
    let mut controller = two_sum();
    let default_first = controller.current().unwrap().clone();
    controller.set_override(custom_trace(&["b0", "b1", "b2"]));
    controller.next();

    controller.load(controller.inputs().clone());
    assert!(!controller.is_overridden());
    assert_eq!(controller.index(), 0);
    assert_eq!(controller.current(), Some(&default_first));
}

#[test]
fn test_clear_override_falls_back() {
    let mut controller = two_sum();
    let len = controller.len();
    controller.set_override(custom_trace(&["only"]));
    controller.clear_override();
    assert_eq!(controller.len(), len);
}

#[test]
fn test_monotonic_scrub() {
    let mut controller = two_sum();
    let n = controller.len();
    assert!(!controller.prev());
    assert_eq!(controller.index(), 0);
    for k in 1..=n + 3 {
        controller.next();
        assert_eq!(controller.index(), k.min(n - 1));
    }
    assert!(controller.is_at_end());
}

#[test]
fn test_stale_response_is_discarded() {
    let mut controller = two_sum();
    let early = controller.begin_load(
        Inputs::new()
            .with("nums", InputValue::IntArray(vec![1, 2]))
            .with("target", InputValue::Int(3)),
    );
    let late = controller.begin_load(
        Inputs::new()
            .with("nums", InputValue::IntArray(vec![4, 5, 6]))
            .with("target", InputValue::Int(11)),
    );

    // The later request finishes first; the earlier one must not overwrite it
    let late_response = late.run();
    let early_response = early.run();
    assert!(controller.complete_load(late_response));
    assert!(!controller.complete_load(early_response));
    assert_eq!(controller.inputs().int("target").unwrap(), 11);
}

#[test]
fn test_bad_inputs_become_explanatory_trace() {
    let mut controller = two_sum();
    controller.load(Inputs::new().with("nums", InputValue::IntArray(vec![1])));
    assert_eq!(controller.len(), 1);
    let only = controller.current().unwrap();
    assert!(only.is_complete);
    assert!(only.message.contains("target"), "{}", only.message);
}

#[test]
fn test_instrumented_failure_leaves_trace_untouched() {
    let mut controller = two_sum();
    let before = controller.current().cloned();
    let err = controller
        .run_instrumented("function twoSum(nums, target) {", &Default::default())
        .unwrap_err();
    assert!(!err.is_empty());
    assert!(!controller.is_overridden());
    assert_eq!(controller.current().cloned(), before);
}

#[test]
fn test_instrumented_unsupported_problem() {
    let mut controller = PlaybackController::new(resolve("trees", "traversal", "inorder-traversal"));
    let err = controller
        .run_instrumented("function f() {}", &Default::default())
        .unwrap_err();
    assert!(err.contains("does not support"), "{}", err);
}
