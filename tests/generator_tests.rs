// Trace generator contract tests

use algoscope::generator::{GenerationError, InputValue, Inputs};
use algoscope::playback::PlaybackController;
use algoscope::problems::arrays::{generate_binary_search_steps, generate_move_zeros_steps};
use algoscope::problems::hashing::generate_two_sum_steps;
use algoscope::problems::strings::generate_naive_string_match_steps;
use algoscope::registry::{flatten, resolve};
use algoscope::snapshot::{Action, Snapshot, SnapshotState};

fn result_of(snapshot: &Snapshot) -> Option<serde_json::Value> {
    match &snapshot.state {
        SnapshotState::HashMap(s) => s.data.get("result").cloned(),
        SnapshotState::Array(s) => s.data.get("result").cloned(),
        _ => None,
    }
}

#[test]
fn test_every_default_trace_is_well_formed() {
    for route in flatten() {
        let meta = &route.problem.meta;
        let trace = (route.problem.generate)(&meta.default_inputs())
            .unwrap_or_else(|e| panic!("{} failed on its defaults: {}", route.route(), e));

        assert!(!trace.is_empty(), "{}", route.route());
        assert!(trace.last().is_complete, "{} last step not terminal", route.route());
        assert!(trace.is_uniform(), "{} changes mode", route.route());
        for step in &trace.steps()[..trace.len() - 1] {
            assert!(!step.is_complete, "{} has an early terminal step", route.route());
        }
        if trace.len() > 1 {
            assert_eq!(trace.first().action, Some(Action::Init), "{}", route.route());
        }
    }
}

#[test]
fn test_generators_are_pure() {
    for route in flatten() {
        let inputs = route.problem.meta.default_inputs();
        let a = (route.problem.generate)(&inputs).unwrap();
        let b = (route.problem.generate)(&inputs).unwrap();
        assert_eq!(a, b, "{} is not deterministic", route.route());
    }
}

#[test]
fn test_binary_search_reports_index_five() {
    let nums = [2, 5, 8, 12, 16, 23, 38, 56, 72, 91];
    let first = generate_binary_search_steps(&nums, 23).unwrap();
    let second = generate_binary_search_steps(&nums, 23).unwrap();
    assert_eq!(first, second);

    let last = first.last();
    assert_eq!(last.action, Some(Action::Found));
    assert!(last.message.contains("index 5"), "{}", last.message);
}

#[test]
fn test_two_sum_reports_solution_only_at_the_end() {
    let trace = generate_two_sum_steps(&[2, 7, 11, 15], 9).unwrap();
    assert_eq!(result_of(trace.last()), Some(serde_json::json!([0, 1])));
    assert!(trace.steps()[..trace.len() - 1]
        .iter()
        .all(|s| result_of(s).is_none() && s.action != Some(Action::Found)));
}

#[test]
fn test_move_zeros_final_array() {
    let trace = generate_move_zeros_steps(&[0, 1, 0, 3, 12]).unwrap();
    assert_eq!(trace.last().state.array(), Some(&[1, 3, 12, 0, 0][..]));
}

#[test]
fn test_degenerate_input_still_terminates() {
    let trace = generate_naive_string_match_steps("abc", "").unwrap();
    assert!(trace.last().is_complete);
    let trace = generate_move_zeros_steps(&[]).unwrap();
    assert_eq!(trace.len(), 1);
}

#[test]
fn test_invalid_inputs_are_errors() {
    let problem = resolve("arrays", "binary-search", "binary-search-visualizer").unwrap();
    let generate = problem.generator();

    let missing = generate(&Inputs::new()).unwrap_err();
    assert!(matches!(missing, GenerationError::MissingInput { .. }));

    let wrong = generate(
        &Inputs::new()
            .with("nums", InputValue::Text("oops".to_string()))
            .with("target", InputValue::Int(1)),
    )
    .unwrap_err();
    assert!(matches!(wrong, GenerationError::InvalidInput { ref name, .. } if name == "nums"));
}

#[test]
fn test_inputs_from_json() {
    let problem = resolve("hashing", "hash-map", "two-sum").unwrap();
    let inputs = Inputs::from_json(r#"{"nums": [3, 3], "target": 6}"#).unwrap();
    let trace = (problem.generator())(&inputs).unwrap();
    assert_eq!(result_of(trace.last()), Some(serde_json::json!([0, 1])));
}

#[test]
fn test_out_of_range_json_inputs_are_errors() {
    let problem = resolve("hashing", "hash-map", "two-sum").unwrap();
    let inputs = Inputs::from_json(r#"{"nums": [1, 2], "target": -9223372036854775808}"#).unwrap();
    let err = problem.generator()(&inputs).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidInput { ref name, .. } if name == "target"), "{:?}", err);

    let mut controller = PlaybackController::new(Some(problem));
    controller.load(inputs);
    assert_eq!(controller.len(), 1);
    assert!(controller.current().unwrap().message.starts_with("Cannot visualize these inputs"));
}
