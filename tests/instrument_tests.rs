// Instrumented execution tests

use algoscope::generator::Inputs;
use algoscope::instrument::{execute, supported_entry_points, ExecutionError, ExecutionLimits};
use algoscope::registry::{flatten, resolve, ResolvedProblem};
use algoscope::snapshot::{Action, SnapshotState, Trace};

fn run_on_defaults(problem: &ResolvedProblem, source: &str, limits: &ExecutionLimits) -> Result<Trace, ExecutionError> {
    let meta = problem.meta();
    let order: Vec<&str> = meta.input_names().collect();
    execute(
        source,
        meta.entry_point.unwrap(),
        &meta.default_inputs(),
        &order,
        limits,
    )
}

fn two_sum() -> ResolvedProblem {
    resolve("hashing", "hash-map", "two-sum").unwrap()
}

#[test]
fn test_default_solutions_run() {
    let runnable: Vec<_> = flatten()
        .into_iter()
        .filter(|r| r.problem.meta.entry_point.is_some())
        .collect();
    assert_eq!(runnable.len(), supported_entry_points().count());

    for route in runnable {
        let problem = resolve(route.topic.id, route.pattern.id, route.problem.meta.id).unwrap();
        let meta = problem.meta();
        let trace = run_on_defaults(&problem, meta.default_code, &ExecutionLimits::default())
            .unwrap_or_else(|e| panic!("{}: {}", route.route(), e));

        assert!(trace.len() > 1, "{}", route.route());
        assert!(trace.is_uniform(), "{}", route.route());
        let last = trace.last();
        assert!(last.is_complete);
        assert_eq!(last.action, Some(Action::Done));

        let lines = meta.default_code.lines().count();
        for step in &trace.steps()[..trace.len() - 1] {
            let line = step.source_line.expect("checkpoint without a line");
            assert!(line >= 1 && line <= lines, "{} line {}", route.route(), line);
        }
    }
}

#[test]
fn test_binary_search_result() {
    let problem = resolve("arrays", "binary-search", "binary-search-visualizer").unwrap();
    let trace = run_on_defaults(&problem, problem.meta().default_code, &ExecutionLimits::default()).unwrap();
    assert_eq!(trace.last().message, "binarySearch returned 5");
    assert!(trace
        .steps()
        .iter()
        .any(|s| matches!(&s.state, SnapshotState::Array(a) if a.pointers.contains_key("mid"))));
}

#[test]
fn test_move_zeroes_result() {
    let problem = resolve("arrays", "two-pointers", "move-zeros").unwrap();
    let trace = run_on_defaults(&problem, problem.meta().default_code, &ExecutionLimits::default()).unwrap();
    assert_eq!(trace.last().message, "moveZeroes returned [1,3,12,0,0]");
    assert_eq!(trace.last().state.array(), Some(&[1, 3, 12, 0, 0][..]));
}

#[test]
fn test_two_sum_records_map_state() {
    let problem = two_sum();
    let trace = run_on_defaults(&problem, problem.meta().default_code, &ExecutionLimits::default()).unwrap();
    assert_eq!(trace.last().message, "twoSum returned [0,1]");
    assert!(trace.steps().iter().any(|s| match &s.state {
        SnapshotState::HashMap(m) => m.get("2") == Some("0"),
        _ => false,
    }));
}

#[test]
fn test_parse_error() {
    let err = run_on_defaults(&two_sum(), "function twoSum(nums, target) {", &ExecutionLimits::default()).unwrap_err();
    assert!(matches!(err, ExecutionError::Parse(_)), "{:?}", err);
}

#[test]
fn test_entry_point_missing() {
    let err = run_on_defaults(&two_sum(), "function other(nums) { return 1; }", &ExecutionLimits::default()).unwrap_err();
    assert_eq!(
        err,
        ExecutionError::EntryPointMissing {
            name: "twoSum".to_string()
        }
    );
}

#[test]
fn test_unknown_entry_point() {
    let err = execute("function f() { return 1; }", "f", &Inputs::new(), &[], &ExecutionLimits::default()).unwrap_err();
    assert!(matches!(err, ExecutionError::UnknownEntryPoint { .. }));
}

#[test]
fn test_runtime_error_gives_no_trace() {
    let err = run_on_defaults(
        &two_sum(),
        "function twoSum(nums, target) {\n  let x = 1;\n  return missing;\n}",
        &ExecutionLimits::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExecutionError::Runtime(_)), "{:?}", err);
    assert!(err.to_string().contains("missing"), "{}", err);
}

#[test]
fn test_no_steps_recorded() {
    let err = run_on_defaults(&two_sum(), "function twoSum(nums, target) {}", &ExecutionLimits::default()).unwrap_err();
    assert_eq!(err, ExecutionError::NoStepsRecorded);
}

#[test]
fn test_infinite_loop_is_stopped() {
    let err = run_on_defaults(
        &two_sum(),
        "function twoSum(nums, target) { while (true) { } }",
        &ExecutionLimits::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExecutionError::StepLimitExceeded(_)), "{:?}", err);
}

#[test]
fn test_step_budget() {
    let problem = two_sum();
    let limits = ExecutionLimits {
        max_steps: 3,
        ..ExecutionLimits::default()
    };
    let err = run_on_defaults(&problem, problem.meta().default_code, &limits).unwrap_err();
    assert!(matches!(err, ExecutionError::StepLimitExceeded(_)), "{:?}", err);
}

#[test]
fn test_runaway_recursion_is_stopped() {
    let err = run_on_defaults(
        &two_sum(),
        "function twoSum(nums, target) { return twoSum(nums, target); }",
        &ExecutionLimits::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExecutionError::StepLimitExceeded(_)), "{:?}", err);
}

#[test]
fn test_self_containing_array_is_reported() {
    let problem = resolve("arrays", "binary-search", "binary-search-visualizer").unwrap();
    let source = "function binarySearch(nums, target) {\n  const a = [1];\n  a.push(a);\n  const s = a.join('-') + a;\n  return a;\n}";
    let trace = run_on_defaults(&problem, source, &ExecutionLimits::default()).unwrap();
    assert_eq!(trace.last().message, "binarySearch returned [1,null]");
}

#[test]
fn test_deeply_nested_source_is_a_parse_error() {
    let problem = resolve("arrays", "binary-search", "binary-search-visualizer").unwrap();
    let source = format!(
        "function binarySearch(nums, target) {{ return {}1{}; }}",
        "(".repeat(50_000),
        ")".repeat(50_000)
    );
    let err = run_on_defaults(&problem, &source, &ExecutionLimits::default()).unwrap_err();
    assert!(matches!(err, ExecutionError::Parse(_)), "{:?}", err);
}

#[test]
fn test_allocation_budget_stops_runaway_growth() {
    let limits = ExecutionLimits {
        max_allocation: 3_000_000,
        ..ExecutionLimits::default()
    };
    let source = "function twoSum(nums, target) {\n  const keep = [];\n  while (true) {\n    keep.push(new Array(1000000));\n  }\n}";
    let err = run_on_defaults(&two_sum(), source, &limits).unwrap_err();
    assert!(matches!(err, ExecutionError::StepLimitExceeded(_)), "{:?}", err);

    let limits = ExecutionLimits {
        max_allocation: 50,
        ..ExecutionLimits::default()
    };
    let source = "function twoSum(nums, target) {\n  let s = 'ab';\n  while (true) {\n    s += s;\n  }\n}";
    let err = run_on_defaults(&two_sum(), source, &limits).unwrap_err();
    assert!(matches!(err, ExecutionError::StepLimitExceeded(_)), "{:?}", err);
}
