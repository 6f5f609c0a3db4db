//! Playback controller: owns the current trace and the scrub index
//!
//! The controller holds the trace produced by the resolved problem's
//! generator plus an optional override trace (from instrumented execution).
//! Reads always go through `override ?? trace`. Navigation never fails; every
//! index operation clamps to `[0, len - 1]`.
//!
//! Loads are split into [`PlaybackController::begin_load`],
//! [`LoadRequest::run`] and [`PlaybackController::complete_load`] so a caller
//! that generates off the UI thread can hand responses back in any order. Each
//! request carries a sequence number and only the most recently *requested*
//! response is applied.

use crate::generator::Inputs;
use crate::instrument::{self, ExecutionLimits};
use crate::registry::ResolvedProblem;
use crate::snapshot::{Snapshot, Trace};

/// A pending generator invocation
#[derive(Debug, Clone)]
pub struct LoadRequest {
    seq: u64,
    problem: Option<ResolvedProblem>,
    inputs: Inputs,
}

impl LoadRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Invoke the generator. Generation failures become a one-step trace
    /// whose message explains what was wrong with the inputs.
    pub fn run(self) -> LoadResponse {
        let trace = self.problem.map(|problem| {
            match (problem.generator())(&self.inputs) {
                Ok(trace) => trace,
                Err(e) => {
                    tracing::warn!(
                        key = %problem.key(),
                        error = %e,
                        "Trace generation failed"
                    );
                    Trace::single(Snapshot::blank(format!("Cannot visualize these inputs: {}", e)))
                }
            }
        });
        LoadResponse {
            seq: self.seq,
            inputs: self.inputs,
            trace,
        }
    }
}

/// The result of a [`LoadRequest`]
#[derive(Debug, Clone)]
pub struct LoadResponse {
    seq: u64,
    inputs: Inputs,
    trace: Option<Trace>,
}

impl LoadResponse {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug)]
pub struct PlaybackController {
    problem: Option<ResolvedProblem>,
    inputs: Inputs,
    trace: Option<Trace>,
    override_trace: Option<Trace>,
    index: usize,
    /// Sequence number of the latest request handed out
    requested_seq: u64,
}

impl PlaybackController {
    /// Create a controller for a resolved problem and load its default inputs.
    /// With `None` the controller stays empty and navigation is a no-op.
    pub fn new(problem: Option<ResolvedProblem>) -> Self {
        let mut controller = PlaybackController {
            problem,
            inputs: Inputs::new(),
            trace: None,
            override_trace: None,
            index: 0,
            requested_seq: 0,
        };
        if let Some(problem) = problem {
            controller.load(problem.meta().default_inputs());
        }
        controller
    }

    pub fn problem(&self) -> Option<&ResolvedProblem> {
        self.problem.as_ref()
    }

    /// Regenerate the trace from `inputs`, clear any override, rewind.
    pub fn load(&mut self, inputs: Inputs) {
        let request = self.begin_load(inputs);
        let response = request.run();
        self.complete_load(response);
    }

    /// Issue a new request. Any response to an earlier request becomes stale.
    pub fn begin_load(&mut self, inputs: Inputs) -> LoadRequest {
        self.requested_seq += 1;
        tracing::debug!(seq = self.requested_seq, "Trace load requested");
        LoadRequest {
            seq: self.requested_seq,
            problem: self.problem,
            inputs,
        }
    }

    /// Apply a response if it answers the most recent request.
    /// Returns `false` (and changes nothing) for stale responses.
    pub fn complete_load(&mut self, response: LoadResponse) -> bool {
        if response.seq != self.requested_seq {
            tracing::debug!(
                seq = response.seq,
                latest = self.requested_seq,
                "Discarding stale trace"
            );
            return false;
        }
        tracing::debug!(
            seq = response.seq,
            steps = response.trace.as_ref().map_or(0, Trace::len),
            "Trace loaded"
        );
        self.inputs = response.inputs;
        self.trace = response.trace;
        self.override_trace = None;
        self.index = 0;
        true
    }

    fn active(&self) -> Option<&Trace> {
        self.override_trace.as_ref().or(self.trace.as_ref())
    }

    /// The trace reads currently go through
    pub fn trace(&self) -> Option<&Trace> {
        self.active()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.active().and_then(|t| t.get(self.index))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.active().map_or(0, Trace::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    pub fn is_overridden(&self) -> bool {
        self.override_trace.is_some()
    }

    pub fn is_at_start(&self) -> bool {
        self.index == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.index + 1 >= self.len()
    }

    /// Step forward. Returns whether the index moved.
    pub fn next(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.index += 1;
        tracing::debug!(index = self.index, "Step forward");
        true
    }

    /// Step backward. Returns whether the index moved.
    pub fn prev(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        tracing::debug!(index = self.index, "Step backward");
        true
    }

    /// Jump to `index`, clamped to the trace bounds
    pub fn go_to(&mut self, index: i64) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let max = (len - 1) as i64;
        self.index = index.clamp(0, max) as usize;
        tracing::debug!(requested = index, index = self.index, "Jump");
    }

    pub fn go_to_end(&mut self) {
        self.go_to(i64::MAX);
    }

    /// Rewind without regenerating
    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn set_override(&mut self, trace: Trace) {
        tracing::debug!(steps = trace.len(), "Override trace installed");
        self.override_trace = Some(trace);
        self.index = 0;
    }

    /// Fall back to the generator's trace
    pub fn clear_override(&mut self) {
        if self.override_trace.take().is_some() {
            tracing::debug!("Override trace cleared");
            self.index = 0;
        }
    }

    /// Run user code through instrumented execution and install the result as
    /// the override. On failure the current trace is left untouched and the
    /// message to show the user is returned.
    pub fn run_instrumented(&mut self, source: &str, limits: &ExecutionLimits) -> Result<usize, String> {
        let problem = self
            .problem
            .ok_or_else(|| "No problem is loaded".to_string())?;
        let meta = problem.meta();
        let entry_point = meta
            .entry_point
            .ok_or_else(|| format!("'{}' does not support running custom code", meta.title))?;
        let order: Vec<&str> = meta.input_names().collect();

        match instrument::execute(source, entry_point, &self.inputs, &order, limits) {
            Ok(trace) => {
                let steps = trace.len();
                self.set_override(trace);
                Ok(steps)
            }
            Err(e) => {
                tracing::warn!(key = %problem.key(), error = %e, "Instrumented execution failed");
                Err(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::InputValue;
    use crate::registry::resolve;

    fn binary_search() -> PlaybackController {
        PlaybackController::new(resolve("arrays", "binary-search", "binary-search-visualizer"))
    }

    #[test]
    fn test_new_loads_default_inputs() {
        let controller = binary_search();
        assert!(controller.len() > 1);
        assert_eq!(controller.index(), 0);
        assert!(controller.inputs().get("target").is_some());
    }

    #[test]
    fn test_unresolved_problem_is_empty() {
        let mut controller = PlaybackController::new(None);
        assert!(controller.current().is_none());
        assert!(!controller.next());
        controller.go_to(3);
        assert_eq!(controller.index(), 0);
    }

    #[test]
    fn test_navigation_clamps() {
        let mut controller = binary_search();
        let len = controller.len() as i64;
        controller.go_to(-5);
        assert_eq!(controller.index(), 0);
        controller.go_to(len + 10);
        assert_eq!(controller.index() as i64, len - 1);
        assert!(!controller.next());
        assert!(controller.current().unwrap().is_complete);
        controller.reset();
        assert!(!controller.prev());
    }

    #[test]
    fn test_invalid_inputs_become_explanatory_trace() {
        let mut controller = binary_search();
        controller.load(Inputs::new().with("nums", InputValue::Text("oops".into())));
        assert_eq!(controller.len(), 1);
        let snap = controller.current().unwrap();
        assert!(snap.is_complete);
        assert!(snap.message.contains("nums"));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut controller = binary_search();
        let first = controller.begin_load(
            Inputs::new()
                .with("nums", InputValue::IntArray(vec![1, 2, 3]))
                .with("target", InputValue::Int(3)),
        );
        let second = controller.begin_load(
            Inputs::new()
                .with("nums", InputValue::IntArray(vec![4]))
                .with("target", InputValue::Int(9)),
        );
        let second_response = second.run();
        let first_response = first.run();

        assert!(controller.complete_load(second_response));
        assert!(!controller.complete_load(first_response));
        assert_eq!(controller.inputs().int("target"), Ok(9));
    }
}
