// Trace assembly with a bounded step history

use super::{Mode, Snapshot};
use serde::Serialize;
use thiserror::Error;

/// Default maximum number of snapshots a single trace may hold
pub const DEFAULT_STEP_LIMIT: usize = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The trace grew past its step cap
    #[error("Trace step limit exceeded: more than {limit} snapshots")]
    StepLimitExceeded { limit: usize },
}

/// An ordered, finite, non-empty sequence of snapshots.
///
/// Traces are never edited once built; new inputs always produce a new trace.
/// The last snapshot is always flagged complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trace {
    steps: Vec<Snapshot>,
}

impl Trace {
    /// A one-step trace holding only a terminal snapshot
    pub fn single(snapshot: Snapshot) -> Self {
        Trace {
            steps: vec![snapshot.complete()],
        }
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.steps.get(index)
    }

    pub fn first(&self) -> &Snapshot {
        &self.steps[0]
    }

    pub fn last(&self) -> &Snapshot {
        &self.steps[self.steps.len() - 1]
    }

    /// Always at least 1
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn steps(&self) -> &[Snapshot] {
        &self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.steps.iter()
    }

    /// The mode of the first non-blank snapshot, or `Blank` if every step is blank
    pub fn mode(&self) -> Mode {
        self.steps
            .iter()
            .map(Snapshot::mode)
            .find(|m| *m != Mode::Blank)
            .unwrap_or(Mode::Blank)
    }

    /// Every snapshot is of one mode (blank steps excepted)
    pub fn is_uniform(&self) -> bool {
        let mode = self.mode();
        self.steps.iter().all(|s| s.mode().is_compatible_with(mode))
    }
}

/// Accumulates snapshots for one generator call.
///
/// Mirrors the snapshot-history limit of a time-travel debugger: pushing past
/// `limit` fails instead of growing without bound.
#[derive(Debug)]
pub struct TraceBuilder {
    steps: Vec<Snapshot>,
    limit: usize,
}

impl TraceBuilder {
    pub fn new(limit: usize) -> Self {
        TraceBuilder {
            steps: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record one semantically meaningful step
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), TraceError> {
        if self.steps.len() >= self.limit {
            return Err(TraceError::StepLimitExceeded { limit: self.limit });
        }
        self.steps.push(snapshot);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.steps.last()
    }

    /// Append the terminal summary snapshot and seal the trace
    pub fn finish(mut self, terminal: Snapshot) -> Result<Trace, TraceError> {
        self.push(terminal.complete())?;
        Ok(Trace { steps: self.steps })
    }

    /// Seal the trace, marking the last recorded snapshot terminal.
    /// Returns `None` if nothing was recorded.
    pub fn finish_last(mut self) -> Option<Trace> {
        let last = self.steps.last_mut()?;
        last.is_complete = true;
        Some(Trace { steps: self.steps })
    }
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{ArrayState, TreeState};

    #[test]
    fn test_finish_marks_terminal() {
        let mut builder = TraceBuilder::default();
        builder.push(Snapshot::blank("one")).unwrap();
        let trace = builder.finish(Snapshot::blank("done")).unwrap();

        assert_eq!(trace.len(), 2);
        assert!(!trace.first().is_complete);
        assert!(trace.last().is_complete);
    }

    #[test]
    fn test_step_limit() {
        let mut builder = TraceBuilder::new(2);
        builder.push(Snapshot::blank("a")).unwrap();
        builder.push(Snapshot::blank("b")).unwrap();
        assert_eq!(
            builder.push(Snapshot::blank("c")),
            Err(TraceError::StepLimitExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_finish_last_on_empty_builder() {
        assert!(TraceBuilder::default().finish_last().is_none());
    }

    #[test]
    fn test_uniformity() {
        let mut builder = TraceBuilder::default();
        builder
            .push(Snapshot::array("a", ArrayState::new(vec![1])))
            .unwrap();
        builder.push(Snapshot::blank("b")).unwrap();
        let trace = builder
            .finish(Snapshot::array("c", ArrayState::new(vec![1])))
            .unwrap();
        assert_eq!(trace.mode(), Mode::Array);
        assert!(trace.is_uniform());

        let mut builder = TraceBuilder::default();
        builder
            .push(Snapshot::array("a", ArrayState::new(vec![1])))
            .unwrap();
        let mixed = builder
            .finish(Snapshot::tree("b", TreeState::default()))
            .unwrap();
        assert!(!mixed.is_uniform());
    }
}
