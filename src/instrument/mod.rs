//! Instrumented execution of user-supplied solutions
//!
//! [`execute`] turns source text into an override [`Trace`]:
//!
//! ```text
//! source → parse → insert checkpoints → interpret entry point → normalise steps → Trace
//! ```
//!
//! The script runs in the sandboxed [`crate::interpreter`]: the entry function
//! receives the problem inputs as arguments and can see nothing else besides
//! its sibling functions and the built-ins. A run that fails produces an
//! [`ExecutionError`], never a partial trace. A run that records no steps is
//! also an error.

pub mod normalize;
pub mod rewrite;

use crate::generator::{InputValue, Inputs};
use crate::interpreter::{Interpreter, Limits, RuntimeError};
use crate::memory::value::Value;
use crate::parser::{self, ParseError};
use crate::snapshot::{Action, Snapshot, SnapshotState, Trace};
use thiserror::Error;

pub use normalize::{supported_entry_points, Recorder, StepNormalizer};

/// Budgets for one instrumented run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Statements and loop iterations
    pub max_statements: usize,
    pub max_call_depth: usize,
    /// Array elements, map entries and string bytes allocated by the script
    pub max_allocation: usize,
    /// Checkpoints recorded, excluding the terminal snapshot
    pub max_steps: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        let interpreter = Limits::default();
        ExecutionLimits {
            max_statements: interpreter.max_statements,
            max_call_depth: interpreter.max_call_depth,
            max_allocation: interpreter.max_allocation,
            max_steps: 5_000,
        }
    }
}

impl ExecutionLimits {
    fn interpreter_limits(&self) -> Limits {
        Limits {
            max_statements: self.max_statements,
            max_call_depth: self.max_call_depth,
            max_allocation: self.max_allocation,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("No instrumented runner for entry point '{name}'")]
    UnknownEntryPoint { name: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Function '{name}' is not defined in the submitted code")]
    EntryPointMissing { name: String },

    #[error("Runtime error: {0}")]
    Runtime(RuntimeError),

    #[error("Code ran to completion but recorded no steps")]
    NoStepsRecorded,

    #[error("Step limit exceeded: {0}")]
    StepLimitExceeded(RuntimeError),
}

impl From<RuntimeError> for ExecutionError {
    fn from(e: RuntimeError) -> Self {
        if e.is_limit() {
            ExecutionError::StepLimitExceeded(e)
        } else {
            ExecutionError::Runtime(e)
        }
    }
}

/// Convert a problem input into a script value
pub fn input_to_value(input: &InputValue) -> Value {
    match input {
        InputValue::Int(n) => Value::Number(*n as f64),
        InputValue::Text(s) => Value::Str(s.clone()),
        InputValue::IntArray(items) => Value::from_ints(items),
        InputValue::NullableIntArray(items) => Value::array(
            items
                .iter()
                .map(|item| item.map_or(Value::Null, |n| Value::Number(n as f64)))
                .collect(),
        ),
    }
}

/// Run `source`'s `entry_point` on `inputs` and collect one snapshot per checkpoint.
///
/// Arguments are bound positionally in `input_order`; a name missing from
/// `inputs` is passed as `undefined`. The trace ends with a terminal snapshot
/// reporting the returned value.
pub fn execute(
    source: &str,
    entry_point: &str,
    inputs: &Inputs,
    input_order: &[&str],
    limits: &ExecutionLimits,
) -> Result<Trace, ExecutionError> {
    let normalizer = StepNormalizer::for_entry_point(entry_point).ok_or_else(|| {
        ExecutionError::UnknownEntryPoint {
            name: entry_point.to_string(),
        }
    })?;

    let mut program = parser::parse(source)?;
    if program.function(entry_point).is_none() {
        return Err(ExecutionError::EntryPointMissing {
            name: entry_point.to_string(),
        });
    }
    rewrite::insert_checkpoints(&mut program);

    let args: Vec<Value> = input_order
        .iter()
        .map(|name| inputs.get(name).map(input_to_value).unwrap_or_default())
        .collect();

    let recorder = Recorder::new(normalizer, limits.max_steps, limits.max_allocation);
    let mut interpreter = Interpreter::new(&program, recorder, limits.interpreter_limits());
    let outcome = interpreter.call(entry_point, args);
    let statements = interpreter.statements_executed();
    let recorder = interpreter.into_hook();

    let returned = match outcome {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(entry_point, statements, error = %e, "Instrumented run failed");
            return Err(e.into());
        }
    };

    let builder = recorder.into_builder();
    let Some(last) = builder.last() else {
        return Err(ExecutionError::NoStepsRecorded);
    };

    let terminal_state = match &last.state {
        state @ (SnapshotState::Array(_) | SnapshotState::HashMap(_)) => state.clone(),
        _ => SnapshotState::Blank,
    };
    let result = serde_json::to_string(&returned.to_json()).unwrap_or_else(|_| returned.to_string());
    let terminal = Snapshot::new(format!("{} returned {}", entry_point, result), terminal_state)
        .with_action(Action::Done);

    let steps = builder.len();
    let trace = builder.finish(terminal).map_err(|_| {
        ExecutionError::StepLimitExceeded(RuntimeError::CheckpointLimitExceeded {
            limit: limits.max_steps,
        })
    })?;

    tracing::debug!(entry_point, steps, statements, "Instrumented run complete");
    Ok(trace)
}
