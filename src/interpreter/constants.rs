// Budgets for the script sandbox

/// Statements (and loop iterations) a single run may evaluate
pub const DEFAULT_MAX_STATEMENTS: usize = 100_000;

/// Nested script function calls, counting the entry call
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

/// Array elements, map entries and string bytes a single run may allocate in total
pub const DEFAULT_MAX_ALLOCATION: usize = 5_000_000;

/// Largest array a script may grow by index assignment or `new Array(n)`
pub const MAX_ARRAY_LENGTH: usize = 1_000_000;

/// Nested statement and expression evaluations across all active calls
pub const MAX_EVAL_NESTING: usize = 256;
