//! Domain registry: Topic → Pattern → Problem
//!
//! The catalog in [`catalog`] is a `static` three-level table assembled at
//! compile time. Every [`ProblemEntry`] pairs its [`ProblemMeta`] with the
//! trace generator and renderer for that problem, so a problem without a
//! generator does not compile.
//!
//! Lookups return `Option` for unknown ids. [`resolve`] additionally logs a
//! warning on a miss; callers treat `None` as "no trace available".

pub mod catalog;

use crate::generator::{Generator, InputValue, Inputs};
use crate::snapshot::Snapshot;
use ratatui::{layout::Rect, Frame};
use std::collections::HashSet;
use std::fmt;

pub use catalog::CATALOG;

/// Draws one snapshot into an area. Must not mutate the snapshot and must
/// tolerate any snapshot mode.
pub type Renderer = fn(&mut Frame, Rect, &Snapshot);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// Statically declared default input value
#[derive(Debug, Clone, Copy)]
pub enum DefaultInput {
    Int(i64),
    Text(&'static str),
    Ints(&'static [i64]),
    Nullable(&'static [Option<i64>]),
}

impl DefaultInput {
    pub fn to_value(self) -> InputValue {
        match self {
            DefaultInput::Int(n) => InputValue::Int(n),
            DefaultInput::Text(s) => InputValue::Text(s.to_string()),
            DefaultInput::Ints(v) => InputValue::IntArray(v.to_vec()),
            DefaultInput::Nullable(v) => InputValue::NullableIntArray(v.to_vec()),
        }
    }
}

/// An alternate solution with its complexity annotations
#[derive(Debug, Clone, Copy)]
pub struct Approach {
    pub name: &'static str,
    pub time: &'static str,
    pub space: &'static str,
    pub summary: &'static str,
}

/// Static description of a problem
#[derive(Debug, Clone, Copy)]
pub struct ProblemMeta {
    pub id: &'static str,
    pub title: &'static str,
    pub difficulty: Difficulty,
    pub description: &'static str,
    pub constraints: &'static [&'static str],
    /// Declared in parameter order; instrumented runs bind by this order
    pub default_inputs: &'static [(&'static str, DefaultInput)],
    pub default_code: &'static str,
    /// Script function name instrumented execution calls, if supported
    pub entry_point: Option<&'static str>,
    pub approaches: &'static [Approach],
}

impl ProblemMeta {
    pub fn default_inputs(&self) -> Inputs {
        self.default_inputs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_value()))
            .collect()
    }

    pub fn input_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.default_inputs.iter().map(|(name, _)| *name)
    }
}

/// A problem together with its generator and renderer
#[derive(Clone, Copy)]
pub struct ProblemEntry {
    pub meta: ProblemMeta,
    pub generate: Generator,
    pub render: Renderer,
}

impl fmt::Debug for ProblemEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemEntry")
            .field("id", &self.meta.id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Pattern {
    pub id: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub problems: &'static [ProblemEntry],
}

#[derive(Debug)]
pub struct Topic {
    pub id: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub patterns: &'static [Pattern],
}

/// The (topic, pattern, problem) address used everywhere else
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProblemKey {
    pub topic: String,
    pub pattern: String,
    pub problem: String,
}

impl ProblemKey {
    pub fn new(topic: &str, pattern: &str, problem: &str) -> Self {
        ProblemKey {
            topic: topic.to_string(),
            pattern: pattern.to_string(),
            problem: problem.to_string(),
        }
    }

    /// `generate` + PascalCase(problem id) + `Steps`
    pub fn generator_symbol(&self) -> String {
        format!("generate{}Steps", pascal_case(&self.problem))
    }

    /// PascalCase(problem id) + `Renderer`
    pub fn renderer_symbol(&self) -> String {
        format!("{}Renderer", pascal_case(&self.problem))
    }

    /// `topic/pattern/problem`
    pub fn module_path(&self) -> String {
        format!("{}/{}/{}", self.topic, self.pattern, self.problem)
    }

    pub fn route(&self) -> String {
        format!("/{}", self.module_path())
    }
}

impl fmt::Display for ProblemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.topic, self.pattern, self.problem)
    }
}

/// Capitalise each kebab-case segment and concatenate
pub fn pascal_case(id: &str) -> String {
    id.split('-')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// One row of the flattened hierarchy, for navigation and search
#[derive(Debug, Clone, Copy)]
pub struct ProblemRoute {
    pub topic: &'static Topic,
    pub pattern: &'static Pattern,
    pub problem: &'static ProblemEntry,
}

impl ProblemRoute {
    pub fn key(&self) -> ProblemKey {
        ProblemKey::new(self.topic.id, self.pattern.id, self.problem.meta.id)
    }

    pub fn route(&self) -> String {
        self.key().route()
    }
}

/// A resolved problem: metadata, generator and renderer
#[derive(Debug, Clone, Copy)]
pub struct ResolvedProblem {
    pub topic: &'static Topic,
    pub pattern: &'static Pattern,
    pub entry: &'static ProblemEntry,
}

impl ResolvedProblem {
    pub fn meta(&self) -> &'static ProblemMeta {
        &self.entry.meta
    }

    pub fn generator(&self) -> Generator {
        self.entry.generate
    }

    pub fn renderer(&self) -> Renderer {
        self.entry.render
    }

    pub fn key(&self) -> ProblemKey {
        ProblemKey::new(self.topic.id, self.pattern.id, self.entry.meta.id)
    }
}

pub fn topics() -> &'static [Topic] {
    CATALOG
}

pub fn get_topic(topic_id: &str) -> Option<&'static Topic> {
    CATALOG.iter().find(|t| t.id == topic_id)
}

pub fn get_pattern(topic_id: &str, pattern_id: &str) -> Option<&'static Pattern> {
    get_topic(topic_id)?
        .patterns
        .iter()
        .find(|p| p.id == pattern_id)
}

fn get_entry(topic_id: &str, pattern_id: &str, problem_id: &str) -> Option<&'static ProblemEntry> {
    get_pattern(topic_id, pattern_id)?
        .problems
        .iter()
        .find(|p| p.meta.id == problem_id)
}

pub fn get_problem(
    topic_id: &str,
    pattern_id: &str,
    problem_id: &str,
) -> Option<&'static ProblemMeta> {
    get_entry(topic_id, pattern_id, problem_id).map(|e| &e.meta)
}

/// Every problem in catalog order
pub fn flatten() -> Vec<ProblemRoute> {
    CATALOG
        .iter()
        .flat_map(|topic| {
            topic.patterns.iter().flat_map(move |pattern| {
                pattern.problems.iter().map(move |problem| ProblemRoute {
                    topic,
                    pattern,
                    problem,
                })
            })
        })
        .collect()
}

/// Case-insensitive match against problem ids, titles and their topic/pattern
pub fn search(query: &str) -> Vec<ProblemRoute> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return flatten();
    }
    flatten()
        .into_iter()
        .filter(|r| {
            [
                r.problem.meta.id,
                r.problem.meta.title,
                r.pattern.id,
                r.pattern.title,
                r.topic.id,
                r.topic.title,
            ]
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Resolve a triple to its generator and renderer.
///
/// Never panics; a miss is logged and reported as `None`.
pub fn resolve(topic_id: &str, pattern_id: &str, problem_id: &str) -> Option<ResolvedProblem> {
    let key = ProblemKey::new(topic_id, pattern_id, problem_id);
    let found = get_topic(topic_id).and_then(|topic| {
        let pattern = topic.patterns.iter().find(|p| p.id == pattern_id)?;
        let entry = pattern.problems.iter().find(|p| p.meta.id == problem_id)?;
        Some(ResolvedProblem {
            topic,
            pattern,
            entry,
        })
    });

    match found {
        Some(resolved) => {
            tracing::debug!(key = %key, "Resolved problem");
            Some(resolved)
        }
        None => {
            tracing::warn!(
                key = %key,
                module = %key.module_path(),
                generator = %key.generator_symbol(),
                renderer = %key.renderer_symbol(),
                "No visualizer registered for problem"
            );
            None
        }
    }
}

/// Catalog consistency problems
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    DuplicateTopic(String),
    DuplicatePattern { topic: String, pattern: String },
    DuplicateProblem { key: ProblemKey },
    DuplicateSymbol { symbol: String },
    DefaultInputsFail { key: ProblemKey, message: String },
    MalformedTrace { key: ProblemKey, message: String },
}

/// Check id uniqueness at every level and that default inputs produce a
/// well-formed trace (non-empty, terminal last step, uniform mode).
pub fn validate_catalog() -> Vec<CatalogIssue> {
    let mut issues = Vec::new();
    let mut topic_ids = HashSet::new();
    let mut symbols = HashSet::new();

    for topic in CATALOG {
        if !topic_ids.insert(topic.id) {
            issues.push(CatalogIssue::DuplicateTopic(topic.id.to_string()));
        }
        let mut pattern_ids = HashSet::new();
        for pattern in topic.patterns {
            if !pattern_ids.insert(pattern.id) {
                issues.push(CatalogIssue::DuplicatePattern {
                    topic: topic.id.to_string(),
                    pattern: pattern.id.to_string(),
                });
            }
            let mut problem_ids = HashSet::new();
            for entry in pattern.problems {
                let key = ProblemKey::new(topic.id, pattern.id, entry.meta.id);
                if !problem_ids.insert(entry.meta.id) {
                    issues.push(CatalogIssue::DuplicateProblem { key: key.clone() });
                }
                let symbol = key.generator_symbol();
                if !symbols.insert(symbol.clone()) {
                    issues.push(CatalogIssue::DuplicateSymbol { symbol });
                }
                match (entry.generate)(&entry.meta.default_inputs()) {
                    Ok(trace) => {
                        if !trace.last().is_complete {
                            issues.push(CatalogIssue::MalformedTrace {
                                key,
                                message: "last snapshot is not terminal".to_string(),
                            });
                        } else if !trace.is_uniform() {
                            issues.push(CatalogIssue::MalformedTrace {
                                key,
                                message: "snapshot mode changes mid-trace".to_string(),
                            });
                        }
                    }
                    Err(e) => issues.push(CatalogIssue::DefaultInputsFail {
                        key,
                        message: e.to_string(),
                    }),
                }
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("two-sum"), "TwoSum");
        assert_eq!(pascal_case("binary-search-visualizer"), "BinarySearchVisualizer");
        assert_eq!(pascal_case("a--b"), "AB");
    }

    #[test]
    fn test_symbol_convention() {
        let key = ProblemKey::new("hashing", "hash-map", "two-sum");
        assert_eq!(key.generator_symbol(), "generateTwoSumSteps");
        assert_eq!(key.renderer_symbol(), "TwoSumRenderer");
        assert_eq!(key.route(), "/hashing/hash-map/two-sum");
    }

    #[test]
    fn test_catalog_is_consistent() {
        let issues = validate_catalog();
        assert!(issues.is_empty(), "catalog issues: {:?}", issues);
    }

    #[test]
    fn test_unknown_ids_are_absent() {
        assert!(get_topic("nope").is_none());
        assert!(get_pattern("arrays", "nope").is_none());
        assert!(get_problem("arrays", "binary-search", "does-not-exist").is_none());
        assert!(resolve("arrays", "binary-search", "does-not-exist").is_none());
    }

    #[test]
    fn test_search_matches_titles() {
        let hits = search("two sum");
        assert!(hits.iter().any(|r| r.problem.meta.id == "two-sum"));
        assert_eq!(search("").len(), flatten().len());
    }
}
