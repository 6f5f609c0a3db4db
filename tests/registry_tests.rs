// Domain registry tests

use algoscope::registry::{
    flatten, get_pattern, get_problem, get_topic, resolve, search, topics, validate_catalog,
};
use std::collections::HashSet;

#[test]
fn test_catalog_is_valid() {
    let issues = validate_catalog();
    assert!(issues.is_empty(), "{:?}", issues);
}

#[test]
fn test_get_problem_totality() {
    let meta = get_problem("arrays", "binary-search", "binary-search-visualizer").unwrap();
    assert_eq!(meta.id, "binary-search-visualizer");
    assert!(get_problem("arrays", "binary-search", "does-not-exist").is_none());
    assert!(get_problem("arrays", "nope", "binary-search-visualizer").is_none());
    assert!(get_problem("nope", "binary-search", "binary-search-visualizer").is_none());
}

#[test]
fn test_every_flattened_route_resolves_to_itself() {
    for route in flatten() {
        let resolved = resolve(route.topic.id, route.pattern.id, route.problem.meta.id)
            .unwrap_or_else(|| panic!("{} does not resolve", route.route()));
        assert_eq!(resolved.key(), route.key());
        assert!(std::ptr::eq(resolved.meta(), &route.problem.meta));
    }
}

#[test]
fn test_resolution_miss_is_none() {
    assert!(resolve("arrays", "binary-search", "does-not-exist").is_none());
}

#[test]
fn test_every_mode_is_covered() {
    let modes: HashSet<_> = flatten()
        .iter()
        .map(|r| {
            (r.problem.generate)(&r.problem.meta.default_inputs())
                .unwrap()
                .mode()
        })
        .collect();
    assert_eq!(modes.len(), 5, "{:?}", modes);
}

#[test]
fn test_symbols_are_unique() {
    let routes = flatten();
    let generators: HashSet<_> = routes.iter().map(|r| r.key().generator_symbol()).collect();
    let renderers: HashSet<_> = routes.iter().map(|r| r.key().renderer_symbol()).collect();
    assert_eq!(generators.len(), routes.len());
    assert_eq!(renderers.len(), routes.len());
}

#[test]
fn test_hierarchy_lookups() {
    assert!(!topics().is_empty());
    let topic = get_topic("hashing").unwrap();
    assert!(topic.patterns.iter().any(|p| p.id == "hash-map"));
    assert!(get_pattern("hashing", "hash-map").is_some());
    assert!(get_pattern("hashing", "binary-search").is_none());
}

#[test]
fn test_search_is_case_insensitive() {
    let hits = search("TWO SUM");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].route(), "/hashing/hash-map/two-sum");
    assert_eq!(search("").len(), flatten().len());
    assert!(search("zzz-nothing").is_empty());
}
