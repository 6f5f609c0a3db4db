//! The static problem catalog

use super::{Pattern, Topic};
use crate::problems::{arrays, hashing, linked_lists, strings, trees};

pub static CATALOG: &[Topic] = &[
    Topic {
        id: "arrays",
        title: "Arrays",
        summary: "Index arithmetic over contiguous storage",
        patterns: &[
            Pattern {
                id: "binary-search",
                title: "Binary Search",
                summary: "Halve a sorted search space each step",
                problems: &[arrays::BINARY_SEARCH],
            },
            Pattern {
                id: "two-pointers",
                title: "Two Pointers",
                summary: "Two indices moving toward each other or in tandem",
                problems: &[arrays::MOVE_ZEROS, arrays::REVERSE_ARRAY],
            },
            Pattern {
                id: "sliding-window",
                title: "Sliding Window",
                summary: "Maintain an aggregate over a moving range",
                problems: &[arrays::MAX_SUM_SUBARRAY],
            },
            Pattern {
                id: "sorting",
                title: "Sorting",
                summary: "Comparison sorts step by step",
                problems: &[arrays::BUBBLE_SORT],
            },
        ],
    },
    Topic {
        id: "hashing",
        title: "Hashing",
        summary: "Constant-time membership and lookup",
        patterns: &[Pattern {
            id: "hash-map",
            title: "Hash Map",
            summary: "Trade memory for lookups of previously seen values",
            problems: &[hashing::TWO_SUM, hashing::CONTAINS_DUPLICATE],
        }],
    },
    Topic {
        id: "strings",
        title: "Strings",
        summary: "Character-level scanning",
        patterns: &[Pattern {
            id: "pattern-matching",
            title: "Pattern Matching",
            summary: "Align and compare characters",
            problems: &[strings::NAIVE_STRING_MATCH, strings::VALID_PALINDROME],
        }],
    },
    Topic {
        id: "linked-lists",
        title: "Linked Lists",
        summary: "Pointer manipulation over node chains",
        patterns: &[Pattern {
            id: "in-place-reversal",
            title: "In-place Reversal",
            summary: "Rewire next pointers without extra storage",
            problems: &[linked_lists::REVERSE_LINKED_LIST],
        }],
    },
    Topic {
        id: "trees",
        title: "Trees",
        summary: "Hierarchical structures",
        patterns: &[Pattern {
            id: "traversal",
            title: "Traversal",
            summary: "Depth-first and breadth-first visiting orders",
            problems: &[trees::INORDER_TRAVERSAL, trees::LEVEL_ORDER_TRAVERSAL],
        }],
    },
];
