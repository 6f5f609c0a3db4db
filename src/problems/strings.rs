//! String and pattern-matching problems

use crate::generator::{GenerationError, Inputs};
use crate::registry::{Approach, DefaultInput, Difficulty, ProblemEntry, ProblemMeta};
use crate::snapshot::{Action, Snapshot, TextState, Trace, TraceBuilder};
use crate::ui::panes::visual::render_text;

pub const NAIVE_STRING_MATCH: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "naive-string-match",
        title: "Find All Pattern Occurrences",
        difficulty: Difficulty::Easy,
        description: "Report every index where pattern occurs in text by aligning the \
                      pattern at each start position and comparing character by character.",
        constraints: &["1 <= pattern.length <= text.length <= 10^4"],
        default_inputs: &[
            ("text", DefaultInput::Text("abracadabra")),
            ("pattern", DefaultInput::Text("abra")),
        ],
        default_code: r#"function findAll(text, pattern) {
  const matches = [];
  for (let i = 0; i + pattern.length <= text.length; i++) {
    let j = 0;
    while (j < pattern.length && text[i + j] === pattern[j]) {
      j++;
    }
    if (j === pattern.length) {
      matches.push(i);
    }
  }
  return matches;
}"#,
        entry_point: None,
        approaches: &[
            Approach {
                name: "Naive alignment",
                time: "O(n*m)",
                space: "O(1)",
                summary: "Try every alignment and stop at the first mismatch.",
            },
            Approach {
                name: "KMP",
                time: "O(n+m)",
                space: "O(m)",
                summary: "Reuse the longest proper prefix-suffix to avoid re-scanning text.",
            },
        ],
    },
    generate: naive_string_match,
    render: render_text,
};

fn naive_string_match(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let text = inputs.text("text")?;
    let pattern = inputs.text("pattern")?;
    generate_naive_string_match_steps(&text, &pattern)
}

pub fn generate_naive_string_match_steps(text: &str, pattern: &str) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let t: Vec<char> = text.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    let base = TextState::new(text, pattern);

    if p.is_empty() {
        return Ok(trace.finish(
            Snapshot::text("The pattern is empty: there is nothing to search for", base)
                .with_action(Action::Done),
        )?);
    }
    if p.len() > t.len() {
        return Ok(trace.finish(
            Snapshot::text(
                format!(
                    "The pattern ({} chars) is longer than the text ({} chars): no matches",
                    p.len(),
                    t.len()
                ),
                base,
            )
            .with_action(Action::NotFound),
        )?);
    }

    let mut matches: Vec<usize> = Vec::new();
    trace.push(
        Snapshot::text(
            format!("Slide \"{}\" across \"{}\"", pattern, text),
            base.clone().at(Some(0), Some(0)).data("start", 0),
        )
        .with_action(Action::Init),
    )?;

    for start in 0..=(t.len() - p.len()) {
        let mut j = 0;
        while j < p.len() {
            let at = base
                .clone()
                .at(Some(start + j), Some(j))
                .matches(&matches)
                .data("start", start as i64);
            if t[start + j] == p[j] {
                trace.push(
                    Snapshot::text(
                        format!("text[{}] = '{}' matches pattern[{}]", start + j, t[start + j], j),
                        at,
                    )
                    .with_action(Action::Match),
                )?;
                j += 1;
            } else {
                trace.push(
                    Snapshot::text(
                        format!(
                            "text[{}] = '{}' differs from pattern[{}] = '{}': shift to start {}",
                            start + j,
                            t[start + j],
                            j,
                            p[j],
                            start + 1
                        ),
                        at,
                    )
                    .with_action(Action::Mismatch),
                )?;
                break;
            }
        }
        if j == p.len() {
            matches.push(start);
            trace.push(
                Snapshot::text(
                    format!("Full match at index {}", start),
                    base.clone()
                        .at(Some(start), None)
                        .matches(&matches)
                        .data("start", start as i64),
                )
                .with_action(Action::Found),
            )?;
        }
    }

    let summary = if matches.is_empty() {
        format!("\"{}\" does not occur in the text", pattern)
    } else {
        format!("\"{}\" occurs at {:?}", pattern, matches)
    };
    Ok(trace.finish(
        Snapshot::text(summary, base.matches(&matches).data("result", matches.clone()))
            .with_action(Action::Done),
    )?)
}

pub const VALID_PALINDROME: ProblemEntry = ProblemEntry {
    meta: ProblemMeta {
        id: "valid-palindrome",
        title: "Valid Palindrome",
        difficulty: Difficulty::Easy,
        description: "After lower-casing and ignoring non-alphanumeric characters, decide \
                      whether the string reads the same forwards and backwards.",
        constraints: &["1 <= s.length <= 2 * 10^5"],
        default_inputs: &[("s", DefaultInput::Text("A man, a plan, a canal: Panama"))],
        default_code: r#"function isPalindrome(s) {
  let left = 0;
  let right = s.length - 1;
  while (left < right) {
    if (s[left].toLowerCase() !== s[right].toLowerCase()) {
      return false;
    }
    left++;
    right--;
  }
  return true;
}"#,
        entry_point: None,
        approaches: &[Approach {
            name: "Converging pointers",
            time: "O(n)",
            space: "O(1)",
            summary: "Skip characters that do not count and compare the two ends.",
        }],
    },
    generate: valid_palindrome,
    render: render_text,
};

fn valid_palindrome(inputs: &Inputs) -> Result<Trace, GenerationError> {
    let s = inputs.text("s")?;
    generate_valid_palindrome_steps(&s)
}

pub fn generate_valid_palindrome_steps(s: &str) -> Result<Trace, GenerationError> {
    let mut trace = TraceBuilder::default();
    let chars: Vec<char> = s.chars().collect();
    let base = TextState::new(s, "");

    if chars.is_empty() {
        return Ok(trace.finish(
            Snapshot::text("The empty string is a palindrome", base.data("result", true))
                .with_action(Action::Done),
        )?);
    }

    let mut left = 0usize;
    let mut right = chars.len() - 1;
    let pair = |left: usize, right: usize| {
        base.clone()
            .at(Some(left), None)
            .highlight(&[left, right])
            .data("left", left as i64)
            .data("right", right as i64)
    };

    trace.push(
        Snapshot::text(
            format!("Compare from both ends: left = 0, right = {}", right),
            pair(left, right),
        )
        .with_action(Action::Init),
    )?;

    while left < right {
        if !chars[left].is_alphanumeric() {
            left += 1;
            trace.push(
                Snapshot::text(format!("Skip non-alphanumeric at {}", left - 1), pair(left, right))
                    .with_action(Action::Move),
            )?;
            continue;
        }
        if !chars[right].is_alphanumeric() {
            right -= 1;
            trace.push(
                Snapshot::text(format!("Skip non-alphanumeric at {}", right + 1), pair(left, right))
                    .with_action(Action::Move),
            )?;
            continue;
        }

        let a = chars[left].to_lowercase().collect::<String>();
        let b = chars[right].to_lowercase().collect::<String>();
        if a != b {
            return Ok(trace.finish(
                Snapshot::text(
                    format!("'{}' != '{}' at {} and {}: not a palindrome", a, b, left, right),
                    pair(left, right).data("result", false),
                )
                .with_action(Action::Mismatch),
            )?);
        }
        trace.push(
            Snapshot::text(
                format!("'{}' == '{}' at {} and {}", a, b, left, right),
                pair(left, right),
            )
            .with_action(Action::Match),
        )?;
        left += 1;
        right -= 1;
    }

    Ok(trace.finish(
        Snapshot::text(
            "Pointers met without a mismatch: it is a palindrome",
            base.data("result", true),
        )
        .with_action(Action::Done),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotState;

    #[test]
    fn test_naive_match_positions() {
        let trace = generate_naive_string_match_steps("abracadabra", "abra").unwrap();
        match &trace.last().state {
            SnapshotState::Text(s) => assert_eq!(s.matches, vec![0, 7]),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_naive_match_degenerate() {
        assert_eq!(generate_naive_string_match_steps("abc", "").unwrap().len(), 1);
        assert_eq!(generate_naive_string_match_steps("ab", "abc").unwrap().len(), 1);
    }

    #[test]
    fn test_palindrome() {
        let yes = generate_valid_palindrome_steps("A man, a plan, a canal: Panama").unwrap();
        assert_eq!(yes.last().action, Some(Action::Done));
        let no = generate_valid_palindrome_steps("race a car").unwrap();
        assert_eq!(no.last().action, Some(Action::Mismatch));
    }
}
