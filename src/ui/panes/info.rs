//! Problem pane: title, difficulty, description, inputs and approaches

use crate::generator::Inputs;
use crate::registry::{Difficulty, ResolvedProblem};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

fn difficulty_style(difficulty: Difficulty) -> Style {
    let color = match difficulty {
        Difficulty::Easy => DEFAULT_THEME.success,
        Difficulty::Medium => DEFAULT_THEME.secondary,
        Difficulty::Hard => DEFAULT_THEME.error,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD),
    ))
}

pub(crate) fn info_lines(problem: &ResolvedProblem, inputs: &Inputs) -> Vec<Line<'static>> {
    let meta = problem.meta();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                meta.title.to_string(),
                Style::default().fg(DEFAULT_THEME.fg).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(meta.difficulty.to_string(), difficulty_style(meta.difficulty)),
        ]),
        Line::from(Span::styled(
            format!("{} › {}", problem.topic.title, problem.pattern.title),
            Style::default().fg(DEFAULT_THEME.comment),
        )),
        Line::default(),
        Line::from(meta.description.to_string()),
    ];

    if !meta.constraints.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Constraints"));
        lines.extend(meta.constraints.iter().map(|c| Line::from(format!("• {}", c))));
    }

    lines.push(Line::default());
    lines.push(heading("Inputs"));
    for (name, value) in inputs.iter() {
        let rendered = serde_json::to_string(value).unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(format!("{} = ", name), Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(rendered, Style::default().fg(DEFAULT_THEME.number)),
        ]));
    }

    if !meta.approaches.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Approaches"));
        for approach in meta.approaches {
            lines.push(Line::from(vec![
                Span::styled(
                    approach.name.to_string(),
                    Style::default().fg(DEFAULT_THEME.function),
                ),
                Span::styled(
                    format!("  time {} · space {}", approach.time, approach.space),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
            ]));
            lines.push(Line::from(format!("  {}", approach.summary)));
        }
    }
    lines
}

pub fn render_info_pane(
    frame: &mut Frame,
    area: Rect,
    problem: Option<&ResolvedProblem>,
    inputs: &Inputs,
) {
    let block = Block::default()
        .title(" Problem ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal))
        .padding(Padding::new(1, 1, 0, 0));

    let paragraph = match problem {
        Some(problem) => Paragraph::new(info_lines(problem, inputs)),
        None => Paragraph::new("No visualizer is registered for this problem")
            .style(Style::default().fg(DEFAULT_THEME.comment)),
    };
    frame.render_widget(paragraph.block(block).wrap(Wrap { trim: true }), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::resolve;

    #[test]
    fn test_info_lists_inputs_and_approaches() {
        let problem = resolve("hashing", "hash-map", "two-sum").unwrap();
        let text: Vec<String> = info_lines(&problem, &problem.meta().default_inputs())
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l.starts_with("target = ")));
        assert!(text.iter().any(|l| l == "Approaches"));
    }
}
