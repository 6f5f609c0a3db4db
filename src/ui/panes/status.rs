//! Status bar rendering with keybindings and playback indicators

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub is_error: bool,
    pub current_step: usize,
    pub total_steps: usize,
    pub is_playing: bool,
    pub is_override: bool,
    /// Whether the problem accepts custom code
    pub can_run: bool,
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData<'_>) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let step_text = if data.total_steps == 0 {
        " Step -/- ".to_string()
    } else {
        format!(" Step {}/{} ", data.current_step + 1, data.total_steps)
    };

    let left_spans = vec![
        Span::styled(
            step_text,
            Style::default()
                .bg(if data.is_error {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.primary
                })
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!(" {} ", data.message),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(if data.is_error {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.fg
                }),
        ),
    ];

    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let mut keys: Vec<(&str, &str)> = vec![
        (" ←/→ ", " step "),
        (" ⎵ ", " play "),
        (" ↵ / ⌫ ", " end/start "),
    ];
    if data.can_run {
        keys.push((" r ", " run code "));
    }
    if data.is_override {
        keys.push((" o ", " original "));
    }
    keys.push((" q ", " quit "));

    let mut right_spans = Vec::new();
    for (i, (key, desc)) in keys.into_iter().enumerate() {
        if i > 0 {
            right_spans.push(Span::styled("│", sep_style));
            right_spans.push(Span::styled(" ", desc_style));
        }
        right_spans.push(Span::styled(key, key_style));
        right_spans.push(Span::styled(desc, desc_style));
    }

    let tag = |text: &'static str, bg: Color| {
        Span::styled(
            text,
            Style::default()
                .bg(bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
    };

    if data.is_override {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(tag(" ✎ YOUR CODE ", DEFAULT_THEME.override_tag));
    }

    let at_start = data.current_step == 0;
    let at_end = data.total_steps > 0 && data.current_step + 1 >= data.total_steps;
    let state_tag = if data.is_playing {
        Some(tag(" ▶ PLAYING ", DEFAULT_THEME.secondary))
    } else if at_end {
        Some(tag(" END ", DEFAULT_THEME.error))
    } else if at_start {
        Some(tag(" START ", DEFAULT_THEME.success))
    } else {
        None
    };
    if let Some(state_tag) = state_tag {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(state_tag);
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            .alignment(Alignment::Right),
        layout[1],
    );
}
