//! Per-mode snapshot renderers
//!
//! Each renderer draws one [`Snapshot`] into the visual pane and never
//! mutates it. Renderers are registered per problem, but every one of them
//! tolerates any mode: a snapshot that is not of the expected shape (an
//! explanatory `Blank` step, or an override trace from user code) is handed
//! to [`render_snapshot`], which dispatches on the actual variant.

use crate::snapshot::{
    ArrayState, DataBag, HashMapState, LinkedListState, Snapshot, SnapshotState, TextState, TreeState,
};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use std::collections::BTreeMap;

/// Tallest bar drawn above an array
const MAX_BAR_ROWS: usize = 8;

/// Draw whatever `snapshot` holds
pub fn render_snapshot(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    match &snapshot.state {
        SnapshotState::Array(state) => draw_array(frame, area, snapshot, state),
        SnapshotState::HashMap(state) => draw_hash_map(frame, area, snapshot, state),
        SnapshotState::Text(state) => draw_text(frame, area, snapshot, state),
        SnapshotState::LinkedList(state) => draw_linked_list(frame, area, snapshot, state),
        SnapshotState::Tree(state) => draw_tree(frame, area, snapshot, state),
        SnapshotState::Blank => draw_lines(frame, area, snapshot, Vec::new()),
    }
}

pub fn render_array(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    match &snapshot.state {
        SnapshotState::Array(state) => draw_array(frame, area, snapshot, state),
        _ => render_snapshot(frame, area, snapshot),
    }
}

pub fn render_hash_map(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    match &snapshot.state {
        SnapshotState::HashMap(state) => draw_hash_map(frame, area, snapshot, state),
        _ => render_snapshot(frame, area, snapshot),
    }
}

pub fn render_text(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    match &snapshot.state {
        SnapshotState::Text(state) => draw_text(frame, area, snapshot, state),
        _ => render_snapshot(frame, area, snapshot),
    }
}

pub fn render_linked_list(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    match &snapshot.state {
        SnapshotState::LinkedList(state) => draw_linked_list(frame, area, snapshot, state),
        _ => render_snapshot(frame, area, snapshot),
    }
}

pub fn render_tree(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    match &snapshot.state {
        SnapshotState::Tree(state) => draw_tree(frame, area, snapshot, state),
        _ => render_snapshot(frame, area, snapshot),
    }
}

fn pane_block(snapshot: &Snapshot) -> Block<'static> {
    let mut title = format!(" {} ", snapshot.mode().as_str());
    if let Some(action) = snapshot.action {
        title.push_str(&format!("· {} ", action.as_str()));
    }
    let border = if snapshot.is_complete {
        DEFAULT_THEME.success
    } else {
        DEFAULT_THEME.border_normal
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn message_line(snapshot: &Snapshot) -> Line<'static> {
    let style = if snapshot.is_complete {
        Style::default()
            .fg(DEFAULT_THEME.success)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    };
    Line::from(Span::styled(snapshot.message.clone(), style))
}

fn data_line(data: &DataBag) -> Option<Line<'static>> {
    if data.is_empty() {
        return None;
    }
    let mut spans = Vec::new();
    for (i, (key, value)) in data.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ·  ", Style::default().fg(DEFAULT_THEME.comment)));
        }
        spans.push(Span::styled(format!("{} = ", key), Style::default().fg(DEFAULT_THEME.comment)));
        spans.push(Span::styled(value.to_string(), Style::default().fg(DEFAULT_THEME.number)));
    }
    Some(Line::from(spans))
}

/// Message on top, then `body`, all inside the pane block
fn draw_lines(frame: &mut Frame, area: Rect, snapshot: &Snapshot, body: Vec<Line<'static>>) {
    let mut lines = vec![message_line(snapshot), Line::default()];
    lines.extend(body);
    let paragraph = Paragraph::new(lines)
        .block(pane_block(snapshot))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn cell_width(values: &[i64]) -> usize {
    values
        .iter()
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(1)
        .max(2)
        + 2
}

/// Value row, index row and one `↑ name` row per pointer
fn array_rows(
    values: &[i64],
    highlights: &[usize],
    pointers: &BTreeMap<String, i64>,
    bar_rows: usize,
) -> Vec<Line<'static>> {
    let width = cell_width(values);
    let mut lines = Vec::new();

    let style_for = |i: usize| {
        if highlights.contains(&i) {
            Style::default()
                .fg(DEFAULT_THEME.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DEFAULT_THEME.bar)
        }
    };

    let max = values.iter().copied().map(i64::abs).max().unwrap_or(0);
    if bar_rows > 0 && max > 0 {
        for row in (1..=bar_rows).rev() {
            let spans: Vec<Span> = values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let height = ((v.max(0) as f64 / max as f64) * bar_rows as f64).ceil() as usize;
                    let glyph = if height >= row { "█" } else { " " };
                    Span::styled(
                        format!(" {} ", glyph.repeat(width - 2)),
                        style_for(i),
                    )
                })
                .collect();
            lines.push(Line::from(spans));
        }
    }

    lines.push(Line::from(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Span::styled(format!("{:^width$}", v, width = width), style_for(i)))
            .collect::<Vec<_>>(),
    ));
    lines.push(Line::from(Span::styled(
        (0..values.len())
            .map(|i| format!("{:^width$}", i, width = width))
            .collect::<String>(),
        Style::default().fg(DEFAULT_THEME.comment),
    )));

    let pointer_style = Style::default()
        .fg(DEFAULT_THEME.pointer)
        .add_modifier(Modifier::BOLD);
    for (name, &index) in pointers {
        let line = match usize::try_from(index).ok().filter(|&i| i < values.len()) {
            Some(i) => format!("{}↑ {}", " ".repeat(i * width + width / 2), name),
            None => format!("  {} = {} (outside the array)", name, index),
        };
        lines.push(Line::from(Span::styled(line, pointer_style)));
    }
    lines
}

fn draw_array(frame: &mut Frame, area: Rect, snapshot: &Snapshot, state: &ArrayState) {
    let spare = (area.height as usize).saturating_sub(8 + state.pointers.len());
    let mut body = array_rows(
        &state.array,
        &state.highlights,
        &state.pointers,
        spare.min(MAX_BAR_ROWS),
    );
    if let Some(data) = data_line(&state.data) {
        body.push(Line::default());
        body.push(data);
    }
    draw_lines(frame, area, snapshot, body);
}

fn draw_hash_map(frame: &mut Frame, area: Rect, snapshot: &Snapshot, state: &HashMapState) {
    let block = pane_block(snapshot);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut top = vec![message_line(snapshot), Line::default()];
    if !state.array.is_empty() {
        top.extend(array_rows(&state.array, &state.highlights, &state.pointers, 0));
    }
    if let Some(data) = data_line(&state.data) {
        top.push(data);
    }
    let top_height = top.len() as u16 + 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(top_height), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(Paragraph::new(top), chunks[0]);

    let header = Row::new(vec![Cell::from("key"), Cell::from("value")]).style(
        Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = state
        .entries
        .iter()
        .map(|entry| {
            let active = state.active_key.as_deref() == Some(entry.key.as_str());
            let style = if active {
                Style::default()
                    .fg(DEFAULT_THEME.highlight)
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            Row::new(vec![Cell::from(entry.key.clone()), Cell::from(entry.value.clone())]).style(style)
        })
        .collect();
    let title = match &state.active_key {
        Some(key) if !state.entries.iter().any(|e| &e.key == key) => {
            format!(" map ({} entries, looking up {}: absent) ", state.entries.len(), key)
        }
        Some(key) => format!(" map ({} entries, looking up {}) ", state.entries.len(), key),
        None => format!(" map ({} entries) ", state.entries.len()),
    };
    let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
        .header(header)
        .block(Block::default().title(title).borders(Borders::TOP));
    frame.render_widget(table, chunks[1]);
}

fn draw_text(frame: &mut Frame, area: Rect, snapshot: &Snapshot, state: &TextState) {
    let chars: Vec<char> = state.text.chars().collect();
    let matched = |i: usize| {
        let len = state.pattern.chars().count().max(1);
        state.matches.iter().any(|&m| i >= m && i < m + len)
    };

    let text_spans: Vec<Span> = chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let style = if Some(i) == state.text_index {
                Style::default()
                    .fg(DEFAULT_THEME.pointer)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else if state.highlights.contains(&i) {
                Style::default()
                    .fg(DEFAULT_THEME.highlight)
                    .add_modifier(Modifier::BOLD)
            } else if matched(i) {
                Style::default().fg(DEFAULT_THEME.visited)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            Span::styled(format!(" {} ", c), style)
        })
        .collect();

    let mut body = vec![
        Line::from(text_spans),
        Line::from(Span::styled(
            (0..chars.len()).map(|i| format!("{:^3}", i % 100)).collect::<String>(),
            Style::default().fg(DEFAULT_THEME.comment),
        )),
    ];

    if !state.pattern.is_empty() {
        let offset = match (state.text_index, state.pattern_index) {
            (Some(t), Some(p)) => t.saturating_sub(p),
            (Some(t), None) => t,
            _ => 0,
        };
        let mut spans = vec![Span::raw("   ".repeat(offset))];
        for (j, c) in state.pattern.chars().enumerate() {
            let style = if Some(j) == state.pattern_index {
                Style::default()
                    .fg(DEFAULT_THEME.pointer)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(DEFAULT_THEME.string)
            };
            spans.push(Span::styled(format!(" {} ", c), style));
        }
        body.push(Line::default());
        body.push(Line::from(spans));
    }

    if !state.matches.is_empty() {
        body.push(Line::default());
        body.push(Line::from(Span::styled(
            format!("matches at {:?}", state.matches),
            Style::default().fg(DEFAULT_THEME.visited),
        )));
    }
    if let Some(data) = data_line(&state.data) {
        body.push(Line::default());
        body.push(data);
    }
    draw_lines(frame, area, snapshot, body);
}

fn draw_linked_list(frame: &mut Frame, area: Rect, snapshot: &Snapshot, state: &LinkedListState) {
    let pointer_names = |id: usize| -> Vec<&str> {
        state
            .pointers
            .iter()
            .filter(|(_, target)| **target == Some(id))
            .map(|(name, _)| name.as_str())
            .collect()
    };

    let mut body = Vec::new();

    // Chain reachable from head
    let mut chain = vec![Span::styled("head → ", Style::default().fg(DEFAULT_THEME.comment))];
    let mut seen = Vec::new();
    let mut cursor = state.head;
    while let Some(id) = cursor {
        if seen.contains(&id) {
            chain.push(Span::styled("↺", Style::default().fg(DEFAULT_THEME.error)));
            break;
        }
        seen.push(id);
        let Some(node) = state.nodes.get(id) else { break };
        let style = if pointer_names(id).is_empty() {
            Style::default().fg(DEFAULT_THEME.bar)
        } else {
            Style::default()
                .fg(DEFAULT_THEME.highlight)
                .add_modifier(Modifier::BOLD)
        };
        chain.push(Span::styled(format!("[{}]", node.value), style));
        chain.push(Span::styled(" → ", Style::default().fg(DEFAULT_THEME.comment)));
        cursor = node.next;
    }
    chain.push(Span::styled("null", Style::default().fg(DEFAULT_THEME.comment)));
    body.push(Line::from(chain));
    body.push(Line::default());

    // Every node, including ones already detached from the head chain
    for node in &state.nodes {
        let next = node
            .next
            .and_then(|n| state.nodes.get(n))
            .map_or("null".to_string(), |n| format!("[{}]", n.value));
        let names = pointer_names(node.id);
        let mut spans = vec![
            Span::styled(format!("[{}]", node.value), Style::default().fg(DEFAULT_THEME.bar)),
            Span::styled(format!(" .next → {}", next), Style::default().fg(DEFAULT_THEME.comment)),
        ];
        if !names.is_empty() {
            spans.push(Span::styled(
                format!("   ← {}", names.join(", ")),
                Style::default()
                    .fg(DEFAULT_THEME.pointer)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        body.push(Line::from(spans));
    }

    let nulls: Vec<&str> = state
        .pointers
        .iter()
        .filter(|(_, target)| target.is_none())
        .map(|(name, _)| name.as_str())
        .collect();
    if !nulls.is_empty() {
        body.push(Line::from(Span::styled(
            format!("null ← {}", nulls.join(", ")),
            Style::default().fg(DEFAULT_THEME.pointer),
        )));
    }
    draw_lines(frame, area, snapshot, body);
}

fn draw_tree(frame: &mut Frame, area: Rect, snapshot: &Snapshot, state: &TreeState) {
    let mut body = Vec::new();
    if let Some(root) = state.root {
        tree_lines(state, root, String::new(), true, true, &mut body, 0);
    } else {
        body.push(Line::from(Span::styled(
            "(empty tree)",
            Style::default().fg(DEFAULT_THEME.comment),
        )));
    }

    body.push(Line::default());
    body.push(Line::from(vec![
        Span::styled("order: ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(
            state
                .order
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            Style::default().fg(DEFAULT_THEME.visited),
        ),
    ]));
    draw_lines(frame, area, snapshot, body);
}

/// Indented outline: `├─` / `└─` connectors, current node marked `▶`, visited `✓`
fn tree_lines(
    state: &TreeState,
    id: usize,
    prefix: String,
    is_last: bool,
    is_root: bool,
    out: &mut Vec<Line<'static>>,
    depth: usize,
) {
    let Some(node) = state.nodes.get(id) else { return };
    if depth > state.nodes.len() {
        return;
    }

    let connector = if is_root {
        ""
    } else if is_last {
        "└─ "
    } else {
        "├─ "
    };
    let (marker, style) = if state.current == Some(id) {
        (
            "▶ ",
            Style::default()
                .fg(DEFAULT_THEME.highlight)
                .add_modifier(Modifier::BOLD),
        )
    } else if state.visited.contains(&id) {
        ("✓ ", Style::default().fg(DEFAULT_THEME.visited))
    } else {
        ("", Style::default().fg(DEFAULT_THEME.bar))
    };

    out.push(Line::from(vec![
        Span::styled(format!("{}{}", prefix, connector), Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(format!("{}{}", marker, node.value), style),
    ]));

    let child_prefix = if is_root {
        prefix
    } else if is_last {
        format!("{}   ", prefix)
    } else {
        format!("{}│  ", prefix)
    };
    let children: Vec<usize> = [node.left, node.right].into_iter().flatten().collect();
    for (i, child) in children.iter().enumerate() {
        tree_lines(
            state,
            *child,
            child_prefix.clone(),
            i + 1 == children.len(),
            false,
            out,
            depth + 1,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Action, ListNode, TreeNode};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn draw(render: fn(&mut Frame, Rect, &Snapshot), snapshot: &Snapshot) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render(f, area, snapshot)
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>() + "\n")
            .collect()
    }

    #[test]
    fn test_array_shows_values_and_pointers() {
        let state = ArrayState::new(vec![2, 5, 8]).pointer("mid", 1).highlight(&[1]);
        let snapshot = Snapshot::array("Checking middle", state).with_action(Action::Compare);
        let text = draw(render_array, &snapshot);
        assert!(text.contains("Checking middle"));
        assert!(text.contains("↑ mid"));
        assert!(text.contains('8'));
    }

    #[test]
    fn test_array_renderer_tolerates_blank() {
        let snapshot = Snapshot::blank("Nothing to show");
        let text = draw(render_array, &snapshot);
        assert!(text.contains("Nothing to show"));
    }

    #[test]
    fn test_hash_map_table() {
        let state = HashMapState::new(vec![2, 7]).entries(&[(2, 0)]).active(7);
        let snapshot = Snapshot::hash_map("Lookup", state);
        let text = draw(render_hash_map, &snapshot);
        assert!(text.contains("looking up 7: absent"));
    }

    #[test]
    fn test_linked_list_chain() {
        let state = LinkedListState {
            nodes: vec![
                ListNode { id: 0, value: 1, next: Some(1) },
                ListNode { id: 1, value: 2, next: None },
            ],
            head: Some(0),
            pointers: [("curr".to_string(), Some(1)), ("prev".to_string(), None)].into_iter().collect(),
        };
        let text = draw(render_linked_list, &Snapshot::linked_list("Walk", state));
        assert!(text.contains("[1] → [2] → null"));
        assert!(text.contains("null ← prev"));
    }

    #[test]
    fn test_tree_outline() {
        let state = TreeState {
            nodes: vec![
                TreeNode { id: 0, value: 4, left: Some(1), right: None },
                TreeNode { id: 1, value: 2, left: None, right: None },
            ],
            root: Some(0),
            visited: vec![1],
            current: Some(0),
            order: vec![2],
        };
        let text = draw(render_tree, &Snapshot::tree("Visit", state));
        assert!(text.contains("▶ 4"));
        assert!(text.contains("└─ ✓ 2"));
    }
}
