//! Main TUI application state and logic

use crate::instrument::ExecutionLimits;
use crate::playback::PlaybackController;
use crate::snapshot::Snapshot;
use crate::ui::panes::{
    render_info_pane, render_snapshot, render_source_pane, render_status_bar, SourceRenderData,
    SourceScrollState, StatusRenderData,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Delay between automatic steps while playing
const PLAY_INTERVAL: Duration = Duration::from_millis(800);

/// Ignore repeated Space presses closer together than this
const SPACE_DEBOUNCE: Duration = Duration::from_millis(200);

fn displayed_code<'a>(controller: &'a PlaybackController, user_code: Option<&'a str>) -> &'a str {
    match user_code {
        Some(code) if controller.is_overridden() => code,
        _ => controller
            .problem()
            .map_or("", |problem| problem.meta().default_code),
    }
}

/// The main application state
pub struct App {
    pub controller: PlaybackController,

    /// Code submitted with `r`, if any
    pub user_code: Option<String>,

    pub limits: ExecutionLimits,

    pub source_scroll: SourceScrollState,

    pub should_quit: bool,

    pub status_message: String,

    /// Whether `status_message` reports a failure
    pub is_error: bool,

    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(controller: PlaybackController, user_code: Option<String>, limits: ExecutionLimits) -> Self {
        let status_message = match controller.problem() {
            Some(problem) => format!("Loaded {}", problem.meta().title),
            None => "No visualizer available".to_string(),
        };
        let earlier = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);
        App {
            controller,
            user_code,
            limits,
            source_scroll: SourceScrollState::default(),
            should_quit: false,
            status_message,
            is_error: false,
            is_playing: false,
            last_play_time: earlier,
            last_space_press: earlier,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                self.tick_playback();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Advance one step in play mode; stop at the end
    pub fn tick_playback(&mut self) {
        if self.controller.next() {
            self.set_status("Playing...");
        } else {
            self.is_playing = false;
            self.set_status("Playback complete");
        }
        self.last_play_time = Instant::now();
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.is_error = false;
    }

    fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.is_error = true;
    }

    /// Code shown in the source pane: the user's while their trace is active
    pub fn displayed_code(&self) -> &str {
        displayed_code(&self.controller, self.user_code.as_deref())
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(main_chunks[0]);

        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[0]);

        let fallback;
        let snapshot = match self.controller.current() {
            Some(snapshot) => snapshot,
            None => {
                fallback = Snapshot::blank("Nothing to visualize");
                &fallback
            }
        };
        match self.controller.problem() {
            Some(problem) => (problem.renderer())(frame, left_rows[0], snapshot),
            None => render_snapshot(frame, left_rows[0], snapshot),
        }

        let is_override = self.controller.is_overridden();
        let source = SourceRenderData {
            title: if is_override { "Your Code" } else { "Solution" },
            source_code: displayed_code(&self.controller, self.user_code.as_deref()),
            current_line: snapshot.source_line,
            is_override,
        };
        render_source_pane(frame, left_rows[1], &source, &mut self.source_scroll);

        render_info_pane(
            frame,
            columns[1],
            self.controller.problem(),
            self.controller.inputs(),
        );

        let status = StatusRenderData {
            message: &self.status_message,
            is_error: self.is_error,
            current_step: self.controller.index(),
            total_steps: self.controller.len(),
            is_playing: self.is_playing,
            is_override,
            can_run: self.user_code.is_some()
                && self
                    .controller
                    .problem()
                    .is_some_and(|p| p.meta().entry_point.is_some()),
        };
        render_status_bar(frame, main_chunks[1], &status);
    }

    /// Handle one key press
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // Number keys jump straight to step N
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).map_or(1, i64::from);
                self.controller.go_to(n - 1);
                self.set_status(format!("Jumped to step {}", self.controller.index() + 1));
            }
            KeyCode::Left => {
                self.is_playing = false;
                if self.controller.prev() {
                    self.set_status("Stepped backward");
                } else {
                    self.set_status("Already at the first step");
                }
            }
            KeyCode::Right => {
                self.is_playing = false;
                if self.controller.next() {
                    self.set_status("Stepped forward");
                } else {
                    self.set_status("Already at the last step");
                }
            }
            KeyCode::Up => {
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row = Some(row.saturating_add(1));
                }
            }
            KeyCode::Down => {
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                }
            }
            KeyCode::Char(' ') => {
                if self.last_space_press.elapsed() >= SPACE_DEBOUNCE {
                    self.last_space_press = Instant::now();
                    self.toggle_play();
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.controller.go_to_end();
                self.set_status("Jumped to end");
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.controller.reset();
                self.set_status("Jumped to start");
            }
            KeyCode::Char('r') => self.run_user_code(),
            KeyCode::Char('o') => {
                if self.controller.is_overridden() {
                    self.is_playing = false;
                    self.controller.clear_override();
                    self.set_status("Showing the built-in trace");
                }
            }
            _ => {}
        }
    }

    fn toggle_play(&mut self) {
        if self.is_playing {
            self.is_playing = false;
            self.set_status("Paused");
            return;
        }
        if self.controller.is_at_end() {
            self.controller.reset();
        }
        self.is_playing = true;
        self.last_play_time = Instant::now();
        self.set_status("Playing...");
    }

    fn run_user_code(&mut self) {
        let Some(code) = self.user_code.clone() else {
            self.set_error("No code file was given (use --code)");
            return;
        };
        self.is_playing = false;
        match self.controller.run_instrumented(&code, &self.limits) {
            Ok(steps) => self.set_status(format!("Recorded {} steps from your code", steps)),
            Err(message) => self.set_error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::resolve;
    use crossterm::event::KeyModifiers;

    const BINARY_SEARCH: &str = r#"
function binarySearch(nums, target) {
  let left = 0;
  let right = nums.length - 1;
  while (left <= right) {
    const mid = Math.floor((left + right) / 2);
    if (nums[mid] === target) return mid;
    if (nums[mid] < target) left = mid + 1;
    else right = mid - 1;
  }
  return -1;
}
"#;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app(code: Option<&str>) -> App {
        let controller =
            PlaybackController::new(resolve("arrays", "binary-search", "binary-search-visualizer"));
        App::new(controller, code.map(str::to_string), ExecutionLimits::default())
    }

    #[test]
    fn test_arrow_and_jump_keys() {
        let mut app = app(None);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.controller.index(), 1);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.controller.index(), 0);
        assert_eq!(app.status_message, "Already at the first step");

        press(&mut app, KeyCode::Enter);
        assert!(app.controller.is_at_end());
        press(&mut app, KeyCode::Backspace);
        assert!(app.controller.is_at_start());

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.controller.index(), 2.min(app.controller.len() - 1));
    }

    #[test]
    fn test_play_stops_at_end() {
        let mut app = app(None);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.is_playing);
        for _ in 0..app.controller.len() + 1 {
            app.tick_playback();
        }
        assert!(!app.is_playing);
        assert!(app.controller.is_at_end());
    }

    #[test]
    fn test_run_and_clear_override() {
        let mut app = app(Some(BINARY_SEARCH));
        press(&mut app, KeyCode::Char('r'));
        assert!(!app.is_error, "{}", app.status_message);
        assert!(app.controller.is_overridden());
        assert_eq!(app.displayed_code(), BINARY_SEARCH);

        press(&mut app, KeyCode::Char('o'));
        assert!(!app.controller.is_overridden());
        assert_ne!(app.displayed_code(), BINARY_SEARCH);
    }

    #[test]
    fn test_run_failure_keeps_trace() {
        let mut app = app(Some("function binarySearch(nums, target) { return nums.foo(); }"));
        let before = app.controller.len();
        press(&mut app, KeyCode::Char('r'));
        assert!(app.is_error);
        assert!(!app.controller.is_overridden());
        assert_eq!(app.controller.len(), before);
    }

    #[test]
    fn test_quit() {
        let mut app = app(None);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
