//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! - **[`app`]**: application state and the keyboard/playback event loop
//! - **[`panes`]**: stateless render functions for the visual, source, problem
//!   and status panes
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! Construct an [`App`] around a [`PlaybackController`] and call [`App::run`].
//!
//! [`PlaybackController`]: crate::playback::PlaybackController
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
