//! TUI pane rendering modules
//!
//! - [`visual`]: one renderer per snapshot mode, plus mode dispatch
//! - [`source`]: solution code with syntax highlighting and current line
//! - [`info`]: problem description, inputs and approaches
//! - [`status`]: status bar with keybindings and playback state
//!
//! Every pane is a free function over borrowed data; scroll state is the
//! only thing a pane writes back.

pub mod info;
pub mod source;
pub mod status;
pub mod visual;

pub use info::render_info_pane;
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use visual::{
    render_array, render_hash_map, render_linked_list, render_snapshot, render_text, render_tree,
};
