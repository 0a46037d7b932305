//! Terminal front end for the screen models.
//!
//! # Module Structure
//!
//! - `loop_runner` - TUI event loop and terminal management, plus the settle
//!   helpers one-shot commands use
//! - `input` - Keyboard input handling
//! - `render` - View rendering dispatch and the confirmation dialog
//! - `items` - Item list widgets for Home, Favorites and Featured
//! - `detail` - Detail view widget
//! - `status` - Status bar widget
//! - `lines` - Styled lines shared by the widgets and the one-shot commands

mod detail;
mod input;
mod items;
mod lines;
mod loop_runner;
mod render;
mod status;

use loop_runner::Action;

pub use input::read_confirmation;
pub use lines::{
    category_line, detail_lines, item_line, load_state_line, notice_line, NAME_WIDTH,
};
pub use loop_runner::{open, run, Settled, EVENT_CHANNEL_CAPACITY};
