//! Catalog browser with locally persisted favorites.
//!
//! - [`catalog`] fetches the remote item list and derives the filtered view
//! - [`favorites`] is the single read/modify/write contract over the
//!   persisted favorites blob
//! - [`screens`] holds the per-screen models built on both
//! - [`storage`] is the SQLite key-value backend
//! - [`app`] is the interactive session moving between screens
//! - [`ui`] drives and renders screens in a terminal

pub mod app;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod screens;
pub mod storage;
pub mod ui;
pub mod util;
