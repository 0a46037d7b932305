//! Screen models.
//!
//! Each screen independently loads the favorites snapshot when it gains
//! focus and, for catalog-backed screens, fetches the remote catalog. Loads
//! run as background tasks and report back through [`ScreenEvent`]s tagged
//! with the screen's generation; a screen that lost focus in the meantime
//! discards them.
//!
//! # Module Structure
//!
//! - `shared` - Favorites and catalog state shared by every screen
//! - `home` - Category bar plus the filtered catalog
//! - `favorites` - The favorites list with remove / remove-all
//! - `featured` - Featured items sorted by price
//! - `detail` - One item, or a placeholder when opened without one

mod detail;
mod favorites;
mod featured;
mod home;
mod shared;

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use crate::catalog::{FetchError, Item};
use crate::favorites::{FavoritesSet, StoreError};

pub use detail::{DetailError, DetailScreen};
pub use favorites::FavoritesScreen;
pub use featured::FeaturedScreen;
pub use home::HomeScreen;

/// Completion of a background load started by a screen.
#[derive(Debug)]
pub enum ScreenEvent {
    FavoritesLoaded {
        generation: u64,
        /// Local mutation count when the load was spawned
        revision: u64,
        result: Result<FavoritesSet, StoreError>,
    },
    CatalogFetched {
        generation: u64,
        result: Result<Vec<Item>, FetchError>,
    },
}

impl ScreenEvent {
    pub fn generation(&self) -> u64 {
        match self {
            ScreenEvent::FavoritesLoaded { generation, .. }
            | ScreenEvent::CatalogFetched { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// One-shot user-visible message produced by a screen action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: Cow<'static, str>,
}

impl Notice {
    pub fn success(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(0);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Focus tracking and stale-result detection for one screen.
///
/// Losing focus moves the screen to a fresh generation, so every load
/// spawned before that point is rejected when its event arrives.
/// Generations are unique across all screens: screens that share one event
/// channel never accept each other's results.
#[derive(Debug)]
pub struct Lifecycle {
    generation: u64,
    focused: bool,
    pending: usize,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            generation: next_generation(),
            focused: false,
            pending: 0,
        }
    }
}

impl Lifecycle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.generation = next_generation();
        self.pending = 0;
    }

    /// Register a background load; returns the generation to tag it with.
    pub fn start_load(&mut self) -> u64 {
        self.pending += 1;
        self.generation
    }

    /// Whether an event from `generation` may be applied.
    pub fn accept(&mut self, generation: u64) -> bool {
        if !self.focused || generation != self.generation {
            tracing::debug!(
                event_generation = generation,
                current = self.generation,
                focused = self.focused,
                "Discarding stale screen event"
            );
            return false;
        }
        self.pending = self.pending.saturating_sub(1);
        true
    }

    /// No loads of the current generation are outstanding.
    pub fn is_settled(&self) -> bool {
        self.pending == 0
    }
}

/// Common surface the UI loop drives.
pub trait Screen {
    /// The screen became visible: start its loads.
    fn on_focus(&mut self, event_tx: &mpsc::Sender<ScreenEvent>);

    /// The screen was hidden: results of loads still in flight are dropped.
    fn on_blur(&mut self);

    /// Apply a background load result.
    fn handle_event(&mut self, event: ScreenEvent);

    fn is_settled(&self) -> bool;

    fn take_notice(&mut self) -> Option<Notice>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_rejects_events_after_blur() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.focus();
        let generation = lifecycle.start_load();
        assert!(!lifecycle.is_settled());

        lifecycle.blur();
        assert!(lifecycle.is_settled());
        lifecycle.focus();
        assert!(!lifecycle.accept(generation));
    }

    #[test]
    fn test_lifecycle_accepts_current_generation() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.focus();
        let generation = lifecycle.start_load();
        assert!(lifecycle.accept(generation));
        assert!(lifecycle.is_settled());
    }

    #[test]
    fn test_generations_differ_across_screens() {
        let mut first = Lifecycle::default();
        let mut second = Lifecycle::default();
        first.focus();
        second.focus();
        let generation = first.start_load();
        second.start_load();

        assert!(!second.accept(generation));
        assert!(!second.is_settled());
        assert!(first.accept(generation));
    }

    #[test]
    fn test_lifecycle_rejects_while_unfocused() {
        let mut lifecycle = Lifecycle::default();
        let generation = lifecycle.start_load();
        assert!(!lifecycle.accept(generation));
    }
}
