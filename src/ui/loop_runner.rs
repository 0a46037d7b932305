//! Event loops: the interactive TUI, and the settle helpers the one-shot
//! commands use to wait for a screen's loads.

use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::app::App;
use crate::screens::{Screen, ScreenEvent};
use crate::storage::KeyValueStore;

use super::input::handle_input;
use super::render::render;

/// Capacity of the screen event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Result of handling a key press.
pub enum Action {
    Continue,
    Quit,
}

/// Runs the TUI until the user quits or a termination signal arrives.
///
/// Multiplexes terminal input, screen load results and a 250ms tick that
/// expires status messages. A panic hook restores the terminal before
/// unwinding.
pub async fn run<S: KeyValueStore>(
    app: &mut App<S>,
    event_tx: mpsc::Sender<ScreenEvent>,
    mut event_rx: mpsc::Receiver<ScreenEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    // On non-Unix platforms the signal futures never complete
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    app.start(&event_tx);

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Apply finished loads before taking more input
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            app.handle_screen_event(event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down");
                break;
            }

            maybe_event = event_stream.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    app.needs_redraw = true;
                    if let Action::Quit = handle_input(app, key.code, key.modifiers, &event_tx).await {
                        break;
                    }
                }
                Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Terminal input error");
                }
                None => break,
            },

            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                app.handle_screen_event(event);
            }

            _ = tick_interval.tick() => {}
        }
    }

    app.stop();
    restore_terminal(terminal)?;
    Ok(())
}

/// Enter raw mode and the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Every load of the current generation was applied.
    Ready,
    /// Ctrl-C arrived first; the screen was blurred and late results dropped.
    Interrupted,
}

/// Focus `screen` and apply its events until it settles.
///
/// Events from earlier generations still sitting in the channel are handed to
/// the screen as well; it discards them itself.
async fn focus_and_settle<S: Screen + ?Sized>(
    screen: &mut S,
    event_tx: &mpsc::Sender<ScreenEvent>,
    event_rx: &mut mpsc::Receiver<ScreenEvent>,
) -> Settled {
    screen.on_focus(event_tx);
    settle(screen, event_rx).await
}

/// Apply events to an already focused screen until it settles.
async fn settle<S: Screen + ?Sized>(
    screen: &mut S,
    event_rx: &mut mpsc::Receiver<ScreenEvent>,
) -> Settled {
    loop {
        if screen.is_settled() {
            return Settled::Ready;
        }

        tokio::select! {
            biased;

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, dropping in-flight loads");
                screen.on_blur();
                return Settled::Interrupted;
            }

            event = event_rx.recv() => match event {
                Some(event) => screen.handle_event(event),
                None => {
                    tracing::warn!("Screen event channel closed before loads finished");
                    screen.on_blur();
                    return Settled::Interrupted;
                }
            },
        }
    }
}

/// Focus `screen` on a private channel and wait for it to settle.
pub async fn open<S: Screen + ?Sized>(screen: &mut S) -> Settled {
    let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    focus_and_settle(screen, &event_tx, &mut event_rx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::FavoritesSet;
    use crate::screens::{Lifecycle, Notice};

    /// Screen that expects one favorites load per focus.
    #[derive(Default)]
    struct CountingScreen {
        lifecycle: Lifecycle,
        applied: usize,
    }

    impl Screen for CountingScreen {
        fn on_focus(&mut self, event_tx: &mpsc::Sender<ScreenEvent>) {
            self.lifecycle.focus();
            let generation = self.lifecycle.start_load();
            let tx = event_tx.clone();
            tokio::spawn(async move {
                let _ = tx
                    .send(ScreenEvent::FavoritesLoaded {
                        generation,
                        revision: 0,
                        result: Ok(FavoritesSet::new()),
                    })
                    .await;
            });
        }

        fn on_blur(&mut self) {
            self.lifecycle.blur();
        }

        fn handle_event(&mut self, event: ScreenEvent) {
            if self.lifecycle.accept(event.generation()) {
                self.applied += 1;
            }
        }

        fn is_settled(&self) -> bool {
            self.lifecycle.is_settled()
        }

        fn take_notice(&mut self) -> Option<Notice> {
            None
        }
    }

    #[tokio::test]
    async fn test_open_waits_for_load() {
        let mut screen = CountingScreen::default();
        assert_eq!(open(&mut screen).await, Settled::Ready);
        assert_eq!(screen.applied, 1);
    }

    #[tokio::test]
    async fn test_stale_event_in_channel_is_skipped() {
        let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let mut screen = CountingScreen::default();

        // leftover from a generation that was blurred away
        screen.lifecycle.focus();
        let stale = screen.lifecycle.start_load();
        tx.send(ScreenEvent::FavoritesLoaded {
            generation: stale,
            revision: 0,
            result: Ok(FavoritesSet::new()),
        })
        .await
        .unwrap();
        screen.on_blur();

        assert_eq!(focus_and_settle(&mut screen, &tx, &mut rx).await, Settled::Ready);
        assert_eq!(screen.applied, 1);
    }
}
