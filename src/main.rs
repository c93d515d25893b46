//! feedboard — a three-column feed dashboard for the terminal.
//!
//! Aggregates RSS articles, a social-media list timeline, and the user's
//! video subscriptions into one live-updating screen.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  PollMsg   ┌──────────┐  draw()  ┌──────────┐
//! │  poll.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (threads)│  (channel) │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘          └──────────┘
//!                              ▲
//!                              │ handle_key_event()
//!                         ┌──────────┐
//!                         │ input.rs │
//!                         └──────────┘
//! ```
//!
//! * **`aggregate`** — the pure merge/sort/cap core shared by all columns.
//! * **`source/`** — the `DataSource` trait and the three adapters
//!   (articles, timeline, videos).
//! * **`poll`** — background threads: two timers plus the on-demand video
//!   fetcher.
//! * **`config`** — TOML configuration and credential handling.
//! * **`app`** — owns all application state (columns, focus, selections).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`main`** — wires everything together: load config, set up the
//!   terminal, and run the event loop.

mod aggregate;
mod app;
mod config;
mod input;
mod poll;
mod source;
mod ui;

use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use config::Config;
use poll::{PollMsg, TimelineCtl, VideoRequest};
use source::TimelineSource;

/// Default config path when none is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "feedboard.toml";

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.  This prevents the common TUI bug where a panic leaves the
/// terminal in a broken state.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.  Without this, a panic inside the event loop would leave
/// raw mode enabled and the alternate screen active.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    install_panic_hook();

    // -- load configuration --------------------------------------------------
    // An explicitly given path must exist; the default path may be absent,
    // in which case everything falls back to built-in defaults.
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)?,
        None => Config::default(),
    };

    // -- enumerate timeline lists --------------------------------------------
    // Best effort: a failure here must not keep the other columns from
    // starting.  The timeline column will report the problem instead.
    let (lists, lists_error) =
        match TimelineSource::fetch_lists(&cfg.timeline.credentials(), &cfg.timeline.api_host) {
            Ok(lists) => (lists, None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };

    let mut app = App::new(lists, cfg.timeline.list_id);
    if let Some(message) = lists_error {
        app.timeline.set_error(message);
    }
    let initial_list = app.lists.get(app.selected_list).map(|l| l.id);

    // -- start background pollers --------------------------------------------
    let (tx, rx) = mpsc::channel();
    poll::spawn_articles(cfg.articles.clone(), tx.clone());
    let timeline_ctl = poll::spawn_timeline(cfg.timeline.clone(), initial_list, tx.clone());
    let video_tx = poll::spawn_videos(cfg.videos.clone(), tx);

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any messages from the pollers.
    //   2. Forward pending user requests to the pollers.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process poll messages
        while let Ok(msg) = rx.try_recv() {
            match msg {
                PollMsg::Items {
                    column,
                    items,
                    warnings,
                } => {
                    let state = app.column_mut(column);
                    state.replace_items(items);
                    state.note_warnings(&warnings);
                }
                PollMsg::Error { column, message } => app.column_mut(column).set_error(message),
            }
        }

        // 2. Forward pending requests
        if app.pending_video_refresh {
            app.pending_video_refresh = false;
            let _ = video_tx.send(VideoRequest {
                event_type: app.event_type,
            });
        }
        if let Some(id) = app.pending_list_switch.take() {
            let _ = timeline_ctl.send(TimelineCtl::UseList(id));
        }

        // 3. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 4. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
