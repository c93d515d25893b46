//! Background fetch scheduling, one poller per dashboard column.
//!
//! All pollers run on dedicated threads and report to the UI thread over a
//! shared [`mpsc`] channel, which the main loop drains every tick:
//!
//! * **Articles** and **Timeline** refresh on independent fixed timers.
//! * **Videos** never polls: its thread blocks on a request channel and
//!   fetches only when the user asks (refresh key or event-type toggle).
//!
//! Each cycle runs fetch → [`aggregate`] to completion before the next one
//! can start for that column; columns share no mutable state.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::aggregate::{aggregate, FeedList};
use crate::app::Column;
use crate::config::{ArticlesConfig, TimelineConfig, VideosConfig};
use crate::source::{ArticleSource, DataSource, EventType, TimelineSource, VideoSource};

/// Messages sent from the poller threads to the UI thread.
pub enum PollMsg {
    /// A successful cycle produced this column's fresh, aggregated list.
    /// `warnings` names any upstream endpoints skipped this cycle.
    Items {
        column: Column,
        items: FeedList,
        warnings: Vec<String>,
    },
    /// A cycle failed; the column keeps its stale content and shows this.
    Error { column: Column, message: String },
}

/// Control messages for the timeline poller.
pub enum TimelineCtl {
    /// Switch to another list and refresh immediately.
    UseList(u64),
}

/// A user-initiated video refresh.
pub struct VideoRequest {
    pub event_type: EventType,
}

/// Run one fetch → aggregate cycle for a column.
fn poll_once(source: &dyn DataSource, column: Column, max_items: usize) -> PollMsg {
    match source.fetch() {
        Ok(fetched) => PollMsg::Items {
            column,
            items: aggregate(fetched.items, max_items),
            warnings: fetched.warnings,
        },
        Err(e) => PollMsg::Error {
            column,
            message: e.to_string(),
        },
    }
}

/// Spawn the article poller: fetch, report, sleep, repeat.
pub fn spawn_articles(cfg: ArticlesConfig, tx: Sender<PollMsg>) {
    thread::spawn(move || {
        let source = ArticleSource::new(cfg.urls, "Articles");
        let interval = Duration::from_secs(cfg.refresh_minutes * 60);
        loop {
            if tx
                .send(poll_once(&source, Column::Articles, cfg.max_items))
                .is_err()
            {
                // Receiver gone: the main thread has exited.
                return;
            }
            thread::sleep(interval);
        }
    });
}

/// Spawn the timeline poller.
///
/// Returns a control sender; sending [`TimelineCtl::UseList`] switches the
/// polled list and cuts the current sleep short so the switch takes effect
/// immediately.
pub fn spawn_timeline(
    cfg: TimelineConfig,
    initial_list: Option<u64>,
    tx: Sender<PollMsg>,
) -> Sender<TimelineCtl> {
    let (ctl_tx, ctl_rx): (Sender<TimelineCtl>, Receiver<TimelineCtl>) = mpsc::channel();

    thread::spawn(move || {
        let mut source = TimelineSource {
            creds: cfg.credentials(),
            list_id: initial_list,
            count: cfg.max_items,
            api_host: cfg.api_host,
            link_host: cfg.link_host,
            label: "Timeline".to_string(),
        };
        let interval = Duration::from_secs(cfg.refresh_minutes * 60);
        loop {
            if tx
                .send(poll_once(&source, Column::Timeline, cfg.max_items))
                .is_err()
            {
                return;
            }
            match ctl_rx.recv_timeout(interval) {
                Ok(TimelineCtl::UseList(id)) => source.list_id = Some(id),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    });

    ctl_tx
}

/// Spawn the on-demand video fetcher.
///
/// The thread sits idle until a [`VideoRequest`] arrives, builds a fresh
/// source for that one fetch (the quota-limited API client is never held
/// across cycles), reports, and goes back to waiting.
pub fn spawn_videos(cfg: VideosConfig, tx: Sender<PollMsg>) -> Sender<VideoRequest> {
    let (req_tx, req_rx): (Sender<VideoRequest>, Receiver<VideoRequest>) = mpsc::channel();

    thread::spawn(move || {
        while let Ok(request) = req_rx.recv() {
            let source = VideoSource {
                api_key: cfg.api_key.clone(),
                subscriber_id: cfg.subscriber_id.clone(),
                event_type: request.event_type,
                max_per_channel: cfg.max_per_channel,
                api_base: cfg.api_base.clone(),
                watch_host: cfg.watch_host.clone(),
                label: "Videos".to_string(),
            };
            if tx
                .send(poll_once(&source, Column::Videos, cfg.max_items))
                .is_err()
            {
                return;
            }
        }
    });

    req_tx
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
