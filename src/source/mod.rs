//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] trait; concrete adapters live in
//! sub-modules, one per upstream API:
//!
//! * [`articles`] — RSS/Atom article feeds.
//! * [`timeline`] — the social-media list timeline.
//! * [`videos`] — the video-subscription search.
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `podcasts.rs`).
//! 2. Define a struct holding the source's configuration and implement
//!    [`DataSource`] for it — `fetch()` maps the upstream payload onto
//!    [`RawItem`](crate::aggregate::RawItem)s.
//! 3. Add the `mod` line below and re-export your struct.
//! 4. Wire it into a poller in `poll.rs`.
//!
//! The aggregation, sorting, and UI are all source-agnostic.

pub mod articles;
pub mod timeline;
pub mod videos;

pub use articles::ArticleSource;
pub use timeline::{TimelineList, TimelineSource};
pub use videos::{EventType, VideoSource};

use crate::aggregate::{FeedError, RawItem};

/// The outcome of one successful fetch cycle.
///
/// A source that covers several upstream endpoints can succeed partially:
/// `items` holds everything that was fetched, and `warnings` names the
/// endpoints that failed this cycle.
#[derive(Debug)]
pub struct FetchResult {
    pub items: Vec<RawItem>,
    pub warnings: Vec<String>,
}

impl FetchResult {
    /// A fully successful fetch with no warnings.
    pub fn new(items: Vec<RawItem>) -> Self {
        Self {
            items,
            warnings: Vec::new(),
        }
    }
}

/// Trait that every data source must implement.
///
/// The pollers call [`fetch()`](DataSource::fetch) on background threads,
/// so implementations must be [`Send`].  Implementations construct their
/// HTTP client inside `fetch()` and let it drop when the call returns —
/// no client handle is held across refresh cycles.
pub trait DataSource: Send {
    /// Human-readable label shown in the column status line.
    fn name(&self) -> &str;

    /// Fetch the latest batch of raw items.
    ///
    /// A total failure is reported as [`FeedError::SourceUnavailable`] and
    /// only skips this column's refresh for this cycle — the previously
    /// rendered content stays visible.  Partial failures come back as
    /// [`FetchResult::warnings`] alongside whatever was fetched.
    fn fetch(&self) -> Result<FetchResult, FeedError>;
}
