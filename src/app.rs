//! Application state: three independent dashboard columns.
//!
//! `App` owns the per-column content, scroll positions, and the pending
//! user requests the main loop forwards to the pollers.  Columns are
//! deliberately independent: a refresh or failure in one never touches the
//! other two.

use chrono::{DateTime, Local};
use ratatui::widgets::ListState;

use crate::aggregate::FeedList;
use crate::source::{EventType, TimelineList};

/// One of the three dashboard columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Articles,
    Timeline,
    Videos,
}

impl Column {
    pub fn next(self) -> Self {
        match self {
            Column::Articles => Column::Timeline,
            Column::Timeline => Column::Videos,
            Column::Videos => Column::Articles,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Column::Articles => Column::Videos,
            Column::Timeline => Column::Articles,
            Column::Videos => Column::Timeline,
        }
    }
}

/// Content and scroll state for one column.
pub struct ColumnState {
    /// Column heading.
    pub title: &'static str,
    /// Current aggregated content, newest first.
    pub items: FeedList,
    /// When the column last refreshed successfully.
    pub last_updated: Option<DateTime<Local>>,
    /// Last cycle's outcome, shown under the heading.
    pub status: String,
    /// List selection state for scrolling.
    pub list_state: ListState,
}

impl ColumnState {
    fn new(title: &'static str, status: &str) -> Self {
        Self {
            title,
            items: Vec::new(),
            last_updated: None,
            status: status.to_string(),
            list_state: ListState::default(),
        }
    }

    /// Replace the column's content after a successful refresh.
    ///
    /// Items are replaced wholesale: each cycle fetches fresh, nothing is
    /// carried over or cached.  The scroll position is clamped so it never
    /// points past the new end.
    pub fn replace_items(&mut self, items: FeedList) {
        self.items = items;
        self.last_updated = Some(Local::now());
        self.status = format!("{} items", self.items.len());

        match self.list_state.selected() {
            Some(_) if self.items.is_empty() => self.list_state.select(None),
            Some(i) if i >= self.items.len() => {
                self.list_state.select(Some(self.items.len() - 1));
            }
            _ => {}
        }
    }

    /// Record a failed cycle.  The stale items stay visible.
    pub fn set_error(&mut self, message: String) {
        self.status = message;
    }

    /// Append partial-failure warnings to the status line.
    ///
    /// Called after [`replace_items`](Self::replace_items) when a cycle
    /// succeeded but skipped some upstream endpoints.
    pub fn note_warnings(&mut self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        self.status = format!("{}; {}", self.status, warnings.join("; "));
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(self.items.len() - 1));
        }
    }
}

pub struct App {
    pub articles: ColumnState,
    pub timeline: ColumnState,
    pub videos: ColumnState,
    /// Which column keyboard navigation applies to.
    pub focus: Column,
    /// Uploads vs livestreams for the video search.
    pub event_type: EventType,
    /// The user's timeline lists, for the list selector.
    pub lists: Vec<TimelineList>,
    /// Index into `lists` of the currently selected list.
    pub selected_list: usize,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Set by input handling; the main loop forwards it to the video
    /// poller and clears it.
    pub pending_video_refresh: bool,
    /// Set when the user cycles lists; the main loop forwards the new list
    /// id to the timeline poller and clears it.
    pub pending_list_switch: Option<u64>,
}

impl App {
    /// Build the initial state.
    ///
    /// `initial_list` pre-selects a configured list id if it is among
    /// `lists`; otherwise selection starts at the first list.
    pub fn new(lists: Vec<TimelineList>, initial_list: Option<u64>) -> Self {
        let selected_list = initial_list
            .and_then(|id| lists.iter().position(|l| l.id == id))
            .unwrap_or(0);

        Self {
            articles: ColumnState::new("Articles", "waiting for first refresh"),
            timeline: ColumnState::new("Timeline", "waiting for first refresh"),
            videos: ColumnState::new("Videos", "press r to fetch"),
            focus: Column::Articles,
            event_type: EventType::default(),
            lists,
            selected_list,
            quit: false,
            pending_video_refresh: false,
            pending_list_switch: None,
        }
    }

    pub fn column_mut(&mut self, column: Column) -> &mut ColumnState {
        match column {
            Column::Articles => &mut self.articles,
            Column::Timeline => &mut self.timeline,
            Column::Videos => &mut self.videos,
        }
    }

    pub fn focused_mut(&mut self) -> &mut ColumnState {
        self.column_mut(self.focus)
    }

    // -- user actions --------------------------------------------------------

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Queue a manual video refresh with the current event type.
    pub fn request_video_refresh(&mut self) {
        self.pending_video_refresh = true;
        self.videos.status = format!("fetching {}...", self.event_type);
    }

    /// Flip uploads/livestreams and refetch with the new kind.
    pub fn toggle_event_type(&mut self) {
        self.event_type = self.event_type.toggled();
        self.request_video_refresh();
    }

    /// Advance to the next timeline list (wrapping) and queue the switch.
    pub fn cycle_list(&mut self) {
        if self.lists.is_empty() {
            self.timeline.status = "no lists available".to_string();
            return;
        }
        self.selected_list = (self.selected_list + 1) % self.lists.len();
        let list = &self.lists[self.selected_list];
        self.pending_list_switch = Some(list.id);
        self.timeline.status = format!("switching to {}", list.name);
    }

    /// Name of the selected list, for the status bar.
    pub fn selected_list_name(&self) -> Option<&str> {
        self.lists.get(self.selected_list).map(|l| l.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::NormalizedItem;
    use chrono::{TimeZone, Utc};

    fn make_item(title: &str) -> NormalizedItem {
        NormalizedItem {
            title: title.to_string(),
            author: "author".to_string(),
            link: "https://example.com".to_string(),
            summary: String::new(),
            thumbnail: None,
            published_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn make_lists() -> Vec<TimelineList> {
        vec![
            TimelineList {
                id: 1,
                name: "News".to_string(),
            },
            TimelineList {
                id: 2,
                name: "Friends".to_string(),
            },
        ]
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty_with_focus_on_articles() {
        let app = App::new(Vec::new(), None);
        assert!(app.articles.items.is_empty());
        assert!(app.timeline.items.is_empty());
        assert!(app.videos.items.is_empty());
        assert_eq!(app.focus, Column::Articles);
        assert!(!app.quit);
        assert!(!app.pending_video_refresh);
    }

    #[test]
    fn configured_list_id_preselects_that_list() {
        let app = App::new(make_lists(), Some(2));
        assert_eq!(app.selected_list, 1);
        assert_eq!(app.selected_list_name(), Some("Friends"));
    }

    #[test]
    fn unknown_list_id_falls_back_to_first_list() {
        let app = App::new(make_lists(), Some(999));
        assert_eq!(app.selected_list, 0);
    }

    // -- replace_items / set_error -------------------------------------------

    #[test]
    fn replace_items_sets_content_and_timestamp() {
        let mut app = App::new(Vec::new(), None);
        app.articles.replace_items(vec![make_item("a"), make_item("b")]);

        assert_eq!(app.articles.items.len(), 2);
        assert!(app.articles.last_updated.is_some());
        assert_eq!(app.articles.status, "2 items");
    }

    #[test]
    fn replace_items_clamps_scroll_position() {
        let mut app = App::new(Vec::new(), None);
        app.articles
            .replace_items(vec![make_item("a"), make_item("b"), make_item("c")]);
        app.articles.select_last();
        assert_eq!(app.articles.list_state.selected(), Some(2));

        app.articles.replace_items(vec![make_item("only")]);
        assert_eq!(app.articles.list_state.selected(), Some(0));

        app.articles.replace_items(Vec::new());
        assert!(app.articles.list_state.selected().is_none());
    }

    #[test]
    fn set_error_keeps_stale_items_visible() {
        let mut app = App::new(Vec::new(), None);
        app.timeline.replace_items(vec![make_item("stale")]);
        app.timeline.set_error("Timeline unavailable: 401".to_string());

        assert_eq!(app.timeline.items.len(), 1, "content must survive a failed cycle");
        assert_eq!(app.timeline.status, "Timeline unavailable: 401");
    }

    #[test]
    fn warnings_append_to_the_status_line() {
        let mut app = App::new(Vec::new(), None);
        app.articles.replace_items(vec![make_item("a")]);
        app.articles
            .note_warnings(&["http://dead.example/feed: HTTP 503".to_string()]);

        assert_eq!(
            app.articles.status,
            "1 items; http://dead.example/feed: HTTP 503"
        );

        // No warnings leaves the status untouched.
        app.articles.replace_items(vec![make_item("a")]);
        app.articles.note_warnings(&[]);
        assert_eq!(app.articles.status, "1 items");
    }

    #[test]
    fn one_column_refresh_does_not_touch_the_others() {
        let mut app = App::new(Vec::new(), None);
        app.timeline.replace_items(vec![make_item("post")]);
        app.articles.replace_items(vec![make_item("story")]);

        assert_eq!(app.timeline.items.len(), 1);
        assert!(app.videos.items.is_empty());
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_column_is_noop() {
        let mut app = App::new(Vec::new(), None);
        app.focused_mut().select_next();
        app.focused_mut().select_previous();
        app.focused_mut().select_first();
        app.focused_mut().select_last();
        assert!(app.articles.list_state.selected().is_none());
    }

    #[test]
    fn select_next_advances_and_clamps() {
        let mut app = App::new(Vec::new(), None);
        app.articles.replace_items(vec![make_item("a"), make_item("b")]);

        app.articles.select_next();
        assert_eq!(app.articles.list_state.selected(), Some(0));
        app.articles.select_next();
        assert_eq!(app.articles.list_state.selected(), Some(1));
        app.articles.select_next();
        assert_eq!(app.articles.list_state.selected(), Some(1), "clamped at end");
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = App::new(Vec::new(), None);
        app.articles.replace_items(vec![make_item("a"), make_item("b")]);
        app.articles.select_first();
        app.articles.select_previous();
        assert_eq!(app.articles.list_state.selected(), Some(0));
    }

    #[test]
    fn focus_cycles_through_all_columns() {
        let mut app = App::new(Vec::new(), None);
        assert_eq!(app.focus, Column::Articles);
        app.focus_next();
        assert_eq!(app.focus, Column::Timeline);
        app.focus_next();
        assert_eq!(app.focus, Column::Videos);
        app.focus_next();
        assert_eq!(app.focus, Column::Articles);
        app.focus_previous();
        assert_eq!(app.focus, Column::Videos);
    }

    // -- user actions --------------------------------------------------------

    #[test]
    fn request_video_refresh_sets_pending_flag() {
        let mut app = App::new(Vec::new(), None);
        app.request_video_refresh();
        assert!(app.pending_video_refresh);
    }

    #[test]
    fn toggle_event_type_flips_and_queues_refresh() {
        let mut app = App::new(Vec::new(), None);
        assert_eq!(app.event_type, EventType::Upload);

        app.toggle_event_type();
        assert_eq!(app.event_type, EventType::Live);
        assert!(app.pending_video_refresh);

        app.pending_video_refresh = false;
        app.toggle_event_type();
        assert_eq!(app.event_type, EventType::Upload);
    }

    #[test]
    fn cycle_list_wraps_and_queues_switch() {
        let mut app = App::new(make_lists(), Some(1));

        app.cycle_list();
        assert_eq!(app.selected_list_name(), Some("Friends"));
        assert_eq!(app.pending_list_switch, Some(2));

        app.cycle_list();
        assert_eq!(app.selected_list_name(), Some("News"));
        assert_eq!(app.pending_list_switch, Some(1));
    }

    #[test]
    fn cycle_list_with_no_lists_reports_status() {
        let mut app = App::new(Vec::new(), None);
        app.cycle_list();
        assert!(app.pending_list_switch.is_none());
        assert_eq!(app.timeline.status, "no lists available");
    }
}
