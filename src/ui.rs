//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  This makes it easy to change the
//! visual layout without touching business logic.
//!
//! ## For contributors
//!
//! * The layout is three side-by-side columns (articles, timeline, videos)
//!   over a one-line status bar.
//! * Each entry renders as title / secondary line / excerpt; the excerpt is
//!   clipped to the column width rather than wrapped.  Item thumbnails are
//!   carried in the data model but have no terminal rendering.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Column};

/// Draw the complete UI for one frame.
///
/// Called once per tick from the main loop.  Delegates to helper functions
/// for each screen region.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [columns_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    let [left, centre, right] = Layout::horizontal([
        Constraint::Percentage(33),
        Constraint::Percentage(34),
        Constraint::Percentage(33),
    ])
    .areas(columns_area);

    draw_column(app, Column::Articles, frame, left);
    draw_column(app, Column::Timeline, frame, centre);
    draw_column(app, Column::Videos, frame, right);
    draw_status_bar(app, frame, status_area);
}

/// Render one scrollable feed column.
fn draw_column(app: &mut App, column: Column, frame: &mut Frame, area: Rect) {
    let focused = app.focus == column;
    let state = app.column_mut(column);

    // Heading carries the last successful refresh time, e.g.
    // " Articles (updated 12:34:56) ".
    let title = match state.last_updated {
        Some(at) => format!(" {} (updated {}) ", state.title, at.format("%H:%M:%S")),
        None => format!(" {} ", state.title),
    };

    let list_items: Vec<ListItem> = state
        .items
        .iter()
        .map(|item| {
            let meta = format!(
                "{}  {}",
                item.published_at.format("%m-%d %H:%M"),
                item.author
            );
            let mut lines = vec![
                Line::from(Span::styled(
                    item.title.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(meta, Style::default().fg(Color::Cyan))),
            ];
            if !item.summary.is_empty() {
                lines.push(Line::from(Span::styled(
                    item.summary.clone(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::raw(""));
            ListItem::new(lines)
        })
        .collect();

    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut state.list_state);
}

/// Render the bottom status bar.
///
/// Shows the focused column's status, the current timeline list and video
/// search kind, and the key help.
fn draw_status_bar(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_name = app.selected_list_name().unwrap_or("none").to_string();
    let event_type = app.event_type.to_string();
    let focused = app.focused_mut();
    let status = format!("{}: {}", focused.title, focused.status);

    let bar = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(format!("list: {list_name}"), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(format!("videos: {event_type}"), Style::default().fg(Color::Green)),
        Span::raw("  q: quit  Tab/←→: column  ↑/↓: scroll  r: refresh videos  e: uploads/live  l: list"),
    ]));
    frame.render_widget(bar, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::NormalizedItem;
    use chrono::{TimeZone, Utc};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_item(title: &str) -> NormalizedItem {
        NormalizedItem {
            title: title.to_string(),
            author: "author".to_string(),
            link: "https://example.com".to_string(),
            summary: "an excerpt".to_string(),
            thumbnail: None,
            published_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    #[test]
    fn draw_does_not_panic_with_empty_columns() {
        let mut app = App::new(Vec::new(), None);
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();
    }

    #[test]
    fn draw_shows_all_three_column_headings() {
        let mut app = App::new(Vec::new(), None);
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Articles"));
        assert!(text.contains("Timeline"));
        assert!(text.contains("Videos"));
    }

    #[test]
    fn draw_renders_items_and_status() {
        let mut app = App::new(Vec::new(), None);
        app.articles.replace_items(vec![make_item("Big Headline")]);
        app.articles.select_first();

        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Big Headline"));
        assert!(text.contains("1 items"), "focused column status in the bar");
        assert!(text.contains("updated"), "heading carries refresh time");
    }

    #[test]
    fn draw_does_not_panic_on_narrow_terminal() {
        let mut app = App::new(Vec::new(), None);
        app.timeline.replace_items(vec![make_item("x")]);
        let backend = TestBackend::new(30, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();
    }
}
