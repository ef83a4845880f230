use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Move a list cursor by `offset`, clamped to `0..len`.
pub(crate) fn step_selection(selected: usize, len: usize, offset: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len as isize - 1;
    (selected as isize + offset).clamp(0, last) as usize
}

/// Green READ or amber UNREAD badge.
pub(crate) fn status_badge(book: &Book) -> Span<'static> {
    let color = if book.read { Color::Green } else { Color::Yellow };
    Span::styled(
        format!(" {} ", book.status_label()),
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD),
    )
}

/// Text of a book card: title with badge, author, then year/genre and
/// stars when there is anything to show.
pub(crate) fn book_card_lines(book: &Book, selected: bool) -> Vec<Line<'static>> {
    let title = if selected {
        format!("> {}", book.title)
    } else {
        book.title.clone()
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            status_badge(book),
        ]),
        Line::from(Span::styled(
            format!("by {}", book.author),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let details = book.details_line();
    let stars = book.rating_stars();
    if !details.is_empty() || !stars.is_empty() {
        let mut spans = vec![Span::styled(details, Style::default().fg(Color::Gray))];
        if !stars.is_empty() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(stars, Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::from(spans));
    }
    lines
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Flatten an error chain into one status-bar sentence, outermost context
/// first.
pub(crate) fn surface_error(err: &Error) -> String {
    format!("{err:#}")
}
