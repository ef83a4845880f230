use std::cmp::min;
use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs,
    Wrap,
};
use ratatui::Frame;
use tracing::{info, warn};

use crate::catalog::{self, Stats};
use crate::models::Book;
use crate::store::{LibraryStore, LoadOutcome};

use super::forms::{BookForm, ConfirmRemove};
use super::helpers::{book_card_lines, centered_rect, surface_error};
use super::screens::{LibraryScreen, RemoveScreen, SearchScreen, StatsScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Menu bar at the top of every view.
const MENU_HEIGHT: u16 = 3;
/// Height allocation per book card in list-style views.
const BOOK_CARD_HEIGHT: u16 = 5;
const MENU_ITEMS: [&str; 5] = [
    "[1] Add Book",
    "[2] View All Books",
    "[3] Search Book",
    "[4] Remove Book",
    "[5] Statistics",
];

/// Which view fills the content area. The library list is kept on `App`
/// itself so its filters survive a trip to another view.
enum Screen {
    Library,
    Search(SearchScreen),
    Remove(RemoveScreen),
    Statistics(StatsScreen),
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    ConfirmRemove(ConfirmRemove),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: LibraryStore,
    books: Vec<Book>,
    library: LibraryScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the UI around an already loaded collection. A recovery notice
    /// from the load is shown as the first footer message.
    pub fn new(store: LibraryStore, outcome: LoadOutcome) -> Self {
        let LoadOutcome { books, recovery } = outcome;
        let mut app = Self {
            store,
            library: LibraryScreen::new(&books),
            books,
            screen: Screen::Library,
            mode: Mode::Normal,
            status: None,
        };
        if let Some(recovery) = recovery {
            app.set_status(recovery.message(), StatusKind::Warning);
        }
        app
    }

    /// Route one key press. Returns `true` once the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::ConfirmRemove(confirm) => self.handle_confirm_remove(code, confirm)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if !matches!(self.screen, Screen::Search(_)) {
            match code {
                KeyCode::Char('q') => {
                    *exit = true;
                    return Ok(Mode::Normal);
                }
                KeyCode::Char('1') => return Ok(self.open_add_form()),
                KeyCode::Char('2') => {
                    self.open_screen(Screen::Library);
                    return Ok(Mode::Normal);
                }
                KeyCode::Char('3') => {
                    self.open_screen(Screen::Search(SearchScreen::default()));
                    return Ok(Mode::Normal);
                }
                KeyCode::Char('4') => {
                    let mut remove = RemoveScreen::new(&self.books);
                    if let Some(book) = self.library.current_book() {
                        remove.focus_title(&book.title);
                    }
                    self.open_screen(Screen::Remove(remove));
                    return Ok(Mode::Normal);
                }
                KeyCode::Char('5') => {
                    self.open_screen(Screen::Statistics(StatsScreen::new(&self.books)));
                    return Ok(Mode::Normal);
                }
                _ => {}
            }
        }

        match &mut self.screen {
            Screen::Library => match code {
                KeyCode::Esc => *exit = true,
                KeyCode::Up => self.library.move_selection(-1),
                KeyCode::Down => self.library.move_selection(1),
                KeyCode::PageUp => self.library.move_selection(-5),
                KeyCode::PageDown => self.library.move_selection(5),
                KeyCode::Home => self.library.select_first(),
                KeyCode::End => self.library.select_last(),
                KeyCode::Char('+') | KeyCode::Char('a') => return Ok(self.open_add_form()),
                KeyCode::Char('-') | KeyCode::Char('r') | KeyCode::Delete => {
                    match self.library.current_book().map(|book| book.title.clone()) {
                        Some(title) => return Ok(self.confirm_removal(title)),
                        None => self.set_status("No book selected to remove.", StatusKind::Error),
                    }
                }
                KeyCode::Char('t') => {
                    self.library.cycle_status(&self.books);
                    self.clear_status();
                }
                KeyCode::Char('g') => {
                    self.library.cycle_genre(&self.books);
                    self.clear_status();
                }
                KeyCode::Char('o') => {
                    self.library.cycle_sort(&self.books);
                    self.clear_status();
                }
                KeyCode::Char('/') | KeyCode::Char('f') => {
                    self.open_screen(Screen::Search(SearchScreen::default()));
                }
                KeyCode::Char('s') => {
                    self.open_screen(Screen::Statistics(StatsScreen::new(&self.books)));
                }
                _ => {}
            },
            Screen::Search(search) => match code {
                KeyCode::Esc => self.open_screen(Screen::Library),
                KeyCode::Tab | KeyCode::BackTab => search.cycle_field(&self.books),
                KeyCode::Backspace => search.backspace(&self.books),
                KeyCode::Up => search.move_selection(-1),
                KeyCode::Down => search.move_selection(1),
                KeyCode::Char(ch) => search.push_char(ch, &self.books),
                _ => {}
            },
            Screen::Remove(remove) => match code {
                KeyCode::Esc => self.open_screen(Screen::Library),
                KeyCode::Up => remove.move_selection(-1),
                KeyCode::Down => remove.move_selection(1),
                KeyCode::Enter | KeyCode::Char('-') | KeyCode::Delete => {
                    match remove.current_title().map(str::to_string) {
                        Some(title) => return Ok(self.confirm_removal(title)),
                        None => self.set_status("Your library is empty.", StatusKind::Error),
                    }
                }
                _ => {}
            },
            Screen::Statistics(_) => {
                if code == KeyCode::Esc {
                    self.open_screen(Screen::Library);
                }
            }
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => form.move_focus(-1),
            KeyCode::Left => form.adjust(-1),
            KeyCode::Right => form.adjust(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmRemove) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Err(err) = self.perform_remove(&confirm) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmRemove(confirm)),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(MENU_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_menu(frame, chunks[0]);
        match &self.screen {
            Screen::Library => self.draw_library(frame, chunks[1]),
            Screen::Search(search) => self.draw_search(frame, chunks[1], search),
            Screen::Remove(remove) => self.draw_remove(frame, chunks[1], remove),
            Screen::Statistics(stats) => self.draw_statistics(frame, chunks[1], &stats.stats),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::ConfirmRemove(confirm) => self.draw_confirm_remove(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let selected = match (&self.mode, &self.screen) {
            (Mode::AddingBook(_), _) => 0,
            (_, Screen::Library) => 1,
            (_, Screen::Search(_)) => 2,
            (_, Screen::Remove(_)) => 3,
            (_, Screen::Statistics(_)) => 4,
        };
        let tabs = Tabs::new(MENU_ITEMS.to_vec())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Personal Library Manager"),
            )
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(format!(
            "View All Books ({} of {})",
            self.library.visible.len(),
            self.books.len()
        ));
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);
        if inner.height == 0 {
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let label_style = Style::default().fg(Color::Gray);
        let value_style = Style::default().fg(Color::Cyan);
        let filters = Line::from(vec![
            Span::styled("Status: ", label_style),
            Span::styled(self.library.status.label(), value_style),
            Span::styled("   Genre: ", label_style),
            Span::styled(self.library.genre.label().to_string(), value_style),
            Span::styled("   Sort: ", label_style),
            Span::styled(self.library.sort.label(), value_style),
        ]);
        frame.render_widget(Paragraph::new(filters), chunks[0]);

        if self.library.visible.is_empty() {
            let message = Paragraph::new("No books match your criteria or your library is empty.")
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: true });
            frame.render_widget(message, chunks[1]);
            return;
        }
        self.render_book_cards(frame, chunks[1], &self.library.visible, self.library.selected);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect, search: &SearchScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let prompt = format!("Search by {}: ", search.field.label());
        let block = Block::default().borders(Borders::ALL).title("Search Book");
        let input = Paragraph::new(Line::from(vec![
            Span::styled(prompt.clone(), Style::default().fg(Color::Gray)),
            Span::raw(search.term.clone()),
        ]))
        .block(block.clone());
        frame.render_widget(input, chunks[0]);

        let summary = if search.term.is_empty() {
            Line::from(Span::styled(
                "Type to search.",
                Style::default().fg(Color::Gray),
            ))
        } else if search.results.is_empty() {
            Line::from(Span::styled(
                format!(
                    "No books found matching '{}' in {}.",
                    search.term,
                    search.field.label()
                ),
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Line::from(Span::styled(
                format!("Found {} matching books!", search.results.len()),
                Style::default().fg(Color::Green),
            ))
        };
        frame.render_widget(Paragraph::new(summary), chunks[1]);

        self.render_book_cards(frame, chunks[2], &search.results, search.selected);

        if matches!(self.mode, Mode::Normal) {
            let inner = block.inner(chunks[0]);
            let cursor_x = inner.x + prompt.len() as u16 + search.term.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_remove(&self, frame: &mut Frame, area: Rect, remove: &RemoveScreen) {
        if remove.titles.is_empty() {
            let block = Block::default().borders(Borders::ALL).title("Remove Book");
            let paragraph = Paragraph::new("Your library is empty.")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, area);
            return;
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let items: Vec<ListItem> = remove
            .titles
            .iter()
            .map(|title| ListItem::new(title.clone()))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Select a book to remove"),
            )
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        list_state.select(Some(remove.selected));
        frame.render_stateful_widget(list, columns[0], &mut list_state);

        let mut lines = Vec::new();
        if let Some(title) = remove.current_title() {
            if let Some(book) = catalog::find_by_title(&self.books, title) {
                lines.extend(book_card_lines(book, false));
            }
            let matches = catalog::count_by_title(&self.books, title);
            if matches > 1 {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("{matches} books share this title; all of them will be removed."),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
        let details = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Details"))
            .wrap(Wrap { trim: true });
        frame.render_widget(details, columns[1]);
    }

    fn draw_statistics(&self, frame: &mut Frame, area: Rect, stats: &Stats) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Library Statistics");
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        if stats.total == 0 {
            let message = Paragraph::new("Add some books to view statistics!")
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(message, inner);
            return;
        }

        let mut constraints = vec![Constraint::Length(4), Constraint::Min(4)];
        if stats.read > 0 {
            constraints.push(Constraint::Min(8));
        }
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(rows[0]);
        let figures = [
            ("Total Books", stats.total.to_string()),
            ("Books Read", format!("{} ({} unread)", stats.read, stats.unread)),
            (
                "Completion",
                format!("{:.1}%", stats.completion_percentage),
            ),
        ];
        for ((label, value), chunk) in figures.into_iter().zip(cards.iter()) {
            let card = Paragraph::new(Line::from(Span::styled(
                value,
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(label));
            frame.render_widget(card, *chunk);
        }

        let distribution: Vec<Bar> = stats
            .genre_counts
            .iter()
            .map(|(genre, count)| {
                Bar::default()
                    .value(*count as u64)
                    .label(Line::from(genre.clone()))
                    .text_value(format!("{count} ({:.1}%)", stats.share(*count)))
            })
            .collect();
        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Genre Distribution"),
            )
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .data(BarGroup::default().bars(&distribution));
        frame.render_widget(chart, rows[1]);

        if stats.read > 0 {
            let mut progress = BarChart::default()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Reading Progress (read / unread)"),
                )
                .bar_width(5)
                .bar_gap(1)
                .group_gap(3);
            for row in stats.genre_progress() {
                let bars = [
                    Bar::default()
                        .value(row.read as u64)
                        .style(Style::default().fg(Color::Green)),
                    Bar::default()
                        .value(row.unread as u64)
                        .style(Style::default().fg(Color::Yellow)),
                ];
                progress = progress.data(
                    BarGroup::default()
                        .label(Line::from(row.genre))
                        .bars(&bars),
                );
            }
            frame.render_widget(progress, rows[2]);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) => &[
                ("[Tab]", "Next Field"),
                ("[←→]", "Change"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::ConfirmRemove(_)) => &[("[Y]", "Remove"), ("[N]", "Cancel")],
            (Screen::Library, _) => &[
                ("[↑↓]", "Navigate"),
                ("[t]", "Status"),
                ("[g]", "Genre"),
                ("[o]", "Sort"),
                ("[+]", "Add"),
                ("[-]", "Remove"),
                ("[q]", "Quit"),
            ],
            (Screen::Search(_), _) => &[
                ("[Tab]", "Field"),
                ("[↑↓]", "Navigate"),
                ("[Esc]", "Back"),
            ],
            (Screen::Remove(_), _) => &[
                ("[↑↓]", "Navigate"),
                ("[Enter]", "Remove"),
                ("[Esc]", "Back"),
            ],
            (Screen::Statistics(_), _) => &[("[1-5]", "Views"), ("[Esc]", "Back"), ("[q]", "Quit")],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (idx, (key, action)) in hints.iter().enumerate() {
            spans.push(Span::styled(*key, key_style));
            let gap = if idx + 1 == hints.len() { "" } else { "   " };
            spans.push(Span::raw(format!(" {action}{gap}")));
        }
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = form
            .visible_fields()
            .into_iter()
            .map(|field| form.build_line(field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save, Tab to switch, Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if let Some((col, row)) = form.cursor_offset() {
            frame.set_cursor_position((inner.x + col as u16, inner.y + row as u16));
        }
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(format!("Remove '{}'?", confirm.title))];
        if confirm.matches > 1 {
            lines.push(Line::from(Span::styled(
                format!(
                    "{} books share this title; all of them will be removed.",
                    confirm.matches
                ),
                Style::default().fg(Color::Yellow),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn render_book_cards(&self, frame: &mut Frame, area: Rect, books: &[Book], selected: usize) {
        if books.is_empty() || area.height == 0 {
            return;
        }

        let card_height = BOOK_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = books.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(BOOK_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            if chunk.height == 0 {
                continue;
            }
            let book_index = start + idx;
            let Some(book) = books.get(book_index) else {
                break;
            };

            let is_selected = book_index == selected;
            let mut block = Block::default().borders(Borders::ALL);
            if is_selected {
                block = block.border_style(Style::default().fg(Color::Yellow));
            }

            let paragraph = Paragraph::new(book_card_lines(book, is_selected))
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left);
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn open_add_form(&mut self) -> Mode {
        self.clear_status();
        Mode::AddingBook(BookForm::default())
    }

    fn open_screen(&mut self, screen: Screen) {
        self.clear_status();
        if matches!(screen, Screen::Library) {
            self.library.refresh(&self.books);
        }
        self.screen = screen;
    }

    fn confirm_removal(&mut self, title: String) -> Mode {
        self.clear_status();
        let matches = catalog::count_by_title(&self.books, &title);
        Mode::ConfirmRemove(ConfirmRemove { title, matches })
    }

    /// Validate and persist the form's book. The in-memory collection only
    /// changes once the file write succeeded.
    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let updated = catalog::add(&self.books, form.to_candidate())?;
        self.store
            .save(&updated)
            .context("book was not saved")
            .inspect_err(|err| warn!(error = %format!("{err:#}"), "add failed"))?;

        let added = updated.last().cloned();
        self.books = updated;
        self.refresh_views();
        if let Some(book) = added {
            info!(book = %book, "added book");
            if let Some(idx) = self.library.visible.iter().position(|b| *b == book) {
                self.library.selected = idx;
            }
        }
        self.set_status("Book added successfully to your library!", StatusKind::Info);
        Ok(())
    }

    fn perform_remove(&mut self, confirm: &ConfirmRemove) -> Result<()> {
        let updated = catalog::remove(&self.books, &confirm.title);
        let removed = self.books.len() - updated.len();
        if removed == 0 {
            self.set_status(
                format!("No book titled '{}' in the library.", confirm.title),
                StatusKind::Info,
            );
            return Ok(());
        }
        self.store
            .save(&updated)
            .context("book was not removed")
            .inspect_err(|err| warn!(error = %format!("{err:#}"), "remove failed"))?;

        self.books = updated;
        self.refresh_views();
        info!(title = %confirm.title, removed, "removed books");
        if removed == 1 {
            self.set_status("Book removed successfully!", StatusKind::Info);
        } else {
            self.set_status(
                format!("{removed} books titled '{}' removed successfully!", confirm.title),
                StatusKind::Info,
            );
        }
        Ok(())
    }

    /// Recompute every derived view after the collection changed.
    fn refresh_views(&mut self) {
        self.library.refresh(&self.books);
        match &mut self.screen {
            Screen::Library => {}
            Screen::Search(search) => search.refresh(&self.books),
            Screen::Remove(remove) => remove.refresh(&self.books),
            Screen::Statistics(stats) => stats.refresh(&self.books),
        }
    }
}
