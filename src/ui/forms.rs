use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, GENRES, MAX_RATING, MIN_RATING};

/// Rating preselected when the user marks a book as read.
const DEFAULT_RATING: u8 = 3;

/// Internal representation of the "add book" form.
#[derive(Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    /// Index into [`GENRES`].
    pub(crate) genre: usize,
    pub(crate) read: bool,
    pub(crate) rating: u8,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: String::new(),
            genre: 0,
            read: false,
            rating: DEFAULT_RATING,
            active: BookField::Title,
            error: None,
        }
    }
}

/// Fields of the book form, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
    Read,
    Rating,
}

impl BookField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
            BookField::Genre => "Genre",
            BookField::Read => "Read",
            BookField::Rating => "Rating",
        }
    }

    fn is_text(self) -> bool {
        matches!(self, BookField::Title | BookField::Author | BookField::Year)
    }
}

impl BookForm {
    /// Fields currently on screen. The rating row only appears for read
    /// books.
    pub(crate) fn visible_fields(&self) -> Vec<BookField> {
        let mut fields = vec![
            BookField::Title,
            BookField::Author,
            BookField::Year,
            BookField::Genre,
            BookField::Read,
        ];
        if self.read {
            fields.push(BookField::Rating);
        }
        fields
    }

    /// Move focus forward (`offset > 0`) or backward through the visible
    /// fields, wrapping at either end.
    pub(crate) fn move_focus(&mut self, offset: isize) {
        let fields = self.visible_fields();
        let len = fields.len() as isize;
        let current = fields
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len);
        self.active = fields[next as usize];
    }

    /// Append a character to the active field. Space flips the read toggle
    /// and digits pick a rating; other input on those rows is ignored.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Year => self.year.push(ch),
            BookField::Read if ch == ' ' => self.toggle_read(),
            BookField::Rating => match ch.to_digit(10).and_then(|d| u8::try_from(d).ok()) {
                Some(value) if (MIN_RATING..=MAX_RATING).contains(&value) => self.rating = value,
                _ => return false,
            },
            _ => return false,
        }
        true
    }

    /// Remove the last character from the active text field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            _ => {}
        }
    }

    /// Left/Right on a picker row: cycle genres, nudge the rating, or flip
    /// the read toggle.
    pub(crate) fn adjust(&mut self, delta: isize) {
        match self.active {
            BookField::Genre => {
                let len = GENRES.len() as isize;
                self.genre = (self.genre as isize + delta).rem_euclid(len) as usize;
            }
            BookField::Read => self.toggle_read(),
            BookField::Rating => {
                let next = (self.rating as isize + delta)
                    .clamp(MIN_RATING as isize, MAX_RATING as isize);
                self.rating = next as u8;
            }
            _ => {}
        }
    }

    fn toggle_read(&mut self) {
        self.read = !self.read;
    }

    pub(crate) fn genre_name(&self) -> &'static str {
        GENRES.get(self.genre).copied().unwrap_or("Other")
    }

    /// The book the form describes, before catalog validation. Stray
    /// whitespace around typed text is dropped here, so a blank field
    /// reaches the catalog as empty.
    pub(crate) fn to_candidate(&self) -> Book {
        let mut book = Book::new(self.title.trim(), self.author.trim())
            .with_year(self.year.trim())
            .with_genre(self.genre_name());
        if self.read {
            book = book.mark_read(Some(self.rating));
        }
        book
    }

    fn display_value(&self, field: BookField) -> String {
        match field {
            BookField::Title => self.title.clone(),
            BookField::Author => self.author.clone(),
            BookField::Year => self.year.clone(),
            BookField::Genre => format!("< {} >", self.genre_name()),
            BookField::Read => {
                let mark = if self.read { 'x' } else { ' ' };
                format!("[{mark}] I have read this book")
            }
            BookField::Rating => format!(
                "< {}{} > {}/{}",
                "*".repeat(usize::from(self.rating)),
                ".".repeat(usize::from(MAX_RATING - self.rating)),
                self.rating,
                MAX_RATING
            ),
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.display_value(field);
        let is_active = self.active == field;

        let placeholder = match field {
            BookField::Title | BookField::Author => "<required>",
            _ => "<optional>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor column for the active field, or `None` when the active row is
    /// a picker rather than a text input.
    pub(crate) fn cursor_offset(&self) -> Option<(usize, usize)> {
        if !self.active.is_text() {
            return None;
        }
        let row = self
            .visible_fields()
            .iter()
            .position(|field| *field == self.active)?;
        let prefix = self.active.label().len() + 2;
        let len = match self.active {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
            _ => self.year.chars().count(),
        };
        Some((prefix + len, row))
    }
}

/// Pending removal awaiting confirmation.
#[derive(Clone)]
pub(crate) struct ConfirmRemove {
    pub(crate) title: String,
    /// How many entries share the title; all of them are removed.
    pub(crate) matches: usize,
}
