use crate::catalog::{self, GenreFilter, SearchField, SortField, Stats, StatusFilter};
use crate::models::Book;

use super::helpers::step_selection;

/// "View All Books": the filtered, sorted card list.
pub(crate) struct LibraryScreen {
    pub(crate) status: StatusFilter,
    pub(crate) genre: GenreFilter,
    pub(crate) sort: SortField,
    pub(crate) visible: Vec<Book>,
    pub(crate) selected: usize,
}

impl LibraryScreen {
    pub(crate) fn new(books: &[Book]) -> Self {
        let mut screen = Self {
            status: StatusFilter::All,
            genre: GenreFilter::All,
            sort: SortField::Title,
            visible: Vec::new(),
            selected: 0,
        };
        screen.refresh(books);
        screen
    }

    /// Recompute the visible list after the collection or a filter changed.
    pub(crate) fn refresh(&mut self, books: &[Book]) {
        if let GenreFilter::Only(genre) = &self.genre {
            if !books.iter().any(|book| book.genre_or_unknown() == genre.as_str()) {
                self.genre = GenreFilter::All;
            }
        }
        let by_status = catalog::filter_by_status(books, self.status);
        let by_genre = catalog::filter_by_genre(&by_status, &self.genre);
        self.visible = catalog::sort_by(&by_genre, self.sort);
        self.ensure_in_bounds();
    }

    pub(crate) fn cycle_status(&mut self, books: &[Book]) {
        self.status = self.status.next();
        self.refresh(books);
    }

    /// Step through "All Genres" followed by every genre in the collection.
    pub(crate) fn cycle_genre(&mut self, books: &[Book]) {
        let genres = catalog::distinct_genres(books);
        self.genre = match &self.genre {
            GenreFilter::All => genres.first().cloned().into(),
            GenreFilter::Only(current) => {
                let next = genres
                    .iter()
                    .position(|genre| genre == current)
                    .and_then(|idx| genres.get(idx + 1))
                    .cloned();
                next.into()
            }
        };
        self.refresh(books);
    }

    pub(crate) fn cycle_sort(&mut self, books: &[Book]) {
        self.sort = self.sort.next();
        self.refresh(books);
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.visible.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.visible.get(self.selected)
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }
}

/// "Search Book": live results for the typed term.
#[derive(Default)]
pub(crate) struct SearchScreen {
    pub(crate) field: SearchField,
    pub(crate) term: String,
    pub(crate) results: Vec<Book>,
    pub(crate) selected: usize,
}

impl SearchScreen {
    pub(crate) fn refresh(&mut self, books: &[Book]) {
        self.results = catalog::search(books, self.field, &self.term);
        if self.selected >= self.results.len() {
            self.selected = self.results.len().saturating_sub(1);
        }
    }

    pub(crate) fn push_char(&mut self, ch: char, books: &[Book]) {
        self.term.push(ch);
        self.selected = 0;
        self.refresh(books);
    }

    pub(crate) fn backspace(&mut self, books: &[Book]) {
        self.term.pop();
        self.refresh(books);
    }

    pub(crate) fn cycle_field(&mut self, books: &[Book]) {
        self.field = self.field.next();
        self.selected = 0;
        self.refresh(books);
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.results.len(), offset);
    }
}

/// "Remove Book": pick a title, review it, confirm.
pub(crate) struct RemoveScreen {
    pub(crate) titles: Vec<String>,
    pub(crate) selected: usize,
}

impl RemoveScreen {
    pub(crate) fn new(books: &[Book]) -> Self {
        let mut screen = Self {
            titles: Vec::new(),
            selected: 0,
        };
        screen.refresh(books);
        screen
    }

    pub(crate) fn refresh(&mut self, books: &[Book]) {
        self.titles = catalog::distinct_titles(books);
        if self.selected >= self.titles.len() {
            self.selected = self.titles.len().saturating_sub(1);
        }
    }

    pub(crate) fn focus_title(&mut self, title: &str) {
        if let Some(idx) = self.titles.iter().position(|t| t == title) {
            self.selected = idx;
        }
    }

    pub(crate) fn current_title(&self) -> Option<&str> {
        self.titles.get(self.selected).map(String::as_str)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.titles.len(), offset);
    }
}

/// "Statistics": a snapshot of the aggregate numbers.
pub(crate) struct StatsScreen {
    pub(crate) stats: Stats,
}

impl StatsScreen {
    pub(crate) fn new(books: &[Book]) -> Self {
        Self {
            stats: catalog::statistics(books),
        }
    }

    pub(crate) fn refresh(&mut self, books: &[Book]) {
        self.stats = catalog::statistics(books);
    }
}
