//! Pure operations over the in-memory collection. Nothing here touches the
//! disk or holds state: each function borrows the current books and hands
//! back a fresh `Vec`, leaving the caller to decide when to persist.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{ParseFieldError, ValidationError};
use crate::models::{Book, MAX_RATING, MIN_RATING};

/// Validate `candidate` and append it unchanged. Title and author must be
/// non-empty; an unread book never keeps a rating.
pub fn add(books: &[Book], mut candidate: Book) -> Result<Vec<Book>, ValidationError> {
    if candidate.title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if candidate.author.is_empty() {
        return Err(ValidationError::MissingAuthor);
    }

    if !candidate.read {
        candidate.rating = None;
    }
    if let Some(value) = candidate.rating {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(ValidationError::RatingOutOfRange(value));
        }
    }

    let mut updated = Vec::with_capacity(books.len() + 1);
    updated.extend_from_slice(books);
    updated.push(candidate);
    Ok(updated)
}

/// Drop every book whose title matches exactly. Duplicate titles all go.
pub fn remove(books: &[Book], title: &str) -> Vec<Book> {
    books
        .iter()
        .filter(|book| book.title != title)
        .cloned()
        .collect()
}

/// Read-status filter offered by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Read,
    Unread,
}

impl StatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Read => "Read",
            StatusFilter::Unread => "Unread",
        }
    }

    /// Next option in the cycle All → Read → Unread → All.
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Read,
            StatusFilter::Read => StatusFilter::Unread,
            StatusFilter::Unread => StatusFilter::All,
        }
    }

    fn matches(self, book: &Book) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Read => book.read,
            StatusFilter::Unread => !book.read,
        }
    }
}

pub fn filter_by_status(books: &[Book], status: StatusFilter) -> Vec<Book> {
    books
        .iter()
        .filter(|book| status.matches(book))
        .cloned()
        .collect()
}

/// Genre filter. `All` is the "All Genres" entry at the top of the picker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Only(String),
}

impl GenreFilter {
    pub const ALL_LABEL: &'static str = "All Genres";

    pub fn label(&self) -> &str {
        match self {
            GenreFilter::All => Self::ALL_LABEL,
            GenreFilter::Only(genre) => genre,
        }
    }
}

impl From<Option<String>> for GenreFilter {
    fn from(genre: Option<String>) -> Self {
        genre.map_or(GenreFilter::All, GenreFilter::Only)
    }
}

/// Exact genre match. Books without a genre are selected by "Unknown", the
/// same bucket the statistics put them in.
pub fn filter_by_genre(books: &[Book], genre: &GenreFilter) -> Vec<Book> {
    match genre {
        GenreFilter::All => books.to_vec(),
        GenreFilter::Only(wanted) => books
            .iter()
            .filter(|book| book.genre_or_unknown() == wanted.as_str())
            .cloned()
            .collect(),
    }
}

/// Fields the search view can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Title,
    Author,
    Genre,
}

impl SearchField {
    pub fn label(self) -> &'static str {
        match self {
            SearchField::Title => "Title",
            SearchField::Author => "Author",
            SearchField::Genre => "Genre",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SearchField::Title => SearchField::Author,
            SearchField::Author => SearchField::Genre,
            SearchField::Genre => SearchField::Title,
        }
    }

    fn value(self, book: &Book) -> &str {
        match self {
            SearchField::Title => &book.title,
            SearchField::Author => &book.author,
            SearchField::Genre => &book.genre,
        }
    }
}

/// Case-insensitive substring search. An empty term matches nothing: the
/// search only runs once the user has typed something.
pub fn search(books: &[Book], field: SearchField, term: &str) -> Vec<Book> {
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    books
        .iter()
        .filter(|book| field.value(book).to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Sort keys offered by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
}

impl SortField {
    pub fn label(self) -> &'static str {
        match self {
            SortField::Title => "Title",
            SortField::Author => "Author",
            SortField::Year => "Year",
            SortField::Genre => "Genre",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortField::Title => SortField::Author,
            SortField::Author => SortField::Year,
            SortField::Year => SortField::Genre,
            SortField::Genre => SortField::Title,
        }
    }

    fn key(self, book: &Book) -> &str {
        match self {
            SortField::Title => &book.title,
            SortField::Author => &book.author,
            SortField::Year => &book.year,
            SortField::Genre => &book.genre,
        }
    }
}

/// Stable ascending sort on the raw string value of `field`. Years are
/// compared as text, so "999" sorts after "1965".
pub fn sort_by(books: &[Book], field: SortField) -> Vec<Book> {
    let mut sorted = books.to_vec();
    sorted.sort_by(|a, b| field.key(a).cmp(field.key(b)));
    sorted
}

/// Aggregate numbers for the statistics view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stats {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
    /// Share of read books in percent; 0 for an empty library.
    pub completion_percentage: f64,
    pub genre_counts: BTreeMap<String, usize>,
    /// Only genres with at least one read book appear here.
    pub read_by_genre: BTreeMap<String, usize>,
    /// Only genres with at least one unread book appear here.
    pub unread_by_genre: BTreeMap<String, usize>,
}

/// One row of the read/unread breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreProgress {
    pub genre: String,
    pub read: usize,
    pub unread: usize,
}

impl Stats {
    /// Every genre from either histogram with both counts filled in, zero
    /// where a genre has no books of that status.
    pub fn genre_progress(&self) -> Vec<GenreProgress> {
        let genres: BTreeSet<&String> = self
            .read_by_genre
            .keys()
            .chain(self.unread_by_genre.keys())
            .collect();
        genres
            .into_iter()
            .map(|genre| GenreProgress {
                genre: genre.clone(),
                read: self.read_by_genre.get(genre).copied().unwrap_or(0),
                unread: self.unread_by_genre.get(genre).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Share of the library held by `count` books, in percent.
    pub fn share(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

pub fn statistics(books: &[Book]) -> Stats {
    let mut stats = Stats {
        total: books.len(),
        ..Stats::default()
    };

    for book in books {
        let genre = book.genre_or_unknown().to_string();
        *stats.genre_counts.entry(genre.clone()).or_insert(0) += 1;
        if book.read {
            stats.read += 1;
            *stats.read_by_genre.entry(genre).or_insert(0) += 1;
        } else {
            *stats.unread_by_genre.entry(genre).or_insert(0) += 1;
        }
    }

    stats.unread = stats.total - stats.read;
    stats.completion_percentage = stats.share(stats.read);
    stats
}

/// Sorted, de-duplicated genres present in the collection, blank ones listed
/// as "Unknown". Used to build the genre filter options.
pub fn distinct_genres(books: &[Book]) -> Vec<String> {
    books
        .iter()
        .map(|book| book.genre_or_unknown().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Titles in first-seen order, each listed once even when shared.
pub fn distinct_titles(books: &[Book]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    books
        .iter()
        .filter(|book| seen.insert(book.title.as_str()))
        .map(|book| book.title.clone())
        .collect()
}

/// First book carrying `title`, if any.
pub fn find_by_title<'a>(books: &'a [Book], title: &str) -> Option<&'a Book> {
    books.iter().find(|book| book.title == title)
}

/// How many entries a removal of `title` would delete.
pub fn count_by_title(books: &[Book], title: &str) -> usize {
    books.iter().filter(|book| book.title == title).count()
}

macro_rules! field_names {
    ($ty:ty, $kind:literal, $expected:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ParseFieldError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    _ => Err(ParseFieldError {
                        kind: $kind,
                        value: value.to_string(),
                        expected: $expected,
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

field_names!(StatusFilter, "status", "all, read, unread", {
    "all" => StatusFilter::All,
    "read" => StatusFilter::Read,
    "unread" => StatusFilter::Unread,
});

field_names!(SearchField, "search field", "title, author, genre", {
    "title" => SearchField::Title,
    "author" => SearchField::Author,
    "genre" => SearchField::Genre,
});

field_names!(SortField, "sort field", "title, author, year, genre", {
    "title" => SortField::Title,
    "author" => SortField::Author,
    "year" => SortField::Year,
    "genre" => SortField::Genre,
});

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::UNKNOWN_GENRE;

    fn dune() -> Book {
        Book::new("Dune", "Herbert")
            .with_year("1965")
            .with_genre("Science Fiction")
            .mark_read(Some(5))
    }

    fn it() -> Book {
        Book::new("It", "King").with_year("1986").with_genre("Fiction")
    }

    fn sample() -> Vec<Book> {
        vec![dune(), it()]
    }

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|book| book.title.as_str()).collect()
    }

    #[test]
    fn add_appends_and_keeps_order() {
        let books = sample();
        let updated = add(&books, Book::new("Emma", "Austen")).expect("valid book");
        assert_eq!(updated.len(), books.len() + 1);
        assert_eq!(&updated[..2], &books[..]);
        assert_eq!(updated[2].title, "Emma");
    }

    #[test]
    fn add_rejects_blank_title_or_author() {
        let books = sample();
        assert_eq!(
            add(&books, Book::new("", "Austen")),
            Err(ValidationError::MissingTitle)
        );
        assert_eq!(
            add(&books, Book::new("Emma", "")),
            Err(ValidationError::MissingAuthor)
        );
        assert_eq!(books, sample());
    }

    #[test]
    fn add_clears_rating_of_unread_book() {
        let mut candidate = Book::new("Emma", "Austen");
        candidate.rating = Some(4);
        let updated = add(&[], candidate).expect("valid book");
        assert_eq!(updated[0].rating, None);
        assert!(!updated[0].read);
    }

    #[test]
    fn add_ignores_out_of_range_rating_when_unread() {
        let mut candidate = Book::new("Emma", "Austen");
        candidate.rating = Some(9);
        assert!(add(&[], candidate).is_ok());
    }

    #[test]
    fn add_rejects_out_of_range_rating_when_read() {
        let candidate = Book::new("Emma", "Austen").mark_read(Some(0));
        assert_eq!(
            add(&[], candidate),
            Err(ValidationError::RatingOutOfRange(0))
        );
        let candidate = Book::new("Emma", "Austen").mark_read(Some(6));
        assert_eq!(
            add(&[], candidate),
            Err(ValidationError::RatingOutOfRange(6))
        );
    }

    #[test]
    fn add_stores_fields_as_given() {
        let candidate = Book::new("  Emma ", " ")
            .with_year(" 1815 ")
            .with_genre(" Fiction");
        let updated = add(&[], candidate.clone()).expect("non-empty fields are valid");
        assert_eq!(updated, vec![candidate]);

        let remaining = remove(&updated, "  Emma ");
        assert!(remaining.is_empty());
    }

    #[test]
    fn add_allows_duplicate_titles() {
        let updated = add(&sample(), Book::new("Dune", "Someone Else")).expect("valid book");
        assert_eq!(count_by_title(&updated, "Dune"), 2);
    }

    #[test]
    fn remove_drops_every_match() {
        let mut books = sample();
        books.push(Book::new("Dune", "Another"));
        let updated = remove(&books, "Dune");
        assert_eq!(titles(&updated), vec!["It"]);
    }

    #[test]
    fn remove_is_case_sensitive_and_noop_on_miss() {
        let books = sample();
        assert_eq!(remove(&books, "dune"), books);
        assert_eq!(remove(&books, "Missing"), books);
    }

    #[test]
    fn removed_unique_title_is_no_longer_found() {
        let updated = remove(&sample(), "It");
        assert!(search(&updated, SearchField::Title, "It").is_empty());
    }

    #[test]
    fn status_filter_all_is_identity() {
        let books = sample();
        assert_eq!(filter_by_status(&books, StatusFilter::All), books);
        assert!(filter_by_status(&[], StatusFilter::All).is_empty());
    }

    #[test]
    fn status_filter_read_and_unread() {
        let books = sample();
        assert_eq!(titles(&filter_by_status(&books, StatusFilter::Read)), vec!["Dune"]);
        assert_eq!(titles(&filter_by_status(&books, StatusFilter::Unread)), vec!["It"]);
    }

    #[test]
    fn genre_filter_exact_match() {
        let books = sample();
        assert_eq!(filter_by_genre(&books, &GenreFilter::All), books);
        let fiction = filter_by_genre(&books, &GenreFilter::Only("Fiction".into()));
        assert_eq!(titles(&fiction), vec!["It"]);
        let lower = filter_by_genre(&books, &GenreFilter::Only("fiction".into()));
        assert!(lower.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let books = sample();
        assert_eq!(titles(&search(&books, SearchField::Author, "king")), vec!["It"]);
        assert_eq!(titles(&search(&books, SearchField::Genre, "FICTION")), vec!["Dune", "It"]);
        assert_eq!(titles(&search(&books, SearchField::Title, "un")), vec!["Dune"]);
    }

    #[test]
    fn empty_search_term_matches_nothing() {
        assert!(search(&sample(), SearchField::Title, "").is_empty());
    }

    #[test]
    fn sort_is_stable_and_idempotent() {
        let books = vec![
            Book::new("B", "x").with_genre("Fantasy"),
            Book::new("A", "y").with_genre("History"),
            Book::new("C", "z").with_genre("Fantasy"),
            Book::new("D", "w"),
        ];
        let by_genre = sort_by(&books, SortField::Genre);
        assert_eq!(titles(&by_genre), vec!["D", "B", "C", "A"]);
        assert_eq!(sort_by(&by_genre, SortField::Genre), by_genre);

        let by_title = sort_by(&books, SortField::Title);
        assert_eq!(titles(&by_title), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn sort_by_year_is_lexicographic() {
        let books = vec![
            Book::new("new", "a").with_year("1965"),
            Book::new("old", "b").with_year("999"),
        ];
        assert_eq!(titles(&sort_by(&books, SortField::Year)), vec!["new", "old"]);
    }

    #[test]
    fn statistics_of_empty_library() {
        let stats = statistics(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_percentage, 0.0);
        assert!(stats.genre_counts.is_empty());
        assert!(stats.genre_progress().is_empty());
    }

    #[test]
    fn statistics_scenario() {
        let stats = statistics(&sample());
        assert_eq!(stats.total, 2);
        assert_eq!(stats.read, 1);
        assert_eq!(stats.unread, 1);
        assert_eq!(stats.completion_percentage, 50.0);
        assert_eq!(
            stats.genre_counts,
            BTreeMap::from([("Science Fiction".to_string(), 1), ("Fiction".to_string(), 1)])
        );
        assert_eq!(stats.read_by_genre, BTreeMap::from([("Science Fiction".to_string(), 1)]));
        assert_eq!(stats.unread_by_genre, BTreeMap::from([("Fiction".to_string(), 1)]));
    }

    #[test]
    fn genre_progress_fills_missing_side_with_zero() {
        let stats = statistics(&sample());
        assert_eq!(
            stats.genre_progress(),
            vec![
                GenreProgress {
                    genre: "Fiction".into(),
                    read: 0,
                    unread: 1,
                },
                GenreProgress {
                    genre: "Science Fiction".into(),
                    read: 1,
                    unread: 0,
                },
            ]
        );
    }

    #[test]
    fn blank_genre_counts_as_unknown() {
        let stats = statistics(&[Book::new("a", "b")]);
        assert_eq!(stats.genre_counts.get("Unknown"), Some(&1));
    }

    #[test]
    fn blank_genre_is_filtered_as_unknown() {
        let mut books = sample();
        books.push(Book::new("Emma", "Austen"));
        assert_eq!(
            distinct_genres(&books),
            vec!["Fiction", "Science Fiction", UNKNOWN_GENRE]
        );
        let unknown = filter_by_genre(&books, &GenreFilter::Only(UNKNOWN_GENRE.into()));
        assert_eq!(titles(&unknown), vec!["Emma"]);
        assert_eq!(statistics(&books).genre_counts.get(UNKNOWN_GENRE), Some(&1));
    }

    #[test]
    fn distinct_helpers() {
        let mut books = sample();
        books.push(Book::new("Dune", "Other").with_genre("Fiction"));
        assert_eq!(distinct_genres(&books), vec!["Fiction", "Science Fiction"]);
        assert_eq!(distinct_titles(&books), vec!["Dune", "It"]);
        assert_eq!(find_by_title(&books, "Dune"), Some(&dune()));
        assert_eq!(find_by_title(&books, "Nope"), None);
    }

    #[test]
    fn field_names_parse_case_insensitively() {
        assert_eq!("READ".parse::<StatusFilter>(), Ok(StatusFilter::Read));
        assert_eq!(" author ".parse::<SearchField>(), Ok(SearchField::Author));
        assert_eq!("year".parse::<SortField>(), Ok(SortField::Year));
        let err = "rating".parse::<SortField>().unwrap_err();
        assert_eq!(err.kind, "sort field");
        assert_eq!(SortField::Genre.to_string(), "Genre");
    }

    #[test]
    fn cycles_wrap_around() {
        assert_eq!(StatusFilter::Unread.next(), StatusFilter::All);
        assert_eq!(SearchField::Genre.next(), SearchField::Title);
        assert_eq!(SortField::Genre.next(), SortField::Title);
    }
}
