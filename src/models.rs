//! Domain model for the library. `Book` mirrors one record of the JSON
//! document on disk, so the serde attributes here define the file format:
//! every field is always written (an unrated book carries `"rating": null`)
//! and everything except `title` and `author` falls back to a default when a
//! hand-edited file leaves it out.

use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Genres offered by the add form, in the order they are presented. Books
/// loaded from disk may carry any other string; the list is a suggestion,
/// not a constraint.
pub const GENRES: &[&str] = &[
    "Fiction",
    "Non-Fiction",
    "Science Fiction",
    "Fantasy",
    "Mystery",
    "Biography",
    "History",
    "Self-Help",
    "Other",
];

/// Bucket used by the statistics when a book has no genre at all.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Lowest and highest rating a read book can carry.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single catalogued book.
pub struct Book {
    /// Display title. Acts as the lookup key for removal, although nothing
    /// prevents two books from sharing one.
    pub title: String,
    pub author: String,
    /// Publication year kept as free text ("1965", "c. 1600", "").
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub read: bool,
    /// Star rating between [`MIN_RATING`] and [`MAX_RATING`]. Only
    /// meaningful when `read` is set. A stored value that is not a whole
    /// number in range loads as no rating rather than failing the file.
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<u8>,
}

fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRating {
        Whole(u64),
        Other(IgnoredAny),
    }

    let rating = match Option::<RawRating>::deserialize(deserializer)? {
        Some(RawRating::Whole(value)) => u8::try_from(value)
            .ok()
            .filter(|value| (MIN_RATING..=MAX_RATING).contains(value)),
        Some(RawRating::Other(_)) | None => None,
    };
    Ok(rating)
}

impl Book {
    /// Start an unread, unrated book with the two mandatory fields.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: String::new(),
            genre: String::new(),
            read: false,
            rating: None,
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    /// Mark the book as read with an optional rating.
    pub fn mark_read(mut self, rating: Option<u8>) -> Self {
        self.read = true;
        self.rating = rating;
        self
    }

    /// Badge text shown next to the title in listings.
    pub fn status_label(&self) -> &'static str {
        if self.read {
            "READ"
        } else {
            "UNREAD"
        }
    }

    /// One star per rating point, or an empty string for unread or unrated
    /// books.
    pub fn rating_stars(&self) -> String {
        match (self.read, self.rating) {
            (true, Some(rating)) => "*".repeat(usize::from(rating)),
            _ => String::new(),
        }
    }

    /// Genre used for grouping: the stored genre, or [`UNKNOWN_GENRE`] when
    /// it is blank.
    pub fn genre_or_unknown(&self) -> &str {
        if self.genre.trim().is_empty() {
            UNKNOWN_GENRE
        } else {
            &self.genre
        }
    }

    /// `Year | Genre` detail line, skipping whichever side is blank.
    pub fn details_line(&self) -> String {
        let year = self.year.trim();
        let genre = self.genre.trim();
        match (year.is_empty(), genre.is_empty()) {
            (true, true) => String::new(),
            (true, false) => genre.to_string(),
            (false, true) => year.to_string(),
            (false, false) => format!("{year} | {genre}"),
        }
    }
}

impl fmt::Display for Book {
    /// `Title by Author`, the form used in status messages and the command
    /// line output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.author)
    }
}
