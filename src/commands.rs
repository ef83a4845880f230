//! One-shot subcommands. Each takes the loaded collection, runs a catalog
//! operation, persists if membership changed, and returns the text to print.

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::{self, GenreFilter, SearchField, SortField, Stats, StatusFilter};
use crate::cli::Command;
use crate::models::Book;
use crate::store::LibraryStore;

/// Run `command` against `books`, saving through `store` after an add or a
/// removal that matched something.
pub fn execute(command: Command, store: &LibraryStore, books: &[Book]) -> Result<String> {
    match command {
        Command::List {
            status,
            genre,
            sort,
        } => Ok(list(books, status, &GenreFilter::from(genre), sort)),
        Command::Search { by, term } => Ok(search(books, by, &term)),
        Command::Add {
            title,
            author,
            year,
            genre,
            read,
            rating,
        } => {
            let mut candidate = Book::new(title.trim(), author.trim())
                .with_year(year.trim())
                .with_genre(genre.trim());
            candidate.read = read;
            candidate.rating = rating;
            let updated = catalog::add(books, candidate)?;
            store.save(&updated).context("book was not added")?;
            let added = updated.last().map(ToString::to_string).unwrap_or_default();
            info!(book = %added, "added book");
            Ok(format!("Added {added}."))
        }
        Command::Remove { title } => {
            let matches = catalog::count_by_title(books, &title);
            if matches == 0 {
                return Ok(format!("No book titled '{title}' in the library."));
            }
            let updated = catalog::remove(books, &title);
            store.save(&updated).context("book was not removed")?;
            info!(%title, removed = matches, "removed books");
            Ok(if matches == 1 {
                format!("Removed '{title}'.")
            } else {
                format!("Removed {matches} books titled '{title}'.")
            })
        }
        Command::Stats => Ok(render_stats(&catalog::statistics(books))),
    }
}

fn list(books: &[Book], status: StatusFilter, genre: &GenreFilter, sort: SortField) -> String {
    let filtered = catalog::filter_by_genre(&catalog::filter_by_status(books, status), genre);
    let sorted = catalog::sort_by(&filtered, sort);
    if sorted.is_empty() {
        return "No books match your criteria or your library is empty.".to_string();
    }
    render_books(&sorted)
}

fn search(books: &[Book], field: SearchField, term: &str) -> String {
    let results = catalog::search(books, field, term);
    if results.is_empty() {
        return format!("No books found matching '{term}' in {field}.");
    }
    let noun = if results.len() == 1 { "book" } else { "books" };
    format!(
        "Found {} matching {noun}!\n{}",
        results.len(),
        render_books(&results)
    )
}

/// One line per book: `Title by Author [READ] (1965 | Genre) *****`.
pub fn render_books(books: &[Book]) -> String {
    books.iter().map(book_line).collect::<Vec<_>>().join("\n")
}

fn book_line(book: &Book) -> String {
    let mut line = format!("{book} [{}]", book.status_label());
    let details = book.details_line();
    if !details.is_empty() {
        line.push_str(&format!(" ({details})"));
    }
    let stars = book.rating_stars();
    if !stars.is_empty() {
        line.push(' ');
        line.push_str(&stars);
    }
    line
}

pub fn render_stats(stats: &Stats) -> String {
    if stats.total == 0 {
        return "Add some books to view statistics!".to_string();
    }

    let mut lines = vec![
        format!("Total books:     {}", stats.total),
        format!("Books read:      {}", stats.read),
        format!("Books unread:    {}", stats.unread),
        format!("Completion rate: {:.1}%", stats.completion_percentage),
        String::new(),
        "Genre distribution:".to_string(),
    ];
    lines.extend(
        stats
            .genre_counts
            .iter()
            .map(|(genre, count)| format!("  {genre}: {count} ({:.1}%)", stats.share(*count))),
    );
    if stats.read > 0 {
        lines.push(String::new());
        lines.push("Reading progress:".to_string());
        lines.extend(
            stats
                .genre_progress()
                .into_iter()
                .map(|row| format!("  {}: {} read, {} unread", row.genre, row.read, row.unread)),
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn sample() -> Vec<Book> {
        vec![
            Book::new("Dune", "Herbert")
                .with_year("1965")
                .with_genre("Science Fiction")
                .mark_read(Some(5)),
            Book::new("It", "King").with_year("1986").with_genre("Fiction"),
        ]
    }

    #[test]
    fn list_filters_and_formats() {
        let out = list(&sample(), StatusFilter::Read, &GenreFilter::All, SortField::Title);
        assert_eq!(out, "Dune by Herbert [READ] (1965 | Science Fiction) *****");
    }

    #[test]
    fn list_reports_empty_result() {
        let out = list(
            &sample(),
            StatusFilter::All,
            &GenreFilter::Only("Poetry".into()),
            SortField::Title,
        );
        assert_eq!(out, "No books match your criteria or your library is empty.");
    }

    #[test]
    fn search_reports_count_or_miss() {
        let out = search(&sample(), SearchField::Author, "king");
        assert_eq!(out, "Found 1 matching book!\nIt by King [UNREAD] (1986 | Fiction)");
        let out = search(&sample(), SearchField::Genre, "poetry");
        assert_eq!(out, "No books found matching 'poetry' in Genre.");
    }

    #[test]
    fn stats_text() {
        let out = render_stats(&catalog::statistics(&sample()));
        assert!(out.contains("Total books:     2"));
        assert!(out.contains("Completion rate: 50.0%"));
        assert!(out.contains("  Fiction: 1 (50.0%)"));
        assert!(out.contains("  Science Fiction: 1 read, 0 unread"));
        assert_eq!(
            render_stats(&catalog::statistics(&[])),
            "Add some books to view statistics!"
        );
    }

    #[test]
    fn add_persists() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path().join("library.json"));
        let command = Command::Add {
            title: "Emma".into(),
            author: "Austen".into(),
            year: "1815".into(),
            genre: "Fiction".into(),
            read: false,
            rating: Some(4),
        };
        let out = execute(command, &store, &sample()).expect("add succeeds");
        assert_eq!(out, "Added Emma by Austen.");
        let saved = store.load().expect("loads").books;
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[2].rating, None);
    }

    #[test]
    fn add_trims_command_line_text() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path().join("library.json"));
        let command = Command::Add {
            title: " Emma ".into(),
            author: "Austen ".into(),
            year: " 1815".into(),
            genre: String::new(),
            read: false,
            rating: None,
        };
        let out = execute(command, &store, &[]).expect("add succeeds");
        assert_eq!(out, "Added Emma by Austen.");
        let saved = store.load().expect("loads").books;
        assert_eq!(saved, vec![Book::new("Emma", "Austen").with_year("1815")]);
    }

    #[test]
    fn stats_text_layout() {
        let out = render_stats(&catalog::statistics(&[Book::new("It", "King")]));
        assert_eq!(
            out,
            "Total books:     1\nBooks read:      0\nBooks unread:    1\n\
             Completion rate: 0.0%\n\nGenre distribution:\n  Unknown: 1 (100.0%)"
        );
    }

    #[test]
    fn add_validation_error_does_not_write() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path().join("library.json"));
        let command = Command::Add {
            title: " ".into(),
            author: "Austen".into(),
            year: String::new(),
            genre: String::new(),
            read: false,
            rating: None,
        };
        let err = execute(command, &store, &sample()).expect_err("title missing");
        assert_eq!(err.to_string(), "Title is required.");
        assert!(!store.path().exists());
    }

    #[test]
    fn remove_miss_is_informational() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path().join("library.json"));
        let out = execute(
            Command::Remove {
                title: "Emma".into(),
            },
            &store,
            &sample(),
        )
        .expect("miss is not an error");
        assert_eq!(out, "No book titled 'Emma' in the library.");
        assert!(!store.path().exists());
    }

    #[test]
    fn remove_reports_every_duplicate() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path().join("library.json"));
        let mut books = sample();
        books.push(Book::new("Dune", "Someone"));
        let out = execute(
            Command::Remove {
                title: "Dune".into(),
            },
            &store,
            &books,
        )
        .expect("remove succeeds");
        assert_eq!(out, "Removed 2 books titled 'Dune'.");
        assert_eq!(store.load().expect("loads").books.len(), 1);
    }
}
