//! Command line surface. Without a subcommand the binary opens the terminal
//! UI; the subcommands run one catalog operation and print plain text.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::catalog::{SearchField, SortField, StatusFilter};

#[derive(Debug, Parser)]
#[command(name = "library-manager", version, about = "Personal library manager")]
pub struct Cli {
    /// Library file to use (default: ~/.personal-library/library.json)
    #[arg(long, global = true, env = "LIBRARY_MANAGER_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List books, optionally filtered and sorted
    List {
        /// all, read or unread
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Only show books of this exact genre
        #[arg(long)]
        genre: Option<String>,
        /// title, author, year or genre
        #[arg(long, default_value = "title")]
        sort: SortField,
    },
    /// Search books by a case-insensitive substring
    Search {
        /// title, author or genre
        #[arg(long, default_value = "title")]
        by: SearchField,
        term: String,
    },
    /// Add a book to the library
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "")]
        year: String,
        #[arg(long, default_value = "")]
        genre: String,
        /// Mark the book as read
        #[arg(long)]
        read: bool,
        /// 1-5, only kept for read books
        #[arg(long)]
        rating: Option<u8>,
    },
    /// Remove every book with this exact title
    Remove { title: String },
    /// Print library statistics
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_terminal_ui() {
        let cli = Cli::try_parse_from(["library-manager"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn list_defaults() {
        let cli = Cli::try_parse_from(["library-manager", "list"]).expect("parses");
        assert_eq!(
            cli.command,
            Some(Command::List {
                status: StatusFilter::All,
                genre: None,
                sort: SortField::Title,
            })
        );
    }

    #[test]
    fn search_and_file_flag() {
        let cli = Cli::try_parse_from([
            "library-manager",
            "search",
            "--by",
            "Author",
            "king",
            "--file",
            "/tmp/books.json",
        ])
        .expect("parses");
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/books.json")));
        assert_eq!(
            cli.command,
            Some(Command::Search {
                by: SearchField::Author,
                term: "king".into(),
            })
        );
    }

    #[test]
    fn add_with_rating() {
        let cli = Cli::try_parse_from([
            "library-manager",
            "add",
            "--title",
            "Dune",
            "--author",
            "Herbert",
            "--read",
            "--rating",
            "5",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Add {
                title, read, rating, ..
            }) => {
                assert_eq!(title, "Dune");
                assert!(read);
                assert_eq!(rating, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        assert!(Cli::try_parse_from(["library-manager", "list", "--sort", "rating"]).is_err());
    }
}
