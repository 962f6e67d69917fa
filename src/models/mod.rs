//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use chrono::NaiveDate;

// Re-export commonly used types
pub use author::{Author, AuthorForm};
pub use book::{Book, BookDetail, BookForm, BookTitle, BookWithAuthor};
pub use book_instance::{BookInstance, BookInstanceForm, BookInstanceStatus, BookInstanceWithBook};
pub use genre::{Genre, GenreForm};

/// Path prefix of every catalog page
pub const CATALOG_PREFIX: &str = "/catalog";

/// Medium date format for display, e.g. "Jan 2, 1920"
pub fn format_date_med(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Date in the format of an HTML date input: YYYY-MM-DD
pub fn format_form_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_formats() {
        let date = NaiveDate::from_ymd_opt(1920, 1, 2).unwrap();
        assert_eq!(format_date_med(date), "Jan 2, 1920");
        assert_eq!(format_form_date(date), "1920-01-02");
    }
}
