//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A catalog book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub genre: Option<String>,
    pub author: String,
    pub image: String,
    pub title: String,
    pub subtitle: String,
    pub publisher: String,
    /// Publication year, kept verbatim as reported by the source
    pub year: String,
    pub pages: i32,
    pub isbn: String,
}

/// Exact-match constraints for book search. Absent fields do not
/// constrain; present fields all have to hold at once.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub id: Option<i32>,
    pub genre: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<String>,
    pub pages: Option<i32>,
    pub isbn: Option<String>,
}

impl BookFilter {
    /// True when no field constrains the search
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.genre.is_none()
            && self.author.is_none()
            && self.image.is_none()
            && self.title.is_none()
            && self.subtitle.is_none()
            && self.publisher.is_none()
            && self.year.is_none()
            && self.pages.is_none()
            && self.isbn.is_none()
    }

    /// Evaluate the conjunction of all present constraints. Equality is
    /// exact and case-sensitive; a book without a genre matches no
    /// genre constraint.
    pub fn matches(&self, book: &Book) -> bool {
        self.id.map_or(true, |id| book.id == id)
            && self
                .genre
                .as_ref()
                .map_or(true, |genre| book.genre.as_deref() == Some(genre.as_str()))
            && self.author.as_ref().map_or(true, |v| &book.author == v)
            && self.image.as_ref().map_or(true, |v| &book.image == v)
            && self.title.as_ref().map_or(true, |v| &book.title == v)
            && self.subtitle.as_ref().map_or(true, |v| &book.subtitle == v)
            && self.publisher.as_ref().map_or(true, |v| &book.publisher == v)
            && self.year.as_ref().map_or(true, |v| &book.year == v)
            && self.pages.map_or(true, |pages| book.pages == pages)
            && self.isbn.as_ref().map_or(true, |v| &book.isbn == v)
    }
}

/// Query parameters for the book listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookQuery {
    pub id: Option<i32>,
    pub genre: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<String>,
    /// Zero or negative values mean the field was not provided
    pub pages: Option<i32>,
    pub isbn: Option<String>,
}

impl From<BookQuery> for BookFilter {
    fn from(query: BookQuery) -> Self {
        BookFilter {
            id: query.id,
            genre: query.genre,
            author: query.author,
            image: query.image,
            title: query.title,
            subtitle: query.subtitle,
            publisher: query.publisher,
            year: query.year,
            // Legacy clients send 0 for "no pages filter"
            pages: query.pages.filter(|pages| *pages > 0),
            isbn: query.isbn,
        }
    }
}

/// Query parameters for the publisher/genre/year search
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookSearchQuery {
    pub publisher: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
}

impl From<BookSearchQuery> for BookFilter {
    fn from(query: BookSearchQuery) -> Self {
        BookFilter {
            publisher: query.publisher,
            genre: query.genre,
            year: query.year,
            ..BookFilter::default()
        }
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    pub genre: Option<String>,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "Image must not be empty"))]
    pub image: String,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Subtitle must not be empty"))]
    pub subtitle: String,
    #[validate(length(min = 1, message = "Publisher must not be empty"))]
    pub publisher: String,
    #[validate(length(min = 1, message = "Year must not be empty"))]
    pub year: String,
    #[validate(range(min = 1, message = "Pages must be positive"))]
    pub pages: i32,
    #[validate(length(min = 1, message = "Isbn must not be empty"))]
    pub isbn: String,
}

/// Update book request. The id has to match the path parameter.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub id: i32,
    pub genre: Option<String>,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "Image must not be empty"))]
    pub image: String,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Subtitle must not be empty"))]
    pub subtitle: String,
    #[validate(length(min = 1, message = "Publisher must not be empty"))]
    pub publisher: String,
    #[validate(length(min = 1, message = "Year must not be empty"))]
    pub year: String,
    #[validate(range(min = 1, message = "Pages must be positive"))]
    pub pages: i32,
    #[validate(length(min = 1, message = "Isbn must not be empty"))]
    pub isbn: String,
}

/// Transfer shape for books resolved by ISBN, mirroring the Open
/// Library record layout
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDto {
    pub isbn: String,
    pub title: String,
    pub subtitle: String,
    pub publishers: Vec<String>,
    pub publish_date: String,
    pub number_of_pages: i32,
    pub authors: Vec<String>,
    /// Cover location, kept off the wire
    #[serde(skip_serializing)]
    pub image_url: String,
}

impl From<&Book> for BookDto {
    fn from(book: &Book) -> Self {
        BookDto {
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            subtitle: book.subtitle.clone(),
            publishers: vec![book.publisher.clone()],
            publish_date: book.year.clone(),
            number_of_pages: book.pages,
            authors: vec![book.author.clone()],
            image_url: book.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn novel() -> Book {
        Book {
            id: 1,
            genre: Some("Fantasy".to_string()),
            author: "Ursula K. Le Guin".to_string(),
            image: "earthsea.png".to_string(),
            title: "A Wizard of Earthsea".to_string(),
            subtitle: "The Earthsea Cycle".to_string(),
            publisher: "Parnassus Press".to_string(),
            year: "1968".to_string(),
            pages: 183,
            isbn: "9780547773742".to_string(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = BookFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&novel()));
    }

    #[test]
    fn test_filter_combines_constraints() {
        let filter = BookFilter {
            author: Some("Ursula K. Le Guin".to_string()),
            year: Some("1968".to_string()),
            ..BookFilter::default()
        };
        assert!(filter.matches(&novel()));

        let narrowed = BookFilter {
            pages: Some(200),
            ..filter
        };
        assert!(!narrowed.matches(&novel()));
    }

    #[test]
    fn test_filter_equality_is_case_sensitive() {
        let filter = BookFilter {
            author: Some("ursula k. le guin".to_string()),
            ..BookFilter::default()
        };
        assert!(!filter.matches(&novel()));
    }

    #[test]
    fn test_filter_genre_constraint_skips_genreless_books() {
        let mut book = novel();
        book.genre = None;
        let filter = BookFilter {
            genre: Some("Fantasy".to_string()),
            ..BookFilter::default()
        };
        assert!(!filter.matches(&book));
    }

    #[test]
    fn test_query_pages_zero_means_unconstrained() {
        // Preserved quirk: 0 (and anything below) is the legacy "no
        // filter" sentinel, not a constraint that matches nothing
        let filter = BookFilter::from(BookQuery {
            pages: Some(0),
            ..BookQuery::default()
        });
        assert!(filter.pages.is_none());
        assert!(filter.matches(&novel()));
    }

    #[test]
    fn test_query_pages_negative_means_unconstrained() {
        let filter = BookFilter::from(BookQuery {
            pages: Some(-7),
            ..BookQuery::default()
        });
        assert!(filter.pages.is_none());
    }

    #[test]
    fn test_query_pages_positive_constrains() {
        let filter = BookFilter::from(BookQuery {
            pages: Some(183),
            ..BookQuery::default()
        });
        assert_eq!(filter.pages, Some(183));
        assert!(filter.matches(&novel()));
    }

    #[test]
    fn test_search_query_maps_onto_filter() {
        let filter = BookFilter::from(BookSearchQuery {
            publisher: Some("Parnassus Press".to_string()),
            genre: None,
            year: Some("1968".to_string()),
        });
        assert!(filter.matches(&novel()));
        assert!(filter.id.is_none() && filter.author.is_none());
    }

    #[test]
    fn test_dto_wraps_single_author_and_publisher() {
        let dto = BookDto::from(&novel());
        assert_eq!(dto.authors, vec!["Ursula K. Le Guin".to_string()]);
        assert_eq!(dto.publishers, vec!["Parnassus Press".to_string()]);
        assert_eq!(dto.publish_date, "1968");
        assert_eq!(dto.number_of_pages, 183);
    }

    #[test]
    fn test_dto_serialization_excludes_image_url() {
        let value = serde_json::to_value(BookDto::from(&novel())).expect("serialization failed");
        assert!(value.get("image_url").is_none());
        assert_eq!(value["isbn"], "9780547773742");
    }
}
