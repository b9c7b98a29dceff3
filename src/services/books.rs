//! Book catalog service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDto, BookFilter, CreateBook, UpdateBook},
    repository::Repository,
    services::open_library::{BookLookup, VolumeRecord},
};

/// Outcome of resolving an ISBN
#[derive(Debug, Clone)]
pub enum Resolved {
    /// The book was already in the catalog
    Existing(BookDto),
    /// The book was fetched from Open Library and persisted
    Created(BookDto),
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    lookup: Arc<dyn BookLookup>,
}

impl BooksService {
    pub fn new(repository: Repository, lookup: Arc<dyn BookLookup>) -> Self {
        Self { repository, lookup }
    }

    pub async fn search(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        self.repository.books.find_all(filter).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        self.repository.books.create(&book).await
    }

    pub async fn update(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        if book.id != id {
            return Err(AppError::IdMismatch(format!(
                "Book id {} does not match payload id {}",
                id, book.id
            )));
        }
        book.validate()?;

        self.get_by_id(id).await?;

        let replacement = Book {
            id,
            genre: book.genre,
            author: book.author,
            image: book.image,
            title: book.title,
            subtitle: book.subtitle,
            publisher: book.publisher,
            year: book.year,
            pages: book.pages,
            isbn: book.isbn,
        };

        self.repository.books.update(&replacement).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;
        self.repository.books.delete(id).await
    }

    /// Look the ISBN up in the catalog first and fall back to Open
    /// Library on a miss, persisting what came back. Lookup and persist
    /// are not atomic, so two concurrent misses can each store a copy.
    pub async fn resolve_by_isbn(&self, isbn: &str) -> AppResult<Resolved> {
        if let Some(book) = self.repository.books.find_by_isbn(isbn).await? {
            return Ok(Resolved::Existing(BookDto::from(&book)));
        }

        let record = self
            .lookup
            .fetch_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with isbn {} not found", isbn)))?;

        let payload = book_from_record(isbn, &record)?;
        let created = self.repository.books.create(&payload).await?;

        tracing::info!("Persisted book {} fetched from Open Library", created.id);

        Ok(Resolved::Created(BookDto::from(&created)))
    }
}

/// Shape an Open Library record into a create payload. The ISBN comes
/// from the caller, not the record.
fn book_from_record(isbn: &str, record: &VolumeRecord) -> AppResult<CreateBook> {
    let author = record
        .authors
        .first()
        .map(|author| author.name.clone())
        .ok_or_else(|| AppError::OpenLibrary(format!("Record for ISBN {} has no author", isbn)))?;
    let publisher = record
        .publishers
        .first()
        .map(|publisher| publisher.name.clone())
        .ok_or_else(|| {
            AppError::OpenLibrary(format!("Record for ISBN {} has no publisher", isbn))
        })?;

    let payload = CreateBook {
        genre: None,
        author,
        image: record.url.clone(),
        title: record.title.clone(),
        subtitle: record.subtitle.clone(),
        publisher,
        year: record.publish_date.clone(),
        pages: record.number_of_pages,
        isbn: isbn.to_string(),
    };

    payload
        .validate()
        .map_err(|_| AppError::OpenLibrary(format!("Record for ISBN {} is not persistable", isbn)))?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repository::{MockBookRepository, MockUserRepository};
    use crate::services::open_library::{MockBookLookup, NamedRef};

    fn create_payload(title: &str, isbn: &str) -> CreateBook {
        CreateBook {
            genre: Some("Classics".to_string()),
            author: "Homer".to_string(),
            image: "odyssey.png".to_string(),
            title: title.to_string(),
            subtitle: "A new translation".to_string(),
            publisher: "Norton".to_string(),
            year: "2018".to_string(),
            pages: 592,
            isbn: isbn.to_string(),
        }
    }

    fn record() -> VolumeRecord {
        VolumeRecord {
            title: "The Odyssey".to_string(),
            subtitle: "A new translation".to_string(),
            publishers: vec![NamedRef {
                name: "Norton".to_string(),
            }],
            authors: vec![
                NamedRef {
                    name: "Homer".to_string(),
                },
                NamedRef {
                    name: "Emily Wilson".to_string(),
                },
            ],
            publish_date: "2018".to_string(),
            number_of_pages: 592,
            url: "https://openlibrary.org/books/OL26331930M".to_string(),
        }
    }

    fn in_memory_service(lookup: MockBookLookup) -> BooksService {
        BooksService::new(Repository::in_memory(), Arc::new(lookup))
    }

    fn mock_service(books: MockBookRepository, lookup: MockBookLookup) -> BooksService {
        let repository = Repository {
            books: Arc::new(books),
            users: Arc::new(MockUserRepository::new()),
        };
        BooksService::new(repository, Arc::new(lookup))
    }

    #[tokio::test]
    async fn test_search_empty_filter_returns_all_in_id_order() {
        let service = in_memory_service(MockBookLookup::new());
        service
            .create(create_payload("The Odyssey", "0451526538"))
            .await
            .expect("create failed");
        service
            .create(create_payload("The Iliad", "0140275363"))
            .await
            .expect("create failed");

        let books = service
            .search(&BookFilter::default())
            .await
            .expect("search failed");

        assert_eq!(books.len(), 2);
        assert!(books[0].id < books[1].id);
    }

    #[tokio::test]
    async fn test_search_narrowing_never_grows() {
        let service = in_memory_service(MockBookLookup::new());
        service
            .create(create_payload("The Odyssey", "0451526538"))
            .await
            .expect("create failed");
        service
            .create(create_payload("The Iliad", "0140275363"))
            .await
            .expect("create failed");

        let all = service
            .search(&BookFilter::default())
            .await
            .expect("search failed");
        let narrowed = service
            .search(&BookFilter {
                title: Some("The Iliad".to_string()),
                ..BookFilter::default()
            })
            .await
            .expect("search failed");

        assert!(narrowed.len() <= all.len());
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].title, "The Iliad");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let service = in_memory_service(MockBookLookup::new());

        let err = service
            .create(create_payload("", "0451526538"))
            .await
            .unwrap_err();

        match err {
            AppError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.property == "title"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_id_mismatch_never_touches_the_store() {
        // No repository expectations: a mismatch must fail before any
        // store access
        let service = mock_service(MockBookRepository::new(), MockBookLookup::new());
        let payload = UpdateBook {
            id: 2,
            genre: None,
            author: "Homer".to_string(),
            image: "odyssey.png".to_string(),
            title: "The Odyssey".to_string(),
            subtitle: "A new translation".to_string(),
            publisher: "Norton".to_string(),
            year: "2018".to_string(),
            pages: 592,
            isbn: "0451526538".to_string(),
        };

        let err = service.update(1, payload).await.unwrap_err();

        assert!(matches!(err, AppError::IdMismatch(_)));
    }

    #[tokio::test]
    async fn test_update_missing_book_is_not_found() {
        let service = in_memory_service(MockBookLookup::new());
        let payload = UpdateBook {
            id: 99,
            genre: None,
            author: "Homer".to_string(),
            image: "odyssey.png".to_string(),
            title: "The Odyssey".to_string(),
            subtitle: "A new translation".to_string(),
            publisher: "Norton".to_string(),
            year: "2018".to_string(),
            pages: 592,
            isbn: "0451526538".to_string(),
        };

        let err = service.update(99, payload).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_every_field() {
        let service = in_memory_service(MockBookLookup::new());
        let created = service
            .create(create_payload("The Odyssey", "0451526538"))
            .await
            .expect("create failed");

        let updated = service
            .update(
                created.id,
                UpdateBook {
                    id: created.id,
                    genre: None,
                    author: "Emily Wilson".to_string(),
                    image: "odyssey-2e.png".to_string(),
                    title: "The Odyssey".to_string(),
                    subtitle: "Revised".to_string(),
                    publisher: "Norton".to_string(),
                    year: "2023".to_string(),
                    pages: 608,
                    isbn: "0451526538".to_string(),
                },
            )
            .await
            .expect("update failed");

        assert_eq!(updated.author, "Emily Wilson");
        assert_eq!(updated.genre, None);
        assert_eq!(updated.pages, 608);

        let fetched = service.get_by_id(created.id).await.expect("get failed");
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_delete_missing_book_is_not_found() {
        let service = in_memory_service(MockBookLookup::new());

        let err = service.delete(42).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_known_isbn_skips_the_lookup() {
        // No lookup expectations: a catalog hit must not call out
        let service = in_memory_service(MockBookLookup::new());
        service
            .create(create_payload("The Odyssey", "0451526538"))
            .await
            .expect("create failed");

        let resolved = service
            .resolve_by_isbn("0451526538")
            .await
            .expect("resolve failed");

        match resolved {
            Resolved::Existing(dto) => assert_eq!(dto.isbn, "0451526538"),
            Resolved::Created(_) => panic!("expected an existing book"),
        }
    }

    #[tokio::test]
    async fn test_resolve_miss_fetches_and_persists() {
        let mut lookup = MockBookLookup::new();
        lookup
            .expect_fetch_by_isbn()
            .withf(|isbn| isbn == "0451526538")
            .returning(|_| Ok(Some(record())));
        let service = in_memory_service(lookup);

        let resolved = service
            .resolve_by_isbn("0451526538")
            .await
            .expect("resolve failed");

        let dto = match resolved {
            Resolved::Created(dto) => dto,
            Resolved::Existing(_) => panic!("expected a created book"),
        };
        assert_eq!(dto.isbn, "0451526538");
        // The first listed author wins
        assert_eq!(dto.authors, vec!["Homer".to_string()]);

        let stored = service
            .search(&BookFilter::default())
            .await
            .expect("search failed");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].isbn, "0451526538");
        assert_eq!(stored[0].genre, None);
    }

    #[tokio::test]
    async fn test_resolve_unknown_isbn_is_not_found() {
        let mut lookup = MockBookLookup::new();
        lookup.expect_fetch_by_isbn().returning(|_| Ok(None));
        let service = in_memory_service(lookup);

        let err = service.resolve_by_isbn("0000000000").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        let stored = service
            .search(&BookFilter::default())
            .await
            .expect("search failed");
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_lookup_failure_passes_through() {
        let mut lookup = MockBookLookup::new();
        lookup
            .expect_fetch_by_isbn()
            .returning(|_| Err(AppError::OpenLibrary("upstream unreachable".to_string())));
        let service = in_memory_service(lookup);

        let err = service.resolve_by_isbn("0451526538").await.unwrap_err();

        assert!(matches!(err, AppError::OpenLibrary(_)));
    }

    #[tokio::test]
    async fn test_resolve_authorless_record_persists_nothing() {
        let mut lookup = MockBookLookup::new();
        lookup.expect_fetch_by_isbn().returning(|_| {
            let mut record = record();
            record.authors.clear();
            Ok(Some(record))
        });
        let service = in_memory_service(lookup);

        let err = service.resolve_by_isbn("0451526538").await.unwrap_err();

        assert!(matches!(err, AppError::OpenLibrary(_)));
        let stored = service
            .search(&BookFilter::default())
            .await
            .expect("search failed");
        assert!(stored.is_empty());
    }
}
