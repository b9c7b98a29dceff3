//! Postgres-backed book repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::book::{Book, BookFilter, CreateBook},
    repository::BookRepository,
};

pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn find_all(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut conditions: Vec<String> = Vec::new();

        if filter.id.is_some() {
            conditions.push(format!("id = ${}", conditions.len() + 1));
        }
        if filter.genre.is_some() {
            conditions.push(format!("genre = ${}", conditions.len() + 1));
        }
        if filter.author.is_some() {
            conditions.push(format!("author = ${}", conditions.len() + 1));
        }
        if filter.image.is_some() {
            conditions.push(format!("image = ${}", conditions.len() + 1));
        }
        if filter.title.is_some() {
            conditions.push(format!("title = ${}", conditions.len() + 1));
        }
        if filter.subtitle.is_some() {
            conditions.push(format!("subtitle = ${}", conditions.len() + 1));
        }
        if filter.publisher.is_some() {
            conditions.push(format!("publisher = ${}", conditions.len() + 1));
        }
        if filter.year.is_some() {
            conditions.push(format!("year = ${}", conditions.len() + 1));
        }
        if filter.pages.is_some() {
            conditions.push(format!("pages = ${}", conditions.len() + 1));
        }
        if filter.isbn.is_some() {
            conditions.push(format!("isbn = ${}", conditions.len() + 1));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT * FROM books {} ORDER BY id", where_clause);

        let mut builder = sqlx::query_as::<_, Book>(&query);

        // Binds follow the same order the conditions were pushed in
        if let Some(id) = filter.id {
            builder = builder.bind(id);
        }
        if let Some(ref genre) = filter.genre {
            builder = builder.bind(genre);
        }
        if let Some(ref author) = filter.author {
            builder = builder.bind(author);
        }
        if let Some(ref image) = filter.image {
            builder = builder.bind(image);
        }
        if let Some(ref title) = filter.title {
            builder = builder.bind(title);
        }
        if let Some(ref subtitle) = filter.subtitle {
            builder = builder.bind(subtitle);
        }
        if let Some(ref publisher) = filter.publisher {
            builder = builder.bind(publisher);
        }
        if let Some(ref year) = filter.year {
            builder = builder.bind(year);
        }
        if let Some(pages) = filter.pages {
            builder = builder.bind(pages);
        }
        if let Some(ref isbn) = filter.isbn {
            builder = builder.bind(isbn);
        }

        let books = builder.fetch_all(&self.pool).await?;

        Ok(books)
    }

    async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                genre, author, image, title, subtitle, publisher, year, pages, isbn
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9
            ) RETURNING *
            "#,
        )
        .bind(&book.genre)
        .bind(&book.author)
        .bind(&book.image)
        .bind(&book.title)
        .bind(&book.subtitle)
        .bind(&book.publisher)
        .bind(&book.year)
        .bind(book.pages)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                genre = $1, author = $2, image = $3, title = $4, subtitle = $5,
                publisher = $6, year = $7, pages = $8, isbn = $9
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(&book.genre)
        .bind(&book.author)
        .bind(&book.image)
        .bind(&book.title)
        .bind(&book.subtitle)
        .bind(&book.publisher)
        .bind(&book.year)
        .bind(book.pages)
        .bind(&book.isbn)
        .bind(book.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(())
    }
}
