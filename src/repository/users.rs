//! Postgres-backed user repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, User, UserFilter, UserRow},
    repository::UserRepository,
};

pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Owned book ids for a user, in collection order
    async fn load_books(&self, user_id: i32) -> AppResult<Vec<i32>> {
        let books = sqlx::query_scalar::<_, i32>(
            "SELECT book_id FROM user_books WHERE user_id = $1 ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn hydrate(&self, row: UserRow) -> AppResult<User> {
        let books = self.load_books(row.id).await?;
        Ok(User::from_stored(
            row.id,
            row.username,
            row.name,
            row.birthdate,
            row.password,
            books,
        ))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self, filter: &UserFilter) -> AppResult<Vec<User>> {
        let mut conditions: Vec<String> = Vec::new();

        if filter.birthdate_from.is_some() {
            conditions.push(format!("birthdate >= ${}", conditions.len() + 1));
        }
        if filter.birthdate_to.is_some() {
            conditions.push(format!("birthdate <= ${}", conditions.len() + 1));
        }
        if filter.name_contains.as_deref().is_some_and(|f| !f.is_empty()) {
            conditions.push(format!("LOWER(name) LIKE ${}", conditions.len() + 1));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT * FROM users {} ORDER BY id", where_clause);

        let mut builder = sqlx::query_as::<_, UserRow>(&query);

        if let Some(from) = filter.birthdate_from {
            builder = builder.bind(from);
        }
        if let Some(to) = filter.birthdate_to {
            builder = builder.bind(to);
        }
        if let Some(fragment) = filter.name_contains.as_deref().filter(|f| !f.is_empty()) {
            builder = builder.bind(format!("%{}%", fragment.to_lowercase()));
        }

        let rows = builder.fetch_all(&self.pool).await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(self.hydrate(row).await?);
        }

        Ok(users)
    }

    async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (
                username, name, birthdate, password
            ) VALUES (
                $1, $2, $3, $4
            ) RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(user.birthdate)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        self.hydrate(row).await
    }

    async fn save(&self, user: &User) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users SET
                username = $1, name = $2, birthdate = $3, password = $4
            WHERE id = $5
            "#,
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(user.birthdate)
        .bind(&user.password)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        // The collection is rewritten wholesale so positions stay dense
        sqlx::query("DELETE FROM user_books WHERE user_id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        for (position, book_id) in user.books().iter().enumerate() {
            sqlx::query("INSERT INTO user_books (user_id, book_id, position) VALUES ($1, $2, $3)")
                .bind(user.id)
                .bind(*book_id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_by_id(user.id).await?.ok_or_else(|| {
            AppError::NotFound(format!("User with id {} not found", user.id))
        })
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
