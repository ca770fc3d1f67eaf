use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

use crate::model::{Fields, NewPost, NewUser, Post, User, UserId};
use crate::store::{Store, StoreError, StoreFuture};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        name   TEXT NOT NULL,
        fields TEXT NOT NULL DEFAULT '{}'
    );
    CREATE TABLE IF NOT EXISTS posts (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        text    TEXT NOT NULL,
        fields  TEXT NOT NULL DEFAULT '{}'
    );
    CREATE INDEX IF NOT EXISTS posts_user_id ON posts (user_id);
";

/// SQLite-backed store.
///
/// `rusqlite` is synchronous, so every call runs on tokio's blocking pool
/// against one shared connection. Extra fields are stored as JSON text.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

type UserRow = (UserId, String, String);
type PostRow = (i64, UserId, String, String);

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let store = Self::init(Connection::open(path)?)?;
        info!(path = %path.display(), "sqlite store opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            // Multi-statement work runs in transactions, so a poisoned lock
            // still guards a consistent connection.
            let mut conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *conn)
        })
        .await?
    }
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn post_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_user((id, name, fields): UserRow) -> Result<User, StoreError> {
    Ok(User { id, name, fields: serde_json::from_str(&fields)? })
}

fn decode_post((id, user_id, text, fields): PostRow) -> Result<Post, StoreError> {
    Ok(Post { id, user_id, text, fields: serde_json::from_str(&fields)? })
}

fn find_user(conn: &Connection, id: UserId) -> Result<Option<User>, StoreError> {
    conn.query_row("SELECT id, name, fields FROM users WHERE id = ?1", [id], user_row)
        .optional()?
        .map(decode_user)
        .transpose()
}

impl Store for SqliteStore {
    fn insert_user(&self, user: NewUser) -> StoreFuture<'_, User> {
        Box::pin(self.with_conn(move |conn| {
            let fields = serde_json::to_string(&user.fields)?;
            conn.execute(
                "INSERT INTO users (name, fields) VALUES (?1, ?2)",
                params![user.name, fields],
            )?;
            Ok(User { id: conn.last_insert_rowid(), name: user.name, fields: user.fields })
        }))
    }

    fn users(&self) -> StoreFuture<'_, Vec<User>> {
        Box::pin(self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, fields FROM users ORDER BY id")?;
            let rows = stmt.query_map([], user_row)?.collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(decode_user).collect::<Result<Vec<_>, _>>()
        }))
    }

    fn user_by_id(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(self.with_conn(move |conn| find_user(conn, id)))
    }

    fn user_posts(&self, id: UserId) -> StoreFuture<'_, Vec<Post>> {
        Box::pin(self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, text, fields FROM posts WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map([id], post_row)?.collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(decode_post).collect::<Result<Vec<_>, _>>()
        }))
    }

    fn update_user(&self, id: UserId, changes: Fields) -> StoreFuture<'_, User> {
        Box::pin(self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut user = find_user(&tx, id)?.ok_or(StoreError::NotFound(id))?;
            user.apply(changes)?;
            tx.execute(
                "UPDATE users SET name = ?1, fields = ?2 WHERE id = ?3",
                params![user.name, serde_json::to_string(&user.fields)?, id],
            )?;
            tx.commit()?;
            Ok(user)
        }))
    }

    fn remove_user(&self, id: UserId) -> StoreFuture<'_, User> {
        Box::pin(self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let user = find_user(&tx, id)?.ok_or(StoreError::NotFound(id))?;
            tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(user)
        }))
    }

    fn insert_post(&self, post: NewPost) -> StoreFuture<'_, Post> {
        Box::pin(self.with_conn(move |conn| {
            let fields = serde_json::to_string(&post.fields)?;
            conn.execute(
                "INSERT INTO posts (user_id, text, fields) VALUES (?1, ?2, ?3)",
                params![post.user_id, post.text, fields],
            )?;
            Ok(Post {
                id: conn.last_insert_rowid(),
                user_id: post.user_id,
                text: post.text,
                fields: post.fields,
            })
        }))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        }))
    }
}
