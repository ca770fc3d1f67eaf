//! The persistence collaborator.
//!
//! [`Store`] is object safe so the API can hold an `Arc<dyn Store>` and tests
//! can hand it a double. Every method returns a boxed `Send` future; a
//! rejected operation resolves to a [`StoreError`].
//!
//! Backends:
//!
//! - [`MemoryStore`]: process-local maps, ids counted from 1.
//! - [`SqliteStore`]: a SQLite file (or `:memory:`) through `rusqlite`.
//! - [`Timed`]: wraps any store with a per-call deadline.

mod memory;
mod sqlite;
mod timed;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use timed::Timed;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::model::{Fields, NewPost, NewUser, Post, User, UserId};

/// A boxed store operation borrowing the store for `'a`.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no user with id {0}")]
    NotFound(UserId),

    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("update has no fields to change")]
    EmptyUpdate,

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Async CRUD over users and their posts.
pub trait Store: Send + Sync + 'static {
    /// Stores a new user and returns it with its assigned id.
    fn insert_user(&self, user: NewUser) -> StoreFuture<'_, User>;

    /// Every user, in id order.
    fn users(&self) -> StoreFuture<'_, Vec<User>>;

    /// The user with `id`, or `None`.
    fn user_by_id(&self, id: UserId) -> StoreFuture<'_, Option<User>>;

    /// Posts whose `user_id` is `id`, in id order. Empty for unknown users.
    fn user_posts(&self, id: UserId) -> StoreFuture<'_, Vec<Post>>;

    /// Applies [`User::apply`] to the stored record and returns the result.
    fn update_user(&self, id: UserId, changes: Fields) -> StoreFuture<'_, User>;

    /// Deletes the user and returns the removed record. Posts are left alone.
    fn remove_user(&self, id: UserId) -> StoreFuture<'_, User>;

    /// Stores a post and returns it with its assigned id.
    fn insert_post(&self, post: NewPost) -> StoreFuture<'_, Post>;

    /// Cheap liveness check of the backing storage.
    fn ping(&self) -> StoreFuture<'_, ()>;
}
