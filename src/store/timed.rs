use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::model::{Fields, NewPost, NewUser, Post, User, UserId};
use crate::store::{Store, StoreError, StoreFuture};

/// Puts a deadline on every call of the wrapped store.
///
/// A call that has not resolved after `limit` fails with
/// [`StoreError::Timeout`]. The abandoned operation is dropped, not cancelled
/// inside the backend: a blocking SQLite statement still runs to completion.
pub struct Timed {
    inner: Arc<dyn Store>,
    limit: Duration,
}

impl Timed {
    pub fn new(inner: Arc<dyn Store>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    fn bounded<'a, T: Send + 'a>(
        &self,
        call: impl Future<Output = Result<T, StoreError>> + Send + 'a,
    ) -> StoreFuture<'a, T> {
        let limit = self.limit;
        Box::pin(async move {
            tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(StoreError::Timeout(limit)))
        })
    }
}

impl Store for Timed {
    fn insert_user(&self, user: NewUser) -> StoreFuture<'_, User> {
        self.bounded(self.inner.insert_user(user))
    }

    fn users(&self) -> StoreFuture<'_, Vec<User>> {
        self.bounded(self.inner.users())
    }

    fn user_by_id(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        self.bounded(self.inner.user_by_id(id))
    }

    fn user_posts(&self, id: UserId) -> StoreFuture<'_, Vec<Post>> {
        self.bounded(self.inner.user_posts(id))
    }

    fn update_user(&self, id: UserId, changes: Fields) -> StoreFuture<'_, User> {
        self.bounded(self.inner.update_user(id, changes))
    }

    fn remove_user(&self, id: UserId) -> StoreFuture<'_, User> {
        self.bounded(self.inner.remove_user(id))
    }

    fn insert_post(&self, post: NewPost) -> StoreFuture<'_, Post> {
        self.bounded(self.inner.insert_post(post))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        self.bounded(self.inner.ping())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    /// Never answers.
    struct Hung;

    fn never<T: Send + 'static>() -> StoreFuture<'static, T> {
        Box::pin(std::future::pending::<Result<T, StoreError>>())
    }

    impl Store for Hung {
        fn insert_user(&self, _: NewUser) -> StoreFuture<'_, User> { never() }
        fn users(&self) -> StoreFuture<'_, Vec<User>> { never() }
        fn user_by_id(&self, _: UserId) -> StoreFuture<'_, Option<User>> { never() }
        fn user_posts(&self, _: UserId) -> StoreFuture<'_, Vec<Post>> { never() }
        fn update_user(&self, _: UserId, _: Fields) -> StoreFuture<'_, User> { never() }
        fn remove_user(&self, _: UserId) -> StoreFuture<'_, User> { never() }
        fn insert_post(&self, _: NewPost) -> StoreFuture<'_, Post> { never() }
        fn ping(&self) -> StoreFuture<'_, ()> { never() }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_calls_time_out() {
        let store = Timed::new(Arc::new(Hung), Duration::from_millis(50));

        let err = store.user_by_id(1).await.unwrap_err();

        assert!(matches!(err, StoreError::Timeout(limit) if limit == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn fast_calls_pass_through() {
        let store = Timed::new(Arc::new(MemoryStore::new()), Duration::from_secs(5));

        assert!(store.users().await.unwrap().is_empty());
        store.ping().await.unwrap();
    }
}
