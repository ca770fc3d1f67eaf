use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::model::{Fields, NewPost, NewUser, Post, PostId, User, UserId};
use crate::store::{Store, StoreError, StoreFuture};

/// Process-local store. Ids are assigned from 1 upward and never reused.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    last_user_id: UserId,
    last_post_id: PostId,
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<PostId, Post>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn insert_user(&self, user: NewUser) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let mut tables = self.inner.write().await;
            tables.last_user_id += 1;
            let user = User { id: tables.last_user_id, name: user.name, fields: user.fields };
            tables.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    fn users(&self) -> StoreFuture<'_, Vec<User>> {
        Box::pin(async move { Ok(self.inner.read().await.users.values().cloned().collect()) })
    }

    fn user_by_id(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move { Ok(self.inner.read().await.users.get(&id).cloned()) })
    }

    fn user_posts(&self, id: UserId) -> StoreFuture<'_, Vec<Post>> {
        Box::pin(async move {
            let tables = self.inner.read().await;
            Ok(tables.posts.values().filter(|p| p.user_id == id).cloned().collect())
        })
    }

    fn update_user(&self, id: UserId, changes: Fields) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let mut tables = self.inner.write().await;
            let stored = tables.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            let mut updated = stored.clone();
            updated.apply(changes)?;
            *stored = updated.clone();
            Ok(updated)
        })
    }

    fn remove_user(&self, id: UserId) -> StoreFuture<'_, User> {
        Box::pin(async move {
            self.inner.write().await.users.remove(&id).ok_or(StoreError::NotFound(id))
        })
    }

    fn insert_post(&self, post: NewPost) -> StoreFuture<'_, Post> {
        Box::pin(async move {
            let mut tables = self.inner.write().await;
            tables.last_post_id += 1;
            let post = Post {
                id: tables.last_post_id,
                user_id: post.user_id,
                text: post.text,
                fields: post.fields,
            };
            tables.posts.insert(post.id, post.clone());
            Ok(post)
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn alice() -> NewUser {
        NewUser { name: "alice".into(), fields: Fields::new() }
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = MemoryStore::new();

        let first = store.insert_user(alice()).await.unwrap();
        store.remove_user(first.id).await.unwrap();
        let second = store.insert_user(alice()).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn posts_are_filtered_by_owner() {
        let store = MemoryStore::new();
        let post = |user_id, text: &str| NewPost {
            user_id,
            text: text.into(),
            fields: Fields::new(),
        };

        store.insert_post(post(1, "a")).await.unwrap();
        store.insert_post(post(2, "b")).await.unwrap();
        store.insert_post(post(1, "c")).await.unwrap();

        let texts: Vec<_> =
            store.user_posts(1).await.unwrap().into_iter().map(|p| p.text).collect();
        assert_eq!(texts, ["a", "c"]);
        assert!(store.user_posts(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_update_leaves_record_untouched() {
        let store = MemoryStore::new();
        let user = store.insert_user(alice()).await.unwrap();

        let mut changes = Fields::new();
        changes.insert("name".into(), json!(""));
        changes.insert("bio".into(), json!("x"));
        assert!(store.update_user(user.id, changes).await.is_err());

        assert_eq!(store.user_by_id(user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn missing_users_are_errors_for_writes() {
        let store = MemoryStore::new();
        let mut changes = Fields::new();
        changes.insert("bio".into(), json!("x"));

        assert!(matches!(store.update_user(4, changes).await, Err(StoreError::NotFound(4))));
        assert!(matches!(store.remove_user(4).await, Err(StoreError::NotFound(4))));
    }
}
