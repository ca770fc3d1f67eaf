//! Users, posts, and the payloads that create them.
//!
//! Both records carry a [`Fields`] map of extra client-supplied JSON that is
//! stored as-is and flattened back next to the typed fields on the way out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::StoreError;

pub type UserId = i64;
pub type PostId = i64;

/// Extra, untyped fields carried on a record.
pub type Fields = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl User {
    /// Shallow-merges `changes` into the record.
    ///
    /// `id` is never overwritten. `name` must stay a non-empty string. Every
    /// other key replaces (or adds) the extra field of the same name.
    pub fn apply(&mut self, mut changes: Fields) -> Result<(), StoreError> {
        changes.remove("id");
        if changes.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        if let Some(name) = changes.remove("name") {
            self.name = required_text(name)
                .ok_or_else(|| StoreError::Invalid("name must be a non-empty string".into()))?;
        }
        self.fields.extend(changes);
        Ok(())
    }
}

/// A validated user-create payload.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub fields: Fields,
}

impl NewUser {
    /// Splits `name` out of a request body. `None` when `name` is missing,
    /// empty, or not a string. A client-sent `id` is discarded.
    pub fn from_fields(mut fields: Fields) -> Option<Self> {
        let name = required_text(fields.remove("name")?)?;
        fields.remove("id");
        Some(Self { name, fields })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub text: String,
    #[serde(flatten)]
    pub fields: Fields,
}

/// A validated post body, not yet tied to a user.
#[derive(Clone, Debug, PartialEq)]
pub struct PostDraft {
    pub text: String,
    pub fields: Fields,
}

impl PostDraft {
    /// Splits `text` out of a request body. `None` when `text` is missing,
    /// empty, or not a string. Client-sent `id` and `user_id` are discarded;
    /// the owner always comes from the path.
    pub fn from_fields(mut fields: Fields) -> Option<Self> {
        let text = required_text(fields.remove("text")?)?;
        fields.remove("id");
        fields.remove("user_id");
        Some(Self { text, fields })
    }

    pub fn for_user(self, user_id: UserId) -> NewPost {
        NewPost { user_id, text: self.text, fields: self.fields }
    }
}

/// A post ready to insert.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPost {
    pub user_id: UserId,
    pub text: String,
    pub fields: Fields,
}

fn required_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn user_serialises_flat() {
        let user = User {
            id: 3,
            name: "alice".into(),
            fields: fields(json!({ "bio": "hi" })),
        };

        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({ "id": 3, "name": "alice", "bio": "hi" })
        );
    }

    #[test]
    fn new_user_requires_a_non_empty_string_name() {
        assert!(NewUser::from_fields(fields(json!({ "bio": "x" }))).is_none());
        assert!(NewUser::from_fields(fields(json!({ "name": "" }))).is_none());
        assert!(NewUser::from_fields(fields(json!({ "name": 5 }))).is_none());
        assert!(NewUser::from_fields(fields(json!({ "name": null }))).is_none());

        let user =
            NewUser::from_fields(fields(json!({ "id": 9, "name": "bob", "age": 40 }))).unwrap();
        assert_eq!(user.name, "bob");
        assert_eq!(Value::Object(user.fields), json!({ "age": 40 }));
    }

    #[test]
    fn post_draft_drops_client_owner() {
        let draft = PostDraft::from_fields(fields(json!({ "text": "hi", "user_id": 99 }))).unwrap();
        let post = draft.for_user(5);

        assert_eq!(post.user_id, 5);
        assert_eq!(post.text, "hi");
        assert!(post.fields.is_empty());
    }

    #[test]
    fn apply_merges_and_keeps_id() {
        let mut user = User { id: 1, name: "a".into(), fields: fields(json!({ "bio": "old" })) };

        user.apply(fields(json!({ "id": 7, "name": "b", "bio": "new", "age": 3 }))).unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.name, "b");
        assert_eq!(Value::Object(user.fields), json!({ "bio": "new", "age": 3 }));
    }

    #[test]
    fn apply_rejects_empty_and_bad_names() {
        let mut user = User { id: 1, name: "a".into(), fields: Fields::new() };

        assert!(matches!(user.apply(Fields::new()), Err(StoreError::EmptyUpdate)));
        assert!(matches!(user.apply(fields(json!({ "id": 2 }))), Err(StoreError::EmptyUpdate)));
        assert!(matches!(user.apply(fields(json!({ "name": "" }))), Err(StoreError::Invalid(_))));
        assert_eq!(user.name, "a");
    }
}
