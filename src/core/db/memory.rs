//! In-memory store
//!
//! A single `MemoryStore` implements all three storage contracts on top of
//! `DashMap`s. Deleting users cascades to their chirps and refresh tokens,
//! mirroring the `ON DELETE CASCADE` foreign keys of the SQL schema.
//! Used by tests and when no `DATABASE_URL` is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::db::models::{Chirp, CreateChirp, CreateUser, RefreshToken, UpdateUser, User};
use crate::core::db::repositories::{
    ChirpRepositoryError, ChirpStore, RefreshTokenStoreError, RevocableTokenStore,
    UserRepositoryError, UserStore,
};

#[derive(Default)]
struct Tables {
    users: DashMap<Uuid, User>,
    /// email -> user id, the uniqueness index
    emails: DashMap<String, Uuid>,
    chirps: DashMap<Uuid, Chirp>,
    refresh_tokens: DashMap<String, RefreshToken>,
}

/// Process-local store. Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, dto: &CreateUser) -> Result<User, UserRepositoryError> {
        match self.tables.emails.entry(dto.email.clone()) {
            Entry::Occupied(_) => Err(UserRepositoryError::EmailAlreadyExists),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let user = User {
                    id: Uuid::new_v4(),
                    email: dto.email.clone(),
                    hashed_password: dto.hashed_password.clone(),
                    created_at: now,
                    updated_at: now,
                };
                self.tables.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let Some(id) = self.tables.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.tables.users.get(&id).map(|u| u.value().clone()))
    }

    async fn update(&self, id: Uuid, updates: &UpdateUser) -> Result<User, UserRepositoryError> {
        let current_email = self
            .tables
            .users
            .get(&id)
            .map(|u| u.email.clone())
            .ok_or(UserRepositoryError::NotFound)?;

        if current_email != updates.email {
            match self.tables.emails.entry(updates.email.clone()) {
                Entry::Occupied(_) => return Err(UserRepositoryError::EmailAlreadyExists),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.tables.emails.remove(&current_email);
        }

        let mut user = self
            .tables
            .users
            .get_mut(&id)
            .ok_or(UserRepositoryError::NotFound)?;
        user.email = updates.email.clone();
        user.hashed_password = updates.hashed_password.clone();
        user.updated_at = Utc::now();

        Ok(user.value().clone())
    }

    async fn delete_all(&self) -> Result<u64, UserRepositoryError> {
        let count = self.tables.users.len() as u64;
        self.tables.refresh_tokens.clear();
        self.tables.chirps.clear();
        self.tables.emails.clear();
        self.tables.users.clear();
        Ok(count)
    }
}

#[async_trait]
impl ChirpStore for MemoryStore {
    async fn create(&self, dto: &CreateChirp) -> Result<Chirp, ChirpRepositoryError> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            body: dto.body.clone(),
            user_id: dto.user_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.chirps.insert(chirp.id, chirp.clone());
        Ok(chirp)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chirp>, ChirpRepositoryError> {
        Ok(self.tables.chirps.get(&id).map(|c| c.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Chirp>, ChirpRepositoryError> {
        let mut chirps: Vec<Chirp> = self
            .tables
            .chirps
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        chirps.sort_by_key(|c| c.created_at);
        Ok(chirps)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ChirpRepositoryError> {
        Ok(self.tables.chirps.remove(&id).is_some())
    }
}

#[async_trait]
impl RevocableTokenStore for MemoryStore {
    async fn persist(&self, token: &RefreshToken) -> Result<(), RefreshTokenStoreError> {
        match self.tables.refresh_tokens.entry(token.token.clone()) {
            Entry::Occupied(_) => Err(RefreshTokenStoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
                Ok(())
            }
        }
    }

    async fn resolve(&self, token: &str) -> Result<RefreshToken, RefreshTokenStoreError> {
        self.tables
            .refresh_tokens
            .get(token)
            .map(|t| t.value().clone())
            .ok_or(RefreshTokenStoreError::NotFound)
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<(), RefreshTokenStoreError> {
        // get_mut holds the shard lock for the whole read-modify-write
        let mut row = self
            .tables
            .refresh_tokens
            .get_mut(token)
            .ok_or(RefreshTokenStoreError::NotFound)?;

        if row.revoked_at.is_none() {
            row.revoked_at = Some(at);
            row.updated_at = at;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            hashed_password: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryStore::new();
        let user = UserStore::create(&store, &new_user("a@example.com"))
            .await
            .unwrap();

        let by_email = store.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.email, "a@example.com");
        assert!(store.find_by_email("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        UserStore::create(&store, &new_user("a@example.com"))
            .await
            .unwrap();

        let result = UserStore::create(&store, &new_user("a@example.com")).await;
        assert!(matches!(result, Err(UserRepositoryError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn test_update_moves_email_index() {
        let store = MemoryStore::new();
        let user = UserStore::create(&store, &new_user("old@example.com"))
            .await
            .unwrap();

        let updated = store
            .update(
                user.id,
                &UpdateUser {
                    email: "new@example.com".to_string(),
                    hashed_password: "new-hash".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.hashed_password, "new-hash");
        assert!(store.find_by_email("old@example.com").await.unwrap().is_none());
        assert!(store.find_by_email("new@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_rejected() {
        let store = MemoryStore::new();
        let first = UserStore::create(&store, &new_user("one@example.com"))
            .await
            .unwrap();
        UserStore::create(&store, &new_user("two@example.com"))
            .await
            .unwrap();

        let result = store
            .update(
                first.id,
                &UpdateUser {
                    email: "two@example.com".to_string(),
                    hashed_password: "hash".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(UserRepositoryError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn test_delete_all_cascades() {
        let store = MemoryStore::new();
        let user = UserStore::create(&store, &new_user("a@example.com"))
            .await
            .unwrap();
        ChirpStore::create(
            &store,
            &CreateChirp {
                body: "hi".to_string(),
                user_id: user.id,
            },
        )
        .await
        .unwrap();
        store
            .persist(&RefreshToken::new(
                "tok",
                user.id,
                Utc::now() + Duration::days(1),
            ))
            .await
            .unwrap();

        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.resolve("tok").await,
            Err(RefreshTokenStoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_chirps_listed_oldest_first() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        for body in ["first", "second", "third"] {
            ChirpStore::create(
                &store,
                &CreateChirp {
                    body: body.to_string(),
                    user_id,
                },
            )
            .await
            .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let bodies: Vec<String> = store.list().await.unwrap().into_iter().map(|c| c.body).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_persist_duplicate_token() {
        let store = MemoryStore::new();
        let row = RefreshToken::new("tok", Uuid::new_v4(), Utc::now() + Duration::days(1));

        store.persist(&row).await.unwrap();
        assert!(matches!(
            store.persist(&row).await,
            Err(RefreshTokenStoreError::Duplicate)
        ));
    }

    #[tokio::test]
    async fn test_revoke_is_monotonic() {
        let store = MemoryStore::new();
        let row = RefreshToken::new("tok", Uuid::new_v4(), Utc::now() + Duration::days(1));
        store.persist(&row).await.unwrap();

        let first = Utc::now();
        store.revoke("tok", first).await.unwrap();
        store
            .revoke("tok", first + Duration::seconds(10))
            .await
            .unwrap();

        let resolved = store.resolve("tok").await.unwrap();
        assert_eq!(resolved.revoked_at, Some(first));
    }

    #[tokio::test]
    async fn test_revoke_missing_token() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.revoke("missing", Utc::now()).await,
            Err(RefreshTokenStoreError::NotFound)
        ));
    }
}
