use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use common_auth::Role;
use rand_core::OsRng;
use thiserror::Error;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity already registered")]
    Conflict,
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Seam to the user persistence backing the issuer. Implementations own
/// their consistency guarantees; two concurrent `create` calls for the
/// same identity must not both succeed.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn exists(&self, identity: &str) -> StoreResult<bool>;
    /// Compare a plaintext secret against the stored hash. Unknown
    /// identities report `false`, indistinguishable from a wrong secret.
    async fn verify_secret(&self, identity: &str, secret: &str) -> StoreResult<bool>;
    async fn role_of(&self, identity: &str) -> StoreResult<Option<Role>>;
    async fn user_id_of(&self, identity: &str) -> StoreResult<Option<Uuid>>;
    /// Persist a new identity. The secret arrives pre-hashed.
    async fn create(&self, identity: &str, hashed_secret: &str, role: Role) -> StoreResult<Uuid>;
}

/// Hash a plaintext secret before it crosses the store boundary.
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

#[derive(Debug, Clone)]
struct StoredUser {
    id: Uuid,
    secret_hash: String,
    role: Role,
}

/// Process-local credential store. Uniqueness is decided under the write
/// lock, so concurrent registrations of one identity cannot both succeed.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    inner: Arc<RwLock<HashMap<String, StoredUser>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn exists(&self, identity: &str) -> StoreResult<bool> {
        let guard = self.inner.read().expect("rwlock poisoned");
        Ok(guard.contains_key(identity))
    }

    async fn verify_secret(&self, identity: &str, secret: &str) -> StoreResult<bool> {
        let hash = {
            let guard = self.inner.read().expect("rwlock poisoned");
            match guard.get(identity) {
                Some(user) => user.secret_hash.clone(),
                None => return Ok(false),
            }
        };

        let parsed = PasswordHash::new(&hash)
            .map_err(|err| StoreError::Unavailable(format!("corrupt secret hash: {err}")))?;
        Ok(Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }

    async fn role_of(&self, identity: &str) -> StoreResult<Option<Role>> {
        let guard = self.inner.read().expect("rwlock poisoned");
        Ok(guard.get(identity).map(|user| user.role))
    }

    async fn user_id_of(&self, identity: &str) -> StoreResult<Option<Uuid>> {
        let guard = self.inner.read().expect("rwlock poisoned");
        Ok(guard.get(identity).map(|user| user.id))
    }

    async fn create(&self, identity: &str, hashed_secret: &str, role: Role) -> StoreResult<Uuid> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        if guard.contains_key(identity) {
            return Err(StoreError::Conflict);
        }

        let id = Uuid::new_v4();
        guard.insert(
            identity.to_owned(),
            StoredUser {
                id,
                secret_hash: hashed_secret.to_owned(),
                role,
            },
        );
        Ok(id)
    }
}
