//! services/api/src/adapters/identity.rs
//!
//! An in-memory implementation of the `IdentityProvider` port. Accounts and auth
//! sessions live only as long as the process; there is no persistence.

use std::collections::HashMap;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use civic_connect_core::{
    domain::{Requester, Role, UserCredentials},
    ports::{IdentityProvider, PortError, PortResult},
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// How long a login stays valid.
pub const AUTH_SESSION_TTL_DAYS: i64 = 30;

/// A user account created when the provider starts.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl SeedUser {
    /// The demo accounts: one admin, one citizen.
    pub fn demo_accounts() -> Vec<SeedUser> {
        vec![
            SeedUser {
                name: "Alice (Admin)".to_string(),
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
                role: Role::Admin,
            },
            SeedUser {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "password123".to_string(),
                role: Role::User,
            },
        ]
    }
}

struct AuthSession {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Directory {
    // Keyed by lower-cased email.
    accounts: HashMap<String, UserCredentials>,
    sessions: HashMap<String, AuthSession>,
}

impl Directory {
    fn find_by_id(&self, user_id: Uuid) -> Option<&UserCredentials> {
        self.accounts.values().find(|c| c.user.id == user_id)
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

pub struct InMemoryIdentityProvider {
    directory: RwLock<Directory>,
}

impl InMemoryIdentityProvider {
    /// Creates a provider holding the given accounts, hashing their passwords.
    pub fn with_seed_users(seed_users: Vec<SeedUser>) -> PortResult<Self> {
        let mut directory = Directory::default();
        for seed in seed_users {
            let credentials = UserCredentials {
                user: Requester {
                    id: Uuid::new_v4(),
                    name: seed.name,
                    email: seed.email.clone(),
                    role: seed.role,
                },
                hashed_password: hash_password(&seed.password)?,
            };
            directory.accounts.insert(normalize_email(&seed.email), credentials);
        }
        info!(accounts = directory.accounts.len(), "Identity provider initialised");
        Ok(Self {
            directory: RwLock::new(directory),
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hashed: &str) -> PortResult<bool> {
    let parsed = PasswordHash::new(hashed)
        .map_err(|e| PortError::Unexpected(format!("Failed to parse password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

//=========================================================================================
// `IdentityProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn register(&self, name: &str, email: &str, password: &str) -> PortResult<Requester> {
        let key = normalize_email(email);
        if name.trim().is_empty() || key.is_empty() || !key.contains('@') {
            return Err(PortError::InvalidInput(
                "A name and a valid email are required".to_string(),
            ));
        }
        if password.len() < 8 {
            return Err(PortError::InvalidInput(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let hashed_password = hash_password(password)?;
        let mut directory = self.directory.write().await;
        if directory.accounts.contains_key(&key) {
            return Err(PortError::Conflict(
                "An account with this email already exists.".to_string(),
            ));
        }

        let user = Requester {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            role: Role::User,
        };
        directory.accounts.insert(
            key,
            UserCredentials {
                user: user.clone(),
                hashed_password,
            },
        );
        info!(user_id = %user.id, "Registered new account");
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> PortResult<Requester> {
        let directory = self.directory.read().await;
        let credentials = directory
            .accounts
            .get(&normalize_email(email))
            .ok_or(PortError::InvalidCredentials)?;

        if !verify_password(password, &credentials.hashed_password)? {
            debug!(user_id = %credentials.user.id, "Password mismatch");
            return Err(PortError::InvalidCredentials);
        }
        Ok(credentials.user.clone())
    }

    async fn create_auth_session(&self, user_id: Uuid) -> PortResult<String> {
        let mut directory = self.directory.write().await;
        if directory.find_by_id(user_id).is_none() {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }

        let session_id = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::days(AUTH_SESSION_TTL_DAYS);
        directory
            .sessions
            .insert(session_id.clone(), AuthSession { user_id, expires_at });
        Ok(session_id)
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Requester> {
        {
            let directory = self.directory.read().await;
            match directory.sessions.get(session_id) {
                None => return Err(PortError::Unauthenticated),
                Some(session) if session.expires_at > Utc::now() => {
                    return directory
                        .find_by_id(session.user_id)
                        .map(|c| c.user.clone())
                        .ok_or(PortError::Unauthenticated);
                }
                Some(_) => {}
            }
        }

        // Expired: forget it.
        self.directory.write().await.sessions.remove(session_id);
        Err(PortError::Unauthenticated)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.directory.write().await.sessions.remove(session_id);
        Ok(())
    }
}
