use async_trait::async_trait;
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::config::SeedUser;
use crate::types::UserIdentity;

/// Checks a username/password pair
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Option<UserIdentity>;
}

/// Salted SHA-256 digest; the username is the salt
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"$");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare two digests in constant time
fn digests_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[derive(Debug, Clone)]
struct StoredUser {
    identity: UserIdentity,
    password_digest: String,
}

/// In-memory account store backing authentication and the users viewset
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<IndexMap<String, StoredUser>>,
}

/// New account, password still in clear text
#[derive(Debug, Clone)]
pub struct NewUser {
    pub identity: UserIdentity,
    pub password: String,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: &[SeedUser]) -> Self {
        let users = seed
            .iter()
            .map(|user| {
                (
                    user.username.clone(),
                    StoredUser {
                        identity: UserIdentity::new(user.username.clone()),
                        password_digest: user.password_digest.clone(),
                    },
                )
            })
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn list(&self) -> Vec<UserIdentity> {
        self.users
            .read()
            .await
            .values()
            .map(|user| user.identity.clone())
            .collect()
    }

    pub async fn find(&self, username: &str) -> Option<UserIdentity> {
        self.users
            .read()
            .await
            .get(username)
            .map(|user| user.identity.clone())
    }

    /// Insert every account or none. Returns the first clashing username.
    pub async fn insert_all(&self, new_users: Vec<NewUser>) -> Result<Vec<UserIdentity>, String> {
        let mut users = self.users.write().await;

        let mut seen = std::collections::HashSet::new();
        for new_user in &new_users {
            let username = &new_user.identity.username;
            if users.contains_key(username) || !seen.insert(username.clone()) {
                return Err(username.clone());
            }
        }

        let mut created = Vec::with_capacity(new_users.len());
        for new_user in new_users {
            let username = new_user.identity.username.clone();
            let password_digest = hash_password(&username, &new_user.password);
            created.push(new_user.identity.clone());
            users.insert(
                username,
                StoredUser {
                    identity: new_user.identity,
                    password_digest,
                },
            );
        }
        Ok(created)
    }
}

#[async_trait]
impl AuthProvider for UserDirectory {
    async fn authenticate(&self, username: &str, password: &str) -> Option<UserIdentity> {
        let users = self.users.read().await;
        let user = users.get(username)?;
        digests_match(&hash_password(username, password), &user.password_digest)
            .then(|| user.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> UserDirectory {
        UserDirectory::from_seed(&[SeedUser {
            username: "alice".to_string(),
            password_digest: hash_password("alice", "wonderland"),
        }])
    }

    #[test]
    fn digest_depends_on_salt() {
        assert_eq!(hash_password("alice", "pw"), hash_password("alice", "pw"));
        assert_ne!(hash_password("alice", "pw"), hash_password("bob", "pw"));
        assert_eq!(hash_password("alice", "pw").len(), 64);
    }

    #[test]
    fn digest_comparison() {
        let digest = hash_password("alice", "wonderland");
        assert!(digests_match(&digest, &hash_password("alice", "wonderland")));
        assert!(!digests_match(&digest, &hash_password("alice", "wonderlane")));
        assert!(!digests_match(&digest, &digest[..63]));
        assert!(!digests_match(&digest, ""));
    }

    #[tokio::test]
    async fn authenticates_seeded_user() {
        let directory = seeded();
        assert!(directory.authenticate("alice", "wonderland").await.is_some());
        assert!(directory.authenticate("alice", "looking-glass").await.is_none());
        assert!(directory.authenticate("bob", "wonderland").await.is_none());
    }

    #[tokio::test]
    async fn insert_all_is_atomic() {
        let directory = seeded();
        let batch = vec![
            NewUser {
                identity: UserIdentity::new("bob"),
                password: "builder123".to_string(),
            },
            NewUser {
                identity: UserIdentity::new("alice"),
                password: "another123".to_string(),
            },
        ];
        assert_eq!(directory.insert_all(batch).await, Err("alice".to_string()));
        assert!(directory.find("bob").await.is_none());

        let created = directory
            .insert_all(vec![NewUser {
                identity: UserIdentity::new("bob"),
                password: "builder123".to_string(),
            }])
            .await
            .unwrap();
        assert_eq!(created[0].username, "bob");
        assert!(directory.authenticate("bob", "builder123").await.is_some());
        assert_eq!(directory.list().await.len(), 2);
    }
}
