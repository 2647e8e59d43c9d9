use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{NewUser, UserDirectory};
use crate::error::ApiError;
use crate::i18n::Params;
use crate::types::{Group, UserIdentity};

/// Validated payload of the create actions
#[derive(Debug, Deserialize)]
struct UserCreate {
    username: String,
    password: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    groups: Vec<Group>,
}

impl From<UserCreate> for NewUser {
    fn from(data: UserCreate) -> Self {
        NewUser {
            identity: UserIdentity {
                id: Uuid::new_v4(),
                username: data.username,
                email: data.email,
                groups: data.groups,
            },
            password: data.password,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    directory: Arc<UserDirectory>,
}

impl UserService {
    pub fn new(directory: Arc<UserDirectory>) -> Self {
        Self { directory }
    }

    pub async fn list(&self) -> Vec<UserIdentity> {
        self.directory.list().await
    }

    pub async fn retrieve(&self, username: &str) -> Result<UserIdentity, ApiError> {
        self.directory.find(username).await.ok_or_else(|| {
            ApiError::not_found(
                "User %(username)s not found.",
                Some(&Params::new().with("username", username)),
            )
        })
    }

    pub async fn create(&self, data: Map<String, Value>) -> Result<UserIdentity, ApiError> {
        let mut created = self.bulk_create(vec![Value::Object(data)]).await?;
        created
            .pop()
            .ok_or_else(|| ApiError::configuration("user directory returned no account"))
    }

    pub async fn bulk_create(&self, items: Vec<Value>) -> Result<Vec<UserIdentity>, ApiError> {
        let new_users = items
            .into_iter()
            .map(|item| serde_json::from_value::<UserCreate>(item).map(NewUser::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::configuration(format!("validated user payload is malformed: {}", e)))?;

        let created = self.directory.insert_all(new_users).await.map_err(|username| {
            ApiError::already_exists(
                "A user with username %(username)s already exists.",
                Some(&Params::new().with("username", username)),
            )
        })?;
        Ok(created)
    }
}
