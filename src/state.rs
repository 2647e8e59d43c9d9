use std::sync::Arc;

use crate::auth::{JwtTokenIssuer, UserDirectory};
use crate::config::AppConfig;
use crate::handlers::{auth::AuthViewSet, users::UserViewSet};
use crate::services::{AuthService, UserService};
use crate::viewset::{PageNumberPagination, RegistryError, SerializerRegistry, ViewSetDefinition};

/// Serializer registries, built once per viewset at startup
pub struct Registries {
    pub auth: SerializerRegistry,
    pub users: SerializerRegistry,
}

impl Registries {
    pub fn build() -> Result<Self, RegistryError> {
        Ok(Self {
            auth: AuthViewSet::registry()?,
            users: UserViewSet::registry()?,
        })
    }
}

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registries: Arc<Registries>,
    pub tokens: Arc<JwtTokenIssuer>,
    pub auth: AuthService,
    pub users: UserService,
    pub paginator: Option<Arc<PageNumberPagination>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, RegistryError> {
        let directory = Arc::new(UserDirectory::from_seed(&config.auth.users));
        let tokens = Arc::new(JwtTokenIssuer::new(&config.security));

        Ok(Self {
            registries: Arc::new(Registries::build()?),
            auth: AuthService::new(directory.clone(), tokens.clone()),
            users: UserService::new(directory),
            paginator: PageNumberPagination::from_config(&config.pagination).map(Arc::new),
            tokens,
            config: Arc::new(config),
        })
    }
}
