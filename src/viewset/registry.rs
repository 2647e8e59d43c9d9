// viewset/registry.rs - Serializer lookup by symbolic key
//
// Keys follow two conventions: the action name selects the serializer used
// to render output, `<action>_validation` selects the one validating input.
// Anything not registered resolves to the `default` entry.

use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

use crate::serializers::{PassThrough, Serializer};

pub const DEFAULT_KEY: &str = "default";
const VALIDATION_SUFFIX: &str = "_validation";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("viewset '{viewset}' needs a '{key}' serializer")]
    MissingSerializer { viewset: String, key: String },
    #[error("serializer '{name}' registered as '{key}' cannot validate input")]
    NotAValidator { key: String, name: String },
}

/// Input validation key for an action
pub fn validation_key(action: &str) -> String {
    format!("{}{}", action, VALIDATION_SUFFIX)
}

/// Immutable per-viewset mapping from key to serializer
#[derive(Clone)]
pub struct SerializerRegistry {
    viewset: String,
    default: Arc<dyn Serializer>,
    entries: IndexMap<String, Arc<dyn Serializer>>,
}

impl SerializerRegistry {
    pub fn builder(viewset: &str) -> RegistryBuilder {
        RegistryBuilder {
            viewset: viewset.to_string(),
            default: Arc::new(PassThrough),
            entries: IndexMap::new(),
        }
    }

    pub fn viewset(&self) -> &str {
        &self.viewset
    }

    pub fn contains(&self, key: &str) -> bool {
        key == DEFAULT_KEY || self.entries.contains_key(key)
    }

    /// Registered serializer for `key`, else the default one
    pub fn resolve(&self, key: &str) -> &dyn Serializer {
        match self.entries.get(key) {
            Some(serializer) => serializer.as_ref(),
            None => self.default.as_ref(),
        }
    }

    /// Check at startup that every validating action is wired to a validator
    pub fn ensure_actions(&self, actions: &[&str]) -> Result<(), RegistryError> {
        for action in actions {
            let key = validation_key(action);
            let serializer = self
                .entries
                .get(&key)
                .ok_or_else(|| RegistryError::MissingSerializer {
                    viewset: self.viewset.clone(),
                    key: key.clone(),
                })?;
            if serializer.validator().is_none() {
                return Err(RegistryError::NotAValidator {
                    key,
                    name: serializer.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

pub struct RegistryBuilder {
    viewset: String,
    default: Arc<dyn Serializer>,
    entries: IndexMap<String, Arc<dyn Serializer>>,
}

impl RegistryBuilder {
    /// Registering under `default` replaces the `PassThrough` fallback
    pub fn register(mut self, key: &str, serializer: impl Serializer + 'static) -> Self {
        if key == DEFAULT_KEY {
            self.default = Arc::new(serializer);
        } else {
            self.entries.insert(key.to_string(), Arc::new(serializer));
        }
        self
    }

    /// Register one serializer under several keys
    pub fn register_shared(mut self, keys: &[&str], serializer: Arc<dyn Serializer>) -> Self {
        for key in keys {
            if *key == DEFAULT_KEY {
                self.default = Arc::clone(&serializer);
            } else {
                self.entries.insert(key.to_string(), Arc::clone(&serializer));
            }
        }
        self
    }

    pub fn build(self) -> SerializerRegistry {
        SerializerRegistry {
            viewset: self.viewset,
            default: self.default,
            entries: self.entries,
        }
    }
}
