//! In-process remote provider registry and selection hooks.

use crate::sync::merger::SyncMerger;
use crate::sync::remote::{RemoteError, RemoteQuoteSource, RemoteResult, SyncStage};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Provider registration/selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRegistryError {
    InvalidProviderId(String),
    DuplicateProviderId(String),
    ProviderNotFound(String),
}

impl Display for ProviderRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProviderId(value) => write!(f, "provider id is invalid: {value}"),
            Self::DuplicateProviderId(value) => {
                write!(f, "provider id already registered: {value}")
            }
            Self::ProviderNotFound(value) => write!(f, "provider not found: {value}"),
        }
    }
}

impl Error for ProviderRegistryError {}

/// Runtime remote provider registry.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn RemoteQuoteSource>>,
    active_provider_id: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one remote provider.
    pub fn register(
        &mut self,
        provider: Arc<dyn RemoteQuoteSource>,
    ) -> Result<(), ProviderRegistryError> {
        let provider_id = provider.source_id().trim().to_string();
        if !is_valid_provider_id(&provider_id) {
            return Err(ProviderRegistryError::InvalidProviderId(provider_id));
        }
        if self.providers.contains_key(provider_id.as_str()) {
            return Err(ProviderRegistryError::DuplicateProviderId(provider_id));
        }

        self.providers.insert(provider_id, provider);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Returns sorted provider ids.
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Selects one active provider.
    pub fn select_active(&mut self, provider_id: &str) -> Result<(), ProviderRegistryError> {
        let normalized = provider_id.trim();
        if !self.providers.contains_key(normalized) {
            return Err(ProviderRegistryError::ProviderNotFound(
                normalized.to_string(),
            ));
        }
        self.active_provider_id = Some(normalized.to_string());
        Ok(())
    }

    pub fn active_provider_id(&self) -> Option<&str> {
        self.active_provider_id.as_deref()
    }

    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn RemoteQuoteSource>> {
        self.providers.get(provider_id.trim()).cloned()
    }

    pub fn active_provider(&self) -> Option<Arc<dyn RemoteQuoteSource>> {
        let id = self.active_provider_id()?;
        self.get(id)
    }

    /// Builds a sync driver bound to the selected provider.
    pub fn active_merger(&self) -> RemoteResult<SyncMerger> {
        match self.active_provider() {
            Some(provider) => Ok(SyncMerger::new(provider)),
            None => Err(RemoteError::new(
                "registry",
                SyncStage::Fetch,
                "provider_not_selected",
                "No active provider selected.",
                false,
            )),
        }
    }
}

fn is_valid_provider_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
