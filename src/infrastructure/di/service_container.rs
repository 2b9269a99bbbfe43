//! Service container for dependency injection
//!
//! Wires the resolver and dispatcher to the registry and settings.

use std::sync::Arc;

use crate::application::{Dispatcher, Resolver};
use crate::config::Settings;
use crate::domain::PayloadTypes;
use crate::faces;
use crate::infrastructure::traits::{ActionRegistry, SettingsCatalog};
use crate::infrastructure::InfraResult;

/// Container holding the collaborators of one run.
pub struct ServiceContainer {
    /// Settings loaded from file and environment, before command-line overrides
    pub settings: Arc<Settings>,

    /// Faces and their actions
    pub registry: Arc<dyn ActionRegistry>,

    /// Decoders for request payloads, by collection
    pub payload_types: Arc<dyn PayloadTypes>,
}

impl ServiceContainer {
    /// Create a container with the built-in faces.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let payload_types: Arc<dyn PayloadTypes> = Arc::new(faces::payload_catalog());
        let registry = faces::registry(Arc::clone(&payload_types))?;
        Ok(Self::with_deps(settings, Arc::new(registry), payload_types))
    }

    /// Create a container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        registry: Arc<dyn ActionRegistry>,
        payload_types: Arc<dyn PayloadTypes>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            registry,
            payload_types,
        }
    }

    pub fn resolver(&self) -> Resolver {
        let catalog: Arc<dyn SettingsCatalog> = self.settings.clone();
        Resolver::new(Arc::clone(&self.registry), catalog)
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::clone(&self.settings))
    }
}
