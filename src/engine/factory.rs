//! Engine factory
//!
//! Builds the engine variant for a scheduling model. Building touches no
//! sources.

use super::{Engine, EngineConfig, EngineMode, EngineServices};
use super::{MultiProcessEngine, SingleProcessEngine};

/// Builds engines sharing one set of collaborators
#[derive(Debug, Clone)]
pub struct EngineFactory {
    services: EngineServices,
}

impl EngineFactory {
    pub fn new(services: EngineServices) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &EngineServices {
        &self.services
    }

    /// Builds an engine for `mode` carrying a copy of `config`
    pub fn build(&self, mode: EngineMode, config: &EngineConfig) -> Engine {
        match mode {
            EngineMode::SingleProcess => Engine::SingleProcess(SingleProcessEngine::new(
                config.clone(),
                self.services.clone(),
            )),
            EngineMode::MultiProcess => Engine::MultiProcess(MultiProcessEngine::new(
                config.clone(),
                self.services.clone(),
            )),
        }
    }
}
