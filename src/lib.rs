//! abikit library root
//!
//! `abikit` turns compiled smart-contract artifacts (Foundry or Hardhat)
//! into typed client SDKs. The pipeline is: load `contracts.yaml`
//! ([`config`]), resolve and normalize artifacts ([`artifacts`]) into a
//! contract graph ([`model`]), then run one generator per configured
//! target language ([`generators`]). A content-hash build cache
//! ([`cache`]) skips regeneration when nothing changed.

pub mod core;

pub mod artifacts;
pub mod cache;
pub mod config;
pub mod generators;
pub mod model;

// Root re-exports for the common entry points
pub use crate::core::error::{Error, Result};
pub use crate::core::logging::init_logging;

pub use crate::artifacts::{ArtifactError, ArtifactLoader, ContractArtifact};
pub use crate::cache::{BuildInputs, CacheManager};
pub use crate::config::loader::{load_config, ConfigError};
pub use crate::config::ContractsConfig;
pub use crate::generators::{create_generator, Generator, GeneratorContext};
pub use crate::model::builder::ModelBuilder;
pub use crate::model::ContractGraph;

/// Prelude re-exporting the types most callers need.
pub mod prelude {
    pub use crate::core::error::{Error, Result};
    pub use crate::core::logging::init_logging;

    pub use crate::artifacts::{ArtifactCacheManager, ArtifactLoader, ContractArtifact};
    pub use crate::cache::{BuildInputs, CacheManager, RegenerationCheck};
    pub use crate::config::loader::{load_config, ConfigError};
    pub use crate::config::{ContractsConfig, Language, TargetConfig};
    pub use crate::generators::{create_generator, Generator, GeneratorContext};
    pub use crate::model::builder::ModelBuilder;
    pub use crate::model::{ContractGraph, ContractModel};
}
