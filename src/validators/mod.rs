//! Validator framework
//!
//! Validators are pluggable: the configuration names an implementation key,
//! and a [`ValidatorFactory`] looks that key up in a [`PluginRegistry`] and
//! constructs the implementation behind a capability trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       Plugin Registry                   │
//! ├─────────────────────────────────────────┤
//! │  • Constructors keyed by implementation │
//! │  • One slot per capability              │
//! └────────┬────────────────────────────────┘
//!          │
//!          ├──> ValidatorFactory<dyn PolicyValidator>
//!          │       └──> DefaultPolicyValidator (Drools rule artifact checks)
//!          └──> ValidatorFactory<dyn PayloadValidator>
//!                  └──> DefaultPayloadValidator
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use policy_validation::policy::PolicySet;
//! use policy_validation::validators::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(PluginRegistry::new());
//! let factory = PolicyValidatorFactory::new(registry);
//!
//! let config = ValidatorConfig::new("policy-validator", DEFAULT_IMPLEMENTATION)
//!     .with_config(serde_json::json!({"nexus_name": "nexus", "nexus_port": 8081}));
//! let validator = factory.create(&config)?;
//!
//! validator.validate_native_policies(&PolicySet::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod builtin;
pub mod error;
pub mod registry;
pub mod traits;

// Re-export commonly used types
pub use builtin::{DefaultPayloadValidator, DefaultPolicyValidator, DEFAULT_IMPLEMENTATION};
pub use error::{ErrorResponse, ValidationError};
pub use registry::{
    Capability, Constructor, PayloadValidatorFactory, PluginEntry, PluginRegistry,
    PolicyValidatorFactory, ValidatorConfig, ValidatorFactory,
};
pub use traits::{PayloadValidator, PolicyValidator};
