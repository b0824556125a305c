//! Validator registry - resolves configured implementation names to validators

use super::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Constructor stored in the registry for one capability
pub type Constructor<C> =
    Arc<dyn Fn(&ValidatorConfig) -> Result<Box<C>, BoxError> + Send + Sync>;

/// Validator configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValidatorConfig {
    /// Validator name (for logging and diagnostics)
    #[serde(default)]
    pub name: String,

    /// Registry key of the implementation to instantiate
    #[serde(default)]
    pub implementation: String,

    /// Implementation-specific configuration
    #[serde(default)]
    pub config: serde_json::Value,
}

impl ValidatorConfig {
    pub fn new(name: impl Into<String>, implementation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implementation: implementation.into(),
            config: serde_json::Value::Null,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

/// Constructors registered under one implementation key
#[derive(Default)]
pub struct PluginEntry {
    policy: Option<Constructor<dyn PolicyValidator>>,
    payload: Option<Constructor<dyn PayloadValidator>>,
}

impl PluginEntry {
    fn capabilities(&self) -> Vec<&'static str> {
        let mut provided = Vec::new();
        if self.policy.is_some() {
            provided.push(<dyn PolicyValidator as Capability>::NAME);
        }
        if self.payload.is_some() {
            provided.push(<dyn PayloadValidator as Capability>::NAME);
        }
        provided
    }
}

/// A validator trait that can be constructed through the registry
pub trait Capability: 'static {
    /// Human-readable capability name used in error messages
    const NAME: &'static str;

    fn constructor(entry: &PluginEntry) -> Option<&Constructor<Self>>;

    fn slot(entry: &mut PluginEntry) -> &mut Option<Constructor<Self>>;
}

impl Capability for dyn PolicyValidator {
    const NAME: &'static str = "policy validator";

    fn constructor(entry: &PluginEntry) -> Option<&Constructor<Self>> {
        entry.policy.as_ref()
    }

    fn slot(entry: &mut PluginEntry) -> &mut Option<Constructor<Self>> {
        &mut entry.policy
    }
}

impl Capability for dyn PayloadValidator {
    const NAME: &'static str = "payload validator";

    fn constructor(entry: &PluginEntry) -> Option<&Constructor<Self>> {
        entry.payload.as_ref()
    }

    fn slot(entry: &mut PluginEntry) -> &mut Option<Constructor<Self>> {
        &mut entry.payload
    }
}

/// Registry of validator constructors, keyed by implementation name
///
/// Populated once at startup, then shared read-only (usually behind an
/// `Arc`) by the factories.
pub struct PluginRegistry {
    entries: HashMap<String, PluginEntry>,
}

impl PluginRegistry {
    /// Create a registry holding the built-in validators
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtin_validators();
        registry
    }

    /// Create a registry with nothing registered
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn register_builtin_validators(&mut self) {
        info!("🔧 Registering built-in validators");
        builtin::register(self);
        info!("✅ Registered {} built-in implementations", self.entries.len());
    }

    /// Register a constructor for capability `C` under `key`
    ///
    /// A later registration for the same key and capability replaces the
    /// earlier one.
    pub fn register<C: Capability + ?Sized>(&mut self, key: &str, constructor: Constructor<C>) {
        debug!("Registering {} implementation: {}", C::NAME, key);
        let entry = self.entries.entry(key.to_string()).or_default();
        *C::slot(entry) = Some(constructor);
    }

    /// Register a policy validator constructor
    pub fn register_policy_validator<V, E, F>(&mut self, key: &str, constructor: F)
    where
        V: PolicyValidator + 'static,
        E: Into<BoxError>,
        F: Fn(&ValidatorConfig) -> Result<V, E> + Send + Sync + 'static,
    {
        let constructor: Constructor<dyn PolicyValidator> =
            Arc::new(move |config: &ValidatorConfig| {
                constructor(config)
                    .map(|validator| Box::new(validator) as Box<dyn PolicyValidator>)
                    .map_err(Into::<BoxError>::into)
            });
        self.register(key, constructor);
    }

    /// Register a payload validator constructor
    pub fn register_payload_validator<V, E, F>(&mut self, key: &str, constructor: F)
    where
        V: PayloadValidator + 'static,
        E: Into<BoxError>,
        F: Fn(&ValidatorConfig) -> Result<V, E> + Send + Sync + 'static,
    {
        let constructor: Constructor<dyn PayloadValidator> =
            Arc::new(move |config: &ValidatorConfig| {
                constructor(config)
                    .map(|validator| Box::new(validator) as Box<dyn PayloadValidator>)
                    .map_err(Into::<BoxError>::into)
            });
        self.register(key, constructor);
    }

    pub fn entry(&self, key: &str) -> Option<&PluginEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered implementation keys, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: HashMap<&str, Vec<&'static str>> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.as_str(), entry.capabilities()))
            .collect();
        f.debug_struct("PluginRegistry")
            .field("entries", &entries)
            .finish()
    }
}

/// Creates validators of capability `C` from configuration
///
/// Every call to [`create`](Self::create) builds a fresh instance; callers
/// that want reuse keep the returned box themselves.
pub struct ValidatorFactory<C: Capability + ?Sized> {
    registry: Arc<PluginRegistry>,
    _capability: PhantomData<fn() -> Box<C>>,
}

pub type PolicyValidatorFactory = ValidatorFactory<dyn PolicyValidator>;
pub type PayloadValidatorFactory = ValidatorFactory<dyn PayloadValidator>;

impl<C: Capability + ?Sized> ValidatorFactory<C> {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            _capability: PhantomData,
        }
    }

    /// Instantiate the implementation named by `config.implementation`
    ///
    /// # Errors
    /// * `InvalidArgument` - blank `name` or `implementation`
    /// * `NotFound` - nothing registered under the key
    /// * `BadRequest` - the key does not provide capability `C`
    /// * `Internal` - the constructor failed
    pub fn create(&self, config: &ValidatorConfig) -> Result<Box<C>, ValidationError> {
        if config.name.trim().is_empty() {
            return Err(ValidationError::InvalidArgument(format!(
                "{} name must be specified",
                C::NAME
            )));
        }
        if config.implementation.trim().is_empty() {
            return Err(ValidationError::InvalidArgument(format!(
                "implementation must be specified for {} '{}'",
                C::NAME,
                config.name
            )));
        }

        let key = config.implementation.trim();
        let entry = self.registry.entry(key).ok_or_else(|| {
            ValidationError::NotFound(format!("{} implementation '{}' not found", C::NAME, key))
        })?;

        let constructor = C::constructor(entry).ok_or_else(|| {
            ValidationError::BadRequest(format!(
                "implementation '{}' is not a {} (provides: {})",
                key,
                C::NAME,
                entry.capabilities().join(", ")
            ))
        })?;

        debug!("Creating {} '{}' from implementation '{}'", C::NAME, config.name, key);

        constructor(config).map_err(|e| ValidationError::Internal {
            message: format!("failed to construct {} '{}' from '{}'", C::NAME, config.name, key),
            source: Some(e),
        })
    }
}

impl<C: Capability + ?Sized> Clone for ValidatorFactory<C> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicySet;
    use async_trait::async_trait;

    /// Test double that echoes a marker taken from its configuration
    struct MarkerValidator {
        marker: String,
    }

    impl MarkerValidator {
        fn new(config: &ValidatorConfig) -> Result<Self, String> {
            Ok(Self {
                marker: config.config["marker"].as_str().unwrap_or("unset").to_string(),
            })
        }
    }

    #[async_trait]
    impl PolicyValidator for MarkerValidator {
        fn name(&self) -> &str {
            &self.marker
        }

        async fn validate_native_policies(&self, _: &PolicySet) -> Result<(), ValidationError> {
            Err(ValidationError::BadRequest(self.marker.clone()))
        }

        async fn validate_drools_policies(&self, _: &PolicySet) -> Result<(), ValidationError> {
            Ok(())
        }

        async fn validate_xacml_policies(&self, _: &PolicySet) -> Result<(), ValidationError> {
            Ok(())
        }

        async fn validate_apex_policies(&self, _: &PolicySet) -> Result<(), ValidationError> {
            Ok(())
        }
    }

    /// Test double whose constructor always refuses
    struct NeverUseMe;

    #[async_trait]
    impl PayloadValidator for NeverUseMe {
        fn name(&self) -> &str {
            "never"
        }

        async fn validate_payload(&self, _: &PolicySet) -> Result<(), ValidationError> {
            Ok(())
        }
    }

    fn test_registry() -> Arc<PluginRegistry> {
        let mut registry = PluginRegistry::new();
        registry.register_policy_validator("marker", MarkerValidator::new);
        registry.register_payload_validator("never", |_: &ValidatorConfig| {
            Err::<NeverUseMe, _>("this validator must never be used")
        });
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_create_dispatches_to_registered_implementation() {
        let factory = PolicyValidatorFactory::new(test_registry());
        let config = ValidatorConfig::new("policy", "marker")
            .with_config(serde_json::json!({"marker": "from-constructor"}));

        let validator = factory.create(&config).unwrap();
        assert_eq!(validator.name(), "from-constructor");

        let err = validator
            .validate_native_policies(&PolicySet::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "from-constructor");
    }

    #[test]
    fn test_create_returns_fresh_instances() {
        let constructed = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);

        let mut registry = PluginRegistry::empty();
        registry.register_policy_validator("counted", move |config: &ValidatorConfig| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            MarkerValidator::new(config)
        });
        let factory = PolicyValidatorFactory::new(Arc::new(registry));
        let config = ValidatorConfig::new("policy", "counted");

        factory.create(&config).unwrap();
        factory.create(&config).unwrap();
        assert_eq!(constructed.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_blank_fields_are_invalid_arguments() {
        let factory = PolicyValidatorFactory::new(test_registry());

        let blank_impl = factory.create(&ValidatorConfig::new("policy", "  ")).err().unwrap();
        assert!(matches!(blank_impl, ValidationError::InvalidArgument(_)));

        let blank_name = factory.create(&ValidatorConfig::new("", "marker")).err().unwrap();
        assert!(matches!(blank_name, ValidationError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_implementation_is_not_found() {
        let factory = PolicyValidatorFactory::new(test_registry());
        let err = factory
            .create(&ValidatorConfig::new("policy", "org.example.Missing"))
            .err()
            .unwrap();

        assert!(matches!(err, ValidationError::NotFound(_)));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_wrong_capability_is_bad_request() {
        let policy_factory = PolicyValidatorFactory::new(test_registry());
        let err = policy_factory
            .create(&ValidatorConfig::new("policy", "never"))
            .err()
            .unwrap();
        assert!(matches!(err, ValidationError::BadRequest(_)));

        let payload_factory = PayloadValidatorFactory::new(test_registry());
        let err = payload_factory
            .create(&ValidatorConfig::new("payload", "marker"))
            .err()
            .unwrap();
        assert!(matches!(err, ValidationError::BadRequest(_)));
    }

    #[test]
    fn test_failing_constructor_is_internal_error() {
        let factory = PayloadValidatorFactory::new(test_registry());
        let err = factory
            .create(&ValidatorConfig::new("payload", "never"))
            .err()
            .unwrap();

        assert_eq!(err.status_code(), 500);
        let response = err.to_response();
        assert_eq!(response.error_details, vec!["this validator must never be used".to_string()]);
    }

    #[test]
    fn test_builtins_registered() {
        let registry = PluginRegistry::new();
        assert!(registry.contains(builtin::DEFAULT_IMPLEMENTATION));
        assert!(PluginRegistry::empty().names().is_empty());

        let debug = format!("{:?}", registry);
        assert!(debug.contains("policy validator"));
        assert!(debug.contains("payload validator"));
    }
}
