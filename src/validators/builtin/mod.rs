//! Built-in validators

mod native_policy;
mod payload;

pub use native_policy::DefaultPolicyValidator;
pub use payload::DefaultPayloadValidator;

use super::PluginRegistry;

/// Registry key of the built-in implementations
pub const DEFAULT_IMPLEMENTATION: &str = "default";

/// Register every built-in implementation
pub(crate) fn register(registry: &mut PluginRegistry) {
    registry.register_policy_validator(DEFAULT_IMPLEMENTATION, DefaultPolicyValidator::new);
    registry.register_payload_validator(DEFAULT_IMPLEMENTATION, DefaultPayloadValidator::new);
}
