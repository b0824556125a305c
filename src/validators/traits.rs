//! Capability traits a validator implementation must provide
//!
//! Implementations are selected by name at startup through
//! [`ValidatorFactory`](super::ValidatorFactory) and then used through these
//! traits only.

use crate::policy::PolicySet;
use async_trait::async_trait;

use super::ValidationError;

/// Validates native policies and their external dependencies.
///
/// Each operation receives the full policy set (or a type-filtered subset
/// for the per-type checks) and returns `Ok(())` when the set is acceptable.
#[async_trait]
pub trait PolicyValidator: Send + Sync {
    /// Configured name of this validator (for logging and diagnostics)
    fn name(&self) -> &str;

    /// Check policies against their declared policy types
    ///
    /// Extension point; no structural rules are defined yet.
    async fn validate_policies_against_policy_types(
        &self,
        policies: &PolicySet,
    ) -> Result<(), ValidationError> {
        let _ = policies;
        Ok(())
    }

    /// Filter the set by native type and run every per-type check
    async fn validate_native_policies(&self, policies: &PolicySet) -> Result<(), ValidationError>;

    /// Check Drools policies (expects a Drools-only set)
    async fn validate_drools_policies(&self, policies: &PolicySet) -> Result<(), ValidationError>;

    /// Check XACML policies (expects an XACML-only set)
    async fn validate_xacml_policies(&self, policies: &PolicySet) -> Result<(), ValidationError>;

    /// Check APEX policies (expects an APEX-only set)
    async fn validate_apex_policies(&self, policies: &PolicySet) -> Result<(), ValidationError>;
}

/// Validates an incoming policy payload before it is stored
#[async_trait]
pub trait PayloadValidator: Send + Sync {
    fn name(&self) -> &str;

    async fn validate_payload(&self, policies: &PolicySet) -> Result<(), ValidationError>;
}
