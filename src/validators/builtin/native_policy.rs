//! Default policy validator: rule artifact existence checks for native policies

use crate::config::ConfigError;
use crate::policy::{NativePolicyType, Policy, PolicyEntityKey, PolicySet};
use crate::repository::{RepositoryClient, RepositorySettings, ResolveOutcome};
use crate::validators::*;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Policy validator that checks Drools rule artifacts against the repository
///
/// XACML and APEX native policies are accepted as-is.
#[derive(Debug, Clone)]
pub struct DefaultPolicyValidator {
    name: String,
    repository: RepositorySettings,
}

impl DefaultPolicyValidator {
    /// Build from the validator's config block (`nexus_name`, `nexus_port`)
    pub fn new(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        let repository = RepositorySettings::from_validator_config(config)?;

        debug!(
            "Initialized policy validator '{}' against {}:{}",
            config.name,
            repository.nexus_name,
            repository.nexus_port.unwrap_or_default()
        );

        Ok(Self {
            name: config.name.clone(),
            repository,
        })
    }

    /// Check that the rule artifact referenced by one Drools policy exists
    async fn validate_drools_policy(
        &self,
        key: &PolicyEntityKey,
        policy: &Policy,
    ) -> Result<(), ValidationError> {
        let client = RepositoryClient::new(&self.repository).map_err(|e| {
            ValidationError::not_acceptable_with(
                format!("cannot create repository client to check policy {}", key),
                e,
            )
        })?;

        let coordinate = policy.rule_artifact().map_err(|e| {
            ValidationError::not_acceptable_with(
                format!("cannot extract rule artifact from policy {}", key),
                e,
            )
        })?;

        let outcome = client.resolve(&coordinate).await.map_err(|e| {
            ValidationError::not_acceptable_with(
                format!("rule artifact {} could not be checked", coordinate),
                e,
            )
        })?;

        match outcome {
            ResolveOutcome::Found => {
                debug!("✅ Rule artifact {} found for policy {}", coordinate, key);
                Ok(())
            }
            ResolveOutcome::Missing => {
                warn!("🚫 Rule artifact {} for policy {} not found", coordinate, key);
                Err(ValidationError::not_acceptable(format!(
                    "rule artifact {} not found",
                    coordinate
                )))
            }
            ResolveOutcome::Unexpected { status, body } => {
                warn!(
                    "🚫 Repository answered {} checking {} for policy {}",
                    status, coordinate, key
                );
                Err(ValidationError::RemoteStatus { status, body })
            }
        }
    }
}

#[async_trait]
impl PolicyValidator for DefaultPolicyValidator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate_native_policies(&self, policies: &PolicySet) -> Result<(), ValidationError> {
        for native_type in NativePolicyType::ALL {
            let filtered = policies.filter_native(native_type);
            debug!("Validating {} {} native policies", filtered.len(), native_type);

            match native_type {
                NativePolicyType::Drools => self.validate_drools_policies(&filtered).await?,
                NativePolicyType::Xacml => self.validate_xacml_policies(&filtered).await?,
                NativePolicyType::Apex => self.validate_apex_policies(&filtered).await?,
            }
        }
        Ok(())
    }

    async fn validate_drools_policies(&self, policies: &PolicySet) -> Result<(), ValidationError> {
        if policies.is_empty() {
            return Ok(());
        }

        for (key, policy) in policies {
            self.validate_drools_policy(key, policy).await?;
        }
        Ok(())
    }

    async fn validate_xacml_policies(&self, policies: &PolicySet) -> Result<(), ValidationError> {
        if policies.is_empty() {
            return Ok(());
        }

        debug!("No XACML native policy checks defined, accepting {}", policies.len());
        Ok(())
    }

    async fn validate_apex_policies(&self, policies: &PolicySet) -> Result<(), ValidationError> {
        if policies.is_empty() {
            return Ok(());
        }

        debug!("No APEX native policy checks defined, accepting {}", policies.len());
        Ok(())
    }
}
