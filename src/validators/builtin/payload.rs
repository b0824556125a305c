//! Default payload validator

use crate::policy::PolicySet;
use crate::validators::*;
use async_trait::async_trait;
use std::convert::Infallible;
use tracing::debug;

/// Payload validator that accepts every policy set
///
/// Placeholder implementation until structural payload rules exist.
#[derive(Debug, Clone)]
pub struct DefaultPayloadValidator {
    name: String,
}

impl DefaultPayloadValidator {
    pub fn new(config: &ValidatorConfig) -> Result<Self, Infallible> {
        Ok(Self {
            name: config.name.clone(),
        })
    }
}

#[async_trait]
impl PayloadValidator for DefaultPayloadValidator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate_payload(&self, policies: &PolicySet) -> Result<(), ValidationError> {
        debug!("Payload validator '{}' accepted {} policies", self.name, policies.len());
        Ok(())
    }
}
