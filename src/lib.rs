//! # Policy Validation
//!
//! Validation and provisioning core of a policy-management service.
//!
//! ## Features
//! - Validator implementations selected by name from configuration
//! - Native policy checks: Drools rule artifacts must exist in the Nexus
//!   repository before a policy is accepted
//! - Storage provider retrieval with unbounded, cancellable retry
//! - TOML configuration with field-level validation

pub mod config;
pub mod logging;
pub mod policy;
pub mod repository;
pub mod storage;
pub mod validators;

#[cfg(test)]
mod test_support;
