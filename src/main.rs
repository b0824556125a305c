//! # policy-validation
//!
//! Command-line driver for the validation subsystem: loads the TOML
//! configuration, builds the configured validators and runs payload and
//! native policy validation over a policy set document.
//!
//! ```text
//! policy-validation <config.toml> <policies.json>
//! ```
use std::env;
use std::fs;
use std::process;
use std::sync::Arc;

use policy_validation::config::Config;
use policy_validation::logging;
use policy_validation::policy::PolicySet;
use policy_validation::validators::{
    PayloadValidatorFactory, PluginRegistry, PolicyValidatorFactory, ValidationError,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} <config.toml> <policies.json>", program_name(&args));
        process::exit(2);
    }
    let config_path = &args[1];
    let policies_path = &args[2];

    println!("🔧 Loading configuration from: {}", config_path);

    let config = match Config::from_file(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ Failed to load config: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("❌ Configuration validation failed: {}", e);
        process::exit(1);
    }

    logging::init(&config.logging);

    let policies = match fs::read_to_string(policies_path)
        .map_err(|e| e.to_string())
        .and_then(|json| PolicySet::from_json(&json).map_err(|e| e.to_string()))
    {
        Ok(policies) => policies,
        Err(e) => {
            eprintln!("❌ Failed to read policies from {}: {}", policies_path, e);
            process::exit(1);
        }
    };

    let registry = Arc::new(PluginRegistry::new());
    if let Err(e) = run(&config, registry, &policies).await {
        error!("Validation failed: {}", e);
        match serde_json::to_string_pretty(&e.to_response()) {
            Ok(body) => println!("{}", body),
            Err(_) => eprintln!("❌ {}", e),
        }
        process::exit(1);
    }

    println!("✅ {} policies accepted", policies.len());
}

async fn run(
    config: &Config,
    registry: Arc<PluginRegistry>,
    policies: &PolicySet,
) -> Result<(), ValidationError> {
    let payload_validator =
        PayloadValidatorFactory::new(Arc::clone(&registry)).create(&config.payload_validator)?;
    let policy_validator =
        PolicyValidatorFactory::new(registry).create(&config.policy_validator)?;

    info!(
        "Validating {} policies with '{}' and '{}'",
        policies.len(),
        payload_validator.name(),
        policy_validator.name()
    );

    payload_validator.validate_payload(policies).await?;
    policy_validator
        .validate_policies_against_policy_types(policies)
        .await?;
    policy_validator.validate_native_policies(policies).await?;

    Ok(())
}

fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("policy-validation")
}
