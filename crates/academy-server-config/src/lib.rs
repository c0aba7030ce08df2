// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration for the academy authorization engine.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Validation of resource type names at load time
//! - Consistent environment variable naming (`ACADEMY_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use academy_server_config::load_config;
//!
//! let config = load_config()?;
//! let registry = PolicyRegistry::standard_for(&config.authz.enabled_resource_types)?;
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub authz: AuthzConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ACADEMY_SERVER_*`)
/// 2. Config file (`/etc/academy/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and resolve the result.
pub fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let authz = layer.authz.unwrap_or_default().finalize()?;

	validate_config(&authz)?;

	info!(
		database = %database.url,
		log_level = %logging.level,
		log_json = logging.json,
		enabled_resource_types = authz.enabled_resource_types.len(),
		log_decisions = authz.log_decisions,
		"configuration loaded"
	);

	Ok(ServerConfig {
		database,
		logging,
		authz,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(authz: &AuthzConfig) -> Result<(), ConfigError> {
	if authz.enabled_resource_types.is_empty() {
		return Err(ConfigError::Validation(
			"authz.enabled_resource_types is empty; every request would be denied".to_string(),
		));
	}
	Ok(())
}
