// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization engine configuration.

use academy_server_authz::ResourceType;
use serde::Deserialize;

use crate::error::ConfigError;

/// Authorization configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthzConfig {
	/// Resource types that are evaluated. Types left out stay registered as
	/// disabled policies and are denied everything.
	pub enabled_resource_types: Vec<ResourceType>,
	/// Log every decision at `info` rather than `debug`.
	pub log_decisions: bool,
}

impl Default for AuthzConfig {
	fn default() -> Self {
		Self {
			enabled_resource_types: ResourceType::all().to_vec(),
			log_decisions: false,
		}
	}
}

/// Authorization configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthzConfigLayer {
	#[serde(default)]
	pub enabled_resource_types: Option<Vec<String>>,
	#[serde(default)]
	pub log_decisions: Option<bool>,
}

impl AuthzConfigLayer {
	pub fn merge(&mut self, other: AuthzConfigLayer) {
		if other.enabled_resource_types.is_some() {
			self.enabled_resource_types = other.enabled_resource_types;
		}
		if other.log_decisions.is_some() {
			self.log_decisions = other.log_decisions;
		}
	}

	/// Resolves the layer, rejecting unknown resource type names.
	pub fn finalize(self) -> Result<AuthzConfig, ConfigError> {
		let enabled_resource_types = match self.enabled_resource_types {
			Some(names) => {
				let mut types = Vec::with_capacity(names.len());
				for name in &names {
					let rt: ResourceType = name.trim().parse()?;
					if !types.contains(&rt) {
						types.push(rt);
					}
				}
				types
			}
			None => ResourceType::all().to_vec(),
		};

		Ok(AuthzConfig {
			enabled_resource_types,
			log_decisions: self.log_decisions.unwrap_or(false),
		})
	}
}
