// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

use crate::resource::{Relation, ResourceType};
use crate::types::ActorId;

/// Errors raised while building policies or evaluating a request.
///
/// Ordinary denial is never an error. Only infrastructure failures and
/// startup misconfiguration appear here.
#[derive(Debug, Error)]
pub enum AuthzError {
	#[error("invalid resource type: {0}")]
	InvalidResourceType(String),

	#[error("no policy registered for resource type {0}")]
	MissingPolicy(ResourceType),

	#[error("invalid policy for {resource_type}: {reason}")]
	InvalidPolicy {
		resource_type: ResourceType,
		reason: String,
	},

	#[error("supervisor profile not found for actor {0}")]
	ProfileNotFound(ActorId),

	#[error("assignment lookup failed: {0}")]
	AssignmentLookup(String),

	#[error("failed to load relation {relation} of {resource_type}: {message}")]
	RelationLoad {
		resource_type: ResourceType,
		relation: Relation,
		message: String,
	},
}

impl AuthzError {
	/// Stable label used in the `error_kind` log field.
	pub fn kind(&self) -> &'static str {
		match self {
			AuthzError::InvalidResourceType(_) => "invalid_resource_type",
			AuthzError::MissingPolicy(_) => "missing_policy",
			AuthzError::InvalidPolicy { .. } => "invalid_policy",
			AuthzError::ProfileNotFound(_) => "profile_not_found",
			AuthzError::AssignmentLookup(_) => "assignment_lookup",
			AuthzError::RelationLoad { .. } => "relation_load",
		}
	}

	/// True for failures of the data layer, as opposed to misconfiguration.
	pub fn is_infrastructure(&self) -> bool {
		matches!(
			self,
			AuthzError::AssignmentLookup(_) | AuthzError::RelationLoad { .. }
		)
	}
}

pub type Result<T> = std::result::Result<T, AuthzError>;
