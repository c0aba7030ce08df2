// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use academy_server_authz::{AuthzError, Relation, ResourceType};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Internal: {0}")]
	Internal(String),
}

impl DbError {
	/// Converts a failure of an assignment or profile lookup.
	pub fn into_lookup(self) -> AuthzError {
		AuthzError::AssignmentLookup(self.to_string())
	}

	/// Converts a failure while loading one relation of a record.
	pub fn into_relation_load(self, resource_type: ResourceType, relation: Relation) -> AuthzError {
		AuthzError::RelationLoad {
			resource_type,
			relation,
			message: self.to_string(),
		}
	}
}

pub type Result<T> = std::result::Result<T, DbError>;
