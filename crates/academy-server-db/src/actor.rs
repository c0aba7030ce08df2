// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use academy_server_authz::{Actor, ActorId, IdentityContext, Role, TenantId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;

/// Repository for user accounts, as seen by the authorization layer.
#[derive(Clone)]
pub struct ActorRepository {
	pool: SqlitePool,
}

impl ActorRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Load a user's role and home academy.
	///
	/// # Errors
	/// Returns `DbError::Internal` if the stored role is not one the
	/// authorization layer knows.
	#[tracing::instrument(skip(self), fields(actor_id = %id))]
	pub async fn get_actor(&self, id: ActorId) -> Result<Option<Actor>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, role, academy_id
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.get())
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};
		let role: String = row.get("role");
		let role = Role::parse(&role)
			.ok_or_else(|| DbError::Internal(format!("unknown role '{role}' for user {id}")))?;
		Ok(Some(Actor::new(
			id,
			role,
			row.get::<Option<i64>, _>("academy_id").map(TenantId::new),
		)))
	}

	/// Builds the identity context of a user acting in an academy.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the user does not exist.
	pub async fn identity(
		&self,
		id: ActorId,
		tenant_id: TenantId,
	) -> Result<IdentityContext, DbError> {
		let actor = self
			.get_actor(id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("user {id}")))?;
		Ok(IdentityContext::new(actor, tenant_id))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_test_pool, insert_user};

	#[tokio::test]
	async fn loads_role_and_academy() {
		let pool = create_test_pool().await;
		insert_user(&pool, 100, "supervisor", 3).await;

		let repo = ActorRepository::new(pool);
		let actor = repo.get_actor(ActorId::new(100)).await.unwrap().unwrap();
		assert_eq!(actor.role, Role::Supervisor);
		assert_eq!(actor.tenant_id, Some(TenantId::new(3)));

		let ctx = repo.identity(ActorId::new(100), TenantId::new(3)).await.unwrap();
		assert!(ctx.is_supervisor_in_tenant());
	}

	#[tokio::test]
	async fn unknown_role_is_internal() {
		let pool = create_test_pool().await;
		insert_user(&pool, 7, "janitor", 1).await;

		let repo = ActorRepository::new(pool);
		let err = repo.get_actor(ActorId::new(7)).await.unwrap_err();
		assert!(matches!(err, DbError::Internal(_)));
	}

	#[tokio::test]
	async fn missing_user() {
		let pool = create_test_pool().await;
		let repo = ActorRepository::new(pool);
		assert!(repo.get_actor(ActorId::new(1)).await.unwrap().is_none());
		let err = repo.identity(ActorId::new(1), TenantId::new(1)).await.unwrap_err();
		assert!(matches!(err, DbError::NotFound(_)));
	}
}
