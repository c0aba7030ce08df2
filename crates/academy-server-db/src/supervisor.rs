// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supervisor profile and assignment repository.
//!
//! Assignments are stored as `(supervisor_profile_id, teacher_user_id,
//! teacher_kind)` rows. A row only counts when the teacher's account role
//! matches the declared kind; mismatched rows are skipped and logged.

use academy_server_authz::{
	ActorId, AssignmentStore, AuthzError, SupervisorProfile, TeacherKind, TenantId,
};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;

/// Repository for supervisor profiles and their teacher assignments.
#[derive(Clone)]
pub struct SupervisorRepository {
	pool: SqlitePool,
}

impl SupervisorRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Load the supervisor profile of a user, with both assignment sets.
	///
	/// # Returns
	/// `None` if the user has no supervisor profile.
	#[tracing::instrument(skip(self), fields(supervisor_id = %supervisor_id))]
	pub async fn get_profile(
		&self,
		supervisor_id: ActorId,
	) -> Result<Option<SupervisorProfile>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, academy_id, department, can_manage_teachers
			FROM supervisor_profiles
			WHERE user_id = ?
			"#,
		)
		.bind(supervisor_id.get())
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};
		let profile_id: i64 = row.get("id");
		let mut profile = SupervisorProfile::new(supervisor_id)
			.with_manage_teachers(row.get::<i64, _>("can_manage_teachers") != 0);
		profile.tenant_id = row.get::<Option<i64>, _>("academy_id").map(TenantId::new);
		profile.department = row.get("department");

		let assignments = sqlx::query(
			r#"
			SELECT a.teacher_user_id, a.teacher_kind, u.role
			FROM supervisor_assignments a
			JOIN users u ON u.id = a.teacher_user_id
			WHERE a.supervisor_profile_id = ?
			"#,
		)
		.bind(profile_id)
		.fetch_all(&self.pool)
		.await?;

		for assignment in assignments {
			let teacher_id = ActorId::new(assignment.get("teacher_user_id"));
			let kind: String = assignment.get("teacher_kind");
			let role: String = assignment.get("role");

			match TeacherKind::parse(&kind) {
				Some(kind) if kind.role().as_str() == role => {
					profile = profile.with_teacher(kind, teacher_id);
				}
				_ => {
					tracing::warn!(
						teacher_id = %teacher_id,
						teacher_kind = %kind,
						role = %role,
						"skipping assignment whose teacher role does not match its kind"
					);
				}
			}
		}

		tracing::debug!(
			quran_teachers = profile.assigned_quran_teacher_ids.len(),
			academic_teachers = profile.assigned_academic_teacher_ids.len(),
			"supervisor profile loaded"
		);
		Ok(Some(profile))
	}
}

#[async_trait]
impl AssignmentStore for SupervisorRepository {
	async fn supervisor_profile(
		&self,
		supervisor_id: ActorId,
	) -> academy_server_authz::Result<SupervisorProfile> {
		self
			.get_profile(supervisor_id)
			.await
			.map_err(DbError::into_lookup)?
			.ok_or(AuthzError::ProfileNotFound(supervisor_id))
	}
}
