// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use academy_server_authz::{
	AcademicProfileId, ActorId, CourseId, ProfileDirectory, ProfileRef, QuranProfileId, TeacherKind,
	TeacherProfile, TenantId,
};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, QueryBuilder, Row, Sqlite};
use std::collections::BTreeSet;

use crate::error::DbError;
use crate::schema::profile_spec;

/// Repository for teacher profiles and the courses assigned to them.
#[derive(Clone)]
pub struct TeacherRepository {
	pool: SqlitePool,
}

impl TeacherRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// `SELECT <select> FROM <table> WHERE <column> IN (<ids>)`. Empty `ids`
	/// return nothing without querying.
	async fn ids_where_in(
		&self,
		table: &str,
		column: &str,
		ids: impl Iterator<Item = i64>,
	) -> Result<BTreeSet<i64>, DbError> {
		let ids: Vec<i64> = ids.collect();
		if ids.is_empty() {
			return Ok(BTreeSet::new());
		}

		let mut query: QueryBuilder<'_, Sqlite> =
			QueryBuilder::new(format!("SELECT id FROM {table} WHERE {column} IN ("));
		{
			let mut separated = query.separated(", ");
			for id in ids {
				separated.push_bind(id);
			}
		}
		query.push(")");

		let rows = query.build().fetch_all(&self.pool).await?;
		Ok(rows.iter().map(|row| row.get::<i64, _>("id")).collect())
	}

	/// Profile IDs of the given teacher actors, for one kind.
	#[tracing::instrument(skip(self, actor_ids), fields(kind = %kind, actors = actor_ids.len()))]
	pub async fn profile_ids(
		&self,
		kind: TeacherKind,
		actor_ids: &BTreeSet<ActorId>,
	) -> Result<BTreeSet<i64>, DbError> {
		let ids = self
			.ids_where_in(profile_spec(kind).table, "user_id", actor_ids.iter().map(|id| id.get()))
			.await?;
		tracing::debug!(profiles = ids.len(), "teacher profiles resolved");
		Ok(ids)
	}

	/// Interactive courses assigned to any of the given academic profiles.
	#[tracing::instrument(skip(self, profile_ids), fields(profiles = profile_ids.len()))]
	pub async fn course_ids(
		&self,
		profile_ids: &BTreeSet<AcademicProfileId>,
	) -> Result<BTreeSet<CourseId>, DbError> {
		let ids = self
			.ids_where_in(
				"interactive_courses",
				"assigned_teacher_id",
				profile_ids.iter().map(|id| id.get()),
			)
			.await?;
		Ok(ids.into_iter().map(CourseId::new).collect())
	}

	/// Load one teacher profile by its profile ID.
	#[tracing::instrument(skip(self), fields(profile = ?profile))]
	pub async fn get_profile(
		&self,
		profile: ProfileRef,
	) -> Result<Option<TeacherProfile>, DbError> {
		let kind = profile.kind();
		let Some(id) = profile.id_for(kind) else {
			return Ok(None);
		};
		let sql = format!(
			"SELECT id, user_id, academy_id FROM {} WHERE id = ?",
			profile_spec(kind).table
		);
		let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
		Ok(row.map(|row| teacher_from_row(kind, &row)))
	}
}

fn teacher_from_row(kind: TeacherKind, row: &sqlx::sqlite::SqliteRow) -> TeacherProfile {
	TeacherProfile {
		actor_id: ActorId::new(row.get("user_id")),
		profile: ProfileRef::from_raw(kind, row.get("id")),
		tenant_id: row.get::<Option<i64>, _>("academy_id").map(TenantId::new),
	}
}

#[async_trait]
impl ProfileDirectory for TeacherRepository {
	async fn quran_profile_ids(
		&self,
		actor_ids: &BTreeSet<ActorId>,
	) -> academy_server_authz::Result<BTreeSet<QuranProfileId>> {
		let ids = self
			.profile_ids(TeacherKind::Quran, actor_ids)
			.await
			.map_err(DbError::into_lookup)?;
		Ok(ids.into_iter().map(QuranProfileId::new).collect())
	}

	async fn academic_profile_ids(
		&self,
		actor_ids: &BTreeSet<ActorId>,
	) -> academy_server_authz::Result<BTreeSet<AcademicProfileId>> {
		let ids = self
			.profile_ids(TeacherKind::Academic, actor_ids)
			.await
			.map_err(DbError::into_lookup)?;
		Ok(ids.into_iter().map(AcademicProfileId::new).collect())
	}

	async fn course_ids_for_teachers(
		&self,
		profile_ids: &BTreeSet<AcademicProfileId>,
	) -> academy_server_authz::Result<BTreeSet<CourseId>> {
		self.course_ids(profile_ids).await.map_err(DbError::into_lookup)
	}
}
