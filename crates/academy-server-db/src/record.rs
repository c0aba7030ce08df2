// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Record loading for per-record authorization.
//!
//! Rows of every supervised table are reduced to a [`ResourceRecord`] using the
//! layout in [`crate::schema`]. The same repository lazily loads the relations
//! ownership evaluation asks for.

use academy_server_authz::{
	ActorId, CourseId, ProfileRef, RecordId, Related, Relation, RelationLoader, ResourceRecord,
	ResourceType, TeacherKind, TenantId,
};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::schema::{table_spec, ProfileColumn, TableSpec};
use crate::teacher::TeacherRepository;

/// Repository for loading supervised records and their relations.
#[derive(Clone)]
pub struct RecordRepository {
	pool: SqlitePool,
	teachers: TeacherRepository,
}

impl RecordRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			teachers: TeacherRepository::new(pool.clone()),
			pool,
		}
	}

	/// Load one record of the given type.
	///
	/// # Returns
	/// `None` if no row exists with this ID.
	///
	/// # Errors
	/// Returns `DbError::Internal` if a polymorphic type column holds an
	/// unknown discriminator.
	#[tracing::instrument(skip(self), fields(resource_type = %resource_type, record_id = %id))]
	pub async fn get_record(
		&self,
		resource_type: ResourceType,
		id: RecordId,
	) -> Result<Option<ResourceRecord>, DbError> {
		let layout = table_spec(resource_type);
		let sql = select_sql(layout);
		let row = sqlx::query(&sql).bind(id.get()).fetch_optional(&self.pool).await?;
		row.map(|row| record_from_row(layout, &row)).transpose()
	}

	async fn load(
		&self,
		record: &ResourceRecord,
		relation: Relation,
	) -> Result<Option<Related>, DbError> {
		match relation {
			// only a fixed profile column reaches a teacher row, as in compiled scopes
			Relation::Teacher => {
				let fixed = matches!(
					table_spec(record.resource_type).teacher_profile,
					Some(ProfileColumn::Fixed(..))
				);
				match record.teacher_profile {
					Some(profile) if fixed => {
						Ok(self.teachers.get_profile(profile).await?.map(Related::Teacher))
					}
					_ => Ok(None),
				}
			}
			Relation::Course => match record.course_id {
				Some(course_id) => Ok(self
					.get_record(ResourceType::InteractiveCourse, RecordId::new(course_id.get()))
					.await?
					.map(|r| Related::Record(Box::new(r)))),
				None => Ok(None),
			},
			Relation::Target(rt) => match record.target {
				Some(target) if target.resource_type == rt => Ok(self
					.get_record(rt, target.id)
					.await?
					.map(|r| Related::Record(Box::new(r)))),
				_ => Ok(None),
			},
		}
	}
}

#[async_trait]
impl RelationLoader for RecordRepository {
	async fn load_relation(
		&self,
		record: &ResourceRecord,
		relation: Relation,
	) -> academy_server_authz::Result<Option<Related>> {
		self
			.load(record, relation)
			.await
			.map_err(|e| e.into_relation_load(record.resource_type, relation))
	}
}

fn select_sql(layout: &TableSpec) -> String {
	let or_null = |column: Option<&str>| column.unwrap_or("NULL").to_string();
	let (profile_kind, profile_id) = match layout.teacher_profile {
		Some(ProfileColumn::Fixed(kind, column)) => {
			(format!("'{}'", kind.as_str()), column.to_string())
		}
		Some(ProfileColumn::Tagged {
			kind_column,
			id_column,
		}) => (kind_column.to_string(), id_column.to_string()),
		None => ("NULL".to_string(), "NULL".to_string()),
	};
	let (target_type, target_id) = match layout.target {
		Some(target) => (target.type_column.to_string(), target.id_column.to_string()),
		None => ("NULL".to_string(), "NULL".to_string()),
	};

	format!(
		"SELECT id, {tenant} AS tenant_id, {actor} AS teacher_actor_id, \
		 {profile_kind} AS teacher_kind, {profile_id} AS teacher_profile_id, \
		 {course} AS course_id, {target_type} AS target_type, {target_id} AS target_id, \
		 {status} AS status \
		 FROM {table} WHERE id = ?",
		tenant = or_null(layout.tenant),
		actor = or_null(layout.teacher_actor),
		course = or_null(layout.course),
		status = or_null(layout.status),
		table = layout.table,
	)
}

fn record_from_row(
	layout: &TableSpec,
	row: &sqlx::sqlite::SqliteRow,
) -> Result<ResourceRecord, DbError> {
	let mut record = ResourceRecord::new(layout.resource_type, RecordId::new(row.get("id")));
	record.tenant_id = row.get::<Option<i64>, _>("tenant_id").map(TenantId::new);
	record.teacher_actor_id = row.get::<Option<i64>, _>("teacher_actor_id").map(ActorId::new);
	record.course_id = row.get::<Option<i64>, _>("course_id").map(CourseId::new);
	record.status = row.get("status");

	let teacher_kind: Option<String> = row.get("teacher_kind");
	let teacher_profile_id: Option<i64> = row.get("teacher_profile_id");
	if let (Some(kind), Some(id)) = (teacher_kind, teacher_profile_id) {
		let kind = TeacherKind::parse(&kind).ok_or_else(|| {
			DbError::Internal(format!("unknown teacher type '{kind}' in {}", layout.table))
		})?;
		record.teacher_profile = Some(ProfileRef::from_raw(kind, id));
	}

	let target_type: Option<String> = row.get("target_type");
	let target_id: Option<i64> = row.get("target_id");
	if let (Some(target_type), Some(target_id)) = (target_type, target_id) {
		let target_type = target_type
			.parse::<ResourceType>()
			.map_err(|e| DbError::Internal(format!("{e} in {}", layout.table)))?;
		record = record.with_target(target_type, RecordId::new(target_id));
	}

	Ok(record)
}
