// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compilation of scope predicates into SQLite queries.
//!
//! ```text
//! Predicate::In { column, values }   ──► t.col IN (?, ?, ...)
//! Predicate::Related { relation, p } ──► EXISTS (SELECT 1 FROM other r0
//!                                                WHERE r0.id = t.fk AND p)
//! Predicate::False                   ──► 0 = 1
//! ```
//!
//! Columns or relations a table does not have compile to `0 = 1`, so a
//! mismatched predicate can only ever narrow a query.

use academy_server_authz::{Predicate, RecordId, ResourceType};
use sqlx::{sqlite::SqlitePool, QueryBuilder, Row, Sqlite};

use crate::error::DbError;
use crate::schema::{table_spec, ColumnRef, TableSpec};

const BASE_ALIAS: &str = "t";

struct Compiler {
	next_alias: usize,
}

impl Compiler {
	fn alias(&mut self) -> String {
		let alias = format!("r{}", self.next_alias);
		self.next_alias += 1;
		alias
	}

	fn push(
		&mut self,
		query: &mut QueryBuilder<'_, Sqlite>,
		predicate: &Predicate,
		layout: &TableSpec,
		alias: &str,
	) {
		match predicate {
			Predicate::False => {
				query.push("0 = 1");
			}
			Predicate::In { column, values } => match layout.column(alias, *column) {
				Some(column) if !values.is_empty() => {
					query.push("(");
					push_guard(query, &column);
					query.push(&column.expr).push(" IN (");
					{
						let mut separated = query.separated(", ");
						for value in values {
							separated.push_bind(*value);
						}
					}
					query.push("))");
				}
				_ => {
					query.push("0 = 1");
				}
			},
			Predicate::Eq { column, value } => match layout.column(alias, *column) {
				Some(column) => {
					query.push("(");
					push_guard(query, &column);
					query.push(&column.expr).push(" = ").push_bind(*value).push(")");
				}
				None => {
					query.push("0 = 1");
				}
			},
			Predicate::Related {
				relation,
				predicate,
			} => match layout.join(alias, *relation) {
				Some(join) => {
					let inner = self.alias();
					query.push("(");
					if let Some((type_column, value)) = &join.guard {
						query.push(type_column).push(" = ").push_bind(*value).push(" AND ");
					}
					query
						.push("EXISTS (SELECT 1 FROM ")
						.push(join.layout.table)
						.push(" ")
						.push(&inner)
						.push(" WHERE ")
						.push(&inner)
						.push(".id = ")
						.push(&join.on)
						.push(" AND ");
					self.push(query, predicate, join.layout, &inner);
					query.push("))");
				}
				None => {
					query.push("0 = 1");
				}
			},
			Predicate::And(parts) => self.push_all(query, parts, " AND ", "1 = 1", layout, alias),
			Predicate::Or(parts) => self.push_all(query, parts, " OR ", "0 = 1", layout, alias),
		}
	}

	fn push_all(
		&mut self,
		query: &mut QueryBuilder<'_, Sqlite>,
		parts: &[Predicate],
		separator: &str,
		empty: &str,
		layout: &TableSpec,
		alias: &str,
	) {
		if parts.is_empty() {
			query.push(empty);
			return;
		}
		query.push("(");
		for (i, part) in parts.iter().enumerate() {
			if i > 0 {
				query.push(separator);
			}
			self.push(query, part, layout, alias);
		}
		query.push(")");
	}
}

fn push_guard(query: &mut QueryBuilder<'_, Sqlite>, column: &ColumnRef) {
	if let Some((kind_column, value)) = &column.guard {
		query.push(kind_column).push(" = ").push_bind(*value).push(" AND ");
	}
}

/// Builds `SELECT <select> FROM <table> t WHERE <predicate>`.
pub fn compile<'a>(
	resource_type: ResourceType,
	predicate: &Predicate,
	select: &str,
) -> QueryBuilder<'a, Sqlite> {
	let layout = table_spec(resource_type);
	let mut query = QueryBuilder::new(format!(
		"SELECT {select} FROM {} {BASE_ALIAS} WHERE ",
		layout.table
	));
	Compiler { next_alias: 0 }.push(&mut query, predicate, layout, BASE_ALIAS);
	query
}

/// The SQL text a scope compiles to, with `?` placeholders.
pub fn to_sql(resource_type: ResourceType, predicate: &Predicate) -> String {
	compile(resource_type, predicate, &format!("{BASE_ALIAS}.id")).sql().to_string()
}

/// Runs scope predicates against the database.
#[derive(Clone)]
pub struct ScopeRepository {
	pool: SqlitePool,
}

impl ScopeRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// IDs of the rows a scope admits, ascending.
	#[tracing::instrument(skip(self, predicate), fields(resource_type = %resource_type))]
	pub async fn list_ids(
		&self,
		resource_type: ResourceType,
		predicate: &Predicate,
	) -> Result<Vec<RecordId>, DbError> {
		if predicate.is_unsatisfiable() {
			tracing::debug!("scope matches nothing, skipping query");
			return Ok(Vec::new());
		}
		let mut query = compile(resource_type, predicate, &format!("{BASE_ALIAS}.id AS id"));
		query.push(format!(" ORDER BY {BASE_ALIAS}.id"));

		let rows = query.build().fetch_all(&self.pool).await?;
		let ids: Vec<RecordId> = rows.iter().map(|row| RecordId::new(row.get("id"))).collect();
		tracing::debug!(rows = ids.len(), "scope listed");
		Ok(ids)
	}

	/// Number of rows a scope admits.
	#[tracing::instrument(skip(self, predicate), fields(resource_type = %resource_type))]
	pub async fn count(
		&self,
		resource_type: ResourceType,
		predicate: &Predicate,
	) -> Result<i64, DbError> {
		if predicate.is_unsatisfiable() {
			return Ok(0);
		}
		let mut query = compile(resource_type, predicate, "COUNT(*) AS count");
		let row = query.build().fetch_one(&self.pool).await?;
		Ok(row.get("count"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::record::RecordRepository;
	use crate::supervisor::SupervisorRepository;
	use crate::teacher::TeacherRepository;
	use crate::testing::{assign, create_test_pool, exec, insert_supervisor, insert_teacher};
	use academy_server_authz::{
		AcademicProfileId, Actor, ActorId, AuthorizationGate, Column, CourseId,
		DerivedIdentifierSet, IdentityContext, PolicyRegistry, QuranProfileId, Relation,
		RelationLoader, ScopeBuilder, TenantId,
	};
	use proptest::prelude::*;
	use std::collections::{BTreeSet, HashMap};
	use std::sync::Arc;

	const TENANT: TenantId = TenantId::new(1);
	const SUPERVISOR: ActorId = ActorId::new(100);

	/// Supervisor 100 in academy 1 with Quran teachers 11, 12 and academic
	/// teacher 5 (profile 42, course 900). Teacher 13 and academy 2 are foreign.
	async fn seeded_pool() -> SqlitePool {
		let pool = create_test_pool().await;
		insert_supervisor(&pool, 1, 100, 1, true).await;
		insert_teacher(&pool, 11, "quran", 111, 1).await;
		insert_teacher(&pool, 12, "quran", 112, 1).await;
		insert_teacher(&pool, 13, "quran", 113, 1).await;
		insert_teacher(&pool, 5, "academic", 42, 1).await;
		insert_teacher(&pool, 6, "academic", 43, 1).await;
		assign(&pool, 1, 11, "quran").await;
		assign(&pool, 1, 12, "quran").await;
		assign(&pool, 1, 5, "academic").await;

		for sql in [
			"INSERT INTO quran_circles (id, academy_id, quran_teacher_id) VALUES \
			 (1, 1, 11), (2, 1, 12), (3, 1, 13), (4, 2, 12)",
			"INSERT INTO academic_sessions (id, academy_id, academic_teacher_id) VALUES \
			 (1, 1, 42), (2, 1, 43)",
			"INSERT INTO interactive_courses (id, academy_id, assigned_teacher_id) VALUES \
			 (900, 1, 42), (901, 1, 43), (902, 2, 42)",
			"INSERT INTO interactive_course_sessions (id, course_id) VALUES \
			 (1, 900), (2, 901), (3, 902)",
			"INSERT INTO quran_trial_requests (id, academy_id, teacher_id, status) VALUES \
			 (1, 1, 111, 'pending'), (2, 1, 113, 'pending')",
			"INSERT INTO quiz_assignments (id, assignable_type, assignable_id) VALUES \
			 (1, 'quran_circle', 1), (2, 'quran_circle', 3), (3, 'quran_circle', 4), \
			 (4, 'interactive_course', 900), (5, 'academic_individual_lesson', 900)",
			"INSERT INTO teacher_payouts (id, academy_id, teacher_type, teacher_id) VALUES \
			 (1, 1, 'quran', 111), (2, 1, 'academic', 42), (3, 1, 'academic', 111), \
			 (4, 1, 'quran', 113)",
			"INSERT INTO certificates \
			 (id, academy_id, teacher_id, certificateable_type, certificateable_id) VALUES \
			 (1, 1, 11, NULL, NULL), (2, 1, NULL, 'interactive_course', 900), \
			 (3, 1, NULL, 'interactive_course', 901)",
		] {
			exec(&pool, sql).await;
		}
		pool
	}

	fn gate(pool: &SqlitePool) -> AuthorizationGate {
		AuthorizationGate::new(
			Arc::new(PolicyRegistry::standard().unwrap()),
			Arc::new(SupervisorRepository::new(pool.clone())),
			Arc::new(TeacherRepository::new(pool.clone())),
			Arc::new(RecordRepository::new(pool.clone())),
		)
	}

	async fn scoped_ids(pool: &SqlitePool, resource_type: ResourceType) -> Vec<i64> {
		let predicate = gate(pool).build_scope(resource_type, SUPERVISOR, TENANT).await.unwrap();
		ScopeRepository::new(pool.clone())
			.list_ids(resource_type, &predicate)
			.await
			.unwrap()
			.into_iter()
			.map(RecordId::get)
			.collect()
	}

	#[test]
	fn false_compiles_to_contradiction() {
		assert_eq!(
			to_sql(ResourceType::QuranCircle, &Predicate::False),
			"SELECT t.id FROM quran_circles t WHERE 0 = 1"
		);
	}

	#[test]
	fn absent_column_compiles_to_contradiction() {
		let predicate = Predicate::any_of(Column::Course, BTreeSet::from([1]));
		assert_eq!(
			to_sql(ResourceType::QuranCircle, &predicate),
			"SELECT t.id FROM quran_circles t WHERE 0 = 1"
		);
	}

	#[test]
	fn relation_compiles_to_exists() {
		let predicate = Predicate::related(Relation::Course, Predicate::tenant(TENANT));
		assert_eq!(
			to_sql(ResourceType::InteractiveCourseSession, &predicate),
			"SELECT t.id FROM interactive_course_sessions t WHERE \
			 (EXISTS (SELECT 1 FROM interactive_courses r0 \
			 WHERE r0.id = t.course_id AND (r0.academy_id = ?)))"
		);
	}

	#[tokio::test]
	async fn circles_are_scoped_to_assigned_teachers_in_tenant() {
		let pool = seeded_pool().await;
		assert_eq!(scoped_ids(&pool, ResourceType::QuranCircle).await, vec![1, 2]);
	}

	#[tokio::test]
	async fn academic_sessions_use_profile_ids() {
		let pool = seeded_pool().await;
		assert_eq!(scoped_ids(&pool, ResourceType::AcademicSession).await, vec![1]);
	}

	#[tokio::test]
	async fn courses_and_sessions_follow_derived_courses() {
		let pool = seeded_pool().await;
		assert_eq!(scoped_ids(&pool, ResourceType::InteractiveCourse).await, vec![900]);
		// session 3 belongs to a course of another academy
		assert_eq!(scoped_ids(&pool, ResourceType::InteractiveCourseSession).await, vec![1]);
	}

	#[tokio::test]
	async fn quiz_assignments_check_tenant_through_target() {
		let pool = seeded_pool().await;
		// 2 is a foreign teacher's circle, 3 a circle of academy 2, 5 points at a missing lesson
		assert_eq!(scoped_ids(&pool, ResourceType::QuizAssignment).await, vec![1, 4]);
	}

	#[tokio::test]
	async fn payouts_match_kind_and_profile() {
		let pool = seeded_pool().await;
		assert_eq!(scoped_ids(&pool, ResourceType::TeacherPayout).await, vec![1, 2]);
	}

	#[tokio::test]
	async fn certificates_match_teacher_or_course() {
		let pool = seeded_pool().await;
		assert_eq!(scoped_ids(&pool, ResourceType::Certificate).await, vec![1, 2]);
	}

	#[tokio::test]
	async fn trial_requests_use_quran_profiles() {
		let pool = seeded_pool().await;
		assert_eq!(scoped_ids(&pool, ResourceType::TrialRequest).await, vec![1]);
	}

	#[tokio::test]
	async fn count_agrees_with_list() {
		let pool = seeded_pool().await;
		let predicate = gate(&pool)
			.build_scope(ResourceType::QuranCircle, SUPERVISOR, TENANT)
			.await
			.unwrap();
		let count = ScopeRepository::new(pool.clone())
			.count(ResourceType::QuranCircle, &predicate)
			.await
			.unwrap();
		assert_eq!(count, 2);
	}

	#[tokio::test]
	async fn unassigned_supervisor_lists_nothing() {
		let pool = seeded_pool().await;
		insert_supervisor(&pool, 2, 200, 1, true).await;

		let gate = gate(&pool);
		let scopes = ScopeRepository::new(pool.clone());
		for rt in ResourceType::all() {
			let predicate = gate.build_scope(*rt, ActorId::new(200), TENANT).await.unwrap();
			assert!(scopes.list_ids(*rt, &predicate).await.unwrap().is_empty(), "{rt}");
		}
	}

	#[tokio::test]
	async fn record_authorization_end_to_end() {
		let pool = seeded_pool().await;
		let gate = gate(&pool);
		let records = RecordRepository::new(pool.clone());
		let ctx = IdentityContext::new(Actor::supervisor(SUPERVISOR, TENANT), TENANT);

		let owned = records
			.get_record(ResourceType::InteractiveCourseSession, RecordId::new(1))
			.await
			.unwrap()
			.unwrap();
		let decision = gate
			.authorize(ctx, ResourceType::InteractiveCourseSession, Some(&owned))
			.await
			.unwrap();
		assert!(decision.can_view);
		assert!(decision.can_edit);

		let foreign = records
			.get_record(ResourceType::InteractiveCourseSession, RecordId::new(3))
			.await
			.unwrap()
			.unwrap();
		let decision = gate
			.authorize(ctx, ResourceType::InteractiveCourseSession, Some(&foreign))
			.await
			.unwrap();
		assert!(decision.is_deny_all());
	}

	const RELATIONS: [Relation; 6] = [
		Relation::Course,
		Relation::Teacher,
		Relation::Target(ResourceType::QuranCircle),
		Relation::Target(ResourceType::QuranIndividualCircle),
		Relation::Target(ResourceType::AcademicIndividualLesson),
		Relation::Target(ResourceType::InteractiveCourse),
	];

	/// Types with relation-borne or tagged ownership, and their seeded row counts.
	const RELATIONAL_TYPES: [(ResourceType, i64); 3] = [
		(ResourceType::InteractiveCourseSession, 3),
		(ResourceType::QuizAssignment, 5),
		(ResourceType::TeacherPayout, 4),
	];

	fn derived_set() -> impl Strategy<Value = DerivedIdentifierSet> {
		(
			proptest::sample::subsequence(vec![11i64, 12, 13], 0..=3),
			proptest::sample::subsequence(vec![111i64, 112, 113], 0..=3),
			proptest::sample::subsequence(vec![5i64, 6], 0..=2),
			proptest::sample::subsequence(vec![42i64, 43], 0..=2),
			proptest::sample::subsequence(vec![900i64, 901, 902], 0..=3),
		)
			.prop_map(
				|(quran_actors, quran_profiles, academic_actors, academic_profiles, courses)| {
					DerivedIdentifierSet {
						quran_actor_ids: quran_actors.into_iter().map(ActorId::new).collect(),
						academic_actor_ids: academic_actors.into_iter().map(ActorId::new).collect(),
						quran_profile_ids: quran_profiles
							.into_iter()
							.map(QuranProfileId::new)
							.collect(),
						academic_profile_ids: academic_profiles
							.into_iter()
							.map(AcademicProfileId::new)
							.collect(),
						course_ids: courses.into_iter().map(CourseId::new).collect(),
					}
				},
			)
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(32))]

		#[test]
		fn built_scopes_agree_with_in_memory_match(
			derived in derived_set(),
			tenant in 1i64..=2,
		) {
			let runtime = tokio::runtime::Runtime::new().unwrap();
			runtime.block_on(async {
				let pool = seeded_pool().await;
				let registry = PolicyRegistry::standard().unwrap();
				let scopes = ScopeRepository::new(pool.clone());
				let records = RecordRepository::new(pool);
				let tenant = TenantId::new(tenant);

				for (rt, seeded) in RELATIONAL_TYPES {
					let predicate =
						ScopeBuilder::new(&registry).build(rt, &derived, tenant).unwrap();
					let listed = scopes.list_ids(rt, &predicate).await.unwrap();

					let mut matched = Vec::new();
					for id in 1..=seeded {
						let record =
							records.get_record(rt, RecordId::new(id)).await.unwrap().unwrap();
						let mut loaded = HashMap::new();
						for relation in RELATIONS {
							let related = records.load_relation(&record, relation).await.unwrap();
							loaded.insert(relation, related);
						}
						let lookup = |relation: Relation| loaded.get(&relation).cloned().flatten();
						if predicate.matches(&record, &lookup) {
							matched.push(record.id);
						}
					}
					assert_eq!(listed, matched, "{rt} in academy {tenant} for {derived:?}");
				}
			});
		}
	}
}
