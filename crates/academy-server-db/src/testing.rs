// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

pub async fn create_test_pool() -> SqlitePool {
	let pool = SqlitePool::connect(":memory:").await.unwrap();
	create_schema(&pool).await;
	pool
}

const SCHEMA: &[&str] = &[
	r#"
	CREATE TABLE users (
		id INTEGER PRIMARY KEY,
		name TEXT NOT NULL,
		role TEXT NOT NULL,
		academy_id INTEGER
	)
	"#,
	r#"
	CREATE TABLE supervisor_profiles (
		id INTEGER PRIMARY KEY,
		user_id INTEGER NOT NULL UNIQUE REFERENCES users(id),
		academy_id INTEGER,
		department TEXT,
		can_manage_teachers INTEGER NOT NULL DEFAULT 0
	)
	"#,
	r#"
	CREATE TABLE supervisor_assignments (
		supervisor_profile_id INTEGER NOT NULL REFERENCES supervisor_profiles(id),
		teacher_user_id INTEGER NOT NULL REFERENCES users(id),
		teacher_kind TEXT NOT NULL,
		PRIMARY KEY (supervisor_profile_id, teacher_user_id, teacher_kind)
	)
	"#,
	r#"
	CREATE TABLE quran_teacher_profiles (
		id INTEGER PRIMARY KEY,
		user_id INTEGER NOT NULL REFERENCES users(id),
		academy_id INTEGER
	)
	"#,
	r#"
	CREATE TABLE academic_teacher_profiles (
		id INTEGER PRIMARY KEY,
		user_id INTEGER NOT NULL REFERENCES users(id),
		academy_id INTEGER
	)
	"#,
	r#"
	CREATE TABLE quran_circles (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		quran_teacher_id INTEGER,
		status TEXT
	)
	"#,
	r#"
	CREATE TABLE quran_individual_circles (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		quran_teacher_id INTEGER,
		status TEXT
	)
	"#,
	r#"
	CREATE TABLE quran_sessions (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		quran_teacher_id INTEGER,
		status TEXT
	)
	"#,
	r#"
	CREATE TABLE academic_sessions (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		academic_teacher_id INTEGER,
		status TEXT
	)
	"#,
	r#"
	CREATE TABLE academic_individual_lessons (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		academic_teacher_id INTEGER,
		status TEXT
	)
	"#,
	r#"
	CREATE TABLE interactive_courses (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		assigned_teacher_id INTEGER,
		status TEXT
	)
	"#,
	r#"
	CREATE TABLE interactive_course_sessions (
		id INTEGER PRIMARY KEY,
		course_id INTEGER,
		status TEXT
	)
	"#,
	r#"
	CREATE TABLE quran_trial_requests (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		teacher_id INTEGER,
		status TEXT
	)
	"#,
	r#"
	CREATE TABLE session_reports (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		teacher_id INTEGER,
		session_type TEXT,
		session_id INTEGER
	)
	"#,
	r#"
	CREATE TABLE quiz_assignments (
		id INTEGER PRIMARY KEY,
		assignable_type TEXT,
		assignable_id INTEGER
	)
	"#,
	r#"
	CREATE TABLE certificates (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		teacher_id INTEGER,
		certificateable_type TEXT,
		certificateable_id INTEGER
	)
	"#,
	r#"
	CREATE TABLE teacher_reviews (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		reviewable_type TEXT,
		reviewable_id INTEGER
	)
	"#,
	r#"
	CREATE TABLE teacher_earnings (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		teacher_type TEXT,
		teacher_id INTEGER
	)
	"#,
	r#"
	CREATE TABLE teacher_payouts (
		id INTEGER PRIMARY KEY,
		academy_id INTEGER,
		teacher_type TEXT,
		teacher_id INTEGER,
		status TEXT
	)
	"#,
];

pub async fn create_schema(pool: &SqlitePool) {
	for statement in SCHEMA {
		sqlx::query(statement).execute(pool).await.unwrap();
	}
}

/// Runs one literal seed statement.
pub async fn exec(pool: &SqlitePool, sql: &str) {
	sqlx::query(sql).execute(pool).await.unwrap();
}

pub async fn insert_user(pool: &SqlitePool, id: i64, role: &str, academy_id: i64) {
	sqlx::query("INSERT INTO users (id, name, role, academy_id) VALUES (?, ?, ?, ?)")
		.bind(id)
		.bind(format!("user-{id}"))
		.bind(role)
		.bind(academy_id)
		.execute(pool)
		.await
		.unwrap();
}

pub async fn insert_supervisor(
	pool: &SqlitePool,
	profile_id: i64,
	user_id: i64,
	academy_id: i64,
	can_manage_teachers: bool,
) {
	insert_user(pool, user_id, "supervisor", academy_id).await;
	sqlx::query(
		"INSERT INTO supervisor_profiles \
		 (id, user_id, academy_id, department, can_manage_teachers) VALUES (?, ?, ?, ?, ?)",
	)
	.bind(profile_id)
	.bind(user_id)
	.bind(academy_id)
	.bind("quran")
	.bind(can_manage_teachers as i32)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn assign(
	pool: &SqlitePool,
	supervisor_profile_id: i64,
	teacher_user_id: i64,
	kind: &str,
) {
	sqlx::query(
		"INSERT INTO supervisor_assignments (supervisor_profile_id, teacher_user_id, teacher_kind) \
		 VALUES (?, ?, ?)",
	)
	.bind(supervisor_profile_id)
	.bind(teacher_user_id)
	.bind(kind)
	.execute(pool)
	.await
	.unwrap();
}

/// Inserts a teacher user together with its profile row.
pub async fn insert_teacher(
	pool: &SqlitePool,
	user_id: i64,
	kind: &str,
	profile_id: i64,
	academy_id: i64,
) {
	insert_user(pool, user_id, &format!("{kind}_teacher"), academy_id).await;
	let sql =
		format!("INSERT INTO {kind}_teacher_profiles (id, user_id, academy_id) VALUES (?, ?, ?)");
	sqlx::query(&sql)
		.bind(profile_id)
		.bind(user_id)
		.bind(academy_id)
		.execute(pool)
		.await
		.unwrap();
}
