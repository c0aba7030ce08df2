// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Physical layout of the supervised tables.
//!
//! Maps each [`ResourceType`] and abstract [`Column`] onto a table and column
//! name, and each [`Relation`] onto a join. Every name here is a static
//! identifier; user input never reaches SQL text.

use academy_server_authz::{Column, Relation, ResourceType, TeacherKind};

/// How a table stores a teacher profile reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileColumn {
	/// One column holding profiles of a single kind.
	Fixed(TeacherKind, &'static str),
	/// A `(kind, id)` column pair.
	Tagged {
		kind_column: &'static str,
		id_column: &'static str,
	},
}

/// A polymorphic `(type, id)` column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetColumns {
	pub type_column: &'static str,
	pub id_column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
	pub resource_type: ResourceType,
	pub table: &'static str,
	pub tenant: Option<&'static str>,
	pub teacher_actor: Option<&'static str>,
	pub teacher_profile: Option<ProfileColumn>,
	pub course: Option<&'static str>,
	pub target: Option<TargetColumns>,
	pub status: Option<&'static str>,
}

impl TableSpec {
	const fn new(resource_type: ResourceType, table: &'static str) -> Self {
		Self {
			resource_type,
			table,
			tenant: Some("academy_id"),
			teacher_actor: None,
			teacher_profile: None,
			course: None,
			target: None,
			status: None,
		}
	}

	const fn without_tenant(mut self) -> Self {
		self.tenant = None;
		self
	}

	const fn teacher_actor(mut self, column: &'static str) -> Self {
		self.teacher_actor = Some(column);
		self
	}

	const fn profile(mut self, kind: TeacherKind, column: &'static str) -> Self {
		self.teacher_profile = Some(ProfileColumn::Fixed(kind, column));
		self
	}

	const fn tagged_profile(mut self, kind_column: &'static str, id_column: &'static str) -> Self {
		self.teacher_profile = Some(ProfileColumn::Tagged {
			kind_column,
			id_column,
		});
		self
	}

	const fn course(mut self, column: &'static str) -> Self {
		self.course = Some(column);
		self
	}

	const fn target(mut self, type_column: &'static str, id_column: &'static str) -> Self {
		self.target = Some(TargetColumns {
			type_column,
			id_column,
		});
		self
	}

	const fn status(mut self) -> Self {
		self.status = Some("status");
		self
	}
}

/// A column reference resolved against one table alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
	pub expr: String,
	/// `(column, value)` that must also hold, for tagged profile columns.
	pub guard: Option<(String, &'static str)>,
}

/// A relation resolved into the table it joins and the joining column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
	pub layout: &'static TableSpec,
	pub on: String,
	/// `(type column, value)` selecting the polymorphic target type.
	pub guard: Option<(String, &'static str)>,
}

const QURAN_CIRCLES: TableSpec = TableSpec::new(ResourceType::QuranCircle, "quran_circles")
	.teacher_actor("quran_teacher_id")
	.status();
const QURAN_INDIVIDUAL_CIRCLES: TableSpec =
	TableSpec::new(ResourceType::QuranIndividualCircle, "quran_individual_circles")
		.teacher_actor("quran_teacher_id")
		.status();
const QURAN_SESSIONS: TableSpec = TableSpec::new(ResourceType::QuranSession, "quran_sessions")
	.teacher_actor("quran_teacher_id")
	.status();
const ACADEMIC_SESSIONS: TableSpec =
	TableSpec::new(ResourceType::AcademicSession, "academic_sessions")
		.profile(TeacherKind::Academic, "academic_teacher_id")
		.status();
const ACADEMIC_INDIVIDUAL_LESSONS: TableSpec =
	TableSpec::new(ResourceType::AcademicIndividualLesson, "academic_individual_lessons")
		.profile(TeacherKind::Academic, "academic_teacher_id")
		.status();
const INTERACTIVE_COURSES: TableSpec =
	TableSpec::new(ResourceType::InteractiveCourse, "interactive_courses")
		.profile(TeacherKind::Academic, "assigned_teacher_id")
		.status();
const INTERACTIVE_COURSE_SESSIONS: TableSpec =
	TableSpec::new(ResourceType::InteractiveCourseSession, "interactive_course_sessions")
		.without_tenant()
		.course("course_id")
		.status();
const TRIAL_REQUESTS: TableSpec = TableSpec::new(ResourceType::TrialRequest, "quran_trial_requests")
	.profile(TeacherKind::Quran, "teacher_id")
	.status();
const SESSION_REPORTS: TableSpec = TableSpec::new(ResourceType::SessionReport, "session_reports")
	.teacher_actor("teacher_id")
	.target("session_type", "session_id");
const QUIZ_ASSIGNMENTS: TableSpec = TableSpec::new(ResourceType::QuizAssignment, "quiz_assignments")
	.without_tenant()
	.target("assignable_type", "assignable_id");
const CERTIFICATES: TableSpec = TableSpec::new(ResourceType::Certificate, "certificates")
	.teacher_actor("teacher_id")
	.target("certificateable_type", "certificateable_id");
const TEACHER_REVIEWS: TableSpec = TableSpec::new(ResourceType::TeacherReview, "teacher_reviews")
	.tagged_profile("reviewable_type", "reviewable_id");
const TEACHER_EARNINGS: TableSpec = TableSpec::new(ResourceType::TeacherEarning, "teacher_earnings")
	.tagged_profile("teacher_type", "teacher_id");
const TEACHER_PAYOUTS: TableSpec = TableSpec::new(ResourceType::TeacherPayout, "teacher_payouts")
	.tagged_profile("teacher_type", "teacher_id")
	.status();
const QURAN_TEACHER_PROFILES: TableSpec =
	TableSpec::new(ResourceType::QuranTeacherProfile, "quran_teacher_profiles")
		.teacher_actor("user_id")
		.profile(TeacherKind::Quran, "id");
const ACADEMIC_TEACHER_PROFILES: TableSpec =
	TableSpec::new(ResourceType::AcademicTeacherProfile, "academic_teacher_profiles")
		.teacher_actor("user_id")
		.profile(TeacherKind::Academic, "id");

/// The table layout of a resource type.
pub fn table_spec(resource_type: ResourceType) -> &'static TableSpec {
	match resource_type {
		ResourceType::QuranCircle => &QURAN_CIRCLES,
		ResourceType::QuranIndividualCircle => &QURAN_INDIVIDUAL_CIRCLES,
		ResourceType::QuranSession => &QURAN_SESSIONS,
		ResourceType::AcademicSession => &ACADEMIC_SESSIONS,
		ResourceType::AcademicIndividualLesson => &ACADEMIC_INDIVIDUAL_LESSONS,
		ResourceType::InteractiveCourse => &INTERACTIVE_COURSES,
		ResourceType::InteractiveCourseSession => &INTERACTIVE_COURSE_SESSIONS,
		ResourceType::TrialRequest => &TRIAL_REQUESTS,
		ResourceType::SessionReport => &SESSION_REPORTS,
		ResourceType::QuizAssignment => &QUIZ_ASSIGNMENTS,
		ResourceType::Certificate => &CERTIFICATES,
		ResourceType::TeacherReview => &TEACHER_REVIEWS,
		ResourceType::TeacherEarning => &TEACHER_EARNINGS,
		ResourceType::TeacherPayout => &TEACHER_PAYOUTS,
		ResourceType::QuranTeacherProfile => &QURAN_TEACHER_PROFILES,
		ResourceType::AcademicTeacherProfile => &ACADEMIC_TEACHER_PROFILES,
	}
}

/// The profile table of a teacher kind.
pub fn profile_spec(kind: TeacherKind) -> &'static TableSpec {
	match kind {
		TeacherKind::Quran => &QURAN_TEACHER_PROFILES,
		TeacherKind::Academic => &ACADEMIC_TEACHER_PROFILES,
	}
}

impl TableSpec {
	/// Resolves an abstract column against `alias`. `None` when the table has
	/// no such column.
	pub fn column(&self, alias: &str, column: Column) -> Option<ColumnRef> {
		let plain = |name: &str| ColumnRef {
			expr: format!("{alias}.{name}"),
			guard: None,
		};
		match column {
			Column::Id => Some(plain("id")),
			Column::Tenant => self.tenant.map(plain),
			Column::TeacherActor => self.teacher_actor.map(plain),
			Column::Course => self.course.map(plain),
			Column::TeacherProfile(kind) => match self.teacher_profile? {
				ProfileColumn::Fixed(fixed, name) if fixed == kind => Some(plain(name)),
				ProfileColumn::Fixed(..) => None,
				ProfileColumn::Tagged {
					kind_column,
					id_column,
				} => Some(ColumnRef {
					expr: format!("{alias}.{id_column}"),
					guard: Some((format!("{alias}.{kind_column}"), kind.as_str())),
				}),
			},
		}
	}

	/// Resolves a relation of rows aliased `alias`. `None` when the table
	/// cannot reach it.
	pub fn join(&self, alias: &str, relation: Relation) -> Option<Join> {
		match relation {
			Relation::Teacher => match self.teacher_profile? {
				ProfileColumn::Fixed(kind, name) => Some(Join {
					layout: profile_spec(kind),
					on: format!("{alias}.{name}"),
					guard: None,
				}),
				ProfileColumn::Tagged { .. } => None,
			},
			Relation::Course => self.course.map(|name| Join {
				layout: &INTERACTIVE_COURSES,
				on: format!("{alias}.{name}"),
				guard: None,
			}),
			Relation::Target(rt) => self.target.map(|target| Join {
				layout: table_spec(rt),
				on: format!("{alias}.{}", target.id_column),
				guard: Some((format!("{alias}.{}", target.type_column), rt.as_str())),
			}),
		}
	}
}
