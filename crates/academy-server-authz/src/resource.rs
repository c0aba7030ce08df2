// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource types and the record shape the engine evaluates.
//!
//! Every supervised table is described by one [`ResourceType`]. A loaded row is
//! reduced to a [`ResourceRecord`], which exposes only the handful of
//! [`Column`]s that ownership and tenant checks ever read. Records reached
//! through a [`Relation`] come back as [`Related`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthzError;
use crate::types::{ActorId, CourseId, ProfileRef, RecordId, TeacherKind, TeacherProfile, TenantId};

/// The supervised record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
	QuranCircle,
	QuranIndividualCircle,
	QuranSession,
	AcademicSession,
	AcademicIndividualLesson,
	InteractiveCourse,
	InteractiveCourseSession,
	TrialRequest,
	SessionReport,
	QuizAssignment,
	Certificate,
	TeacherReview,
	TeacherEarning,
	TeacherPayout,
	QuranTeacherProfile,
	AcademicTeacherProfile,
}

impl ResourceType {
	/// Returns all resource types.
	pub fn all() -> &'static [ResourceType] {
		&[
			ResourceType::QuranCircle,
			ResourceType::QuranIndividualCircle,
			ResourceType::QuranSession,
			ResourceType::AcademicSession,
			ResourceType::AcademicIndividualLesson,
			ResourceType::InteractiveCourse,
			ResourceType::InteractiveCourseSession,
			ResourceType::TrialRequest,
			ResourceType::SessionReport,
			ResourceType::QuizAssignment,
			ResourceType::Certificate,
			ResourceType::TeacherReview,
			ResourceType::TeacherEarning,
			ResourceType::TeacherPayout,
			ResourceType::QuranTeacherProfile,
			ResourceType::AcademicTeacherProfile,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ResourceType::QuranCircle => "quran_circle",
			ResourceType::QuranIndividualCircle => "quran_individual_circle",
			ResourceType::QuranSession => "quran_session",
			ResourceType::AcademicSession => "academic_session",
			ResourceType::AcademicIndividualLesson => "academic_individual_lesson",
			ResourceType::InteractiveCourse => "interactive_course",
			ResourceType::InteractiveCourseSession => "interactive_course_session",
			ResourceType::TrialRequest => "trial_request",
			ResourceType::SessionReport => "session_report",
			ResourceType::QuizAssignment => "quiz_assignment",
			ResourceType::Certificate => "certificate",
			ResourceType::TeacherReview => "teacher_review",
			ResourceType::TeacherEarning => "teacher_earning",
			ResourceType::TeacherPayout => "teacher_payout",
			ResourceType::QuranTeacherProfile => "quran_teacher_profile",
			ResourceType::AcademicTeacherProfile => "academic_teacher_profile",
		}
	}
}

impl fmt::Display for ResourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResourceType {
	type Err = AuthzError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ResourceType::all()
			.iter()
			.copied()
			.find(|rt| rt.as_str() == s)
			.ok_or_else(|| AuthzError::InvalidResourceType(s.to_string()))
	}
}

/// The columns ownership and tenant checks may read from a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
	/// Primary key.
	Id,
	/// Academy the row belongs to.
	Tenant,
	/// Column holding a teacher's actor ID.
	TeacherActor,
	/// Column holding a teacher profile ID of the given kind.
	TeacherProfile(TeacherKind),
	/// Column holding an interactive course ID.
	Course,
}

/// A named path from a record to another record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
	/// The teacher profile the record references.
	Teacher,
	/// The interactive course the record belongs to.
	Course,
	/// The polymorphic target, when it is of the given type.
	Target(ResourceType),
}

impl fmt::Display for Relation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Relation::Teacher => f.write_str("teacher"),
			Relation::Course => f.write_str("course"),
			Relation::Target(rt) => write!(f, "target:{rt}"),
		}
	}
}

/// Reference to the record a polymorphic row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
	pub resource_type: ResourceType,
	pub id: RecordId,
}

/// One loaded row, reduced to the attributes the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
	pub resource_type: ResourceType,
	pub id: RecordId,
	pub tenant_id: Option<TenantId>,
	pub teacher_actor_id: Option<ActorId>,
	pub teacher_profile: Option<ProfileRef>,
	pub course_id: Option<CourseId>,
	pub target: Option<TargetRef>,
	pub status: Option<String>,
}

impl ResourceRecord {
	/// Creates a record with only its type and key set.
	pub fn new(resource_type: ResourceType, id: RecordId) -> Self {
		Self {
			resource_type,
			id,
			tenant_id: None,
			teacher_actor_id: None,
			teacher_profile: None,
			course_id: None,
			target: None,
			status: None,
		}
	}

	pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
		self.tenant_id = Some(tenant_id);
		self
	}

	pub fn with_teacher_actor(mut self, actor_id: ActorId) -> Self {
		self.teacher_actor_id = Some(actor_id);
		self
	}

	pub fn with_teacher_profile(mut self, profile: ProfileRef) -> Self {
		self.teacher_profile = Some(profile);
		self
	}

	pub fn with_course(mut self, course_id: CourseId) -> Self {
		self.course_id = Some(course_id);
		self
	}

	pub fn with_target(mut self, resource_type: ResourceType, id: RecordId) -> Self {
		self.target = Some(TargetRef { resource_type, id });
		self
	}

	pub fn with_status(mut self, status: impl Into<String>) -> Self {
		self.status = Some(status.into());
		self
	}
}

/// Read access to the columns of a row.
pub trait Row {
	/// The raw value of a column, or `None` when the row has no such column
	/// or it is null.
	fn value(&self, column: Column) -> Option<i64>;
}

impl Row for ResourceRecord {
	fn value(&self, column: Column) -> Option<i64> {
		match column {
			Column::Id => Some(self.id.get()),
			Column::Tenant => self.tenant_id.map(TenantId::get),
			Column::TeacherActor => self.teacher_actor_id.map(ActorId::get),
			Column::TeacherProfile(kind) => self.teacher_profile.and_then(|p| p.id_for(kind)),
			Column::Course => self.course_id.map(CourseId::get),
		}
	}
}

impl Row for TeacherProfile {
	fn value(&self, column: Column) -> Option<i64> {
		match column {
			Column::Id => Some(match self.profile {
				ProfileRef::Quran(id) => id.get(),
				ProfileRef::Academic(id) => id.get(),
			}),
			Column::Tenant => self.tenant_id.map(TenantId::get),
			Column::TeacherActor => Some(self.actor_id.get()),
			Column::TeacherProfile(kind) => self.profile.id_for(kind),
			Column::Course => None,
		}
	}
}

/// A record reached through a [`Relation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Related {
	Teacher(TeacherProfile),
	Record(Box<ResourceRecord>),
}

impl Row for Related {
	fn value(&self, column: Column) -> Option<i64> {
		match self {
			Related::Teacher(teacher) => teacher.value(column),
			Related::Record(record) => record.value(column),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{AcademicProfileId, QuranProfileId};

	#[test]
	fn resource_type_parses_its_own_name() {
		for rt in ResourceType::all() {
			assert_eq!(rt.as_str().parse::<ResourceType>().ok(), Some(*rt));
		}
	}

	#[test]
	fn unknown_resource_type_is_rejected() {
		let err = "quran_circles".parse::<ResourceType>().unwrap_err();
		assert!(matches!(err, AuthzError::InvalidResourceType(name) if name == "quran_circles"));
	}

	#[test]
	fn profile_column_reads_only_matching_kind() {
		let record = ResourceRecord::new(ResourceType::TeacherEarning, RecordId::new(1))
			.with_teacher_profile(ProfileRef::Quran(QuranProfileId::new(5)));
		assert_eq!(record.value(Column::TeacherProfile(TeacherKind::Quran)), Some(5));
		assert_eq!(record.value(Column::TeacherProfile(TeacherKind::Academic)), None);
		assert_eq!(record.value(Column::TeacherActor), None);
	}

	#[test]
	fn teacher_relation_exposes_actor_and_profile() {
		let teacher = Related::Teacher(TeacherProfile::academic(
			AcademicProfileId::new(42),
			ActorId::new(5),
			TenantId::new(1),
		));
		assert_eq!(teacher.value(Column::TeacherActor), Some(5));
		assert_eq!(teacher.value(Column::TeacherProfile(TeacherKind::Academic)), Some(42));
		assert_eq!(teacher.value(Column::Tenant), Some(1));
		assert_eq!(teacher.value(Column::Course), None);
	}

	#[test]
	fn relation_display_names_target_type() {
		assert_eq!(Relation::Teacher.to_string(), "teacher");
		assert_eq!(
			Relation::Target(ResourceType::InteractiveCourse).to_string(),
			"target:interactive_course"
		);
	}
}
