// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only oversight records: reports, quizzes, certificates and reviews.

use super::teachers::BY_ANY_PROFILE;
use super::{Candidate, ResourceTypePolicy, TenantReach};
use crate::resolver::TargetSet;
use crate::resource::{Column, Relation, ResourceType};
use crate::types::TeacherKind;

const BY_REPORTING_TEACHER: &[Candidate] = &[
	Candidate::column(Column::TeacherActor, TargetSet::QuranActorIds),
	Candidate::column(Column::TeacherActor, TargetSet::AcademicActorIds),
	Candidate::via(
		Relation::Target(ResourceType::QuranSession),
		Column::TeacherActor,
		TargetSet::QuranActorIds,
	),
	Candidate::via(
		Relation::Target(ResourceType::AcademicSession),
		Column::TeacherProfile(TeacherKind::Academic),
		TargetSet::AcademicProfileIds,
	),
];

const BY_ASSIGNABLE: &[Candidate] = &[
	Candidate::via(
		Relation::Target(ResourceType::QuranCircle),
		Column::TeacherActor,
		TargetSet::QuranActorIds,
	),
	Candidate::via(
		Relation::Target(ResourceType::QuranIndividualCircle),
		Column::TeacherActor,
		TargetSet::QuranActorIds,
	),
	Candidate::via(
		Relation::Target(ResourceType::AcademicIndividualLesson),
		Column::TeacherProfile(TeacherKind::Academic),
		TargetSet::AcademicProfileIds,
	),
	Candidate::via(
		Relation::Target(ResourceType::InteractiveCourse),
		Column::TeacherProfile(TeacherKind::Academic),
		TargetSet::AcademicProfileIds,
	),
];

const BY_ISSUER: &[Candidate] = &[
	Candidate::column(Column::TeacherActor, TargetSet::QuranActorIds),
	Candidate::column(Column::TeacherActor, TargetSet::AcademicActorIds),
	Candidate::via(
		Relation::Target(ResourceType::InteractiveCourse),
		Column::Id,
		TargetSet::CourseIds,
	),
];

pub const SESSION_REPORT: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::SessionReport, BY_REPORTING_TEACHER).read_only();

/// Quiz assignments reach both owner and academy through `assignable`.
pub const QUIZ_ASSIGNMENT: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::QuizAssignment, BY_ASSIGNABLE)
		.tenant_via(TenantReach::Polymorphic)
		.read_only();

pub const CERTIFICATE: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::Certificate, BY_ISSUER).read_only();

pub const TEACHER_REVIEW: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::TeacherReview, BY_ANY_PROFILE).read_only();

pub const POLICIES: &[ResourceTypePolicy] = &[
	SESSION_REPORT,
	QUIZ_ASSIGNMENT,
	CERTIFICATE,
	TEACHER_REVIEW,
];
