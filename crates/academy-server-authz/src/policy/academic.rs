// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Academic sessions, individual lessons and interactive courses.

use super::{Candidate, ResourceTypePolicy, TenantReach};
use crate::resolver::TargetSet;
use crate::resource::{Column, Relation, ResourceType};
use crate::types::TeacherKind;

const BY_ACADEMIC_PROFILE: &[Candidate] = &[
	Candidate::column(
		Column::TeacherProfile(TeacherKind::Academic),
		TargetSet::AcademicProfileIds,
	),
	Candidate::via(Relation::Teacher, Column::TeacherActor, TargetSet::AcademicActorIds),
];

pub const ACADEMIC_SESSION: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::AcademicSession, BY_ACADEMIC_PROFILE).no_create();

pub const ACADEMIC_INDIVIDUAL_LESSON: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::AcademicIndividualLesson, BY_ACADEMIC_PROFILE);

const BY_COURSE_OR_PROFILE: &[Candidate] = &[
	Candidate::column(Column::Id, TargetSet::CourseIds),
	Candidate::column(
		Column::TeacherProfile(TeacherKind::Academic),
		TargetSet::AcademicProfileIds,
	),
];

pub const INTERACTIVE_COURSE: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::InteractiveCourse, BY_COURSE_OR_PROFILE);

const BY_PARENT_COURSE: &[Candidate] = &[
	Candidate::column(Column::Course, TargetSet::CourseIds),
	Candidate::via(
		Relation::Course,
		Column::TeacherProfile(TeacherKind::Academic),
		TargetSet::AcademicProfileIds,
	),
];

/// Course sessions have no academy column; the tenant is the course's.
pub const INTERACTIVE_COURSE_SESSION: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::InteractiveCourseSession, BY_PARENT_COURSE)
		.tenant_via(TenantReach::Via(Relation::Course))
		.no_create();

pub const POLICIES: &[ResourceTypePolicy] = &[
	ACADEMIC_SESSION,
	ACADEMIC_INDIVIDUAL_LESSON,
	INTERACTIVE_COURSE,
	INTERACTIVE_COURSE_SESSION,
];
