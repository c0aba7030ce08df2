// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Teacher profiles and teacher finances, gated on `can_manage_teachers`.

use super::{Candidate, ResourceTypePolicy};
use crate::resolver::TargetSet;
use crate::resource::{Column, ResourceType};
use crate::types::TeacherKind;

/// A `(teacher_type, teacher_id)` pair naming either kind of profile.
pub(super) const BY_ANY_PROFILE: &[Candidate] = &[
	Candidate::column(
		Column::TeacherProfile(TeacherKind::Quran),
		TargetSet::QuranProfileIds,
	),
	Candidate::column(
		Column::TeacherProfile(TeacherKind::Academic),
		TargetSet::AcademicProfileIds,
	),
];

pub const TEACHER_EARNING: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::TeacherEarning, BY_ANY_PROFILE)
		.read_only()
		.teacher_management();

pub const TEACHER_PAYOUT: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::TeacherPayout, BY_ANY_PROFILE)
		.read_only()
		.teacher_management();

const QURAN_PROFILE_ROW: &[Candidate] =
	&[Candidate::column(Column::TeacherActor, TargetSet::QuranActorIds)];

const ACADEMIC_PROFILE_ROW: &[Candidate] = &[
	Candidate::column(Column::TeacherActor, TargetSet::AcademicActorIds),
	Candidate::column(
		Column::TeacherProfile(TeacherKind::Academic),
		TargetSet::AcademicProfileIds,
	),
];

pub const QURAN_TEACHER_PROFILE: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::QuranTeacherProfile, QURAN_PROFILE_ROW)
		.no_create()
		.teacher_management();

pub const ACADEMIC_TEACHER_PROFILE: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::AcademicTeacherProfile, ACADEMIC_PROFILE_ROW)
		.no_create()
		.teacher_management();

pub const POLICIES: &[ResourceTypePolicy] = &[
	TEACHER_EARNING,
	TEACHER_PAYOUT,
	QURAN_TEACHER_PROFILE,
	ACADEMIC_TEACHER_PROFILE,
];
