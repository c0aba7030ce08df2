// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Quran circles, sessions and trial requests.

use super::{Candidate, ResourceTypePolicy};
use crate::resolver::TargetSet;
use crate::resource::{Column, Relation, ResourceType};
use crate::types::TeacherKind;

const BY_QURAN_TEACHER: &[Candidate] =
	&[Candidate::column(Column::TeacherActor, TargetSet::QuranActorIds)];

/// Group circles are opened by admins, never by supervisors.
pub const QURAN_CIRCLE: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::QuranCircle, BY_QURAN_TEACHER).no_create();

pub const QURAN_INDIVIDUAL_CIRCLE: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::QuranIndividualCircle, BY_QURAN_TEACHER);

/// Sessions are generated by the scheduler.
pub const QURAN_SESSION: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::QuranSession, BY_QURAN_TEACHER).no_create();

/// Trial requests store the Quran teacher's profile ID, not the actor ID.
const BY_QURAN_PROFILE: &[Candidate] = &[
	Candidate::column(
		Column::TeacherProfile(TeacherKind::Quran),
		TargetSet::QuranProfileIds,
	),
	Candidate::via(Relation::Teacher, Column::TeacherActor, TargetSet::QuranActorIds),
];

pub const TRIAL_REQUEST: ResourceTypePolicy =
	ResourceTypePolicy::new(ResourceType::TrialRequest, BY_QURAN_PROFILE)
		.no_create()
		.editable_in(&["pending", "scheduled", "completed"]);

pub const POLICIES: &[ResourceTypePolicy] = &[
	QURAN_CIRCLE,
	QURAN_INDIVIDUAL_CIRCLE,
	QURAN_SESSION,
	TRIAL_REQUEST,
];
