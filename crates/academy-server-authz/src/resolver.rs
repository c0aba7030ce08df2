// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Expansion of direct assignments into derived identifier spaces.
//!
//! A supervisor is assigned teacher *actor* IDs, but most records name their
//! teacher by *profile* ID or belong to a *course*. [`IdentifierResolver`]
//! derives every space once per evaluation:
//!
//! ```text
//! quran actor ids    ──► quran profile ids
//! academic actor ids ──► academic profile ids ──► course ids
//! ```
//!
//! Each step short-circuits to the empty set without touching the directory
//! when its input is empty.

use serde::Serialize;
use std::collections::BTreeSet;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::error::{AuthzError, Result};
use crate::store::{AssignmentStore, ProfileDirectory};
use crate::types::{
	AcademicProfileId, ActorId, CourseId, QuranProfileId, SupervisorProfile, TeacherKind,
};

static NO_ACTORS: BTreeSet<ActorId> = BTreeSet::new();

/// Names one identifier space of a [`DerivedIdentifierSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSet {
	QuranActorIds,
	AcademicActorIds,
	QuranProfileIds,
	AcademicProfileIds,
	CourseIds,
}

impl TargetSet {
	pub fn all() -> &'static [TargetSet] {
		&[
			TargetSet::QuranActorIds,
			TargetSet::AcademicActorIds,
			TargetSet::QuranProfileIds,
			TargetSet::AcademicProfileIds,
			TargetSet::CourseIds,
		]
	}
}

/// Every identifier a supervisor's assignments expand to.
///
/// Carries no tenant information and is valid against every resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedIdentifierSet {
	pub quran_actor_ids: BTreeSet<ActorId>,
	pub academic_actor_ids: BTreeSet<ActorId>,
	pub quran_profile_ids: BTreeSet<QuranProfileId>,
	pub academic_profile_ids: BTreeSet<AcademicProfileId>,
	pub course_ids: BTreeSet<CourseId>,
}

impl DerivedIdentifierSet {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		TargetSet::all().iter().all(|t| self.is_target_empty(*t))
	}

	pub fn is_target_empty(&self, target: TargetSet) -> bool {
		match target {
			TargetSet::QuranActorIds => self.quran_actor_ids.is_empty(),
			TargetSet::AcademicActorIds => self.academic_actor_ids.is_empty(),
			TargetSet::QuranProfileIds => self.quran_profile_ids.is_empty(),
			TargetSet::AcademicProfileIds => self.academic_profile_ids.is_empty(),
			TargetSet::CourseIds => self.course_ids.is_empty(),
		}
	}

	pub fn contains(&self, target: TargetSet, value: i64) -> bool {
		match target {
			TargetSet::QuranActorIds => self.quran_actor_ids.contains(&ActorId::new(value)),
			TargetSet::AcademicActorIds => self.academic_actor_ids.contains(&ActorId::new(value)),
			TargetSet::QuranProfileIds => {
				self.quran_profile_ids.contains(&QuranProfileId::new(value))
			}
			TargetSet::AcademicProfileIds => {
				self.academic_profile_ids.contains(&AcademicProfileId::new(value))
			}
			TargetSet::CourseIds => self.course_ids.contains(&CourseId::new(value)),
		}
	}

	/// The raw keys of one space, for query compilation.
	pub fn raw(&self, target: TargetSet) -> BTreeSet<i64> {
		match target {
			TargetSet::QuranActorIds => self.quran_actor_ids.iter().map(|id| id.get()).collect(),
			TargetSet::AcademicActorIds => {
				self.academic_actor_ids.iter().map(|id| id.get()).collect()
			}
			TargetSet::QuranProfileIds => {
				self.quran_profile_ids.iter().map(|id| id.get()).collect()
			}
			TargetSet::AcademicProfileIds => {
				self.academic_profile_ids.iter().map(|id| id.get()).collect()
			}
			TargetSet::CourseIds => self.course_ids.iter().map(|id| id.get()).collect(),
		}
	}
}

/// Resolves the derived identifiers of one supervisor within one evaluation.
///
/// Every output is memoized for the life of the resolver. Create a new
/// resolver per request; never share one across requests or actors.
pub struct IdentifierResolver<'a> {
	supervisor_id: ActorId,
	assignments: &'a dyn AssignmentStore,
	directory: &'a dyn ProfileDirectory,
	profile: OnceCell<Option<SupervisorProfile>>,
	quran_profiles: OnceCell<BTreeSet<QuranProfileId>>,
	academic_profiles: OnceCell<BTreeSet<AcademicProfileId>>,
	courses: OnceCell<BTreeSet<CourseId>>,
	derived: OnceCell<DerivedIdentifierSet>,
}

impl<'a> IdentifierResolver<'a> {
	pub fn new(
		supervisor_id: ActorId,
		assignments: &'a dyn AssignmentStore,
		directory: &'a dyn ProfileDirectory,
	) -> Self {
		Self {
			supervisor_id,
			assignments,
			directory,
			profile: OnceCell::new(),
			quran_profiles: OnceCell::new(),
			academic_profiles: OnceCell::new(),
			courses: OnceCell::new(),
			derived: OnceCell::new(),
		}
	}

	/// The supervisor profile, or `None` when the actor has none.
	async fn profile(&self) -> Result<Option<&SupervisorProfile>> {
		let profile = self
			.profile
			.get_or_try_init(|| async {
				match self.assignments.supervisor_profile(self.supervisor_id).await {
					Ok(profile) => Ok(Some(profile)),
					Err(AuthzError::ProfileNotFound(actor_id)) => {
						debug!(
							supervisor_id = %actor_id,
							"supervisor profile not found, resolving empty"
						);
						Ok(None)
					}
					Err(e) => Err(e),
				}
			})
			.await?;
		Ok(profile.as_ref())
	}

	async fn actor_ids(&self, kind: TeacherKind) -> Result<&BTreeSet<ActorId>> {
		Ok(match self.profile().await? {
			Some(profile) => profile.assigned(kind),
			None => &NO_ACTORS,
		})
	}

	pub async fn quran_actor_ids(&self) -> Result<&BTreeSet<ActorId>> {
		self.actor_ids(TeacherKind::Quran).await
	}

	pub async fn academic_actor_ids(&self) -> Result<&BTreeSet<ActorId>> {
		self.actor_ids(TeacherKind::Academic).await
	}

	pub async fn has_any_assignment(&self) -> Result<bool> {
		Ok(self
			.profile()
			.await?
			.is_some_and(SupervisorProfile::has_any_assignment))
	}

	pub async fn can_manage_teachers(&self) -> Result<bool> {
		Ok(self.profile().await?.is_some_and(|p| p.can_manage_teachers))
	}

	pub async fn quran_profile_ids(&self) -> Result<&BTreeSet<QuranProfileId>> {
		self
			.quran_profiles
			.get_or_try_init(|| async {
				let actors = self.quran_actor_ids().await?;
				if actors.is_empty() {
					return Ok(BTreeSet::new());
				}
				self.directory.quran_profile_ids(actors).await
			})
			.await
	}

	pub async fn academic_profile_ids(&self) -> Result<&BTreeSet<AcademicProfileId>> {
		self
			.academic_profiles
			.get_or_try_init(|| async {
				let actors = self.academic_actor_ids().await?;
				if actors.is_empty() {
					return Ok(BTreeSet::new());
				}
				self.directory.academic_profile_ids(actors).await
			})
			.await
	}

	pub async fn derived_course_ids(&self) -> Result<&BTreeSet<CourseId>> {
		self
			.courses
			.get_or_try_init(|| async {
				let profiles = self.academic_profile_ids().await?;
				if profiles.is_empty() {
					return Ok(BTreeSet::new());
				}
				self.directory.course_ids_for_teachers(profiles).await
			})
			.await
	}

	/// Resolves every identifier space at once.
	#[instrument(skip(self), fields(supervisor_id = %self.supervisor_id))]
	pub async fn derived(&self) -> Result<&DerivedIdentifierSet> {
		self
			.derived
			.get_or_try_init(|| async {
				let set = DerivedIdentifierSet {
					quran_actor_ids: self.quran_actor_ids().await?.clone(),
					academic_actor_ids: self.academic_actor_ids().await?.clone(),
					quran_profile_ids: self.quran_profile_ids().await?.clone(),
					academic_profile_ids: self.academic_profile_ids().await?.clone(),
					course_ids: self.derived_course_ids().await?.clone(),
				};
				debug!(
					quran_actors = set.quran_actor_ids.len(),
					academic_actors = set.academic_actor_ids.len(),
					quran_profiles = set.quran_profile_ids.len(),
					academic_profiles = set.academic_profile_ids.len(),
					courses = set.course_ids.len(),
					"resolved derived identifiers"
				);
				Ok(set)
			})
			.await
	}
}
