// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Data-layer seams consumed by the engine.
//!
//! The engine never talks to a database directly. Implementations live in
//! `academy-server-db`; tests use in-memory fakes.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::resource::{Related, Relation, ResourceRecord};
use crate::types::{
	AcademicProfileId, ActorId, CourseId, QuranProfileId, SupervisorProfile, TeacherKind,
};

/// Read-only view over persisted supervisor to teacher assignments.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
	/// Loads the supervisor profile of an actor.
	///
	/// Returns [`AuthzError::ProfileNotFound`](crate::AuthzError::ProfileNotFound)
	/// when the actor has no supervisor profile and
	/// [`AuthzError::AssignmentLookup`](crate::AuthzError::AssignmentLookup) when
	/// the store itself fails.
	async fn supervisor_profile(&self, supervisor_id: ActorId) -> Result<SupervisorProfile>;

	async fn assigned_actor_ids(
		&self,
		supervisor_id: ActorId,
		kind: TeacherKind,
	) -> Result<BTreeSet<ActorId>> {
		let profile = self.supervisor_profile(supervisor_id).await?;
		Ok(profile.assigned(kind).clone())
	}

	async fn has_any_assignment(&self, supervisor_id: ActorId) -> Result<bool> {
		let profile = self.supervisor_profile(supervisor_id).await?;
		Ok(profile.has_any_assignment())
	}

	async fn can_manage_teachers(&self, supervisor_id: ActorId) -> Result<bool> {
		let profile = self.supervisor_profile(supervisor_id).await?;
		Ok(profile.can_manage_teachers)
	}
}

/// Lookup of teacher profiles and the courses assigned to them.
///
/// Callers never pass empty sets; implementations may still receive them and
/// must return an empty result.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
	async fn quran_profile_ids(
		&self,
		actor_ids: &BTreeSet<ActorId>,
	) -> Result<BTreeSet<QuranProfileId>>;

	async fn academic_profile_ids(
		&self,
		actor_ids: &BTreeSet<ActorId>,
	) -> Result<BTreeSet<AcademicProfileId>>;

	/// Interactive courses whose assigned teacher is one of the given profiles.
	async fn course_ids_for_teachers(
		&self,
		profile_ids: &BTreeSet<AcademicProfileId>,
	) -> Result<BTreeSet<CourseId>>;
}

/// Lazy loading of the records a record references.
#[async_trait]
pub trait RelationLoader: Send + Sync {
	/// Loads one relation of a record.
	///
	/// `Ok(None)` means the relation is absent (null reference, dangling key, or
	/// a polymorphic target of another type). Failures surface as
	/// [`AuthzError::RelationLoad`](crate::AuthzError::RelationLoad).
	async fn load_relation(
		&self,
		record: &ResourceRecord,
		relation: Relation,
	) -> Result<Option<Related>>;
}
