// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{AuthzError, Result};
use crate::resource::{Related, Relation, ResourceRecord, ResourceType};
use crate::store::{AssignmentStore, ProfileDirectory, RelationLoader};
use crate::types::{
	AcademicProfileId, ActorId, CourseId, ProfileRef, QuranProfileId, RecordId, SupervisorProfile,
	TeacherProfile, TenantId,
};

/// In-memory academy implementing every data-layer seam, with query counters.
#[derive(Default)]
pub struct FakeAcademy {
	supervisors: HashMap<ActorId, SupervisorProfile>,
	teachers: Vec<TeacherProfile>,
	records: HashMap<(ResourceType, RecordId), ResourceRecord>,
	relations: HashMap<(ResourceType, RecordId, Relation), Related>,
	fail_assignments: AtomicBool,
	fail_relations: AtomicBool,
	assignment_queries: AtomicUsize,
	quran_profile_queries: AtomicUsize,
	academic_profile_queries: AtomicUsize,
	course_queries: AtomicUsize,
	relation_loads: AtomicUsize,
}

impl FakeAcademy {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_supervisor(mut self, profile: SupervisorProfile) -> Self {
		self.supervisors.insert(profile.actor_id, profile);
		self
	}

	pub fn with_teacher(mut self, teacher: TeacherProfile) -> Self {
		self.teachers.push(teacher);
		self
	}

	/// Registers an interactive course assigned to an academic profile.
	pub fn with_course(
		self,
		id: CourseId,
		teacher: AcademicProfileId,
		tenant_id: TenantId,
	) -> Self {
		self.with_record(
			ResourceRecord::new(ResourceType::InteractiveCourse, RecordId::new(id.get()))
				.with_tenant(tenant_id)
				.with_teacher_profile(ProfileRef::Academic(teacher)),
		)
	}

	/// Registers a record reachable as a course or polymorphic target.
	pub fn with_record(mut self, record: ResourceRecord) -> Self {
		self.records.insert((record.resource_type, record.id), record);
		self
	}

	/// Overrides what one relation of one record loads to.
	pub fn with_relation(
		mut self,
		record: &ResourceRecord,
		relation: Relation,
		related: Related,
	) -> Self {
		self
			.relations
			.insert((record.resource_type, record.id, relation), related);
		self
	}

	pub fn fail_assignments(&self, fail: bool) {
		self.fail_assignments.store(fail, Ordering::SeqCst);
	}

	pub fn fail_relations(&self, fail: bool) {
		self.fail_relations.store(fail, Ordering::SeqCst);
	}

	pub fn assignment_queries(&self) -> usize {
		self.assignment_queries.load(Ordering::SeqCst)
	}

	pub fn quran_profile_queries(&self) -> usize {
		self.quran_profile_queries.load(Ordering::SeqCst)
	}

	pub fn academic_profile_queries(&self) -> usize {
		self.academic_profile_queries.load(Ordering::SeqCst)
	}

	pub fn course_queries(&self) -> usize {
		self.course_queries.load(Ordering::SeqCst)
	}

	pub fn relation_loads(&self) -> usize {
		self.relation_loads.load(Ordering::SeqCst)
	}

	fn teacher_by_profile(&self, profile: ProfileRef) -> Option<TeacherProfile> {
		self.teachers.iter().copied().find(|t| t.profile == profile)
	}
}

#[async_trait]
impl AssignmentStore for FakeAcademy {
	async fn supervisor_profile(&self, supervisor_id: ActorId) -> Result<SupervisorProfile> {
		self.assignment_queries.fetch_add(1, Ordering::SeqCst);
		if self.fail_assignments.load(Ordering::SeqCst) {
			return Err(AuthzError::AssignmentLookup("database is locked".to_string()));
		}
		self
			.supervisors
			.get(&supervisor_id)
			.cloned()
			.ok_or(AuthzError::ProfileNotFound(supervisor_id))
	}
}

#[async_trait]
impl ProfileDirectory for FakeAcademy {
	async fn quran_profile_ids(
		&self,
		actor_ids: &BTreeSet<ActorId>,
	) -> Result<BTreeSet<QuranProfileId>> {
		self.quran_profile_queries.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.teachers
			.iter()
			.filter(|t| actor_ids.contains(&t.actor_id))
			.filter_map(|t| match t.profile {
				ProfileRef::Quran(id) => Some(id),
				ProfileRef::Academic(_) => None,
			})
			.collect())
	}

	async fn academic_profile_ids(
		&self,
		actor_ids: &BTreeSet<ActorId>,
	) -> Result<BTreeSet<AcademicProfileId>> {
		self.academic_profile_queries.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.teachers
			.iter()
			.filter(|t| actor_ids.contains(&t.actor_id))
			.filter_map(|t| match t.profile {
				ProfileRef::Academic(id) => Some(id),
				ProfileRef::Quran(_) => None,
			})
			.collect())
	}

	async fn course_ids_for_teachers(
		&self,
		profile_ids: &BTreeSet<AcademicProfileId>,
	) -> Result<BTreeSet<CourseId>> {
		self.course_queries.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.records
			.values()
			.filter(|r| r.resource_type == ResourceType::InteractiveCourse)
			.filter(|r| {
				matches!(
					r.teacher_profile,
					Some(ProfileRef::Academic(id)) if profile_ids.contains(&id)
				)
			})
			.map(|r| CourseId::new(r.id.get()))
			.collect())
	}
}

#[async_trait]
impl RelationLoader for FakeAcademy {
	async fn load_relation(
		&self,
		record: &ResourceRecord,
		relation: Relation,
	) -> Result<Option<Related>> {
		self.relation_loads.fetch_add(1, Ordering::SeqCst);
		if self.fail_relations.load(Ordering::SeqCst) {
			return Err(AuthzError::RelationLoad {
				resource_type: record.resource_type,
				relation,
				message: "connection reset".to_string(),
			});
		}
		if let Some(related) = self.relations.get(&(record.resource_type, record.id, relation)) {
			return Ok(Some(related.clone()));
		}

		let related = match relation {
			Relation::Teacher => record
				.teacher_profile
				.and_then(|p| self.teacher_by_profile(p))
				.map(Related::Teacher),
			Relation::Course => record
				.course_id
				.and_then(|c| {
					self
						.records
						.get(&(ResourceType::InteractiveCourse, RecordId::new(c.get())))
				})
				.map(|r| Related::Record(Box::new(r.clone()))),
			Relation::Target(rt) => record
				.target
				.filter(|t| t.resource_type == rt)
				.and_then(|t| self.records.get(&(rt, t.id)))
				.map(|r| Related::Record(Box::new(r.clone()))),
		};
		Ok(related)
	}
}
