// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Static per-resource-type policies.
//!
//! Each supervised type declares, as data:
//!
//! - an ordered list of ownership [`Candidate`]s, each pairing a typed
//!   [`Extractor`] with the [`TargetSet`] its value must belong to
//! - how the type reaches its tenant ([`TenantReach`])
//! - static flags: read-only, teacher-management, creatable, editable statuses
//!
//! Policies are collected into a [`PolicyRegistry`] once at startup. The
//! registry validates every entry so that a malformed table fails loudly
//! before the first request. A type switched off by configuration stays
//! registered as a disabled policy and denies everything.

mod academic;
mod oversight;
mod quran;
mod teachers;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{AuthzError, Result};
use crate::resolver::TargetSet;
use crate::resource::{Column, Relation, ResourceRecord, ResourceType};

/// Where an ownership value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extractor {
	/// A column of the record itself.
	Column(Column),
	/// A column of a related record.
	Relation(Relation, Column),
}

/// One ownership reference and the identifier space it is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
	pub extractor: Extractor,
	pub target: TargetSet,
}

impl Candidate {
	pub const fn column(column: Column, target: TargetSet) -> Self {
		Self {
			extractor: Extractor::Column(column),
			target,
		}
	}

	pub const fn via(relation: Relation, column: Column, target: TargetSet) -> Self {
		Self {
			extractor: Extractor::Relation(relation, column),
			target,
		}
	}
}

/// How a resource type reaches its academy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantReach {
	/// The row carries its own tenant column.
	Column,
	/// The tenant is read from a related record.
	Via(Relation),
	/// The tenant is read from whichever polymorphic target the row points at.
	Polymorphic,
}

/// The static policy of one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceTypePolicy {
	pub resource_type: ResourceType,
	pub candidates: &'static [Candidate],
	pub tenant: TenantReach,
	pub read_only: bool,
	pub teacher_management: bool,
	pub allows_create: bool,
	/// Statuses in which a record may be edited. Empty means any status.
	pub editable_statuses: &'static [&'static str],
	/// Disabled types are registered but deny every request.
	pub enabled: bool,
}

impl ResourceTypePolicy {
	/// A creatable, editable type with its own tenant column.
	pub const fn new(resource_type: ResourceType, candidates: &'static [Candidate]) -> Self {
		Self {
			resource_type,
			candidates,
			tenant: TenantReach::Column,
			read_only: false,
			teacher_management: false,
			allows_create: true,
			editable_statuses: &[],
			enabled: true,
		}
	}

	pub const fn tenant_via(mut self, reach: TenantReach) -> Self {
		self.tenant = reach;
		self
	}

	/// Marks the type as viewable only; implies not creatable.
	pub const fn read_only(mut self) -> Self {
		self.read_only = true;
		self.allows_create = false;
		self
	}

	pub const fn no_create(mut self) -> Self {
		self.allows_create = false;
		self
	}

	pub const fn teacher_management(mut self) -> Self {
		self.teacher_management = true;
		self
	}

	pub const fn editable_in(mut self, statuses: &'static [&'static str]) -> Self {
		self.editable_statuses = statuses;
		self
	}

	pub const fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}

	/// The identifier spaces this type's ownership is checked against.
	pub fn targets(&self) -> impl Iterator<Item = TargetSet> + '_ {
		self.candidates.iter().map(|c| c.target)
	}

	/// Whether the record's status permits editing.
	pub fn status_editable(&self, record: &ResourceRecord) -> bool {
		if self.editable_statuses.is_empty() {
			return true;
		}
		record
			.status
			.as_deref()
			.is_some_and(|status| self.editable_statuses.iter().any(|s| *s == status))
	}

	fn validate(&self) -> Result<()> {
		let invalid = |reason: &str| AuthzError::InvalidPolicy {
			resource_type: self.resource_type,
			reason: reason.to_string(),
		};

		if self.candidates.is_empty() {
			return Err(invalid("no ownership candidates"));
		}
		match self.tenant {
			TenantReach::Column => {}
			TenantReach::Via(Relation::Target(_)) => {
				return Err(invalid("tenant cannot be reached through a polymorphic target"));
			}
			TenantReach::Via(_) => {}
			TenantReach::Polymorphic => {
				let all_targets = self
					.candidates
					.iter()
					.all(|c| matches!(c.extractor, Extractor::Relation(Relation::Target(_), _)));
				if !all_targets {
					return Err(invalid(
						"polymorphic tenant requires every candidate to read a target",
					));
				}
			}
		}
		if self.read_only && self.allows_create {
			return Err(invalid("read-only type cannot allow creation"));
		}
		if self.read_only && !self.editable_statuses.is_empty() {
			return Err(invalid("read-only type cannot declare editable statuses"));
		}
		Ok(())
	}
}

/// Builder for [`PolicyRegistry`].
#[derive(Debug, Default)]
pub struct PolicyRegistryBuilder {
	policies: BTreeMap<ResourceType, ResourceTypePolicy>,
}

impl PolicyRegistryBuilder {
	/// Adds a policy. Registering a type twice is an error.
	pub fn register(mut self, policy: ResourceTypePolicy) -> Result<Self> {
		if self.policies.contains_key(&policy.resource_type) {
			return Err(AuthzError::InvalidPolicy {
				resource_type: policy.resource_type,
				reason: "registered twice".to_string(),
			});
		}
		self.policies.insert(policy.resource_type, policy);
		Ok(self)
	}

	/// Validates every registered policy.
	pub fn build(self) -> Result<PolicyRegistry> {
		for policy in self.policies.values() {
			policy.validate()?;
		}
		Ok(PolicyRegistry {
			policies: self.policies,
		})
	}
}

/// The validated set of policies the gate consults.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
	policies: BTreeMap<ResourceType, ResourceTypePolicy>,
}

impl PolicyRegistry {
	pub fn builder() -> PolicyRegistryBuilder {
		PolicyRegistryBuilder::default()
	}

	/// Every built-in policy.
	pub fn standard() -> Result<Self> {
		Self::standard_for(ResourceType::all())
	}

	/// Every built-in policy, with types missing from `enabled` registered
	/// as disabled.
	pub fn standard_for(enabled: &[ResourceType]) -> Result<Self> {
		let mut builder = Self::builder();
		for policy in standard_policies() {
			let policy = if enabled.contains(&policy.resource_type) {
				*policy
			} else {
				policy.disabled()
			};
			builder = builder.register(policy)?;
		}
		builder.build()
	}

	pub fn get(&self, resource_type: ResourceType) -> Result<&ResourceTypePolicy> {
		self
			.policies
			.get(&resource_type)
			.ok_or(AuthzError::MissingPolicy(resource_type))
	}

	pub fn iter(&self) -> impl Iterator<Item = &ResourceTypePolicy> {
		self.policies.values()
	}

	pub fn len(&self) -> usize {
		self.policies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.policies.is_empty()
	}
}

fn standard_policies() -> impl Iterator<Item = &'static ResourceTypePolicy> {
	quran::POLICIES
		.iter()
		.chain(academic::POLICIES)
		.chain(oversight::POLICIES)
		.chain(teachers::POLICIES)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::RecordId;

	const OWNED_BY_ACTOR: &[Candidate] =
		&[Candidate::column(Column::TeacherActor, TargetSet::QuranActorIds)];

	#[test]
	fn standard_registry_covers_every_type() {
		let registry = PolicyRegistry::standard().unwrap();
		assert_eq!(registry.len(), ResourceType::all().len());
		for rt in ResourceType::all() {
			assert_eq!(registry.get(*rt).unwrap().resource_type, *rt);
		}
	}

	#[test]
	fn standard_for_disables_types_left_out() {
		let registry =
			PolicyRegistry::standard_for(&[ResourceType::QuranCircle, ResourceType::TeacherPayout])
				.unwrap();
		assert_eq!(registry.len(), ResourceType::all().len());
		assert!(registry.get(ResourceType::QuranCircle).unwrap().enabled);
		assert!(registry.get(ResourceType::TeacherPayout).unwrap().enabled);

		let certificates = registry.get(ResourceType::Certificate).unwrap();
		assert!(!certificates.enabled);
		// disabling keeps the rest of the policy intact
		let standard = PolicyRegistry::standard().unwrap();
		let enabled = standard.get(ResourceType::Certificate).unwrap();
		assert_eq!(*certificates, enabled.disabled());
	}

	#[test]
	fn unregistered_type_is_missing() {
		let registry = PolicyRegistry::builder().build().unwrap();
		assert!(registry.is_empty());
		assert!(matches!(
			registry.get(ResourceType::Certificate),
			Err(AuthzError::MissingPolicy(ResourceType::Certificate))
		));
	}

	#[test]
	fn read_only_types_are_never_creatable() {
		for policy in PolicyRegistry::standard().unwrap().iter() {
			if policy.read_only {
				assert!(!policy.allows_create, "{} allows create", policy.resource_type);
			}
		}
	}

	#[test]
	fn duplicate_registration_fails() {
		let policy = ResourceTypePolicy::new(ResourceType::QuranCircle, OWNED_BY_ACTOR);
		let err = PolicyRegistry::builder()
			.register(policy)
			.unwrap()
			.register(policy)
			.unwrap_err();
		assert!(matches!(err, AuthzError::InvalidPolicy { .. }));
	}

	#[test]
	fn empty_candidates_fail_validation() {
		let err = PolicyRegistry::builder()
			.register(ResourceTypePolicy::new(ResourceType::QuranCircle, &[]))
			.unwrap()
			.build()
			.unwrap_err();
		assert!(matches!(
			err,
			AuthzError::InvalidPolicy { resource_type: ResourceType::QuranCircle, .. }
		));
	}

	#[test]
	fn polymorphic_tenant_requires_target_candidates() {
		let policy = ResourceTypePolicy::new(ResourceType::QuizAssignment, OWNED_BY_ACTOR)
			.tenant_via(TenantReach::Polymorphic)
			.read_only();
		let err = PolicyRegistry::builder()
			.register(policy)
			.unwrap()
			.build()
			.unwrap_err();
		assert!(matches!(err, AuthzError::InvalidPolicy { .. }));
	}

	#[test]
	fn read_only_with_editable_statuses_fails_validation() {
		let policy = ResourceTypePolicy::new(ResourceType::TrialRequest, OWNED_BY_ACTOR)
			.read_only()
			.editable_in(&["pending"]);
		assert!(PolicyRegistry::builder()
			.register(policy)
			.unwrap()
			.build()
			.is_err());
	}

	#[test]
	fn trial_requests_are_editable_only_in_open_statuses() {
		let registry = PolicyRegistry::standard().unwrap();
		let policy = registry.get(ResourceType::TrialRequest).unwrap();
		let record = ResourceRecord::new(ResourceType::TrialRequest, RecordId::new(1));

		assert!(policy.status_editable(&record.clone().with_status("pending")));
		assert!(policy.status_editable(&record.clone().with_status("completed")));
		assert!(!policy.status_editable(&record.clone().with_status("cancelled")));
		assert!(!policy.status_editable(&record));

		let circles = registry.get(ResourceType::QuranCircle).unwrap();
		assert!(circles.status_editable(&record));
	}
}
