// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-record ownership verdicts.
//!
//! Records evaluated here were fetched by ID, so nothing is assumed about a
//! list filter having been applied. The tenant is checked first. The type's
//! ordered candidate table is then walked until one candidate's value belongs
//! to its identifier space. Candidates whose space is empty are skipped
//! without loading their relation.

use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::policy::{Extractor, PolicyRegistry, TenantReach};
use crate::resolver::DerivedIdentifierSet;
use crate::resource::{Column, Related, Relation, ResourceRecord, ResourceType, Row};
use crate::store::RelationLoader;
use crate::types::TenantId;

/// Relations loaded while evaluating one record. Each relation loads at most once.
struct RelationCache<'a> {
	loader: &'a dyn RelationLoader,
	record: &'a ResourceRecord,
	loaded: HashMap<Relation, Option<Related>>,
}

impl<'a> RelationCache<'a> {
	fn new(loader: &'a dyn RelationLoader, record: &'a ResourceRecord) -> Self {
		Self {
			loader,
			record,
			loaded: HashMap::new(),
		}
	}

	async fn get(&mut self, relation: Relation) -> Result<Option<&Related>> {
		if !self.loaded.contains_key(&relation) {
			let related = match relation {
				// a polymorphic target of another type is simply absent
				Relation::Target(rt) if self.record.target.map(|t| t.resource_type) != Some(rt) => {
					None
				}
				_ => self.loader.load_relation(self.record, relation).await?,
			};
			self.loaded.insert(relation, related);
		}
		Ok(self.loaded.get(&relation).and_then(Option::as_ref))
	}
}

/// Decides whether a supervisor's derived identifiers own a record.
pub struct OwnershipEvaluator<'a> {
	registry: &'a PolicyRegistry,
	loader: &'a dyn RelationLoader,
}

impl<'a> OwnershipEvaluator<'a> {
	pub fn new(registry: &'a PolicyRegistry, loader: &'a dyn RelationLoader) -> Self {
		Self { registry, loader }
	}

	#[instrument(
		level = "debug",
		skip(self, record, derived),
		fields(resource_type = %resource_type, record_id = %record.id, tenant_id = %tenant_id)
	)]
	pub async fn evaluate(
		&self,
		resource_type: ResourceType,
		record: &ResourceRecord,
		derived: &DerivedIdentifierSet,
		tenant_id: TenantId,
	) -> Result<bool> {
		let policy = self.registry.get(resource_type)?;
		if !policy.enabled {
			debug!("resource type disabled");
			return Ok(false);
		}
		if record.resource_type != resource_type {
			debug!(actual = %record.resource_type, "record is of another type");
			return Ok(false);
		}

		let mut relations = RelationCache::new(self.loader, record);

		let record_tenant = match policy.tenant {
			TenantReach::Column => record.value(Column::Tenant),
			TenantReach::Via(relation) => relations
				.get(relation)
				.await?
				.and_then(|r| r.value(Column::Tenant)),
			TenantReach::Polymorphic => match record.target {
				Some(target) => relations
					.get(Relation::Target(target.resource_type))
					.await?
					.and_then(|r| r.value(Column::Tenant)),
				None => None,
			},
		};
		if record_tenant != Some(tenant_id.get()) {
			debug!(record_tenant = ?record_tenant, "tenant mismatch");
			return Ok(false);
		}

		for candidate in policy.candidates {
			if derived.is_target_empty(candidate.target) {
				continue;
			}
			let value = match candidate.extractor {
				Extractor::Column(column) => record.value(column),
				Extractor::Relation(relation, column) => {
					relations.get(relation).await?.and_then(|r| r.value(column))
				}
			};
			if value.is_some_and(|v| derived.contains(candidate.target, v)) {
				debug!(target = ?candidate.target, "ownership matched");
				return Ok(true);
			}
		}

		debug!("no ownership candidate matched");
		Ok(false)
	}
}
