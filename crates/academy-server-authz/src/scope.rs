// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! List-query scoping.
//!
//! [`ScopeBuilder`] turns a [`DerivedIdentifierSet`] into a [`Predicate`] per
//! resource type. The predicate is storage-agnostic: `academy-server-db`
//! compiles it to SQL, and [`Predicate::matches`] evaluates it in memory.
//!
//! An empty identifier space always produces [`Predicate::False`]; there is no
//! code path that yields an unscoped query.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::policy::{Extractor, PolicyRegistry, TenantReach};
use crate::resolver::DerivedIdentifierSet;
use crate::resource::{Column, Related, Relation, ResourceType, Row};
use crate::types::TenantId;

/// A filter over rows of one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Predicate {
	/// Matches nothing.
	False,
	In {
		column: Column,
		values: BTreeSet<i64>,
	},
	Eq {
		column: Column,
		value: i64,
	},
	/// Matches when the related record exists and satisfies the inner predicate.
	Related {
		relation: Relation,
		predicate: Box<Predicate>,
	},
	And(Vec<Predicate>),
	Or(Vec<Predicate>),
}

impl Predicate {
	/// `column IN values`, or [`Predicate::False`] when `values` is empty.
	pub fn any_of(column: Column, values: BTreeSet<i64>) -> Self {
		if values.is_empty() {
			return Predicate::False;
		}
		Predicate::In { column, values }
	}

	pub fn equals(column: Column, value: i64) -> Self {
		Predicate::Eq { column, value }
	}

	pub fn tenant(tenant_id: TenantId) -> Self {
		Predicate::equals(Column::Tenant, tenant_id.get())
	}

	pub fn related(relation: Relation, predicate: Predicate) -> Self {
		Predicate::Related {
			relation,
			predicate: Box::new(predicate),
		}
	}

	/// True when no row can ever satisfy the predicate.
	pub fn is_unsatisfiable(&self) -> bool {
		match self {
			Predicate::False => true,
			Predicate::In { values, .. } => values.is_empty(),
			Predicate::Eq { .. } => false,
			Predicate::Related { predicate, .. } => predicate.is_unsatisfiable(),
			Predicate::And(parts) => parts.iter().any(Predicate::is_unsatisfiable),
			Predicate::Or(parts) => parts.iter().all(Predicate::is_unsatisfiable),
		}
	}

	/// Evaluates the predicate against one row.
	///
	/// `lookup` resolves the row's relations. Relations nested below a
	/// relation are not followed.
	pub fn matches<R: Row + ?Sized>(
		&self,
		row: &R,
		lookup: &dyn Fn(Relation) -> Option<Related>,
	) -> bool {
		match self {
			Predicate::False => false,
			Predicate::In { column, values } => {
				row.value(*column).is_some_and(|v| values.contains(&v))
			}
			Predicate::Eq { column, value } => row.value(*column) == Some(*value),
			Predicate::Related {
				relation,
				predicate,
			} => lookup(*relation).is_some_and(|related| predicate.matches(&related, &|_| None)),
			Predicate::And(parts) => parts.iter().all(|p| p.matches(row, lookup)),
			Predicate::Or(parts) => parts.iter().any(|p| p.matches(row, lookup)),
		}
	}
}

/// Builds list scopes from the registered policies.
pub struct ScopeBuilder<'a> {
	registry: &'a PolicyRegistry,
}

impl<'a> ScopeBuilder<'a> {
	pub fn new(registry: &'a PolicyRegistry) -> Self {
		Self { registry }
	}

	/// Builds the scope of one resource type.
	///
	/// Ownership is the OR of one branch per candidate; each branch is false
	/// on its own when its identifier space is empty. The tenant restriction
	/// is ANDed on the row, through the tenant relation, or inside every
	/// polymorphic branch. A disabled type scopes to [`Predicate::False`].
	#[instrument(
		level = "debug",
		skip(self, derived),
		fields(resource_type = %resource_type, tenant_id = %tenant_id)
	)]
	pub fn build(
		&self,
		resource_type: ResourceType,
		derived: &DerivedIdentifierSet,
		tenant_id: TenantId,
	) -> Result<Predicate> {
		let policy = self.registry.get(resource_type)?;
		if !policy.enabled {
			debug!("resource type disabled");
			return Ok(Predicate::False);
		}
		let polymorphic = policy.tenant == TenantReach::Polymorphic;

		let branches: Vec<Predicate> = policy
			.candidates
			.iter()
			.map(|candidate| {
				let values = derived.raw(candidate.target);
				match candidate.extractor {
					Extractor::Column(column) => Predicate::any_of(column, values),
					Extractor::Relation(relation, column) => {
						let owned = Predicate::any_of(column, values);
						let inner = if polymorphic {
							Predicate::And(vec![Predicate::tenant(tenant_id), owned])
						} else {
							owned
						};
						Predicate::related(relation, inner)
					}
				}
			})
			.filter(|branch| !branch.is_unsatisfiable())
			.collect();

		if branches.is_empty() {
			debug!("no reachable identifiers, scope matches nothing");
			return Ok(Predicate::False);
		}
		let ownership = Predicate::Or(branches);

		Ok(match policy.tenant {
			TenantReach::Column => Predicate::And(vec![Predicate::tenant(tenant_id), ownership]),
			TenantReach::Via(relation) => Predicate::And(vec![
				Predicate::related(relation, Predicate::tenant(tenant_id)),
				ownership,
			]),
			TenantReach::Polymorphic => ownership,
		})
	}
}
