// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authorization entry point.
//!
//! [`AuthorizationGate`] is built once at startup and shared. Each request
//! opens an [`Evaluation`], which owns the request's memoized identifier
//! resolution and answers scope and CRUD questions:
//!
//! 1. **Admission**: the actor must be a supervisor of the active academy
//! 2. **Assignments**: a supervisor with no assignments is denied everything
//! 3. **Static policy**: read-only, creatable, teacher-management, statuses
//! 4. **Ownership**: the record must belong to an assigned teacher
//!
//! Denial is a boolean, and a type disabled by configuration is denied like
//! any other. Data-layer failures are errors, and
//! [`AuthorizationGate::authorize_fail_closed`] turns them into a denial that
//! is logged separately. Misconfiguration stays an error.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::error::{AuthzError, Result};
use crate::ownership::OwnershipEvaluator;
use crate::policy::{PolicyRegistry, ResourceTypePolicy};
use crate::resolver::{DerivedIdentifierSet, IdentifierResolver};
use crate::resource::{ResourceRecord, ResourceType};
use crate::scope::{Predicate, ScopeBuilder};
use crate::store::{AssignmentStore, ProfileDirectory, RelationLoader};
use crate::types::{ActorId, IdentityContext, TenantId};

/// The four CRUD verdicts for one actor, type and optional record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthorizationDecision {
	pub can_view: bool,
	pub can_edit: bool,
	pub can_delete: bool,
	pub can_create: bool,
}

impl AuthorizationDecision {
	pub const DENY_ALL: AuthorizationDecision = AuthorizationDecision {
		can_view: false,
		can_edit: false,
		can_delete: false,
		can_create: false,
	};

	pub fn is_deny_all(&self) -> bool {
		*self == Self::DENY_ALL
	}
}

/// Result of a fail-closed authorization.
#[derive(Debug)]
pub enum Outcome {
	Decided(AuthorizationDecision),
	/// The data layer failed; the caller must render a denial.
	Unavailable(AuthzError),
}

impl Outcome {
	/// The decision to enforce. Deny-all when the data layer failed.
	pub fn decision(&self) -> AuthorizationDecision {
		match self {
			Outcome::Decided(decision) => *decision,
			Outcome::Unavailable(_) => AuthorizationDecision::DENY_ALL,
		}
	}

	pub fn is_unavailable(&self) -> bool {
		matches!(self, Outcome::Unavailable(_))
	}

	pub fn error(&self) -> Option<&AuthzError> {
		match self {
			Outcome::Decided(_) => None,
			Outcome::Unavailable(e) => Some(e),
		}
	}
}

/// Shared, stateless authorization service.
pub struct AuthorizationGate {
	registry: Arc<PolicyRegistry>,
	assignments: Arc<dyn AssignmentStore>,
	directory: Arc<dyn ProfileDirectory>,
	loader: Arc<dyn RelationLoader>,
	log_decisions: bool,
}

impl AuthorizationGate {
	pub fn new(
		registry: Arc<PolicyRegistry>,
		assignments: Arc<dyn AssignmentStore>,
		directory: Arc<dyn ProfileDirectory>,
		loader: Arc<dyn RelationLoader>,
	) -> Self {
		Self {
			registry,
			assignments,
			directory,
			loader,
			log_decisions: false,
		}
	}

	/// Emit one `info` line per decision.
	pub fn with_decision_logging(mut self, enabled: bool) -> Self {
		self.log_decisions = enabled;
		self
	}

	/// Opens a per-request evaluation.
	pub fn evaluation(&self, ctx: IdentityContext) -> Evaluation<'_> {
		Evaluation {
			gate: self,
			ctx,
			resolver: IdentifierResolver::new(
				ctx.actor.id,
				self.assignments.as_ref(),
				self.directory.as_ref(),
			),
		}
	}

	/// Resolves a supervisor's derived identifiers from fresh assignment data.
	#[instrument(skip(self), fields(supervisor_id = %supervisor_id))]
	pub async fn resolve_identifiers(
		&self,
		supervisor_id: ActorId,
	) -> Result<DerivedIdentifierSet> {
		IdentifierResolver::new(supervisor_id, self.assignments.as_ref(), self.directory.as_ref())
			.derived()
			.await
			.cloned()
	}

	/// Builds the list scope of one type for a supervisor in an academy.
	#[instrument(
		skip(self),
		fields(
			resource_type = %resource_type,
			supervisor_id = %supervisor_id,
			tenant_id = %tenant_id,
		)
	)]
	pub async fn build_scope(
		&self,
		resource_type: ResourceType,
		supervisor_id: ActorId,
		tenant_id: TenantId,
	) -> Result<Predicate> {
		let derived = self.resolve_identifiers(supervisor_id).await?;
		ScopeBuilder::new(&self.registry).build(resource_type, &derived, tenant_id)
	}

	/// One-shot authorization of a type, or of one record of it.
	pub async fn authorize(
		&self,
		ctx: IdentityContext,
		resource_type: ResourceType,
		record: Option<&ResourceRecord>,
	) -> Result<AuthorizationDecision> {
		self.evaluation(ctx).authorize(resource_type, record).await
	}

	/// Like [`authorize`](Self::authorize), but data-layer failures become a
	/// deny-all [`Outcome::Unavailable`] logged at `error`.
	///
	/// # Errors
	/// Errors that are not [infrastructure](AuthzError::is_infrastructure)
	/// failures, such as a type with no registered policy, are returned as is.
	pub async fn authorize_fail_closed(
		&self,
		ctx: IdentityContext,
		resource_type: ResourceType,
		record: Option<&ResourceRecord>,
	) -> Result<Outcome> {
		match self.authorize(ctx, resource_type, record).await {
			Ok(decision) => Ok(Outcome::Decided(decision)),
			Err(e) if e.is_infrastructure() => {
				error!(
					actor_id = %ctx.actor.id,
					resource_type = %resource_type,
					error_kind = e.kind(),
					error = %e,
					"authorization unavailable, denying"
				);
				Ok(Outcome::Unavailable(e))
			}
			Err(e) => Err(e),
		}
	}
}

/// One request's view of the gate.
///
/// Identifier resolution happens at most once per evaluation no matter how
/// many questions are asked.
pub struct Evaluation<'g> {
	gate: &'g AuthorizationGate,
	ctx: IdentityContext,
	resolver: IdentifierResolver<'g>,
}

impl<'g> Evaluation<'g> {
	/// The type's policy, or `None` when the type is disabled.
	fn policy(&self, resource_type: ResourceType) -> Result<Option<&'g ResourceTypePolicy>> {
		let policy = self.gate.registry.get(resource_type)?;
		if !policy.enabled {
			debug!(resource_type = %resource_type, "resource type disabled");
			return Ok(None);
		}
		Ok(Some(policy))
	}

	/// Admitted and holding at least one assignment.
	async fn admitted(&self) -> Result<bool> {
		if !self.ctx.is_supervisor_in_tenant() {
			debug!(
				actor_id = %self.ctx.actor.id,
				role = %self.ctx.actor.role,
				"actor is not a supervisor of this academy"
			);
			return Ok(false);
		}
		if !self.resolver.has_any_assignment().await? {
			debug!(actor_id = %self.ctx.actor.id, "supervisor has no assignments");
			return Ok(false);
		}
		Ok(true)
	}

	/// Whether any of the identifier spaces the type is checked against is
	/// non-empty, and management capability is present when required.
	async fn reaches(&self, policy: &ResourceTypePolicy) -> Result<bool> {
		if policy.teacher_management && !self.resolver.can_manage_teachers().await? {
			return Ok(false);
		}
		let derived = self.resolver.derived().await?;
		Ok(policy.targets().any(|t| !derived.is_target_empty(t)))
	}

	async fn owns(&self, resource_type: ResourceType, record: &ResourceRecord) -> Result<bool> {
		let derived = self.resolver.derived().await?;
		OwnershipEvaluator::new(&self.gate.registry, self.gate.loader.as_ref())
			.evaluate(resource_type, record, derived, self.ctx.tenant_id)
			.await
	}

	/// The list scope of a type. Non-supervisors and disabled types get
	/// [`Predicate::False`].
	pub async fn scope(&self, resource_type: ResourceType) -> Result<Predicate> {
		if self.policy(resource_type)?.is_none() || !self.admitted().await? {
			return Ok(Predicate::False);
		}
		let derived = self.resolver.derived().await?;
		ScopeBuilder::new(&self.gate.registry).build(resource_type, derived, self.ctx.tenant_id)
	}

	pub async fn can_create(&self, resource_type: ResourceType) -> Result<bool> {
		let Some(policy) = self.policy(resource_type)? else {
			return Ok(false);
		};
		if !policy.allows_create || policy.read_only {
			return Ok(false);
		}
		Ok(self.admitted().await? && self.reaches(policy).await?)
	}

	/// Whether the type should be listed at all, for navigation.
	pub async fn can_view_any(&self, resource_type: ResourceType) -> Result<bool> {
		let Some(policy) = self.policy(resource_type)? else {
			return Ok(false);
		};
		Ok(self.admitted().await? && self.reaches(policy).await?)
	}

	pub async fn can_view(
		&self,
		resource_type: ResourceType,
		record: &ResourceRecord,
	) -> Result<bool> {
		if self.policy(resource_type)?.is_none() {
			return Ok(false);
		}
		Ok(self.admitted().await? && self.owns(resource_type, record).await?)
	}

	pub async fn can_edit(
		&self,
		resource_type: ResourceType,
		record: &ResourceRecord,
	) -> Result<bool> {
		let Some(policy) = self.policy(resource_type)? else {
			return Ok(false);
		};
		if policy.read_only || !policy.status_editable(record) {
			return Ok(false);
		}
		Ok(self.admitted().await? && self.owns(resource_type, record).await?)
	}

	pub async fn can_delete(
		&self,
		resource_type: ResourceType,
		record: &ResourceRecord,
	) -> Result<bool> {
		let Some(policy) = self.policy(resource_type)? else {
			return Ok(false);
		};
		if policy.read_only {
			return Ok(false);
		}
		Ok(self.admitted().await? && self.owns(resource_type, record).await?)
	}

	/// All four verdicts at once. Without a record, `can_view` answers
	/// [`can_view_any`](Self::can_view_any) and edit/delete are false.
	#[instrument(
		skip(self, record),
		fields(
			actor_id = %self.ctx.actor.id,
			tenant_id = %self.ctx.tenant_id,
			resource_type = %resource_type,
			record_id = ?record.map(|r| r.id.get()),
		)
	)]
	pub async fn authorize(
		&self,
		resource_type: ResourceType,
		record: Option<&ResourceRecord>,
	) -> Result<AuthorizationDecision> {
		let policy = match self.policy(resource_type)? {
			Some(policy) if self.admitted().await? => policy,
			_ => {
				self.log(resource_type, &AuthorizationDecision::DENY_ALL);
				return Ok(AuthorizationDecision::DENY_ALL);
			}
		};

		let can_create = self.can_create(resource_type).await?;
		let decision = match record {
			None => AuthorizationDecision {
				can_view: self.reaches(policy).await?,
				can_edit: false,
				can_delete: false,
				can_create,
			},
			Some(record) => {
				let owned = self.owns(resource_type, record).await?;
				AuthorizationDecision {
					can_view: owned,
					can_edit: owned && !policy.read_only && policy.status_editable(record),
					can_delete: owned && !policy.read_only,
					can_create,
				}
			}
		};
		self.log(resource_type, &decision);
		Ok(decision)
	}

	fn log(&self, resource_type: ResourceType, decision: &AuthorizationDecision) {
		if self.gate.log_decisions {
			info!(
				actor_id = %self.ctx.actor.id,
				resource_type = %resource_type,
				can_view = decision.can_view,
				can_edit = decision.can_edit,
				can_delete = decision.can_delete,
				can_create = decision.can_create,
				"authorization decision"
			);
		} else {
			debug!(
				can_view = decision.can_view,
				can_edit = decision.can_edit,
				can_delete = decision.can_delete,
				can_create = decision.can_create,
				"authorization decision"
			);
		}
	}
}
