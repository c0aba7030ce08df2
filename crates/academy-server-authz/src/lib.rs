// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supervisor authorization and query scoping for the academy server.
//!
//! A supervisor is assigned a list of teacher actors of two disjoint kinds
//! (Quran and academic). This crate decides which records of each supervised
//! type that supervisor may list, view, edit, delete or create:
//!
//! - [`IdentifierResolver`] expands assignments into every derived identifier
//!   space (profile IDs, course IDs), memoized per request
//! - [`ScopeBuilder`] turns the derived set into a list [`Predicate`]
//! - [`OwnershipEvaluator`] decides ownership of one loaded record
//! - [`AuthorizationGate`] combines role, tenant, static policy and ownership
//!
//! Storage is reached only through the [`AssignmentStore`],
//! [`ProfileDirectory`] and [`RelationLoader`] traits.

pub mod error;
pub mod gate;
pub mod ownership;
pub mod policy;
pub mod resolver;
pub mod resource;
pub mod scope;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{AuthzError, Result};
pub use gate::{AuthorizationDecision, AuthorizationGate, Evaluation, Outcome};
pub use ownership::OwnershipEvaluator;
pub use policy::{Candidate, Extractor, PolicyRegistry, ResourceTypePolicy, TenantReach};
pub use resolver::{DerivedIdentifierSet, IdentifierResolver, TargetSet};
pub use resource::{Column, Related, Relation, ResourceRecord, ResourceType, Row, TargetRef};
pub use scope::{Predicate, ScopeBuilder};
pub use store::{AssignmentStore, ProfileDirectory, RelationLoader};
pub use types::{
	AcademicProfileId, Actor, ActorId, CourseId, IdentityContext, ProfileRef, QuranProfileId,
	RecordId, Role, SupervisorProfile, TeacherKind, TeacherProfile, TenantId,
};
