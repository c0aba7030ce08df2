// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core identity types for supervisor authorization.
//!
//! - **ID newtypes**: type-safe wrappers around the integer keys of each entity
//!   ([`ActorId`], [`TenantId`], [`QuranProfileId`], ...) so a teacher's actor ID
//!   can never be compared against a profile ID by accident
//! - **Roles**: the fixed set of account roles ([`Role`]) and the two disjoint
//!   teacher kinds ([`TeacherKind`])
//! - **Identity**: the acting user ([`Actor`]) and the explicit per-request
//!   [`IdentityContext`]
//! - **Profiles**: [`SupervisorProfile`] with its assignment sets, and the
//!   [`TeacherProfile`] a teacher actor is known by in most record tables

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(
			Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
		)]
		#[serde(transparent)]
		pub struct $name(i64);

		impl $name {
			/// Create a new ID from its raw key.
			pub const fn new(id: i64) -> Self {
				Self(id)
			}

			/// Get the raw key.
			pub const fn get(self) -> i64 {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<i64> for $name {
			fn from(id: i64) -> Self {
				Self(id)
			}
		}

		impl From<$name> for i64 {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(ActorId, "Identifier of a user account.");
define_id_type!(TenantId, "Identifier of an academy, the tenant boundary.");
define_id_type!(QuranProfileId, "Identifier of a Quran teacher profile.");
define_id_type!(AcademicProfileId, "Identifier of an academic teacher profile.");
define_id_type!(CourseId, "Identifier of an interactive course.");
define_id_type!(RecordId, "Identifier of a row of any resource type.");

// =============================================================================
// Roles
// =============================================================================

/// Account roles known to the academy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Monitors and manages an assigned subset of teachers.
	Supervisor,
	/// Teaches Quran circles and sessions.
	QuranTeacher,
	/// Teaches academic lessons and interactive courses.
	AcademicTeacher,
	/// Academy administrator.
	Admin,
	/// Enrolled learner.
	Student,
}

impl Role {
	/// Returns all roles.
	pub fn all() -> &'static [Role] {
		&[
			Role::Supervisor,
			Role::QuranTeacher,
			Role::AcademicTeacher,
			Role::Admin,
			Role::Student,
		]
	}

	/// The stored name of the role.
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Supervisor => "supervisor",
			Role::QuranTeacher => "quran_teacher",
			Role::AcademicTeacher => "academic_teacher",
			Role::Admin => "admin",
			Role::Student => "student",
		}
	}

	/// Parses a stored role name. Unknown names yield `None`.
	pub fn parse(value: &str) -> Option<Role> {
		Role::all().iter().copied().find(|r| r.as_str() == value)
	}

	/// The teacher kind this role teaches as, if it is a teacher role.
	pub fn teacher_kind(&self) -> Option<TeacherKind> {
		match self {
			Role::QuranTeacher => Some(TeacherKind::Quran),
			Role::AcademicTeacher => Some(TeacherKind::Academic),
			_ => None,
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The two disjoint kinds of teacher a supervisor can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeacherKind {
	Quran,
	Academic,
}

impl TeacherKind {
	/// Returns both kinds.
	pub fn all() -> &'static [TeacherKind] {
		&[TeacherKind::Quran, TeacherKind::Academic]
	}

	/// The stored discriminator of the kind.
	pub fn as_str(&self) -> &'static str {
		match self {
			TeacherKind::Quran => "quran",
			TeacherKind::Academic => "academic",
		}
	}

	/// Parses a stored discriminator.
	pub fn parse(value: &str) -> Option<TeacherKind> {
		match value {
			"quran" => Some(TeacherKind::Quran),
			"academic" => Some(TeacherKind::Academic),
			_ => None,
		}
	}

	/// The account role every teacher of this kind holds.
	pub fn role(&self) -> Role {
		match self {
			TeacherKind::Quran => Role::QuranTeacher,
			TeacherKind::Academic => Role::AcademicTeacher,
		}
	}
}

impl fmt::Display for TeacherKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// =============================================================================
// Identity
// =============================================================================

/// A user account as seen by one authorization evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
	pub id: ActorId,
	pub role: Role,
	/// Academy the account belongs to. Platform-level accounts have none.
	pub tenant_id: Option<TenantId>,
}

impl Actor {
	pub fn new(id: ActorId, role: Role, tenant_id: Option<TenantId>) -> Self {
		Self {
			id,
			role,
			tenant_id,
		}
	}

	/// Creates a supervisor belonging to the given academy.
	pub fn supervisor(id: ActorId, tenant_id: TenantId) -> Self {
		Self::new(id, Role::Supervisor, Some(tenant_id))
	}

	pub fn is_supervisor(&self) -> bool {
		self.role == Role::Supervisor
	}
}

/// Who is asking, and on behalf of which academy.
///
/// Built by the session layer and passed explicitly into every call; the
/// engine never reads an ambient "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
	pub actor: Actor,
	/// The academy the request is served for.
	pub tenant_id: TenantId,
}

impl IdentityContext {
	pub fn new(actor: Actor, tenant_id: TenantId) -> Self {
		Self { actor, tenant_id }
	}

	/// True when the actor is a supervisor acting inside their own academy.
	pub fn is_supervisor_in_tenant(&self) -> bool {
		self.actor.is_supervisor() && self.actor.tenant_id == Some(self.tenant_id)
	}
}

// =============================================================================
// Profiles
// =============================================================================

/// Supervisor profile with its direct teacher assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorProfile {
	pub actor_id: ActorId,
	pub tenant_id: Option<TenantId>,
	pub department: Option<String>,
	pub can_manage_teachers: bool,
	pub assigned_quran_teacher_ids: BTreeSet<ActorId>,
	pub assigned_academic_teacher_ids: BTreeSet<ActorId>,
}

impl SupervisorProfile {
	/// Creates a profile with no assignments and no management capability.
	pub fn new(actor_id: ActorId) -> Self {
		Self {
			actor_id,
			tenant_id: None,
			department: None,
			can_manage_teachers: false,
			assigned_quran_teacher_ids: BTreeSet::new(),
			assigned_academic_teacher_ids: BTreeSet::new(),
		}
	}

	/// The assignment set for one teacher kind.
	pub fn assigned(&self, kind: TeacherKind) -> &BTreeSet<ActorId> {
		match kind {
			TeacherKind::Quran => &self.assigned_quran_teacher_ids,
			TeacherKind::Academic => &self.assigned_academic_teacher_ids,
		}
	}

	pub fn has_any_assignment(&self) -> bool {
		!self.assigned_quran_teacher_ids.is_empty()
			|| !self.assigned_academic_teacher_ids.is_empty()
	}

	/// Builder: assign a teacher of the given kind.
	pub fn with_teacher(mut self, kind: TeacherKind, actor_id: ActorId) -> Self {
		match kind {
			TeacherKind::Quran => self.assigned_quran_teacher_ids.insert(actor_id),
			TeacherKind::Academic => self.assigned_academic_teacher_ids.insert(actor_id),
		};
		self
	}

	/// Builder: set can_manage_teachers.
	pub fn with_manage_teachers(mut self, enabled: bool) -> Self {
		self.can_manage_teachers = enabled;
		self
	}

	/// Builder: set the academy.
	pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
		self.tenant_id = Some(tenant_id);
		self
	}
}

/// A profile ID tagged with the teacher kind whose profile table it keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ProfileRef {
	Quran(QuranProfileId),
	Academic(AcademicProfileId),
}

impl ProfileRef {
	pub fn kind(&self) -> TeacherKind {
		match self {
			ProfileRef::Quran(_) => TeacherKind::Quran,
			ProfileRef::Academic(_) => TeacherKind::Academic,
		}
	}

	/// The raw profile key if this reference is of the given kind.
	pub fn id_for(&self, kind: TeacherKind) -> Option<i64> {
		match (self, kind) {
			(ProfileRef::Quran(id), TeacherKind::Quran) => Some(id.get()),
			(ProfileRef::Academic(id), TeacherKind::Academic) => Some(id.get()),
			_ => None,
		}
	}

	/// Builds a reference from a stored kind and raw key.
	pub fn from_raw(kind: TeacherKind, id: i64) -> Self {
		match kind {
			TeacherKind::Quran => ProfileRef::Quran(QuranProfileId::new(id)),
			TeacherKind::Academic => ProfileRef::Academic(AcademicProfileId::new(id)),
		}
	}
}

/// A teacher profile, keyed separately from the teacher's actor ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
	pub actor_id: ActorId,
	pub profile: ProfileRef,
	pub tenant_id: Option<TenantId>,
}

impl TeacherProfile {
	pub fn quran(id: QuranProfileId, actor_id: ActorId, tenant_id: TenantId) -> Self {
		Self {
			actor_id,
			profile: ProfileRef::Quran(id),
			tenant_id: Some(tenant_id),
		}
	}

	pub fn academic(id: AcademicProfileId, actor_id: ActorId, tenant_id: TenantId) -> Self {
		Self {
			actor_id,
			profile: ProfileRef::Academic(id),
			tenant_id: Some(tenant_id),
		}
	}
}
