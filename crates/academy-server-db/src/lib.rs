// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite data layer for supervisor authorization.
//!
//! This crate provides:
//! - Repositories implementing the lookup traits of `academy-server-authz`
//!   ([`SupervisorRepository`], [`TeacherRepository`], [`RecordRepository`])
//! - Compilation of scope predicates into SQL ([`ScopeRepository`])
//! - Pool setup ([`create_pool`])
//!
//! # Example
//!
//! ```ignore
//! let pool = create_pool("sqlite:academy.db").await?;
//! let gate = AuthorizationGate::new(
//! 	Arc::new(PolicyRegistry::standard()?),
//! 	Arc::new(SupervisorRepository::new(pool.clone())),
//! 	Arc::new(TeacherRepository::new(pool.clone())),
//! 	Arc::new(RecordRepository::new(pool.clone())),
//! );
//! let scope = gate.build_scope(ResourceType::QuranCircle, supervisor_id, tenant_id).await?;
//! let ids = ScopeRepository::new(pool).list_ids(ResourceType::QuranCircle, &scope).await?;
//! ```

pub mod actor;
pub mod error;
pub mod pool;
pub mod record;
pub mod schema;
pub mod scope;
pub mod supervisor;
pub mod teacher;

#[cfg(test)]
pub mod testing;

pub use actor::ActorRepository;
pub use error::{DbError, Result};
pub use pool::create_pool;
pub use record::RecordRepository;
pub use schema::{table_spec, TableSpec};
pub use scope::{to_sql, ScopeRepository};
pub use supervisor::SupervisorRepository;
pub use teacher::TeacherRepository;
