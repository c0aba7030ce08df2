// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `academy-authz`: inspect supervisor authorization against a live database.

use std::path::PathBuf;
use std::sync::Arc;

use academy_server_authz::{
	ActorId, AuthorizationGate, Outcome, PolicyRegistry, RecordId, ResourceType, ResourceTypePolicy,
	TenantId, TenantReach,
};
use academy_server_config::ServerConfig;
use academy_server_db::{
	ActorRepository, RecordRepository, ScopeRepository, SupervisorRepository, TeacherRepository,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Supervisor authorization inspector.
#[derive(Parser, Debug)]
#[command(name = "academy-authz", about = "Inspect supervisor authorization decisions", version)]
struct Args {
	/// Config file; defaults to /etc/academy/server.toml
	#[arg(long, global = true, env = "ACADEMY_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print a supervisor's derived identifier set
	Resolve {
		#[arg(long)]
		supervisor: i64,
	},
	/// Print the list scope of one resource type and the rows it admits
	Scope {
		#[arg(long)]
		supervisor: i64,
		#[arg(long)]
		tenant: i64,
		#[arg(long)]
		resource: ResourceType,
	},
	/// Decide view/edit/delete/create for a type or one record
	Authorize {
		#[arg(long)]
		actor: i64,
		#[arg(long)]
		tenant: i64,
		#[arg(long)]
		resource: ResourceType,
		#[arg(long)]
		record: Option<i64>,
	},
	/// Print the registered policy table
	Policies,
	/// Show version information
	Version,
}

#[derive(Serialize)]
struct ScopeReport<'a> {
	resource_type: ResourceType,
	predicate: &'a academy_server_authz::Predicate,
	sql: String,
	ids: Vec<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("academy-authz {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	let config = match &args.config {
		Some(path) => academy_server_config::load_config_with_file(path.clone()),
		None => academy_server_config::load_config(),
	}
	.context("failed to load configuration")?;

	init_tracing(&config);

	let registry = PolicyRegistry::standard_for(&config.authz.enabled_resource_types)
		.context("failed to build policy registry")?;

	if let Command::Policies = args.command {
		print!("{}", render_policies(&registry));
		return Ok(());
	}

	tracing::debug!(database = %config.database.url, "connecting");
	let pool = academy_server_db::create_pool(&config.database.url).await?;
	let gate = AuthorizationGate::new(
		Arc::new(registry),
		Arc::new(SupervisorRepository::new(pool.clone())),
		Arc::new(TeacherRepository::new(pool.clone())),
		Arc::new(RecordRepository::new(pool.clone())),
	)
	.with_decision_logging(config.authz.log_decisions);

	match args.command {
		Command::Resolve { supervisor } => {
			let derived = gate.resolve_identifiers(ActorId::new(supervisor)).await?;
			print_json(&derived)?;
		}
		Command::Scope {
			supervisor,
			tenant,
			resource,
		} => {
			let predicate = gate
				.build_scope(resource, ActorId::new(supervisor), TenantId::new(tenant))
				.await?;
			let ids = ScopeRepository::new(pool.clone()).list_ids(resource, &predicate).await?;
			print_json(&ScopeReport {
				resource_type: resource,
				predicate: &predicate,
				sql: academy_server_db::to_sql(resource, &predicate),
				ids: ids.into_iter().map(RecordId::get).collect(),
			})?;
		}
		Command::Authorize {
			actor,
			tenant,
			resource,
			record,
		} => {
			let ctx = ActorRepository::new(pool.clone())
				.identity(ActorId::new(actor), TenantId::new(tenant))
				.await?;
			let record = match record {
				Some(id) => Some(
					RecordRepository::new(pool.clone())
						.get_record(resource, RecordId::new(id))
						.await?
						.with_context(|| format!("{resource} {id} not found"))?,
				),
				None => None,
			};

			let outcome = gate.authorize_fail_closed(ctx, resource, record.as_ref()).await?;
			print_json(&outcome.decision())?;
			if let Outcome::Unavailable(e) = outcome {
				return Err(anyhow::Error::new(e).context("authorization unavailable"));
			}
		}
		Command::Policies | Command::Version => {}
	}

	Ok(())
}

fn init_tracing(config: &ServerConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let json = config.logging.json;

	tracing_subscriber::registry()
		.with(filter)
		.with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
		.with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
		.init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

fn tenant_label(reach: TenantReach) -> String {
	match reach {
		TenantReach::Column => "column".to_string(),
		TenantReach::Via(relation) => format!("via {relation}"),
		TenantReach::Polymorphic => "polymorphic".to_string(),
	}
}

fn flags(policy: &ResourceTypePolicy) -> String {
	let mut flags = Vec::new();
	if !policy.enabled {
		flags.push("disabled".to_string());
	}
	if policy.read_only {
		flags.push("read-only".to_string());
	}
	if policy.allows_create {
		flags.push("create".to_string());
	}
	if policy.teacher_management {
		flags.push("manage".to_string());
	}
	if !policy.editable_statuses.is_empty() {
		flags.push(format!("edit-in={}", policy.editable_statuses.join("|")));
	}
	flags.join(",")
}

fn render_policies(registry: &PolicyRegistry) -> String {
	let mut out = format!("{:<30} {:<24} {:<10} {}\n", "RESOURCE", "TENANT", "OWNERS", "FLAGS");
	for policy in registry.iter() {
		out.push_str(&format!(
			"{:<30} {:<24} {:<10} {}\n",
			policy.resource_type.as_str(),
			tenant_label(policy.tenant),
			policy.candidates.len(),
			flags(policy)
		));
	}
	out
}
