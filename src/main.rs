#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod middleware;
mod ratelimit;
mod render;
mod route;
mod session;
mod store;
#[cfg(test)]
mod test;
mod trace;

use std::{net::SocketAddr, sync::Arc};

use argon2::Argon2;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

pub use error::Error;

use crate::{
	config::Config,
	store::{MemoryStore, PgStore, Store},
};

pub type Database = Arc<dyn Store>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the datastore or a hash configuration (if it's expensive to create).
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub config: Arc<Config>,
}

/// Builds the application router.
///
/// Login attempts are throttled when a `login_limiter` is given, which needs
/// the peer address from `into_make_service_with_connect_info`.
pub fn app(state: State, login_limiter: Option<ratelimit::Limiter>) -> Router {
	Router::new()
		.merge(route::post::routes())
		.merge(route::auth::routes(login_limiter))
		.merge(route::questao::routes())
		.merge(route::catalog::routes())
		.fallback(|| async { Error::NotFound })
		.layer(axum::middleware::from_fn_with_state(
			state.clone(),
			middleware::load_context,
		))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

async fn database(config: &Config) -> Result<Database, store::Error> {
	let Some(url) = &config.database_url else {
		tracing::warn!("DATABASE_URL is not set, data will only be kept in memory");

		return Ok(Arc::new(MemoryStore::default()));
	};

	Ok(Arc::new(PgStore::connect(url).await?))
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = match Config::from_env() {
		Ok(config) => Arc::new(config),
		Err(error) => {
			eprintln!("invalid configuration: {error}");
			std::process::exit(1);
		}
	};

	let _guard = trace::init_tracing_subscriber(&config);

	if let Err(error) = render::templates() {
		tracing::error!(%error, "failed to parse templates");
		std::process::exit(1);
	}

	let database = match database(&config).await {
		Ok(database) => database,
		Err(error) => {
			tracing::error!(%error, "failed to open the database");
			std::process::exit(1);
		}
	};

	let state = State {
		database,
		hasher: Argon2::default(),
		config: config.clone(),
	};

	if let Some(admin) = &config.admin {
		if let Err(error) = route::auth::ensure_user(
			state.database.as_ref(),
			&state.hasher,
			&admin.username,
			&admin.password,
		)
		.await
		{
			tracing::error!(%error, "failed to create the admin account");
			std::process::exit(1);
		}
	}

	let login_limiter = if config.login_rate_limit {
		let limiter = ratelimit::login();

		if let Some(limiter) = &limiter {
			ratelimit::cleanup_old_limits(&[limiter]);
		}

		limiter
	} else {
		None
	};

	let app = app(state, login_limiter);

	let listener = match tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await {
		Ok(listener) => listener,
		Err(error) => {
			tracing::error!(%error, host = %config.host, port = config.port, "failed to bind");
			std::process::exit(1);
		}
	};

	tracing::info!("listening on {}:{}", config.host, config.port);

	if let Err(error) = axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await
	{
		tracing::error!(%error, "server error");
	}
}
