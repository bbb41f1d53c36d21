use argon2::Argon2;
use axum::{
	http::{StatusCode, Uri},
	routing::get,
	Router,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tower_governor::GovernorLayer;
use uuid::Uuid;

use crate::{middleware, ratelimit::Limiter, store::IdentityStore, AppState};

pub mod model;
pub mod route;

/// Shown on the login page for any wrong username or password.
pub const INVALID_CREDENTIALS: &str = "Usuário ou Senha inválidas";

/// Where a successful login lands without a usable `next`.
pub const DASHBOARD: &str = "/painel/";

/// Characters escaped in the `next` query parameter. Slashes are kept so the
/// path stays readable.
const NEXT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'/')
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'~');

/// An error that can occur during authentication.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("login required to access {next}")]
	Unauthenticated { next: String },
	#[error("password hashing error: {0}")]
	Argon(#[from] argon2::Error),
}

impl Error {
	/// The request for `uri` needs a logged in user.
	pub fn unauthenticated(uri: &Uri) -> Self {
		Self::Unauthenticated {
			next: uri
				.path_and_query()
				.map_or_else(|| uri.path().to_owned(), ToString::to_string),
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Self::Unauthenticated { .. } => StatusCode::FOUND,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// The login page, returning to `next` afterwards.
pub fn login_url(next: &str) -> String {
	format!("/login/?next={}", utf8_percent_encode(next, NEXT))
}

/// Only local paths are followed after logging in.
///
/// Browsers drop tabs and newlines from URLs, so `/\t/host` would become
/// `//host`. Any control character or whitespace rejects the path.
pub fn safe_next(next: &str) -> &str {
	let local = next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\");
	let printable = !next
		.bytes()
		.any(|b| b.is_ascii_control() || b.is_ascii_whitespace());

	if local && printable {
		next
	} else {
		DASHBOARD
	}
}

pub fn routes(login_limiter: Option<Limiter>) -> Router<AppState> {
	use route::*;

	let submit = match login_limiter {
		Some(config) => axum::routing::post(login).layer(GovernorLayer { config }),
		None => axum::routing::post(login),
	};

	let protected = Router::new()
		.route("/logout/", get(logout))
		.route("/painel/", get(painel))
		.route_layer(axum::middleware::from_fn(middleware::require_login));

	Router::new()
		.route("/login/", get(login_form).merge(submit))
		.merge(protected)
}

/// Makes sure an account with these credentials exists, creating it or
/// resetting its password.
pub async fn ensure_user<D>(
	database: &D,
	hasher: &Argon2<'_>,
	username: &str,
	password: &str,
) -> Result<model::User, crate::Error>
where
	D: IdentityStore + ?Sized,
{
	if let Some(user) = database.find_user_by_username(username).await? {
		let hashed = route::hash_password(hasher, password, &user.id).map_err(Error::Argon)?;
		database.set_password(user.id, &hashed).await?;

		tracing::info!(user = %user, "reset password");

		return Ok(user);
	}

	let id = Uuid::new_v4();
	let hashed = route::hash_password(hasher, password, &id).map_err(Error::Argon)?;
	let user = database.insert_user(id, username, &hashed).await?;

	tracing::info!(user = %user, "created user");

	Ok(user)
}
