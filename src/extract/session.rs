use axum::{extract::FromRequestParts, http::request};
use uuid::Uuid;

use crate::{error::Error, route::auth};

/// An open login session and the user it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
	pub id: Uuid,
	pub user: auth::model::User,
}

/// What a request knows about who is making it.
///
/// Resolved once per request from the session cookie by
/// [`crate::middleware::load_context`] and stored in the request extensions.
/// Anonymous requests carry an empty context.
#[derive(Debug, Clone, Default)]
pub struct Context {
	session: Option<Session>,
}

impl Context {
	pub fn new(session: Option<Session>) -> Self {
		Self { session }
	}

	pub fn current_user(&self) -> Option<&auth::model::User> {
		self.session.as_ref().map(|session| &session.user)
	}

	pub fn session(&self) -> Option<&Session> {
		self.session.as_ref()
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Context
where
	S: Send + Sync,
{
	type Rejection = std::convert::Infallible;

	async fn from_request_parts(
		parts: &mut request::Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
	}
}

/// Extracts the session of the logged in user.
///
/// If there is none, a [`auth::Error::Unauthenticated`] is returned, which
/// redirects to the login page and back to this path afterwards.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		parts
			.extensions
			.get::<Context>()
			.and_then(Context::session)
			.cloned()
			.ok_or_else(|| auth::Error::unauthenticated(&parts.uri).into())
	}
}
