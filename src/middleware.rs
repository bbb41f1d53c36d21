use axum::{
	extract::{Request, State},
	middleware::Next,
	response::{IntoResponse, Response},
};

use crate::{
	extract::{Context, Session},
	route::auth,
	session,
	Database, Error,
};

/// Resolves the session cookie into a [`Context`] for the rest of the
/// request. Unknown or closed sessions are treated as anonymous.
pub async fn load_context(
	State(database): State<Database>,
	mut request: Request,
	next: Next,
) -> Result<Response, Error> {
	let session = match session::from_headers(request.headers()) {
		Some(id) => database
			.find_session(id)
			.await?
			.map(|user| Session { id, user }),
		None => None,
	};

	request.extensions_mut().insert(Context::new(session));

	Ok(next.run(request).await)
}

/// Redirects anonymous requests to the login page.
pub async fn require_login(context: Context, request: Request, next: Next) -> Response {
	if context.session().is_some() {
		return next.run(request).await;
	}

	tracing::debug!(uri = %request.uri(), "login required");

	Error::from(auth::Error::unauthenticated(request.uri())).into_response()
}
