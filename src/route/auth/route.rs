use argon2::Argon2;
use axum::{
	extract::State,
	http::header,
	response::{Html, IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
	extract::{Context, Form, Query, Session},
	render,
	session,
	AppState, Database, Error,
};

use super::{model, safe_next, Error as AuthError, INVALID_CREDENTIALS};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
pub fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

fn login_page(
	context: &Context,
	username: &str,
	next: &str,
	error: Option<&str>,
) -> Result<Html<String>, Error> {
	let mut page = render::context(context.current_user());
	page.insert("username", username);
	page.insert("next", next);
	page.insert("error", &error);

	Ok(render::page("blog/login.html", &page)?)
}

pub async fn login_form(
	context: Context,
	Query(input): Query<model::NextInput>,
) -> Result<Html<String>, Error> {
	login_page(&context, "", &input.next, None)
}

/// Checks the credentials and opens a session.
///
/// A wrong username or password renders the form again with the same
/// message, so the two cannot be told apart.
pub async fn login(
	State(state): State<AppState>,
	context: Context,
	Form(input): Form<model::LoginInput>,
) -> Result<Response, Error> {
	let user = state
		.database
		.find_user_by_username(input.username.trim())
		.await?;

	let user = match user {
		Some(user) => {
			let hashed = hash_password(&state.hasher, &input.password, &user.id)
				.map_err(AuthError::Argon)?;

			(user.password == hashed).then_some(user)
		}
		None => None,
	};

	let Some(user) = user else {
		tracing::info!(username = %input.username, "failed login");

		return Ok(login_page(
			&context,
			&input.username,
			&input.next,
			Some(INVALID_CREDENTIALS),
		)?
		.into_response());
	};

	let session = state.database.create_session(user.id).await?;
	let cookie = session::create_cookie(session, state.config.secure_cookies);

	tracing::info!(user = %user, "logged in");

	Ok((
		[(header::SET_COOKIE, cookie.to_string())],
		render::found(safe_next(&input.next)),
	)
		.into_response())
}

/// Closes the session and clears its cookie.
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<Response, Error> {
	database.delete_session(session.id).await?;

	tracing::info!(user = %session.user, "logged out");

	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		render::found("/login/"),
	)
		.into_response())
}

pub async fn painel(session: Session) -> Result<Html<String>, Error> {
	let page = render::context(Some(&session.user));

	Ok(render::page("blog/painel.html", &page)?)
}
