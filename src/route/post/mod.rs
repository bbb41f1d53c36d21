use axum::{
	http::StatusCode,
	routing::{get, post},
	Router,
};

use crate::{middleware, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("invalid post id {0:?}")]
	InvalidPostId(String),
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::InvalidPostId(..) => StatusCode::NOT_FOUND,
		}
	}
}

/// Resolves a submitted `post_id` field.
fn post_id(raw: &str) -> Result<i64, Error> {
	crate::route::model::parse_id(raw).ok_or_else(|| Error::InvalidPostId(raw.to_owned()))
}

pub fn routes() -> Router<AppState> {
	use route::*;

	let protected = Router::new()
		.route("/post/:id/publicar/", post(publish_post))
		.route("/criar_post/", get(create_post_form).post(create_post))
		.route("/editar/", get(edit_post_form).post(edit_post))
		.route("/deletar/", get(delete_post_form).post(delete_post))
		.route_layer(axum::middleware::from_fn(middleware::require_login));

	Router::new()
		.route("/", get(list_posts))
		.route("/post/:id/", get(post_detail))
		.merge(protected)
}
