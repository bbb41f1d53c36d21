use axum::{
	body::Body,
	extract::rejection,
	http::{header, Response, StatusCode},
	response::IntoResponse,
};
use tower_governor::GovernorError;

use crate::{
	render,
	route::{auth, catalog, post, questao},
	store,
};

/// Error type for the application.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("post error: {0}")]
	Post(#[from] post::Error),
	#[error("questao error: {0}")]
	Questao(#[from] questao::Error),
	#[error("catalog error: {0}")]
	Catalog(#[from] catalog::Error),
	#[error("auth error: {0}")]
	Auth(#[from] auth::Error),
	#[error("page not found")]
	NotFound,
	#[error("form error: {0}")]
	Form(#[from] rejection::FormRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("store error: {0}")]
	Store(#[from] store::Error),
	#[error("template error: {0}")]
	Template(#[from] tera::Error),
	#[error("rate limit error: {0}")]
	RateLimit(#[from] GovernorError),
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Post(error) => error.status(),
			Self::Questao(error) => error.status(),
			Self::Catalog(error) => error.status(),
			Self::Auth(error) => error.status(),
			Self::NotFound | Self::Path(..) => StatusCode::NOT_FOUND,
			Self::Form(..) | Self::Query(..) => StatusCode::BAD_REQUEST,
			Self::RateLimit(GovernorError::TooManyRequests { .. }) => StatusCode::TOO_MANY_REQUESTS,
			Self::Store(..) | Self::Template(..) | Self::RateLimit(..) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		match self {
			Self::Auth(auth::Error::Unauthenticated { next }) => {
				render::found(&auth::login_url(&next))
			}
			Self::RateLimit(GovernorError::TooManyRequests { wait_time, headers }) => {
				tracing::warn!(wait_time, "rate limited");

				let mut response = (
					status,
					[(header::RETRY_AFTER, wait_time.to_string())],
					"Muitas tentativas. Tente novamente mais tarde.",
				)
					.into_response();

				if let Some(headers) = headers {
					response.headers_mut().extend(headers);
				}

				response
			}
			error if status.is_server_error() => {
				tracing::error!(%error, "request failed");

				render::error_page(status, "Ocorreu um erro inesperado.")
			}
			error => {
				tracing::debug!(%error, %status, "request rejected");

				let message = if status == StatusCode::NOT_FOUND {
					"Página não encontrada."
				} else {
					"Requisição inválida."
				};

				render::error_page(status, message)
			}
		}
	}
}
