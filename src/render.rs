//! Server-side HTML rendering.
//!
//! Templates are compiled into the binary and parsed once, on first use.

use std::{collections::HashMap, sync::OnceLock};

use axum::{
	body::Body,
	http::{header, Response, StatusCode},
	response::{Html, IntoResponse},
};
use tera::{Tera, Value};

use crate::route::{auth::model::User, post::model::rich_text};

static TEMPLATES: OnceLock<Tera> = OnceLock::new();

const SOURCES: &[(&str, &str)] = &[
	("blog/base.html", include_str!("../templates/blog/base.html")),
	("blog/error.html", include_str!("../templates/blog/error.html")),
	("blog/post_list.html", include_str!("../templates/blog/post_list.html")),
	("blog/post_detail.html", include_str!("../templates/blog/post_detail.html")),
	("blog/login.html", include_str!("../templates/blog/login.html")),
	("blog/painel.html", include_str!("../templates/blog/painel.html")),
	("blog/criar.html", include_str!("../templates/blog/criar.html")),
	("blog/editar.html", include_str!("../templates/blog/editar.html")),
	("blog/deletar.html", include_str!("../templates/blog/deletar.html")),
	("blog/questao_list.html", include_str!("../templates/blog/questao_list.html")),
	("blog/questao_detail.html", include_str!("../templates/blog/questao_detail.html")),
	("blog/questao_form.html", include_str!("../templates/blog/questao_form.html")),
	("blog/catalog.html", include_str!("../templates/blog/catalog.html")),
];

/// Tera filter rendering a post body, see [`rich_text`].
///
/// The result is sanitized HTML: formatting tags survive, scripts, event
/// handlers and anything else outside the allow-list are removed, and plain
/// text is escaped. Templates mark it `safe`.
fn rich_text_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
	let body = tera::try_get_value!("rich_text", "value", String, value);

	Ok(Value::String(ammonia::clean(&rich_text(&body))))
}

fn build() -> Result<Tera, tera::Error> {
	let mut tera = Tera::default();

	tera.add_raw_templates(SOURCES.iter().copied())?;
	tera.register_filter("rich_text", rich_text_filter);

	Ok(tera)
}

/// Returns the parsed templates, parsing them on the first call.
pub fn templates() -> Result<&'static Tera, tera::Error> {
	if let Some(tera) = TEMPLATES.get() {
		return Ok(tera);
	}

	let tera = build()?;

	Ok(TEMPLATES.get_or_init(|| tera))
}

/// Creates a template context holding the logged in user, if any.
pub fn context(user: Option<&User>) -> tera::Context {
	let mut context = tera::Context::new();
	context.insert("user", &user);
	context
}

/// Renders the named template.
pub fn page(name: &str, context: &tera::Context) -> Result<Html<String>, tera::Error> {
	Ok(Html(templates()?.render(name, context)?))
}

/// A `302 Found` redirect.
pub fn found(location: &str) -> Response<Body> {
	(StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}

/// Renders the error page, falling back to plain text if the templates are
/// unusable.
pub fn error_page(status: StatusCode, message: &str) -> Response<Body> {
	let mut context = context(None);
	context.insert("status", &status.as_u16());
	context.insert("message", message);

	match page("blog/error.html", &context) {
		Ok(html) => (status, html).into_response(),
		Err(error) => {
			tracing::error!(%error, "failed to render error page");

			(status, message.to_owned()).into_response()
		}
	}
}
