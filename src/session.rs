use axum::http::{header, HeaderMap};
use uuid::Uuid;

pub const COOKIE_NAME: &str = "session";

/// Creates a session cookie with no expiry
pub fn create_cookie(session_id: Uuid, secure: bool) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, session_id.to_string()))
		.secure(secure)
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/")
		.into()
}

/// Creates an empty session cookie used to invalidate a previous one
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}

/// Reads the session id from the request cookies.
///
/// A missing or malformed cookie is treated the same as no session.
pub fn from_headers(headers: &HeaderMap) -> Option<Uuid> {
	headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == COOKIE_NAME)
		.and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

#[cfg(test)]
mod test {
	use axum::http::HeaderValue;

	use super::*;

	#[test]
	fn test_session_cookie_round_trip() {
		let id = Uuid::new_v4();
		let mut headers = HeaderMap::new();

		headers.insert(
			header::COOKIE,
			HeaderValue::from_str(&format!("theme=dark; {}", create_cookie(id, false).stripped()))
				.unwrap(),
		);

		assert_eq!(from_headers(&headers), Some(id));
	}

	#[test]
	fn test_malformed_session_cookie() {
		let mut headers = HeaderMap::new();
		headers.insert(header::COOKIE, HeaderValue::from_static("session=not-a-uuid"));

		assert_eq!(from_headers(&headers), None);
		assert_eq!(from_headers(&HeaderMap::new()), None);
	}

	#[test]
	fn test_clear_cookie_expires() {
		let cookie = clear_cookie().to_string();

		assert!(cookie.starts_with("session="));
		assert!(cookie.contains("Max-Age=0"));
	}
}
