//! Shared fixtures for the HTTP tests.
//!
//! Every test gets its own router over a fresh [`MemoryStore`], with one
//! account already registered.

use std::sync::Arc;

use argon2::Argon2;
pub use axum_test::{TestServer, TestServerConfig};
use chrono::Duration;
pub use chrono::{DateTime, Utc};

pub use crate::{
	route::{
		auth::model::User,
		catalog::model::{Catalog, Entry},
		model::{INVALID_CHOICE, INVALID_YEAR, REQUIRED},
		post::model::{NewPost, Post, DEFAULT_TITLE},
		questao::model::{Questao, QuestaoDraft},
	},
	store::{CatalogStore, IdentityStore, MemoryStore, PostStore, QuestaoStore},
};
use crate::{config::Config, route::auth::ensure_user, State};

pub const USERNAME: &str = "ana";
pub const PASSWORD: &str = "hunter2hunter";

/// Application state over a fresh store holding the [`USERNAME`] account.
pub async fn state() -> (Arc<MemoryStore>, State) {
	let store = Arc::new(MemoryStore::default());
	let hasher = Argon2::default();

	ensure_user(&*store, &hasher, USERNAME, PASSWORD)
		.await
		.unwrap();

	let state = State {
		database: store.clone(),
		hasher,
		config: Arc::new(Config::default()),
	};

	(store, state)
}

/// A test server with saved cookies, and direct access to its store.
pub async fn app() -> (Arc<MemoryStore>, TestServer) {
	let (store, state) = state().await;

	let server = TestServer::new_with_config(
		crate::app(state, None),
		TestServerConfig {
			save_cookies: true,
			..TestServerConfig::default()
		},
	)
	.unwrap();

	(store, server)
}

/// Logs in as [`USERNAME`]; the session cookie is kept for later requests.
pub async fn login(app: &TestServer) {
	let response = app
		.post("/login/")
		.form(&[("username", USERNAME), ("password", PASSWORD)])
		.await;

	assert_eq!(response.status_code(), 302);
}

pub async fn author(store: &MemoryStore) -> User {
	store
		.find_user_by_username(USERNAME)
		.await
		.unwrap()
		.unwrap()
}

pub fn hours_ago(hours: i64) -> DateTime<Utc> {
	Utc::now() - Duration::hours(hours)
}

pub async fn publish(
	store: &MemoryStore,
	author: &User,
	title: &str,
	at: DateTime<Utc>,
) -> Post {
	store
		.insert_post(NewPost {
			author_id: author.id,
			title: title.into(),
			body: format!("Texto de {title}"),
			published_at: Some(at),
		})
		.await
		.unwrap()
}

pub async fn draft(store: &MemoryStore, author: &User, title: &str) -> Post {
	store
		.insert_post(NewPost {
			author_id: author.id,
			title: title.into(),
			body: format!("Texto de {title}"),
			published_at: None,
		})
		.await
		.unwrap()
}

/// Registers the vestibular "ENEM" and the tema "Geometria".
pub async fn references(store: &MemoryStore) -> (Entry, Entry) {
	(
		store
			.insert_entry(Catalog::Vestibular, "ENEM")
			.await
			.unwrap(),
		store
			.insert_entry(Catalog::Tema, "Geometria")
			.await
			.unwrap(),
	)
}

pub async fn questao(store: &MemoryStore, vestibular: &Entry, tema: &Entry) -> Questao {
	store
		.insert_questao(QuestaoDraft {
			statement: "Qual a área do quadrado de lado 2?".into(),
			image: None,
			alternatives: "a) 2\nb) 4".into(),
			year: "2019".into(),
			answer: "b".into(),
			vestibular_id: vestibular.id,
			tema_id: tema.id,
		})
		.await
		.unwrap()
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
	let (_, app) = app().await;

	let response = app.get("/nada/").await;

	assert_eq!(response.status_code(), 404);
	assert!(response.text().contains("Página não encontrada."));
}

#[tokio::test]
async fn test_error_page_does_not_offer_login_to_logged_in_users() {
	let (_, app) = app().await;
	login(&app).await;

	let response = app.get("/nada/").await;

	assert_eq!(response.status_code(), 404);
	assert!(!response.text().contains("Entrar"));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
	let (_, app) = app().await;

	let response = app.get("/").await;

	assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_malformed_form_is_bad_request() {
	let (_, app) = app().await;
	login(&app).await;

	let response = app.post("/criar_post/").text("{}").await;

	assert_eq!(response.status_code(), 400);
}
