use axum::{
	http::StatusCode,
	routing::{get, post},
	Extension, Router,
};

use crate::{middleware, AppState};

use self::model::Catalog;

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown vestibular {0}")]
	UnknownVestibular(i64),
	#[error("unknown tema {0}")]
	UnknownTema(i64),
}

impl Error {
	pub fn unknown(catalog: Catalog, id: i64) -> Self {
		match catalog {
			Catalog::Vestibular => Self::UnknownVestibular(id),
			Catalog::Tema => Self::UnknownTema(id),
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Self::UnknownVestibular(..) | Self::UnknownTema(..) => StatusCode::NOT_FOUND,
		}
	}
}

/// Management pages of a single catalog, e.g. `/temas/`.
fn catalog_routes(catalog: Catalog) -> Router<AppState> {
	use route::*;

	let path = catalog.path();

	Router::new()
		.route(path, get(list_entries).post(create_entry))
		.route(&format!("{path}:id/deletar/"), post(delete_entry))
		.layer(Extension(catalog))
}

pub fn routes() -> Router<AppState> {
	Router::new()
		.merge(catalog_routes(Catalog::Vestibular))
		.merge(catalog_routes(Catalog::Tema))
		.route_layer(axum::middleware::from_fn(middleware::require_login))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_create_and_list_entries() {
		let (store, app) = app().await;
		login(&app).await;

		let response = app.post("/vestibulares/").form(&[("name", " FUVEST ")]).await;

		assert_eq!(response.status_code(), 302);
		assert_eq!(response.header("location"), "/vestibulares/");

		let entries = store.list_entries(Catalog::Vestibular).await.unwrap();
		assert_eq!(entries.len(), 1);
		assert_eq!(entries[0].name, "FUVEST");
		assert!(store.list_entries(Catalog::Tema).await.unwrap().is_empty());

		let response = app.get("/vestibulares/").await;
		assert_eq!(response.status_code(), 200);
		assert!(response.text().contains("FUVEST"));
	}

	#[tokio::test]
	async fn test_create_entry_rejects_blank_name() {
		let (store, app) = app().await;
		login(&app).await;

		let response = app.post("/temas/").form(&[("name", "")]).await;

		assert_eq!(response.status_code(), 200);
		assert!(response.text().contains(REQUIRED));
		assert!(store.list_entries(Catalog::Tema).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_deleting_vestibular_removes_its_questoes() {
		let (store, app) = app().await;
		let (vestibular, tema) = references(&store).await;
		questao(&store, &vestibular, &tema).await;
		login(&app).await;

		let response = app
			.post(&format!("/vestibulares/{}/deletar/", vestibular.id))
			.await;

		assert_eq!(response.status_code(), 302);
		assert_eq!(response.header("location"), "/vestibulares/");
		assert!(store.list_questoes().await.unwrap().is_empty());
		assert_eq!(store.list_entries(Catalog::Tema).await.unwrap().len(), 1);

		let response = app
			.post(&format!("/vestibulares/{}/deletar/", vestibular.id))
			.await;
		assert_eq!(response.status_code(), 404);
	}

	#[tokio::test]
	async fn test_catalogs_require_login() {
		let (_, app) = app().await;

		let response = app.get("/temas/").await;

		assert_eq!(response.status_code(), 302);
		assert_eq!(response.header("location"), "/login/?next=/temas/");
	}
}
