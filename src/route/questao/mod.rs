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
	#[error("unknown questao {0}")]
	UnknownQuestao(i64),
}

impl Error {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::UnknownQuestao(..) => StatusCode::NOT_FOUND,
		}
	}
}

pub fn routes() -> Router<AppState> {
	use route::*;

	let protected = Router::new()
		.route(
			"/questoes/nova/",
			get(create_questao_form).post(create_questao),
		)
		.route(
			"/questoes/:id/editar/",
			get(edit_questao_form).post(edit_questao),
		)
		.route("/questoes/:id/deletar/", post(delete_questao))
		.route_layer(axum::middleware::from_fn(middleware::require_login));

	Router::new()
		.route("/questoes/", get(list_questoes))
		.route("/questoes/:id/", get(questao_detail))
		.merge(protected)
}

#[cfg(test)]
mod test {
	use crate::test::*;

	fn form<'a>(vestibular: &'a str, tema: &'a str, year: &'a str) -> Vec<(&'a str, &'a str)> {
		vec![
			("statement", "Quanto é 2 + 2?"),
			("image", ""),
			("alternatives", "a) 3\nb) 4"),
			("year", year),
			("answer", "b"),
			("vestibular", vestibular),
			("tema", tema),
		]
	}

	#[tokio::test]
	async fn test_create_questao() {
		let (store, app) = app().await;
		let (vestibular, tema) = references(&store).await;
		login(&app).await;

		let (v, t) = (vestibular.id.to_string(), tema.id.to_string());
		let response = app.post("/questoes/nova/").form(&form(&v, &t, "2019")).await;

		assert_eq!(response.status_code(), 302);

		let questoes = store.list_questoes().await.unwrap();
		assert_eq!(questoes.len(), 1);
		assert_eq!(
			response.header("location"),
			format!("/questoes/{}/", questoes[0].id)
		);
		assert_eq!(questoes[0].vestibular, "ENEM");
		assert_eq!(questoes[0].image, None);

		let response = app.get(&format!("/questoes/{}/", questoes[0].id)).await;
		assert_eq!(response.status_code(), 200);
		assert!(response.text().contains("Geometria"));

		assert!(app.get("/questoes/").await.text().contains("ENEM"));
	}

	#[tokio::test]
	async fn test_create_questao_rejects_invalid_fields() {
		let (store, app) = app().await;
		let (vestibular, _) = references(&store).await;
		login(&app).await;

		let v = vestibular.id.to_string();
		let response = app.post("/questoes/nova/").form(&form(&v, "999", "19")).await;

		assert_eq!(response.status_code(), 200);

		let html = response.text();
		assert!(html.contains(INVALID_CHOICE));
		assert!(html.contains(INVALID_YEAR));
		assert!(store.list_questoes().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_edit_and_delete_questao() {
		let (store, app) = app().await;
		let (vestibular, tema) = references(&store).await;
		login(&app).await;

		let (v, t) = (vestibular.id.to_string(), tema.id.to_string());
		app.post("/questoes/nova/").form(&form(&v, &t, "2019")).await;
		let id = store.list_questoes().await.unwrap()[0].id;

		let response = app.get(&format!("/questoes/{id}/editar/")).await;
		assert_eq!(response.status_code(), 200);

		let response = app
			.post(&format!("/questoes/{id}/editar/"))
			.form(&form(&v, &t, "2020"))
			.await;
		assert_eq!(response.status_code(), 302);
		assert_eq!(store.find_questao(id).await.unwrap().unwrap().year, "2020");

		let response = app.post(&format!("/questoes/{id}/deletar/")).await;
		assert_eq!(response.status_code(), 302);
		assert_eq!(response.header("location"), "/questoes/");
		assert!(store.find_questao(id).await.unwrap().is_none());

		assert_eq!(app.post(&format!("/questoes/{id}/deletar/")).await.status_code(), 404);
		assert_eq!(app.get(&format!("/questoes/{id}/editar/")).await.status_code(), 404);
	}

	#[tokio::test]
	async fn test_vanished_reference_is_a_field_error() {
		let (store, _) = app().await;
		let (vestibular, tema) = references(&store).await;
		store
			.delete_entry(Catalog::Vestibular, vestibular.id)
			.await
			.unwrap();

		let error = store
			.insert_questao(QuestaoDraft {
				statement: "Enunciado".into(),
				image: None,
				alternatives: String::new(),
				year: "2019".into(),
				answer: "a".into(),
				vestibular_id: vestibular.id,
				tema_id: tema.id,
			})
			.await
			.unwrap_err();

		let errors = super::model::missing_reference(error).unwrap();

		assert_eq!(errors.get("vestibular"), Some(&[INVALID_CHOICE.to_string()][..]));
		assert!(store.list_questoes().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_questoes_are_public_but_changes_are_not() {
		let (_, app) = app().await;

		assert_eq!(app.get("/questoes/").await.status_code(), 200);
		assert_eq!(app.get("/questoes/1/").await.status_code(), 404);

		let response = app.get("/questoes/nova/").await;
		assert_eq!(response.status_code(), 302);
		assert_eq!(response.header("location"), "/login/?next=/questoes/nova/");
	}
}
