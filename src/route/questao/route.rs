use axum::{
	extract::State,
	response::{Html, IntoResponse, Response},
};

use crate::{
	extract::{Context, Form, Path, Session},
	render,
	route::{
		auth::model::User,
		catalog::model::{Catalog, Tema, Vestibular},
		model::{FieldErrors, Validated},
	},
	Database, Error,
};

use super::{model, Error as QuestaoError};

pub async fn list_questoes(
	State(database): State<Database>,
	context: Context,
) -> Result<Html<String>, Error> {
	let questoes = database.list_questoes().await?;

	let mut page = render::context(context.current_user());
	page.insert("questoes", &questoes);

	Ok(render::page("blog/questao_list.html", &page)?)
}

pub async fn questao_detail(
	State(database): State<Database>,
	context: Context,
	Path(id): Path<i64>,
) -> Result<Html<String>, Error> {
	let questao = database
		.find_questao(id)
		.await?
		.ok_or(QuestaoError::UnknownQuestao(id))?;

	let mut page = render::context(context.current_user());
	page.insert("questao", &questao);

	Ok(render::page("blog/questao_detail.html", &page)?)
}

/// Where a question form is submitted to, and its heading.
struct FormTarget {
	action: String,
	heading: &'static str,
}

impl FormTarget {
	fn create() -> Self {
		Self {
			action: "/questoes/nova/".into(),
			heading: "Nova questão",
		}
	}

	fn edit(id: i64) -> Self {
		Self {
			action: format!("/questoes/{id}/editar/"),
			heading: "Editar questão",
		}
	}
}

/// The rows a question may reference.
struct References {
	vestibulares: Vec<Vestibular>,
	temas: Vec<Tema>,
}

impl References {
	async fn load(database: &Database) -> Result<Self, Error> {
		Ok(Self {
			vestibulares: database.list_entries(Catalog::Vestibular).await?,
			temas: database.list_entries(Catalog::Tema).await?,
		})
	}

	fn validate(&self, input: &model::QuestaoInput) -> Validated<model::QuestaoDraft> {
		model::validate(input, &self.vestibulares, &self.temas)
	}
}

fn form_page(
	user: &User,
	target: &FormTarget,
	references: &References,
	form: &model::QuestaoInput,
	errors: &FieldErrors,
) -> Result<Html<String>, Error> {
	let mut page = render::context(Some(user));
	page.insert("action", &target.action);
	page.insert("heading", target.heading);
	page.insert("form", form);
	page.insert("errors", errors);
	page.insert("vestibulares", &references.vestibulares);
	page.insert("temas", &references.temas);

	Ok(render::page("blog/questao_form.html", &page)?)
}

pub async fn create_questao_form(
	State(database): State<Database>,
	session: Session,
) -> Result<Html<String>, Error> {
	form_page(
		&session.user,
		&FormTarget::create(),
		&References::load(&database).await?,
		&model::QuestaoInput::default(),
		&FieldErrors::default(),
	)
}

pub async fn create_questao(
	State(database): State<Database>,
	session: Session,
	Form(input): Form<model::QuestaoInput>,
) -> Result<Response, Error> {
	let references = References::load(&database).await?;
	let draft = match references.validate(&input) {
		Validated::Valid(draft) => draft,
		Validated::Invalid(errors) => {
			let target = FormTarget::create();
			let page = form_page(&session.user, &target, &references, &input, &errors)?;

			return Ok(page.into_response());
		}
	};

	let questao = match database.insert_questao(draft).await {
		Ok(questao) => questao,
		Err(error) => {
			let errors = model::missing_reference(error)?;
			let references = References::load(&database).await?;
			let target = FormTarget::create();
			let page = form_page(&session.user, &target, &references, &input, &errors)?;

			return Ok(page.into_response());
		}
	};

	tracing::info!(questao.id = questao.id, user = %session.user, "created questao");

	Ok(render::found(&format!("/questoes/{}/", questao.id)))
}

pub async fn edit_questao_form(
	State(database): State<Database>,
	session: Session,
	Path(id): Path<i64>,
) -> Result<Html<String>, Error> {
	let questao = database
		.find_questao(id)
		.await?
		.ok_or(QuestaoError::UnknownQuestao(id))?;

	form_page(
		&session.user,
		&FormTarget::edit(id),
		&References::load(&database).await?,
		&model::QuestaoInput::from_questao(&questao),
		&FieldErrors::default(),
	)
}

pub async fn edit_questao(
	State(database): State<Database>,
	session: Session,
	Path(id): Path<i64>,
	Form(input): Form<model::QuestaoInput>,
) -> Result<Response, Error> {
	if database.find_questao(id).await?.is_none() {
		return Err(QuestaoError::UnknownQuestao(id).into());
	}

	let references = References::load(&database).await?;
	let draft = match references.validate(&input) {
		Validated::Valid(draft) => draft,
		Validated::Invalid(errors) => {
			let target = FormTarget::edit(id);
			let page = form_page(&session.user, &target, &references, &input, &errors)?;

			return Ok(page.into_response());
		}
	};

	match database.update_questao(id, draft).await {
		Ok(Some(_)) => {}
		Ok(None) => return Err(QuestaoError::UnknownQuestao(id).into()),
		Err(error) => {
			let errors = model::missing_reference(error)?;
			let references = References::load(&database).await?;
			let target = FormTarget::edit(id);
			let page = form_page(&session.user, &target, &references, &input, &errors)?;

			return Ok(page.into_response());
		}
	}

	tracing::info!(questao.id = id, user = %session.user, "updated questao");

	Ok(render::found(&format!("/questoes/{id}/")))
}

pub async fn delete_questao(
	State(database): State<Database>,
	session: Session,
	Path(id): Path<i64>,
) -> Result<Response, Error> {
	if !database.delete_questao(id).await? {
		return Err(QuestaoError::UnknownQuestao(id).into());
	}

	tracing::info!(questao.id = id, user = %session.user, "deleted questao");

	Ok(render::found("/questoes/"))
}
