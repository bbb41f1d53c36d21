use axum::{
	extract::State,
	response::{Html, IntoResponse, Response},
	Extension,
};

use crate::{
	extract::{Form, Path, Session},
	render,
	route::{
		auth::model::User,
		model::{FieldErrors, Validated},
	},
	Database, Error,
};

use super::{
	model::{self, Catalog},
	Error as CatalogError,
};

async fn catalog_page(
	database: &Database,
	user: &User,
	catalog: Catalog,
	form: &model::EntryInput,
	errors: &FieldErrors,
) -> Result<Html<String>, Error> {
	let entries = database.list_entries(catalog).await?;

	let mut page = render::context(Some(user));
	page.insert("title", catalog.title());
	page.insert("path", catalog.path());
	page.insert("entries", &entries);
	page.insert("form", form);
	page.insert("errors", errors);

	Ok(render::page("blog/catalog.html", &page)?)
}

pub async fn list_entries(
	State(database): State<Database>,
	Extension(catalog): Extension<Catalog>,
	session: Session,
) -> Result<Html<String>, Error> {
	catalog_page(
		&database,
		&session.user,
		catalog,
		&model::EntryInput::default(),
		&FieldErrors::default(),
	)
	.await
}

pub async fn create_entry(
	State(database): State<Database>,
	Extension(catalog): Extension<Catalog>,
	session: Session,
	Form(input): Form<model::EntryInput>,
) -> Result<Response, Error> {
	let name = match model::validate(&input) {
		Validated::Valid(name) => name,
		Validated::Invalid(errors) => {
			return Ok(catalog_page(&database, &session.user, catalog, &input, &errors)
				.await?
				.into_response());
		}
	};

	let entry = database.insert_entry(catalog, &name).await?;

	tracing::info!(%catalog, entry.id = entry.id, user = %session.user, "created entry");

	Ok(render::found(catalog.path()))
}

/// Deletes the entry along with every question classified by it.
pub async fn delete_entry(
	State(database): State<Database>,
	Extension(catalog): Extension<Catalog>,
	session: Session,
	Path(id): Path<i64>,
) -> Result<Response, Error> {
	if !database.delete_entry(catalog, id).await? {
		return Err(CatalogError::unknown(catalog, id).into());
	}

	tracing::info!(%catalog, entry.id = id, user = %session.user, "deleted entry");

	Ok(render::found(catalog.path()))
}
