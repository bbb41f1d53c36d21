use axum::{
	extract::State,
	response::{Html, IntoResponse, Response},
};
use chrono::Utc;

use crate::{
	extract::{Context, Form, Path, Query, Session},
	render,
	route::{
		auth::model::User,
		model::{FieldErrors, Validated},
	},
	Database, Error,
};

use super::{model, post_id, Error as PostError};

/// Published posts, most recent first.
pub async fn list_posts(
	State(database): State<Database>,
	context: Context,
) -> Result<Html<String>, Error> {
	let posts = database.list_published(Utc::now()).await?;

	let mut page = render::context(context.current_user());
	page.insert("posts", &posts);

	Ok(render::page("blog/post_list.html", &page)?)
}

pub async fn post_detail(
	State(database): State<Database>,
	context: Context,
	Path(id): Path<i64>,
) -> Result<Html<String>, Error> {
	let post = database
		.find_post(id)
		.await?
		.ok_or(PostError::UnknownPost(id))?;

	let mut page = render::context(context.current_user());
	page.insert("post", &post);

	Ok(render::page("blog/post_detail.html", &page)?)
}

/// Publishes a draft (or republishes a post) as of now.
pub async fn publish_post(
	State(database): State<Database>,
	session: Session,
	Path(id): Path<i64>,
) -> Result<Response, Error> {
	let post = database
		.publish_post(id, Utc::now())
		.await?
		.ok_or(PostError::UnknownPost(id))?;

	tracing::info!(post.id = post.id, user = %session.user, "published post");

	Ok(render::found(&format!("/post/{}/", post.id)))
}

fn create_page(
	user: &User,
	form: &model::PostInput,
	errors: &FieldErrors,
) -> Result<Html<String>, Error> {
	let mut page = render::context(Some(user));
	page.insert("form", form);
	page.insert("errors", errors);

	Ok(render::page("blog/criar.html", &page)?)
}

pub async fn create_post_form(session: Session) -> Result<Html<String>, Error> {
	create_page(
		&session.user,
		&model::PostInput::default(),
		&FieldErrors::default(),
	)
}

pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Form(input): Form<model::PostInput>,
) -> Result<Response, Error> {
	let draft = match model::validate(&input) {
		Validated::Valid(draft) => draft,
		Validated::Invalid(errors) => {
			return Ok(create_page(&session.user, &input, &errors)?.into_response());
		}
	};

	let published_at = draft.published_at(Utc::now());
	let post = database
		.insert_post(model::NewPost {
			author_id: session.user.id,
			title: draft
				.title
				.unwrap_or_else(|| model::DEFAULT_TITLE.to_owned()),
			body: draft.body,
			published_at,
		})
		.await?;

	tracing::info!(
		post.id = post.id,
		user = %session.user,
		draft = published_at.is_none(),
		"created post"
	);

	Ok(render::found("/"))
}

async fn edit_page(
	database: &Database,
	user: &User,
	form: &model::EditPostInput,
	errors: &FieldErrors,
) -> Result<Html<String>, Error> {
	let posts = database.list_posts().await?;

	let mut page = render::context(Some(user));
	page.insert("posts", &posts);
	page.insert("form", form);
	page.insert("errors", errors);

	Ok(render::page("blog/editar.html", &page)?)
}

/// Lists every post; `?post_id=` prefills the form with that post.
pub async fn edit_post_form(
	State(database): State<Database>,
	session: Session,
	Query(query): Query<model::PostIdInput>,
) -> Result<Html<String>, Error> {
	let form = if query.post_id.trim().is_empty() {
		model::EditPostInput::default()
	} else {
		let id = post_id(&query.post_id)?;
		let post = database
			.find_post(id)
			.await?
			.ok_or(PostError::UnknownPost(id))?;

		model::EditPostInput::from_post(&post)
	};

	edit_page(&database, &session.user, &form, &FieldErrors::default()).await
}

pub async fn edit_post(
	State(database): State<Database>,
	session: Session,
	Form(input): Form<model::EditPostInput>,
) -> Result<Response, Error> {
	let id = post_id(&input.post_id)?;
	let post = database
		.find_post(id)
		.await?
		.ok_or(PostError::UnknownPost(id))?;

	let draft = match model::validate(&input.post) {
		Validated::Valid(draft) => draft,
		Validated::Invalid(errors) => {
			return Ok(edit_page(&database, &session.user, &input, &errors)
				.await?
				.into_response());
		}
	};

	let published_at = draft.published_at(Utc::now());
	database
		.update_post(
			id,
			model::PostUpdate {
				title: draft.title.unwrap_or(post.title),
				body: draft.body,
				published_at,
			},
		)
		.await?
		.ok_or(PostError::UnknownPost(id))?;

	tracing::info!(
		post.id = id,
		user = %session.user,
		draft = published_at.is_none(),
		"updated post"
	);

	Ok(render::found("/"))
}

pub async fn delete_post_form(
	State(database): State<Database>,
	session: Session,
) -> Result<Html<String>, Error> {
	let posts = database.list_posts().await?;
	let count = database.count_posts().await?;

	let mut page = render::context(Some(&session.user));
	page.insert("posts", &posts);
	page.insert("count", &count);

	Ok(render::page("blog/deletar.html", &page)?)
}

pub async fn delete_post(
	State(database): State<Database>,
	session: Session,
	Form(input): Form<model::PostIdInput>,
) -> Result<Response, Error> {
	let id = post_id(&input.post_id)?;

	if !database.delete_post(id).await? {
		return Err(PostError::UnknownPost(id).into());
	}

	tracing::info!(post.id = id, user = %session.user, "deleted post");

	Ok(render::found("/deletar/"))
}
