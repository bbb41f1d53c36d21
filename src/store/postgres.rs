use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{CatalogStore, Error, IdentityStore, PostStore, QuestaoStore, Result};
use crate::route::{
	auth::model::User,
	catalog::model::{Catalog, Entry},
	post::model::{NewPost, Post, PostUpdate},
	questao::model::{Questao, QuestaoDraft},
};

/// Selects the columns of [`Post`] from a row source aliased as `post`.
const POST_COLUMNS: &str = r#"
	post.id, post.author_id, "user".username AS author, post.title, post.body,
	post.created_at, post.published_at
"#;

const QUESTAO_COLUMNS: &str = r"
	questao.id, questao.statement, questao.image, questao.alternatives,
	questao.year, questao.answer, questao.vestibular_id,
	vestibular.name AS vestibular, questao.tema_id, tema.name AS tema
";

/// The Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
	pool: PgPool,
}

impl PgStore {
	/// Connects to the database and brings its schema up to date.
	pub async fn connect(url: &str) -> Result<Self> {
		let pool = PgPool::connect(url).await?;

		Self::migrate(pool).await
	}

	pub async fn migrate(pool: PgPool) -> Result<Self> {
		sqlx::migrate!().run(&pool).await?;

		Ok(Self { pool })
	}

	/// Reads a post back with the author's username.
	async fn fetch_post(
		&self,
		source: &str,
		bind: impl FnOnce(PostQuery<'_>) -> PostQuery<'_>,
	) -> Result<Option<Post>> {
		let sql = format!(
			r#"
				WITH post AS ({source})
				SELECT {POST_COLUMNS} FROM post
				JOIN "user" ON "user".id = post.author_id
			"#
		);

		Ok(bind(sqlx::query_as(&sql)).fetch_optional(&self.pool).await?)
	}

	async fn fetch_questao(
		&self,
		source: &str,
		bind: impl FnOnce(QuestaoQuery<'_>) -> QuestaoQuery<'_>,
	) -> Result<Option<Questao>> {
		let sql = format!(
			r"
				WITH questao AS ({source})
				SELECT {QUESTAO_COLUMNS} FROM questao
				JOIN vestibular ON vestibular.id = questao.vestibular_id
				JOIN tema ON tema.id = questao.tema_id
			"
		);

		Ok(bind(sqlx::query_as(&sql))
			.fetch_optional(&self.pool)
			.await
			.map_err(missing_reference)?)
	}
}

type PostQuery<'q> = sqlx::query::QueryAs<'q, sqlx::Postgres, Post, sqlx::postgres::PgArguments>;
type QuestaoQuery<'q> =
	sqlx::query::QueryAs<'q, sqlx::Postgres, Questao, sqlx::postgres::PgArguments>;

/// Maps foreign key violations to [`Error::MissingReference`].
fn missing_reference(error: sqlx::Error) -> Error {
	if let sqlx::Error::Database(ref database) = error {
		match database.constraint() {
			Some("post_author_id_fkey") => return Error::MissingReference("user"),
			Some("questao_vestibular_id_fkey") => return Error::MissingReference("vestibular"),
			Some("questao_tema_id_fkey") => return Error::MissingReference("tema"),
			_ => {}
		}
	}

	Error::Database(error)
}

#[axum::async_trait]
impl PostStore for PgStore {
	async fn list_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>> {
		let sql = format!(
			r#"
				SELECT {POST_COLUMNS} FROM post
				JOIN "user" ON "user".id = post.author_id
				WHERE post.published_at <= $1
				ORDER BY post.published_at DESC, post.id DESC
			"#
		);

		Ok(sqlx::query_as(&sql).bind(now).fetch_all(&self.pool).await?)
	}

	async fn list_posts(&self) -> Result<Vec<Post>> {
		let sql = format!(
			r#"
				SELECT {POST_COLUMNS} FROM post
				JOIN "user" ON "user".id = post.author_id
				ORDER BY post.id DESC
			"#
		);

		Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
	}

	async fn count_posts(&self) -> Result<i64> {
		Ok(sqlx::query_scalar("SELECT COUNT(*) FROM post")
			.fetch_one(&self.pool)
			.await?)
	}

	async fn find_post(&self, id: i64) -> Result<Option<Post>> {
		self.fetch_post("SELECT * FROM post WHERE id = $1", |query| query.bind(id))
			.await
	}

	async fn insert_post(&self, post: NewPost) -> Result<Post> {
		self.fetch_post(
			r"
				INSERT INTO post (author_id, title, body, published_at)
				VALUES ($1, $2, $3, $4)
				RETURNING *
			",
			|query| {
				query
					.bind(post.author_id)
					.bind(post.title)
					.bind(post.body)
					.bind(post.published_at)
			},
		)
		.await
		.map_err(|error| match error {
			Error::Database(error) => missing_reference(error),
			error => error,
		})?
		.ok_or(Error::MissingReference("user"))
	}

	async fn update_post(&self, id: i64, update: PostUpdate) -> Result<Option<Post>> {
		self.fetch_post(
			r"
				UPDATE post
				SET title = $1, body = $2, published_at = $3
				WHERE id = $4
				RETURNING *
			",
			|query| {
				query
					.bind(update.title)
					.bind(update.body)
					.bind(update.published_at)
					.bind(id)
			},
		)
		.await
	}

	async fn publish_post(&self, id: i64, at: DateTime<Utc>) -> Result<Option<Post>> {
		self.fetch_post(
			"UPDATE post SET published_at = $1 WHERE id = $2 RETURNING *",
			|query| query.bind(at).bind(id),
		)
		.await
	}

	async fn delete_post(&self, id: i64) -> Result<bool> {
		let status = sqlx::query("DELETE FROM post WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(status.rows_affected() > 0)
	}
}

#[axum::async_trait]
impl CatalogStore for PgStore {
	async fn list_entries(&self, catalog: Catalog) -> Result<Vec<Entry>> {
		let sql = format!("SELECT id, name FROM {} ORDER BY name, id", catalog.table());

		Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
	}

	async fn insert_entry(&self, catalog: Catalog, name: &str) -> Result<Entry> {
		let sql = format!(
			"INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
			catalog.table()
		);

		Ok(sqlx::query_as(&sql).bind(name).fetch_one(&self.pool).await?)
	}

	async fn delete_entry(&self, catalog: Catalog, id: i64) -> Result<bool> {
		let sql = format!("DELETE FROM {} WHERE id = $1", catalog.table());
		let status = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

		Ok(status.rows_affected() > 0)
	}
}

#[axum::async_trait]
impl QuestaoStore for PgStore {
	async fn list_questoes(&self) -> Result<Vec<Questao>> {
		let sql = format!(
			r"
				SELECT {QUESTAO_COLUMNS} FROM questao
				JOIN vestibular ON vestibular.id = questao.vestibular_id
				JOIN tema ON tema.id = questao.tema_id
				ORDER BY questao.id
			"
		);

		Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
	}

	async fn find_questao(&self, id: i64) -> Result<Option<Questao>> {
		self.fetch_questao("SELECT * FROM questao WHERE id = $1", |query| query.bind(id))
			.await
	}

	async fn insert_questao(&self, draft: QuestaoDraft) -> Result<Questao> {
		self.fetch_questao(
			r"
				INSERT INTO questao
					(statement, image, alternatives, year, answer, vestibular_id, tema_id)
				VALUES ($1, $2, $3, $4, $5, $6, $7)
				RETURNING *
			",
			|query| bind_questao(query, draft),
		)
		.await?
		.ok_or(Error::MissingReference("vestibular"))
	}

	async fn update_questao(&self, id: i64, draft: QuestaoDraft) -> Result<Option<Questao>> {
		self.fetch_questao(
			r"
				UPDATE questao
				SET statement = $1, image = $2, alternatives = $3, year = $4,
					answer = $5, vestibular_id = $6, tema_id = $7
				WHERE id = $8
				RETURNING *
			",
			|query| bind_questao(query, draft).bind(id),
		)
		.await
	}

	async fn delete_questao(&self, id: i64) -> Result<bool> {
		let status = sqlx::query("DELETE FROM questao WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(status.rows_affected() > 0)
	}
}

fn bind_questao(query: QuestaoQuery<'_>, draft: QuestaoDraft) -> QuestaoQuery<'_> {
	query
		.bind(draft.statement)
		.bind(draft.image)
		.bind(draft.alternatives)
		.bind(draft.year)
		.bind(draft.answer)
		.bind(draft.vestibular_id)
		.bind(draft.tema_id)
}

#[axum::async_trait]
impl IdentityStore for PgStore {
	async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
		Ok(sqlx::query_as(r#"SELECT * FROM "user" WHERE username = $1"#)
			.bind(username)
			.fetch_optional(&self.pool)
			.await?)
	}

	async fn insert_user(&self, id: Uuid, username: &str, password: &[u8]) -> Result<User> {
		Ok(sqlx::query_as(
			r#"
				INSERT INTO "user" (id, username, password) VALUES ($1, $2, $3)
				RETURNING *
			"#,
		)
		.bind(id)
		.bind(username)
		.bind(password)
		.fetch_one(&self.pool)
		.await?)
	}

	async fn set_password(&self, id: Uuid, password: &[u8]) -> Result<()> {
		sqlx::query(r#"UPDATE "user" SET password = $1 WHERE id = $2"#)
			.bind(password)
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(())
	}

	async fn create_session(&self, user_id: Uuid) -> Result<Uuid> {
		Ok(
			sqlx::query_scalar("INSERT INTO session (user_id) VALUES ($1) RETURNING id")
				.bind(user_id)
				.fetch_one(&self.pool)
				.await?,
		)
	}

	async fn find_session(&self, id: Uuid) -> Result<Option<User>> {
		Ok(sqlx::query_as(
			r#"
				SELECT * FROM "user" WHERE id = (
					SELECT user_id FROM session WHERE id = $1
				)
			"#,
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?)
	}

	async fn delete_session(&self, id: Uuid) -> Result<()> {
		sqlx::query("DELETE FROM session WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(())
	}
}
