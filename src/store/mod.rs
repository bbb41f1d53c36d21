//! Repository interfaces over the datastore.
//!
//! Records are plain values: every read and write is an explicit call on one
//! of these traits. Handlers hold an `Arc<dyn Store>`, which is either a
//! Postgres pool ([`PgStore`]) or an in-process [`MemoryStore`].

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::route::{
	auth::model::User,
	catalog::model::{Catalog, Entry},
	post::model::{NewPost, Post, PostUpdate},
	questao::model::{Questao, QuestaoDraft},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("referenced {0} does not exist")]
	MissingReference(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[axum::async_trait]
pub trait PostStore: Send + Sync {
	/// Posts published at or before `now`, most recently published first.
	async fn list_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>>;
	/// Every post, drafts included, newest first.
	async fn list_posts(&self) -> Result<Vec<Post>>;
	async fn count_posts(&self) -> Result<i64>;
	async fn find_post(&self, id: i64) -> Result<Option<Post>>;
	async fn insert_post(&self, post: NewPost) -> Result<Post>;
	/// Returns `None` when no post has the given id.
	async fn update_post(&self, id: i64, update: PostUpdate) -> Result<Option<Post>>;
	async fn publish_post(&self, id: i64, at: DateTime<Utc>) -> Result<Option<Post>>;
	/// Returns whether a post was deleted.
	async fn delete_post(&self, id: i64) -> Result<bool>;
}

#[axum::async_trait]
pub trait CatalogStore: Send + Sync {
	/// Entries ordered by name.
	async fn list_entries(&self, catalog: Catalog) -> Result<Vec<Entry>>;
	async fn insert_entry(&self, catalog: Catalog, name: &str) -> Result<Entry>;
	/// Deletes the entry and every question referencing it.
	async fn delete_entry(&self, catalog: Catalog, id: i64) -> Result<bool>;
}

#[axum::async_trait]
pub trait QuestaoStore: Send + Sync {
	async fn list_questoes(&self) -> Result<Vec<Questao>>;
	async fn find_questao(&self, id: i64) -> Result<Option<Questao>>;
	async fn insert_questao(&self, draft: QuestaoDraft) -> Result<Questao>;
	async fn update_questao(&self, id: i64, draft: QuestaoDraft) -> Result<Option<Questao>>;
	async fn delete_questao(&self, id: i64) -> Result<bool>;
}

/// Users and their login sessions.
#[axum::async_trait]
pub trait IdentityStore: Send + Sync {
	async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
	async fn insert_user(&self, id: Uuid, username: &str, password: &[u8]) -> Result<User>;
	async fn set_password(&self, id: Uuid, password: &[u8]) -> Result<()>;
	/// Opens a session for the user, returning its id.
	async fn create_session(&self, user_id: Uuid) -> Result<Uuid>;
	/// Returns the user owning the session, if it is still open.
	async fn find_session(&self, id: Uuid) -> Result<Option<User>>;
	async fn delete_session(&self, id: Uuid) -> Result<()>;
}

/// Every repository the handlers need.
pub trait Store: PostStore + CatalogStore + QuestaoStore + IdentityStore {}

impl<T> Store for T where T: PostStore + CatalogStore + QuestaoStore + IdentityStore {}
