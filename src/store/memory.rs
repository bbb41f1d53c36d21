use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, Error, IdentityStore, PostStore, QuestaoStore, Result};
use crate::route::{
	auth::model::User,
	catalog::model::{Catalog, Entry},
	post::model::{NewPost, Post, PostUpdate},
	questao::model::{Questao, QuestaoDraft},
};

/// A store that keeps every table in process memory.
///
/// Used when no database is configured, and by the HTTP tests. Rows follow
/// the same rules as the Postgres schema: ids come from one sequence,
/// references must exist and deletes cascade.
#[derive(Debug, Default)]
pub struct MemoryStore {
	tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
	sequence: i64,
	users: Vec<User>,
	/// Session id to user id.
	sessions: HashMap<Uuid, Uuid>,
	posts: Vec<Post>,
	vestibulares: Vec<Entry>,
	temas: Vec<Entry>,
	questoes: Vec<Questao>,
}

impl Tables {
	fn next_id(&mut self) -> i64 {
		self.sequence += 1;
		self.sequence
	}

	fn entries(&self, catalog: Catalog) -> &Vec<Entry> {
		match catalog {
			Catalog::Vestibular => &self.vestibulares,
			Catalog::Tema => &self.temas,
		}
	}

	fn entries_mut(&mut self, catalog: Catalog) -> &mut Vec<Entry> {
		match catalog {
			Catalog::Vestibular => &mut self.vestibulares,
			Catalog::Tema => &mut self.temas,
		}
	}

	fn entry_name(&self, catalog: Catalog, id: i64) -> Result<String> {
		self.entries(catalog)
			.iter()
			.find(|entry| entry.id == id)
			.map(|entry| entry.name.clone())
			.ok_or(Error::MissingReference(catalog.table()))
	}

	fn questao(&self, id: i64, draft: QuestaoDraft) -> Result<Questao> {
		Ok(Questao {
			id,
			vestibular: self.entry_name(Catalog::Vestibular, draft.vestibular_id)?,
			tema: self.entry_name(Catalog::Tema, draft.tema_id)?,
			statement: draft.statement,
			image: draft.image,
			alternatives: draft.alternatives,
			year: draft.year,
			answer: draft.answer,
			vestibular_id: draft.vestibular_id,
			tema_id: draft.tema_id,
		})
	}
}

#[axum::async_trait]
impl PostStore for MemoryStore {
	async fn list_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>> {
		let tables = self.tables.read().await;
		let mut posts = tables
			.posts
			.iter()
			.filter(|post| post.is_published(now))
			.cloned()
			.collect::<Vec<_>>();

		posts.sort_by(|a, b| {
			b.published_at
				.cmp(&a.published_at)
				.then_with(|| b.id.cmp(&a.id))
		});

		Ok(posts)
	}

	async fn list_posts(&self) -> Result<Vec<Post>> {
		let tables = self.tables.read().await;

		Ok(tables.posts.iter().rev().cloned().collect())
	}

	async fn count_posts(&self) -> Result<i64> {
		let tables = self.tables.read().await;

		Ok(i64::try_from(tables.posts.len()).unwrap_or(i64::MAX))
	}

	async fn find_post(&self, id: i64) -> Result<Option<Post>> {
		let tables = self.tables.read().await;

		Ok(tables.posts.iter().find(|post| post.id == id).cloned())
	}

	async fn insert_post(&self, post: NewPost) -> Result<Post> {
		let mut tables = self.tables.write().await;
		let author = tables
			.users
			.iter()
			.find(|user| user.id == post.author_id)
			.map(|user| user.username.clone())
			.ok_or(Error::MissingReference("user"))?;

		let post = Post {
			id: tables.next_id(),
			author_id: post.author_id,
			author,
			title: post.title,
			body: post.body,
			created_at: Utc::now().date_naive(),
			published_at: post.published_at,
		};

		tables.posts.push(post.clone());

		Ok(post)
	}

	async fn update_post(&self, id: i64, update: PostUpdate) -> Result<Option<Post>> {
		let mut tables = self.tables.write().await;
		let Some(post) = tables.posts.iter_mut().find(|post| post.id == id) else {
			return Ok(None);
		};

		post.title = update.title;
		post.body = update.body;
		post.published_at = update.published_at;

		Ok(Some(post.clone()))
	}

	async fn publish_post(&self, id: i64, at: DateTime<Utc>) -> Result<Option<Post>> {
		let mut tables = self.tables.write().await;
		let Some(post) = tables.posts.iter_mut().find(|post| post.id == id) else {
			return Ok(None);
		};

		post.published_at = Some(at);

		Ok(Some(post.clone()))
	}

	async fn delete_post(&self, id: i64) -> Result<bool> {
		let mut tables = self.tables.write().await;
		let before = tables.posts.len();

		tables.posts.retain(|post| post.id != id);

		Ok(tables.posts.len() < before)
	}
}

#[axum::async_trait]
impl CatalogStore for MemoryStore {
	async fn list_entries(&self, catalog: Catalog) -> Result<Vec<Entry>> {
		let tables = self.tables.read().await;
		let mut entries = tables.entries(catalog).clone();

		entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

		Ok(entries)
	}

	async fn insert_entry(&self, catalog: Catalog, name: &str) -> Result<Entry> {
		let mut tables = self.tables.write().await;
		let entry = Entry {
			id: tables.next_id(),
			name: name.to_owned(),
		};

		tables.entries_mut(catalog).push(entry.clone());

		Ok(entry)
	}

	async fn delete_entry(&self, catalog: Catalog, id: i64) -> Result<bool> {
		let mut tables = self.tables.write().await;
		let entries = tables.entries_mut(catalog);
		let before = entries.len();

		entries.retain(|entry| entry.id != id);

		if entries.len() == before {
			return Ok(false);
		}

		tables.questoes.retain(|questao| match catalog {
			Catalog::Vestibular => questao.vestibular_id != id,
			Catalog::Tema => questao.tema_id != id,
		});

		Ok(true)
	}
}

#[axum::async_trait]
impl QuestaoStore for MemoryStore {
	async fn list_questoes(&self) -> Result<Vec<Questao>> {
		let tables = self.tables.read().await;

		Ok(tables.questoes.clone())
	}

	async fn find_questao(&self, id: i64) -> Result<Option<Questao>> {
		let tables = self.tables.read().await;

		Ok(tables.questoes.iter().find(|questao| questao.id == id).cloned())
	}

	async fn insert_questao(&self, draft: QuestaoDraft) -> Result<Questao> {
		let mut tables = self.tables.write().await;
		let id = tables.sequence + 1;
		let questao = tables.questao(id, draft)?;

		tables.sequence = id;
		tables.questoes.push(questao.clone());

		Ok(questao)
	}

	async fn update_questao(&self, id: i64, draft: QuestaoDraft) -> Result<Option<Questao>> {
		let mut tables = self.tables.write().await;
		let Some(index) = tables.questoes.iter().position(|questao| questao.id == id) else {
			return Ok(None);
		};

		let questao = tables.questao(id, draft)?;
		tables.questoes[index] = questao.clone();

		Ok(Some(questao))
	}

	async fn delete_questao(&self, id: i64) -> Result<bool> {
		let mut tables = self.tables.write().await;
		let before = tables.questoes.len();

		tables.questoes.retain(|questao| questao.id != id);

		Ok(tables.questoes.len() < before)
	}
}

#[axum::async_trait]
impl IdentityStore for MemoryStore {
	async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
		let tables = self.tables.read().await;

		Ok(tables
			.users
			.iter()
			.find(|user| user.username == username)
			.cloned())
	}

	async fn insert_user(&self, id: Uuid, username: &str, password: &[u8]) -> Result<User> {
		let mut tables = self.tables.write().await;
		let user = User {
			id,
			username: username.to_owned(),
			password: password.to_vec(),
			created_at: Utc::now(),
		};

		tables.users.push(user.clone());

		Ok(user)
	}

	async fn set_password(&self, id: Uuid, password: &[u8]) -> Result<()> {
		let mut tables = self.tables.write().await;

		if let Some(user) = tables.users.iter_mut().find(|user| user.id == id) {
			user.password = password.to_vec();
		}

		Ok(())
	}

	async fn create_session(&self, user_id: Uuid) -> Result<Uuid> {
		let mut tables = self.tables.write().await;

		if !tables.users.iter().any(|user| user.id == user_id) {
			return Err(Error::MissingReference("user"));
		}

		let id = Uuid::new_v4();
		tables.sessions.insert(id, user_id);

		Ok(id)
	}

	async fn find_session(&self, id: Uuid) -> Result<Option<User>> {
		let tables = self.tables.read().await;

		Ok(tables
			.sessions
			.get(&id)
			.and_then(|user_id| tables.users.iter().find(|user| user.id == *user_id))
			.cloned())
	}

	async fn delete_session(&self, id: Uuid) -> Result<()> {
		self.tables.write().await.sessions.remove(&id);

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use chrono::Duration;

	use super::*;

	async fn store_with_author() -> (MemoryStore, User) {
		let store = MemoryStore::default();
		let user = store
			.insert_user(Uuid::new_v4(), "testuser", b"hash")
			.await
			.unwrap();

		(store, user)
	}

	fn new_post(author: &User, title: &str, published_at: Option<DateTime<Utc>>) -> NewPost {
		NewPost {
			author_id: author.id,
			title: title.into(),
			body: "corpo".into(),
			published_at,
		}
	}

	#[tokio::test]
	async fn test_list_published_filters_and_orders() {
		let (store, user) = store_with_author().await;
		let now = Utc::now();

		let older = store
			.insert_post(new_post(&user, "antigo", Some(now - Duration::hours(2))))
			.await
			.unwrap();
		let newer = store
			.insert_post(new_post(&user, "novo", Some(now - Duration::hours(1))))
			.await
			.unwrap();
		store
			.insert_post(new_post(&user, "futuro", Some(now + Duration::hours(1))))
			.await
			.unwrap();
		store
			.insert_post(new_post(&user, "rascunho", None))
			.await
			.unwrap();

		let published = store.list_published(now).await.unwrap();

		assert_eq!(published, vec![newer, older]);
		assert_eq!(store.count_posts().await.unwrap(), 4);
	}

	#[tokio::test]
	async fn test_insert_post_requires_author() {
		let store = MemoryStore::default();
		let orphan = NewPost {
			author_id: Uuid::new_v4(),
			title: "T".into(),
			body: "B".into(),
			published_at: None,
		};

		assert!(matches!(
			store.insert_post(orphan).await,
			Err(Error::MissingReference("user"))
		));
	}

	#[tokio::test]
	async fn test_delete_post_only_removes_one_row() {
		let (store, user) = store_with_author().await;
		let first = store.insert_post(new_post(&user, "a", None)).await.unwrap();
		store.insert_post(new_post(&user, "b", None)).await.unwrap();

		assert!(store.delete_post(first.id).await.unwrap());
		assert!(!store.delete_post(first.id).await.unwrap());
		assert_eq!(store.count_posts().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_deleting_entry_cascades_to_questoes() {
		let store = MemoryStore::default();
		let vestibular = store.insert_entry(Catalog::Vestibular, "ENEM").await.unwrap();
		let tema = store.insert_entry(Catalog::Tema, "Geometria").await.unwrap();

		let draft = QuestaoDraft {
			statement: "Enunciado".into(),
			image: None,
			alternatives: String::new(),
			year: "2019".into(),
			answer: "a".into(),
			vestibular_id: vestibular.id,
			tema_id: tema.id,
		};

		let questao = store.insert_questao(draft.clone()).await.unwrap();
		assert_eq!(questao.vestibular, "ENEM");

		assert!(matches!(
			store
				.insert_questao(QuestaoDraft {
					tema_id: vestibular.id,
					..draft
				})
				.await,
			Err(Error::MissingReference("tema"))
		));

		assert!(store.delete_entry(Catalog::Tema, tema.id).await.unwrap());
		assert!(store.list_questoes().await.unwrap().is_empty());
		assert!(!store.delete_entry(Catalog::Tema, tema.id).await.unwrap());
	}

	#[tokio::test]
	async fn test_sessions() {
		let (store, user) = store_with_author().await;
		let session = store.create_session(user.id).await.unwrap();

		assert_eq!(store.find_session(session).await.unwrap(), Some(user));

		store.delete_session(session).await.unwrap();

		assert_eq!(store.find_session(session).await.unwrap(), None);
		assert!(store.create_session(Uuid::new_v4()).await.is_err());
	}
}
