use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The name used to log in, also shown as the author of posts.
	pub username: String,
	/// Argon2 hash of the password, salted with `id`.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl fmt::Display for User {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.username)
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
	pub username: String,
	pub password: String,
	/// Where to go after logging in, carried over from the query string.
	pub next: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextInput {
	pub next: String,
}
