use std::{borrow::Cow, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::route::model::{self, FieldErrors, Validated};

/// Title given to posts submitted without one.
pub const DEFAULT_TITLE: &str = "Post sem título";

/// A single blog post, written by a user.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Post {
	pub id: i64,
	/// The user that wrote the post.
	pub author_id: Uuid,
	/// Username of the author.
	pub author: String,
	pub title: String,
	/// Plain text or a Quill editor document, see [`rich_text`].
	pub body: String,
	pub created_at: NaiveDate,
	/// `None` while the post is a draft.
	pub published_at: Option<DateTime<Utc>>,
}

impl Post {
	pub fn is_published(&self, now: DateTime<Utc>) -> bool {
		self.published_at.is_some_and(|at| at <= now)
	}
}

impl fmt::Display for Post {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.title)
	}
}

/// A post as it is written to the store.
#[derive(Debug, Clone)]
pub struct NewPost {
	pub author_id: Uuid,
	pub title: String,
	pub body: String,
	pub published_at: Option<DateTime<Utc>>,
}

/// Replacement values for an existing post.
#[derive(Debug, Clone)]
pub struct PostUpdate {
	pub title: String,
	pub body: String,
	pub published_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct QuillDocument {
	html: String,
}

/// Returns the displayable text of a post body.
///
/// The editor stores documents as `{"delta": ..., "html": ...}`; any other
/// body is returned as-is.
pub fn rich_text(body: &str) -> Cow<'_, str> {
	match serde_json::from_str::<QuillDocument>(body) {
		Ok(document) => Cow::Owned(document.html),
		Err(_) => Cow::Borrowed(body),
	}
}

fn validate_body(body: &str) -> Result<(), ValidationError> {
	model::not_blank(&rich_text(body))
}

/// Raw post form fields, exactly as submitted.
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct PostInput {
	#[validate(length(
		max = 200,
		message = "Certifique-se de que o valor tenha no máximo 200 caracteres."
	))]
	pub title: String,
	#[validate(custom(function = "validate_body"))]
	pub body: String,
	/// Checkbox, keeps the post unpublished when ticked.
	pub draft: String,
}

/// The post form of the edit page, which also names the post being edited.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EditPostInput {
	pub post_id: String,
	#[serde(flatten)]
	pub post: PostInput,
}

impl EditPostInput {
	/// Prefills the edit form with the current values of `post`.
	pub fn from_post(post: &Post) -> Self {
		Self {
			post_id: post.id.to_string(),
			post: PostInput {
				title: post.title.clone(),
				body: post.body.clone(),
				draft: if post.published_at.is_none() {
					"on".into()
				} else {
					String::new()
				},
			},
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostIdInput {
	pub post_id: String,
}

/// A validated post form.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
	/// `None` when the title was left blank.
	pub title: Option<String>,
	pub body: String,
	pub draft: bool,
}

impl PostDraft {
	/// Drafts stay unpublished, everything else is published at `now`.
	pub fn published_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
		(!self.draft).then_some(now)
	}
}

/// Validates a submitted post form.
pub fn validate(input: &PostInput) -> Validated<PostDraft> {
	let errors: FieldErrors = model::field_errors(input);

	errors.into_validated(|| PostDraft {
		title: model::optional(&input.title),
		body: input.body.clone(),
		draft: model::checked(&input.draft),
	})
}

#[cfg(test)]
mod test {
	use chrono::Duration;

	use super::*;

	fn input(title: &str, body: &str) -> PostInput {
		PostInput {
			title: title.into(),
			body: body.into(),
			draft: String::new(),
		}
	}

	#[test]
	fn test_validate_accepts_title_and_body() {
		let Validated::Valid(draft) = validate(&input("T", "B")) else {
			panic!("expected a valid draft");
		};

		assert_eq!(draft.title.as_deref(), Some("T"));
		assert_eq!(draft.body, "B");
		assert!(!draft.draft);
	}

	#[test]
	fn test_validate_blank_title_falls_back() {
		let Validated::Valid(draft) = validate(&input("   ", "B")) else {
			panic!("expected a valid draft");
		};

		assert_eq!(draft.title, None);
	}

	#[test]
	fn test_validate_rejects_empty_body() {
		let Validated::Invalid(errors) = validate(&input("T", "")) else {
			panic!("expected errors");
		};

		assert_eq!(errors.get("body"), Some(&[model::REQUIRED.to_string()][..]));
		assert!(errors.get("title").is_none());
	}

	#[test]
	fn test_validate_rejects_empty_quill_document() {
		let Validated::Invalid(errors) = validate(&input("T", r#"{"delta": "", "html": " "}"#))
		else {
			panic!("expected errors");
		};

		assert!(errors.get("body").is_some());
	}

	#[test]
	fn test_validate_rejects_long_title() {
		let Validated::Invalid(errors) = validate(&input(&"a".repeat(201), "B")) else {
			panic!("expected errors");
		};

		assert!(errors.get("title").is_some());
		assert!(matches!(
			validate(&input(&"a".repeat(200), "B")),
			Validated::Valid(_)
		));
	}

	#[test]
	fn test_draft_is_not_published() {
		let now = Utc::now();
		let mut form = input("T", "B");
		form.draft = "on".into();

		let Validated::Valid(draft) = validate(&form) else {
			panic!("expected a valid draft");
		};

		assert_eq!(draft.published_at(now), None);

		form.draft.clear();
		let Validated::Valid(draft) = validate(&form) else {
			panic!("expected a valid draft");
		};

		assert_eq!(draft.published_at(now), Some(now));
	}

	#[test]
	fn test_rich_text() {
		assert_eq!(rich_text(r#"{"delta": "", "html": "Test Post"}"#), "Test Post");
		assert_eq!(rich_text("texto simples"), "texto simples");
		assert_eq!(rich_text(r#"{"outro": 1}"#), r#"{"outro": 1}"#);
	}

	#[test]
	fn test_post_display_and_publication() {
		let now = Utc::now();
		let post = Post {
			id: 1,
			author_id: Uuid::new_v4(),
			author: "testuser".into(),
			title: "Test Post".into(),
			body: r#"{"delta": "", "html": "Test Post"}"#.into(),
			created_at: now.date_naive(),
			published_at: Some(now),
		};

		assert_eq!(post.to_string(), "Test Post");
		assert!(post.is_published(now));
		assert!(!post.is_published(now - Duration::seconds(1)));
		assert!(!Post { published_at: None, ..post }.is_published(now));
	}
}
