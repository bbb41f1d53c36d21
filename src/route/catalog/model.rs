use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::route::model::{self, Validated};

/// The named reference tables questions are classified by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
	/// Entrance exams, e.g. "ENEM" or "FUVEST".
	Vestibular,
	/// Subjects, e.g. "Geometria".
	Tema,
}

impl Catalog {
	pub fn table(self) -> &'static str {
		match self {
			Self::Vestibular => "vestibular",
			Self::Tema => "tema",
		}
	}

	/// Base path of the management page.
	pub fn path(self) -> &'static str {
		match self {
			Self::Vestibular => "/vestibulares/",
			Self::Tema => "/temas/",
		}
	}

	pub fn title(self) -> &'static str {
		match self {
			Self::Vestibular => "Vestibulares",
			Self::Tema => "Temas",
		}
	}
}

impl fmt::Display for Catalog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.table())
	}
}

/// A row of one of the [`Catalog`] tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Entry {
	pub id: i64,
	pub name: String,
}

pub type Vestibular = Entry;
pub type Tema = Entry;

impl fmt::Display for Entry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct EntryInput {
	#[validate(
		custom(function = "model::not_blank"),
		length(
			max = 100,
			message = "Certifique-se de que o valor tenha no máximo 100 caracteres."
		)
	)]
	pub name: String,
}

/// Validates a submitted catalog form, yielding the trimmed name.
pub fn validate(input: &EntryInput) -> Validated<String> {
	model::field_errors(input).into_validated(|| input.name.trim().to_owned())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_validate_name() {
		let input = EntryInput {
			name: "  ENEM ".into(),
		};

		assert!(matches!(validate(&input), Validated::Valid(name) if name == "ENEM"));
	}

	#[test]
	fn test_validate_rejects_blank_and_long_names() {
		for name in [String::new(), " ".into(), "x".repeat(101)] {
			let Validated::Invalid(errors) = validate(&EntryInput { name }) else {
				panic!("expected errors");
			};

			assert!(errors.get("name").is_some());
		}
	}

	#[test]
	fn test_catalog_paths() {
		assert_eq!(Catalog::Vestibular.path(), "/vestibulares/");
		assert_eq!(Catalog::Tema.table(), "tema");
		assert_eq!(
			Entry {
				id: 1,
				name: "ENEM".into()
			}
			.to_string(),
			"ENEM"
		);
	}
}
