use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
	route::{
		catalog::model::{Tema, Vestibular},
		model::{self, FieldErrors, Validated},
	},
	store,
};

/// An exam question, classified by the exam it appeared in and its topic.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Questao {
	pub id: i64,
	pub statement: String,
	/// Reference to an image stored outside the application.
	pub image: Option<String>,
	pub alternatives: String,
	/// Four ASCII digits.
	pub year: String,
	pub answer: String,
	pub vestibular_id: i64,
	/// Name of the referenced vestibular.
	pub vestibular: String,
	pub tema_id: i64,
	/// Name of the referenced tema.
	pub tema: String,
}

impl fmt::Display for Questao {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.statement)
	}
}

/// Raw question form fields, exactly as submitted.
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct QuestaoInput {
	#[validate(custom(function = "model::not_blank"))]
	pub statement: String,
	#[validate(length(
		max = 255,
		message = "Certifique-se de que o valor tenha no máximo 255 caracteres."
	))]
	pub image: String,
	pub alternatives: String,
	#[validate(custom(function = "model::four_digit_year"))]
	pub year: String,
	#[validate(custom(function = "model::not_blank"))]
	pub answer: String,
	pub vestibular: String,
	pub tema: String,
}

impl QuestaoInput {
	/// Prefills the form with the current values of `questao`.
	pub fn from_questao(questao: &Questao) -> Self {
		Self {
			statement: questao.statement.clone(),
			image: questao.image.clone().unwrap_or_default(),
			alternatives: questao.alternatives.clone(),
			year: questao.year.clone(),
			answer: questao.answer.clone(),
			vestibular: questao.vestibular_id.to_string(),
			tema: questao.tema_id.to_string(),
		}
	}
}

/// A validated question form.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestaoDraft {
	pub statement: String,
	pub image: Option<String>,
	pub alternatives: String,
	pub year: String,
	pub answer: String,
	pub vestibular_id: i64,
	pub tema_id: i64,
}

/// Resolves a submitted select value against the existing rows.
fn reference(
	errors: &mut FieldErrors,
	field: &str,
	raw: &str,
	exists: impl Fn(i64) -> bool,
) -> Option<i64> {
	if raw.trim().is_empty() {
		errors.add(field, model::REQUIRED);
		return None;
	}

	match model::parse_id(raw) {
		Some(id) if exists(id) => Some(id),
		_ => {
			errors.add(field, model::INVALID_CHOICE);
			None
		}
	}
}

/// Validates a submitted question form. The vestibular and tema references
/// must name one of the given rows.
pub fn validate(
	input: &QuestaoInput,
	vestibulares: &[Vestibular],
	temas: &[Tema],
) -> Validated<QuestaoDraft> {
	let mut errors = model::field_errors(input);

	let vestibular_id = reference(&mut errors, "vestibular", &input.vestibular, |id| {
		vestibulares.iter().any(|v| v.id == id)
	});
	let tema_id = reference(&mut errors, "tema", &input.tema, |id| {
		temas.iter().any(|t| t.id == id)
	});

	let (Some(vestibular_id), Some(tema_id)) = (vestibular_id, tema_id) else {
		return Validated::Invalid(errors);
	};

	errors.into_validated(|| QuestaoDraft {
		statement: input.statement.clone(),
		image: model::optional(&input.image),
		alternatives: input.alternatives.clone(),
		year: input.year.trim().to_owned(),
		answer: input.answer.clone(),
		vestibular_id,
		tema_id,
	})
}

/// Turns a vestibular or tema that disappeared before the write into a field
/// error, so the form can be shown again.
pub fn missing_reference(error: store::Error) -> Result<FieldErrors, store::Error> {
	match error {
		store::Error::MissingReference(field @ ("vestibular" | "tema")) => {
			let mut errors = FieldErrors::default();
			errors.add(field, model::INVALID_CHOICE);

			Ok(errors)
		}
		error => Err(error),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::route::catalog::model::Entry;

	fn references() -> (Vec<Vestibular>, Vec<Tema>) {
		(
			vec![Entry {
				id: 1,
				name: "ENEM".into(),
			}],
			vec![Entry {
				id: 2,
				name: "Geometria".into(),
			}],
		)
	}

	fn input() -> QuestaoInput {
		QuestaoInput {
			statement: "Quanto vale 2 + 2?".into(),
			image: String::new(),
			alternatives: "a) 3\nb) 4".into(),
			year: "2019".into(),
			answer: "b".into(),
			vestibular: "1".into(),
			tema: "2".into(),
		}
	}

	#[test]
	fn test_validate_accepts_complete_form() {
		let (vestibulares, temas) = references();

		let Validated::Valid(draft) = validate(&input(), &vestibulares, &temas) else {
			panic!("expected a valid draft");
		};

		assert_eq!(draft.vestibular_id, 1);
		assert_eq!(draft.tema_id, 2);
		assert_eq!(draft.year, "2019");
		assert_eq!(draft.image, None);
	}

	#[test]
	fn test_validate_rejects_unknown_references() {
		let (vestibulares, temas) = references();
		let mut form = input();
		form.vestibular = "99".into();
		form.tema = "abc".into();

		let Validated::Invalid(errors) = validate(&form, &vestibulares, &temas) else {
			panic!("expected errors");
		};

		assert_eq!(
			errors.get("vestibular"),
			Some(&[model::INVALID_CHOICE.to_string()][..])
		);
		assert_eq!(
			errors.get("tema"),
			Some(&[model::INVALID_CHOICE.to_string()][..])
		);
	}

	#[test]
	fn test_validate_requires_fields() {
		let (vestibulares, temas) = references();

		let Validated::Invalid(errors) =
			validate(&QuestaoInput::default(), &vestibulares, &temas)
		else {
			panic!("expected errors");
		};

		for field in ["statement", "answer", "year", "vestibular", "tema"] {
			assert!(errors.get(field).is_some(), "{field} should be rejected");
		}

		assert!(errors.get("alternatives").is_none());
		assert!(errors.get("image").is_none());
	}

	#[test]
	fn test_validate_rejects_bad_year_with_valid_references() {
		let (vestibulares, temas) = references();
		let mut form = input();
		form.year = "19".into();

		let Validated::Invalid(errors) = validate(&form, &vestibulares, &temas) else {
			panic!("expected errors");
		};

		assert_eq!(errors.get("year"), Some(&[model::INVALID_YEAR.to_string()][..]));
	}

	#[test]
	fn test_questao_display() {
		let questao = Questao {
			id: 1,
			statement: "Enunciado".into(),
			image: None,
			alternatives: String::new(),
			year: "2020".into(),
			answer: "a".into(),
			vestibular_id: 1,
			vestibular: "ENEM".into(),
			tema_id: 2,
			tema: "Geometria".into(),
		};

		assert_eq!(questao.to_string(), "Enunciado");
		assert_eq!(QuestaoInput::from_questao(&questao).vestibular, "1");
	}

	#[test]
	fn test_missing_reference_becomes_field_error() {
		let errors = missing_reference(store::Error::MissingReference("tema")).unwrap();

		assert_eq!(errors.get("tema"), Some(&[model::INVALID_CHOICE.to_string()][..]));
		assert!(errors.get("vestibular").is_none());

		assert!(missing_reference(store::Error::MissingReference("user")).is_err());
	}
}
