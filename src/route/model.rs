use std::collections::BTreeMap;

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

pub const REQUIRED: &str = "Este campo é obrigatório.";
pub const INVALID_CHOICE: &str = "Selecione uma opção válida. Essa opção não existe.";
pub const INVALID_YEAR: &str = "Informe um ano com quatro dígitos.";

/// Human-readable messages for each rejected field of a submitted form.
///
/// Serialized as a plain map so templates can look up `errors.<field>`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
	pub fn add(&mut self, field: &str, message: impl Into<String>) {
		self.0
			.entry(field.to_owned())
			.or_default()
			.push(message.into());
	}

	pub fn get(&self, field: &str) -> Option<&[String]> {
		self.0.get(field).map(Vec::as_slice)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Wraps `draft` as valid when no field was rejected.
	pub fn into_validated<T>(self, draft: impl FnOnce() -> T) -> Validated<T> {
		if self.is_empty() {
			Validated::Valid(draft())
		} else {
			Validated::Invalid(self)
		}
	}
}

impl From<ValidationErrors> for FieldErrors {
	fn from(errors: ValidationErrors) -> Self {
		let mut fields = Self::default();

		for (field, errors) in errors.field_errors() {
			let field = field.to_string();

			for error in errors.iter() {
				let message = error
					.message
					.as_ref()
					.map_or_else(|| error.code.to_string(), ToString::to_string);

				fields.add(&field, message);
			}
		}

		fields
	}
}

/// The outcome of running a form validator.
///
/// A draft is only ever handed out when every field passed.
#[derive(Debug)]
pub enum Validated<T> {
	Valid(T),
	Invalid(FieldErrors),
}

/// Runs the declarative `validator` rules of `input`, returning the collected
/// field errors (empty when everything passed).
pub fn field_errors(input: &impl validator::Validate) -> FieldErrors {
	input.validate().map_or_else(FieldErrors::from, |()| FieldErrors::default())
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
	let mut error = ValidationError::new(code);
	error.message = Some(message.into());
	error
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		return Err(error("required", REQUIRED));
	}

	Ok(())
}

pub fn four_digit_year(value: &str) -> Result<(), ValidationError> {
	let value = value.trim();

	if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
		return Err(error("year", INVALID_YEAR));
	}

	Ok(())
}

/// Parses a submitted identifier, e.g. a hidden `post_id` input.
pub fn parse_id(raw: &str) -> Option<i64> {
	raw.trim().parse().ok()
}

/// HTML checkboxes are only submitted when ticked.
pub fn checked(raw: &str) -> bool {
	matches!(raw.trim(), "on" | "true" | "1")
}

/// Turns an optional text input into `None` when left blank.
pub fn optional(raw: &str) -> Option<String> {
	let raw = raw.trim();

	(!raw.is_empty()).then(|| raw.to_owned())
}
