//! Configuration validation utilities for the ordering system.
//!
//! Backend implementations are selected and configured through TOML; this
//! module provides the schema framework they use to validate their section
//! of the configuration before initialization.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Represents the type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	/// A string value.
	String,
	/// An integer value with optional inclusive bounds.
	Integer { min: Option<i64>, max: Option<i64> },
	/// A boolean value.
	Boolean,
	/// A nested table with its own schema.
	Table(Schema),
}

/// A named field within a configuration schema.
#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
}

impl Field {
	/// Creates a new field with the given name and type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
		}
	}
}

/// Defines a validation schema for a TOML configuration section.
///
/// A schema lists the fields that must be present and the fields that may
/// be present; each carries an expected type. Schemas nest through
/// [`FieldType::Table`].
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	/// Creates a new schema with required and optional fields.
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// Checks that every required field is present, that every present
	/// field matches its declared type, and recurses into nested tables.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			validate_field_type(&field.name, value, &field.field_type)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				validate_field_type(&field.name, value, &field.field_type)?;
			}
		}

		Ok(())
	}
}

/// Validates that a value matches the expected field type.
fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "string".to_string(),
					actual: value.type_str().to_string(),
				});
			}
		},
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "integer".to_string(),
					actual: value.type_str().to_string(),
				})?;

			if let Some(min_val) = min {
				if int_val < *min_val {
					return Err(ValidationError::InvalidValue {
						field: field_name.to_string(),
						message: format!("Value {} is less than minimum {}", int_val, min_val),
					});
				}
			}
			if let Some(max_val) = max {
				if int_val > *max_val {
					return Err(ValidationError::InvalidValue {
						field: field_name.to_string(),
						message: format!("Value {} is greater than maximum {}", int_val, max_val),
					});
				}
			}
		},
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "boolean".to_string(),
					actual: value.type_str().to_string(),
				});
			}
		},
		FieldType::Table(schema) => {
			schema.validate(value).map_err(|e| match e {
				ValidationError::MissingField(f) => {
					ValidationError::MissingField(format!("{}.{}", field_name, f))
				},
				ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
					field: format!("{}.{}", field_name, field),
					message,
				},
				ValidationError::TypeMismatch {
					field,
					expected,
					actual,
				} => ValidationError::TypeMismatch {
					field: format!("{}.{}", field_name, field),
					expected,
					actual,
				},
			})?;
		},
	}

	Ok(())
}

/// Trait defining a configuration schema that can validate TOML values.
///
/// Every pluggable backend implements this to declare what its section of
/// the configuration must look like.
pub trait ConfigSchema: Send + Sync {
	/// Validates a TOML configuration value against this schema.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(s: &str) -> toml::Value {
		toml::from_str(s).unwrap()
	}

	#[test]
	fn missing_required_field_is_reported() {
		let schema = Schema::new(vec![Field::new("storage_path", FieldType::String)], vec![]);
		let err = schema.validate(&parse("other = 1")).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "storage_path"));
	}

	#[test]
	fn integer_bounds_are_enforced() {
		let schema = Schema::new(
			vec![Field::new(
				"leeway_seconds",
				FieldType::Integer {
					min: Some(0),
					max: Some(300),
				},
			)],
			vec![],
		);
		assert!(schema.validate(&parse("leeway_seconds = 30")).is_ok());
		assert!(schema.validate(&parse("leeway_seconds = -1")).is_err());
		assert!(schema.validate(&parse("leeway_seconds = 301")).is_err());
	}

	#[test]
	fn nested_table_errors_carry_the_path() {
		let schema = Schema::new(
			vec![Field::new(
				"profiles",
				FieldType::Table(Schema::new(vec![Field::new("email", FieldType::String)], vec![])),
			)],
			vec![],
		);
		let err = schema.validate(&parse("[profiles]\nname = \"x\"")).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "profiles.email"));
	}
}
