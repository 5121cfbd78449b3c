//! Parameter shapes for tool arguments.
//!
//! A [`ParameterShape`] is the single source of truth for what a tool
//! accepts: it renders as a JSON Schema for the LLM side and validates the
//! arguments that come back.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("Invalid email pattern")
});

/// The value type a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Any string.
    String,
    /// A string that must look like an email address.
    Email,
    /// A whole number with optional inclusive bounds.
    Integer {
        /// Smallest accepted value.
        min: Option<i64>,
        /// Largest accepted value.
        max: Option<i64>,
    },
    /// One of a fixed set of strings.
    Enum(&'static [&'static str]),
}

/// One named argument of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Argument name as sent by the model.
    pub name: &'static str,
    /// Accepted value type.
    pub ty: FieldType,
    /// Whether the argument must be present.
    pub required: bool,
    /// Human readable description.
    pub description: &'static str,
}

impl Field {
    const fn new(name: &'static str, ty: FieldType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            required: true,
            description,
        }
    }

    /// A required string field.
    #[must_use]
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::String, description)
    }

    /// A required email field.
    #[must_use]
    pub const fn email(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::Email, description)
    }

    /// A required, unbounded integer field.
    #[must_use]
    pub const fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(
            name,
            FieldType::Integer {
                min: None,
                max: None,
            },
            description,
        )
    }

    /// A required field restricted to `values`.
    #[must_use]
    pub const fn enumeration(
        name: &'static str,
        values: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self::new(name, FieldType::Enum(values), description)
    }

    /// Marks the field as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Restricts an integer field to `min..=max`. No-op on other types.
    #[must_use]
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        if let FieldType::Integer { .. } = self.ty {
            self.ty = FieldType::Integer {
                min: Some(min),
                max: Some(max),
            };
        }
        self
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = Map::new();
        match self.ty {
            FieldType::String => {
                schema.insert("type".into(), json!("string"));
            }
            FieldType::Email => {
                schema.insert("type".into(), json!("string"));
                schema.insert("format".into(), json!("email"));
            }
            FieldType::Integer { min, max } => {
                schema.insert("type".into(), json!("integer"));
                if let Some(min) = min {
                    schema.insert("minimum".into(), json!(min));
                }
                if let Some(max) = max {
                    schema.insert("maximum".into(), json!(max));
                }
            }
            FieldType::Enum(values) => {
                schema.insert("type".into(), json!("string"));
                schema.insert("enum".into(), json!(values));
            }
        }
        schema.insert("description".into(), json!(self.description));
        Value::Object(schema)
    }

    fn validate(&self, value: &Value) -> Result<Value, SchemaError> {
        let field = self.name;
        match self.ty {
            FieldType::String => value
                .as_str()
                .map(|s| Value::String(s.to_owned()))
                .ok_or(SchemaError::InvalidType {
                    field,
                    expected: "string",
                }),
            FieldType::Email => {
                let s = value.as_str().ok_or(SchemaError::InvalidType {
                    field,
                    expected: "string",
                })?;
                if EMAIL.is_match(s) {
                    Ok(Value::String(s.to_owned()))
                } else {
                    Err(SchemaError::InvalidEmail {
                        field,
                        value: s.to_owned(),
                    })
                }
            }
            FieldType::Integer { min, max } => {
                let n = as_integer(value).ok_or(SchemaError::InvalidType {
                    field,
                    expected: "integer",
                })?;
                if min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max) {
                    return Err(SchemaError::OutOfRange { field, value: n });
                }
                Ok(Value::from(n))
            }
            FieldType::Enum(values) => {
                let s = value.as_str().ok_or(SchemaError::InvalidType {
                    field,
                    expected: "string",
                })?;
                if values.contains(&s) {
                    Ok(Value::String(s.to_owned()))
                } else {
                    Err(SchemaError::InvalidEnumValue {
                        field,
                        value: s.to_owned(),
                    })
                }
            }
        }
    }
}

/// Accepts JSON integers and floats with no fractional part.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
}

/// Argument validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// The arguments were not a JSON object.
    #[error("arguments must be a JSON object")]
    NotAnObject,
    /// A required field is absent.
    #[error("missing required field `{field}`")]
    MissingField {
        /// Field name.
        field: &'static str,
    },
    /// A field has the wrong JSON type.
    #[error("field `{field}` must be a {expected}")]
    InvalidType {
        /// Field name.
        field: &'static str,
        /// Expected type name.
        expected: &'static str,
    },
    /// An integer is outside its bounds.
    #[error("field `{field}` is out of range: {value}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },
    /// A string is not one of the allowed values.
    #[error("field `{field}` has invalid value `{value}`")]
    InvalidEnumValue {
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A string is not a valid email address.
    #[error("field `{field}` is not a valid email: `{value}`")]
    InvalidEmail {
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Ordered set of named argument fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterShape {
    fields: Vec<Field>,
}

impl ParameterShape {
    /// Creates a shape from fields in display order.
    #[must_use]
    pub const fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// An empty shape (no arguments).
    #[must_use]
    pub const fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Fields in display order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field names in display order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the shape has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the field called `name`, if any.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Removes the field called `name`.
    #[must_use]
    pub fn without(mut self, name: &str) -> Self {
        self.fields.retain(|f| f.name != name);
        self
    }

    /// Renders the shape as a JSON Schema object.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_owned(), f.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Validates `args` and returns only the known fields.
    ///
    /// Unknown keys are dropped. An explicit `null` on an optional field is
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] naming the first offending field.
    pub fn parse(&self, args: &Value) -> Result<Map<String, Value>, SchemaError> {
        let object = args.as_object().ok_or(SchemaError::NotAnObject)?;
        let mut parsed = Map::new();
        for field in &self.fields {
            match object.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(SchemaError::MissingField { field: field.name });
                }
                None | Some(Value::Null) => {}
                Some(value) => {
                    parsed.insert(field.name.to_owned(), field.validate(value)?);
                }
            }
        }
        Ok(parsed)
    }
}
