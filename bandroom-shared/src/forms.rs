/// Declarative form schemas with validation and view-models
///
/// A [`FormSchema`] is an ordered list of field descriptors. It does three
/// independent jobs, none of which touch rendering or persistence:
///
/// - `render()` produces the [`FormView`] view-model a template renderer
///   consumes, optionally annotated with per-field errors;
/// - `widget_requirements()` lists the static js/css assets the form's
///   widgets need;
/// - `bind()` validates submitted data against the schema and produces
///   either the bound values or structured per-field errors.
///
/// Controllers compose `bind` with entity-specific cross-field checks
/// (e.g. login uniqueness) and a model update. That composition is the
/// whole "generic edit" pattern: given a target entity, a schema, and
/// submitted data, produce either a validation-error view-model or a
/// persisted update.
///
/// # Example
///
/// ```
/// use bandroom_shared::forms::{FieldSchema, FormSchema};
/// use std::collections::HashMap;
///
/// let schema = FormSchema::new("login")
///     .field(FieldSchema::text("user", "Type your user"))
///     .field(FieldSchema::password("password", "Type your password"))
///     .button("submit");
///
/// let mut input = HashMap::new();
/// input.insert("user".to_string(), "joanna".to_string());
/// input.insert("password".to_string(), "sapokanikan".to_string());
///
/// let bound = schema.bind(&input).unwrap();
/// assert_eq!(bound.get("user"), Some("joanna"));
/// ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::ValidateEmail;

/// Widget kind of a form field
///
/// Determines rendering and which validation rules apply during binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain text input
    Text,

    /// Masked password input
    Password,

    /// Masked password input with a `<name>_confirm` companion field that
    /// must match
    CheckedPassword,

    /// Text input validated as an email address
    Email,
}

/// Descriptor for a single form field
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// Field name, also the key in submitted data
    pub name: &'static str,

    /// Widget kind
    pub kind: FieldKind,

    /// Human-readable prompt
    pub description: &'static str,

    /// Whether the field must be present in submitted data
    pub required: bool,

    /// Minimum value length, checked after presence
    pub min_length: Option<usize>,
}

impl FieldSchema {
    /// Required text field
    pub fn text(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Text, description)
    }

    /// Required password field
    pub fn password(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Password, description)
    }

    /// Required password field with confirmation
    pub fn checked_password(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::CheckedPassword, description)
    }

    /// Required email field
    pub fn email(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Email, description)
    }

    fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
            min_length: None,
        }
    }

    /// Marks the field optional; missing values are dropped, not errors
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets a minimum length constraint
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }
}

/// Ordered form schema
#[derive(Debug, Clone)]
pub struct FormSchema {
    /// Form name
    pub name: &'static str,

    /// Fields in render order
    pub fields: Vec<FieldSchema>,

    /// Submit button labels
    pub buttons: Vec<&'static str>,
}

/// Per-field validation error annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldError {
    /// Creates a field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Values that passed schema validation
#[derive(Debug, Clone, Default)]
pub struct BoundValues(HashMap<String, String>);

impl BoundValues {
    /// Gets a bound value by field name
    ///
    /// Optional fields that were absent from the submission have no entry.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// View-model for a single rendered field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldView {
    /// Field name
    pub name: String,

    /// Widget kind
    pub kind: FieldKind,

    /// Human-readable prompt
    pub description: String,

    /// Whether the field is required
    pub required: bool,

    /// Inline error annotation, if validation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// View-model for a rendered form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormView {
    /// Form name
    pub name: String,

    /// Fields in render order
    pub fields: Vec<FieldView>,

    /// Submit button labels
    pub buttons: Vec<String>,
}

/// Static assets the form's widgets need
///
/// Returned alongside the form view-model so the renderer can include the
/// right js/css without knowing the widget kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetRequirements {
    /// JavaScript assets, deduplicated, in field order
    pub js: Vec<String>,

    /// Stylesheet assets, deduplicated, in field order
    pub css: Vec<String>,
}

impl FormSchema {
    /// Creates an empty schema
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            buttons: Vec::new(),
        }
    }

    /// Appends a field
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a submit button
    pub fn button(mut self, label: &'static str) -> Self {
        self.buttons.push(label);
        self
    }

    /// Renders the form view-model without error annotations
    pub fn render(&self) -> FormView {
        self.render_with_errors(&[])
    }

    /// Renders the form view-model with inline error annotations
    ///
    /// Errors whose field matches no schema field are ignored here; the
    /// caller surfaces those separately (cross-field errors).
    pub fn render_with_errors(&self, errors: &[FieldError]) -> FormView {
        FormView {
            name: self.name.to_string(),
            fields: self
                .fields
                .iter()
                .map(|f| FieldView {
                    name: f.name.to_string(),
                    kind: f.kind,
                    description: f.description.to_string(),
                    required: f.required,
                    error: errors
                        .iter()
                        .find(|e| e.field == f.name)
                        .map(|e| e.message.clone()),
                })
                .collect(),
            buttons: self.buttons.iter().map(|b| b.to_string()).collect(),
        }
    }

    /// Lists the static assets the form's widgets need
    pub fn widget_requirements(&self) -> WidgetRequirements {
        let mut requirements = WidgetRequirements::default();

        for field in &self.fields {
            let (js, css): (&[&str], &[&str]) = match field.kind {
                FieldKind::Text | FieldKind::Email => (&[], &[]),
                FieldKind::Password => (&[], &["static/forms/password.css"]),
                FieldKind::CheckedPassword => (
                    &["static/forms/checked_password.js"],
                    &["static/forms/password.css"],
                ),
            };

            for asset in js {
                if !requirements.js.iter().any(|a| a == asset) {
                    requirements.js.push(asset.to_string());
                }
            }
            for asset in css {
                if !requirements.css.iter().any(|a| a == asset) {
                    requirements.css.push(asset.to_string());
                }
            }
        }

        requirements
    }

    /// Validates submitted data against the schema
    ///
    /// Empty strings are treated as missing. All fields are checked before
    /// returning, so the error list annotates every failing field at once.
    ///
    /// # Errors
    ///
    /// Returns the per-field error annotations if any field fails
    pub fn bind(&self, input: &HashMap<String, String>) -> Result<BoundValues, Vec<FieldError>> {
        let mut bound = HashMap::new();
        let mut errors = Vec::new();

        for field in &self.fields {
            let value = input.get(field.name).map(String::as_str).filter(|v| !v.is_empty());

            let value = match value {
                Some(v) => v,
                None => {
                    if field.required {
                        errors.push(FieldError::new(field.name, "Required"));
                    }
                    continue;
                }
            };

            if let Some(min) = field.min_length {
                if value.chars().count() < min {
                    errors.push(FieldError::new(
                        field.name,
                        format!("Shorter than minimum length {}", min),
                    ));
                    continue;
                }
            }

            match field.kind {
                FieldKind::Email => {
                    if !value.validate_email() {
                        errors.push(FieldError::new(field.name, "Invalid email address"));
                        continue;
                    }
                }
                FieldKind::CheckedPassword => {
                    let confirm_name = format!("{}_confirm", field.name);
                    let confirm = input.get(&confirm_name).map(String::as_str);
                    if confirm != Some(value) {
                        errors.push(FieldError::new(
                            field.name,
                            "Password did not match confirmation",
                        ));
                        continue;
                    }
                }
                FieldKind::Text | FieldKind::Password => {}
            }

            bound.insert(field.name.to_string(), value.to_string());
        }

        if errors.is_empty() {
            Ok(BoundValues(bound))
        } else {
            Err(errors)
        }
    }
}
