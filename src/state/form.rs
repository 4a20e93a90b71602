//! Form editing state types.
//!
//! This module contains the create/edit modal state: one input per form
//! field of the resource, inline validation and payload construction.

use super::error::StateError;
use crate::api::{FieldKind, FieldSpec, Record, Resource};
use crate::query::Mutation;
use serde_json::{Map, Number, Value};

/// Specifying whether the form creates a record or edits an existing one.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// One input of the form.
///
#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    pub spec: FieldSpec,
    pub value: String,
    pub error: Option<String>,
}

impl FormField {
    fn new(spec: FieldSpec, value: String) -> Self {
        FormField {
            spec,
            value,
            error: None,
        }
    }
}

/// State of the create/edit modal.
///
#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    pub resource: Resource,
    pub mode: FormMode,
    pub fields: Vec<FormField>,
    pub focused: usize,
    pub submitting: bool,
    /// Id of the mutation in flight, matched against its result.
    pub submission: Option<u64>,
    pub error: Option<String>,
}

impl FormState {
    /// Return an empty form for a new record.
    ///
    pub fn create(resource: Resource) -> Result<Self, StateError> {
        if !resource.is_editable() {
            return Err(StateError::ReadOnly(resource.title()));
        }
        Ok(FormState {
            resource,
            mode: FormMode::Create,
            fields: resource
                .form_fields()
                .iter()
                .map(|spec| FormField::new(*spec, String::new()))
                .collect(),
            focused: 0,
            submitting: false,
            submission: None,
            error: None,
        })
    }

    /// Return a form prefilled from an existing record.
    ///
    pub fn edit(resource: Resource, record: &Record) -> Result<Self, StateError> {
        if !resource.is_editable() {
            return Err(StateError::ReadOnly(resource.title()));
        }
        let id = record.id().ok_or(StateError::MissingId)?;
        Ok(FormState {
            resource,
            mode: FormMode::Edit { id },
            fields: resource
                .form_fields()
                .iter()
                .map(|spec| FormField::new(*spec, prefill(record, spec.name)))
                .collect(),
            focused: 0,
            submitting: false,
            submission: None,
            error: None,
        })
    }

    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Create => format!("New {}", self.resource.singular()),
            FormMode::Edit { .. } => format!("Edit {}", self.resource.singular()),
        }
    }

    pub fn focused_field(&self) -> Option<&FormField> {
        self.fields.get(self.focused)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Append a character to the focused field and clear its error.
    ///
    pub fn insert_char(&mut self, c: char) {
        if self.submitting {
            return;
        }
        if let Some(field) = self.fields.get_mut(self.focused) {
            field.value.push(c);
            field.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if self.submitting {
            return;
        }
        if let Some(field) = self.fields.get_mut(self.focused) {
            field.value.pop();
            field.error = None;
        }
    }

    /// Check every field and record inline errors. Focus moves to the first
    /// invalid field. Returns true if the form may be submitted.
    ///
    pub fn validate(&mut self) -> bool {
        let mut first_invalid = None;
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.error = check(&field.spec, &field.value);
            if field.error.is_some() && first_invalid.is_none() {
                first_invalid = Some(index);
            }
        }
        match first_invalid {
            Some(index) => {
                self.focused = index;
                false
            }
            None => true,
        }
    }

    /// Build the JSON body. Numbers are sent as numbers and blank optional
    /// fields are left out.
    ///
    pub fn to_payload(&self) -> Value {
        let mut body = Map::new();
        for field in &self.fields {
            let value = field.value.trim();
            if value.is_empty() {
                continue;
            }
            let json = match field.spec.kind {
                FieldKind::Number => number(value).unwrap_or_else(|| Value::String(value.to_owned())),
                FieldKind::Multiline => Value::String(field.value.clone()),
                FieldKind::Text | FieldKind::Email => Value::String(value.to_owned()),
            };
            body.insert(field.spec.name.to_owned(), json);
        }
        Value::Object(body)
    }

    pub fn to_mutation(&self) -> Mutation {
        match self.mode {
            FormMode::Create => Mutation::create(self.resource, self.to_payload()),
            FormMode::Edit { ref id } => Mutation::update(self.resource, id, self.to_payload()),
        }
    }

    /// Mark the form as waiting for the server.
    ///
    pub fn start_submit(&mut self, submission: u64) {
        self.submitting = true;
        self.submission = Some(submission);
        self.error = None;
    }

    /// Reopen the form for input after the server refused it. Values stay.
    ///
    pub fn fail_submit(&mut self, message: String) {
        self.submitting = false;
        self.submission = None;
        self.error = Some(message);
    }
}

fn prefill(record: &Record, name: &str) -> String {
    let value = record.field(name);
    if !value.is_empty() {
        return value;
    }
    // `courseId` is often returned as an embedded `course` object.
    match name.strip_suffix("Id") {
        Some(object) => {
            let nested = record.field(&format!("{}.id", object));
            if nested.is_empty() {
                record.field(&format!("{}._id", object))
            } else {
                nested
            }
        }
        None => String::new(),
    }
}

fn check(spec: &FieldSpec, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return if spec.required {
            Some(format!("{} is required", spec.label))
        } else {
            None
        };
    }
    match spec.kind {
        FieldKind::Email if !is_email(value) => Some("Enter a valid e-mail address".to_string()),
        FieldKind::Number if number(value).is_none() => Some(format!("{} must be a number", spec.label)),
        _ => None,
    }
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

fn number(value: &str) -> Option<Value> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fill(form: &mut FormState, values: &[&str]) {
        for (index, value) in values.iter().enumerate() {
            form.focused = index;
            for c in value.chars() {
                form.insert_char(c);
            }
        }
    }

    #[test]
    fn test_create_read_only_resource() {
        let result = FormState::create(Resource::Orders);
        assert!(matches!(result, Err(StateError::ReadOnly("Orders"))));
    }

    #[test]
    fn test_required_fields() {
        let mut form = FormState::create(Resource::Users).unwrap();
        assert!(!form.validate());
        assert_eq!(form.fields[0].error.as_deref(), Some("Name is required"));
        assert_eq!(form.fields[1].error.as_deref(), Some("Email is required"));
        assert_eq!(form.fields[2].error, None);
        assert_eq!(form.focused, 0);
    }

    #[test]
    fn test_email_shape() {
        let mut form = FormState::create(Resource::Users).unwrap();
        fill(&mut form, &["Ada", "ada@"]);
        assert!(!form.validate());
        assert_eq!(form.focused, 1);
        assert!(form.fields[1].error.is_some());

        form.focused = 1;
        for c in "example.com".chars() {
            form.insert_char(c);
        }
        assert!(form.fields[1].error.is_none());
        assert!(form.validate());
    }

    #[test]
    fn test_is_email() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a b@c.com"));
        assert!(!is_email("@b.com"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a@.com"));
        assert!(!is_email("a@b@c.com"));
    }

    #[test]
    fn test_number_field() {
        let mut form = FormState::create(Resource::Courses).unwrap();
        fill(&mut form, &["Rust", "", "cheap"]);
        assert!(!form.validate());
        assert_eq!(form.fields[2].error.as_deref(), Some("Price must be a number"));
    }

    #[test]
    fn test_payload_types_and_omissions() {
        let mut form = FormState::create(Resource::Courses).unwrap();
        fill(&mut form, &["  Rust basics ", "", "19.5"]);
        assert!(form.validate());
        assert_eq!(
            form.to_payload(),
            json!({ "title": "Rust basics", "price": 19.5 })
        );

        let mut form = FormState::create(Resource::Tests).unwrap();
        fill(&mut form, &["Final", "c1", "70"]);
        assert_eq!(
            form.to_payload(),
            json!({ "title": "Final", "courseId": "c1", "passScore": 70 })
        );
    }

    #[test]
    fn test_edit_prefills_and_targets_id() {
        let record = Record::from(json!({
            "_id": "t9",
            "title": "Midterm",
            "course": { "id": "c3", "title": "Rust" },
            "passScore": 60
        }));
        let form = FormState::edit(Resource::Tests, &record).unwrap();
        assert_eq!(form.mode, FormMode::Edit { id: "t9".to_string() });
        assert_eq!(form.fields[0].value, "Midterm");
        assert_eq!(form.fields[1].value, "c3");
        assert_eq!(form.fields[2].value, "60");
        assert_eq!(form.title(), "Edit test");

        let mutation = form.to_mutation();
        assert_eq!(mutation.describe(), "Update test");
    }

    #[test]
    fn test_edit_without_id() {
        let record = Record::from(json!({ "title": "Orphan" }));
        let result = FormState::edit(Resource::Courses, &record);
        assert!(matches!(result, Err(StateError::MissingId)));
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = FormState::create(Resource::Companies).unwrap();
        form.previous_field();
        assert_eq!(form.focused, 2);
        form.next_field();
        assert_eq!(form.focused, 0);
    }

    #[test]
    fn test_input_ignored_while_submitting() {
        let mut form = FormState::create(Resource::Companies).unwrap();
        form.insert_char('A');
        form.start_submit(1);
        form.insert_char('B');
        form.backspace();
        assert_eq!(form.fields[0].value, "A");

        form.fail_submit("Name taken".to_string());
        assert!(!form.submitting);
        assert_eq!(form.submission, None);
        assert_eq!(form.error.as_deref(), Some("Name taken"));
        assert_eq!(form.fields[0].value, "A");
    }
}
