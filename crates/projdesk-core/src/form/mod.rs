//! Form state
//!
//! A small form model: declared fields, their current values, and the
//! per-field errors produced by the mandatory-field rules. Records are bound
//! from and submitted as JSON objects so any resource can use it.

pub mod format;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::SelectOption;
use crate::error::{Error, Result};

/// Widget kind of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Single-line text
    Input,
    /// Multi-line text
    TextArea { rows: u16 },
    /// One of a fixed option list
    Select { options: Vec<SelectOption> },
    /// Numeric input with a floor and a step
    Number {
        min: f64,
        step: f64,
        integer: bool,
        grouped: bool,
    },
    /// Calendar date shown as `DD.MM.YYYY`
    Date,
}

/// Declaration of one form field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: Option<&'static str>,
    /// Help text shown under the field
    pub help: Option<&'static str>,
    pub kind: FieldKind,
    /// Message shown when a mandatory field is empty
    pub required: Option<&'static str>,
}

impl FieldSpec {
    fn with_kind(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            placeholder: None,
            help: None,
            kind,
            required: None,
        }
    }

    pub fn input(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Input)
    }

    pub fn textarea(name: &'static str, label: &'static str, rows: u16) -> Self {
        Self::with_kind(name, label, FieldKind::TextArea { rows })
    }

    pub fn select(name: &'static str, label: &'static str, options: Vec<SelectOption>) -> Self {
        Self::with_kind(name, label, FieldKind::Select { options })
    }

    pub fn number(name: &'static str, label: &'static str, min: f64) -> Self {
        Self::with_kind(
            name,
            label,
            FieldKind::Number {
                min,
                step: 1.0,
                integer: false,
                grouped: false,
            },
        )
    }

    pub fn date(name: &'static str, label: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Date)
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    /// Set the step of a number field
    pub fn step(mut self, value: f64) -> Self {
        if let FieldKind::Number { step, .. } = &mut self.kind {
            *step = value;
        }
        self
    }

    /// Restrict a number field to whole numbers
    pub fn integer(mut self) -> Self {
        if let FieldKind::Number { integer, .. } = &mut self.kind {
            *integer = true;
        }
        self
    }

    /// Display a number field with thousands grouping
    pub fn grouped(mut self) -> Self {
        if let FieldKind::Number { grouped, .. } = &mut self.kind {
            *grouped = true;
        }
        self
    }

    pub fn is_required(&self) -> bool {
        self.required.is_some()
    }
}

/// Current value of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Option<f64>),
    Choice(Option<String>),
    Date(Option<NaiveDate>),
}

impl FieldValue {
    /// The empty value for a widget kind
    pub fn empty(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Input | FieldKind::TextArea { .. } => FieldValue::Text(String::new()),
            FieldKind::Select { .. } => FieldValue::Choice(None),
            FieldKind::Number { .. } => FieldValue::Number(None),
            FieldKind::Date => FieldValue::Date(None),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Number(n) => n.is_none(),
            FieldValue::Choice(c) => c.is_none(),
            FieldValue::Date(d) => d.is_none(),
        }
    }

    fn from_json(field: &FieldSpec, value: &Value) -> Self {
        match &field.kind {
            FieldKind::Input | FieldKind::TextArea { .. } => FieldValue::Text(match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            FieldKind::Select { options } => {
                let raw = match value {
                    Value::Null => return FieldValue::Choice(None),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if options.iter().any(|o| o.value == raw) {
                    FieldValue::Choice(Some(raw))
                } else {
                    warn!(field = field.name, value = %raw, "Unknown option in record, leaving field empty");
                    FieldValue::Choice(None)
                }
            }
            FieldKind::Number { min, integer, .. } => match format::number_from_value(value) {
                Some(n) if n < *min || (*integer && n.fract() != 0.0) => {
                    warn!(field = field.name, value = n, "Out-of-range number in record, leaving field empty");
                    FieldValue::Number(None)
                }
                other => FieldValue::Number(other),
            },
            FieldKind::Date => FieldValue::Date(format::parse_deadline(value)),
        }
    }

    fn to_json(&self, required: bool) -> Value {
        match self {
            FieldValue::Text(s) if s.is_empty() && !required => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => n.map(format::number_to_value).unwrap_or(Value::Null),
            FieldValue::Choice(c) => c.clone().map(Value::String).unwrap_or(Value::Null),
            FieldValue::Date(d) => format::deadline_to_wire(*d),
        }
    }
}

/// A field-level error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field errors in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for a field, if it has one
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn set(&mut self, field: &str, message: &str) {
        match self.0.iter_mut().find(|e| e.field == field) {
            Some(existing) => existing.message = message.to_string(),
            None => self.0.push(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }),
        }
    }

    fn remove(&mut self, field: &str) {
        self.0.retain(|e| e.field != field);
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Values and errors of a declared set of fields
#[derive(Debug, Clone)]
pub struct FormState {
    fields: Vec<FieldSpec>,
    values: Vec<FieldValue>,
    initial: Vec<FieldValue>,
    errors: ValidationErrors,
}

impl FormState {
    /// Create a form with every field empty
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let values: Vec<FieldValue> = fields.iter().map(|f| FieldValue::empty(&f.kind)).collect();
        Self {
            initial: values.clone(),
            values,
            fields,
            errors: ValidationErrors::default(),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.index_of(name).ok().map(|i| &self.values[i])
    }

    /// Bind a record; keys the form does not declare are ignored
    pub fn populate(&mut self, record: &Value) -> Result<()> {
        let object = record
            .as_object()
            .ok_or_else(|| Error::InvalidInput("record is not a JSON object".to_string()))?;

        self.values = self
            .fields
            .iter()
            .map(|field| match object.get(field.name) {
                Some(value) => FieldValue::from_json(field, value),
                None => FieldValue::empty(&field.kind),
            })
            .collect();
        self.initial = self.values.clone();
        self.errors = ValidationErrors::default();
        Ok(())
    }

    /// Set a field from user-typed text
    pub fn set_input(&mut self, name: &str, input: &str) -> Result<()> {
        let index = self.index_of(name)?;
        let value = match &self.fields[index].kind {
            FieldKind::Input | FieldKind::TextArea { .. } => FieldValue::Text(input.to_string()),
            FieldKind::Select { options } => {
                let input = input.trim();
                if input.is_empty() {
                    FieldValue::Choice(None)
                } else {
                    let option = options
                        .iter()
                        .find(|o| o.value == input || o.label == input)
                        .ok_or_else(|| {
                            Error::InvalidInput(format!("'{}' is not an option of {}", input, name))
                        })?;
                    FieldValue::Choice(Some(option.value.clone()))
                }
            }
            FieldKind::Number { min, integer, .. } => match format::parse_grouped(input)? {
                Some(n) if *integer && n.fract() != 0.0 => {
                    return Err(Error::InvalidInput(format!("{} must be a whole number", name)));
                }
                Some(n) => FieldValue::Number(Some(n.max(*min))),
                None => FieldValue::Number(None),
            },
            FieldKind::Date => FieldValue::Date(format::parse_date_input(input)?),
        };
        self.values[index] = value;
        self.revalidate(index);
        Ok(())
    }

    /// Step a number field up (`direction > 0`) or down, stopping at its floor
    pub fn step(&mut self, name: &str, direction: i32) -> Result<()> {
        let index = self.index_of(name)?;
        let FieldKind::Number { min, step, .. } = self.fields[index].kind else {
            return Err(Error::InvalidInput(format!("{} is not a number field", name)));
        };
        let next = match self.values[index] {
            FieldValue::Number(Some(current)) => (current + step * f64::from(direction.signum())).max(min),
            _ => min,
        };
        self.values[index] = FieldValue::Number(Some(next));
        self.revalidate(index);
        Ok(())
    }

    /// Move a select field to the next (`direction > 0`) or previous option
    pub fn cycle_option(&mut self, name: &str, direction: i32) -> Result<()> {
        let index = self.index_of(name)?;
        let FieldKind::Select { options } = &self.fields[index].kind else {
            return Err(Error::InvalidInput(format!("{} is not a select field", name)));
        };
        if options.is_empty() {
            return Ok(());
        }

        let len = options.len();
        let current = match &self.values[index] {
            FieldValue::Choice(Some(value)) => options.iter().position(|o| &o.value == value),
            _ => None,
        };
        let next = match (current, direction >= 0) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        self.values[index] = FieldValue::Choice(Some(options[next].value.clone()));
        self.revalidate(index);
        Ok(())
    }

    /// Empty a field
    pub fn clear(&mut self, name: &str) -> Result<()> {
        let index = self.index_of(name)?;
        self.values[index] = FieldValue::empty(&self.fields[index].kind);
        self.revalidate(index);
        Ok(())
    }

    /// Text shown by the field's widget
    pub fn display(&self, name: &str) -> String {
        let Ok(index) = self.index_of(name) else {
            return String::new();
        };
        match (&self.values[index], &self.fields[index].kind) {
            (FieldValue::Text(s), _) => s.clone(),
            (FieldValue::Number(Some(n)), FieldKind::Number { grouped: true, .. }) => {
                format::format_grouped(*n)
            }
            (FieldValue::Number(Some(n)), _) => n.to_string(),
            (FieldValue::Choice(Some(value)), FieldKind::Select { options }) => options
                .iter()
                .find(|o| &o.value == value)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| value.clone()),
            (FieldValue::Choice(Some(value)), _) => value.clone(),
            (FieldValue::Date(Some(date)), _) => format::format_date(*date),
            _ => String::new(),
        }
    }

    /// Check every mandatory field; errors are kept on the form
    pub fn validate(&mut self) -> std::result::Result<(), ValidationErrors> {
        for index in 0..self.fields.len() {
            self.revalidate(index);
        }
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.clone())
        }
    }

    fn revalidate(&mut self, index: usize) {
        let field = &self.fields[index];
        match field.required {
            Some(message) if self.values[index].is_empty() => self.errors.set(field.name, message),
            _ => self.errors.remove(field.name),
        }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name)
    }

    /// All current values keyed by field name
    pub fn values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.name.to_string(), value.to_json(field.is_required())))
            .collect()
    }

    /// Whether any value differs from the last populated record
    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }
}
