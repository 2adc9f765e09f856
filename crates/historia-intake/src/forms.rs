//! Form collection and validation against the field schema.

use std::collections::BTreeMap;
use std::fmt;

use historia_core::models::intake::ApplicationState;
use historia_core::models::screen::Screen;
use historia_core::schema::{self, FieldKind};

/// Raw values entered on one form screen, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> &str {
        self.values.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.values.insert(id.into(), value.into());
    }

    pub fn with(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(id, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Required fields left empty on a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub screen: Screen,
    pub missing: Vec<&'static str>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "required fields missing on {}: {}",
            self.screen,
            self.missing.join(", ")
        )
    }
}

/// Check every required field of `screen`. Whitespace-only counts as empty.
pub fn validate(screen: Screen, values: &FormValues) -> ValidationReport {
    let missing = schema::fields_for(screen)
        .iter()
        .filter(|f| f.required && values.get(f.id).trim().is_empty())
        .map(|f| f.id)
        .collect();
    ValidationReport { screen, missing }
}

/// Copy every field of `screen` from `values` into `state`, as entered.
///
/// Choice fields left blank take the field default.
pub fn collect(screen: Screen, values: &FormValues, state: &mut ApplicationState) {
    for spec in schema::fields_for(screen) {
        let entered = values.get(spec.id);
        let value = match spec.kind {
            FieldKind::Choice(_) if entered.trim().is_empty() => spec.default,
            _ => entered,
        };
        if let Some(slot) = state.field_mut(spec.id) {
            *slot = value.to_string();
        }
    }
}

/// Pre-fill a form from state for editing. The inverse of [`collect`].
pub fn populate_for_edit(screen: Screen, state: &ApplicationState) -> FormValues {
    schema::fields_for(screen)
        .iter()
        .map(|spec| {
            let stored = state.field(spec.id).unwrap_or("");
            let value = if stored.is_empty() { spec.default } else { stored };
            (spec.id, value)
        })
        .collect()
}
