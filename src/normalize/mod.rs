//! Result Normalizer
//!
//! Turns store result rows into flat, string-only records:
//!
//! - every declared field is present; unbound variables become `""`
//! - IRIs are reduced to their fragment (text after the last `#`)
//! - `xsd:double`/`xsd:float` literals with no fractional part render as
//!   integers (`4.0` → `"4"`), others as plain decimals (`4.50` → `"4.5"`)
//! - every other literal keeps its lexical text
//!
//! Output records keep the declared field order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::ns;
use crate::results::{Binding, TermKind, TypedValue};

/// A flat record with plain string fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRecord(IndexMap<String, String>);

impl NormalizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names in order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rename fields in place of their old position; unknown names are ignored
    pub fn renamed(self, mapping: &[(&str, &str)]) -> Self {
        let renamed = self
            .0
            .into_iter()
            .map(|(field, value)| {
                let field = mapping
                    .iter()
                    .find(|(from, _)| *from == field)
                    .map(|(_, to)| to.to_string())
                    .unwrap_or(field);
                (field, value)
            })
            .collect();
        Self(renamed)
    }

    pub fn into_inner(self) -> IndexMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NormalizedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Normalize every row against the declared fields
pub fn normalize(bindings: &[Binding], fields: &[&str]) -> Vec<NormalizedRecord> {
    bindings
        .iter()
        .map(|binding| normalize_binding(binding, fields))
        .collect()
}

/// Normalize one row; variables outside `fields` are dropped
pub fn normalize_binding(binding: &Binding, fields: &[&str]) -> NormalizedRecord {
    fields
        .iter()
        .map(|field| {
            let value = binding.get(field).map(render_value).unwrap_or_default();
            (*field, value)
        })
        .collect()
}

/// Plain-string rendering of a single bound value
pub fn render_value(value: &TypedValue) -> String {
    match value.kind {
        TermKind::Uri => ns::fragment(&value.value).to_string(),
        TermKind::BlankNode => value.value.clone(),
        TermKind::Literal | TermKind::TypedLiteral => {
            if value.is_floating_point() {
                render_floating_point(&value.value)
            } else {
                value.value.clone()
            }
        }
    }
}

/// Render a double/float lexical form: integral values without a
/// fractional part, everything else as a plain decimal
///
/// Lexical forms that do not parse to a finite number (`NaN`, `INF`,
/// garbage) are returned unchanged.
pub fn render_floating_point(lexical: &str) -> String {
    match lexical.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => {
            if number.fract() == 0.0 {
                format!("{:.0}", number)
            } else {
                number.to_string()
            }
        }
        _ => lexical.to_string(),
    }
}
