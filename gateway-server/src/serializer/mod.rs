//! Serializer Module
//!
//! Per-version validation and representation of Programs.
//!
//! Every API version mounts the same handlers through
//! [`api::program::router`](crate::api::program::router) and differs only in
//! the [`ProgramSerializer`] it passes in. The provided trait methods carry the
//! shared rules from [`rules`]; a version overrides a method only when its
//! contract diverges.

pub mod rules;
pub mod v1;

use bytes::Bytes;
use gateway_core::domain::program::Program;
use gateway_core::dto::errors::FieldErrors;
use gateway_core::dto::program::ProgramView;
use std::collections::{BTreeMap, HashMap};

pub use v1::ProgramSerializerV1;

/// Validation and representation strategy for one API version
pub trait ProgramSerializer: Send + Sync {
    /// Path segment the version is mounted under (`"v1"`)
    fn version(&self) -> &'static str;

    /// Check a submitted form, collecting every field error.
    fn validate(&self, form: ProgramForm) -> Result<NewProgram, FieldErrors> {
        rules::validate(form)
    }

    /// Render a stored program.
    fn represent(&self, program: &Program) -> ProgramView {
        ProgramView::new(program, self.version())
    }
}

/// A raw submitted field value
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Multipart text part; structured fields hold JSON text
    Text(String),
    /// Member of a JSON request body
    Json(serde_json::Value),
}

/// An uploaded file part
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub data: Bytes,
}

/// Submitted create request before validation
#[derive(Debug, Clone, Default)]
pub struct ProgramForm {
    values: HashMap<String, FormValue>,
    artifact: Option<Upload>,
}

impl ProgramForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a form from the members of a JSON object body.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let values = object
            .into_iter()
            .map(|(name, value)| (name, FormValue::Json(value)))
            .collect();
        Self {
            values,
            artifact: None,
        }
    }

    /// Set a text value; a repeated name keeps the last value.
    pub fn insert_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), FormValue::Text(value.into()));
    }

    pub fn set_artifact(&mut self, upload: Upload) {
        self.artifact = Some(upload);
    }

    pub fn value(&self, name: &str) -> Option<&FormValue> {
        self.values.get(name)
    }

    pub fn artifact(&self) -> Option<&Upload> {
        self.artifact.as_ref()
    }
}

/// A validated create request, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewProgram {
    pub title: String,
    pub description: Option<String>,
    pub entrypoint: String,
    pub working_dir: String,
    pub version: String,
    pub dependencies: Vec<String>,
    pub env_vars: BTreeMap<String, String>,
    pub arguments: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub public: bool,
    pub artifact: Bytes,
}
