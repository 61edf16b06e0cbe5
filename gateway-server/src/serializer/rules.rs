//! Shared Program validation rules
//!
//! Every field is checked and every failure recorded before returning, so a
//! rejected submission reports all of its problems at once. Fields are
//! visited in declaration order, which fixes the key order of the report.

use gateway_core::artifact;
use gateway_core::domain::program::{DEFAULT_VERSION, DEFAULT_WORKING_DIR};
use gateway_core::dto::errors::FieldErrors;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{FormValue, NewProgram, ProgramForm};

/// Longest accepted value for bounded text fields
pub const MAX_TEXT_LEN: usize = 255;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const NULL: &str = "This field may not be null.";
const NOT_A_STRING: &str = "Not a valid string.";
const INVALID_JSON: &str = "Value must be valid JSON.";
const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
const NO_FILE: &str = "No file was submitted.";
const NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";
const EMPTY_FILE: &str = "The submitted file is empty.";
const NULL_CHARACTER: &str = "Null characters are not allowed.";

/// Validate a submitted form against the shared Program rules.
pub fn validate(form: ProgramForm) -> Result<NewProgram, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = record(&mut errors, "title", text(&form, "title", None));
    let description = record(&mut errors, "description", optional_text(&form, "description"));
    let entrypoint = record(&mut errors, "entrypoint", text(&form, "entrypoint", None));
    let working_dir = record(
        &mut errors,
        "working_dir",
        text(&form, "working_dir", Some(DEFAULT_WORKING_DIR)),
    );
    let version = record(
        &mut errors,
        "version",
        text(&form, "version", Some(DEFAULT_VERSION)),
    );
    let artifact = record(&mut errors, "artifact", artifact_file(&form));
    let dependencies = record(&mut errors, "dependencies", string_list(&form, "dependencies"));
    let env_vars = record(&mut errors, "env_vars", string_map(&form, "env_vars"));
    let arguments = record(&mut errors, "arguments", string_map(&form, "arguments"));
    let tags = record(&mut errors, "tags", string_list(&form, "tags")).map(dedupe);
    let public = record(&mut errors, "public", boolean(&form, "public"));

    match (
        title,
        description,
        entrypoint,
        working_dir,
        version,
        artifact,
        dependencies,
        env_vars,
        arguments,
        tags,
        public,
    ) {
        (
            Some(title),
            Some(description),
            Some(entrypoint),
            Some(working_dir),
            Some(version),
            Some(artifact),
            Some(dependencies),
            Some(env_vars),
            Some(arguments),
            Some(tags),
            Some(public),
        ) if errors.is_empty() => Ok(NewProgram {
            title,
            description,
            entrypoint,
            working_dir,
            version,
            dependencies,
            env_vars,
            arguments,
            tags,
            public,
            artifact,
        }),
        _ => Err(errors),
    }
}

fn record<T>(errors: &mut FieldErrors, field: &str, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

// =============================================================================
// Text
// =============================================================================

/// Bounded, non-blank text. `default` applies only when the field is absent.
fn text(form: &ProgramForm, name: &str, default: Option<&str>) -> Result<String, String> {
    let raw = match form.value(name) {
        None => return default.map(str::to_string).ok_or_else(|| REQUIRED.to_string()),
        Some(value) => scalar_text(value)?,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BLANK.to_string());
    }
    reject_null(trimmed)?;
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            MAX_TEXT_LEN
        ));
    }
    Ok(trimmed.to_string())
}

/// Unbounded text that may be absent, null or blank.
fn optional_text(form: &ProgramForm, name: &str) -> Result<Option<String>, String> {
    match form.value(name) {
        None | Some(FormValue::Json(Value::Null)) => Ok(None),
        Some(value) => {
            let raw = scalar_text(value)?;
            let trimmed = raw.trim();
            reject_null(trimmed)?;
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
    }
}

fn scalar_text(value: &FormValue) -> Result<String, String> {
    match value {
        FormValue::Text(s) => Ok(s.clone()),
        FormValue::Json(Value::String(s)) => Ok(s.clone()),
        FormValue::Json(Value::Number(n)) => Ok(n.to_string()),
        FormValue::Json(Value::Bool(b)) => Ok(b.to_string()),
        FormValue::Json(Value::Null) => Err(NULL.to_string()),
        FormValue::Json(_) => Err(NOT_A_STRING.to_string()),
    }
}

/// The store cannot hold U+0000 in text.
fn reject_null(s: &str) -> Result<(), String> {
    if s.contains('\0') {
        return Err(NULL_CHARACTER.to_string());
    }
    Ok(())
}

// =============================================================================
// Structured fields
// =============================================================================

/// Decode a structured field. Absent, null and empty form text all mean
/// "not supplied".
fn structured(form: &ProgramForm, name: &str) -> Result<Option<Value>, String> {
    let value = match form.value(name) {
        None => return Ok(None),
        Some(FormValue::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(FormValue::Text(s)) => {
            serde_json::from_str(s).map_err(|_| INVALID_JSON.to_string())?
        }
        Some(FormValue::Json(v)) => v.clone(),
    };

    Ok(match value {
        Value::Null => None,
        other => Some(other),
    })
}

fn string_list(form: &ProgramForm, name: &str) -> Result<Vec<String>, String> {
    match structured(form, name)? {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => reject_null(&s).map(|_| s),
                _ => Err("Expected a list of strings.".to_string()),
            })
            .collect(),
        Some(other) => Err(format!(
            "Expected a list of items but got type \"{}\".",
            json_type(&other)
        )),
    }
}

fn string_map(form: &ProgramForm, name: &str) -> Result<BTreeMap<String, String>, String> {
    match structured(form, name)? {
        None => Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries
            .into_iter()
            .map(|(key, value)| {
                reject_null(&key)?;
                let value = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => {
                        return Err(format!(
                            "Value for key \"{}\" must be a string, number or boolean.",
                            key
                        ));
                    }
                };
                reject_null(&value)?;
                Ok((key, value))
            })
            .collect(),
        Some(other) => Err(format!(
            "Expected a dictionary of items but got type \"{}\".",
            json_type(&other)
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Drop repeated entries, keeping first occurrences in order.
fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

// =============================================================================
// Scalars
// =============================================================================

fn boolean(form: &ProgramForm, name: &str) -> Result<bool, String> {
    match form.value(name) {
        None => Ok(false),
        Some(FormValue::Json(Value::Bool(b))) => Ok(*b),
        Some(FormValue::Json(Value::Null)) => Err(NULL.to_string()),
        Some(FormValue::Json(Value::Number(n))) => match n.as_u64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(INVALID_BOOLEAN.to_string()),
        },
        Some(FormValue::Text(s)) | Some(FormValue::Json(Value::String(s))) => parse_bool(s),
        Some(FormValue::Json(_)) => Err(INVALID_BOOLEAN.to_string()),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "off" | "0" | "" => Ok(false),
        _ => Err(INVALID_BOOLEAN.to_string()),
    }
}

// =============================================================================
// Artifact
// =============================================================================

fn artifact_file(form: &ProgramForm) -> Result<bytes::Bytes, String> {
    let Some(upload) = form.artifact() else {
        return Err(match form.value("artifact") {
            Some(FormValue::Text(s)) if !s.is_empty() => NOT_A_FILE.to_string(),
            Some(FormValue::Json(Value::String(s))) if !s.is_empty() => NOT_A_FILE.to_string(),
            Some(FormValue::Json(v)) if !v.is_null() && !v.is_string() => NOT_A_FILE.to_string(),
            _ => NO_FILE.to_string(),
        });
    };

    if upload.data.is_empty() {
        return Err(EMPTY_FILE.to_string());
    }

    artifact::inspect(&upload.data)
        .map_err(|e| format!("Upload a valid tar archive ({}).", e))?;

    Ok(upload.data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::Upload;
    use bytes::Bytes;
    use serde_json::json;

    fn tar_bytes() -> Bytes {
        let mut builder = tar::Builder::new(Vec::new());
        let content = b"print('hello')\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "program.py", &content[..])
            .unwrap();
        Bytes::from(builder.into_inner().unwrap())
    }

    /// A complete multipart-style submission
    fn valid_form() -> ProgramForm {
        let mut form = text_fields();
        form.set_artifact(Upload { data: tar_bytes() });
        form
    }

    /// Every text field of a valid submission, without the archive
    fn text_fields() -> ProgramForm {
        let mut form = ProgramForm::new();
        form.insert_text("title", "Awesome program");
        form.insert_text("description", "Awesome program description");
        form.insert_text("entrypoint", "program.py");
        form.insert_text("working_dir", "./");
        form.insert_text("version", "0.0.1");
        form.insert_text("env_vars", r#"{"DEBUG": true}"#);
        form.insert_text("arguments", "{}");
        form.insert_text("tags", r#"["dev"]"#);
        form.insert_text("dependencies", "[]");
        form.insert_text("public", "True");
        form
    }

    fn failed_fields(form: ProgramForm) -> Vec<String> {
        validate(form)
            .unwrap_err()
            .fields()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_valid_form() {
        let program = validate(valid_form()).unwrap();
        assert_eq!(program.title, "Awesome program");
        assert_eq!(program.entrypoint, "program.py");
        assert_eq!(program.version, "0.0.1");
        assert_eq!(program.env_vars.get("DEBUG").map(String::as_str), Some("true"));
        assert_eq!(program.tags, vec!["dev".to_string()]);
        assert!(program.dependencies.is_empty());
        assert!(program.public);
    }

    #[test]
    fn test_empty_form_reports_required_fields() {
        assert_eq!(
            failed_fields(ProgramForm::new()),
            vec!["title", "entrypoint", "artifact"]
        );
    }

    #[test]
    fn test_absent_fields_take_defaults() {
        let mut form = valid_form();
        form.values.remove("working_dir");
        form.values.remove("version");
        form.values.remove("public");

        let program = validate(form).unwrap();
        assert_eq!(program.working_dir, DEFAULT_WORKING_DIR);
        assert_eq!(program.version, DEFAULT_VERSION);
        assert!(!program.public);
    }

    #[test]
    fn test_blank_values_are_rejected() {
        let body = json!({
            "title": "",
            "description": "",
            "entrypoint": "",
            "working_dir": "",
            "version": "",
            "dependencies": null,
            "env_vars": null,
            "arguments": null,
            "tags": null,
            "public": true,
        });
        let Value::Object(object) = body else { unreachable!() };

        let errors = validate(ProgramForm::from_json_object(object)).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(
            fields,
            vec!["title", "entrypoint", "working_dir", "version", "artifact"]
        );
        assert_eq!(errors.get("title"), Some(&[BLANK.to_string()][..]));
        assert_eq!(errors.get("artifact"), Some(&[NO_FILE.to_string()][..]));
    }

    #[test]
    fn test_whitespace_only_is_blank() {
        let mut form = valid_form();
        form.insert_text("title", "   ");
        assert_eq!(failed_fields(form), vec!["title"]);
    }

    #[test]
    fn test_mappings_for_lists_are_rejected() {
        let mut form = valid_form();
        form.insert_text("dependencies", "{}");
        form.insert_text("arguments", "null");
        form.insert_text("tags", "{}");

        let errors = validate(form).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["dependencies", "tags"]);
        assert_eq!(
            errors.get("tags"),
            Some(&["Expected a list of items but got type \"object\".".to_string()][..])
        );
    }

    #[test]
    fn test_lists_for_mappings_are_rejected() {
        let mut form = valid_form();
        form.insert_text("env_vars", "[]");
        form.insert_text("arguments", "[]");

        assert_eq!(failed_fields(form), vec!["env_vars", "arguments"]);
    }

    #[test]
    fn test_non_tar_artifact_is_rejected() {
        let mut form = valid_form();
        form.set_artifact(Upload { data: Bytes::from_static(br#"[{"model": "api.program"}]"#) });

        assert_eq!(failed_fields(form), vec!["artifact"]);
    }

    #[test]
    fn test_empty_artifact_is_rejected() {
        let mut form = valid_form();
        form.set_artifact(Upload { data: Bytes::new() });

        let errors = validate(form).unwrap_err();
        assert_eq!(errors.get("artifact"), Some(&[EMPTY_FILE.to_string()][..]));
    }

    #[test]
    fn test_artifact_as_text_is_not_a_file() {
        let mut form = text_fields();
        form.insert_text("artifact", "artifact.tar");

        let errors = validate(form).unwrap_err();
        assert_eq!(errors.get("artifact"), Some(&[NOT_A_FILE.to_string()][..]));
    }

    #[test]
    fn test_null_characters_are_rejected() {
        let mut form = valid_form();
        form.insert_text("title", "Awesome\0program");
        form.insert_text("description", "\0");
        form.insert_text("tags", r#"["dev", "a\u0000b"]"#);
        form.insert_text("env_vars", r#"{"KEY\u0000": "value"}"#);
        form.insert_text("arguments", r#"{"key": "va\u0000lue"}"#);

        let errors = validate(form).unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["title", "description", "env_vars", "arguments", "tags"]
        );
        for field in ["title", "description", "env_vars", "arguments", "tags"] {
            assert_eq!(errors.get(field), Some(&[NULL_CHARACTER.to_string()][..]));
        }
    }

    #[test]
    fn test_invalid_json_text() {
        let mut form = valid_form();
        form.insert_text("dependencies", "[not json");

        let errors = validate(form).unwrap_err();
        assert_eq!(errors.get("dependencies"), Some(&[INVALID_JSON.to_string()][..]));
    }

    #[test]
    fn test_list_items_must_be_strings() {
        let mut form = valid_form();
        form.insert_text("tags", "[1, 2]");
        assert_eq!(failed_fields(form), vec!["tags"]);
    }

    #[test]
    fn test_nested_mapping_values_are_rejected() {
        let mut form = valid_form();
        form.insert_text("env_vars", r#"{"A": {"nested": 1}}"#);
        assert_eq!(failed_fields(form), vec!["env_vars"]);
    }

    #[test]
    fn test_scalar_mapping_values_become_text() {
        let mut form = valid_form();
        form.insert_text("arguments", r#"{"shots": 1024, "verbose": false, "name": "x"}"#);

        let program = validate(form).unwrap();
        assert_eq!(program.arguments.get("shots").map(String::as_str), Some("1024"));
        assert_eq!(program.arguments.get("verbose").map(String::as_str), Some("false"));
        assert_eq!(program.arguments.get("name").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_tags_are_deduplicated() {
        let mut form = valid_form();
        form.insert_text("tags", r#"["dev", "qa", "dev"]"#);

        let program = validate(form).unwrap();
        assert_eq!(program.tags, vec!["dev".to_string(), "qa".to_string()]);
    }

    #[test]
    fn test_boolean_spellings() {
        for (raw, expected) in [("true", true), ("False", false), ("1", true), ("off", false)] {
            let mut form = valid_form();
            form.insert_text("public", raw);
            assert_eq!(validate(form).unwrap().public, expected, "input {:?}", raw);
        }

        let mut form = valid_form();
        form.insert_text("public", "maybe");
        assert_eq!(failed_fields(form), vec!["public"]);
    }

    #[test]
    fn test_long_title_is_rejected() {
        let mut form = valid_form();
        form.insert_text("title", "x".repeat(MAX_TEXT_LEN + 1));
        assert_eq!(failed_fields(form), vec!["title"]);
    }

    #[test]
    fn test_errors_follow_declaration_order() {
        let mut form = ProgramForm::new();
        form.insert_text("public", "maybe");
        form.insert_text("tags", "{}");
        form.insert_text("version", "");

        assert_eq!(
            failed_fields(form),
            vec!["title", "entrypoint", "version", "artifact", "tags", "public"]
        );
    }
}
