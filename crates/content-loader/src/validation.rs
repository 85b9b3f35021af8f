//! Structural validation of a loaded content bundle
//!
//! Validation works on the JSON form of a bundle so that absent or malformed
//! sections can be reported; typed bundles go through [`validate_bundle`].

use chronicle_core::{ContentBundle, ContentValidation};
use serde_json::{Map, Value};

/// Checks the structure of a bundle
///
/// - `books` must be a list; every book needs `id`, `title` and `bookNumber`.
/// - `chapters` must be a list; every chapter needs `id`, `title` and
///   `bookNumber`. A missing `description` is a warning.
/// - `characters` is optional: absent is a warning, but every character
///   present needs `id` and `name`.
///
/// A field counts as missing when it is absent, null, false, zero or empty.
pub fn validate_content(bundle: &Value) -> ContentValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match bundle.get("books").and_then(Value::as_array) {
        None => errors.push("Books data is missing or invalid".to_string()),
        Some(books) => {
            for (index, book) in books.iter().enumerate() {
                if !has_fields(book, &["id", "title", "bookNumber"]) {
                    errors.push(format!(
                        "Book {} is missing required fields (id, title, bookNumber)",
                        index + 1
                    ));
                }
            }
        }
    }

    match bundle.get("chapters").and_then(Value::as_array) {
        None => errors.push("Chapters data is missing or invalid".to_string()),
        Some(chapters) => {
            for (index, chapter) in chapters.iter().enumerate() {
                if !has_fields(chapter, &["id", "title", "bookNumber"]) {
                    errors.push(format!(
                        "Chapter {} is missing required fields (id, title, bookNumber)",
                        index + 1
                    ));
                }
                if !has_fields(chapter, &["description"]) {
                    warnings.push(match chapter.get("title").and_then(Value::as_str) {
                        Some(title) if !title.is_empty() => {
                            format!("Chapter \"{}\" is missing description", title)
                        }
                        _ => format!("Chapter {} is missing description", index + 1),
                    });
                }
            }
        }
    }

    match bundle.get("characters").and_then(Value::as_array) {
        None => warnings.push("Characters data is missing or invalid".to_string()),
        Some(characters) => {
            for (index, character) in characters.iter().enumerate() {
                if !has_fields(character, &["id", "name"]) {
                    errors.push(format!(
                        "Character {} is missing required fields (id, name)",
                        index + 1
                    ));
                }
            }
        }
    }

    log::debug!(
        "Validation finished with {} errors and {} warnings",
        errors.len(),
        warnings.len()
    );
    ContentValidation::from_findings(errors, warnings)
}

/// Checks the structure of a typed bundle
pub fn validate_bundle(bundle: &ContentBundle) -> ContentValidation {
    match serde_json::to_value(bundle) {
        Ok(value) => validate_content(&value),
        Err(e) => ContentValidation::from_findings(
            vec![format!("Bundle could not be serialized: {}", e)],
            Vec::new(),
        ),
    }
}

fn has_fields(entry: &Value, fields: &[&str]) -> bool {
    match entry.as_object() {
        Some(object) => fields.iter().all(|field| is_present(object, field)),
        None => false,
    }
}

fn is_present(object: &Map<String, Value>, field: &str) -> bool {
    match object.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
