use quiz_core::model::{Question, QuestionId, Quiz, QuizId};
use serde_yaml::{Mapping, Value};

use super::CatalogError;

/// Stringify a YAML scalar; numbers and booleans keep their textual form.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn field_text(fields: &Mapping, name: &str) -> Option<String> {
    fields.get(name).and_then(scalar_text)
}

fn field_flag(fields: &Mapping, name: &str) -> bool {
    match fields.get(name) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "true" | "yes"),
        _ => false,
    }
}

/// Parse a quiz document.
///
/// The document is a mapping of question id to a mapping with `prompt`,
/// `answer`, optional `image` and optional `strict`. Entries that are not
/// mappings are ignored.
pub(crate) fn parse_quiz(id: &QuizId, source: &str) -> Result<Quiz, CatalogError> {
    let document: Value = serde_yaml::from_str(source).map_err(|e| CatalogError::Yaml {
        quiz: id.clone(),
        message: e.to_string(),
    })?;

    let entries = match document {
        Value::Mapping(entries) => entries,
        Value::Null => return Err(CatalogError::Empty { quiz: id.clone() }),
        _ => return Err(CatalogError::NotAMapping { quiz: id.clone() }),
    };

    let mut questions = Vec::with_capacity(entries.len());
    for (key, value) in &entries {
        let Some(question_id) = scalar_text(key) else {
            tracing::debug!(quiz = %id, "skipping entry with non-scalar key");
            continue;
        };
        let Value::Mapping(fields) = value else {
            tracing::debug!(quiz = %id, question = %question_id, "skipping non-mapping entry");
            continue;
        };

        let mut question = Question::new(
            QuestionId::new(question_id),
            field_text(fields, "prompt").unwrap_or_default(),
            field_text(fields, "answer").unwrap_or_default(),
        )
        .with_strict(field_flag(fields, "strict"));
        if let Some(image) = field_text(fields, "image") {
            question = question.with_image(image);
        }
        questions.push(question);
    }

    Ok(Quiz::new(id.clone(), id.stem(), questions)?)
}
