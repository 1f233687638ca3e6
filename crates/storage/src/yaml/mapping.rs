use chrono::NaiveDate;
use quiz_core::model::{
    GlobalProgress, ProgressKey, QuestionId, QuestionProgress, QuizId, StoredTimestamp,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use crate::repository::StorageError;

/// On-disk layout of the progress file, as written.
#[derive(Debug, Serialize)]
pub(crate) struct ProgressDocument {
    pub meta: MetaDocument,
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MetaDocument {
    pub total_questions_seen: u64,
    pub total_reviews: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_use: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_session: Option<StoredTimestamp>,
    pub daily_log: BTreeMap<NaiveDate, u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct QuestionRecord {
    pub quiz: String,
    pub question: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub correct: u32,
    #[serde(default, deserialize_with = "lenient_stamp")]
    pub last_review: Option<StoredTimestamp>,
    #[serde(default, deserialize_with = "lenient_stamp")]
    pub last_correct: Option<StoredTimestamp>,
}

/// Everything recovered from a progress file.
#[derive(Debug, Default)]
pub(crate) struct ParsedProgress {
    pub global: GlobalProgress,
    pub records: Vec<(ProgressKey, QuestionProgress)>,
}

fn stamp_from_value(value: &Value) -> Option<StoredTimestamp> {
    match value {
        Value::Null => None,
        Value::String(raw) => Some(StoredTimestamp::parse(raw)),
        Value::Number(n) => Some(StoredTimestamp::Malformed(n.to_string())),
        Value::Bool(b) => Some(StoredTimestamp::Malformed(b.to_string())),
        Value::Tagged(tagged) => stamp_from_value(&tagged.value),
        other => Some(StoredTimestamp::Malformed(format!("{other:?}"))),
    }
}

/// Accept any value as a timestamp; unparsable text is kept as malformed.
fn lenient_stamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<StoredTimestamp>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(stamp_from_value))
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

fn counter(meta: &Mapping, field: &str) -> u64 {
    match meta.get(field) {
        None | Some(Value::Null) => 0,
        Some(value) => value.as_u64().unwrap_or_else(|| {
            tracing::warn!("ignoring invalid meta.{field}: {value:?}");
            0
        }),
    }
}

/// Read the global counters field by field; invalid fields fall back to
/// their defaults.
fn global_from_meta(meta: &Mapping) -> GlobalProgress {
    let first_use = meta.get("first_use").and_then(|value| {
        let parsed = parse_date(value);
        if parsed.is_none() && !value.is_null() {
            tracing::warn!("ignoring invalid meta.first_use: {value:?}");
        }
        parsed
    });

    let mut daily_log = BTreeMap::new();
    match meta.get("daily_log") {
        None | Some(Value::Null) => {}
        Some(Value::Mapping(days)) => {
            for (day, count) in days {
                match (parse_date(day), count.as_u64()) {
                    (Some(day), Some(count)) => {
                        daily_log.insert(day, count);
                    }
                    _ => tracing::warn!("skipping daily log entry {day:?}: {count:?}"),
                }
            }
        }
        Some(other) => tracing::warn!("ignoring invalid meta.daily_log: {other:?}"),
    }

    GlobalProgress {
        total_questions_seen: counter(meta, "total_questions_seen"),
        total_reviews: counter(meta, "total_reviews"),
        first_use,
        last_session: meta.get("last_session").and_then(stamp_from_value),
        daily_log,
    }
}

/// Parse a progress file.
///
/// Individual bad records and meta fields are skipped with a warning. Only a
/// file whose overall shape is wrong is an error.
pub(crate) fn parse_document(text: &str) -> Result<ParsedProgress, StorageError> {
    let shape = |msg: &str| StorageError::Serialization(msg.to_owned());

    let root: Value =
        serde_yaml::from_str(text).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let root = match root {
        Value::Null => return Ok(ParsedProgress::default()),
        Value::Mapping(root) => root,
        _ => return Err(shape("progress file is not a mapping")),
    };

    let global = match root.get("meta") {
        None | Some(Value::Null) => GlobalProgress::default(),
        Some(Value::Mapping(meta)) => global_from_meta(meta),
        Some(_) => return Err(shape("`meta` is not a mapping")),
    };

    let entries: &[Value] = match root.get("questions") {
        None | Some(Value::Null) => &[],
        Some(Value::Sequence(entries)) => entries,
        Some(_) => return Err(shape("`questions` is not a list")),
    };

    let records = entries
        .iter()
        .enumerate()
        .filter_map(
            |(idx, entry)| match serde_yaml::from_value::<QuestionRecord>(entry.clone()) {
                Ok(record) => Some(progress_from_record(record)),
                Err(e) => {
                    tracing::warn!("skipping progress record #{idx}: {e}");
                    None
                }
            },
        )
        .collect();

    Ok(ParsedProgress { global, records })
}

pub(crate) fn meta_from_global(global: &GlobalProgress) -> MetaDocument {
    MetaDocument {
        total_questions_seen: global.total_questions_seen,
        total_reviews: global.total_reviews,
        first_use: global.first_use,
        last_session: global.last_session.clone(),
        daily_log: global.daily_log.clone(),
    }
}

/// Convert a stored record, clamping `correct` to `attempts` when the file
/// holds inconsistent counts.
fn progress_from_record(record: QuestionRecord) -> (ProgressKey, QuestionProgress) {
    let key = ProgressKey::new(QuizId::new(record.quiz), QuestionId::new(record.question));
    let correct = if record.correct > record.attempts {
        tracing::warn!(
            key = %key,
            attempts = record.attempts,
            correct = record.correct,
            "clamping correct count to attempts"
        );
        record.attempts
    } else {
        record.correct
    };

    let progress = QuestionProgress::from_persisted(
        record.attempts,
        correct,
        record.last_review,
        record.last_correct,
    )
    .unwrap_or_default();
    (key, progress)
}

pub(crate) fn record_from_progress(
    key: &ProgressKey,
    progress: &QuestionProgress,
) -> QuestionRecord {
    QuestionRecord {
        quiz: key.quiz.as_str().to_owned(),
        question: key.question.as_str().to_owned(),
        attempts: progress.attempts(),
        correct: progress.correct(),
        last_review: progress.last_review().cloned(),
        last_correct: progress.last_correct().cloned(),
    }
}
