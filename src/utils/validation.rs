//! Shape checks for incoming survey payloads.
//!
//! Payloads are inspected as raw JSON so each problem gets its own message.
//! Checks run in a fixed order and stop at the first failure. Nothing here
//! touches storage.

use serde_json::{Map, Value as JsonValue};
use validator::Validate;

use crate::dto::survey_dto::{AnswerInput, CheckDeviceRequest, SubmitResponseRequest};
use crate::error::Error;

/// Upper bound on answers per submission; keeps the batched insert well
/// below Postgres' bind-parameter limit.
pub const MAX_ANSWERS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("missing deviceId")]
    MissingDeviceId,
    #[error("invalid deviceId: expected a non-empty string")]
    InvalidDeviceId,
    #[error("missing language")]
    MissingLanguage,
    #[error("invalid language: expected a non-empty string")]
    InvalidLanguage,
    #[error("unsupported language `{0}`")]
    UnsupportedLanguage(String),
    #[error("missing answers")]
    MissingAnswers,
    #[error("invalid answers: expected an array")]
    AnswersNotArray,
    #[error("answers must not be empty")]
    EmptyAnswers,
    #[error("too many answers: at most {} are accepted", MAX_ANSWERS)]
    TooManyAnswers,
    #[error("answers[{0}] must be an object")]
    AnswerNotObject(usize),
    #[error("answers[{0}]: missing questionKey")]
    MissingQuestionKey(usize),
    #[error("answers[{0}]: invalid questionTitle: expected a string")]
    InvalidQuestionTitle(usize),
    #[error("answers[{0}]: missing answer")]
    MissingAnswerValue(usize),
    #[error("answers[{0}]: answer must be an array")]
    AnswerValueNotArray(usize),
    #[error("answers[{0}]: missing answeredTime")]
    MissingAnsweredTime(usize),
    #[error("answers[{0}]: answeredTime must be an epoch-millisecond number")]
    AnsweredTimeNotNumeric(usize),
    #[error("invalid completedAt: expected an epoch-millisecond number")]
    InvalidCompletedAt,
    /// Postgres text and JSONB columns cannot hold U+0000.
    #[error("{0} must not contain NUL characters")]
    NulCharacter(String),
}

impl From<ValidationFailure> for Error {
    fn from(failure: ValidationFailure) -> Self {
        Error::InvalidInput(failure.to_string())
    }
}

/// Knobs that vary between deployments.
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    pub allowed_languages: Option<Vec<String>>,
}

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

fn as_object(body: &JsonValue) -> Result<&Map<String, JsonValue>, ValidationFailure> {
    body.as_object().ok_or(ValidationFailure::NotAnObject)
}

/// Null counts as absent.
fn field<'a>(obj: &'a Map<String, JsonValue>, key: &str) -> Option<&'a JsonValue> {
    obj.get(key).filter(|v| !v.is_null())
}

fn non_empty_str(value: &JsonValue) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

fn contains_nul(value: &JsonValue) -> bool {
    match value {
        JsonValue::String(s) => s.contains('\0'),
        JsonValue::Array(items) => items.iter().any(contains_nul),
        JsonValue::Object(map) => map
            .iter()
            .any(|(key, item)| key.contains('\0') || contains_nul(item)),
        _ => false,
    }
}

fn reject_nul(text: &str, name: impl FnOnce() -> String) -> Result<(), ValidationFailure> {
    if text.contains('\0') {
        return Err(ValidationFailure::NulCharacter(name()));
    }
    Ok(())
}

pub fn check_device_id(value: Option<&JsonValue>) -> Result<String, ValidationFailure> {
    let value = value.ok_or(ValidationFailure::MissingDeviceId)?;
    let device_id = non_empty_str(value).ok_or(ValidationFailure::InvalidDeviceId)?;
    reject_nul(device_id, || "deviceId".to_string())?;
    Ok(device_id.to_string())
}

pub fn check_language(
    value: Option<&JsonValue>,
    rules: &ValidationRules,
) -> Result<String, ValidationFailure> {
    let value = value.ok_or(ValidationFailure::MissingLanguage)?;
    let language = non_empty_str(value).ok_or(ValidationFailure::InvalidLanguage)?;
    reject_nul(language, || "language".to_string())?;
    if let Some(allowed) = &rules.allowed_languages {
        if !allowed.iter().any(|code| code == language) {
            return Err(ValidationFailure::UnsupportedLanguage(language.to_string()));
        }
    }
    Ok(language.to_string())
}

pub fn check_answer(index: usize, value: &JsonValue) -> Result<AnswerInput, ValidationFailure> {
    let obj = value
        .as_object()
        .ok_or(ValidationFailure::AnswerNotObject(index))?;

    let question_key = field(obj, "questionKey")
        .and_then(non_empty_str)
        .ok_or(ValidationFailure::MissingQuestionKey(index))?
        .to_string();
    reject_nul(&question_key, || format!("answers[{}].questionKey", index))?;

    let question_title = match field(obj, "questionTitle") {
        None => None,
        Some(JsonValue::String(s)) => {
            reject_nul(s, || format!("answers[{}].questionTitle", index))?;
            Some(s.clone())
        }
        Some(_) => return Err(ValidationFailure::InvalidQuestionTitle(index)),
    };

    let answer = field(obj, "answer")
        .ok_or(ValidationFailure::MissingAnswerValue(index))?
        .as_array()
        .ok_or(ValidationFailure::AnswerValueNotArray(index))?;
    if answer.iter().any(contains_nul) {
        return Err(ValidationFailure::NulCharacter(format!("answers[{}].answer", index)));
    }
    let answer = answer.clone();

    let answered_time = match field(obj, "answeredTime") {
        None => return Err(ValidationFailure::MissingAnsweredTime(index)),
        Some(JsonValue::Number(n)) => n.clone(),
        Some(_) => return Err(ValidationFailure::AnsweredTimeNotNumeric(index)),
    };

    Ok(AnswerInput {
        question_key,
        question_title,
        answer,
        answered_time,
    })
}

pub fn check_answers(value: Option<&JsonValue>) -> Result<Vec<AnswerInput>, ValidationFailure> {
    let items = value
        .ok_or(ValidationFailure::MissingAnswers)?
        .as_array()
        .ok_or(ValidationFailure::AnswersNotArray)?;
    if items.is_empty() {
        return Err(ValidationFailure::EmptyAnswers);
    }
    if items.len() > MAX_ANSWERS {
        return Err(ValidationFailure::TooManyAnswers);
    }
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| check_answer(idx, item))
        .collect()
}

pub fn parse_check_device(body: &JsonValue) -> Result<CheckDeviceRequest, Error> {
    let obj = as_object(body)?;
    let req = CheckDeviceRequest {
        device_id: check_device_id(field(obj, "deviceId"))?,
    };
    validate(&req)?;
    Ok(req)
}

pub fn parse_submission(
    body: &JsonValue,
    rules: &ValidationRules,
) -> Result<SubmitResponseRequest, Error> {
    let obj = as_object(body)?;
    let device_id = check_device_id(field(obj, "deviceId"))?;
    let language = check_language(field(obj, "language"), rules)?;
    let answers = check_answers(field(obj, "answers"))?;
    let completed_at = match field(obj, "completedAt") {
        None => None,
        Some(JsonValue::Number(n)) => Some(n.clone()),
        Some(_) => return Err(ValidationFailure::InvalidCompletedAt.into()),
    };

    let req = SubmitResponseRequest {
        device_id,
        language,
        answers,
        completed_at,
    };
    validate(&req)?;
    Ok(req)
}
