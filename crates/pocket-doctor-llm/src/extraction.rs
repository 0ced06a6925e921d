//! Report extraction from LLM output.

use pocket_doctor_core::models::{parse_number, Gender, Parameter, ReferenceTable, Report, ReportCollection};
use pocket_doctor_core::Analyzer;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::prompts::{make_multi_report_prompt, make_report_prompt, SYSTEM_PROMPT};

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Could not parse model payload: {source}")]
    Payload {
        #[source]
        source: serde_json::Error,
        /// The model's full response
        raw: String,
    },

    #[error("Invalid response format: {reason}")]
    InvalidFormat { reason: String, raw: String },

    #[error("LLM inference error: {0}")]
    Inference(String),
}

impl ExtractionError {
    /// The raw model response, when the failure was in parsing it.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            Self::Payload { raw, .. } | Self::InvalidFormat { raw, .. } => Some(raw),
            Self::Inference(_) => None,
        }
    }
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Slice the outermost `{...}` out of a response that may carry prose or
/// code fences around it.
pub fn extract_json_object(response: &str) -> ExtractionResult<&str> {
    let invalid = |reason: &str| ExtractionError::InvalidFormat {
        reason: reason.to_string(),
        raw: response.to_string(),
    };

    let start = response
        .find('{')
        .ok_or_else(|| invalid("No JSON object found in response"))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| invalid("No closing brace found in response"))?;
    if end < start {
        return Err(invalid("Closing brace precedes opening brace"));
    }

    Ok(&response[start..=end])
}

fn parse_payload<T: DeserializeOwned>(response: &str) -> ExtractionResult<T> {
    let json = extract_json_object(response)?;
    serde_json::from_str(json).map_err(|source| ExtractionError::Payload {
        source,
        raw: response.to_string(),
    })
}

/// Parse a single-report payload.
pub fn parse_report_payload(response: &str) -> ExtractionResult<Report> {
    parse_payload(response)
}

/// Parse a multi-report payload.
pub fn parse_collection_payload(response: &str) -> ExtractionResult<ReportCollection> {
    parse_payload(response)
}

/// A chat-style completion backend.
pub trait LlmClient {
    /// Return the model's reply to one system + user message pair.
    fn complete(&self, system: &str, user: &str) -> ExtractionResult<String>;
}

impl<C: LlmClient + ?Sized> LlmClient for &C {
    fn complete(&self, system: &str, user: &str) -> ExtractionResult<String> {
        (**self).complete(system, user)
    }
}

impl<C: LlmClient + ?Sized> LlmClient for Box<C> {
    fn complete(&self, system: &str, user: &str) -> ExtractionResult<String> {
        (**self).complete(system, user)
    }
}

/// Client returning a fixed response (for testing without a model).
#[derive(Debug, Clone)]
pub struct MockClient {
    response: String,
}

impl MockClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl LlmClient for MockClient {
    fn complete(&self, _system: &str, user: &str) -> ExtractionResult<String> {
        tracing::debug!(prompt_len = user.len(), "Mock completion");
        Ok(self.response.clone())
    }
}

/// Turns report text into structured reports through an [`LlmClient`].
///
/// The model's own `general_health_score` is never trusted: every extracted
/// report gets the score computed from its parameters.
pub struct ReportExtractor<'a, C> {
    client: C,
    analyzer: Analyzer<'a>,
}

impl<'a, C: LlmClient> ReportExtractor<'a, C> {
    pub fn new(client: C, table: &'a ReferenceTable) -> Self {
        Self {
            client,
            analyzer: Analyzer::new(table),
        }
    }

    /// Extract one report from its text.
    pub fn extract(&self, file: &str, text: &str) -> ExtractionResult<Report> {
        let response = self.client.complete(SYSTEM_PROMPT, &make_report_prompt(text))?;
        let mut report = parse_report_payload(&response)?;

        if report.file.is_empty() {
            report.file = file.to_string();
        }
        report.general_health_score = self.analyzer.health_score(&report.parameters);

        tracing::info!(
            file,
            parameters = report.parameters.len(),
            score = ?report.general_health_score,
            "Extracted report"
        );
        Ok(report)
    }

    /// Extract several reports in one request.
    pub fn extract_many<S: AsRef<str>>(&self, reports: &[(S, S)]) -> ExtractionResult<ReportCollection> {
        let response = self
            .client
            .complete(SYSTEM_PROMPT, &make_multi_report_prompt(reports))?;
        let mut collection = parse_collection_payload(&response)?;

        if collection.len() != reports.len() {
            tracing::warn!(
                requested = reports.len(),
                returned = collection.len(),
                "Model returned a different number of reports"
            );
        }

        self.analyzer.score_collection(&mut collection);
        tracing::info!(reports = collection.len(), "Extracted report collection");
        Ok(collection)
    }
}

/// Line scanner for extraction without a model (for testing and offline use).
///
/// Recognises lines like `Hemoglobin 126 g/L`, `CRP: 3,5 mg/L`,
/// `Date: 2025-03-04` and `Gender: Female`.
pub struct MockExtractor;

impl MockExtractor {
    pub fn extract(file: &str, text: &str) -> Report {
        let mut report = Report::new(file);

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(value) = field_value(line, &["date", "дата"]) {
                if let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                    report.report_date = Some(date);
                }
                continue;
            }
            if let Some(value) = field_value(line, &["gender", "sex", "пол"]) {
                report.gender = Some(Gender::parse(value));
                continue;
            }
            if let Some(parameter) = scan_parameter(line) {
                report.parameters.push(parameter);
            }
        }

        report
    }
}

/// Value of a `key: value` line when the key is one of `keys`.
fn field_value<'t>(line: &'t str, keys: &[&str]) -> Option<&'t str> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim().to_lowercase();
    keys.contains(&key.as_str()).then_some(value.trim())
}

/// `name value [unit]`: the name is everything before the first numeric
/// token, the unit is the token after it.
fn scan_parameter(line: &str) -> Option<Parameter> {
    let tokens: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ':')
        .filter(|t| !t.is_empty())
        .collect();

    let value_at = tokens.iter().position(|t| parse_number(t).is_some())?;
    if value_at == 0 {
        return None;
    }

    let name = tokens[..value_at].join(" ");
    let value = parse_number(tokens[value_at])?;
    let unit = tokens
        .get(value_at + 1)
        .filter(|t| parse_number(t).is_none())
        .map(|t| t.to_string())
        .unwrap_or_default();

    Some(Parameter::new(name, value, unit))
}
