// File: botmetrics-common/src/validation.rs
//
// Field constraints live in the rule tables below. Ingestion and any API
// boundary check input against the same tables.

use uuid::Uuid;

use crate::error::Error;
use crate::models::{ConversationMetricPatch, ConversationMetricUpdate, SampleOptions};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Hyphenated or simple UUID text.
    Uuid,
    /// Finite and >= 0.
    NonNegative,
    /// Inclusive integer range.
    IntRange(i64, i64),
    /// Inclusive float range.
    FloatRange(f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub field: &'static str,
    pub constraint: Constraint,
}

const fn rule(field: &'static str, constraint: Constraint) -> FieldRule {
    FieldRule { field, constraint }
}

pub const PERFORMANCE_SAMPLE_RULES: &[FieldRule] = &[
    rule("chatbot_id", Constraint::Uuid),
    rule("response_time_seconds", Constraint::NonNegative),
    rule("token_usage", Constraint::NonNegative),
    rule("status_code", Constraint::IntRange(100, 599)),
];

pub const CONVERSATION_METRIC_RULES: &[FieldRule] = &[
    rule("conversation_id", Constraint::Uuid),
    rule("chatbot_id", Constraint::Uuid),
    rule("message_count", Constraint::NonNegative),
    rule("duration_seconds", Constraint::NonNegative),
    rule("avg_response_time", Constraint::NonNegative),
    rule("user_satisfaction", Constraint::IntRange(1, 5)),
    rule("sentiment_timeline.score", Constraint::FloatRange(-1.0, 1.0)),
    rule("sentiment_timeline.confidence", Constraint::FloatRange(0.0, 1.0)),
];

#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i64),
    Float(f64),
}

impl FieldValue<'_> {
    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }
}

fn satisfies(constraint: Constraint, value: FieldValue<'_>) -> bool {
    match (constraint, value) {
        (Constraint::Uuid, FieldValue::Text(s)) => Uuid::parse_str(s).is_ok(),
        (Constraint::Uuid, _) => false,
        (Constraint::NonNegative, v) => v.as_f64().is_some_and(|n| n.is_finite() && n >= 0.0),
        (Constraint::IntRange(lo, hi), FieldValue::Int(n)) => n >= lo && n <= hi,
        (Constraint::IntRange(..), _) => false,
        (Constraint::FloatRange(lo, hi), v) => {
            v.as_f64().is_some_and(|n| n.is_finite() && n >= lo && n <= hi)
        }
    }
}

fn describe(constraint: Constraint) -> String {
    match constraint {
        Constraint::Uuid => "must be a valid UUID".to_string(),
        Constraint::NonNegative => "must be a non-negative number".to_string(),
        Constraint::IntRange(lo, hi) => format!("must be an integer between {} and {}", lo, hi),
        Constraint::FloatRange(lo, hi) => format!("must be between {} and {}", lo, hi),
    }
}

/// Check one value against every rule in `rules` registered for `field`.
/// Fields without a rule pass.
pub fn check_field(rules: &[FieldRule], field: &str, value: FieldValue<'_>) -> Result<(), Error> {
    for r in rules.iter().filter(|r| r.field == field) {
        if !satisfies(r.constraint, value) {
            let shown = match value {
                FieldValue::Text(s) => format!("'{}'", s),
                FieldValue::Int(n) => n.to_string(),
                FieldValue::Float(n) => n.to_string(),
            };
            return Err(Error::Validation(format!(
                "{} {} (got {})",
                field,
                describe(r.constraint),
                shown
            )));
        }
    }
    Ok(())
}

fn parse_id(rules: &[FieldRule], field: &str, raw: &str) -> Result<Uuid, Error> {
    check_field(rules, field, FieldValue::Text(raw))?;
    Ok(Uuid::parse_str(raw)?)
}

/// Validate a sample about to be recorded. Returns the parsed chatbot id.
pub fn validate_sample(
    chatbot_id: &str,
    response_time_seconds: f64,
    options: &SampleOptions,
) -> Result<Uuid, Error> {
    let rules = PERFORMANCE_SAMPLE_RULES;
    let id = parse_id(rules, "chatbot_id", chatbot_id)?;
    check_field(rules, "response_time_seconds", FieldValue::Float(response_time_seconds))?;
    if let Some(tokens) = options.token_usage {
        check_field(rules, "token_usage", FieldValue::Int(tokens))?;
    }
    if let Some(code) = options.status_code {
        check_field(rules, "status_code", FieldValue::Int(code as i64))?;
    }
    Ok(id)
}

/// Validate an upsert payload and turn it into a repository patch.
pub fn validate_metric_update(
    update: &ConversationMetricUpdate,
) -> Result<ConversationMetricPatch, Error> {
    let rules = CONVERSATION_METRIC_RULES;
    let conversation_id = parse_id(rules, "conversation_id", &update.conversation_id)?;
    let chatbot_id = parse_id(rules, "chatbot_id", &update.chatbot_id)?;

    if let Some(n) = update.message_count {
        check_field(rules, "message_count", FieldValue::Int(n))?;
    }
    if let Some(secs) = update.duration_seconds {
        check_field(rules, "duration_seconds", FieldValue::Float(secs))?;
    }
    if let Some(secs) = update.avg_response_time {
        check_field(rules, "avg_response_time", FieldValue::Float(secs))?;
    }
    if let Some(rating) = update.user_satisfaction {
        check_field(rules, "user_satisfaction", FieldValue::Int(rating as i64))?;
    }
    for point in update.sentiment_timeline.iter().flatten() {
        check_field(rules, "sentiment_timeline.score", FieldValue::Float(point.score))?;
        check_field(rules, "sentiment_timeline.confidence", FieldValue::Float(point.confidence))?;
    }

    Ok(ConversationMetricPatch {
        conversation_id,
        chatbot_id,
        message_count: update.message_count,
        duration_seconds: update.duration_seconds,
        avg_response_time: update.avg_response_time,
        user_satisfaction: update.user_satisfaction,
        user_intent: update.user_intent.clone(),
        goal_achieved: update.goal_achieved,
        topics_discussed: update.topics_discussed.clone(),
        sentiment_timeline: update.sentiment_timeline.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::SentimentPoint;
    use chrono::Utc;

    const BOT: &str = "6f1c0c4e-8a4e-4d8e-9a53-2b0b8c5f7e11";
    const CONV: &str = "0d7e3a52-52a1-4b8f-8f3c-3f7f0a8d9c21";

    #[test]
    fn sample_rules() {
        let ok = SampleOptions::default();
        assert!(validate_sample(BOT, 0.0, &ok).is_ok());
        assert!(validate_sample("bot-1", 1.0, &ok).is_err());
        assert!(validate_sample(BOT, -0.1, &ok).is_err());
        assert!(validate_sample(BOT, f64::NAN, &ok).is_err());

        for (code, valid) in [(99, false), (100, true), (599, true), (600, false)] {
            let opts = SampleOptions { status_code: Some(code), ..Default::default() };
            assert_eq!(validate_sample(BOT, 1.0, &opts).is_ok(), valid, "status {}", code);
        }

        let negative_tokens = SampleOptions { token_usage: Some(-1), ..Default::default() };
        let err = validate_sample(BOT, 1.0, &negative_tokens).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn metric_rules() {
        let mut update = ConversationMetricUpdate::new(CONV, BOT);
        assert!(validate_metric_update(&update).is_ok());

        update.user_satisfaction = Some(6);
        assert!(validate_metric_update(&update).is_err());
        update.user_satisfaction = Some(1);
        assert!(validate_metric_update(&update).is_ok());

        update.sentiment_timeline = Some(vec![SentimentPoint {
            timestamp: Utc::now(),
            score: 1.5,
            confidence: 0.5,
        }]);
        assert!(validate_metric_update(&update).is_err());

        let bad_id = ConversationMetricUpdate::new("not-a-uuid", BOT);
        assert!(validate_metric_update(&bad_id).is_err());
    }

    #[test]
    fn unknown_fields_pass() {
        assert!(check_field(PERFORMANCE_SAMPLE_RULES, "endpoint", FieldValue::Text("/chat")).is_ok());
    }
}
