use tracing::debug;

use crate::models::{EvaluationResult, SUGGESTION_COUNT};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 9.0;

/// Reads `Score:` / `Feedback:` / numbered suggestion lines out of an
/// essay evaluation response.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationResponseParser;

impl EvaluationResponseParser {
    pub fn parse(raw_text: &str) -> EvaluationResult {
        let mut result = EvaluationResult::default();

        for line in raw_text.split('\n').filter(|l| !l.is_empty()) {
            let trimmed = line.trim();

            if let Some(rest) = strip_prefix_ignore_case(line, "Score:") {
                match parse_score(rest) {
                    Some(score) => result.score = score,
                    None => debug!(raw_score = %rest.trim(), "Unparseable score line, keeping default"),
                }
            } else if let Some(rest) = strip_prefix_ignore_case(line, "Feedback:") {
                result.feedback = rest.trim().to_string();
            } else if strip_prefix_ignore_case(line, "Suggestions:").is_some() {
                continue;
            } else if is_numbered_suggestion(trimmed) {
                let suggestion: String = trimmed.chars().skip(2).collect();
                result.suggestions.push(suggestion.trim().to_string());
            }
        }

        let parsed_suggestions = result.suggestions.len();
        pad_suggestions(&mut result.suggestions);

        debug!(
            component = "evaluation_parser",
            score = result.score,
            feedback_length = result.feedback.len(),
            parsed_suggestions,
            "Parsed evaluation response"
        );

        result
    }
}

/// Pad with filler up to exactly five suggestions; extra lines are dropped.
pub fn pad_suggestions(suggestions: &mut Vec<String>) {
    suggestions.truncate(SUGGESTION_COUNT);
    while suggestions.len() < SUGGESTION_COUNT {
        suggestions.push(format!(
            "Consider improving aspect {} of your writing.",
            suggestions.len() + 1
        ));
    }
}

fn parse_score(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|score| !score.is_nan())
        .map(|score| score.clamp(MIN_SCORE, MAX_SCORE))
}

fn is_numbered_suggestion(trimmed: &str) -> bool {
    ["1.", "2.", "3.", "4.", "5."]
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &line[prefix.len()..])
}
