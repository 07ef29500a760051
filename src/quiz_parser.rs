use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::models::{ParsedQuestion, QuizOption};

/// Question line, four option lines and at least one answer/explanation line.
const MIN_BLOCK_LINES: usize = 6;
const OPTION_COUNT: usize = 4;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.?\s*").expect("valid numbering regex"));
static WORD_TWO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bTWO\b").expect("valid TWO regex"));
static WORD_THREE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bTHREE\b").expect("valid THREE regex"));

const MULTI_ANSWER_PHRASES: &[&str] = &[
    "all that apply",
    "multiple",
    "more than one",
    "select all",
    "choose two",
    "choose three",
];

/// Turns free-form quiz text into reading questions.
///
/// Expected shape per blank-line separated block:
///
/// ```text
/// 1. Question text?
/// A. option
/// B. option
/// C. option
/// D. option
/// Answer: A, C
/// Explanation: why
/// ```
///
/// Blocks that don't fit are skipped, never reported as errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizResponseParser;

impl QuizResponseParser {
    pub fn parse(raw_text: &str) -> Vec<ParsedQuestion> {
        let normalized = raw_text.trim().replace("\r\n", "\n");

        let questions: Vec<ParsedQuestion> = normalized
            .split("\n\n")
            .filter_map(Self::parse_block)
            .collect();

        debug!(
            component = "quiz_parser",
            question_count = questions.len(),
            "Parsed quiz response"
        );

        questions
    }

    fn parse_block(block: &str) -> Option<ParsedQuestion> {
        let all_lines: Vec<&str> = block
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let lines = &all_lines[question_line_index(&all_lines)..];
        if lines.len() < MIN_BLOCK_LINES {
            debug!(line_count = lines.len(), "Skipping quiz block with too few lines");
            return None;
        }

        let question_text = LEADING_NUMBER.replace(lines[0], "").trim().to_string();

        let mut options: Vec<QuizOption> = lines[1..=OPTION_COUNT]
            .iter()
            .map(|line| parse_option(line))
            .collect();

        let mut raw_answer = String::new();
        let mut explanation = String::new();
        let mut is_multiple_choice = has_multi_answer_cue(&question_text);

        for (i, line) in lines.iter().enumerate().skip(OPTION_COUNT + 1) {
            if starts_with_ignore_case(line, "Answer:") || starts_with_ignore_case(line, "Answers:") {
                raw_answer = after_colon(line);
                if answer_token_is_multiple(&raw_answer) {
                    is_multiple_choice = true;
                }
            } else if starts_with_ignore_case(line, "Explanation:") {
                explanation = after_colon(line);
                for next in &lines[i + 1..] {
                    if starts_with_ignore_case(next, "Question") {
                        break;
                    }
                    explanation.push(' ');
                    explanation.push_str(next);
                }
            }
        }

        let answer_letters = strip_answer(&raw_answer);
        if answer_letters.chars().count() > 1 {
            is_multiple_choice = true;
        }

        for letter in answer_letters.chars() {
            if let Some(option) = options.iter_mut().find(|o| o.label.chars().eq(std::iter::once(letter))) {
                option.is_correct = true;
            }
        }

        Some(ParsedQuestion {
            question_text,
            options,
            explanation,
            is_multiple_choice,
        })
    }
}

/// Question text asks for more than one answer.
pub fn has_multi_answer_cue(question_text: &str) -> bool {
    let lower = question_text.to_lowercase();
    MULTI_ANSWER_PHRASES.iter().any(|phrase| lower.contains(phrase))
        || WORD_TWO.is_match(question_text)
        || WORD_THREE.is_match(question_text)
}

/// Answer token encodes several letters, e.g. `A, C` or `AC`.
pub fn answer_token_is_multiple(raw_answer: &str) -> bool {
    raw_answer.contains(',') || (raw_answer.chars().count() > 1 && !raw_answer.contains(' '))
}

fn strip_answer(raw_answer: &str) -> String {
    raw_answer.chars().filter(|c| *c != ' ' && *c != ',').collect()
}

/// Skip a preamble such as `Passage:` that precedes the first question.
///
/// The question line is the one right before the first `A.`/`A)` option line;
/// without such a line the block starts at its first line.
fn question_line_index(lines: &[&str]) -> usize {
    lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| is_first_option_line(line))
        .map(|(i, _)| i - 1)
        .unwrap_or(0)
}

fn is_first_option_line(line: &str) -> bool {
    let mut chars = line.chars();
    chars.next() == Some('A') && matches!(chars.next(), Some('.' | ')' | ':'))
}

fn parse_option(line: &str) -> QuizOption {
    let label = line.chars().next().map(String::from).unwrap_or_default();
    let text = line.chars().skip(2).collect::<String>().trim().to_string();

    QuizOption {
        label,
        text,
        is_correct: false,
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn after_colon(line: &str) -> String {
    line.split_once(':')
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default()
}
