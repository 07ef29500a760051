use crate::models::EvaluationResult;

const MIN_BAND: f64 = 1.0;
const MAX_BAND: f64 = 9.0;
const BONUS: f64 = 0.5;
/// Word count from which topic and linking-word bonuses apply.
const BONUS_MIN_WORDS: usize = 50;

const DISCOURSE_MARKERS: &[&str] = &["firstly", "secondly", "however", "therefore", "in conclusion"];

const LENGTH_SUGGESTIONS: [&str; 5] = [
    "Write at least 250 words to meet IELTS requirements",
    "Develop your main ideas with specific examples",
    "Add more supporting details to strengthen your arguments",
    "Include a clear introduction, body paragraphs, and conclusion",
    "Use more varied vocabulary to express your ideas",
];

const DEVELOPMENT_SUGGESTIONS: [&str; 5] = [
    "Aim for 250-300 words to fully develop your ideas",
    "Add specific examples to support your main points",
    "Improve paragraph structure with clear topic sentences",
    "Use more connecting words to link your ideas",
    "Expand on your arguments with more detailed explanations",
];

const REFINEMENT_SUGGESTIONS: [&str; 5] = [
    "Try to reach 250-300 words for optimal development",
    "Include more specific examples and evidence",
    "Strengthen your conclusion with a clear summary",
    "Use more sophisticated vocabulary and phrases",
    "Improve coherence with better paragraph transitions",
];

const POLISH_SUGGESTIONS: [&str; 5] = [
    "Use more varied sentence structures to improve grammatical range",
    "Include more specific examples to support your main points",
    "Improve paragraph transitions with better linking words",
    "Expand your vocabulary with more precise and academic terms",
    "Check for minor grammatical errors and improve accuracy",
];

const ADVANCED_SUGGESTIONS: [&str; 5] = [
    "Use more advanced vocabulary and idiomatic expressions",
    "Vary your sentence structures for better grammatical range",
    "Ensure all examples directly support your main arguments",
    "Perfect your use of cohesive devices and transitions",
    "Aim for error-free grammar and spelling throughout",
];

/// One rung of the word-count ladder.
struct Band {
    below_words: Option<usize>,
    score: f64,
    feedback: &'static str,
    suggestions: &'static [&'static str; 5],
}

const LADDER: &[Band] = &[
    Band {
        below_words: Some(10),
        score: 1.0,
        feedback: "Your essay is extremely short and does not demonstrate any meaningful writing ability. IELTS Task 2 essays require substantial development.",
        suggestions: &LENGTH_SUGGESTIONS,
    },
    Band {
        below_words: Some(50),
        score: 2.0,
        feedback: "Your essay is too short. IELTS Task 2 essays should be at least 250 words. The content lacks development and detailed examples.",
        suggestions: &LENGTH_SUGGESTIONS,
    },
    Band {
        below_words: Some(150),
        score: 4.5,
        feedback: "Your essay length is below the recommended word count for IELTS. While you show some understanding of the task, the ideas need more development and supporting examples.",
        suggestions: &DEVELOPMENT_SUGGESTIONS,
    },
    Band {
        below_words: Some(250),
        score: 5.5,
        feedback: "Your essay shows good understanding of the task but falls slightly short of the recommended word count. The ideas are relevant but could benefit from more detailed development.",
        suggestions: &REFINEMENT_SUGGESTIONS,
    },
    Band {
        below_words: Some(350),
        score: 6.5,
        feedback: "Your essay meets the word count requirements and demonstrates good task achievement. The ideas are well-developed with adequate supporting details. Grammar and vocabulary are generally appropriate.",
        suggestions: &POLISH_SUGGESTIONS,
    },
    Band {
        below_words: None,
        score: 7.0,
        feedback: "Your essay demonstrates strong task achievement with well-developed ideas and good use of examples. The length is appropriate and shows good command of language, though there may be room for improvement in vocabulary range and grammatical accuracy.",
        suggestions: &ADVANCED_SUGGESTIONS,
    },
];

/// Offline essay scorer used when no generated evaluation is available.
///
/// Pure and deterministic: the band comes from the word count, plus up to two
/// half-band bonuses for mentioning the topic and for using linking words.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEssayScorer;

impl HeuristicEssayScorer {
    pub fn score(text: &str, topic: &str) -> EvaluationResult {
        let word_count = word_count(text);
        let band = band_for(word_count);

        let mut score = band.score;
        if word_count >= BONUS_MIN_WORDS {
            let lower_text = text.to_lowercase();
            if mentions_topic(&lower_text, topic) {
                score += BONUS;
            }
            if uses_discourse_markers(&lower_text) {
                score += BONUS;
            }
        }

        EvaluationResult {
            score: score.clamp(MIN_BAND, MAX_BAND),
            feedback: band.feedback.to_string(),
            suggestions: band.suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn band_for(word_count: usize) -> &'static Band {
    LADDER
        .iter()
        .find(|band| band.below_words.is_none_or(|limit| word_count < limit))
        .unwrap_or(&LADDER[LADDER.len() - 1])
}

/// Essay contains the topic's first word. An empty topic always matches.
fn mentions_topic(lower_text: &str, topic: &str) -> bool {
    let lower_topic = topic.to_lowercase();
    let first_word = lower_topic.split_whitespace().next().unwrap_or("");
    lower_text.contains(first_word)
}

fn uses_discourse_markers(lower_text: &str) -> bool {
    DISCOURSE_MARKERS.iter().any(|marker| lower_text.contains(marker))
}
