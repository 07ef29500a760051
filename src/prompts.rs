//! Prompt text sent to the generation boundary.
//!
//! The quiz and evaluation prompts pin down the line formats that
//! [`crate::quiz_parser`] and [`crate::evaluation_parser`] read back.

pub fn reading_questions(passage: &str) -> String {
    format!(
        r#"You are an English teacher creating an IELTS-style reading comprehension test. Please create 10 reading comprehension questions from the passage below.
Create a mix of single-choice and multiple-choice questions - specifically create 8 single-choice questions and 2 multiple-choice questions.

For each question, include:
- Question text (numbered 1, 2, 3, etc.)
- Four options labeled A, B, C, D (each on a new line prefixed with the letter)
- Correct answer(s): Use format 'Answer: A' for single correct answer or 'Answer: A, C' for multiple correct answers
- A short explanation of why the answer(s) is/are correct

For multiple-choice questions, make it clear in the question text that multiple answers are correct by using phrases like "Select all that apply" or "Choose TWO correct answers".

Separate questions with a blank line and format each question like this:
1. [Question text]?
A. [Option text]
B. [Option text]
C. [Option text]
D. [Option text]
Answer: [Correct option(s)]
Explanation: [Explanation text]

Passage:
"""{}"""
"#,
        passage
    )
}

pub fn essay_evaluation(topic: &str, essay: &str) -> String {
    format!(
        r#"You are an experienced IELTS writing examiner. Please evaluate this IELTS writing task and provide:
1. A score from 0-9 (IELTS band scale)
2. Detailed feedback explaining the score
3. Exactly 5 specific suggestions for improvement

Topic: {}

Student's Writing:
{}

Please format your response as:
Score: [X.X]
Feedback: [Your detailed feedback explaining strengths and weaknesses]
Suggestions:
1. [First suggestion]
2. [Second suggestion]
3. [Third suggestion]
4. [Fourth suggestion]
5. [Fifth suggestion]

Focus on IELTS criteria: Task Achievement/Response, Coherence and Cohesion, Lexical Resource, and Grammatical Range and Accuracy."#,
        topic, essay
    )
}

pub fn writing_suggestions(topic: &str) -> String {
    format!(
        r#"You are an IELTS writing teacher. Please generate 3 sample writing prompts and 3 band 8+ sample answers for the following topic.
Format:
Prompt 1: ...
Sample Answer 1: ...
Prompt 2: ...
Sample Answer 2: ...
Prompt 3: ...
Sample Answer 3: ...
Topic:
{}
"#,
        topic
    )
}

pub fn reading_passage(title: &str) -> String {
    format!(
        "Write an IELTS Reading passage (200-300 words) with the title: '{}'. Format:\nPassage: [passage text]",
        title
    )
}

pub fn writing_title(band: &str) -> String {
    format!(
        "Create an IELTS Writing task title suitable for band {}. Return only the title, with no explanation or anything else.",
        band
    )
}
