//! Questionnaire Module
//!
//! The fixed intake question set. The read-only `/questions` mapping and the
//! answer zipping in `/submit` both derive from the single `QUESTIONS` slice,
//! so their enumeration order cannot diverge.

use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuestionnaireError {
    #[error("Expected {expected} answers, got {got}")]
    AnswerCountMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, QuestionnaireError>;

/// One intake question with its multiple-choice options.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub prompt: &'static str,
    pub options: &'static [&'static str],
}

/// The fixed, ordered intake question set.
pub const QUESTIONS: &[Question] = &[
    Question {
        prompt: "How have you been feeling emotionally over the past two weeks?",
        options: &[
            "Mostly fine",
            "Occasionally low",
            "Frequently down or anxious",
            "Overwhelmed most days",
        ],
    },
    Question {
        prompt: "How well have you been sleeping lately?",
        options: &[
            "Well, most nights",
            "Trouble falling asleep",
            "Waking up frequently",
            "Barely sleeping",
        ],
    },
    Question {
        prompt: "How often do you feel nervous, anxious, or on edge?",
        options: &[
            "Rarely",
            "A few days a week",
            "Most days",
            "Nearly all the time",
        ],
    },
    Question {
        prompt: "What is the biggest source of stress in your life right now?",
        options: &[
            "Work or studies",
            "Family or relationships",
            "Health concerns",
            "Something else",
        ],
    },
    Question {
        prompt: "Do you have someone you can talk to when things get difficult?",
        options: &[
            "Yes, regularly",
            "Sometimes",
            "Rarely",
            "No one at the moment",
        ],
    },
    Question {
        prompt: "Have you spoken with a therapist or counselor before?",
        options: &[
            "Yes, currently",
            "Yes, in the past",
            "No, but I am open to it",
            "No, and I am unsure about it",
        ],
    },
    Question {
        prompt: "What kind of support are you hoping for?",
        options: &[
            "Someone to listen",
            "Practical coping strategies",
            "Professional therapy",
            "I am not sure yet",
        ],
    },
];

/// The `/questions` payload: question -> options, in `QUESTIONS` order.
pub fn questions_response() -> IndexMap<String, Vec<String>> {
    QUESTIONS
        .iter()
        .map(|q| {
            (
                q.prompt.to_string(),
                q.options.iter().map(|o| o.to_string()).collect(),
            )
        })
        .collect()
}

/// Zip submitted answers against the question order.
///
/// A count mismatch is rejected outright: silently truncating to the shorter
/// sequence would pair answers with the wrong questions.
pub fn zip_answers<'a>(answers: &'a [String]) -> Result<Vec<(&'static str, &'a str)>> {
    if answers.len() != QUESTIONS.len() {
        return Err(QuestionnaireError::AnswerCountMismatch {
            expected: QUESTIONS.len(),
            got: answers.len(),
        });
    }

    Ok(QUESTIONS
        .iter()
        .zip(answers.iter())
        .map(|(q, a)| (q.prompt, a.as_str()))
        .collect())
}

/// Render zipped question/answer pairs as the prompt block.
pub fn responses_block(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(q, a)| format!("Q: {q}\nA: {a}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questions_response_preserves_slice_order() {
        let response = questions_response();
        let keys: Vec<&String> = response.keys().collect();

        assert_eq!(keys.len(), QUESTIONS.len());
        for (key, question) in keys.iter().zip(QUESTIONS.iter()) {
            assert_eq!(key.as_str(), question.prompt);
        }
    }

    #[test]
    fn test_zip_order_matches_questions_endpoint_order() {
        let answers: Vec<String> = (0..QUESTIONS.len()).map(|i| format!("answer {i}")).collect();
        let pairs = zip_answers(&answers).unwrap();
        let endpoint_keys: Vec<String> = questions_response().keys().cloned().collect();

        for ((question, answer), key) in pairs.iter().zip(endpoint_keys.iter()) {
            assert_eq!(*question, key.as_str());
            assert!(answer.starts_with("answer "));
        }
    }

    #[test]
    fn test_too_few_answers_rejected() {
        let answers = vec!["only one".to_string()];
        assert_eq!(
            zip_answers(&answers),
            Err(QuestionnaireError::AnswerCountMismatch {
                expected: QUESTIONS.len(),
                got: 1,
            })
        );
    }

    #[test]
    fn test_too_many_answers_rejected() {
        let answers: Vec<String> = (0..QUESTIONS.len() + 2).map(|i| i.to_string()).collect();
        assert!(zip_answers(&answers).is_err());
    }

    #[test]
    fn test_responses_block_format() {
        let block = responses_block(&[("How are you?", "Tired"), ("Sleeping?", "Badly")]);
        assert_eq!(block, "Q: How are you?\nA: Tired\nQ: Sleeping?\nA: Badly");
    }

    #[test]
    fn test_every_question_has_options() {
        for question in QUESTIONS {
            assert!(!question.options.is_empty());
        }
    }
}
