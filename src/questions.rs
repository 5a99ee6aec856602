//! Quiz question catalog: what each answer contributes to the dimension vector.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dimensions::{Dimension, DimensionVector};
use crate::error::{AffinityError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerOption {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub effects: DimensionVector,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Pick one option; the option's effects are added verbatim.
    Choice { options: Vec<AnswerOption> },
    /// Agreement scale; contributes `(value - midpoint) * weight` to one dimension.
    Likert {
        dimension: Dimension,
        #[serde(default = "default_weight")]
        weight: f64,
        #[serde(default = "default_min")]
        min: f64,
        #[serde(default = "default_max")]
        max: f64,
    },
    /// Open answer, interpreted by the oracle rather than scored here.
    FreeText,
}

fn default_weight() -> f64 {
    1.0
}

fn default_min() -> f64 {
    1.0
}

fn default_max() -> f64 {
    5.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    pub fn choice(id: &str, prompt: &str, options: Vec<AnswerOption>) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            kind: QuestionKind::Choice { options },
        }
    }

    pub fn likert(id: &str, prompt: &str, dimension: Dimension, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            kind: QuestionKind::Likert {
                dimension,
                weight,
                min: default_min(),
                max: default_max(),
            },
        }
    }

    pub fn free_text(id: &str, prompt: &str) -> Self {
        Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            kind: QuestionKind::FreeText,
        }
    }

    pub fn is_free_text(&self) -> bool {
        matches!(self.kind, QuestionKind::FreeText)
    }
}

impl AnswerOption {
    pub fn new(key: &str, label: &str, effects: DimensionVector) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            effects,
        }
    }
}

/// Ordered set of questions. Read-only once loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for q in &questions {
            if !seen.insert(q.id.as_str()) {
                return Err(AffinityError::Validation {
                    message: format!("duplicate question id '{}'", q.id),
                });
            }
            if let QuestionKind::Likert { min, max, .. } = q.kind
                && min >= max
            {
                return Err(AffinityError::Validation {
                    message: format!("question '{}' has an empty likert range", q.id),
                });
            }
        }
        Ok(Self { questions })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let questions: Vec<Question> = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded {} questions from {}",
            questions.len(),
            path.display()
        );
        Self::new(questions)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn free_text_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.is_free_text())
    }

    /// The packaged relationship quiz.
    pub fn builtin() -> Self {
        use Dimension::*;
        let v = DimensionVector::zero;

        Self {
            questions: vec![
                Question::choice(
                    "q1",
                    "After a long week, your ideal evening with a partner looks like:",
                    vec![
                        AnswerOption::new(
                            "A",
                            "A deep conversation over dinner",
                            v().with(EmotionalDepth, 1.0).with(CommunicationStyle, 0.5),
                        ),
                        AnswerOption::new(
                            "B",
                            "Trying something new together",
                            v().with(RelationalStyle, 1.0),
                        ),
                        AnswerOption::new(
                            "C",
                            "Quiet time side by side, each doing our own thing",
                            v().with(RelationalStyle, -1.0).with(EmotionalDepth, -0.5),
                        ),
                        AnswerOption::new(
                            "D",
                            "Volunteering or working on a shared cause",
                            v().with(ValuesAlignment, 1.0),
                        ),
                    ],
                ),
                Question::likert(
                    "q2",
                    "I say what I feel, even when it is uncomfortable.",
                    CommunicationStyle,
                    1.0,
                ),
                Question::choice(
                    "q3",
                    "When you disagree with someone you care about, you usually:",
                    vec![
                        AnswerOption::new(
                            "A",
                            "Talk it through right away",
                            v().with(CommunicationStyle, 1.0),
                        ),
                        AnswerOption::new(
                            "B",
                            "Take space, then come back to it",
                            v().with(CommunicationStyle, -0.5).with(EmotionalDepth, 0.5),
                        ),
                        AnswerOption::new(
                            "C",
                            "Look for the shared principle underneath",
                            v().with(ValuesAlignment, 1.0),
                        ),
                        AnswerOption::new(
                            "D",
                            "Let it go; most things are not worth the friction",
                            v().with(CommunicationStyle, -1.0)
                                .with(RelationalStyle, 0.5),
                        ),
                    ],
                ),
                Question::likert(
                    "q4",
                    "Shared beliefs matter more to me than shared hobbies.",
                    ValuesAlignment,
                    1.0,
                ),
                Question::likert(
                    "q5",
                    "I need a lot of independence, even in a close relationship.",
                    RelationalStyle,
                    -1.0,
                ),
                Question::likert(
                    "q6",
                    "I am comfortable being vulnerable early on.",
                    EmotionalDepth,
                    1.0,
                ),
                Question::free_text(
                    "ft1",
                    "Describe a moment when you felt truly understood by someone.",
                ),
                Question::free_text(
                    "ft2",
                    "What does a healthy relationship look like to you?",
                ),
            ],
        }
    }
}
