//! Base scoring: structured quiz answers to an initial dimension vector.
//!
//! Scoring never fails. Anything it cannot interpret contributes nothing.

use serde_json::Value;

use crate::dimensions::DimensionVector;
use crate::questions::{AnswerOption, QuestionCatalog, QuestionKind};

pub struct BaseScorer<'a> {
    catalog: &'a QuestionCatalog,
}

impl<'a> BaseScorer<'a> {
    pub fn new(catalog: &'a QuestionCatalog) -> Self {
        Self { catalog }
    }

    /// Score a `{ questionId: answer }` object.
    ///
    /// Walks the catalog in declaration order so the floating point sum is
    /// identical across calls regardless of the input map's ordering.
    pub fn score(&self, responses: &Value) -> DimensionVector {
        let mut vector = DimensionVector::zero();

        let Some(answers) = responses.as_object() else {
            if !responses.is_null() {
                tracing::warn!("quiz responses are not an object; scoring as empty");
            }
            return vector;
        };

        for question in self.catalog.questions() {
            let Some(answer) = answers.get(&question.id) else {
                continue;
            };

            match &question.kind {
                QuestionKind::Choice { options } => match choose(options, answer) {
                    Some(option) => vector.accumulate(&option.effects),
                    None => tracing::debug!(
                        "ignoring unrecognized answer {} for question {}",
                        answer,
                        question.id
                    ),
                },
                QuestionKind::Likert {
                    dimension,
                    weight,
                    min,
                    max,
                } => match numeric(answer) {
                    Some(_) if !(min < max) => tracing::debug!(
                        "question {} has an unusable likert range",
                        question.id
                    ),
                    Some(value) => {
                        let midpoint = (min + max) / 2.0;
                        let clamped = value.clamp(*min, *max);
                        vector.add(*dimension, (clamped - midpoint) * weight);
                    }
                    None => tracing::debug!(
                        "ignoring non-numeric answer {} for question {}",
                        answer,
                        question.id
                    ),
                },
                QuestionKind::FreeText => {}
            }
        }

        let unknown = answers
            .keys()
            .filter(|id| self.catalog.get(id).is_none())
            .count();
        if unknown > 0 {
            tracing::debug!("{} answers reference unknown questions", unknown);
        }

        vector
    }
}

/// Option keys match case-insensitively; integers select by zero-based index.
fn choose<'o>(options: &'o [AnswerOption], answer: &Value) -> Option<&'o AnswerOption> {
    match answer {
        Value::String(s) => {
            let s = s.trim();
            options.iter().find(|o| o.key.eq_ignore_ascii_case(s))
        }
        Value::Number(n) => n
            .as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| options.get(i)),
        _ => None,
    }
}

fn numeric(answer: &Value) -> Option<f64> {
    let value = match answer {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}
