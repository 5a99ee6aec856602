//! Free-text adjustment: asks the oracle to read each open answer and nudges the
//! dimension vector by confidence-weighted deltas.
//!
//! Answers are processed strictly in order. Each prompt carries the vector as
//! adjusted by every earlier answer in the same run, so calls can never be issued
//! concurrently. A failed call or unusable reply skips that answer only.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::Oracle;
use crate::dimensions::{Dimension, DimensionVector};
use crate::error::{AffinityError, Result};

/// Soft bound the oracle is asked to respect.
pub const ADJUSTMENT_LIMIT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextResponse {
    pub question: String,
    pub response: String,
}

impl FreeTextResponse {
    pub fn new(question: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            response: response.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Confidence {
    Low,
    Medium,
    High,
    /// Anything else the oracle said, kept verbatim for the audit trail
    Unrecognized(String),
}

impl Confidence {
    pub fn weight(&self) -> f64 {
        match self {
            Confidence::Low => 0.3,
            Confidence::Medium => 0.6,
            Confidence::High => 1.0,
            Confidence::Unrecognized(_) => 0.5,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
            Confidence::Unrecognized(label) => label,
        }
    }
}

impl From<String> for Confidence {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Confidence::Low,
            "medium" => Confidence::Medium,
            "high" => Confidence::High,
            _ => Confidence::Unrecognized(label),
        }
    }
}

impl From<Confidence> for String {
    fn from(c: Confidence) -> Self {
        c.as_str().to_string()
    }
}

/// One dimension's verdict from the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAdjustment {
    pub analysis: String,
    pub adjustment: f64,
    pub confidence: Confidence,
}

impl DimensionAdjustment {
    pub fn weighted(&self, clamp: bool) -> f64 {
        let raw = if clamp {
            self.adjustment.clamp(-ADJUSTMENT_LIMIT, ADJUSTMENT_LIMIT)
        } else {
            self.adjustment
        };
        raw * self.confidence.weight()
    }
}

/// A parsed oracle reply: exactly one adjustment per dimension, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionAdjustments(pub [(Dimension, DimensionAdjustment); 4]);

/// Audit record explaining one dimension's movement for one free-text answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub question: String,
    pub response: String,
    pub dimension: Dimension,
    pub analysis: String,
    pub adjustment: f64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentFailure {
    pub index: usize,
    pub question: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentOutcome {
    pub enhanced_vector: DimensionVector,
    pub insights: Vec<Insight>,
    pub failures: Vec<AdjustmentFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct AdjusterOptions {
    pub clamp_adjustments: bool,
    /// Hard cap per oracle call, on top of whatever the oracle enforces itself
    pub oracle_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct LlmAdjuster {
    options: AdjusterOptions,
}

impl LlmAdjuster {
    pub fn new(options: AdjusterOptions) -> Self {
        Self { options }
    }

    pub async fn adjust(
        &self,
        vector: DimensionVector,
        responses: &[FreeTextResponse],
        oracle: &dyn Oracle,
    ) -> AdjustmentOutcome {
        let mut current = vector;
        let mut insights = Vec::with_capacity(responses.len() * Dimension::ALL.len());
        let mut failures = Vec::new();

        for (index, item) in responses.iter().enumerate() {
            let applied = self
                .adjust_one(&current, item, oracle)
                .await
                .and_then(|adjustments| {
                    let mut candidate = current;
                    for (dim, adj) in &adjustments.0 {
                        candidate.add(*dim, adj.weighted(self.options.clamp_adjustments));
                    }
                    if candidate.is_finite() {
                        Ok((candidate, adjustments))
                    } else {
                        Err(AffinityError::Validation {
                            message: "adjustments push the vector out of finite range"
                                .to_string(),
                        })
                    }
                });

            match applied {
                Ok((candidate, adjustments)) => {
                    current = candidate;
                    for (dim, adj) in adjustments.0 {
                        insights.push(Insight {
                            question: item.question.clone(),
                            response: item.response.clone(),
                            dimension: dim,
                            analysis: adj.analysis,
                            adjustment: adj.adjustment,
                            confidence: adj.confidence,
                        });
                    }
                    tracing::debug!("applied adjustments for free-text answer #{}", index + 1);
                }
                Err(e) => {
                    tracing::warn!("skipping free-text answer #{}: {}", index + 1, e);
                    failures.push(AdjustmentFailure {
                        index,
                        question: item.question.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !failures.is_empty() {
            tracing::info!(
                "{} of {} free-text answers could not be interpreted",
                failures.len(),
                responses.len()
            );
        }

        AdjustmentOutcome {
            enhanced_vector: current,
            insights,
            failures,
        }
    }

    async fn adjust_one(
        &self,
        current: &DimensionVector,
        item: &FreeTextResponse,
        oracle: &dyn Oracle,
    ) -> Result<DimensionAdjustments> {
        let prompt = build_prompt(&item.question, &item.response, current);

        let reply = match self.options.oracle_timeout {
            Some(limit) => tokio::time::timeout(limit, oracle.complete(&prompt))
                .await
                .map_err(|_| AffinityError::Timeout {
                    operation: "oracle call".to_string(),
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })??,
            None => oracle.complete(&prompt).await?,
        };

        parse_adjustments(&reply)
    }
}

pub fn build_prompt(question: &str, response: &str, vector: &DimensionVector) -> String {
    let mut scores = String::new();
    for (dim, value) in vector.iter() {
        scores.push_str(&format!("- {} ({}): {:.2}\n", dim.label(), dim.key(), value));
    }

    let mut schema = String::new();
    for (i, dim) in Dimension::ALL.iter().enumerate() {
        let sep = if i + 1 < Dimension::ALL.len() { "," } else { "" };
        schema.push_str(&format!(
            "  \"{}\": {{\"analysis\": \"...\", \"adjustment\": 0, \"confidence\": \"{}\"}}{}\n",
            dim.key(),
            "low|medium|high",
            sep
        ));
    }

    format!(
        "Analyze this free-text answer from a relationship personality quiz.\n\n\
         Question: {question}\n\
         Answer: {response}\n\n\
         Current dimension scores:\n{scores}\n\
         For each dimension, explain what the answer reveals and propose an adjustment \
         between -{limit} and {limit} to the current score, with your confidence.\n\
         Reply with a JSON object in exactly this shape:\n{{\n{schema}}}\n",
        limit = ADJUSTMENT_LIMIT,
    )
}

/// First balanced `{...}` span in `text`. Braces inside JSON strings are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut depth: u32 = 0;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escape = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match ch {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0
                        && let Some(s) = start.take()
                    {
                        return Some(&text[s..idx + 1]);
                    }
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse an oracle reply. Every dimension must be present with a numeric adjustment.
pub fn parse_adjustments(reply: &str) -> Result<DimensionAdjustments> {
    let span = extract_json_object(reply).ok_or_else(|| AffinityError::Parse {
        message: format!("no JSON object in oracle reply: {}", snippet(reply)),
    })?;
    let value: Value = serde_json::from_str(span).map_err(|e| AffinityError::Parse {
        message: format!("invalid JSON in oracle reply: {}", e),
    })?;
    let obj = value.as_object().ok_or_else(|| AffinityError::Parse {
        message: "oracle reply is not a JSON object".to_string(),
    })?;

    let parse_one = |dim: Dimension| -> Result<(Dimension, DimensionAdjustment)> {
        let entry = obj.get(dim.key()).ok_or_else(|| AffinityError::Parse {
            message: format!("missing dimension '{}'", dim.key()),
        })?;
        let adjustment = entry
            .get("adjustment")
            .and_then(Value::as_f64)
            .ok_or_else(|| AffinityError::Parse {
                message: format!("'{}' has no numeric adjustment", dim.key()),
            })?;
        let analysis = entry
            .get("analysis")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let confidence = match entry.get("confidence") {
            Some(Value::String(s)) => Confidence::from(s.clone()),
            Some(other) => Confidence::Unrecognized(other.to_string()),
            None => Confidence::Unrecognized(String::new()),
        };
        Ok((
            dim,
            DimensionAdjustment {
                analysis,
                adjustment,
                confidence,
            },
        ))
    };

    let [a, b, c, d] = Dimension::ALL;
    Ok(DimensionAdjustments([
        parse_one(a)?,
        parse_one(b)?,
        parse_one(c)?,
        parse_one(d)?,
    ]))
}

fn snippet(text: &str) -> String {
    let mut out: String = text.trim().chars().take(120).collect();
    if text.trim().chars().count() > 120 {
        out.push_str("...");
    }
    out
}
