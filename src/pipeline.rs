//! Quiz pipeline: base scoring, then free-text adjustment, then archetype matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::adjuster::{FreeTextResponse, Insight, LlmAdjuster};
use crate::archetypes::{Archetype, ArchetypeCatalog, ArchetypeMatch, match_archetypes};
use crate::clients::Oracle;
use crate::dimensions::DimensionVector;
use crate::error::{AffinityError, Result};
use crate::questions::QuestionCatalog;
use crate::scoring::BaseScorer;

/// Everything a quiz taker handed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizSubmission {
    /// `{ questionId: answer }`
    pub answers: Value,
    pub free_text: Vec<FreeTextResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub base_vector: DimensionVector,
    pub enhanced_vector: DimensionVector,
    pub primary_archetype: Archetype,
    pub secondary_archetype: Option<Archetype>,
    pub all_matches: Vec<ArchetypeMatch>,
    pub insights: Vec<Insight>,
}

impl QuizResult {
    /// Re-run matching on the stored enhanced vector, e.g. after loading a snapshot.
    pub fn rematch(&self, catalog: &ArchetypeCatalog) -> Result<ArchetypeMatch> {
        match_archetypes(&self.enhanced_vector, catalog)?
            .into_iter()
            .next()
            .ok_or(AffinityError::EmptyCatalog)
    }
}

pub struct QuizPipeline {
    questions: QuestionCatalog,
    catalog: ArchetypeCatalog,
    adjuster: LlmAdjuster,
}

impl QuizPipeline {
    pub fn new(
        questions: QuestionCatalog,
        catalog: ArchetypeCatalog,
        adjuster: LlmAdjuster,
    ) -> Self {
        Self {
            questions,
            catalog,
            adjuster,
        }
    }

    pub fn catalog(&self) -> &ArchetypeCatalog {
        &self.catalog
    }

    pub async fn run(
        &self,
        answers: &Value,
        free_text: &[FreeTextResponse],
        oracle: &dyn Oracle,
    ) -> Result<QuizResult> {
        // Fail before spending any oracle calls on a run that cannot finish.
        if self.catalog.is_empty() {
            return Err(AffinityError::EmptyCatalog);
        }

        let base_vector = BaseScorer::new(&self.questions).score(answers);
        tracing::debug!(?base_vector, "base scoring complete");

        let outcome = self.adjuster.adjust(base_vector, free_text, oracle).await;
        if !outcome.enhanced_vector.is_finite() {
            tracing::warn!("enhanced vector contains non-finite values; ranking may be arbitrary");
        }

        let mut ranked = match_archetypes(&outcome.enhanced_vector, &self.catalog)?.into_iter();
        let primary = ranked.next().ok_or(AffinityError::EmptyCatalog)?;
        let secondary = ranked.next();
        let mut all_matches = Vec::with_capacity(self.catalog.len());
        all_matches.push(primary.clone());
        all_matches.extend(secondary.iter().cloned());
        all_matches.extend(ranked);

        tracing::info!(
            primary = %primary.archetype.name,
            insights = outcome.insights.len(),
            skipped = outcome.failures.len(),
            "quiz scored"
        );

        Ok(QuizResult {
            id: Uuid::new_v4(),
            completed_at: Utc::now(),
            base_vector,
            enhanced_vector: outcome.enhanced_vector,
            primary_archetype: primary.archetype,
            secondary_archetype: secondary.map(|m| m.archetype),
            all_matches,
            insights: outcome.insights,
        })
    }

    /// Run a submission. When `free_text` is empty, string answers to the
    /// catalog's free-text questions are used instead, in catalog order.
    pub async fn run_submission(
        &self,
        submission: &QuizSubmission,
        oracle: &dyn Oracle,
    ) -> Result<QuizResult> {
        if submission.free_text.is_empty() {
            let derived = self.free_text_from_answers(&submission.answers);
            self.run(&submission.answers, &derived, oracle).await
        } else {
            self.run(&submission.answers, &submission.free_text, oracle)
                .await
        }
    }

    pub fn free_text_from_answers(&self, answers: &Value) -> Vec<FreeTextResponse> {
        let Some(map) = answers.as_object() else {
            return Vec::new();
        };
        self.questions
            .free_text_questions()
            .filter_map(|q| {
                let text = map.get(&q.id)?.as_str()?.trim();
                (!text.is_empty()).then(|| FreeTextResponse::new(q.prompt.clone(), text))
            })
            .collect()
    }
}
