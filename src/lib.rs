pub mod adjuster;
pub mod archetypes;
pub mod clients;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod pipeline;
pub mod questions;
pub mod scoring;

use std::sync::Arc;

use crate::adjuster::{AdjusterOptions, LlmAdjuster};
use crate::archetypes::ArchetypeCatalog;
use crate::clients::{OfflineOracle, OpenAiOracle, Oracle};
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::QuizPipeline;
use crate::questions::QuestionCatalog;

pub use crate::adjuster::{FreeTextResponse, Insight};
pub use crate::dimensions::{Dimension, DimensionVector};
pub use crate::error::AffinityError;
pub use crate::pipeline::{QuizResult, QuizSubmission};

/// Assemble a pipeline from configuration: on-disk catalogs when configured, built-ins otherwise.
pub fn build_pipeline(config: &Config) -> Result<QuizPipeline> {
    let questions = match &config.catalogs.questions_path {
        Some(path) => QuestionCatalog::from_json_file(path)?,
        None => QuestionCatalog::builtin(),
    };
    let catalog = match &config.catalogs.archetypes_path {
        Some(path) => ArchetypeCatalog::from_json_file(path)?,
        None => ArchetypeCatalog::builtin(),
    };
    let adjuster = LlmAdjuster::new(AdjusterOptions {
        clamp_adjustments: config.scoring.clamp_adjustments,
        oracle_timeout: Some(config.oracle.timeout()),
    });
    Ok(QuizPipeline::new(questions, catalog, adjuster))
}

/// The configured oracle, or the offline one when no API key is available.
pub fn build_oracle(config: &Config, offline: bool) -> Result<Arc<dyn Oracle>> {
    if offline {
        return Ok(Arc::new(OfflineOracle));
    }
    match &config.runtime.openai_api_key {
        Some(key) => Ok(Arc::new(OpenAiOracle::new(&config.oracle, key.clone())?)),
        None => {
            tracing::warn!("OPENAI_API_KEY not set; free-text answers will not adjust scores");
            Ok(Arc::new(OfflineOracle))
        }
    }
}
