//! Oracle that never answers. Used when no API key is configured or `--offline` is passed.

use async_trait::async_trait;

use crate::clients::traits::{Oracle, OracleError};

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

#[async_trait]
impl Oracle for OfflineOracle {
    async fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
        Err(OracleError::Disabled)
    }
}
