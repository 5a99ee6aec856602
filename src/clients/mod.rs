pub mod offline;
pub mod openai;
pub mod traits;

pub use offline::OfflineOracle;
pub use openai::OpenAiOracle;
pub use traits::{Oracle, OracleError};
