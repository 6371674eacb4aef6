pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod prompt;
pub mod report;
pub mod screener;

pub use config::Config;
pub use error::ScreenerError;
pub use llm::LlmClient;
pub use report::Reporter;
pub use screener::Screener;

pub type Result<T> = std::result::Result<T, ScreenerError>;
