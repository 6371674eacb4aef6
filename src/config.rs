use crate::error::ScreenerError;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    pub criteria: JobCriteria,
    pub llm: LlmConfig,
    pub screening: ScreeningConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCriteria {
    pub description: String,
    pub required_skills: Vec<String>,
    pub min_experience_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmProvider {
    Gemini,
    OpenAI,
    Ollama,
}

impl LlmProvider {
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "Gemini",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Ollama => "Ollama",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    pub max_resume_chars: usize,
    pub qualification_threshold: f64,
    pub top_candidates: usize,
    pub halt_on_error: bool,
    pub narrative_reports: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_directory: PathBuf::from("./resumes"),
            output_directory: PathBuf::from("./screening-output"),
            criteria: JobCriteria {
                description: String::new(),
                required_skills: Vec::new(),
                min_experience_years: 0,
            },
            llm: LlmConfig {
                provider: LlmProvider::Gemini,
                api_key: None,
                base_url: None,
                model: "gemini-1.5-pro".to_string(),
                max_tokens: 4000,
                temperature: 0.1,
                timeout_seconds: 120,
            },
            screening: ScreeningConfig {
                max_resume_chars: 30_000,
                qualification_threshold: 70.0,
                top_candidates: 5,
                halt_on_error: false,
                narrative_reports: false,
            },
        }
    }
}

impl Config {
    /// Get the default config file path (~/.resume-screener.toml)
    pub fn default_config_path() -> crate::Result<PathBuf> {
        let home_dir = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| ScreenerError::Config("could not determine home directory".to_string()))?;
        Ok(PathBuf::from(home_dir).join(".resume-screener.toml"))
    }

    /// Load config from the default location, falling back to defaults if no file exists
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::default_config_path()?;

        let mut config = if config_path.exists() {
            println!("📝 Loading configuration from: {}", config_path.display());
            Self::from_file(&config_path)?
        } else {
            println!(
                "ℹ️  No config file found at {}, using defaults",
                config_path.display()
            );
            println!("💡 Run 'resume-screener config' to create a default configuration file");
            Self::default()
        };

        config.resolve_api_key_from_env();
        Ok(config)
    }

    /// Load config from a specific file path
    pub fn from_file(path: &PathBuf) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| ScreenerError::Config(format!("{}: {}", path.display(), e)))?;
        config.resolve_api_key_from_env();
        Ok(config)
    }

    /// Save config to a file
    pub fn to_file(&self, path: &PathBuf) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ScreenerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Fill in the API key from the provider's environment variable when the
    /// config leaves it unset. Ollama runs locally and needs no key.
    fn resolve_api_key_from_env(&mut self) {
        if self.llm.api_key.is_none() {
            self.llm.api_key = match self.llm.provider {
                LlmProvider::Gemini => env::var("GEMINI_API_KEY").ok(),
                LlmProvider::OpenAI => env::var("OPENAI_API_KEY").ok(),
                LlmProvider::Ollama => None,
            };
        }
    }

    /// Create a config file with all available options documented
    pub fn create_documented_config() -> String {
        r#"# Resume Screener Configuration File
# This file configures how resume-screener evaluates candidate resumes

# Directory containing the resumes to screen (.pdf and .docx, one per candidate)
input_directory = "./resumes"

# Directory for the CSV summary and per-candidate reports
output_directory = "./screening-output"

[criteria]
# Free-text job description the resumes are scored against
description = """
We are looking for a Front-End Developer to join our team. The ideal candidate
has strong experience with React, JavaScript, HTML, and CSS. Knowledge of
responsive design principles and experience with UI/UX best practices is
essential. The candidate should have at least 2 years of experience in a
similar role.
"""

# Skills the position requires
required_skills = [
    "JavaScript", "React", "HTML", "CSS", "Responsive Design",
    "UI/UX", "Redux", "Git"
]

# Minimum years of experience required
min_experience_years = 2

[llm]
# LLM Provider: "Gemini", "OpenAI", or "Ollama"
provider = "Gemini"

# API key for the provider (can also be set via environment variables)
# Gemini: GEMINI_API_KEY
# OpenAI: OPENAI_API_KEY
# api_key = "your-api-key-here"

# Base URL (mainly for Ollama local instances)
# base_url = "http://localhost:11434"

# Model to use
model = "gemini-1.5-pro"

# Maximum tokens for LLM responses
max_tokens = 4000

# Temperature for LLM responses (0.0 = deterministic, 1.0 = creative)
temperature = 0.1

# Request timeout in seconds
timeout_seconds = 120

[screening]
# Resume text is truncated to this many characters before analysis
max_resume_chars = 30000

# Candidates scoring at or above this overall score are marked qualified
qualification_threshold = 70.0

# Number of top candidates highlighted in the run summary
top_candidates = 5

# Stop at the first failed resume instead of recording an error and continuing
halt_on_error = false

# Ask the LLM to write a prose assessment for each top candidate
narrative_reports = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_config_parses() {
        let config: Config = toml::from_str(&Config::create_documented_config()).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.criteria.min_experience_years, 2);
        assert_eq!(config.screening.max_resume_chars, 30_000);
        assert!(!config.screening.halt_on_error);
    }

    #[test]
    fn default_roundtrips_through_toml() {
        let serialized = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.llm.model, "gemini-1.5-pro");
        assert_eq!(parsed.screening.qualification_threshold, 70.0);
    }
}
