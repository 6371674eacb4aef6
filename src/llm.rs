use crate::config::{LlmConfig, LlmProvider};
use crate::error::ScreenerError;
use regex::Regex;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Structured analysis of one resume, as returned by the LLM. Field names
/// are the wire contract embedded in the analysis prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default)]
    pub skills_found: Vec<String>,
    #[serde(default)]
    pub skills_match_percent: f64,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub experience_match: bool,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub additional_insights: String,
}

pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    /// Resolve the API credential, failing when the configured provider
    /// requires a key and none was supplied.
    pub fn api_key(&self) -> crate::Result<&str> {
        match self.config.provider {
            LlmProvider::Ollama => Ok(""),
            provider => self.config.api_key.as_deref().ok_or_else(|| {
                ScreenerError::Authentication(format!(
                    "{} API key not provided (set it in the config file or environment)",
                    provider.name()
                ))
            }),
        }
    }

    /// Analyze one resume payload, returning the parsed structured result.
    pub async fn analyze(&self, prompt: &str) -> crate::Result<ResumeAnalysis> {
        let content = self.complete(prompt).await?;
        parse_analysis(&content)
    }

    /// Ask the model for free-form prose, used for narrative candidate reports.
    pub async fn generate_text(&self, prompt: &str) -> crate::Result<String> {
        self.complete(prompt).await
    }

    async fn complete(&self, prompt: &str) -> crate::Result<String> {
        match self.config.provider {
            LlmProvider::Gemini => self.complete_with_gemini(prompt).await,
            LlmProvider::OpenAI => self.complete_with_openai(prompt).await,
            LlmProvider::Ollama => self.complete_with_ollama(prompt).await,
        }
    }

    async fn complete_with_gemini(&self, prompt: &str) -> crate::Result<String> {
        let api_key = self.api_key()?;

        let default_url = "https://generativelanguage.googleapis.com".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_url);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url, self.config.model
        );

        let payload = serde_json::json!({
            "contents": [
                {
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens
            }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let response_json: serde_json::Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ScreenerError::MalformedResponse(e.to_string()))?;

        let content = response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                ScreenerError::MalformedResponse(format!(
                    "Gemini response has no text content: {}",
                    snippet(&response_json.to_string())
                ))
            })?;

        Ok(content.to_string())
    }

    async fn complete_with_openai(&self, prompt: &str) -> crate::Result<String> {
        let api_key = self.api_key()?;

        let default_url = "https://api.openai.com".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_url);

        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_completion_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let response_json: serde_json::Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ScreenerError::MalformedResponse(e.to_string()))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ScreenerError::MalformedResponse(format!(
                    "OpenAI response has no message content: {}",
                    snippet(&response_json.to_string())
                ))
            })?;

        Ok(content.to_string())
    }

    async fn complete_with_ollama(&self, prompt: &str) -> crate::Result<String> {
        let default_url = "http://localhost:11434".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_url);

        let payload = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            }
        });

        let response = self
            .client
            .post(format!("{}/api/generate", base_url))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let response_json: serde_json::Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ScreenerError::MalformedResponse(e.to_string()))?;

        let content = response_json["response"].as_str().ok_or_else(|| {
            ScreenerError::MalformedResponse(format!(
                "Ollama response has no content: {}",
                snippet(&response_json.to_string())
            ))
        })?;

        Ok(content.to_string())
    }
}

async fn check_status(response: Response) -> crate::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => ScreenerError::Authentication(snippet(&body)),
        429 => ScreenerError::RateLimit(snippet(&body)),
        code => ScreenerError::Api {
            status: code,
            body: snippet(&body),
        },
    })
}

/// Parse the model's reply into a `ResumeAnalysis`. Models frequently wrap
/// the JSON in markdown code fences, so those are stripped first. An
/// unparseable reply is an error for this candidate, never a zero score.
pub fn parse_analysis(content: &str) -> crate::Result<ResumeAnalysis> {
    let json_str = extract_json(content);
    serde_json::from_str(json_str).map_err(|e| {
        ScreenerError::MalformedResponse(format!("{} in: {}", e, snippet(content)))
    })
}

fn extract_json(content: &str) -> &str {
    if let Ok(re) = Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```") {
        if let Some(m) = re.captures(content).and_then(|caps| caps.get(1)) {
            return m.as_str();
        }
    }
    content.trim()
}

fn snippet(s: &str) -> String {
    const MAX: usize = 200;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(MAX).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_JSON: &str = r#"{
        "skills_found": ["React", "CSS"],
        "skills_match_percent": 75.0,
        "experience_years": 4,
        "experience_match": true,
        "strengths": ["strong front-end background"],
        "weaknesses": ["no Redux"],
        "relevance_score": 80.0,
        "additional_insights": "solid candidate"
    }"#;

    #[test]
    fn parses_plain_json() {
        let analysis = parse_analysis(FULL_JSON).unwrap();
        assert_eq!(analysis.skills_found, vec!["React", "CSS"]);
        assert_eq!(analysis.skills_match_percent, 75.0);
        assert!(analysis.experience_match);
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("Here is the analysis:\n```json\n{}\n```\nDone.", FULL_JSON);
        let analysis = parse_analysis(&fenced).unwrap();
        assert_eq!(analysis.relevance_score, 80.0);
    }

    #[test]
    fn parses_fence_without_language_tag() {
        let fenced = format!("```\n{}\n```", FULL_JSON);
        assert!(parse_analysis(&fenced).is_ok());
    }

    #[test]
    fn missing_fields_default() {
        let analysis = parse_analysis(r#"{"relevance_score": 50.0}"#).unwrap();
        assert_eq!(analysis.relevance_score, 50.0);
        assert_eq!(analysis.skills_match_percent, 0.0);
        assert!(analysis.skills_found.is_empty());
        assert!(!analysis.experience_match);
    }

    #[test]
    fn garbage_is_malformed_response() {
        assert!(matches!(
            parse_analysis("I cannot analyze this resume."),
            Err(ScreenerError::MalformedResponse(_))
        ));
    }

    #[test]
    fn extract_json_leaves_unfenced_content_alone() {
        assert_eq!(extract_json("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn snippet_caps_long_content() {
        let long = "x".repeat(500);
        assert!(snippet(&long).len() < 500);
        assert!(snippet(&long).ends_with("..."));
    }
}
