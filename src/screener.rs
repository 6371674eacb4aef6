use crate::{
    config::Config,
    error::ScreenerError,
    extractor,
    llm::LlmClient,
    prompt,
    report::{BatchReport, CandidateOutcome, CandidateRecord, ReportMetadata, Reporter, ScoredCandidate},
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

pub struct Screener {
    config: Config,
    llm_client: LlmClient,
}

impl Screener {
    /// Build the screener and validate the credential up front: a missing
    /// API key aborts the run before any file is read or output written.
    pub fn new(config: Config) -> crate::Result<Self> {
        let llm_client = LlmClient::new(config.llm.clone())?;
        llm_client.api_key()?;

        Ok(Self { config, llm_client })
    }

    /// Enumerate candidate files in the input folder: regular files only,
    /// non-recursive, hidden files skipped, sorted by name for a stable
    /// batch order.
    pub fn discover_resumes(&self) -> crate::Result<Vec<PathBuf>> {
        let dir = &self.config.input_directory;
        if !dir.is_dir() {
            return Err(ScreenerError::Config(format!(
                "input directory not found: {}",
                dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                ScreenerError::Config(format!("failed to read {}: {}", dir.display(), e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            files.push(entry.into_path());
        }

        files.sort();

        if files.is_empty() {
            return Err(ScreenerError::EmptyInput(format!(
                "no resume files found in {}",
                dir.display()
            )));
        }

        Ok(files)
    }

    /// Run the batch: extract, prompt, and analyze each resume in order,
    /// recording a per-candidate error and continuing on failure unless
    /// `halt_on_error` is set.
    pub async fn run(&self) -> crate::Result<BatchReport> {
        let start_time = Instant::now();

        println!("🔍 Discovering resumes...");
        let files = self.discover_resumes()?;
        println!("  Found {} candidate file(s)", files.len());

        println!("\n🤖 Screening with {} ({})...", self.config.llm.provider.name(), self.config.llm.model);

        let mut records = Vec::with_capacity(files.len());
        for (i, path) in files.iter().enumerate() {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            match self.process_resume(path).await {
                Ok(candidate) => {
                    println!(
                        "  ✓ {} ({}/{}) - score {:.1}",
                        file_name,
                        i + 1,
                        files.len(),
                        candidate.overall_score
                    );
                    records.push(CandidateRecord {
                        file_name,
                        outcome: CandidateOutcome::Scored(candidate),
                    });
                }
                Err(e) => {
                    eprintln!("  ✗ {} ({}/{}): {}", file_name, i + 1, files.len(), e);
                    if self.config.screening.halt_on_error {
                        return Err(e);
                    }
                    records.push(CandidateRecord {
                        file_name,
                        outcome: CandidateOutcome::Error {
                            kind: e.kind().to_string(),
                            message: e.to_string(),
                        },
                    });
                }
            }

            if i + 1 < files.len() {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        let metadata = ReportMetadata {
            generated_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            provider: self.config.llm.provider.name().to_string(),
            model: self.config.llm.model.clone(),
            criteria: self.config.criteria.clone(),
            duration_ms: start_time.elapsed().as_millis(),
        };

        Ok(BatchReport { metadata, records })
    }

    async fn process_resume(&self, path: &Path) -> crate::Result<ScoredCandidate> {
        let text = extractor::extract_text(path)?;
        let payload = prompt::build_analysis_prompt(
            &text,
            &self.config.criteria,
            self.config.screening.max_resume_chars,
        )?;
        let analysis = self.llm_client.analyze(&payload).await?;

        Ok(ScoredCandidate::new(
            analysis,
            self.config.screening.qualification_threshold,
        ))
    }

    /// Ask the LLM for a prose assessment of each top candidate and append
    /// it to the detail reports. Failures degrade to the local report only.
    pub async fn write_narratives(
        &self,
        report: &BatchReport,
        reporter: &Reporter,
        output_dir: &Path,
    ) -> crate::Result<()> {
        let top = report.top_candidates(self.config.screening.top_candidates);
        if top.is_empty() {
            return Ok(());
        }

        println!("\n📝 Writing narrative assessments for top {} candidate(s)...", top.len());
        for (record, candidate) in top {
            let narrative_prompt = prompt::build_narrative_prompt(&record.file_name, candidate);
            match self.llm_client.generate_text(&narrative_prompt).await {
                Ok(narrative) => {
                    reporter.append_narrative(output_dir, &record.file_name, &narrative)?;
                    println!("  ✓ {}", record.file_name);
                }
                Err(e) => {
                    eprintln!("  ✗ {}: {}", record.file_name, e);
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::default();
        config.input_directory = dir.to_path_buf();
        config.llm.api_key = Some("test-key".to_string());
        config
    }

    #[test]
    fn discovery_is_non_recursive_sorted_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), "x").unwrap();
        fs::write(dir.path().join("a.docx"), "x").unwrap();
        fs::write(dir.path().join(".hidden.pdf"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.pdf"), "x").unwrap();

        let screener = Screener::new(config_for(dir.path())).unwrap();
        let files = screener.discover_resumes().unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.docx", "b.pdf"]);
    }

    #[test]
    fn empty_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let screener = Screener::new(config_for(dir.path())).unwrap();
        assert!(matches!(
            screener.discover_resumes(),
            Err(ScreenerError::EmptyInput(_))
        ));
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let mut config = Config::default();
        config.input_directory = PathBuf::from("/nonexistent/resumes");
        config.llm.api_key = Some("test-key".to_string());

        let screener = Screener::new(config).unwrap();
        assert!(matches!(
            screener.discover_resumes(),
            Err(ScreenerError::Config(_))
        ));
    }

    #[tokio::test]
    async fn batch_records_failures_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.txt"), "unsupported").unwrap();
        fs::write(dir.path().join("broken.pdf"), "not a real pdf").unwrap();

        let screener = Screener::new(config_for(dir.path())).unwrap();
        let report = screener.run().await.unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.records[0].file_name, "bad.txt");
        assert_eq!(report.records[1].file_name, "broken.pdf");
        match &report.records[0].outcome {
            CandidateOutcome::Error { kind, .. } => assert_eq!(kind, "unsupported_format"),
            other => panic!("expected error outcome, got {:?}", other),
        }
        match &report.records[1].outcome {
            CandidateOutcome::Error { kind, .. } => assert_eq!(kind, "extraction"),
            other => panic!("expected error outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn halt_on_error_aborts_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.txt"), "unsupported").unwrap();

        let mut config = config_for(dir.path());
        config.screening.halt_on_error = true;

        let screener = Screener::new(config).unwrap();
        assert!(matches!(
            screener.run().await,
            Err(ScreenerError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_credential_fails_at_construction() {
        let mut config = Config::default();
        config.llm.api_key = None;
        // Keep the environment out of the test.
        std::env::remove_var("GEMINI_API_KEY");

        assert!(matches!(
            Screener::new(config),
            Err(ScreenerError::Authentication(_))
        ));
    }
}
