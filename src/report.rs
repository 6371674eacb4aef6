use crate::config::JobCriteria;
use crate::llm::ResumeAnalysis;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub file_name: String,
    pub outcome: CandidateOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CandidateOutcome {
    Scored(ScoredCandidate),
    Error { kind: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub analysis: ResumeAnalysis,
    pub overall_score: f64,
    pub qualified: bool,
}

impl ScoredCandidate {
    /// Weighted overall score: 40% skills match, 30 points for meeting the
    /// experience requirement, 30% relevance.
    pub fn new(analysis: ResumeAnalysis, qualification_threshold: f64) -> Self {
        let overall_score = analysis.skills_match_percent * 0.4
            + if analysis.experience_match { 30.0 } else { 0.0 }
            + analysis.relevance_score * 0.3;

        Self {
            analysis,
            qualified: overall_score >= qualification_threshold,
            overall_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub metadata: ReportMetadata,
    pub records: Vec<CandidateRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub version: String,
    pub provider: String,
    pub model: String,
    pub criteria: JobCriteria,
    pub duration_ms: u128,
}

impl BatchReport {
    pub fn scored_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, CandidateOutcome::Scored(_)))
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.records.len() - self.scored_count()
    }

    /// Scored candidates ranked by overall score, best first, capped at `n`.
    /// A view over the records: ranking never feeds back into scoring.
    pub fn top_candidates(&self, n: usize) -> Vec<(&CandidateRecord, &ScoredCandidate)> {
        let mut scored: Vec<(&CandidateRecord, &ScoredCandidate)> = self
            .records
            .iter()
            .filter_map(|record| match &record.outcome {
                CandidateOutcome::Scored(candidate) => Some((record, candidate)),
                CandidateOutcome::Error { .. } => None,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.overall_score
                .partial_cmp(&a.1.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(n);
        scored
    }

    pub fn print_summary(&self, top_n: usize) {
        println!("\n📊 Screening Summary");
        println!("====================");
        println!("  Candidates processed: {}", self.records.len());
        println!("  Scored: {}", self.scored_count());
        println!("  Errors: {}", self.error_count());

        let top = self.top_candidates(top_n);
        if !top.is_empty() {
            println!("\n🏆 Top Candidates:");
            for (i, (record, candidate)) in top.iter().enumerate() {
                println!(
                    "  {}. {} - Score: {:.1}%",
                    i + 1,
                    record.file_name,
                    candidate.overall_score
                );
                println!(
                    "     Skills: {}",
                    candidate.analysis.skills_found.join(", ")
                );
                println!(
                    "     Experience: {} years",
                    candidate.analysis.experience_years
                );
                println!(
                    "     Qualified: {}",
                    if candidate.qualified { "Yes" } else { "No" }
                );
            }
        }

        for record in &self.records {
            if let CandidateOutcome::Error { kind, message } = &record.outcome {
                println!("  ⚠️  {} failed ({}): {}", record.file_name, kind, message);
            }
        }
    }
}

const CSV_HEADER: [&str; 13] = [
    "file_name",
    "status",
    "skills_found",
    "skills_match_percent",
    "experience_years",
    "experience_match",
    "strengths",
    "weaknesses",
    "relevance_score",
    "additional_insights",
    "overall_score",
    "qualified",
    "error",
];

pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    /// Write the CSV summary, run summary, and one detail report per
    /// candidate. Returns the paths written.
    pub fn export_report(&self, report: &BatchReport, output_dir: &Path) -> crate::Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;
        let mut exported_files = Vec::new();

        let csv_path = output_dir.join("screening_results.csv");
        self.write_csv(report, &csv_path)?;
        exported_files.push(csv_path);

        let summary_path = output_dir.join("screening_summary.md");
        fs::write(&summary_path, self.render_summary(report))?;
        exported_files.push(summary_path);

        for record in &report.records {
            let detail_path = self.detail_report_path(output_dir, &record.file_name);
            fs::write(&detail_path, self.render_detail(record, &report.metadata))?;
            exported_files.push(detail_path);
        }

        Ok(exported_files)
    }

    pub fn detail_report_path(&self, output_dir: &Path, file_name: &str) -> PathBuf {
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.to_string());
        output_dir.join(format!("report_{}.md", stem))
    }

    fn write_csv(&self, report: &BatchReport, path: &Path) -> crate::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(CSV_HEADER)?;

        for record in &report.records {
            let row: [String; 13] = match &record.outcome {
                CandidateOutcome::Scored(candidate) => {
                    let analysis = &candidate.analysis;
                    [
                        record.file_name.clone(),
                        "scored".to_string(),
                        analysis.skills_found.join("; "),
                        analysis.skills_match_percent.to_string(),
                        analysis.experience_years.to_string(),
                        analysis.experience_match.to_string(),
                        analysis.strengths.join("; "),
                        analysis.weaknesses.join("; "),
                        analysis.relevance_score.to_string(),
                        analysis.additional_insights.clone(),
                        format!("{:.1}", candidate.overall_score),
                        candidate.qualified.to_string(),
                        String::new(),
                    ]
                }
                CandidateOutcome::Error { kind, message } => {
                    let mut row: [String; 13] = Default::default();
                    row[0] = record.file_name.clone();
                    row[1] = "error".to_string();
                    row[12] = format!("{}: {}", kind, message);
                    row
                }
            };
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn render_summary(&self, report: &BatchReport) -> String {
        let meta = &report.metadata;
        let mut md = String::new();

        md.push_str("# Resume Screening Summary\n\n");
        md.push_str(&format!(
            "- **Generated:** {} (resume-screener {})\n",
            meta.generated_at, meta.version
        ));
        md.push_str(&format!(
            "- **Provider:** {} ({})\n",
            meta.provider, meta.model
        ));
        md.push_str(&format!(
            "- **Duration:** {:.2}s\n",
            meta.duration_ms as f64 / 1000.0
        ));
        md.push_str(&format!(
            "- **Candidates:** {} scored, {} errors\n\n",
            report.scored_count(),
            report.error_count()
        ));

        md.push_str("## Job Criteria\n\n");
        md.push_str(&format!("{}\n\n", meta.criteria.description.trim()));
        if !meta.criteria.required_skills.is_empty() {
            md.push_str(&format!(
                "**Required skills:** {}\n\n",
                meta.criteria.required_skills.join(", ")
            ));
        }
        md.push_str(&format!(
            "**Minimum experience:** {} years\n\n",
            meta.criteria.min_experience_years
        ));

        md.push_str("## Ranking\n\n");
        md.push_str("| Rank | Candidate | Overall Score | Skills Match | Relevance | Qualified |\n");
        md.push_str("|------|-----------|---------------|--------------|-----------|-----------|\n");
        for (i, (record, candidate)) in report.top_candidates(report.records.len()).iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {:.1} | {:.1} | {:.1} | {} |\n",
                i + 1,
                record.file_name,
                candidate.overall_score,
                candidate.analysis.skills_match_percent,
                candidate.analysis.relevance_score,
                if candidate.qualified { "yes" } else { "no" },
            ));
        }

        let errors: Vec<&CandidateRecord> = report
            .records
            .iter()
            .filter(|r| matches!(r.outcome, CandidateOutcome::Error { .. }))
            .collect();
        if !errors.is_empty() {
            md.push_str("\n## Errors\n\n");
            for record in errors {
                if let CandidateOutcome::Error { kind, message } = &record.outcome {
                    md.push_str(&format!("- **{}** ({}): {}\n", record.file_name, kind, message));
                }
            }
        }

        md
    }

    fn render_detail(&self, record: &CandidateRecord, meta: &ReportMetadata) -> String {
        let mut md = String::new();
        md.push_str(&format!("# Candidate Report: {}\n\n", record.file_name));
        md.push_str(&format!("Generated {} by {} ({})\n\n", meta.generated_at, meta.provider, meta.model));

        match &record.outcome {
            CandidateOutcome::Scored(candidate) => {
                let analysis = &candidate.analysis;
                md.push_str("## Scores\n\n");
                md.push_str("| Metric | Value |\n|--------|-------|\n");
                md.push_str(&format!(
                    "| Overall Score | {:.1} |\n",
                    candidate.overall_score
                ));
                md.push_str(&format!(
                    "| Skills Match | {:.1}% |\n",
                    analysis.skills_match_percent
                ));
                md.push_str(&format!(
                    "| Relevance | {:.1} |\n",
                    analysis.relevance_score
                ));
                md.push_str(&format!(
                    "| Experience | {} years ({}) |\n",
                    analysis.experience_years,
                    if analysis.experience_match {
                        "meets requirement"
                    } else {
                        "below requirement"
                    }
                ));
                md.push_str(&format!(
                    "| Qualified | {} |\n\n",
                    if candidate.qualified { "yes" } else { "no" }
                ));

                if !analysis.skills_found.is_empty() {
                    md.push_str("## Skills Found\n\n");
                    for skill in &analysis.skills_found {
                        md.push_str(&format!("- {}\n", skill));
                    }
                    md.push('\n');
                }

                if !analysis.strengths.is_empty() {
                    md.push_str("## Strengths\n\n");
                    for strength in &analysis.strengths {
                        md.push_str(&format!("- {}\n", strength));
                    }
                    md.push('\n');
                }

                if !analysis.weaknesses.is_empty() {
                    md.push_str("## Weaknesses\n\n");
                    for weakness in &analysis.weaknesses {
                        md.push_str(&format!("- {}\n", weakness));
                    }
                    md.push('\n');
                }

                if !analysis.additional_insights.is_empty() {
                    md.push_str("## Additional Insights\n\n");
                    md.push_str(&format!("{}\n", analysis.additional_insights));
                }
            }
            CandidateOutcome::Error { kind, message } => {
                md.push_str("## Screening Failed\n\n");
                md.push_str(&format!("- **Error kind:** {}\n", kind));
                md.push_str(&format!("- **Detail:** {}\n", message));
                md.push_str("\nThis candidate was not scored. Fix the input file or re-run the batch.\n");
            }
        }

        md
    }

    /// Append an LLM-written narrative assessment to a candidate's detail report.
    pub fn append_narrative(
        &self,
        output_dir: &Path,
        file_name: &str,
        narrative: &str,
    ) -> crate::Result<()> {
        let path = self.detail_report_path(output_dir, file_name);
        let mut content = fs::read_to_string(&path).unwrap_or_default();
        content.push_str("\n## Assessment\n\n");
        content.push_str(narrative);
        content.push('\n');
        fs::write(&path, content)?;
        Ok(())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(skills_match: f64, experience_match: bool, relevance: f64) -> ResumeAnalysis {
        ResumeAnalysis {
            skills_found: vec!["React".to_string()],
            skills_match_percent: skills_match,
            experience_years: 3.0,
            experience_match,
            strengths: vec!["ships fast".to_string()],
            weaknesses: vec![],
            relevance_score: relevance,
            additional_insights: "insight".to_string(),
        }
    }

    fn report_with(records: Vec<CandidateRecord>) -> BatchReport {
        BatchReport {
            metadata: ReportMetadata {
                generated_at: "2026-01-01T00:00:00Z".to_string(),
                version: "0.1.0".to_string(),
                provider: "Gemini".to_string(),
                model: "gemini-1.5-pro".to_string(),
                criteria: JobCriteria {
                    description: "desc".to_string(),
                    required_skills: vec!["React".to_string()],
                    min_experience_years: 2,
                },
                duration_ms: 1200,
            },
            records,
        }
    }

    fn scored(name: &str, skills_match: f64, experience_match: bool, relevance: f64) -> CandidateRecord {
        CandidateRecord {
            file_name: name.to_string(),
            outcome: CandidateOutcome::Scored(ScoredCandidate::new(
                analysis(skills_match, experience_match, relevance),
                70.0,
            )),
        }
    }

    fn errored(name: &str) -> CandidateRecord {
        CandidateRecord {
            file_name: name.to_string(),
            outcome: CandidateOutcome::Error {
                kind: "unsupported_format".to_string(),
                message: "unsupported file format: .txt".to_string(),
            },
        }
    }

    #[test]
    fn overall_score_uses_documented_weighting() {
        let candidate = ScoredCandidate::new(analysis(75.0, true, 80.0), 70.0);
        // 75 * 0.4 + 30 + 80 * 0.3 = 84
        assert!((candidate.overall_score - 84.0).abs() < 1e-9);
        assert!(candidate.qualified);
    }

    #[test]
    fn unmet_experience_drops_thirty_points() {
        let candidate = ScoredCandidate::new(analysis(75.0, false, 80.0), 70.0);
        assert!((candidate.overall_score - 54.0).abs() < 1e-9);
        assert!(!candidate.qualified);
    }

    #[test]
    fn csv_has_one_row_per_record_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let report = report_with(vec![
            scored("b.pdf", 50.0, true, 60.0),
            errored("notes.txt"),
            scored("a.docx", 90.0, true, 95.0),
        ]);

        Reporter::new().export_report(&report, dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("screening_results.csv")).unwrap();
        let rows: Vec<&str> = content.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].starts_with("file_name,status"));
        assert!(rows[1].starts_with("b.pdf,scored"));
        assert!(rows[2].starts_with("notes.txt,error"));
        assert!(rows[3].starts_with("a.docx,scored"));
        assert!(rows[2].contains("unsupported_format"));
    }

    #[test]
    fn export_writes_one_detail_report_per_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let report = report_with(vec![scored("jane.pdf", 80.0, true, 85.0), errored("bad.txt")]);

        let files = Reporter::new().export_report(&report, dir.path()).unwrap();

        assert_eq!(files.len(), 4); // csv + summary + 2 detail reports
        assert!(dir.path().join("report_jane.md").exists());
        assert!(dir.path().join("report_bad.md").exists());
        let error_report = fs::read_to_string(dir.path().join("report_bad.md")).unwrap();
        assert!(error_report.contains("Screening Failed"));
    }

    #[test]
    fn top_candidates_sorts_descending_and_caps() {
        let report = report_with(vec![
            scored("low.pdf", 10.0, false, 10.0),
            scored("high.pdf", 100.0, true, 100.0),
            errored("skip.txt"),
            scored("mid.pdf", 50.0, true, 50.0),
        ]);

        let top = report.top_candidates(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0.file_name, "high.pdf");
        assert_eq!(top[1].0.file_name, "mid.pdf");
    }

    #[test]
    fn counts_split_scored_and_errors() {
        let report = report_with(vec![scored("a.pdf", 1.0, false, 1.0), errored("b.txt")]);
        assert_eq!(report.scored_count(), 1);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn append_narrative_extends_detail_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = report_with(vec![scored("jane.pdf", 80.0, true, 85.0)]);
        let reporter = Reporter::new();
        reporter.export_report(&report, dir.path()).unwrap();

        reporter
            .append_narrative(dir.path(), "jane.pdf", "Strong hire.")
            .unwrap();

        let content = fs::read_to_string(dir.path().join("report_jane.md")).unwrap();
        assert!(content.contains("## Assessment"));
        assert!(content.contains("Strong hire."));
    }
}
