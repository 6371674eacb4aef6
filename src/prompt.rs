use crate::config::JobCriteria;
use crate::error::ScreenerError;
use crate::report::ScoredCandidate;

/// Build the analysis payload for one resume. Pure function: the same text
/// and criteria always produce an identical payload.
pub fn build_analysis_prompt(
    resume_text: &str,
    criteria: &JobCriteria,
    max_chars: usize,
) -> crate::Result<String> {
    if resume_text.trim().is_empty() {
        return Err(ScreenerError::EmptyInput(
            "resume text is empty (scanned image with no text layer?)".to_string(),
        ));
    }
    if criteria.description.trim().is_empty() {
        return Err(ScreenerError::EmptyInput(
            "job description is empty".to_string(),
        ));
    }

    let resume_text = truncate_chars(resume_text, max_chars);

    Ok(format!(
        r#"Analyze the following resume against the job requirements.

JOB DESCRIPTION:
{description}

REQUIRED SKILLS:
{skills}

MINIMUM YEARS OF EXPERIENCE:
{experience_years}

RESUME:
{resume_text}

Respond with a JSON object with the following structure and nothing else:
{{
    "skills_found": ["list", "of", "skills", "found", "in", "resume"],
    "skills_match_percent": percentage_of_required_skills_found,
    "experience_years": estimated_years_of_work_experience,
    "experience_match": boolean_if_experience_meets_requirements,
    "strengths": ["list", "of", "candidate", "strengths"],
    "weaknesses": ["list", "of", "candidate", "weaknesses"],
    "relevance_score": score_from_0_to_100_on_overall_job_fit,
    "additional_insights": "any_additional_insights_about_the_candidate"
}}

Analyze the resume thoroughly and be accurate in your assessment."#,
        description = criteria.description.trim(),
        skills = criteria.required_skills.join(", "),
        experience_years = criteria.min_experience_years,
    ))
}

/// Build the prompt asking for a prose assessment of an already-scored
/// candidate, used for the optional narrative reports.
pub fn build_narrative_prompt(file_name: &str, candidate: &ScoredCandidate) -> String {
    let analysis = &candidate.analysis;
    format!(
        r#"Generate a detailed candidate assessment report based on the following analysis:

Candidate: {file_name}
Skills Found: {skills_found}
Skills Match: {skills_match_percent}%
Experience: {experience_years} years
Strengths: {strengths}
Weaknesses: {weaknesses}
Relevance Score: {relevance_score}%
Additional Insights: {insights}
Overall Score: {overall_score:.1}%
Qualified: {qualified}

The report should include:
1. Executive summary
2. Detailed skills assessment
3. Experience evaluation
4. Strengths and weaknesses analysis
5. Recommendation for next steps (interview, reject, or keep in pool)"#,
        skills_found = analysis.skills_found.join(", "),
        skills_match_percent = analysis.skills_match_percent,
        experience_years = analysis.experience_years,
        strengths = analysis.strengths.join(", "),
        weaknesses = analysis.weaknesses.join(", "),
        relevance_score = analysis.relevance_score,
        insights = analysis.additional_insights,
        overall_score = candidate.overall_score,
        qualified = if candidate.qualified { "Yes" } else { "No" },
    )
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
