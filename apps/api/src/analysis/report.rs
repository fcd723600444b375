//! Best-effort structured view of the model's analysis text.
//!
//! The completion reply is opaque; nothing here validates it. Sections that
//! are missing or malformed come back empty. Only built when the caller asks
//! for `?structured=true`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static ATS_SCORE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ATS Score:\s*(\d+)").expect("valid ATS score regex"));

static SUMMARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Rewritten Professional Summary:\s*(.*)").expect("valid summary regex")
});

static MATCHED_SKILLS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Matched Skills:").expect("valid matched skills regex"));

static MISSING_SKILLS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Missing Skills:").expect("valid missing skills regex"));

static SUGGESTIONS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Improvement Suggestions:").expect("valid suggestions regex")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub ats_score: Option<u32>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub professional_summary: String,
}

impl AnalysisReport {
    pub fn parse(text: &str) -> Self {
        let text = text.replace("\r\n", "\n");

        let ats_score = ATS_SCORE_REGEX
            .captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());

        let professional_summary = SUMMARY_REGEX
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        AnalysisReport {
            ats_score,
            matched_skills: extract_list(&text, &MATCHED_SKILLS_REGEX),
            missing_skills: extract_list(&text, &MISSING_SKILLS_REGEX),
            improvement_suggestions: extract_list(&text, &SUGGESTIONS_REGEX),
            professional_summary,
        }
    }
}

/// Items listed under the first match of `label`, up to the first blank line
/// that follows them.
fn extract_list(text: &str, label: &Regex) -> Vec<String> {
    let Some(found) = label.find(text) else {
        return Vec::new();
    };

    let rest = &text[found.end()..];
    let mut lines = rest.lines();
    // Anything after the colon on the label line itself.
    let inline = lines.next().unwrap_or_default();

    let mut items: Vec<String> = Vec::new();
    if let Some(item) = clean_item(inline) {
        items.push(item);
    }
    for line in lines {
        match clean_item(line) {
            Some(item) => items.push(item),
            None if items.is_empty() => continue,
            None => break,
        }
    }
    items
}

fn clean_item(line: &str) -> Option<String> {
    let item = line
        .trim()
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•'))
        .trim();
    (!item.is_empty()).then(|| item.to_string())
}
