//! Turns free-text model output into a structured verdict.
//!
//! The model is instructed to emit three labeled sections but does not
//! always comply, so everything here is total: any parse miss degrades to
//! [`Classification::Unknown`] and the least-processed text available,
//! never an error. Reasoning cleanup is a fixed pipeline of three pure
//! passes, each testable on its own, composed in
//! [`cleanup_reasoning`].

use std::sync::LazyLock;

use regex::Regex;
use veritas_common::Classification;

static CLASSIFICATION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)classification:").expect("valid regex"));
static REASONING_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)reasoning:").expect("valid regex"));
static EVIDENCE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)evidence:").expect("valid regex"));

/// A label-like line boundary: newline, word of two or more letters, colon.
static SECTION_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[A-Za-z][A-Za-z]+:").expect("valid regex"));

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"')]+"#).expect("valid regex"));

static CITATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("valid regex"));

// Evidence markers only count as section headers when bold-wrapped or
// anchored at a line start. The bare word "evidence" inside a sentence
// never triggers stripping.
static PLAIN_EVIDENCE_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ism)^[ \t]*evidence:?\s*\[.*?\]\s*\z").expect("valid regex")
});
static BOLD_EVIDENCE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\*\*?evidence\*{0,2}:?\s*.*\z").expect("valid regex"));

static TRAILING_RESIDUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s*(?:\[\s*\]|\[|\*+|["']https?://[^\s"']+["'],?)\s*\z"#)
        .expect("valid regex")
});

static URL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*["']?https?://"#).expect("valid regex"));
static NUMBERED_URL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\d+\.\s*["']?https?://"#).expect("valid regex"));
static BRACKET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[\[\]]\s*$").expect("valid regex"));
static STAR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*+\s*$").expect("valid regex"));
static EVIDENCE_MARKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*\*{0,2}evidence\*{0,2}:?\s*$").expect("valid regex"));

static LEADING_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\s*\*\*\s*").expect("valid regex"));
static LEADING_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\s*\*\s*").expect("valid regex"));

/// Structured verdict extracted from raw model output.
///
/// The unmodified raw text is not carried here; the caller attaches it when
/// assembling the final [`veritas_common::FactCheckResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedVerdict {
    pub classification: Classification,
    pub reasoning: String,
    pub evidence: Vec<String>,
}

/// Extract the text following `label` up to the next label-like line or end
/// of input. Case-insensitive; an absent label yields an empty section.
fn extract_section(text: &str, label: &Regex) -> String {
    let Some(found) = label.find(text) else {
        return String::new();
    };
    let tail = &text[found.end()..];
    let body = match SECTION_BOUNDARY.find(tail) {
        Some(boundary) => &tail[..boundary.start()],
        None => tail,
    };
    body.trim().to_string()
}

/// Map a classification section to a verdict category.
///
/// Real-tokens are checked before fake-tokens, so a section containing both
/// resolves to `Real`.
pub fn classify(section: &str) -> Classification {
    let lowered = section.to_lowercase();
    if ["real", "true", "verified"].iter().any(|t| lowered.contains(t)) {
        Classification::Real
    } else if ["fake", "false", "hoax"].iter().any(|t| lowered.contains(t)) {
        Classification::Fake
    } else {
        Classification::Unknown
    }
}

fn warn_on_citation_overflow(reasoning: &str, evidence_count: usize) {
    let max_cited = CITATION_PATTERN
        .captures_iter(reasoning)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .max();
    if let Some(max_cited) = max_cited {
        if max_cited > evidence_count {
            tracing::warn!(
                target: "verdict.normalize",
                max_cited,
                evidence_count,
                "reasoning cites a source beyond the evidence list"
            );
        }
    }
}

/// Remove a trailing evidence block from the reasoning text.
///
/// Handles a line-anchored `Evidence:` marker followed by a bracketed
/// array, a bold-wrapped marker with arbitrary trailing content, and then
/// trailing residue (empty arrays, a dangling `[`, runs of `*`, quoted
/// URLs) until none remains.
pub fn strip_trailing_evidence_block(text: &str) -> String {
    let mut out = PLAIN_EVIDENCE_ARRAY.replace(text, "").into_owned();
    out = BOLD_EVIDENCE_TAIL.replace(&out, "").into_owned();
    loop {
        let next = TRAILING_RESIDUE.replace(&out, "").into_owned();
        if next == out {
            break;
        }
        out = next;
    }
    out.trim().to_string()
}

fn is_artifact_line(line: &str) -> bool {
    URL_LINE.is_match(line)
        || NUMBERED_URL_LINE.is_match(line)
        || BRACKET_LINE.is_match(line)
        || STAR_LINE.is_match(line)
        || EVIDENCE_MARKER_LINE.is_match(line)
}

/// Drop standalone artifact lines: bare or quoted URLs, numbered URL list
/// entries, lone array brackets, runs of emphasis markers, and line-anchored
/// `Evidence:` markers.
pub fn strip_artifact_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !is_artifact_line(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Remove markdown emphasis markers from the start of the text.
pub fn strip_leading_emphasis(text: &str) -> String {
    let out = LEADING_BOLD.replace(text, "");
    let out = LEADING_STAR.replace(&out, "");
    out.trim().to_string()
}

/// The full reasoning cleanup pipeline. A no-op on already-clean text.
pub fn cleanup_reasoning(text: &str) -> String {
    strip_leading_emphasis(&strip_artifact_lines(&strip_trailing_evidence_block(text)))
}

/// Parse raw model output into a structured verdict. Total over any input.
///
/// A missing classification yields `Unknown`; a missing or fully-stripped
/// reasoning section falls back to the whole raw text; the evidence list
/// keeps URL order of appearance and does not deduplicate. A citation
/// index beyond the evidence count is logged but never alters the output.
pub fn normalize(raw: &str) -> NormalizedVerdict {
    let classification_section = extract_section(raw, &CLASSIFICATION_LABEL);
    let reasoning_section = extract_section(raw, &REASONING_LABEL);
    let evidence_section = extract_section(raw, &EVIDENCE_LABEL);

    let classification = classify(&classification_section);
    let evidence: Vec<String> = URL_PATTERN
        .find_iter(&evidence_section)
        .map(|m| m.as_str().to_string())
        .collect();

    warn_on_citation_overflow(&reasoning_section, evidence.len());

    let cleaned = cleanup_reasoning(&reasoning_section);
    let reasoning = if cleaned.is_empty() {
        raw.trim().to_string()
    } else {
        cleaned
    };

    NormalizedVerdict {
        classification,
        reasoning,
        evidence,
    }
}
