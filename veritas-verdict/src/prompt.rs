use veritas_common::EvidenceRecord;

/// Records beyond this count are not included in the prompt.
pub const MAX_EVIDENCE_ITEMS: usize = 5;

/// Snippets are truncated to this many characters before formatting.
pub const SNIPPET_MAX_CHARS: usize = 300;

/// Format the retrieved evidence as a numbered block for the prompt.
///
/// Citation indices in the model's reasoning refer to these numbers, so
/// the input order is preserved exactly. Records without a title render
/// as "Untitled"; missing snippets render as an empty summary line.
pub fn format_evidence(records: &[EvidenceRecord]) -> String {
    records
        .iter()
        .take(MAX_EVIDENCE_ITEMS)
        .enumerate()
        .map(|(idx, record)| {
            let title = if record.title.is_empty() {
                "Untitled"
            } else {
                record.title.as_str()
            };
            let snippet: String = record.snippet.chars().take(SNIPPET_MAX_CHARS).collect();
            format!("{}. {}\nURL: {}\nSummary: {}", idx + 1, title, record.url, snippet)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the full fact-checking prompt for a claim and its evidence.
///
/// The template demands three labeled output sections (`Classification:`,
/// `Reasoning:`, `Evidence:`) with IEEE-style inline citations matching
/// the numbering of the evidence block.
pub fn build(claim: &str, evidence: &[EvidenceRecord]) -> String {
    format!(
        r#"
**FACT-CHECKER ASSIGNMENT: RAG Fake News Detector**

You are an objective, expert fact-checker. Your task is to analyze a user's query against
the real-time evidence retrieved from Google Search.

**1. QUERY/CLAIM TO VERIFY:**
{query}

**2. RETRIEVED EVIDENCE (Search Results):**
{search_results}

**INSTRUCTIONS FOR REASONING:**
A. **Classification:** Determine the veracity of the QUERY.
   - If the search results overwhelmingly confirm the claim, classify it as **REAL**.
   - If the search results **contradict** or **cannot find any corroborating information** for the claim, classify it as **FAKE**.
B. **Reasoning:** Your explanation must explicitly reference the information found in the **RETRIEVED EVIDENCE** section using IEEE-style inline citations. For each source you reference, use [1], [2], [3], etc. in square brackets. The numbering should correspond to the order of sources in the Evidence list below. Do NOT include URLs, the word "EVIDENCE", or evidence sections in your reasoning text.

**FINAL OUTPUT FORMAT:**
Classification: [REAL or FAKE]
Reasoning: [Provide a concise, detailed, and evidence-based explanation with IEEE-style citations like [1], [2], [3] where you reference sources. Do NOT include URLs, evidence sections, or the word "EVIDENCE" here.]
Evidence: [
  "https://www.source-link-1.com/article",
  "https://www.source-link-2.com/news"
]
"#,
        query = claim,
        search_results = format_evidence(evidence),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, url: &str, snippet: &str) -> EvidenceRecord {
        EvidenceRecord {
            title: title.to_string(),
            url: url.to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn evidence_is_numbered_in_order() {
        let records = vec![
            record("First", "https://a.com", "alpha"),
            record("Second", "https://b.com", "beta"),
        ];
        let block = format_evidence(&records);
        assert_eq!(
            block,
            "1. First\nURL: https://a.com\nSummary: alpha\n\n2. Second\nURL: https://b.com\nSummary: beta"
        );
    }

    #[test]
    fn evidence_is_capped_at_five_items() {
        let records: Vec<EvidenceRecord> = (1..=8)
            .map(|i| record(&format!("Item {i}"), &format!("https://x.com/{i}"), "s"))
            .collect();
        let block = format_evidence(&records);
        assert!(block.contains("5. Item 5"));
        assert!(!block.contains("Item 6"));
    }

    #[test]
    fn missing_title_becomes_untitled() {
        let records = vec![record("", "https://a.com", "alpha")];
        let block = format_evidence(&records);
        assert!(block.starts_with("1. Untitled\n"));
    }

    #[test]
    fn long_snippets_are_truncated_on_char_boundaries() {
        let snippet = "é".repeat(400);
        let records = vec![record("T", "https://a.com", &snippet)];
        let block = format_evidence(&records);
        let summary = block.rsplit("Summary: ").next().unwrap();
        assert_eq!(summary.chars().count(), SNIPPET_MAX_CHARS);
    }

    #[test]
    fn prompt_embeds_claim_and_output_contract() {
        let records = vec![record("Source", "https://a.com", "alpha")];
        let prompt = build("The moon is made of cheese", &records);
        assert!(prompt.contains("The moon is made of cheese"));
        assert!(prompt.contains("1. Source"));
        assert!(prompt.contains("Classification: [REAL or FAKE]"));
        assert!(prompt.contains("IEEE-style"));
    }

    #[test]
    fn empty_evidence_renders_an_empty_block() {
        let prompt = build("claim", &[]);
        assert!(prompt.contains("**2. RETRIEVED EVIDENCE (Search Results):**\n\n"));
    }
}
