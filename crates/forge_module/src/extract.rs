//! Structured code extraction from synthesizer output.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

/// Keywords that identify Terraform configuration blocks.
pub const TERRAFORM_HINTS: &[&str] = &["resource", "variable", "output", "provider", "module"];

/// Keywords that identify Gherkin feature files.
pub const BDD_HINTS: &[&str] = &["Feature:", "Scenario"];

/// Keywords that identify Go test files.
pub const GO_TEST_HINTS: &[&str] = &["package ", "func Test"];

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        // Language-tagged or bare triple-backtick fences; body is non-greedy
        // so adjacent blocks stay separate.
        Regex::new(r"(?s)```[A-Za-z0-9_+.\-]*[ \t]*\r?\n(.*?)```").expect("fence regex compiles")
    })
}

/// Extract the code artifact from raw synthesizer output.
///
/// Pure and deterministic: the same input always yields the same output,
/// which keeps pipeline runs reproducible.
///
/// Selection order:
/// 1. the first fenced block whose body contains any of `hints` — this
///    disambiguates output where an explanation snippet and the real
///    artifact are both fenced;
/// 2. otherwise the longest fenced block, since the real artifact is
///    usually the largest one;
/// 3. with no fenced blocks at all, the trimmed raw text unchanged.
pub fn extract_code(raw: &str, hints: &[&str]) -> String {
    let blocks: Vec<&str> = fence_regex()
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    if blocks.is_empty() {
        debug!("No fenced code block found, falling back to raw text");
        return raw.trim().to_string();
    }

    if let Some(block) = blocks
        .iter()
        .find(|body| hints.iter().any(|hint| body.contains(hint)))
    {
        return block.trim().to_string();
    }

    match blocks.iter().max_by_key(|body| body.len()) {
        Some(longest) => longest.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fence_returns_trimmed_input() {
        let raw = "  resource \"aws_s3_bucket\" \"b\" {}\n\n";
        assert_eq!(
            extract_code(raw, TERRAFORM_HINTS),
            "resource \"aws_s3_bucket\" \"b\" {}"
        );
    }

    #[test]
    fn test_no_fence_is_idempotent() {
        let raw = "plain text with no code at all";
        let once = extract_code(raw, TERRAFORM_HINTS);
        let twice = extract_code(&once, TERRAFORM_HINTS);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_single_fence_ignores_hints() {
        let raw = "Here is the module:\n```hcl\noutput \"id\" { value = 1 }\n```\nDone.";
        // Hints that match nothing still select the only block.
        assert_eq!(
            extract_code(raw, &["Feature:"]),
            "output \"id\" { value = 1 }"
        );
    }

    #[test]
    fn test_hinted_block_wins_over_earlier_block() {
        let raw = "Example usage:\n\
                   ```hcl\nmodule_source = \"./aks\"\n```\n\
                   The module itself:\n\
                   ```hcl\nresource \"azurerm_kubernetes_cluster\" \"main\" {\n  name = var.cluster_name\n}\n```\n";
        let extracted = extract_code(raw, &["resource"]);
        assert!(extracted.starts_with("resource \"azurerm_kubernetes_cluster\""));
    }

    #[test]
    fn test_longest_block_fallback() {
        let raw = "```\nshort\n```\nand\n```\na much longer body than the first one\n```";
        assert_eq!(
            extract_code(raw, &["no-match"]),
            "a much longer body than the first one"
        );
    }

    #[test]
    fn test_language_tags_and_crlf() {
        let raw = "```terraform\r\nvariable \"name\" {}\r\n```";
        assert_eq!(extract_code(raw, TERRAFORM_HINTS), "variable \"name\" {}");
    }

    #[test]
    fn test_gherkin_hints() {
        let raw = "Notes first.\n```gherkin\nFeature: encryption at rest\n  Scenario: buckets are encrypted\n```";
        let extracted = extract_code(raw, BDD_HINTS);
        assert!(extracted.starts_with("Feature: encryption at rest"));
    }
}
