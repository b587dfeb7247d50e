//! Prompt assembly.
//!
//! Turns a [`StageSpec`], the caller input, earlier stage outputs and this
//! stage's tool results into a [`GenerationRequest`].

use crate::core::StageRecord;
use crate::llm::GenerationRequest;
use crate::stages::StageSpec;
use crate::tools::{ToolKind, ToolOutput};
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

/// Longest `{previous}` substitution, in characters.
pub const PREVIOUS_SNIPPET_CHARS: usize = 200;

#[allow(clippy::unwrap_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(input|host|previous)\}").unwrap());

/// Extracts the host part of a URL-like string.
///
/// Returns `None` when `url` has no scheme separator or an empty host.
#[must_use]
pub fn extract_host(url: &str) -> Option<&str> {
    let start = url.find("://").map(|i| i + 3)?;
    let rest = &url[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    (!host.is_empty()).then_some(host)
}

fn previous_snippet(previous: Option<&str>) -> String {
    previous
        .and_then(|text| text.lines().map(str::trim).find(|l| !l.is_empty()))
        .map(|line| line.chars().take(PREVIOUS_SNIPPET_CHARS).collect())
        .unwrap_or_default()
}

/// Renders a search query template.
///
/// `{input}` becomes the caller input, `{host}` its host (or the raw input
/// when it is not a URL), `{previous}` the first non-blank line of the
/// latest prior output. The result is whitespace-collapsed.
#[must_use]
pub fn render_query(template: &str, input: &str, previous: Option<&str>) -> String {
    let host = extract_host(input).unwrap_or(input);
    let previous = previous_snippet(previous);
    let rendered = PLACEHOLDER.replace_all(template, |caps: &regex::Captures<'_>| match &caps[1] {
        "input" => input.to_string(),
        "host" => host.to_string(),
        _ => previous.clone(),
    });
    rendered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds the search query a stage runs, falling back to the raw input.
#[must_use]
pub fn stage_query(spec: &StageSpec, input: &str, prior: &[StageRecord]) -> String {
    let previous = prior.last().map(|r| r.output.as_str());
    match &spec.search_query {
        Some(template) => render_query(template, input, previous),
        None => input.to_string(),
    }
}

/// The persona message for a stage.
#[must_use]
pub fn system_prompt(spec: &StageSpec) -> String {
    format!(
        "You are {}. {}\nYour personal goal is: {}",
        spec.role, spec.backstory, spec.goal
    )
}

/// The task message for a stage.
#[must_use]
pub fn user_prompt(spec: &StageSpec, input: &str, prior: &[StageRecord], tool_outputs: &[ToolOutput]) -> String {
    let mut out = String::with_capacity(512);
    let _ = writeln!(out, "Task: {}", spec.description);
    let _ = writeln!(out, "Expected output: {}", spec.expected_output);
    let _ = writeln!(out, "\nCompany URL: {input}");

    if !prior.is_empty() {
        out.push_str("\n# Context from earlier stages\n");
        for record in prior {
            let _ = writeln!(out, "\n## {}\n{}", record.stage.label(), record.output.trim_end());
        }
    }

    if !tool_outputs.is_empty() {
        out.push_str("\n# Tool results\n");
        for output in tool_outputs {
            let heading = match output.kind {
                ToolKind::WebSearch => "Web search",
                ToolKind::Scrape => "Page content",
            };
            let _ = writeln!(out, "\n## {heading}: {}\n{}", output.argument, output.text.trim_end());
        }
    }

    out.push_str("\nRespond with the expected output only.");
    out
}

/// Builds the full generation request for one stage.
#[must_use]
pub fn build_request(
    spec: &StageSpec,
    input: &str,
    prior: &[StageRecord],
    tool_outputs: &[ToolOutput],
) -> GenerationRequest {
    GenerationRequest::new(system_prompt(spec), user_prompt(spec, input, prior, tool_outputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageId;
    use crate::stages::stage_table;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn record(stage: StageId, output: &str) -> StageRecord {
        StageRecord::completed(stage, output, Vec::new(), Utc::now())
    }

    #[test]
    fn test_extract_host() {
        assert_eq!(extract_host("https://example.com"), Some("example.com"));
        assert_eq!(extract_host("https://example.com/about?x=1"), Some("example.com"));
        assert_eq!(extract_host("http://user@shop.example.org:8080/"), Some("shop.example.org"));
        assert_eq!(extract_host("example.com"), None);
        assert_eq!(extract_host("https://"), None);
    }

    #[test]
    fn test_render_query_placeholders() {
        let q = render_query("{host} news {previous}", "https://acme.io/x", Some("\n  Acme makes rockets.\nMore"));
        assert_eq!(q, "acme.io news Acme makes rockets.");
    }

    #[test]
    fn test_render_query_input_and_missing_previous() {
        let q = render_query("about {input} {previous}", "acme", None);
        assert_eq!(q, "about acme");
    }

    #[test]
    fn test_previous_is_truncated() {
        let long = "x".repeat(500);
        let q = render_query("{previous}", "", Some(&long));
        assert_eq!(q.chars().count(), PREVIOUS_SNIPPET_CHARS);
    }

    #[test]
    fn test_stage_query_without_template_uses_input() {
        let spec = StageSpec::new(StageId::Research, "r");
        assert_eq!(stage_query(&spec, "https://a.b", &[]), "https://a.b");
    }

    #[test]
    fn test_stage_query_uses_latest_prior() {
        let table = stage_table();
        let prior = vec![record(StageId::Research, "first"), record(StageId::UseCase, "Chatbots")];
        let q = stage_query(&table[2], "https://acme.io", &prior);
        assert!(q.ends_with("Chatbots"));
    }

    #[test]
    fn test_system_prompt_carries_persona() {
        let table = stage_table();
        let system = system_prompt(&table[0]);
        assert!(system.contains(&table[0].role));
        assert!(system.contains(&table[0].goal));
        assert!(system.contains(&table[0].backstory));
    }

    #[test]
    fn test_user_prompt_includes_prior_outputs_in_order() {
        let table = stage_table();
        let prior = vec![record(StageId::Research, "PROFILE"), record(StageId::UseCase, "IDEAS")];
        let user = user_prompt(&table[2], "https://acme.io", &prior, &[]);

        let profile = user.find("PROFILE").unwrap();
        let ideas = user.find("IDEAS").unwrap();
        assert!(profile < ideas);
        assert!(user.contains("## Research"));
        assert!(user.contains("## Use-Case"));
        assert!(user.contains(&table[2].description));
        assert!(!user.contains("# Tool results"));
    }

    #[test]
    fn test_user_prompt_includes_tool_results() {
        let table = stage_table();
        let outputs = vec![ToolOutput::scraped("https://acme.io", "Welcome to Acme")];
        let user = user_prompt(&table[0], "https://acme.io", &[], &outputs);

        assert!(user.contains("## Page content: https://acme.io"));
        assert!(user.contains("Welcome to Acme"));
        assert!(!user.contains("# Context from earlier stages"));
    }

    #[test]
    fn test_build_request_shape() {
        let table = stage_table();
        let req = build_request(&table[3], "", &[], &[]);
        assert_eq!(req.messages.len(), 2);
        assert!(req.user_text().unwrap().contains("Company URL: "));
    }
}
