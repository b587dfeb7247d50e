//! HTML pages.

use proposalflow::errors::PipelineError;
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
pre{white-space:pre-wrap;background:#f6f8fa;padding:1rem;border-radius:4px}\
input[type=text]{width:28rem;padding:.4rem}.error{color:#b00020}";

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

/// The input form.
pub fn index_page() -> String {
    layout(
        "AI Use Case Proposal",
        "<h1>AI Use Case Proposal</h1>\n\
         <p>Enter a company website to research it and draft an AI/ML adoption proposal.</p>\n\
         <form method=\"post\" action=\"/\">\n\
         <input type=\"text\" name=\"url\" placeholder=\"https://example.com\" autofocus>\n\
         <button type=\"submit\">Generate Proposal</button>\n\
         </form>\n",
    )
}

/// The proposal for `url`.
pub fn result_page(url: &str, proposal: &str) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Proposal for {}</h1>", escape_html(url));
    let _ = writeln!(body, "<pre>{}</pre>", escape_html(proposal));
    body.push_str("<p><a href=\"/\">Analyze another company</a></p>\n");
    layout("Proposal", &body)
}

/// The failure report for `url`.
pub fn error_page(url: &str, error: &PipelineError) -> String {
    let mut body = String::new();
    body.push_str("<h1 class=\"error\">Proposal generation failed</h1>\n");
    let _ = writeln!(
        body,
        "<p>The <strong>{}</strong> stage failed while processing <code>{}</code>.</p>",
        escape_html(error.stage().label()),
        escape_html(url)
    );
    let _ = writeln!(body, "<pre>{}</pre>", escape_html(&error.source.to_string()));
    body.push_str("<p><a href=\"/\">Try again</a></p>\n");
    layout("Proposal failed", &body)
}
