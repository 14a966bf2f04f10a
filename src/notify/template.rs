//! Shared email template: styled wrapper, heading, intro and details table,
//! rendered as HTML and as a plain-text fallback.

use crate::contact::model::ContactSubmission;

const NOT_PROVIDED: &str = "Not provided";

/// A rendered email body pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
}

/// Render the details email for `submission`.
pub fn render(heading: &str, intro: &str, submission: &ContactSubmission) -> RenderedEmail {
    let rows = detail_rows(submission);

    let mut table = String::new();
    for (label, value) in &rows {
        table.push_str(&format!(
            "<tr><td style=\"padding:8px 12px;font-weight:600;color:#334155;vertical-align:top;\">{}</td>\
             <td style=\"padding:8px 12px;color:#0f172a;white-space:pre-wrap;\">{}</td></tr>",
            escape_html(label),
            escape_html(value)
        ));
    }

    let html = format!(
        "<!DOCTYPE html><html><body style=\"margin:0;padding:24px;background:#f1f5f9;font-family:Arial,Helvetica,sans-serif;\">\
         <div style=\"max-width:600px;margin:0 auto;background:#ffffff;border-radius:8px;padding:24px;\">\
         <h1 style=\"font-size:20px;color:#0f766e;margin:0 0 16px;\">{}</h1>\
         <p style=\"font-size:14px;color:#334155;line-height:1.5;margin:0 0 16px;\">{}</p>\
         <table style=\"width:100%;border-collapse:collapse;font-size:14px;\">{}</table>\
         </div></body></html>",
        escape_html(heading),
        escape_html(intro),
        table
    );

    let mut text = format!("{heading}\n\n{intro}\n\n");
    for (label, value) in &rows {
        text.push_str(&format!("{label}: {value}\n"));
    }

    RenderedEmail { html, text }
}

fn detail_rows(submission: &ContactSubmission) -> [(&'static str, &str); 4] {
    [
        ("Name", submission.name.as_str()),
        ("Email", submission.email.as_deref().unwrap_or(NOT_PROVIDED)),
        ("Phone", submission.phone.as_str()),
        ("Message", submission.message.as_str()),
    ]
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
