//! Locally synthesized fallback artifacts
//!
//! Used when the content generator is unreachable or returns a non-success
//! status, so a dispatched run still commits a working entry point and
//! documentation built only from the request itself.

use crate::generator::GenerationContext;
use crate::models::artifact::GeneratedArtifact;

/// Synthesize the full fallback artifact set
pub fn synthesize(context: &GenerationContext) -> GeneratedArtifact {
    GeneratedArtifact::new(application(context), documentation(context))
}

/// Minimal HTML page carrying the brief and checks
pub fn application(context: &GenerationContext) -> String {
    let checks = context
        .checks
        .iter()
        .map(|check| format!("      <li>{}</li>\n", check))
        .collect::<String>();

    format!(
        r#"<html>
  <head><title>{task}</title></head>
  <body>
    <h1>Auto-Generated Application</h1>
    <p>This application was created as a fallback. Requirements: {brief}</p>
    <ul>
{checks}    </ul>
  </body>
</html>
"#,
        task = context.task,
        brief = context.brief,
        checks = checks,
    )
}

/// README synthesized from the brief, checks, and attachment summary
pub fn documentation(context: &GenerationContext) -> String {
    let checks = context.checks.join("\n");

    format!(
        r#"# Project Documentation (Iteration {round})

**Project Brief:** {brief}

**Available Attachments:**
{attachments}

**Validation Requirements:**
{checks}

## Installation
1. Open `index.html` in a web browser.
2. No additional setup required.

## Usage
This application was auto-generated based on the provided specifications.

## Notes
Generated as fallback when AI service was unavailable.
"#,
        round = context.round,
        brief = context.brief,
        attachments = context.attachment_summary,
        checks = checks,
    )
}
