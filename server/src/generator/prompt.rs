//! Generation prompt assembly and reply parsing

use crate::generator::fallback;
use crate::generator::GenerationContext;
use crate::models::artifact::GeneratedArtifact;

/// Delimiter between application code and documentation in the reply
pub const DOCUMENTATION_DELIMITER: &str = "---DOCUMENTATION---";

/// System message framing the generation request
pub const SYSTEM_MESSAGE: &str =
    "You are an expert web developer that creates complete, functional applications.";

/// Build the user prompt for one generation round
pub fn build_prompt(context: &GenerationContext) -> String {
    let enhancement_context = match &context.prior_docs {
        Some(docs) => format!(
            "\n### Existing Documentation:\n{}\n\nEnhance this project based on the new requirements below.\n",
            docs
        ),
        None => String::new(),
    };

    format!(
        r#"You are an expert web application developer.

### Iteration Number
{round}

### Project Requirements
{brief}
{enhancement}
### Available Assets
{assets}

### Validation Criteria
{checks:?}

### Response Format Requirements:
1. Create a complete, functional web application that meets all requirements.
2. Provide exactly TWO sections:
   - Complete HTML application code (with inline CSS/JS if needed)
   - Project documentation (starts after the delimiter: {delimiter})
3. Documentation must include:
   - Project overview
   - Setup instructions
   - Usage guide
   - If iteration 2+, explain enhancements from previous version.
4. No additional commentary outside code or documentation.
"#,
        round = context.round,
        brief = context.brief,
        enhancement = enhancement_context,
        assets = context.attachment_summary,
        checks = context.checks,
        delimiter = DOCUMENTATION_DELIMITER,
    )
}

/// Split a generation reply into application code and documentation.
///
/// A reply without the delimiter keeps the whole text as the application
/// and synthesizes the documentation locally.
pub fn split_reply(reply: &str, context: &GenerationContext) -> GeneratedArtifact {
    match reply.split_once(DOCUMENTATION_DELIMITER) {
        Some((code, docs)) => {
            GeneratedArtifact::new(extract_code(code), extract_code(docs))
        }
        None => GeneratedArtifact::new(
            extract_code(reply),
            fallback::documentation(context),
        ),
    }
}

/// Strip markdown code fences from a reply section.
///
/// When the section carries a fenced block, the first block wins and a bare
/// language tag on its opening line (`html`, `markdown`, ...) is dropped.
fn extract_code(section: &str) -> String {
    if !section.contains("```") {
        return section.trim().to_string();
    }

    let blocks: Vec<&str> = section.split("```").collect();
    if blocks.len() < 2 {
        return section.trim().to_string();
    }

    let block = blocks[1].trim();
    match block.split_once('\n') {
        Some((first_line, rest)) if is_language_tag(first_line.trim()) => {
            rest.trim().to_string()
        }
        _ => block.to_string(),
    }
}

fn is_language_tag(line: &str) -> bool {
    !line.is_empty()
        && line.len() <= 12
        && line.chars().all(|c| c.is_ascii_alphanumeric())
}
