//! Markdown rendering of lesson pages and handouts.
//!
//! Page renderers produce the text shown for the current stage in the author
//! and kids consoles. [`HandoutGenerator`] renders a whole lesson, either the
//! live session or a saved snapshot, for printing.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use mathclub_core::{AuthorPage, ConsumerPage, Session, Snapshot, Stage};

use crate::{RenderError, Result};

// ============================================================================
// Pages
// ============================================================================

/// Renders the author's page: every field, the image and the phase.
#[must_use]
pub fn render_author_page(page: &AuthorPage) -> String {
    let mut output = String::new();
    let stage = &page.stage;

    let _ = writeln!(
        output,
        "# Stage {} of {} ({})\n",
        page.stage_number, page.total, page.phase
    );

    if let Some(concept) = &stage.concept {
        let _ = writeln!(output, "**Concept**: {}\n", escape_inline(concept));
    }

    write_section(&mut output, "Story Setup", &stage.story);
    write_section(&mut output, "Image Prompt", &stage.image_prompt);

    let _ = writeln!(output, "## Image\n");
    match &page.image_file {
        Some(name) => {
            let _ = writeln!(output, "Attached: `{}`\n", escape_inline_code(name));
        }
        None => {
            let _ = writeln!(output, "*No image attached.*\n");
        }
    }

    write_prompts(&mut output, "Discussion Prompts", &stage.discussion_prompts);
    write_section(&mut output, "Hands-On Activity", &stage.activity);
    write_section(&mut output, "Hints", &stage.hints);

    output
}

/// Renders the kids' page. Hints never appear here.
#[must_use]
pub fn render_consumer_page(page: &ConsumerPage) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Stage {} of {}\n", page.stage_number, page.total);

    if let Some(name) = &page.image_file {
        let _ = writeln!(
            output,
            "![Stage {}]({})\n",
            page.stage_number,
            escape_inline_code(name)
        );
    }

    let _ = writeln!(output, "{}\n", escape_markdown(&page.story));
    write_prompts(&mut output, "Let's Talk", &page.discussion_prompts);
    write_section(&mut output, "Let's Try", &page.activity);

    output
}

// ============================================================================
// Handout
// ============================================================================

/// Renders every stage of a lesson into one Markdown document.
pub struct HandoutGenerator<'a> {
    stages: &'a [Stage],
    images: BTreeMap<usize, String>,
    saved_at: Option<DateTime<Utc>>,
}

impl<'a> HandoutGenerator<'a> {
    /// Creates a handout for the live session, naming attached images by
    /// their upload file names.
    #[must_use]
    pub fn from_session(session: &'a Session) -> Self {
        let stages = session.lesson().map_or(&[][..], |plan| &plan.stages[..]);
        let images = session
            .uploaded_images()
            .iter()
            .map(|(&index, image)| (index, image.file_name.clone()))
            .collect();
        Self {
            stages,
            images,
            saved_at: None,
        }
    }

    /// Creates a handout for a saved snapshot, linking the saved image files.
    #[must_use]
    pub fn from_snapshot(snapshot: &'a Snapshot) -> Self {
        Self {
            stages: &snapshot.stages,
            images: snapshot.uploaded_images.clone(),
            saved_at: snapshot.saved_at,
        }
    }

    /// Generates the handout.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        for (index, stage) in self.stages.iter().enumerate() {
            self.write_stage(&mut output, index, stage);
        }
        Self::write_footer(&mut output);

        output
    }

    /// Writes the handout to a file.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Empty` if there is no lesson and
    /// `RenderError::Io` if the file cannot be written.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        if self.stages.is_empty() {
            return Err(RenderError::Empty("the lesson has no stages".to_string()));
        }
        std::fs::write(path, self.generate())?;
        Ok(())
    }

    fn write_title(&self, output: &mut String) {
        let _ = writeln!(output, "# Math Club Lesson\n");
        let _ = writeln!(output, "{} stages", self.stages.len());
        if let Some(saved_at) = &self.saved_at {
            let _ = writeln!(output, "\nSaved {}", format_timestamp(saved_at));
        }
        let _ = writeln!(output);
    }

    fn write_stage(&self, output: &mut String, index: usize, stage: &Stage) {
        let number = index + 1;
        match &stage.concept {
            Some(concept) => {
                let _ = writeln!(output, "## Stage {number}: {}\n", escape_inline(concept));
            }
            None => {
                let _ = writeln!(output, "## Stage {number}\n");
            }
        }

        if let Some(image) = self.images.get(&index) {
            let _ = writeln!(output, "![Stage {number}]({})\n", escape_inline_code(image));
        }

        write_subsection(output, "Story Setup", &stage.story);
        write_subsection(output, "Image Prompt", &stage.image_prompt);

        let _ = writeln!(output, "### Discussion Prompts\n");
        write_prompt_list(output, &stage.discussion_prompts);

        write_subsection(output, "Hands-On Activity", &stage.activity);
        write_subsection(output, "Hints", &stage.hints);
    }

    fn write_footer(output: &mut String) {
        let _ = writeln!(output, "---");
        let timestamp = format_timestamp(&Utc::now());
        let _ = writeln!(output, "*Generated by Math Club at {timestamp}*");
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn write_section(output: &mut String, title: &str, body: &str) {
    let _ = writeln!(output, "## {title}\n");
    write_body(output, body);
}

fn write_subsection(output: &mut String, title: &str, body: &str) {
    let _ = writeln!(output, "### {title}\n");
    write_body(output, body);
}

fn write_body(output: &mut String, body: &str) {
    if body.trim().is_empty() {
        let _ = writeln!(output, "*None*\n");
    } else {
        let _ = writeln!(output, "{}\n", escape_markdown(body));
    }
}

fn write_prompts(output: &mut String, title: &str, prompts: &[String]) {
    let _ = writeln!(output, "## {title}\n");
    write_prompt_list(output, prompts);
}

fn write_prompt_list(output: &mut String, prompts: &[String]) {
    if prompts.is_empty() {
        let _ = writeln!(output, "*None*\n");
        return;
    }
    for prompt in prompts {
        let _ = writeln!(output, "- {}", escape_inline(prompt));
    }
    let _ = writeln!(output);
}

/// Format: "YYYY-MM-DD HH:MM:SS UTC"
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Escapes characters that would start Markdown formatting. Newlines are kept.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '\\' | '<' | '>' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            _ => result.push(ch),
        }
    }

    result
}

/// Escapes text for a single line (headings, list items).
fn escape_inline(text: &str) -> String {
    escape_markdown(&text.replace(['\r', '\n'], " "))
}

/// Backticks and parentheses would break inline code and link targets.
fn escape_inline_code(text: &str) -> String {
    text.replace('`', "'").replace('(', "%28").replace(')', "%29")
}

// ============================================================================
// Tests
// ============================================================================
