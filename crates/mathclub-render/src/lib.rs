//! Math Club Lesson Rendering
//!
//! Renders lesson content to Markdown for the console and for printed
//! handouts.
//!
//! # Renderers
//!
//! - [`render_author_page`] - the author's view of one stage, hints included
//! - [`render_consumer_page`] - the kids' view of one stage
//! - [`HandoutGenerator`] - every stage of a lesson in one document
//!
//! # Example
//!
//! ```rust
//! use mathclub_core::{LessonPlan, Session, Stage};
//! use mathclub_render::HandoutGenerator;
//!
//! let mut session = Session::new();
//! session
//!     .load_lesson(LessonPlan::new(vec![Stage {
//!         story: "Pip counts acorns".to_string(),
//!         ..Default::default()
//!     }]))
//!     .unwrap();
//!
//! let markdown = HandoutGenerator::from_session(&session).generate();
//! assert!(markdown.contains("## Stage 1"));
//! ```

mod markdown;

pub use markdown::{render_author_page, render_consumer_page, HandoutGenerator};

use thiserror::Error;

/// Errors that can occur while writing rendered output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to write the rendered file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// There is nothing to render.
    #[error("nothing to render: {0}")]
    Empty(String),
}

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;
