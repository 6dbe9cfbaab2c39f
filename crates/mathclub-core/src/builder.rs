//! Lesson generation.
//!
//! [`LessonBuilder`] validates author input and asks a pluggable
//! [`GenerationProvider`] for a [`LessonPlan`]. The built-in providers live
//! in [`crate::curriculum`] and never leave the process; a provider backed by
//! a real content-generation service can be dropped in without touching the
//! session or persistence code.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Config, Curriculum};
use crate::curriculum::{FixedCurriculumProvider, TemplateProvider};
use crate::error::{LessonError, Result};
use crate::stage::LessonPlan;

/// Message shown when the topic or difficulty is blank.
pub const MISSING_INPUT_MESSAGE: &str = "Please enter both Lesson Concept and Difficulty Level.";

// ============================================================================
// Difficulty
// ============================================================================

/// The enumerated difficulty levels offered to authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// Introductory level.
    Basic,
    /// Middle level.
    Intermediate,
    /// Stretch level.
    Advanced,
}

impl Difficulty {
    /// All levels, easiest first.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Intermediate, Self::Advanced];

    /// Parses a level name, case-insensitively.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        };
        f.write_str(s)
    }
}

// ============================================================================
// LessonRequest
// ============================================================================

/// Author input handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRequest {
    /// Lesson topic, trimmed.
    pub topic: String,
    /// Difficulty level, trimmed (canonical spelling when restricted).
    pub difficulty: String,
}

impl LessonRequest {
    /// Validates author input.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Validation` if either value is blank, or if
    /// `restrict_difficulty` is set and the difficulty is not a
    /// [`Difficulty`] level.
    pub fn validated(topic: &str, difficulty: &str, restrict_difficulty: bool) -> Result<Self> {
        let topic = topic.trim();
        let difficulty = difficulty.trim();

        if topic.is_empty() || difficulty.is_empty() {
            return Err(LessonError::validation(MISSING_INPUT_MESSAGE));
        }

        let difficulty = if restrict_difficulty {
            Difficulty::from_str_case_insensitive(difficulty)
                .ok_or_else(|| {
                    LessonError::validation(format!(
                        "Unknown difficulty '{difficulty}'. Choose Basic, Intermediate or Advanced."
                    ))
                })?
                .to_string()
        } else {
            difficulty.to_string()
        };

        Ok(Self {
            topic: topic.to_string(),
            difficulty,
        })
    }

    /// Wraps input without validation, for providers that ignore it.
    #[must_use]
    pub fn unchecked(topic: &str, difficulty: &str) -> Self {
        Self {
            topic: topic.trim().to_string(),
            difficulty: difficulty.trim().to_string(),
        }
    }
}

// ============================================================================
// GenerationProvider
// ============================================================================

/// Source of lesson content.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether the provider reads the topic and difficulty.
    ///
    /// Input is only validated for providers that use it.
    fn uses_request(&self) -> bool {
        true
    }

    /// Produces a lesson plan for the request.
    async fn generate(&self, request: &LessonRequest) -> Result<LessonPlan>;
}

// ============================================================================
// LessonBuilder
// ============================================================================

/// Validates author input and delegates to a [`GenerationProvider`].
pub struct LessonBuilder {
    provider: Box<dyn GenerationProvider>,
    restrict_difficulty: bool,
}

impl std::fmt::Debug for LessonBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LessonBuilder")
            .field("provider", &self.provider.name())
            .field("restrict_difficulty", &self.restrict_difficulty)
            .finish()
    }
}

impl LessonBuilder {
    /// Creates a builder around a provider, accepting free-text difficulty.
    #[must_use]
    pub fn new(provider: impl GenerationProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            restrict_difficulty: false,
        }
    }

    /// Creates the builder selected by the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let builder = match config.curriculum {
            Curriculum::Template => Self::new(TemplateProvider),
            Curriculum::Fixed => Self::new(FixedCurriculumProvider),
        };
        builder.with_restricted_difficulty(config.restrict_difficulty)
    }

    /// Requires difficulty to be one of the [`Difficulty`] levels.
    #[must_use]
    pub fn with_restricted_difficulty(mut self, restrict: bool) -> Self {
        self.restrict_difficulty = restrict;
        self
    }

    /// Name of the wrapped provider.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Builds a lesson plan.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Validation` for blank or unknown input (only
    /// when the provider uses its input), the provider's own error, or
    /// `LessonError::GenerationFailed` if the provider returns no stages.
    pub async fn build(&self, topic: &str, difficulty: &str) -> Result<LessonPlan> {
        let request = if self.provider.uses_request() {
            LessonRequest::validated(topic, difficulty, self.restrict_difficulty)?
        } else {
            debug!(provider = self.provider.name(), "Provider ignores author input");
            LessonRequest::unchecked(topic, difficulty)
        };

        let plan = self.provider.generate(&request).await?;
        if plan.is_empty() {
            return Err(LessonError::generation_failed(
                self.provider.name(),
                "provider returned no stages",
            ));
        }

        info!(
            provider = self.provider.name(),
            topic = %request.topic,
            difficulty = %request.difficulty,
            stages = plan.len(),
            "Lesson generated"
        );
        Ok(plan)
    }
}
