//! Lesson content types.
//!
//! A [`LessonPlan`] is an ordered sequence of [`Stage`]s. Stages only change
//! through whole-field replacement via [`Stage::set_field`].

use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result};

// ============================================================================
// Stage
// ============================================================================

/// One unit of lesson content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Story text read to the class.
    pub story: String,

    /// Prompt for producing the stage illustration.
    #[serde(alias = "canva_prompt")]
    pub image_prompt: String,

    /// Questions for class discussion, in order.
    #[serde(default)]
    pub discussion_prompts: Vec<String>,

    /// Hands-on activity for the stage.
    #[serde(alias = "hands_on_activity")]
    pub activity: String,

    /// Hints for the teacher.
    #[serde(default)]
    pub hints: String,

    /// Curriculum concept this stage covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
}

impl Stage {
    /// Returns the current text of a field, as an author would edit it.
    ///
    /// Discussion prompts are joined with newlines.
    #[must_use]
    pub fn field_text(&self, field: StageField) -> String {
        match field {
            StageField::Story => self.story.clone(),
            StageField::ImagePrompt => self.image_prompt.clone(),
            StageField::DiscussionPrompts => self.discussion_prompts.join("\n"),
            StageField::Activity => self.activity.clone(),
            StageField::Hints => self.hints.clone(),
            StageField::Concept => self.concept.clone().unwrap_or_default(),
        }
    }

    /// Replaces a whole field with new author text.
    ///
    /// Discussion prompts take one prompt per non-blank line. A blank
    /// concept clears it.
    pub fn set_field(&mut self, field: StageField, text: &str) {
        match field {
            StageField::Story => self.story = text.to_string(),
            StageField::ImagePrompt => self.image_prompt = text.to_string(),
            StageField::DiscussionPrompts => {
                self.discussion_prompts = text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(ToString::to_string)
                    .collect();
            }
            StageField::Activity => self.activity = text.to_string(),
            StageField::Hints => self.hints = text.to_string(),
            StageField::Concept => {
                let trimmed = text.trim();
                self.concept = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
        }
    }
}

// ============================================================================
// StageField
// ============================================================================

/// Editable fields of a [`Stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageField {
    /// The story text.
    Story,
    /// The illustration prompt.
    ImagePrompt,
    /// The discussion questions.
    DiscussionPrompts,
    /// The hands-on activity.
    Activity,
    /// The teacher hints.
    Hints,
    /// The curriculum concept.
    Concept,
}

impl StageField {
    /// All fields, in display order.
    pub const ALL: [Self; 6] = [
        Self::Story,
        Self::ImagePrompt,
        Self::DiscussionPrompts,
        Self::Activity,
        Self::Hints,
        Self::Concept,
    ];

    /// Parses a field name, accepting snake case, kebab case and the short
    /// names used by the console (`prompt`, `discussion`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "story" => Some(Self::Story),
            "image_prompt" | "prompt" => Some(Self::ImagePrompt),
            "discussion_prompts" | "discussion" => Some(Self::DiscussionPrompts),
            "activity" => Some(Self::Activity),
            "hints" => Some(Self::Hints),
            "concept" => Some(Self::Concept),
            _ => None,
        }
    }

    /// Human-readable label for the field.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Story => "Story Setup",
            Self::ImagePrompt => "Image Prompt",
            Self::DiscussionPrompts => "Discussion Prompts",
            Self::Activity => "Hands-On Activity",
            Self::Hints => "Hints",
            Self::Concept => "Concept",
        }
    }
}

impl std::fmt::Display for StageField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Story => "story",
            Self::ImagePrompt => "image_prompt",
            Self::DiscussionPrompts => "discussion_prompts",
            Self::Activity => "activity",
            Self::Hints => "hints",
            Self::Concept => "concept",
        };
        f.write_str(s)
    }
}

// ============================================================================
// LessonPlan
// ============================================================================

/// The full ordered sequence of stages for one generated lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlan {
    /// Stages in teaching order.
    pub stages: Vec<Stage>,
}

impl LessonPlan {
    /// Creates a plan from stages.
    #[must_use]
    pub const fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the plan has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the stage at `index`, if any.
    #[must_use]
    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    /// Returns a mutable stage, or `StageOutOfRange`.
    pub fn stage_mut(&mut self, index: usize) -> Result<&mut Stage> {
        let len = self.stages.len();
        self.stages
            .get_mut(index)
            .ok_or_else(|| LessonError::stage_out_of_range(index, len))
    }
}
