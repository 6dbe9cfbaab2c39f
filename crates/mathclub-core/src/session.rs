//! Per-session lesson state and its transitions.
//!
//! A [`Session`] holds the generated lesson, the shared current-stage index,
//! the uploaded images and the ready flag. The phase moves through:
//!
//! - `NoLesson` -> `Authoring` (a generated lesson is loaded)
//! - `Authoring` -> `Ready` (the author commits)
//! - any phase -> `Authoring` (a new lesson replaces the old one wholesale)
//! - any phase -> `NoLesson` (reset)
//!
//! Navigation past either end is a no-op reported as
//! [`Navigation::AtBoundary`], never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LessonError, Result};
use crate::image::StageImage;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::stage::{LessonPlan, Stage, StageField};

/// Message shown when an operation needs a lesson and none exists.
const NO_LESSON_MESSAGE: &str = "Generate a lesson first.";

// ============================================================================
// SessionPhase
// ============================================================================

/// Lifecycle phase of a session, derived from its state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No lesson has been generated.
    #[default]
    NoLesson,
    /// A lesson exists and is being prepared.
    Authoring,
    /// The author committed the lesson; the kids view is open.
    Ready,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoLesson => "no_lesson",
            Self::Authoring => "authoring",
            Self::Ready => "ready",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The current stage changed.
    Moved {
        /// Index before the move.
        from: usize,
        /// Index after the move.
        to: usize,
    },
    /// The request targeted the stage already shown; nothing changed.
    Stayed {
        /// The unchanged index.
        index: usize,
    },
    /// The request would leave the lesson; nothing changed.
    AtBoundary {
        /// The unchanged index.
        index: usize,
    },
}

impl Navigation {
    /// Returns `true` if the current stage changed.
    #[must_use]
    pub const fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }

    /// Returns `true` if the request fell outside the lesson.
    #[must_use]
    pub const fn at_boundary(&self) -> bool {
        matches!(self, Self::AtBoundary { .. })
    }

    /// The current index after the request.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Moved { to, .. } => *to,
            Self::Stayed { index } | Self::AtBoundary { index } => *index,
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// All mutable state for one authoring session.
///
/// Each session owns its state; handlers receive it by reference.
#[derive(Debug, Clone, Default)]
pub struct Session {
    lesson: Option<LessonPlan>,
    current_stage_index: usize,
    uploaded_images: BTreeMap<usize, StageImage>,
    lesson_ready: bool,
}

impl Session {
    /// Creates an empty session in the `NoLesson` phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use mathclub_core::{Session, SessionPhase};
    ///
    /// let session = Session::new();
    /// assert_eq!(session.phase(), SessionPhase::NoLesson);
    /// assert_eq!(session.current_stage_index(), 0);
    /// assert!(session.uploaded_images().is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.lesson.is_none() {
            SessionPhase::NoLesson
        } else if self.lesson_ready {
            SessionPhase::Ready
        } else {
            SessionPhase::Authoring
        }
    }

    /// The loaded lesson, if any.
    #[must_use]
    pub const fn lesson(&self) -> Option<&LessonPlan> {
        self.lesson.as_ref()
    }

    /// Number of stages in the loaded lesson (0 without one).
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.lesson.as_ref().map_or(0, LessonPlan::len)
    }

    /// Zero-based index of the stage both views are showing.
    #[must_use]
    pub const fn current_stage_index(&self) -> usize {
        self.current_stage_index
    }

    /// The stage both views are showing.
    #[must_use]
    pub fn current_stage(&self) -> Option<&Stage> {
        self.lesson
            .as_ref()
            .and_then(|plan| plan.stage(self.current_stage_index))
    }

    /// Images by stage index.
    #[must_use]
    pub const fn uploaded_images(&self) -> &BTreeMap<usize, StageImage> {
        &self.uploaded_images
    }

    /// The image attached to a stage.
    #[must_use]
    pub fn image_for(&self, index: usize) -> Option<&StageImage> {
        self.uploaded_images.get(&index)
    }

    /// Returns `true` once the author has committed the lesson.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.lesson_ready
    }

    // ------------------------------------------------------------------------
    // Lesson lifecycle
    // ------------------------------------------------------------------------

    /// Replaces any lesson with `plan` and enters `Authoring`.
    ///
    /// The index returns to 0, images are cleared and the ready flag drops.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Validation` if the plan has no stages; the
    /// session is left unchanged.
    pub fn load_lesson(&mut self, plan: LessonPlan) -> Result<()> {
        if plan.is_empty() {
            return Err(LessonError::validation("The generated lesson has no stages."));
        }

        info!(
            stages = plan.len(),
            previous_phase = %self.phase(),
            "Lesson loaded"
        );
        self.lesson = Some(plan);
        self.current_stage_index = 0;
        self.uploaded_images.clear();
        self.lesson_ready = false;
        Ok(())
    }

    /// Discards everything and returns to `NoLesson`.
    pub fn reset(&mut self) {
        *self = Self::default();
        debug!("Session reset");
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Moves to the next stage; a no-op at the last stage.
    pub fn advance(&mut self) -> Navigation {
        let from = self.current_stage_index;
        if from + 1 < self.stage_count() {
            self.move_to(from + 1)
        } else {
            debug!(index = from, "Advance ignored at last stage");
            Navigation::AtBoundary { index: from }
        }
    }

    /// Moves to the previous stage; a no-op at the first stage.
    pub fn retreat(&mut self) -> Navigation {
        let from = self.current_stage_index;
        if from > 0 && self.lesson.is_some() {
            self.move_to(from - 1)
        } else {
            debug!(index = from, "Retreat ignored at first stage");
            Navigation::AtBoundary { index: from }
        }
    }

    /// Jumps to a stage; a no-op if `index` is out of range.
    pub fn go_to(&mut self, index: usize) -> Navigation {
        if index < self.stage_count() {
            self.move_to(index)
        } else {
            debug!(
                requested = index,
                stages = self.stage_count(),
                "Jump ignored outside lesson"
            );
            Navigation::AtBoundary {
                index: self.current_stage_index,
            }
        }
    }

    fn move_to(&mut self, to: usize) -> Navigation {
        let from = self.current_stage_index;
        if from == to {
            return Navigation::Stayed { index: from };
        }
        self.current_stage_index = to;
        debug!(from, to, "Stage changed");
        Navigation::Moved { from, to }
    }

    // ------------------------------------------------------------------------
    // Authoring
    // ------------------------------------------------------------------------

    /// Attaches an image to a stage, replacing any previous one.
    ///
    /// Returns the replaced image.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::StageOutOfRange` if `index` is not a stage of
    /// the current lesson (including when there is no lesson).
    pub fn attach_image(&mut self, index: usize, image: StageImage) -> Result<Option<StageImage>> {
        let len = self.stage_count();
        if index >= len {
            return Err(LessonError::stage_out_of_range(index, len));
        }

        info!(
            stage = index,
            file_name = %image.file_name,
            format = %image.format,
            size = image.size(),
            "Image attached"
        );
        Ok(self.uploaded_images.insert(index, image))
    }

    /// Attaches an image to the current stage.
    pub fn attach_to_current(&mut self, image: StageImage) -> Result<Option<StageImage>> {
        self.attach_image(self.current_stage_index, image)
    }

    /// Removes the image from a stage. Returns `true` if one was present.
    pub fn detach_image(&mut self, index: usize) -> bool {
        self.uploaded_images.remove(&index).is_some()
    }

    /// Replaces one field of a stage with author text.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Validation` without a lesson and
    /// `LessonError::StageOutOfRange` for a bad index.
    pub fn edit_stage(&mut self, index: usize, field: StageField, text: &str) -> Result<()> {
        let plan = self
            .lesson
            .as_mut()
            .ok_or_else(|| LessonError::validation(NO_LESSON_MESSAGE))?;
        plan.stage_mut(index)?.set_field(field, text);
        debug!(stage = index, %field, "Stage edited");
        Ok(())
    }

    /// Replaces one field of the current stage.
    pub fn edit_current(&mut self, field: StageField, text: &str) -> Result<()> {
        self.edit_stage(self.current_stage_index, field, text)
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Writes a snapshot of the lesson without changing the phase.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Validation` without a lesson, or the store's
    /// write error.
    pub fn save(&self, store: &SnapshotStore) -> Result<Snapshot> {
        let plan = self
            .lesson
            .as_ref()
            .ok_or_else(|| LessonError::validation(NO_LESSON_MESSAGE))?;
        let snapshot = store.write(plan, &self.uploaded_images)?;
        info!(
            path = %store.snapshot_path().display(),
            stages = snapshot.stages.len(),
            images = snapshot.uploaded_images.len(),
            "Lesson saved"
        );
        Ok(snapshot)
    }

    /// Saves the lesson and marks it ready for the kids view.
    ///
    /// Only valid from `Authoring`. On any error the session is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Validation` from `NoLesson`,
    /// `LessonError::InvalidStateTransition` from `Ready`, or the store's
    /// write error.
    pub fn commit(&mut self, store: &SnapshotStore) -> Result<Snapshot> {
        match self.phase() {
            SessionPhase::NoLesson => return Err(LessonError::validation(NO_LESSON_MESSAGE)),
            SessionPhase::Ready => {
                return Err(LessonError::invalid_transition(
                    SessionPhase::Ready,
                    SessionPhase::Ready,
                ))
            }
            SessionPhase::Authoring => {}
        }

        let snapshot = self.save(store)?;
        self.lesson_ready = true;
        info!(phase = %self.phase(), "Lesson committed");
        Ok(snapshot)
    }
}
