//! Author and kids views over one shared session.
//!
//! Both views borrow the same [`Session`], so they always show the same
//! stage: navigating in either moves the other. Capabilities are split into
//! traits so the kids view cannot edit, attach or commit.
//!
//! Views read the live session. Edits made after commit are visible to the
//! kids view straight away; the snapshot on disk only changes on save.

use serde::Serialize;

use crate::error::{LessonError, Result};
use crate::image::StageImage;
use crate::session::{Navigation, Session, SessionPhase};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::stage::{Stage, StageField};

/// Message shown when the kids view is opened before commit.
pub const NOT_READY_MESSAGE: &str = "lesson is not ready";

// ============================================================================
// Capability traits
// ============================================================================

/// Read access shared by every view.
pub trait LessonReader {
    /// Current lifecycle phase.
    fn phase(&self) -> SessionPhase;

    /// Number of stages in the lesson.
    fn stage_count(&self) -> usize;

    /// Zero-based index of the shared current stage.
    fn current_index(&self) -> usize;

    /// The shared current stage.
    fn current_stage(&self) -> Option<&Stage>;

    /// Image attached to a stage.
    fn image_for(&self, index: usize) -> Option<&StageImage>;
}

/// Stage navigation shared by every view.
pub trait LessonNavigator: LessonReader {
    /// Moves to the next stage.
    fn advance(&mut self) -> Navigation;

    /// Moves to the previous stage.
    fn retreat(&mut self) -> Navigation;
}

/// Operations only the author may perform.
pub trait LessonAuthor: LessonNavigator {
    /// Jumps to a stage.
    fn go_to(&mut self, index: usize) -> Navigation;

    /// Replaces a field of the current stage.
    fn edit_current(&mut self, field: StageField, text: &str) -> Result<()>;

    /// Attaches an image to the current stage, returning the replaced one.
    fn attach_to_current(&mut self, image: StageImage) -> Result<Option<StageImage>>;

    /// Removes the image from the current stage.
    fn detach_current(&mut self) -> bool;

    /// Writes a snapshot without changing the phase.
    fn save(&self, store: &SnapshotStore) -> Result<Snapshot>;

    /// Writes a snapshot and opens the kids view.
    fn commit(&mut self, store: &SnapshotStore) -> Result<Snapshot>;
}

// ============================================================================
// Pages
// ============================================================================

/// Everything the author sees for the current stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorPage {
    /// One-based stage number.
    pub stage_number: usize,
    /// Total number of stages.
    pub total: usize,
    /// Session phase.
    pub phase: SessionPhase,
    /// The full stage content.
    pub stage: Stage,
    /// Name of the attached image file.
    pub image_file: Option<String>,
}

/// What the kids see for the current stage. Hints are not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumerPage {
    /// One-based stage number.
    pub stage_number: usize,
    /// Total number of stages.
    pub total: usize,
    /// Story text.
    pub story: String,
    /// Name of the attached image file.
    pub image_file: Option<String>,
    /// Discussion questions.
    pub discussion_prompts: Vec<String>,
    /// Hands-on activity.
    pub activity: String,
}

// ============================================================================
// AuthorView
// ============================================================================

/// The author's view: reads, navigates and edits the session.
#[derive(Debug)]
pub struct AuthorView<'a> {
    session: &'a mut Session,
}

impl<'a> AuthorView<'a> {
    /// Wraps a session. The author view is available in every phase.
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// The current stage page, or `None` before a lesson exists.
    #[must_use]
    pub fn page(&self) -> Option<AuthorPage> {
        let stage = self.session.current_stage()?;
        let index = self.session.current_stage_index();
        Some(AuthorPage {
            stage_number: index + 1,
            total: self.session.stage_count(),
            phase: self.session.phase(),
            stage: stage.clone(),
            image_file: self.session.image_for(index).map(|i| i.file_name.clone()),
        })
    }
}

impl LessonReader for AuthorView<'_> {
    fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    fn stage_count(&self) -> usize {
        self.session.stage_count()
    }

    fn current_index(&self) -> usize {
        self.session.current_stage_index()
    }

    fn current_stage(&self) -> Option<&Stage> {
        self.session.current_stage()
    }

    fn image_for(&self, index: usize) -> Option<&StageImage> {
        self.session.image_for(index)
    }
}

impl LessonNavigator for AuthorView<'_> {
    fn advance(&mut self) -> Navigation {
        self.session.advance()
    }

    fn retreat(&mut self) -> Navigation {
        self.session.retreat()
    }
}

impl LessonAuthor for AuthorView<'_> {
    fn go_to(&mut self, index: usize) -> Navigation {
        self.session.go_to(index)
    }

    fn edit_current(&mut self, field: StageField, text: &str) -> Result<()> {
        self.session.edit_current(field, text)
    }

    fn attach_to_current(&mut self, image: StageImage) -> Result<Option<StageImage>> {
        self.session.attach_to_current(image)
    }

    fn detach_current(&mut self) -> bool {
        let index = self.session.current_stage_index();
        self.session.detach_image(index)
    }

    fn save(&self, store: &SnapshotStore) -> Result<Snapshot> {
        self.session.save(store)
    }

    fn commit(&mut self, store: &SnapshotStore) -> Result<Snapshot> {
        self.session.commit(store)
    }
}

// ============================================================================
// ConsumerView
// ============================================================================

/// The kids' view: reads and navigates a committed lesson.
#[derive(Debug)]
pub struct ConsumerView<'a> {
    session: &'a mut Session,
}

impl<'a> ConsumerView<'a> {
    /// Opens the kids view.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Validation` unless the lesson has been committed.
    pub fn open(session: &'a mut Session) -> Result<Self> {
        if session.phase() != SessionPhase::Ready {
            return Err(LessonError::validation(NOT_READY_MESSAGE));
        }
        Ok(Self { session })
    }

    /// The current stage page.
    #[must_use]
    pub fn page(&self) -> Option<ConsumerPage> {
        let stage = self.session.current_stage()?;
        let index = self.session.current_stage_index();
        Some(ConsumerPage {
            stage_number: index + 1,
            total: self.session.stage_count(),
            story: stage.story.clone(),
            image_file: self.session.image_for(index).map(|i| i.file_name.clone()),
            discussion_prompts: stage.discussion_prompts.clone(),
            activity: stage.activity.clone(),
        })
    }
}

impl LessonReader for ConsumerView<'_> {
    fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    fn stage_count(&self) -> usize {
        self.session.stage_count()
    }

    fn current_index(&self) -> usize {
        self.session.current_stage_index()
    }

    fn current_stage(&self) -> Option<&Stage> {
        self.session.current_stage()
    }

    fn image_for(&self, index: usize) -> Option<&StageImage> {
        self.session.image_for(index)
    }
}

impl LessonNavigator for ConsumerView<'_> {
    fn advance(&mut self) -> Navigation {
        self.session.advance()
    }

    fn retreat(&mut self) -> Navigation {
        self.session.retreat()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::image::ImageFormat;
    use crate::stage::LessonPlan;

    fn lesson() -> LessonPlan {
        LessonPlan::new(
            (0..3)
                .map(|i| Stage {
                    story: format!("Story {i}"),
                    hints: format!("Secret hint {i}"),
                    activity: format!("Activity {i}"),
                    discussion_prompts: vec![format!("Question {i}?")],
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn committed(name: &str) -> (Session, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let store = SnapshotStore::new(dir.join("lesson.json"), dir.join("images"));

        let mut session = Session::new();
        session.load_lesson(lesson()).unwrap();
        session.commit(&store).unwrap();
        (session, dir)
    }

    #[test]
    fn test_author_page_without_lesson() {
        let mut session = Session::new();
        let view = AuthorView::new(&mut session);
        assert!(view.page().is_none());
        assert_eq!(view.phase(), SessionPhase::NoLesson);
    }

    #[test]
    fn test_author_page_shows_everything() {
        let mut session = Session::new();
        session.load_lesson(lesson()).unwrap();
        let mut view = AuthorView::new(&mut session);
        view.attach_to_current(StageImage {
            file_name: "cover.png".to_string(),
            format: ImageFormat::Png,
            data: vec![1],
        })
        .unwrap();

        let page = view.page().unwrap();
        assert_eq!(page.stage_number, 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.stage.hints, "Secret hint 0");
        assert_eq!(page.image_file.as_deref(), Some("cover.png"));
        assert_eq!(page.phase, SessionPhase::Authoring);
    }

    #[test]
    fn test_author_detach_current() {
        let mut session = Session::new();
        session.load_lesson(lesson()).unwrap();
        let mut view = AuthorView::new(&mut session);
        view.attach_to_current(StageImage {
            file_name: "a.jpg".to_string(),
            format: ImageFormat::Jpg,
            data: vec![1],
        })
        .unwrap();

        assert!(view.detach_current());
        assert!(view.image_for(0).is_none());
    }

    #[test]
    fn test_consumer_refuses_before_commit() {
        let mut session = Session::new();
        let err = ConsumerView::open(&mut session).unwrap_err();
        assert_eq!(err.to_string(), NOT_READY_MESSAGE);

        session.load_lesson(lesson()).unwrap();
        assert!(ConsumerView::open(&mut session).unwrap_err().is_validation());
    }

    #[test]
    fn test_consumer_page_hides_hints() {
        let (mut session, dir) = committed("mathclub_view_consumer_page");
        let view = ConsumerView::open(&mut session).unwrap();

        let page = view.page().unwrap();
        assert_eq!(page.story, "Story 0");
        assert_eq!(page.activity, "Activity 0");
        let json = serde_json::to_string(&page).unwrap();
        assert!(!json.contains("Secret hint"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_consumer_navigation_moves_shared_index() {
        let (mut session, dir) = committed("mathclub_view_shared_index");

        {
            let mut kids = ConsumerView::open(&mut session).unwrap();
            assert!(kids.advance().moved());
            assert!(kids.advance().moved());
            assert!(!kids.advance().moved());
        }

        let author = AuthorView::new(&mut session);
        assert_eq!(author.current_index(), 2);
        assert_eq!(author.page().unwrap().stage_number, 3);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_post_commit_edits_are_live() {
        let (mut session, dir) = committed("mathclub_view_live_edits");

        AuthorView::new(&mut session)
            .edit_current(StageField::Story, "Revised story")
            .unwrap();

        let kids = ConsumerView::open(&mut session).unwrap();
        assert_eq!(kids.page().unwrap().story, "Revised story");

        std::fs::remove_dir_all(&dir).ok();
    }
}
