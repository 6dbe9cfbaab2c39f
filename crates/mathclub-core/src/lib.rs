//! Math Club Lesson Core
//!
//! Builds staged math lessons, tracks the shared author/kids session, and
//! saves lessons as JSON snapshots.

pub mod builder;
pub mod config;
pub mod curriculum;
pub mod error;
pub mod image;
pub mod session;
pub mod snapshot;
pub mod stage;
pub mod view;

pub use builder::{
    Difficulty, GenerationProvider, LessonBuilder, LessonRequest, MISSING_INPUT_MESSAGE,
};
pub use config::{Config, ConfigurationWarning, Curriculum, Environment, API_KEY_VAR};
pub use curriculum::{FixedCurriculumProvider, TemplateProvider};
pub use error::{LessonError, Result};
pub use image::{ImageFormat, StageImage};
pub use session::{Navigation, Session, SessionPhase};
pub use snapshot::{Snapshot, SnapshotStore};
pub use stage::{LessonPlan, Stage, StageField};
pub use view::{
    AuthorPage, AuthorView, ConsumerPage, ConsumerView, LessonAuthor, LessonNavigator,
    LessonReader, NOT_READY_MESSAGE,
};
