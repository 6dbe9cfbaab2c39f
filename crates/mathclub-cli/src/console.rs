//! Interactive author/kids console.
//!
//! The console owns one [`Session`] and routes each command through the
//! author or kids view. Session errors are printed inline and never stop
//! the console.

use std::io::Write;
use std::path::Path;

use mathclub_core::{
    AuthorView, Config, ConsumerView, LessonAuthor, LessonBuilder, LessonError, LessonNavigator,
    Navigation, Session, SnapshotStore, StageImage,
};
use mathclub_render::{render_author_page, render_consumer_page, HandoutGenerator};

use crate::command::{Command, HELP};

/// Hint printed whenever a command needs a lesson.
const NO_LESSON_HINT: &str = "No lesson yet. Try: generate <topic> | <difficulty>";

/// Whether the console should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop reading.
    Quit,
}

/// One console session.
#[derive(Debug)]
pub struct Console {
    session: Session,
    builder: LessonBuilder,
    store: SnapshotStore,
    max_image_size: usize,
}

impl Console {
    /// Creates a console for the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            session: Session::new(),
            builder: LessonBuilder::from_config(config),
            store: SnapshotStore::from_config(config),
            max_image_size: config.max_image_size,
        }
    }

    /// The session driven by this console.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Runs one command, writing its output to `out`.
    pub async fn execute(
        &mut self,
        command: Command,
        out: &mut impl Write,
    ) -> std::io::Result<Flow> {
        match command {
            Command::Generate { topic, difficulty } => {
                self.generate(&topic, &difficulty, out).await?;
            }
            Command::Show => self.show_author(out)?,
            Command::Next => {
                let nav = AuthorView::new(&mut self.session).advance();
                self.after_navigation(nav, "last", out)?;
            }
            Command::Prev => {
                let nav = AuthorView::new(&mut self.session).retreat();
                self.after_navigation(nav, "first", out)?;
            }
            Command::GoTo(number) => {
                let target = number.saturating_sub(1);
                let nav = AuthorView::new(&mut self.session).go_to(target);
                if number == 0 || nav.at_boundary() {
                    writeln!(out, "There is no stage {number}.")?;
                } else {
                    self.show_author(out)?;
                }
            }
            Command::Edit { field, text } => {
                let result = AuthorView::new(&mut self.session).edit_current(field, &text);
                match result {
                    Ok(()) => writeln!(out, "Updated {}.", field.label())?,
                    Err(e) => report(&e, out)?,
                }
            }
            Command::Attach(path) => self.attach(&path, out)?,
            Command::Detach => {
                if AuthorView::new(&mut self.session).detach_current() {
                    writeln!(out, "Image removed.")?;
                } else {
                    writeln!(out, "This stage has no image.")?;
                }
            }
            Command::Save => match AuthorView::new(&mut self.session).save(&self.store) {
                Ok(_) => writeln!(
                    out,
                    "Lesson saved to {}.",
                    self.store.snapshot_path().display()
                )?,
                Err(e) => report(&e, out)?,
            },
            Command::Start => match AuthorView::new(&mut self.session).commit(&self.store) {
                Ok(_) => {
                    writeln!(out, "Lesson saved to {}.", self.store.snapshot_path().display())?;
                    writeln!(out, "The lesson is ready! Type 'kids' to open the kids view.")?;
                }
                Err(e) => report(&e, out)?,
            },
            Command::Kids => self.show_kids(None, out)?,
            Command::KidsNext => self.show_kids(Some(true), out)?,
            Command::KidsPrev => self.show_kids(Some(false), out)?,
            Command::Lesson(path) => self.lesson(path.as_deref(), out)?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => {
                self.session.reset();
                writeln!(out, "Goodbye!")?;
                return Ok(Flow::Quit);
            }
        }

        Ok(Flow::Continue)
    }

    async fn generate(
        &mut self,
        topic: &str,
        difficulty: &str,
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        let plan = match self.builder.build(topic, difficulty).await {
            Ok(plan) => plan,
            Err(e) => return report(&e, out),
        };

        match self.session.load_lesson(plan) {
            Ok(()) => {
                writeln!(out, "Lesson generated with {} stages.\n", self.session.stage_count())?;
                self.show_author(out)
            }
            Err(e) => report(&e, out),
        }
    }

    fn attach(&mut self, path: &Path, out: &mut impl Write) -> std::io::Result<()> {
        let image = match StageImage::load(path, self.max_image_size) {
            Ok(image) => image,
            Err(e) => return report(&e, out),
        };
        let file_name = image.file_name.clone();

        let mut view = AuthorView::new(&mut self.session);
        match view.attach_to_current(image) {
            Ok(replaced) => {
                let stage = self.session.current_stage_index() + 1;
                match replaced {
                    Some(old) => writeln!(
                        out,
                        "Replaced {} with {file_name} on stage {stage}.",
                        old.file_name
                    ),
                    None => writeln!(out, "Attached {file_name} to stage {stage}."),
                }
            }
            Err(e) => report(&e, out),
        }
    }

    fn after_navigation(
        &mut self,
        nav: Navigation,
        end: &str,
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        if self.session.lesson().is_none() {
            return writeln!(out, "{NO_LESSON_HINT}");
        }
        if !nav.moved() {
            writeln!(out, "Already at the {end} stage.")?;
        }
        self.show_author(out)
    }

    fn show_author(&mut self, out: &mut impl Write) -> std::io::Result<()> {
        match AuthorView::new(&mut self.session).page() {
            Some(page) => write!(out, "{}", render_author_page(&page)),
            None => writeln!(out, "{NO_LESSON_HINT}"),
        }
    }

    /// `step`: `Some(true)` advances, `Some(false)` retreats.
    fn show_kids(&mut self, step: Option<bool>, out: &mut impl Write) -> std::io::Result<()> {
        let mut view = match ConsumerView::open(&mut self.session) {
            Ok(view) => view,
            Err(e) => {
                report(&e, out)?;
                return writeln!(out, "Finish the lesson and type 'start' first.");
            }
        };

        match step {
            Some(true) => {
                if !view.advance().moved() {
                    writeln!(out, "That was the last stage!")?;
                }
            }
            Some(false) => {
                if !view.retreat().moved() {
                    writeln!(out, "This is the first stage.")?;
                }
            }
            None => {}
        }

        match view.page() {
            Some(page) => write!(out, "{}", render_consumer_page(&page)),
            None => writeln!(out, "{NO_LESSON_HINT}"),
        }
    }

    fn lesson(&self, path: Option<&Path>, out: &mut impl Write) -> std::io::Result<()> {
        if self.session.lesson().is_none() {
            return writeln!(out, "{NO_LESSON_HINT}");
        }

        let handout = HandoutGenerator::from_session(&self.session);
        match path {
            None => write!(out, "{}", handout.generate()),
            Some(path) => match handout.write_to_file(path) {
                Ok(()) => writeln!(out, "Lesson written to {}.", path.display()),
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Handout export failed");
                    writeln!(out, "Error: {e}")
                }
            },
        }
    }
}

/// Prints a session error inline.
fn report(error: &LessonError, out: &mut impl Write) -> std::io::Result<()> {
    if error.is_validation() {
        tracing::debug!(error = %error, "Rejected input");
    } else {
        tracing::warn!(error = %error, "Command failed");
    }
    writeln!(out, "{error}")
}
