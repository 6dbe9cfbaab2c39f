//! End-to-end tests for the lesson workflow.
//!
//! These tests drive a session from generation through commit and the kids
//! view, then read the saved snapshot back from disk.

use std::path::{Path, PathBuf};

use mathclub_core::{
    AuthorView, Config, ConsumerView, Curriculum, LessonAuthor, LessonBuilder, LessonError,
    LessonNavigator, LessonReader, Session, SessionPhase, SnapshotStore, StageField, StageImage,
};
use mathclub_render::HandoutGenerator;

const PNG_BYTES: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Path to the fixture directory.
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Creates an empty scratch directory for one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).expect("Failed to create scratch directory");
    dir
}

fn store_in(dir: &Path) -> SnapshotStore {
    SnapshotStore::new(dir.join("saved_lesson.json"), dir.join("lesson_images"))
}

/// Tests the fixture config loads and selects the fixed curriculum.
#[test]
fn test_fixture_config_loads() {
    let config = Config::load_from_file(&fixture_path().join("mathclub.json"))
        .expect("Failed to load config");

    assert_eq!(config.curriculum, Curriculum::Fixed);
    assert!(config.restrict_difficulty);
    assert_eq!(config.snapshot_path, "classroom_lesson.json");
    assert_eq!(config.image_dir, "classroom_images");
    assert_eq!(config.max_image_size, 2 * 1024 * 1024);

    let builder = LessonBuilder::from_config(&config);
    assert_eq!(builder.provider_name(), "fixed");
}

/// Generate, attach, commit, then resolve the saved image.
#[tokio::test]
async fn test_generate_attach_commit_roundtrip() {
    let dir = scratch_dir("mathclub_it_roundtrip");
    let store = store_in(&dir);

    let plan = LessonBuilder::from_config(&Config::default())
        .build("fractions", "Basic")
        .await
        .expect("Failed to build lesson");
    assert_eq!(plan.len(), 2);
    assert!(plan.stages[0].story.contains("fractions"));

    let mut session = Session::new();
    session.load_lesson(plan).expect("Failed to load lesson");

    let image = StageImage::from_upload("pizza.png", PNG_BYTES.to_vec(), 1024)
        .expect("Failed to accept upload");
    session
        .attach_image(0, image.clone())
        .expect("Failed to attach image");

    let snapshot = session.commit(&store).expect("Failed to commit");
    assert_eq!(session.phase(), SessionPhase::Ready);

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(store.snapshot_path()).expect("Snapshot not written"),
    )
    .expect("Snapshot is not JSON");
    let reference = json["uploaded_images"]["0"]
        .as_str()
        .expect("Stage 0 image missing from snapshot");
    assert_eq!(reference, snapshot.uploaded_images[&0]);

    let loaded = store.load().expect("Failed to load snapshot");
    let resolved = store
        .read_image(&loaded, 0)
        .expect("Failed to read image")
        .expect("Stage 0 has no image");
    assert_eq!(resolved.data, image.data);
    assert_eq!(resolved.format, image.format);

    std::fs::remove_dir_all(&dir).ok();
}

/// The fixed curriculum ignores difficulty entirely.
#[tokio::test]
async fn test_fixed_curriculum_same_for_any_difficulty() {
    let config = Config {
        curriculum: Curriculum::Fixed,
        ..Default::default()
    };
    let builder = LessonBuilder::from_config(&config);

    let basic = builder.build("anything", "Basic").await.expect("Basic failed");
    let advanced = builder
        .build("anything", "Advanced")
        .await
        .expect("Advanced failed");

    assert_eq!(basic, advanced);
    assert_eq!(basic.len(), 6);
    assert!(basic.stages.iter().all(|s| s.concept.is_some()));
}

/// Every template lesson names the topic in each image prompt.
#[tokio::test]
async fn test_template_prompts_contain_topic() {
    let builder = LessonBuilder::from_config(&Config::default());

    for (topic, difficulty) in [
        ("fractions", "Basic"),
        ("telling time", "Grade 2"),
        ("négatif", "Advanced"),
    ] {
        let plan = builder.build(topic, difficulty).await.expect("Build failed");
        assert!(!plan.is_empty());
        for stage in &plan.stages {
            assert!(
                stage.image_prompt.contains(topic),
                "prompt {:?} lacks topic {topic:?}",
                stage.image_prompt
            );
        }
    }
}

/// The kids view cannot open until the lesson is committed.
#[tokio::test]
async fn test_consumer_refuses_before_commit() {
    let dir = scratch_dir("mathclub_it_consumer_gate");
    let store = store_in(&dir);
    let mut session = Session::new();

    assert!(ConsumerView::open(&mut session).is_err());

    let plan = LessonBuilder::from_config(&Config::default())
        .build("money", "Basic")
        .await
        .expect("Build failed");
    session.load_lesson(plan).expect("Load failed");

    let err = ConsumerView::open(&mut session).expect_err("Opened before commit");
    assert!(matches!(err, LessonError::Validation { .. }));

    session.commit(&store).expect("Commit failed");
    assert!(ConsumerView::open(&mut session).is_ok());

    std::fs::remove_dir_all(&dir).ok();
}

/// Author and kids views share one current stage.
#[tokio::test]
async fn test_views_share_current_stage() {
    let dir = scratch_dir("mathclub_it_shared_stage");
    let store = store_in(&dir);
    let config = Config {
        curriculum: Curriculum::Fixed,
        ..Default::default()
    };
    let mut session = Session::new();
    let plan = LessonBuilder::from_config(&config)
        .build("", "")
        .await
        .expect("Build failed");
    session.load_lesson(plan).expect("Load failed");

    {
        let mut author = AuthorView::new(&mut session);
        author.go_to(2);
        author.commit(&store).expect("Commit failed");
    }

    {
        let mut kids = ConsumerView::open(&mut session).expect("Kids view closed");
        assert_eq!(kids.current_index(), 2);
        assert!(kids.advance().moved());
        assert_eq!(kids.page().expect("No page").stage_number, 4);
    }

    let author = AuthorView::new(&mut session);
    assert_eq!(author.current_index(), 3);
    assert_eq!(
        author.page().expect("No page").stage.concept.as_deref(),
        Some("Patterns")
    );

    std::fs::remove_dir_all(&dir).ok();
}

/// Edits after commit reach the kids view; the snapshot changes only on save.
#[tokio::test]
async fn test_post_commit_edits_are_live_until_saved() {
    let dir = scratch_dir("mathclub_it_live_edits");
    let store = store_in(&dir);
    let mut session = Session::new();
    let plan = LessonBuilder::from_config(&Config::default())
        .build("shapes", "Basic")
        .await
        .expect("Build failed");
    session.load_lesson(plan).expect("Load failed");
    session.commit(&store).expect("Commit failed");

    session
        .edit_current(StageField::Story, "Triangles have three sides.")
        .expect("Edit failed");

    let kids = ConsumerView::open(&mut session).expect("Kids view closed");
    assert_eq!(
        kids.page().expect("No page").story,
        "Triangles have three sides."
    );

    let saved = store.load().expect("Load failed");
    assert_ne!(saved.stages[0].story, "Triangles have three sides.");

    session.save(&store).expect("Save failed");
    let saved = store.load().expect("Load failed");
    assert_eq!(saved.stages[0].story, "Triangles have three sides.");

    std::fs::remove_dir_all(&dir).ok();
}

/// Regenerating replaces the lesson and closes the kids view.
#[tokio::test]
async fn test_regenerate_after_commit() {
    let dir = scratch_dir("mathclub_it_regenerate");
    let store = store_in(&dir);
    let builder = LessonBuilder::from_config(&Config::default());
    let mut session = Session::new();

    session
        .load_lesson(builder.build("time", "Basic").await.expect("Build failed"))
        .expect("Load failed");
    session.advance();
    session.commit(&store).expect("Commit failed");

    session
        .load_lesson(builder.build("money", "Basic").await.expect("Build failed"))
        .expect("Load failed");

    assert_eq!(session.phase(), SessionPhase::Authoring);
    assert_eq!(session.current_stage_index(), 0);
    assert!(ConsumerView::open(&mut session).is_err());

    std::fs::remove_dir_all(&dir).ok();
}

/// A saved snapshot renders as a handout.
#[tokio::test]
async fn test_snapshot_handout() {
    let dir = scratch_dir("mathclub_it_handout");
    let store = store_in(&dir);
    let mut session = Session::new();
    session
        .load_lesson(
            LessonBuilder::from_config(&Config::default())
                .build("fractions", "Basic")
                .await
                .expect("Build failed"),
        )
        .expect("Load failed");
    session.save(&store).expect("Save failed");

    let snapshot = store.load().expect("Load failed");
    let handout = HandoutGenerator::from_snapshot(&snapshot).generate();

    assert!(handout.contains("# Math Club Lesson"));
    assert!(handout.contains("## Stage 2"));
    assert!(handout.contains("fractions"));

    std::fs::remove_dir_all(&dir).ok();
}
