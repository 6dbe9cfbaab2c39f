//! Built-in lesson providers.
//!
//! [`TemplateProvider`] interpolates the author's topic and difficulty into a
//! two-stage template. [`FixedCurriculumProvider`] returns the same six-stage
//! curriculum whatever the author enters.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::builder::{GenerationProvider, LessonRequest};
use crate::error::Result;
use crate::stage::{LessonPlan, Stage};

/// Matches `{topic}` and `{difficulty}` placeholders.
static PLACEHOLDER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\{(topic|difficulty)\}").ok());

/// Static text for one stage, with optional placeholders.
#[derive(Debug, Clone, Copy)]
struct StageTemplate {
    story: &'static str,
    image_prompt: &'static str,
    discussion_prompts: &'static [&'static str],
    activity: &'static str,
    hints: &'static str,
    concept: Option<&'static str>,
}

impl StageTemplate {
    fn render(&self, request: &LessonRequest) -> Stage {
        Stage {
            story: interpolate(self.story, request),
            image_prompt: interpolate(self.image_prompt, request),
            discussion_prompts: self
                .discussion_prompts
                .iter()
                .map(|prompt| interpolate(prompt, request))
                .collect(),
            activity: interpolate(self.activity, request),
            hints: interpolate(self.hints, request),
            concept: self.concept.map(ToString::to_string),
        }
    }
}

/// Replaces `{topic}` and `{difficulty}` in `template`.
///
/// Text without placeholders, and unknown `{names}`, pass through unchanged.
fn interpolate(template: &str, request: &LessonRequest) -> String {
    let Some(re) = PLACEHOLDER.as_ref() else {
        return template.to_string();
    };

    re.replace_all(template, |caps: &Captures<'_>| match &caps[1] {
        "topic" => request.topic.clone(),
        _ => request.difficulty.clone(),
    })
    .into_owned()
}

// ============================================================================
// Template provider
// ============================================================================

const TEMPLATE_STAGES: [StageTemplate; 2] = [
    StageTemplate {
        story: "Welcome to the adventure of learning {topic}! Let's start our journey.",
        image_prompt: "Create an engaging image related to {topic} with colorful elements suitable for kids.",
        discussion_prompts: &[
            "What do you think about this topic?",
            "Can you find an example in real life?",
        ],
        activity: "Use manipulatives or drawings to explore this concept.",
        hints: "Think about how numbers relate to real objects.",
        concept: None,
    },
    StageTemplate {
        story: "Now, let's dive deeper into {topic}! What happens next?",
        image_prompt: "Create an advanced visual showcasing the next step of {topic}.",
        discussion_prompts: &[
            "How does this connect to what we just learned?",
            "Can you explain this in your own words?",
        ],
        activity: "Work in pairs to demonstrate the concept.",
        hints: "Break the problem into smaller steps.",
        concept: None,
    },
];

/// Two-stage lesson interpolated with the author's topic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateProvider;

#[async_trait]
impl GenerationProvider for TemplateProvider {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(&self, request: &LessonRequest) -> Result<LessonPlan> {
        Ok(LessonPlan::new(
            TEMPLATE_STAGES.iter().map(|t| t.render(request)).collect(),
        ))
    }
}

// ============================================================================
// Fixed curriculum
// ============================================================================

const FIXED_CURRICULUM: [StageTemplate; 6] = [
    StageTemplate {
        story: "Pip the squirrel finds a pile of acorns and wants to know how many there are.",
        image_prompt: "A friendly squirrel counting a pile of acorns in an autumn forest, bright cartoon style.",
        discussion_prompts: &[
            "How could Pip count the acorns without losing track?",
            "What is the last number Pip says, and what does it tell us?",
        ],
        activity: "Count a handful of counters, then move them one by one into a cup while counting aloud.",
        hints: "Touch each object once. The last number said is how many there are.",
        concept: Some("Counting"),
    },
    StageTemplate {
        story: "Pip bundles the acorns into groups of ten to carry them home.",
        image_prompt: "A squirrel tying acorns into bundles of ten with a few loose acorns beside them.",
        discussion_prompts: &[
            "Why is it easier to carry bundles of ten?",
            "How many acorns are in three bundles and four loose ones?",
        ],
        activity: "Make bundles of ten with straws and rubber bands, then write the total.",
        hints: "Tens go on the left, ones on the right.",
        concept: Some("Place Value"),
    },
    StageTemplate {
        story: "Pip's friend Rosa brings more acorns. Together they have a bigger pile.",
        image_prompt: "Two squirrels pouring their acorns into one big pile, cheerful picture-book style.",
        discussion_prompts: &[
            "What happens to the pile when Rosa adds her acorns?",
            "Does it matter whose acorns we count first?",
        ],
        activity: "Roll two dice, collect that many counters for each, and combine them.",
        hints: "Start from the bigger number and count on.",
        concept: Some("Addition"),
    },
    StageTemplate {
        story: "The squirrels line up acorns and pinecones in a repeating row.",
        image_prompt: "A row of alternating acorns and pinecones along a log, with squirrels pointing at it.",
        discussion_prompts: &[
            "What comes next in the row?",
            "Can you describe the rule of the pattern?",
        ],
        activity: "Build a repeating pattern with colored blocks and ask a partner to continue it.",
        hints: "Find the part that repeats, then say it aloud.",
        concept: Some("Patterns"),
    },
    StageTemplate {
        story: "Pip builds a new home and notices shapes everywhere: round holes, square windows, triangle roofs.",
        image_prompt: "A cozy tree house with a round door, square windows and a triangle roof, squirrel waving.",
        discussion_prompts: &[
            "Which shapes can you find in the tree house?",
            "How many sides and corners does each shape have?",
        ],
        activity: "Go on a shape hunt around the room and sort what you find.",
        hints: "Count the sides and the corners.",
        concept: Some("Shapes"),
    },
    StageTemplate {
        story: "Pip and Rosa share an acorn pie so that each gets a fair piece.",
        image_prompt: "Two squirrels cutting a round pie into equal halves and quarters, warm kitchen scene.",
        discussion_prompts: &[
            "What makes a share fair?",
            "If four friends share the pie, how big is each piece?",
        ],
        activity: "Fold paper circles into halves and quarters, then color one part.",
        hints: "Equal parts means every piece is the same size.",
        concept: Some("Fractions"),
    },
];

/// Six-stage curriculum that ignores the author's topic and difficulty.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCurriculumProvider;

#[async_trait]
impl GenerationProvider for FixedCurriculumProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn uses_request(&self) -> bool {
        false
    }

    async fn generate(&self, _request: &LessonRequest) -> Result<LessonPlan> {
        let blank = LessonRequest::unchecked("", "");
        Ok(LessonPlan::new(
            FIXED_CURRICULUM.iter().map(|t| t.render(&blank)).collect(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::builder::LessonBuilder;

    fn request(topic: &str, difficulty: &str) -> LessonRequest {
        LessonRequest::unchecked(topic, difficulty)
    }

    #[test]
    fn test_interpolate_replaces_placeholders() {
        let out = interpolate("Learn {topic} at {difficulty} level", &request("shapes", "Basic"));
        assert_eq!(out, "Learn shapes at Basic level");
    }

    #[test]
    fn test_interpolate_leaves_unknown_placeholders() {
        let out = interpolate("Hello {name}, today: {topic}", &request("time", "Basic"));
        assert_eq!(out, "Hello {name}, today: time");
    }

    #[test]
    fn test_interpolate_does_not_reexpand_values() {
        let out = interpolate("{topic}", &request("{difficulty}", "Basic"));
        assert_eq!(out, "{difficulty}");
    }

    #[test]
    fn test_template_produces_two_stages_with_topic() {
        let plan = tokio_test::block_on(TemplateProvider.generate(&request("fractions", "Basic")))
            .unwrap();

        assert_eq!(plan.len(), 2);
        assert!(plan.stages[0].story.contains("fractions"));
        for stage in &plan.stages {
            assert!(stage.image_prompt.contains("fractions"));
            assert!(stage.story.contains("fractions"));
            assert_eq!(stage.discussion_prompts.len(), 2);
            assert!(stage.concept.is_none());
        }
    }

    #[test]
    fn test_template_is_deterministic() {
        let first = tokio_test::block_on(TemplateProvider.generate(&request("time", "Advanced")))
            .unwrap();
        let second = tokio_test::block_on(TemplateProvider.generate(&request("time", "Advanced")))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.stages[1].hints, "Break the problem into smaller steps.");
    }

    #[test]
    fn test_fixed_curriculum_ignores_input() {
        let builder = LessonBuilder::new(FixedCurriculumProvider);
        let basic = tokio_test::block_on(builder.build("fractions", "Basic")).unwrap();
        let advanced = tokio_test::block_on(builder.build("geometry", "Advanced")).unwrap();
        assert_eq!(basic.stages, advanced.stages);
    }

    #[test]
    fn test_fixed_curriculum_accepts_blank_input() {
        let builder = LessonBuilder::new(FixedCurriculumProvider);
        let plan = tokio_test::block_on(builder.build("", "")).unwrap();
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn test_fixed_curriculum_stages_have_concepts() {
        let plan = tokio_test::block_on(FixedCurriculumProvider.generate(&request("", "")))
            .unwrap();
        let concepts: Vec<_> = plan
            .stages
            .iter()
            .map(|s| s.concept.clone().unwrap())
            .collect();
        assert_eq!(
            concepts,
            vec!["Counting", "Place Value", "Addition", "Patterns", "Shapes", "Fractions"]
        );
    }
}
