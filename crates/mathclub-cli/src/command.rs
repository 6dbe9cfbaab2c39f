//! Console command parsing.

use std::path::PathBuf;

use mathclub_core::StageField;
use thiserror::Error;

/// Usage text printed by `help`.
pub const HELP: &str = "\
Author commands:
  generate <topic> | <difficulty>   Build a new lesson
  show                              Show the current stage
  next | prev                       Move between stages
  goto <n>                          Jump to stage n
  edit <field> <text>               Replace a field (story, prompt, discussion, activity, hints, concept)
                                    Use \\n in discussion text to separate prompts
  attach <file>                     Attach a .png or .jpg to the current stage
  detach                            Remove the current stage's image
  save                              Save the lesson without starting it
  start                             Save the lesson and open the kids view
  lesson [file]                     Print the whole lesson, or write it to a file

Kids commands:
  kids                              Show the current stage to the kids
  kids next | kids prev             Move between stages in the kids view

  help                              Show this help
  quit                              Leave";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build a lesson from a topic and difficulty.
    Generate {
        /// Lesson topic.
        topic: String,
        /// Difficulty level.
        difficulty: String,
    },
    /// Show the author page.
    Show,
    /// Author: next stage.
    Next,
    /// Author: previous stage.
    Prev,
    /// Author: jump to a one-based stage number.
    GoTo(usize),
    /// Replace a field of the current stage.
    Edit {
        /// Field to replace.
        field: StageField,
        /// New text.
        text: String,
    },
    /// Attach an image file to the current stage.
    Attach(PathBuf),
    /// Remove the current stage's image.
    Detach,
    /// Save without committing.
    Save,
    /// Commit the lesson.
    Start,
    /// Show the kids page.
    Kids,
    /// Kids: next stage.
    KidsNext,
    /// Kids: previous stage.
    KidsPrev,
    /// Print or export the whole lesson.
    Lesson(Option<PathBuf>),
    /// Print usage.
    Help,
    /// Leave the console.
    Quit,
}

/// Errors from parsing a console line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The command word is not recognised.
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),

    /// A required argument is missing.
    #[error("Usage: {0}")]
    MissingArgument(&'static str),

    /// The stage number is not a positive integer.
    #[error("'{0}' is not a stage number")]
    InvalidStage(String),

    /// The field name is not recognised.
    #[error("Unknown field '{0}'. Fields: story, prompt, discussion, activity, hints, concept")]
    UnknownField(String),
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = split_word(line);
    let command = match word.to_lowercase().as_str() {
        "generate" | "gen" => parse_generate(rest),
        "show" => Command::Show,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "goto" => parse_goto(rest)?,
        "edit" => parse_edit(rest)?,
        "attach" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("attach <file>"));
            }
            Command::Attach(PathBuf::from(rest))
        }
        "detach" => Command::Detach,
        "save" => Command::Save,
        "start" | "commit" => Command::Start,
        "kids" => match rest.to_lowercase().as_str() {
            "" | "show" => Command::Kids,
            "next" | "n" => Command::KidsNext,
            "prev" | "p" => Command::KidsPrev,
            _ => return Err(CommandError::MissingArgument("kids [next|prev]")),
        },
        "lesson" => Command::Lesson((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn split_word(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}

fn parse_generate(rest: &str) -> Command {
    let (topic, difficulty) = rest.split_once('|').unwrap_or((rest, ""));
    Command::Generate {
        topic: topic.trim().to_string(),
        difficulty: difficulty.trim().to_string(),
    }
}

fn parse_goto(rest: &str) -> Result<Command, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument("goto <n>"));
    }
    match rest.parse::<usize>() {
        Ok(n) if n > 0 => Ok(Command::GoTo(n)),
        _ => Err(CommandError::InvalidStage(rest.to_string())),
    }
}

fn parse_edit(rest: &str) -> Result<Command, CommandError> {
    let (name, text) = split_word(rest);
    if name.is_empty() {
        return Err(CommandError::MissingArgument("edit <field> <text>"));
    }
    let field =
        StageField::from_name(name).ok_or_else(|| CommandError::UnknownField(name.to_string()))?;
    Ok(Command::Edit {
        field,
        text: text.replace("\\n", "\n"),
    })
}
