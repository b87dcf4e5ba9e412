//! Question set parser.
//!
//! Loads question sets from TOML or JSON files and directories, rejects
//! structurally broken sets, and reports softer authoring issues as
//! warnings.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::QuestionSetError;
use crate::model::{Messages, Question, QuestionId, QuestionKind, QuestionSet, QuestionSource, Section};

/// On-disk encoding of a question set file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    /// Pick a format from the file extension. Anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        }
    }

    fn is_question_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml") || ext.eq_ignore_ascii_case("json"))
    }
}

/// Intermediate structure for parsing question set files.
#[derive(Debug, Deserialize)]
struct RawQuestionFile {
    question_set: RawHeader,
    #[serde(default)]
    sections: Option<Vec<Section>>,
    #[serde(default)]
    questions: Option<Vec<Question>>,
    #[serde(default)]
    messages: Messages,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

/// Parse a single question set file.
pub fn parse_question_set(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set file: {}", path.display()))?;

    parse_question_set_str(&content, path)
}

/// Parse question set text; `source_path` picks the format and names errors.
pub fn parse_question_set_str(content: &str, source_path: &Path) -> Result<QuestionSet> {
    let parsed: RawQuestionFile = match FileFormat::from_path(source_path) {
        FileFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
        FileFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
    };

    let header = parsed.question_set;
    let source = match (parsed.sections, parsed.questions) {
        (Some(_), Some(_)) => return Err(QuestionSetError::MixedLayout(header.id).into()),
        (Some(sections), None) => QuestionSource::Sections(sections),
        (None, Some(questions)) => QuestionSource::Flat(questions),
        (None, None) => return Err(QuestionSetError::Empty(header.id).into()),
    };

    let set = QuestionSet {
        id: header.id,
        name: header.name,
        description: header.description,
        source,
        messages: parsed.messages,
    };

    check_question_set(&set)
        .with_context(|| format!("invalid question set: {}", source_path.display()))?;

    tracing::debug!(
        set = %set.id,
        questions = set.question_count(),
        path = %source_path.display(),
        "loaded question set"
    );
    Ok(set)
}

/// Reject question sets that cannot be played correctly.
pub fn check_question_set(set: &QuestionSet) -> std::result::Result<(), QuestionSetError> {
    if set.question_count() == 0 {
        return Err(QuestionSetError::Empty(set.id.clone()));
    }

    let mut seen = HashSet::new();
    for question in set.questions() {
        if !seen.insert(&question.id) {
            return Err(QuestionSetError::DuplicateId(question.id.clone()));
        }

        if let QuestionKind::SingleChoice {
            options,
            correct_answer,
        } = &question.kind
        {
            if options.is_empty() {
                return Err(QuestionSetError::NoOptions(question.id.clone()));
            }
            if let Some(answer) = correct_answer {
                if !options.iter().any(|o| &o.value == answer) {
                    return Err(QuestionSetError::UnknownCorrectAnswer {
                        id: question.id.clone(),
                        answer: answer.clone(),
                    });
                }
            }
        }
    }

    if let QuestionSource::Flat(questions) = &set.source {
        if let Some(q) = questions.iter().find(|q| q.category.is_none()) {
            return Err(QuestionSetError::MissingCategory(q.id.clone()));
        }
    }

    Ok(())
}

/// Recursively load every `.toml` and `.json` question set in a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_question_directory(dir: &Path) -> Result<Vec<QuestionSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            sets.extend(load_question_directory(&path)?);
        } else if FileFormat::is_question_file(&path) {
            match parse_question_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A non-fatal authoring issue.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<QuestionId>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &QuestionId, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.clone()),
            message: message.into(),
        }
    }
}

/// Report authoring issues that do not stop a set from being played.
pub fn validate_question_set(set: &QuestionSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let QuestionSource::Sections(sections) = &set.source {
        for section in sections.iter().filter(|s| s.questions.is_empty()) {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("section '{}' has no questions", section.id),
            });
        }
    }

    for question in set.questions() {
        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning::question(&question.id, "prompt is empty"));
        }

        match &question.kind {
            QuestionKind::SingleChoice {
                options,
                correct_answer,
            } => {
                let mut values = HashSet::new();
                for option in options {
                    if !values.insert(option.value.as_str()) {
                        warnings.push(ValidationWarning::question(
                            &question.id,
                            format!("duplicate option value: {}", option.value),
                        ));
                    }
                }
                if correct_answer.is_none() {
                    warnings.push(ValidationWarning::question(
                        &question.id,
                        "no correct_answer; this question can never be correct",
                    ));
                }
            }
            QuestionKind::FreeText { keywords, .. } => {
                if keywords.is_empty() {
                    warnings.push(ValidationWarning::question(
                        &question.id,
                        "no keywords; any non-empty answer is correct",
                    ));
                }
            }
        }
    }

    warnings
}
