//! Core data model types for quizflow.
//!
//! These are the fundamental types the whole engine works with: questions
//! and their variants, sections, flattened flow items, the live answer map,
//! and evaluation results.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a question, unique within a question set.
///
/// Authors may use either integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{n}"),
            QuestionId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for QuestionId {
    fn from(n: i64) -> Self {
        QuestionId::Number(n)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        QuestionId::Text(s)
    }
}

/// A single author-defined quiz item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the question set.
    pub id: QuestionId,
    /// The question text shown to the user.
    #[serde(alias = "question")]
    pub prompt: String,
    /// Additional display text.
    #[serde(default)]
    pub description: String,
    /// Category used to derive sections from a flat question list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Variant-specific data.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// The two question variants. Evaluation dispatches on this tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionKind {
    /// Pick one of a fixed list of options.
    #[serde(rename = "single", alias = "choice", alias = "single-choice")]
    SingleChoice {
        options: Vec<ChoiceOption>,
        /// Value of the expected option, if any.
        #[serde(default, alias = "correctAnswer", skip_serializing_if = "Option::is_none")]
        correct_answer: Option<String>,
    },
    /// Free-form text scored by keyword coverage.
    #[serde(rename = "text", alias = "essay", alias = "free-text")]
    FreeText {
        #[serde(default)]
        guidance: String,
        #[serde(default)]
        keywords: Vec<String>,
    },
}

impl Question {
    /// Build a single-choice question from plain option strings.
    pub fn single_choice(
        id: impl Into<QuestionId>,
        prompt: impl Into<String>,
        options: &[&str],
        correct_answer: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            description: String::new(),
            category: None,
            kind: QuestionKind::SingleChoice {
                options: options.iter().map(|o| ChoiceOption::plain(*o)).collect(),
                correct_answer: correct_answer.map(str::to_string),
            },
        }
    }

    /// Build a free-text question.
    pub fn free_text(id: impl Into<QuestionId>, prompt: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            description: String::new(),
            category: None,
            kind: QuestionKind::FreeText {
                guidance: String::new(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            },
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn is_single_choice(&self) -> bool {
        matches!(self.kind, QuestionKind::SingleChoice { .. })
    }

    /// Short label for the question variant.
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            QuestionKind::SingleChoice { .. } => "객관식",
            QuestionKind::FreeText { .. } => "서술형",
        }
    }

    /// Options of a single-choice question; empty for free text.
    pub fn options(&self) -> &[ChoiceOption] {
        match &self.kind {
            QuestionKind::SingleChoice { options, .. } => options,
            QuestionKind::FreeText { .. } => &[],
        }
    }
}

/// One selectable option. Answers are compared against `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    /// An option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self { label: value.clone(), value }
    }
}

/// Options may be written as bare strings or as `{ value, label }` tables.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Plain(String),
    Labeled {
        value: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl From<RawOption> for ChoiceOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Plain(value) => ChoiceOption::plain(value),
            RawOption::Labeled { value, label } => ChoiceOption {
                label: label.unwrap_or_else(|| value.clone()),
                value,
            },
        }
    }
}

/// An explicit, ordered group of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            questions: Vec::new(),
        }
    }
}

/// A question placed in the flow, with its section context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowItem {
    pub question: Question,
    pub section_id: String,
    pub section_title: String,
    /// Empty when the section was derived from a category.
    pub section_description: String,
    /// 1-based position within the section.
    pub order_in_section: usize,
    pub total_in_section: usize,
}

impl FlowItem {
    pub fn id(&self) -> &QuestionId {
        &self.question.id
    }

    /// "k/total" within the section.
    pub fn section_progress(&self) -> String {
        format!("{}/{}", self.order_in_section, self.total_in_section)
    }
}

/// Raw answers keyed by question id.
///
/// A missing key and an empty string are both "unanswered" but are kept
/// distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap(HashMap<QuestionId, String>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: QuestionId, value: impl Into<String>) {
        self.0.insert(id, value.into());
    }

    pub fn get(&self, id: &QuestionId) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.0.contains_key(id)
    }

    /// True when the stored answer is non-empty after trimming.
    pub fn is_answered(&self, id: &QuestionId) -> bool {
        self.get(id).is_some_and(|a| !a.trim().is_empty())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }
}

/// Classification of an evaluated answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Partial,
    Incorrect,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => write!(f, "correct"),
            Verdict::Partial => write!(f, "partial"),
            Verdict::Incorrect => write!(f, "incorrect"),
        }
    }
}

impl Verdict {
    /// Feedback heading shown next to the message.
    pub fn heading(&self) -> &'static str {
        match self {
            Verdict::Correct => "정답",
            Verdict::Partial => "보완 필요",
            Verdict::Incorrect => "확인 필요",
        }
    }
}

/// Result of evaluating one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub verdict: Verdict,
    pub message: String,
    /// Keywords not covered by a partial answer, in declared order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_keywords: Vec<String>,
}

impl EvaluationResult {
    pub fn correct(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Correct,
            message: message.into(),
            missing_keywords: Vec::new(),
        }
    }

    pub fn partial(message: impl Into<String>, missing_keywords: Vec<String>) -> Self {
        Self {
            verdict: Verdict::Partial,
            message: message.into(),
            missing_keywords,
        }
    }

    pub fn incorrect(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Incorrect,
            message: message.into(),
            missing_keywords: Vec::new(),
        }
    }

    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }
}

/// Author-defined texts for evaluation feedback and notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Returned for blank answers of any kind.
    pub answer_required: String,
    pub choice_correct: String,
    pub choice_incorrect: String,
    pub text_correct: String,
    /// Template; `{missing}` is replaced by the unmatched keywords.
    pub text_partial: String,
    pub text_incorrect: String,
    /// Notice raised when advancing without an answer.
    pub advance_blocked: String,
    /// Notice raised when advancing before checking.
    pub check_required: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            answer_required: "답변을 입력하거나 선택해 주세요.".into(),
            choice_correct: "합의한 방식과 일치합니다.".into(),
            choice_incorrect: "다시 이야기해 보세요. 서로의 상황에 맞는 선택인지 점검하세요.".into(),
            text_correct: "핵심 요소를 모두 담았습니다.".into(),
            text_partial: "좋아요. \"{missing}\"에 대한 합의도 추가해 주세요.".into(),
            text_incorrect:
                "조율 기준과 분담 방식이 보이지 않아요. 조금 더 구체적으로 작성해 주세요.".into(),
            advance_blocked: "답변을 입력해야 다음으로 이동할 수 있어요.".into(),
            check_required: "정답 체크를 먼저 진행해 주세요.".into(),
        }
    }
}

/// Where a question set's questions come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    /// Nested sections with explicit metadata.
    Sections(Vec<Section>),
    /// A flat list; sections are derived from each question's category.
    Flat(Vec<Question>),
}

/// A loaded question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub source: QuestionSource,
    #[serde(default)]
    pub messages: Messages,
}

impl QuestionSet {
    /// All questions in declared order.
    pub fn questions(&self) -> Vec<&Question> {
        match &self.source {
            QuestionSource::Sections(sections) => {
                sections.iter().flat_map(|s| s.questions.iter()).collect()
            }
            QuestionSource::Flat(questions) => questions.iter().collect(),
        }
    }

    pub fn question_count(&self) -> usize {
        match &self.source {
            QuestionSource::Sections(sections) => sections.iter().map(|s| s.questions.len()).sum(),
            QuestionSource::Flat(questions) => questions.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_display_and_conversion() {
        assert_eq!(QuestionId::from(3).to_string(), "3");
        assert_eq!(QuestionId::from("q-1").to_string(), "q-1");
        assert_ne!(QuestionId::from(1), QuestionId::from("1"));
    }

    #[test]
    fn question_id_deserializes_untagged() {
        let n: QuestionId = serde_json::from_str("7").unwrap();
        let s: QuestionId = serde_json::from_str("\"seven\"").unwrap();
        assert_eq!(n, QuestionId::Number(7));
        assert_eq!(s, QuestionId::Text("seven".into()));
    }

    #[test]
    fn question_kind_accepts_aliases() {
        let json = r#"{"id": 1, "question": "Who?", "type": "choice", "options": ["a", {"value": "b", "label": "Bee"}]}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.prompt, "Who?");
        assert!(q.is_single_choice());
        assert_eq!(q.options()[0], ChoiceOption::plain("a"));
        assert_eq!(q.options()[1].label, "Bee");

        let json = r#"{"id": "t", "prompt": "Why?", "type": "essay", "keywords": ["x"]}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert!(matches!(q.kind, QuestionKind::FreeText { ref keywords, .. } if keywords == &["x"]));
    }

    #[test]
    fn answer_map_distinguishes_missing_from_blank() {
        let mut answers = AnswerMap::new();
        let id = QuestionId::from(1);
        assert!(!answers.contains(&id));

        answers.set(id.clone(), "   ");
        assert!(answers.contains(&id));
        assert!(!answers.is_answered(&id));

        answers.set(id.clone(), "yes");
        assert!(answers.is_answered(&id));

        answers.clear();
        assert!(answers.is_empty());
    }

    #[test]
    fn flow_item_section_progress() {
        let item = FlowItem {
            question: Question::free_text(1, "p", &[]),
            section_id: "s".into(),
            section_title: "S".into(),
            section_description: String::new(),
            order_in_section: 2,
            total_in_section: 5,
        };
        assert_eq!(item.section_progress(), "2/5");
    }

    #[test]
    fn default_messages_have_partial_placeholder() {
        assert!(Messages::default().text_partial.contains("{missing}"));
    }
}
