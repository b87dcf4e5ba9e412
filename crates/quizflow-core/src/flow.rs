//! Flow builder.
//!
//! Flattens sections (explicit, or derived from question categories) into
//! the single ordered sequence a session walks through.

use std::ops::Range;

use crate::model::{FlowItem, Question, QuestionId, QuestionSet, QuestionSource, Section};

/// The ordered sequence of every question in a question set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flow {
    items: Vec<FlowItem>,
}

impl Flow {
    /// Build from explicit sections, preserving section and in-section order.
    pub fn from_sections(sections: &[Section]) -> Self {
        let items = sections
            .iter()
            .flat_map(|section| {
                let total = section.questions.len();
                section
                    .questions
                    .iter()
                    .enumerate()
                    .map(move |(index, question)| FlowItem {
                        question: question.clone(),
                        section_id: section.id.clone(),
                        section_title: section.title.clone(),
                        section_description: section.description.clone(),
                        order_in_section: index + 1,
                        total_in_section: total,
                    })
            })
            .collect();

        Self { items }
    }

    /// Build from a flat list, deriving sections from each question's category.
    pub fn from_questions(questions: &[Question]) -> Self {
        Self::from_sections(&group_by_category(questions))
    }

    /// Build from whichever layout the question set was authored in.
    pub fn from_question_set(set: &QuestionSet) -> Self {
        let flow = match &set.source {
            QuestionSource::Sections(sections) => Self::from_sections(sections),
            QuestionSource::Flat(questions) => Self::from_questions(questions),
        };
        tracing::debug!(set = %set.id, questions = flow.len(), "built flow");
        flow
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&FlowItem> {
        self.items.get(position)
    }

    pub fn items(&self) -> &[FlowItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowItem> {
        self.items.iter()
    }

    /// Index of the last item, or `None` for an empty flow.
    pub fn last_position(&self) -> Option<usize> {
        self.items.len().checked_sub(1)
    }

    /// Position of the question with the given id.
    pub fn position_of(&self, id: &QuestionId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Flow positions belonging to the same section as `position`.
    ///
    /// Sections are contiguous, so the range is recovered from the item's
    /// in-section order and total.
    pub fn section_range(&self, position: usize) -> Option<Range<usize>> {
        let item = self.items.get(position)?;
        let start = position + 1 - item.order_in_section;
        Some(start..start + item.total_in_section)
    }
}

/// Group a flat question list into sections by category.
///
/// Section order is the first occurrence of each category in the input, and
/// questions keep their relative order. Questions without a category share an
/// untitled section.
pub fn group_by_category(questions: &[Question]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for question in questions {
        let category = question.category.as_deref().unwrap_or_default();
        match sections.iter_mut().find(|s| s.id == category) {
            Some(section) => section.questions.push(question.clone()),
            None => {
                let mut section = Section::new(category, category);
                section.questions.push(question.clone());
                sections.push(section);
            }
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, question_ids: &[i64]) -> Section {
        let mut s = Section::new(id, format!("{id} title"));
        s.description = format!("{id} description");
        s.questions = question_ids
            .iter()
            .map(|n| Question::free_text(*n, format!("q{n}"), &[]))
            .collect();
        s
    }

    #[test]
    fn sections_are_contiguous_and_numbered() {
        let flow = Flow::from_sections(&[section("a", &[1, 2, 3]), section("b", &[4, 5])]);

        assert_eq!(flow.len(), 5);
        let ids: Vec<String> = flow.iter().map(|i| i.id().to_string()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);

        let a: Vec<_> = flow.iter().filter(|i| i.section_id == "a").collect();
        assert_eq!(
            a.iter().map(|i| i.order_in_section).collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert!(a.iter().all(|i| i.total_in_section == 3));
        assert_eq!(a[0].section_description, "a description");

        let b = flow.get(4).unwrap();
        assert_eq!(b.order_in_section, 2);
        assert_eq!(b.total_in_section, 2);
        assert_eq!(b.section_title, "b title");
    }

    #[test]
    fn categories_follow_first_occurrence() {
        let questions = vec![
            Question::free_text(1, "q1", &[]).with_category("money"),
            Question::free_text(2, "q2", &[]).with_category("family"),
            Question::free_text(3, "q3", &[]).with_category("money"),
            Question::free_text(4, "q4", &[]).with_category("chores"),
            Question::free_text(5, "q5", &[]).with_category("family"),
        ];

        let flow = Flow::from_questions(&questions);
        let ids: Vec<String> = flow.iter().map(|i| i.id().to_string()).collect();
        assert_eq!(ids, ["1", "3", "2", "5", "4"]);

        let first = flow.get(0).unwrap();
        assert_eq!(first.section_id, "money");
        assert_eq!(first.section_title, "money");
        assert_eq!(first.section_description, "");
        assert_eq!(first.total_in_section, 2);

        assert_eq!(flow.get(3).unwrap().section_progress(), "2/2");
        assert_eq!(flow.get(4).unwrap().section_progress(), "1/1");
    }

    #[test]
    fn build_is_deterministic() {
        let questions: Vec<Question> = (0..20)
            .map(|n| Question::free_text(n, "q", &[]).with_category(format!("c{}", n % 3)))
            .collect();
        assert_eq!(Flow::from_questions(&questions), Flow::from_questions(&questions));
    }

    #[test]
    fn section_range_covers_current_section() {
        let flow = Flow::from_sections(&[section("a", &[1, 2]), section("b", &[3, 4, 5])]);
        assert_eq!(flow.section_range(0), Some(0..2));
        assert_eq!(flow.section_range(1), Some(0..2));
        assert_eq!(flow.section_range(3), Some(2..5));
        assert_eq!(flow.section_range(9), None);
    }

    #[test]
    fn empty_input_gives_empty_flow() {
        let flow = Flow::from_sections(&[]);
        assert!(flow.is_empty());
        assert_eq!(flow.last_position(), None);
        assert!(flow.get(0).is_none());

        let flow = Flow::from_sections(&[Section::new("empty", "Empty")]);
        assert!(flow.is_empty());
    }

    #[test]
    fn position_of_finds_questions() {
        let flow = Flow::from_sections(&[section("a", &[10, 20])]);
        assert_eq!(flow.position_of(&QuestionId::from(20)), Some(1));
        assert_eq!(flow.position_of(&QuestionId::from(30)), None);
    }
}
