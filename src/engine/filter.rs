use crate::quiz::model::QuestionSet;

/// Case-insensitive substring match on a set's topic.
pub struct TopicFilter {
    needle: String,
}

impl TopicFilter {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, topic: &str) -> bool {
        self.is_empty() || topic.to_lowercase().contains(&self.needle)
    }

    pub fn apply<'a>(&self, sets: &'a [QuestionSet]) -> Vec<&'a QuestionSet> {
        sets.iter().filter(|s| self.matches(&s.topic)).collect()
    }
}

/// Derived view of `history`: the sets whose topic contains `term`, in their
/// original order. An empty term keeps everything.
pub fn filter_sets<'a>(history: &'a [QuestionSet], term: &str) -> Vec<&'a QuestionSet> {
    TopicFilter::new(term).apply(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::{QuestionStyle, SetId};

    fn set(id: &str, topic: &str) -> QuestionSet {
        QuestionSet {
            id: SetId::new(id),
            topic: topic.to_string(),
            style: QuestionStyle::MultipleChoice,
            questions: Vec::new(),
        }
    }

    fn ids(view: &[&QuestionSet]) -> Vec<String> {
        view.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn empty_term_keeps_history() {
        let history = vec![set("1", "B"), set("2", "A"), set("3", "C")];
        let view = filter_sets(&history, "");
        assert_eq!(ids(&view), vec!["1", "2", "3"]);
    }

    #[test]
    fn case_insensitive_substring() {
        let history = vec![set("1", "Cells"), set("2", "cell biology"), set("3", "Genetics")];
        let view = filter_sets(&history, "cell");
        assert_eq!(ids(&view), vec!["1", "2"]);
        let view = filter_sets(&history, "CELL");
        assert_eq!(ids(&view), vec!["1", "2"]);
    }

    #[test]
    fn match_is_not_tokenized() {
        let history = vec![set("1", "Cell biology")];
        assert!(filter_sets(&history, "biology cell").is_empty());
        assert_eq!(filter_sets(&history, "l bio").len(), 1);
    }

    #[test]
    fn filtering_does_not_mutate_history() {
        let history = vec![set("1", "Cells"), set("2", "Atoms")];
        let _ = filter_sets(&history, "atoms");
        assert_eq!(history.len(), 2);
    }
}
