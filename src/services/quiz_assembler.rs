use crate::models::{Question, Quiz};

/// 一套试卷的题目上限
pub const MAX_QUIZ_QUESTIONS: usize = 30;

/// 按给定顺序拼接各来源的题目，截断到上限，分配新的试卷 ID
pub fn assemble_quiz<I>(bundles: I) -> Quiz
where
    I: IntoIterator<Item = Vec<Question>>,
{
    assemble_quiz_with_id(uuid::Uuid::new_v4().to_string(), bundles)
}

/// 同 [`assemble_quiz`]，使用指定的试卷 ID
pub fn assemble_quiz_with_id<I>(id: impl Into<String>, bundles: I) -> Quiz
where
    I: IntoIterator<Item = Vec<Question>>,
{
    let questions = bundles
        .into_iter()
        .flatten()
        .take(MAX_QUIZ_QUESTIONS)
        .collect();
    Quiz {
        id: id.into(),
        questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(prefix: &str, n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: format!("{}-{}", prefix, i),
                stem: "stem".into(),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                answer_index: 0,
                source: prefix.into(),
                url: String::new(),
                category: prefix.into(),
                category_id: prefix.into(),
                explanation: None,
            })
            .collect()
    }

    #[test]
    fn test_caps_at_thirty_preserving_order() {
        let quiz = assemble_quiz([bundle("A01", 20), bundle("A02", 10), bundle("A03", 5)]);
        assert_eq!(quiz.questions.len(), 30);
        assert_eq!(quiz.questions[0].id, "A01-0");
        assert_eq!(quiz.questions[19].id, "A01-19");
        assert_eq!(quiz.questions[20].id, "A02-0");
        assert_eq!(quiz.questions[29].id, "A02-9");
        assert!(quiz.questions.iter().all(|q| q.category_id != "A03"));
    }

    #[test]
    fn test_fresh_ids() {
        let a = assemble_quiz([bundle("A01", 1)]);
        let b = assemble_quiz([bundle("A01", 1)]);
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_short_and_empty_input() {
        let quiz = assemble_quiz_with_id("q1", [bundle("A01", 3), Vec::new()]);
        assert_eq!(quiz.id, "q1");
        assert_eq!(quiz.questions.len(), 3);
        assert!(assemble_quiz(Vec::<Vec<Question>>::new()).questions.is_empty());
    }
}
