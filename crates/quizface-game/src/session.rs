//! The quiz session state machine.

use crate::question::{Answer, Question};
use quizface_store::{Leaderboard, LeaderboardStore};

/// Outcome of submitting one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub correct: bool,
    /// True when this submission answered the last question.
    pub finished: bool,
}

/// One player's run through the question bank.
///
/// States are the question index `0..N` plus "finished" (`index == N`).
/// Each submit scores at most one point and always advances; there is no
/// skipping, no retry, and no partial credit.
pub struct QuizSession {
    player: String,
    questions: Vec<Question>,
    index: usize,
    score: u32,
}

impl QuizSession {
    pub fn new(player: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            player: player.into(),
            questions,
            index: 0,
            score: 0,
        }
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// 0-based index of the current question.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    /// The question awaiting an answer, or `None` once finished.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    /// Submit an answer for the current question. A correct answer scores
    /// one point; the index advances regardless of correctness. Submitting
    /// after the last question is a no-op.
    pub fn submit(&mut self, answer: &Answer) -> Submission {
        let Some(question) = self.questions.get(self.index) else {
            return Submission {
                correct: false,
                finished: true,
            };
        };

        let correct = question.check(answer);
        if correct {
            self.score += 1;
        }
        self.index += 1;

        tracing::debug!(
            player = %self.player,
            question = self.index,
            total = self.questions.len(),
            correct,
            score = self.score,
            "answer submitted"
        );

        Submission {
            correct,
            finished: self.is_finished(),
        }
    }
}

/// Record a finished session into the leaderboard and persist it.
///
/// Call exactly once per completed quiz; sessions that were abandoned
/// mid-way never reach the leaderboard.
pub fn finish(session: &QuizSession, store: &LeaderboardStore, board: &mut Leaderboard) {
    debug_assert!(session.is_finished());
    store.record_game(board, session.player(), session.score());
    tracing::info!(
        player = %session.player(),
        score = session.score(),
        total = session.total(),
        "quiz finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::standard_quiz;
    use uuid::Uuid;

    /// Answer the given question correctly.
    fn correct_answer(question: &Question) -> Answer {
        match question {
            Question::MultipleChoice { correct, .. } => Answer::Choice(*correct),
            Question::Riddle { answer, .. } => Answer::Text(answer.clone()),
        }
    }

    /// An answer that is wrong for any question in the bank.
    fn wrong_answer() -> Answer {
        Answer::Text("definitely not it".into())
    }

    #[test]
    fn all_correct_scores_total() {
        let mut session = QuizSession::new("alice", standard_quiz());
        while let Some(q) = session.current_question().cloned() {
            session.submit(&correct_answer(&q));
        }
        assert!(session.is_finished());
        assert_eq!(session.score() as usize, session.total());
    }

    #[test]
    fn all_wrong_scores_zero() {
        let mut session = QuizSession::new("alice", standard_quiz());
        while !session.is_finished() {
            session.submit(&wrong_answer());
        }
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn index_advances_on_wrong_answer() {
        let mut session = QuizSession::new("alice", standard_quiz());
        let result = session.submit(&wrong_answer());
        assert!(!result.correct);
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn last_submission_reports_finished() {
        let mut session = QuizSession::new("alice", standard_quiz());
        let total = session.total();
        for i in 0..total {
            let result = session.submit(&wrong_answer());
            assert_eq!(result.finished, i == total - 1);
        }
        assert!(session.current_question().is_none());
    }

    #[test]
    fn submit_after_finish_is_noop() {
        let mut session = QuizSession::new("alice", Vec::new());
        let result = session.submit(&wrong_answer());
        assert!(result.finished);
        assert_eq!(session.score(), 0);
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn finish_updates_leaderboard_once() {
        let store = LeaderboardStore::new(
            std::env::temp_dir()
                .join(format!("quizface-test-{}", Uuid::new_v4()))
                .join("leaderboard.json"),
        );
        let mut board = store.load();

        let mut session = QuizSession::new("bob", standard_quiz());
        let mut remaining_correct = 10;
        while let Some(q) = session.current_question().cloned() {
            if remaining_correct > 0 {
                session.submit(&correct_answer(&q));
                remaining_correct -= 1;
            } else {
                session.submit(&wrong_answer());
            }
        }
        assert_eq!(session.score(), 10);

        finish(&session, &store, &mut board);
        let entry = &board["bob"];
        assert_eq!(entry.games_played, 1);
        assert_eq!(entry.total_score, 10);
        assert!(!entry.last_played.is_empty());

        // Persisted as well as applied in memory.
        assert_eq!(store.load()["bob"], *entry);
    }
}
