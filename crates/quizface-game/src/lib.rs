//! quizface-game — Sequential quiz flow over a fixed question bank.
//!
//! A [`QuizSession`] is an explicit value: current index, score, and the
//! questions themselves. The UI renders from it and feeds answers into it;
//! nothing about quiz progress lives in widget state or globals.

pub mod question;
pub mod report;
pub mod session;

pub use question::{standard_quiz, Answer, Question};
pub use report::{render_report, standings, Standing};
pub use session::{QuizSession, Submission};
