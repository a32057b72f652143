//! Question variants and the built-in question bank.

/// One quiz question. The bank is static and read-only, defined at startup.
#[derive(Debug, Clone)]
pub enum Question {
    MultipleChoice {
        prompt: String,
        /// Ordered answer options; `correct` indexes into this list.
        options: Vec<String>,
        correct: usize,
    },
    Riddle {
        prompt: String,
        answer: String,
    },
}

/// A submitted answer for the current question.
#[derive(Debug, Clone)]
pub enum Answer {
    /// Selected option index (multiple choice).
    Choice(usize),
    /// Free-text answer (riddle).
    Text(String),
}

impl Question {
    pub fn prompt(&self) -> &str {
        match self {
            Question::MultipleChoice { prompt, .. } => prompt,
            Question::Riddle { prompt, .. } => prompt,
        }
    }

    /// Check a submitted answer. Riddle answers compare case-insensitively
    /// with surrounding whitespace ignored; a mismatched answer kind is
    /// simply wrong.
    pub fn check(&self, answer: &Answer) -> bool {
        match (self, answer) {
            (Question::MultipleChoice { correct, .. }, Answer::Choice(picked)) => picked == correct,
            (Question::Riddle { answer: expected, .. }, Answer::Text(given)) => {
                given.trim().eq_ignore_ascii_case(expected.trim())
            }
            _ => false,
        }
    }
}

fn mc(prompt: &str, options: &[&str], correct: usize) -> Question {
    Question::MultipleChoice {
        prompt: prompt.to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
        correct,
    }
}

fn riddle(prompt: &str, answer: &str) -> Question {
    Question::Riddle {
        prompt: prompt.to_string(),
        answer: answer.to_string(),
    }
}

/// The built-in 14-question bank.
pub fn standard_quiz() -> Vec<Question> {
    vec![
        mc(
            "Which planet is known as the Red Planet?",
            &["Venus", "Mars", "Jupiter", "Mercury"],
            1,
        ),
        mc(
            "How many continents are there on Earth?",
            &["Five", "Six", "Seven", "Eight"],
            2,
        ),
        riddle(
            "I speak without a mouth and hear without ears. What am I?",
            "an echo",
        ),
        mc(
            "What is the largest ocean on Earth?",
            &["Atlantic", "Indian", "Arctic", "Pacific"],
            3,
        ),
        mc(
            "Which gas do plants absorb from the atmosphere?",
            &["Oxygen", "Nitrogen", "Carbon dioxide", "Helium"],
            2,
        ),
        riddle(
            "The more of this you take, the more you leave behind. What is it?",
            "footsteps",
        ),
        mc(
            "What is the chemical symbol for gold?",
            &["Go", "Gd", "Au", "Ag"],
            2,
        ),
        mc(
            "Which instrument has 88 keys?",
            &["Organ", "Piano", "Accordion", "Harpsichord"],
            1,
        ),
        mc(
            "In which year did humans first land on the Moon?",
            &["1965", "1969", "1972", "1975"],
            1,
        ),
        riddle(
            "What has keys but can't open locks?",
            "a piano",
        ),
        mc(
            "What is the fastest land animal?",
            &["Lion", "Pronghorn", "Cheetah", "Greyhound"],
            2,
        ),
        mc(
            "How many sides does a hexagon have?",
            &["Five", "Six", "Seven", "Eight"],
            1,
        ),
        mc(
            "Which language has the most native speakers?",
            &["English", "Hindi", "Spanish", "Mandarin Chinese"],
            3,
        ),
        riddle(
            "What gets wetter the more it dries?",
            "a towel",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_has_fourteen_questions() {
        assert_eq!(standard_quiz().len(), 14);
    }

    #[test]
    fn bank_options_are_consistent() {
        for q in standard_quiz() {
            if let Question::MultipleChoice {
                options, correct, ..
            } = q
            {
                assert!(correct < options.len());
                assert!(options.len() >= 2);
            }
        }
    }

    #[test]
    fn multiple_choice_correct_index() {
        let q = mc("2 + 2?", &["3", "4"], 1);
        assert!(q.check(&Answer::Choice(1)));
        assert!(!q.check(&Answer::Choice(0)));
    }

    #[test]
    fn riddle_is_case_insensitive_and_trimmed() {
        let q = riddle("…?", "An Echo");
        assert!(q.check(&Answer::Text("an echo".into())));
        assert!(q.check(&Answer::Text("  AN ECHO  ".into())));
        assert!(!q.check(&Answer::Text("a shadow".into())));
    }

    #[test]
    fn mismatched_answer_kind_is_wrong() {
        let q = mc("2 + 2?", &["3", "4"], 1);
        assert!(!q.check(&Answer::Text("4".into())));

        let r = riddle("…?", "a towel");
        assert!(!r.check(&Answer::Choice(0)));
    }
}
