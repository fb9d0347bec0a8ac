//! Static quiz questions.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: &'static str,
    pub options: [&'static str; 3],
    /// Index into `options`
    pub answer: usize,
}

impl QuizQuestion {
    pub fn correct_option(&self) -> &'static str {
        self.options[self.answer]
    }
}

pub const QUESTIONS: [QuizQuestion; 8] = [
    QuizQuestion {
        question: "Сколько будет 2+2?",
        options: ["3", "4", "5"],
        answer: 1,
    },
    QuizQuestion {
        question: "Столица Франции?",
        options: ["Берлин", "Париж", "Рим"],
        answer: 1,
    },
    QuizQuestion {
        question: "Какой фрукт бывает красным, зелёным и жёлтым одновременно?",
        options: ["Яблоко", "Банан", "Апельсин"],
        answer: 0,
    },
    QuizQuestion {
        question: "Что всегда идёт, но никогда не приходит?",
        options: ["Круг", "Время", "Река"],
        answer: 1,
    },
    QuizQuestion {
        question: "Какая река считается самой длинной в мире?",
        options: ["Амазонка", "Нил", "Миссисипи"],
        answer: 1,
    },
    QuizQuestion {
        question: "Сколько дней в високосном году?",
        options: ["365", "366", "367"],
        answer: 1,
    },
    QuizQuestion {
        question: "Какой цвет получается при смешивании синего и жёлтого?",
        options: ["Зелёный", "Фиолетовый", "Оранжевый"],
        answer: 0,
    },
    QuizQuestion {
        question: "Что всегда растёт, но не стареет?",
        options: ["Дерево", "Растение", "Возраст"],
        answer: 2,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizVerdict {
    Correct,
    Wrong { correct: &'static str },
}

pub fn question(index: usize) -> Option<&'static QuizQuestion> {
    QUESTIONS.get(index)
}

/// Pick a question uniformly at random
pub fn random_question() -> (usize, &'static QuizQuestion) {
    let index = rand::rng().random_range(0..QUESTIONS.len());
    (index, &QUESTIONS[index])
}

/// Judge an answer; `None` for an unknown question or option
pub fn check_answer(question_index: usize, choice: usize) -> Option<QuizVerdict> {
    let question = question(question_index)?;
    if choice >= question.options.len() {
        return None;
    }
    Some(if choice == question.answer {
        QuizVerdict::Correct
    } else {
        QuizVerdict::Wrong {
            correct: question.correct_option(),
        }
    })
}
