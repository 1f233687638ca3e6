use quiz_core::evaluator::Verdict;
use quiz_core::model::{Question, QuizId, SessionMode};

/// Answers that end a session early.
pub const QUIT_SIGNALS: [&str; 2] = ["!quit", "!abort"];

/// True when `answer` asks to stop the session (case-insensitive).
#[must_use]
pub fn is_quit_signal(answer: &str) -> bool {
    let answer = answer.trim();
    QUIT_SIGNALS.iter().any(|s| answer.eq_ignore_ascii_case(s))
}

/// What the user gave back for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Answer(String),
    /// Input ended or was interrupted; treated like a quit signal.
    Interrupted,
}

impl Response {
    #[must_use]
    pub fn is_quit(&self) -> bool {
        match self {
            Self::Answer(answer) => is_quit_signal(answer),
            Self::Interrupted => true,
        }
    }
}

/// Where a question sits within the running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPosition<'a> {
    /// 1-based.
    pub number: usize,
    pub total: usize,
    pub quiz: &'a QuizId,
}

/// Display side of a session.
pub trait Presenter {
    fn session_started(&mut self, _mode: SessionMode, _exercises: &[String], _total: usize) {}

    /// Show `question` and block until the user answers.
    fn present(&mut self, question: &Question, position: &SessionPosition<'_>) -> Response;

    fn feedback(&mut self, _question: &Question, _verdict: Verdict) {}
}

/// Replays a fixed list of answers; runs out as `Interrupted`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPresenter {
    answers: std::collections::VecDeque<Response>,
    presented: Vec<String>,
    verdicts: Vec<Verdict>,
}

impl ScriptedPresenter {
    #[must_use]
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers
                .into_iter()
                .map(|a| Response::Answer(a.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Prompts shown so far, in order.
    #[must_use]
    pub fn presented(&self) -> &[String] {
        &self.presented
    }

    #[must_use]
    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }
}

impl Presenter for ScriptedPresenter {
    fn present(&mut self, question: &Question, _position: &SessionPosition<'_>) -> Response {
        self.presented.push(question.prompt().to_owned());
        self.answers.pop_front().unwrap_or(Response::Interrupted)
    }

    fn feedback(&mut self, _question: &Question, verdict: Verdict) {
        self.verdicts.push(verdict);
    }
}
