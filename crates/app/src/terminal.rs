use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quiz_core::evaluator::Verdict;
use quiz_core::model::{Question, SessionMode, format_duration};
use services::session::{Presenter, Response, SessionOutcome, SessionPosition, SessionReport};

const RULE_WIDTH: usize = 52;

/// How often a pending read checks for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Input lines read on a helper thread, so a blocked read can still be
/// abandoned when the interrupt flag is raised.
pub struct LineReader {
    lines: Receiver<String>,
    interrupted: Arc<AtomicBool>,
}

impl LineReader {
    pub fn spawn<R>(input: R, interrupted: Arc<AtomicBool>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines, interrupted }
    }

    /// Block until the next line. `None` once input ends, fails or the
    /// interrupt flag is set.
    pub fn next_line(&self) -> Option<String> {
        loop {
            if self.interrupted.load(Ordering::SeqCst) {
                return None;
            }
            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => return Some(line),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

/// Line-oriented presenter over a [`LineReader`] and any writer.
pub struct TerminalPresenter<W> {
    input: LineReader,
    output: W,
    images_dir: PathBuf,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(input: LineReader, output: W, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            images_dir: images_dir.into(),
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn show(&mut self, question: &Question, position: &SessionPosition<'_>) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "[{}/{}] {}",
            position.number, position.total, position.quiz
        )?;
        writeln!(self.output, "{}", question.prompt())?;
        if let Some(image) = question.image() {
            let path = self.images_dir.join(image);
            if path.exists() {
                writeln!(self.output, "Image: {}", path.display())?;
            } else {
                writeln!(self.output, "Warning: Image not found: {}", path.display())?;
            }
        }
        write!(self.output, "> ")?;
        self.output.flush()
    }

    fn read_answer(&mut self) -> Response {
        match self.input.next_line() {
            Some(line) => Response::Answer(line),
            None => {
                let _ = writeln!(self.output);
                Response::Interrupted
            }
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn session_started(&mut self, mode: SessionMode, exercises: &[String], total: usize) {
        let _ = writeln!(
            self.output,
            "Starting {mode} session: {total} questions from {}",
            exercises.join(", ")
        )
        .and_then(|()| writeln!(self.output, "Type !quit or press Ctrl-C to stop early."));
    }

    fn present(&mut self, question: &Question, position: &SessionPosition<'_>) -> Response {
        if self.show(question, position).is_err() {
            return Response::Interrupted;
        }
        self.read_answer()
    }

    fn feedback(&mut self, question: &Question, verdict: Verdict) {
        let line = match verdict {
            Verdict::Exact => "Correct!".to_owned(),
            Verdict::Close { score } => {
                format!("Correct! ({score}% match, expected: {})", question.answer())
            }
            Verdict::Blank | Verdict::Incorrect { .. } => {
                format!("Incorrect. Expected: {}", question.answer())
            }
        };
        let _ = writeln!(self.output, "{line}");
    }
}

/// Print the end-of-session summary.
pub fn write_summary(
    out: &mut impl Write,
    report: &SessionReport,
    now: DateTime<Utc>,
) -> io::Result<()> {
    let stats = &report.stats;
    writeln!(out)?;
    writeln!(out, "Session Summary")?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "Exercises             : {}", stats.exercises().join(", "))?;
    writeln!(out, "Mode                  : {}", stats.mode())?;
    writeln!(out, "Questions Attempted   : {}", stats.questions_attempted())?;
    writeln!(out, "Correct Answers       : {}", stats.questions_correct())?;
    writeln!(out, "Accuracy              : {:.1}%", stats.accuracy())?;
    writeln!(out, "Duration              : {}", format_duration(stats.duration(now)))?;
    if report.outcome == SessionOutcome::Aborted {
        writeln!(out, "Session aborted early.")?;
    }
    writeln!(out, "{}", rule())
}
