//! The `quiz start` command.

use std::io;

use anyhow::{Context as _, Result};
use quiz_core::Clock;
use quiz_core::model::SessionMode;
use services::session::{SessionOutcome, SessionRunner};
use storage::catalog::near_misses;

use super::Context;
use crate::interrupt;
use crate::terminal::{LineReader, TerminalPresenter, write_summary};

pub fn execute(ctx: &Context, target: &str, mode: SessionMode) -> Result<()> {
    for dir in [&ctx.paths.exercises, &ctx.paths.images] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let clock = Clock::default_clock();
    let mut store = ctx.open_progress();
    let interrupted = interrupt::install()?;
    let input = LineReader::spawn(io::BufReader::new(io::stdin()), interrupted);
    let mut presenter = TerminalPresenter::new(input, io::stdout(), &ctx.paths.images);

    let report = SessionRunner::new(&ctx.settings, clock, &ctx.catalog, &mut store)
        .run_session(target, mode, &mut presenter)?;

    match &report.outcome {
        SessionOutcome::Failed(e) => {
            anyhow::bail!("{e}");
        }
        SessionOutcome::NoData => {
            println!("No quiz found with name: {target}");
            let hints = near_misses(&ctx.catalog.discover(), target);
            if !hints.is_empty() {
                println!("Did you mean: {}", hints.join(", "));
            }
            println!("Names are case-sensitive. Run 'quiz list' to see available quizzes.");
        }
        SessionOutcome::Completed | SessionOutcome::Aborted => {
            write_summary(&mut io::stdout(), &report, clock.now())?;
        }
    }
    Ok(())
}
