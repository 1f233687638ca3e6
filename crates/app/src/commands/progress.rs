//! The `quiz progress` command.

use anyhow::Result;
use services::report::{
    FolderReport, GlobalReport, ProgressReport, QuizReport, ReportBuilder, Tally,
};

use super::Context;
use crate::terminal::rule;

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |v| format!("{v:.1}%"))
}

fn print_tally(tally: &Tally) {
    println!("Total Questions       : {}", tally.questions);
    println!(
        "Questions Answered    : {} ({})",
        tally.seen,
        percent(tally.seen_percent())
    );
    println!("Correct Answers       : {}", tally.correct);
    println!("Accuracy Rate         : {}", percent(tally.accuracy()));
}

fn print_global(report: &GlobalReport) {
    println!("Progress: All Topics");
    println!("{}", rule());
    println!("Total Folders         : {}", report.folders);
    println!("Total Exercises       : {}", report.quizzes);
    print_tally(&report.tally);
    if let Some(first_use) = report.first_use {
        println!("First Use Date        : {first_use}");
    }
    if let Some(last_session) = &report.last_session {
        println!("Last Session Date     : {}", last_session.to_raw());
    }
    println!("{}", rule());
    if !report.recent_activity.is_empty() {
        println!("Recent Activity:");
        for (day, count) in &report.recent_activity {
            println!("  {day}: {count} questions");
        }
    }
}

fn print_quiz(report: &QuizReport) {
    println!("Progress: {}", report.quiz);
    println!("{}", rule());
    print_tally(&report.tally);
    if let Some(last_review) = report.last_review {
        println!("Last Session Date     : {}", last_review.format("%Y-%m-%d %H:%M"));
    }
    println!("{}", rule());
}

fn print_folder(report: &FolderReport) {
    println!("Progress: {}/", report.target);
    println!("{}", rule());
    println!("Total Exercises       : {}", report.quizzes.len());
    print_tally(&report.tally);
    println!("{}", rule());
    println!("Exercises:");
    for quiz in &report.quizzes {
        println!(
            "  • {:<25} {:.0}% seen | {:.1}% accuracy",
            quiz.name,
            quiz.tally.seen_percent().unwrap_or(0.0),
            quiz.tally.accuracy().unwrap_or(0.0)
        );
    }
}

pub fn execute(ctx: &Context, target: &str) -> Result<()> {
    let store = ctx.open_progress();
    match ReportBuilder::new(&ctx.catalog, &store).build(target)? {
        ProgressReport::Global(report) => print_global(&report),
        ProgressReport::Quiz(report) => print_quiz(&report),
        ProgressReport::Folder(report) => print_folder(&report),
        ProgressReport::NoMatch { target } => println!("No quizzes found for: {target}"),
    }
    Ok(())
}
