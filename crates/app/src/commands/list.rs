//! The `quiz list` command.

use anyhow::Result;
use storage::QuizSource;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let ids = ctx.catalog.discover();
    if ids.is_empty() {
        println!("No quiz files found.");
        println!(
            "Create .yaml files in {} or its subdirectories.",
            ctx.paths.exercises.display()
        );
        return Ok(());
    }

    println!("Available Quizzes:");
    println!("{}", "=".repeat(50));

    let mut printed: Vec<&str> = Vec::new();
    for id in &ids {
        let folder = id.folder();
        let parts: Vec<&str> = folder.split('/').filter(|p| !p.is_empty()).collect();
        for (depth, &part) in parts.iter().enumerate() {
            if printed.get(depth) != Some(&part) {
                printed.truncate(depth);
                printed.push(part);
                if depth == 0 {
                    println!("{part}/");
                } else {
                    println!("{}├── {part}/", "  ".repeat(depth));
                }
            }
        }
        printed.truncate(parts.len());

        let count = match ctx.catalog.load(id) {
            Ok(quiz) => quiz.question_count(),
            Err(e) => {
                tracing::warn!("skipping {id}: {e}");
                continue;
            }
        };
        println!(
            "{}├── {} ({count} questions)",
            "  ".repeat(parts.len()),
            id.stem()
        );
    }

    println!();
    println!("Usage: quiz start <target> [mode]");
    println!("Modes: spaced (default), shuffle, quick");
    Ok(())
}
