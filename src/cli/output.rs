//! CLI output formatting utilities.

use crate::rag::AssistantResponse;
use crate::session::TaskChecklist;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a retrieved source chunk.
    pub fn source(source: &str, page: u32, score: f32, content: &str) {
        println!(
            "\n{} {} p.{} (score: {:.2})",
            style(">>").green(),
            style(source).bold(),
            style(page).cyan(),
            score
        );
        println!("   {}", content_preview(content, 200));
    }

    /// Print an assistant answer with its sources.
    pub fn response(response: &AssistantResponse) {
        Output::kv("Knowledge base", &response.collection);
        println!("\n{}\n", response.answer);

        if !response.sources.is_empty() {
            Output::header("Sources");
            for source in &response.sources {
                Output::source(&source.source, source.page, source.score, &source.content);
            }
            println!();
        }
    }

    /// Print the suggested-actions checklist, numbered from 1.
    pub fn checklist(checklist: &TaskChecklist) {
        Output::header("Suggested Actions");
        for (i, (task, done)) in checklist.items().enumerate() {
            let mark = if done {
                style("[x]").green()
            } else {
                style("[ ]").dim()
            };
            println!("  {} {}. {}", mark, i + 1, task);
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis, on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
