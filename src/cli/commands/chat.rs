//! Interactive chat command with the suggested-actions checklist.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::{Completion, Session};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// A line of chat input.
#[derive(Debug, PartialEq)]
enum ChatInput<'a> {
    Empty,
    Exit,
    NewChat,
    Done,
    Tasks,
    /// 1-based task number as typed.
    Tick(usize, bool),
    BadTaskNumber(&'a str),
    Question(&'a str),
}

fn parse_input(input: &str) -> ChatInput<'_> {
    let input = input.trim();
    if input.is_empty() {
        return ChatInput::Empty;
    }

    let mut words = input.split_whitespace();
    let first = words.next().unwrap_or_default().to_lowercase();
    let rest: Vec<&str> = words.collect();

    match (first.as_str(), rest.as_slice()) {
        ("exit" | "quit", []) => ChatInput::Exit,
        ("new", []) => ChatInput::NewChat,
        ("done", []) => ChatInput::Done,
        ("tasks", []) => ChatInput::Tasks,
        ("tick" | "untick", [n]) => match n.parse::<usize>() {
            Ok(number) if number > 0 => ChatInput::Tick(number, first == "tick"),
            _ => ChatInput::BadTaskNumber(*n),
        },
        _ => ChatInput::Question(input),
    }
}

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'genaniml doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let mut session = Session::new();

    println!("\n{}", style("Human-Wildlife Conflict Assistant").bold().cyan());
    println!(
        "{}\n",
        style("Ask a question, or: tick N, untick N, tasks, done, new, exit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ChatInput::NewChat => {
                session.new_chat();
                Output::info("Started a new chat.");
            }
            ChatInput::Tasks => {
                if session.show_tasks {
                    Output::checklist(&session.checklist);
                } else {
                    Output::info("Ask a question first.");
                }
            }
            ChatInput::Tick(n, done) => {
                if !session.show_tasks {
                    Output::info("Ask a question first.");
                    continue;
                }
                match session.checklist.set(n - 1, done) {
                    Ok(()) => Output::checklist(&session.checklist),
                    Err(e) => Output::warning(&e.to_string()),
                }
            }
            ChatInput::BadTaskNumber(n) => {
                Output::warning(&format!("'{}' is not a task number", n));
            }
            ChatInput::Done => match session.finish() {
                Completion::Done => {
                    Output::success("All tasks completed!");
                    Output::info("Type 'new' to start another chat.");
                }
                Completion::Incomplete { remaining } => {
                    Output::warning("Please complete all tasks before finishing.");
                    for task in &remaining {
                        Output::list_item(task);
                    }
                }
            },
            ChatInput::Question(question) => {
                let spinner = Output::spinner("Searching knowledge base...");
                let result = orchestrator.respond_to_text(question).await;
                spinner.finish_and_clear();

                match result {
                    Ok(response) => {
                        session.record(response.answer.clone());
                        Output::response(&response);
                        Output::checklist(&session.checklist);
                    }
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Ok(())
}
