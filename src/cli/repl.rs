//! Interactive REPL for Aura
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::agent::persona::{NAME, TAGLINE};
use crate::agent::{ConversationManager, SubmitOutcome};
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::config::API_KEY_URL;
use crate::core::{Config, ImageAttachment, Result};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    manager: ConversationManager,
}

impl Repl {
    /// Create a new REPL with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(Config::load())
    }

    /// Create a REPL with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            manager: ConversationManager::with_gemini(config)?,
        })
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.manager) {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Clear) => {
                    println!("Chat cleared. Your conversation has been reset.\n");
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                }
                Ok(CommandResult::Continue(text)) => {
                    let outcome = self.ask(&text, None).await;
                    report(outcome);
                }
                Ok(CommandResult::Attach { image, text }) => {
                    let outcome = self.ask(&text, Some(image)).await;
                    report(outcome);
                }
                Ok(CommandResult::Example(prompt)) => {
                    println!("You: {}", prompt);
                    print_thinking();
                    let outcome = self.manager.submit_example(prompt).await;
                    report(outcome);
                }
                Err(e) => {
                    eprintln!("{}: {}\n", e.title(), e);
                }
            }
        }

        Ok(())
    }

    /// Submit one message and wait for the reply
    pub async fn ask(
        &mut self,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Result<SubmitOutcome> {
        print_thinking();
        self.manager.submit(text, image).await
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.manager.config();

        println!();
        println!("  🌱 {} - {}", NAME, TAGLINE);
        println!("  Welcome to your AI sustainability guide.");
        println!("  Ask anything about eco-friendly living, or attach a photo");
        println!("  of a product for sustainability insights.");
        println!();
        println!("Model:      {}", config.gemini.model);
        println!("History:    {} turns", config.conversation.max_history);

        if !config.is_api_configured() {
            println!();
            println!("⚠️  Developer Setup Required: set GOOGLE_AI_API_KEY or gemini.api_key in");
            println!("   {}", Config::config_file().display());
            println!("   Get your API key from Google AI Studio: {}", API_KEY_URL);
        }

        println!();
        println!("Commands: help, examples, clear, status, exit");
        println!("────────────────────────────────────────────────────────────");
    }
}

fn print_thinking() {
    println!("{} is thinking...", NAME);
}

/// Print a reply or a transient error notice. Errors never end the session.
fn report(outcome: Result<SubmitOutcome>) {
    match outcome {
        Ok(SubmitOutcome::Replied(turn)) => println!("\n{}:\n{}\n", NAME, turn.text),
        Ok(SubmitOutcome::Ignored) => {}
        Err(e) => eprintln!("\n{}: {}\n", e.title(), e),
    }
}
