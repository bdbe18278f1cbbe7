//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::persona::{self, EXAMPLE_PROMPTS};
use crate::agent::ConversationManager;
use crate::core::config::API_KEY_URL;
use crate::core::{ImageAttachment, Result};

/// Result of parsing a command
pub enum CommandResult {
    /// Submit as normal chat input
    Continue(String),
    /// Submit a starter prompt (credential checked before anything is appended)
    Example(&'static str),
    /// Submit text with an attached image
    Attach {
        image: ImageAttachment,
        text: String,
    },
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
}

/// Parse and handle special commands.
///
/// `/name args` is always a command; a bare `name` only when it is the whole
/// input.
pub fn handle_command(input: &str, manager: &mut ConversationManager) -> Result<CommandResult> {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].trim_start_matches('/').to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    // Bare words only count as commands on their own; "help me recycle" is chat
    if !input.starts_with('/') && !args.is_empty() {
        return Ok(CommandResult::Continue(input.to_string()));
    }

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "clear" | "reset" => {
            manager.clear();
            Ok(CommandResult::Clear)
        }

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "status" => {
            let config = manager.config();
            let status = format!(
                "Aura Status:\n\
                 ─────────────────────────────\n\
                 Service:  {}\n\
                 Model:    {}\n\
                 API key:  {}\n\
                 History:  {} / {} turns\n\
                 State:    {:?}",
                manager.service_name(),
                config.gemini.model,
                if config.is_api_configured() {
                    "configured"
                } else {
                    "missing"
                },
                manager.len(),
                manager.conversation().max_length(),
                manager.state(),
            );
            Ok(CommandResult::Handled(status))
        }

        "examples" => Ok(CommandResult::Handled(examples_text())),

        "example" => {
            if args.is_empty() {
                return Ok(CommandResult::Example(persona::random_example().prompt));
            }
            match args.parse::<usize>().ok().and_then(persona::example) {
                Some(example) => Ok(CommandResult::Example(example.prompt)),
                None => Ok(CommandResult::Handled(format!(
                    "Unknown example: {}. Pick 1-{}.",
                    args,
                    EXAMPLE_PROMPTS.len()
                ))),
            }
        }

        "image" | "img" => {
            if args.is_empty() {
                return Ok(CommandResult::Handled(
                    "Usage: /image <path> [question]\n\
                     Example:\n\
                       /image ./bottle.jpg Is this recyclable?"
                        .to_string(),
                ));
            }
            let mut image_args = args.splitn(2, ' ');
            let path = image_args.next().unwrap_or_default();
            let text = image_args.next().map(str::trim).unwrap_or("").to_string();

            let image = ImageAttachment::from_path(path)?;
            Ok(CommandResult::Attach { image, text })
        }

        "key" => {
            let output = match webbrowser::open(API_KEY_URL) {
                Ok(()) => format!("Opened {} in your browser.", API_KEY_URL),
                Err(_) => format!("Get your API key from {}", API_KEY_URL),
            };
            Ok(CommandResult::Handled(output))
        }

        "config" => Ok(CommandResult::Handled(manager.config().to_display_toml()?)),

        _ => {
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Generate help text
fn help_text() -> String {
    r#"Aura Commands:
─────────────────────────────────────────────
  help, ?                Show this help message
  exit, quit, q          Exit Aura
  clear, reset           Clear the conversation
  status                 Show current configuration
  examples               List starter prompts
  /example [N]           Ask starter prompt N (random if omitted)
  /image <path> [text]   Ask about a photo (png, jpeg, webp, gif, heic)
  key                    Open the page where you get an API key
  config                 Show the effective configuration (key masked)

Commands with arguments need the leading '/'.
Anything else is sent to Aura.

Keyboard Shortcuts:
  Ctrl+D           Exit Aura
─────────────────────────────────────────────"#
        .to_string()
}

/// List the starter prompts
fn examples_text() -> String {
    let mut output = String::from("Try one of these (type '/example N'):\n\n");
    for (i, example) in EXAMPLE_PROMPTS.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {}\n     {}\n",
            i + 1,
            example.title,
            example.prompt
        ));
    }
    output
}
