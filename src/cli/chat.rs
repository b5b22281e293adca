//! Line-based chat in the terminal

use anyhow::Result;
use clap::Args;
use futures::StreamExt;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{app::App, config::Config, session::SessionController};

/// Chat with the model, one line per message
#[derive(Debug, Args)]
pub struct ChatCommand {
    /// Send this message first, then keep reading from stdin
    #[arg(short = 'm', long = "message")]
    pub message: Option<String>,
}

/// A line typed at the chat prompt
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Quit,
    Clear,
    ToggleExtended,
    Empty,
    Message(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => ChatInput::Quit,
            "/clear" => ChatInput::Clear,
            "/extended" => ChatInput::ToggleExtended,
            "" => ChatInput::Empty,
            _ => ChatInput::Message(line),
        }
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let mut app = App::new(config.clone())?;
        app.start_event_loop().await?;
        let mut session = app.new_session();
        session.open_chat();

        eprintln!(
            "Chatting via {}. Commands: /extended, /clear, /quit",
            app.llm_provider().name()
        );

        if let Some(message) = &self.message {
            Self::send(&app, &mut session, message).await?;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            eprint!("> ");
            std::io::stderr().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match ChatInput::parse(&line) {
                ChatInput::Quit => break,
                ChatInput::Empty => continue,
                ChatInput::Clear => {
                    session.clear_chat();
                    eprintln!("History cleared.");
                }
                ChatInput::ToggleExtended => {
                    let enabled = session.toggle_extended_reasoning();
                    eprintln!("Extended reasoning {}.", if enabled { "on" } else { "off" });
                }
                ChatInput::Message(message) => Self::send(&app, &mut session, message).await?,
            }
        }

        debug!("Chat ended with {} turns", session.state().history.len());
        app.shutdown().await
    }

    async fn send(app: &App, session: &mut SessionController, message: &str) -> Result<()> {
        session.set_chat_input(message);
        let Some(ticket) = session.begin_send() else {
            return Ok(());
        };

        let mut stdout = std::io::stdout();
        let mut fragments = ticket.execute(app.chat_client());
        while let Some(fragment) = fragments.next().await {
            write!(stdout, "{}", fragment)?;
            stdout.flush()?;
            session.apply_fragment(ticket.token, &fragment);
        }
        writeln!(stdout)?;
        session.finish_send(ticket.token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_input() {
        assert_eq!(ChatInput::parse("/quit"), ChatInput::Quit);
        assert_eq!(ChatInput::parse(" /exit "), ChatInput::Quit);
        assert_eq!(ChatInput::parse("/clear"), ChatInput::Clear);
        assert_eq!(ChatInput::parse("/extended"), ChatInput::ToggleExtended);
        assert_eq!(ChatInput::parse("   "), ChatInput::Empty);
        assert_eq!(ChatInput::parse("plan a sprint"), ChatInput::Message("plan a sprint"));
    }
}
