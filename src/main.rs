//! Amplify Notes CLI
//!
//! Line-oriented front end over a [`NoteSession`]. Pushed events are
//! applied between commands as they arrive.

use std::error::Error;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use amplify_notes::{ClientConfig, InMemoryBackend, NoteBackend, NoteId, NoteSession};
use rolling_logger::RollingOptions;

const HELP: &str = "\
Commands:
  list                 show notes
  new <text>           add a note
  edit <n>             load note n into the draft
  text <text>          replace the draft text
  submit               add or update from the draft
  clear                empty the draft
  rm <n>               delete note n
  refresh              reload the full list
  logs                 show recent log lines
  quit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    New(String),
    Edit(usize),
    Text(String),
    Submit,
    Clear,
    Remove(usize),
    Refresh,
    Logs,
    Help,
    Quit,
}

/// 1-based list position
fn parse_index(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a note number, got {:?}", arg)),
    }
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (name, rest) = line
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((line, ""));

    match name {
        "" | "list" | "ls" => Ok(Command::List),
        "new" => Ok(Command::New(rest.to_string())),
        "edit" => parse_index(rest).map(Command::Edit),
        "text" => Ok(Command::Text(rest.to_string())),
        "submit" => Ok(Command::Submit),
        "clear" => Ok(Command::Clear),
        "rm" | "delete" => parse_index(rest).map(Command::Remove),
        "refresh" => Ok(Command::Refresh),
        "logs" => Ok(Command::Logs),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command {:?} (try help)", other)),
    }
}

fn render<B: NoteBackend>(session: &NoteSession<B>) {
    let state = session.state();
    if state.is_error {
        println!("Something went wrong ...");
    }
    if state.is_loading {
        println!("Loading ...");
    }

    if state.notes.is_empty() {
        println!("(no notes)");
    }
    for (i, note) in state.notes.iter().enumerate() {
        println!("{:>3}. {}", i + 1, note.text);
    }

    if !state.draft.is_empty() {
        println!("draft: {:?} [{}]", state.draft.text, state.submit_label());
    }
}

fn nth_id<B: NoteBackend>(session: &NoteSession<B>, n: usize) -> Option<NoteId> {
    session.notes().as_slice().get(n - 1).map(|note| note.id.clone())
}

async fn execute<B: NoteBackend>(session: &mut NoteSession<B>, command: Command) {
    let result = match command {
        Command::List => Ok(()),
        Command::New(text) => {
            session.clear_draft();
            session.edit_text(text);
            session.submit().await.map(|_| ())
        }
        Command::Edit(n) => match nth_id(session, n) {
            Some(id) => {
                session.select_for_edit(&id);
                Ok(())
            }
            None => {
                println!("no note {}", n);
                return;
            }
        },
        Command::Text(text) => {
            session.edit_text(text);
            Ok(())
        }
        Command::Submit => session.submit().await.map(|_| ()),
        Command::Clear => {
            session.clear_draft();
            Ok(())
        }
        Command::Remove(n) => match nth_id(session, n) {
            Some(id) => session.delete(&id).await,
            None => {
                println!("no note {}", n);
                return;
            }
        },
        Command::Refresh => session.refresh().await,
        Command::Logs => {
            for line in rolling_logger::recent_lines(20) {
                println!("{}", line);
            }
            return;
        }
        Command::Help => {
            println!("{}", HELP);
            return;
        }
        Command::Quit => return,
    };

    if let Err(e) = result {
        println!("{}", e);
    }
    render(session);
}

async fn run_session<B: NoteBackend>(backend: B) -> Result<(), Box<dyn Error>> {
    let mut session = NoteSession::new(backend);
    if let Err(e) = session.start().await {
        println!("{}", e);
    }
    render(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => execute(&mut session, command).await,
                    Err(e) => println!("{}", e),
                }
            }
            Some(event) = session.next_event(), if session.is_subscribed() => {
                tracing::debug!(event = ?event, "Pushed event applied");
                render(&session);
            }
        }
    }

    session.shutdown();
    let _ = rolling_logger::info("Client stopped");
    Ok(())
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ClientConfig::load(config_path.as_deref())?;

    rolling_logger::init_logger_with(
        config.log_dir(),
        "AmplifyNotes",
        rolling_logger::parse_level(&config.log_level),
        RollingOptions::default(),
    )?;
    let _ = rolling_logger::info("Client starting");

    if config.endpoint.is_some() {
        let backend = config.graphql_backend()?;
        println!("Connected to {}", backend.endpoint());
        run_session(backend).await
    } else {
        let owner = config.owner.clone().unwrap_or_else(|| "local".to_string());
        println!("No endpoint configured; notes for {} are kept in memory", owner);
        run_session(InMemoryBackend::new(owner)).await
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  "), Ok(Command::List));
        assert_eq!(parse_command("new  buy milk "), Ok(Command::New("buy milk".to_string())));
        assert_eq!(parse_command("edit 2"), Ok(Command::Edit(2)));
        assert_eq!(parse_command("rm 1"), Ok(Command::Remove(1)));
        assert_eq!(parse_command("text"), Ok(Command::Text(String::new())));
        assert_eq!(parse_command("refresh"), Ok(Command::Refresh));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_command("edit 0").is_err());
        assert!(parse_command("rm x").is_err());
        assert!(parse_command("frobnicate").is_err());
    }
}
