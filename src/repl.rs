use chrono::Local;
use log::{ error, info };
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{ AsyncBufReadExt, BufReader };

use crate::agent::{ AgentError, Assistant, TurnReply };
use crate::history::export::ExportWriter;
use crate::models::mode::Mode;
use crate::render;
use crate::tools;

pub const HELP: &str = "Commands:
  /mode [name]      show or switch mode (auto, decision, advice, creative, chat)
  /modes            list modes
  /pick a, b, c     let me pick one for you
  /dilemma          suggest a random dilemma
  /history          print the conversation so far
  /export           write the conversation to a text file
  /help             this help
  /quit             leave (Ctrl-D works too)
Anything else is sent to the assistant.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Say(String),
    ShowMode,
    SetMode(Mode),
    Modes,
    Pick(String),
    Dilemma,
    History,
    Export,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ReplCommand::Say(trimmed.to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name.to_lowercase().as_str() {
        "mode" if arg.is_empty() => ReplCommand::ShowMode,
        "mode" =>
            match arg.parse::<Mode>() {
                Ok(mode) => ReplCommand::SetMode(mode),
                Err(e) => ReplCommand::Invalid(e.to_string()),
            }
        "modes" => ReplCommand::Modes,
        "pick" => ReplCommand::Pick(arg.to_string()),
        "dilemma" | "random" => ReplCommand::Dilemma,
        "history" => ReplCommand::History,
        "export" => ReplCommand::Export,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("Unknown command '/{}' (try /help)", other)),
    }
}

pub struct ReplSettings {
    pub mode: Mode,
    pub typewriter: Duration,
    pub export_dir: PathBuf,
}

pub async fn print_reply(reply: &TurnReply, typewriter: Duration) -> std::io::Result<()> {
    println!("{}:", render::ASSISTANT_NAME);
    render::typewriter(&reply.content, typewriter).await?;
    if let Some(e) = &reply.persist_error {
        eprintln!("⚠️  Could not save the conversation ({}). It is kept in memory for this session.", e);
    }
    if let Some(path) = &reply.export_path {
        println!("📥 Exported to {}", path.display());
    }
    if let Some(e) = &reply.export_error {
        eprintln!("⚠️  Could not write the export ({}).", e);
    }
    Ok(())
}

pub fn pick_for_user(input: &str) -> String {
    let options = tools::parse_options(input);
    match tools::pick_one(&options, &mut rand::thread_rng()) {
        Ok(choice) => format!("✅ I pick: {}", choice),
        Err(e) => format!("⚠️  {}", e),
    }
}

pub fn suggest_dilemma() -> String {
    format!("🎲 Try this dilemma: {}", tools::random_dilemma(&mut rand::thread_rng()))
}

pub async fn run_repl(
    mut assistant: Assistant,
    settings: ReplSettings
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut mode = settings.mode;
    println!("{}", render::banner(tools::random_greeting(&mut rand::thread_rng())));
    render::print_transcript(assistant.transcript());
    println!("Mode: {}. Type /help for commands.", mode);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_line(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Say(text) => {
                match assistant.handle_turn(mode, &text).await {
                    Ok(reply) => print_reply(&reply, settings.typewriter).await?,
                    Err(AgentError::EmptyInput) => {}
                    Err(e) => {
                        error!("Turn failed: {}", e);
                        eprintln!("⚠️  {}", e);
                    }
                }
                render::print_rule();
            }
            ReplCommand::ShowMode => println!("Mode: {}", mode),
            ReplCommand::SetMode(next) => {
                info!("Mode changed from {} to {}", mode, next);
                mode = next;
                println!("Mode: {}", mode);
            }
            ReplCommand::Modes => {
                for m in Mode::ALL {
                    let marker = if m == mode { "*" } else { " " };
                    println!("{} {}", marker, m);
                }
            }
            ReplCommand::Pick(input) => println!("{}", pick_for_user(&input)),
            ReplCommand::Dilemma => println!("{}", suggest_dilemma()),
            ReplCommand::History => render::print_transcript(assistant.transcript()),
            ReplCommand::Export => {
                let writer = ExportWriter::new(&settings.export_dir);
                match assistant.export(&writer, Local::now()).await {
                    Ok(Some(path)) => println!("📥 Exported to {}", path.display()),
                    Ok(None) => println!("Nothing to export yet."),
                    Err(e) => eprintln!("⚠️  Export failed: {}", e),
                }
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => break,
            ReplCommand::Invalid(msg) => eprintln!("⚠️  {}", msg),
        }
    }

    assistant.shutdown();
    Ok(())
}
