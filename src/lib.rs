pub mod agent;
pub mod cli;
pub mod config;
pub mod decorate;
pub mod history;
pub mod llm;
pub mod models;
pub mod render;
pub mod repl;
pub mod tools;

use agent::{ Assistant, AssistantOptions };
use cli::{ Args, Command };
use config::prompt::{ self, PromptConfig };
use history::create_history_store;
use history::export::ExportWriter;
use llm::chat::new_client as new_chat_client;
use log::info;
use repl::ReplSettings;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

fn load_prompt_config(args: &Args) -> Result<PromptConfig, Box<dyn Error + Send + Sync>> {
    let config = match &args.prompts_path {
        Some(path) =>
            prompt::load_prompts(path).map_err(|e| {
                format!("Failed to load prompts file '{}': {}", path.display(), e)
            })?,
        None => PromptConfig::default(),
    };
    Ok(config.with_history_turns(args.history_turns))
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let command = args.command();

    match &command {
        Command::Pick { options } => {
            println!("{}", repl::pick_for_user(options));
            return Ok(());
        }
        Command::Dilemma => {
            println!("{}", repl::suggest_dilemma());
            return Ok(());
        }
        Command::History => {
            let store = create_history_store(args.memory_path());
            let transcript = store.load().await?;
            if transcript.is_empty() {
                println!("No conversation yet.");
            } else {
                render::print_transcript(&transcript);
            }
            return Ok(());
        }
        Command::Chat | Command::Ask { .. } => {}
    }

    // Everything below talks to the completion service, so configuration must be complete.
    let llm_config = args.llm_config()?;
    let prompt_config = load_prompt_config(&args)?;

    let chat_client = new_chat_client(&llm_config)?;

    info!("--- Core Configuration ---");
    info!("Chat LLM Type: {}", llm_config.llm_type);
    info!("Chat Model: {}", chat_client.get_model());
    info!("Chat Base URL: {}", chat_client.get_base_url().unwrap_or_else(|| "n/a".to_string()));
    info!("Request Timeout: {:?}", llm_config.request_timeout);
    info!("Memory File: {}", args.memory_path().map(|p| p.display().to_string()).unwrap_or_else(|| "none".to_string()));
    info!("Export Dir: {:?}", args.export_dir);
    info!("History Turns In Prompt: {}", prompt_config.history_turns);
    info!("Decorate Replies: {}", !args.no_decorate);
    info!("-------------------------");

    let store = create_history_store(args.memory_path());
    let options = AssistantOptions {
        decorate: !args.no_decorate,
        export: args.export_dir.clone().map(ExportWriter::new),
        ..AssistantOptions::default()
    };
    let mut assistant = Assistant::start(chat_client, store, prompt_config, options).await?;
    let typewriter = Duration::from_millis(args.typewriter_ms);

    match command {
        Command::Ask { text } => {
            let reply = assistant.handle_turn(args.mode, &text.join(" ")).await?;
            repl::print_reply(&reply, typewriter).await?;
            assistant.shutdown();
            Ok(())
        }
        _ => {
            let settings = ReplSettings {
                mode: args.mode,
                typewriter,
                export_dir: args.export_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            };
            repl::run_repl(assistant, settings).await
        }
    }
}
