use std::io::{ self, Write };
use std::time::Duration;

use crate::models::chat::{ ChatMessage, Role, Transcript };

pub const ASSISTANT_NAME: &str = "Constantine";
const RULE: &str = "────────────────────────────────────────";

pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => ASSISTANT_NAME,
    }
}

pub fn format_message(message: &ChatMessage) -> String {
    format!("{}:\n{}", speaker(message.role), message.content)
}

pub fn banner(greeting: &str) -> String {
    format!("🧠 Constantine AI Assistant\n{}\n{}", greeting, RULE)
}

pub fn print_transcript(transcript: &Transcript) {
    for message in transcript.messages() {
        println!("{}\n", format_message(message));
    }
}

pub fn print_rule() {
    println!("{}", RULE);
}

/// Prints the reply one character at a time; a zero delay prints it at once.
pub async fn typewriter(text: &str, delay: Duration) -> io::Result<()> {
    let mut stdout = io::stdout();
    if delay.is_zero() {
        writeln!(stdout, "{}", text)?;
        return stdout.flush();
    }
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        stdout.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
        stdout.flush()?;
        tokio::time::sleep(delay).await;
    }
    writeln!(stdout)?;
    stdout.flush()
}
