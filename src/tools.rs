//! Decision mini-tools: pick one of the user's options, or suggest a dilemma.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

pub const SAMPLE_DILEMMAS: [&str; 5] = [
    "Pizza or Burger",
    "Study or Nap",
    "Go Out or Stay In",
    "Read or Watch",
    "Cat or Dog",
];

pub const GREETINGS: [&str; 4] = [
    "Hi there!",
    "Welcome!",
    "Hello, I’m Constantine, your smart assistant!",
    "Ready to decide smartly?",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Please enter at least two choices.")]
    NotEnoughOptions {
        given: usize,
    },
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_options(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|opt| !opt.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn pick_one<'a, S, R>(options: &'a [S], rng: &mut R) -> Result<&'a str, ToolError>
    where S: AsRef<str>, R: Rng + ?Sized
{
    if options.len() < 2 {
        return Err(ToolError::NotEnoughOptions { given: options.len() });
    }
    options
        .choose(rng)
        .map(|opt| opt.as_ref())
        .ok_or(ToolError::NotEnoughOptions { given: options.len() })
}

pub fn random_dilemma<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    SAMPLE_DILEMMAS.choose(rng).copied().unwrap_or(SAMPLE_DILEMMAS[0])
}

pub fn random_greeting<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    GREETINGS.choose(rng).copied().unwrap_or(GREETINGS[0])
}
