use rand::seq::SliceRandom;
use rand::Rng;

pub const SYMBOL_PALETTE: [&str; 9] = ["💡", "😄", "🤖", "🧠", "✨", "✅", "📌", "📚", "👍"];

/// Prefixes every non-blank line with a random palette symbol. Blank lines pass through.
pub fn decorate_with<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                return line.to_string();
            }
            let symbol = SYMBOL_PALETTE.choose(rng).copied().unwrap_or(SYMBOL_PALETTE[0]);
            format!("{} {}", symbol, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
