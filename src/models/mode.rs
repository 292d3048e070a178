use std::fmt;
use std::str::FromStr;

/// Substrings that mark a message as a question or decision in auto-detect mode.
/// Matched case-insensitively against the whole message.
pub const AUTO_DETECT_TRIGGERS: [&str; 6] = ["?", "should", "what", "how", "do i", "can i"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    AutoDetect,
    DecisionHelper,
    AdviceGiver,
    CreativeIdeas,
    GeneralChat,
}

/// The task template a message ends up using once auto-detection has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    DecisionHelper,
    AdviceGiver,
    CreativeIdeas,
    GeneralChat,
    Question,
    OpenEnded,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::DecisionHelper,
        TemplateKind::AdviceGiver,
        TemplateKind::CreativeIdeas,
        TemplateKind::GeneralChat,
        TemplateKind::Question,
        TemplateKind::OpenEnded,
    ];

    /// Key used for this template in a prompts file.
    pub fn key(&self) -> &'static str {
        match self {
            TemplateKind::DecisionHelper => "decision_helper",
            TemplateKind::AdviceGiver => "advice_giver",
            TemplateKind::CreativeIdeas => "creative_ideas",
            TemplateKind::GeneralChat => "general_chat",
            TemplateKind::Question => "question",
            TemplateKind::OpenEnded => "open_ended",
        }
    }
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::AutoDetect,
        Mode::DecisionHelper,
        Mode::AdviceGiver,
        Mode::CreativeIdeas,
        Mode::GeneralChat,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::AutoDetect => "Auto Detect",
            Mode::DecisionHelper => "Decision Helper",
            Mode::AdviceGiver => "Advice Giver",
            Mode::CreativeIdeas => "Creative Ideas",
            Mode::GeneralChat => "General Chat",
        }
    }

    pub fn resolve(&self, user_text: &str) -> TemplateKind {
        match self {
            Mode::DecisionHelper => TemplateKind::DecisionHelper,
            Mode::AdviceGiver => TemplateKind::AdviceGiver,
            Mode::CreativeIdeas => TemplateKind::CreativeIdeas,
            Mode::GeneralChat => TemplateKind::GeneralChat,
            Mode::AutoDetect => {
                if looks_like_question(user_text) {
                    TemplateKind::Question
                } else {
                    TemplateKind::OpenEnded
                }
            }
        }
    }
}

pub fn looks_like_question(user_text: &str) -> bool {
    let lowered = user_text.to_lowercase();
    AUTO_DETECT_TRIGGERS.iter().any(|trigger| lowered.contains(trigger))
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseModeError {
    message: String,
}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "auto" | "auto detect" | "autodetect" => Ok(Mode::AutoDetect),
            "decision" | "decision helper" => Ok(Mode::DecisionHelper),
            "advice" | "advice giver" => Ok(Mode::AdviceGiver),
            "creative" | "creative ideas" | "ideas" => Ok(Mode::CreativeIdeas),
            "chat" | "general chat" | "general" => Ok(Mode::GeneralChat),
            _ =>
                Err(ParseModeError {
                    message: format!(
                        "Invalid mode: '{}' (expected auto, decision, advice, creative or chat)",
                        s
                    ),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_short_names() {
        assert_eq!("Auto Detect".parse::<Mode>().unwrap(), Mode::AutoDetect);
        assert_eq!("decision-helper".parse::<Mode>().unwrap(), Mode::DecisionHelper);
        assert_eq!("ADVICE".parse::<Mode>().unwrap(), Mode::AdviceGiver);
        assert_eq!("creative_ideas".parse::<Mode>().unwrap(), Mode::CreativeIdeas);
        assert_eq!(" chat ".parse::<Mode>().unwrap(), Mode::GeneralChat);
        assert!("poetry".parse::<Mode>().is_err());
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.label().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn fixed_modes_ignore_the_text() {
        assert_eq!(Mode::DecisionHelper.resolve("hello"), TemplateKind::DecisionHelper);
        assert_eq!(Mode::GeneralChat.resolve("should I?"), TemplateKind::GeneralChat);
    }

    #[test]
    fn auto_detect_matches_triggers_case_insensitively() {
        assert_eq!(Mode::AutoDetect.resolve("Should I take this job?"), TemplateKind::Question);
        assert_eq!(Mode::AutoDetect.resolve("WHAT a day"), TemplateKind::Question);
        assert_eq!(Mode::AutoDetect.resolve("Can I borrow it"), TemplateKind::Question);
        assert_eq!(Mode::AutoDetect.resolve("tell me a fun fact"), TemplateKind::OpenEnded);
    }

    #[test]
    fn auto_detect_is_plain_substring_containment() {
        assert_eq!(Mode::AutoDetect.resolve("I did it somehow"), TemplateKind::Question);
        assert_eq!(Mode::AutoDetect.resolve("just do it"), TemplateKind::Question);
        assert_eq!(Mode::AutoDetect.resolve("pasta tonight"), TemplateKind::OpenEnded);
    }
}
