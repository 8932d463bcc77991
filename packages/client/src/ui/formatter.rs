//! Message formatting utilities for terminal display.

use lpbd_shared::time::rfc3339_to_local_clock;

use crate::domain::{
    Bubble, CHAR_DANGER_ABOVE, CHAR_WARNING_ABOVE, ClientSession, MAX_MESSAGE_CHARS, Notice,
    NoticeLevel, PersonaBar, Scene, Speaker,
};

const RULE: &str = "------------------------------------------------------------";

/// Character counter band for typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharBand {
    Normal,
    /// More than [`CHAR_WARNING_ABOVE`] characters.
    Warning,
    /// More than [`CHAR_DANGER_ABOVE`] characters.
    Danger,
}

impl CharBand {
    pub fn for_len(len: usize) -> Self {
        if len > CHAR_DANGER_ABOVE {
            CharBand::Danger
        } else if len > CHAR_WARNING_ABOVE {
            CharBand::Warning
        } else {
            CharBand::Normal
        }
    }
}

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one speech bubble
    ///
    /// # Arguments
    ///
    /// * `bubble` - Who said what, plus the backend timestamp when known
    ///
    /// # Returns
    ///
    /// A formatted block starting and ending with a newline
    pub fn format_bubble(bubble: &Bubble) -> String {
        match &bubble.speaker {
            Speaker::Visitor => format!("\n  you > {}\n", bubble.text),
            Speaker::Bouncer => format!("\n[BOUNCER] {}\n", bubble.text),
            Speaker::Agent(agent) => {
                let time = bubble
                    .timestamp
                    .as_deref()
                    .and_then(rfc3339_to_local_clock)
                    .map(|t| format!(" ({})", t))
                    .unwrap_or_default();
                format!(
                    "\n{}\n[{}]{} {}\n{}\n",
                    RULE,
                    agent.to_uppercase(),
                    time,
                    bubble.text,
                    RULE
                )
            }
        }
    }

    pub fn format_notice(notice: &Notice) -> String {
        let marker = match notice.level {
            NoticeLevel::Info => "·",
            NoticeLevel::Success => "✓",
            NoticeLevel::Warning => "!",
            NoticeLevel::Error => "✗",
        };
        format!("{} {}\n", marker, notice.text)
    }

    /// Format the persona bar: `>NAME<` is selected, `(name)` is muted
    pub fn format_persona_bar(bar: &PersonaBar) -> String {
        let entries: Vec<String> = bar
            .available
            .iter()
            .map(|persona| {
                if bar.muted.contains(persona) {
                    format!("({} muted)", persona.as_str())
                } else if bar.selected == Some(*persona) {
                    format!(">{}<", persona.tag())
                } else {
                    persona.tag()
                }
            })
            .collect();
        format!("At the bar: {}\n", entries.join("  "))
    }

    pub fn format_char_count(len: usize) -> String {
        let band = match CharBand::for_len(len) {
            CharBand::Normal => "",
            CharBand::Warning => " (getting long)",
            CharBand::Danger => " (almost at the limit)",
        };
        format!("{}/{}{}\n", len, MAX_MESSAGE_CHARS, band)
    }

    pub fn format_counter(count: u32, limit: u32) -> String {
        format!("Messages: {}/{}\n", count, limit)
    }

    pub fn format_scene(scene: Scene) -> String {
        match scene {
            Scene::Exterior => "\nYou're outside Le Pale Blue Dot. A bouncer leans by the door.\n"
                .to_string(),
            Scene::Interior => {
                format!("\n{}\nYou step inside Le Pale Blue Dot.\n{}\n", RULE, RULE)
            }
        }
    }

    pub fn format_weather(weather: &str) -> String {
        format!("Through the window: {}\n", weather)
    }

    pub fn format_reply_surface(visible: bool) -> String {
        if visible {
            "(answer the bouncer)\n".to_string()
        } else {
            String::new()
        }
    }

    /// Where the visitor is, plus the notice still on the board if any.
    pub fn format_status(session: &ClientSession, notice: Option<&Notice>) -> String {
        let mut output = String::new();
        output.push_str(&format!("Identity: {}\n", session.anonymous_id.as_str()));
        output.push_str(&format!("Where: {}\n", session.phase.describe()));
        if let Some(session_id) = session.session_id() {
            output.push_str(&format!("Session: {}\n", session_id.as_str()));
            output.push_str(&Self::format_counter(
                session.message_count,
                session.message_limit,
            ));
        }
        if let Some(selected) = session.selected_persona {
            output.push_str(&format!("Talking to: {}\n", selected.tag()));
        }
        if let Some(notice) = notice {
            output.push_str(&format!("Notice: {}\n", notice.text));
        }
        output
    }

    pub fn format_help() -> String {
        [
            "Commands:",
            "  /knock            knock on the door and talk to the bouncer",
            "  /enter            step inside once the door is open",
            "  /select <name>    address a persona (again to clear)",
            "  /deselect         clear the persona selection",
            "  /personas         show who is at the bar",
            "  /status           show where you are",
            "  /reset            forget your identity and start over",
            "  /quit             leave",
            "Anything else is said out loud.",
            "",
        ]
        .join("\n")
    }
}
