//! Terminal renderer.
//!
//! Reacts to render and notice intents. It keeps only presentation state
//! (is the reply surface up, is input enabled); the interaction state lives
//! in the controller.

use std::{io::Write, sync::Arc};

use lpbd_shared::time::Clock;

use crate::domain::{Intent, Notice, Render};

use super::{formatter::MessageFormatter, notice::NoticeBoard};

pub struct TerminalRenderer<W: Write> {
    out: W,
    notices: NoticeBoard,
    reply_surface: bool,
    input_enabled: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, clock: Arc<dyn Clock>) -> Self {
        Self {
            out,
            notices: NoticeBoard::new(clock),
            reply_surface: false,
            input_enabled: false,
        }
    }

    pub fn reply_surface_visible(&self) -> bool {
        self.reply_surface
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    /// Apply a batch of intents and redisplay the prompt.
    pub fn apply_all(&mut self, intents: &[Intent]) -> std::io::Result<()> {
        for intent in intents {
            self.apply(intent)?;
        }
        self.redisplay_prompt()
    }

    pub fn apply(&mut self, intent: &Intent) -> std::io::Result<()> {
        match intent {
            Intent::Render(render) => self.render(render),
            Intent::Notify(notice) => {
                self.notices.post(notice.clone());
                write!(self.out, "{}", MessageFormatter::format_notice(notice))
            }
            Intent::Call(call) => {
                tracing::debug!("Renderer skipped call intent {:?}", call);
                Ok(())
            }
        }
    }

    fn render(&mut self, render: &Render) -> std::io::Result<()> {
        let text = match render {
            Render::Bubble(bubble) => MessageFormatter::format_bubble(bubble),
            Render::ReplySurface { visible } => {
                self.reply_surface = *visible;
                MessageFormatter::format_reply_surface(*visible)
            }
            Render::Scene(scene) => MessageFormatter::format_scene(*scene),
            Render::Weather(weather) => MessageFormatter::format_weather(weather),
            Render::ClearConversation => "\n".repeat(2),
            Render::Input { enabled } => {
                self.input_enabled = *enabled;
                String::new()
            }
            Render::Personas(bar) => MessageFormatter::format_persona_bar(bar),
            Render::Counter { count, limit } => MessageFormatter::format_counter(*count, *limit),
        };
        write!(self.out, "{}", text)
    }

    /// Print free-form text such as help or status output.
    pub fn print(&mut self, text: &str) -> std::io::Result<()> {
        write!(self.out, "{}", text)?;
        self.redisplay_prompt()
    }

    /// Drop the notice if its time is up.
    pub fn tick(&mut self) {
        if let Some(notice) = self.notices.expire() {
            tracing::trace!("Notice dismissed: {}", notice.text);
        }
    }

    fn redisplay_prompt(&mut self) -> std::io::Result<()> {
        let prompt = if !self.input_enabled && !self.reply_surface {
            "…> "
        } else {
            "> "
        };
        write!(self.out, "{}", prompt)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
