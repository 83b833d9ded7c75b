//! Text rendering of the showcase screen.
//!
//! [`TerminalDisplay`] keeps the same fields the OLED panel has and prints one
//! status line per flush:
//!
//! ```text
//! >TPL0102 2251.8 | MCP4011 0.0 | MCP4013 0.0 || Rot: Inc  Tap: 6  Chan: A
//! ```

use crate::display::{DisplaySink, DrawCommand, Field, NO_DIRECTION};
use std::collections::BTreeMap;
use std::io::Write;

pub struct TerminalDisplay<W: Write> {
    out: W,
    labels: BTreeMap<usize, String>,
    values: BTreeMap<usize, String>,
    highlighted: Option<usize>,
    tap: String,
    channel: String,
    direction: String,
}

impl TerminalDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            labels: BTreeMap::new(),
            values: BTreeMap::new(),
            highlighted: None,
            tap: String::new(),
            channel: String::new(),
            direction: NO_DIRECTION.to_string(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// The line the next flush would print.
    pub fn render_line(&self) -> String {
        let rows: Vec<String> = self
            .labels
            .iter()
            .map(|(i, label)| {
                let marker = if self.highlighted == Some(*i) { ">" } else { " " };
                let value = self.values.get(i).map(String::as_str).unwrap_or("");
                format!("{marker}{label} {value}")
            })
            .collect();
        format!(
            "{} || Rot: {}  Tap: {}  Chan: {}",
            rows.join(" |"),
            self.direction,
            self.tap,
            self.channel
        )
    }
}

impl<W: Write> DisplaySink for TerminalDisplay<W> {
    fn draw(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::Label(i, label) => {
                self.labels.insert(i, label);
            }
            DrawCommand::Text(Field::Value(i), text) => {
                self.values.insert(i, text);
            }
            DrawCommand::Text(Field::Tap, text) => self.tap = text,
            DrawCommand::Text(Field::Channel, text) => self.channel = text,
            DrawCommand::Text(Field::Direction, text) => self.direction = text,
            DrawCommand::Highlight(i, true) => self.highlighted = Some(i),
            DrawCommand::Highlight(i, false) => {
                if self.highlighted == Some(i) {
                    self.highlighted = None;
                }
            }
        }
    }

    fn flush(&mut self) {
        let line = self.render_line();
        if let Err(err) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            tracing::warn!(error = %err, "display write failed");
        }
    }
}
