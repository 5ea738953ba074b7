//! Terminal presentation adapter.
//!
//! Redraws the display in place on one line. Prompts and messages go on
//! their own lines.

use std::io::Write;

use deskclock_core::{Event, FormKind, Frame, InputError, InputForm, Presenter};
use tracing::warn;

const HELP: &str =
    "t: timer (MM:SS)   a: alarm (HH:MM)   enter: accept [default]   s: stop   esc: cancel/quit   q: quit";

pub struct TerminalPresenter<W: Write> {
    out: W,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn help(&mut self) {
        self.write(&format!("{HELP}\n"));
    }

    /// Leave the cursor on a fresh line.
    pub fn finish(&mut self) {
        self.write("\n");
    }

    fn write(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "terminal write failed");
        }
    }
}

/// Single status line for a frame.
pub fn status_line(frame: &Frame) -> String {
    match &frame.alarm_label {
        Some(label) if frame.alarm_indicator => format!("{}  [alarm {}]", frame.display, label),
        _ => frame.display.clone(),
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, frame: &Frame) {
        self.write(&format!("\r\x1b[2K{}", status_line(frame)));
    }

    fn prompt(&mut self, form: &InputForm) {
        let what = match form.kind {
            FormKind::Timer => "timer",
            FormKind::Alarm => "alarm",
        };
        self.write(&format!(
            "\n{what} {} [{}]: ",
            form.kind.label(),
            form.placeholder()
        ));
    }

    fn reject(&mut self, error: &InputError) {
        match error.field() {
            Some(field) => self.write(&format!("\n{error} (re-enter {field})")),
            None => self.write(&format!("\n{error}")),
        }
    }

    fn notice(&mut self, event: &Event) {
        if let Event::Expired { message, .. } = event {
            self.write(&format!("\n{message}\n"));
        }
    }
}
