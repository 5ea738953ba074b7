//! Presentation adapter seam.

use serde::{Deserialize, Serialize};

use crate::clock::EngineState;
use crate::error::InputError;
use crate::events::Event;
use crate::input::InputForm;

/// What a front end draws on each tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub state: EngineState,
    /// `HH:MM:SS` in clock mode, `00:MM:SS` while counting down.
    pub display: String,
    pub alarm_indicator: bool,
    /// Armed alarm as `HH:MM`, for a tooltip.
    pub alarm_label: Option<String>,
}

/// Renders engine output. Implementations never touch engine state.
pub trait Presenter {
    fn render(&mut self, frame: &Frame);

    /// A form opened; show its fields with the pre-filled values.
    fn prompt(&mut self, form: &InputForm);

    /// The last entry was refused; clear and refocus the named field.
    fn reject(&mut self, error: &InputError);

    /// Any other event, e.g. to echo an expiry message.
    fn notice(&mut self, _event: &Event) {}
}

/// Keeps everything it is shown.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub frames: Vec<Frame>,
    pub prompts: Vec<InputForm>,
    pub rejections: Vec<InputError>,
    pub notices: Vec<Event>,
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }

    fn prompt(&mut self, form: &InputForm) {
        self.prompts.push(*form);
    }

    fn reject(&mut self, error: &InputError) {
        self.rejections.push(error.clone());
    }

    fn notice(&mut self, event: &Event) {
        self.notices.push(event.clone());
    }
}
