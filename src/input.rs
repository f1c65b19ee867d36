//! Pointer capture and repaint requests, decoupled from any UI toolkit.

use egui::Modifiers;

/// Capabilities a tool needs from the host's input layer.
///
/// Tools capture the pointer for the duration of a multi-click gesture and
/// must release it on every exit path, commit or cancel.
pub trait InputService {
    fn capture(&mut self);
    fn release(&mut self);
    fn redraw(&mut self);
    fn is_captured(&self) -> bool;
}

/// Input service for headless use and tests: remembers capture state and
/// counts repaint requests, nothing else.
#[derive(Debug, Clone, Default)]
pub struct HeadlessInput {
    captured: bool,
    redraws: usize,
}

impl HeadlessInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redraw_count(&self) -> usize {
        self.redraws
    }
}

impl InputService for HeadlessInput {
    fn capture(&mut self) {
        self.captured = true;
    }

    fn release(&mut self) {
        self.captured = false;
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }

    fn is_captured(&self) -> bool {
        self.captured
    }
}

/// True if every key in `required` is held in `modifier`.
///
/// An empty `required` set never matches, so a modifier setting of
/// `Modifiers::NONE` disables the feature it guards.
pub fn is_held(modifier: Modifiers, required: Modifiers) -> bool {
    if required.is_none() {
        return false;
    }
    (!required.alt || modifier.alt)
        && (!required.ctrl || modifier.ctrl)
        && (!required.shift || modifier.shift)
        && (!required.command || modifier.command)
        && (!required.mac_cmd || modifier.mac_cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_held() {
        assert!(is_held(Modifiers::SHIFT, Modifiers::SHIFT));
        assert!(is_held(Modifiers::SHIFT | Modifiers::CTRL, Modifiers::CTRL));
        assert!(!is_held(Modifiers::CTRL, Modifiers::SHIFT));
        assert!(!is_held(Modifiers::CTRL, Modifiers::NONE));
    }

    #[test]
    fn test_headless_input_tracks_capture_and_redraws() {
        let mut input = HeadlessInput::new();
        input.capture();
        input.redraw();
        input.redraw();
        assert!(input.is_captured());
        input.release();
        assert!(!input.is_captured());
        assert_eq!(input.redraw_count(), 2);
    }
}
