/// Pure input-track state: the current buffer, the IME gate and the
/// last-response memory. No timers, no channels; the timer-owning wrapper
/// in `detector::mod` drives this and is the only caller.
#[derive(Debug)]
pub struct DetectorState {
    buffer: String,
    composing: bool,
    last_response: Option<String>,
    min_prompt_chars: usize,
    min_response_chars: usize,
}

impl DetectorState {
    pub fn new(min_prompt_chars: usize, min_response_chars: usize) -> Self {
        Self {
            buffer: String::new(),
            composing: false,
            last_response: None,
            min_prompt_chars,
            min_response_chars,
        }
    }

    /// Refreshes the buffer from an input event. Ignored while an IME
    /// composition is in flight or when the target is not editable.
    pub fn observe_input(&mut self, value: &str, editable: bool) {
        if self.composing || !editable {
            return;
        }
        self.buffer = value.to_string();
    }

    pub fn composition_started(&mut self) {
        self.composing = true;
    }

    pub fn composition_ended(&mut self) {
        self.composing = false;
    }

    /// Takes the buffer as a submitted prompt, clearing it. `None` when the
    /// trimmed buffer is below the capture threshold.
    ///
    /// Submission always reads the buffer, never the triggering element:
    /// host frameworks routinely clear their composer before our handler
    /// runs, so the element's value at trigger time is unreliable.
    pub fn take_submission(&mut self) -> Option<String> {
        if self.buffer.trim().chars().count() < self.min_prompt_chars {
            return None;
        }
        Some(std::mem::take(&mut self.buffer))
    }

    /// Heuristic for "this button sends the prompt": the label mentions
    /// send/submit, is the bare arrow glyph, or the button wraps an svg icon.
    pub fn is_send_control(label: &str, has_icon: bool) -> bool {
        let label = label.to_lowercase();
        label.contains("send") || label.contains("submit") || label.trim() == "↑" || has_icon
    }

    /// Whether an inserted element's text is long enough to be a response
    /// worth debouncing.
    pub fn is_response_candidate(&self, text: &str) -> bool {
        text.chars().count() > self.min_response_chars
    }

    /// Called when the debounce timer fires. Accepts the text unless it is
    /// an echo of the input buffer or a re-render of the last captured
    /// response; remembers accepted text to suppress trivial re-emits.
    pub fn accept_response(&mut self, text: &str) -> bool {
        if text == self.buffer {
            return false;
        }
        if self.last_response.as_deref() == Some(text) {
            return false;
        }
        self.last_response = Some(text.to_string());
        true
    }

    /// Overwrites the buffer after a suggestion selection, so the synthetic
    /// input event the injection fires does not look like fresh typing.
    pub fn set_buffer(&mut self, content: &str) {
        self.buffer = content.to_string();
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DetectorState {
        DetectorState::new(2, 50)
    }

    #[test]
    fn buffer_tracks_editable_input_only() {
        let mut s = state();
        s.observe_input("hello", true);
        assert_eq!(s.buffer(), "hello");
        s.observe_input("clicked a div", false);
        assert_eq!(s.buffer(), "hello");
    }

    #[test]
    fn composition_pauses_buffer_updates() {
        let mut s = state();
        s.observe_input("konn", true);
        s.composition_started();
        s.observe_input("こん", true);
        assert_eq!(s.buffer(), "konn");
        s.composition_ended();
        s.observe_input("こんにちは", true);
        assert_eq!(s.buffer(), "こんにちは");
    }

    #[test]
    fn submission_takes_and_clears_buffer() {
        let mut s = state();
        s.observe_input("explain traits", true);
        assert_eq!(s.take_submission().as_deref(), Some("explain traits"));
        assert_eq!(s.buffer(), "");
        assert_eq!(s.take_submission(), None);
    }

    #[test]
    fn short_buffers_do_not_submit() {
        let mut s = state();
        s.observe_input("x", true);
        assert_eq!(s.take_submission(), None);
        s.observe_input("   ", true);
        assert_eq!(s.take_submission(), None);
    }

    #[test]
    fn send_control_heuristics() {
        assert!(DetectorState::is_send_control("Send message", false));
        assert!(DetectorState::is_send_control("SUBMIT", false));
        assert!(DetectorState::is_send_control("↑", false));
        assert!(DetectorState::is_send_control("", true));
        assert!(!DetectorState::is_send_control("Cancel", false));
    }

    #[test]
    fn response_candidate_threshold() {
        let s = state();
        assert!(!s.is_response_candidate(&"a".repeat(50)));
        assert!(s.is_response_candidate(&"a".repeat(51)));
    }

    #[test]
    fn response_acceptance_filters_echoes_and_rerenders() {
        let mut s = state();
        s.observe_input("typed text", true);
        assert!(!s.accept_response("typed text"));

        assert!(s.accept_response("a long streamed answer"));
        // Trivial re-render of the same text.
        assert!(!s.accept_response("a long streamed answer"));
        // New text is fine again.
        assert!(s.accept_response("a different answer"));
    }

    #[test]
    fn selection_overwrites_buffer() {
        let mut s = state();
        s.observe_input("expl", true);
        s.set_buffer("explain lifetimes in rust");
        assert_eq!(s.buffer(), "explain lifetimes in rust");
    }
}
