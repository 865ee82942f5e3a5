//! DOM signal detector.
//!
//! Turns the raw page event stream into semantic capture signals. The pure
//! trigger logic lives in [`DetectorState`]; this wrapper owns the
//! response debounce timer and the outgoing signal channel.
//!
//! Responses stream token-by-token, producing a burst of insertions; the
//! debounce collapses the burst into a single check once generation pauses.

mod events;
mod state;

pub use events::{DomEvent, Signal};
pub use state::DetectorState;

use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time,
};

use crate::config::CaptureConfig;

#[derive(Clone)]
pub struct SignalDetector {
    state: Arc<Mutex<DetectorState>>,
    signals: mpsc::UnboundedSender<Signal>,
    debounce: Arc<Mutex<Option<JoinHandle<()>>>>,
    debounce_delay: Duration,
}

impl SignalDetector {
    /// Creates the detector and the receiving end of its signal stream.
    pub fn new(config: &CaptureConfig) -> (Self, mpsc::UnboundedReceiver<Signal>) {
        let (signals, receiver) = mpsc::unbounded_channel();
        let detector = Self {
            state: Arc::new(Mutex::new(DetectorState::new(
                config.min_prompt_chars,
                config.min_response_chars,
            ))),
            signals,
            debounce: Arc::new(Mutex::new(None)),
            debounce_delay: config.response_debounce,
        };
        (detector, receiver)
    }

    pub async fn handle_event(&self, event: DomEvent) {
        match event {
            DomEvent::Input { value, editable } => {
                self.state.lock().await.observe_input(&value, editable);
            }
            DomEvent::CompositionStart => {
                self.state.lock().await.composition_started();
            }
            DomEvent::CompositionEnd => {
                self.state.lock().await.composition_ended();
            }
            DomEvent::KeyDown { key, shift_key } => {
                if key == "Enter" && !shift_key {
                    self.try_submit().await;
                }
            }
            DomEvent::Click { label, has_icon } => {
                if DetectorState::is_send_control(&label, has_icon) {
                    self.try_submit().await;
                }
            }
            DomEvent::NodeInserted { text } => {
                let is_candidate = self.state.lock().await.is_response_candidate(&text);
                if is_candidate {
                    self.schedule_response_check(text).await;
                }
            }
        }
    }

    /// Overwrites the input buffer after a suggestion selection, so the
    /// injected text does not register as fresh typing.
    pub async fn set_buffer(&self, content: &str) {
        self.state.lock().await.set_buffer(content);
    }

    pub async fn current_buffer(&self) -> String {
        self.state.lock().await.buffer().to_string()
    }

    /// Cancels any in-flight debounce check.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.debounce.lock().await.take() {
            handle.abort();
        }
    }

    async fn try_submit(&self) {
        let submission = self.state.lock().await.take_submission();
        if let Some(content) = submission {
            info!("Prompt submission detected ({} chars)", content.chars().count());
            let _ = self.signals.send(Signal::PromptSubmitted { content });
        }
    }

    /// Cancel-and-restart debounce: only the latest inserted text survives
    /// the burst, and only if it still looks like a response when the page
    /// goes quiet.
    async fn schedule_response_check(&self, text: String) {
        let mut guard = self.debounce.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let signals = self.signals.clone();
        let delay = self.debounce_delay;

        *guard = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            let accepted = state.lock().await.accept_response(&text);
            if accepted {
                info!("Response detected ({} chars)", text.chars().count());
                let _ = signals.send(Signal::ResponseAppeared { content: text });
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> (SignalDetector, mpsc::UnboundedReceiver<Signal>) {
        SignalDetector::new(&CaptureConfig::default())
    }

    async fn type_text(detector: &SignalDetector, text: &str) {
        detector
            .handle_event(DomEvent::Input {
                value: text.to_string(),
                editable: true,
            })
            .await;
    }

    #[tokio::test]
    async fn enter_submits_the_buffer() {
        let (detector, mut rx) = detector();
        type_text(&detector, "explain borrowing").await;
        detector
            .handle_event(DomEvent::KeyDown {
                key: "Enter".into(),
                shift_key: false,
            })
            .await;

        assert_eq!(
            rx.recv().await,
            Some(Signal::PromptSubmitted {
                content: "explain borrowing".into()
            })
        );
        assert_eq!(detector.current_buffer().await, "");
    }

    #[tokio::test]
    async fn shift_enter_does_not_submit() {
        let (detector, mut rx) = detector();
        type_text(&detector, "multi\nline draft").await;
        detector
            .handle_event(DomEvent::KeyDown {
                key: "Enter".into(),
                shift_key: true,
            })
            .await;
        assert!(rx.try_recv().is_err());
        assert_eq!(detector.current_buffer().await, "multi\nline draft");
    }

    #[tokio::test]
    async fn send_button_click_submits_from_buffer() {
        let (detector, mut rx) = detector();
        type_text(&detector, "what are lifetimes").await;
        // Host page already cleared its composer; the buffer is the source.
        detector
            .handle_event(DomEvent::Click {
                label: "Send message".into(),
                has_icon: false,
            })
            .await;

        assert_eq!(
            rx.recv().await,
            Some(Signal::PromptSubmitted {
                content: "what are lifetimes".into()
            })
        );
    }

    #[tokio::test]
    async fn unrelated_click_does_not_submit() {
        let (detector, mut rx) = detector();
        type_text(&detector, "drafting something").await;
        detector
            .handle_event(DomEvent::Click {
                label: "Settings".into(),
                has_icon: false,
            })
            .await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn insertion_burst_collapses_to_latest_text() {
        let (detector, mut rx) = detector();
        let early = "streamed partial answer ".repeat(4);
        let full = "streamed partial answer ".repeat(12);

        detector
            .handle_event(DomEvent::NodeInserted { text: early })
            .await;
        time::sleep(Duration::from_millis(1000)).await;
        detector
            .handle_event(DomEvent::NodeInserted { text: full.clone() })
            .await;

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.recv().await, Some(Signal::ResponseAppeared { content: full }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn short_insertions_are_ignored() {
        let (detector, mut rx) = detector();
        detector
            .handle_event(DomEvent::NodeInserted {
                text: "tooltip".into(),
            })
            .await;
        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rerendered_response_is_not_reemitted() {
        let (detector, mut rx) = detector();
        let answer = "the same long answer text ".repeat(4);

        detector
            .handle_event(DomEvent::NodeInserted { text: answer.clone() })
            .await;
        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.recv().await.is_some());

        detector
            .handle_event(DomEvent::NodeInserted { text: answer })
            .await;
        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn input_echo_is_not_a_response() {
        let (detector, mut rx) = detector();
        let pasted = "a very long pasted prompt that exceeds the response threshold easily";
        type_text(&detector, pasted).await;
        detector
            .handle_event(DomEvent::NodeInserted { text: pasted.into() })
            .await;
        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
