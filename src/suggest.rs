use log::warn;

use crate::{
    config::CaptureConfig,
    detector::SignalDetector,
    models::CaptureRecord,
    service::StoreHandle,
};

/// Autocomplete over previously captured prompts.
///
/// Query failures degrade to "no suggestions"; nothing in this path may
/// disturb the host page.
#[derive(Clone)]
pub struct SuggestionService {
    store: StoreHandle,
    detector: SignalDetector,
    min_query_chars: usize,
}

impl SuggestionService {
    pub fn new(store: StoreHandle, detector: SignalDetector, config: &CaptureConfig) -> Self {
        Self {
            store,
            detector,
            min_query_chars: config.min_query_chars,
        }
    }

    /// Up to five prior prompts matching the partial input. Single and
    /// double letter queries match everything and nothing useful, so they
    /// return empty outright.
    pub async fn suggest(&self, query: &str) -> Vec<CaptureRecord> {
        if query.trim().chars().count() < self.min_query_chars {
            return Vec::new();
        }

        match self.store.search_history(query).await {
            Ok(matches) => matches,
            Err(err) => {
                warn!("Suggestion lookup failed: {err:#}");
                Vec::new()
            }
        }
    }

    /// The user picked a suggestion. The embedding layer injects `content`
    /// into the editable element and re-fires its native change event; we
    /// pre-set the buffer to the same text so that synthetic event does not
    /// read as new typing.
    pub async fn apply_selection(&self, content: &str) {
        self.detector.set_buffer(content).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AiTool, CaptureType};
    use crate::store::MemoryBackend;

    fn service() -> (SuggestionService, StoreHandle) {
        let config = CaptureConfig::default();
        let store = StoreHandle::spawn(|| Ok(MemoryBackend::new()), &config).unwrap();
        let (detector, _rx) = SignalDetector::new(&config);
        (
            SuggestionService::new(store.clone(), detector, &config),
            store,
        )
    }

    #[tokio::test]
    async fn short_queries_yield_nothing() {
        let (service, store) = service();
        store
            .capture(CaptureType::Prompt, "ab initio methods", AiTool::ChatGpt, "url")
            .await
            .unwrap();

        assert!(service.suggest("ab").await.is_empty());
        assert!(service.suggest("  a  ").await.is_empty());
        assert_eq!(service.suggest("initio").await.len(), 1);
    }

    #[tokio::test]
    async fn identical_prompts_suggest_once() {
        let (service, store) = service();
        store
            .capture(CaptureType::Prompt, "explain async rust", AiTool::ChatGpt, "url")
            .await
            .unwrap();
        store
            .capture(CaptureType::Prompt, "something else entirely", AiTool::ChatGpt, "url")
            .await
            .unwrap();
        // Non-adjacent repeat of the first prompt.
        store
            .capture(CaptureType::Prompt, "explain async rust", AiTool::ChatGpt, "url")
            .await
            .unwrap();

        let matches = service.suggest("async").await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].content, "explain async rust");
    }

    #[tokio::test]
    async fn selection_resets_the_detector_buffer() {
        let config = CaptureConfig::default();
        let store = StoreHandle::spawn(|| Ok(MemoryBackend::new()), &config).unwrap();
        let (detector, _rx) = SignalDetector::new(&config);
        let service = SuggestionService::new(store, detector.clone(), &config);

        service.apply_selection("explain async rust").await;
        assert_eq!(detector.current_buffer().await, "explain async rust");
    }
}
