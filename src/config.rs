use std::time::Duration;

/// Capture pipeline policy with tunable thresholds.
///
/// The timing constants are heuristics, not protocol: hosts stream responses
/// at different rates and clear their composers at different speeds, so every
/// page context takes its own copy of this config.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Hard cap on stored records; oldest are evicted past this.
    pub max_records: usize,

    /// Quiet period after a burst of DOM insertions before a response is
    /// considered finished streaming.
    pub response_debounce: Duration,

    /// How long a queued prompt may wait for its response before it is
    /// persisted anyway.
    pub safety_timeout: Duration,

    /// Minimum trimmed prompt length worth capturing.
    pub min_prompt_chars: usize,

    /// Inserted elements with rendered text at or below this length are
    /// ignored by the response track.
    pub min_response_chars: usize,

    /// Queries shorter than this never produce suggestions.
    pub min_query_chars: usize,

    /// Suggestion list cap.
    pub max_suggestions: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_records: 5000,
            response_debounce: Duration::from_millis(2500),
            safety_timeout: Duration::from_secs(15),
            min_prompt_chars: 2,
            min_response_chars: 50,
            min_query_chars: 3,
            max_suggestions: 5,
        }
    }
}
