use crate::render::{RecommendationView, SectionTable, TotalsRow};
use crate::{Generation, ProgressView, SessionState};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub generation: Generation,
    pub progress: ProgressView,
    pub totals: Vec<TotalsRow>,
    pub sections: Vec<SectionTable>,
    pub recommendations: Option<RecommendationView>,
    pub messages_received: usize,
    /// Transport failure that ended the last submission, if any.
    pub failure: Option<String>,
}

impl AppViewModel {
    pub fn is_streaming(&self) -> bool {
        self.session == SessionState::Streaming
    }
}
