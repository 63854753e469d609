use engine_logging::{engine_debug, engine_info};

use crate::render::{render_result, RecommendationView, SectionTable, TotalsRow};
use crate::{ProgressView, StreamMessage};

/// Everything a submission can draw into.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputRegions {
    pub progress: ProgressView,
    pub totals: Vec<TotalsRow>,
    pub sections: Vec<SectionTable>,
    /// `None` until a result has been rendered.
    pub recommendations: Option<RecommendationView>,
}

impl OutputRegions {
    /// Empty result regions and a progress indicator at "starting".
    pub fn reset(&mut self) {
        self.totals.clear();
        self.sections.clear();
        self.recommendations = None;
        self.progress.reset();
    }
}

/// Route one message to its presenter. Returns `false` when nothing changed.
pub fn dispatch(regions: &mut OutputRegions, message: StreamMessage) -> bool {
    match message {
        StreamMessage::Progress(update) => {
            regions.progress.apply_progress(&update);
        }
        StreamMessage::Done(payload) => {
            engine_info!(
                "Result received: {} section(s), buy lists {}",
                payload.parsed.len(),
                if payload.buy_lists.is_some() { "present" } else { "absent" }
            );
            let rendered = render_result(&payload.parsed, &payload.totals, payload.buy_lists.as_ref());
            regions.totals = rendered.totals;
            regions.sections = rendered.sections;
            regions.recommendations = Some(rendered.recommendations);
            regions.progress.complete();
        }
        StreamMessage::Error(report) => {
            regions.progress.apply_error(&report.message);
        }
        StreamMessage::Unknown { kind } => {
            engine_debug!("Ignoring message with unknown type {:?}", kind);
            return false;
        }
    }
    true
}
