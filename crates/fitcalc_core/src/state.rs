use crate::view_model::AppViewModel;
use crate::{OutputRegions, SubmitForm};

/// Identifies one submission. Events from older generations are stale.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Streaming,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    form: SubmitForm,
    session: SessionState,
    generation: Generation,
    regions: OutputRegions,
    messages_received: usize,
    failure: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            generation: self.generation,
            progress: self.regions.progress.clone(),
            totals: self.regions.totals.clone(),
            sections: self.regions.sections.clone(),
            recommendations: self.regions.recommendations.clone(),
            messages_received: self.messages_received,
            failure: self.failure.clone(),
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn form(&self) -> &SubmitForm {
        &self.form
    }

    pub fn messages_received(&self) -> usize {
        self.messages_received
    }

    pub fn regions(&self) -> &OutputRegions {
        &self.regions
    }

    /// Returns whether the state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_fitting(&mut self, fitting: String) {
        self.form.fitting = fitting;
    }

    pub(crate) fn set_include_hull(&mut self, include_hull: bool) {
        if self.form.include_hull != include_hull {
            self.form.include_hull = include_hull;
            self.mark_dirty();
        }
    }

    /// Discards the previous submission's output and starts a new generation.
    /// Returns the generation that was still streaming, if any.
    pub(crate) fn begin_submission(&mut self) -> Option<Generation> {
        let superseded = (self.session == SessionState::Streaming).then_some(self.generation);
        self.generation += 1;
        self.session = SessionState::Streaming;
        self.regions.reset();
        self.messages_received = 0;
        self.failure = None;
        self.mark_dirty();
        superseded
    }

    pub(crate) fn is_live(&self, generation: Generation) -> bool {
        self.session == SessionState::Streaming && self.generation == generation
    }

    pub(crate) fn end_submission(&mut self) {
        self.session = SessionState::Idle;
        self.mark_dirty();
    }

    pub(crate) fn fail_submission(&mut self, message: String) {
        self.regions.progress.connection_failed(&message);
        self.failure = Some(message);
        self.end_submission();
    }

    pub(crate) fn regions_mut(&mut self) -> &mut OutputRegions {
        &mut self.regions
    }

    pub(crate) fn count_message(&mut self) {
        self.messages_received += 1;
    }
}
