//! Fitcalc core: wire model, message parsing and the pure state machine
//! that turns stream events into view state.
mod dispatch;
mod effect;
mod message;
mod model;
mod msg;
mod progress;
pub mod render;
mod state;
mod update;
mod view_model;

pub use dispatch::{dispatch, OutputRegions};
pub use effect::{Effect, SubmitForm};
pub use message::{parse_message, MessageError, StreamMessage};
pub use model::{
    BuyEntry, BuyLists, DonePayload, ErrorReport, Item, ProgressUpdate, SectionMap, Totals,
};
pub use msg::{Msg, StreamEvent};
pub use progress::{
    percent_of, ProgressView, STATUS_DONE, STATUS_MALFORMED, STATUS_READY, STATUS_STARTING,
};
pub use render::{render_result, RecommendationView, RenderedResult, SectionTable, TotalsRow};
pub use state::{AppState, Generation, SessionState};
pub use update::update;
pub use view_model::AppViewModel;
