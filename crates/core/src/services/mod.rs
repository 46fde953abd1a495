//! Business logic services.

#![allow(missing_docs)]

pub mod annex;
pub mod authorization;
pub mod engagement;
pub mod event;
pub mod lifecycle;
pub mod moderation;
pub mod schedule;
pub mod validation;
pub mod voting;

pub use annex::{AnnexService, MAX_ANNEXES, SelectableItem};
pub use authorization::Actor;
pub use engagement::{EngagementService, EngagementTarget};
pub use event::{EventDetail, EventListItem, EventService, ListEventsInput};
pub use lifecycle::{Finalization, LifecycleService, SweepReport};
pub use moderation::{ModerationInput, ModerationService};
pub use schedule::{Slot, StatusInput, derive_status, pick_winner};
pub use validation::{
    EventDraft, EventSchedule, ValidatedEvent, ValidationContext, ValidationMode,
    VotingOptionDraft, validate_event,
};
pub use voting::{OptionSummary, VoteSummary, VotingService, is_voting_open};
