//! Database repositories.

mod engagement;
mod event;
mod event_annex;
mod event_moderation;
mod event_vote;
mod user_role;
mod voting_option;

pub use engagement::{EngagementCounter, EngagementRepository};
pub use event::{EventListFilter, EventRepository, FinalChoice, TagCount};
pub use event_annex::EventAnnexRepository;
pub use event_moderation::EventModerationRepository;
pub use event_vote::{EventVoteRepository, OptionSummaryRow, VoteTally};
pub use user_role::UserRoleRepository;
pub use voting_option::VotingOptionRepository;
