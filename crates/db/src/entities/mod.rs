//! Database entities.

pub mod engagement;
pub mod event;
pub mod event_annex;
pub mod event_moderation;
pub mod event_vote;
pub mod event_voting_option;
pub mod user_role;

pub use engagement::Entity as Engagement;
pub use event::Entity as Event;
pub use event_annex::Entity as EventAnnex;
pub use event_moderation::Entity as EventModeration;
pub use event_vote::Entity as EventVote;
pub use event_voting_option::Entity as EventVotingOption;
pub use user_role::Entity as UserRole;
