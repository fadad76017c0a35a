// ABOUTME: Requirement review meeting domain for Reqhub
// ABOUTME: Meeting lifecycle, voter assignment, vote casting, statistics, and archiving

pub mod directory;
pub mod error;
pub mod notifications;
pub mod service;
pub mod statistics;
pub mod storage;
pub mod types;

// Re-export main types
pub use directory::{RequirementDirectory, SqliteDirectory, UserDirectory};
pub use error::{ReviewError, ReviewResult};
pub use notifications::{
    NewNotification, Notification, NotificationKind, NotificationSink, SqliteNotificationStore,
};
pub use service::{MeetingEndSummary, ReviewService};
pub use statistics::{compute_statistics, effective_voter_ids, ABSTAIN_SYSTEM_COMMENT};
pub use storage::MeetingStorage;
pub use types::{
    AttendanceStatus, Attendee, CastVoteInput, Meeting, MeetingCreateInput, MeetingDetail,
    MeetingFilter, MeetingRequirement, MeetingRequirementInput, MeetingRequirementUpdateInput,
    MeetingStatus, MeetingUpdateInput, PendingVoter, RequirementPendingVoters, Vote, VoteOption,
    VoteResult, VoteStatistics, VoterDetail,
};
