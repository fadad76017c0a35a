// ABOUTME: Review meeting type definitions
// ABOUTME: Meetings, attendees, meeting requirements, votes, statistics, and archived results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::InProgress => "in_progress",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled meetings accept no further changes
    pub fn is_terminal(&self) -> bool {
        matches!(self, MeetingStatus::Completed | MeetingStatus::Cancelled)
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Invited,
    Accepted,
    Declined,
    Attended,
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        AttendanceStatus::Invited
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteOption {
    Approve,
    Reject,
    Abstain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: i64,
    pub tenant_id: i64,
    pub meeting_no: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: MeetingStatus,
    pub moderator_id: i64,
    pub created_by: i64,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingCreateInput {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Defaults to the creating user
    pub moderator_id: Option<i64>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Field-by-field meeting update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingUpdateInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub moderator_id: Option<i64>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct MeetingFilter {
    pub status: Option<MeetingStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A meeting together with its participants and agenda
#[derive(Debug, Clone, Serialize)]
pub struct MeetingDetail {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub attendees: Vec<Attendee>,
    pub requirements: Vec<MeetingRequirement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    pub id: i64,
    pub tenant_id: i64,
    pub meeting_id: i64,
    pub user_id: i64,
    pub attendance_status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRequirement {
    pub id: i64,
    pub tenant_id: i64,
    pub meeting_id: i64,
    pub requirement_id: i64,
    pub review_order: i64,
    /// Empty means every attendee may vote
    pub assigned_voter_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingRequirementInput {
    pub requirement_id: i64,
    pub review_order: Option<i64>,
    pub assigned_voter_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingRequirementUpdateInput {
    pub review_order: Option<i64>,
    /// `Some(vec![])` clears the assignment
    pub assigned_voter_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub tenant_id: i64,
    pub meeting_id: i64,
    pub requirement_id: i64,
    pub voter_id: i64,
    pub vote_option: VoteOption,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastVoteInput {
    pub vote_option: VoteOption,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoterDetail {
    pub voter_id: i64,
    pub voter_name: Option<String>,
    pub vote_option: VoteOption,
    pub comment: Option<String>,
    pub voted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteStatistics {
    pub meeting_id: i64,
    pub requirement_id: i64,
    pub total_votes: i64,
    pub approve_count: i64,
    pub reject_count: i64,
    pub abstain_count: i64,
    pub approve_percentage: f64,
    pub reject_percentage: f64,
    pub abstain_percentage: f64,
    pub eligible_voter_count: i64,
    pub voted_count: i64,
    pub is_complete: bool,
    pub voters: Vec<VoterDetail>,
}

/// Point-in-time statistics snapshot written when a meeting ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    pub id: i64,
    pub tenant_id: i64,
    pub meeting_id: i64,
    pub requirement_id: i64,
    pub requirement_title: Option<String>,
    pub total_votes: i64,
    pub approve_count: i64,
    pub reject_count: i64,
    pub abstain_count: i64,
    pub approve_percentage: f64,
    pub reject_percentage: f64,
    pub abstain_percentage: f64,
    pub statistics: VoteStatistics,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingVoter {
    pub user_id: i64,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementPendingVoters {
    pub requirement_id: i64,
    pub requirement_title: Option<String>,
    pub eligible_voter_count: i64,
    pub pending: Vec<PendingVoter>,
}
