// ABOUTME: Review meeting workflow
// ABOUTME: Lifecycle transitions, participant management, vote casting, and reporting

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use reqhub_core::{truncate, validate_title};
use reqhub_storage::StorageError;

use crate::directory::{RequirementDirectory, SqliteDirectory, UserDirectory};
use crate::error::{ReviewError, ReviewResult};
use crate::notifications::{
    NewNotification, NotificationKind, NotificationSink, SqliteNotificationStore,
};
use crate::statistics::{compute_statistics, effective_voter_ids, pending_voter_ids};
use crate::storage::MeetingStorage;
use crate::types::{
    AttendanceStatus, Attendee, CastVoteInput, Meeting, MeetingCreateInput, MeetingDetail,
    MeetingFilter, MeetingRequirement, MeetingRequirementInput, MeetingRequirementUpdateInput,
    MeetingStatus, MeetingUpdateInput, PendingVoter, RequirementPendingVoters, Vote,
    VoteResult, VoteStatistics,
};

/// Characters of a vote comment quoted in the moderator's notification
const NOTIFICATION_COMMENT_PREVIEW: usize = 120;

/// Outcome of closing a meeting
#[derive(Debug, Clone, Serialize)]
pub struct MeetingEndSummary {
    pub meeting: Meeting,
    /// Abstain votes recorded for voters who never voted
    pub auto_abstained: usize,
    pub results: Vec<VoteResult>,
}

pub struct ReviewService {
    storage: Arc<MeetingStorage>,
    requirements: Arc<dyn RequirementDirectory>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn NotificationSink>,
}

impl ReviewService {
    pub fn new(
        storage: Arc<MeetingStorage>,
        requirements: Arc<dyn RequirementDirectory>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            storage,
            requirements,
            users,
            notifier,
        }
    }

    /// Service wired entirely to one SQLite pool
    pub fn sqlite(pool: SqlitePool) -> Self {
        let directory = Arc::new(SqliteDirectory::new(pool.clone()));
        Self::new(
            Arc::new(MeetingStorage::new(pool.clone())),
            directory.clone(),
            directory,
            Arc::new(SqliteNotificationStore::new(pool)),
        )
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub async fn create_meeting(
        &self,
        tenant_id: i64,
        actor_id: i64,
        mut input: MeetingCreateInput,
    ) -> ReviewResult<Meeting> {
        input.title = validate_title(&input.title)?;
        if let Some(moderator_id) = input.moderator_id {
            self.require_user(tenant_id, moderator_id).await?;
        }

        let meeting = self
            .storage
            .create_meeting(tenant_id, actor_id, &input, Utc::now())
            .await?;

        info!(
            "Created review meeting {} ({}) for tenant {}",
            meeting.meeting_no, meeting.id, tenant_id
        );
        Ok(meeting)
    }

    pub async fn get_meeting(&self, tenant_id: i64, meeting_id: i64) -> ReviewResult<Meeting> {
        self.storage
            .get_meeting(tenant_id, meeting_id)
            .await?
            .ok_or(ReviewError::MeetingNotFound(meeting_id))
    }

    pub async fn get_meeting_detail(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> ReviewResult<MeetingDetail> {
        let meeting = self.get_meeting(tenant_id, meeting_id).await?;
        let attendees = self.storage.list_attendees(tenant_id, meeting_id).await?;
        let requirements = self
            .storage
            .list_meeting_requirements(tenant_id, meeting_id)
            .await?;

        Ok(MeetingDetail {
            meeting,
            attendees,
            requirements,
        })
    }

    pub async fn list_meetings(
        &self,
        tenant_id: i64,
        filter: &MeetingFilter,
    ) -> ReviewResult<(Vec<Meeting>, i64)> {
        Ok(self.storage.list_meetings(tenant_id, filter).await?)
    }

    pub async fn update_meeting(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        mut input: MeetingUpdateInput,
    ) -> ReviewResult<Meeting> {
        self.require_open_meeting(tenant_id, meeting_id, "update")
            .await?;

        if let Some(title) = &input.title {
            input.title = Some(validate_title(title)?);
        }
        if let Some(moderator_id) = input.moderator_id {
            self.require_user(tenant_id, moderator_id).await?;
        }

        self.storage
            .update_meeting(tenant_id, meeting_id, &input, Utc::now())
            .await?
            .ok_or(ReviewError::MeetingNotFound(meeting_id))
    }

    pub async fn delete_meeting(&self, tenant_id: i64, meeting_id: i64) -> ReviewResult<()> {
        if !self.storage.delete_meeting(tenant_id, meeting_id).await? {
            return Err(ReviewError::MeetingNotFound(meeting_id));
        }

        info!("Deleted review meeting {} for tenant {}", meeting_id, tenant_id);
        Ok(())
    }

    pub async fn start_meeting(&self, tenant_id: i64, meeting_id: i64) -> ReviewResult<Meeting> {
        let meeting = self.get_meeting(tenant_id, meeting_id).await?;

        if !self
            .storage
            .mark_started(tenant_id, meeting_id, Utc::now())
            .await?
        {
            return Err(self.lost_transition(tenant_id, meeting, "start").await);
        }

        let meeting = self.get_meeting(tenant_id, meeting_id).await?;
        info!("Review meeting {} started", meeting.meeting_no);

        self.notify_attendees(
            &meeting,
            NotificationKind::MeetingStarted,
            format!("Review meeting {} has started", meeting.meeting_no),
        )
        .await;

        Ok(meeting)
    }

    /// Close the meeting, abstain for everyone who did not vote, and archive results
    pub async fn end_meeting(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> ReviewResult<MeetingEndSummary> {
        let meeting = self.get_meeting(tenant_id, meeting_id).await?;
        if meeting.status != MeetingStatus::InProgress {
            return Err(ReviewError::InvalidTransition {
                from: meeting.status,
                action: "end",
            });
        }

        // Labels for the archived snapshots; the vote data itself is read inside the transaction
        let agenda = self
            .storage
            .list_meeting_requirements(tenant_id, meeting_id)
            .await?;
        let requirement_ids: Vec<i64> = agenda.iter().map(|mr| mr.requirement_id).collect();
        let titles = self
            .requirements
            .requirement_titles(tenant_id, &requirement_ids)
            .await?;
        let names = self.attendee_names(tenant_id, meeting_id).await?;

        let Some((results, auto_abstained)) = self
            .storage
            .complete_meeting(tenant_id, meeting_id, Utc::now(), &titles, &names)
            .await?
        else {
            return Err(self.lost_transition(tenant_id, meeting, "end").await);
        };

        let meeting = self.get_meeting(tenant_id, meeting_id).await?;
        info!(
            "Review meeting {} ended with {} results",
            meeting.meeting_no,
            results.len()
        );

        self.notify_attendees(
            &meeting,
            NotificationKind::MeetingEnded,
            format!("Review meeting {} has ended", meeting.meeting_no),
        )
        .await;

        Ok(MeetingEndSummary {
            meeting,
            auto_abstained,
            results,
        })
    }

    pub async fn cancel_meeting(&self, tenant_id: i64, meeting_id: i64) -> ReviewResult<Meeting> {
        let meeting = self.get_meeting(tenant_id, meeting_id).await?;

        if !self
            .storage
            .mark_cancelled(tenant_id, meeting_id, Utc::now())
            .await?
        {
            return Err(self.lost_transition(tenant_id, meeting, "cancel").await);
        }

        let meeting = self.get_meeting(tenant_id, meeting_id).await?;
        info!("Review meeting {} cancelled", meeting.meeting_no);

        self.notify_attendees(
            &meeting,
            NotificationKind::MeetingCancelled,
            format!("Review meeting {} was cancelled", meeting.meeting_no),
        )
        .await;

        Ok(meeting)
    }

    // ------------------------------------------------------------------
    // Attendees
    // ------------------------------------------------------------------

    pub async fn list_attendees(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> ReviewResult<Vec<Attendee>> {
        self.get_meeting(tenant_id, meeting_id).await?;
        Ok(self.storage.list_attendees(tenant_id, meeting_id).await?)
    }

    pub async fn add_attendee(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        user_id: i64,
        attendance_status: Option<AttendanceStatus>,
    ) -> ReviewResult<Attendee> {
        self.require_open_meeting(tenant_id, meeting_id, "add attendees to")
            .await?;
        self.require_user(tenant_id, user_id).await?;

        self.storage
            .add_attendee(
                tenant_id,
                meeting_id,
                user_id,
                attendance_status.unwrap_or_default(),
                Utc::now(),
            )
            .await
            .map_err(|e| {
                conflict_on_unique(e, || {
                    format!("User {} is already an attendee of meeting {}", user_id, meeting_id)
                })
            })
    }

    pub async fn update_attendance(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        user_id: i64,
        attendance_status: AttendanceStatus,
    ) -> ReviewResult<Attendee> {
        self.require_open_meeting(tenant_id, meeting_id, "update attendees of")
            .await?;

        self.storage
            .update_attendance(tenant_id, meeting_id, user_id, attendance_status, Utc::now())
            .await?
            .ok_or(ReviewError::AttendeeNotFound {
                meeting_id,
                user_id,
            })
    }

    /// Remove an attendee together with the votes they cast in this meeting
    pub async fn remove_attendee(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        user_id: i64,
    ) -> ReviewResult<()> {
        self.require_open_meeting(tenant_id, meeting_id, "remove attendees from")
            .await?;

        if !self
            .storage
            .remove_attendee(tenant_id, meeting_id, user_id)
            .await?
        {
            return Err(ReviewError::AttendeeNotFound {
                meeting_id,
                user_id,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Agenda
    // ------------------------------------------------------------------

    pub async fn list_meeting_requirements(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> ReviewResult<Vec<MeetingRequirement>> {
        self.get_meeting(tenant_id, meeting_id).await?;
        Ok(self
            .storage
            .list_meeting_requirements(tenant_id, meeting_id)
            .await?)
    }

    pub async fn add_meeting_requirement(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        input: MeetingRequirementInput,
    ) -> ReviewResult<MeetingRequirement> {
        self.require_open_meeting(tenant_id, meeting_id, "add requirements to")
            .await?;

        if self
            .requirements
            .requirement_title(tenant_id, input.requirement_id)
            .await?
            .is_none()
        {
            return Err(ReviewError::RequirementNotFound(input.requirement_id));
        }

        let assigned = input.assigned_voter_ids.unwrap_or_default();
        self.require_attendees(tenant_id, meeting_id, &assigned)
            .await?;

        self.storage
            .add_meeting_requirement(
                tenant_id,
                meeting_id,
                input.requirement_id,
                input.review_order,
                &assigned,
                Utc::now(),
            )
            .await
            .map_err(|e| {
                conflict_on_unique(e, || {
                    format!(
                        "Requirement {} is already on the agenda of meeting {}",
                        input.requirement_id, meeting_id
                    )
                })
            })
    }

    pub async fn update_meeting_requirement(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
        input: MeetingRequirementUpdateInput,
    ) -> ReviewResult<MeetingRequirement> {
        self.require_open_meeting(tenant_id, meeting_id, "update requirements of")
            .await?;

        if let Some(assigned) = &input.assigned_voter_ids {
            self.require_attendees(tenant_id, meeting_id, assigned)
                .await?;
        }

        self.storage
            .update_meeting_requirement(tenant_id, meeting_id, requirement_id, &input, Utc::now())
            .await?
            .ok_or(ReviewError::RequirementNotFound(requirement_id))
    }

    /// Take a requirement off the agenda together with its votes
    pub async fn remove_meeting_requirement(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
    ) -> ReviewResult<()> {
        self.require_open_meeting(tenant_id, meeting_id, "remove requirements from")
            .await?;

        if !self
            .storage
            .remove_meeting_requirement(tenant_id, meeting_id, requirement_id)
            .await?
        {
            return Err(ReviewError::RequirementNotFound(requirement_id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Voting
    // ------------------------------------------------------------------

    /// Record or replace a voter's ballot on one agenda item
    pub async fn cast_vote(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
        voter_id: i64,
        input: CastVoteInput,
    ) -> ReviewResult<Vote> {
        let meeting = self.get_meeting(tenant_id, meeting_id).await?;
        if meeting.status != MeetingStatus::InProgress {
            return Err(ReviewError::MeetingNotInProgress(meeting.status));
        }

        let agenda_item = self
            .storage
            .get_meeting_requirement(tenant_id, meeting_id, requirement_id)
            .await?
            .ok_or(ReviewError::RequirementNotFound(requirement_id))?;

        if self
            .storage
            .get_attendee(tenant_id, meeting_id, voter_id)
            .await?
            .is_none()
        {
            return Err(ReviewError::NotAttendee(voter_id));
        }

        if !agenda_item.assigned_voter_ids.is_empty()
            && !agenda_item.assigned_voter_ids.contains(&voter_id)
        {
            return Err(ReviewError::NotAssignedVoter(voter_id));
        }

        let comment = input
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let vote = self
            .storage
            .upsert_vote(
                tenant_id,
                meeting_id,
                requirement_id,
                voter_id,
                input.vote_option,
                comment,
                Utc::now(),
            )
            .await?;

        // The meeting left in_progress between the check above and the write
        let vote = match vote {
            Some(vote) => vote,
            None => {
                let current = self.get_meeting(tenant_id, meeting_id).await?;
                return Err(ReviewError::MeetingNotInProgress(current.status));
            }
        };

        info!(
            "User {} voted {:?} on requirement {} in meeting {}",
            voter_id, vote.vote_option, requirement_id, meeting.meeting_no
        );

        if meeting.moderator_id != voter_id {
            let mut content = format!(
                "User {} voted {:?} on requirement {}",
                voter_id, vote.vote_option, requirement_id
            );
            if let Some(comment) = &vote.comment {
                let preview = truncate(comment, NOTIFICATION_COMMENT_PREVIEW);
                content.push_str(&format!(": {}", preview));
            }

            self.notify(vec![NewNotification {
                tenant_id,
                user_id: meeting.moderator_id,
                kind: NotificationKind::VoteCast,
                title: format!("New vote in review meeting {}", meeting.meeting_no),
                content: Some(content),
                meeting_id: Some(meeting_id),
            }])
            .await;
        }

        Ok(vote)
    }

    pub async fn list_votes(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
    ) -> ReviewResult<Vec<Vote>> {
        self.require_agenda_item(tenant_id, meeting_id, requirement_id)
            .await?;
        Ok(self
            .storage
            .list_votes(tenant_id, meeting_id, requirement_id)
            .await?)
    }

    pub async fn get_vote(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
        voter_id: i64,
    ) -> ReviewResult<Vote> {
        self.require_agenda_item(tenant_id, meeting_id, requirement_id)
            .await?;
        self.storage
            .get_vote(tenant_id, meeting_id, requirement_id, voter_id)
            .await?
            .ok_or(ReviewError::VoteNotFound {
                requirement_id,
                voter_id,
            })
    }

    /// Live tally for one agenda item
    pub async fn vote_statistics(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
    ) -> ReviewResult<VoteStatistics> {
        let agenda_item = self
            .require_agenda_item(tenant_id, meeting_id, requirement_id)
            .await?;

        let attendee_ids = self.attendee_ids(tenant_id, meeting_id).await?;
        let eligible = effective_voter_ids(&agenda_item.assigned_voter_ids, &attendee_ids);
        let votes = self
            .storage
            .list_votes(tenant_id, meeting_id, requirement_id)
            .await?;

        let voter_ids: Vec<i64> = votes.iter().map(|v| v.voter_id).collect();
        let names = self.users.display_names(tenant_id, &voter_ids).await?;

        Ok(compute_statistics(
            meeting_id,
            requirement_id,
            &votes,
            &eligible,
            &names,
        ))
    }

    /// Eligible voters who have not voted yet, per agenda item
    pub async fn pending_voters(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> ReviewResult<Vec<RequirementPendingVoters>> {
        self.get_meeting(tenant_id, meeting_id).await?;

        let agenda = self
            .storage
            .list_meeting_requirements(tenant_id, meeting_id)
            .await?;
        let attendee_ids = self.attendee_ids(tenant_id, meeting_id).await?;
        let names = self.users.display_names(tenant_id, &attendee_ids).await?;
        let requirement_ids: Vec<i64> = agenda.iter().map(|mr| mr.requirement_id).collect();
        let titles = self
            .requirements
            .requirement_titles(tenant_id, &requirement_ids)
            .await?;

        let mut votes_by_requirement: HashMap<i64, Vec<Vote>> = HashMap::new();
        for vote in self
            .storage
            .list_meeting_votes(tenant_id, meeting_id)
            .await?
        {
            votes_by_requirement
                .entry(vote.requirement_id)
                .or_default()
                .push(vote);
        }

        let report = agenda
            .iter()
            .map(|item| {
                let eligible = effective_voter_ids(&item.assigned_voter_ids, &attendee_ids);
                let votes = votes_by_requirement
                    .get(&item.requirement_id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();

                RequirementPendingVoters {
                    requirement_id: item.requirement_id,
                    requirement_title: titles.get(&item.requirement_id).cloned(),
                    eligible_voter_count: eligible.len() as i64,
                    pending: pending_voter_ids(&eligible, votes)
                        .into_iter()
                        .map(|user_id| PendingVoter {
                            user_id,
                            display_name: names.get(&user_id).cloned(),
                        })
                        .collect(),
                }
            })
            .collect();

        Ok(report)
    }

    // ------------------------------------------------------------------
    // Archived results
    // ------------------------------------------------------------------

    pub async fn list_vote_results(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> ReviewResult<Vec<VoteResult>> {
        self.get_meeting(tenant_id, meeting_id).await?;
        Ok(self.storage.list_vote_results(tenant_id, meeting_id).await?)
    }

    pub async fn get_vote_result(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
    ) -> ReviewResult<VoteResult> {
        self.get_meeting(tenant_id, meeting_id).await?;
        self.storage
            .get_vote_result(tenant_id, meeting_id, requirement_id)
            .await?
            .ok_or(ReviewError::VoteResultNotFound(requirement_id))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    async fn require_open_meeting(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        action: &'static str,
    ) -> ReviewResult<Meeting> {
        let meeting = self.get_meeting(tenant_id, meeting_id).await?;
        if meeting.status.is_terminal() {
            return Err(ReviewError::InvalidTransition {
                from: meeting.status,
                action,
            });
        }
        Ok(meeting)
    }

    async fn require_agenda_item(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
    ) -> ReviewResult<MeetingRequirement> {
        self.get_meeting(tenant_id, meeting_id).await?;
        self.storage
            .get_meeting_requirement(tenant_id, meeting_id, requirement_id)
            .await?
            .ok_or(ReviewError::RequirementNotFound(requirement_id))
    }

    async fn require_user(&self, tenant_id: i64, user_id: i64) -> ReviewResult<()> {
        match self.users.display_name(tenant_id, user_id).await? {
            Some(_) => Ok(()),
            None => Err(ReviewError::UserNotFound(user_id)),
        }
    }

    async fn require_attendees(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        user_ids: &[i64],
    ) -> ReviewResult<()> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let attendee_ids = self.attendee_ids(tenant_id, meeting_id).await?;
        match user_ids.iter().find(|id| !attendee_ids.contains(id)) {
            Some(id) => Err(ReviewError::Validation(format!(
                "Assigned voter {} is not an attendee of meeting {}",
                id, meeting_id
            ))),
            None => Ok(()),
        }
    }

    async fn attendee_ids(&self, tenant_id: i64, meeting_id: i64) -> ReviewResult<Vec<i64>> {
        Ok(self
            .storage
            .list_attendees(tenant_id, meeting_id)
            .await?
            .into_iter()
            .map(|a| a.user_id)
            .collect())
    }

    async fn attendee_names(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> ReviewResult<HashMap<i64, String>> {
        let attendee_ids = self.attendee_ids(tenant_id, meeting_id).await?;
        Ok(self.users.display_names(tenant_id, &attendee_ids).await?)
    }

    /// Error for a compare-and-swap that matched no row, reporting the status that won
    async fn lost_transition(
        &self,
        tenant_id: i64,
        before: Meeting,
        action: &'static str,
    ) -> ReviewError {
        match self.storage.get_meeting(tenant_id, before.id).await {
            Ok(Some(current)) => ReviewError::InvalidTransition {
                from: current.status,
                action,
            },
            Ok(None) => ReviewError::MeetingNotFound(before.id),
            Err(e) => ReviewError::Storage(e),
        }
    }

    async fn notify_attendees(&self, meeting: &Meeting, kind: NotificationKind, title: String) {
        let attendee_ids = match self.attendee_ids(meeting.tenant_id, meeting.id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(
                    "Could not load attendees of meeting {} for notification: {}",
                    meeting.id, e
                );
                return;
            }
        };

        let notifications = attendee_ids
            .into_iter()
            .map(|user_id| NewNotification {
                tenant_id: meeting.tenant_id,
                user_id,
                kind,
                title: title.clone(),
                content: Some(meeting.title.clone()),
                meeting_id: Some(meeting.id),
            })
            .collect();

        self.notify(notifications).await;
    }

    async fn notify(&self, notifications: Vec<NewNotification>) {
        if notifications.is_empty() {
            return;
        }

        let count = notifications.len();
        if let Err(e) = self.notifier.dispatch(notifications).await {
            warn!("Failed to dispatch {} notifications: {}", count, e);
        }
    }
}

fn conflict_on_unique(err: StorageError, message: impl FnOnce() -> String) -> ReviewError {
    if err.is_unique_violation() {
        ReviewError::Conflict(message())
    } else {
        ReviewError::Storage(err)
    }
}
