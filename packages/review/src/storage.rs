// ABOUTME: Review meeting storage layer using SQLite
// ABOUTME: Tenant-scoped CRUD, compare-and-swap transitions, vote upserts, and result archiving

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use reqhub_core::{format_meeting_no, meeting_no_day_prefix, parse_meeting_no_sequence};
use reqhub_storage::StorageError;

use crate::statistics::{compute_statistics, effective_voter_ids, ABSTAIN_SYSTEM_COMMENT};
use crate::types::{
    AttendanceStatus, Attendee, Meeting, MeetingCreateInput, MeetingFilter, MeetingRequirement,
    MeetingRequirementUpdateInput, MeetingStatus, MeetingUpdateInput, Vote, VoteOption,
    VoteResult,
};

/// Number of times a meeting insert is retried when another writer took the same number
const MAX_MEETING_NO_ATTEMPTS: usize = 5;

pub struct MeetingStorage {
    pool: SqlitePool,
}

impl MeetingStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Meetings
    // ------------------------------------------------------------------

    /// Create a scheduled meeting with the next free `RM-YYYYMMDD-NNN` number
    pub async fn create_meeting(
        &self,
        tenant_id: i64,
        created_by: i64,
        input: &MeetingCreateInput,
        now: DateTime<Utc>,
    ) -> Result<Meeting, StorageError> {
        let moderator_id = input.moderator_id.unwrap_or(created_by);

        for attempt in 1..=MAX_MEETING_NO_ATTEMPTS {
            let meeting_no = self.next_meeting_no(now.date_naive()).await?;
            debug!("Creating meeting {} (attempt {})", meeting_no, attempt);

            let result = sqlx::query(
                r#"
                INSERT INTO review_meetings
                    (tenant_id, meeting_no, title, description, location, status,
                     moderator_id, created_by, scheduled_at, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(tenant_id)
            .bind(&meeting_no)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(MeetingStatus::Scheduled)
            .bind(moderator_id)
            .bind(created_by)
            .bind(input.scheduled_at)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await;

            match result {
                Ok(done) => {
                    return self
                        .get_meeting(tenant_id, done.last_insert_rowid())
                        .await?
                        .ok_or(StorageError::NotFound);
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    debug!("Meeting number {} already taken, retrying", meeting_no);
                }
                Err(e) => return Err(StorageError::Sqlx(e)),
            }
        }

        Err(StorageError::Database(format!(
            "Could not allocate a meeting number after {} attempts",
            MAX_MEETING_NO_ATTEMPTS
        )))
    }

    async fn next_meeting_no(&self, day: NaiveDate) -> Result<String, StorageError> {
        let prefix = meeting_no_day_prefix(day);

        let issued: Vec<String> =
            sqlx::query_scalar("SELECT meeting_no FROM review_meetings WHERE meeting_no LIKE ?")
                .bind(format!("{}%", prefix))
                .fetch_all(&self.pool)
                .await?;

        let last = issued
            .iter()
            .filter_map(|no| parse_meeting_no_sequence(no, day))
            .max()
            .unwrap_or(0);

        Ok(format_meeting_no(day, last + 1))
    }

    pub async fn get_meeting(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> Result<Option<Meeting>, StorageError> {
        let row = sqlx::query("SELECT * FROM review_meetings WHERE id = ? AND tenant_id = ?")
            .bind(meeting_id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_meeting).transpose()
    }

    /// List a tenant's meetings, newest first
    pub async fn list_meetings(
        &self,
        tenant_id: i64,
        filter: &MeetingFilter,
    ) -> Result<(Vec<Meeting>, i64), StorageError> {
        debug!(
            "Fetching meetings for tenant {} (status: {:?}, limit: {:?}, offset: {:?})",
            tenant_id, filter.status, filter.limit, filter.offset
        );

        let where_clause = if filter.status.is_some() {
            "WHERE tenant_id = ? AND status = ?"
        } else {
            "WHERE tenant_id = ?"
        };

        let count_str = format!("SELECT COUNT(*) FROM review_meetings {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_str).bind(tenant_id);
        if let Some(status) = filter.status {
            count_query = count_query.bind(status);
        }
        let count: i64 = count_query.fetch_one(&self.pool).await?;

        let mut query_str = format!(
            "SELECT * FROM review_meetings {} ORDER BY created_at DESC, id DESC",
            where_clause
        );
        if let Some(lim) = filter.limit {
            query_str.push_str(&format!(" LIMIT {}", lim));
            if let Some(off) = filter.offset {
                query_str.push_str(&format!(" OFFSET {}", off));
            }
        }

        let mut query = sqlx::query(&query_str).bind(tenant_id);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let meetings = rows
            .iter()
            .map(row_to_meeting)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((meetings, count))
    }

    /// Apply the provided fields; returns `None` when the meeting does not exist
    pub async fn update_meeting(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        input: &MeetingUpdateInput,
        now: DateTime<Utc>,
    ) -> Result<Option<Meeting>, StorageError> {
        debug!("Updating meeting: {}", meeting_id);

        let mut query_parts = vec!["updated_at = ?"];
        if input.title.is_some() {
            query_parts.push("title = ?");
        }
        if input.description.is_some() {
            query_parts.push("description = ?");
        }
        if input.location.is_some() {
            query_parts.push("location = ?");
        }
        if input.moderator_id.is_some() {
            query_parts.push("moderator_id = ?");
        }
        if input.scheduled_at.is_some() {
            query_parts.push("scheduled_at = ?");
        }

        let query_str = format!(
            "UPDATE review_meetings SET {} WHERE id = ? AND tenant_id = ?",
            query_parts.join(", ")
        );

        // Bind parameters in the same order
        let mut query = sqlx::query(&query_str).bind(now);
        if let Some(title) = &input.title {
            query = query.bind(title);
        }
        if let Some(description) = &input.description {
            query = query.bind(description);
        }
        if let Some(location) = &input.location {
            query = query.bind(location);
        }
        if let Some(moderator_id) = input.moderator_id {
            query = query.bind(moderator_id);
        }
        if let Some(scheduled_at) = input.scheduled_at {
            query = query.bind(scheduled_at);
        }

        let result = query
            .bind(meeting_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_meeting(tenant_id, meeting_id).await
    }

    /// Delete a meeting and everything it owns
    pub async fn delete_meeting(&self, tenant_id: i64, meeting_id: i64) -> Result<bool, StorageError> {
        debug!("Deleting meeting: {}", meeting_id);

        let result = sqlx::query("DELETE FROM review_meetings WHERE id = ? AND tenant_id = ?")
            .bind(meeting_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// scheduled -> in_progress; false when the meeting was not scheduled
    pub async fn mark_started(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE review_meetings
            SET status = 'in_progress', started_at = ?, updated_at = ?
            WHERE id = ? AND tenant_id = ? AND status = 'scheduled'
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(meeting_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// scheduled -> cancelled; false when the meeting was not scheduled
    pub async fn mark_cancelled(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE review_meetings
            SET status = 'cancelled', updated_at = ?
            WHERE id = ? AND tenant_id = ? AND status = 'scheduled'
            "#,
        )
        .bind(now)
        .bind(meeting_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Close an in-progress meeting in a single transaction.
    ///
    /// Marks the meeting completed, records an abstain vote for every eligible
    /// voter that has not voted, and archives one result per meeting requirement.
    /// Returns `None` without writing anything when the meeting was not in progress.
    pub async fn complete_meeting(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        now: DateTime<Utc>,
        requirement_titles: &HashMap<i64, String>,
        voter_names: &HashMap<i64, String>,
    ) -> Result<Option<(Vec<VoteResult>, usize)>, StorageError> {
        let mut tx = self.pool.begin().await?;

        let closed = sqlx::query(
            r#"
            UPDATE review_meetings
            SET status = 'completed', ended_at = ?, updated_at = ?
            WHERE id = ? AND tenant_id = ? AND status = 'in_progress'
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(meeting_id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;

        if closed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let attendee_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM review_meeting_attendees WHERE meeting_id = ? AND tenant_id = ? ORDER BY id",
        )
        .bind(meeting_id)
        .bind(tenant_id)
        .fetch_all(&mut *tx)
        .await?;

        let requirements = fetch_meeting_requirements(&mut tx, tenant_id, meeting_id).await?;

        let mut abstained = 0usize;
        let mut results = Vec::with_capacity(requirements.len());

        for requirement in &requirements {
            let eligible = effective_voter_ids(&requirement.assigned_voter_ids, &attendee_ids);

            for &voter_id in &eligible {
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO review_votes
                        (tenant_id, meeting_id, requirement_id, voter_id, vote_option, comment, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT(meeting_id, requirement_id, voter_id) DO NOTHING
                    "#,
                )
                .bind(tenant_id)
                .bind(meeting_id)
                .bind(requirement.requirement_id)
                .bind(voter_id)
                .bind(VoteOption::Abstain)
                .bind(ABSTAIN_SYSTEM_COMMENT)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                abstained += inserted.rows_affected() as usize;
            }

            let votes = fetch_votes(&mut tx, tenant_id, meeting_id, requirement.requirement_id).await?;
            let statistics = compute_statistics(
                meeting_id,
                requirement.requirement_id,
                &votes,
                &eligible,
                voter_names,
            );
            let requirement_title = requirement_titles.get(&requirement.requirement_id).cloned();
            let snapshot = serde_json::to_string(&statistics)?;

            let archived = sqlx::query(
                r#"
                INSERT INTO review_vote_results
                    (tenant_id, meeting_id, requirement_id, requirement_title, total_votes,
                     approve_count, reject_count, abstain_count,
                     approve_percentage, reject_percentage, abstain_percentage,
                     statistics, archived_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(tenant_id)
            .bind(meeting_id)
            .bind(requirement.requirement_id)
            .bind(&requirement_title)
            .bind(statistics.total_votes)
            .bind(statistics.approve_count)
            .bind(statistics.reject_count)
            .bind(statistics.abstain_count)
            .bind(statistics.approve_percentage)
            .bind(statistics.reject_percentage)
            .bind(statistics.abstain_percentage)
            .bind(&snapshot)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            results.push(VoteResult {
                id: archived.last_insert_rowid(),
                tenant_id,
                meeting_id,
                requirement_id: requirement.requirement_id,
                requirement_title,
                total_votes: statistics.total_votes,
                approve_count: statistics.approve_count,
                reject_count: statistics.reject_count,
                abstain_count: statistics.abstain_count,
                approve_percentage: statistics.approve_percentage,
                reject_percentage: statistics.reject_percentage,
                abstain_percentage: statistics.abstain_percentage,
                statistics,
                archived_at: now,
            });
        }

        tx.commit().await?;

        info!(
            "Meeting {} completed: {} abstentions recorded, {} results archived",
            meeting_id,
            abstained,
            results.len()
        );

        Ok(Some((results, abstained)))
    }

    // ------------------------------------------------------------------
    // Attendees
    // ------------------------------------------------------------------

    pub async fn add_attendee(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        user_id: i64,
        attendance_status: AttendanceStatus,
        now: DateTime<Utc>,
    ) -> Result<Attendee, StorageError> {
        debug!("Adding attendee {} to meeting {}", user_id, meeting_id);

        let row = sqlx::query(
            r#"
            INSERT INTO review_meeting_attendees
                (tenant_id, meeting_id, user_id, attendance_status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(meeting_id)
        .bind(user_id)
        .bind(attendance_status)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row_to_attendee(&row)
    }

    pub async fn get_attendee(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        user_id: i64,
    ) -> Result<Option<Attendee>, StorageError> {
        let row = sqlx::query(
            "SELECT * FROM review_meeting_attendees WHERE meeting_id = ? AND user_id = ? AND tenant_id = ?",
        )
        .bind(meeting_id)
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_attendee).transpose()
    }

    pub async fn list_attendees(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> Result<Vec<Attendee>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM review_meeting_attendees WHERE meeting_id = ? AND tenant_id = ? ORDER BY id",
        )
        .bind(meeting_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_attendee).collect()
    }

    pub async fn update_attendance(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        user_id: i64,
        attendance_status: AttendanceStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Attendee>, StorageError> {
        let row = sqlx::query(
            r#"
            UPDATE review_meeting_attendees
            SET attendance_status = ?, updated_at = ?
            WHERE meeting_id = ? AND user_id = ? AND tenant_id = ?
            RETURNING *
            "#,
        )
        .bind(attendance_status)
        .bind(now)
        .bind(meeting_id)
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_attendee).transpose()
    }

    /// Remove an attendee; their votes in this meeting go with them
    pub async fn remove_attendee(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        user_id: i64,
    ) -> Result<bool, StorageError> {
        debug!("Removing attendee {} from meeting {}", user_id, meeting_id);

        let result = sqlx::query(
            "DELETE FROM review_meeting_attendees WHERE meeting_id = ? AND user_id = ? AND tenant_id = ?",
        )
        .bind(meeting_id)
        .bind(user_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Meeting requirements
    // ------------------------------------------------------------------

    /// Put a requirement on the agenda; without an explicit order it goes last
    pub async fn add_meeting_requirement(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
        review_order: Option<i64>,
        assigned_voter_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<MeetingRequirement, StorageError> {
        debug!("Adding requirement {} to meeting {}", requirement_id, meeting_id);

        let row = sqlx::query(
            r#"
            INSERT INTO review_meeting_requirements
                (tenant_id, meeting_id, requirement_id, review_order, assigned_voter_ids, created_at, updated_at)
            VALUES (?, ?, ?,
                    COALESCE(?, (SELECT COALESCE(MAX(review_order), 0) + 1
                                 FROM review_meeting_requirements WHERE meeting_id = ?)),
                    ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(meeting_id)
        .bind(requirement_id)
        .bind(review_order)
        .bind(meeting_id)
        .bind(encode_voter_ids(assigned_voter_ids)?)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row_to_meeting_requirement(&row)
    }

    pub async fn get_meeting_requirement(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
    ) -> Result<Option<MeetingRequirement>, StorageError> {
        let row = sqlx::query(
            "SELECT * FROM review_meeting_requirements WHERE meeting_id = ? AND requirement_id = ? AND tenant_id = ?",
        )
        .bind(meeting_id)
        .bind(requirement_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_meeting_requirement).transpose()
    }

    pub async fn list_meeting_requirements(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> Result<Vec<MeetingRequirement>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        fetch_meeting_requirements(&mut conn, tenant_id, meeting_id).await
    }

    pub async fn update_meeting_requirement(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
        input: &MeetingRequirementUpdateInput,
        now: DateTime<Utc>,
    ) -> Result<Option<MeetingRequirement>, StorageError> {
        let mut query_parts = vec!["updated_at = ?"];
        if input.review_order.is_some() {
            query_parts.push("review_order = ?");
        }
        if input.assigned_voter_ids.is_some() {
            query_parts.push("assigned_voter_ids = ?");
        }

        let query_str = format!(
            "UPDATE review_meeting_requirements SET {} WHERE meeting_id = ? AND requirement_id = ? AND tenant_id = ? RETURNING *",
            query_parts.join(", ")
        );

        let mut query = sqlx::query(&query_str).bind(now);
        if let Some(review_order) = input.review_order {
            query = query.bind(review_order);
        }
        if let Some(voter_ids) = &input.assigned_voter_ids {
            query = query.bind(encode_voter_ids(voter_ids)?);
        }

        let row = query
            .bind(meeting_id)
            .bind(requirement_id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_meeting_requirement).transpose()
    }

    /// Take a requirement off the agenda; votes on it in this meeting go with it
    pub async fn remove_meeting_requirement(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "DELETE FROM review_meeting_requirements WHERE meeting_id = ? AND requirement_id = ? AND tenant_id = ?",
        )
        .bind(meeting_id)
        .bind(requirement_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Votes
    // ------------------------------------------------------------------

    /// Insert or replace the voter's ballot for one requirement.
    ///
    /// The write only lands while the meeting is `in_progress`, checked in the same
    /// statement. Returns `None` when the meeting was not in progress at write time.
    pub async fn upsert_vote(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
        voter_id: i64,
        vote_option: VoteOption,
        comment: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Vote>, StorageError> {
        debug!(
            "Recording {:?} vote from {} on requirement {} in meeting {}",
            vote_option, voter_id, requirement_id, meeting_id
        );

        let row = sqlx::query(
            r#"
            INSERT INTO review_votes
                (tenant_id, meeting_id, requirement_id, voter_id, vote_option, comment, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?
            WHERE EXISTS (
                SELECT 1 FROM review_meetings
                WHERE id = ? AND tenant_id = ? AND status = ?
            )
            ON CONFLICT(meeting_id, requirement_id, voter_id) DO UPDATE SET
                vote_option = excluded.vote_option,
                comment = excluded.comment,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(meeting_id)
        .bind(requirement_id)
        .bind(voter_id)
        .bind(vote_option)
        .bind(comment)
        .bind(now)
        .bind(now)
        .bind(meeting_id)
        .bind(tenant_id)
        .bind(MeetingStatus::InProgress)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_vote).transpose()
    }

    pub async fn get_vote(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
        voter_id: i64,
    ) -> Result<Option<Vote>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT * FROM review_votes
            WHERE meeting_id = ? AND requirement_id = ? AND voter_id = ? AND tenant_id = ?
            "#,
        )
        .bind(meeting_id)
        .bind(requirement_id)
        .bind(voter_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_vote).transpose()
    }

    pub async fn list_votes(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
    ) -> Result<Vec<Vote>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        fetch_votes(&mut conn, tenant_id, meeting_id, requirement_id).await
    }

    pub async fn list_meeting_votes(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> Result<Vec<Vote>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM review_votes WHERE meeting_id = ? AND tenant_id = ? ORDER BY requirement_id, id",
        )
        .bind(meeting_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_vote).collect()
    }

    // ------------------------------------------------------------------
    // Archived results
    // ------------------------------------------------------------------

    pub async fn list_vote_results(
        &self,
        tenant_id: i64,
        meeting_id: i64,
    ) -> Result<Vec<VoteResult>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT r.* FROM review_vote_results r
            LEFT JOIN review_meeting_requirements mr
                ON mr.meeting_id = r.meeting_id AND mr.requirement_id = r.requirement_id
            WHERE r.meeting_id = ? AND r.tenant_id = ?
            ORDER BY mr.review_order, r.id
            "#,
        )
        .bind(meeting_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_vote_result).collect()
    }

    pub async fn get_vote_result(
        &self,
        tenant_id: i64,
        meeting_id: i64,
        requirement_id: i64,
    ) -> Result<Option<VoteResult>, StorageError> {
        let row = sqlx::query(
            "SELECT * FROM review_vote_results WHERE meeting_id = ? AND requirement_id = ? AND tenant_id = ?",
        )
        .bind(meeting_id)
        .bind(requirement_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_vote_result).transpose()
    }
}

async fn fetch_meeting_requirements(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    meeting_id: i64,
) -> Result<Vec<MeetingRequirement>, StorageError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM review_meeting_requirements
        WHERE meeting_id = ? AND tenant_id = ?
        ORDER BY review_order, id
        "#,
    )
    .bind(meeting_id)
    .bind(tenant_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(row_to_meeting_requirement).collect()
}

async fn fetch_votes(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    meeting_id: i64,
    requirement_id: i64,
) -> Result<Vec<Vote>, StorageError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM review_votes
        WHERE meeting_id = ? AND requirement_id = ? AND tenant_id = ?
        ORDER BY updated_at, id
        "#,
    )
    .bind(meeting_id)
    .bind(requirement_id)
    .bind(tenant_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(row_to_vote).collect()
}

fn encode_voter_ids(voter_ids: &[i64]) -> Result<Option<String>, StorageError> {
    if voter_ids.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(voter_ids)?))
    }
}

fn decode_voter_ids(raw: Option<String>) -> Result<Vec<i64>, StorageError> {
    match raw {
        Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(&json)?),
        _ => Ok(Vec::new()),
    }
}

fn row_to_meeting(row: &sqlx::sqlite::SqliteRow) -> Result<Meeting, StorageError> {
    Ok(Meeting {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        meeting_no: row.try_get("meeting_no")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        status: row.try_get("status")?,
        moderator_id: row.try_get("moderator_id")?,
        created_by: row.try_get("created_by")?,
        scheduled_at: row.try_get("scheduled_at")?,
        started_at: row.try_get("started_at")?,
        ended_at: row.try_get("ended_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_attendee(row: &sqlx::sqlite::SqliteRow) -> Result<Attendee, StorageError> {
    Ok(Attendee {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        meeting_id: row.try_get("meeting_id")?,
        user_id: row.try_get("user_id")?,
        attendance_status: row.try_get("attendance_status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_meeting_requirement(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<MeetingRequirement, StorageError> {
    Ok(MeetingRequirement {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        meeting_id: row.try_get("meeting_id")?,
        requirement_id: row.try_get("requirement_id")?,
        review_order: row.try_get("review_order")?,
        assigned_voter_ids: decode_voter_ids(row.try_get("assigned_voter_ids")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_vote(row: &sqlx::sqlite::SqliteRow) -> Result<Vote, StorageError> {
    Ok(Vote {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        meeting_id: row.try_get("meeting_id")?,
        requirement_id: row.try_get("requirement_id")?,
        voter_id: row.try_get("voter_id")?,
        vote_option: row.try_get("vote_option")?,
        comment: row.try_get("comment")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_vote_result(row: &sqlx::sqlite::SqliteRow) -> Result<VoteResult, StorageError> {
    let snapshot: String = row.try_get("statistics")?;

    Ok(VoteResult {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        meeting_id: row.try_get("meeting_id")?,
        requirement_id: row.try_get("requirement_id")?,
        requirement_title: row.try_get("requirement_title")?,
        total_votes: row.try_get("total_votes")?,
        approve_count: row.try_get("approve_count")?,
        reject_count: row.try_get("reject_count")?,
        abstain_count: row.try_get("abstain_count")?,
        approve_percentage: row.try_get("approve_percentage")?,
        reject_percentage: row.try_get("reject_percentage")?,
        abstain_percentage: row.try_get("abstain_percentage")?,
        statistics: serde_json::from_str(&snapshot)?,
        archived_at: row.try_get("archived_at")?,
    })
}
