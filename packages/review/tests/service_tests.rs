// ABOUTME: Integration tests for the review meeting workflow
// ABOUTME: Exercises lifecycle, participants, voting, end-of-meeting archiving, and tenant isolation

use chrono::Utc;
use pretty_assertions::assert_eq;
use sqlx::SqlitePool;

use reqhub_review::{
    AttendanceStatus, CastVoteInput, MeetingCreateInput, MeetingFilter, MeetingRequirementInput,
    MeetingRequirementUpdateInput, MeetingStatus, MeetingStorage, MeetingUpdateInput, ReviewError,
    ReviewService, VoteOption, ABSTAIN_SYSTEM_COMMENT,
};
use reqhub_storage::test_utils::{insert_requirement, insert_user, memory_pool};

const TENANT: i64 = 1;
const OTHER_TENANT: i64 = 2;

struct Fixture {
    pool: SqlitePool,
    service: ReviewService,
    alice: i64,
    bob: i64,
    carol: i64,
    login: i64,
    export: i64,
}

async fn fixture() -> Fixture {
    let pool = memory_pool().await;
    let alice = insert_user(&pool, TENANT, "alice", "Alice").await;
    let bob = insert_user(&pool, TENANT, "bob", "Bob").await;
    let carol = insert_user(&pool, TENANT, "carol", "Carol").await;
    let login = insert_requirement(&pool, TENANT, "Single sign-on login").await;
    let export = insert_requirement(&pool, TENANT, "CSV export").await;

    Fixture {
        service: ReviewService::sqlite(pool.clone()),
        pool,
        alice,
        bob,
        carol,
        login,
        export,
    }
}

fn meeting_input(title: &str) -> MeetingCreateInput {
    MeetingCreateInput {
        title: title.to_string(),
        ..Default::default()
    }
}

fn ballot(option: VoteOption) -> CastVoteInput {
    CastVoteInput {
        vote_option: option,
        comment: None,
    }
}

fn agenda_item(requirement_id: i64, assigned: Option<Vec<i64>>) -> MeetingRequirementInput {
    MeetingRequirementInput {
        requirement_id,
        review_order: None,
        assigned_voter_ids: assigned,
    }
}

/// Meeting moderated by alice with alice, bob, and carol attending and `login` on the agenda
async fn meeting_with_agenda(f: &Fixture, assigned: Option<Vec<i64>>) -> i64 {
    let meeting = f
        .service
        .create_meeting(TENANT, f.alice, meeting_input("Sprint 12 review"))
        .await
        .unwrap();

    for user in [f.alice, f.bob, f.carol] {
        f.service
            .add_attendee(TENANT, meeting.id, user, None)
            .await
            .unwrap();
    }
    f.service
        .add_meeting_requirement(TENANT, meeting.id, agenda_item(f.login, assigned))
        .await
        .unwrap();

    meeting.id
}

async fn vote_rows(pool: &SqlitePool, meeting_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM review_votes WHERE meeting_id = ?")
        .bind(meeting_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_meeting_numbers_per_day() {
    let f = fixture().await;
    let day = Utc::now().format("%Y%m%d").to_string();

    let first = f
        .service
        .create_meeting(TENANT, f.bob, meeting_input("  Planning  "))
        .await
        .unwrap();
    let second = f
        .service
        .create_meeting(TENANT, f.bob, meeting_input("Follow-up"))
        .await
        .unwrap();

    assert_eq!(first.meeting_no, format!("RM-{}-001", day));
    assert_eq!(second.meeting_no, format!("RM-{}-002", day));
    assert_eq!(first.title, "Planning");
    assert_eq!(first.status, MeetingStatus::Scheduled);
    assert_eq!(first.moderator_id, f.bob);
    assert_eq!(first.created_by, f.bob);
}

#[tokio::test]
async fn test_create_meeting_validates_input() {
    let f = fixture().await;

    let err = f
        .service
        .create_meeting(TENANT, f.alice, meeting_input("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::Validation(_)));

    let err = f
        .service
        .create_meeting(
            TENANT,
            f.alice,
            MeetingCreateInput {
                title: "Review".to_string(),
                moderator_id: Some(9999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::UserNotFound(9999)));
}

#[tokio::test]
async fn test_list_meetings_filters_by_status() {
    let f = fixture().await;
    let started = f
        .service
        .create_meeting(TENANT, f.alice, meeting_input("One"))
        .await
        .unwrap();
    f.service
        .create_meeting(TENANT, f.alice, meeting_input("Two"))
        .await
        .unwrap();
    f.service.start_meeting(TENANT, started.id).await.unwrap();

    let (all, total) = f
        .service
        .list_meetings(TENANT, &MeetingFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(total, 2);

    let (running, total) = f
        .service
        .list_meetings(
            TENANT,
            &MeetingFilter {
                status: Some(MeetingStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(running[0].id, started.id);

    let (page, total) = f
        .service
        .list_meetings(
            TENANT,
            &MeetingFilter {
                status: None,
                limit: Some(1),
                offset: Some(1),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_start_succeeds_exactly_once() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;

    let started = f.service.start_meeting(TENANT, meeting_id).await.unwrap();
    assert_eq!(started.status, MeetingStatus::InProgress);
    assert!(started.started_at.is_some());

    let err = f
        .service
        .start_meeting(TENANT, meeting_id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReviewError::InvalidTransition {
            from: MeetingStatus::InProgress,
            action: "start"
        }
    ));
}

#[tokio::test]
async fn test_cancel_only_from_scheduled() {
    let f = fixture().await;
    let scheduled = meeting_with_agenda(&f, None).await;

    let cancelled = f.service.cancel_meeting(TENANT, scheduled).await.unwrap();
    assert_eq!(cancelled.status, MeetingStatus::Cancelled);

    let err = f.service.start_meeting(TENANT, scheduled).await.unwrap_err();
    assert!(matches!(
        err,
        ReviewError::InvalidTransition {
            from: MeetingStatus::Cancelled,
            ..
        }
    ));

    let running = meeting_with_agenda(&f, None).await;
    f.service.start_meeting(TENANT, running).await.unwrap();
    let err = f.service.cancel_meeting(TENANT, running).await.unwrap_err();
    assert!(matches!(
        err,
        ReviewError::InvalidTransition {
            from: MeetingStatus::InProgress,
            action: "cancel"
        }
    ));
}

#[tokio::test]
async fn test_terminal_meetings_reject_changes() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;
    f.service.cancel_meeting(TENANT, meeting_id).await.unwrap();

    let err = f
        .service
        .update_meeting(
            TENANT,
            meeting_id,
            MeetingUpdateInput {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::InvalidTransition { .. }));

    let err = f
        .service
        .remove_attendee(TENANT, meeting_id, f.bob)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_update_meeting_changes_only_given_fields() {
    let f = fixture().await;
    let meeting = f
        .service
        .create_meeting(
            TENANT,
            f.alice,
            MeetingCreateInput {
                title: "Original".to_string(),
                location: Some("Room 4".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = f
        .service
        .update_meeting(
            TENANT,
            meeting.id,
            MeetingUpdateInput {
                title: Some("Renamed".to_string()),
                moderator_id: Some(f.carol),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.moderator_id, f.carol);
    assert_eq!(updated.location.as_deref(), Some("Room 4"));
}

#[tokio::test]
async fn test_attendee_management() {
    let f = fixture().await;
    let meeting = f
        .service
        .create_meeting(TENANT, f.alice, meeting_input("Attendees"))
        .await
        .unwrap();

    let attendee = f
        .service
        .add_attendee(TENANT, meeting.id, f.bob, None)
        .await
        .unwrap();
    assert_eq!(attendee.attendance_status, AttendanceStatus::Invited);

    let err = f
        .service
        .add_attendee(TENANT, meeting.id, f.bob, Some(AttendanceStatus::Accepted))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::Conflict(_)));

    let err = f
        .service
        .add_attendee(TENANT, meeting.id, 4242, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::UserNotFound(4242)));

    let updated = f
        .service
        .update_attendance(TENANT, meeting.id, f.bob, AttendanceStatus::Declined)
        .await
        .unwrap();
    assert_eq!(updated.attendance_status, AttendanceStatus::Declined);

    f.service
        .remove_attendee(TENANT, meeting.id, f.bob)
        .await
        .unwrap();
    let err = f
        .service
        .remove_attendee(TENANT, meeting.id, f.bob)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::AttendeeNotFound { .. }));
    assert!(f
        .service
        .list_attendees(TENANT, meeting.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_agenda_ordering_and_validation() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;

    let second = f
        .service
        .add_meeting_requirement(TENANT, meeting_id, agenda_item(f.export, None))
        .await
        .unwrap();
    assert_eq!(second.review_order, 2);

    let err = f
        .service
        .add_meeting_requirement(TENANT, meeting_id, agenda_item(f.export, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::Conflict(_)));

    let err = f
        .service
        .add_meeting_requirement(TENANT, meeting_id, agenda_item(777, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::RequirementNotFound(777)));

    let outsider = insert_user(&f.pool, TENANT, "dave", "Dave").await;
    let err = f
        .service
        .update_meeting_requirement(
            TENANT,
            meeting_id,
            f.export,
            MeetingRequirementUpdateInput {
                review_order: None,
                assigned_voter_ids: Some(vec![f.bob, outsider]),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::Validation(_)));

    f.service
        .update_meeting_requirement(
            TENANT,
            meeting_id,
            f.export,
            MeetingRequirementUpdateInput {
                review_order: Some(0),
                assigned_voter_ids: Some(vec![f.bob]),
            },
        )
        .await
        .unwrap();

    let agenda = f
        .service
        .list_meeting_requirements(TENANT, meeting_id)
        .await
        .unwrap();
    assert_eq!(
        agenda.iter().map(|mr| mr.requirement_id).collect::<Vec<_>>(),
        vec![f.export, f.login]
    );
    assert_eq!(agenda[0].assigned_voter_ids, vec![f.bob]);
    assert!(agenda[1].assigned_voter_ids.is_empty());
}

#[tokio::test]
async fn test_vote_preconditions() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, Some(vec![f.alice, f.bob])).await;

    let err = f
        .service
        .cast_vote(TENANT, meeting_id, f.login, f.alice, ballot(VoteOption::Approve))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReviewError::MeetingNotInProgress(MeetingStatus::Scheduled)
    ));

    f.service.start_meeting(TENANT, meeting_id).await.unwrap();

    let err = f
        .service
        .cast_vote(TENANT, meeting_id, f.export, f.alice, ballot(VoteOption::Approve))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::RequirementNotFound(_)));

    let outsider = insert_user(&f.pool, TENANT, "dave", "Dave").await;
    let err = f
        .service
        .cast_vote(TENANT, meeting_id, f.login, outsider, ballot(VoteOption::Approve))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::NotAttendee(id) if id == outsider));

    let err = f
        .service
        .cast_vote(TENANT, meeting_id, f.login, f.carol, ballot(VoteOption::Approve))
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::NotAssignedVoter(id) if id == f.carol));
}

#[tokio::test]
async fn test_declined_attendee_may_still_vote() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;
    f.service
        .update_attendance(TENANT, meeting_id, f.carol, AttendanceStatus::Declined)
        .await
        .unwrap();
    f.service.start_meeting(TENANT, meeting_id).await.unwrap();

    let vote = f
        .service
        .cast_vote(TENANT, meeting_id, f.login, f.carol, ballot(VoteOption::Reject))
        .await
        .unwrap();
    assert_eq!(vote.vote_option, VoteOption::Reject);
}

#[tokio::test]
async fn test_revote_keeps_single_row() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;
    f.service.start_meeting(TENANT, meeting_id).await.unwrap();

    let first = f
        .service
        .cast_vote(TENANT, meeting_id, f.login, f.bob, ballot(VoteOption::Approve))
        .await
        .unwrap();
    let second = f
        .service
        .cast_vote(
            TENANT,
            meeting_id,
            f.login,
            f.bob,
            CastVoteInput {
                vote_option: VoteOption::Reject,
                comment: Some("  Needs a security review  ".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(vote_rows(&f.pool, meeting_id).await, 1);

    let stored = f
        .service
        .get_vote(TENANT, meeting_id, f.login, f.bob)
        .await
        .unwrap();
    assert_eq!(stored.vote_option, VoteOption::Reject);
    assert_eq!(stored.comment.as_deref(), Some("Needs a security review"));
    assert!(stored.updated_at >= stored.created_at);

    let err = f
        .service
        .get_vote(TENANT, meeting_id, f.login, f.carol)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::VoteNotFound { .. }));
}

#[tokio::test]
async fn test_live_statistics_and_pending_voters() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;
    f.service
        .add_meeting_requirement(
            TENANT,
            meeting_id,
            agenda_item(f.export, Some(vec![f.carol])),
        )
        .await
        .unwrap();
    f.service.start_meeting(TENANT, meeting_id).await.unwrap();

    f.service
        .cast_vote(TENANT, meeting_id, f.login, f.alice, ballot(VoteOption::Approve))
        .await
        .unwrap();

    let stats = f
        .service
        .vote_statistics(TENANT, meeting_id, f.login)
        .await
        .unwrap();
    assert_eq!(stats.total_votes, 1);
    assert_eq!(stats.approve_percentage, 100.0);
    assert_eq!(stats.eligible_voter_count, 3);
    assert!(!stats.is_complete);
    assert_eq!(stats.voters[0].voter_name.as_deref(), Some("Alice"));

    let pending = f.service.pending_voters(TENANT, meeting_id).await.unwrap();
    assert_eq!(pending.len(), 2);

    assert_eq!(pending[0].requirement_id, f.login);
    assert_eq!(
        pending[0].requirement_title.as_deref(),
        Some("Single sign-on login")
    );
    assert_eq!(
        pending[0].pending.iter().map(|p| p.user_id).collect::<Vec<_>>(),
        vec![f.bob, f.carol]
    );

    assert_eq!(pending[1].requirement_id, f.export);
    assert_eq!(pending[1].eligible_voter_count, 1);
    assert_eq!(pending[1].pending[0].display_name.as_deref(), Some("Carol"));
}

#[tokio::test]
async fn test_end_meeting_abstains_and_archives() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, Some(vec![f.alice, f.bob, f.carol])).await;
    f.service.start_meeting(TENANT, meeting_id).await.unwrap();

    f.service
        .cast_vote(TENANT, meeting_id, f.login, f.alice, ballot(VoteOption::Approve))
        .await
        .unwrap();
    f.service
        .cast_vote(TENANT, meeting_id, f.login, f.bob, ballot(VoteOption::Reject))
        .await
        .unwrap();

    let summary = f.service.end_meeting(TENANT, meeting_id).await.unwrap();

    assert_eq!(summary.meeting.status, MeetingStatus::Completed);
    assert!(summary.meeting.ended_at.is_some());
    assert_eq!(summary.auto_abstained, 1);
    assert_eq!(summary.results.len(), 1);

    let result = &summary.results[0];
    assert_eq!(result.requirement_title.as_deref(), Some("Single sign-on login"));
    assert_eq!(
        (result.approve_count, result.reject_count, result.abstain_count),
        (1, 1, 1)
    );
    assert_eq!(result.approve_percentage, 33.3);
    assert_eq!(result.reject_percentage, 33.3);
    assert_eq!(result.abstain_percentage, 33.3);
    assert!(result.statistics.is_complete);

    let abstain = f
        .service
        .get_vote(TENANT, meeting_id, f.login, f.carol)
        .await
        .unwrap();
    assert_eq!(abstain.vote_option, VoteOption::Abstain);
    assert_eq!(abstain.comment.as_deref(), Some(ABSTAIN_SYSTEM_COMMENT));

    let archived = f
        .service
        .get_vote_result(TENANT, meeting_id, f.login)
        .await
        .unwrap();
    assert_eq!(archived.statistics, result.statistics);
    assert_eq!(archived.total_votes, 3);
}

#[tokio::test]
async fn test_end_covers_every_agenda_item() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;
    f.service
        .add_meeting_requirement(TENANT, meeting_id, agenda_item(f.export, Some(vec![f.bob])))
        .await
        .unwrap();
    f.service.start_meeting(TENANT, meeting_id).await.unwrap();

    let summary = f.service.end_meeting(TENANT, meeting_id).await.unwrap();

    // Three abstentions on login, one on export
    assert_eq!(summary.auto_abstained, 4);
    assert_eq!(vote_rows(&f.pool, meeting_id).await, 4);

    let results = f.service.list_vote_results(TENANT, meeting_id).await.unwrap();
    assert_eq!(
        results.iter().map(|r| r.requirement_id).collect::<Vec<_>>(),
        vec![f.login, f.export]
    );
    assert!(results.iter().all(|r| r.abstain_percentage == 100.0));
}

#[tokio::test]
async fn test_second_end_fails_without_new_results() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;
    f.service.start_meeting(TENANT, meeting_id).await.unwrap();
    f.service.end_meeting(TENANT, meeting_id).await.unwrap();

    let err = f.service.end_meeting(TENANT, meeting_id).await.unwrap_err();
    assert!(matches!(
        err,
        ReviewError::InvalidTransition {
            from: MeetingStatus::Completed,
            action: "end"
        }
    ));

    let results = f.service.list_vote_results(TENANT, meeting_id).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_end_requires_in_progress() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;

    let err = f.service.end_meeting(TENANT, meeting_id).await.unwrap_err();
    assert!(matches!(
        err,
        ReviewError::InvalidTransition {
            from: MeetingStatus::Scheduled,
            ..
        }
    ));
    assert_eq!(vote_rows(&f.pool, meeting_id).await, 0);
}

#[tokio::test]
async fn test_removing_attendee_drops_their_votes() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;
    f.service.start_meeting(TENANT, meeting_id).await.unwrap();
    f.service
        .cast_vote(TENANT, meeting_id, f.login, f.bob, ballot(VoteOption::Approve))
        .await
        .unwrap();

    f.service
        .remove_attendee(TENANT, meeting_id, f.bob)
        .await
        .unwrap();

    assert_eq!(vote_rows(&f.pool, meeting_id).await, 0);
    let stats = f
        .service
        .vote_statistics(TENANT, meeting_id, f.login)
        .await
        .unwrap();
    assert_eq!(stats.eligible_voter_count, 2);
}

#[tokio::test]
async fn test_delete_meeting() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;

    f.service.delete_meeting(TENANT, meeting_id).await.unwrap();

    let err = f.service.get_meeting(TENANT, meeting_id).await.unwrap_err();
    assert!(matches!(err, ReviewError::MeetingNotFound(_)));
    let err = f
        .service
        .delete_meeting(TENANT, meeting_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::MeetingNotFound(_)));
}

#[tokio::test]
async fn test_meetings_are_tenant_scoped() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;

    let err = f
        .service
        .get_meeting(OTHER_TENANT, meeting_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::MeetingNotFound(_)));

    let err = f
        .service
        .start_meeting(OTHER_TENANT, meeting_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::MeetingNotFound(_)));

    let (meetings, total) = f
        .service
        .list_meetings(OTHER_TENANT, &MeetingFilter::default())
        .await
        .unwrap();
    assert!(meetings.is_empty());
    assert_eq!(total, 0);

    // Directory rows are tenant-scoped as well
    let stranger = insert_user(&f.pool, OTHER_TENANT, "eve", "Eve").await;
    let err = f
        .service
        .add_attendee(TENANT, meeting_id, stranger, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::UserNotFound(_)));

    let detail = f
        .service
        .get_meeting_detail(TENANT, meeting_id)
        .await
        .unwrap();
    assert_eq!(detail.attendees.len(), 3);
    assert_eq!(detail.requirements.len(), 1);
}

#[tokio::test]
async fn test_late_vote_write_cannot_touch_completed_meeting() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;
    f.service.start_meeting(TENANT, meeting_id).await.unwrap();
    f.service
        .cast_vote(TENANT, meeting_id, f.login, f.alice, ballot(VoteOption::Approve))
        .await
        .unwrap();
    f.service.end_meeting(TENANT, meeting_id).await.unwrap();

    // A write whose status check passed before the meeting ended
    let storage = MeetingStorage::new(f.pool.clone());
    let late = storage
        .upsert_vote(
            TENANT,
            meeting_id,
            f.login,
            f.bob,
            VoteOption::Approve,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
    assert!(late.is_none());

    let bob_vote = f
        .service
        .get_vote(TENANT, meeting_id, f.login, f.bob)
        .await
        .unwrap();
    assert_eq!(bob_vote.vote_option, VoteOption::Abstain);

    let live = f
        .service
        .vote_statistics(TENANT, meeting_id, f.login)
        .await
        .unwrap();
    let archived = f
        .service
        .get_vote_result(TENANT, meeting_id, f.login)
        .await
        .unwrap();
    assert_eq!(live, archived.statistics);
    assert_eq!((archived.approve_count, archived.abstain_count), (1, 2));

    let err = f
        .service
        .cast_vote(TENANT, meeting_id, f.login, f.bob, ballot(VoteOption::Approve))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReviewError::MeetingNotInProgress(MeetingStatus::Completed)
    ));
}

#[tokio::test]
async fn test_failed_archive_rolls_back_end_meeting() {
    let f = fixture().await;
    let meeting_id = meeting_with_agenda(&f, None).await;
    f.service.start_meeting(TENANT, meeting_id).await.unwrap();
    f.service
        .cast_vote(TENANT, meeting_id, f.login, f.alice, ballot(VoteOption::Approve))
        .await
        .unwrap();

    sqlx::query(
        r#"
        CREATE TRIGGER fail_result_archive BEFORE INSERT ON review_vote_results
        BEGIN
            SELECT RAISE(ABORT, 'archive unavailable');
        END
        "#,
    )
    .execute(&f.pool)
    .await
    .unwrap();

    let err = f.service.end_meeting(TENANT, meeting_id).await.unwrap_err();
    assert!(matches!(err, ReviewError::Storage(_)));

    let meeting = f.service.get_meeting(TENANT, meeting_id).await.unwrap();
    assert_eq!(meeting.status, MeetingStatus::InProgress);
    assert!(meeting.ended_at.is_none());

    let votes = f
        .service
        .list_votes(TENANT, meeting_id, f.login)
        .await
        .unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].voter_id, f.alice);

    let results = f
        .service
        .list_vote_results(TENANT, meeting_id)
        .await
        .unwrap();
    assert!(results.is_empty());

    // Once the archive works again the meeting can still be ended
    sqlx::query("DROP TRIGGER fail_result_archive")
        .execute(&f.pool)
        .await
        .unwrap();
    let summary = f.service.end_meeting(TENANT, meeting_id).await.unwrap();
    assert_eq!(summary.auto_abstained, 2);
}
