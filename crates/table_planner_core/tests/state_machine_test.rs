//! Tests for the signup/waitlist state machine.

use chrono::{DateTime, TimeDelta, Utc};
use table_planner_core::{
    ArchiveReason, GuildId, JoinOutcome, SeatKind, TableFields, TableRecord, UserId,
};
use table_planner_error::{PlannerErrorKind, TableErrorKind};

fn fields(capacity: u32) -> TableFields {
    TableFields::new("Call of Cthulhu", "Saturday 19:00", "Masks of Nyarlathotep", capacity)
        .unwrap()
}

fn table(capacity: u32) -> TableRecord {
    TableRecord::create(fields(capacity), UserId(100), GuildId(1), base_time())
}

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-01T18:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn at(seconds: i64) -> DateTime<Utc> {
    base_time() + TimeDelta::seconds(seconds)
}

fn ids(entries: &[table_planner_core::SeatEntry]) -> Vec<u64> {
    entries.iter().map(|entry| entry.user_id().0).collect()
}

fn table_error(err: &table_planner_error::PlannerError) -> &TableErrorKind {
    match err.kind() {
        PlannerErrorKind::Table(table) => table.kind(),
        other => panic!("expected a table error, got {other}"),
    }
}

#[test]
fn test_create_starts_empty() {
    let record = table(5);
    assert_eq!(*record.capacity(), 5);
    assert!(record.roster().is_empty());
    assert!(record.waitlist().is_empty());
    assert!(!record.is_archived());
    assert_eq!(*record.created_at(), base_time());
}

#[test]
fn test_create_assigns_unique_ids() {
    let first = table(2);
    let second = table(2);
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_join_then_leave_restores_state() {
    let mut record = table(3);
    record.join(UserId(1), None, at(1)).unwrap();
    let before = record.clone();

    assert_eq!(record.join(UserId(2), None, at(2)).unwrap(), JoinOutcome::Seated);
    let outcome = record.leave(UserId(2)).unwrap();

    assert_eq!(outcome.left, SeatKind::Roster);
    assert!(outcome.promoted.is_none());
    assert_eq!(record.roster(), before.roster());
    assert_eq!(record.waitlist(), before.waitlist());
}

#[test]
fn test_overflow_goes_to_waitlist_in_join_order() {
    let mut record = table(2);
    for user in 1..=5 {
        record.join(UserId(user), None, at(user as i64)).unwrap();
    }

    assert_eq!(record.roster().len(), 2);
    assert_eq!(ids(record.roster()), vec![1, 2]);
    assert_eq!(ids(record.waitlist()), vec![3, 4, 5]);
}

#[test]
fn test_waitlist_position_reported() {
    let mut record = table(1);
    record.join(UserId(1), None, at(1)).unwrap();
    record.join(UserId(2), None, at(2)).unwrap();
    let outcome = record.join(UserId(3), None, at(3)).unwrap();
    assert_eq!(outcome, JoinOutcome::Waitlisted { position: 2 });
}

#[test]
fn test_equal_timestamps_keep_insertion_order() {
    let mut record = table(1);
    record.join(UserId(1), None, at(0)).unwrap();
    record.join(UserId(2), None, at(5)).unwrap();
    record.join(UserId(3), None, at(5)).unwrap();
    record.join(UserId(4), None, at(5)).unwrap();
    assert_eq!(ids(record.waitlist()), vec![2, 3, 4]);
}

#[test]
fn test_duplicate_join_rejected() {
    let mut record = table(1);
    record.join(UserId(1), None, at(1)).unwrap();
    record.join(UserId(2), None, at(2)).unwrap();

    let err = record.join(UserId(1), None, at(3)).unwrap_err();
    assert_eq!(
        table_error(&err),
        &TableErrorKind::AlreadyInTable {
            user: 1,
            waitlisted: false
        }
    );

    let err = record.join(UserId(2), None, at(4)).unwrap_err();
    assert_eq!(
        table_error(&err),
        &TableErrorKind::AlreadyInTable {
            user: 2,
            waitlisted: true
        }
    );
    assert_eq!(record.roster().len() + record.waitlist().len(), 2);
}

#[test]
fn test_leave_unknown_user_rejected() {
    let mut record = table(2);
    let err = record.leave(UserId(9)).unwrap_err();
    assert_eq!(table_error(&err), &TableErrorKind::NotInTable { user: 9 });
}

#[test]
fn test_leave_promotes_earliest_waitlisted() {
    let mut record = table(2);
    record.join(UserId(1), None, at(1)).unwrap();
    record.join(UserId(2), None, at(2)).unwrap();
    record.join(UserId(3), None, at(3)).unwrap();
    record.join(UserId(4), None, at(4)).unwrap();

    let outcome = record.leave(UserId(1)).unwrap();
    assert_eq!(outcome.promoted.map(|e| e.user_id().0), Some(3));
    assert_eq!(record.roster().len(), 2);
    assert_eq!(ids(record.roster()), vec![2, 3]);
    assert_eq!(ids(record.waitlist()), vec![4]);
}

#[test]
fn test_leave_from_waitlist_never_promotes() {
    let mut record = table(1);
    record.join(UserId(1), None, at(1)).unwrap();
    record.join(UserId(2), None, at(2)).unwrap();
    record.join(UserId(3), None, at(3)).unwrap();

    let outcome = record.leave(UserId(2)).unwrap();
    assert_eq!(outcome.left, SeatKind::Waitlist);
    assert!(outcome.promoted.is_none());
    assert_eq!(ids(record.roster()), vec![1]);
    assert_eq!(ids(record.waitlist()), vec![3]);
}

#[test]
fn test_capacity_one_handoff_scenario() {
    let mut record = table(1);
    assert_eq!(record.join(UserId(1), None, at(1)).unwrap(), JoinOutcome::Seated);
    assert_eq!(
        record.join(UserId(2), None, at(2)).unwrap(),
        JoinOutcome::Waitlisted { position: 1 }
    );
    record.leave(UserId(1)).unwrap();

    assert_eq!(ids(record.roster()), vec![2]);
    assert!(record.waitlist().is_empty());
}

#[test]
fn test_shrinking_capacity_demotes_latest_joiners() {
    let mut record = table(3);
    record.join(UserId(1), None, at(1)).unwrap();
    record.join(UserId(2), None, at(2)).unwrap();
    record.join(UserId(3), None, at(3)).unwrap();

    let outcome = record.edit(fields(1)).unwrap();

    assert_eq!(ids(&outcome.demoted), vec![3, 2]);
    assert_eq!(ids(record.roster()), vec![1]);
    assert_eq!(ids(record.waitlist()), vec![2, 3]);
}

#[test]
fn test_demoted_players_merge_into_existing_waitlist_by_join_time() {
    let mut record = table(3);
    record.join(UserId(1), None, at(1)).unwrap();
    record.join(UserId(2), None, at(2)).unwrap();
    record.join(UserId(3), None, at(3)).unwrap();
    record.join(UserId(4), None, at(4)).unwrap();

    let outcome = record.edit(fields(2)).unwrap();

    assert_eq!(outcome.demoted.len(), 1);
    assert_eq!(ids(record.waitlist()), vec![3, 4]);
    let times: Vec<_> = record.waitlist().iter().map(|e| *e.joined_at()).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}

#[test]
fn test_growing_capacity_does_not_promote() {
    let mut record = table(1);
    record.join(UserId(1), None, at(1)).unwrap();
    record.join(UserId(2), None, at(2)).unwrap();

    let outcome = record.edit(fields(4)).unwrap();

    assert!(outcome.demoted.is_empty());
    assert_eq!(ids(record.roster()), vec![1]);
    assert_eq!(ids(record.waitlist()), vec![2]);
}

#[test]
fn test_edit_updates_text_fields() {
    let mut record = table(2);
    let updated = TableFields::new("Delta Green", "Sunday 15:00", "Impossible Landscapes", 2)
        .unwrap();
    record.edit(updated).unwrap();
    assert_eq!(record.system(), "Delta Green");
    assert_eq!(record.schedule(), "Sunday 15:00");
    assert_eq!(record.description(), "Impossible Landscapes");
}

#[test]
fn test_archive_by_owner_and_moderator() {
    let mut owned = table(2);
    assert_eq!(
        owned.archive(UserId(100), false, at(10)).unwrap(),
        ArchiveReason::Owner
    );
    let info = owned.archive_info().clone().unwrap();
    assert_eq!(*info.archived_by(), Some(UserId(100)));
    assert_eq!(*info.archived_at(), at(10));

    let mut moderated = table(2);
    assert_eq!(
        moderated.archive(UserId(7), true, at(10)).unwrap(),
        ArchiveReason::Moderator
    );
}

#[test]
fn test_archive_requires_authority() {
    let mut record = table(2);
    let err = record.archive(UserId(7), false, at(10)).unwrap_err();
    assert!(matches!(
        table_error(&err),
        TableErrorKind::Forbidden { user: 7, .. }
    ));
    assert!(!record.is_archived());
}

#[test]
fn test_archived_record_is_frozen() {
    let mut record = table(2);
    record.archive(UserId(100), false, at(10)).unwrap();

    let err = record.join(UserId(1), None, at(11)).unwrap_err();
    assert!(matches!(table_error(&err), TableErrorKind::NotFound(_)));
    let err = record.archive(UserId(100), false, at(12)).unwrap_err();
    assert!(matches!(table_error(&err), TableErrorKind::NotFound(_)));
    assert!(record.edit(fields(3)).is_err());
}

#[test]
fn test_display_name_cache_kept_on_entry() {
    let mut record = table(2);
    record
        .join(UserId(1), Some("Alice".to_string()), at(1))
        .unwrap();
    record.join(UserId(2), None, at(2)).unwrap();
    assert_eq!(record.roster()[0].label(), "Alice");
    assert_eq!(record.roster()[1].label(), "2");
}

#[test]
fn test_record_serializes_absent_display_name() {
    let mut record = table(2);
    record.join(UserId(1), None, at(1)).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    let entry = &json["roster"][0];
    assert!(entry.get("display_name").is_none());
    assert!(json["archive"].is_null());
}
