//! Capacity invariant under contention and retry.

mod common;

use joinup::error::Error;
use joinup::services::admission_service::{self, Decision};
use joinup::services::{activity_service, ledger_service, query_service};

use common::{create_open_activity, test_state};

// Scenario A: two pending users race for the last spot; exactly one wins.
#[tokio::test]
async fn concurrent_accepts_for_last_spot() {
    let (state, _) = test_state().await;
    let activity_id = create_open_activity(&state, "creator", 1).await;

    let alice = ledger_service::express_interest(&state, &activity_id, "alice")
        .await
        .unwrap();
    let bob = ledger_service::express_interest(&state, &activity_id, "bob")
        .await
        .unwrap();

    let (r1, r2) = tokio::join!(
        admission_service::decide(
            &state,
            &activity_id,
            &alice.participation_id,
            "creator",
            Decision::Accept,
        ),
        admission_service::decide(
            &state,
            &activity_id,
            &bob.participation_id,
            "creator",
            Decision::Accept,
        ),
    );

    let wins = [r1.is_ok(), r2.is_ok()].iter().filter(|&&w| w).count();
    assert_eq!(wins, 1, "exactly one accept must win the last spot");
    let loser = if r1.is_err() { r1.unwrap_err() } else { r2.unwrap_err() };
    assert!(matches!(loser, Error::CapacityExceeded));

    assert_eq!(
        query_service::available_spots(&state.pool, &activity_id)
            .await
            .unwrap(),
        0
    );

    // The losing record is untouched and stays pending.
    let roster = query_service::get_roster(&state.pool, &activity_id)
        .await
        .unwrap();
    let accepted = roster.iter().filter(|p| p.status == "accepted").count();
    let pending = roster.iter().filter(|p| p.status == "pending").count();
    assert_eq!((accepted, pending), (1, 1));
}

#[tokio::test]
async fn accepted_count_never_exceeds_total_under_load() {
    let (state, _) = test_state().await;
    let total_spots = 3;
    let activity_id = create_open_activity(&state, "creator", total_spots).await;

    let mut records = Vec::new();
    for i in 0..10 {
        let user = format!("user{i}");
        records.push(
            ledger_service::express_interest(&state, &activity_id, &user)
                .await
                .unwrap(),
        );
    }

    let mut handles = Vec::new();
    for record in records {
        let state = state.clone();
        let activity_id = activity_id.clone();
        handles.push(tokio::spawn(async move {
            admission_service::decide(
                &state,
                &activity_id,
                &record.participation_id,
                "creator",
                Decision::Accept,
            )
            .await
        }));
    }

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(Error::CapacityExceeded) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(accepted, total_spots);
    assert_eq!(rejected, 10 - total_spots);

    let activity = activity_service::get_activity(&state.pool, &activity_id)
        .await
        .unwrap();
    assert!(activity.accepted_count <= activity.total_spots);
    assert_eq!(activity.accepted_count, total_spots);
}

// Round-trip property: a retried accept observes the decrement exactly once.
#[tokio::test]
async fn accept_retry_is_idempotent() {
    let (state, _) = test_state().await;
    let activity_id = create_open_activity(&state, "creator", 2).await;
    let record = ledger_service::express_interest(&state, &activity_id, "alice")
        .await
        .unwrap();

    let first = admission_service::decide(
        &state,
        &activity_id,
        &record.participation_id,
        "creator",
        Decision::Accept,
    )
    .await
    .unwrap();
    // Client timed out and re-sends the same decision.
    let retry = admission_service::decide(
        &state,
        &activity_id,
        &record.participation_id,
        "creator",
        Decision::Accept,
    )
    .await
    .unwrap();

    assert_eq!(first.status, "accepted");
    assert_eq!(retry.status, "accepted");
    assert_eq!(first.decided_at, retry.decided_at);
    assert_eq!(
        query_service::available_spots(&state.pool, &activity_id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn remove_retry_is_idempotent() {
    let (state, _) = test_state().await;
    let activity_id = create_open_activity(&state, "creator", 1).await;
    let record = ledger_service::express_interest(&state, &activity_id, "alice")
        .await
        .unwrap();
    admission_service::decide(
        &state,
        &activity_id,
        &record.participation_id,
        "creator",
        Decision::Accept,
    )
    .await
    .unwrap();

    admission_service::remove(&state, &activity_id, &record.participation_id, "creator")
        .await
        .unwrap();
    let retry = admission_service::remove(&state, &activity_id, &record.participation_id, "creator")
        .await
        .unwrap();
    assert_eq!(retry.status, "removed");

    // Decremented exactly once.
    assert_eq!(
        query_service::available_spots(&state.pool, &activity_id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn switching_decision_after_accept_is_invalid() {
    let (state, _) = test_state().await;
    let activity_id = create_open_activity(&state, "creator", 2).await;
    let record = ledger_service::express_interest(&state, &activity_id, "alice")
        .await
        .unwrap();
    admission_service::decide(
        &state,
        &activity_id,
        &record.participation_id,
        "creator",
        Decision::Accept,
    )
    .await
    .unwrap();

    let err = admission_service::decide(
        &state,
        &activity_id,
        &record.participation_id,
        "creator",
        Decision::Decline,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn accept_on_full_activity_leaves_record_pending() {
    let (state, _) = test_state().await;
    let activity_id = create_open_activity(&state, "creator", 1).await;

    let alice = ledger_service::express_interest(&state, &activity_id, "alice")
        .await
        .unwrap();
    let bob = ledger_service::express_interest(&state, &activity_id, "bob")
        .await
        .unwrap();

    admission_service::decide(
        &state,
        &activity_id,
        &alice.participation_id,
        "creator",
        Decision::Accept,
    )
    .await
    .unwrap();

    let err = admission_service::decide(
        &state,
        &activity_id,
        &bob.participation_id,
        "creator",
        Decision::Accept,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::CapacityExceeded));

    // A decline on the still-pending loser remains possible.
    let declined = admission_service::decide(
        &state,
        &activity_id,
        &bob.participation_id,
        "creator",
        Decision::Decline,
    )
    .await
    .unwrap();
    assert_eq!(declined.status, "declined");
}

#[tokio::test]
async fn concurrent_leave_and_accept_stay_consistent() {
    let (state, _) = test_state().await;
    let activity_id = create_open_activity(&state, "creator", 1).await;

    let alice = ledger_service::express_interest(&state, &activity_id, "alice")
        .await
        .unwrap();
    admission_service::decide(
        &state,
        &activity_id,
        &alice.participation_id,
        "creator",
        Decision::Accept,
    )
    .await
    .unwrap();
    let bob = ledger_service::express_interest(&state, &activity_id, "bob")
        .await
        .unwrap();

    // Alice leaves while the creator tries to admit Bob. Whatever the
    // interleaving, the count never exceeds capacity.
    let (_left, decide) = tokio::join!(
        ledger_service::leave(&state, &activity_id, "alice"),
        admission_service::decide(
            &state,
            &activity_id,
            &bob.participation_id,
            "creator",
            Decision::Accept,
        ),
    );

    let activity = activity_service::get_activity(&state.pool, &activity_id)
        .await
        .unwrap();
    assert!(activity.accepted_count <= activity.total_spots);
    match decide {
        Ok(row) => assert_eq!(row.status, "accepted"),
        Err(Error::CapacityExceeded) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
}
