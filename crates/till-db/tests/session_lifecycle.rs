//! Integration tests for the register session lifecycle.
//!
//! Every test runs against an isolated in-memory database with the real
//! schema, exercising the open → record → close cycle end to end.

use chrono::{Duration, Utc};

use till_core::{
    aggregator::summarize, CoreError, CountedAmounts, DateRange, MovementType, NewMovement,
    PaymentMethod, SessionStatus, REVERSAL_CATEGORY, TIP_CATEGORY,
};
use till_db::{Database, DbConfig, DbError, MovementFilter, RegisterEvent};

// =============================================================================
// Helpers
// =============================================================================

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn test_register(db: &Database) -> String {
    db.registers()
        .create("tenant-1", "branch-1", "Front counter")
        .await
        .unwrap()
        .id
}

fn movement(
    movement_type: MovementType,
    amount_cents: i64,
    payment_method: PaymentMethod,
    category: Option<&str>,
) -> NewMovement {
    NewMovement {
        movement_type,
        amount_cents,
        payment_method,
        category: category.map(str::to_string),
        description: "test movement".to_string(),
        order_id: None,
    }
}

fn sale(amount_cents: i64, payment_method: PaymentMethod) -> NewMovement {
    movement(MovementType::Sale, amount_cents, payment_method, None)
}

fn counted(cash: i64, card: i64, transfer: i64, other: i64) -> CountedAmounts {
    CountedAmounts {
        cash_cents: cash,
        card_cents: card,
        transfer_cents: transfer,
        other_cents: other,
    }
}

// =============================================================================
// Round Trip
// =============================================================================

/// Open with a float, record nothing, count exactly the float: balanced.
#[tokio::test]
async fn round_trip_without_movements_balances() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::Open);
    assert!(session.end_time.is_none());

    let closed = db
        .sessions()
        .close(&session.id, counted(1000, 0, 0, 0), "cashier-1", None)
        .await
        .unwrap();

    assert_eq!(closed.status, SessionStatus::Closed);
    assert_eq!(closed.difference_cents, Some(0));
    assert!(closed.end_time.is_some());
    assert_eq!(closed.closed_by.as_deref(), Some("cashier-1"));
}

// =============================================================================
// Scenario A & B: counted vs expected
// =============================================================================

#[tokio::test]
async fn close_balances_when_counted_matches_expected() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();

    db.movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap();
    db.movements()
        .record(&register_id, sale(300, PaymentMethod::Card))
        .await
        .unwrap();

    let closed = db
        .sessions()
        .close(&session.id, counted(1500, 300, 0, 0), "cashier-1", None)
        .await
        .unwrap();

    // expected = 1000 float + 800 sales = 1800; counted = 1800
    assert_eq!(closed.difference_cents, Some(0));
    assert_eq!(closed.end_cash_cents, Some(1500));
    assert_eq!(closed.end_card_cents, Some(300));

    let (_, summary) = db.reports().session_detail(&session.id).await.unwrap();
    assert_eq!(summary.total_sales_cents, 800);
    assert_eq!(summary.cash_sales_cents, 500);
    assert_eq!(summary.card_sales_cents, 300);
    assert_eq!(summary.order_count, 2);
}

#[tokio::test]
async fn close_reports_shortage_when_cash_is_missing() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();

    db.movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap();
    db.movements()
        .record(&register_id, sale(300, PaymentMethod::Card))
        .await
        .unwrap();

    let closed = db
        .sessions()
        .close(&session.id, counted(1400, 300, 0, 0), "cashier-1", None)
        .await
        .unwrap();

    assert_eq!(closed.difference_cents, Some(-100));
}

// =============================================================================
// Scenario C: single-open invariant
// =============================================================================

#[tokio::test]
async fn second_open_conflicts_and_creates_nothing() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let first = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();

    let err = db
        .sessions()
        .open(&register_id, 2000, "cashier-2", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::SessionAlreadyOpen { .. })
    ));

    // The loser left nothing behind; the winner still holds the slot.
    let open = db.sessions().get_open(&register_id).await.unwrap().unwrap();
    assert_eq!(open.id, first.id);
    assert_eq!(open.initial_cash_cents, 1000);
}

/// A different register is unaffected by another register's open session.
#[tokio::test]
async fn open_sessions_are_per_register() {
    let db = test_db().await;
    let register_a = test_register(&db).await;
    let register_b = db
        .registers()
        .create("tenant-1", "branch-1", "Bar")
        .await
        .unwrap()
        .id;

    db.sessions()
        .open(&register_a, 1000, "cashier-1", None)
        .await
        .unwrap();
    db.sessions()
        .open(&register_b, 500, "cashier-2", None)
        .await
        .unwrap();

    assert!(db.sessions().get_open(&register_a).await.unwrap().is_some());
    assert!(db.sessions().get_open(&register_b).await.unwrap().is_some());
}

// =============================================================================
// Scenario D: validation
// =============================================================================

#[tokio::test]
async fn non_positive_amount_is_rejected_and_not_persisted() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();

    for bad_amount in [-5, 0] {
        let err = db
            .movements()
            .record(&register_id, sale(bad_amount, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(_))
        ));
    }

    let movements = db.movements().for_session(&session.id).await.unwrap();
    assert!(movements.is_empty());
}

#[tokio::test]
async fn negative_initial_cash_is_rejected() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let err = db
        .sessions()
        .open(&register_id, -100, "cashier-1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    assert!(db.sessions().get_open(&register_id).await.unwrap().is_none());
}

#[tokio::test]
async fn negative_counted_amount_is_rejected() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();

    let err = db
        .sessions()
        .close(&session.id, counted(1000, -1, 0, 0), "cashier-1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

    // The failed close changed nothing.
    let open = db.sessions().get_open(&register_id).await.unwrap();
    assert!(open.is_some());
}

// =============================================================================
// Scenario E: historical listing
// =============================================================================

#[tokio::test]
async fn list_sessions_filters_by_range_and_orders_newest_first() {
    let db = test_db().await;
    let register_id = test_register(&db).await;
    let other_branch_register = db
        .registers()
        .create("tenant-1", "branch-2", "Back office")
        .await
        .unwrap()
        .id;

    let first = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();
    db.sessions()
        .close(&first.id, counted(1000, 0, 0, 0), "cashier-1", None)
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let second = db
        .sessions()
        .open(&register_id, 2000, "cashier-2", None)
        .await
        .unwrap();

    // A session in another branch must not appear.
    db.sessions()
        .open(&other_branch_register, 500, "cashier-3", None)
        .await
        .unwrap();

    let today = DateRange::new(Utc::now() - Duration::hours(1), Utc::now() + Duration::hours(1));
    let sessions = db
        .reports()
        .list_sessions("branch-1", today, 50, 0)
        .await
        .unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, second.id);
    assert_eq!(sessions[1].id, first.id);

    // A range in the future matches nothing.
    let future = DateRange::since(Utc::now() + Duration::hours(2));
    let none = db
        .reports()
        .list_sessions("branch-1", future, 50, 0)
        .await
        .unwrap();
    assert!(none.is_empty());

    // Paging restarts where the previous page ended.
    let page = db
        .reports()
        .list_sessions(
            "branch-1",
            DateRange::new(Utc::now() - Duration::hours(1), Utc::now() + Duration::hours(1)),
            1,
            1,
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, first.id);
}

// =============================================================================
// Scenario F: closed is terminal
// =============================================================================

#[tokio::test]
async fn second_close_fails_and_leaves_state_unchanged() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();
    db.movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap();

    let closed = db
        .sessions()
        .close(&session.id, counted(1500, 0, 0, 0), "cashier-1", None)
        .await
        .unwrap();

    let err = db
        .sessions()
        .close(&session.id, counted(9999, 0, 0, 0), "cashier-2", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::InvalidSessionStatus { .. })
    ));

    // The failed call altered nothing.
    let reread = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
    assert_eq!(reread.end_cash_cents, closed.end_cash_cents);
    assert_eq!(reread.difference_cents, Some(0));
    assert_eq!(reread.closed_by.as_deref(), Some("cashier-1"));
}

#[tokio::test]
async fn closing_unknown_session_is_not_found() {
    let db = test_db().await;

    let err = db
        .sessions()
        .close("no-such-session", counted(0, 0, 0, 0), "cashier-1", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::SessionNotFound(_))
    ));
}

// =============================================================================
// Movement ledger rules
// =============================================================================

#[tokio::test]
async fn movement_requires_an_open_session() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let err = db
        .movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::NoOpenSession { .. })
    ));

    let err = db
        .movements()
        .record("no-such-register", sale(500, PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::RegisterNotFound(_))
    ));
}

#[tokio::test]
async fn movements_are_rejected_after_close() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();
    db.sessions()
        .close(&session.id, counted(1000, 0, 0, 0), "cashier-1", None)
        .await
        .unwrap();

    let err = db
        .movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::NoOpenSession { .. })
    ));
}

#[tokio::test]
async fn query_movements_pages_newest_first() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();

    let mut recorded = Vec::new();
    for (amount, method) in [
        (100, PaymentMethod::Cash),
        (200, PaymentMethod::Card),
        (300, PaymentMethod::Cash),
    ] {
        recorded.push(
            db.movements()
                .record(&register_id, sale(amount, method))
                .await
                .unwrap(),
        );
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let filter = MovementFilter {
        session_id: Some(session.id.clone()),
        ..Default::default()
    };

    let page = db
        .movements()
        .query(&register_id, &filter, 2, 0)
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, recorded[2].id);
    assert_eq!(page[1].id, recorded[1].id);

    let rest = db
        .movements()
        .query(&register_id, &filter, 2, 2)
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].id, recorded[0].id);

    let cash_only = MovementFilter {
        payment_method: Some(PaymentMethod::Cash),
        ..Default::default()
    };
    let cash = db
        .movements()
        .query(&register_id, &cash_only, 50, 0)
        .await
        .unwrap();
    assert_eq!(cash.len(), 2);
    assert!(cash.iter().all(|m| m.payment_method == PaymentMethod::Cash));
}

#[tokio::test]
async fn reversal_cancels_money_but_not_activity() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();

    db.movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap();
    db.movements()
        .record(
            &register_id,
            movement(
                MovementType::Sale,
                500,
                PaymentMethod::Cash,
                Some(REVERSAL_CATEGORY),
            ),
        )
        .await
        .unwrap();

    // Money is back where it started; the drawer holds exactly the float.
    let closed = db
        .sessions()
        .close(&session.id, counted(1000, 0, 0, 0), "cashier-1", None)
        .await
        .unwrap();
    assert_eq!(closed.difference_cents, Some(0));

    let (_, summary) = db.reports().session_detail(&session.id).await.unwrap();
    assert_eq!(summary.total_sales_cents, 0);
    assert_eq!(summary.order_count, 1);
}

#[tokio::test]
async fn tips_income_and_expense_stay_out_of_the_expected_total() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();

    db.movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap();
    db.movements()
        .record(
            &register_id,
            movement(MovementType::Income, 250, PaymentMethod::Cash, Some(TIP_CATEGORY)),
        )
        .await
        .unwrap();
    db.movements()
        .record(
            &register_id,
            movement(MovementType::Expense, 400, PaymentMethod::Cash, Some("supplier")),
        )
        .await
        .unwrap();

    // expected = float + sales only: 1000 + 500.
    let closed = db
        .sessions()
        .close(&session.id, counted(1500, 0, 0, 0), "cashier-1", None)
        .await
        .unwrap();
    assert_eq!(closed.difference_cents, Some(0));

    let (_, summary) = db.reports().session_detail(&session.id).await.unwrap();
    assert_eq!(summary.tips_cents, 250);
    assert_eq!(summary.expense_cents, 400);
    assert_eq!(summary.total_sales_cents, 500);
}

// =============================================================================
// Frozen vs live summaries
// =============================================================================

#[tokio::test]
async fn closed_session_summary_is_frozen_and_re_derivable() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();
    db.movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap();
    db.movements()
        .record(&register_id, sale(300, PaymentMethod::Card))
        .await
        .unwrap();

    db.sessions()
        .close(&session.id, counted(1500, 300, 0, 0), "cashier-1", None)
        .await
        .unwrap();

    let (_, frozen) = db.reports().session_detail(&session.id).await.unwrap();
    let (_, again) = db.reports().session_detail(&session.id).await.unwrap();
    assert_eq!(frozen, again);

    // Independent re-derivation from the persisted movement set matches the
    // frozen snapshot exactly.
    let movements = db.movements().for_session(&session.id).await.unwrap();
    assert_eq!(summarize(&movements), frozen);
}

#[tokio::test]
async fn open_session_summary_is_recomputed_per_call() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();

    let (_, before) = db.reports().session_detail(&session.id).await.unwrap();
    assert_eq!(before.total_sales_cents, 0);

    db.movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap();

    let (_, after) = db.reports().session_detail(&session.id).await.unwrap();
    assert_eq!(after.total_sales_cents, 500);
}

// =============================================================================
// Notes
// =============================================================================

#[tokio::test]
async fn notes_can_be_appended_after_close() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", Some("morning shift"))
        .await
        .unwrap();
    db.sessions()
        .close(&session.id, counted(1000, 0, 0, 0), "cashier-1", None)
        .await
        .unwrap();

    db.sessions()
        .append_note(&session.id, "variance reviewed by manager")
        .await
        .unwrap();

    let reread = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
    assert_eq!(reread.notes, "morning shift\nvariance reviewed by manager");

    let err = db
        .sessions()
        .append_note("no-such-session", "x")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::SessionNotFound(_))
    ));
}

// =============================================================================
// Registers
// =============================================================================

#[tokio::test]
async fn inactive_register_accepts_no_new_sessions() {
    let db = test_db().await;
    let register_id = test_register(&db).await;

    db.registers().deactivate(&register_id).await.unwrap();

    let err = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::RegisterInactive(_))
    ));
}

#[tokio::test]
async fn list_registers_by_branch() {
    let db = test_db().await;
    db.registers()
        .create("tenant-1", "branch-1", "Front counter")
        .await
        .unwrap();
    db.registers()
        .create("tenant-1", "branch-1", "Bar")
        .await
        .unwrap();
    db.registers()
        .create("tenant-1", "branch-2", "Back office")
        .await
        .unwrap();

    let registers = db.registers().list_by_branch("branch-1").await.unwrap();
    assert_eq!(registers.len(), 2);
    assert_eq!(registers[0].name, "Bar");
    assert_eq!(registers[1].name, "Front counter");
}

// =============================================================================
// Change notification
// =============================================================================

#[tokio::test]
async fn lifecycle_emits_events_in_order() {
    let db = test_db().await;
    let register_id = test_register(&db).await;
    let mut rx = db.events().subscribe();

    let session = db
        .sessions()
        .open(&register_id, 1000, "cashier-1", None)
        .await
        .unwrap();
    db.movements()
        .record(&register_id, sale(500, PaymentMethod::Cash))
        .await
        .unwrap();
    db.sessions()
        .close(&session.id, counted(1500, 0, 0, 0), "cashier-1", None)
        .await
        .unwrap();

    match rx.recv().await.unwrap() {
        RegisterEvent::SessionOpened { session_id, .. } => assert_eq!(session_id, session.id),
        other => panic!("expected SessionOpened, got {other:?}"),
    }
    match rx.recv().await.unwrap() {
        RegisterEvent::MovementRecorded { session_id, .. } => assert_eq!(session_id, session.id),
        other => panic!("expected MovementRecorded, got {other:?}"),
    }
    match rx.recv().await.unwrap() {
        RegisterEvent::SessionClosed {
            session_id,
            difference_cents,
            ..
        } => {
            assert_eq!(session_id, session.id);
            assert_eq!(difference_cents, 0);
        }
        other => panic!("expected SessionClosed, got {other:?}"),
    }
}
