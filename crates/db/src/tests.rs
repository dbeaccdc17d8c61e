use std::path::PathBuf;

use chrono::Duration;

use common::{from_unix, types::UserId, DateTime};

use super::*;

fn test_dir() -> PathBuf {
    common::test_dir("../../target/test-db")
}

async fn prepare() -> (DB, PathBuf) {
    common::init_test_logger();

    let dir = test_dir();
    log::debug!("using store at {}", dir.display());
    (DB::init(&dir).await.unwrap(), dir)
}

fn order(user: u64, created_at: DateTime) -> Order {
    Order::builder()
        .order_id(Order::make_id(created_at))
        .user_id(UserId(user))
        .username(format!("user{user}"))
        .first_name(format!("U{user}"))
        .amount(109)
        .created_at(created_at)
        .expires_at(created_at + Duration::minutes(10))
        .build()
}

fn member(user: u64, order_id: &str, joined_at: DateTime) -> Member {
    Member::builder()
        .user_id(UserId(user))
        .first_name(format!("U{user}"))
        .order_id(order_id.to_string())
        .joined_at(joined_at)
        .build()
}

#[tokio::test]
async fn test_missing_files_give_empty_store() {
    let (db, _) = prepare().await;

    assert!(db.all_orders().await.is_empty());
    assert!(db.all_members().await.is_empty());
    assert!(db.get_invite_link(UserId(1)).await.is_none());
    assert_eq!(db.load_stats().await, Stats::default());
}

#[tokio::test]
async fn test_round_trip_all_mappings() {
    let (db, dir) = prepare().await;
    let t0 = from_unix(1000);

    let mut approved = order(1, t0);
    approved.mark_confirmed(t0 + Duration::minutes(5)).unwrap();
    approved
        .mark_approved(t0 + Duration::minutes(6), "https://t.me/+one".to_string())
        .unwrap();
    db.add_order(approved).await.unwrap();
    db.add_order(order(2, t0 + Duration::seconds(1))).await.unwrap();

    db.put_member_once(member(1, "ORD1000", t0)).await.unwrap();
    db.put_invite_link(
        InviteLink::builder()
            .user_id(UserId(1))
            .link("https://t.me/+one".to_string())
            .order_id("ORD1000".to_string())
            .created_at(t0)
            .expires_at(t0 + Duration::hours(24))
            .username("user1".to_string())
            .build(),
    )
    .await
    .unwrap();
    db.put_pending_action(
        UserId(2),
        PendingAction::AwaitingScreenshot {
            order_id: "ORD1001".to_string(),
            since: t0,
        },
    )
    .await
    .unwrap();

    let reopened = DB::init(&dir).await.unwrap();

    let mut before = db.all_orders().await;
    let mut after = reopened.all_orders().await;
    before.sort_by(|a, b| a.order_id().cmp(b.order_id()));
    after.sort_by(|a, b| a.order_id().cmp(b.order_id()));
    assert_eq!(before, after);
    assert_eq!(db.all_members().await, reopened.all_members().await);
    assert_eq!(
        db.get_invite_link(UserId(1)).await,
        reopened.get_invite_link(UserId(1)).await
    );
    assert_eq!(
        db.get_pending_action(UserId(2)).await,
        reopened.get_pending_action(UserId(2)).await
    );
}

#[tokio::test]
async fn test_order_id_collision_is_bumped() {
    let (db, _) = prepare().await;
    let t0 = from_unix(1000);

    let first = db.add_order(order(1, t0)).await.unwrap();
    let second = db.add_order(order(2, t0)).await.unwrap();

    assert_eq!(first.order_id(), "ORD1000");
    assert_eq!(second.order_id(), "ORD1001");
    assert_eq!(db.get_order("ORD1001").await.unwrap().user_id(), UserId(2));
}

#[tokio::test]
async fn test_find_open_order() {
    let (db, _) = prepare().await;
    let t0 = from_unix(1000);

    let mut rejected = order(1, t0);
    rejected.mark_rejected(t0, None).unwrap();
    db.add_order(rejected).await.unwrap();
    assert!(db.find_open_order(UserId(1)).await.is_none());

    let saved = db.add_order(order(1, t0 + Duration::seconds(5))).await.unwrap();
    db.add_order(order(2, t0 + Duration::seconds(6))).await.unwrap();

    let open = db.find_open_order(UserId(1)).await.unwrap();
    assert_eq!(open, saved);
    assert_eq!(db.orders_by_status(OrderStatus::Pending).await.len(), 2);
}

#[tokio::test]
async fn test_member_created_once() {
    let (db, _) = prepare().await;
    let t0 = from_unix(1000);

    assert!(db.put_member_once(member(1, "ORD1000", t0)).await.unwrap());
    assert!(!db.put_member_once(member(1, "ORD2000", t0)).await.unwrap());

    let m = db.get_member(UserId(1)).await.unwrap();
    assert_eq!(m.order_id(), "ORD1000");
    assert!(m.active());
    assert_eq!(db.all_members().await.len(), 1);
}

#[tokio::test]
async fn test_take_pending_action() {
    let (db, _) = prepare().await;
    let action = PendingAction::AwaitingScreenshot {
        order_id: "ORD1000".to_string(),
        since: from_unix(1000),
    };

    db.put_pending_action(UserId(1), action.clone()).await.unwrap();
    assert_eq!(db.take_pending_action(UserId(1)).await.unwrap(), Some(action));
    assert_eq!(db.take_pending_action(UserId(1)).await.unwrap(), None);
}

#[tokio::test]
async fn test_corrupt_file_is_moved_aside() {
    let dir = test_dir();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(ORDERS_FILE), "[1, 2, 3]").unwrap();

    let db = DB::init(&dir).await.unwrap();
    assert!(db.all_orders().await.is_empty());

    let moved = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| e.file_name().to_string_lossy().starts_with("orders.json.corrupt-"));
    assert!(moved, "corrupt orders file was not moved aside");

    // store keeps working after recovery
    db.add_order(order(1, from_unix(1000))).await.unwrap();
    assert_eq!(DB::init(&dir).await.unwrap().all_orders().await.len(), 1);
}

#[tokio::test]
async fn test_no_temp_file_left_after_save() {
    let (db, dir) = prepare().await;
    db.add_order(order(1, from_unix(1000))).await.unwrap();

    assert!(dir.join(ORDERS_FILE).exists());
    assert!(!dir.join("orders.json.tmp").exists());
}

#[tokio::test]
async fn test_stats() {
    let (db, _) = prepare().await;
    let t0 = from_unix(1000);

    let mut approved = order(1, t0);
    approved.mark_approved(t0, "https://t.me/+one".to_string()).unwrap();
    db.add_order(approved).await.unwrap();

    let mut waiting = order(2, t0 + Duration::seconds(1));
    waiting.mark_confirmed(t0).unwrap();
    db.add_order(waiting).await.unwrap();

    let mut rejected = order(3, t0 + Duration::seconds(2));
    rejected.mark_rejected(t0, Some("no money".to_string())).unwrap();
    db.add_order(rejected).await.unwrap();

    db.add_order(order(4, t0 + Duration::seconds(3))).await.unwrap();
    db.put_member_once(member(1, "ORD1000", t0)).await.unwrap();

    let stats = db.load_stats().await;
    assert_eq!(
        stats,
        Stats {
            total_orders: 4,
            pending: 1,
            awaiting_approval: 1,
            approved: 1,
            rejected: 1,
            members: 1,
            invite_links: 0,
            revenue: 109,
        }
    );
}
