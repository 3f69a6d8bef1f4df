//! End-to-end negotiation flow tests: propose, counter-offer, accept,
//! meeting, completion, and reviews, with the chat as the audit trail.

use database::models::{MessageKind, TradeStatus};
use database::Database;
use marketplace::error::MarketError;
use marketplace::listings::NewListing;
use marketplace::{chats, listings, reviews, trades, users, MeetingInput};

async fn test_db() -> Database {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

async fn register(db: &Database, name: &str) -> String {
    users::register(db.pool(), name, None).await.unwrap().id
}

async fn listing_for(db: &Database, owner: &str, title: &str) -> String {
    listings::create(
        db.pool(),
        owner,
        &NewListing {
            title: title.to_string(),
            description: "integration test item".to_string(),
            category: "tops".to_string(),
            size: "M".to_string(),
            condition: "good".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn meeting() -> MeetingInput {
    MeetingInput {
        time: "2026-09-01T17:30:00Z".to_string(),
        location: "Lindenmarkt fountain".to_string(),
        lat: Some(52.52),
        lng: Some(13.405),
    }
}

#[tokio::test]
async fn full_negotiation_flow() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;
    let boots = listing_for(&db, &bob, "Leather boots").await;

    let details = trades::propose(db.pool(), &alice, &bob, &[jacket], &[boots])
        .await
        .unwrap();
    let trade_id = details.trade.id.clone();
    assert_eq!(details.trade.status, TradeStatus::Pending);
    assert!(!details.trade.initiator_accepted);
    assert!(!details.trade.receiver_accepted);
    assert_eq!(details.initiator_items.len(), 1);
    assert_eq!(details.receiver_items.len(), 1);

    // The paired chat starts empty.
    let chat = database::chat::get_chat_by_trade(db.pool(), &trade_id)
        .await
        .unwrap();
    assert!(chats::messages(db.pool(), &chat.id, &alice)
        .await
        .unwrap()
        .is_empty());

    // One acceptance is not enough.
    let details = trades::accept(db.pool(), &trade_id, &alice).await.unwrap();
    assert_eq!(details.trade.status, TradeStatus::Pending);
    assert!(details.trade.initiator_accepted);

    // Both accepted: the trade advances.
    let details = trades::accept(db.pool(), &trade_id, &bob).await.unwrap();
    assert_eq!(details.trade.status, TradeStatus::Accepted);

    let details = trades::set_meeting(db.pool(), &trade_id, &alice, &meeting())
        .await
        .unwrap();
    assert_eq!(
        details.trade.meeting_location.as_deref(),
        Some("Lindenmarkt fountain")
    );

    let details = trades::complete(db.pool(), &trade_id, &bob).await.unwrap();
    assert_eq!(details.trade.status, TradeStatus::Completed);

    // 50 base + 10 per item across both offers, credited to both parties.
    for id in [&alice, &bob] {
        let user = database::user::get_user(db.pool(), id).await.unwrap();
        assert_eq!(user.experience, 70);
        assert_eq!(user.level, 1);
        assert_eq!(user.completed_trades, 1);
    }

    // Four state changes, four system messages, in order.
    let messages = chats::messages(db.pool(), &chat.id, &bob).await.unwrap();
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        [
            "Trade accepted",
            "Trade accepted",
            "Meeting details updated",
            "Trade completed successfully! Earned 70 XP for trading 2 items.",
        ]
    );
    assert!(messages.iter().all(|m| m.kind == MessageKind::TradeUpdate));
    assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn counter_offer_resets_consent() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;
    let boots = listing_for(&db, &bob, "Leather boots").await;
    let scarf = listing_for(&db, &bob, "Wool scarf").await;

    let details = trades::propose(db.pool(), &alice, &bob, &[jacket], &[boots])
        .await
        .unwrap();
    let trade_id = details.trade.id.clone();

    trades::accept(db.pool(), &trade_id, &alice).await.unwrap();

    // Bob counters with a different item; Alice's consent is void again.
    let details = trades::update_offer(db.pool(), &trade_id, &bob, &[scarf.clone()])
        .await
        .unwrap();
    assert!(!details.trade.initiator_accepted);
    assert!(!details.trade.receiver_accepted);
    assert_eq!(details.trade.status, TradeStatus::Pending);
    assert_eq!(details.receiver_items.len(), 1);
    assert_eq!(details.receiver_items[0].listing_id, scarf);
}

#[tokio::test]
async fn offer_update_rejected_once_accepted() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;
    let boots = listing_for(&db, &bob, "Leather boots").await;

    let details = trades::propose(db.pool(), &alice, &bob, &[jacket], &[])
        .await
        .unwrap();
    let trade_id = details.trade.id.clone();
    trades::accept(db.pool(), &trade_id, &alice).await.unwrap();
    trades::accept(db.pool(), &trade_id, &bob).await.unwrap();

    let result = trades::update_offer(db.pool(), &trade_id, &bob, &[boots]).await;
    assert!(matches!(result, Err(MarketError::InvalidState(_))));
}

#[tokio::test]
async fn complete_requires_accepted_state() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;

    let details = trades::propose(db.pool(), &alice, &bob, &[jacket], &[])
        .await
        .unwrap();
    let trade_id = details.trade.id.clone();

    let result = trades::complete(db.pool(), &trade_id, &alice).await;
    assert!(matches!(result, Err(MarketError::InvalidState(_))));

    // Status is unchanged and nobody was credited.
    let details = trades::get(db.pool(), &trade_id, &alice).await.unwrap();
    assert_eq!(details.trade.status, TradeStatus::Pending);
    let user = database::user::get_user(db.pool(), &alice).await.unwrap();
    assert_eq!(user.completed_trades, 0);
    assert_eq!(user.experience, 0);

    // Completing twice fails the second time.
    trades::accept(db.pool(), &trade_id, &alice).await.unwrap();
    trades::accept(db.pool(), &trade_id, &bob).await.unwrap();
    trades::complete(db.pool(), &trade_id, &alice).await.unwrap();
    let result = trades::complete(db.pool(), &trade_id, &bob).await;
    assert!(matches!(result, Err(MarketError::InvalidState(_))));
}

#[tokio::test]
async fn meeting_only_after_acceptance() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;

    let details = trades::propose(db.pool(), &alice, &bob, &[jacket], &[])
        .await
        .unwrap();
    let trade_id = details.trade.id.clone();

    let result = trades::set_meeting(db.pool(), &trade_id, &alice, &meeting()).await;
    assert!(matches!(result, Err(MarketError::InvalidState(_))));
}

#[tokio::test]
async fn outsiders_are_rejected_everywhere() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let mallory = register(&db, "Mallory").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;
    let boots = listing_for(&db, &bob, "Leather boots").await;

    let details = trades::propose(db.pool(), &alice, &bob, &[jacket], &[])
        .await
        .unwrap();
    let trade_id = details.trade.id.clone();
    let chat = database::chat::get_chat_by_trade(db.pool(), &trade_id)
        .await
        .unwrap();

    assert!(matches!(
        trades::get(db.pool(), &trade_id, &mallory).await,
        Err(MarketError::Forbidden(_))
    ));
    assert!(matches!(
        trades::update_offer(db.pool(), &trade_id, &mallory, &[boots]).await,
        Err(MarketError::Forbidden(_))
    ));
    assert!(matches!(
        trades::accept(db.pool(), &trade_id, &mallory).await,
        Err(MarketError::Forbidden(_))
    ));
    assert!(matches!(
        trades::set_meeting(db.pool(), &trade_id, &mallory, &meeting()).await,
        Err(MarketError::Forbidden(_))
    ));
    assert!(matches!(
        trades::complete(db.pool(), &trade_id, &mallory).await,
        Err(MarketError::Forbidden(_))
    ));
    assert!(matches!(
        chats::send_message(db.pool(), &chat.id, &mallory, "let me in").await,
        Err(MarketError::Forbidden(_))
    ));
    assert!(matches!(
        chats::messages(db.pool(), &chat.id, &mallory).await,
        Err(MarketError::Forbidden(_))
    ));
}

#[tokio::test]
async fn propose_validates_ownership_with_no_side_effects() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;

    // Claiming Alice's jacket as Bob's side of the offer must fail.
    let result = trades::propose(db.pool(), &alice, &bob, &[jacket.clone()], &[jacket]).await;
    assert!(matches!(result, Err(MarketError::Validation(_))));

    // And a listing that does not exist at all.
    let result =
        trades::propose(db.pool(), &alice, &bob, &["no-such-listing".to_string()], &[]).await;
    assert!(matches!(result, Err(MarketError::Validation(_))));

    // Nothing was created for either attempt.
    assert!(trades::list_for_user(db.pool(), &alice).await.unwrap().is_empty());
    assert!(chats::list_for_user(db.pool(), &alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn accept_is_idempotent() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;

    let details = trades::propose(db.pool(), &alice, &bob, &[jacket], &[])
        .await
        .unwrap();
    let trade_id = details.trade.id.clone();

    trades::accept(db.pool(), &trade_id, &alice).await.unwrap();
    let details = trades::accept(db.pool(), &trade_id, &alice).await.unwrap();
    assert_eq!(details.trade.status, TradeStatus::Pending);
    assert!(details.trade.initiator_accepted);
    assert!(!details.trade.receiver_accepted);
}

#[tokio::test]
async fn review_flow_and_upsert() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;

    let details = trades::propose(db.pool(), &alice, &bob, &[jacket], &[])
        .await
        .unwrap();
    let trade_id = details.trade.id.clone();

    // Reviews are rejected before completion.
    let result = reviews::submit(db.pool(), &trade_id, &alice, 5, "great").await;
    assert!(matches!(result, Err(MarketError::InvalidState(_))));

    trades::accept(db.pool(), &trade_id, &alice).await.unwrap();
    trades::accept(db.pool(), &trade_id, &bob).await.unwrap();
    trades::complete(db.pool(), &trade_id, &alice).await.unwrap();

    let bob_xp_before = database::user::get_user(db.pool(), &bob)
        .await
        .unwrap()
        .experience;

    // Alice reviews Bob; the reviewed party is derived, not supplied.
    let review = reviews::submit(db.pool(), &trade_id, &alice, 5, "smooth swap")
        .await
        .unwrap();
    assert_eq!(review.reviewed_id, bob);

    let bob_after = database::user::get_user(db.pool(), &bob).await.unwrap();
    assert_eq!(bob_after.experience, bob_xp_before + 25);
    assert_eq!(bob_after.positive_reviews, 1);

    // Resubmission overwrites; a low rating grants no second bonus.
    let review = reviews::submit(db.pool(), &trade_id, &alice, 2, "changed my mind")
        .await
        .unwrap();
    assert_eq!(review.rating, 2);
    assert_eq!(
        database::review::count_reviews_for_trade(db.pool(), &trade_id)
            .await
            .unwrap(),
        1
    );

    let listed = reviews::list(db.pool(), &trade_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reviewer_name, "Alice");
    assert_eq!(listed[0].reviewed_name, "Bob");

    // Outsiders cannot review.
    let mallory = register(&db, "Mallory").await;
    let result = reviews::submit(db.pool(), &trade_id, &mallory, 5, "nice").await;
    assert!(matches!(result, Err(MarketError::Forbidden(_))));
}

#[tokio::test]
async fn chat_text_messages_interleave_with_system_entries() {
    let db = test_db().await;
    let alice = register(&db, "Alice").await;
    let bob = register(&db, "Bob").await;
    let jacket = listing_for(&db, &alice, "Denim jacket").await;

    let details = trades::propose(db.pool(), &alice, &bob, &[jacket], &[])
        .await
        .unwrap();
    let trade_id = details.trade.id.clone();
    let chat = database::chat::get_chat_by_trade(db.pool(), &trade_id)
        .await
        .unwrap();

    chats::send_message(db.pool(), &chat.id, &alice, "interested in a swap?")
        .await
        .unwrap();
    trades::accept(db.pool(), &trade_id, &bob).await.unwrap();
    chats::send_message(db.pool(), &chat.id, &bob, "  sure, accepted my side  ")
        .await
        .unwrap();

    let messages = chats::messages(db.pool(), &chat.id, &alice).await.unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].kind, MessageKind::Text);
    assert_eq!(messages[1].kind, MessageKind::TradeUpdate);
    // User text is stored trimmed.
    assert_eq!(messages[2].content, "sure, accepted my side");

    // Whitespace-only messages are rejected.
    let result = chats::send_message(db.pool(), &chat.id, &alice, "   ").await;
    assert!(matches!(result, Err(MarketError::Validation(_))));

    let overviews = chats::list_for_user(db.pool(), &alice).await.unwrap();
    assert_eq!(overviews.len(), 1);
    let last = overviews[0].last_message.as_ref().unwrap();
    assert_eq!(last.content, "sure, accepted my side");
}
