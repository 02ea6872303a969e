mod common;

use common::{comment, thread, thread_of, POST_URL};
use rs_harvest::{
    ElementGate, FailureKind, Harvester, Immediate, LoadPhase, Options, PostKind, SignalGate,
    SnapshotBrowser,
};
use std::time::Duration;

fn post_page() -> String {
    thread(&[
        comment("alice", "Great giveaway!"),
        comment("bob", "Pick me please!!"),
        comment("alice", "Like"),
        comment("alice", "@bob good luck"),
    ])
    .replace(
        "<section></section>",
        r#"<header><a href="/shop_owner/">shop_owner</a></header><section><div><span>1,204 likes</span></div></section>"#,
    )
}

#[tokio::test]
async fn successful_harvest_packages_everything() {
    let browser = SnapshotBrowser::new([post_page()]);
    let harvester = Harvester::new(Options::default());

    let harvest = harvester
        .harvest(&browser, &Immediate, POST_URL)
        .await
        .expect("harvest should succeed");

    let lines: Vec<String> = harvest
        .result
        .items
        .iter()
        .map(|item| format!("@{}: {}", item.identity.handle, item.text))
        .collect();
    assert_eq!(
        lines,
        ["@alice: Great giveaway!", "@alice: @bob good luck", "@bob: Pick me please!!"]
    );
    assert_eq!(harvest.result.stats.unique_identities, 2);

    assert_eq!(harvest.post.author, "shop_owner");
    assert_eq!(harvest.post.likes, 1204);
    assert_eq!(harvest.post.post_id.as_deref(), Some("ABC123"));
    assert_eq!(harvest.post.kind, PostKind::Post);

    let load = harvest.load.expect("loader ran");
    assert_eq!(load.phase, LoadPhase::Exhausted);

    assert_eq!(browser.opened_sessions(), 1);
    assert_eq!(browser.closed_sessions(), 1);
}

#[tokio::test]
async fn invalid_url_opens_no_session() {
    let browser = SnapshotBrowser::new([thread_of(2)]);
    let harvester = Harvester::new(Options::default());

    for url in [
        "not a url",
        "https://example.com/p/ABC123/",
        "https://www.instagram.com/alice/",
    ] {
        let failure = harvester
            .harvest(&browser, &Immediate, url)
            .await
            .expect_err("invalid URL must fail");
        assert_eq!(failure.kind, FailureKind::InvalidInput);
        assert!(failure.partial_items.is_empty());
    }
    assert_eq!(browser.opened_sessions(), 0);
}

#[tokio::test]
async fn abandoned_gate_is_an_interaction_timeout() {
    let browser = SnapshotBrowser::new([thread_of(2)]);
    let harvester = Harvester::new(Options::default());
    let (gate, signal) = SignalGate::new();
    drop(signal);

    let failure = harvester
        .harvest(&browser, &gate, POST_URL)
        .await
        .expect_err("abandoned gate must fail");

    assert_eq!(failure.kind, FailureKind::InteractionTimeout);
    assert_eq!(browser.opened_sessions(), 1);
    assert_eq!(browser.closed_sessions(), 1);
}

#[tokio::test]
async fn caller_timeout_still_releases_the_session() {
    let browser = SnapshotBrowser::new([thread_of(2)]);
    let harvester = Harvester::new(Options::default());
    let (gate, _signal) = SignalGate::new();

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        harvester.harvest(&browser, &gate, POST_URL),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(browser.opened_sessions(), 1);
    assert_eq!(browser.closed_sessions(), browser.opened_sessions());
}

#[tokio::test]
async fn gate_timeout_option_fails_and_closes_once() {
    let browser = SnapshotBrowser::new([thread_of(2)]);
    let harvester = Harvester::new(Options {
        gate_timeout_ms: Some(20),
        ..Options::default()
    });
    let (gate, _signal) = SignalGate::new();

    let failure = harvester
        .harvest(&browser, &gate, POST_URL)
        .await
        .expect_err("gate timeout must fail");

    assert_eq!(failure.kind, FailureKind::InteractionTimeout);
    assert!(failure.partial_items.is_empty());
    assert_eq!(browser.opened_sessions(), 1);
    assert_eq!(browser.closed_sessions(), 1);
}

#[tokio::test]
async fn fired_signal_lets_the_harvest_run() {
    let browser = SnapshotBrowser::new([thread_of(3)]);
    let harvester = Harvester::new(Options::default());
    let (gate, signal) = SignalGate::new();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        signal.fire();
    });

    let harvest = harvester.harvest(&browser, &gate, POST_URL).await.expect("harvest");
    assert_eq!(harvest.result.items.len(), 3);
}

#[tokio::test]
async fn element_gate_opens_on_visible_thread() {
    let browser = SnapshotBrowser::new([thread_of(2)]);
    let harvester = Harvester::new(Options::default());
    let gate = ElementGate::new("article ul li");

    let harvest = harvester.harvest(&browser, &gate, POST_URL).await.expect("harvest");
    assert_eq!(harvest.result.items.len(), 2);
}

#[tokio::test]
async fn lost_session_returns_partial_items() {
    // Budget covers navigation, metadata, the count probe and the first
    // comment, then the session dies mid-pass.
    let browser = SnapshotBrowser::new([thread(&[
        comment("alice", "first comment"),
        comment("bob", "Like"),
        comment("carol", "third comment"),
    ])])
    .fail_after(90);
    let harvester = Harvester::new(Options {
        auto_scroll: false,
        ..Options::default()
    });

    let failure = harvester
        .harvest(&browser, &Immediate, POST_URL)
        .await
        .expect_err("session loss must fail");

    assert_eq!(failure.kind, FailureKind::Session);
    assert_eq!(failure.partial_items.len(), 1);
    assert_eq!(failure.partial_items[0].identity.handle, "alice");
    assert!(failure.to_string().contains("1 partial items"));
    assert_eq!(browser.closed_sessions(), 1);
}

#[tokio::test]
async fn disabled_auto_scroll_skips_the_loader() {
    let browser = SnapshotBrowser::new([thread_of(1), thread_of(5)]);
    let harvester = Harvester::new(Options {
        auto_scroll: false,
        ..Options::default()
    });

    let harvest = harvester.harvest(&browser, &Immediate, POST_URL).await.expect("harvest");

    assert!(harvest.load.is_none());
    assert_eq!(harvest.result.items.len(), 1);
}

#[tokio::test]
async fn loader_reveals_later_snapshots() {
    let browser = SnapshotBrowser::new([thread_of(1), thread_of(3), thread_of(5)]);
    let harvester = Harvester::new(Options::default());

    let harvest = harvester.harvest(&browser, &Immediate, POST_URL).await.expect("harvest");

    assert_eq!(harvest.load.map(|l| l.final_count), Some(5));
    assert_eq!(harvest.result.items.len(), 5);
    assert!(harvest.warnings.iter().any(|w| w.contains("author")));
}

#[tokio::test]
async fn harvest_serializes_to_json() {
    let browser = SnapshotBrowser::new([thread_of(2)]);
    let harvest = Harvester::default()
        .harvest(&browser, &Immediate, POST_URL)
        .await
        .expect("harvest");

    let json = serde_json::to_value(&harvest).expect("serializable");
    assert_eq!(json["result"]["stats"]["valid_items"], 2);
    assert_eq!(json["post"]["post_id"], "ABC123");
    assert!(json["elapsed"].is_u64());
}
