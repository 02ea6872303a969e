mod common;

use common::{anonymous_comment, comment, thread};
use rs_harvest::{Aggregator, IdentitySource, Options, PageCall, SnapshotPage};
use std::collections::HashSet;

fn handles_and_texts(result: &rs_harvest::HarvestResult) -> Vec<(String, String)> {
    result
        .items
        .iter()
        .map(|item| (item.identity.handle.clone(), item.text.clone()))
        .collect()
}

#[tokio::test]
async fn noise_is_filtered_and_authors_resolved() {
    let page = SnapshotPage::new([thread(&[
        comment("alice", "Great giveaway!"),
        comment("alice", "Like"),
        comment("alice", "@alice: enter me"),
    ])]);

    let options = Options::default();
    let result = Aggregator::new(&options)
        .extract(&page)
        .await
        .expect("extraction should succeed");

    assert_eq!(
        handles_and_texts(&result),
        [
            ("alice".to_string(), "Great giveaway!".to_string()),
            ("alice".to_string(), "@alice: enter me".to_string()),
        ]
    );
    assert_eq!(result.stats.total_candidates, 3);
    assert_eq!(result.stats.valid_items, 2);
    assert_eq!(result.stats.unique_identities, 1);
    assert!((result.stats.efficiency - 2.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn fragment_matched_by_two_selector_sets_yields_one_item() {
    let page = SnapshotPage::new([thread(&[comment("bob", "Count me in")])]);
    let options = Options {
        selector_sets: vec![
            "article ul li div div div span".to_string(),
            "article li span".to_string(),
        ],
        ..Options::default()
    };

    let result = Aggregator::new(&options).extract(&page).await.expect("extraction");

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.stats.total_candidates, 2);
    assert_eq!(result.stats.valid_items, 1);
}

#[tokio::test]
async fn repeated_extraction_is_identical() {
    let page = SnapshotPage::new([thread(&[
        comment("zed", "last by name"),
        anonymous_comment("nobody claims this"),
        comment("Bob", "first by name"),
        comment("carol", "middle"),
        comment("bob", "second for bob"),
    ])]);
    let options = Options::default();
    let aggregator = Aggregator::new(&options);

    let first = aggregator.extract(&page).await.expect("first pass");
    let second = aggregator.extract(&page).await.expect("second pass");

    assert_eq!(handles_and_texts(&first), handles_and_texts(&second));
    assert_eq!(first.stats, second.stats);
}

#[tokio::test]
async fn items_are_ordered_by_handle_then_discovery() {
    let page = SnapshotPage::new([thread(&[
        comment("zed", "z one"),
        comment("Bob", "b one"),
        comment("carol", "c one"),
        comment("bob", "b two"),
    ])]);
    let options = Options::default();
    let result = Aggregator::new(&options).extract(&page).await.expect("extraction");

    let texts: Vec<&str> = result.items.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, ["b one", "b two", "c one", "z one"]);
    // Display case is kept, grouping ignores it
    assert_eq!(result.items[0].identity.handle, "Bob");
    assert_eq!(result.stats.unique_identities, 3);
}

#[tokio::test]
async fn unattributable_fragments_get_distinct_synthetic_identities() {
    let texts = ["first anonymous", "second anonymous", "me!!", "me!!"];
    let comments: Vec<String> = texts.iter().map(|t| anonymous_comment(t)).collect();
    let page = SnapshotPage::new([thread(&comments)]);

    let options = Options::default();
    let result = Aggregator::new(&options).extract(&page).await.expect("extraction");

    assert_eq!(result.items.len(), texts.len());
    assert!(result
        .items
        .iter()
        .all(|item| item.identity.source == IdentitySource::Synthetic));
    let handles: HashSet<&str> = result.items.iter().map(|i| i.identity.handle.as_str()).collect();
    assert_eq!(handles.len(), texts.len());
    assert!(handles.iter().all(|h| h.starts_with("user_")));
    assert_eq!(result.stats.synthetic_identities, texts.len());
    assert!(result.items.iter().all(|item| item.identity.profile_url().is_none()));
}

#[tokio::test]
async fn nearby_text_names_the_author_without_links() {
    let html = thread(&[
        "<li><div><div><span>carol</span><div><span>Count me in</span></div></div></div></li>".to_string(),
    ]);

    let enhanced = Options::default();
    let page = SnapshotPage::new([html.as_str()]);
    let result = Aggregator::new(&enhanced).extract(&page).await.expect("extraction");
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].identity.handle, "carol");
    assert_eq!(result.items[0].identity.source, IdentitySource::NearbyTextStrategy);

    let basic = Options::basic();
    let page = SnapshotPage::new([html.as_str()]);
    let result = Aggregator::new(&basic).extract(&page).await.expect("extraction");
    assert_eq!(result.items[0].identity.source, IdentitySource::Synthetic);
}

#[tokio::test]
async fn verified_marker_near_the_comment_is_reported() {
    let page = SnapshotPage::new([thread(&[
        r#"<li><div><a href="/brand/">brand</a><svg aria-label="Verified"></svg><div><div><span>Official rules in bio</span></div></div></div></li>"#.to_string(),
    ])]);

    let options = Options::default();
    let result = Aggregator::new(&options).extract(&page).await.expect("extraction");

    assert_eq!(result.items.len(), 1);
    assert!(result.items[0].identity.verified);
    assert_eq!(result.stats.verified_items, 1);
}

#[tokio::test]
async fn excluded_links_are_skipped_for_the_author() {
    let page = SnapshotPage::new([thread(&[
        r#"<li><div><a href="/p/OTHER/">post</a><a href="/explore/tags/win/">#win</a><a href="/dana/?hl=en">dana</a><div><div><span>Tagging friends</span></div></div></div></li>"#.to_string(),
    ])]);

    let options = Options::default();
    let result = Aggregator::new(&options).extract(&page).await.expect("extraction");

    assert_eq!(result.items[0].identity.handle, "dana");
    assert_eq!(
        result.items[0].identity.profile_url().as_deref(),
        Some("https://instagram.com/dana")
    );
}

#[tokio::test]
async fn efficiency_stays_within_bounds() {
    let empty = SnapshotPage::new(["<html><body><article></article></body></html>"]);
    let options = Options::default();
    let aggregator = Aggregator::new(&options);

    let result = aggregator.extract(&empty).await.expect("extraction");
    assert_eq!(result.stats.total_candidates, 0);
    assert_eq!(result.stats.efficiency, 0.0);
    assert_eq!(result.stats.avg_text_length, 0.0);

    let noisy = SnapshotPage::new([thread(&[
        comment("a1", "Reply"),
        comment("a2", "3d"),
        comment("a3", "real words here"),
    ])]);
    let result = aggregator.extract(&noisy).await.expect("extraction");
    assert!((0.0..=1.0).contains(&result.stats.efficiency));
    assert_eq!(result.stats.valid_items, 1);
}

#[tokio::test]
async fn count_candidates_matches_extraction_total() {
    let page = SnapshotPage::new([thread(&[
        comment("alice", "one"),
        comment("bob", "Like"),
        anonymous_comment("three"),
    ])]);
    let options = Options::default();
    let aggregator = Aggregator::new(&options);

    let count = aggregator.count_candidates(&page).await.expect("probe");
    let result = aggregator.extract(&page).await.expect("extraction");
    assert_eq!(count, result.stats.total_candidates);
}

#[tokio::test]
async fn failing_ancestor_walk_degrades_to_synthetic_identity() {
    let page = SnapshotPage::new([thread(&[
        comment("alice", "first comment"),
        comment("bob", "second comment"),
    ])])
    .failing(PageCall::Ancestor);

    let options = Options::default();
    let result = Aggregator::new(&options).extract(&page).await.expect("pass continues");

    assert_eq!(result.items.len(), 2);
    for item in &result.items {
        assert_eq!(item.identity.source, IdentitySource::Synthetic);
        assert!(item.identity.handle.starts_with("user_"));
        assert!(!item.identity.verified);
    }
    assert_eq!(result.stats.degraded_lookups, 2);
}

#[tokio::test]
async fn failing_scoped_lookups_hide_links_and_verified_markers() {
    let verified = comment("carol", "nice shot").replace(
        "</a>",
        r#"</a><svg aria-label="Verified"></svg>"#,
    );
    let page = SnapshotPage::new([thread(&[verified])]).failing(PageCall::FindWithin);

    let options = Options::default();
    let result = Aggregator::new(&options).extract(&page).await.expect("pass continues");

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].identity.source, IdentitySource::Synthetic);
    assert!(!result.items[0].identity.verified);
    assert_eq!(result.stats.degraded_lookups, 1);
}
