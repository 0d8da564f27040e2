//! Tests for zip shard packing.

mod common;

use chrono::{TimeZone, Utc};
use common::zip_names;
use emote_transfer::{PackItem, ShardPacker, ZIP_OVERHEAD_BYTES};

fn item(name: &str, animated: bool, size: usize) -> PackItem {
    PackItem {
        name: name.to_string(),
        animated,
        created_at: Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 45).unwrap(),
        data: vec![7; size],
    }
}

#[test]
fn test_everything_fits_in_one_shard() {
    let items = vec![item("a", false, 500), item("b", false, 500), item("c", true, 500)];
    let shards: Vec<_> = ShardPacker::new("emotes-1", 8_000_000)
        .pack(items)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(shards.len(), 1);
    assert_eq!(shards[0].filename(), "emotes-1-1.zip");
    assert_eq!(shards[0].entries(), &["a.png", "b.png", "c.gif"]);
    assert_eq!(zip_names(shards[0].data()), vec!["a.png", "b.png", "c.gif"]);
}

#[test]
fn test_small_budget_splits_in_order() {
    let items = vec![item("a", false, 500), item("b", false, 500), item("c", false, 500)];
    let shards: Vec<_> = ShardPacker::new("emotes-1", 600)
        .pack(items)
        .collect::<Result<_, _>>()
        .unwrap();

    let names: Vec<_> = shards.iter().map(|s| s.filename().as_str()).collect();
    assert_eq!(names, vec!["emotes-1-1.zip", "emotes-1-2.zip", "emotes-1-3.zip"]);

    for (shard, expected) in shards.iter().zip(["a.png", "b.png", "c.png"]) {
        assert_eq!(shard.entries(), &[expected]);
        assert_eq!(*shard.estimated_size(), 500 + ZIP_OVERHEAD_BYTES + 5);
        assert!(*shard.estimated_size() < 600);
    }
}

#[test]
fn test_first_fit_boundary() {
    // Each estimate is 100 + 30 + 5 = 135; two make 270.
    let items = vec![item("a", false, 100), item("b", false, 100), item("c", false, 100)];

    let shards: Vec<_> = ShardPacker::new("x", 270)
        .pack(items.clone())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(shards.len(), 3, "reaching the budget exactly must seal the shard");

    let shards: Vec<_> = ShardPacker::new("x", 271)
        .pack(items)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(shards.len(), 2);
    assert_eq!(shards[0].entries(), &["a.png", "b.png"]);
    assert_eq!(shards[1].entries(), &["c.png"]);
}

#[test]
fn test_oversized_item_is_rejected_not_packed() {
    let items = vec![item("small", false, 10), item("huge", true, 1000), item("tiny", false, 10)];
    let packed = ShardPacker::new("emotes-1", 500).pack(items);

    assert_eq!(packed.rejected().len(), 1);
    assert_eq!(packed.rejected()[0].name(), "huge");
    assert_eq!(packed.rejected()[0].filename(), "huge.gif");

    let shards: Vec<_> = packed.collect::<Result<_, _>>().unwrap();
    assert_eq!(shards.len(), 1);
    assert_eq!(shards[0].entries(), &["small.png", "tiny.png"]);
}

#[test]
fn test_duplicate_names_are_discriminated() {
    let items = vec![
        item("blob", false, 10),
        item("blob", true, 10),
        item("blob", false, 10),
        item("blob-2", false, 10),
    ];
    let shards: Vec<_> = ShardPacker::new("emotes-1", 1_000_000)
        .pack(items)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        shards[0].entries(),
        &["blob.png", "blob-2.gif", "blob-3.png", "blob-2-2.png"]
    );
}

#[test]
fn test_no_items_no_shards() {
    let mut packed = ShardPacker::new("emotes-1", 1000).pack(Vec::new());
    assert!(packed.next().is_none());
}
