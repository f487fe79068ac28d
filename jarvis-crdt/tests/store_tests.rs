use jarvis_crdt::{
    CrdtStore, Lookup, OpKind, ReplicaClock, Snapshot, StoreConfig, VersionedEntry,
};
use jarvis_types::{ReplicaId, Timestamp};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

fn store(name: &str) -> CrdtStore {
    CrdtStore::new(ReplicaId::new(name))
}

fn entry_at(node: &str, secs: f64, value: Value, version: u64) -> VersionedEntry {
    VersionedEntry::new(
        ReplicaId::new(node),
        Timestamp::from_secs(secs),
        value,
        version,
        Map::new(),
    )
}

/// Builds a snapshot by hand so tests control timestamps exactly.
fn snapshot_of(node: &str, entries: Vec<(&str, VersionedEntry)>) -> Snapshot {
    let mut clock = ReplicaClock::new();
    let mut data_store = HashMap::new();
    for (key, entry) in entries {
        clock.observe(&entry.node_id, entry.version);
        data_store.insert(key.to_owned(), entry);
    }
    Snapshot {
        node_id: ReplicaId::new(node),
        vector_clock: clock,
        data_store,
        operation_count: 0,
        peers: Vec::new(),
        exported_at: Timestamp::from_secs(0.0),
    }
}

// ── Local writes ─────────────────────────────────────────────────

#[test]
fn set_and_get() {
    let mut s = store("alpha");
    assert!(s.set("greeting", json!("hello")));
    assert_eq!(s.get("greeting"), Some(&json!("hello")));
}

#[test]
fn set_stamps_increasing_versions() {
    let mut s = store("alpha");
    s.set("k", json!(1));
    s.set("k", json!(2));
    assert_eq!(s.entry("k").unwrap().version, 2);
    assert_eq!(s.clock().get(&ReplicaId::new("alpha")), 2);
}

#[test]
fn set_returns_false_when_superseded() {
    let mut s = store("alpha");
    // A peer write stamped far in the future holds the key.
    let future = snapshot_of("bravo", vec![("k", entry_at("bravo", 1e12, json!("held"), 1))]);
    s.merge(&future);

    assert!(!s.set("k", json!("mine")));
    assert_eq!(s.get("k"), Some(&json!("held")));
    // The losing write is still logged.
    assert_eq!(s.log().total_recorded(), 1);
}

#[test]
fn get_missing_returns_none() {
    let s = store("alpha");
    assert_eq!(s.get("nothing"), None);
}

#[test]
fn empty_key_is_allowed() {
    let mut s = store("alpha");
    assert!(s.set("", json!("odd")));
    assert_eq!(s.get(""), Some(&json!("odd")));
}

#[test]
fn set_with_metadata_is_preserved() {
    let mut s = store("alpha");
    let mut meta = Map::new();
    meta.insert("source".to_owned(), json!("gui"));
    s.set_with_metadata("k", json!(1), meta);
    assert_eq!(s.entry("k").unwrap().metadata.get("source"), Some(&json!("gui")));
}

// ── Deletion ─────────────────────────────────────────────────────

#[test]
fn delete_missing_returns_false() {
    let mut s = store("alpha");
    assert!(!s.delete("ghost"));
}

#[test]
fn delete_writes_tombstone() {
    let mut s = store("alpha");
    s.set("k", json!(1));
    assert!(s.delete("k"));

    assert_eq!(s.get("k"), None);
    assert_eq!(s.lookup("k"), Lookup::Deleted);
    assert!(s.entry("k").unwrap().is_tombstone());
}

#[test]
fn delete_of_tombstoned_key_succeeds_again() {
    let mut s = store("alpha");
    s.set("k", json!(1));
    s.delete("k");
    assert!(s.delete("k"));
}

#[test]
fn lookup_distinguishes_deleted_from_never_set() {
    let mut s = store("alpha");
    s.set("k", json!(1));
    s.delete("k");
    assert_eq!(s.lookup("k"), Lookup::Deleted);
    assert_eq!(s.lookup("other"), Lookup::NotFound);
    s.set("live", json!(2));
    assert_eq!(s.lookup("live"), Lookup::Found(&json!(2)));
}

#[test]
fn list_keys_excludes_tombstones_and_sorts() {
    let mut s = store("alpha");
    s.set("cherry", json!(3));
    s.set("apple", json!(1));
    s.set("banana", json!(2));
    s.delete("banana");
    assert_eq!(s.list_keys(), vec!["apple", "cherry"]);
}

// ── Status ───────────────────────────────────────────────────────

#[test]
fn status_counts_tombstones() {
    let mut s = store("alpha");
    s.set("a", json!(1));
    s.set("b", json!(2));
    s.delete("b");

    let status = s.status();
    assert_eq!(status.data_items, 2);
    assert_eq!(status.operation_count, 3);
    assert_eq!(status.vector_clock_size, 1);
    assert_eq!(status.peer_count, 0);
    assert_eq!(status.last_operation.unwrap().op, OpKind::Delete);
}

#[test]
fn fresh_store_status() {
    let s = store("alpha");
    let status = s.status();
    assert_eq!(status.node_id, ReplicaId::new("alpha"));
    assert_eq!(status.data_items, 0);
    assert!(status.last_operation.is_none());
}

// ── Merge ────────────────────────────────────────────────────────

#[test]
fn merge_inserts_new_keys() {
    let mut s = store("alpha");
    let peer = snapshot_of("bravo", vec![("k", entry_at("bravo", 10.0, json!("v"), 1))]);

    let summary = s.merge(&peer);
    assert_eq!(summary.peer_node_id, ReplicaId::new("bravo"));
    assert_eq!(summary.updates_applied, 1);
    assert_eq!(summary.conflicts_resolved, 0);
    assert_eq!(s.get("k"), Some(&json!("v")));
}

#[test]
fn merge_resolves_conflict_for_later_timestamp() {
    let mut s = store("alpha");
    s.merge(&snapshot_of("bravo", vec![("k", entry_at("bravo", 10.0, json!("old"), 1))]));

    let summary = s.merge(&snapshot_of(
        "charlie",
        vec![("k", entry_at("charlie", 20.0, json!("new"), 1))],
    ));
    assert_eq!(summary.conflicts_resolved, 1);
    assert_eq!(summary.updates_applied, 0);
    assert_eq!(s.get("k"), Some(&json!("new")));
}

#[test]
fn merge_keeps_winning_local_entry() {
    let mut s = store("alpha");
    s.merge(&snapshot_of("bravo", vec![("k", entry_at("bravo", 20.0, json!("keep"), 1))]));

    let summary = s.merge(&snapshot_of(
        "charlie",
        vec![("k", entry_at("charlie", 10.0, json!("stale"), 1))],
    ));
    assert_eq!(summary.conflicts_resolved, 0);
    assert_eq!(summary.updates_applied, 0);
    assert_eq!(s.get("k"), Some(&json!("keep")));
}

#[test]
fn merge_tie_breaks_on_node_id_both_directions() {
    // bravo > alpha lexically, so bravo's entry wins at equal timestamps
    // whichever side it arrives from.
    let from_alpha = entry_at("alpha", 10.0, json!("from_alpha"), 1);
    let from_bravo = entry_at("bravo", 10.0, json!("from_bravo"), 1);

    let mut x = store("x");
    x.merge(&snapshot_of("alpha", vec![("k", from_alpha.clone())]));
    x.merge(&snapshot_of("bravo", vec![("k", from_bravo.clone())]));

    let mut y = store("y");
    y.merge(&snapshot_of("bravo", vec![("k", from_bravo)]));
    y.merge(&snapshot_of("alpha", vec![("k", from_alpha)]));

    assert_eq!(x.get("k"), Some(&json!("from_bravo")));
    assert_eq!(y.get("k"), Some(&json!("from_bravo")));
}

#[test]
fn merge_is_idempotent() {
    let mut s = store("alpha");
    let peer = snapshot_of("bravo", vec![("k", entry_at("bravo", 10.0, json!("v"), 1))]);

    s.merge(&peer);
    let before = s.export_state().data_store;
    let second = s.merge(&peer);

    assert_eq!(second.updates_applied, 0);
    assert_eq!(second.conflicts_resolved, 0);
    assert_eq!(s.export_state().data_store, before);
}

#[test]
fn merge_skips_zero_version_entries() {
    let mut s = store("alpha");
    let peer = snapshot_of(
        "bravo",
        vec![
            ("bad", entry_at("bravo", 10.0, json!("x"), 0)),
            ("good", entry_at("bravo", 10.0, json!("y"), 1)),
        ],
    );

    let summary = s.merge(&peer);
    assert_eq!(summary.entries_skipped, 1);
    assert_eq!(summary.updates_applied, 1);
    assert_eq!(s.get("bad"), None);
    assert_eq!(s.lookup("bad"), Lookup::NotFound);
}

#[test]
fn merge_records_peer_and_raises_clock() {
    let mut s = store("alpha");
    let peer = snapshot_of("bravo", vec![("k", entry_at("bravo", 10.0, json!("v"), 4))]);

    s.merge(&peer);
    assert!(s.known_peers().contains(&ReplicaId::new("bravo")));
    assert_eq!(s.clock().get(&ReplicaId::new("bravo")), 4);
}

// ── Export ───────────────────────────────────────────────────────

#[test]
fn export_reports_store_contents() {
    let mut s = store("alpha");
    s.set("k", json!(1));
    s.merge(&snapshot_of("bravo", vec![]));

    let snapshot = s.export_state();
    assert_eq!(snapshot.node_id, ReplicaId::new("alpha"));
    assert_eq!(snapshot.operation_count, 1);
    assert_eq!(snapshot.peers, vec![ReplicaId::new("bravo")]);
    assert_eq!(snapshot.entry("k").unwrap().value, json!(1));
}

#[test]
fn export_is_a_value_copy() {
    let mut s = store("alpha");
    s.set("k", json!(1));

    let mut snapshot = s.export_state();
    snapshot.data_store.remove("k");
    snapshot.data_store.insert("injected".to_owned(), entry_at("evil", 99.0, json!(0), 1));

    assert_eq!(s.get("k"), Some(&json!(1)));
    assert_eq!(s.get("injected"), None);
}

#[test]
fn export_merge_round_trip_into_fresh_store() {
    let mut original = store("alpha");
    original.set("a", json!(1));
    original.set("b", json!("two"));
    original.delete("a");

    let mut restored = store("bravo");
    restored.merge(&original.export_state());

    assert_eq!(
        restored.export_state().data_store,
        original.export_state().data_store
    );
    assert_eq!(restored.list_keys(), vec!["b"]);
}

// ── Replication scenarios ────────────────────────────────────────

#[test]
fn two_node_scenario_converges() {
    let mut node1 = store("node1");
    let mut node2 = store("node2");

    node1.set("key1", json!("value1_from_node1"));
    node1.set("key2", json!("value2_from_node1"));
    node2.set("key1", json!("value1_from_node2"));
    node2.set("key3", json!("value3_from_node2"));

    node1.merge(&node2.export_state());
    node2.merge(&node1.export_state());

    assert_eq!(node1.list_keys(), vec!["key1", "key2", "key3"]);
    assert_eq!(node2.list_keys(), vec!["key1", "key2", "key3"]);
    assert_eq!(node1.get("key2"), Some(&json!("value2_from_node1")));
    assert_eq!(node2.get("key2"), Some(&json!("value2_from_node1")));
    assert_eq!(node1.get("key3"), Some(&json!("value3_from_node2")));

    // key1 conflicted; both nodes must agree on the same winner.
    assert_eq!(node1.entry("key1"), node2.entry("key1"));
}

#[test]
fn delete_propagates_and_beats_stale_update() {
    // "zulu" sorts after "alpha", so the tombstone wins even on the
    // (unlikely) exact timestamp tie.
    let mut writer = store("alpha");
    let mut deleter = store("zulu");

    writer.set("doomed", json!("data"));
    deleter.merge(&writer.export_state());
    deleter.delete("doomed");

    writer.merge(&deleter.export_state());
    assert!(writer.list_keys().is_empty());
    assert_eq!(writer.lookup("doomed"), Lookup::Deleted);
}

// ── Configuration ────────────────────────────────────────────────

#[test]
fn with_config_bounds_the_log() {
    let mut s = CrdtStore::with_config(
        ReplicaId::new("alpha"),
        StoreConfig { op_log_capacity: 2 },
    );
    for i in 0..5 {
        s.set(format!("k{i}"), json!(i));
    }
    assert_eq!(s.log().len(), 2);
    assert_eq!(s.log().total_recorded(), 5);
    assert_eq!(s.status().operation_count, 5);
}

#[test]
fn generate_gives_unique_identities() {
    let a = CrdtStore::generate();
    let b = CrdtStore::generate();
    assert_ne!(a.node_id(), b.node_id());
}
