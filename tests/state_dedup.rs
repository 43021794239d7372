// Dedup-window behavior across scans: idempotence, FIFO eviction and
// persistence round-trips.

use x_monitor::state::{fingerprint, ScanState, StateStore, DEFAULT_SEEN_CAP};
use x_monitor::Post;

fn post(text: &str) -> Post {
    Post {
        author: "@feed".to_string(),
        text: text.to_string(),
        url: String::new(),
        timestamp: String::new(),
        source_id: None,
    }
}

fn batch(range: std::ops::Range<usize>) -> Vec<Post> {
    range
        .map(|i| post(&format!("sample post number {i} with enough body text to matter")))
        .collect()
}

#[test]
fn rescanning_the_same_batch_yields_nothing() {
    let mut state = ScanState::default();
    let first = state.filter_new(&batch(0..5));
    assert_eq!(first.len(), 5);

    let second = state.filter_new(&batch(0..5));
    assert!(second.is_empty());
    assert_eq!(state.seen_hashes.len(), 5);
}

#[test]
fn only_the_unseen_post_survives() {
    let mut state = ScanState::default();
    state.filter_new(&batch(0..5));

    let fresh = state.filter_new(&batch(0..6));
    assert_eq!(fresh.len(), 1);
    assert!(fresh[0].text.contains("number 5"));
    assert_eq!(state.seen_hashes.len(), 6);
}

#[test]
fn window_stays_bounded_and_drops_oldest() {
    let mut state = ScanState::default();
    state.filter_new(&batch(0..520));
    state.evict_overflow(DEFAULT_SEEN_CAP);

    assert_eq!(state.seen_hashes.len(), DEFAULT_SEEN_CAP);
    // Posts 0..20 aged out; their texts would read as new again.
    assert_eq!(
        state.seen_hashes[0],
        fingerprint("sample post number 20 with enough body text to matter")
    );
}

#[test]
fn state_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.json"));

    let mut state = ScanState::default();
    state.filter_new(&batch(0..3));
    state.touch();
    store.save(&state).unwrap();

    assert_eq!(store.load(), state);
}

#[test]
fn corrupt_state_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let store = StateStore::new(path);
    assert_eq!(store.load(), ScanState::default());
}

#[test]
fn save_creates_missing_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("nested/deeper/state.json"));

    let mut state = ScanState::default();
    state.touch();
    store.save(&state).unwrap();

    assert_eq!(store.load(), state);
}
