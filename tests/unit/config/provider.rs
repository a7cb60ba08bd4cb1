use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use super::*;
use crate::config::model::DisplayMode;

fn animated(path: &str) -> SlideshowConfig {
    SlideshowConfig {
        source_path: path.into(),
        ..SlideshowConfig::default()
    }
}

#[test]
fn get_returns_current_snapshot() {
    let provider = ConfigProvider::new(animated("a.gif"));
    assert_eq!(provider.get().source_path, std::path::PathBuf::from("a.gif"));

    provider.set(animated("b.gif"));
    assert_eq!(provider.get().source_path, std::path::PathBuf::from("b.gif"));
}

#[test]
fn set_notifies_subscribers_with_the_new_value() {
    let provider = ConfigProvider::new(animated("a.gif"));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_by_handler = Arc::clone(&seen);
    let _subscription = provider.subscribe(move |config| {
        lock(&seen_by_handler).push(config.source_path.clone());
    });

    provider.set(animated("b.gif"));
    provider.set(animated("c.gif"));

    let seen = lock(&seen);
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], std::path::PathBuf::from("b.gif"));
    assert_eq!(seen[1], std::path::PathBuf::from("c.gif"));
}

#[test]
fn all_subscribers_are_notified() {
    let provider = ConfigProvider::new(animated("a.gif"));
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let first_counter = Arc::clone(&first);
    let _first_sub = provider.subscribe(move |_| {
        first_counter.fetch_add(1, AtomicOrdering::SeqCst);
    });
    let second_counter = Arc::clone(&second);
    let _second_sub = provider.subscribe(move |_| {
        second_counter.fetch_add(1, AtomicOrdering::SeqCst);
    });

    provider.set(animated("b.gif"));
    assert_eq!(first.load(AtomicOrdering::SeqCst), 1);
    assert_eq!(second.load(AtomicOrdering::SeqCst), 1);
}

#[test]
fn dropping_the_subscription_unregisters_the_handler() {
    let provider = ConfigProvider::new(animated("a.gif"));
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let subscription = provider.subscribe(move |_| {
        counter.fetch_add(1, AtomicOrdering::SeqCst);
    });

    provider.set(animated("b.gif"));
    drop(subscription);
    provider.set(animated("c.gif"));

    assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
}

#[test]
fn unsubscribe_consumes_the_guard() {
    let provider = ConfigProvider::new(animated("a.gif"));
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let subscription = provider.subscribe(move |_| {
        counter.fetch_add(1, AtomicOrdering::SeqCst);
    });
    subscription.unsubscribe();

    provider.set(SlideshowConfig {
        mode: DisplayMode::Single,
        ..SlideshowConfig::default()
    });
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 0);
}

#[test]
fn cloned_providers_share_the_store() {
    let provider = ConfigProvider::new(animated("a.gif"));
    let clone = provider.clone();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let _subscription = provider.subscribe(move |_| {
        counter.fetch_add(1, AtomicOrdering::SeqCst);
    });

    clone.set(animated("b.gif"));
    assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    assert_eq!(provider.get().source_path, std::path::PathBuf::from("b.gif"));
}
