//! Tests for the facility selection shared by every window.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::harness;
use cueview::WindowError;
use cueview::window::MainWindow;

fn checked(window: &MainWindow) -> Vec<String> {
    window.facility_menu().unwrap().checked()
}

#[test]
fn test_facility_menu_starts_on_default() {
    let h = harness();
    let window = h.session.open_window(None).unwrap();

    let labels: Vec<_> = window
        .menu("Cuebot")
        .unwrap()
        .actions()
        .iter()
        .map(|a| a.text())
        .collect();
    assert_eq!(labels, vec!["local", "cloud"]);
    assert_eq!(checked(&window), vec!["local"]);
    assert!(h.backend.activations.lock().is_empty());
}

#[test]
fn test_selecting_cloud_publishes_once() {
    let h = harness();
    let main = h.session.open_window(None).unwrap();
    let second = h.session.open_window(None).unwrap();

    let published = Arc::new(AtomicUsize::new(0));
    let counter = published.clone();
    h.session.bus().facility_changed().connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    main.facility_menu().unwrap().action("cloud").unwrap().trigger();

    assert_eq!(published.load(Ordering::SeqCst), 1);
    assert_eq!(h.session.facilities().selected().as_deref(), Some("cloud"));
    assert_eq!(*h.backend.activations.lock(), vec!["cloud"]);
    assert_eq!(checked(&main), vec!["cloud"]);
    assert_eq!(checked(&second), vec!["cloud"]);
}

#[test]
fn test_exactly_one_entry_checked() {
    let h = harness();
    let main = h.session.open_window(None).unwrap();
    let second = h.session.open_window(None).unwrap();

    let clicks = [
        (&main, "cloud"),
        (&second, "cloud"),
        (&second, "local"),
        (&main, "local"),
        (&main, "cloud"),
        (&second, "local"),
    ];
    for (window, name) in clicks {
        window.facility_menu().unwrap().action(name).unwrap().trigger();
        for w in [&main, &second] {
            assert_eq!(checked(w).len(), 1);
        }
    }
    assert_eq!(checked(&main), vec!["local"]);
}

#[test]
fn test_unchecking_active_facility_restores_default() {
    let h = harness();
    let window = h.session.open_window(None).unwrap();
    let facilities = window.facility_menu().unwrap();

    facilities.action("cloud").unwrap().trigger();
    facilities.action("cloud").unwrap().trigger();

    assert_eq!(checked(&window), vec!["local"]);
    assert_eq!(h.session.facilities().selected().as_deref(), Some("local"));
    assert_eq!(*h.backend.activations.lock(), vec!["cloud", "local"]);
}

#[test]
fn test_new_window_renders_current_selection() {
    let h = harness();
    let main = h.session.open_window(None).unwrap();
    main.facility_menu().unwrap().action("cloud").unwrap().trigger();

    let second = h.session.open_window(None).unwrap();
    assert_eq!(checked(&second), vec!["cloud"]);
}

#[test]
fn test_closed_window_stops_rendering() {
    let h = harness();
    let main = h.session.open_window(None).unwrap();
    let second = h.session.open_window(None).unwrap();
    second.close();

    h.session.facilities().select("cloud").unwrap();
    assert_eq!(checked(&main), vec!["cloud"]);
    assert_eq!(checked(&second), vec!["local"]);
}

#[test]
fn test_unknown_facility() {
    let h = harness();
    h.session.open_window(None).unwrap();
    assert_eq!(
        h.session.facilities().select("mars"),
        Err(WindowError::UnknownFacility("mars".to_string()))
    );
}

#[test]
fn test_dropped_facility_falls_back_to_default_everywhere() {
    let h = harness();
    let main = h.session.open_window(None).unwrap();

    let published = Arc::new(AtomicUsize::new(0));
    let counter = published.clone();
    h.session.bus().facility_changed().connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    main.facility_menu().unwrap().action("cloud").unwrap().trigger();
    h.backend.offer(&["local", "remote"], "local");
    let second = h.session.open_window(None).unwrap();

    assert_eq!(h.session.facilities().selected().as_deref(), Some("local"));
    assert_eq!(*h.backend.activations.lock(), vec!["cloud", "local"]);
    assert_eq!(published.load(Ordering::SeqCst), 2);
    assert_eq!(checked(&main), vec!["local"]);
    assert_eq!(checked(&second), vec!["local"]);
}

#[test]
fn test_reload_keeps_offered_selection() {
    let h = harness();
    let main = h.session.open_window(None).unwrap();
    main.facility_menu().unwrap().action("cloud").unwrap().trigger();

    h.backend.offer(&["local", "cloud", "remote"], "local");
    let second = h.session.open_window(None).unwrap();

    assert_eq!(*h.backend.activations.lock(), vec!["cloud"]);
    assert_eq!(checked(&second), vec!["cloud"]);
}

#[test]
fn test_closed_window_facility_entries_are_inert() {
    let h = harness();
    let main = h.session.open_window(None).unwrap();
    let second = h.session.open_window(None).unwrap();
    second.close();

    second.facility_menu().unwrap().action("cloud").unwrap().trigger();

    assert_eq!(h.session.facilities().selected().as_deref(), Some("local"));
    assert!(h.backend.activations.lock().is_empty());
    assert_eq!(checked(&main), vec!["local"]);
}
