//! Integration tests for the process event bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cueview_core::{ConnectionId, EventBus};
use parking_lot::Mutex;

/// A subscriber that behaves like a window: on `quit` it disconnects itself.
struct Subscriber {
    closes: AtomicUsize,
    connection: Mutex<Option<ConnectionId>>,
}

fn subscribe(bus: &Arc<EventBus>) -> Arc<Subscriber> {
    let subscriber = Arc::new(Subscriber {
        closes: AtomicUsize::new(0),
        connection: Mutex::new(None),
    });

    let weak = Arc::downgrade(&subscriber);
    let bus_weak = Arc::downgrade(bus);
    let id = bus.quit().connect(move |_| {
        let (Some(subscriber), Some(bus)) = (weak.upgrade(), bus_weak.upgrade()) else {
            return;
        };
        subscriber.closes.fetch_add(1, Ordering::SeqCst);
        if let Some(id) = subscriber.connection.lock().take() {
            bus.quit().disconnect(id);
        }
    });
    *subscriber.connection.lock() = Some(id);
    subscriber
}

#[test]
fn test_quit_broadcast_closes_each_subscriber_once() {
    let bus = Arc::new(EventBus::new());
    let subscribers: Vec<_> = (0..4).map(|_| subscribe(&bus)).collect();

    bus.broadcast_quit();
    bus.broadcast_quit();

    for subscriber in &subscribers {
        assert_eq!(subscriber.closes.load(Ordering::SeqCst), 1);
    }
    assert_eq!(bus.quit().connection_count(), 0);
}

#[test]
fn test_request_update_and_facility_changed_are_independent() {
    let bus = EventBus::new();
    let updates = Arc::new(AtomicUsize::new(0));
    let facility = Arc::new(AtomicUsize::new(0));

    let updates_clone = updates.clone();
    bus.request_update().connect(move |_| {
        updates_clone.fetch_add(1, Ordering::SeqCst);
    });
    let facility_clone = facility.clone();
    bus.facility_changed().connect(move |_| {
        facility_clone.fetch_add(1, Ordering::SeqCst);
    });

    bus.notify_request_update();
    bus.notify_request_update();
    bus.notify_facility_changed();

    assert_eq!(updates.load(Ordering::SeqCst), 2);
    assert_eq!(facility.load(Ordering::SeqCst), 1);
}
