//! Fan-out ordering and re-entrancy guarantees of `StateBroadcaster`.

use core_playback::{StateBroadcaster, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

type Log = Arc<Mutex<Vec<(&'static str, u32)>>>;

fn recorder(log: &Log, name: &'static str) -> impl Fn(&u32) + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |value| log.lock().push((name, *value))
}

#[test]
fn test_delivery_follows_registration_order() {
    let broadcaster = StateBroadcaster::new(0u32);
    let log: Log = Arc::default();

    let _a = broadcaster.subscribe(recorder(&log, "a"));
    let _b = broadcaster.subscribe(recorder(&log, "b"));
    let _c = broadcaster.subscribe(recorder(&log, "c"));
    log.lock().clear();

    broadcaster.publish(1);

    assert_eq!(*log.lock(), vec![("a", 1), ("b", 1), ("c", 1)]);
}

#[test]
fn test_late_subscriber_receives_only_current_value() {
    let broadcaster = StateBroadcaster::new(0u32);
    for value in 1..=5 {
        broadcaster.publish(value);
    }

    let log: Log = Arc::default();
    let _late = broadcaster.subscribe(recorder(&log, "late"));
    broadcaster.publish(6);

    assert_eq!(*log.lock(), vec![("late", 5), ("late", 6)]);
}

#[test]
fn test_unsubscribing_another_during_fanout_skips_it() {
    let broadcaster = StateBroadcaster::new(0u32);
    let log: Log = Arc::default();
    let victim: Arc<Mutex<Option<Subscription>>> = Arc::default();

    let slot = Arc::clone(&victim);
    let first_log = Arc::clone(&log);
    let _first = broadcaster.subscribe(move |value| {
        first_log.lock().push(("first", *value));
        if *value == 1 {
            slot.lock().take();
        }
    });
    *victim.lock() = Some(broadcaster.subscribe(recorder(&log, "second")));
    let _third = broadcaster.subscribe(recorder(&log, "third"));
    log.lock().clear();

    broadcaster.publish(1);
    broadcaster.publish(2);

    assert_eq!(
        *log.lock(),
        vec![("first", 1), ("third", 1), ("first", 2), ("third", 2)]
    );
    assert_eq!(broadcaster.subscriber_count(), 2);
}

#[test]
fn test_self_unsubscribe_inside_callback() {
    let broadcaster = StateBroadcaster::new(0u32);
    let log: Log = Arc::default();
    let own: Arc<Mutex<Option<Subscription>>> = Arc::default();

    let handle = Arc::clone(&own);
    let once_log = Arc::clone(&log);
    *own.lock() = Some(broadcaster.subscribe(move |value| {
        once_log.lock().push(("once", *value));
        if *value > 0 {
            // Drop the handle outside the lock guard to release it first.
            let subscription = handle.lock().take();
            drop(subscription);
        }
    }));
    let _other = broadcaster.subscribe(recorder(&log, "other"));
    log.lock().clear();

    broadcaster.publish(1);
    broadcaster.publish(2);

    assert_eq!(
        *log.lock(),
        vec![("once", 1), ("other", 1), ("other", 2)]
    );
    assert_eq!(broadcaster.subscriber_count(), 1);
}

#[test]
fn test_subscribe_from_inside_callback() {
    let broadcaster = StateBroadcaster::new(0u32);
    let log: Log = Arc::default();
    let spawned: Arc<Mutex<Vec<Subscription>>> = Arc::default();

    let inner_broadcaster = broadcaster.clone();
    let inner_log = Arc::clone(&log);
    let holder = Arc::clone(&spawned);
    let _parent = broadcaster.subscribe(move |value| {
        if *value == 1 {
            let child = inner_broadcaster.subscribe(recorder(&inner_log, "child"));
            holder.lock().push(child);
        }
    });

    broadcaster.publish(1);
    broadcaster.publish(2);

    assert_eq!(*log.lock(), vec![("child", 1), ("child", 2)]);
    assert_eq!(broadcaster.subscriber_count(), 2);
}

#[test]
fn test_publish_from_inside_callback_keeps_sequence_monotonic() {
    let broadcaster = StateBroadcaster::new(0u32);
    let log: Log = Arc::default();

    let republisher = broadcaster.clone();
    let _first = broadcaster.subscribe(move |value| {
        if *value == 1 {
            republisher.publish(2);
        }
    });
    let _second = broadcaster.subscribe(recorder(&log, "second"));
    log.lock().clear();

    broadcaster.publish(1);

    // The nested publish reached `second` first; the older value is dropped.
    assert_eq!(*log.lock(), vec![("second", 2)]);
    assert_eq!(*broadcaster.current(), 2);
}

#[test]
fn test_concurrent_publishers_never_deliver_stale_values() {
    let broadcaster = StateBroadcaster::new(0u64);
    let received: Arc<Mutex<Vec<Vec<u64>>>> = Arc::default();

    let subscriptions: Vec<Subscription> = (0..3)
        .map(|index| {
            received.lock().push(Vec::new());
            let received = Arc::clone(&received);
            broadcaster.subscribe(move |value| received.lock()[index].push(*value))
        })
        .collect();

    let publishers: Vec<_> = (0..4)
        .map(|_| {
            let broadcaster = broadcaster.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    broadcaster.publish_with(|version| version);
                }
            })
        })
        .collect();
    for publisher in publishers {
        publisher.join().unwrap();
    }

    let final_version = broadcaster.version();
    for sequence in received.lock().iter() {
        assert!(sequence.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(sequence.last().copied(), Some(final_version));
    }
    drop(subscriptions);
    assert_eq!(broadcaster.subscriber_count(), 0);
}
