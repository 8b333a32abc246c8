//! Integration tests for nibbler_event
//!
//! Ordering, fan-out and shutdown behaviour of the event queue

use nibbler_event::{Event, EventQueue};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    done()
}

#[test]
fn test_every_subscriber_sees_every_event_in_push_order() {
    let queue = EventQueue::new().unwrap();
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));

    let sink = first.clone();
    queue.subscribe(move |event| sink.lock().push(event));
    let sink = second.clone();
    queue.subscribe(move |event| sink.lock().push(event));

    let pushed: Vec<Event> = (0..200)
        .map(|i| match i % 6 {
            0 => Event::Up,
            1 => Event::Down,
            2 => Event::Left,
            3 => Event::Right,
            4 => Event::Enter,
            _ => Event::SelectPlugin((i % 3) as u8 + 1),
        })
        .collect();

    for event in &pushed {
        queue.push(*event);
    }

    assert!(wait_until(|| second.lock().len() == pushed.len()));
    assert_eq!(*first.lock(), pushed);
    assert_eq!(*second.lock(), pushed);
}

#[test]
fn test_subscribers_see_event_before_next_is_delivered() {
    let queue = EventQueue::new().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    for name in ["a", "b", "c"] {
        let log = log.clone();
        queue.subscribe(move |event| log.lock().push((name, event)));
    }

    queue.push(Event::Up);
    queue.push(Event::Down);

    assert!(wait_until(|| log.lock().len() == 6));
    let log = log.lock();
    assert_eq!(
        *log,
        vec![
            ("a", Event::Up),
            ("b", Event::Up),
            ("c", Event::Up),
            ("a", Event::Down),
            ("b", Event::Down),
            ("c", Event::Down),
        ]
    );
}

#[test]
fn test_concurrent_producers_keep_per_producer_order() {
    let queue = EventQueue::new().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    queue.subscribe(move |event| sink.lock().push(event));

    let producers: Vec<_> = (1..=3u8)
        .map(|id| {
            let sender = queue.sender();
            thread::spawn(move || {
                for _ in 0..50 {
                    sender.push(Event::SelectPlugin(id));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    assert!(wait_until(|| seen.lock().len() == 150));
    for id in 1..=3u8 {
        let count = seen
            .lock()
            .iter()
            .filter(|e| **e == Event::SelectPlugin(id))
            .count();
        assert_eq!(count, 50);
    }
}

#[test]
fn test_producers_are_not_blocked_by_slow_subscribers() {
    let queue = EventQueue::new().unwrap();
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = delivered.clone();
    queue.subscribe(move |_| {
        thread::sleep(Duration::from_millis(50));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    queue.push(Event::Enter);
    thread::sleep(Duration::from_millis(10));

    let started = Instant::now();
    for _ in 0..10 {
        queue.push(Event::Up);
    }
    assert!(started.elapsed() < Duration::from_millis(40));

    assert!(wait_until(|| delivered.load(Ordering::SeqCst) == 11));
}

#[test]
fn test_drop_with_push_in_flight_does_not_deadlock() {
    let queue = EventQueue::new().unwrap();
    let delivered_after_drop = Arc::new(AtomicBool::new(false));
    let dropped = Arc::new(AtomicBool::new(false));

    let flag = delivered_after_drop.clone();
    let gone = dropped.clone();
    queue.subscribe(move |_| {
        if gone.load(Ordering::SeqCst) {
            flag.store(true, Ordering::SeqCst);
        }
    });

    let sender = queue.sender();
    let producer = thread::spawn(move || {
        for _ in 0..10_000 {
            sender.push(Event::Left);
        }
    });

    thread::sleep(Duration::from_millis(1));
    drop(queue);
    dropped.store(true, Ordering::SeqCst);

    producer.join().unwrap();
    thread::sleep(Duration::from_millis(20));
    assert!(!delivered_after_drop.load(Ordering::SeqCst));
}

#[test]
fn test_panicking_subscriber_does_not_stop_delivery() {
    let queue = EventQueue::new().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    queue.subscribe(|event| {
        if event == Event::Up {
            panic!("subscriber failure");
        }
    });
    let sink = seen.clone();
    queue.subscribe(move |event| sink.lock().push(event));

    queue.push(Event::Up);
    queue.push(Event::Down);
    assert!(wait_until(|| seen.lock().len() == 2));

    queue.push(Event::Up);
    queue.push(Event::Exit);
    assert!(wait_until(|| seen.lock().len() == 4));
    assert_eq!(
        *seen.lock(),
        vec![Event::Up, Event::Down, Event::Up, Event::Exit]
    );
    assert!(wait_until(|| queue.pending_count() == 0));
}
