//! Dispatch Tests
//!
//! End-to-end behavior of the queue -> decode -> match -> deliver pipeline:
//! - Every matching pattern fires exactly once per message
//! - Malformed datagrams are dropped without stalling the batch
//! - Bundles unwrap depth-first in element order
//! - Received patterns are never delivered

use oscline_core::{OscAddress, OscBundle, OscMessage, OscPacket, OscValue};
use oscline_router::{listener, ListenerHandle, OscDispatcher};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Utilities
// ============================================================================

fn addr(s: &str) -> OscAddress {
    OscAddress::parse(s).unwrap()
}

fn counter() -> (ListenerHandle, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let l = listener(move |_: &OscAddress, _: &OscMessage| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    (l, count)
}

fn collector() -> (ListenerHandle, Arc<Mutex<Vec<OscMessage>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let l = listener(move |_: &OscAddress, msg: &OscMessage| s.lock().push(msg.clone()));
    (l, seen)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_each_matching_pattern_fires_once() {
    let mut dispatcher = OscDispatcher::new(16);
    let (wild, wild_count) = counter();
    let (exact, exact_count) = counter();
    let (miss, miss_count) = counter();

    dispatcher.bind(addr("/foo/*"), wild).unwrap();
    dispatcher.bind(addr("/foo/bar"), exact).unwrap();
    dispatcher.bind(addr("/foo/baz"), miss).unwrap();

    let bytes = OscPacket::from(OscMessage::new(addr("/foo/bar")).with_arg(1i32)).encode();
    assert!(dispatcher.enqueue_raw(bytes, None));

    let report = dispatcher.drain_and_dispatch();
    assert_eq!(report.datagrams, 1);
    assert_eq!(report.messages, 1);
    assert_eq!(report.deliveries, 2);
    assert_eq!(wild_count.load(Ordering::SeqCst), 1);
    assert_eq!(exact_count.load(Ordering::SeqCst), 1);
    assert_eq!(miss_count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listener_bound_to_two_patterns_fires_for_each() {
    let mut dispatcher = OscDispatcher::new(16);
    let (l, count) = counter();
    dispatcher.bind(addr("/mix/*"), Arc::clone(&l)).unwrap();
    dispatcher.bind(addr("/mix/{master,aux}"), l).unwrap();

    let packet = OscPacket::from(OscMessage::new(addr("/mix/master")));
    let report = dispatcher.dispatch_packet(&packet);
    assert_eq!(report.deliveries, 2);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_decode_failure_then_continue() {
    let mut dispatcher = OscDispatcher::new(16);
    let (l, seen) = collector();
    dispatcher.bind(addr("/x"), l).unwrap();

    let good = OscPacket::from(OscMessage::new(addr("/x")).with_arg("after")).encode();
    let mut unknown_tag = OscPacket::from(OscMessage::new(addr("/x")).with_arg(1i32))
        .encode()
        .to_vec();
    // Replace the 'i' in ",i\0\0" with an unknown tag
    unknown_tag[5] = b'Z';

    dispatcher.enqueue_raw(unknown_tag, None);
    dispatcher.enqueue_raw(vec![0u8; 3], None);
    dispatcher.enqueue_raw(good, None);

    let report = dispatcher.drain_and_dispatch();
    assert_eq!(report.datagrams, 3);
    assert_eq!(report.rejected, 2);

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].arguments, vec![OscValue::from("after")]);
}

#[test]
fn test_nested_bundle_depth_first_order() {
    let mut dispatcher = OscDispatcher::new(16);
    let (l, seen) = collector();
    dispatcher.bind(addr("/seq/?"), l).unwrap();

    let packet = OscPacket::from(
        OscBundle::immediate()
            .with_element(OscMessage::new(addr("/seq/a")))
            .with_element(
                OscBundle::new(oscline_core::time::from_parts(10, 0))
                    .with_element(OscMessage::new(addr("/seq/b")))
                    .with_element(
                        OscBundle::immediate().with_element(OscMessage::new(addr("/seq/c"))),
                    ),
            )
            .with_element(OscMessage::new(addr("/seq/d"))),
    );
    dispatcher.enqueue_raw(packet.encode(), None);
    let report = dispatcher.drain_and_dispatch();

    assert_eq!(report.messages, 4);
    let order: Vec<String> = seen.lock().iter().map(|m| m.address.method().to_string()).collect();
    assert_eq!(order, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_datagrams_dispatched_in_arrival_order() {
    let mut dispatcher = OscDispatcher::new(64);
    let (l, seen) = collector();
    dispatcher.bind(addr("/n"), l).unwrap();

    for i in 0..20i32 {
        let bytes = OscPacket::from(OscMessage::new(addr("/n")).with_arg(i)).encode();
        dispatcher.enqueue_raw(bytes, None);
    }
    dispatcher.drain_and_dispatch();

    let values: Vec<i32> = seen.lock().iter().filter_map(|m| m.arguments[0].as_i32()).collect();
    assert_eq!(values, (0..20).collect::<Vec<_>>());
}

#[test]
fn test_received_pattern_is_rejected_inside_bundle() {
    let mut dispatcher = OscDispatcher::new(16);
    let (l, count) = counter();
    dispatcher.bind(addr("/a/*"), l).unwrap();

    let packet = OscPacket::from(
        OscBundle::immediate()
            .with_element(OscMessage::new(addr("/a/[xy]")))
            .with_element(OscMessage::new(addr("/a/x"))),
    );
    dispatcher.enqueue_raw(packet.encode(), None);
    let report = dispatcher.drain_and_dispatch();

    assert_eq!(report.messages, 2);
    assert_eq!(report.invalid_addresses, 1);
    assert_eq!(report.deliveries, 1);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unbind_stops_delivery() {
    let mut dispatcher = OscDispatcher::new(16);
    let (l, count) = counter();
    dispatcher.bind(addr("/u"), Arc::clone(&l)).unwrap();

    let packet = OscPacket::from(OscMessage::new(addr("/u")));
    dispatcher.dispatch_packet(&packet);
    assert!(dispatcher.unbind(&addr("/u"), &l));
    dispatcher.dispatch_packet(&packet);

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(dispatcher.registry().is_empty());
}

#[test]
fn test_full_queue_drops_excess() {
    let mut dispatcher = OscDispatcher::new(2);
    let bytes = OscPacket::from(OscMessage::new(addr("/q"))).encode();

    assert!(dispatcher.enqueue_raw(bytes.clone(), None));
    assert!(dispatcher.enqueue_raw(bytes.clone(), None));
    assert!(!dispatcher.enqueue_raw(bytes, None));

    assert_eq!(dispatcher.queue_stats().dropped(), 1);
    assert_eq!(dispatcher.drain_and_dispatch().datagrams, 2);
}

#[test]
fn test_enqueue_from_other_threads() {
    let mut dispatcher = OscDispatcher::new(1024);
    let (l, count) = counter();
    dispatcher.bind(addr("/t/*"), l).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let sender = dispatcher.sender();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let bytes =
                        OscPacket::from(OscMessage::new(addr(&format!("/t/{}", t)))).encode();
                    sender.enqueue_raw(bytes, None);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let report = dispatcher.drain_and_dispatch();
    assert_eq!(report.datagrams, 200);
    assert_eq!(count.load(Ordering::SeqCst), 200);
}
