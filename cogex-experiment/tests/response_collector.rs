//! Response window race under virtual time.

use cogex_core::{Key, KeyEvent, ResponseKey};
use cogex_experiment::{Response, ResponseCollector};
use cogex_timing::{HighPrecisionTimer, Timer};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

const TIMEOUT: Duration = Duration::from_millis(2000);

fn press_after(tx: &UnboundedSender<KeyEvent>, timer: &HighPrecisionTimer, c: char, ms: u64) {
    let tx = tx.clone();
    let timer = timer.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        let _ = tx.send(KeyEvent::new(Key::from_char(c), timer.now()));
    });
}

fn ms(n: u64) -> u64 {
    n * 1_000_000
}

#[tokio::test(start_paused = true)]
async fn keypress_resolves_with_reaction_time() {
    let timer = HighPrecisionTimer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    press_after(&tx, &timer, 'n', 437);

    let start = timer.now();
    let response = ResponseCollector::new(&mut rx, &timer).collect(TIMEOUT).await;

    assert_eq!(
        response,
        Some(Response {
            key: ResponseKey::Right,
            reaction_time_ms: 437
        })
    );
    // resolved at the keypress, not at the deadline
    assert_eq!(timer.now() - start, ms(437));
}

#[tokio::test(start_paused = true)]
async fn silence_times_out_at_the_deadline() {
    let timer = HighPrecisionTimer::new();
    let (_tx, mut rx) = mpsc::unbounded_channel();

    let start = timer.now();
    let response = ResponseCollector::new(&mut rx, &timer).collect(TIMEOUT).await;

    assert_eq!(response, None);
    assert_eq!(timer.now() - start, ms(2000));
}

#[tokio::test(start_paused = true)]
async fn non_response_keys_do_not_resolve() {
    let timer = HighPrecisionTimer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    press_after(&tx, &timer, ' ', 100);
    press_after(&tx, &timer, 'q', 200);
    press_after(&tx, &timer, 'B', 300);

    let response = ResponseCollector::new(&mut rx, &timer).collect(TIMEOUT).await;
    assert_eq!(
        response,
        Some(Response {
            key: ResponseKey::Left,
            reaction_time_ms: 300
        })
    );
}

#[tokio::test(start_paused = true)]
async fn keys_pressed_before_the_window_are_discarded() {
    let timer = HighPrecisionTimer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(KeyEvent::new(Key::Char('b'), ms(10))).unwrap();

    let response = ResponseCollector::new(&mut rx, &timer).collect(TIMEOUT).await;
    assert_eq!(response, None);
}

#[tokio::test(start_paused = true)]
async fn key_at_the_deadline_beats_the_timer() {
    let timer = HighPrecisionTimer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let start = timer.now();
    // Both triggers are logically ready at the same instant.
    tx.send(KeyEvent::new(Key::Char('b'), start + ms(2000)))
        .unwrap();

    let response = ResponseCollector::new(&mut rx, &timer)
        .collect_from(start, TIMEOUT)
        .await;
    assert_eq!(
        response,
        Some(Response {
            key: ResponseKey::Left,
            reaction_time_ms: 2000
        })
    );
}

#[tokio::test(start_paused = true)]
async fn key_after_the_deadline_is_a_timeout() {
    let timer = HighPrecisionTimer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let start = timer.now();
    tx.send(KeyEvent::new(Key::Char('b'), start + ms(2001)))
        .unwrap();

    let response = ResponseCollector::new(&mut rx, &timer)
        .collect_from(start, TIMEOUT)
        .await;
    assert_eq!(response, None);
}

#[tokio::test(start_paused = true)]
async fn resolves_once_and_leaves_later_keys_for_nobody() {
    let timer = HighPrecisionTimer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    press_after(&tx, &timer, 'b', 1999);
    press_after(&tx, &timer, 'n', 2000);

    let first = ResponseCollector::new(&mut rx, &timer).collect(TIMEOUT).await;
    assert_eq!(first.map(|r| r.key), Some(ResponseKey::Left));
    assert_eq!(first.map(|r| r.reaction_time_ms), Some(1999));

    // Let the second press land, then open a new window later on.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let second = ResponseCollector::new(&mut rx, &timer).collect(TIMEOUT).await;
    assert_eq!(second, None, "stale key leaked into the next window");
}

#[tokio::test(start_paused = true)]
async fn expired_window_does_not_fire_into_the_next_one() {
    let timer = HighPrecisionTimer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let first = ResponseCollector::new(&mut rx, &timer)
        .collect(Duration::from_millis(100))
        .await;
    assert_eq!(first, None);

    press_after(&tx, &timer, 'n', 1500);
    let start = timer.now();
    let second = ResponseCollector::new(&mut rx, &timer).collect(TIMEOUT).await;
    assert_eq!(second.map(|r| r.reaction_time_ms), Some(1500));
    assert_eq!(timer.now() - start, ms(1500));
}

#[tokio::test(start_paused = true)]
async fn closed_input_waits_out_the_window() {
    let timer = HighPrecisionTimer::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<KeyEvent>();
    drop(tx);

    let start = timer.now();
    let response = ResponseCollector::new(&mut rx, &timer).collect(TIMEOUT).await;
    assert_eq!(response, None);
    assert_eq!(timer.now() - start, ms(2000));
}
