//! Integration tests for rxcore
//!
//! Tests operator chains across subjects, schedulers and disposal.

use std::{
  convert::Infallible,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
  time::Duration,
};

use rxcore::{of_sequence, prelude::*};

type Log<T> = Arc<Mutex<Vec<T>>>;

fn log<T>() -> Log<T> { Arc::new(Mutex::new(Vec::new())) }

#[test]
fn test_basic_chain_integration() {
  let result = log();
  let c_result = result.clone();

  observable::from_iter(1..=10)
    .map(|x| x * 2)
    .filter(|&x| x > 10)
    .take(3)
    .subscribe(move |v| c_result.lock().unwrap().push(v));

  assert_eq!(*result.lock().unwrap(), vec![12, 14, 16]);
}

#[test]
fn test_complex_chain_with_multiple_operators() {
  let result = log();
  let c_result = result.clone();

  observable::from_iter(1..=20)
    .filter(|&x| x % 2 == 0)
    .map(|x| x * x)
    .scan(0, |acc, v| acc + v)
    .take_while(|&x| x < 100)
    .skip(2)
    .subscribe(move |v| c_result.lock().unwrap().push(v));

  // Running sums of even squares: 4, 20, 56, 120 ...
  assert_eq!(*result.lock().unwrap(), vec![56]);
}

#[test]
fn test_subject_ignores_next_after_complete() {
  let mut subject = Subject::<&str, Infallible>::new();
  let events = log();
  let c_events = events.clone();
  subject.clone().subscribe_event(move |e| c_events.lock().unwrap().push(e));

  subject.next("🐶");
  subject.clone().complete();
  subject.next("🐱");

  assert_eq!(*events.lock().unwrap(), vec![Event::Next("🐶"), Event::Completed]);
}

#[test]
fn test_behavior_subject_seed_then_live() {
  let mut subject = BehaviorSubject::<&str, Infallible>::new("Initial value");
  let first = log();
  let c_first = first.clone();
  subject.clone().subscribe(move |v| c_first.lock().unwrap().push(v));

  subject.next("X");
  let second = log();
  let c_second = second.clone();
  subject.clone().subscribe(move |v| c_second.lock().unwrap().push(v));
  subject.next("Y");

  assert_eq!(*first.lock().unwrap(), vec!["Initial value", "X", "Y"]);
  assert_eq!(*second.lock().unwrap(), vec!["X", "Y"]);
  assert_eq!(subject.value(), Some("Y"));
}

#[test]
fn test_replay_subject_window() {
  let mut subject = ReplaySubject::<i32, Infallible>::new(2);
  for v in 1..=3 {
    subject.next(v);
  }
  let seen = log();
  let c_seen = seen.clone();
  subject.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
  subject.next(4);
  assert_eq!(*seen.lock().unwrap(), vec![2, 3, 4]);
}

#[test]
fn test_distinct_until_changed_sequence() {
  let seen = log();
  let c_seen = seen.clone();
  of_sequence!("A", "A", "B", "B", "A")
    .distinct_until_changed()
    .subscribe(move |v| c_seen.lock().unwrap().push(v));
  assert_eq!(*seen.lock().unwrap(), vec!["A", "B", "A"]);
}

#[test]
fn test_zip_stops_at_shorter_source() {
  let events = log();
  let c_events = events.clone();
  observable::from_iter(vec!["🅰️", "🅱️", "🅲", "🅳"])
    .zip(observable::from_iter(1..=5))
    .subscribe_event(move |e| c_events.lock().unwrap().push(e));
  assert_eq!(
    *events.lock().unwrap(),
    vec![
      Event::Next(("🅰️", 1)),
      Event::Next(("🅱️", 2)),
      Event::Next(("🅲", 3)),
      Event::Next(("🅳", 4)),
      Event::Completed,
    ]
  );
}

#[test]
fn test_combine_latest_greetings() {
  let mut left = Subject::<&str, Infallible>::new();
  let mut right = Subject::<&str, Infallible>::new();
  let seen = log();
  let c_seen = seen.clone();
  left
    .clone()
    .combine_latest(right.clone(), |l, r| format!("{l} {r}"))
    .subscribe(move |v| c_seen.lock().unwrap().push(v));

  left.next("Hello,");
  right.next("world");
  right.next("RxSwift");
  left.next("Have a good day,");

  assert_eq!(
    *seen.lock().unwrap(),
    vec!["Hello, world", "Hello, RxSwift", "Have a good day, RxSwift"]
  );
}

#[test]
fn test_switch_latest_one_two_three() {
  let mut one = Subject::<&str, Infallible>::new();
  let mut two = Subject::<&str, Infallible>::new();
  let mut three = Subject::<&str, Infallible>::new();
  let mut source = Subject::<Subject<&str, Infallible>, Infallible>::new();
  let seen = log();
  let c_seen = seen.clone();
  source.clone().switch_on_next().subscribe(move |v| c_seen.lock().unwrap().push(v));

  source.next(one.clone());
  one.next("An old one");
  source.next(two.clone());
  two.next("Same old, same old");
  one.next("ignored");
  source.next(three.clone());
  two.next("Why doesn't it work?");
  three.next("Hey it's three. I win.");

  assert_eq!(
    *seen.lock().unwrap(),
    vec!["An old one", "Same old, same old", "Hey it's three. I win."]
  );
  assert!(one.is_empty());
  assert!(two.is_empty());
  assert_eq!(three.subscriber_count(), 1);
}

#[test]
fn test_double_unsubscribe_is_safe() {
  let mut subject = Subject::<i32, Infallible>::new();
  let seen = log();
  let c_seen = seen.clone();
  let mut subscription = subject
    .clone()
    .map(|v| v + 1)
    .subscribe(move |v| c_seen.lock().unwrap().push(v));
  subject.next(1);
  subscription.unsubscribe();
  subscription.unsubscribe();
  subject.next(2);
  assert!(subscription.is_closed());
  assert_eq!(*seen.lock().unwrap(), vec![2]);
}

#[test]
fn test_retry_when_four_attempts_then_error() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let events = log();
  let c_events = events.clone();
  let c_attempts = attempts.clone();
  observable::create(move |emitter: &mut dyn Emitter<&str, String>| {
    c_attempts.fetch_add(1, Ordering::SeqCst);
    emitter.next("🍎");
    emitter.error("Unknown error".to_string());
  })
  .retry_when(|errors| {
    errors
      .enumerate()
      .try_map(|(attempt, err)| if attempt < 3 { Ok(attempt) } else { Err(err) })
  })
  .subscribe_event(move |e| c_events.lock().unwrap().push(e));

  assert_eq!(attempts.load(Ordering::SeqCst), 4);
  let mut expected = vec![Event::Next("🍎"); 4];
  expected.push(Event::Error("Unknown error".to_string()));
  assert_eq!(*events.lock().unwrap(), expected);
}

#[test]
fn test_dispose_bag_releases_on_drop() {
  let mut subject = Subject::<i32, Infallible>::new();
  let seen = log();
  {
    let bag = DisposeBag::new();
    let c_seen = seen.clone();
    subject
      .clone()
      .subscribe(move |v| c_seen.lock().unwrap().push(v))
      .disposed_by(&bag);
    subject.next(1);
    assert_eq!(subject.subscriber_count(), 1);
  }
  subject.next(2);
  assert!(subject.is_empty());
  assert_eq!(*seen.lock().unwrap(), vec![1]);
}

#[test]
fn test_interval_debounce_on_virtual_time() {
  let scheduler = TestScheduler::new();
  let seen = log();
  let c_seen = seen.clone();
  let mut search = Subject::<&str, RxError>::new();
  let c_scheduler = scheduler.clone();
  search
    .clone()
    .debounce(Duration::from_millis(300), scheduler.clone())
    .distinct_until_changed()
    .flat_map(move |query| observable::timer(query.len(), Duration::from_millis(50), c_scheduler.clone()))
    .subscribe(move |v| c_seen.lock().unwrap().push(v));

  search.next("r");
  scheduler.advance_by(Duration::from_millis(100));
  search.next("rx");
  scheduler.advance_by(Duration::from_millis(400));
  search.next("rxc");
  scheduler.advance_by(Duration::from_millis(100));
  search.next("rx");
  scheduler.advance_by(Duration::from_millis(1000));

  // "rx" settles twice but only the first settle passes the distinct gate.
  assert_eq!(*seen.lock().unwrap(), vec![2]);
}

#[test]
fn test_share_replay_one_upstream_for_many() {
  let subscriptions = Arc::new(AtomicUsize::new(0));
  let c_subscriptions = subscriptions.clone();
  let mut source = Subject::<i32, Infallible>::new();
  let c_source = source.clone();
  let shared = observable::defer(move || {
    c_subscriptions.fetch_add(1, Ordering::SeqCst);
    c_source.clone()
  })
  .share_replay(1, ShareScope::WhileConnected);

  let first = log();
  let second = log();
  let c_first = first.clone();
  let c_second = second.clone();
  let mut a = shared.clone().subscribe(move |v| c_first.lock().unwrap().push(v));
  source.next(1);
  let mut b = shared.clone().subscribe(move |v| c_second.lock().unwrap().push(v));
  source.next(2);

  assert_eq!(subscriptions.load(Ordering::SeqCst), 1);
  assert_eq!(*first.lock().unwrap(), vec![1, 2]);
  assert_eq!(*second.lock().unwrap(), vec![1, 2]);

  a.unsubscribe();
  b.unsubscribe();
  assert!(source.is_empty());
}

#[test]
fn test_two_threads_emitting_into_one_subject_are_serialized() {
  use std::sync::atomic::AtomicBool;

  let subject = Subject::<usize, Infallible>::new();
  let in_callback = Arc::new(AtomicBool::new(false));
  let overlaps = Arc::new(AtomicUsize::new(0));
  let seen = log();
  let (c_in_callback, c_overlaps, c_seen) = (in_callback.clone(), overlaps.clone(), seen.clone());
  subject.clone().map(|v| v * 2).subscribe(move |v| {
    if c_in_callback.swap(true, Ordering::SeqCst) {
      c_overlaps.fetch_add(1, Ordering::SeqCst);
    }
    std::thread::yield_now();
    c_seen.lock().unwrap().push(v);
    c_in_callback.store(false, Ordering::SeqCst);
  });

  let threads: Vec<_> = (0..2)
    .map(|t| {
      let mut subject = subject.clone();
      std::thread::spawn(move || {
        for v in 0..1000 {
          subject.next(t * 1000 + v);
        }
      })
    })
    .collect();
  for thread in threads {
    thread.join().unwrap();
  }

  assert_eq!(overlaps.load(Ordering::SeqCst), 0);
  let mut seen = seen.lock().unwrap().clone();
  assert_eq!(seen.len(), 2000);
  // Each thread's values arrive in the order that thread emitted them.
  for t in 0..2 {
    let own: Vec<_> = seen.iter().copied().filter(|v| v / 2000 == t).collect();
    assert!(own.windows(2).all(|w| w[0] < w[1]));
  }
  seen.sort_unstable();
  assert_eq!(seen, (0..2000).map(|v| v * 2).collect::<Vec<_>>());
}

#[test]
fn test_take_one_subscribers_are_released() {
  let mut subject = Subject::<i32, Infallible>::new();
  let firsts = log();
  let subscriptions: Vec<_> = (0..100)
    .map(|_| {
      let c_firsts = firsts.clone();
      subject.clone().take(1).subscribe(move |v| c_firsts.lock().unwrap().push(v))
    })
    .collect();

  subject.next(1);
  subject.next(2);

  assert_eq!(subject.subscriber_count(), 0);
  assert!(subscriptions.iter().all(|s| s.is_closed()));
  assert_eq!(*firsts.lock().unwrap(), vec![1; 100]);
}

#[test]
fn test_behavior_relay_never_terminates() {
  let relay = BehaviorRelay::new(vec!["🐶"]);
  let sizes = log();
  let c_sizes = sizes.clone();
  relay
    .clone()
    .map(|pets| pets.len())
    .subscribe_event(move |e| c_sizes.lock().unwrap().push(e));

  let mut pets = relay.value();
  pets.push("🐱");
  relay.accept(pets);

  assert_eq!(*sizes.lock().unwrap(), vec![Event::Next(1), Event::Next(2)]);
  assert_eq!(relay.value(), vec!["🐶", "🐱"]);
}

#[test]
fn test_flat_map_with_retry() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let seen = log();
  let c_seen = seen.clone();
  let c_attempts = attempts.clone();
  observable::from_iter(vec![1, 2])
    .map_err(RxError::from)
    .flat_map(move |v| {
      let c_attempts = c_attempts.clone();
      observable::create(move |emitter: &mut dyn Emitter<i32, RxError>| {
        if c_attempts.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
          emitter.error(RxError::custom("flaky"));
        } else {
          emitter.next(v * 10);
          emitter.complete();
        }
      })
      .retry(1)
    })
    .subscribe(move |v| c_seen.lock().unwrap().push(v));

  assert_eq!(attempts.load(Ordering::SeqCst), 4);
  assert_eq!(*seen.lock().unwrap(), vec![10, 20]);
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn test_cross_thread_pipeline() {
  use std::sync::mpsc::channel;

  let (tx, rx) = channel();
  let tx_done = tx.clone();
  observable::from_iter(0..50)
    .map_err(RxError::from)
    .subscribe_on(ThreadPoolScheduler)
    .map(|v| v * 2)
    .observe_on(SerialScheduler::main().unwrap())
    .subscribe_all(
      move |v| {
        let _ = tx.send(Some(v));
      },
      |_| {},
      move || {
        let _ = tx_done.send(None);
      },
    );

  let received: Vec<i32> = rx.iter().map_while(|v| v).collect();
  assert_eq!(received, (0..50).map(|v| v * 2).collect::<Vec<_>>());
}
