//! Deferred command queue under concurrent posting

use propsheet::dispatch::{DeferredCommandQueue, FlushSignal};
use propsheet::error::CommandError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;
const PER_THREAD: usize = 50;

#[test]
fn test_concurrent_posts_keep_per_thread_order() {
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    let queue = Arc::new(DeferredCommandQueue::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    let log = Arc::new(Mutex::new(Vec::new()));
    let start = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let queue = Arc::clone(&queue);
            let log = Arc::clone(&log);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for i in 0..PER_THREAD {
                    let log = Arc::clone(&log);
                    queue.post(move || {
                        log.lock().unwrap().push((t, i));
                        Ok(())
                    });
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Nothing ran on the posting threads.
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(queue.len(), THREADS * PER_THREAD);
    assert_eq!(requests.load(Ordering::SeqCst), 1);

    let report = queue.flush();
    assert_eq!(report.executed, THREADS * PER_THREAD);
    assert_eq!(report.failed, 0);

    let log = log.lock().unwrap();
    for t in 0..THREADS {
        let seen: Vec<usize> = log.iter().filter(|(th, _)| *th == t).map(|(_, i)| *i).collect();
        assert_eq!(seen, (0..PER_THREAD).collect::<Vec<_>>());
    }
}

#[test]
fn test_flush_requested_again_after_drain() {
    let (signal, requests) = FlushSignal::new_pair();
    let queue = DeferredCommandQueue::new(signal);

    queue.post(|| Ok(()));
    queue.post(|| Ok(()));
    assert!(requests.recv_timeout(Duration::from_secs(1)).is_ok());
    assert!(requests.try_recv().is_err());

    queue.flush();
    assert!(queue.is_empty());

    queue.post(|| Ok(()));
    assert!(requests.recv_timeout(Duration::from_secs(1)).is_ok());
}

#[test]
fn test_failures_and_panics_do_not_stop_the_batch() {
    let queue = DeferredCommandQueue::new(|| {});
    let ran = Arc::new(AtomicUsize::new(0));

    let r = Arc::clone(&ran);
    queue.post(move || {
        r.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    queue.post(|| Err(CommandError::Failed("widget gone".to_string())));
    queue.post(|| panic!("sheet exploded"));
    let r = Arc::clone(&ran);
    queue.post(move || {
        r.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let report = queue.flush();
    assert_eq!(report.executed, 4);
    assert_eq!(report.failed, 2);
    assert_eq!(ran.load(Ordering::SeqCst), 2);
    assert!(queue.is_empty());
}

#[test]
fn test_flush_from_host_thread_while_workers_post() {
    let (signal, requests) = FlushSignal::new_pair();
    let queue = Arc::new(DeferredCommandQueue::new(signal));
    let ran = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let ran = Arc::clone(&ran);
            thread::spawn(move || {
                for _ in 0..100 {
                    let ran = Arc::clone(&ran);
                    queue.post(move || {
                        ran.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    });
                }
            })
        })
        .collect();

    let mut flushed = 0;
    while flushed < 400 {
        if requests.recv_timeout(Duration::from_millis(20)).is_ok() || !queue.is_empty() {
            flushed += queue.flush().executed;
        }
    }
    for producer in producers {
        producer.join().unwrap();
    }

    assert_eq!(flushed, 400);
    assert_eq!(ran.load(Ordering::SeqCst), 400);
}
