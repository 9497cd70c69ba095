//! Stress tests for concurrent acquisition and release.
//!
//! Sources are served from memory by an opener that tracks which streams are
//! alive, so the file cap and pipe exclusivity can be checked from the
//! stream's point of view rather than the pool's own counters.

use std::collections::HashSet;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use stream_pool::{Acquisition, PoolConfig, SourceOpener, SourceReader, StreamPool};

#[derive(Default)]
struct Tracker {
    live_files: AtomicUsize,
    max_live_files: AtomicUsize,
    owned_pipes: Mutex<HashSet<PathBuf>>,
    pipe_violations: AtomicUsize,
}

/// Stream that reports to the tracker when it is closed.
struct TrackedStream {
    data: Cursor<Vec<u8>>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl Read for TrackedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
    }
}

struct TrackingOpener {
    tracker: Arc<Tracker>,
}

impl SourceOpener for TrackingOpener {
    fn open_file(&self, path: &Path) -> io::Result<SourceReader> {
        let live = self.tracker.live_files.fetch_add(1, Ordering::SeqCst) + 1;
        self.tracker.max_live_files.fetch_max(live, Ordering::SeqCst);

        let tracker = Arc::clone(&self.tracker);
        Ok(Box::new(TrackedStream {
            data: Cursor::new(path.display().to_string().into_bytes()),
            on_close: Some(Box::new(move || {
                tracker.live_files.fetch_sub(1, Ordering::SeqCst);
            })),
        }))
    }

    fn open_pipe(&self, path: &Path) -> io::Result<SourceReader> {
        if !self.tracker.owned_pipes.lock().unwrap().insert(path.to_path_buf()) {
            self.tracker.pipe_violations.fetch_add(1, Ordering::SeqCst);
        }

        let tracker = Arc::clone(&self.tracker);
        let owned = path.to_path_buf();
        Ok(Box::new(TrackedStream {
            data: Cursor::new(vec![b'>'; 64]),
            on_close: Some(Box::new(move || {
                tracker.owned_pipes.lock().unwrap().remove(&owned);
            })),
        }))
    }
}

fn tracked_pool(
    files: usize,
    pipes: usize,
    concurrent_files: usize,
) -> (Arc<StreamPool>, Arc<Tracker>) {
    let tracker = Arc::new(Tracker::default());
    let config = PoolConfig {
        paths: (0..files).map(|i| PathBuf::from(format!("file_{i}"))).collect(),
        pipes: (0..pipes).map(|i| PathBuf::from(format!("pipe_{i}"))).collect(),
        concurrent_files,
    };
    let opener = TrackingOpener {
        tracker: Arc::clone(&tracker),
    };
    let pool = StreamPool::with_opener(config, opener).unwrap();
    (Arc::new(pool), tracker)
}

/// Many threads draining a file-only pool never exceed the cap and read
/// every file exactly once.
#[test]
fn stress_test_file_cap_never_exceeded() {
    const FILES: usize = 400;
    const THREADS: usize = 8;
    const CAP: usize = 3;

    let (pool, tracker) = tracked_pool(FILES, 0, CAP);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let seen = Arc::clone(&seen);
            thread::spawn(move || loop {
                match pool.try_acquire().unwrap() {
                    Acquisition::Ready(mut handle) => {
                        let mut contents = String::new();
                        handle.read_to_string(&mut contents).unwrap();
                        assert_eq!(Path::new(&contents), handle.path());
                        seen.lock().unwrap().push(handle.path().to_path_buf());
                    }
                    Acquisition::Unavailable => thread::yield_now(),
                    Acquisition::Exhausted => break,
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert!(tracker.max_live_files.load(Ordering::SeqCst) <= CAP);
    assert_eq!(tracker.live_files.load(Ordering::SeqCst), 0);

    let seen = seen.lock().unwrap();
    let unique: HashSet<_> = seen.iter().collect();
    assert_eq!(seen.len(), FILES);
    assert_eq!(unique.len(), FILES);

    let stats = pool.stats().unwrap();
    assert_eq!(stats.files_open, 0);
    assert_eq!(stats.files_issued, FILES as u64);
    assert!(stats.is_exhausted());
}

/// Pipes are never owned by two handles at once, however hard threads
/// compete for them.
#[test]
fn stress_test_pipe_mutual_exclusion() {
    const PIPES: usize = 4;
    const THREADS: usize = 12;
    const ROUNDS: usize = 2_000;

    let (pool, tracker) = tracked_pool(0, PIPES, 0);
    let issued = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let issued = Arc::clone(&issued);
            thread::spawn(move || {
                for i in 0..ROUNDS {
                    if let Some(mut handle) = pool.acquire() {
                        assert!(handle.is_pipe());
                        let mut buf = [0u8; 16];
                        handle.read_exact(&mut buf).unwrap();
                        issued.fetch_add(1, Ordering::SeqCst);
                        if i % 7 == 0 {
                            thread::yield_now();
                        }
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(tracker.pipe_violations.load(Ordering::SeqCst), 0);
    assert!(tracker.owned_pipes.lock().unwrap().is_empty());

    let (free, busy) = pool.pipe_sets().unwrap();
    assert!(busy.is_empty());
    assert_eq!(free.len(), PIPES);
    assert_eq!(free.iter().collect::<HashSet<_>>().len(), PIPES);

    let stats = pool.stats().unwrap();
    assert_eq!(stats.pipes_issued, issued.load(Ordering::SeqCst) as u64);
}

/// Files and pipes served together keep both invariants.
#[test]
fn stress_test_mixed_sources() {
    const FILES: usize = 100;
    const PIPES: usize = 3;
    const THREADS: usize = 8;
    const CAP: usize = 2;

    let (pool, tracker) = tracked_pool(FILES, PIPES, CAP);
    let files_read = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let files_read = Arc::clone(&files_read);
            thread::spawn(move || {
                for _ in 0..500 {
                    let Some(mut handle) = pool.acquire() else {
                        thread::yield_now();
                        continue;
                    };
                    let mut sink = Vec::new();
                    handle.read_to_end(&mut sink).unwrap();
                    if handle.is_file() {
                        files_read.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert!(tracker.max_live_files.load(Ordering::SeqCst) <= CAP);
    assert_eq!(tracker.pipe_violations.load(Ordering::SeqCst), 0);

    let stats = pool.stats().unwrap();
    assert_eq!(stats.files_open, 0);
    assert_eq!(stats.busy_pipes, 0);
    assert_eq!(stats.free_pipes, PIPES);
    assert_eq!(stats.files_issued, files_read.load(Ordering::SeqCst) as u64);
}

/// With both pipes held, two other threads asking at the same time get
/// nothing until one pipe is released.
#[test]
fn busy_pipes_are_unavailable_to_other_threads() {
    let (pool, _tracker) = tracked_pool(0, 2, 0);

    let p = pool.acquire().unwrap();
    let q = pool.acquire().unwrap();
    assert_eq!(p.path(), Path::new("pipe_0"));
    assert_eq!(q.path(), Path::new("pipe_1"));

    let barrier = Arc::new(Barrier::new(2));
    let contenders: Vec<_> = (0..2)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                matches!(pool.try_acquire().unwrap(), Acquisition::Unavailable)
            })
        })
        .collect();

    for contender in contenders {
        assert!(contender.join().unwrap());
    }

    drop(p);
    let pool_clone = Arc::clone(&pool);
    let recycled = thread::spawn(move || pool_clone.acquire().map(|h| h.path().to_path_buf()))
        .join()
        .unwrap();
    assert_eq!(recycled, Some(PathBuf::from("pipe_0")));
    drop(q);
}

/// Handles dropped simultaneously on many threads each release once.
#[test]
fn concurrent_disposal_releases_exactly_once() {
    const FILES: usize = 6;
    const PIPES: usize = 6;

    let (pool, tracker) = tracked_pool(FILES, PIPES, FILES);

    let handles: Vec<_> = std::iter::from_fn(|| pool.acquire()).collect();
    assert_eq!(handles.len(), FILES + PIPES);

    let stats = pool.stats().unwrap();
    assert_eq!(stats.files_open, FILES);
    assert_eq!(stats.busy_pipes, PIPES);

    let barrier = Arc::new(Barrier::new(handles.len()));
    let droppers: Vec<_> = handles
        .into_iter()
        .map(|handle| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                drop(handle);
            })
        })
        .collect();

    for dropper in droppers {
        dropper.join().unwrap();
    }

    let stats = pool.stats().unwrap();
    assert_eq!(stats.files_open, 0);
    assert_eq!(stats.busy_pipes, 0);
    assert_eq!(stats.free_pipes, PIPES);
    assert_eq!(tracker.live_files.load(Ordering::SeqCst), 0);

    let (free, _) = pool.pipe_sets().unwrap();
    assert_eq!(free.iter().collect::<HashSet<_>>().len(), PIPES);
}
