// ==============================================
// LRU CACHE CONCURRENCY TESTS (integration)
// ==============================================
//
// Interleaved set/get/clear from many threads on one shared cache. These
// require multi-threaded execution and cannot live inline.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use lrukit::policy::lru::LruCache;
use lrukit::traits::Cache;
use rand::Rng;

// ==============================================
// High-volume set/get stress
// ==============================================

mod stress {
    use super::*;

    #[test]
    fn writer_and_reader_million_ops() {
        let cache: Arc<LruCache<String, usize>> = Arc::new(LruCache::new(10));
        let ops = 1_000_000;

        let writer = {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..ops {
                    cache.set(i.to_string(), i);
                }
            })
        };

        let reader = {
            let cache = cache.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..ops {
                    let key = rng.gen_range(0..ops).to_string();
                    if let Some(value) = cache.get(key.as_str()) {
                        assert_eq!(value.to_string(), key);
                    }
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();

        assert_eq!(cache.len(), 10);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn many_threads_shared_key_space() {
        let capacity = 64;
        let num_threads = 8;
        let ops_per_thread = 20_000;
        let cache: Arc<LruCache<u64, u64>> = Arc::new(LruCache::new(capacity));
        let barrier = Arc::new(Barrier::new(num_threads));

        let handles: Vec<_> = (0..num_threads)
            .map(|tid| {
                let cache = cache.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let mut rng = rand::thread_rng();
                    barrier.wait();
                    for i in 0..ops_per_thread {
                        let key = rng.gen_range(0..256u64);
                        if (i + tid) % 3 == 0 {
                            cache.set(key, key * 2);
                        } else if let Some(value) = cache.get(&key) {
                            assert_eq!(value, key * 2, "value for key {key} was corrupted");
                        }
                        if i % 1_000 == 0 {
                            assert!(cache.len() <= capacity);
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert!(cache.len() <= capacity);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn invariants_hold_while_mutating() {
        let cache: Arc<LruCache<u32, u32>> = Arc::new(LruCache::new(16));
        let stop = Arc::new(AtomicBool::new(false));
        let violations = Arc::new(AtomicUsize::new(0));

        let checker = {
            let cache = cache.clone();
            let stop = stop.clone();
            let violations = violations.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    if cache.check_invariants().is_err() {
                        violations.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        };

        let workers: Vec<_> = (0..4u32)
            .map(|tid| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..50_000u32 {
                        let key = (i * 7 + tid) % 40;
                        match i % 5 {
                            0 | 1 => {
                                cache.set(key, i);
                            },
                            2 | 3 => {
                                let _ = cache.get(&key);
                            },
                            _ => {
                                let _ = cache.remove(&key);
                            },
                        }
                    }
                })
            })
            .collect();

        for w in workers {
            w.join().unwrap();
        }
        stop.store(true, Ordering::Relaxed);
        checker.join().unwrap();

        assert_eq!(violations.load(Ordering::Relaxed), 0);
        cache.check_invariants().unwrap();
    }
}

// ==============================================
// Atomic clear()
// ==============================================
//
// get() racing clear() must see either the old value or a miss, never a
// value that belongs to another key.

mod atomic_clear {
    use super::*;

    #[test]
    fn clear_concurrent_with_get_is_consistent() {
        let cache: Arc<LruCache<u64, u64>> = Arc::new(LruCache::new(100));
        let stop = Arc::new(AtomicBool::new(false));
        let inconsistencies = Arc::new(AtomicUsize::new(0));

        for i in 0..100u64 {
            cache.set(i, i);
        }

        let reader = {
            let cache = cache.clone();
            let stop = stop.clone();
            let inconsistencies = inconsistencies.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    for i in 0..100u64 {
                        if let Some(val) = cache.get(&i) {
                            if val != i {
                                inconsistencies.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                }
            })
        };

        let writer = {
            let cache = cache.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    cache.clear();
                    assert!(cache.len() <= 100);
                    for i in 0..100u64 {
                        cache.set(i, i);
                    }
                }
                stop.store(true, Ordering::Relaxed);
            })
        };

        reader.join().unwrap();
        writer.join().unwrap();

        assert_eq!(
            inconsistencies.load(Ordering::Relaxed),
            0,
            "get() returned an inconsistent value during concurrent clear()"
        );
        cache.check_invariants().unwrap();
    }

    #[test]
    fn clear_is_all_or_nothing() {
        let cache: Arc<LruCache<u32, u32>> = Arc::new(LruCache::new(8));
        let barrier = Arc::new(Barrier::new(2));

        for _ in 0..200 {
            for i in 0..8 {
                cache.set(i, i);
            }

            let clearer = {
                let cache = cache.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache.clear();
                })
            };

            barrier.wait();
            let len = cache.len();
            assert!(len == 8 || len == 0, "observed a partly cleared cache: {len}");

            clearer.join().unwrap();
            assert!(cache.is_empty());
        }
    }
}

// ==============================================
// Trait object use across threads
// ==============================================

mod trait_object {
    use super::*;

    #[test]
    fn dyn_cache_is_shareable() {
        let cache: Arc<dyn Cache<u32, String>> = Arc::new(LruCache::new(4));

        let handles: Vec<_> = (0..4u32)
            .map(|tid| {
                let cache = cache.clone();
                thread::spawn(move || {
                    cache.set(tid, format!("thread-{tid}"));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cache.len(), 4);
        for tid in 0..4u32 {
            assert_eq!(cache.get(&tid), Some(format!("thread-{tid}")));
        }
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 4);
    }
}
