use std::sync::Arc;
use std::thread;

use lrukit::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lrukit=trace")),
        )
        .init();

    let cache: Arc<LruCache<String, u32>> = Arc::new(LruCache::new(2));

    cache.set("alpha".to_string(), 1);
    cache.set("beta".to_string(), 2);

    if let Some(value) = cache.get("alpha") {
        println!("hit alpha: {value}");
    }

    cache.set("gamma".to_string(), 3);
    println!("contains beta? {}", cache.contains("beta"));

    let workers: Vec<_> = (0..2u32)
        .map(|tid| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..3u32 {
                    cache.set(format!("t{tid}-{i}"), i);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().expect("worker panicked");
    }

    println!("len after workers: {} (capacity {})", cache.len(), cache.capacity());
    cache.clear();
    println!("len after clear: {}", cache.len());
}

// Expected output (log lines omitted):
// hit alpha: 1
// contains beta? false
// len after workers: 2 (capacity 2)
// len after clear: 0
//
// Explanation: capacity=2; after get("alpha"), "alpha" is MRU and "beta" is
// LRU, so inserting "gamma" evicts "beta".
