#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::policy::lru::LruCore;

// Fuzz arbitrary set/get/peek/remove/clear sequences on LruCore
//
// First byte picks the capacity; the rest are (op, key) pairs over a small
// key space so updates and evictions both happen often.
fuzz_target!(|data: &[u8]| {
    let Some((&cap, ops)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(cap % 16) + 1;
    let mut cache: LruCore<u8, u32> = LruCore::new(capacity);

    for (step, chunk) in ops.chunks_exact(2).enumerate() {
        let key = chunk[1] % 32;
        let value = step as u32;

        match chunk[0] % 5 {
            0 => {
                let present = cache.contains(&key);
                assert_eq!(cache.set(key, value), present);
                assert_eq!(cache.peek(&key), Some(&value));
                assert_eq!(cache.keys_mru().next(), Some(&key));
            }
            1 => {
                let expected = cache.peek(&key).copied();
                assert_eq!(cache.get(&key).copied(), expected);
                if expected.is_some() {
                    assert_eq!(cache.keys_mru().next(), Some(&key));
                }
            }
            2 => {
                let present = cache.contains(&key);
                assert_eq!(cache.remove(&key).is_some(), present);
                assert!(!cache.contains(&key));
            }
            3 => {
                let before: Vec<u8> = cache.keys_mru().copied().collect();
                let _ = cache.peek(&key);
                let after: Vec<u8> = cache.keys_mru().copied().collect();
                assert_eq!(before, after);
            }
            4 => {
                cache.clear();
                assert!(cache.is_empty());
            }
            _ => unreachable!(),
        }

        assert!(cache.len() <= capacity);
        assert!(cache.check_invariants().is_ok());
    }
});
