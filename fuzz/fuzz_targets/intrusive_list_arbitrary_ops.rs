#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::ds::IntrusiveList;

// Fuzz arbitrary operation sequences on IntrusiveList
//
// push_front, push_back, pop_back, move_to_front, remove and clear, with
// handles picked from every id ever issued (including dead ones).
fuzz_target!(|data: &[u8]| {
    let mut list: IntrusiveList<u32> = IntrusiveList::new();
    let mut all_ids = Vec::new();

    for chunk in data.chunks_exact(2) {
        let op = chunk[0] % 6;
        let value = u32::from(chunk[1]);

        match op {
            0 => {
                let id = list.push_front(value);
                all_ids.push(id);
                assert_eq!(list.front_id(), Some(id));
                assert_eq!(list.get(id), Some(&value));
            }
            1 => {
                let id = list.push_back(value);
                all_ids.push(id);
                assert_eq!(list.back_id(), Some(id));
                assert_eq!(list.get(id), Some(&value));
            }
            2 => {
                let old_len = list.len();
                match list.pop_back() {
                    Some(_) => assert_eq!(list.len(), old_len - 1),
                    None => assert_eq!(old_len, 0),
                }
            }
            3 => {
                if !all_ids.is_empty() {
                    let id = all_ids[(value as usize) % all_ids.len()];
                    let live = list.contains(id);
                    let old_len = list.len();
                    assert_eq!(list.move_to_front(id), live);
                    if live {
                        assert_eq!(list.front_id(), Some(id));
                    }
                    assert_eq!(list.len(), old_len);
                }
            }
            4 => {
                if !all_ids.is_empty() {
                    let id = all_ids[(value as usize) % all_ids.len()];
                    let live = list.contains(id);
                    let old_len = list.len();
                    assert_eq!(list.remove(id).is_some(), live);
                    if live {
                        assert_eq!(list.len(), old_len - 1);
                    }
                    assert!(!list.contains(id));
                }
            }
            5 => {
                list.clear();
                assert!(list.is_empty());
                assert!(all_ids.iter().all(|id| !list.contains(*id)));
            }
            _ => unreachable!(),
        }

        assert!(list.check_invariants().is_ok());
    }
});
