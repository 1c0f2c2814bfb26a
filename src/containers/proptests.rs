//! Property-based tests for `ConcurrentMap` using proptest
//!
//! Each property is checked against a plain `HashMap` model driven by the
//! same inputs.

use crate::containers::ConcurrentMap;
use crate::context::ExecutionContext;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

fn inline_map() -> ConcurrentMap<i64> {
    ConcurrentMap::with_context(Arc::new(ExecutionContext::inline("proptest")))
}

#[derive(Debug, Clone)]
enum Op {
    Put(String, i64),
    PutIfAbsent(String, i64),
    Remove(String),
    Merge(Vec<(String, i64)>),
    RemoveAll,
}

fn key() -> impl Strategy<Value = String> {
    // A small key space so operations collide often.
    "[a-e][0-9]?"
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (key(), any::<i64>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (key(), any::<i64>()).prop_map(|(k, v)| Op::PutIfAbsent(k, v)),
        3 => key().prop_map(Op::Remove),
        1 => prop::collection::vec((key(), any::<i64>()), 0..8).prop_map(Op::Merge),
        1 => Just(Op::RemoveAll),
    ]
}

proptest! {
    #[test]
    fn put_then_get_returns_value(k in key(), v in any::<i64>()) {
        let map = inline_map();
        map.put_or_update(k.clone(), v);
        prop_assert_eq!(map.get(&k), Some(v));
    }

    #[test]
    fn second_put_if_absent_is_ignored(k in key(), first in any::<i64>(), second in any::<i64>()) {
        let map = inline_map();
        prop_assert!(map.put_if_absent(k.clone(), first));
        prop_assert!(!map.put_if_absent(k.clone(), second));
        prop_assert_eq!(map.get(&k), Some(first));
    }

    #[test]
    fn remove_returns_prior_value(
        initial in prop::collection::hash_map(key(), any::<i64>(), 0..16),
        k in key(),
    ) {
        let map = ConcurrentMap::from_map(initial);
        let before = map.get(&k);
        prop_assert_eq!(map.remove(&k), before);
        prop_assert_eq!(map.get(&k), None);
    }

    #[test]
    fn merge_overwrites_only_merged_keys(
        initial in prop::collection::hash_map(key(), any::<i64>(), 0..16),
        other in prop::collection::hash_map(key(), any::<i64>(), 0..16),
    ) {
        let map = ConcurrentMap::from_map(initial.clone());
        map.merge(other.clone());
        for (k, v) in &other {
            prop_assert_eq!(map.get(k), Some(*v));
        }
        for (k, v) in initial.iter().filter(|(k, _)| !other.contains_key(*k)) {
            prop_assert_eq!(map.get(k), Some(*v));
        }
    }

    #[test]
    fn matches_hash_map_model(ops in prop::collection::vec(op(), 0..64)) {
        let map = inline_map();
        let mut model: HashMap<String, i64> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    prop_assert_eq!(map.put_or_update(k.clone(), v), model.insert(k, v));
                }
                Op::PutIfAbsent(k, v) => {
                    let absent = !model.contains_key(&k);
                    if absent {
                        model.insert(k.clone(), v);
                    }
                    prop_assert_eq!(map.put_if_absent(k, v), absent);
                }
                Op::Remove(k) => {
                    prop_assert_eq!(map.remove(&k), model.remove(&k));
                }
                Op::Merge(pairs) => {
                    model.extend(pairs.iter().cloned());
                    map.merge(pairs);
                }
                Op::RemoveAll => {
                    map.remove_all();
                    model.clear();
                    prop_assert!(map.is_empty());
                }
            }
            prop_assert_eq!(map.count(), model.len());
        }

        prop_assert_eq!(map.get_all(), model);
    }
}
