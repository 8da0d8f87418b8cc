#![cfg(test)]

// Property tests for SeqMap kept inside the crate next to the code they
// exercise.

use crate::builder::Builder;
use crate::error::{InsertError, RemoveError};
use crate::seq_map::Entry;
use crate::sequence::{Exhausted, Handle, Sequence, SlotSequence};
use crate::strategy::NaturalEq;
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

// Storage whose next append can be made to fail, standing in for an
// allocation failure in the sequence layer.
struct FlakySequence<T> {
    inner: SlotSequence<T>,
    fail_next: Rc<Cell<bool>>,
}

impl<T> Sequence<T> for FlakySequence<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
    fn try_append(&mut self, item: T) -> Result<Handle, Exhausted<T>> {
        if self.fail_next.replace(false) {
            return Err(Exhausted(item));
        }
        self.inner.try_append(item)
    }
    fn get(&self, position: usize) -> Option<&T> {
        self.inner.get(position)
    }
    fn get_handle(&self, handle: Handle) -> Option<&T> {
        self.inner.get_handle(handle)
    }
    fn handle_at(&self, position: usize) -> Option<Handle> {
        self.inner.handle_at(position)
    }
    fn position<F>(&self, pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.inner.position(pred)
    }
    fn remove_at(&mut self, position: usize) -> Option<T> {
        self.inner.remove_at(position)
    }
    fn drain(&mut self) -> Vec<T> {
        self.inner.drain()
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Remove(usize),
    Take(usize),
    Get(usize),
    ContainsValue(i32),
    FailNextAppend,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), -4i32..4).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::Take),
            2 => idx.clone().prop_map(Op::Get),
            1 => (-4i32..4).prop_map(Op::ContainsValue),
            1 => Just(Op::FailNextAppend),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against an insertion-ordered Vec model.
// - Duplicate keys and failed appends are rejected with the map unchanged.
// - Every modelled key resolves through `get`/`find`/`contains_key` to its value.
// - `remove` runs the destroyers once per entry, `take` never does.
// - `len` matches the model after every operation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let fail_next = Rc::new(Cell::new(false));
        let destroyed_keys = Rc::new(Cell::new(0usize));
        let destroyed_values = Rc::new(Cell::new(0usize));
        let (dk, dv) = (destroyed_keys.clone(), destroyed_values.clone());

        let mut sut = Builder::new()
            .key_eq(NaturalEq)
            .value_eq(NaturalEq)
            .key_destroy(move |_k: String| dk.set(dk.get() + 1))
            .value_destroy(move |_v: i32| dv.set(dv.get() + 1))
            .storage(FlakySequence::<Entry<String, i32>> {
                inner: SlotSequence::new(),
                fail_next: fail_next.clone(),
            })
            .build()
            .unwrap();
        let mut model: Vec<(String, i32)> = Vec::new();
        let mut live: HashMap<String, Handle> = HashMap::new();
        let mut destroyed = 0usize;

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let k = pool[i].clone();
                    let already = model.iter().any(|(mk, _)| *mk == k);
                    let will_fail = fail_next.get();
                    match sut.insert(k.clone(), v) {
                        Ok(h) => {
                            prop_assert!(!already && !will_fail);
                            model.push((k.clone(), v));
                            live.insert(k, h);
                        }
                        Err(InsertError::DuplicateKey) => prop_assert!(already),
                        Err(InsertError::StorageExhausted) => prop_assert!(!already && will_fail),
                        Err(InsertError::Busy(_)) => prop_assert!(false, "no reentry in this test"),
                    }
                }
                Op::Remove(i) => {
                    let k = &pool[i];
                    match model.iter().position(|(mk, _)| mk == k) {
                        Some(p) => {
                            prop_assert_eq!(sut.remove(k), Ok(()));
                            model.remove(p);
                            live.remove(k);
                            destroyed += 1;
                        }
                        None => prop_assert_eq!(sut.remove(k), Err(RemoveError::NotFound)),
                    }
                }
                Op::Take(i) => {
                    let k = &pool[i];
                    let expected = model
                        .iter()
                        .position(|(mk, _)| mk == k)
                        .map(|p| model.remove(p));
                    prop_assert_eq!(sut.take(k), expected);
                    live.remove(k);
                }
                Op::Get(i) => {
                    let k = &pool[i];
                    let expected = model.iter().find(|(mk, _)| mk == k).map(|(_, v)| v);
                    prop_assert_eq!(sut.get(k), expected);
                    prop_assert_eq!(sut.contains_key(k), expected.is_some());
                    prop_assert_eq!(sut.find(k), live.get(k).copied());
                }
                Op::ContainsValue(v) => {
                    #[cfg(feature = "contains-value")]
                    {
                        let expected = model.iter().any(|(_, mv)| *mv == v);
                        prop_assert_eq!(sut.contains_value(&v), expected);
                    }
                    #[cfg(not(feature = "contains-value"))]
                    let _ = v;
                }
                Op::FailNextAppend => fail_next.set(true),
                Op::Clear => {
                    prop_assert_eq!(sut.clear(), Ok(model.len()));
                    destroyed += model.len();
                    model.clear();
                    live.clear();
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(destroyed_keys.get(), destroyed);
            prop_assert_eq!(destroyed_values.get(), destroyed);
            for (k, v) in &model {
                prop_assert_eq!(sut.get(k), Some(v));
            }
        }
    }
}

// Property: with bounded storage, inserts beyond the limit fail without
// disturbing the entries already stored, and freeing a slot makes room again.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_bounded_storage(limit in 0usize..6, keys in proptest::collection::vec(0u16..32, 0..24)) {
        let mut sut = Builder::new()
            .key_eq(NaturalEq)
            .value_eq(NaturalEq)
            .capacity(limit)
            .build()
            .unwrap();
        let mut model: Vec<u16> = Vec::new();

        for k in keys {
            let dup = model.contains(&k);
            match sut.insert(k, u32::from(k) * 10) {
                Ok(_) => {
                    prop_assert!(!dup && model.len() < limit);
                    model.push(k);
                }
                Err(InsertError::DuplicateKey) => prop_assert!(dup),
                Err(InsertError::StorageExhausted) => {
                    prop_assert!(!dup && model.len() == limit);
                    // Make room by evicting the oldest entry, then retry.
                    if let Some(oldest) = model.first().copied() {
                        prop_assert_eq!(sut.remove(&oldest), Ok(()));
                        model.remove(0);
                        prop_assert!(sut.insert(k, u32::from(k) * 10).is_ok());
                        model.push(k);
                    }
                }
                Err(InsertError::Busy(_)) => prop_assert!(false),
            }
            prop_assert_eq!(sut.len(), model.len());
            for k in &model {
                let expected = u32::from(*k) * 10;
                prop_assert_eq!(sut.get(k), Some(&expected));
            }
        }
    }
}
