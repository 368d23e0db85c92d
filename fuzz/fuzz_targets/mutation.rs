#![no_main]

use std::collections::BTreeSet;

use arbitrary::{Arbitrary, Unstructured};

use libfuzzer_sys::fuzz_target;
use segsweep::{
    rbtree::{Natural, Pos, Threaded},
    set::{MultiSet, Set},
};

#[derive(Arbitrary, Debug)]
enum Op {
    Insert { val: i16 },
    InsertAfter { idx: usize, val: i16 },
    InsertBefore { idx: usize, val: i16 },
    Erase { idx: usize },
    Remove { val: i16 },
}

fn nth(multi: &MultiSet<i16, Natural, Threaded>, idx: usize) -> Option<Pos> {
    multi.positions().nth(idx)
}

// The multiset is kept sorted, so relative insertions clamp their key between
// the neighbors. The model is a sorted `Vec`.
fn apply(
    op: &Op,
    vec: &mut Vec<i16>,
    multi: &mut MultiSet<i16, Natural, Threaded>,
    set: &mut Set<i16>,
    model: &mut BTreeSet<i16>,
) {
    match *op {
        Op::Insert { val } => {
            let pos = multi.insert(val);
            let idx = vec.partition_point(|&x| x <= val);
            vec.insert(idx, val);
            assert_eq!(*multi.get(pos), val);
            assert_eq!(set.insert(val).1, model.insert(val));
        }
        Op::InsertAfter { idx, val } => {
            let idx = idx % (vec.len() + 1);
            // idx == 0 means "at the front".
            let after = idx.checked_sub(1).and_then(|i| nth(multi, i));
            let lo = idx.checked_sub(1).map_or(i16::MIN, |i| vec[i]);
            let hi = vec.get(idx).copied().unwrap_or(i16::MAX);
            let val = val.clamp(lo, hi);
            multi.insert_after(after, val);
            vec.insert(idx, val);
        }
        Op::InsertBefore { idx, val } => {
            let idx = idx % (vec.len() + 1);
            let before = nth(multi, idx);
            let lo = idx.checked_sub(1).map_or(i16::MIN, |i| vec[i]);
            let hi = vec.get(idx).copied().unwrap_or(i16::MAX);
            let val = val.clamp(lo, hi);
            multi.insert_before(before, val);
            vec.insert(idx, val);
        }
        Op::Erase { idx } => {
            if !vec.is_empty() {
                let idx = idx % vec.len();
                let pos = nth(multi, idx).unwrap();
                assert_eq!(multi.erase(pos), vec.remove(idx));
            }
        }
        Op::Remove { val } => {
            assert_eq!(set.remove(&val).is_some(), model.remove(&val));
            assert_eq!(multi.contains(&val), vec.contains(&val));
        }
    }
}

fn arbitrary_ops(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let len = u.arbitrary_len::<Op>()?;
    let mut vec = Vec::new();
    let mut multi = MultiSet::new();
    let mut set = Set::new();
    let mut model = BTreeSet::new();
    for _ in 0..len {
        let op: Op = u.arbitrary()?;
        apply(&op, &mut vec, &mut multi, &mut set, &mut model);
        multi.check_invariants();
        set.check_invariants();

        assert_eq!(multi.len(), vec.len());
        assert_eq!(multi.iter().copied().collect::<Vec<_>>(), vec);
        assert_eq!(
            set.iter().copied().collect::<Vec<_>>(),
            model.iter().copied().collect::<Vec<_>>()
        );
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let u = Unstructured::new(data);
    let _ = arbitrary_ops(u);
});
