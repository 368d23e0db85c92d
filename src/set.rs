//! Ordered sets and multisets on top of [`RbTree`].
//!
//! These are thin wrappers that hide the tree's sentinel: every position they
//! hand out is occupied, and "no such position" is `None`.

use crate::rbtree::{Compare, Iter, Natural, Plain, Pos, Positions, RbTree, Threading};

/// An ordered set: inserting a key that is equivalent to one already
/// present does nothing.
pub struct Set<K, C = Natural, T: Threading = Plain> {
    tree: RbTree<K, C, T>,
}

/// An ordered multiset: equivalent keys are kept in insertion order.
///
/// In addition to the usual comparator-driven insertion, a multiset supports
/// inserting next to an existing position.
pub struct MultiSet<K, C = Natural, T: Threading = Plain> {
    tree: RbTree<K, C, T>,
}

fn occupied(pos: Pos, end: Pos) -> Option<Pos> {
    (pos != end).then_some(pos)
}

// The parts that don't depend on multiplicity.
macro_rules! impl_ordered_common {
    ($name:ident) => {
        impl<K, C: Default, T: Threading> Default for $name<K, C, T> {
            fn default() -> Self {
                Self {
                    tree: RbTree::default(),
                }
            }
        }

        impl<K: std::fmt::Debug, C, T: Threading> std::fmt::Debug for $name<K, C, T> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Debug::fmt(&self.tree, f)
            }
        }

        impl<K, C: Default, T: Threading> $name<K, C, T> {
            /// Creates an empty container with the default comparator.
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl<K, C, T: Threading> $name<K, C, T> {
            /// Creates an empty container ordered by `cmp`.
            pub fn with_comparator(cmp: C) -> Self {
                Self {
                    tree: RbTree::new(cmp),
                }
            }

            /// The number of keys.
            pub fn len(&self) -> usize {
                self.tree.len()
            }

            /// Is this container empty?
            pub fn is_empty(&self) -> bool {
                self.tree.is_empty()
            }

            /// Removes every key.
            pub fn clear(&mut self) {
                self.tree.clear();
            }

            /// The comparator.
            pub fn comparator(&self) -> &C {
                self.tree.comparator()
            }

            /// Mutable access to the comparator.
            ///
            /// Changing the comparator's state must not change the relative
            /// order of the keys already present.
            pub fn comparator_mut(&mut self) -> &mut C {
                self.tree.comparator_mut()
            }

            /// The position of the smallest key.
            pub fn first(&self) -> Option<Pos> {
                occupied(self.tree.first(), self.tree.end())
            }

            /// The position of the largest key.
            pub fn last(&self) -> Option<Pos> {
                occupied(self.tree.last(), self.tree.end())
            }

            /// The position after `pos`, if `pos` isn't the last one.
            pub fn next(&self, pos: Pos) -> Option<Pos> {
                occupied(self.tree.next(pos), self.tree.end())
            }

            /// The position before `pos`, if `pos` isn't the first one.
            pub fn prev(&self, pos: Pos) -> Option<Pos> {
                occupied(self.tree.prev(pos), self.tree.end())
            }

            /// The key at `pos`.
            ///
            /// # Panics
            ///
            /// Panics if `pos` has been erased.
            pub fn get(&self, pos: Pos) -> &K {
                self.tree.get(pos)
            }

            /// Mutable access to the key at `pos`.
            ///
            /// The key's position in the order must not change.
            pub fn get_mut(&mut self, pos: Pos) -> &mut K {
                self.tree.get_mut(pos)
            }

            /// Removes the key at `pos` and returns it.
            ///
            /// # Panics
            ///
            /// Panics if `pos` has been erased.
            pub fn erase(&mut self, pos: Pos) -> K {
                self.tree.erase(pos)
            }

            /// Removes and returns the smallest key.
            pub fn pop_first(&mut self) -> Option<K> {
                let first = self.first()?;
                Some(self.tree.erase(first))
            }

            /// Returns the first position whose key fails `pred`.
            ///
            /// The keys must be partitioned by `pred`.
            pub fn partition_point<P>(&self, pred: P) -> Option<Pos>
            where
                P: FnMut(&K) -> bool,
            {
                occupied(self.tree.partition_point(pred), self.tree.end())
            }

            /// Iterates over the keys in order.
            pub fn iter(&self) -> Iter<'_, K, C, T> {
                self.tree.iter()
            }

            /// Iterates over the positions in order.
            pub fn positions(&self) -> Positions<'_, K, C, T> {
                self.tree.positions()
            }
        }

        impl<K, C: Compare<K>, T: Threading> $name<K, C, T> {
            /// Returns the position of the first key equivalent to `key`.
            pub fn find(&self, key: &K) -> Option<Pos> {
                occupied(self.tree.find(key), self.tree.end())
            }

            /// Is there a key equivalent to `key`?
            pub fn contains(&self, key: &K) -> bool {
                self.find(key).is_some()
            }

            /// Removes the first key equivalent to `key`, and returns it.
            pub fn remove(&mut self, key: &K) -> Option<K> {
                let pos = self.find(key)?;
                Some(self.tree.erase(pos))
            }

            /// The position of the first key that isn't less than `key`.
            pub fn lower_bound(&self, key: &K) -> Option<Pos> {
                occupied(self.tree.lower_bound(key), self.tree.end())
            }

            /// The position of the first key that is greater than `key`.
            pub fn upper_bound(&self, key: &K) -> Option<Pos> {
                occupied(self.tree.upper_bound(key), self.tree.end())
            }
        }

        impl<'a, K, C, T: Threading> IntoIterator for &'a $name<K, C, T> {
            type Item = &'a K;
            type IntoIter = Iter<'a, K, C, T>;

            fn into_iter(self) -> Self::IntoIter {
                self.iter()
            }
        }

        impl<K, C: Compare<K> + Default, T: Threading> FromIterator<K> for $name<K, C, T> {
            fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
                let mut ret = Self::default();
                ret.extend(iter);
                ret
            }
        }
    };
}

impl_ordered_common!(Set);
impl_ordered_common!(MultiSet);

impl<K, C: Compare<K>, T: Threading> Set<K, C, T> {
    /// Inserts `key`, unless an equivalent key is already present.
    ///
    /// Returns the position of `key` (or of the key that was already there)
    /// and whether `key` was inserted.
    pub fn insert(&mut self, key: K) -> (Pos, bool) {
        self.tree.insert_unique(key)
    }

    /// Checks the tree invariants, and that the keys are strictly increasing.
    pub fn check_invariants(&self) {
        self.tree.check_invariants();
        self.tree.check_order(true);
    }
}

impl<K, C: Compare<K>, T: Threading> Extend<K> for Set<K, C, T> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<K, C: Compare<K>, T: Threading> MultiSet<K, C, T> {
    /// Inserts `key` after any equivalent keys, and returns its position.
    pub fn insert(&mut self, key: K) -> Pos {
        self.tree.insert_multi(key)
    }

    /// Counts the keys equivalent to `key`.
    pub fn count(&self, key: &K) -> usize {
        let end = self.tree.upper_bound(key);
        let mut pos = self.tree.lower_bound(key);
        let mut ret = 0;
        while pos != end {
            ret += 1;
            pos = self.tree.next(pos);
        }
        ret
    }

    /// Checks the tree invariants, and that the keys are non-decreasing.
    pub fn check_invariants(&self) {
        self.tree.check_invariants();
        self.tree.check_order(false);
    }
}

impl<K, C, T: Threading> MultiSet<K, C, T> {
    /// Inserts `key` immediately after `pos`, or at the very beginning if `pos`
    /// is `None`. Returns the new position.
    ///
    /// The comparator isn't consulted; the caller is responsible for keeping
    /// the keys in order.
    pub fn insert_after(&mut self, pos: Option<Pos>, key: K) -> Pos {
        let pos = pos.unwrap_or(self.tree.end());
        self.tree.insert_after(pos, key)
    }

    /// Inserts `key` immediately before `pos`, or at the very end if `pos`
    /// is `None`. Returns the new position.
    ///
    /// The comparator isn't consulted; the caller is responsible for keeping
    /// the keys in order.
    pub fn insert_before(&mut self, pos: Option<Pos>, key: K) -> Pos {
        let pos = pos.unwrap_or(self.tree.end());
        self.tree.insert_before(pos, key)
    }

    /// Checks the tree invariants, but not the order of the keys.
    ///
    /// This is for multisets whose comparator changes over time, so that it
    /// only agrees with the key order some of the time.
    pub fn check_structure(&self) {
        self.tree.check_invariants();
    }
}

impl<K, C: Compare<K>, T: Threading> Extend<K> for MultiSet<K, C, T> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}
