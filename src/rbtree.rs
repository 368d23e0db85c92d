//! An arena-backed red-black tree.
//!
//! This is the ordered container underneath both the sweep status and the event
//! queue. Nodes live in a single vector and refer to one another by [`Pos`];
//! slot zero is a shared black sentinel that stands in for every missing child,
//! for the root's parent and (through [`RbTree::end`]) for the one-past-the-end
//! position. Erasing a node puts its slot on a free list, and every other
//! position stays valid.
//!
//! The tree doesn't know whether it holds a set or a multiset: it offers both
//! [`insert_unique`](RbTree::insert_unique) and
//! [`insert_multi`](RbTree::insert_multi), and the adapters in
//! [`set`](crate::set) pick one. It also offers
//! [`insert_after`](RbTree::insert_after) and
//! [`insert_before`](RbTree::insert_before), which place a key next to an
//! existing position without consulting the comparator at all. The sweep needs
//! those, because its comparator is ambiguous exactly at the points where the
//! status gets reordered.
//!
//! Successor and predecessor lookups come in two flavors, chosen by the
//! [`Threading`] parameter: [`Plain`] walks the tree, while [`Threaded`]
//! keeps a doubly-linked list through the nodes.

use std::marker::PhantomData;

/// A position in an [`RbTree`].
///
/// Positions are stable: inserting or erasing other elements never moves an
/// element to a different position. A position is invalidated when its own
/// element is erased (and its slot may later be reused by a new element).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos(usize);

struct NodeVec<T> {
    inner: Vec<T>,
}

impl_typed_vec!(NodeVec, Pos, "pos");

const NIL: Pos = Pos(0);

const LEFT: usize = 0;
const RIGHT: usize = 1;
// The list links are indexed the same way as the children, so that walking
// in direction `dir` through the tree and through the list agree.
const PREV: usize = LEFT;
const NEXT: usize = RIGHT;

/// A strict weak ordering on `K`.
///
/// Unlike `Ord`, a comparator is a value, so it can carry state. The sweep
/// status, for example, compares segments by their horizontal position at the
/// current sweep line, and it keeps the sweep line in its comparator.
pub trait Compare<K> {
    /// Is `a` strictly less than `b`?
    fn less(&self, a: &K, b: &K) -> bool;
}

/// The comparator that uses `K`'s `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Natural;

impl<K: Ord> Compare<K> for Natural {
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Plain {}
    impl Sealed for super::Threaded {}
}

/// Chooses how a tree finds successors and predecessors.
///
/// This trait is sealed; its only implementations are [`Plain`] and [`Threaded`].
pub trait Threading: sealed::Sealed {
    /// Whether the tree maintains a linked list through its nodes.
    const THREADED: bool;
}

/// Successors and predecessors are found by walking the tree, in `O(log n)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

/// Successors and predecessors are found in `O(1)`, by keeping the nodes in
/// a doubly-linked list as well as in the tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct Threaded;

impl Threading for Plain {
    const THREADED: bool = false;
}

impl Threading for Threaded {
    const THREADED: bool = true;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug)]
struct Node<K> {
    // `None` for the sentinel and for slots on the free list.
    key: Option<K>,
    parent: Pos,
    children: [Pos; 2],
    color: Color,
    // Only maintained by threaded trees. In the sentinel, `links[NEXT]` is
    // the first node and `links[PREV]` is the last.
    links: [Pos; 2],
}

impl<K> Node<K> {
    fn sentinel() -> Self {
        Node {
            key: None,
            parent: NIL,
            children: [NIL, NIL],
            color: Color::Black,
            links: [NIL, NIL],
        }
    }
}

/// A red-black tree ordered by a [`Compare`]ator.
pub struct RbTree<K, C, T: Threading = Plain> {
    nodes: NodeVec<Node<K>>,
    free: Vec<Pos>,
    root: Pos,
    len: usize,
    cmp: C,
    _threading: PhantomData<T>,
}

impl<K, C: Default, T: Threading> Default for RbTree<K, C, T> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<K: std::fmt::Debug, C, T: Threading> std::fmt::Debug for RbTree<K, C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, C: Compare<K>, T: Threading> RbTree<K, C, T> {
    /// Inserts `key` unless an equivalent key is already present.
    ///
    /// Returns the position of the new key and `true`, or the position of the
    /// existing equivalent key and `false`. In the latter case the tree is
    /// not modified at all.
    pub fn insert_unique(&mut self, key: K) -> (Pos, bool) {
        let mut x = self.root;
        let mut parent = NIL;
        let mut dir = LEFT;
        // The smallest node seen so far that isn't less than `key`.
        let mut lower = NIL;
        while x != NIL {
            parent = x;
            if self.cmp.less(self.key(x), &key) {
                dir = RIGHT;
            } else {
                lower = x;
                dir = LEFT;
            }
            x = self.nodes[x].children[dir];
        }

        if lower != NIL && !self.cmp.less(&key, self.key(lower)) {
            return (lower, false);
        }
        (self.attach(parent, dir, key), true)
    }

    /// Inserts `key` after all equivalent keys, returning its position.
    pub fn insert_multi(&mut self, key: K) -> Pos {
        let mut x = self.root;
        let mut parent = NIL;
        let mut dir = LEFT;
        while x != NIL {
            parent = x;
            dir = if self.cmp.less(&key, self.key(x)) {
                LEFT
            } else {
                RIGHT
            };
            x = self.nodes[x].children[dir];
        }
        self.attach(parent, dir, key)
    }

    /// Returns the first position whose key isn't less than `key`, or
    /// [`end`](Self::end) if there is none.
    pub fn lower_bound(&self, key: &K) -> Pos {
        let cmp = &self.cmp;
        self.partition_point(|k| cmp.less(k, key))
    }

    /// Returns the first position whose key is greater than `key`, or
    /// [`end`](Self::end) if there is none.
    pub fn upper_bound(&self, key: &K) -> Pos {
        let cmp = &self.cmp;
        self.partition_point(|k| !cmp.less(key, k))
    }

    /// Returns the first position holding a key equivalent to `key`, or
    /// [`end`](Self::end) if there is none.
    pub fn find(&self, key: &K) -> Pos {
        let pos = self.lower_bound(key);
        if pos != NIL && !self.cmp.less(key, self.key(pos)) {
            pos
        } else {
            NIL
        }
    }

    /// Checks that the keys are in order.
    ///
    /// If `strict` is true, consecutive keys must be strictly increasing;
    /// otherwise they must merely be non-decreasing.
    ///
    /// # Panics
    ///
    /// Panics if they aren't.
    pub fn check_order(&self, strict: bool) {
        let mut pos = self.first();
        while pos != NIL {
            let next = self.next(pos);
            if next == NIL {
                break;
            }
            let (a, b) = (self.key(pos), self.key(next));
            if strict {
                assert!(self.cmp.less(a, b), "{pos:?} is not less than {next:?}");
            } else {
                assert!(!self.cmp.less(b, a), "{next:?} is less than {pos:?}");
            }
            pos = next;
        }
    }
}

impl<K, C, T: Threading> RbTree<K, C, T> {
    /// Creates an empty tree that is ordered by `cmp`.
    pub fn new(cmp: C) -> Self {
        let mut nodes = NodeVec::default();
        nodes.push(Node::sentinel());
        RbTree {
            nodes,
            free: Vec::new(),
            root: NIL,
            len: 0,
            cmp,
            _threading: PhantomData,
        }
    }

    /// The number of keys in this tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is this tree empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The comparator.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Mutable access to the comparator.
    ///
    /// Changing the comparator's state must not change the relative order of
    /// keys already in the tree (or else you must fix the order yourself,
    /// using position-based insertions).
    pub fn comparator_mut(&mut self) -> &mut C {
        &mut self.cmp
    }

    /// The one-past-the-end position.
    ///
    /// This position never holds a key. Stepping forward from it wraps around
    /// to the first key, and stepping backward wraps around to the last.
    pub fn end(&self) -> Pos {
        NIL
    }

    /// The position of the smallest key, or [`end`](Self::end) if the tree is empty.
    pub fn begin(&self) -> Pos {
        self.first()
    }

    /// The position of the smallest key, or [`end`](Self::end) if the tree is empty.
    pub fn first(&self) -> Pos {
        self.step(NIL, NEXT)
    }

    /// The position of the largest key, or [`end`](Self::end) if the tree is empty.
    pub fn last(&self) -> Pos {
        self.step(NIL, PREV)
    }

    /// The position after `pos`.
    ///
    /// The position after the last key is [`end`](Self::end), and the position
    /// after `end` is the first key.
    pub fn next(&self, pos: Pos) -> Pos {
        self.step(pos, NEXT)
    }

    /// The position before `pos`.
    ///
    /// The position before the first key is [`end`](Self::end), and the
    /// position before `end` is the last key.
    pub fn prev(&self, pos: Pos) -> Pos {
        self.step(pos, PREV)
    }

    /// The key at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is `end()` or has been erased.
    pub fn get(&self, pos: Pos) -> &K {
        self.key(pos)
    }

    /// Mutable access to the key at `pos`.
    ///
    /// The key's position in the order must not change.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is `end()` or has been erased.
    pub fn get_mut(&mut self, pos: Pos) -> &mut K {
        match &mut self.nodes[pos].key {
            Some(k) => k,
            None => panic!("no key at {pos:?}"),
        }
    }

    /// Iterates over the keys in order.
    pub fn iter(&self) -> Iter<'_, K, C, T> {
        Iter {
            tree: self,
            pos: self.first(),
            remaining: self.len,
        }
    }

    /// Iterates over the occupied positions in order.
    pub fn positions(&self) -> Positions<'_, K, C, T> {
        Positions {
            tree: self,
            pos: self.first(),
            remaining: self.len,
        }
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[NIL] = Node::sentinel();
        self.free.clear();
        self.root = NIL;
        self.len = 0;
    }

    /// Inserts `key` immediately after `pos`, without consulting the comparator.
    ///
    /// If `pos` is [`end`](Self::end), `key` becomes the first key. The caller
    /// is responsible for keeping the keys in order.
    ///
    /// # Panics
    ///
    /// Panics if `pos` has been erased.
    pub fn insert_after(&mut self, pos: Pos, key: K) -> Pos {
        self.insert_beside(pos, NEXT, key)
    }

    /// Inserts `key` immediately before `pos`, without consulting the comparator.
    ///
    /// If `pos` is [`end`](Self::end), `key` becomes the last key. The caller
    /// is responsible for keeping the keys in order.
    ///
    /// # Panics
    ///
    /// Panics if `pos` has been erased.
    pub fn insert_before(&mut self, pos: Pos, key: K) -> Pos {
        self.insert_beside(pos, PREV, key)
    }

    /// Returns the first position whose key fails `pred`, or
    /// [`end`](Self::end) if every key satisfies it.
    ///
    /// The keys must be partitioned by `pred`: every key satisfying it must
    /// come before every key that doesn't.
    pub fn partition_point<P>(&self, mut pred: P) -> Pos
    where
        P: FnMut(&K) -> bool,
    {
        let mut x = self.root;
        let mut ret = NIL;
        while x != NIL {
            if pred(self.key(x)) {
                x = self.nodes[x].children[RIGHT];
            } else {
                ret = x;
                x = self.nodes[x].children[LEFT];
            }
        }
        ret
    }

    /// Removes the key at `pos`, and returns it.
    ///
    /// All other positions remain valid.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is `end()` or has already been erased.
    pub fn erase(&mut self, z: Pos) -> K {
        assert!(
            z != NIL && self.nodes[z].key.is_some(),
            "tried to erase {z:?}, which is not occupied"
        );

        let [z_left, z_right] = self.nodes[z].children;
        let mut removed_color = self.nodes[z].color;
        let x;
        if z_left == NIL {
            x = z_right;
            self.transplant(z, z_right);
        } else if z_right == NIL {
            x = z_left;
            self.transplant(z, z_left);
        } else {
            let y = if T::THREADED {
                self.nodes[z].links[NEXT]
            } else {
                self.extreme(z_right, LEFT)
            };
            removed_color = self.nodes[y].color;
            x = self.nodes[y].children[RIGHT];
            if self.nodes[y].parent == z {
                // `x` might be the sentinel, whose parent the fixup reads.
                self.nodes[x].parent = y;
            } else {
                self.transplant(y, x);
                self.nodes[y].children[RIGHT] = z_right;
                self.nodes[z_right].parent = y;
            }
            self.transplant(z, y);
            self.nodes[y].children[LEFT] = z_left;
            self.nodes[z_left].parent = y;
            self.nodes[y].color = self.nodes[z].color;
        }

        if removed_color == Color::Black {
            self.delete_fixup(x);
        }
        self.nodes[NIL].parent = NIL;

        if T::THREADED {
            let [prev, next] = self.nodes[z].links;
            self.nodes[prev].links[NEXT] = next;
            self.nodes[next].links[PREV] = prev;
        }

        self.len -= 1;
        self.free.push(z);
        let node = std::mem::replace(&mut self.nodes[z], Node::sentinel());
        // unwrap: we checked that `z` was occupied
        node.key.unwrap()
    }

    /// Checks the red-black invariants, the parent links, and (for threaded
    /// trees) the linked list.
    ///
    /// This doesn't check that the keys are ordered; see
    /// [`check_order`](Self::check_order) for that.
    ///
    /// # Panics
    ///
    /// Panics if any of the invariants fail.
    pub fn check_invariants(&self) {
        let nil = &self.nodes[NIL];
        assert_eq!(nil.color, Color::Black);
        assert_eq!(nil.children, [NIL, NIL]);
        assert!(nil.key.is_none());
        assert_eq!(self.nodes[self.root].color, Color::Black);
        assert_eq!(self.nodes[self.root].parent, NIL);

        let mut in_order = Vec::with_capacity(self.len);
        self.check_subtree(self.root, &mut in_order);
        assert_eq!(in_order.len(), self.len);

        let occupied = self
            .nodes
            .indices()
            .filter(|&p| self.nodes[p].key.is_some())
            .count();
        assert_eq!(occupied, self.len);
        assert_eq!(occupied + self.free.len() + 1, self.nodes.len());
        for &p in &self.free {
            assert!(self.nodes[p].key.is_none());
        }

        if T::THREADED {
            let mut pos = NIL;
            for &expected in &in_order {
                let next = self.nodes[pos].links[NEXT];
                assert_eq!(next, expected);
                assert_eq!(self.nodes[next].links[PREV], pos);
                pos = next;
            }
            assert_eq!(self.nodes[pos].links[NEXT], NIL);
            assert_eq!(self.nodes[NIL].links[PREV], pos);
        }
    }

    // Returns the black height of the subtree at `x`, pushing its positions
    // onto `in_order`.
    fn check_subtree(&self, x: Pos, in_order: &mut Vec<Pos>) -> usize {
        if x == NIL {
            return 1;
        }
        let node = &self.nodes[x];
        assert!(node.key.is_some(), "{x:?} is in the tree but has no key");
        for child in node.children {
            if child != NIL {
                assert_eq!(self.nodes[child].parent, x);
                if node.color == Color::Red {
                    assert_eq!(self.nodes[child].color, Color::Black);
                }
            }
        }

        let left = self.check_subtree(node.children[LEFT], in_order);
        in_order.push(x);
        let right = self.check_subtree(node.children[RIGHT], in_order);
        assert_eq!(left, right, "unequal black heights below {x:?}");
        left + usize::from(node.color == Color::Black)
    }

    fn key(&self, pos: Pos) -> &K {
        match &self.nodes[pos].key {
            Some(k) => k,
            None => panic!("no key at {pos:?}"),
        }
    }

    fn alloc(&mut self, node: Node<K>) -> Pos {
        if let Some(pos) = self.free.pop() {
            self.nodes[pos] = node;
            pos
        } else {
            self.nodes.push(node)
        }
    }

    // Follows children in direction `dir` as far as possible.
    fn extreme(&self, mut x: Pos, dir: usize) -> Pos {
        if x == NIL {
            return NIL;
        }
        while self.nodes[x].children[dir] != NIL {
            x = self.nodes[x].children[dir];
        }
        x
    }

    // The in-order neighbor of `pos` in direction `dir`.
    fn step(&self, pos: Pos, dir: usize) -> Pos {
        debug_assert!(pos == NIL || self.nodes[pos].key.is_some());
        if T::THREADED {
            return self.nodes[pos].links[dir];
        }

        if pos == NIL {
            return self.extreme(self.root, dir ^ 1);
        }
        let child = self.nodes[pos].children[dir];
        if child != NIL {
            return self.extreme(child, dir ^ 1);
        }
        let mut x = pos;
        let mut parent = self.nodes[x].parent;
        while parent != NIL && x == self.nodes[parent].children[dir] {
            x = parent;
            parent = self.nodes[x].parent;
        }
        parent
    }

    fn insert_beside(&mut self, pos: Pos, dir: usize, key: K) -> Pos {
        if pos == NIL {
            // Inserting after the end means inserting before the first key,
            // and vice versa.
            let target = self.extreme(self.root, dir ^ 1);
            return self.attach(target, dir ^ 1, key);
        }

        assert!(
            self.nodes[pos].key.is_some(),
            "tried to insert beside {pos:?}, which is not occupied"
        );
        if self.nodes[pos].children[dir] == NIL {
            self.attach(pos, dir, key)
        } else {
            // The neighbor is the extreme node of a non-empty subtree, so it
            // has a free child slot on our side.
            let neighbor = self.step(pos, dir);
            self.attach(neighbor, dir ^ 1, key)
        }
    }

    // Hangs a new red node as the `dir` child of `parent` (which must be a
    // free slot), and rebalances.
    fn attach(&mut self, parent: Pos, dir: usize, key: K) -> Pos {
        let z = self.alloc(Node {
            key: Some(key),
            parent,
            children: [NIL, NIL],
            color: Color::Red,
            links: [NIL, NIL],
        });

        if parent == NIL {
            debug_assert_eq!(self.root, NIL);
            self.root = z;
        } else {
            debug_assert_eq!(self.nodes[parent].children[dir], NIL);
            self.nodes[parent].children[dir] = z;
        }

        if T::THREADED {
            let before = if dir == LEFT {
                parent
            } else {
                self.nodes[parent].links[NEXT]
            };
            self.link_before(before, z);
        }

        self.len += 1;
        self.insert_fixup(z);
        z
    }

    fn link_before(&mut self, at: Pos, z: Pos) {
        let prev = self.nodes[at].links[PREV];
        self.nodes[z].links = [prev, at];
        self.nodes[prev].links[NEXT] = z;
        self.nodes[at].links[PREV] = z;
    }

    fn side(&self, x: Pos) -> usize {
        let parent = self.nodes[x].parent;
        if self.nodes[parent].children[LEFT] == x {
            LEFT
        } else {
            RIGHT
        }
    }

    // With `dir == LEFT` this is a left rotation: `x`'s right child takes
    // its place, and `x` becomes that child's left child.
    fn rotate(&mut self, x: Pos, dir: usize) {
        let y = self.nodes[x].children[dir ^ 1];
        assert!(x != NIL && y != NIL, "rotation through the sentinel");

        let inner = self.nodes[y].children[dir];
        self.nodes[x].children[dir ^ 1] = inner;
        if inner != NIL {
            self.nodes[inner].parent = x;
        }

        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        if parent == NIL {
            self.root = y;
        } else {
            let side = self.side(x);
            self.nodes[parent].children[side] = y;
        }

        self.nodes[y].children[dir] = x;
        self.nodes[x].parent = y;
    }

    // Puts `v` where `u` was. `v` may be the sentinel, in which case its
    // parent is set anyway.
    fn transplant(&mut self, u: Pos, v: Pos) {
        let parent = self.nodes[u].parent;
        if parent == NIL {
            self.root = v;
        } else {
            let side = self.side(u);
            self.nodes[parent].children[side] = v;
        }
        self.nodes[v].parent = parent;
    }

    fn insert_fixup(&mut self, mut z: Pos) {
        while self.nodes[self.nodes[z].parent].color == Color::Red {
            let parent = self.nodes[z].parent;
            let grandparent = self.nodes[parent].parent;
            let dir = self.side(parent);
            let uncle = self.nodes[grandparent].children[dir ^ 1];

            if self.nodes[uncle].color == Color::Red {
                self.nodes[parent].color = Color::Black;
                self.nodes[uncle].color = Color::Black;
                self.nodes[grandparent].color = Color::Red;
                z = grandparent;
            } else {
                if z == self.nodes[parent].children[dir ^ 1] {
                    z = parent;
                    self.rotate(z, dir);
                }
                let parent = self.nodes[z].parent;
                let grandparent = self.nodes[parent].parent;
                self.nodes[parent].color = Color::Black;
                self.nodes[grandparent].color = Color::Red;
                self.rotate(grandparent, dir ^ 1);
            }
        }
        let root = self.root;
        self.nodes[root].color = Color::Black;
    }

    fn delete_fixup(&mut self, mut x: Pos) {
        while x != self.root && self.nodes[x].color == Color::Black {
            let parent = self.nodes[x].parent;
            // `x` may be the sentinel, but then its sibling can't be.
            let dir = if self.nodes[parent].children[LEFT] == x {
                LEFT
            } else {
                RIGHT
            };
            let mut w = self.nodes[parent].children[dir ^ 1];

            if self.nodes[w].color == Color::Red {
                self.nodes[w].color = Color::Black;
                self.nodes[parent].color = Color::Red;
                self.rotate(parent, dir);
                w = self.nodes[parent].children[dir ^ 1];
            }

            let [near, far] = [self.nodes[w].children[dir], self.nodes[w].children[dir ^ 1]];
            if self.nodes[near].color == Color::Black && self.nodes[far].color == Color::Black {
                self.nodes[w].color = Color::Red;
                x = parent;
            } else {
                if self.nodes[far].color == Color::Black {
                    self.nodes[near].color = Color::Black;
                    self.nodes[w].color = Color::Red;
                    self.rotate(w, dir ^ 1);
                    w = self.nodes[parent].children[dir ^ 1];
                }
                self.nodes[w].color = self.nodes[parent].color;
                self.nodes[parent].color = Color::Black;
                let far = self.nodes[w].children[dir ^ 1];
                self.nodes[far].color = Color::Black;
                self.rotate(parent, dir);
                x = self.root;
            }
        }
        self.nodes[x].color = Color::Black;
    }
}

/// An iterator over the keys of an [`RbTree`], in order.
pub struct Iter<'a, K, C, T: Threading> {
    tree: &'a RbTree<K, C, T>,
    pos: Pos,
    remaining: usize,
}

impl<'a, K, C, T: Threading> Iterator for Iter<'a, K, C, T> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let ret = self.tree.key(self.pos);
        self.pos = self.tree.next(self.pos);
        Some(ret)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, C, T: Threading> ExactSizeIterator for Iter<'_, K, C, T> {}

/// An iterator over the occupied positions of an [`RbTree`], in order.
pub struct Positions<'a, K, C, T: Threading> {
    tree: &'a RbTree<K, C, T>,
    pos: Pos,
    remaining: usize,
}

impl<K, C, T: Threading> Iterator for Positions<'_, K, C, T> {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let ret = self.pos;
        self.pos = self.tree.next(self.pos);
        Some(ret)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, C, T: Threading> ExactSizeIterator for Positions<'_, K, C, T> {}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn keys<C, T: Threading>(tree: &RbTree<i32, C, T>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    // Walks the whole cycle through the sentinel in both directions.
    fn check_cycle<C, T: Threading>(tree: &RbTree<i32, C, T>) {
        let mut forward = Vec::new();
        let mut pos = tree.next(tree.end());
        while pos != tree.end() {
            forward.push(*tree.get(pos));
            pos = tree.next(pos);
        }
        let mut backward = Vec::new();
        let mut pos = tree.prev(tree.end());
        while pos != tree.end() {
            backward.push(*tree.get(pos));
            pos = tree.prev(pos);
        }
        backward.reverse();
        assert_eq!(forward, keys(tree));
        assert_eq!(backward, keys(tree));
    }

    fn unique_round_trip<T: Threading>(insert: &[i32], erase: &[usize]) {
        let mut tree = RbTree::<i32, Natural, T>::default();
        for &k in insert {
            tree.insert_unique(k);
            tree.check_invariants();
            tree.check_order(true);
        }
        let mut expected: Vec<i32> = insert.to_vec();
        expected.sort();
        expected.dedup();
        assert_eq!(keys(&tree), expected);
        check_cycle(&tree);

        for &idx in erase {
            if tree.is_empty() {
                break;
            }
            let key = expected.remove(idx % expected.len());
            let pos = tree.find(&key);
            assert_eq!(tree.erase(pos), key);
            tree.check_invariants();
            assert_eq!(keys(&tree), expected);
        }

        for key in expected {
            let pos = tree.find(&key);
            tree.erase(pos);
            tree.check_invariants();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.first(), tree.end());
    }

    #[test]
    fn insert_ascending_and_descending() {
        let mut tree = RbTree::<i32, Natural, Threaded>::default();
        for k in 0..64 {
            tree.insert_unique(k);
        }
        for k in (-64..0).rev() {
            tree.insert_unique(k);
        }
        tree.check_invariants();
        tree.check_order(true);
        assert_eq!(keys(&tree), (-64..64).collect::<Vec<_>>());
        check_cycle(&tree);
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let mut tree = RbTree::<i32, Natural>::default();
        for k in [5, 3, 8, 1, 4] {
            assert!(tree.insert_unique(k).1);
        }
        let before = keys(&tree);
        let pos = tree.find(&4);
        assert_eq!(tree.insert_unique(4), (pos, false));
        assert_eq!(tree.len(), 5);
        assert_eq!(keys(&tree), before);
        tree.check_invariants();
    }

    #[test]
    fn multi_keeps_insertion_order() {
        // Compare only the first component, and check that the second one
        // records insertion order among equals.
        #[derive(Default)]
        struct ByFirst;
        impl Compare<(i32, i32)> for ByFirst {
            fn less(&self, a: &(i32, i32), b: &(i32, i32)) -> bool {
                a.0 < b.0
            }
        }

        let mut tree = RbTree::<(i32, i32), ByFirst, Threaded>::default();
        for (i, k) in [2, 1, 2, 3, 1, 2].into_iter().enumerate() {
            tree.insert_multi((k, i as i32));
        }
        tree.check_invariants();
        tree.check_order(false);
        let got: Vec<_> = tree.iter().copied().collect();
        assert_eq!(got, vec![(1, 1), (1, 4), (2, 0), (2, 2), (2, 5), (3, 3)]);

        assert_eq!(*tree.get(tree.find(&(2, 99))), (2, 0));
        assert_eq!(*tree.get(tree.lower_bound(&(2, 99))), (2, 0));
        assert_eq!(*tree.get(tree.upper_bound(&(2, 99))), (3, 3));
        assert_eq!(tree.upper_bound(&(3, 0)), tree.end());
    }

    #[test]
    fn empty_tree_bounds() {
        let tree = RbTree::<i32, Natural>::default();
        assert_eq!(tree.lower_bound(&0), tree.end());
        assert_eq!(tree.upper_bound(&0), tree.end());
        assert_eq!(tree.find(&0), tree.end());
        assert_eq!(tree.begin(), tree.end());
        assert_eq!(tree.next(tree.end()), tree.end());
        assert_eq!(tree.prev(tree.end()), tree.end());
    }

    fn boundary_rules<T: Threading>() {
        let mut tree = RbTree::<i32, Natural, T>::default();
        for k in [10, 20, 30] {
            tree.insert_unique(k);
        }
        let first = tree.begin();
        let last = tree.last();
        assert_eq!(*tree.get(first), 10);
        assert_eq!(*tree.get(last), 30);
        assert_eq!(tree.prev(first), tree.end());
        assert_eq!(tree.next(last), tree.end());
        assert_eq!(tree.next(tree.end()), first);
        assert_eq!(tree.prev(tree.end()), last);
        assert_eq!(tree.lower_bound(&31), tree.end());
        assert_eq!(tree.lower_bound(&5), first);
    }

    #[test]
    fn boundaries_plain() {
        boundary_rules::<Plain>();
    }

    #[test]
    fn boundaries_threaded() {
        boundary_rules::<Threaded>();
    }

    fn relative_insertion<T: Threading>() {
        // The comparator is deliberately backwards, to check that relative
        // insertions never look at it.
        #[derive(Default)]
        struct Backwards;
        impl Compare<i32> for Backwards {
            fn less(&self, a: &i32, b: &i32) -> bool {
                a > b
            }
        }

        let mut tree = RbTree::<i32, Backwards, T>::default();
        let two = tree.insert_after(tree.end(), 2);
        tree.insert_after(two, 3);
        tree.insert_before(two, 1);
        tree.insert_before(tree.end(), 5);
        let four = tree.insert_before(tree.last(), 4);
        tree.insert_after(tree.end(), 0);
        let mut at = four;
        for k in [41, 42, 43, 44, 45, 46, 47] {
            at = tree.insert_after(at, k);
        }
        tree.check_invariants();
        check_cycle(&tree);
        assert_eq!(
            keys(&tree),
            vec![0, 1, 2, 3, 4, 41, 42, 43, 44, 45, 46, 47, 5]
        );
    }

    #[test]
    fn relative_insertion_plain() {
        relative_insertion::<Plain>();
    }

    #[test]
    fn relative_insertion_threaded() {
        relative_insertion::<Threaded>();
    }

    #[test]
    fn positions_survive_erase() {
        let mut tree = RbTree::<i32, Natural, Threaded>::default();
        let positions: Vec<_> = (0..32).map(|k| tree.insert_unique(k).0).collect();
        for k in (0..32).step_by(3) {
            tree.erase(positions[k as usize]);
        }
        tree.check_invariants();
        for k in (0..32).filter(|k| k % 3 != 0) {
            assert_eq!(*tree.get(positions[k as usize]), k);
        }

        // Freed slots get reused.
        let slots = tree.nodes.len();
        tree.insert_unique(0);
        tree.insert_unique(3);
        assert_eq!(tree.nodes.len(), slots);
        tree.check_invariants();
    }

    #[test]
    #[should_panic]
    fn erase_end_panics() {
        let mut tree = RbTree::<i32, Natural>::default();
        tree.insert_unique(1);
        let end = tree.end();
        tree.erase(end);
    }

    #[test]
    fn clear() {
        let mut tree = RbTree::<i32, Natural, Threaded>::default();
        for k in 0..10 {
            tree.insert_unique(k);
        }
        tree.clear();
        tree.check_invariants();
        assert!(tree.is_empty());
        assert_eq!(tree.iter().count(), 0);
        tree.insert_unique(3);
        assert_eq!(keys(&tree), vec![3]);
    }

    #[test]
    fn partition_point() {
        let tree: RbTree<i32, Natural, Plain> = {
            let mut t = RbTree::default();
            for k in (0..100).step_by(5) {
                t.insert_unique(k);
            }
            t
        };
        assert_eq!(*tree.get(tree.partition_point(|&k| k < 42)), 45);
        assert_eq!(*tree.get(tree.partition_point(|&k| k <= 45)), 50);
        assert_eq!(tree.partition_point(|_| true), tree.end());
        assert_eq!(tree.partition_point(|_| false), tree.first());
    }

    proptest! {
        #[test]
        fn round_trip_plain(
            insert in prop::collection::vec(-50i32..50, 0..80),
            erase in prop::collection::vec(any::<usize>(), 0..80),
        ) {
            unique_round_trip::<Plain>(&insert, &erase);
        }

        #[test]
        fn round_trip_threaded(
            insert in prop::collection::vec(-50i32..50, 0..80),
            erase in prop::collection::vec(any::<usize>(), 0..80),
        ) {
            unique_round_trip::<Threaded>(&insert, &erase);
        }

        #[test]
        fn multi_matches_sorted_vec(keys_in in prop::collection::vec(0i32..8, 0..60)) {
            let mut tree = RbTree::<i32, Natural, Threaded>::default();
            for &k in &keys_in {
                tree.insert_multi(k);
            }
            tree.check_invariants();
            tree.check_order(false);
            let mut sorted = keys_in.clone();
            sorted.sort();
            prop_assert_eq!(keys(&tree), sorted);
            check_cycle(&tree);
        }
    }

    #[test]
    fn arbitrary_mutations() {
        arbtest::arbtest(|u| {
            let mut tree = RbTree::<u8, Natural, Threaded>::default();
            let mut model = std::collections::BTreeSet::new();
            for _ in 0..u.arbitrary_len::<u8>()? {
                let k: u8 = u.arbitrary()?;
                if u.arbitrary()? {
                    assert_eq!(tree.insert_unique(k).1, model.insert(k));
                } else {
                    let pos = tree.find(&k);
                    if model.remove(&k) {
                        assert_eq!(tree.erase(pos), k);
                    } else {
                        assert_eq!(pos, tree.end());
                    }
                }
            }
            tree.check_invariants();
            assert_eq!(
                tree.iter().copied().collect::<Vec<_>>(),
                model.into_iter().collect::<Vec<_>>()
            );
            Ok(())
        });
    }
}
