//! Singly-linked chains of bindings threaded through an arena.
//!
//! A chain is named by its head (`Option<DefaultKey>`); each binding's
//! `next` points at its successor and `None` terminates. Both backends are
//! built from these helpers: the hash backend keeps one head per bucket,
//! the list backend keeps a single head.

use crate::binding::{Arena, Binding};
use slotmap::DefaultKey;

pub(crate) type Head = Option<DefaultKey>;

/// First binding in the chain whose key equals `key`.
pub(crate) fn find<V>(arena: &Arena<V>, head: Head, key: &str) -> Option<DefaultKey> {
    let mut cur = head;
    while let Some(k) = cur {
        let b = &arena[k];
        if &*b.key == key {
            return Some(k);
        }
        cur = b.next;
    }
    None
}

/// Link the detached binding `k` after the current tail.
pub(crate) fn append<V>(arena: &mut Arena<V>, head: &mut Head, k: DefaultKey) {
    debug_assert!(arena[k].next.is_none(), "appending a linked binding");
    match *head {
        None => *head = Some(k),
        Some(mut tail) => {
            while let Some(n) = arena[tail].next {
                tail = n;
            }
            arena[tail].next = Some(k);
        }
    }
}

/// Link the detached binding `k` in front of the current head.
pub(crate) fn push_front<V>(arena: &mut Arena<V>, head: &mut Head, k: DefaultKey) {
    debug_assert!(arena[k].next.is_none(), "pushing a linked binding");
    arena[k].next = *head;
    *head = Some(k);
}

/// Unlink the binding for `key` from the chain, leaving it detached but
/// still in the arena.
pub(crate) fn unlink<V>(arena: &mut Arena<V>, head: &mut Head, key: &str) -> Option<DefaultKey> {
    let mut prev: Head = None;
    let mut cur = *head;
    while let Some(k) = cur {
        let next = arena[k].next;
        if &*arena[k].key == key {
            match prev {
                None => *head = next,
                Some(p) => arena[p].next = next,
            }
            arena[k].next = None;
            return Some(k);
        }
        prev = Some(k);
        cur = next;
    }
    None
}

/// Visit every binding of every chain in `heads`, in order, with mutable
/// access to the value.
pub(crate) fn visit_mut<V, F>(arena: &mut Arena<V>, heads: &[Head], mut f: F)
where
    F: FnMut(&str, &mut V),
{
    for &head in heads {
        let mut cur = head;
        while let Some(k) = cur {
            let Binding { key, value, next } = &mut arena[k];
            f(&**key, value);
            cur = *next;
        }
    }
}

/// Iterator over the bindings of a sequence of chains.
pub struct Iter<'a, V> {
    arena: &'a Arena<V>,
    heads: core::slice::Iter<'a, Head>,
    cur: Head,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(arena: &'a Arena<V>, heads: &'a [Head]) -> Self {
        Self {
            arena,
            heads: heads.iter(),
            cur: None,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let b = &self.arena[k];
                self.cur = b.next;
                return Some((&*b.key, &b.value));
            }
            self.cur = *self.heads.next()?;
        }
    }
}
