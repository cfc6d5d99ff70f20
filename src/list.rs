//! Intrusive doubly linked lists over an index arena.
//!
//! Entities live in a fixed slice and embed one [`Hook`] per list they can
//! join. A [`List`] only stores head/tail indices; pushing and unlinking
//! rewrite a handful of indices and never allocate or move the entity.

/// Embedded link node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hook {
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

impl Hook {
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked
    }
}

/// An entity that carries one or more hooks, selected by slot.
pub trait Linked {
    fn hook(&self, slot: usize) -> &Hook;
    fn hook_mut(&mut self, slot: usize) -> &mut Hook;
}

/// List head threading through hook `slot` of every member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct List {
    slot: usize,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl List {
    pub const fn new(slot: usize) -> Self {
        Self {
            slot,
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn front(&self) -> Option<usize> {
        self.head
    }

    /// Member following `id`, read before `id` is unlinked when iterating.
    #[inline]
    pub fn next<N: Linked>(&self, nodes: &[N], id: usize) -> Option<usize> {
        nodes[id].hook(self.slot).next
    }

    #[cfg(test)]
    pub fn contains<N: Linked>(&self, nodes: &[N], id: usize) -> bool {
        self.iter(nodes).any(|member| member == id)
    }

    pub fn push_back<N: Linked>(&mut self, nodes: &mut [N], id: usize) {
        debug_assert!(!nodes[id].hook(self.slot).linked, "entity already linked");

        let slot = self.slot;
        let tail = self.tail;
        {
            let hook = nodes[id].hook_mut(slot);
            hook.prev = tail;
            hook.next = None;
            hook.linked = true;
        }

        match tail {
            Some(tail) => nodes[tail].hook_mut(slot).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Remove `id` from this list. Unlinking an entity that is not linked is
    /// a no-op.
    pub fn unlink<N: Linked>(&mut self, nodes: &mut [N], id: usize) {
        let slot = self.slot;
        let Hook { prev, next, linked } = *nodes[id].hook(slot);
        if !linked {
            return;
        }

        match prev {
            Some(prev) => nodes[prev].hook_mut(slot).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => nodes[next].hook_mut(slot).prev = prev,
            None => self.tail = prev,
        }

        *nodes[id].hook_mut(slot) = Hook::default();
        self.len -= 1;
    }

    /// Unlink and return the first member.
    pub fn pop_front<N: Linked>(&mut self, nodes: &mut [N]) -> Option<usize> {
        let id = self.head?;
        self.unlink(nodes, id);
        Some(id)
    }

    pub fn iter<'a, N: Linked>(&self, nodes: &'a [N]) -> Iter<'a, N> {
        Iter {
            nodes,
            slot: self.slot,
            cursor: self.head,
        }
    }
}

/// Member indices in list order.
pub struct Iter<'a, N> {
    nodes: &'a [N],
    slot: usize,
    cursor: Option<usize>,
}

impl<'a, N: Linked> Iterator for Iter<'a, N> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let id = self.cursor?;
        self.cursor = self.nodes[id].hook(self.slot).next;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Node {
        hooks: [Hook; 2],
    }

    impl Linked for Node {
        fn hook(&self, slot: usize) -> &Hook {
            &self.hooks[slot]
        }

        fn hook_mut(&mut self, slot: usize) -> &mut Hook {
            &mut self.hooks[slot]
        }
    }

    fn nodes(count: usize) -> Vec<Node> {
        (0..count).map(|_| Node::default()).collect()
    }

    #[test]
    fn push_back_keeps_insertion_order() {
        let mut arena = nodes(4);
        let mut list = List::new(0);
        for id in [2, 0, 3] {
            list.push_back(&mut arena, id);
        }

        assert_eq!(list.iter(&arena).collect::<Vec<_>>(), vec![2, 0, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.front(), Some(2));
    }

    #[test]
    fn unlink_head_middle_and_tail() {
        let mut arena = nodes(5);
        let mut list = List::new(0);
        for id in 0..5 {
            list.push_back(&mut arena, id);
        }

        list.unlink(&mut arena, 0);
        list.unlink(&mut arena, 2);
        list.unlink(&mut arena, 4);

        assert_eq!(list.iter(&arena).collect::<Vec<_>>(), vec![1, 3]);
        assert!(!arena[2].hooks[0].is_linked());

        list.unlink(&mut arena, 2);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn one_entity_can_join_lists_on_different_slots() {
        let mut arena = nodes(3);
        let mut first = List::new(0);
        let mut second = List::new(1);

        first.push_back(&mut arena, 1);
        second.push_back(&mut arena, 1);
        second.push_back(&mut arena, 2);
        first.unlink(&mut arena, 1);

        assert!(first.is_empty());
        assert!(second.contains(&arena, 1));
        assert_eq!(second.pop_front(&mut arena), Some(1));
        assert_eq!(second.pop_front(&mut arena), Some(2));
        assert_eq!(second.pop_front(&mut arena), None);
    }

    #[test]
    fn next_read_before_unlink_survives_removal() {
        let mut arena = nodes(3);
        let mut list = List::new(0);
        for id in 0..3 {
            list.push_back(&mut arena, id);
        }

        let mut visited = Vec::new();
        let mut cursor = list.front();
        while let Some(id) = cursor {
            cursor = list.next(&arena, id);
            visited.push(id);
            list.unlink(&mut arena, id);
        }

        assert_eq!(visited, vec![0, 1, 2]);
        assert!(list.is_empty());
    }
}
