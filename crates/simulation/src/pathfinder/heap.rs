use super::node::Node;

/// Binary min-heap over arena node indices, keyed by ascending f and
/// tie-broken by ascending h. Each node stores its own heap slot
/// (`heap_index`) so membership tests and priority updates are O(1)/O(log n)
/// without scanning.
#[derive(Default)]
pub struct OpenHeap {
    items: Vec<usize>,
}

impl OpenHeap {
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, nodes: &[Node], index: usize) -> bool {
        let slot = nodes[index].heap_index;
        slot < self.items.len() && self.items[slot] == index
    }

    pub fn push(&mut self, nodes: &mut [Node], index: usize) {
        let slot = self.items.len();
        self.items.push(index);
        nodes[index].heap_index = slot;
        self.sift_up(nodes, slot);
    }

    /// Removes and returns the lowest-cost open node.
    pub fn pop_first(&mut self, nodes: &mut [Node]) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let first = self.items[0];
        let last = self.items.pop().filter(|_| !self.items.is_empty());
        if let Some(last) = last {
            self.items[0] = last;
            nodes[last].heap_index = 0;
            self.sift_down(nodes, 0);
        }
        nodes[first].heap_index = usize::MAX;
        Some(first)
    }

    /// Re-sorts a node whose g decreased. Costs only ever improve during a
    /// search, so sifting up suffices.
    pub fn update(&mut self, nodes: &mut [Node], index: usize) {
        let slot = nodes[index].heap_index;
        if slot < self.items.len() {
            self.sift_up(nodes, slot);
        }
    }

    fn better(a: &Node, b: &Node) -> bool {
        a.f() < b.f() || (a.f() == b.f() && a.h < b.h)
    }

    fn sift_up(&mut self, nodes: &mut [Node], mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if Self::better(&nodes[self.items[slot]], &nodes[self.items[parent]]) {
                self.swap(nodes, slot, parent);
                slot = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, nodes: &mut [Node], mut slot: usize) {
        loop {
            let left = slot * 2 + 1;
            let right = slot * 2 + 2;
            let mut best = slot;
            if left < self.items.len()
                && Self::better(&nodes[self.items[left]], &nodes[self.items[best]])
            {
                best = left;
            }
            if right < self.items.len()
                && Self::better(&nodes[self.items[right]], &nodes[self.items[best]])
            {
                best = right;
            }
            if best == slot {
                break;
            }
            self.swap(nodes, slot, best);
            slot = best;
        }
    }

    fn swap(&mut self, nodes: &mut [Node], a: usize, b: usize) {
        self.items.swap(a, b);
        nodes[self.items[a]].heap_index = a;
        nodes[self.items[b]].heap_index = b;
    }
}
