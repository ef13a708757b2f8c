use crate::grid::CellCoord;

/// Search bookkeeping for one grid cell. Nodes live in a flat arena reused
/// across searches; `generation` stamps which search last touched a node, so
/// stale g/h/parent values are reset lazily instead of sweeping the whole
/// arena every search.
#[derive(Debug, Clone)]
pub struct Node {
    pub coord: CellCoord,
    pub g: i32,
    pub h: i32,
    pub parent: Option<usize>,
    pub heap_index: usize,
    pub closed: bool,
    pub generation: u32,
}

impl Node {
    pub fn f(&self) -> i32 {
        self.g + self.h
    }
}

/// One node per cell, allocated once and reused.
pub struct NodeArena {
    nodes: Vec<Node>,
    width: usize,
    height: usize,
    generation: u32,
}

impl NodeArena {
    pub fn new(width: usize, height: usize) -> Self {
        let mut arena = Self {
            nodes: Vec::new(),
            width: 0,
            height: 0,
            generation: 0,
        };
        arena.resize(width, height);
        arena
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.nodes.clear();
        for y in 0..height {
            for x in 0..width {
                self.nodes.push(Node {
                    coord: CellCoord::new(x as i32, y as i32),
                    g: 0,
                    h: 0,
                    parent: None,
                    heap_index: usize::MAX,
                    closed: false,
                    generation: 0,
                });
            }
        }
    }

    /// Starts a new search; previously written node data becomes stale.
    pub fn begin_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn index_of(&self, coord: CellCoord) -> Option<usize> {
        if coord.x < 0
            || coord.y < 0
            || coord.x as usize >= self.width
            || coord.y as usize >= self.height
        {
            return None;
        }
        Some(coord.y as usize * self.width + coord.x as usize)
    }

    /// Fetches a node for the current search, resetting it first if the last
    /// search to touch it was an earlier one.
    pub fn touch(&mut self, index: usize) -> &mut Node {
        let generation = self.generation;
        let node = &mut self.nodes[index];
        if node.generation != generation {
            node.g = 0;
            node.h = 0;
            node.parent = None;
            node.heap_index = usize::MAX;
            node.closed = false;
            node.generation = generation;
        }
        node
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_resets_stale_nodes() {
        let mut arena = NodeArena::new(4, 4);
        arena.begin_search();
        let idx = arena.index_of(CellCoord::new(2, 1)).unwrap();
        {
            let node = arena.touch(idx);
            node.g = 42;
            node.parent = Some(0);
            node.closed = true;
        }
        // same search keeps the data
        assert_eq!(arena.touch(idx).g, 42);

        arena.begin_search();
        let node = arena.touch(idx);
        assert_eq!(node.g, 0);
        assert_eq!(node.parent, None);
        assert!(!node.closed);
    }

    #[test]
    fn test_index_of_bounds() {
        let arena = NodeArena::new(4, 4);
        assert_eq!(arena.index_of(CellCoord::new(0, 0)), Some(0));
        assert_eq!(arena.index_of(CellCoord::new(3, 3)), Some(15));
        assert_eq!(arena.index_of(CellCoord::new(4, 0)), None);
        assert_eq!(arena.index_of(CellCoord::new(0, -1)), None);
    }
}
