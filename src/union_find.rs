//! Weighted quick-union with path compression.
//!
//! Elements are indices into two flat arrays: `parent` holds each element's
//! parent pointer (an element is a root when it points to itself) and `size`
//! holds the number of elements in the tree rooted at a given root. Unions
//! always hang the smaller tree under the larger one, which keeps trees at
//! O(log n) height; `find` additionally halves the path it walks.

use crate::error::{PercolationError, Position, Result};
use std::fmt;
use tracing::trace;

/// Above this many elements the parent array is not dumped to trace logs
const TRACE_DUMP_LIMIT: usize = 64;

/// Disjoint-set structure over a fixed number of elements
#[derive(Debug, Clone)]
pub struct DynamicConnectivity {
    parent: Vec<usize>,
    size: Vec<usize>,
    components_count: usize,
}

impl DynamicConnectivity {
    /// Create `n` singleton sets
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(PercolationError::InvalidSize(n));
        }

        Ok(DynamicConnectivity {
            parent: (0..n).collect(),
            size: vec![1; n],
            components_count: n,
        })
    }

    /// Number of elements the structure was created with
    pub fn element_count(&self) -> usize {
        self.parent.len()
    }

    pub fn component_count(&self) -> usize {
        self.components_count
    }

    /// Find the root of `i`, pointing every visited node at its grandparent
    pub fn find(&mut self, i: usize) -> Result<usize> {
        self.check_index(i)?;

        let mut node = i;
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        Ok(node)
    }

    /// Find the root of `i` without touching the parent array.
    ///
    /// Used where many readers share the structure, e.g. a parallel
    /// fill-status refresh.
    pub fn find_frozen(&self, i: usize) -> Result<usize> {
        self.check_index(i)?;

        let mut node = i;
        while self.parent[node] != node {
            node = self.parent[node];
        }
        Ok(node)
    }

    /// Merge the sets containing `p` and `q`
    ///
    /// The root of the smaller tree is attached under the root of the larger
    /// one. On a tie the `q` side goes under the `p` side.
    pub fn union(&mut self, p: usize, q: usize) -> Result<()> {
        let root_p = self.find(p)?;
        let root_q = self.find(q)?;
        if root_p == root_q {
            return Ok(());
        }

        if self.element_count() <= TRACE_DUMP_LIMIT {
            trace!("union({}, {}) before: {}", p, q, self);
        }

        if self.size[root_p] < self.size[root_q] {
            self.parent[root_p] = root_q;
            self.size[root_q] += self.size[root_p];
        } else {
            self.parent[root_q] = root_p;
            self.size[root_p] += self.size[root_q];
        }
        self.components_count -= 1;

        if self.element_count() <= TRACE_DUMP_LIMIT {
            trace!("union({}, {}) after: {}", p, q, self);
        }
        Ok(())
    }

    pub fn connected(&mut self, p: usize, q: usize) -> Result<bool> {
        Ok(self.find(p)? == self.find(q)?)
    }

    /// Same as [`connected`](Self::connected) but through `find_frozen`
    pub fn connected_frozen(&self, p: usize, q: usize) -> Result<bool> {
        Ok(self.find_frozen(p)? == self.find_frozen(q)?)
    }

    fn check_index(&self, i: usize) -> Result<()> {
        if i >= self.parent.len() {
            return Err(PercolationError::IndexOutOfRange(Position::Flat {
                index: i,
                len: self.parent.len(),
            }));
        }
        Ok(())
    }
}

impl fmt::Display for DynamicConnectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.parent.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", ids.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero() {
        assert!(matches!(
            DynamicConnectivity::new(0),
            Err(PercolationError::InvalidSize(0))
        ));
    }

    #[test]
    fn test_singletons() {
        let mut uf = DynamicConnectivity::new(4).unwrap();
        assert_eq!(uf.element_count(), 4);
        assert_eq!(uf.component_count(), 4);
        for i in 0..4 {
            assert_eq!(uf.find(i).unwrap(), i);
        }
        assert!(!uf.connected(0, 1).unwrap());
    }

    #[test]
    fn test_basic_scenario() {
        let mut uf = DynamicConnectivity::new(5).unwrap();
        uf.union(0, 1).unwrap();
        uf.union(1, 2).unwrap();
        assert!(uf.connected(0, 2).unwrap());
        assert!(!uf.connected(0, 3).unwrap());
        assert_eq!(uf.component_count(), 3);
    }

    #[test]
    fn test_union_with_self_is_noop() {
        let mut uf = DynamicConnectivity::new(3).unwrap();
        uf.union(1, 1).unwrap();
        assert!(uf.connected(1, 1).unwrap());
        assert_eq!(uf.component_count(), 3);
    }

    #[test]
    fn test_count_drops_only_on_merge() {
        let mut uf = DynamicConnectivity::new(6).unwrap();
        uf.union(0, 1).unwrap();
        assert_eq!(uf.component_count(), 5);
        uf.union(1, 0).unwrap();
        assert_eq!(uf.component_count(), 5);
        uf.union(2, 3).unwrap();
        uf.union(0, 3).unwrap();
        assert_eq!(uf.component_count(), 3);
        uf.union(1, 2).unwrap();
        assert_eq!(uf.component_count(), 3);
    }

    #[test]
    fn test_tie_attaches_q_under_p() {
        let mut uf = DynamicConnectivity::new(2).unwrap();
        uf.union(0, 1).unwrap();
        assert_eq!(uf.find(1).unwrap(), 0);
    }

    #[test]
    fn test_smaller_tree_goes_under_larger() {
        let mut uf = DynamicConnectivity::new(4).unwrap();
        uf.union(1, 2).unwrap();
        uf.union(1, 3).unwrap();
        // {1, 2, 3} outweighs {0}, so 1 stays the root
        uf.union(0, 1).unwrap();
        assert_eq!(uf.find(0).unwrap(), 1);
        assert_eq!(uf.find(3).unwrap(), 1);
    }

    #[test]
    fn test_find_halves_path() {
        let mut uf = DynamicConnectivity::new(4).unwrap();
        uf.union(0, 1).unwrap();
        uf.union(2, 3).unwrap();
        uf.union(0, 2).unwrap();
        // 3 -> 2 -> 0 before the lookup
        assert_eq!(uf.to_string(), "0 0 0 2");
        assert_eq!(uf.find(3).unwrap(), 0);
        assert_eq!(uf.to_string(), "0 0 0 0");
    }

    #[test]
    fn test_find_frozen_leaves_parents_alone() {
        let mut uf = DynamicConnectivity::new(4).unwrap();
        uf.union(0, 1).unwrap();
        uf.union(2, 3).unwrap();
        uf.union(0, 2).unwrap();
        assert_eq!(uf.find_frozen(3).unwrap(), 0);
        assert_eq!(uf.to_string(), "0 0 0 2");
    }

    #[test]
    fn test_find_is_idempotent() {
        let mut uf = DynamicConnectivity::new(8).unwrap();
        for i in 0..7 {
            uf.union(i, i + 1).unwrap();
        }
        for i in 0..8 {
            let root = uf.find(i).unwrap();
            assert_eq!(uf.find(i).unwrap(), root);
            assert_eq!(uf.find_frozen(i).unwrap(), root);
        }
        assert_eq!(uf.component_count(), 1);
    }

    #[test]
    fn test_union_then_connected() {
        let mut uf = DynamicConnectivity::new(10).unwrap();
        let pairs = [(3, 7), (7, 9), (0, 0), (2, 8), (8, 3)];
        for (p, q) in pairs {
            uf.union(p, q).unwrap();
            assert!(uf.connected(p, q).unwrap());
            assert!(uf.connected_frozen(p, q).unwrap());
        }
        assert!(uf.connected(2, 9).unwrap());
    }

    #[test]
    fn test_out_of_range() {
        let mut uf = DynamicConnectivity::new(3).unwrap();
        assert!(matches!(
            uf.find(3),
            Err(PercolationError::IndexOutOfRange(Position::Flat {
                index: 3,
                len: 3
            }))
        ));
        assert!(uf.union(0, 5).is_err());
        assert!(uf.connected(5, 0).is_err());
        assert!(uf.find_frozen(9).is_err());
        assert_eq!(uf.component_count(), 3);
    }

    #[test]
    fn test_display_lists_parents() {
        let mut uf = DynamicConnectivity::new(3).unwrap();
        uf.union(0, 2).unwrap();
        assert_eq!(uf.to_string(), "0 1 0");
    }
}
