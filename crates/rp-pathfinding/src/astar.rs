//! A* search over the world's collision grid.
//!
//! The node array is allocated once and reused across searches: open/closed
//! set membership is a per-run sequence number stamped on each node rather
//! than a separate set, so a new search never reallocates.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rp_world::CollisionBitmap;

const SQRT_2: f32 = std::f32::consts::SQRT_2;

#[derive(Debug, Clone, Copy)]
struct Node {
    previous: Option<usize>,
    cost_to_goal: f32,
    cost_from_start: f32,
    passable: bool,
    open_run_no: u32,
    closed_run_no: u32,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            previous: None,
            cost_to_goal: 0.0,
            cost_from_start: 0.0,
            passable: true,
            open_run_no: 0,
            closed_run_no: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    total_cost: f32,
    idx: usize,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so `BinaryHeap` (a max-heap) behaves as a min-heap; ties
        // broken on node index so the search order is deterministic.
        other
            .total_cost
            .total_cmp(&self.total_cost)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds paths over a fixed-size toroidal grid. Holds one `Node` per cell;
/// `find` is safe to call repeatedly without reallocating.
pub struct PathFinder {
    width: u32,
    length: u32,
    nodes: Vec<Node>,
    run_no: u32,
}

fn manhattan(a: (i32, i32), b: (i32, i32)) -> f32 {
    ((a.0 - b.0).abs() + (a.1 - b.1).abs()) as f32
}

impl PathFinder {
    pub fn new(bitmap: &CollisionBitmap) -> Self {
        let width = bitmap.width;
        let length = bitmap.length;
        let mut nodes = vec![Node::default(); (width * length) as usize];
        for z in 0..length as i32 {
            for x in 0..width as i32 {
                let idx = (z as u32 * width + x as u32) as usize;
                nodes[idx].passable = bitmap.is_passable(x as i64, z as i64);
            }
        }
        Self { width, length, nodes, run_no: 0 }
    }

    fn index(&self, x: i32, z: i32) -> usize {
        let wx = x.rem_euclid(self.width as i32) as u32;
        let wz = z.rem_euclid(self.length as i32) as u32;
        (wz * self.width + wx) as usize
    }

    fn loc(&self, idx: usize) -> (i32, i32) {
        let x = (idx as u32 % self.width) as i32;
        let z = (idx as u32 / self.width) as i32;
        (x, z)
    }

    fn round_to_cell(p: (f32, f32)) -> (i32, i32) {
        (p.0.floor() as i32, p.1.floor() as i32)
    }

    /// Runs A* from `start` to `goal`. Both are world (x, z) positions; the
    /// y component is ignored. Returns the cell-center waypoints of the
    /// path, or `None` if no path exists.
    pub fn find(&mut self, start: (f32, f32), goal: (f32, f32)) -> Option<Vec<(f32, f32)>> {
        self.run_no += 1;
        let run_no = self.run_no;

        let start_cell = Self::round_to_cell(start);
        let goal_cell = Self::round_to_cell(goal);
        let start_idx = self.index(start_cell.0, start_cell.1);

        let mut heap = BinaryHeap::new();
        {
            let node = &mut self.nodes[start_idx];
            node.previous = None;
            node.cost_from_start = 0.0;
            node.cost_to_goal = manhattan(start_cell, goal_cell);
            node.open_run_no = run_no;
        }
        heap.push(HeapEntry {
            total_cost: self.nodes[start_idx].cost_to_goal,
            idx: start_idx,
        });

        while let Some(entry) = heap.pop() {
            let curr_idx = entry.idx;
            if self.nodes[curr_idx].closed_run_no == run_no {
                continue;
            }
            let curr_total = self.nodes[curr_idx].cost_from_start + self.nodes[curr_idx].cost_to_goal;
            if (curr_total - entry.total_cost).abs() > 1e-6 {
                // Stale heap entry superseded by a cheaper path since pushed.
                continue;
            }

            if self.nodes[curr_idx].cost_to_goal <= 1.0 {
                return Some(self.construct_path(curr_idx));
            }

            self.nodes[curr_idx].closed_run_no = run_no;
            self.nodes[curr_idx].open_run_no = 0;

            let curr_loc = self.loc(curr_idx);
            let curr_cost_from_start = self.nodes[curr_idx].cost_from_start;

            for dz in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dz == 0 {
                        continue;
                    }
                    let n_loc = (curr_loc.0 + dx, curr_loc.1 + dz);
                    let n_idx = self.index(n_loc.0, n_loc.1);

                    if self.nodes[n_idx].closed_run_no == run_no || !self.nodes[n_idx].passable {
                        continue;
                    }

                    let new_cost_to_goal = manhattan(n_loc, goal_cell);
                    let step_cost = if dx == 0 || dz == 0 { 1.0 } else { SQRT_2 };
                    let new_cost_from_start = curr_cost_from_start + step_cost;

                    let is_open = self.nodes[n_idx].open_run_no == run_no;
                    let better = !is_open
                        || (new_cost_from_start + new_cost_to_goal)
                            < (self.nodes[n_idx].cost_from_start + self.nodes[n_idx].cost_to_goal);

                    if better {
                        let n = &mut self.nodes[n_idx];
                        n.previous = Some(curr_idx);
                        n.cost_to_goal = new_cost_to_goal;
                        n.cost_from_start = new_cost_from_start;
                        n.open_run_no = run_no;
                        heap.push(HeapEntry {
                            total_cost: new_cost_from_start + new_cost_to_goal,
                            idx: n_idx,
                        });
                    }
                }
            }
        }

        None
    }

    fn construct_path(&self, goal_idx: usize) -> Vec<(f32, f32)> {
        let mut path = Vec::new();
        let mut node = Some(goal_idx);
        while let Some(idx) = node {
            let (x, z) = self.loc(idx);
            path.push((x as f32, z as f32));
            node = self.nodes[idx].previous;
        }
        path.reverse();
        path
    }

    /// Whether a straight rasterized line from `start` to `end` crosses only
    /// passable cells.
    pub fn is_passable(&self, start: (f32, f32), end: (f32, f32)) -> bool {
        let sx = (start.0 + 0.5).floor() as i32;
        let sz = (start.1 + 0.5).floor() as i32;
        let ex = (end.0 + 0.5).floor() as i32;
        let ez = (end.1 + 0.5).floor() as i32;

        let dx = ex - sx;
        let dz = ez - sz;
        let steps = dx.abs().max(dz.abs());
        if steps == 0 {
            return self.nodes[self.index(sx, sz)].passable;
        }

        let xinc = dx as f32 / steps as f32;
        let zinc = dz as f32 / steps as f32;

        let mut x = sx as f32;
        let mut z = sz as f32;
        for _ in 0..=steps {
            let idx = self.index(x.round() as i32, z.round() as i32);
            if !self.nodes[idx].passable {
                return false;
            }
            x += xinc;
            z += zinc;
        }
        true
    }

    /// Collapses collinear/L-shaped runs in `full_path` into straight
    /// segments wherever a direct line between the endpoints stays passable.
    pub fn simplify_path(&self, full_path: &[(f32, f32)]) -> Vec<(f32, f32)> {
        let mut new_path = Vec::new();
        let mut it = full_path.iter();
        let Some(&first) = it.next() else {
            return new_path;
        };
        new_path.push(first);
        let mut start = first;
        let mut last = first;

        for &end in it {
            if !self.is_passable(start, end) {
                new_path.push(last);
                start = last;
            }
            last = end;
        }

        if new_path.last() != full_path.last() {
            if let Some(&tail) = full_path.last() {
                new_path.push(tail);
            }
        }
        new_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_bitmap(width: u32, length: u32) -> CollisionBitmap {
        CollisionBitmap::all_passable(width, length)
    }

    #[test]
    fn test_find_straight_line() {
        let bm = open_bitmap(16, 16);
        let mut pf = PathFinder::new(&bm);
        let path = pf.find((0.0, 0.0), (5.0, 0.0)).expect("path should exist");
        assert_eq!(*path.first().unwrap(), (0.0, 0.0));
        assert_eq!(*path.last().unwrap(), (5.0, 0.0));
    }

    #[test]
    fn test_find_around_obstacle() {
        let mut bits = vec![true; 100];
        // A vertical wall at x=5, z in [0,8], with a gap at z=9.
        for z in 0..9 {
            bits[z * 10 + 5] = false;
        }
        let bm = CollisionBitmap::new(10, 10, bits);
        let mut pf = PathFinder::new(&bm);
        let path = pf.find((2.0, 2.0), (8.0, 2.0)).expect("path should exist");
        assert!(path.iter().all(|&(x, z)| {
            let idx = pf.index(x as i32, z as i32);
            pf.nodes[idx].passable
        }));
    }

    #[test]
    fn test_find_no_path_when_enclosed() {
        let mut bits = vec![true; 9 * 9];
        for x in 0..9 {
            bits[3 * 9 + x] = false;
        }
        let bm = CollisionBitmap::new(9, 9, bits);
        let mut pf = PathFinder::new(&bm);
        assert!(pf.find((1.0, 1.0), (1.0, 8.0)).is_none());
    }

    #[test]
    fn test_is_passable_straight_line() {
        let bm = open_bitmap(10, 10);
        let pf = PathFinder::new(&bm);
        assert!(pf.is_passable((0.0, 0.0), (9.0, 0.0)));
    }

    #[test]
    fn test_simplify_collapses_straight_run() {
        let bm = open_bitmap(10, 10);
        let pf = PathFinder::new(&bm);
        let full = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)];
        let simplified = pf.simplify_path(&full);
        assert_eq!(simplified, vec![(0.0, 0.0), (4.0, 0.0)]);
    }

    #[test]
    fn test_runs_are_independent() {
        let bm = open_bitmap(8, 8);
        let mut pf = PathFinder::new(&bm);
        let first = pf.find((0.0, 0.0), (4.0, 4.0));
        let second = pf.find((1.0, 1.0), (6.0, 1.0));
        assert!(first.is_some());
        assert!(second.is_some());
    }
}
