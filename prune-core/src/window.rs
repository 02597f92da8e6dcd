//! Position index and physical-distance windows.

use std::ops::Range;

use crate::locus::Locus;

/// Loci sorted by (chromosome, position) with the rank of each locus.
///
/// Built from the priority order with a stable sort, so loci sharing a
/// position stay in priority order.
#[derive(Debug, Clone)]
pub struct PositionIndex {
    sorted: Vec<usize>,
    rank: Vec<usize>,
}

impl PositionIndex {
    pub fn new(loci: &[Locus], priority_order: &[usize]) -> Self {
        let mut sorted = priority_order.to_vec();
        sorted.sort_by(|&a, &b| {
            loci[a]
                .chrom
                .cmp(&loci[b].chrom)
                .then(loci[a].pos.cmp(&loci[b].pos))
        });
        let mut rank = vec![0; loci.len()];
        for (r, &id) in sorted.iter().enumerate() {
            rank[id] = r;
        }
        Self { sorted, rank }
    }

    pub fn rank(&self, id: usize) -> usize {
        self.rank[id]
    }

    /// Ranks of the loci on the index's chromosome within
    /// `[pos - half_width, pos + half_width]`, the lower bound clamped to 1.
    pub fn window(&self, loci: &[Locus], index: usize, half_width: u64) -> Range<usize> {
        let centre = &loci[index];
        let start = centre.pos.saturating_sub(half_width).max(1);
        let end = centre.pos.saturating_add(half_width);
        let in_window = |id: usize| {
            let l = &loci[id];
            l.chrom == centre.chrom && l.pos >= start && l.pos <= end
        };

        let own = self.rank[index];
        let mut first = own;
        while first > 0 && in_window(self.sorted[first - 1]) {
            first -= 1;
        }
        let mut last = own + 1;
        while last < self.sorted.len() && in_window(self.sorted[last]) {
            last += 1;
        }
        first..last
    }

    /// Locus ids for a range of ranks.
    pub fn ids(&self, range: Range<usize>) -> &[usize] {
        &self.sorted[range]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrom::Chromosome;

    fn loci(positions: &[(&str, u64)]) -> Vec<Locus> {
        positions
            .iter()
            .enumerate()
            .map(|(i, &(c, pos))| {
                Locus::new(format!("rs{}", i), Chromosome::parse(c).unwrap(), pos, 0.5)
            })
            .collect()
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let l = loci(&[("1", 100), ("1", 200), ("1", 300), ("1", 401), ("2", 250)]);
        let order: Vec<usize> = (0..l.len()).collect();
        let index = PositionIndex::new(&l, &order);
        let range = index.window(&l, 1, 100);
        assert_eq!(index.ids(range), &[0, 1, 2]);
    }

    #[test]
    fn test_window_stops_at_chromosome() {
        let l = loci(&[("2", 10), ("1", 20), ("1", 15)]);
        let order: Vec<usize> = (0..l.len()).collect();
        let index = PositionIndex::new(&l, &order);
        let range = index.window(&l, 1, 1_000_000);
        let mut ids = index.ids(range).to_vec();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_lower_bound_clamped() {
        let l = loci(&[("1", 1), ("1", 5), ("1", 50)]);
        let order: Vec<usize> = (0..l.len()).collect();
        let index = PositionIndex::new(&l, &order);
        let range = index.window(&l, 1, 10);
        assert_eq!(index.ids(range), &[0, 1]);
    }

    #[test]
    fn test_ties_keep_priority_order() {
        let l = loci(&[("1", 100), ("1", 100), ("1", 100)]);
        let order = vec![2, 0, 1];
        let index = PositionIndex::new(&l, &order);
        assert_eq!(index.ids(0..3), &[2, 0, 1]);
        assert_eq!(index.rank(0), 1);
    }

    #[test]
    fn test_zero_width_window_contains_index() {
        let l = loci(&[("1", 100), ("1", 101)]);
        let order: Vec<usize> = (0..l.len()).collect();
        let index = PositionIndex::new(&l, &order);
        assert_eq!(index.ids(index.window(&l, 0, 0)), &[0]);
    }
}
