//! Greedy assembly of scored adjacencies into ancestral contiguous fragments.

pub mod assembler;
pub mod edge;
pub mod writer;

pub use assembler::{insert_edge, AssemblyReport, Assembler, Chain, Insertion, Outcome};
pub use edge::{read_scores, Edge, EdgeKey, ScoreTable};
pub use writer::{format_general, write_apcf, write_joins};

#[cfg(test)]
mod tests {
    use super::*;

    fn table(lines: &[(i32, i32, f64)]) -> ScoreTable {
        let mut table = ScoreTable::default();
        for &(x, y, w) in lines {
            table.insert(x, y, w);
        }
        table
    }

    fn assemble(lines: &[(i32, i32, f64)], min_weight: f64) -> (ScoreTable, Assembler) {
        let table = table(lines);
        let assembler = Assembler::assemble(table.weighted_edges(), min_weight);
        (table, assembler)
    }

    fn contigs(assembler: &Assembler) -> Vec<Vec<i32>> {
        assembler.chains().map(|c| c.elements()).collect()
    }

    fn apcf_text(table: &ScoreTable, assembler: &Assembler) -> String {
        let mut out = vec![];
        write_apcf(&mut out, table.numblocks, assembler.chains()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_adjacency() {
        let (table, assembler) = assemble(&[(1, -2, 0.9)], 0.0);
        assert_eq!(contigs(&assembler), vec![vec![1, -2]]);
        assert_eq!(
            apcf_text(&table, &assembler),
            ">ANCESTOR\t2\n# APCF 1\n1 -2 $\n"
        );
        // The reverse strand copy finds its ends taken
        assert_eq!(assembler.report().accepted(), 1);
        assert_eq!(assembler.report().rejected_end_in_use(), 1);
    }

    #[test]
    fn test_triangle_rejects_weakest() {
        let (_, assembler) = assemble(&[(1, 2, 0.9), (2, 3, 0.8), (3, 1, 0.7)], 0.0);
        assert_eq!(contigs(&assembler), vec![vec![1, 2, 3]]);

        let chain = assembler.chains().next().unwrap();
        assert!(!chain.is_empty());
        assert_eq!(chain.len(), 2);

        let report = assembler.report();
        assert_eq!(report.rejected_cycle(), 2);
        for (edge, outcome) in &report.outcomes {
            if *outcome == Outcome::RejectedCycle {
                assert_eq!(edge.weight, 0.7);
            }
        }
    }

    #[test]
    fn test_claimed_end() {
        let (_, assembler) = assemble(&[(1, 2, 0.9), (1, 3, 0.5)], 0.0);
        assert_eq!(contigs(&assembler), vec![vec![1, 2]]);

        let report = assembler.report();
        assert_eq!(report.rejected_end_in_use(), 3);
        let rejected: Vec<(i32, i32)> = report
            .outcomes
            .iter()
            .filter(|(_, o)| *o == Outcome::RejectedEndInUse)
            .map(|(e, _)| (e.signed1(), e.signed2()))
            .collect();
        assert!(rejected.contains(&(1, 3)));
        assert!(rejected.contains(&(-3, -1)));
    }

    #[test]
    fn test_merge_bridging_edge() {
        let (_, assembler) = assemble(&[(1, 2, 0.9), (3, 4, 0.8), (2, 3, 0.7)], 0.0);
        assert_eq!(contigs(&assembler), vec![vec![1, 2, 3, 4]]);

        let merged = assembler
            .report()
            .outcomes
            .iter()
            .find_map(|(_, o)| match o {
                Outcome::Accepted { chain, merged } => Some((*chain, merged.clone())),
                _ => None,
            });
        assert_eq!(merged, Some((1, vec![2])));

        let mut out = vec![];
        write_joins(&mut out, assembler.chains()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1\t2\t0.9\n2\t3\t0.7\n3\t4\t0.8\n"
        );
    }

    #[test]
    fn test_merge_orientations() {
        // Backs meet: 3 4 joins reversed behind 1 2 -4
        let (_, assembler) = assemble(&[(1, 2, 0.9), (3, 4, 0.8), (2, -4, 0.7)], 0.0);
        assert_eq!(contigs(&assembler), vec![vec![1, 2, -4, -3]]);

        // Fronts meet: 3 4 joins reversed before -3 1 2
        let (_, assembler) = assemble(&[(1, 2, 0.9), (3, 4, 0.8), (-3, 1, 0.7)], 0.0);
        assert_eq!(contigs(&assembler), vec![vec![-4, -3, 1, 2]]);

        // 3 4 ends where 4 1 2 begins
        let (_, assembler) = assemble(&[(1, 2, 0.9), (3, 4, 0.8), (4, 1, 0.7)], 0.0);
        assert_eq!(contigs(&assembler), vec![vec![3, 4, 1, 2]]);

        let mut out = vec![];
        write_joins(&mut out, assembler.chains()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "3\t4\t0.8\n4\t1\t0.7\n1\t2\t0.9\n"
        );
    }

    #[test]
    fn test_chromosome_ends() {
        let lines = [
            (0, 1, 0.9),
            (1, 2, 0.8),
            (2, 0, 0.7),
            (0, 3, 0.6),
            (3, 0, 0.5),
        ];
        let (table, assembler) = assemble(&lines, 0.0);
        assert_eq!(contigs(&assembler), vec![vec![1, 2], vec![3]]);
        assert_eq!(
            apcf_text(&table, &assembler),
            ">ANCESTOR\t3\n# APCF 1\n1 2 $\n# APCF 2\n3 $\n"
        );

        let mut out = vec![];
        write_joins(&mut out, assembler.chains()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0\t1\t0.9\n1\t2\t0.8\n2\t0\t0.7\n0\t3\t0.6\n3\t0\t0.5\n"
        );
    }

    #[test]
    fn test_chromosome_end_fronts_fall_through() {
        // The chromosome 0 2 -1 0: both fragments start at a chromosome end,
        // so 2 -1 has to join them back to back
        let lines = [(0, 2, 0.9), (-1, 0, 0.8), (2, -1, 0.7)];
        let (table, assembler) = assemble(&lines, 0.0);
        assert_eq!(contigs(&assembler), vec![vec![2, -1]]);
        assert_eq!(
            apcf_text(&table, &assembler),
            ">ANCESTOR\t2\n# APCF 1\n2 -1 $\n"
        );

        let mut out = vec![];
        write_joins(&mut out, assembler.chains()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0\t2\t0.9\n2\t-1\t0.7\n-1\t0\t0.8\n"
        );
    }

    #[test]
    fn test_insert_skips_chromosome_end_front() {
        let mut used = fxhash::FxHashSet::default();
        let mut chain = Chain::new(Edge::from_signed(0, 2));
        used.insert(2);

        // 2 0 meets the chromosome end at the front, and continues the back
        let result = insert_edge(&mut chain, Edge::from_signed(2, 0), &mut used);
        assert_eq!(result, Insertion::Accepted);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.elements(), vec![2]);
        assert!(used.contains(&-2));

        // Nothing attaches to a chain closed by chromosome ends
        let result = insert_edge(&mut chain, Edge::from_signed(0, 3), &mut used);
        assert_eq!(result, Insertion::NoMatch);
    }

    #[test]
    fn test_min_weight() {
        let (_, assembler) = assemble(&[(1, 2, 0.9), (2, 3, 0.3)], 0.5);
        assert_eq!(contigs(&assembler), vec![vec![1, 2]]);
        assert_eq!(
            assembler
                .report()
                .count(|o| *o == Outcome::BelowThreshold),
            2
        );
    }

    #[test]
    fn test_disjoint_ends_and_determinism() {
        let lines = [
            (1, 2, 0.6),
            (2, 3, 0.6),
            (3, 4, 0.6),
            (4, 1, 0.6),
            (1, -3, 0.6),
            (-2, 5, 0.4),
            (5, 6, 0.9),
            (6, -1, 0.2),
        ];
        let (_, first) = assemble(&lines, 0.0);
        let (_, second) = assemble(&lines, 0.0);
        assert_eq!(contigs(&first), contigs(&second));

        // No end of a block is used twice across all fragments
        let mut seen = std::collections::HashSet::new();
        for chain in first.chains() {
            for e in chain.edges() {
                for end in [e.end1(), e.end2()].into_iter().flatten() {
                    assert!(seen.insert(end), "end {} used twice", end);
                }
            }
        }

        // Every block appears at most once overall
        let mut blocks: Vec<i32> = contigs(&first)
            .into_iter()
            .flatten()
            .map(|x| x.abs())
            .collect();
        let total = blocks.len();
        blocks.sort_unstable();
        blocks.dedup();
        assert_eq!(blocks.len(), total);
    }
}
