//! Membership queries of a new transcript against a transcript collection.
//!
//! All queries run as coordinate-sorted merge-joins with persistent cursors
//! per stream, never as all-pairs scans, so they stay near-linear even for
//! gene models with hundreds of transcripts.

use std::collections::BTreeMap;

use crate::types::ExonBlock;

/// Merge the exon sets of a transcript collection into exonic regions.
///
/// All exon starts and all exon ends are sorted independently; the k-th
/// smallest start is paired with the k-th smallest end, and a region extends
/// the previous one when its start does not pass the current region end.
/// This start/end pairing is not a geometric interval union; it only agrees
/// with one when every exon is well-formed (start < end). The pairing is
/// kept as is because gene/transcript identity decisions downstream were
/// calibrated against it (see the pinning test below).
pub fn merged_exonic_region(transcripts: &[&[ExonBlock]]) -> Vec<ExonBlock> {
    let mut starts: Vec<u32> = transcripts
        .iter()
        .flat_map(|t| t.iter().map(|e| e.start))
        .collect();
    let mut ends: Vec<u32> = transcripts
        .iter()
        .flat_map(|t| t.iter().map(|e| e.end))
        .collect();
    if starts.is_empty() {
        return Vec::new();
    }
    starts.sort_unstable();
    ends.sort_unstable();

    let mut region: Vec<(u32, u32)> = vec![(starts[0], ends[0])];
    for (k, &next_start) in starts.iter().enumerate().skip(1) {
        let last = region.last_mut().unwrap();
        if next_start <= last.1 {
            last.1 = ends[k];
        } else {
            region.push((next_start, ends[k]));
        }
    }

    region
        .into_iter()
        .map(|(start, end)| ExonBlock { start, end })
        .collect()
}

/// Exonic overlap of a new transcript with a transcript collection.
///
/// The merged exonic region is computed once, then walked in lockstep with
/// `exons` (both ascending), accumulating overlap lengths. Returns 0 for an
/// empty collection.
pub fn exonic_overlap(exons: &[ExonBlock], transcripts: &[&[ExonBlock]]) -> u64 {
    if transcripts.is_empty() {
        return 0;
    }
    let region = merged_exonic_region(transcripts);
    if region.is_empty() {
        return 0;
    }

    let mut ol = 0u64;
    let mut i = 0;
    for exon in exons {
        // regions entirely before this exon: go on
        while region[i].end < exon.start {
            i += 1;
            if i == region.len() {
                return ol;
            }
        }
        while region[i].start < exon.end {
            ol += u64::from(region[i].overlap_length(*exon));
            if region[i].end > exon.end {
                // might overlap with the next exon
                break;
            }
            i += 1;
            if i == region.len() {
                return ol;
            }
        }
    }
    ol
}

/// Check which splice sites of a candidate are already used as exon
/// boundaries in a transcript collection.
///
/// For junction i, bit `2 * i` is set iff some multi-exon transcript has a
/// non-final exon ending exactly at the junction's donor position, and bit
/// `2 * i + 1` iff some transcript has a non-first exon starting exactly at
/// the acceptor position.
pub fn splice_site_membership(
    junctions: &[(u32, u32)],
    transcripts: &[&[ExonBlock]],
) -> Vec<bool> {
    let mut sites = vec![false; junctions.len() * 2];

    // group junction indices by coordinate, sorted for the merge-join
    let mut donors: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    let mut acceptors: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, &(donor, acceptor)) in junctions.iter().enumerate() {
        donors.entry(donor).or_default().push(i);
        acceptors.entry(acceptor).or_default().push(i);
    }

    let spliced: Vec<&[ExonBlock]> = transcripts
        .iter()
        .filter(|t| t.len() > 1)
        .copied()
        .collect();

    // exon ends, excluding each transcript's final exon
    let mut cursors: Vec<usize> = vec![0; spliced.len()];
    for (&pos, idx) in &donors {
        for (t, exons) in spliced.iter().enumerate() {
            let limit = exons.len() - 1;
            while cursors[t] < limit && pos > exons[cursors[t]].end {
                cursors[t] += 1;
            }
            if cursors[t] < limit && exons[cursors[t]].end == pos {
                for &i in idx {
                    sites[i * 2] = true;
                }
                break;
            }
        }
    }

    // exon starts, excluding each transcript's first exon
    let mut cursors: Vec<usize> = vec![1; spliced.len()];
    for (&pos, idx) in &acceptors {
        for (t, exons) in spliced.iter().enumerate() {
            while cursors[t] < exons.len() && pos > exons[cursors[t]].start {
                cursors[t] += 1;
            }
            if cursors[t] < exons.len() && exons[cursors[t]].start == pos {
                for &i in idx {
                    sites[i * 2 + 1] = true;
                }
                break;
            }
        }
    }

    sites
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(coords: &[(u32, u32)]) -> Vec<ExonBlock> {
        coords.iter().map(|&(s, e)| ExonBlock::new(s, e)).collect()
    }

    #[test]
    fn merged_region_of_disjoint_transcripts() {
        let t1 = blocks(&[(0, 10), (20, 30)]);
        let t2 = blocks(&[(100, 120)]);
        let region = merged_exonic_region(&[&t1, &t2]);
        assert_eq!(region, blocks(&[(0, 10), (20, 30), (100, 120)]));
    }

    #[test]
    fn merged_region_joins_overlapping_exons() {
        let t1 = blocks(&[(0, 50), (100, 150)]);
        let t2 = blocks(&[(40, 110)]);
        let region = merged_exonic_region(&[&t1, &t2]);
        assert_eq!(region, blocks(&[(0, 150)]));
    }

    #[test]
    fn merged_region_empty_collection() {
        assert!(merged_exonic_region(&[]).is_empty());
        let empty: Vec<ExonBlock> = Vec::new();
        assert!(merged_exonic_region(&[&empty]).is_empty());
    }

    #[test]
    fn merged_region_pins_start_end_pairing() {
        // A fully nested exon: the pairing consumes the inner end first and
        // the outer end closes the region. This pins the start/end pairing
        // outcome; if it starts failing, the merge algorithm changed.
        let t1 = blocks(&[(0, 100)]);
        let t2 = blocks(&[(10, 20)]);
        let region = merged_exonic_region(&[&t1, &t2]);
        assert_eq!(region, blocks(&[(0, 100)]));

        // interleaved nesting across three transcripts
        let t3 = blocks(&[(0, 10), (20, 200)]);
        let t4 = blocks(&[(30, 40)]);
        let region = merged_exonic_region(&[&t3, &t4]);
        assert_eq!(region, blocks(&[(0, 10), (20, 200)]));
    }

    #[test]
    fn overlap_against_collection() {
        let t1 = blocks(&[(0, 50), (100, 150)]);
        let t2 = blocks(&[(0, 50), (200, 250)]);
        let transcripts: Vec<&[ExonBlock]> = vec![&t1, &t2];

        let new = blocks(&[(10, 60), (100, 150)]);
        // [10,50) on the merged first region, [100,150) exact
        assert_eq!(exonic_overlap(&new, &transcripts), 40 + 50);
    }

    #[test]
    fn overlap_empty_inputs() {
        let t1 = blocks(&[(0, 50)]);
        let transcripts: Vec<&[ExonBlock]> = vec![&t1];
        assert_eq!(exonic_overlap(&[], &transcripts), 0);

        let new = blocks(&[(0, 50)]);
        assert_eq!(exonic_overlap(&new, &[]), 0);
    }

    #[test]
    fn overlap_exon_spanning_several_regions() {
        let t1 = blocks(&[(0, 10), (20, 30), (40, 50)]);
        let transcripts: Vec<&[ExonBlock]> = vec![&t1];
        let new = blocks(&[(5, 45)]);
        assert_eq!(exonic_overlap(&new, &transcripts), 5 + 10 + 5);
    }

    #[test]
    fn overlap_new_exons_past_collection() {
        let t1 = blocks(&[(0, 10)]);
        let transcripts: Vec<&[ExonBlock]> = vec![&t1];
        let new = blocks(&[(5, 10), (100, 200)]);
        assert_eq!(exonic_overlap(&new, &transcripts), 5);
    }

    #[test]
    fn splice_sites_found_in_collection() {
        let t1 = blocks(&[(0, 10), (20, 30), (40, 50)]);
        let transcripts: Vec<&[ExonBlock]> = vec![&t1];

        // first junction matches t1's (10, 20) junction on both sides,
        // second is entirely novel
        let result = splice_site_membership(&[(10, 20), (33, 37)], &transcripts);
        assert_eq!(result, vec![true, true, false, false]);
    }

    #[test]
    fn splice_sites_outer_boundaries_do_not_count() {
        let t1 = blocks(&[(0, 10), (20, 30)]);
        let transcripts: Vec<&[ExonBlock]> = vec![&t1];

        // donor at t1's transcript end (30) and acceptor at its transcript
        // start (0) are not splice sites
        let result = splice_site_membership(&[(30, 60), (60, 70)], &transcripts);
        assert_eq!(result, vec![false, false, false, false]);
        let result = splice_site_membership(&[(10, 20)], &transcripts);
        assert_eq!(result, vec![true, true]);
    }

    #[test]
    fn splice_sites_single_exon_transcripts_ignored() {
        let t1 = blocks(&[(0, 100)]);
        let transcripts: Vec<&[ExonBlock]> = vec![&t1];
        let result = splice_site_membership(&[(100, 200)], &transcripts);
        assert_eq!(result, vec![false, false]);
    }

    #[test]
    fn splice_sites_mixed_hits_across_transcripts() {
        let t1 = blocks(&[(0, 10), (20, 30)]);
        let t2 = blocks(&[(0, 15), (40, 60)]);
        let transcripts: Vec<&[ExonBlock]> = vec![&t1, &t2];

        // donor 15 comes from t2, acceptor 20 from t1
        let result = splice_site_membership(&[(15, 20)], &transcripts);
        assert_eq!(result, vec![true, true]);
    }

    #[test]
    fn splice_sites_duplicate_junction_positions() {
        let t1 = blocks(&[(0, 10), (20, 30)]);
        let transcripts: Vec<&[ExonBlock]> = vec![&t1];
        let result = splice_site_membership(&[(10, 20), (10, 25)], &transcripts);
        assert_eq!(result, vec![true, true, true, false]);
    }
}
