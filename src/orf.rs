//! Open reading frame discovery on transcript sequences.
//!
//! Scans all three forward reading frames for start/stop codon matches,
//! reconciles candidate starts against annotated reference CDS positions
//! (which always take priority and are never subsumed by a surrounding ORF),
//! and optionally scores translation-initiation context with a position
//! weight matrix.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Codon sets used for ORF scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrfParams {
    pub start_codons: Vec<String>,
    pub stop_codons: Vec<String>,
}

impl Default for OrfParams {
    fn default() -> Self {
        Self {
            start_codons: vec!["ATG".into()],
            stop_codons: vec!["TAA".into(), "TAG".into(), "TGA".into()],
        }
    }
}

/// Map from 0-based CDS start offset to the reference transcript ids whose
/// annotated CDS begins there. Supplied by the caller, read-only.
pub type RefCdsMap = HashMap<usize, Vec<String>>;

/// One candidate open reading frame.
///
/// `start`/`stop` are 0-based transcript-relative offsets; `stop` points
/// just past the stop codon, or equals `start` for an open-ended ORF
/// (`stop_codon` is `None` in that case).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrfCandidate {
    pub start: usize,
    pub stop: usize,
    pub frame: usize,
    pub start_codon: String,
    pub stop_codon: Option<String>,
    /// Rank of this ORF by start position among all ORFs found for the
    /// sequence (across all frames), not a count of same-frame upstream
    /// ORFs.
    pub uorf_index: usize,
    /// Reference transcript ids with a matching CDS initiation site, if any.
    pub ref_ids: Option<Vec<String>>,
}

impl OrfCandidate {
    /// Coding length in nucleotides; 0 for open-ended ORFs.
    pub fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    pub fn is_open_ended(&self) -> bool {
        self.stop_codon.is_none()
    }
}

/// Find all open reading frames on the forward strand of `seq`.
///
/// Candidate starts are all codon matches plus all reference CDS positions
/// (de-duplicated, reference wins). Within each frame, starts are processed
/// in ascending order: a non-reference start inside the previously reported
/// ORF is subsumed and skipped, a reference start never is. The matching
/// stop is the first in-frame stop codon ending strictly after the start;
/// without one the ORF is open-ended. The combined result is sorted by
/// (start, frame, stop) and `uorf_index` is the rank in that order.
pub fn find_orfs(seq: &[u8], params: &OrfParams, ref_cds: &RefCdsMap) -> Vec<OrfCandidate> {
    // per-frame candidate starts: (position, codon, reference ids)
    let mut starts: [Vec<(usize, String, Option<Vec<String>>)>; 3] = Default::default();
    // per-frame stops: (codon end, codon), framed by the codon *start*
    let mut stops: [Vec<(usize, String)>; 3] = Default::default();

    for (&init, ids) in ref_cds {
        if init >= seq.len() {
            continue;
        }
        let end = (init + 3).min(seq.len());
        let codon = String::from_utf8_lossy(&seq[init..end]).into_owned();
        starts[init % 3].push((init, codon, Some(ids.clone())));
    }

    for pos in 0..seq.len() {
        if !ref_cds.contains_key(&pos) {
            for codon in &params.start_codons {
                if seq[pos..].starts_with(codon.as_bytes()) {
                    starts[pos % 3].push((pos, codon.clone(), None));
                    break;
                }
            }
        }
        for codon in &params.stop_codons {
            if seq[pos..].starts_with(codon.as_bytes()) {
                stops[pos % 3].push((pos + codon.len(), codon.clone()));
                break;
            }
        }
    }

    let mut orfs: Vec<OrfCandidate> = Vec::new();
    for frame in 0..3 {
        let mut frame_starts = std::mem::take(&mut starts[frame]);
        frame_starts.sort_by_key(|s| s.0);
        let mut frame_stops = std::mem::take(&mut stops[frame]);
        frame_stops.sort();

        let mut open_stop = 0usize;
        let mut si = 0usize;
        for (start, start_codon, ref_ids) in frame_starts {
            // inframe start within the previous ORF
            if start < open_stop && ref_ids.is_none() {
                continue;
            }
            // starts are ascending, so the matching stop index never moves
            // backwards
            while si < frame_stops.len() && frame_stops[si].0 <= start {
                si += 1;
            }
            match frame_stops.get(si) {
                Some((stop, stop_codon)) => {
                    open_stop = *stop;
                    orfs.push(OrfCandidate {
                        start,
                        stop: *stop,
                        frame,
                        start_codon,
                        stop_codon: Some(stop_codon.clone()),
                        uorf_index: 0,
                        ref_ids,
                    });
                }
                // no stop codon: still report, it might be an uAUG
                None => {
                    open_stop = start;
                    orfs.push(OrfCandidate {
                        start,
                        stop: start,
                        frame,
                        start_codon,
                        stop_codon: None,
                        uorf_index: 0,
                        ref_ids,
                    });
                }
            }
        }
    }

    orfs.sort_by(|a, b| {
        (a.start, a.frame, a.stop).cmp(&(b.start, b.frame, b.stop))
    });
    for (rank, orf) in orfs.iter_mut().enumerate() {
        orf.uorf_index = rank;
    }
    orfs
}

/// Start codon context frequencies from Kozak et al., NAR 1987.
/// Rows are the offsets -12..-1 and +3 relative to the start codon,
/// columns A, C, G, T (percent).
const KOZAK_COUNTS: [[u32; 4]; 13] = [
    [23, 35, 23, 19],
    [26, 35, 21, 18],
    [25, 35, 22, 18],
    [23, 26, 33, 18],
    [19, 39, 23, 19],
    [23, 37, 20, 20],
    [17, 19, 44, 20],
    [18, 39, 23, 20],
    [25, 53, 15, 7],
    [61, 2, 36, 1],
    [27, 49, 13, 11],
    [15, 55, 21, 9],
    [23, 16, 46, 15],
];

/// Offsets scored by the PWM, relative to the start codon position.
pub const KOZAK_OFFSETS: [i32; 13] = [-12, -11, -10, -9, -8, -7, -6, -5, -4, -3, -2, -1, 3];

/// Log-odds position weight matrix for translation-initiation context.
///
/// One weight per (offset, symbol) with symbols A, C, G, T, N; the N row is
/// zero. Construct once and pass explicitly into scoring calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KozakPwm {
    weights: [[f64; 5]; 13],
}

impl Default for KozakPwm {
    fn default() -> Self {
        Self::from_counts(&KOZAK_COUNTS)
    }
}

impl KozakPwm {
    /// Build log2-odds weights from per-offset base percentages against the
    /// overall base composition of the table.
    pub fn from_counts(counts: &[[u32; 4]; 13]) -> Self {
        let total: f64 = counts.iter().flatten().map(|&c| f64::from(c)).sum();
        let mut bg = [0.0f64; 4];
        for row in counts {
            for (j, &c) in row.iter().enumerate() {
                bg[j] += f64::from(c) / total;
            }
        }

        let mut weights = [[0.0f64; 5]; 13];
        for (i, row) in counts.iter().enumerate() {
            for (j, &c) in row.iter().enumerate() {
                weights[i][j] = (f64::from(c) / 100.0 / bg[j]).log2();
            }
            // N column stays 0
        }
        Self { weights }
    }

    fn symbol_index(base: u8) -> usize {
        match base {
            b'A' | b'a' => 0,
            b'C' | b'c' => 1,
            b'G' | b'g' => 2,
            b'T' | b't' => 3,
            _ => 4,
        }
    }

    /// Score the context around a start codon at `pos`.
    ///
    /// Offsets falling outside the sequence contribute zero; unknown bases
    /// inside the sequence use the N row.
    pub fn score(&self, seq: &[u8], pos: usize) -> f64 {
        let mut sum = 0.0;
        for (k, &off) in KOZAK_OFFSETS.iter().enumerate() {
            let idx = pos as i64 + i64::from(off);
            if idx >= 0 && (idx as usize) < seq.len() {
                sum += self.weights[k][Self::symbol_index(seq[idx as usize])];
            }
        }
        sum
    }
}

/// Reverse complement of a nucleotide sequence.
/// Bases other than ACGT complement to N.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&b| match b {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            _ => b'N',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(seq: &[u8]) -> Vec<OrfCandidate> {
        find_orfs(seq, &OrfParams::default(), &RefCdsMap::new())
    }

    #[test]
    fn no_start_codon_no_orfs() {
        assert!(find(b"CCCGGGTTTCCC").is_empty());
        assert!(find(b"").is_empty());
    }

    #[test]
    fn single_complete_orf() {
        let orfs = find(b"ATGAAATAG");
        assert_eq!(orfs.len(), 1);
        let orf = &orfs[0];
        assert_eq!(orf.start, 0);
        assert_eq!(orf.stop, 9);
        assert_eq!(orf.frame, 0);
        assert_eq!(orf.start_codon, "ATG");
        assert_eq!(orf.stop_codon.as_deref(), Some("TAG"));
        assert_eq!(orf.uorf_index, 0);
        assert!(orf.ref_ids.is_none());
        assert_eq!(orf.len(), 9);
    }

    #[test]
    fn open_ended_orf_reports_start_as_stop() {
        let orfs = find(b"ATGAAACCC");
        assert_eq!(orfs.len(), 1);
        assert_eq!(orfs[0].start, 0);
        assert_eq!(orfs[0].stop, 0);
        assert!(orfs[0].stop_codon.is_none());
        assert!(orfs[0].is_open_ended());
    }

    #[test]
    fn nested_start_is_subsumed() {
        // second ATG at position 3 lies inside the first ORF and is skipped
        let orfs = find(b"ATGATGAAATAG");
        assert_eq!(orfs.len(), 1);
        assert_eq!(orfs[0].start, 0);
        assert_eq!(orfs[0].stop, 12);
    }

    #[test]
    fn consecutive_orfs_in_one_frame() {
        let orfs = find(b"ATGAAATAAATGCCCTAG");
        let frame0: Vec<_> = orfs.iter().filter(|o| o.frame == 0).collect();
        assert_eq!(frame0.len(), 2);
        assert_eq!((frame0[0].start, frame0[0].stop), (0, 9));
        assert_eq!((frame0[1].start, frame0[1].stop), (9, 18));
    }

    #[test]
    fn orfs_found_in_all_frames() {
        // frame 1 ORF: ATG at 1, TGA at 7 (ends 10)
        let orfs = find(b"AATGAAATGAC");
        let frame1: Vec<_> = orfs.iter().filter(|o| o.frame == 1).collect();
        assert_eq!(frame1.len(), 1);
        assert_eq!((frame1[0].start, frame1[0].stop), (1, 10));
    }

    #[test]
    fn stop_codon_out_of_frame_is_ignored() {
        // TAA at position 4 is frame 1; the frame-0 ORF runs open-ended
        let orfs = find(b"ATGATAACCC");
        let frame0: Vec<_> = orfs.iter().filter(|o| o.frame == 0).collect();
        assert_eq!(frame0.len(), 1);
        assert!(frame0[0].stop_codon.is_none());
    }

    #[test]
    fn uorf_index_ranks_across_frames() {
        // ATG at 0 (frame 0) and ATG at 4 (frame 1)
        let orfs = find(b"ATGCATGCCC");
        assert!(orfs.len() >= 2);
        for (rank, orf) in orfs.iter().enumerate() {
            assert_eq!(orf.uorf_index, rank);
        }
        assert!(orfs.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn reference_start_never_subsumed() {
        // without annotation, the ATG at 3 is subsumed by the ORF from 0
        let seq = b"ATGATGAAATAG";
        let mut ref_cds = RefCdsMap::new();
        ref_cds.insert(3, vec!["tx1".into()]);

        let orfs = find_orfs(seq, &OrfParams::default(), &ref_cds);
        assert_eq!(orfs.len(), 2);
        assert_eq!(orfs[0].start, 0);
        assert!(orfs[0].ref_ids.is_none());
        assert_eq!(orfs[1].start, 3);
        assert_eq!(orfs[1].stop, 12);
        assert_eq!(orfs[1].ref_ids.as_deref(), Some(&["tx1".to_string()][..]));
    }

    #[test]
    fn reference_position_wins_over_codon_match() {
        // position 0 is both a codon match and an annotated CDS start; it
        // must be reported once, with the reference ids attached
        let seq = b"ATGAAATAG";
        let mut ref_cds = RefCdsMap::new();
        ref_cds.insert(0, vec!["tx1".into(), "tx2".into()]);

        let orfs = find_orfs(seq, &OrfParams::default(), &ref_cds);
        assert_eq!(orfs.len(), 1);
        assert_eq!(orfs[0].ref_ids.as_ref().map(|v| v.len()), Some(2));
        assert_eq!(orfs[0].start_codon, "ATG");
    }

    #[test]
    fn reference_start_with_non_start_codon() {
        // annotated initiation sites are candidate starts even where no
        // start codon matches
        let seq = b"CTGAAATAG";
        let mut ref_cds = RefCdsMap::new();
        ref_cds.insert(0, vec!["tx1".into()]);

        let orfs = find_orfs(seq, &OrfParams::default(), &ref_cds);
        assert_eq!(orfs.len(), 1);
        assert_eq!(orfs[0].start_codon, "CTG");
        assert_eq!(orfs[0].stop, 9);
    }

    #[test]
    fn alternative_start_codons() {
        let params = OrfParams {
            start_codons: vec!["ATG".into(), "GTG".into()],
            ..OrfParams::default()
        };
        let orfs = find_orfs(b"GTGAAATAA", &params, &RefCdsMap::new());
        assert_eq!(orfs.len(), 1);
        assert_eq!(orfs[0].start_codon, "GTG");
    }

    #[test]
    fn kozak_pwm_prefers_consensus_context() {
        let pwm = KozakPwm::default();
        // GCCACCATGG: strong Kozak context (A at -3 is scored via the -3
        // row, G at +3 via the +3 row)
        let strong = b"GCCGCCGCCACCATGG";
        let weak = b"TTTTTTTTTTTTATGT";
        let pos = 12;
        assert!(pwm.score(strong, pos) > pwm.score(weak, pos));
    }

    #[test]
    fn kozak_score_out_of_bounds_contributes_zero() {
        let pwm = KozakPwm::default();
        // at position 0 every upstream offset is out of bounds; only +3
        // remains
        let seq = b"ATGG";
        let expected = pwm.score(b"NNNNNNNNNNNNATGG", 12);
        assert!((pwm.score(seq, 0) - expected).abs() < 1e-12);
    }

    #[test]
    fn kozak_unknown_bases_score_zero_weight() {
        let pwm = KozakPwm::default();
        // all-N context scores 0 through the N column
        let seq = b"NNNNNNNNNNNNATGN";
        assert!((pwm.score(seq, 12)).abs() < 1e-12);
    }

    #[test]
    fn reverse_complement_maps_unknown_to_n() {
        assert_eq!(reverse_complement(b"ATGC"), b"GCAT");
        assert_eq!(reverse_complement(b"AANTT"), b"AANTT");
        assert_eq!(reverse_complement(b""), b"");
    }
}
