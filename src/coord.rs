//! Mapping transcript-relative positions back to genomic coordinates.

use std::collections::HashMap;

use crate::types::{transcript_length, ExonBlock};

/// Errors from coordinate mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    /// A requested position lies beyond the transcript's exonic length.
    PositionBeyondTranscript { pos: u32, transcript_len: u32 },
    /// The transcript has no exons to map against.
    EmptyStructure,
}

impl std::fmt::Display for CoordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordError::PositionBeyondTranscript { pos, transcript_len } => write!(
                f,
                "requested position {} for transcript of length {}",
                pos, transcript_len
            ),
            CoordError::EmptyStructure => write!(f, "cannot map positions on an empty structure"),
        }
    }
}

impl std::error::Error for CoordError {}

/// Map transcript-relative positions to genomic coordinates.
///
/// `tr_pos` are 0-based offsets into the spliced transcript sequence; the
/// exon layout supplies the intron lengths to skip. On the reverse strand,
/// positions are reflected against the transcript length before mapping and
/// the returned map is keyed by the original positions. Positions are
/// de-duplicated; a position may equal the transcript length (one past the
/// last exonic base). Any position beyond that fails eagerly with a range
/// error.
pub fn genomic_position(
    tr_pos: &[u32],
    exons: &[ExonBlock],
    reverse_strand: bool,
) -> Result<HashMap<u32, u32>, CoordError> {
    if exons.is_empty() {
        return Err(CoordError::EmptyStructure);
    }
    let tr_len = transcript_length(exons);
    for &p in tr_pos {
        if p > tr_len {
            return Err(CoordError::PositionBeyondTranscript {
                pos: p,
                transcript_len: tr_len,
            });
        }
    }

    let mut work: Vec<u32> = if reverse_strand {
        tr_pos.iter().map(|&p| tr_len - p).collect()
    } else {
        tr_pos.to_vec()
    };
    work.sort_unstable();
    work.dedup();

    let offset = exons[0].start;
    let mut intron_len: u32 = 0;
    let mut mapped: Vec<u32> = Vec::with_capacity(work.len());
    let mut i = 0;

    'exons: for w in exons.windows(2) {
        let (e1, e2) = (w[0], w[1]);
        while i < work.len() && offset + intron_len + work[i] < e1.end {
            mapped.push(offset + intron_len + work[i]);
            i += 1;
        }
        if i == work.len() {
            break 'exons;
        }
        intron_len += e2.start - e1.end;
    }
    // remaining positions fall into the last exon (or just past it)
    for &p in &work[i..] {
        mapped.push(offset + intron_len + p);
    }

    let mut out = HashMap::with_capacity(work.len());
    for (&w, &m) in work.iter().zip(&mapped) {
        let key = if reverse_strand { tr_len - w } else { w };
        out.insert(key, m);
    }
    Ok(out)
}
