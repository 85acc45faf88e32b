//! isoscan
//!
//! Long-read transcript structure matching and ORF discovery.
//! This crate decodes spliced alignments into exon structures (0-based,
//! half-open), compares structures against reference transcripts
//! (same-gene and splice-identity decisions, splice-site and exonic-region
//! membership in a transcript collection), finds open reading frames with
//! reference CDS reconciliation and Kozak context scoring, and maps
//! transcript-relative positions back to genomic coordinates.

pub mod compare;
pub mod coord;
pub mod decode;
pub mod model;
pub mod orf;
pub mod region;
pub mod stats;
pub mod types;

pub use types::{cmp_dist, transcript_length, ExonBlock, Strand};

pub use compare::{intersect_counts, is_same_gene, splice_identical, SameGeneParams};

pub use decode::{exons_from_cigar, parse_cigar, CigarOp};

pub use region::{exonic_overlap, merged_exonic_region, splice_site_membership};

pub use orf::{find_orfs, reverse_complement, KozakPwm, OrfCandidate, OrfParams, RefCdsMap};

pub use coord::{genomic_position, CoordError};

pub use model::{Gene, GeneId, Transcript, TranscriptId};
