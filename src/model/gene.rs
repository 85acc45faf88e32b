use serde::{Deserialize, Serialize};

use crate::model::transcript::Transcript;
use crate::model::types::GeneId;
use crate::region;
use crate::types::ExonBlock;

/// Gene model: one or more names/aliases and the known transcripts.
///
/// Notes:
/// - `names[0]` is treated as the primary name (if present).
/// - additional names are aliases (deduped).
/// - membership queries treat the owned transcripts as the current state of
///   the gene; candidates are compared against all of them at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub id: GeneId,
    pub names: Vec<String>,
    transcripts: Vec<Transcript>,
}

impl Gene {
    pub fn new(id: GeneId, primary_name: impl Into<String>) -> Self {
        Self {
            id,
            names: vec![primary_name.into()],
            transcripts: Vec::new(),
        }
    }

    /// Add an alias/alternative name (deduped).
    pub fn add_name(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    /// Primary name (if any).
    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(|s| s.as_str())
    }

    pub fn add_transcript(&mut self, transcript: Transcript) {
        self.transcripts.push(transcript);
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    /// Finalize all transcripts and order them by span for stable queries.
    pub fn finalize(&mut self) {
        for tx in &mut self.transcripts {
            tx.finalize();
        }
        self.transcripts.sort_by_key(|t| t.span());
    }

    /// Span covered by any transcript (min start, max end).
    pub fn span(&self) -> Option<(u32, u32)> {
        let mut out: Option<(u32, u32)> = None;
        for tx in &self.transcripts {
            if let Some((s, e)) = tx.span() {
                out = Some(match out {
                    None => (s, e),
                    Some((os, oe)) => (os.min(s), oe.max(e)),
                });
            }
        }
        out
    }

    fn exon_lists(&self) -> Vec<&[ExonBlock]> {
        self.transcripts.iter().map(|t| t.exons()).collect()
    }

    /// Merged exonic footprint over all transcripts.
    pub fn merged_exonic_region(&self) -> Vec<ExonBlock> {
        region::merged_exonic_region(&self.exon_lists())
    }

    /// Exonic overlap of a candidate structure with this gene's footprint.
    pub fn exonic_overlap(&self, exons: &[ExonBlock]) -> u64 {
        region::exonic_overlap(exons, &self.exon_lists())
    }

    /// Which of the candidate junctions' donor/acceptor sites are already
    /// exon boundaries in this gene (see [`region::splice_site_membership`]).
    pub fn splice_site_membership(&self, junctions: &[(u32, u32)]) -> Vec<bool> {
        region::splice_site_membership(junctions, &self.exon_lists())
    }

    /// First known transcript that is splice-identical to the candidate
    /// structure, if any.
    pub fn find_splice_identical(
        &self,
        exons: &[ExonBlock],
        strictness: u32,
    ) -> Option<&Transcript> {
        self.transcripts
            .iter()
            .find(|t| t.splice_identical(exons, strictness))
    }
}
