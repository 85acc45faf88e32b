use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::compare::{self, SameGeneParams};
use crate::coord::{self, CoordError};
use crate::model::types::TranscriptId;
use crate::types::{transcript_length, ExonBlock, Strand};

/// One transcript: identifier, display names/aliases and its exon structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: TranscriptId,
    pub names: Vec<String>,
    pub strand: Strand,
    exons: Vec<ExonBlock>,
    finalized: bool,
}

impl Transcript {
    pub fn new(id: TranscriptId, primary_name: impl Into<String>, strand: Strand) -> Self {
        Self {
            id,
            names: vec![primary_name.into()],
            strand,
            exons: Vec::new(),
            finalized: false,
        }
    }

    pub fn add_name(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(|s| s.as_str())
    }

    pub fn add_exon(&mut self, block: ExonBlock) {
        self.exons.push(block);
        self.finalized = false;
    }

    pub fn exons(&self) -> &[ExonBlock] {
        &self.exons
    }

    pub fn exon_count(&self) -> usize {
        self.exons.len()
    }

    /// Summed exonic length.
    pub fn length(&self) -> u32 {
        transcript_length(&self.exons)
    }

    /// Sort exons and merge overlaps/adjacent; returns (start, end) of the
    /// resulting span.
    ///
    /// This makes comparisons stable and guards against messy upstream
    /// exon creation.
    pub fn finalize(&mut self) -> (u32, u32) {
        if self.exons.is_empty() {
            self.finalized = true;
            return (0, 0);
        }

        self.exons.sort_by_key(|b| (b.start, b.end));

        let mut merged: Vec<ExonBlock> = Vec::with_capacity(self.exons.len());
        let mut cur = self.exons[0];

        for &b in &self.exons[1..] {
            if b.start <= cur.end {
                cur.end = cur.end.max(b.end);
            } else {
                merged.push(cur);
                cur = b;
            }
        }
        merged.push(cur);

        self.exons = merged;
        self.finalized = true;

        let start = self.exons.first().unwrap().start;
        let end = self.exons.last().unwrap().end;
        (start, end)
    }

    pub fn span(&self) -> Option<(u32, u32)> {
        if self.exons.is_empty() {
            return None;
        }
        Some((self.exons.first().unwrap().start, self.exons.last().unwrap().end))
    }

    /// Splice junctions implied by the exon structure.
    pub fn junctions(&self) -> Vec<(u32, u32)> {
        ExonBlock::junctions_from_blocks(&self.exons, 0)
    }

    /// Intersecting splice sites and bases against another transcript.
    pub fn intersect_counts(&self, other: &Transcript) -> (u32, u64) {
        compare::intersect_counts(&self.exons, &other.exons)
    }

    /// Same-gene decision against another transcript.
    pub fn same_gene(&self, other: &Transcript, params: &SameGeneParams) -> bool {
        compare::is_same_gene(&self.exons, &other.exons, params)
    }

    /// Splice-site identity against another structure, with `strictness`
    /// bases of transcription start/end tolerance.
    pub fn splice_identical(&self, exons: &[ExonBlock], strictness: u32) -> bool {
        compare::splice_identical(&self.exons, exons, strictness)
    }

    /// Map transcript-relative positions to genomic coordinates, honoring
    /// the strand.
    pub fn genomic_position(&self, tr_pos: &[u32]) -> Result<HashMap<u32, u32>, CoordError> {
        coord::genomic_position(tr_pos, &self.exons, self.strand.is_reverse())
    }
}
