use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use isoscan::{
    exons_from_cigar, find_orfs, intersect_counts, is_same_gene, parse_cigar, splice_identical,
    ExonBlock, KozakPwm, OrfParams, RefCdsMap, SameGeneParams,
};

/// Inspect transcript structures and open reading frames.
#[derive(Parser, Debug)]
#[command(name = "isoscan")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a cigar string into an exon structure
    Decode(DecodeArgs),

    /// Compare two exon structures
    Compare(CompareArgs),

    /// Find open reading frames in a nucleotide sequence
    Orfs(OrfsArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Cigar string, e.g. 50M200N30M
    #[arg(long, short)]
    cigar: String,

    /// Genomic start of the alignment (0-based)
    #[arg(long, short, default_value_t = 0)]
    offset: u32,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// First structure as start-end pairs, e.g. 100-200,300-400
    #[arg(long)]
    a: String,

    /// Second structure, same format
    #[arg(long)]
    b: String,

    /// Transcription start/end tolerance for splice identity (bp)
    #[arg(long, default_value_t = 100)]
    strictness: u32,

    /// Splice-junction IoU threshold for the same-gene test
    #[arg(long, default_value_t = 0.0)]
    spj_iou: f64,

    /// Exonic-region IoU threshold for the same-gene test
    #[arg(long, default_value_t = 0.5)]
    reg_iou: f64,
}

#[derive(Args, Debug)]
struct OrfsArgs {
    /// Nucleotide sequence (forward strand)
    #[arg(long, short)]
    seq: String,

    /// Start codons (repeatable)
    #[arg(long = "start-codon", value_name = "CODON", num_args = 1..,
          default_values_t = vec!["ATG".to_string()])]
    start_codons: Vec<String>,

    /// Stop codons (repeatable)
    #[arg(long = "stop-codon", value_name = "CODON", num_args = 1..,
          default_values_t = vec!["TAA".to_string(), "TAG".to_string(), "TGA".to_string()])]
    stop_codons: Vec<String>,

    /// Also report the Kozak context score of each start
    #[arg(long)]
    kozak: bool,
}

/// Parse "100-200,300-400" into an exon structure.
fn parse_blocks(s: &str) -> Result<Vec<ExonBlock>> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (start, end) = part
            .split_once('-')
            .with_context(|| format!("expected start-end, got '{part}'"))?;
        let start: u32 = start.trim().parse().with_context(|| format!("bad start in '{part}'"))?;
        let end: u32 = end.trim().parse().with_context(|| format!("bad end in '{part}'"))?;
        if start >= end {
            bail!("exon '{part}' has start >= end");
        }
        out.push(ExonBlock::new(start, end));
    }
    if out.is_empty() {
        bail!("no exons in '{s}'");
    }
    out.sort_by_key(|b| (b.start, b.end));
    Ok(out)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Decode(args) => {
            let ops = parse_cigar(&args.cigar)
                .with_context(|| format!("parsing cigar '{}'", args.cigar))?;
            let exons = exons_from_cigar(&ops, args.offset);
            println!("{} exons", exons.len());
            for (i, e) in exons.iter().enumerate() {
                println!("  exon {}: {}-{} ({} bp)", i + 1, e.start, e.end, e.len());
            }
        }

        Command::Compare(args) => {
            let a = parse_blocks(&args.a).context("parsing structure a")?;
            let b = parse_blocks(&args.b).context("parsing structure b")?;

            let (spj, bases) = intersect_counts(&a, &b);
            println!("shared splice sites: {spj}");
            println!("shared exonic bases: {bases}");

            let params = SameGeneParams {
                spj_iou_th: args.spj_iou,
                reg_iou_th: args.reg_iou,
            };
            println!("same gene:           {}", is_same_gene(&a, &b, &params));
            println!(
                "splice identical:    {}",
                splice_identical(&a, &b, args.strictness)
            );
        }

        Command::Orfs(args) => {
            let seq = args.seq.to_ascii_uppercase().into_bytes();
            let params = OrfParams {
                start_codons: args.start_codons,
                stop_codons: args.stop_codons,
            };
            let orfs = find_orfs(&seq, &params, &RefCdsMap::new());
            if orfs.is_empty() {
                println!("no open reading frames");
                return Ok(());
            }

            let pwm = KozakPwm::default();
            for orf in &orfs {
                let stop_codon = orf.stop_codon.as_deref().unwrap_or("-");
                let mut line = format!(
                    "orf {}: frame {} {}..{} {}/{} ({} bp)",
                    orf.uorf_index,
                    orf.frame,
                    orf.start,
                    orf.stop,
                    orf.start_codon,
                    stop_codon,
                    orf.len(),
                );
                if args.kozak {
                    line.push_str(&format!(" kozak {:.2}", pwm.score(&seq, orf.start)));
                }
                println!("{line}");
            }
        }
    }

    Ok(())
}
