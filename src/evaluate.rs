use crate::barcode::BarcodeExtractor;
use crate::consensus::consensus;
use crate::rcm::read_rcm;
use crate::stats::AbundanceSummary;

use anyhow::{bail, Context, Result};
use bio::alignment::distance::levenshtein;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

pub struct EvaluateOpts {
    /// Inclusive agreement-rate threshold for a "good" barcode.
    pub rate: f64,
    /// Print each barcode with its members' distances to the group consensus.
    pub distances: bool,
    /// Emit the report as JSON instead of text.
    pub json: bool,
}

#[derive(Error, Debug)]
pub enum EvaluateErr {
    #[error(
        "identifier mismatch at record {pos}:
  RCM file:   `{rcm_id}`
  reads file: `{read_id}`
the RCM and reads files must list the same reads in the same order"
    )]
    IdMismatch {
        pos: usize,
        rcm_id: String,
        read_id: String,
    },

    #[error("read count mismatch: the RCM file has {rcm} entries but the reads file has {reads} records")]
    CountMismatch { rcm: usize, reads: usize },

    #[error("invalid symbol `{symbol}` in read `{id}`: sequences must be over A/C/G/T")]
    InvalidSymbol { id: String, symbol: char },
}

#[derive(Debug, Serialize)]
pub struct PartitionReport {
    pub barcodes: usize,
    pub abundance: Option<AbundanceSummary>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub rate_threshold: f64,
    pub total_reads: usize,
    pub total_barcodes: usize,
    pub good: PartitionReport,
    pub bad: PartitionReport,
}

/// Reads sharing one barcode, and the cluster each was assigned to. Groups
/// are built only from observed reads and are therefore never empty.
struct BarcodeGroup {
    members: Vec<usize>,
    cliques: Vec<i64>,
}

/// The most frequent cluster label and its count. Ties go to the first label
/// reaching the maximum count in first-seen order.
fn majority(cliques: &[i64]) -> (i64, usize) {
    assert!(!cliques.is_empty(), "barcode group without reads");

    let mut counts: IndexMap<i64, usize> = IndexMap::new();
    for &clique in cliques {
        *counts.entry(clique).or_insert(0) += 1;
    }

    let mut best = (cliques[0], 0);
    for (&label, &count) in &counts {
        if count > best.1 {
            best = (label, count);
        }
    }
    best
}

/// Fraction of a group's reads assigned to the group's majority cluster.
pub fn agreement_rate(cliques: &[i64]) -> f64 {
    let (_, count) = majority(cliques);
    count as f64 / cliques.len() as f64
}

/// Levenshtein distance from each read's full, untruncated sequence to the
/// group consensus, in member order.
pub fn distances_to_consensus(seqs: &[&[u8]], cons: &[u8]) -> Vec<u32> {
    seqs.iter().map(|s| levenshtein(s, cons)).collect()
}

/// Loads the RCM entries and the companion reads file, checking that the two
/// sources enumerate the same identifiers in the same order. Sequences are
/// upper-cased; a symbol outside A/C/G/T is fatal.
fn load_correlated(rcm_path: &str, reads_path: &str) -> Result<(Vec<crate::rcm::RcmEntry>, Vec<Vec<u8>>)> {
    let entries = read_rcm(rcm_path)?;
    info!("Read {} RCM entries from {rcm_path}", entries.len());

    let mut reader = needletail::parse_fastx_file(reads_path)
        .with_context(|| format!("Unable to open reads file {reads_path}"))?;

    let mut seqs: Vec<Vec<u8>> = Vec::with_capacity(entries.len());
    while let Some(rec) = reader.next() {
        let rec = rec?;
        let id = String::from_utf8_lossy(rec.id()).to_string();
        let pos = seqs.len();

        let Some(entry) = entries.get(pos) else {
            bail!(EvaluateErr::CountMismatch {
                rcm: entries.len(),
                reads: pos + 1,
            });
        };
        if entry.id != id {
            bail!(EvaluateErr::IdMismatch {
                pos: pos + 1,
                rcm_id: entry.id.clone(),
                read_id: id,
            });
        }

        let seq = rec.seq().to_ascii_uppercase();
        if let Some(&symbol) = seq.iter().find(|b| !matches!(b, b'A' | b'C' | b'G' | b'T')) {
            bail!(EvaluateErr::InvalidSymbol {
                id,
                symbol: symbol as char,
            });
        }
        seqs.push(seq);
    }

    if seqs.len() != entries.len() {
        bail!(EvaluateErr::CountMismatch {
            rcm: entries.len(),
            reads: seqs.len(),
        });
    }

    Ok((entries, seqs))
}

/// Evaluates a clustering against barcode groups: reads are grouped by the
/// extracted barcode, each group's agreement rate is compared against the
/// threshold, and per-partition abundance statistics are written out.
pub fn evaluate(
    rcm_path: &str,
    reads_path: &str,
    extractor: &BarcodeExtractor,
    opts: &EvaluateOpts,
    writer: &mut impl Write,
) -> Result<EvaluationReport> {
    let (entries, seqs) = load_correlated(rcm_path, reads_path)?;

    // group by barcode, preserving first-seen order
    let mut groups: IndexMap<String, BarcodeGroup> = IndexMap::new();
    for (i, entry) in entries.iter().enumerate() {
        let barcode = extractor.extract(&entry.id)?;
        let group = groups.entry(barcode).or_insert_with(|| BarcodeGroup {
            members: Vec::new(),
            cliques: Vec::new(),
        });
        group.members.push(i);
        group.cliques.push(entry.clique);
    }
    info!("Grouped {} reads into {} barcodes", seqs.len(), groups.len());

    if opts.distances {
        for (barcode, group) in &groups {
            let member_seqs: Vec<&[u8]> =
                group.members.iter().map(|&i| seqs[i].as_slice()).collect();

            // a group with no usable sequence has nothing to compare against
            let Some(cons) = consensus(&member_seqs) else {
                continue;
            };

            let dists = distances_to_consensus(&member_seqs, &cons);
            writeln!(writer, "{}\t{}", barcode, dists.iter().join(" "))?;
        }
    }

    let mut good = Vec::new();
    let mut bad = Vec::new();
    for group in groups.values() {
        let rate = agreement_rate(&group.cliques);
        if rate >= opts.rate {
            good.push(group.members.len());
        } else {
            bad.push(group.members.len());
        }
    }

    let report = EvaluationReport {
        rate_threshold: opts.rate,
        total_reads: seqs.len(),
        total_barcodes: groups.len(),
        good: PartitionReport {
            barcodes: good.len(),
            abundance: AbundanceSummary::from_counts(&good),
        },
        bad: PartitionReport {
            barcodes: bad.len(),
            abundance: AbundanceSummary::from_counts(&bad),
        },
    };

    if opts.json {
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
    } else {
        write_text_report(writer, &report)?;
    }

    Ok(report)
}

fn write_text_report(writer: &mut impl Write, report: &EvaluationReport) -> Result<()> {
    for (label, partition) in [("Good", &report.good), ("Bad", &report.bad)] {
        writeln!(writer, "{} barcodes: {}", label, partition.barcodes)?;
        match &partition.abundance {
            Some(summary) => writeln!(writer, "{summary}")?,
            None => writeln!(writer, "no barcodes")?,
        }
    }
    Ok(())
}
