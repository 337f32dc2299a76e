use crate::io::{write_record, SeqFormat};
use crate::rcm::{write_rcm, RcmEntry};
use crate::simulate::random_quality;

use anyhow::{bail, Context, Result};
use rand::rngs::SmallRng;
use regex::Regex;
use std::io::Write;
use thiserror::Error;

/// Identifier format used by the repertoire simulator.
const SIMULATED_ID_PATTERN: &str = r"^antibody_(\d+)_multiplicity_(\d+)_copy_(\d+)$";

#[derive(Error, Debug)]
pub enum ConvertErr {
    #[error(
        "identifier does not describe a simulated read:
    `{id}`
expected the format `antibody_N_multiplicity_M_copy_K`
suggestion: pass --skip-unmatched to drop such reads instead"
    )]
    UnmatchedId { id: String },

    #[error("invalid clone table row {row}: expected `sequence<TAB>count`")]
    InvalidCloneRow { row: usize },
}

#[derive(Debug, PartialEq, Eq)]
pub struct SimulatedId {
    /// The originating antibody, used as the cluster label.
    pub antibody: i64,
    pub multiplicity: usize,
    pub copy: usize,
}

fn parse_simulated_id(re: &Regex, id: &str) -> Option<SimulatedId> {
    let captures = re.captures(id)?;
    Some(SimulatedId {
        antibody: captures[1].parse().ok()?,
        multiplicity: captures[2].parse().ok()?,
        copy: captures[3].parse().ok()?,
    })
}

/// Converts a simulated repertoire to an RCM file: every read is assigned to
/// the cluster of the antibody it was simulated from.
pub fn simulated_to_rcm(input: &str, writer: impl Write, skip_unmatched: bool) -> Result<()> {
    let re = Regex::new(SIMULATED_ID_PATTERN)?;
    let mut reader = needletail::parse_fastx_file(input)
        .with_context(|| format!("Unable to open reads file {input}"))?;

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    while let Some(rec) = reader.next() {
        let rec = rec?;
        let id = String::from_utf8_lossy(rec.id()).to_string();

        match parse_simulated_id(&re, &id) {
            Some(sim) => entries.push(RcmEntry {
                id,
                clique: sim.antibody,
            }),
            None if skip_unmatched => skipped += 1,
            None => bail!(ConvertErr::UnmatchedId { id }),
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} reads without a simulated identifier");
    }
    info!("Wrote {} RCM entries", entries.len());

    write_rcm(writer, &entries)
}

/// Converts a simulated repertoire to the "final repertoire" format: only the
/// first copy of each antibody is kept, renamed to
/// `cluster___<antibody>___size___<multiplicity>`. FASTQ output gets random
/// qualities from the supplied RNG.
pub fn simulated_to_repertoire(
    input: &str,
    writer: &mut impl Write,
    out_format: SeqFormat,
    rng: &mut SmallRng,
    skip_unmatched: bool,
) -> Result<()> {
    let re = Regex::new(SIMULATED_ID_PATTERN)?;
    let mut reader = needletail::parse_fastx_file(input)
        .with_context(|| format!("Unable to open reads file {input}"))?;

    let mut kept = 0usize;

    while let Some(rec) = reader.next() {
        let rec = rec?;
        let id = String::from_utf8_lossy(rec.id()).to_string();

        let Some(sim) = parse_simulated_id(&re, &id) else {
            if skip_unmatched {
                continue;
            }
            bail!(ConvertErr::UnmatchedId { id });
        };
        if sim.copy != 1 {
            continue;
        }

        let new_id = format!("cluster___{}___size___{}", sim.antibody, sim.multiplicity);
        let seq = rec.seq();

        match out_format {
            SeqFormat::Fasta => write_record(writer, &new_id, &seq, None, out_format)?,
            SeqFormat::Fastq => {
                let qual = random_quality(seq.len(), rng);
                write_record(writer, &new_id, &seq, Some(&qual), out_format)?;
            }
        }
        kept += 1;
    }

    info!("Wrote {kept} repertoire records");
    Ok(())
}

/// Converts an exported clone table (TSV with a header row, `sequence<TAB>count`
/// columns) to the repertoire FASTA format.
pub fn mixcr_to_repertoire(input: &str, writer: &mut impl Write) -> Result<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("Unable to open clone table {input}"))?;

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // header is row 1
        let row = i + 2;

        if record.len() < 2 {
            bail!(ConvertErr::InvalidCloneRow { row });
        }
        let size: usize = record[1]
            .parse()
            .map_err(|_| ConvertErr::InvalidCloneRow { row })?;

        let id = format!("cluster___{}___size___{}", i, size);
        write_record(writer, &id, record[0].as_bytes(), None, SeqFormat::Fasta)?;
    }

    Ok(())
}
