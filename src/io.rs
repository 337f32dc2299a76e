use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::Path;

/// Creates a `BufWriter` for the given output option. This allows for an
/// output file to be passed or otherwise will default to standard output.
pub fn get_writer(output: &Option<String>) -> Result<impl Write> {
    let writer = BufWriter::new(match output {
        Some(ref x) => {
            let file = File::create(Path::new(x))
                .with_context(|| format!("Unable to create output file {x}"))?;
            Box::new(file) as Box<dyn Write + Send>
        }
        None => Box::new(stdout()) as Box<dyn Write + Send>,
    });
    Ok(writer)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqFormat {
    Fasta,
    Fastq,
}

/// Determines the sequence output format from a file extension.
pub fn format_from_path(path: &str) -> Result<SeqFormat> {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("fa") | Some("fasta") => Ok(SeqFormat::Fasta),
        Some("fq") | Some("fastq") => Ok(SeqFormat::Fastq),
        _ => bail!(
            "cannot determine the sequence format of `{path}`: \
             expected a .fa/.fasta or .fq/.fastq extension"
        ),
    }
}

/// Writes one record in the requested format. FASTQ output requires quality
/// scores of the same length as the sequence.
pub fn write_record(
    writer: &mut impl Write,
    id: &str,
    seq: &[u8],
    qual: Option<&[u8]>,
    format: SeqFormat,
) -> Result<()> {
    match format {
        SeqFormat::Fasta => {
            writeln!(writer, ">{id}")?;
            writer.write_all(seq)?;
            writeln!(writer)?;
        }
        SeqFormat::Fastq => {
            let qual = qual.context("FASTQ output requires quality scores")?;
            writeln!(writer, "@{id}")?;
            writer.write_all(seq)?;
            writeln!(writer, "\n+")?;
            writer.write_all(qual)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
