use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Parser, Subcommand};

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 rcmqc version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   tools for validating read clusterings against barcode groups";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate cluster assignments against barcode groups
    #[command(arg_required_else_help = true)]
    Eval {
        /// the input RCM file, with `READ_ID<TAB>CLUSTER` rows
        #[arg(long, short = 'i')]
        rcm: String,

        /// the companion reads file (.fasta/.fastq), listing the same reads
        /// in the same order as the RCM file
        #[arg(long, short = 's')]
        reads: String,

        /// "good" barcode agreement rate threshold (inclusive)
        #[arg(long, short, default_value_t = 0.9, value_parser = parse_rate)]
        rate: f64,

        #[arg(value_enum, long, conflicts_with = "barcode_regex", default_value = "umi")]
        preset: crate::barcode::PresetBarcodeFormats,

        /// barcode regex for custom header styles, with the barcode as its
        /// first capture group. this will override the preset given.
        /// for example, for the `umi` preset:
        ///     UMI:([ACGTN]+)
        #[arg(long, verbatim_doc_comment)]
        barcode_regex: Option<String>,

        /// print each barcode with its members' edit distances to the group
        /// consensus (text output only)
        #[arg(long, action, conflicts_with = "json")]
        distances: bool,

        /// emit the report as JSON instead of text
        #[arg(long, action)]
        json: bool,

        /// the output file (defaults to standard output)
        #[arg(short)]
        output: Option<String>,
    },

    /// Convert a simulated repertoire to an RCM file
    #[command(arg_required_else_help = true)]
    SimulatedToRcm {
        /// the simulated repertoire (.fasta/.fastq), with
        /// `antibody_N_multiplicity_M_copy_K` identifiers
        file: String,

        /// the output RCM file (defaults to standard output)
        #[arg(short)]
        output: Option<String>,

        /// skip, instead of error, on reads without a simulated identifier
        #[arg(long)]
        skip_unmatched: bool,
    },

    /// Convert a simulated repertoire to a final repertoire file
    #[command(arg_required_else_help = true)]
    SimulatedToRepertoire {
        /// the simulated repertoire (.fasta/.fastq)
        file: String,

        /// the output file; the extension picks the format (.fa/.fq)
        #[arg(short)]
        output: String,

        /// skip, instead of error, on reads without a simulated identifier
        #[arg(long)]
        skip_unmatched: bool,

        /// RNG seed for generated FASTQ qualities
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Convert an exported clone table to a repertoire FASTA file
    #[command(arg_required_else_help = true)]
    FromMixcr {
        /// the clone table (TSV with a header row: sequence, count)
        file: String,

        /// the output FASTA file (defaults to standard output)
        #[arg(short)]
        output: Option<String>,
    },

    /// Copy a read file, injecting random substitution errors into each read
    #[command(arg_required_else_help = true)]
    Noise {
        /// the input reads (.fasta/.fastq)
        file: String,

        /// the output file; the extension picks the format (.fa/.fq)
        #[arg(short)]
        output: String,

        /// expected number of substitutions per read (Poisson mean)
        #[arg(long, default_value_t = 2.0)]
        error_rate: f64,

        /// make exactly `error-rate` substitutions instead of sampling
        #[arg(long, action)]
        fixed: bool,

        /// lower bound on substitutions per read
        #[arg(long, default_value_t = 0)]
        min_errors: usize,

        /// restrict errors to the first N bases of each read
        #[arg(long, default_value_t = 10_005_000)]
        site_len: usize,

        /// RNG seed, for reproducible datasets
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_rate(arg: &str) -> Result<f64, String> {
    let rate: f64 = arg
        .parse()
        .map_err(|_| format!("`{arg}` is not a number"))?;

    if !(0.0..=1.0).contains(&rate) {
        return Err(indoc::formatdoc! {"
            rate must lie in [0, 1], got `{arg}`. The rate is the fraction of a \
            barcode group's reads which must agree with the majority cluster, as in:
              --rate 0.9
              --rate 1.0
        "});
    }

    Ok(rate)
}
