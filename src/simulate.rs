use crate::io::{write_record, SeqFormat};

use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use std::io::Write;

const BASES: [u8; 4] = *b"ACGT";

pub struct NoiseOpts {
    /// Expected number of substitutions per read (Poisson mean), or the exact
    /// number when `fixed` is set.
    pub error_rate: f64,
    pub fixed: bool,
    /// Lower bound on the number of substitutions per read.
    pub min_errors: usize,
    /// Only the first `site_len` bases of a read may receive errors.
    pub site_len: usize,
}

/// Replaces a base with a uniformly chosen different base.
fn substitute(base: u8, rng: &mut SmallRng) -> u8 {
    loop {
        let candidate = *BASES.choose(rng).unwrap();
        if candidate != base {
            return candidate;
        }
    }
}

/// Uniform phred qualities in [30, 50], encoded with the usual +33 offset.
pub fn random_quality(len: usize, rng: &mut SmallRng) -> Vec<u8> {
    (0..len).map(|_| 33 + rng.gen_range(30..=50)).collect()
}

/// Injects substitution errors into a sequence in place, returning the number
/// of substitutions made. The error count is drawn from the supplied RNG;
/// callers seed it explicitly for reproducible datasets.
pub fn inject_errors(seq: &mut [u8], rng: &mut SmallRng, opts: &NoiseOpts) -> Result<usize> {
    let window = seq.len().min(opts.site_len);

    let mut n_errors = if opts.fixed || opts.error_rate == 0.0 {
        opts.error_rate.round() as usize
    } else {
        let poisson = Poisson::new(opts.error_rate)
            .ok()
            .context("error rate must be positive and finite")?;
        poisson.sample(rng) as usize
    };

    n_errors = n_errors.max(opts.min_errors).min(window);

    for pos in rand::seq::index::sample(rng, window, n_errors) {
        seq[pos] = substitute(seq[pos], rng);
    }

    Ok(n_errors)
}

/// Copies a read file while injecting substitution errors into every record.
/// FASTQ output gets fresh random qualities; any original qualities are
/// dropped, matching how the simulated datasets are built.
pub fn noise_file(
    input: &str,
    writer: &mut impl Write,
    out_format: SeqFormat,
    rng: &mut SmallRng,
    opts: &NoiseOpts,
) -> Result<()> {
    let mut reader = needletail::parse_fastx_file(input)
        .with_context(|| format!("Unable to open reads file {input}"))?;

    let mut n_reads = 0usize;
    let mut n_errors = 0usize;

    while let Some(rec) = reader.next() {
        let rec = rec?;
        let id = String::from_utf8_lossy(rec.id()).to_string();
        let mut seq = rec.seq().into_owned();

        n_errors += inject_errors(&mut seq, rng, opts)?;

        match out_format {
            SeqFormat::Fasta => write_record(writer, &id, &seq, None, out_format)?,
            SeqFormat::Fastq => {
                let qual = random_quality(seq.len(), rng);
                write_record(writer, &id, &seq, Some(&qual), out_format)?;
            }
        }
        n_reads += 1;
    }

    info!("Injected {n_errors} substitutions across {n_reads} reads");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fixed_opts(n: f64) -> NoiseOpts {
        NoiseOpts {
            error_rate: n,
            fixed: true,
            min_errors: 0,
            site_len: usize::MAX,
        }
    }

    fn hamming(a: &[u8], b: &[u8]) -> usize {
        a.iter().zip(b).filter(|(x, y)| x != y).count()
    }

    #[test]
    fn fixed_mode_makes_exactly_n_substitutions() {
        let original = b"ACGTACGTACGTACGTACGT".to_vec();
        let mut rng = SmallRng::seed_from_u64(7);

        let mut seq = original.clone();
        let n = inject_errors(&mut seq, &mut rng, &fixed_opts(3.0)).unwrap();
        assert_eq!(n, 3);
        assert_eq!(seq.len(), original.len());
        assert_eq!(hamming(&original, &seq), 3);
        assert!(seq.iter().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T')));
    }

    #[test]
    fn zero_rate_leaves_the_read_untouched() {
        let original = b"ACGTACGT".to_vec();
        let mut rng = SmallRng::seed_from_u64(1);

        let mut seq = original.clone();
        let opts = NoiseOpts {
            error_rate: 0.0,
            fixed: false,
            min_errors: 0,
            site_len: usize::MAX,
        };
        assert_eq!(inject_errors(&mut seq, &mut rng, &opts).unwrap(), 0);
        assert_eq!(seq, original);
    }

    #[test]
    fn min_errors_is_a_lower_bound() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut seq = b"ACGTACGTACGT".to_vec();
        let opts = NoiseOpts {
            error_rate: 0.0,
            fixed: true,
            min_errors: 2,
            site_len: usize::MAX,
        };
        assert_eq!(inject_errors(&mut seq, &mut rng, &opts).unwrap(), 2);
    }

    #[test]
    fn errors_stay_within_the_site_window() {
        let original = b"AAAAAAAAAAAAAAAAAAAA".to_vec();
        let mut rng = SmallRng::seed_from_u64(3);

        let mut seq = original.clone();
        let opts = NoiseOpts {
            error_rate: 4.0,
            fixed: true,
            min_errors: 0,
            site_len: 5,
        };
        inject_errors(&mut seq, &mut rng, &opts).unwrap();
        assert_eq!(&seq[5..], &original[5..]);
        assert_eq!(hamming(&original[..5], &seq[..5]), 4);
    }

    #[test]
    fn error_count_is_capped_by_the_window() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut seq = b"ACG".to_vec();
        let n = inject_errors(&mut seq, &mut rng, &fixed_opts(10.0)).unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let opts = NoiseOpts {
            error_rate: 2.0,
            fixed: false,
            min_errors: 0,
            site_len: usize::MAX,
        };

        let run = || {
            let mut rng = SmallRng::seed_from_u64(42);
            let mut seq = b"ACGTACGTACGTACGTACGTACGTACGT".to_vec();
            inject_errors(&mut seq, &mut rng, &opts).unwrap();
            seq
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn quality_strings_are_in_range() {
        let mut rng = SmallRng::seed_from_u64(5);
        let qual = random_quality(100, &mut rng);
        assert_eq!(qual.len(), 100);
        assert!(qual.iter().all(|&q| (33 + 30..=33 + 50).contains(&q)));
    }
}
