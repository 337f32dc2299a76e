/// Index into the per-position tally, in canonical order. Ties in the
/// majority vote are broken toward the earlier base in this order, so the
/// consensus is deterministic for any input.
const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Computes a per-position majority-vote consensus over a group of reads.
///
/// Zero-length sequences are discarded first; the consensus length is the
/// minimum length of the remaining sequences, and longer sequences only
/// contribute their prefix of that length. Returns `None` when no non-empty
/// sequence exists — an absent consensus is a valid outcome, not an error.
///
/// The tally is order-independent: permuting `reads` never changes the
/// result. Symbols outside A/C/G/T are not tallied; callers validate the
/// alphabet on load.
pub fn consensus<S: AsRef<[u8]>>(reads: &[S]) -> Option<Vec<u8>> {
    let reads: Vec<&[u8]> = reads
        .iter()
        .map(|r| r.as_ref())
        .filter(|r| !r.is_empty())
        .collect();

    let n = reads.iter().map(|r| r.len()).min()?;

    let mut result = Vec::with_capacity(n);
    for pos in 0..n {
        let mut tally = [0usize; 4];
        for read in &reads {
            if let Some(idx) = base_index(read[pos]) {
                tally[idx] += 1;
            }
        }

        // first strict maximum in A, C, G, T order
        let mut best = 0;
        for idx in 1..4 {
            if tally[idx] > tally[best] {
                best = idx;
            }
        }
        result.push(BASES[best]);
    }

    Some(result)
}
