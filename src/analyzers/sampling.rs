use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::models::CanonicalRecord;
use crate::utils::constants::SAMPLE_SEED;

/// Cap a row set deterministically.
///
/// At or below `cap`, the rows are returned unmodified. Above it, exactly
/// `cap` rows are drawn without replacement from a fixed-seed generator and
/// re-sorted to original row order, so repeated calls over the same subset
/// pick the same rows.
pub fn sample_rows<'a>(rows: &[&'a CanonicalRecord], cap: usize) -> Vec<&'a CanonicalRecord> {
    if rows.len() <= cap {
        return rows.to_vec();
    }

    let mut rng = Xoshiro256Plus::seed_from_u64(SAMPLE_SEED);
    let mut indices = rand::seq::index::sample(&mut rng, rows.len(), cap).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|index| rows[index]).collect()
}
