//! Local background ("control lambda") estimated from the treatment reads themselves.
//!
//! For every window size `w` the reads are replaced by windows `[start - w/2, start + w/2)` around
//! their start coordinate, piled up and divided by `w`. The control lambda is the per-base maximum
//! of the genome-wide read rate and all window densities, scaled by the fragment length.

use std::sync::Arc;

use eyre::Result;

use pilecall_collections_rs::track::{Combine, Track};
use pilecall_core_rs::loc::{GenomeSpace, Interval, Locus};

use crate::params::Macs2Params;
use crate::pileup::resolve;

/// Raw window counts for each window size, in the order of `window_sizes`.
pub fn window_pileups(
    genome: &Arc<GenomeSpace>,
    reads: &[Locus<i64>],
    window_sizes: &[u64],
) -> Result<Vec<Track<f64>>> {
    let resolved = resolve(genome, reads);

    let mut pileups = Vec::with_capacity(window_sizes.len());
    for window in window_sizes {
        let half = i64::try_from(*window)? / 2;
        // Windows of size 1 collapse to empty intervals and cover nothing
        let windows = if half > 0 {
            resolved
                .iter()
                .map(|(index, read)| {
                    let start = read.start();
                    Ok((*index, Interval::new(start - half, start + half)?))
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };
        log::debug!("Piling up {} windows of size {}", windows.len(), window);
        pileups.push(Track::pileup(genome.clone(), windows)?);
    }
    Ok(pileups)
}

/// Combine raw window counts into the control lambda.
pub fn lambda(
    genome: &Arc<GenomeSpace>,
    pileups: &[Track<f64>],
    params: &Macs2Params,
) -> Result<Track<f64>> {
    let rate = *params.n_reads() as f64 / *params.effective_genome_size() as f64;
    log::info!("Genome-wide read rate: {:.6e} reads per base", rate);

    let mut densities = Vec::with_capacity(pileups.len() + 1);
    densities.push(Track::constant(genome.clone(), rate));
    for (pileup, window) in pileups.iter().zip(params.window_sizes()) {
        let window = *window as f64;
        densities.push(pileup.map(|x| x / window)?);
    }

    let local = Track::combine(&densities.iter().collect::<Vec<_>>(), Combine::Max)?;
    local.scale(*params.fragment_length() as f64)
}

/// Control lambda for the reads.
pub fn estimate(
    genome: &Arc<GenomeSpace>,
    reads: &[Locus<i64>],
    params: &Macs2Params,
) -> Result<Track<f64>> {
    let pileups = window_pileups(genome, reads, params.window_sizes())?;
    lambda(genome, &pileups, params)
}
