use std::f64::consts::LOG10_E;

use eyre::Result;

use pilecall_collections_rs::track::Track;
use pilecall_core_rs::loc::{Locus, Orientation};
use pilecall_io_rs::narrowpeak::NarrowPeak;

use super::ByCutoff;
use crate::params::Macs2Params;
use crate::poisson;

/// Peaks from treatment and control tracks.
pub fn call(
    treatment: &Track<f64>,
    control: &Track<f64>,
    params: &Macs2Params,
) -> Result<Vec<NarrowPeak>> {
    let p_scores = poisson::p_value_track(treatment, control)?;
    call_peaks(&p_scores, params)
}

/// Peaks from the per-base natural log p-values.
pub fn call_peaks(p_scores: &Track<f64>, params: &Macs2Params) -> Result<Vec<NarrowPeak>> {
    let regions = ByCutoff::new()
        .set_cutoff(params.p_value_cutoff().ln())
        .set_merge_within(*params.max_gap())
        .set_min_length(*params.min_length())
        .run(p_scores)?;
    log::info!("Called {} peaks", regions.len());
    summarize(p_scores, &regions)
}

/// NarrowPeak records for the regions. Signal is the per-base `-log10 p`, the p-value column holds
/// its maximum and the signal value column its mean. Peaks are named `peak_<i>` in the input order.
pub fn summarize(p_scores: &Track<f64>, regions: &[Locus<u64>]) -> Result<Vec<NarrowPeak>> {
    let extracted = p_scores.extract(regions)?;

    let mut peaks = Vec::with_capacity(regions.len());
    for (ind, (region, runs)) in regions.iter().zip(extracted).enumerate() {
        let (mut summit, mut total, mut length) = (f64::NEG_INFINITY, 0.0, 0u64);
        for (p, run) in runs {
            let signal = -LOG10_E * p;
            summit = summit.max(signal);
            total += signal * run as f64;
            length += run;
        }
        let mean = if length > 0 { total / length as f64 } else { 0.0 };
        if length == 0 {
            summit = 0.0;
        }

        peaks.push(NarrowPeak::new(
            region.contig.clone(),
            region.interval,
            format!("peak_{}", ind + 1),
            // Float to int casts saturate
            (summit * 10.0).round() as u32,
            Orientation::Dual,
            mean,
            summit,
            summit,
            0,
        ));
    }
    Ok(peaks)
}
