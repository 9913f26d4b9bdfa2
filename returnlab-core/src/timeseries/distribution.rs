//! Empirical return distributions, faceted by symbol.
//!
//! Each facet is binned independently over its own observed range — facets
//! are not normalized to a shared scale, so a volatile symbol and a quiet
//! one keep their natural extents.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::ReturnObservation;

/// Binning options for [`distribution`].
#[derive(Debug, Clone, Copy)]
pub struct DistributionOptions {
    /// Reverse cumulative mode: each bin carries the proportion of
    /// observations with return >= the bin's lower edge.
    pub cumulative: bool,
    /// Number of equal-width bins per facet.
    pub thresholds: usize,
}

impl Default for DistributionOptions {
    fn default() -> Self {
        Self {
            cumulative: false,
            thresholds: 100,
        }
    }
}

/// One bin of a facet's distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub value: f64,
}

/// A symbol's binned return distribution.
///
/// `bins` is empty when the facet had no binnable observations — degenerate
/// upstream input never produces NaN bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetDistribution {
    pub symbol: String,
    pub bins: Vec<Bin>,
}

/// Bin a return series into per-facet distributions.
///
/// Non-cumulative mode: each bin's value is the proportion of the facet's
/// observations it contains (values sum to 1 within a facet). Cumulative
/// mode: a reverse cumulative distribution, non-increasing as bin edges
/// increase, with the first bin exactly 1. Non-finite returns are not
/// binnable and are skipped.
pub fn distribution(
    returns: &[ReturnObservation],
    options: &DistributionOptions,
) -> Vec<FacetDistribution> {
    let thresholds = options.thresholds.max(1);

    let mut order: Vec<&str> = Vec::new();
    let mut facets: HashMap<&str, Vec<f64>> = HashMap::new();
    for obs in returns {
        let facet = facets.entry(obs.symbol.as_str()).or_insert_with(|| {
            order.push(obs.symbol.as_str());
            Vec::new()
        });
        if obs.ret.is_finite() {
            facet.push(obs.ret);
        }
    }

    order
        .into_iter()
        .map(|symbol| FacetDistribution {
            symbol: symbol.to_string(),
            bins: bin_facet(&facets[symbol], thresholds, options.cumulative),
        })
        .collect()
}

fn bin_facet(values: &[f64], thresholds: usize, cumulative: bool) -> Vec<Bin> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let n = values.len() as f64;

    // A single-point range has no width to split; collapse to one bin.
    if min == max {
        return vec![Bin {
            lower: min,
            upper: max,
            value: 1.0,
        }];
    }

    let width = (max - min) / thresholds as f64;
    let mut counts = vec![0usize; thresholds];
    for &v in values {
        let index = (((v - min) / width) as usize).min(thresholds - 1);
        counts[index] += 1;
    }

    let mut bins = Vec::with_capacity(thresholds);
    if cumulative {
        // Suffix sums: everything at or above the bin's lower edge.
        let mut at_or_above = values.len();
        for (k, &count) in counts.iter().enumerate() {
            bins.push(Bin {
                lower: min + k as f64 * width,
                upper: min + (k + 1) as f64 * width,
                value: at_or_above as f64 / n,
            });
            at_or_above -= count;
        }
    } else {
        for (k, &count) in counts.iter().enumerate() {
            bins.push(Bin {
                lower: min + k as f64 * width,
                upper: min + (k + 1) as f64 * width,
                value: count as f64 / n,
            });
        }
    }
    bins
}
