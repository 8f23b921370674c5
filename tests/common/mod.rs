//! Common test utilities and data generators.
//!
//! Counts are drawn as evenly spaced quantiles of the target distribution,
//! so every generated sample is deterministic and close to its population
//! moments. Covariates follow fixed modular patterns that are unrelated to
//! the count ordering.

#![allow(dead_code)]

use complaint_zinb::data::{Dataset, Gender, Observation, Residency};
use statrs::function::gamma::ln_gamma;

/// Simple deterministic "random" numbers in `[0, 1)` for reproducibility.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 11) as f64) / ((1u64 << 53) as f64)
    }
}

/// Smallest `k` with `cdf(k) >= p` for a pmf given in log space.
fn discrete_quantile(p: f64, log_pmf: impl Fn(u64) -> f64) -> u64 {
    let mut cumulative = 0.0;
    for k in 0..10_000 {
        cumulative += log_pmf(k).exp();
        if cumulative >= p {
            return k;
        }
    }
    10_000
}

pub fn poisson_log_pmf(k: u64, lambda: f64) -> f64 {
    let kf = k as f64;
    kf * lambda.ln() - lambda - ln_gamma(kf + 1.0)
}

pub fn negbin_log_pmf(k: u64, mu: f64, theta: f64) -> f64 {
    let kf = k as f64;
    ln_gamma(kf + theta) - ln_gamma(theta) - ln_gamma(kf + 1.0)
        + theta * (theta / (theta + mu)).ln()
        + kf * (mu / (theta + mu)).ln()
}

/// `n` Poisson(λ) counts at quantiles `(i + 0.5)/n`, interleaved.
pub fn poisson_counts(n: usize, lambda: f64) -> Vec<u64> {
    interleave(
        (0..n)
            .map(|i| discrete_quantile((i as f64 + 0.5) / n as f64, |k| poisson_log_pmf(k, lambda)))
            .collect(),
    )
}

/// `n` negative binomial counts with mean `mu` and size `theta`.
pub fn negbin_counts(n: usize, mu: f64, theta: f64) -> Vec<u64> {
    interleave(
        (0..n)
            .map(|i| {
                discrete_quantile((i as f64 + 0.5) / n as f64, |k| negbin_log_pmf(k, mu, theta))
            })
            .collect(),
    )
}

/// Structural zeros with probability `pi`, Poisson(λ) otherwise.
pub fn zero_inflated_poisson_counts(n: usize, pi: f64, lambda: f64) -> Vec<u64> {
    interleave(
        (0..n)
            .map(|i| {
                discrete_quantile((i as f64 + 0.5) / n as f64, |k| {
                    let base = (1.0 - pi) * poisson_log_pmf(k, lambda).exp();
                    (if k == 0 { pi + base } else { base }).ln()
                })
            })
            .collect(),
    )
}

/// Spread sorted quantiles over the sample so neighbours differ.
fn interleave(sorted: Vec<u64>) -> Vec<u64> {
    let n = sorted.len();
    let stride = coprime_stride(n);
    (0..n).map(|i| sorted[(i * stride) % n]).collect()
}

fn coprime_stride(n: usize) -> usize {
    let gcd = |mut a: usize, mut b: usize| {
        while b != 0 {
            (a, b) = (b, a % b);
        }
        a
    };
    (n / 3 + 1..n.max(2)).find(|&s| gcd(s, n) == 1).unwrap_or(1)
}

/// Dataset with the given counts and patterned covariates.
pub fn dataset_with_counts(counts: &[u64]) -> Dataset {
    counts
        .iter()
        .enumerate()
        .map(|(i, &complaints)| Observation {
            visits: 1000 + (i * 37 % 50) as u64 * 40,
            complaints,
            residency: if i % 2 == 0 { Residency::Yes } else { Residency::No },
            gender: if i % 5 < 2 { Gender::Male } else { Gender::Female },
            revenue: 200.0 + (i * 13 % 41) as f64 * 2.5,
            hours: 600.0 + (i * 29 % 47) as f64 * 30.0,
        })
        .collect()
}

/// Fifty doctors whose counts depend on visits and gender, with a block of
/// structural zeros spread across the sample.
pub fn fifty_doctors() -> Dataset {
    let pattern = [2, 0, 1, 3, 0, 4, 2, 1, 6, 0, 3, 2, 5, 1, 0, 2, 8, 3, 1, 4];
    (0..50)
        .map(|i| {
            let visits = 900 + (i * 37 % 50) as u64 * 45;
            let base = pattern[i % pattern.len()];
            let bump = u64::from(visits > 2200) + u64::from(i % 5 < 2 && base > 0);
            Observation {
                visits,
                complaints: if base == 0 { 0 } else { base + bump },
                residency: if i % 2 == 0 { Residency::Yes } else { Residency::No },
                gender: if i % 5 < 2 { Gender::Male } else { Gender::Female },
                revenue: 200.0 + (i * 13 % 41) as f64 * 2.5,
                hours: 600.0 + (i * 29 % 47) as f64 * 30.0,
            }
        })
        .collect()
}

/// Fifty doctors where every doctor with `hours < 1000` has zero complaints
/// and every other doctor has at least one.
pub fn hours_separated() -> Dataset {
    let pattern = [1, 2, 3, 1, 4, 2, 5, 1, 2, 3, 6, 1];
    (0..50)
        .map(|i| {
            let hours = 500.0 + 30.0 * i as f64;
            Observation {
                visits: 1000 + (i * 37 % 50) as u64 * 30,
                complaints: if hours < 1000.0 { 0 } else { pattern[i % pattern.len()] },
                residency: if i % 2 == 0 { Residency::Yes } else { Residency::No },
                gender: if i % 5 < 2 { Gender::Male } else { Gender::Female },
                revenue: 200.0 + (i * 13 % 41) as f64 * 2.5,
                hours,
            }
        })
        .collect()
}

/// Fifty doctors with sparse complaints: 28 zeros, visits between 0 and 20,
/// zeros and non-zeros in both genders.
pub fn sparse_complaints() -> Dataset {
    let pattern = [
        0, 2, 0, 0, 5, 1, 0, 3, 0, 0, 8, 0, 2, 0, 0, 1, 4, 0, 0, 6, 0, 0, 2, 0, 3,
    ];
    (0..50)
        .map(|i| {
            let visits = (i * 13 % 21) as u64;
            let base = pattern[i % pattern.len()];
            let male = i % 5 < 2;
            Observation {
                visits,
                complaints: if base == 0 { 0 } else { base + visits / 7 + u64::from(male) },
                residency: if i % 2 == 0 { Residency::Yes } else { Residency::No },
                gender: if male { Gender::Male } else { Gender::Female },
                revenue: 200.0 + (i * 13 % 41) as f64 * 2.5,
                hours: 600.0 + (i * 29 % 47) as f64 * 30.0,
            }
        })
        .collect()
}

/// Forty doctors where every woman has zero complaints and every man has
/// at least one.
pub fn gender_separated() -> Dataset {
    let pattern = [1, 3, 2, 5, 1, 2, 4, 1, 7, 2, 3, 1];
    (0..40)
        .map(|i| {
            let male = i % 2 == 1;
            Observation {
                visits: (i * 7 % 21) as u64,
                complaints: if male { pattern[(i / 2) % pattern.len()] } else { 0 },
                residency: if i % 3 == 0 { Residency::Yes } else { Residency::No },
                gender: if male { Gender::Male } else { Gender::Female },
                revenue: 200.0 + (i * 13 % 41) as f64 * 2.5,
                hours: 600.0 + (i * 29 % 47) as f64 * 30.0,
            }
        })
        .collect()
}

/// TSV rendering of a dataset with the standard header.
pub fn to_tsv(data: &Dataset) -> String {
    let mut out = String::from("visits\tcomplaints\tresidency\tgender\trevenue\thours\n");
    for o in data.observations() {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{:.2}\t{:.2}\n",
            o.visits, o.complaints, o.residency, o.gender, o.revenue, o.hours
        ));
    }
    out
}

/// Approximate equality check for floating point values.
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
