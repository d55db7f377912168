use crate::blocks::GenomicBlock;
use crate::classify::Category;
use crate::error::{CustomError, Result};
use rayon::prelude::*;
use statrs::distribution::{Binomial, DiscreteCDF};

const N_TESTS_PER_BLOCK: usize = Category::UPD.len();

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTest {
    pub p_value: f64,
    pub significant: bool,
}

/// Upper-tail tests of one block, in `Category::UPD` order.
#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceResult {
    tests: [CategoryTest; N_TESTS_PER_BLOCK],
}

impl SignificanceResult {
    pub fn get(&self, category: Category) -> Option<&CategoryTest> {
        upd_index(category).map(|idx| &self.tests[idx])
    }

    pub fn tests(&self) -> &[CategoryTest; N_TESTS_PER_BLOCK] {
        &self.tests
    }

    pub fn any_significant(&self) -> bool {
        self.tests.iter().any(|t| t.significant)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceReport {
    /// Genome-wide rate per UPD category, in `Category::UPD` order.
    pub background: [f64; N_TESTS_PER_BLOCK],
    pub corrected_threshold: f64,
    /// One entry per input block, in input order.
    pub results: Vec<SignificanceResult>,
}

impl SignificanceReport {
    pub fn background_rate(&self, category: Category) -> Option<f64> {
        upd_index(category).map(|idx| self.background[idx])
    }

    pub fn n_significant(&self, category: Category) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.get(category))
            .filter(|t| t.significant)
            .count()
    }
}

fn upd_index(category: Category) -> Option<usize> {
    Category::UPD.iter().position(|&c| c == category)
}

/// Sum of each UPD category over all blocks divided by the total variant count.
pub fn background_rates(blocks: &[GenomicBlock]) -> [f64; N_TESTS_PER_BLOCK] {
    let total: u64 = blocks.iter().map(|b| b.variant_count).sum();
    Category::UPD.map(|category| {
        if total == 0 {
            return 0.0;
        }
        let matching: u64 = blocks.iter().map(|b| b.count(category)).sum();
        matching as f64 / total as f64
    })
}

/// Bonferroni threshold across every block and every UPD category.
pub fn corrected_threshold(nominal_p_value: f64, n_blocks: usize) -> f64 {
    nominal_p_value / (n_blocks * N_TESTS_PER_BLOCK) as f64
}

/// P(X >= observed) for X ~ Binomial(n, rate).
pub fn upper_tail_p_value(observed: u64, n: u64, rate: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(CustomError::BackgroundRate { rate });
    }
    if observed == 0 {
        return Ok(1.0);
    }
    if observed > n || rate == 0.0 {
        return Ok(0.0);
    }
    if rate == 1.0 {
        return Ok(1.0);
    }
    let dist = Binomial::new(rate, n).map_err(|_| CustomError::BackgroundRate { rate })?;
    Ok(dist.sf(observed - 1).clamp(0.0, 1.0))
}

pub fn test_blocks(blocks: &[GenomicBlock], nominal_p_value: f64) -> Result<SignificanceReport> {
    let background = background_rates(blocks);
    let threshold = corrected_threshold(nominal_p_value, blocks.len());

    let results = blocks
        .par_iter()
        .map(|block| -> Result<SignificanceResult> {
            let mut tests = [CategoryTest {
                p_value: 1.0,
                significant: false,
            }; N_TESTS_PER_BLOCK];
            for (idx, &category) in Category::UPD.iter().enumerate() {
                let p_value =
                    upper_tail_p_value(block.count(category), block.variant_count, background[idx])?;
                tests[idx] = CategoryTest {
                    p_value,
                    significant: p_value < threshold,
                };
            }
            Ok(SignificanceResult { tests })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SignificanceReport {
        background,
        corrected_threshold: threshold,
        results,
    })
}
