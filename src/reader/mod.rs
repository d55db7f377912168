pub mod vcf;

use crate::error::Result;
use crate::model::{Trio, TrioGenotypeCall};

/// Source of trio calls in file order.
pub trait TrioReader: Iterator<Item = Result<TrioGenotypeCall>> {
    fn trio(&self) -> &Trio;
    /// Number of data records yielded so far.
    fn n_records(&self) -> u64;
}
