use crate::classify::{Category, ClassifiedVariant};
use crate::error::{CustomError, Result};

/// Per-window category counts for one chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicBlock {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub variant_count: u64,
    counts: [u64; Category::COUNT],
}

impl GenomicBlock {
    fn empty(chromosome: &str, start: u64, block_size: u64) -> Self {
        Self {
            chromosome: chromosome.to_string(),
            start,
            end: start + block_size,
            variant_count: 0,
            counts: [0; Category::COUNT],
        }
    }

    pub fn count(&self, category: Category) -> u64 {
        self.counts[category.index()]
    }

    pub fn counts(&self) -> &[u64; Category::COUNT] {
        &self.counts
    }

    #[cfg(test)]
    pub(crate) fn with_counts(
        chromosome: &str,
        start: u64,
        end: u64,
        variant_count: u64,
        counts: &[(Category, u64)],
    ) -> Self {
        let mut block = Self::empty(chromosome, start, end - start);
        block.variant_count = variant_count;
        for &(category, n) in counts {
            block.counts[category.index()] = n;
        }
        block
    }
}

/// Sparse fixed-width windowing of a position-sorted variant stream.
pub struct BlockAggregator {
    chromosome: String,
    block_size: u64,
    blocks: Vec<GenomicBlock>,
    last_position: Option<u64>,
}

impl BlockAggregator {
    pub fn new(chromosome: impl Into<String>, block_size: u64) -> Result<Self> {
        if block_size == 0 {
            return Err(CustomError::BlockSize);
        }
        Ok(Self {
            chromosome: chromosome.into(),
            block_size,
            blocks: Vec::new(),
            last_position: None,
        })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn push(&mut self, variant: &ClassifiedVariant) -> Result<()> {
        let position = variant.call.position;
        if let Some(previous) = self.last_position {
            if position < previous {
                return Err(CustomError::UnsortedVariants {
                    chromosome: self.chromosome.clone(),
                    previous,
                    position,
                });
            }
        }
        self.last_position = Some(position);

        let start = (position / self.block_size) * self.block_size;
        let needs_block = self.blocks.last().is_none_or(|b| b.start != start);
        if needs_block {
            self.blocks
                .push(GenomicBlock::empty(&self.chromosome, start, self.block_size));
        }
        let current = self.blocks.len() - 1;
        let block = &mut self.blocks[current];
        block.variant_count += 1;
        for category in variant.flags.iter() {
            block.counts[category.index()] += 1;
        }
        Ok(())
    }

    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn finish(self) -> Vec<GenomicBlock> {
        self.blocks
    }
}
