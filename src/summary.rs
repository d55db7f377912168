use crate::blocks::GenomicBlock;
use crate::proportions::BlockProportions;
use crate::significance::{SignificanceReport, SignificanceResult};

#[derive(Debug, Clone)]
pub struct BlockSummary {
    pub block: GenomicBlock,
    pub proportions: BlockProportions,
    pub significance: SignificanceResult,
}

/// Blocks of one chromosome in increasing coordinate order.
#[derive(Debug, Clone)]
pub struct ChromosomeSummary {
    pub chromosome: String,
    pub blocks: Vec<BlockSummary>,
}

impl ChromosomeSummary {
    pub fn n_significant_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.significance.any_significant())
            .count()
    }

    pub fn n_masked_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.proportions.is_masked()).count()
    }
}

/// Join blocks with their proportions and test results, grouped by chromosome.
///
/// `blocks` must be grouped in the order given by `chromosomes`, and `report`
/// must have been computed over exactly these blocks. Chromosomes without any
/// block get an empty summary.
pub fn summarize(
    chromosomes: &[String],
    blocks: Vec<GenomicBlock>,
    report: SignificanceReport,
    min_variants_per_block: u64,
) -> Vec<ChromosomeSummary> {
    let mut rows = blocks
        .into_iter()
        .zip(report.results)
        .map(|(block, significance)| BlockSummary {
            proportions: BlockProportions::from_block(&block, min_variants_per_block),
            block,
            significance,
        })
        .peekable();

    chromosomes
        .iter()
        .map(|chromosome| {
            let mut blocks = Vec::new();
            while let Some(row) = rows.next_if(|r| &r.block.chromosome == chromosome) {
                blocks.push(row);
            }
            ChromosomeSummary {
                chromosome: chromosome.clone(),
                blocks,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::significance::test_blocks;

    #[test]
    fn groups_blocks_by_requested_chromosome() {
        let blocks = vec![
            GenomicBlock::with_counts("1", 0, 100, 10, &[(Category::IsHomozygous, 3)]),
            GenomicBlock::with_counts("1", 200, 300, 2, &[]),
            GenomicBlock::with_counts("3", 0, 100, 8, &[]),
        ];
        let report = test_blocks(&blocks, 0.05).unwrap();
        let chromosomes: Vec<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();
        let summaries = summarize(&chromosomes, blocks, report, 5);

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].blocks.len(), 2);
        assert!(summaries[1].blocks.is_empty());
        assert_eq!(summaries[2].blocks.len(), 1);
        assert_eq!(
            summaries[0].blocks[0].proportions.get(Category::IsHomozygous),
            Some(0.3)
        );
        assert!(summaries[0].blocks[1].proportions.is_masked());
        assert_eq!(summaries[0].blocks[1].block.variant_count, 2);
    }
}
