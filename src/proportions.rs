use crate::blocks::GenomicBlock;
use crate::classify::Category;

/// Category proportions for one block. Every value is `None` when the block has
/// fewer variants than the masking threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockProportions {
    values: [Option<f64>; Category::PROPORTIONED.len()],
    prop_me: Option<f64>,
}

impl BlockProportions {
    pub fn from_block(block: &GenomicBlock, min_variants_per_block: u64) -> Self {
        if block.variant_count == 0 || block.variant_count < min_variants_per_block {
            return Self::masked();
        }
        let n = block.variant_count as f64;
        // PROPORTIONED is the leading run of Category::ALL, so `index()` addresses `values`.
        let values = Category::PROPORTIONED.map(|c| Some(block.count(c) as f64 / n));
        let prop_me = Category::UPD
            .iter()
            .map(|&c| values[c.index()].unwrap_or(0.0))
            .sum();
        Self {
            values,
            prop_me: Some(prop_me),
        }
    }

    fn masked() -> Self {
        Self {
            values: [None; Category::PROPORTIONED.len()],
            prop_me: None,
        }
    }

    pub fn is_masked(&self) -> bool {
        self.prop_me.is_none()
    }

    /// Proportion for a category; always `None` for categories without a proportion.
    pub fn get(&self, category: Category) -> Option<f64> {
        Category::PROPORTIONED
            .iter()
            .position(|&c| c == category)
            .and_then(|idx| self.values[idx])
    }

    pub fn prop_me(&self) -> Option<f64> {
        self.prop_me
    }

    /// The eight category proportions followed by `prop_me`.
    pub fn all(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied().chain(std::iter::once(self.prop_me()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(variant_count: u64, counts: &[(Category, u64)]) -> GenomicBlock {
        GenomicBlock::with_counts("1", 0, 1_000_000, variant_count, counts)
    }

    #[test]
    fn low_count_block_is_fully_masked() {
        let b = block(3, &[(Category::IsHomozygous, 2)]);
        let props = BlockProportions::from_block(&b, 5);
        assert!(props.is_masked());
        assert_eq!(props.all().count(), 9);
        assert!(props.all().all(|p| p.is_none()));
        assert_eq!(b.variant_count, 3);
    }

    #[test]
    fn proportions_divide_by_variant_count() {
        let b = block(
            10,
            &[
                (Category::IsHomozygous, 4),
                (Category::IsBiparental, 6),
                (Category::MaternalUniparentalIsodisomy, 1),
            ],
        );
        let props = BlockProportions::from_block(&b, 5);
        assert_eq!(props.get(Category::IsHomozygous), Some(0.4));
        assert_eq!(props.get(Category::IsBiparental), Some(0.6));
        assert_eq!(props.get(Category::AllelesIdenticalToDad), Some(0.0));
        assert_eq!(props.get(Category::MendelianError), None);
        for p in props.all() {
            let p = p.unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn prop_me_sums_upd_proportions() {
        let b = block(
            7,
            &[
                (Category::MaternalUniparentalAmbiguous, 1),
                (Category::MaternalUniparentalIsodisomy, 2),
                (Category::PaternalUniparentalAmbiguous, 1),
                (Category::PaternalUniparentalIsodisomy, 1),
            ],
        );
        let props = BlockProportions::from_block(&b, 1);
        let expected: f64 = Category::UPD.iter().map(|&c| props.get(c).unwrap()).sum();
        assert_eq!(props.prop_me(), Some(expected));
    }

    #[test]
    fn prop_me_stays_within_unit_interval_for_het_trios() {
        use crate::classify::classify_genotypes;
        use crate::model::Genotype;

        let het = Genotype::new(0, 1);
        let flags = classify_genotypes(&het, &het, &het);
        let counts: Vec<(Category, u64)> = flags.iter().map(|c| (c, 10)).collect();
        let props = BlockProportions::from_block(&block(10, &counts), 5);
        assert_eq!(props.prop_me(), Some(0.0));
        for p in props.all() {
            assert!((0.0..=1.0).contains(&p.unwrap()));
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let b = block(5, &[(Category::IsHomozygous, 5)]);
        let props = BlockProportions::from_block(&b, 5);
        assert_eq!(props.get(Category::IsHomozygous), Some(1.0));
    }
}
