use crate::model::{Genotype, TrioGenotypeCall};

#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    AllelesIdenticalToDad = 0,
    AllelesIdenticalToMum = 1,
    IsBiparental = 2,
    IsHomozygous = 3,
    MaternalUniparentalAmbiguous = 4,
    MaternalUniparentalIsodisomy = 5,
    PaternalUniparentalAmbiguous = 6,
    PaternalUniparentalIsodisomy = 7,
    MendelianError = 8,
}

impl Category {
    pub const COUNT: usize = 9;

    pub const ALL: [Category; Self::COUNT] = [
        Category::AllelesIdenticalToDad,
        Category::AllelesIdenticalToMum,
        Category::IsBiparental,
        Category::IsHomozygous,
        Category::MaternalUniparentalAmbiguous,
        Category::MaternalUniparentalIsodisomy,
        Category::PaternalUniparentalAmbiguous,
        Category::PaternalUniparentalIsodisomy,
        Category::MendelianError,
    ];

    /// Categories that get a per-block proportion.
    pub const PROPORTIONED: [Category; 8] = [
        Category::AllelesIdenticalToDad,
        Category::AllelesIdenticalToMum,
        Category::IsBiparental,
        Category::IsHomozygous,
        Category::MaternalUniparentalAmbiguous,
        Category::MaternalUniparentalIsodisomy,
        Category::PaternalUniparentalAmbiguous,
        Category::PaternalUniparentalIsodisomy,
    ];

    /// The ambiguous and isodisomy signatures that are tested for significance.
    pub const UPD: [Category; 4] = [
        Category::MaternalUniparentalAmbiguous,
        Category::MaternalUniparentalIsodisomy,
        Category::PaternalUniparentalAmbiguous,
        Category::PaternalUniparentalIsodisomy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::AllelesIdenticalToDad => "alleles_identical_to_dad",
            Category::AllelesIdenticalToMum => "alleles_identical_to_mum",
            Category::IsBiparental => "is_biparental",
            Category::IsHomozygous => "is_homozygous",
            Category::MaternalUniparentalAmbiguous => "matches_maternal_uniparental_ambiguous",
            Category::MaternalUniparentalIsodisomy => "matches_maternal_uniparental_isodisomy",
            Category::PaternalUniparentalAmbiguous => "matches_paternal_uniparental_ambiguous",
            Category::PaternalUniparentalIsodisomy => "matches_paternal_uniparental_isodisomy",
            Category::MendelianError => "mendelian_error",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::AllelesIdenticalToDad => "Identical to father",
            Category::AllelesIdenticalToMum => "Identical to mother",
            Category::IsBiparental => "Biparental",
            Category::IsHomozygous => "Homozygous",
            Category::MaternalUniparentalAmbiguous => "Maternal UPD (ambiguous)",
            Category::MaternalUniparentalIsodisomy => "Maternal UPD (isodisomy)",
            Category::PaternalUniparentalAmbiguous => "Paternal UPD (ambiguous)",
            Category::PaternalUniparentalIsodisomy => "Paternal UPD (isodisomy)",
            Category::MendelianError => "Mendelian error",
        }
    }
}

/// Set of category flags raised by one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategorySet(u16);

impl CategorySet {
    pub fn insert(&mut self, category: Category) {
        self.0 |= 1 << category.index();
    }

    pub fn set(&mut self, category: Category, value: bool) {
        if value {
            self.insert(category);
        }
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0 & (1 << category.index()) != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|&c| self.contains(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QcThresholds {
    pub min_dp: u32,
    pub min_gq: u32,
    pub min_qual: f64,
}

impl QcThresholds {
    pub fn passes(&self, call: &TrioGenotypeCall) -> bool {
        let qual_ok = call.qual.is_some_and(|q| q >= self.min_qual);
        qual_ok
            && call.members().iter().all(|m| {
                m.dp.is_some_and(|dp| dp >= f64::from(self.min_dp))
                    && m.gq.is_some_and(|gq| gq >= f64::from(self.min_gq))
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedVariant {
    pub call: TrioGenotypeCall,
    pub flags: CategorySet,
}

/// Apply the QC gate and classify a trio call.
///
/// Returns `None` when the call fails QC or any member has a missing or non-diploid genotype.
pub fn classify(call: TrioGenotypeCall, qc: &QcThresholds) -> Option<ClassifiedVariant> {
    if !qc.passes(&call) {
        return None;
    }
    let proband = call.proband.genotype?;
    let mother = call.mother.genotype?;
    let father = call.father.genotype?;
    let flags = classify_genotypes(&proband, &mother, &father);
    Some(ClassifiedVariant { call, flags })
}

pub fn classify_genotypes(proband: &Genotype, mother: &Genotype, father: &Genotype) -> CategorySet {
    let [a, b] = proband.alleles();
    let homozygous = proband.is_homozygous();
    let identical_to_mum = mother.contains_all_of(proband);
    let identical_to_dad = father.contains_all_of(proband);

    let mut flags = CategorySet::default();
    flags.set(Category::AllelesIdenticalToDad, identical_to_dad);
    flags.set(Category::AllelesIdenticalToMum, identical_to_mum);
    flags.set(
        Category::IsBiparental,
        (mother.carries(a) && father.carries(b)) || (mother.carries(b) && father.carries(a)),
    );
    flags.set(Category::IsHomozygous, homozygous);

    // Homozygous proband allele present in one parent and absent from the other.
    flags.set(
        Category::MaternalUniparentalIsodisomy,
        homozygous && mother.carries(a) && father.shares_none_with(proband),
    );
    flags.set(
        Category::PaternalUniparentalIsodisomy,
        homozygous && father.carries(a) && mother.shares_none_with(proband),
    );

    // Heterozygous proband whose alleles could both have come from exactly one
    // parent. When both parents carry both alleles the origin is uninformative.
    flags.set(
        Category::MaternalUniparentalAmbiguous,
        !homozygous && identical_to_mum && !identical_to_dad,
    );
    flags.set(
        Category::PaternalUniparentalAmbiguous,
        !homozygous && identical_to_dad && !identical_to_mum,
    );

    flags.set(
        Category::MendelianError,
        [a, b].iter().any(|&x| !mother.carries(x) && !father.carries(x)),
    );
    flags
}
