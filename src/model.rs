/// An unphased diploid genotype, stored as two allele indices in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Genotype([u32; 2]);

impl Genotype {
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b { Self([a, b]) } else { Self([b, a]) }
    }

    pub fn alleles(&self) -> [u32; 2] {
        self.0
    }

    pub fn is_homozygous(&self) -> bool {
        self.0[0] == self.0[1]
    }

    pub fn carries(&self, allele: u32) -> bool {
        self.0.contains(&allele)
    }

    /// True if neither of `other`'s alleles is present in this genotype.
    pub fn shares_none_with(&self, other: &Genotype) -> bool {
        other.0.iter().all(|&a| !self.carries(a))
    }

    /// True if every allele of `other` is present in this genotype.
    pub fn contains_all_of(&self, other: &Genotype) -> bool {
        other.0.iter().all(|&a| self.carries(a))
    }
}

/// Per-sample FORMAT values for one trio member. `None` marks a missing value.
///
/// DP and GQ are kept as `f64` since headers may declare either as `Float`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleCall {
    pub genotype: Option<Genotype>,
    pub dp: Option<f64>,
    pub gq: Option<f64>,
}

/// Strip an optional `chr` prefix so `chr1` and `1` name the same chromosome.
pub fn normalize_chromosome(name: &str) -> &str {
    name.strip_prefix("chr").unwrap_or(name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrioGenotypeCall {
    pub chromosome: String,
    pub position: u64,
    pub qual: Option<f64>,
    pub proband: SampleCall,
    pub mother: SampleCall,
    pub father: SampleCall,
}

impl TrioGenotypeCall {
    pub fn members(&self) -> [&SampleCall; 3] {
        [&self.proband, &self.mother, &self.father]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// PED encoding: 1 = male, 2 = female, anything else unknown.
    pub fn from_ped_code(code: &str) -> Self {
        match code.trim() {
            "1" => Sex::Male,
            "2" => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

/// Sample identifiers of a proband and both parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trio {
    pub family_id: String,
    pub proband: String,
    pub mother: String,
    pub father: String,
    pub sex: Sex,
}
