use crate::depth::Gene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionScope {
    Gene(Gene),
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackRegion {
    pub region_id: &'static str,
    pub chrom: &'static str,
    pub start: u64,
    pub end: u64,
    pub scope: RegionScope,
    pub purpose: &'static str,
}

impl FallbackRegion {
    pub fn locus(&self) -> String {
        format!("{}:{}-{}", self.chrom, self.start, self.end)
    }
}

/// Auxiliary GRCh38 intervals around SMN1/SMN2 plus one locus-wide control.
pub const FALLBACK_REGIONS: [FallbackRegion; 7] = [
    FallbackRegion {
        region_id: "SMN1_upstream",
        chrom: "chr5",
        start: 70945900,
        end: 70946065,
        scope: RegionScope::Gene(Gene::Smn1),
        purpose: "SMN1 upstream region",
    },
    FallbackRegion {
        region_id: "SMN1_downstream",
        chrom: "chr5",
        start: 70946177,
        end: 70946300,
        scope: RegionScope::Gene(Gene::Smn1),
        purpose: "SMN1 downstream region",
    },
    FallbackRegion {
        region_id: "SMN1_intron7_8",
        chrom: "chr5",
        start: 70946177,
        end: 70951940,
        scope: RegionScope::Gene(Gene::Smn1),
        purpose: "SMN1 intron between exons 7-8",
    },
    FallbackRegion {
        region_id: "SMN2_upstream",
        chrom: "chr5",
        start: 70070500,
        end: 70070640,
        scope: RegionScope::Gene(Gene::Smn2),
        purpose: "SMN2 upstream region",
    },
    FallbackRegion {
        region_id: "SMN2_downstream",
        chrom: "chr5",
        start: 70070752,
        end: 70070900,
        scope: RegionScope::Gene(Gene::Smn2),
        purpose: "SMN2 downstream region",
    },
    FallbackRegion {
        region_id: "SMN2_intron7_8",
        chrom: "chr5",
        start: 70070752,
        end: 70076520,
        scope: RegionScope::Gene(Gene::Smn2),
        purpose: "SMN2 intron between exons 7-8",
    },
    FallbackRegion {
        region_id: "SMN_locus_control",
        chrom: "chr5",
        start: 70000000,
        end: 70100000,
        scope: RegionScope::Control,
        purpose: "SMN locus quality control region",
    },
];

/// Regions to probe for the given triggering genes, in table order, with the
/// control region always last.
pub fn regions_to_try(genes: &[Gene]) -> Vec<&'static FallbackRegion> {
    let mut out: Vec<&'static FallbackRegion> = FALLBACK_REGIONS
        .iter()
        .filter(|r| matches!(r.scope, RegionScope::Gene(g) if genes.contains(&g)))
        .collect();
    out.extend(
        FALLBACK_REGIONS
            .iter()
            .filter(|r| r.scope == RegionScope::Control),
    );
    out
}

pub fn find_region(region_id: &str) -> Option<&'static FallbackRegion> {
    FALLBACK_REGIONS.iter().find(|r| r.region_id == region_id)
}
