use crate::model::{
    NewCarbonEmissionsSource, NewCarbonFootprint, NewCarbonOffset, NewCarbonSequestration,
    NewCompany, NewCompanyBranch, OffsetType,
};
use crate::store::traits::{
    BranchStore, CompanyStore, EmissionsSourceStore, FootprintStore, OffsetStore,
    SequestrationStore, Store,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use itertools::{iproduct, Itertools};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

const NAME_PREFIXES: [&str; 10] = [
    "Green", "Blue", "Solar", "Terra", "Eco", "Nova", "Bright", "Clear", "North", "Summit",
];
const NAME_SUFFIXES: [&str; 8] = [
    "Tech", "Industries", "Logistics", "Energy", "Foods", "Motors", "Works", "Systems",
];
const BRANCH_LOCATIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];
const SOURCE_TYPES: [&str; 4] = [
    "Factory Emission",
    "Vehicle Emission",
    "Agricultural Emission",
    "Residential Emission",
];

/// How many rows of each kind to generate. Counts below the company level are per parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    pub companies: usize,
    pub branches: usize,
    pub offsets: usize,
    pub emissions: usize,
    pub footprints: usize,
    pub sequestrations: usize,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            companies: 10,
            branches: 2,
            offsets: 2,
            emissions: 3,
            footprints: 2,
            sequestrations: 2,
        }
    }
}

/// Rows actually written by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub companies: usize,
    pub branches: usize,
    pub emissions_sources: usize,
    pub footprints: usize,
    pub sequestrations: usize,
    pub offsets: usize,
}

/// Seed the store with the default amount of demo data.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<SeedReport> {
    let mut rng = StdRng::from_entropy();
    generate(store, SeedOptions::default(), &mut rng).await
}

/// Populate the store with randomly generated companies and everything below them.
///
/// Company names already present in the store are skipped, so repeated runs
/// against the same database only add rows.
pub async fn generate<S, R>(store: &S, options: SeedOptions, rng: &mut R) -> Result<SeedReport>
where
    S: Store,
    R: Rng + Send,
{
    let mut report = SeedReport::default();
    let offset_date = NaiveDate::from_ymd_opt(2023, 1, 1).context("invalid offset date")?;

    let mut base_names = iproduct!(NAME_PREFIXES, NAME_SUFFIXES)
        .map(|(prefix, suffix)| format!("{}{}", prefix, suffix))
        .collect_vec();
    base_names.shuffle(rng);

    let mut candidates = company_names(base_names);
    while report.companies < options.companies {
        let Some(c_name) = candidates.next() else {
            break;
        };
        if store.find_company_by_name(&c_name).await?.is_some() {
            continue;
        }

        let company = store
            .create_company(NewCompany { c_name })
            .await
            .context("Failed to seed company")?;
        report.companies += 1;

        for location in BRANCH_LOCATIONS.iter().cycle().take(options.branches) {
            let branch = store
                .create_branch(NewCompanyBranch {
                    branch_name: format!("{} Branch of {}", location, company.c_name),
                    company_id: company.id,
                })
                .await
                .context("Failed to seed branch")?;
            report.branches += 1;

            for _ in 0..options.emissions {
                let source_type = SOURCE_TYPES
                    .choose(rng)
                    .copied()
                    .unwrap_or(SOURCE_TYPES[0]);
                let source = store
                    .create_emissions_source(NewCarbonEmissionsSource {
                        source_type: source_type.to_string(),
                        total_emission_value: rng.gen_range(100.0..1000.0),
                        branch_id: branch.id,
                    })
                    .await
                    .context("Failed to seed emissions source")?;
                report.emissions_sources += 1;

                for _ in 0..options.footprints {
                    store
                        .create_footprint(NewCarbonFootprint {
                            footprint_value: rng.gen_range(10.0..90.0),
                            source_id: source.id,
                        })
                        .await
                        .context("Failed to seed footprint")?;
                    report.footprints += 1;
                }

                for _ in 0..options.sequestrations {
                    store
                        .create_sequestration(NewCarbonSequestration {
                            seq_value: rng.gen_range(10.0..90.0),
                            source_id: source.id,
                        })
                        .await
                        .context("Failed to seed sequestration")?;
                    report.sequestrations += 1;
                }
            }
        }

        for _ in 0..options.offsets {
            let offset_type = OffsetType::ALL
                .choose(rng)
                .copied()
                .unwrap_or(OffsetType::Reforestation);
            store
                .create_offset(NewCarbonOffset {
                    offset_type,
                    offset_amount: rng.gen_range(1000..=10000),
                    date: Some(offset_date),
                    company_id: company.id,
                })
                .await
                .context("Failed to seed carbon offset")?;
            report.offsets += 1;
        }

        log::debug!("Seeded company {} ({})", company.id, company.c_name);
    }

    log::info!(
        "Seeded {} companies, {} branches, {} sources, {} footprints, {} sequestrations, {} offsets",
        report.companies,
        report.branches,
        report.emissions_sources,
        report.footprints,
        report.sequestrations,
        report.offsets
    );
    Ok(report)
}

/// Every base name once, then numbered rounds ("GreenTech 2", ...) so the
/// supply of candidates never runs out.
fn company_names(base_names: Vec<String>) -> impl Iterator<Item = String> {
    (1..).flat_map(move |round: u32| {
        base_names
            .clone()
            .into_iter()
            .map(move |name| match round {
                1 => name,
                n => format!("{} {}", name, n),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Aggregator;
    use crate::model::Page;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_generate_counts() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        let options = SeedOptions {
            companies: 3,
            branches: 2,
            offsets: 1,
            emissions: 2,
            footprints: 2,
            sequestrations: 1,
        };

        let report = generate(&store, options, &mut rng).await.unwrap();

        assert_eq!(report.companies, 3);
        assert_eq!(report.branches, 6);
        assert_eq!(report.emissions_sources, 12);
        assert_eq!(report.footprints, 24);
        assert_eq!(report.sequestrations, 12);
        assert_eq!(report.offsets, 3);

        let companies = store.list_companies(Page::ALL).await.unwrap();
        assert_eq!(companies.len(), 3);
        assert!(companies.iter().map(|c| &c.c_name).all_unique());
    }

    #[tokio::test]
    async fn test_generated_values_stay_in_range() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(11);
        let options = SeedOptions {
            companies: 2,
            ..SeedOptions::default()
        };
        generate(&store, options, &mut rng).await.unwrap();

        for company in store.list_companies(Page::ALL).await.unwrap() {
            let branches = store
                .list_branches_for_company(company.id, Page::ALL)
                .await
                .unwrap();
            assert_eq!(branches.len(), 2);
            assert!(branches[0]
                .branch_name
                .ends_with(&format!("Branch of {}", company.c_name)));

            for branch in branches {
                for source in store
                    .list_emissions_sources_for_branch(branch.id, Page::ALL)
                    .await
                    .unwrap()
                {
                    assert!(SOURCE_TYPES.contains(&source.source_type.as_str()));
                    assert!((100.0..1000.0).contains(&source.total_emission_value));

                    for footprint in store
                        .list_footprints_for_source(source.id, Page::ALL)
                        .await
                        .unwrap()
                    {
                        assert!((10.0..90.0).contains(&footprint.footprint_value));
                    }
                    for sequestration in store
                        .list_sequestrations_for_source(source.id, Page::ALL)
                        .await
                        .unwrap()
                    {
                        assert!((10.0..90.0).contains(&sequestration.seq_value));
                    }
                }
            }

            for offset in store
                .list_offsets_for_company(company.id, Page::ALL)
                .await
                .unwrap()
            {
                assert!((1000..=10000).contains(&offset.offset_amount));
                assert_eq!(offset.date, NaiveDate::from_ymd_opt(2023, 1, 1));
            }

            let summary = Aggregator::company_summary(&store, company.id).await.unwrap();
            assert!(summary.total_emissions >= 600.0);
        }
    }

    #[tokio::test]
    async fn test_repeated_runs_do_not_collide() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(3);
        let options = SeedOptions {
            companies: 50,
            branches: 0,
            offsets: 0,
            emissions: 0,
            footprints: 0,
            sequestrations: 0,
        };

        generate(&store, options, &mut rng).await.unwrap();
        let second = generate(&store, options, &mut rng).await.unwrap();
        assert_eq!(second.companies, 50);

        let companies = store.list_companies(Page::ALL).await.unwrap();
        assert_eq!(companies.len(), 100);
        assert!(companies.iter().map(|c| &c.c_name).all_unique());
    }
}
