use crate::model::{CarbonEmissionsSource, EmissionSummary, FleetSummary, Id, Page};
use crate::store::traits::{
    BranchStore, CompanyStore, EmissionsSourceStore, FootprintStore, OffsetStore,
    SequestrationStore, Store,
};
use crate::store::StoreResult;

/// Read-side totals over the company → branch → source → measurement tree.
///
/// Nothing is cached: every call walks the rows it needs. Callers are
/// expected to have resolved the root id already; an id without children
/// simply sums to zero.
pub struct Aggregator;

impl Aggregator {
    /// Totals for every source owned by one branch.
    pub async fn branch_summary<S: Store>(store: &S, branch_id: Id) -> StoreResult<EmissionSummary> {
        let sources = store
            .list_emissions_sources_for_branch(branch_id, Page::ALL)
            .await?;
        Self::summarize_sources(store, &sources).await
    }

    /// Totals for every source owned by every branch of one company.
    pub async fn company_summary<S: Store>(
        store: &S,
        company_id: Id,
    ) -> StoreResult<EmissionSummary> {
        let sources = Self::company_sources(store, company_id).await?;
        Self::summarize_sources(store, &sources).await
    }

    /// Footprint and sequestration totals per company name, for the dashboard pie charts.
    /// Companies without activity are reported with zero.
    pub async fn fleet_summary<S: Store>(store: &S) -> StoreResult<FleetSummary> {
        let mut summary = FleetSummary::default();

        for company in store.list_companies(Page::ALL).await? {
            let mut footprint_total = 0.0;
            let mut sequestration_total = 0.0;

            for source in Self::company_sources(store, company.id).await? {
                footprint_total += store
                    .list_footprints_for_source(source.id, Page::ALL)
                    .await?
                    .iter()
                    .map(|f| f.footprint_value)
                    .sum::<f64>();
                sequestration_total += store
                    .list_sequestrations_for_source(source.id, Page::ALL)
                    .await?
                    .iter()
                    .map(|s| s.seq_value)
                    .sum::<f64>();
            }

            summary
                .footprints
                .insert(company.c_name.clone(), footprint_total);
            summary
                .sequestrations
                .insert(company.c_name, sequestration_total);
        }

        Ok(summary)
    }

    /// Sum of `offset_amount` over the company's offsets, accumulated as `i128`.
    pub async fn carbon_offset_total<S: Store>(store: &S, company_id: Id) -> StoreResult<i128> {
        let offsets = store
            .list_offsets_for_company(company_id, Page::ALL)
            .await?;
        Ok(offsets.iter().map(|o| i128::from(o.offset_amount)).sum())
    }

    async fn company_sources<S: Store>(
        store: &S,
        company_id: Id,
    ) -> StoreResult<Vec<CarbonEmissionsSource>> {
        let mut sources = Vec::new();
        for branch in store
            .list_branches_for_company(company_id, Page::ALL)
            .await?
        {
            sources.extend(
                store
                    .list_emissions_sources_for_branch(branch.id, Page::ALL)
                    .await?,
            );
        }
        Ok(sources)
    }

    async fn summarize_sources<S: Store>(
        store: &S,
        sources: &[CarbonEmissionsSource],
    ) -> StoreResult<EmissionSummary> {
        let mut summary = EmissionSummary::default();
        for source in sources {
            summary.total_emissions += source.total_emission_value;
            summary.total_sequestrations += store
                .list_sequestrations_for_source(source.id, Page::ALL)
                .await?
                .iter()
                .map(|s| s.seq_value)
                .sum::<f64>();
        }
        Ok(summary)
    }
}
