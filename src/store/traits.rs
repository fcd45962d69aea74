use crate::model::{
    CarbonEmissionsSource, CarbonEmissionsSourceUpdate, CarbonFootprint, CarbonFootprintUpdate,
    CarbonOffset, CarbonOffsetUpdate, CarbonRegulation, CarbonRegulationUpdate,
    CarbonSequestration, CarbonSequestrationUpdate, Company, CompanyBranch, CompanyBranchUpdate,
    CompanyUpdate, Id, NewCarbonEmissionsSource, NewCarbonFootprint, NewCarbonOffset,
    NewCarbonRegulation, NewCarbonSequestration, NewCompany, NewCompanyBranch, Page,
};
use crate::store::StoreResult;

// Every `get_*`, `update_*` and `delete_*` returns `Ok(None)` for an unknown id.
// `list_*` operations return rows in id (insertion) order.

#[async_trait::async_trait]
pub trait CompanyStore: Send + Sync {
    async fn get_company(&self, id: Id) -> StoreResult<Option<Company>>;
    async fn find_company_by_name(&self, c_name: &str) -> StoreResult<Option<Company>>;
    async fn list_companies(&self, page: Page) -> StoreResult<Vec<Company>>;
    async fn create_company(&self, company: NewCompany) -> StoreResult<Company>;
    async fn update_company(&self, id: Id, update: CompanyUpdate) -> StoreResult<Option<Company>>;
    /// Removes the company; branches and offsets are handled per the store's delete policy.
    async fn delete_company(&self, id: Id) -> StoreResult<Option<Company>>;
}

#[async_trait::async_trait]
pub trait BranchStore: Send + Sync {
    async fn get_branch(&self, id: Id) -> StoreResult<Option<CompanyBranch>>;
    async fn list_branches_for_company(
        &self,
        company_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CompanyBranch>>;
    async fn create_branch(&self, branch: NewCompanyBranch) -> StoreResult<CompanyBranch>;
    async fn update_branch(
        &self,
        id: Id,
        update: CompanyBranchUpdate,
    ) -> StoreResult<Option<CompanyBranch>>;
    async fn delete_branch(&self, id: Id) -> StoreResult<Option<CompanyBranch>>;
}

#[async_trait::async_trait]
pub trait EmissionsSourceStore: Send + Sync {
    async fn get_emissions_source(&self, id: Id) -> StoreResult<Option<CarbonEmissionsSource>>;
    async fn list_emissions_sources_for_branch(
        &self,
        branch_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonEmissionsSource>>;
    async fn create_emissions_source(
        &self,
        source: NewCarbonEmissionsSource,
    ) -> StoreResult<CarbonEmissionsSource>;
    async fn update_emissions_source(
        &self,
        id: Id,
        update: CarbonEmissionsSourceUpdate,
    ) -> StoreResult<Option<CarbonEmissionsSource>>;
    async fn delete_emissions_source(&self, id: Id) -> StoreResult<Option<CarbonEmissionsSource>>;
}

#[async_trait::async_trait]
pub trait FootprintStore: Send + Sync {
    async fn get_footprint(&self, id: Id) -> StoreResult<Option<CarbonFootprint>>;
    async fn list_footprints_for_source(
        &self,
        source_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonFootprint>>;
    async fn create_footprint(&self, footprint: NewCarbonFootprint) -> StoreResult<CarbonFootprint>;
    async fn update_footprint(
        &self,
        id: Id,
        update: CarbonFootprintUpdate,
    ) -> StoreResult<Option<CarbonFootprint>>;
    async fn delete_footprint(&self, id: Id) -> StoreResult<Option<CarbonFootprint>>;
}

#[async_trait::async_trait]
pub trait SequestrationStore: Send + Sync {
    async fn get_sequestration(&self, id: Id) -> StoreResult<Option<CarbonSequestration>>;
    async fn list_sequestrations_for_source(
        &self,
        source_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonSequestration>>;
    async fn create_sequestration(
        &self,
        sequestration: NewCarbonSequestration,
    ) -> StoreResult<CarbonSequestration>;
    async fn update_sequestration(
        &self,
        id: Id,
        update: CarbonSequestrationUpdate,
    ) -> StoreResult<Option<CarbonSequestration>>;
    async fn delete_sequestration(&self, id: Id) -> StoreResult<Option<CarbonSequestration>>;
}

#[async_trait::async_trait]
pub trait OffsetStore: Send + Sync {
    async fn get_offset(&self, id: Id) -> StoreResult<Option<CarbonOffset>>;
    async fn list_offsets_for_company(
        &self,
        company_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonOffset>>;
    async fn create_offset(&self, offset: NewCarbonOffset) -> StoreResult<CarbonOffset>;
    async fn update_offset(
        &self,
        id: Id,
        update: CarbonOffsetUpdate,
    ) -> StoreResult<Option<CarbonOffset>>;
    async fn delete_offset(&self, id: Id) -> StoreResult<Option<CarbonOffset>>;
}

#[async_trait::async_trait]
pub trait RegulationStore: Send + Sync {
    async fn get_regulation(&self, id: Id) -> StoreResult<Option<CarbonRegulation>>;
    async fn find_regulation_by_name(&self, name: &str) -> StoreResult<Option<CarbonRegulation>>;
    async fn list_regulations(&self, page: Page) -> StoreResult<Vec<CarbonRegulation>>;
    async fn create_regulation(
        &self,
        regulation: NewCarbonRegulation,
    ) -> StoreResult<CarbonRegulation>;
    async fn update_regulation(
        &self,
        id: Id,
        update: CarbonRegulationUpdate,
    ) -> StoreResult<Option<CarbonRegulation>>;
    async fn delete_regulation(&self, id: Id) -> StoreResult<Option<CarbonRegulation>>;
}

pub trait Store:
    CompanyStore
    + BranchStore
    + EmissionsSourceStore
    + FootprintStore
    + SequestrationStore
    + OffsetStore
    + RegulationStore
    + Send
    + Sync
{
}
