use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::model::{
    CarbonEmissionsSource, CarbonEmissionsSourceUpdate, CarbonFootprint, CarbonFootprintUpdate,
    CarbonOffset, CarbonOffsetUpdate, CarbonRegulation, CarbonRegulationUpdate,
    CarbonSequestration, CarbonSequestrationUpdate, Company, CompanyBranch, CompanyBranchUpdate,
    CompanyUpdate, Id, NewCarbonEmissionsSource, NewCarbonFootprint, NewCarbonOffset,
    NewCarbonRegulation, NewCarbonSequestration, NewCompany, NewCompanyBranch, Page,
};
use crate::store::traits::{
    BranchStore, CompanyStore, EmissionsSourceStore, FootprintStore, OffsetStore,
    RegulationStore, SequestrationStore, Store,
};
use crate::store::{DeletePolicy, StoreError, StoreResult};

/// One table: rows keyed by id, ids handed out like a `BIGSERIAL` sequence.
#[derive(Debug)]
struct Table<T> {
    last_id: Id,
    rows: BTreeMap<Id, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(Id) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn get(&self, id: Id) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn page(&self, page: Page, keep: impl Fn(&T) -> bool) -> Vec<T> {
        page.slice(self.rows.values().filter(|row| keep(row)).cloned())
    }

    fn ids_where(&self, keep: impl Fn(&T) -> bool) -> Vec<Id> {
        self.rows
            .iter()
            .filter(|(_, row)| keep(row))
            .map(|(id, _)| *id)
            .collect()
    }

    fn count_where(&self, keep: impl Fn(&T) -> bool) -> i64 {
        self.rows.values().filter(|row| keep(row)).count() as i64
    }
}

#[derive(Debug)]
struct Tables {
    companies: Table<Company>,
    branches: Table<CompanyBranch>,
    sources: Table<CarbonEmissionsSource>,
    footprints: Table<CarbonFootprint>,
    sequestrations: Table<CarbonSequestration>,
    offsets: Table<CarbonOffset>,
    regulations: Table<CarbonRegulation>,
}

impl Tables {
    fn new() -> Self {
        Self {
            companies: Table::new(),
            branches: Table::new(),
            sources: Table::new(),
            footprints: Table::new(),
            sequestrations: Table::new(),
            offsets: Table::new(),
            regulations: Table::new(),
        }
    }

    fn company_name_taken(&self, c_name: &str, except: Option<Id>) -> bool {
        self.companies
            .rows
            .values()
            .any(|c| c.c_name == c_name && Some(c.id) != except)
    }

    fn regulation_name_taken(&self, name: &str, except: Option<Id>) -> bool {
        self.regulations
            .rows
            .values()
            .any(|r| r.regulation_name == name && Some(r.id) != except)
    }

    fn release_source_children(&mut self, source_id: Id, policy: DeletePolicy) -> StoreResult<()> {
        let owned = Some(source_id);
        match policy {
            DeletePolicy::Restrict => {
                let footprints = self.footprints.count_where(|f| f.source_id == owned);
                if footprints > 0 {
                    return Err(has_dependents("emissions source", source_id, "footprint", footprints));
                }
                let sequestrations = self.sequestrations.count_where(|s| s.source_id == owned);
                if sequestrations > 0 {
                    return Err(has_dependents(
                        "emissions source",
                        source_id,
                        "sequestration",
                        sequestrations,
                    ));
                }
            }
            DeletePolicy::Orphan => {
                for footprint in self.footprints.rows.values_mut().filter(|f| f.source_id == owned) {
                    footprint.source_id = None;
                }
                for seq in self.sequestrations.rows.values_mut().filter(|s| s.source_id == owned) {
                    seq.source_id = None;
                }
            }
            DeletePolicy::Cascade => {
                self.footprints.rows.retain(|_, f| f.source_id != owned);
                self.sequestrations.rows.retain(|_, s| s.source_id != owned);
            }
        }
        Ok(())
    }

    fn release_branch_children(&mut self, branch_id: Id, policy: DeletePolicy) -> StoreResult<()> {
        let owned = Some(branch_id);
        match policy {
            DeletePolicy::Restrict => {
                let sources = self.sources.count_where(|s| s.branch_id == owned);
                if sources > 0 {
                    return Err(has_dependents("branch", branch_id, "emissions source", sources));
                }
            }
            DeletePolicy::Orphan => {
                for source in self.sources.rows.values_mut().filter(|s| s.branch_id == owned) {
                    source.branch_id = None;
                }
            }
            DeletePolicy::Cascade => {
                for source_id in self.sources.ids_where(|s| s.branch_id == owned) {
                    self.release_source_children(source_id, policy)?;
                    self.sources.rows.remove(&source_id);
                }
            }
        }
        Ok(())
    }

    fn release_company_children(&mut self, company_id: Id, policy: DeletePolicy) -> StoreResult<()> {
        let owned = Some(company_id);
        match policy {
            DeletePolicy::Restrict => {
                let branches = self.branches.count_where(|b| b.company_id == owned);
                if branches > 0 {
                    return Err(has_dependents("company", company_id, "branch", branches));
                }
                let offsets = self.offsets.count_where(|o| o.company_id == owned);
                if offsets > 0 {
                    return Err(has_dependents("company", company_id, "carbon offset", offsets));
                }
            }
            DeletePolicy::Orphan => {
                for branch in self.branches.rows.values_mut().filter(|b| b.company_id == owned) {
                    branch.company_id = None;
                }
                for offset in self.offsets.rows.values_mut().filter(|o| o.company_id == owned) {
                    offset.company_id = None;
                }
            }
            DeletePolicy::Cascade => {
                for branch_id in self.branches.ids_where(|b| b.company_id == owned) {
                    self.release_branch_children(branch_id, policy)?;
                    self.branches.rows.remove(&branch_id);
                }
                self.offsets.rows.retain(|_, o| o.company_id != owned);
            }
        }
        Ok(())
    }
}

fn has_dependents(entity: &'static str, id: Id, child: &'static str, dependents: i64) -> StoreError {
    StoreError::HasDependents {
        entity,
        id,
        child,
        dependents,
    }
}

/// Process-local store with the same contract as [`crate::store::PostgresStore`].
///
/// Every operation runs under a single lock acquisition, which gives each
/// mutation the same all-or-nothing behaviour as a one-statement transaction.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    delete_policy: DeletePolicy,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }
}

#[async_trait::async_trait]
impl CompanyStore for MemoryStore {
    async fn get_company(&self, id: Id) -> StoreResult<Option<Company>> {
        Ok(self.tables.read().companies.get(id))
    }

    async fn find_company_by_name(&self, c_name: &str) -> StoreResult<Option<Company>> {
        let tables = self.tables.read();
        Ok(tables
            .companies
            .rows
            .values()
            .find(|c| c.c_name == c_name)
            .cloned())
    }

    async fn list_companies(&self, page: Page) -> StoreResult<Vec<Company>> {
        Ok(self.tables.read().companies.page(page, |_| true))
    }

    async fn create_company(&self, company: NewCompany) -> StoreResult<Company> {
        let mut tables = self.tables.write();
        if tables.company_name_taken(&company.c_name, None) {
            return Err(StoreError::Conflict("Company already registered".to_string()));
        }
        Ok(tables.companies.insert_with(|id| Company {
            id,
            c_name: company.c_name,
        }))
    }

    async fn update_company(&self, id: Id, update: CompanyUpdate) -> StoreResult<Option<Company>> {
        let mut tables = self.tables.write();
        let Some(mut company) = tables.companies.get(id) else {
            return Ok(None);
        };
        update.apply(&mut company);
        if tables.company_name_taken(&company.c_name, Some(id)) {
            return Err(StoreError::Conflict("Company already registered".to_string()));
        }
        tables.companies.rows.insert(id, company.clone());
        Ok(Some(company))
    }

    async fn delete_company(&self, id: Id) -> StoreResult<Option<Company>> {
        let mut tables = self.tables.write();
        if !tables.companies.rows.contains_key(&id) {
            return Ok(None);
        }
        tables.release_company_children(id, self.delete_policy)?;
        Ok(tables.companies.rows.remove(&id))
    }
}

#[async_trait::async_trait]
impl BranchStore for MemoryStore {
    async fn get_branch(&self, id: Id) -> StoreResult<Option<CompanyBranch>> {
        Ok(self.tables.read().branches.get(id))
    }

    async fn list_branches_for_company(
        &self,
        company_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CompanyBranch>> {
        Ok(self
            .tables
            .read()
            .branches
            .page(page, |b| b.company_id == Some(company_id)))
    }

    async fn create_branch(&self, branch: NewCompanyBranch) -> StoreResult<CompanyBranch> {
        Ok(self.tables.write().branches.insert_with(|id| CompanyBranch {
            id,
            company_id: Some(branch.company_id),
            branch_name: branch.branch_name,
        }))
    }

    async fn update_branch(
        &self,
        id: Id,
        update: CompanyBranchUpdate,
    ) -> StoreResult<Option<CompanyBranch>> {
        let mut tables = self.tables.write();
        let Some(branch) = tables.branches.rows.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(branch);
        Ok(Some(branch.clone()))
    }

    async fn delete_branch(&self, id: Id) -> StoreResult<Option<CompanyBranch>> {
        let mut tables = self.tables.write();
        if !tables.branches.rows.contains_key(&id) {
            return Ok(None);
        }
        tables.release_branch_children(id, self.delete_policy)?;
        Ok(tables.branches.rows.remove(&id))
    }
}

#[async_trait::async_trait]
impl EmissionsSourceStore for MemoryStore {
    async fn get_emissions_source(&self, id: Id) -> StoreResult<Option<CarbonEmissionsSource>> {
        Ok(self.tables.read().sources.get(id))
    }

    async fn list_emissions_sources_for_branch(
        &self,
        branch_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonEmissionsSource>> {
        Ok(self
            .tables
            .read()
            .sources
            .page(page, |s| s.branch_id == Some(branch_id)))
    }

    async fn create_emissions_source(
        &self,
        source: NewCarbonEmissionsSource,
    ) -> StoreResult<CarbonEmissionsSource> {
        Ok(self.tables.write().sources.insert_with(|id| CarbonEmissionsSource {
            id,
            branch_id: Some(source.branch_id),
            source_type: source.source_type,
            total_emission_value: source.total_emission_value,
        }))
    }

    async fn update_emissions_source(
        &self,
        id: Id,
        update: CarbonEmissionsSourceUpdate,
    ) -> StoreResult<Option<CarbonEmissionsSource>> {
        let mut tables = self.tables.write();
        let Some(source) = tables.sources.rows.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(source);
        Ok(Some(source.clone()))
    }

    async fn delete_emissions_source(&self, id: Id) -> StoreResult<Option<CarbonEmissionsSource>> {
        let mut tables = self.tables.write();
        if !tables.sources.rows.contains_key(&id) {
            return Ok(None);
        }
        tables.release_source_children(id, self.delete_policy)?;
        Ok(tables.sources.rows.remove(&id))
    }
}

#[async_trait::async_trait]
impl FootprintStore for MemoryStore {
    async fn get_footprint(&self, id: Id) -> StoreResult<Option<CarbonFootprint>> {
        Ok(self.tables.read().footprints.get(id))
    }

    async fn list_footprints_for_source(
        &self,
        source_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonFootprint>> {
        Ok(self
            .tables
            .read()
            .footprints
            .page(page, |f| f.source_id == Some(source_id)))
    }

    async fn create_footprint(&self, footprint: NewCarbonFootprint) -> StoreResult<CarbonFootprint> {
        Ok(self.tables.write().footprints.insert_with(|id| CarbonFootprint {
            id,
            source_id: Some(footprint.source_id),
            footprint_value: footprint.footprint_value,
        }))
    }

    async fn update_footprint(
        &self,
        id: Id,
        update: CarbonFootprintUpdate,
    ) -> StoreResult<Option<CarbonFootprint>> {
        let mut tables = self.tables.write();
        let Some(footprint) = tables.footprints.rows.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(footprint);
        Ok(Some(footprint.clone()))
    }

    async fn delete_footprint(&self, id: Id) -> StoreResult<Option<CarbonFootprint>> {
        Ok(self.tables.write().footprints.rows.remove(&id))
    }
}

#[async_trait::async_trait]
impl SequestrationStore for MemoryStore {
    async fn get_sequestration(&self, id: Id) -> StoreResult<Option<CarbonSequestration>> {
        Ok(self.tables.read().sequestrations.get(id))
    }

    async fn list_sequestrations_for_source(
        &self,
        source_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonSequestration>> {
        Ok(self
            .tables
            .read()
            .sequestrations
            .page(page, |s| s.source_id == Some(source_id)))
    }

    async fn create_sequestration(
        &self,
        sequestration: NewCarbonSequestration,
    ) -> StoreResult<CarbonSequestration> {
        Ok(self
            .tables
            .write()
            .sequestrations
            .insert_with(|id| CarbonSequestration {
                id,
                source_id: Some(sequestration.source_id),
                seq_value: sequestration.seq_value,
            }))
    }

    async fn update_sequestration(
        &self,
        id: Id,
        update: CarbonSequestrationUpdate,
    ) -> StoreResult<Option<CarbonSequestration>> {
        let mut tables = self.tables.write();
        let Some(sequestration) = tables.sequestrations.rows.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(sequestration);
        Ok(Some(sequestration.clone()))
    }

    async fn delete_sequestration(&self, id: Id) -> StoreResult<Option<CarbonSequestration>> {
        Ok(self.tables.write().sequestrations.rows.remove(&id))
    }
}

#[async_trait::async_trait]
impl OffsetStore for MemoryStore {
    async fn get_offset(&self, id: Id) -> StoreResult<Option<CarbonOffset>> {
        Ok(self.tables.read().offsets.get(id))
    }

    async fn list_offsets_for_company(
        &self,
        company_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonOffset>> {
        Ok(self
            .tables
            .read()
            .offsets
            .page(page, |o| o.company_id == Some(company_id)))
    }

    async fn create_offset(&self, offset: NewCarbonOffset) -> StoreResult<CarbonOffset> {
        Ok(self.tables.write().offsets.insert_with(|id| CarbonOffset {
            id,
            company_id: Some(offset.company_id),
            offset_type: offset.offset_type,
            offset_amount: offset.offset_amount,
            date: offset.date,
        }))
    }

    async fn update_offset(
        &self,
        id: Id,
        update: CarbonOffsetUpdate,
    ) -> StoreResult<Option<CarbonOffset>> {
        let mut tables = self.tables.write();
        let Some(offset) = tables.offsets.rows.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(offset);
        Ok(Some(offset.clone()))
    }

    async fn delete_offset(&self, id: Id) -> StoreResult<Option<CarbonOffset>> {
        Ok(self.tables.write().offsets.rows.remove(&id))
    }
}

#[async_trait::async_trait]
impl RegulationStore for MemoryStore {
    async fn get_regulation(&self, id: Id) -> StoreResult<Option<CarbonRegulation>> {
        Ok(self.tables.read().regulations.get(id))
    }

    async fn find_regulation_by_name(&self, name: &str) -> StoreResult<Option<CarbonRegulation>> {
        let tables = self.tables.read();
        Ok(tables
            .regulations
            .rows
            .values()
            .find(|r| r.regulation_name == name)
            .cloned())
    }

    async fn list_regulations(&self, page: Page) -> StoreResult<Vec<CarbonRegulation>> {
        Ok(self.tables.read().regulations.page(page, |_| true))
    }

    async fn create_regulation(
        &self,
        regulation: NewCarbonRegulation,
    ) -> StoreResult<CarbonRegulation> {
        let mut tables = self.tables.write();
        if tables.regulation_name_taken(&regulation.regulation_name, None) {
            return Err(StoreError::Conflict("Regulation already exists".to_string()));
        }
        Ok(tables.regulations.insert_with(|id| CarbonRegulation {
            id,
            regulation_name: regulation.regulation_name,
            description: regulation.description,
        }))
    }

    async fn update_regulation(
        &self,
        id: Id,
        update: CarbonRegulationUpdate,
    ) -> StoreResult<Option<CarbonRegulation>> {
        let mut tables = self.tables.write();
        let Some(mut regulation) = tables.regulations.get(id) else {
            return Ok(None);
        };
        update.apply(&mut regulation);
        if tables.regulation_name_taken(&regulation.regulation_name, Some(id)) {
            return Err(StoreError::Conflict("Regulation already exists".to_string()));
        }
        tables.regulations.rows.insert(id, regulation.clone());
        Ok(Some(regulation))
    }

    async fn delete_regulation(&self, id: Id) -> StoreResult<Option<CarbonRegulation>> {
        Ok(self.tables.write().regulations.rows.remove(&id))
    }
}

impl Store for MemoryStore {}
