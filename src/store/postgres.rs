use anyhow::{anyhow, Context};
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgConnection, PgPool, Row,
};

use crate::model::{
    CarbonEmissionsSource, CarbonEmissionsSourceUpdate, CarbonFootprint, CarbonFootprintUpdate,
    CarbonOffset, CarbonOffsetUpdate, CarbonRegulation, CarbonRegulationUpdate,
    CarbonSequestration, CarbonSequestrationUpdate, Company, CompanyBranch, CompanyBranchUpdate,
    CompanyUpdate, Id, NewCarbonEmissionsSource, NewCarbonFootprint, NewCarbonOffset,
    NewCarbonRegulation, NewCarbonSequestration, NewCompany, NewCompanyBranch, OffsetType, Page,
};
use crate::store::traits::{
    BranchStore, CompanyStore, EmissionsSourceStore, FootprintStore, OffsetStore,
    RegulationStore, SequestrationStore, Store,
};
use crate::store::{DeletePolicy, StoreError, StoreResult};

const COMPANY_CONFLICT: &str = "Company already registered";
const REGULATION_CONFLICT: &str = "Regulation already exists";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    delete_policy: DeletePolicy,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self {
            pool,
            delete_policy: DeletePolicy::default(),
        })
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Run database migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Delete a row that owns children, honouring the configured policy.
    /// The lock, the policy work and the delete share one transaction.
    async fn delete_owner<T>(
        &self,
        id: Id,
        owner: &Owner,
        map: fn(&PgRow) -> T,
    ) -> StoreResult<Option<T>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let exists = sqlx::query(owner.lock_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .with_context(|| format!("Failed to lock {}", owner.entity))?;
        if exists.is_none() {
            return Ok(None);
        }

        match self.delete_policy {
            DeletePolicy::Orphan => {
                // ON DELETE SET NULL clears the children's references.
            }
            DeletePolicy::Restrict => {
                for &(child, count_sql) in owner.children {
                    let dependents = count_rows(&mut *tx, count_sql, id).await?;
                    if dependents > 0 {
                        return Err(StoreError::HasDependents {
                            entity: owner.entity,
                            id,
                            child,
                            dependents,
                        });
                    }
                }
            }
            DeletePolicy::Cascade => {
                for &sql in owner.cascade {
                    sqlx::query(sql)
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                        .with_context(|| format!("Failed to cascade {} delete", owner.entity))?;
                }
            }
        }

        let row = sqlx::query(owner.delete_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete {}", owner.entity))?;
        tx.commit().await.context("Failed to commit delete")?;

        Ok(row.as_ref().map(map))
    }
}

/// SQL needed to delete one kind of parent row under any [`DeletePolicy`].
struct Owner {
    entity: &'static str,
    lock_sql: &'static str,
    delete_sql: &'static str,
    /// `(child name, COUNT(*) query)` pairs checked by the restrict policy.
    children: &'static [(&'static str, &'static str)],
    /// Statements run, in order, by the cascade policy (descendants first).
    cascade: &'static [&'static str],
}

const COMPANY_OWNER: Owner = Owner {
    entity: "company",
    lock_sql: "SELECT id FROM companies WHERE id = $1 FOR UPDATE",
    delete_sql: "DELETE FROM companies WHERE id = $1 RETURNING id, c_name",
    children: &[
        ("branch", "SELECT COUNT(*) FROM company_branches WHERE company_id = $1"),
        ("carbon offset", "SELECT COUNT(*) FROM carbon_offsets WHERE company_id = $1"),
    ],
    cascade: &[
        "DELETE FROM carbon_footprints WHERE source_id IN (
            SELECT s.id FROM carbon_emissions_sources s
            JOIN company_branches b ON s.branch_id = b.id
            WHERE b.company_id = $1)",
        "DELETE FROM carbon_sequestrations WHERE source_id IN (
            SELECT s.id FROM carbon_emissions_sources s
            JOIN company_branches b ON s.branch_id = b.id
            WHERE b.company_id = $1)",
        "DELETE FROM carbon_emissions_sources WHERE branch_id IN (
            SELECT id FROM company_branches WHERE company_id = $1)",
        "DELETE FROM company_branches WHERE company_id = $1",
        "DELETE FROM carbon_offsets WHERE company_id = $1",
    ],
};

const BRANCH_OWNER: Owner = Owner {
    entity: "branch",
    lock_sql: "SELECT id FROM company_branches WHERE id = $1 FOR UPDATE",
    delete_sql: "DELETE FROM company_branches WHERE id = $1 RETURNING id, company_id, branch_name",
    children: &[(
        "emissions source",
        "SELECT COUNT(*) FROM carbon_emissions_sources WHERE branch_id = $1",
    )],
    cascade: &[
        "DELETE FROM carbon_footprints WHERE source_id IN (
            SELECT id FROM carbon_emissions_sources WHERE branch_id = $1)",
        "DELETE FROM carbon_sequestrations WHERE source_id IN (
            SELECT id FROM carbon_emissions_sources WHERE branch_id = $1)",
        "DELETE FROM carbon_emissions_sources WHERE branch_id = $1",
    ],
};

const SOURCE_OWNER: Owner = Owner {
    entity: "emissions source",
    lock_sql: "SELECT id FROM carbon_emissions_sources WHERE id = $1 FOR UPDATE",
    delete_sql: "DELETE FROM carbon_emissions_sources WHERE id = $1
        RETURNING id, branch_id, source_type, total_emission_value",
    children: &[
        ("footprint", "SELECT COUNT(*) FROM carbon_footprints WHERE source_id = $1"),
        ("sequestration", "SELECT COUNT(*) FROM carbon_sequestrations WHERE source_id = $1"),
    ],
    cascade: &[
        "DELETE FROM carbon_footprints WHERE source_id = $1",
        "DELETE FROM carbon_sequestrations WHERE source_id = $1",
    ],
};

async fn count_rows(conn: &mut PgConnection, sql: &str, id: Id) -> StoreResult<i64> {
    let count: i64 = sqlx::query_scalar(sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .context("Failed to count dependent rows")?;
    Ok(count)
}

/// Unique violations become [`StoreError::Conflict`]; everything else is a backend failure.
fn write_error(err: sqlx::Error, context: &'static str, conflict: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(conflict.to_string());
        }
    }
    StoreError::Backend(anyhow::Error::new(err).context(context))
}

fn company_from_row(row: &PgRow) -> Company {
    Company {
        id: row.get("id"),
        c_name: row.get("c_name"),
    }
}

fn branch_from_row(row: &PgRow) -> CompanyBranch {
    CompanyBranch {
        id: row.get("id"),
        company_id: row.get("company_id"),
        branch_name: row.get("branch_name"),
    }
}

fn source_from_row(row: &PgRow) -> CarbonEmissionsSource {
    CarbonEmissionsSource {
        id: row.get("id"),
        branch_id: row.get("branch_id"),
        source_type: row.get("source_type"),
        total_emission_value: row.get("total_emission_value"),
    }
}

fn footprint_from_row(row: &PgRow) -> CarbonFootprint {
    CarbonFootprint {
        id: row.get("id"),
        source_id: row.get("source_id"),
        footprint_value: row.get("footprint_value"),
    }
}

fn sequestration_from_row(row: &PgRow) -> CarbonSequestration {
    CarbonSequestration {
        id: row.get("id"),
        source_id: row.get("source_id"),
        seq_value: row.get("seq_value"),
    }
}

fn offset_from_row(row: &PgRow) -> StoreResult<CarbonOffset> {
    let raw_type: String = row.get("offset_type");
    let offset_type: OffsetType = raw_type
        .parse()
        .map_err(|e| anyhow!("Corrupt carbon_offsets row: {}", e))?;

    Ok(CarbonOffset {
        id: row.get("id"),
        company_id: row.get("company_id"),
        offset_type,
        offset_amount: row.get("offset_amount"),
        date: row.get("date"),
    })
}

fn regulation_from_row(row: &PgRow) -> CarbonRegulation {
    CarbonRegulation {
        id: row.get("id"),
        regulation_name: row.get("regulation_name"),
        description: row.get("description"),
    }
}

#[async_trait::async_trait]
impl CompanyStore for PostgresStore {
    async fn get_company(&self, id: Id) -> StoreResult<Option<Company>> {
        let row = sqlx::query("SELECT id, c_name FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch company")?;

        Ok(row.as_ref().map(company_from_row))
    }

    async fn find_company_by_name(&self, c_name: &str) -> StoreResult<Option<Company>> {
        let row = sqlx::query("SELECT id, c_name FROM companies WHERE c_name = $1")
            .bind(c_name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch company by name")?;

        Ok(row.as_ref().map(company_from_row))
    }

    async fn list_companies(&self, page: Page) -> StoreResult<Vec<Company>> {
        let rows = sqlx::query("SELECT id, c_name FROM companies ORDER BY id OFFSET $1 LIMIT $2")
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list companies")?;

        Ok(rows.iter().map(company_from_row).collect())
    }

    async fn create_company(&self, company: NewCompany) -> StoreResult<Company> {
        let row = sqlx::query("INSERT INTO companies (c_name) VALUES ($1) RETURNING id, c_name")
            .bind(&company.c_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, "Failed to create company", COMPANY_CONFLICT))?;

        Ok(company_from_row(&row))
    }

    async fn update_company(&self, id: Id, update: CompanyUpdate) -> StoreResult<Option<Company>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query("SELECT id, c_name FROM companies WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to fetch company")?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut company = company_from_row(&row);
        update.apply(&mut company);

        sqlx::query("UPDATE companies SET c_name = $2 WHERE id = $1")
            .bind(id)
            .bind(&company.c_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, "Failed to update company", COMPANY_CONFLICT))?;
        tx.commit().await.context("Failed to commit company update")?;

        Ok(Some(company))
    }

    async fn delete_company(&self, id: Id) -> StoreResult<Option<Company>> {
        self.delete_owner(id, &COMPANY_OWNER, company_from_row).await
    }
}

#[async_trait::async_trait]
impl BranchStore for PostgresStore {
    async fn get_branch(&self, id: Id) -> StoreResult<Option<CompanyBranch>> {
        let row = sqlx::query("SELECT id, company_id, branch_name FROM company_branches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch branch")?;

        Ok(row.as_ref().map(branch_from_row))
    }

    async fn list_branches_for_company(
        &self,
        company_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CompanyBranch>> {
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, branch_name
            FROM company_branches
            WHERE company_id = $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(company_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list branches")?;

        Ok(rows.iter().map(branch_from_row).collect())
    }

    async fn create_branch(&self, branch: NewCompanyBranch) -> StoreResult<CompanyBranch> {
        let row = sqlx::query(
            r#"
            INSERT INTO company_branches (company_id, branch_name)
            VALUES ($1, $2)
            RETURNING id, company_id, branch_name
            "#,
        )
        .bind(branch.company_id)
        .bind(&branch.branch_name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create branch")?;

        Ok(branch_from_row(&row))
    }

    async fn update_branch(
        &self,
        id: Id,
        update: CompanyBranchUpdate,
    ) -> StoreResult<Option<CompanyBranch>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query(
            "SELECT id, company_id, branch_name FROM company_branches WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch branch")?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut branch = branch_from_row(&row);
        update.apply(&mut branch);

        sqlx::query("UPDATE company_branches SET company_id = $2, branch_name = $3 WHERE id = $1")
            .bind(id)
            .bind(branch.company_id)
            .bind(&branch.branch_name)
            .execute(&mut *tx)
            .await
            .context("Failed to update branch")?;
        tx.commit().await.context("Failed to commit branch update")?;

        Ok(Some(branch))
    }

    async fn delete_branch(&self, id: Id) -> StoreResult<Option<CompanyBranch>> {
        self.delete_owner(id, &BRANCH_OWNER, branch_from_row).await
    }
}

#[async_trait::async_trait]
impl EmissionsSourceStore for PostgresStore {
    async fn get_emissions_source(&self, id: Id) -> StoreResult<Option<CarbonEmissionsSource>> {
        let row = sqlx::query(
            r#"
            SELECT id, branch_id, source_type, total_emission_value
            FROM carbon_emissions_sources
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch emissions source")?;

        Ok(row.as_ref().map(source_from_row))
    }

    async fn list_emissions_sources_for_branch(
        &self,
        branch_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonEmissionsSource>> {
        let rows = sqlx::query(
            r#"
            SELECT id, branch_id, source_type, total_emission_value
            FROM carbon_emissions_sources
            WHERE branch_id = $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(branch_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list emissions sources")?;

        Ok(rows.iter().map(source_from_row).collect())
    }

    async fn create_emissions_source(
        &self,
        source: NewCarbonEmissionsSource,
    ) -> StoreResult<CarbonEmissionsSource> {
        let row = sqlx::query(
            r#"
            INSERT INTO carbon_emissions_sources (branch_id, source_type, total_emission_value)
            VALUES ($1, $2, $3)
            RETURNING id, branch_id, source_type, total_emission_value
            "#,
        )
        .bind(source.branch_id)
        .bind(&source.source_type)
        .bind(source.total_emission_value)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create emissions source")?;

        Ok(source_from_row(&row))
    }

    async fn update_emissions_source(
        &self,
        id: Id,
        update: CarbonEmissionsSourceUpdate,
    ) -> StoreResult<Option<CarbonEmissionsSource>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query(
            r#"
            SELECT id, branch_id, source_type, total_emission_value
            FROM carbon_emissions_sources
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch emissions source")?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut source = source_from_row(&row);
        update.apply(&mut source);

        sqlx::query(
            r#"
            UPDATE carbon_emissions_sources
            SET branch_id = $2, source_type = $3, total_emission_value = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(source.branch_id)
        .bind(&source.source_type)
        .bind(source.total_emission_value)
        .execute(&mut *tx)
        .await
        .context("Failed to update emissions source")?;
        tx.commit()
            .await
            .context("Failed to commit emissions source update")?;

        Ok(Some(source))
    }

    async fn delete_emissions_source(&self, id: Id) -> StoreResult<Option<CarbonEmissionsSource>> {
        self.delete_owner(id, &SOURCE_OWNER, source_from_row).await
    }
}

#[async_trait::async_trait]
impl FootprintStore for PostgresStore {
    async fn get_footprint(&self, id: Id) -> StoreResult<Option<CarbonFootprint>> {
        let row = sqlx::query("SELECT id, source_id, footprint_value FROM carbon_footprints WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch footprint")?;

        Ok(row.as_ref().map(footprint_from_row))
    }

    async fn list_footprints_for_source(
        &self,
        source_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonFootprint>> {
        let rows = sqlx::query(
            r#"
            SELECT id, source_id, footprint_value
            FROM carbon_footprints
            WHERE source_id = $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(source_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list footprints")?;

        Ok(rows.iter().map(footprint_from_row).collect())
    }

    async fn create_footprint(&self, footprint: NewCarbonFootprint) -> StoreResult<CarbonFootprint> {
        let row = sqlx::query(
            r#"
            INSERT INTO carbon_footprints (source_id, footprint_value)
            VALUES ($1, $2)
            RETURNING id, source_id, footprint_value
            "#,
        )
        .bind(footprint.source_id)
        .bind(footprint.footprint_value)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create footprint")?;

        Ok(footprint_from_row(&row))
    }

    async fn update_footprint(
        &self,
        id: Id,
        update: CarbonFootprintUpdate,
    ) -> StoreResult<Option<CarbonFootprint>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query(
            "SELECT id, source_id, footprint_value FROM carbon_footprints WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch footprint")?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut footprint = footprint_from_row(&row);
        update.apply(&mut footprint);

        sqlx::query("UPDATE carbon_footprints SET source_id = $2, footprint_value = $3 WHERE id = $1")
            .bind(id)
            .bind(footprint.source_id)
            .bind(footprint.footprint_value)
            .execute(&mut *tx)
            .await
            .context("Failed to update footprint")?;
        tx.commit().await.context("Failed to commit footprint update")?;

        Ok(Some(footprint))
    }

    async fn delete_footprint(&self, id: Id) -> StoreResult<Option<CarbonFootprint>> {
        let row = sqlx::query(
            "DELETE FROM carbon_footprints WHERE id = $1 RETURNING id, source_id, footprint_value",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete footprint")?;

        Ok(row.as_ref().map(footprint_from_row))
    }
}

#[async_trait::async_trait]
impl SequestrationStore for PostgresStore {
    async fn get_sequestration(&self, id: Id) -> StoreResult<Option<CarbonSequestration>> {
        let row = sqlx::query("SELECT id, source_id, seq_value FROM carbon_sequestrations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch sequestration")?;

        Ok(row.as_ref().map(sequestration_from_row))
    }

    async fn list_sequestrations_for_source(
        &self,
        source_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonSequestration>> {
        let rows = sqlx::query(
            r#"
            SELECT id, source_id, seq_value
            FROM carbon_sequestrations
            WHERE source_id = $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(source_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list sequestrations")?;

        Ok(rows.iter().map(sequestration_from_row).collect())
    }

    async fn create_sequestration(
        &self,
        sequestration: NewCarbonSequestration,
    ) -> StoreResult<CarbonSequestration> {
        let row = sqlx::query(
            r#"
            INSERT INTO carbon_sequestrations (source_id, seq_value)
            VALUES ($1, $2)
            RETURNING id, source_id, seq_value
            "#,
        )
        .bind(sequestration.source_id)
        .bind(sequestration.seq_value)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create sequestration")?;

        Ok(sequestration_from_row(&row))
    }

    async fn update_sequestration(
        &self,
        id: Id,
        update: CarbonSequestrationUpdate,
    ) -> StoreResult<Option<CarbonSequestration>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query(
            "SELECT id, source_id, seq_value FROM carbon_sequestrations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch sequestration")?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut sequestration = sequestration_from_row(&row);
        update.apply(&mut sequestration);

        sqlx::query("UPDATE carbon_sequestrations SET source_id = $2, seq_value = $3 WHERE id = $1")
            .bind(id)
            .bind(sequestration.source_id)
            .bind(sequestration.seq_value)
            .execute(&mut *tx)
            .await
            .context("Failed to update sequestration")?;
        tx.commit()
            .await
            .context("Failed to commit sequestration update")?;

        Ok(Some(sequestration))
    }

    async fn delete_sequestration(&self, id: Id) -> StoreResult<Option<CarbonSequestration>> {
        let row = sqlx::query(
            "DELETE FROM carbon_sequestrations WHERE id = $1 RETURNING id, source_id, seq_value",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete sequestration")?;

        Ok(row.as_ref().map(sequestration_from_row))
    }
}

#[async_trait::async_trait]
impl OffsetStore for PostgresStore {
    async fn get_offset(&self, id: Id) -> StoreResult<Option<CarbonOffset>> {
        let row = sqlx::query(
            "SELECT id, company_id, offset_type, offset_amount, date FROM carbon_offsets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch carbon offset")?;

        row.as_ref().map(offset_from_row).transpose()
    }

    async fn list_offsets_for_company(
        &self,
        company_id: Id,
        page: Page,
    ) -> StoreResult<Vec<CarbonOffset>> {
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, offset_type, offset_amount, date
            FROM carbon_offsets
            WHERE company_id = $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(company_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list carbon offsets")?;

        rows.iter().map(offset_from_row).collect()
    }

    async fn create_offset(&self, offset: NewCarbonOffset) -> StoreResult<CarbonOffset> {
        let row = sqlx::query(
            r#"
            INSERT INTO carbon_offsets (company_id, offset_type, offset_amount, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, company_id, offset_type, offset_amount, date
            "#,
        )
        .bind(offset.company_id)
        .bind(offset.offset_type.as_str())
        .bind(offset.offset_amount)
        .bind(offset.date)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create carbon offset")?;

        offset_from_row(&row)
    }

    async fn update_offset(
        &self,
        id: Id,
        update: CarbonOffsetUpdate,
    ) -> StoreResult<Option<CarbonOffset>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query(
            r#"
            SELECT id, company_id, offset_type, offset_amount, date
            FROM carbon_offsets
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch carbon offset")?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut offset = offset_from_row(&row)?;
        update.apply(&mut offset);

        sqlx::query(
            r#"
            UPDATE carbon_offsets
            SET company_id = $2, offset_type = $3, offset_amount = $4, date = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(offset.company_id)
        .bind(offset.offset_type.as_str())
        .bind(offset.offset_amount)
        .bind(offset.date)
        .execute(&mut *tx)
        .await
        .context("Failed to update carbon offset")?;
        tx.commit().await.context("Failed to commit carbon offset update")?;

        Ok(Some(offset))
    }

    async fn delete_offset(&self, id: Id) -> StoreResult<Option<CarbonOffset>> {
        let row = sqlx::query(
            r#"
            DELETE FROM carbon_offsets WHERE id = $1
            RETURNING id, company_id, offset_type, offset_amount, date
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete carbon offset")?;

        row.as_ref().map(offset_from_row).transpose()
    }
}

#[async_trait::async_trait]
impl RegulationStore for PostgresStore {
    async fn get_regulation(&self, id: Id) -> StoreResult<Option<CarbonRegulation>> {
        let row = sqlx::query(
            "SELECT id, regulation_name, description FROM carbon_regulations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch regulation")?;

        Ok(row.as_ref().map(regulation_from_row))
    }

    async fn find_regulation_by_name(&self, name: &str) -> StoreResult<Option<CarbonRegulation>> {
        let row = sqlx::query(
            "SELECT id, regulation_name, description FROM carbon_regulations WHERE regulation_name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch regulation by name")?;

        Ok(row.as_ref().map(regulation_from_row))
    }

    async fn list_regulations(&self, page: Page) -> StoreResult<Vec<CarbonRegulation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, regulation_name, description
            FROM carbon_regulations
            ORDER BY id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list regulations")?;

        Ok(rows.iter().map(regulation_from_row).collect())
    }

    async fn create_regulation(
        &self,
        regulation: NewCarbonRegulation,
    ) -> StoreResult<CarbonRegulation> {
        let row = sqlx::query(
            r#"
            INSERT INTO carbon_regulations (regulation_name, description)
            VALUES ($1, $2)
            RETURNING id, regulation_name, description
            "#,
        )
        .bind(&regulation.regulation_name)
        .bind(&regulation.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "Failed to create regulation", REGULATION_CONFLICT))?;

        Ok(regulation_from_row(&row))
    }

    async fn update_regulation(
        &self,
        id: Id,
        update: CarbonRegulationUpdate,
    ) -> StoreResult<Option<CarbonRegulation>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query(
            "SELECT id, regulation_name, description FROM carbon_regulations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch regulation")?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut regulation = regulation_from_row(&row);
        update.apply(&mut regulation);

        sqlx::query(
            "UPDATE carbon_regulations SET regulation_name = $2, description = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(&regulation.regulation_name)
        .bind(&regulation.description)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, "Failed to update regulation", REGULATION_CONFLICT))?;
        tx.commit().await.context("Failed to commit regulation update")?;

        Ok(Some(regulation))
    }

    async fn delete_regulation(&self, id: Id) -> StoreResult<Option<CarbonRegulation>> {
        let row = sqlx::query(
            "DELETE FROM carbon_regulations WHERE id = $1 RETURNING id, regulation_name, description",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete regulation")?;

        Ok(row.as_ref().map(regulation_from_row))
    }
}

impl Store for PostgresStore {}
