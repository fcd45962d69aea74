use crate::model::common::{require_non_empty, Field, Id, InvalidInput};
use serde::{Deserialize, Serialize};

/// Top-level entity owning branches and carbon offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Id,
    pub c_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCompany {
    pub c_name: String,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        require_non_empty("c_name", &self.c_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub c_name: Field<String>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if let Some(name) = self.c_name.as_present() {
            require_non_empty("c_name", name)?;
        }
        Ok(())
    }

    pub fn apply(self, company: &mut Company) {
        self.c_name.apply_to(&mut company.c_name);
    }
}

/// A company's operating location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyBranch {
    pub id: Id,
    /// `None` once the owning company was deleted under the orphan policy.
    pub company_id: Option<Id>,
    pub branch_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCompanyBranch {
    pub branch_name: String,
    pub company_id: Id,
}

impl NewCompanyBranch {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        require_non_empty("branch_name", &self.branch_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyBranchUpdate {
    #[serde(default)]
    pub branch_name: Field<String>,
    #[serde(default)]
    pub company_id: Field<Id>,
}

impl CompanyBranchUpdate {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if let Some(name) = self.branch_name.as_present() {
            require_non_empty("branch_name", name)?;
        }
        Ok(())
    }

    pub fn apply(self, branch: &mut CompanyBranch) {
        self.branch_name.apply_to(&mut branch.branch_name);
        if let Field::Present(company_id) = self.company_id {
            branch.company_id = Some(company_id);
        }
    }
}
