use crate::model::{Field, Id, InvalidInput};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetType {
    RenewableEnergyProjects,
    Reforestation,
}

impl OffsetType {
    pub const ALL: [OffsetType; 2] = [OffsetType::RenewableEnergyProjects, OffsetType::Reforestation];

    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetType::RenewableEnergyProjects => "renewable_energy_projects",
            OffsetType::Reforestation => "reforestation",
        }
    }
}

impl fmt::Display for OffsetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffsetType {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "renewable_energy_projects" => Ok(OffsetType::RenewableEnergyProjects),
            "reforestation" => Ok(OffsetType::Reforestation),
            other => Err(InvalidInput(format!("unknown offset_type '{}'", other))),
        }
    }
}

/// Company-level purchased or claimed carbon offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonOffset {
    pub id: Id,
    pub company_id: Option<Id>,
    pub offset_type: OffsetType,
    pub offset_amount: i64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCarbonOffset {
    pub offset_type: OffsetType,
    pub offset_amount: i64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub company_id: Id,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CarbonOffsetUpdate {
    #[serde(default)]
    pub offset_type: Field<OffsetType>,
    #[serde(default)]
    pub offset_amount: Field<i64>,
    #[serde(default)]
    pub date: Field<Option<NaiveDate>>,
    #[serde(default)]
    pub company_id: Field<Id>,
}

impl CarbonOffsetUpdate {
    pub fn apply(self, offset: &mut CarbonOffset) {
        self.offset_type.apply_to(&mut offset.offset_type);
        self.offset_amount.apply_to(&mut offset.offset_amount);
        self.date.apply_to(&mut offset.date);
        if let Field::Present(company_id) = self.company_id {
            offset.company_id = Some(company_id);
        }
    }
}

/// Response body of the per-company offset total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonOffsetTotal {
    pub company_id: Id,
    /// Widened so that no set of `i64` amounts can overflow the sum.
    pub total_offset_amount: i128,
}
