use crate::model::common::{require_non_empty, Field, Id, InvalidInput};
use serde::{Deserialize, Serialize};

/// Standalone named compliance rule; not linked to any other entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonRegulation {
    pub id: Id,
    pub regulation_name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCarbonRegulation {
    pub regulation_name: String,
    pub description: String,
}

impl NewCarbonRegulation {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        require_non_empty("regulation_name", &self.regulation_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CarbonRegulationUpdate {
    #[serde(default)]
    pub regulation_name: Field<String>,
    #[serde(default)]
    pub description: Field<String>,
}

impl CarbonRegulationUpdate {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if let Some(name) = self.regulation_name.as_present() {
            require_non_empty("regulation_name", name)?;
        }
        Ok(())
    }

    pub fn apply(self, regulation: &mut CarbonRegulation) {
        self.regulation_name
            .apply_to(&mut regulation.regulation_name);
        self.description.apply_to(&mut regulation.description);
    }
}
