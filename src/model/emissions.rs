use crate::model::common::{
    require_finite, require_non_empty, require_non_negative, Field, Id, InvalidInput,
};
use serde::{Deserialize, Serialize};

/// Branch-level source of carbon output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonEmissionsSource {
    pub id: Id,
    pub branch_id: Option<Id>,
    pub source_type: String,
    pub total_emission_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCarbonEmissionsSource {
    pub source_type: String,
    pub total_emission_value: f64,
    pub branch_id: Id,
}

impl NewCarbonEmissionsSource {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        require_non_empty("source_type", &self.source_type)?;
        require_non_negative("total_emission_value", self.total_emission_value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CarbonEmissionsSourceUpdate {
    #[serde(default)]
    pub source_type: Field<String>,
    #[serde(default)]
    pub total_emission_value: Field<f64>,
    #[serde(default)]
    pub branch_id: Field<Id>,
}

impl CarbonEmissionsSourceUpdate {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if let Some(source_type) = self.source_type.as_present() {
            require_non_empty("source_type", source_type)?;
        }
        if let Some(value) = self.total_emission_value.as_present() {
            require_non_negative("total_emission_value", *value)?;
        }
        Ok(())
    }

    pub fn apply(self, source: &mut CarbonEmissionsSource) {
        self.source_type.apply_to(&mut source.source_type);
        self.total_emission_value
            .apply_to(&mut source.total_emission_value);
        if let Field::Present(branch_id) = self.branch_id {
            source.branch_id = Some(branch_id);
        }
    }
}

/// A single emission measurement recorded against a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonFootprint {
    pub id: Id,
    pub source_id: Option<Id>,
    pub footprint_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCarbonFootprint {
    pub footprint_value: f64,
    pub source_id: Id,
}

impl NewCarbonFootprint {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        require_finite("footprint_value", self.footprint_value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CarbonFootprintUpdate {
    #[serde(default)]
    pub footprint_value: Field<f64>,
    #[serde(default)]
    pub source_id: Field<Id>,
}

impl CarbonFootprintUpdate {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if let Some(value) = self.footprint_value.as_present() {
            require_finite("footprint_value", *value)?;
        }
        Ok(())
    }

    pub fn apply(self, footprint: &mut CarbonFootprint) {
        self.footprint_value.apply_to(&mut footprint.footprint_value);
        if let Field::Present(source_id) = self.source_id {
            footprint.source_id = Some(source_id);
        }
    }
}

/// A single carbon-capture measurement recorded against a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonSequestration {
    pub id: Id,
    pub source_id: Option<Id>,
    pub seq_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCarbonSequestration {
    pub seq_value: f64,
    pub source_id: Id,
}

impl NewCarbonSequestration {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        require_finite("seq_value", self.seq_value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CarbonSequestrationUpdate {
    #[serde(default)]
    pub seq_value: Field<f64>,
    #[serde(default)]
    pub source_id: Field<Id>,
}

impl CarbonSequestrationUpdate {
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if let Some(value) = self.seq_value.as_present() {
            require_finite("seq_value", *value)?;
        }
        Ok(())
    }

    pub fn apply(self, sequestration: &mut CarbonSequestration) {
        self.seq_value.apply_to(&mut sequestration.seq_value);
        if let Field::Present(source_id) = self.source_id {
            sequestration.source_id = Some(source_id);
        }
    }
}
