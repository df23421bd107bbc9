//! Contracts for teams

use pm_core::error::ValidationErrors;
use pm_core::Id;
use serde::Deserialize;

use crate::base::{validate_max_length, validate_not_blank, validate_present, Contract, ValidationResult};

/// Body of `POST /api/teams` and `PUT /api/teams/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub manager_id: Option<Id>,
    pub members: Option<Vec<Id>>,
}

pub struct TeamCreateContract;

impl Contract<TeamParams> for TeamCreateContract {
    fn validate(&self, params: &TeamParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_present("name", params.name.as_deref(), &mut errors);
        validate_max_length("name", params.name.as_deref(), 100, &mut errors);
        errors.into_result()
    }
}

pub struct TeamUpdateContract;

impl Contract<TeamParams> for TeamUpdateContract {
    fn validate(&self, params: &TeamParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_not_blank("name", params.name.as_deref(), &mut errors);
        validate_max_length("name", params.name.as_deref(), 100, &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_contracts() {
        assert!(TeamCreateContract.validate(&TeamParams::default()).is_err());
        assert!(TeamUpdateContract.validate(&TeamParams::default()).is_ok());

        let params = TeamParams {
            name: Some("Platform".into()),
            ..Default::default()
        };
        assert!(TeamCreateContract.validate(&params).is_ok());
    }
}
