//! Presence checks applied before a save or start request is sent
//!
//! Views only enable submission once the required fields are filled in; no
//! deeper validation is performed.

use crate::error::ApiContractError;
use validator::Validate;

/// Validate any contract type carrying `validator` rules
pub fn validate<T: Validate>(value: &T) -> Result<(), ApiContractError> {
    value.validate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use chrono::Utc;

    fn dataset(name: &str) -> Dataset {
        Dataset {
            id: "1".to_string(),
            name: name.to_string(),
            task_type: TaskKind::Intent,
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_dataset_requires_name() {
        assert!(validate(&dataset("金融NER样例")).is_ok());
        assert!(matches!(
            validate(&dataset("")),
            Err(ApiContractError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_start_run_requires_both_ids() {
        let ok = StartTestRunRequest {
            dataset_id: "1".to_string(),
            agent_id: "11".to_string(),
        };
        assert!(validate(&ok).is_ok());

        let missing_agent = StartTestRunRequest {
            dataset_id: "1".to_string(),
            agent_id: String::new(),
        };
        match validate(&missing_agent) {
            Err(ApiContractError::Validation(errors)) => {
                assert!(errors.field_errors().contains_key("agent_id"));
                assert!(!errors.field_errors().contains_key("dataset_id"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_agent_requires_version() {
        let agent = Agent {
            id: String::new(),
            name: "意图识别B".to_string(),
            module: AgentModule::Intent,
            version: String::new(),
            model_name: Some("intent-bert".to_string()),
            prompt_hash: None,
            code_commit: None,
            base_url: None,
            api_key: None,
            config: Default::default(),
            created_at: Utc::now(),
        };
        assert!(validate(&agent).is_err());
    }

    #[test]
    fn test_validate_label_studio_push_requires_url() {
        let request = LabelStudioPushRequest {
            dataset_id: Some("ds_1".to_string()),
            run_id: None,
            url: String::new(),
            token: "secret".to_string(),
        };
        assert!(validate(&request).is_err());

        // Only presence is checked; the address is passed through as entered.
        let request = LabelStudioPushRequest {
            url: "labelstudio.internal:8080".to_string(),
            ..request
        };
        assert!(validate(&request).is_ok());
    }
}
