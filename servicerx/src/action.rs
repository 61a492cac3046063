use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A plain redux-style action record.
///
/// `type` keys the reducer dispatch, `data` carries success/update payloads
/// and `error` carries failure payloads. Absent fields stay off the wire when
/// the action is serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl Action {
    pub fn of(type_name: impl Into<String>) -> Self {
        Action {
            type_name: type_name.into(),
            data: None,
            error: None,
        }
    }

    pub fn with_data(type_name: impl Into<String>, data: Value) -> Self {
        Action {
            type_name: type_name.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn with_error(type_name: impl Into<String>, error: Value) -> Self {
        Action {
            type_name: type_name.into(),
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("service name must not be empty")]
    EmptyName,
    #[error("service name must be camelCase ascii alphanumeric, got {0:?}")]
    InvalidName(String),
}

/// How a reducer should treat an incoming action type.
///
/// `Fallback` covers both the declared update type and every unrecognized
/// type. That is one branch, not two: unknown actions merge, they never
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Busy,
    Success,
    Failure,
    Fallback,
}

/// The action-type constants of one service namespace.
///
/// Derived once per service from its camelCase name; uniqueness holds within
/// the service only, there is no global registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypes {
    prefix: String,
    pub busy: String,
    pub success: String,
    pub failure: String,
    pub update: String,
}

impl ActionTypes {
    /// Derives the constants for `service_name`.
    ///
    /// The name is split before every uppercase ascii letter, joined with
    /// `_` and uppercased: `fetchCountries` becomes `FETCH_COUNTRIES` and
    /// each constant appends its suffix (`FETCH_COUNTRIES_BUSY`, ...).
    pub fn derive(service_name: &str) -> Result<Self, BuildError> {
        let prefix = screaming_snake(service_name)?;
        Ok(ActionTypes {
            busy: format!("{prefix}_BUSY"),
            success: format!("{prefix}_SUCCESS"),
            failure: format!("{prefix}_FAILURE"),
            update: format!("{prefix}_UPDATE"),
            prefix,
        })
    }

    /// The uppercased, underscore-joined service namespace.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds `PREFIX_<SUFFIX>` for an explicit suffix such as `CLEAN`.
    pub fn custom(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Classifies an incoming action type for this namespace.
    pub fn kind(&self, action_type: &str) -> ActionKind {
        if action_type == self.busy {
            ActionKind::Busy
        } else if action_type == self.success {
            ActionKind::Success
        } else if action_type == self.failure {
            ActionKind::Failure
        } else {
            ActionKind::Fallback
        }
    }
}

fn screaming_snake(service_name: &str) -> Result<String, BuildError> {
    let mut chars = service_name.chars();
    let Some(first) = chars.next() else {
        return Err(BuildError::EmptyName);
    };
    let valid = first.is_ascii_lowercase()
        && service_name.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid {
        return Err(BuildError::InvalidName(service_name.to_string()));
    }

    let mut out = String::with_capacity(service_name.len() + 4);
    for c in service_name.chars() {
        // New segment before every uppercase letter, so fetchHTTPData
        // yields FETCH_H_T_T_P_DATA.
        if c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derives_constants_from_camel_case() {
        let types = ActionTypes::derive("fetchCountries").unwrap();
        assert_eq!(types.prefix(), "FETCH_COUNTRIES");
        assert_eq!(types.busy, "FETCH_COUNTRIES_BUSY");
        assert_eq!(types.success, "FETCH_COUNTRIES_SUCCESS");
        assert_eq!(types.failure, "FETCH_COUNTRIES_FAILURE");
        assert_eq!(types.update, "FETCH_COUNTRIES_UPDATE");
    }

    #[test]
    fn splits_before_every_uppercase_letter() {
        let types = ActionTypes::derive("fetchHTTPData").unwrap();
        assert_eq!(types.prefix(), "FETCH_H_T_T_P_DATA");

        let types = ActionTypes::derive("save").unwrap();
        assert_eq!(types.busy, "SAVE_BUSY");

        let types = ActionTypes::derive("fetchTop10").unwrap();
        assert_eq!(types.prefix(), "FETCH_TOP10");
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(ActionTypes::derive(""), Err(BuildError::EmptyName));
        assert_eq!(
            ActionTypes::derive("FetchCountries"),
            Err(BuildError::InvalidName("FetchCountries".into()))
        );
        assert_eq!(
            ActionTypes::derive("fetch countries"),
            Err(BuildError::InvalidName("fetch countries".into()))
        );
        assert_eq!(
            ActionTypes::derive("fetch_countries"),
            Err(BuildError::InvalidName("fetch_countries".into()))
        );
    }

    #[test]
    fn custom_suffix_joins_with_prefix() {
        let types = ActionTypes::derive("fetchCountries").unwrap();
        assert_eq!(types.custom("CLEAN"), "FETCH_COUNTRIES_CLEAN");
    }

    #[test]
    fn classifies_update_and_unknown_as_fallback() {
        let types = ActionTypes::derive("fetchCountries").unwrap();
        assert_eq!(types.kind(&types.busy), ActionKind::Busy);
        assert_eq!(types.kind(&types.success), ActionKind::Success);
        assert_eq!(types.kind(&types.failure), ActionKind::Failure);
        assert_eq!(types.kind(&types.update), ActionKind::Fallback);
        assert_eq!(types.kind("FETCH_COUNTRIES_COPY"), ActionKind::Fallback);
        assert_eq!(types.kind("OTHER_SERVICE_BUSY"), ActionKind::Fallback);
    }

    #[test]
    fn action_serializes_with_type_key() {
        let action = Action::with_data("A_SUCCESS", json!({"n": 1}));
        let wire = serde_json::to_value(&action).unwrap();
        assert_eq!(wire, json!({"type": "A_SUCCESS", "data": {"n": 1}}));
    }
}
