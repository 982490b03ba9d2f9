use crate::quote::Quote;
use crate::quote_store::{SaveAction, SaveOutcome};
use crate::store::Error;
use serde::{Deserialize, Serialize};

/// The caller-facing result of a store operation.
///
/// Every reply carries `success`; the other fields appear only when they apply:
///
/// | operation       | success                    | failure |
/// |-----------------|----------------------------|---------|
/// | `save`          | `action`, `record_id`      | `error` |
/// | `get`           | `quote`                    | `error` |
/// | `update_status` |                            | `error` |
/// | `get_all`       | `quotes`                   | `error` |
///
/// A missing quote is reported as `{"success": false, "error": "Quote not found"}`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<SaveAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotes: Option<Vec<Quote>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    fn failed(error: &Error) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

impl From<Result<SaveOutcome, Error>> for Reply {
    fn from(result: Result<SaveOutcome, Error>) -> Self {
        match result {
            Ok(outcome) => Self {
                action: Some(outcome.action),
                record_id: Some(outcome.record_id),
                ..Self::ok()
            },
            Err(e) => Self::failed(&e),
        }
    }
}

impl From<Result<Quote, Error>> for Reply {
    fn from(result: Result<Quote, Error>) -> Self {
        match result {
            Ok(quote) => Self {
                quote: Some(quote),
                ..Self::ok()
            },
            Err(e) => Self::failed(&e),
        }
    }
}

impl From<Result<(), Error>> for Reply {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::failed(&e),
        }
    }
}

impl From<Result<Vec<Quote>, Error>> for Reply {
    fn from(result: Result<Vec<Quote>, Error>) -> Self {
        match result {
            Ok(quotes) => Self {
                quotes: Some(quotes),
                ..Self::ok()
            },
            Err(e) => Self::failed(&e),
        }
    }
}
