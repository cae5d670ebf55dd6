use serde::{Deserialize, Serialize};

/// Category labels of one fund. Either label may be unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundLabel {
    pub fund_code: String,
    pub category: Option<String>,
    pub main_category: Option<String>,
}
