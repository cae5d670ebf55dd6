use diesel::prelude::*;
use fundwatch_core::labels::FundLabel;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::fund_labels)]
#[diesel(treat_none_as_default_value = false)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FundLabelDB {
    pub code: String,
    pub category: Option<String>,
    pub main_category: Option<String>,
}

/// Bound values per inserted row.
pub(crate) const FUND_LABEL_COLUMNS: usize = 3;

impl From<FundLabelDB> for FundLabel {
    fn from(db: FundLabelDB) -> Self {
        Self {
            fund_code: db.code,
            category: db.category,
            main_category: db.main_category,
        }
    }
}

impl From<FundLabel> for FundLabelDB {
    fn from(domain: FundLabel) -> Self {
        Self {
            code: domain.fund_code,
            category: domain.category,
            main_category: domain.main_category,
        }
    }
}
