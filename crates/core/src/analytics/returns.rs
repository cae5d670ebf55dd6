use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::observations::FundObservation;

/// One daily return with the liquidity figures observed the same day.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub market_cap: Option<f64>,
    pub investor_count: Option<f64>,
}

/// Per-fund simple daily returns `p_t / p_{t-1} - 1`, ordered by date.
///
/// The first observation of each fund has no return and is dropped, as is
/// any return that is not finite (previous price of zero).
pub fn daily_returns(observations: &[FundObservation]) -> BTreeMap<String, Vec<ReturnPoint>> {
    let mut by_fund: BTreeMap<&str, Vec<&FundObservation>> = BTreeMap::new();
    for obs in observations {
        by_fund.entry(obs.fund_code.as_str()).or_default().push(obs);
    }

    by_fund
        .into_iter()
        .map(|(code, mut rows)| {
            rows.sort_by_key(|o| o.date);
            let points = rows
                .windows(2)
                .filter_map(|pair| {
                    let value = pair[1].price / pair[0].price - 1.0;
                    value.is_finite().then(|| ReturnPoint {
                        date: pair[1].date,
                        value,
                        market_cap: pair[1].market_cap,
                        investor_count: pair[1].investor_count,
                    })
                })
                .collect();
            (code.to_string(), points)
        })
        .collect()
}
