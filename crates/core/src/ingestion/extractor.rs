//! Reshapes wide fund records into observation and allocation rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;

use fundwatch_market_data::FundRecord;

use crate::observations::{FundObservation, InstrumentAllocation};

/// Normalized rows extracted from one fetch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractedBatch {
    pub observations: Vec<FundObservation>,
    pub allocations: Vec<InstrumentAllocation>,
    /// Records without a usable price.
    pub dropped_records: usize,
}

impl ExtractedBatch {
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty() && self.allocations.is_empty()
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Split records into observations and long-form allocations.
///
/// Duplicate keys collapse with the last occurrence winning. Records with a
/// missing or non-finite price produce no observation. Allocation cells that
/// are null, non-finite, zero or negative produce no row.
pub fn extract(records: &[FundRecord]) -> ExtractedBatch {
    let mut observations: BTreeMap<(NaiveDate, String), FundObservation> = BTreeMap::new();
    let mut allocations: BTreeMap<(NaiveDate, String, String), InstrumentAllocation> =
        BTreeMap::new();
    let mut dropped_records = 0;

    for record in records {
        match finite(record.price) {
            Some(price) => {
                observations.insert(
                    (record.date, record.code.clone()),
                    FundObservation {
                        date: record.date,
                        fund_code: record.code.clone(),
                        price,
                        market_cap: finite(record.market_cap),
                        shares_outstanding: finite(record.number_of_shares),
                        investor_count: finite(record.number_of_investors),
                    },
                );
            }
            None => {
                dropped_records += 1;
                warn!(
                    "Dropping {} on {}: missing or non-finite price",
                    record.code, record.date
                );
            }
        }

        for (instrument, value) in &record.allocations {
            let Some(percentage) = finite(*value).filter(|p| *p > 0.0) else {
                continue;
            };
            allocations.insert(
                (record.date, record.code.clone(), instrument.clone()),
                InstrumentAllocation {
                    date: record.date,
                    fund_code: record.code.clone(),
                    instrument_type: instrument.clone(),
                    percentage,
                },
            );
        }
    }

    ExtractedBatch {
        observations: observations.into_values().collect(),
        allocations: allocations.into_values().collect(),
        dropped_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn record(day: u32, code: &str, price: Option<f64>, allocations: &[(&str, Option<f64>)]) -> FundRecord {
        let mut r = FundRecord::new(d(day), code, price);
        r.market_cap = Some(1000.0);
        r.number_of_investors = Some(f64::NAN);
        r.allocations = allocations
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        r
    }

    #[test]
    fn test_drops_zero_negative_and_null_allocations() {
        let batch = extract(&[record(
            10,
            "AAK",
            Some(1.5),
            &[
                ("stock", Some(60.0)),
                ("repo", Some(0.0)),
                ("bond", Some(-1.0)),
                ("gold", None),
                ("fx", Some(f64::INFINITY)),
                ("reverse_repo", Some(40.0)),
            ],
        )]);

        assert_eq!(batch.observations.len(), 1);
        let kinds: Vec<&str> = batch
            .allocations
            .iter()
            .map(|a| a.instrument_type.as_str())
            .collect();
        assert_eq!(kinds, vec!["reverse_repo", "stock"]);
        assert!(batch.allocations.iter().all(|a| a.percentage > 0.0));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let batch = extract(&[
            record(10, "AAK", Some(1.0), &[("stock", Some(10.0))]),
            record(10, "AAK", Some(2.0), &[("stock", Some(20.0))]),
        ]);

        assert_eq!(batch.observations.len(), 1);
        assert_eq!(batch.observations[0].price, 2.0);
        assert_eq!(batch.allocations.len(), 1);
        assert_eq!(batch.allocations[0].percentage, 20.0);
    }

    #[test]
    fn test_missing_price_drops_observation_only() {
        let batch = extract(&[record(10, "AAK", None, &[("stock", Some(100.0))])]);

        assert!(batch.observations.is_empty());
        assert_eq!(batch.dropped_records, 1);
        assert_eq!(batch.allocations.len(), 1);
    }

    #[test]
    fn test_non_finite_optional_fields_become_none() {
        let batch = extract(&[record(10, "AAK", Some(1.0), &[])]);
        let obs = &batch.observations[0];
        assert_eq!(obs.market_cap, Some(1000.0));
        assert_eq!(obs.investor_count, None);
        assert_eq!(obs.shares_outstanding, None);
    }

    #[test]
    fn test_empty_input() {
        let batch = extract(&[]);
        assert!(batch.is_empty());
        assert_eq!(batch.dropped_records, 0);
    }
}
