use crate::error::CommissionError;
use crate::record::{OrderStatus, ValidatedRecord};

use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub min_sales: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commission {
    pub sales: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Sales-volume tiers; the highest tier whose minimum is met applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionSchedule {
    tiers: Vec<Tier>,
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        Self::new(vec![
            Tier {
                min_sales: Decimal::ZERO,
                rate: Decimal::new(5, 2),
            },
            Tier {
                min_sales: Decimal::from(10_000),
                rate: Decimal::new(75, 3),
            },
            Tier {
                min_sales: Decimal::from(50_000),
                rate: Decimal::new(10, 2),
            },
        ])
    }
}

impl CommissionSchedule {
    pub fn new(mut tiers: Vec<Tier>) -> Self {
        tiers.sort_by(|a, b| a.min_sales.cmp(&b.min_sales));
        Self { tiers }
    }

    pub fn rate_for(&self, sales: Decimal) -> Decimal {
        self.tiers
            .iter()
            .rev()
            .find(|tier| sales >= tier.min_sales)
            .map(|tier| tier.rate)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn commission_for(&self, sales: Decimal) -> Result<Commission, CommissionError> {
        let rate = self.rate_for(sales);
        let amount = sales
            .checked_mul(rate)
            .ok_or(CommissionError::AmountOverflow(sales))?;

        Ok(Commission {
            sales,
            rate,
            amount: amount.round_dp(2),
        })
    }
}

/// Order totals per agent name, ignoring cancelled orders.
pub fn agent_sales(
    records: &[ValidatedRecord],
) -> Result<BTreeMap<String, Decimal>, CommissionError> {
    let mut sales: BTreeMap<String, Decimal> = BTreeMap::new();

    for record in records {
        if let ValidatedRecord::Order(order) = record {
            if order.status == OrderStatus::Cancelled {
                continue;
            }
            let total = sales.entry(order.agent.clone()).or_insert(Decimal::ZERO);
            *total = total
                .checked_add(order.total)
                .ok_or_else(|| CommissionError::SalesOverflow(order.agent.clone()))?;
        }
    }

    Ok(sales)
}
