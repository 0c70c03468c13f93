//! Daily-balance savings interest.

use std::{fmt, str::FromStr};

use coopbook_shared::types::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fewest daily samples an interest computation accepts.
pub const MIN_DAILY_SAMPLES: usize = 30;

/// How a daily-balance series is reduced to one balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsReduction {
    /// Smallest sample.
    #[default]
    Lowest,
    /// Arithmetic mean.
    Average,
    /// Largest sample.
    Highest,
    /// First sample.
    Start,
    /// Last sample.
    End,
}

impl SavingsReduction {
    /// Parses a stored label. Unknown labels fall back to `Lowest`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }

    /// Stored label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lowest => "lowest",
            Self::Average => "average",
            Self::Highest => "highest",
            Self::Start => "start",
            Self::End => "end",
        }
    }

    /// Reduces a non-empty series.
    fn reduce(self, samples: &[Decimal]) -> Decimal {
        let first = samples.first().copied().unwrap_or_default();
        match self {
            Self::Lowest => samples.iter().copied().fold(first, Decimal::min),
            Self::Highest => samples.iter().copied().fold(first, Decimal::max),
            Self::Average => {
                let sum: Decimal = samples.iter().copied().sum();
                sum / Decimal::from(samples.len())
            }
            Self::Start => first,
            Self::End => samples.last().copied().unwrap_or_default(),
        }
    }
}

impl fmt::Display for SavingsReduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SavingsReduction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lowest" => Ok(Self::Lowest),
            "average" => Ok(Self::Average),
            "highest" => Ok(Self::Highest),
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            other => Err(format!("unknown savings reduction: {other}")),
        }
    }
}

/// Interest credited for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsInterestResult {
    /// Net interest (negative for a below-minimum charge).
    pub interest: Decimal,
    /// Withholding tax.
    pub tax: Decimal,
    /// Last daily balance plus net interest.
    pub ending_balance: Decimal,
}

/// Computes savings interest over a series of daily balances.
///
/// Rates above 1 are percentages and are divided by 100. Gross interest is
/// `reduced balance × rate × samples / annual_divisor`; tax is taken from the
/// gross. Fewer than 30 samples, a non-positive rate, a tax rate outside
/// `[0, 1)` or a zero divisor yield an all-zero result.
#[must_use]
pub fn compute_savings_interest(
    daily_balances: &[Decimal],
    rate: Decimal,
    tax_rate: Decimal,
    reduction: SavingsReduction,
    annual_divisor: u32,
) -> SavingsInterestResult {
    if daily_balances.len() < MIN_DAILY_SAMPLES
        || rate <= Decimal::ZERO
        || tax_rate < Decimal::ZERO
        || tax_rate >= Decimal::ONE
        || annual_divisor == 0
    {
        return SavingsInterestResult::default();
    }

    let rate = if rate > Decimal::ONE {
        rate / Decimal::ONE_HUNDRED
    } else {
        rate
    };

    let balance = reduction.reduce(daily_balances);
    let days = Decimal::from(daily_balances.len());
    let gross = balance * rate * days / Decimal::from(annual_divisor);
    if gross.is_zero() {
        return SavingsInterestResult::default();
    }

    let tax = round_money(gross * tax_rate);
    let interest = round_money(gross) - tax;
    let last = daily_balances.last().copied().unwrap_or_default();

    SavingsInterestResult {
        interest,
        tax,
        ending_balance: round_money(last + interest),
    }
}
