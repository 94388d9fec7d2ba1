use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::Currency;

/// Two-decimal amount with the currency prefix, e.g. `US$1250.00`
pub fn format_amount(amount: Decimal, currency: Currency) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}{:.2}", currency.prefix(), rounded)
}

pub fn usd(amount: Decimal) -> String {
    format_amount(amount, Currency::Usd)
}

pub fn sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, v| acc + v)
}
