use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One marginal-rate bracket of a filing status's rate table.
///
/// `max_income` is `None` for the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Portion of `taxable_income` that falls inside this bracket.
    pub fn income_within(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= self.min_income {
            return Decimal::ZERO;
        }
        let above_floor = taxable_income - self.min_income;
        match self.max_income {
            Some(max) => above_floor.min(max - self.min_income),
            None => above_floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn income_within_is_zero_at_or_below_floor() {
        let bracket = TaxBracket::new(dec!(8500), Some(dec!(11700)), dec!(0.045));

        assert_eq!(bracket.income_within(dec!(8500)), dec!(0));
        assert_eq!(bracket.income_within(dec!(100)), dec!(0));
    }

    #[test]
    fn income_within_caps_at_bracket_width() {
        let bracket = TaxBracket::new(dec!(8500), Some(dec!(11700)), dec!(0.045));

        assert_eq!(bracket.income_within(dec!(42000)), dec!(3200));
    }

    #[test]
    fn income_within_partial_bracket() {
        let bracket = TaxBracket::new(dec!(13900), Some(dec!(80650)), dec!(0.055));

        assert_eq!(bracket.income_within(dec!(42000)), dec!(28100));
    }

    #[test]
    fn income_within_unbounded_top_bracket() {
        let bracket = TaxBracket::new(dec!(25000000), None, dec!(0.109));

        assert_eq!(bracket.income_within(dec!(30000000)), dec!(5000000));
    }
}
