use rust_decimal::{Decimal, RoundingStrategy};

/// Statutory PF wage ceiling: EPS and EDLI contributions are computed on
/// Basic+DA capped at this figure.
pub const PF_WAGE_CEILING: u32 = 15_000;

/// Statutory ESI wage ceiling applied to gross salary. Independent of the PF
/// ceiling.
pub const ESI_WAGE_CEILING: u32 = 21_000;

const EE_RATE_PCT: Decimal = Decimal::from_parts(12, 0, 0, false, 0); // 12%
const EPS_RATE_PCT: Decimal = Decimal::from_parts(833, 0, 0, false, 2); // 8.33%
const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// PF contribution figures for one payroll entry, ready for the ECR line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcrFigures {
    pub epf_wages: Decimal,
    pub eps_wages: Decimal,
    pub edli_wages: Decimal,
    pub ee_share: Decimal,
    pub eps_contribution: Decimal,
    pub er_share: Decimal,
    pub refund: Decimal,
}

/// Whole-rupee rounding for contribution figures. Half-away-from-zero,
/// documented in DESIGN.md and pinned by the boundary tests below.
pub fn round_rupees(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// EE share is 12% of the uncapped Basic+DA; EPS rides on the capped figure;
/// ER share is the remainder of the employer's 12% after EPS. No refund
/// logic exists.
pub fn ecr_figures(basic_da: Decimal) -> EcrFigures {
    let basic_15k = basic_da.min(Decimal::from(PF_WAGE_CEILING));

    let ee_share = round_rupees(basic_da * EE_RATE_PCT / HUNDRED);
    let eps_contribution = round_rupees(basic_15k * EPS_RATE_PCT / HUNDRED);
    let er_share = round_rupees(basic_da * EE_RATE_PCT / HUNDRED) - eps_contribution;

    EcrFigures {
        epf_wages: basic_da,
        eps_wages: basic_15k,
        edli_wages: basic_15k,
        ee_share,
        eps_contribution,
        er_share,
        refund: Decimal::ZERO,
    }
}

pub fn esi_wages(gross_salary: Decimal) -> Decimal {
    gross_salary.min(Decimal::from(ESI_WAGE_CEILING))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn figures_for_wages_above_the_ceiling() {
        let f = ecr_figures(dec!(20000));
        assert_eq!(f.epf_wages, dec!(20000));
        assert_eq!(f.eps_wages, dec!(15000));
        assert_eq!(f.edli_wages, dec!(15000));
        assert_eq!(f.ee_share, dec!(2400));
        assert_eq!(f.eps_contribution, dec!(1250)); // round(1249.5)
        assert_eq!(f.er_share, dec!(1150));
        assert_eq!(f.refund, dec!(0));
    }

    #[test]
    fn figures_below_the_ceiling_use_actual_wages() {
        let f = ecr_figures(dec!(10000));
        assert_eq!(f.eps_wages, dec!(10000));
        assert_eq!(f.ee_share, dec!(1200));
        assert_eq!(f.eps_contribution, dec!(833));
        assert_eq!(f.er_share, dec!(367));
    }

    #[test]
    fn half_rupee_rounds_away_from_zero() {
        // 12% of 1237.50 is exactly 148.50.
        let f = ecr_figures(dec!(1237.50));
        assert_eq!(f.ee_share, dec!(149));
        // 8.33% of 15000 is exactly 1249.50.
        assert_eq!(ecr_figures(dec!(15000)).eps_contribution, dec!(1250));
    }

    #[test]
    fn esi_wages_cap_at_21k() {
        assert_eq!(esi_wages(dec!(25000)), dec!(21000));
        assert_eq!(esi_wages(dec!(18000.50)), dec!(18000.50));
    }
}
