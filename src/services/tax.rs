// src/services/tax.rs

use rust_decimal::Decimal;

use crate::models::invoice::{GstSettings, GstType, TaxBreakdown};

/// Derives the GST lines for a pre-tax `base`. A negative base (advance above
/// the fee) is taxed as zero. No rounding happens here.
pub fn compute_tax(base: Decimal, settings: &GstSettings) -> TaxBreakdown {
    let base = base.max(Decimal::ZERO);
    let percent = |rate: Decimal| base * rate / Decimal::ONE_HUNDRED;

    let (cgst, sgst, igst) = match (settings.gst_applicable, settings.gst_type) {
        (false, _) => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        (true, GstType::CgstSgst) => (
            percent(settings.cgst_rate),
            percent(settings.sgst_rate),
            Decimal::ZERO,
        ),
        (true, GstType::Igst) => (Decimal::ZERO, Decimal::ZERO, percent(settings.igst_rate)),
    };

    let tax_total = cgst + sgst + igst;
    TaxBreakdown {
        base,
        cgst,
        sgst,
        igst,
        tax_total,
        grand_total: base + tax_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(applicable: bool, gst_type: GstType) -> GstSettings {
        GstSettings { gst_applicable: applicable, gst_type, ..GstSettings::default() }
    }

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn not_applicable_is_tax_free() {
        let tax = compute_tax(d(1000), &settings(false, GstType::CgstSgst));
        assert_eq!(tax.grand_total, d(1000));
        assert_eq!(tax.tax_total, Decimal::ZERO);
    }

    #[test]
    fn cgst_and_sgst() {
        let tax = compute_tax(d(1000), &settings(true, GstType::CgstSgst));
        assert_eq!((tax.cgst, tax.sgst, tax.igst), (d(90), d(90), Decimal::ZERO));
        assert_eq!(tax.grand_total, d(1180));
    }

    #[test]
    fn igst() {
        let tax = compute_tax(d(1000), &settings(true, GstType::Igst));
        assert_eq!(tax.igst, d(180));
        assert_eq!(tax.cgst + tax.sgst, Decimal::ZERO);
        assert_eq!(tax.grand_total, d(1180));
    }

    #[test]
    fn fee_minus_advance_example() {
        let tax = compute_tax(d(5000) - d(1000), &settings(true, GstType::CgstSgst));
        assert_eq!(tax.base, d(4000));
        assert_eq!(tax.cgst, d(360));
        assert_eq!(tax.sgst, d(360));
        assert_eq!(tax.grand_total, d(4720));
    }

    #[test]
    fn fractional_amounts_do_not_drift() {
        let base = Decimal::new(1_234_567, 2); // 12345.67
        let tax = compute_tax(base, &settings(true, GstType::CgstSgst));
        assert_eq!(tax.cgst, Decimal::new(11_111_103, 4)); // 1111.1103
        assert_eq!(tax.grand_total, base + tax.cgst + tax.sgst);
        assert_eq!(tax, compute_tax(base, &settings(true, GstType::CgstSgst)));
    }

    #[test]
    fn negative_base_is_clamped() {
        let tax = compute_tax(d(-500), &settings(true, GstType::Igst));
        assert_eq!(tax.base, Decimal::ZERO);
        assert_eq!(tax.grand_total, Decimal::ZERO);
    }
}
