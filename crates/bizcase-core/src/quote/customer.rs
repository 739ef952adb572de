use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::case::{BusinessCase, Sku};
use crate::math::safe_div;
use crate::pricing::{calculate_rm_mb_per_kg, conversion_recovery_per_piece};
use crate::types::{Money, Pieces, Rate};

/// Per-piece cost build-up shown to the customer. `discount` is a positive
/// amount taken off the sum of the other components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteComponents {
    /// Resin at list price
    pub resin: Money,
    pub masterbatch: Money,
    pub wastage: Money,
    pub packaging: Money,
    /// Inward plus outward freight
    pub freight: Money,
    pub mould_amortisation: Money,
    pub conversion: Money,
    pub discount: Money,
}

impl QuoteComponents {
    pub fn unit_price(&self) -> Money {
        self.resin + self.masterbatch + self.wastage + self.packaging + self.freight
            + self.mould_amortisation
            + self.conversion
            - self.discount
    }

    fn scaled_add(&mut self, other: &QuoteComponents, weight: Decimal) {
        self.resin += other.resin * weight;
        self.masterbatch += other.masterbatch * weight;
        self.wastage += other.wastage * weight;
        self.packaging += other.packaging * weight;
        self.freight += other.freight * weight;
        self.mould_amortisation += other.mould_amortisation * weight;
        self.conversion += other.conversion * weight;
        self.discount += other.discount * weight;
    }

    fn divided_by(&self, d: Decimal) -> QuoteComponents {
        QuoteComponents {
            resin: safe_div(self.resin, d),
            masterbatch: safe_div(self.masterbatch, d),
            wastage: safe_div(self.wastage, d),
            packaging: safe_div(self.packaging, d),
            freight: safe_div(self.freight, d),
            mould_amortisation: safe_div(self.mould_amortisation, d),
            conversion: safe_div(self.conversion, d),
            discount: safe_div(self.discount, d),
        }
    }

    /// `(field name, value)` pairs, in display order.
    pub fn named(&self) -> [(&'static str, Money); 8] {
        [
            ("resin", self.resin),
            ("masterbatch", self.masterbatch),
            ("wastage", self.wastage),
            ("packaging", self.packaging),
            ("freight", self.freight),
            ("mould_amortisation", self.mould_amortisation),
            ("conversion", self.conversion),
            ("discount", self.discount),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub sku_id: String,
    pub sku_name: String,
    pub components: QuoteComponents,
    pub unit_price_excl_gst: Money,
    pub quantity: Pieces,
    pub total_excl_gst: Money,
    pub gst: Money,
    pub total_incl_gst: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub quantity: Pieces,
    pub total_excl_gst: Money,
    pub gst: Money,
    pub total_incl_gst: Money,
    /// Quantity-weighted
    pub avg_unit_price: Money,
    /// Quantity-weighted
    pub avg_components: QuoteComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerQuote {
    pub quote_name: String,
    pub case_id: String,
    pub case_name: String,
    pub gst_rate: Rate,
    pub lines: Vec<QuoteLine>,
    pub totals: QuoteTotals,
}

/// Year-1 per-piece components for one SKU. They sum to the year-1 price
/// per piece plus mould amortisation.
pub fn quote_components(sku: &Sku) -> QuoteComponents {
    let c = &sku.costing;
    let w = sku.weight_kg();
    let rm_mb = calculate_rm_mb_per_kg(c);

    QuoteComponents {
        resin: c.resin_rs_per_kg * w,
        masterbatch: rm_mb.mb_base * w,
        wastage: (rm_mb.rm_base + rm_mb.mb_base) * c.wastage * w,
        packaging: c.packaging_rs_per_kg * w,
        freight: (c.freight_inwards_rs_per_kg + c.freight_outwards_rs_per_kg) * w,
        mould_amortisation: c.mould_amortisation_rs_per_piece.unwrap_or_default(),
        conversion: conversion_recovery_per_piece(&sku.sales, c),
        discount: c.resin_rs_per_kg * c.resin_discount * w,
    }
}

/// Customer quote for every SKU of `case`. Quantities come from
/// `default_quantities` (by SKU id) when present, else the base annual
/// volume.
pub fn generate_quote(
    case: &BusinessCase,
    quote_name: &str,
    gst_rate: Rate,
    default_quantities: Option<&BTreeMap<String, Pieces>>,
) -> CustomerQuote {
    let lines: Vec<QuoteLine> = case
        .skus
        .iter()
        .map(|sku| {
            let components = quote_components(sku);
            let unit_price = components.unit_price();
            let quantity = default_quantities
                .and_then(|q| q.get(&sku.id).copied())
                .unwrap_or(sku.sales.base_annual_volume);
            let total_excl_gst = unit_price * quantity;
            let gst = total_excl_gst * gst_rate;
            QuoteLine {
                sku_id: sku.id.clone(),
                sku_name: sku.name.clone(),
                components,
                unit_price_excl_gst: unit_price,
                quantity,
                total_excl_gst,
                gst,
                total_incl_gst: total_excl_gst + gst,
            }
        })
        .collect();

    let mut totals = QuoteTotals::default();
    let mut weighted = QuoteComponents::default();
    for line in &lines {
        totals.quantity += line.quantity;
        totals.total_excl_gst += line.total_excl_gst;
        totals.gst += line.gst;
        totals.total_incl_gst += line.total_incl_gst;
        weighted.scaled_add(&line.components, line.quantity);
    }
    totals.avg_unit_price = safe_div(totals.total_excl_gst, totals.quantity);
    totals.avg_components = weighted.divided_by(totals.quantity);

    CustomerQuote {
        quote_name: quote_name.to_string(),
        case_id: case.id.clone(),
        case_name: case.name.clone(),
        gst_rate,
        lines,
        totals,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_id: Option<String>,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteValidation {
    pub valid: bool,
    pub issues: Vec<QuoteIssue>,
}

/// Flags negative components, non-positive quantities and a GST rate
/// outside `[0, 1]`.
pub fn validate_quote(quote: &CustomerQuote) -> QuoteValidation {
    let mut issues = Vec::new();

    if quote.gst_rate < Decimal::ZERO || quote.gst_rate > Decimal::ONE {
        issues.push(QuoteIssue {
            sku_id: None,
            field: "gst_rate".into(),
            message: format!("GST rate {} must be between 0 and 1", quote.gst_rate),
        });
    }
    if quote.lines.is_empty() {
        issues.push(QuoteIssue {
            sku_id: None,
            field: "lines".into(),
            message: "Quote has no lines".into(),
        });
    }

    for line in &quote.lines {
        for (name, value) in line.components.named() {
            if value < Decimal::ZERO {
                issues.push(QuoteIssue {
                    sku_id: Some(line.sku_id.clone()),
                    field: name.into(),
                    message: format!("Component {name} is negative ({value})"),
                });
            }
        }
        if line.quantity <= Decimal::ZERO {
            issues.push(QuoteIssue {
                sku_id: Some(line.sku_id.clone()),
                field: "quantity".into(),
                message: format!("Quantity must be positive (got {})", line.quantity),
            });
        }
    }

    QuoteValidation {
        valid: issues.is_empty(),
        issues,
    }
}
