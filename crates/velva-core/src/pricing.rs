//! # Pricing Engine
//!
//! Cart semantics and order total computation, as pure functions.
//!
//! ## The Total Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       How a Total is Built                              │
//! │                                                                         │
//! │  subtotal        = Σ line totals (unit price × quantity)               │
//! │  base            = subtotal − discount                                 │
//! │  service charge  = base × service rate                                 │
//! │  tax             = (base + service charge) × tax rate                  │
//! │  total           = base + service charge + tax                         │
//! │                                                                         │
//! │  Tax COMPOUNDS on top of the service charge — the service charge is    │
//! │  itself a taxable supply. A 14% tax with a 12% service charge on a     │
//! │  100.00 subtotal gives:                                                │
//! │                                                                         │
//! │    service charge = 100.00 × 12%          = 12.00                      │
//! │    tax            = 112.00 × 14%          = 15.68                      │
//! │    total          = 100.00 + 12.00 + 15.68 = 127.68                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Floor By Default
//! If the discount exceeds the subtotal, the base goes negative and so do
//! the service charge and tax. That pass-through is the documented
//! behavior; `PricingRates::clamp_negative_charges` opts into clamping
//! both at zero.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CafeSettings, MenuItem, ModifierSnapshot, OrderLine, Rate};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Rates
// =============================================================================

/// The slice of settings the pricing engine needs.
#[derive(Debug, Clone, Copy)]
pub struct PricingRates {
    pub service_charge: Rate,
    pub tax: Rate,
    /// Clamp negative service charge/tax at zero (off by default).
    pub clamp_negative_charges: bool,
}

impl From<&CafeSettings> for PricingRates {
    fn from(settings: &CafeSettings) -> Self {
        PricingRates {
            service_charge: settings.service_charge_rate(),
            tax: settings.tax_rate(),
            clamp_negative_charges: settings.clamp_negative_charges,
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// The computed monetary breakdown of a cart/order.
///
/// ## Invariant
/// `total == subtotal − discount + service_charge + tax`, exactly, for
/// any rates ≥ 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub service_charge: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

/// Computes the monetary breakdown for a set of order lines.
///
/// Service charge and tax are both computed off `(subtotal − discount)`;
/// tax additionally compounds on the service charge. The discount is an
/// absolute amount, not a percentage.
///
/// ## Example
/// ```rust
/// use velva_core::pricing::{compute_totals, PricingRates};
/// use velva_core::types::Rate;
/// use velva_core::Money;
///
/// let rates = PricingRates {
///     service_charge: Rate::from_bps(1200), // 12%
///     tax: Rate::from_bps(1400),            // 14%
///     clamp_negative_charges: false,
/// };
/// let totals = compute_totals(&[], Money::zero(), &rates);
/// assert!(totals.total.is_zero());
/// ```
pub fn compute_totals(lines: &[OrderLine], discount: Money, rates: &PricingRates) -> OrderTotals {
    let subtotal: Money = lines.iter().map(|l| l.line_total()).sum();
    let base = subtotal - discount;

    let mut service_charge = base.apply_rate(rates.service_charge);
    if rates.clamp_negative_charges {
        service_charge = service_charge.max(Money::zero());
    }

    let mut tax = (base + service_charge).apply_rate(rates.tax);
    if rates.clamp_negative_charges {
        tax = tax.max(Money::zero());
    }

    OrderTotals {
        subtotal,
        service_charge,
        tax,
        discount,
        total: base + service_charge + tax,
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress order being built at the register.
///
/// ## Invariants
/// - Lines are unique by (menu item, modifier selection); re-picking the
///   same combination bumps the quantity instead of adding a line
/// - Quantity is always >= 1; an update below 1 removes the line
/// - At most [`MAX_CART_LINES`] lines
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<OrderLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Rebuilds a cart from stored order lines (editing a table order).
    pub fn from_lines(lines: Vec<OrderLine>) -> Self {
        Cart { lines }
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Consumes the cart, yielding its lines for persistence.
    pub fn into_lines(self) -> Vec<OrderLine> {
        self.lines
    }

    /// Adds one unit of a menu item with the given modifier selection.
    ///
    /// ## Behavior
    /// - A line already carrying the same item with an identical modifier
    ///   set (order-independent) gets its quantity bumped by 1
    /// - Otherwise a new line is appended with quantity 1 and a unit
    ///   price frozen as `item price + Σ modifier deltas`
    ///
    /// ## Returns
    /// The id of the affected line.
    pub fn add_item(
        &mut self,
        item: &MenuItem,
        selection: &[ModifierSnapshot],
    ) -> CoreResult<String> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.matches_selection(&item.id, selection))
        {
            let new_qty = line.quantity + 1;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(line.id.clone());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        let delta: Money = selection.iter().map(|m| Money::from_cents(m.price_delta_cents)).sum();
        let unit_price = item.price() + delta;

        let line = OrderLine {
            id: Uuid::new_v4().to_string(),
            menu_item_id: item.id.clone(),
            name: item.name.clone(),
            name_ar: item.name_ar.clone(),
            quantity: 1,
            unit_price_cents: unit_price.cents(),
            modifiers: selection.to_vec(),
        };
        let id = line.id.clone();
        self.lines.push(line);
        Ok(id)
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - Quantity < 1 removes the line entirely; zero-quantity lines
    ///   never persist
    /// - Unknown line ids are an error
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return self.remove_line(line_id);
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        match self.lines.iter_mut().find(|l| l.id == line_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::LineNotFound(line_id.to_string())),
        }
    }

    /// Removes a line by id.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != line_id);
        if self.lines.len() == before {
            return Err(CoreError::LineNotFound(line_id.to_string()));
        }
        Ok(())
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line totals, before discount/charges.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total()).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Computes the full monetary breakdown for this cart.
    pub fn totals(&self, discount: Money, rates: &PricingRates) -> OrderTotals {
        compute_totals(&self.lines, discount, rates)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
