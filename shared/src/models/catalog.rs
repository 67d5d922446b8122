//! Catalog models: tools, equipment types, and suppliers
//!
//! A [`Tool`] carries two independent counters of what is on the shelf: the
//! raw `stock` count and the pool of unit serial numbers. Selling a line item
//! always decrements `stock`; it only touches the serial pool when a serial is
//! named. Every serial ever added lives in exactly one of
//! `available_serials` or `sold_serials`.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InventoryError;

/// Operational status of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "tool_status", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    #[default]
    Available,
    Rented,
    Maintenance,
    Disabled,
}

/// Number of serialized units sold together as one set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "serial_set_size", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SetSize {
    #[default]
    Single,
    Pair,
    Quad,
}

impl SetSize {
    pub fn units(&self) -> usize {
        match self {
            SetSize::Single => 1,
            SetSize::Pair => 2,
            SetSize::Quad => 4,
        }
    }
}

/// Record of a serial that left the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldSerial {
    pub serial: String,
    pub sale_id: Option<i64>,
    pub customer_name: Option<String>,
    pub date_sold: NaiveDate,
    pub invoice_number: Option<String>,
}

/// Sale metadata stamped onto serials as they are sold
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerialSaleContext {
    pub sale_id: Option<i64>,
    pub customer_name: Option<String>,
    pub invoice_number: Option<String>,
    pub date_sold: Option<NaiveDate>,
}

impl SerialSaleContext {
    fn stamp(&self, serial: String, today: NaiveDate) -> SoldSerial {
        SoldSerial {
            serial,
            sale_id: self.sale_id,
            customer_name: self.customer_name.clone(),
            date_sold: self.date_sold.unwrap_or(today),
            invoice_number: self.invoice_number.clone(),
        }
    }
}

/// A catalog entry for sellable surveying equipment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub category: String,
    pub description: String,
    pub cost: Decimal,
    pub stock: i32,
    pub status: ToolStatus,
    pub is_enabled: bool,
    pub supplier_id: Option<Uuid>,
    pub equipment_type_id: Option<Uuid>,
    /// Supplier invoice the units arrived on
    pub invoice_number: Option<String>,
    pub set_size: SetSize,
    pub date_added: DateTime<Utc>,
    pub expiry_date: Option<NaiveDate>,
    pub available_serials: Vec<String>,
    pub sold_serials: Vec<SoldSerial>,
}

impl Tool {
    /// Total serials ever added to this tool
    pub fn serial_count(&self) -> usize {
        self.available_serials.len() + self.sold_serials.len()
    }

    /// Whether a customer may see this tool in the catalog
    pub fn is_listed_for_customers(&self) -> bool {
        self.is_enabled && self.stock > 0
    }

    fn has_serial(&self, serial: &str) -> bool {
        self.available_serials.iter().any(|s| s == serial)
            || self.sold_serials.iter().any(|s| s.serial == serial)
    }

    /// Restock with new serialized units, raising `stock` by the number added
    pub fn add_serials(&mut self, serials: Vec<String>) -> Result<usize, InventoryError> {
        let mut seen = std::collections::HashSet::new();
        for serial in &serials {
            if self.has_serial(serial) || !seen.insert(serial.as_str()) {
                return Err(InventoryError::DuplicateSerial {
                    tool: self.name.clone(),
                    serial: serial.clone(),
                });
            }
        }

        let added = serials.len();
        self.available_serials.extend(serials);
        self.stock += added as i32;
        Ok(added)
    }

    /// Take one unit off the shelf for a sale line item.
    ///
    /// Fails without touching the tool when stock is exhausted or the named
    /// serial is not in the pool.
    pub fn sell_unit(
        &mut self,
        serial: Option<&str>,
        context: &SerialSaleContext,
        today: NaiveDate,
    ) -> Result<(), InventoryError> {
        if self.stock <= 0 {
            return Err(InventoryError::OutOfStock {
                tool: self.name.clone(),
            });
        }

        if let Some(serial) = serial {
            let position = self
                .available_serials
                .iter()
                .position(|s| s == serial)
                .ok_or_else(|| InventoryError::SerialUnavailable {
                    tool: self.name.clone(),
                    serial: serial.to_string(),
                })?;
            let serial = self.available_serials.remove(position);
            self.sold_serials.push(context.stamp(serial, today));
        }

        self.stock -= 1;
        Ok(())
    }

    /// Put a sold unit back on the shelf
    pub fn release_unit(&mut self, serial: Option<&str>) -> Result<(), InventoryError> {
        if let Some(serial) = serial {
            let position = self
                .sold_serials
                .iter()
                .position(|s| s.serial == serial)
                .ok_or_else(|| InventoryError::SerialNotSold {
                    tool: self.name.clone(),
                    serial: serial.to_string(),
                })?;
            let sold = self.sold_serials.remove(position);
            self.available_serials.push(sold.serial);
        }

        self.stock += 1;
        Ok(())
    }

    /// Move a uniformly random serial from the pool to sold.
    ///
    /// Returns `None` on an empty pool, even if `stock` is nonzero.
    pub fn take_random_serial<R: Rng>(
        &mut self,
        rng: &mut R,
        context: &SerialSaleContext,
        today: NaiveDate,
    ) -> Option<String> {
        if self.available_serials.is_empty() {
            return None;
        }

        let index = rng.gen_range(0..self.available_serials.len());
        let serial = self.available_serials.remove(index);
        self.sold_serials.push(context.stamp(serial.clone(), today));
        Some(serial)
    }

    /// Move a consecutive run of `set_size` serials from the pool to sold
    pub fn take_serial_set<R: Rng>(
        &mut self,
        rng: &mut R,
        context: &SerialSaleContext,
        today: NaiveDate,
    ) -> Option<Vec<String>> {
        let units = self.set_size.units();
        let available = self.available_serials.len();
        if available < units {
            return None;
        }

        let start = rng.gen_range(0..=available - units);
        let set: Vec<String> = self.available_serials.drain(start..start + units).collect();
        self.sold_serials
            .extend(set.iter().cloned().map(|serial| context.stamp(serial, today)));
        Some(set)
    }
}

/// Catalog metadata describing a kind of equipment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EquipmentType {
    pub id: Uuid,
    pub name: String,
    pub default_cost: Decimal,
    pub category: String,
    pub description: String,
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Where stock is sourced from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn tool(stock: i32, serials: &[&str]) -> Tool {
        Tool {
            id: Uuid::new_v4(),
            name: "Hi-Target V30".to_string(),
            code: "HT-V30".to_string(),
            category: "Receiver".to_string(),
            description: String::new(),
            cost: Decimal::new(450_000_00, 2),
            stock,
            status: ToolStatus::Available,
            is_enabled: true,
            supplier_id: None,
            equipment_type_id: None,
            invoice_number: None,
            set_size: SetSize::Single,
            date_added: Utc::now(),
            expiry_date: None,
            available_serials: serials.iter().map(|s| s.to_string()).collect(),
            sold_serials: Vec::new(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn selling_named_serial_moves_it_to_sold() {
        let mut t = tool(2, &["A1", "A2"]);
        let ctx = SerialSaleContext {
            sale_id: Some(9),
            customer_name: Some("Ada".into()),
            invoice_number: Some("INV-ABC123".into()),
            date_sold: None,
        };
        t.sell_unit(Some("A2"), &ctx, today()).unwrap();

        assert_eq!(t.stock, 1);
        assert_eq!(t.available_serials, vec!["A1".to_string()]);
        assert_eq!(t.sold_serials[0].serial, "A2");
        assert_eq!(t.sold_serials[0].sale_id, Some(9));
        assert_eq!(t.sold_serials[0].date_sold, today());
    }

    #[test]
    fn unknown_serial_leaves_tool_untouched() {
        let mut t = tool(1, &["A1"]);
        let err = t
            .sell_unit(Some("Z9"), &SerialSaleContext::default(), today())
            .unwrap_err();
        assert!(matches!(err, InventoryError::SerialUnavailable { .. }));
        assert_eq!(t.stock, 1);
        assert_eq!(t.available_serials.len(), 1);
    }

    #[test]
    fn release_restores_stock_and_serial() {
        let mut t = tool(1, &["A1"]);
        t.sell_unit(Some("A1"), &SerialSaleContext::default(), today()).unwrap();
        t.release_unit(Some("A1")).unwrap();
        assert_eq!(t.stock, 1);
        assert_eq!(t.available_serials, vec!["A1".to_string()]);
        assert!(t.sold_serials.is_empty());
    }

    #[test]
    fn add_serials_rejects_duplicates() {
        let mut t = tool(1, &["A1"]);
        assert!(t.add_serials(vec!["A1".into()]).is_err());
        assert!(t.add_serials(vec!["B1".into(), "B1".into()]).is_err());
        assert_eq!(t.add_serials(vec!["B1".into(), "B2".into()]).unwrap(), 2);
        assert_eq!(t.stock, 3);
    }

    #[test]
    fn serial_set_is_consecutive() {
        let mut t = tool(6, &["S1", "S2", "S3", "S4", "S5", "S6"]);
        t.set_size = SetSize::Quad;
        let mut rng = StdRng::seed_from_u64(42);
        let set = t
            .take_serial_set(&mut rng, &SerialSaleContext::default(), today())
            .unwrap();

        assert_eq!(set.len(), 4);
        let first: usize = set[0][1..].parse().unwrap();
        for (offset, serial) in set.iter().enumerate() {
            assert_eq!(serial, &format!("S{}", first + offset));
        }
        assert_eq!(t.available_serials.len(), 2);
        assert_eq!(t.serial_count(), 6);
    }

    #[test]
    fn serial_set_needs_enough_units() {
        let mut t = tool(1, &["S1"]);
        t.set_size = SetSize::Pair;
        let mut rng = StdRng::seed_from_u64(1);
        assert!(t
            .take_serial_set(&mut rng, &SerialSaleContext::default(), today())
            .is_none());
        assert_eq!(t.available_serials.len(), 1);
    }
}
