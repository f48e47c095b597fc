//! Derived figures for the analytics view.

use crate::model::Product;

/// Number of bars in the stock chart.
pub const STOCK_CHART_SLOTS: usize = 10;

/// One bar of the stock chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockPoint {
    pub name: String,
    pub stock: u32,
}

/// Active vs. inactive product counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusBreakdown {
    pub active: usize,
    pub inactive: usize,
}

/// Stock per product for the last [`STOCK_CHART_SLOTS`] products.
///
/// Always returns exactly [`STOCK_CHART_SLOTS`] points. With fewer products the
/// leading slots are empty (`""`, 0) so the bars stay right-aligned.
pub fn stock_chart(products: &[Product]) -> Vec<StockPoint> {
    let recent = &products[products.len().saturating_sub(STOCK_CHART_SLOTS)..];
    let padding = STOCK_CHART_SLOTS - recent.len();

    std::iter::repeat_with(|| StockPoint {
        name: String::new(),
        stock: 0,
    })
    .take(padding)
    .chain(recent.iter().map(|p| StockPoint {
        name: p.name.clone(),
        stock: p.quantity,
    }))
    .collect()
}

pub fn status_breakdown(products: &[Product]) -> StatusBreakdown {
    let active = products.iter().filter(|p| p.status).count();
    StatusBreakdown {
        active,
        inactive: products.len() - active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(n: usize) -> Vec<Product> {
        (1..=n)
            .map(|i| Product::new(format!("p{i}"), format!("Item {i}"), 1.0, i as u32, i % 2 == 0))
            .collect()
    }

    #[test]
    fn test_stock_chart_pads_short_lists_at_the_front() {
        let chart = stock_chart(&catalog(3));
        assert_eq!(chart.len(), STOCK_CHART_SLOTS);
        assert!(chart[..7].iter().all(|p| p.name.is_empty() && p.stock == 0));
        assert_eq!(chart[9], StockPoint { name: "Item 3".into(), stock: 3 });
    }

    #[test]
    fn test_stock_chart_keeps_last_ten() {
        let chart = stock_chart(&catalog(14));
        assert_eq!(chart.first().map(|p| p.name.as_str()), Some("Item 5"));
        assert_eq!(chart.last().map(|p| p.stock), Some(14));
    }

    #[test]
    fn test_status_breakdown() {
        assert_eq!(status_breakdown(&catalog(5)), StatusBreakdown { active: 2, inactive: 3 });
        assert_eq!(status_breakdown(&[]), StatusBreakdown::default());
    }
}
