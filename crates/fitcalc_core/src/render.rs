//! Result rendering: turns a `done` payload into the three output regions.
//!
//! Everything here is a pure function of its inputs. Calling
//! [`render_result`] twice with the same payload yields equal values, and the
//! caller replaces its previous regions wholesale with the result.

use crate::{BuyLists, Item, SectionMap, Totals};

pub const NO_RECOMMENDATIONS: &str = "No purchase recommendations available.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedResult {
    pub totals: Vec<TotalsRow>,
    pub sections: Vec<SectionTable>,
    pub recommendations: RecommendationView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<ItemRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub icon: Option<String>,
    pub name: String,
    pub qty: String,
    pub volume: String,
    pub subtotal_jita: String,
    pub subtotal_gsf: String,
    pub import_cost: String,
    pub purchase_loc: String,
    pub marked_up_price: String,
}

impl ItemRow {
    /// Cells in header order; a missing icon is an empty cell.
    pub fn cells(&self) -> [&str; 9] {
        [
            self.icon.as_deref().unwrap_or(""),
            &self.name,
            &self.qty,
            &self.volume,
            &self.subtotal_jita,
            &self.subtotal_gsf,
            &self.import_cost,
            &self.purchase_loc,
            &self.marked_up_price,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecommendationView {
    /// The server sent no `buy_lists`.
    #[default]
    Unavailable,
    Table {
        columns: Vec<String>,
        /// One entry per column; `None` where that location's list ran out.
        rows: Vec<Vec<Option<String>>>,
    },
}

pub fn render_result(
    parsed: &SectionMap,
    totals: &Totals,
    buy_lists: Option<&BuyLists>,
) -> RenderedResult {
    RenderedResult {
        totals: render_totals(totals),
        sections: render_sections(parsed, totals.markup_pct),
        recommendations: buy_lists.map_or(RecommendationView::Unavailable, render_recommendations),
    }
}

fn marked_up_label(markup_pct: f64) -> String {
    format!("Marked Up Price (+{markup_pct}%)")
}

pub fn render_totals(totals: &Totals) -> Vec<TotalsRow> {
    let row = |label: &str, value: String| TotalsRow {
        label: label.to_string(),
        value,
    };
    vec![
        row("Total Volume", format_grouped(totals.volume)),
        row("Jita Market Price", format_rounded(totals.subtotal_jita)),
        row("C-J6MT Market Price", format_rounded(totals.subtotal_gsf)),
        row("Minimum Obtainable Price", format_rounded(totals.min_price)),
        TotalsRow {
            label: marked_up_label(totals.markup_pct),
            value: format_rounded(totals.marked_up_price),
        },
    ]
}

pub fn render_sections(parsed: &SectionMap, markup_pct: f64) -> Vec<SectionTable> {
    let headers: Vec<String> = [
        "Icon",
        "Name",
        "Qty",
        "Volume",
        "Jita Sell Price",
        "C-J6MT Sell Price",
        "Import Price",
        "Purchase Location",
    ]
    .iter()
    .map(|h| h.to_string())
    .chain(std::iter::once(marked_up_label(markup_pct)))
    .collect();

    parsed
        .iter()
        .map(|(section, items)| SectionTable {
            title: section.clone(),
            headers: headers.clone(),
            rows: items.iter().map(render_item).collect(),
        })
        .collect()
}

fn render_item(item: &Item) -> ItemRow {
    ItemRow {
        icon: item.icon.clone(),
        name: item.name.clone(),
        qty: format_with_commas(item.qty),
        volume: format_grouped(item.volume),
        subtotal_jita: format_rounded(item.subtotal_jita),
        subtotal_gsf: format_rounded(item.subtotal_gsf),
        import_cost: format_rounded(item.import_cost),
        purchase_loc: item.purchase_loc.clone(),
        marked_up_price: format_rounded(item.marked_up_price),
    }
}

pub fn render_recommendations(buy_lists: &BuyLists) -> RecommendationView {
    let columns = buy_lists.keys().cloned().collect();
    let row_count = buy_lists.values().map(Vec::len).max().unwrap_or(0);
    let rows = (0..row_count)
        .map(|index| {
            buy_lists
                .values()
                .map(|entries| {
                    entries
                        .get(index)
                        .map(|entry| format!("{} ×{}", entry.name, format_with_commas(entry.qty)))
                })
                .collect()
        })
        .collect();
    RecommendationView::Table { columns, rows }
}

pub fn format_with_commas(value: u64) -> String {
    group_digits(&value.to_string())
}

/// Inserts a `,` between every group of three digits, counting from the right.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Nearest integer (halves round up), grouped.
pub fn format_rounded(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = (value + 0.5).floor();
    with_sign(rounded < 0.0, group_digits(&format!("{:.0}", rounded.abs())))
}

/// Grouped, keeping up to three fractional digits.
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.3}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let grouped = group_digits(whole);
    let body = if fraction.is_empty() {
        grouped
    } else {
        format!("{grouped}.{fraction}")
    };
    with_sign(value < 0.0, body)
}

fn with_sign(negative: bool, body: String) -> String {
    if negative && body != "0" {
        format!("-{body}")
    } else {
        body
    }
}
