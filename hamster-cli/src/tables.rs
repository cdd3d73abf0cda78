use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use hamster::{core::savings::DailySavings, quantity::cost::Cost, report::Grouping};

pub fn build_savings_table(rows: &[DailySavings], grouping: Grouping) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec![
        grouping.to_string().as_str(),
        "Gross",
        "Lost revenue",
        "Net",
        "Grid arbitrage",
        "Total",
    ]);
    for row in rows {
        let total = row.total();
        table.add_row(vec![
            Cell::new(match grouping {
                Grouping::Day | Grouping::Week => row.date.format("%Y-%m-%d"),
                Grouping::Month => row.date.format("%Y-%m"),
            }),
            Cell::new(row.gross_savings).set_alignment(CellAlignment::Right),
            Cell::new(row.lost_revenue)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(row.net_savings).set_alignment(CellAlignment::Right),
            Cell::new(row.grid_arbitrage_savings).set_alignment(CellAlignment::Right),
            Cell::new(total).set_alignment(CellAlignment::Right).fg(if total >= Cost::ONE_CENT {
                Color::Green
            } else if total <= -Cost::ONE_CENT {
                Color::Red
            } else {
                Color::Reset
            }),
        ]);
    }
    table
}
