use crate::store::StoreStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct CountRow {
    #[tabled(rename = "Collection")]
    pub collection: String,
    #[tabled(rename = "Rows")]
    pub rows: usize,
}

/// Render per-collection row counts, referenced collections first
pub fn stats_table(stats: &StoreStats) -> String {
    let rows: Vec<CountRow> = stats
        .rows()
        .into_iter()
        .map(|(kind, rows)| CountRow {
            collection: kind.collection().to_string(),
            rows,
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}
