// Console rendering of the report view models.
use crate::finance::FinancialSummary;
use crate::reports::{AnalyticalReport, DashboardView, PerformanceReport, Ranking};
use crate::util::{format_int, format_number, format_peso};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Tabled)]
pub struct RankingRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Count")]
    pub count: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct StatusRow {
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Count")]
    pub count: String,
    #[tabled(rename = "TopLocations")]
    pub top_locations: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct MonthlyRow {
    #[tabled(rename = "Month")]
    pub month: String,
    #[tabled(rename = "Total")]
    pub total: String,
    #[tabled(rename = "Delivered")]
    pub delivered: String,
    #[tabled(rename = "RTS")]
    pub rts: String,
    #[tabled(rename = "DeliveryRate")]
    pub delivery_rate: String,
    #[tabled(rename = "RtsRate")]
    pub rts_rate: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

fn metric(name: &str, value: String) -> MetricRow {
    MetricRow { metric: name.to_string(), value }
}

pub fn ranking_rows(ranking: &Ranking) -> Vec<RankingRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(i, (name, count))| RankingRow {
            rank: i + 1,
            name: name.clone(),
            count: format_int(*count),
        })
        .collect()
}

fn locations_cell(ranking: &Ranking) -> String {
    ranking
        .iter()
        .map(|(name, count)| format!("{} ({})", name, format_int(*count)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn print_dashboard(view: &DashboardView, max_rows: usize) {
    println!("DASHBOARD: {}", view.scope.label());
    println!(
        "Total parcels: {} | RTS rate: {}%\n",
        format_int(view.total),
        format_number(view.rts_percentage, 2)
    );
    let statuses: Vec<StatusRow> = view
        .status_cards
        .iter()
        .map(|card| StatusRow {
            status: card.status.to_string(),
            count: format_int(card.count),
            top_locations: locations_cell(&card.top_locations),
        })
        .collect();
    preview_table("Status Overview", &statuses, max_rows);
    preview_table("Top Provinces", &ranking_rows(&view.top_provinces), max_rows);
    preview_table("Top Regions", &ranking_rows(&view.top_regions), max_rows);
    preview_table("Top RTS Provinces", &ranking_rows(&view.top_rts_provinces), max_rows);
    preview_table("Top Delivered Shippers", &ranking_rows(&view.top_delivered_shippers), max_rows);
    preview_table("Top RTS Shippers", &ranking_rows(&view.top_rts_shippers), max_rows);
}

pub fn print_analytical(report: &AnalyticalReport, max_rows: usize) {
    let t = &report.island_totals;
    let totals = vec![
        metric("Luzon", format_int(t.luzon)),
        metric("Visayas", format_int(t.visayas)),
        metric("Mindanao", format_int(t.mindanao)),
        metric("Total", format_int(t.total)),
    ];
    preview_table("ANALYTICAL REPORT: Parcels per Island", &totals, max_rows);
    preview_table("Top 10 Provinces", &ranking_rows(&report.top_provinces), max_rows);
    preview_table("Top 10 Shippers", &ranking_rows(&report.top_shippers), max_rows);
    preview_table("Top 10 RTS Destinations", &ranking_rows(&report.top_rts_destinations), max_rows);
}

pub fn print_performance(report: &PerformanceReport, max_rows: usize) {
    let headline = vec![
        metric("Total Parcels", format_int(report.total)),
        metric("Delivery Rate", format!("{}%", format_number(report.delivery_rate, 2))),
        metric("RTS Rate", format!("{}%", format_number(report.rts_rate, 2))),
        metric("Delivered", format_int(report.delivered)),
    ];
    preview_table("PERFORMANCE REPORT", &headline, max_rows);

    let breakdown: Vec<MetricRow> = report
        .breakdown
        .iter()
        .map(|(status, count)| metric(status.as_str(), format_int(*count)))
        .collect();
    preview_table("Status Breakdown", &breakdown, breakdown.len());

    let monthly: Vec<MonthlyRow> = report
        .monthly
        .iter()
        .map(|m| MonthlyRow {
            month: format!("{:04}-{:02}", m.year, m.month),
            total: format_int(m.total),
            delivered: format_int(m.delivered),
            rts: format_int(m.rts),
            delivery_rate: format!("{}%", format_number(m.delivery_rate, 2)),
            rts_rate: format!("{}%", format_number(m.rts_rate, 2)),
        })
        .collect();
    preview_table("Monthly Rates", &monthly, max_rows);
}

pub fn print_financial(summary: &FinancialSummary) {
    let rows = vec![
        metric("Total COD Amount", format_peso(summary.total_cod)),
        metric("Total Service Charge", format_peso(summary.total_service_charge)),
        metric("Total Shipping Cost", format_peso(summary.total_shipping_cost)),
        metric("Total RTS Fee (20%)", format_peso(summary.total_rts_fee)),
        metric("Gross Profit", format_peso(summary.gross_profit)),
        metric("RTS Parcels", format_int(summary.rts_parcels)),
        metric("RTS Shipping Cost Lost", format_peso(summary.rts_shipping_cost)),
        metric("RTS Fee Impact", format_peso(summary.rts_fee_lost)),
        metric("Net Profit", format_peso(summary.net_profit)),
    ];
    preview_table("FINANCIAL IMPACT REPORT", &rows, rows.len());
}

/// Pretty JSON on stdout, for pasting into other tools.
pub fn print_json<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}:\n{}\n", label, s),
        Err(e) => eprintln!("Could not render {}: {}", label, e),
    }
}
