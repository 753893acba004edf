mod tables;

pub use tables::{
    format_cycle_summary, format_daily_ledger, format_expected_series, format_farm_report,
    format_variance_table,
};
