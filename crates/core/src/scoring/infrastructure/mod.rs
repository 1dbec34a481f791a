mod csv;
pub mod metrics_csv;
pub mod reference_csv;
