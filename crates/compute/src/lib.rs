pub mod cluster;
pub mod geo;

pub use cluster::{
    cluster_reports, Severity, DEFAULT_RADIUS_KM, MIN_CLUSTER_REPORTS, VERIFIED_REPORT_THRESHOLD,
};
pub use geo::haversine_km;
