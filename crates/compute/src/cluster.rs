//! Seed-anchored single-link grouping of felt-it reports.
//!
//! This is deliberately NOT DBSCAN: a group is the set of unvisited
//! reports inside a fixed-radius disk around the seed report (the first
//! not-yet-grouped report encountered in input order). There is no
//! transitive expansion and no running centroid, and sub-threshold groups
//! keep their members out of the pool. The same report set in a different
//! input order can therefore produce a different clustering; downstream
//! consumers rely on this grouping behavior, so it must stay as-is.

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use gempa_core::{Cluster, Report};

use crate::geo::haversine_km;

/// Minimum members for a candidate group to be emitted as a cluster.
pub const MIN_CLUSTER_REPORTS: usize = 3;

/// Member count at which a cluster counts as corroborated.
pub const VERIFIED_REPORT_THRESHOLD: usize = 20;

/// Default grouping radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Report counts for the High and Medium severity bands.
const HIGH_REPORT_THRESHOLD: usize = 15;
const MEDIUM_REPORT_THRESHOLD: usize = 10;

/// Group reports into spatial clusters.
///
/// # Arguments
/// * `reports` - the full report set for the lookback window, in the
///   order the store returned them (order matters, see module docs)
/// * `radius_km` - disk radius around each seed report
///
/// # Returns
/// Clusters of at least [`MIN_CLUSTER_REPORTS`] members, sorted by
/// descending report count (stable: ties keep scan order). Empty input
/// yields an empty list; a zero or negative radius degenerates to
/// singleton groups which are all discarded.
pub fn cluster_reports(reports: &[Report], radius_km: f64) -> Vec<Cluster> {
    if reports.is_empty() {
        return Vec::new();
    }

    let mut visited: HashSet<&str> = HashSet::with_capacity(reports.len());
    let mut clusters: Vec<Cluster> = Vec::new();

    for seed in reports {
        if visited.contains(seed.id.as_str()) {
            continue;
        }

        let mut members: Vec<&Report> = vec![seed];
        visited.insert(seed.id.as_str());

        // Distances are measured from the seed, never from a centroid:
        // the group is a disk around whichever report came first.
        for other in reports {
            if visited.contains(other.id.as_str()) {
                continue;
            }

            let distance = haversine_km(
                seed.latitude,
                seed.longitude,
                other.latitude,
                other.longitude,
            );

            if distance <= radius_km {
                members.push(other);
                visited.insert(other.id.as_str());
            }
        }

        if members.len() >= MIN_CLUSTER_REPORTS {
            clusters.push(build_cluster(&members));
        }
        // Sub-threshold groups are dropped without releasing members back
        // to the pool.
    }

    clusters.sort_by(|a, b| b.report_count.cmp(&a.report_count));

    tracing::debug!(
        reports = reports.len(),
        clusters = clusters.len(),
        verified = clusters.iter().filter(|c| c.is_verified).count(),
        "Clustering pass complete"
    );
    clusters
}

/// Compute aggregate attributes for an emitted group.
fn build_cluster(members: &[&Report]) -> Cluster {
    let count = members.len();

    let lat_sum: f64 = members.iter().map(|r| r.latitude).sum();
    let lon_sum: f64 = members.iter().map(|r| r.longitude).sum();
    let intensity_sum: i64 = members.iter().map(|r| r.intensity_level as i64).sum();

    // Planar mean of spherical coordinates; fine at the radius scales
    // involved (tens of km).
    let latitude = lat_sum / count as f64;
    let longitude = lon_sum / count as f64;
    let average_intensity = intensity_sum as f64 / count as f64;

    let min_intensity = members.iter().map(|r| r.intensity_level).min().unwrap_or(0);
    let max_intensity = members.iter().map(|r| r.intensity_level).max().unwrap_or(0);

    Cluster {
        id: cluster_id(members),
        latitude,
        longitude,
        report_count: count,
        average_intensity,
        min_intensity,
        max_intensity,
        reports: members.iter().map(|r| (*r).clone()).collect(),
        is_verified: count >= VERIFIED_REPORT_THRESHOLD,
    }
}

/// Deterministic cluster id: a stable hash over the sorted member report
/// ids. The same membership always yields the same id, regardless of the
/// order the members were scanned in.
fn cluster_id(members: &[&Report]) -> String {
    let mut ids: Vec<&str> = members.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();

    let mut hasher = DefaultHasher::new();
    for id in ids {
        id.hash(&mut hasher);
    }
    format!("cluster-{:016x}", hasher.finish())
}

/// Severity band of a cluster, derived from corroboration only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classify a cluster. Verified clusters are always critical.
    pub fn of(cluster: &Cluster) -> Self {
        if cluster.is_verified {
            Severity::Critical
        } else if cluster.report_count >= HIGH_REPORT_THRESHOLD {
            Severity::High
        } else if cluster.report_count >= MEDIUM_REPORT_THRESHOLD {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Map marker color for this severity band.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Critical => "#dc2626",
            Severity::High => "#ea580c",
            Severity::Medium => "#eab308",
            Severity::Low => "#3b82f6",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(id: &str, lat: f64, lon: f64, intensity: i32) -> Report {
        Report {
            id: id.to_string(),
            latitude: lat,
            longitude: lon,
            intensity_level: intensity,
            description: None,
            location_name: "test".to_string(),
            created_at: Utc::now(),
        }
    }

    /// n reports scattered within ~1 km of (lat, lon).
    fn colocated(n: usize, lat: f64, lon: f64, intensity: i32) -> Vec<Report> {
        (0..n)
            .map(|i| {
                report(
                    &format!("r{lat}-{lon}-{i}"),
                    lat + i as f64 * 0.0005,
                    lon,
                    intensity,
                )
            })
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(cluster_reports(&[], 50.0).is_empty());
        assert!(cluster_reports(&[], 0.0).is_empty());
        assert!(cluster_reports(&[], -1.0).is_empty());
    }

    #[test]
    fn five_reports_within_one_km_form_one_cluster() {
        let reports = colocated(5, -6.2, 106.8, 4);
        let clusters = cluster_reports(&reports, 50.0);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].report_count, 5);
        assert_eq!(clusters[0].reports.len(), 5);
        assert!(!clusters[0].is_verified);
    }

    #[test]
    fn two_distant_reports_yield_no_clusters() {
        // ~1000 km apart: 9 degrees of latitude.
        let reports = vec![report("a", 0.0, 0.0, 3), report("b", 9.0, 0.0, 3)];
        assert!(cluster_reports(&reports, 50.0).is_empty());
    }

    #[test]
    fn twenty_five_reports_near_jakarta_are_verified_critical() {
        // All within 10 km of (-6.2, 106.8).
        let reports: Vec<Report> = (0..25)
            .map(|i| report(&format!("jkt-{i}"), -6.2 + i as f64 * 0.001, 106.8, 5))
            .collect();

        let clusters = cluster_reports(&reports, 50.0);

        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        assert_eq!(c.report_count, 25);
        assert!(c.is_verified);
        assert_eq!(Severity::of(c), Severity::Critical);
        assert_eq!(Severity::of(c).color(), "#dc2626");
        assert_eq!(Severity::of(c).to_string(), "critical");
    }

    #[test]
    fn two_disjoint_groups_500km_apart() {
        // ~500 km is 4.5 degrees of latitude.
        let mut reports = colocated(4, 0.0, 0.0, 3);
        reports.extend(colocated(4, 4.5, 0.0, 6));

        let clusters = cluster_reports(&reports, 50.0);

        assert_eq!(clusters.len(), 2);
        for c in &clusters {
            assert_eq!(c.report_count, 4);
            assert!(!c.is_verified);
            assert_eq!(Severity::of(c), Severity::Low);
            assert_eq!(Severity::of(c).color(), "#3b82f6");
        }
    }

    #[test]
    fn no_cluster_below_minimum_size() {
        let mut reports = colocated(2, 0.0, 0.0, 3);
        reports.extend(colocated(2, 4.5, 0.0, 3));
        reports.extend(colocated(4, 9.0, 0.0, 3));

        let clusters = cluster_reports(&reports, 50.0);

        assert_eq!(clusters.len(), 1);
        for c in &clusters {
            assert!(c.report_count >= MIN_CLUSTER_REPORTS);
        }
    }

    #[test]
    fn verification_threshold_is_exact() {
        let at_threshold = cluster_reports(&colocated(20, 0.0, 0.0, 4), 50.0);
        assert_eq!(at_threshold.len(), 1);
        assert!(at_threshold[0].is_verified);

        let below = cluster_reports(&colocated(19, 0.0, 0.0, 4), 50.0);
        assert_eq!(below.len(), 1);
        assert!(!below[0].is_verified);
    }

    #[test]
    fn aggregate_bounds_hold() {
        let mut reports = colocated(1, 0.0, 0.0, 2);
        reports.extend(colocated(1, 0.001, 0.0, 9));
        reports.extend(colocated(1, 0.002, 0.0, 5));
        // Distinct ids for the three singles.
        for (i, r) in reports.iter_mut().enumerate() {
            r.id = format!("agg-{i}");
        }

        let clusters = cluster_reports(&reports, 50.0);
        assert_eq!(clusters.len(), 1);

        let c = &clusters[0];
        assert_eq!(c.min_intensity, 2);
        assert_eq!(c.max_intensity, 9);
        assert!((c.average_intensity - 16.0 / 3.0).abs() < 1e-9);
        assert!(c.min_intensity as f64 <= c.average_intensity);
        assert!(c.average_intensity <= c.max_intensity as f64);
    }

    #[test]
    fn out_of_range_intensities_still_aggregate() {
        // The engine does not re-validate the 1–9 scale.
        let reports = vec![
            report("x1", 0.0, 0.0, -5),
            report("x2", 0.001, 0.0, 0),
            report("x3", 0.002, 0.0, 42),
        ];

        let clusters = cluster_reports(&reports, 50.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].min_intensity, -5);
        assert_eq!(clusters[0].max_intensity, 42);
        assert!((clusters[0].average_intensity - 37.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn output_sorted_by_descending_report_count() {
        // Smaller group first in input order; output must lead with the
        // larger one.
        let mut reports = colocated(4, 0.0, 0.0, 3);
        reports.extend(colocated(6, 9.0, 0.0, 3));
        reports.extend(colocated(5, 18.0, 0.0, 3));

        let clusters = cluster_reports(&reports, 50.0);

        assert_eq!(clusters.len(), 3);
        let counts: Vec<usize> = clusters.iter().map(|c| c.report_count).collect();
        assert_eq!(counts, vec![6, 5, 4]);
    }

    #[test]
    fn centroid_is_mean_of_members() {
        let reports = vec![
            report("c1", 0.0, 100.0, 3),
            report("c2", 0.2, 100.2, 3),
            report("c3", 0.1, 100.1, 3),
        ];

        let clusters = cluster_reports(&reports, 50.0);
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].latitude - 0.1).abs() < 1e-9);
        assert!((clusters[0].longitude - 100.1).abs() < 1e-9);
    }

    #[test]
    fn grouping_is_anchored_to_seed_not_transitive() {
        // Chain: r3 is within radius of r2 but not of the seed r1, so it
        // must not be pulled in through r2.
        let reports = vec![
            report("r1", 0.0, 0.0, 3),
            report("r2", 0.4, 0.0, 3),  // ~44 km from r1
            report("r3", 0.8, 0.0, 3),  // ~89 km from r1, ~44 km from r2
            report("r4", -0.1, 0.0, 3), // ~11 km from r1
        ];

        let clusters = cluster_reports(&reports, 50.0);

        assert_eq!(clusters.len(), 1);
        let ids: Vec<&str> = clusters[0].reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r4"]);
    }

    #[test]
    fn permuted_input_changes_grouping() {
        // A bridge report sits within radius of two small pockets that are
        // out of radius of each other. Whichever pocket's seed scans first
        // claims the bridge and reaches the size-3 threshold; the other
        // pocket is stranded at size 2 and discarded. This order
        // sensitivity is contract, not accident.
        let a1 = report("a1", 0.0, 0.0, 3);
        let a2 = report("a2", 0.1, 0.0, 3);
        let b1 = report("b1", 0.8, 0.0, 3);
        let b2 = report("b2", 0.9, 0.0, 3);
        let bridge = report("m", 0.4, 0.0, 3); // ~44 km from both a1 and b1

        let order_a = vec![
            a1.clone(),
            a2.clone(),
            bridge.clone(),
            b1.clone(),
            b2.clone(),
        ];
        let order_b = vec![b1, b2, bridge, a1, a2];

        let clusters_a = cluster_reports(&order_a, 50.0);
        let clusters_b = cluster_reports(&order_b, 50.0);

        assert_eq!(clusters_a.len(), 1);
        assert_eq!(clusters_b.len(), 1);

        let members_a: HashSet<&str> =
            clusters_a[0].reports.iter().map(|r| r.id.as_str()).collect();
        let members_b: HashSet<&str> =
            clusters_b[0].reports.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(members_a, HashSet::from(["a1", "a2", "m"]));
        assert_eq!(members_b, HashSet::from(["b1", "b2", "m"]));
        assert_ne!(members_a, members_b);
    }

    #[test]
    fn cluster_id_is_deterministic_for_same_membership() {
        let reports = colocated(5, -6.2, 106.8, 4);

        let first = cluster_reports(&reports, 50.0);
        let second = cluster_reports(&reports, 50.0);
        assert_eq!(first[0].id, second[0].id);

        // Reversing a tight group keeps the membership, so the id holds.
        let reversed: Vec<Report> = reports.iter().rev().cloned().collect();
        let third = cluster_reports(&reversed, 50.0);
        assert_eq!(first[0].id, third[0].id);
    }

    #[test]
    fn zero_or_negative_radius_yields_no_clusters() {
        // Distinct points at radius 0: every disk holds only its seed.
        let reports = colocated(5, 0.0, 0.0, 3);
        assert!(cluster_reports(&reports, 0.0).is_empty());
        assert!(cluster_reports(&reports, -10.0).is_empty());
    }

    #[test]
    fn severity_bands() {
        let severity_for = |n: usize| {
            let clusters = cluster_reports(&colocated(n, 0.0, 0.0, 4), 50.0);
            Severity::of(&clusters[0])
        };

        assert_eq!(severity_for(3), Severity::Low);
        assert_eq!(severity_for(9), Severity::Low);
        assert_eq!(severity_for(10), Severity::Medium);
        assert_eq!(severity_for(14), Severity::Medium);
        assert_eq!(severity_for(15), Severity::High);
        assert_eq!(severity_for(19), Severity::High);
        assert_eq!(severity_for(20), Severity::Critical);
    }

    #[test]
    fn severity_colors() {
        assert_eq!(Severity::Low.color(), "#3b82f6");
        assert_eq!(Severity::Medium.color(), "#eab308");
        assert_eq!(Severity::High.color(), "#ea580c");
        assert_eq!(Severity::Critical.color(), "#dc2626");
    }
}
