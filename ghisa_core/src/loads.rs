//! Load resolution for sets and advanced training methods.
//!
//! Pure functions, no state:
//! - absolute weight ↔ percentage-of-one-rep-max conversion
//! - cluster-set counting and load curves
//! - custom-method rep grouping
//!
//! Error policy: insufficient input (unknown one-rep max, missing cluster
//! bounds) resolves to `None`. Callers treat an absent load as "cannot
//! display" and never block progression on it.

use crate::types::{ClusterConfig, Load, ProgressionShape, RepConfiguration, RestPauseConfig};

/// Tolerance when comparing resolved loads, absorbs float noise
pub const LOAD_EPSILON: f64 = 0.01;

/// Effective weight in kg for a load, given an optional one-rep max
pub fn resolve_weight(load: &Load, one_rep_max: Option<f64>) -> Option<f64> {
    match load {
        Load::Absolute { kg, .. } => Some(*kg),
        Load::Percentage { pct, .. } => one_rep_max.map(|max| pct / 100.0 * max),
        Load::Bodyweight => None,
    }
}

/// Effective percentage of one-rep max for a load
pub fn resolve_percentage(load: &Load, one_rep_max: Option<f64>) -> Option<f64> {
    match load {
        Load::Percentage { pct, .. } => Some(*pct),
        Load::Absolute { kg, .. } => one_rep_max
            .filter(|max| *max > 0.0)
            .map(|max| kg / max * 100.0),
        Load::Bodyweight => None,
    }
}

/// Toggle a load between absolute and percentage, caching the value we
/// leave behind so toggling back restores it exactly.
pub fn toggle_load(load: &Load, one_rep_max: Option<f64>) -> Load {
    match load {
        Load::Absolute { kg, last_pct } => Load::Percentage {
            pct: last_pct
                .or_else(|| resolve_percentage(load, one_rep_max))
                .unwrap_or(0.0),
            last_kg: Some(*kg),
        },
        Load::Percentage { pct, last_kg } => Load::Absolute {
            kg: last_kg
                .or_else(|| resolve_weight(load, one_rep_max))
                .unwrap_or(0.0),
            last_pct: Some(*pct),
        },
        Load::Bodyweight => Load::Bodyweight,
    }
}

/// Number of mini-sets a clustered set splits into: `ceil(reps / size)`.
/// `None` when either input is missing or zero.
pub fn cluster_count(reps: Option<u32>, cluster_size: Option<u32>) -> Option<u32> {
    let reps = reps.filter(|r| *r > 0)?;
    let size = cluster_size.filter(|s| *s > 0)?;
    Some(reps.div_ceil(size))
}

/// Per-cluster load percentages across `count` mini-sets.
///
/// A single cluster always lands on the midpoint of the bounds. The wave
/// shape ascends to the peak at `count / 2`, then descends; the
/// descending half's interpolation denominator can reach zero for short
/// curves, which is guarded here (remaining points take the lower bound).
pub fn cluster_load_curve(
    count: u32,
    shape: ProgressionShape,
    min_pct: Option<f64>,
    max_pct: Option<f64>,
) -> Option<Vec<f64>> {
    if count == 0 {
        return None;
    }
    let min = min_pct?;
    let max = max_pct?;
    let mid = (min + max) / 2.0;

    if count == 1 {
        return Some(vec![mid]);
    }

    let n = count as usize;
    let span = max - min;

    let curve = match shape {
        ProgressionShape::Constant => vec![mid; n],
        ProgressionShape::Ascending => (0..n)
            .map(|i| min + span * i as f64 / (n - 1) as f64)
            .collect(),
        ProgressionShape::Descending => (0..n)
            .map(|i| max - span * i as f64 / (n - 1) as f64)
            .collect(),
        ProgressionShape::Wave => {
            let midpoint = n / 2;
            let mut curve = Vec::with_capacity(n);
            for i in 0..=midpoint {
                if midpoint == 0 {
                    curve.push(min);
                } else {
                    curve.push(min + span * i as f64 / midpoint as f64);
                }
            }
            let denom = n - midpoint - 1;
            for i in (midpoint + 1)..n {
                if denom == 0 {
                    curve.push(min);
                } else {
                    curve.push(max - span * (i - midpoint) as f64 / denom as f64);
                }
            }
            curve
        }
    };

    Some(curve)
}

/// A run of consecutive reps sharing the same resolved load and rest
#[derive(Clone, Debug, PartialEq)]
pub struct RepGroup {
    /// 1-based inclusive rep range
    pub start_rep: u32,
    pub end_rep: u32,
    /// Resolved load, `base_load` adjusted by the configured delta
    pub load: f64,
    /// Display label for the delta, e.g. "+10%"
    pub delta_label: String,
    /// Rest that follows each rep of the group
    pub rest_after_seconds: u32,
}

impl RepGroup {
    pub fn rep_count(&self) -> u32 {
        self.end_rep - self.start_rep + 1
    }
}

fn delta_label(delta_pct: f64) -> String {
    if delta_pct >= 0.0 {
        format!("+{:.0}%", delta_pct)
    } else {
        format!("{:.0}%", delta_pct)
    }
}

/// Walk a custom method's rep configurations in order, merging
/// consecutive reps with identical resolved load and rest into groups.
pub fn custom_method_rep_groups(
    rep_configs: &[RepConfiguration],
    base_load: f64,
) -> Vec<RepGroup> {
    let mut groups: Vec<RepGroup> = Vec::new();

    let mut configs: Vec<&RepConfiguration> = rep_configs.iter().collect();
    configs.sort_by_key(|c| c.rep_order);

    for (i, config) in configs.iter().enumerate() {
        // Deltas outside [-50, +100] are clamped, mirroring the editor
        let delta = config.load_delta_pct.clamp(-50.0, 100.0);
        let load = base_load * (1.0 + delta / 100.0);
        let rep_number = i as u32 + 1;

        let merged = groups.last().is_some_and(|last| {
            (last.load - load).abs() < LOAD_EPSILON
                && last.rest_after_seconds == config.rest_after_seconds
        });

        if merged {
            if let Some(last) = groups.last_mut() {
                last.end_rep = rep_number;
            }
        } else {
            groups.push(RepGroup {
                start_rep: rep_number,
                end_rep: rep_number,
                load,
                delta_label: delta_label(delta),
                rest_after_seconds: config.rest_after_seconds,
            });
        }
    }

    groups
}

/// Human-readable cluster summary, e.g. "3 clusters of 2 reps, 20s rest"
pub fn cluster_description(reps: Option<u32>, cluster: &ClusterConfig) -> Option<String> {
    let count = cluster_count(reps, Some(cluster.cluster_size))?;
    Some(format!(
        "{} clusters of {} reps, {}s rest",
        count, cluster.cluster_size, cluster.cluster_rest_seconds
    ))
}

/// Human-readable rest-pause summary, e.g. "2 pauses of 15s"
pub fn rest_pause_description(config: &RestPauseConfig) -> String {
    format!("{} pauses of {}s", config.pause_count, config.pause_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    #[test]
    fn test_resolve_weight_absolute() {
        let load = Load::Absolute { kg: 80.0, last_pct: None };
        assert_eq!(resolve_weight(&load, None), Some(80.0));
        assert_eq!(resolve_weight(&load, Some(100.0)), Some(80.0));
    }

    #[test]
    fn test_resolve_weight_percentage_needs_max() {
        let load = Load::Percentage { pct: 75.0, last_kg: None };
        assert_eq!(resolve_weight(&load, None), None);
        assert_close(resolve_weight(&load, Some(120.0)).unwrap(), 90.0);
    }

    #[test]
    fn test_resolve_percentage_roundtrip() {
        // percentage -> weight -> percentage recovers the original
        let one_rep_max = Some(140.0);
        let original = Load::Percentage { pct: 82.5, last_kg: None };
        let kg = resolve_weight(&original, one_rep_max).unwrap();
        let as_absolute = Load::Absolute { kg, last_pct: None };
        let pct = resolve_percentage(&as_absolute, one_rep_max).unwrap();
        assert!((pct - 82.5).abs() < 1e-9);
    }

    #[test]
    fn test_bodyweight_resolves_to_none() {
        assert_eq!(resolve_weight(&Load::Bodyweight, Some(100.0)), None);
        assert_eq!(resolve_percentage(&Load::Bodyweight, Some(100.0)), None);
    }

    #[test]
    fn test_toggle_load_caches_previous_value() {
        let load = Load::Absolute { kg: 80.0, last_pct: None };
        let toggled = toggle_load(&load, Some(100.0));
        assert_eq!(
            toggled,
            Load::Percentage { pct: 80.0, last_kg: Some(80.0) }
        );
        let back = toggle_load(&toggled, Some(100.0));
        assert_eq!(back, Load::Absolute { kg: 80.0, last_pct: Some(80.0) });
    }

    #[test]
    fn test_cluster_count_rounds_up() {
        assert_eq!(cluster_count(Some(6), Some(2)), Some(3));
        assert_eq!(cluster_count(Some(7), Some(2)), Some(4));
        assert_eq!(cluster_count(Some(5), Some(5)), Some(1));
    }

    #[test]
    fn test_cluster_count_missing_inputs() {
        assert_eq!(cluster_count(None, Some(2)), None);
        assert_eq!(cluster_count(Some(6), None), None);
        assert_eq!(cluster_count(Some(0), Some(2)), None);
        assert_eq!(cluster_count(Some(6), Some(0)), None);
    }

    #[test]
    fn test_single_cluster_always_midpoint() {
        for shape in [
            ProgressionShape::Constant,
            ProgressionShape::Ascending,
            ProgressionShape::Descending,
            ProgressionShape::Wave,
        ] {
            let curve = cluster_load_curve(1, shape, Some(80.0), Some(95.0)).unwrap();
            assert_eq!(curve.len(), 1);
            assert_close(curve[0], 87.5);
        }
    }

    #[test]
    fn test_constant_curve() {
        let curve =
            cluster_load_curve(4, ProgressionShape::Constant, Some(80.0), Some(90.0)).unwrap();
        assert_eq!(curve, vec![85.0; 4]);
    }

    #[test]
    fn test_ascending_curve() {
        let curve =
            cluster_load_curve(3, ProgressionShape::Ascending, Some(80.0), Some(95.0)).unwrap();
        assert_eq!(curve.len(), 3);
        assert_close(curve[0], 80.0);
        assert_close(curve[1], 87.5);
        assert_close(curve[2], 95.0);
    }

    #[test]
    fn test_descending_curve() {
        let curve =
            cluster_load_curve(3, ProgressionShape::Descending, Some(80.0), Some(95.0)).unwrap();
        assert_close(curve[0], 95.0);
        assert_close(curve[1], 87.5);
        assert_close(curve[2], 80.0);
    }

    #[test]
    fn test_wave_curve_short_count_does_not_crash() {
        // count 3 exercises the guarded descending-half denominator
        let curve =
            cluster_load_curve(3, ProgressionShape::Wave, Some(80.0), Some(95.0)).unwrap();
        assert_eq!(curve.len(), 3);
        assert_close(curve[0], 80.0);
        let peak = curve.iter().cloned().fold(f64::MIN, f64::max);
        assert_close(peak, 95.0);
    }

    #[test]
    fn test_wave_curve_ascends_then_descends() {
        let curve =
            cluster_load_curve(5, ProgressionShape::Wave, Some(70.0), Some(90.0)).unwrap();
        assert_eq!(curve.len(), 5);
        assert_close(curve[0], 70.0);
        assert_close(curve[2], 90.0);
        assert!(curve[3] < curve[2]);
        assert!(curve[4] < curve[3]);
    }

    #[test]
    fn test_curve_missing_bounds_is_none() {
        assert!(cluster_load_curve(3, ProgressionShape::Wave, None, Some(95.0)).is_none());
        assert!(cluster_load_curve(3, ProgressionShape::Wave, Some(80.0), None).is_none());
        assert!(cluster_load_curve(0, ProgressionShape::Constant, Some(80.0), Some(95.0)).is_none());
    }

    fn rep(order: u32, delta: f64, rest: u32) -> RepConfiguration {
        RepConfiguration {
            rep_order: order,
            load_delta_pct: delta,
            rest_after_seconds: rest,
        }
    }

    #[test]
    fn test_rep_groups_merge_identical_neighbours() {
        let configs = vec![rep(0, 0.0, 0), rep(1, 0.0, 0), rep(2, 10.0, 30), rep(3, 10.0, 30)];
        let groups = custom_method_rep_groups(&configs, 100.0);

        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].start_rep, groups[0].end_rep), (1, 2));
        assert_close(groups[0].load, 100.0);
        assert_eq!(groups[0].rest_after_seconds, 0);
        assert_eq!((groups[1].start_rep, groups[1].end_rep), (3, 4));
        assert_close(groups[1].load, 110.0);
        assert_eq!(groups[1].rest_after_seconds, 30);
        assert_eq!(groups[1].delta_label, "+10%");
    }

    #[test]
    fn test_rep_groups_split_on_rest_change() {
        // Same load, different rest: must not merge
        let configs = vec![rep(0, 0.0, 10), rep(1, 0.0, 30)];
        let groups = custom_method_rep_groups(&configs, 100.0);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_rep_groups_clamp_delta() {
        let configs = vec![rep(0, 250.0, 0)];
        let groups = custom_method_rep_groups(&configs, 100.0);
        assert_close(groups[0].load, 200.0); // clamped to +100%
    }

    #[test]
    fn test_rep_groups_epsilon_absorbs_float_noise() {
        let configs = vec![rep(0, 10.0, 0), rep(1, 10.000001, 0)];
        let groups = custom_method_rep_groups(&configs, 100.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rep_count(), 2);
    }

    #[test]
    fn test_descriptions() {
        let cluster = ClusterConfig {
            cluster_size: 2,
            cluster_rest_seconds: 20,
            shape: ProgressionShape::Constant,
            min_pct: Some(80.0),
            max_pct: Some(90.0),
        };
        assert_eq!(
            cluster_description(Some(6), &cluster).unwrap(),
            "3 clusters of 2 reps, 20s rest"
        );
        let rp = RestPauseConfig { pause_count: 2, pause_seconds: 15 };
        assert_eq!(rest_pause_description(&rp), "2 pauses of 15s");
    }
}
