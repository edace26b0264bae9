//! Expansion of a run request into independent units of work.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use wind_common::{ArtifactKey, CycleResolver, CycleSelection, RunStamp, TileCoord};

use crate::error::Result;
use crate::local::LocalGribFile;

/// Hours subtracted from "now" when picking the latest cycle, so that the
/// cycle has been published.
pub const LATEST_CYCLE_DELAY_HOURS: i64 = 3;

/// What a run should produce.
#[derive(Debug, Clone)]
pub enum RunRequest {
    /// One unit per offset, valid at `base + offset` hours. Each valid time
    /// is resolved to a cycle; artifacts are named after the valid date,
    /// the resolved cycle hour and the offset.
    ValidTime {
        base: DateTime<Utc>,
        offsets: Vec<u32>,
    },
    /// One unit per lead hour of a fixed cycle.
    Cycle {
        date: NaiveDate,
        cycle_hour: u32,
        leads: Vec<u32>,
    },
    /// One unit per file already on disk, named after the file.
    LocalFiles(Vec<LocalGribFile>),
}

impl RunRequest {
    /// The most recent cycle expected to be published at `now`.
    pub fn latest(now: DateTime<Utc>, leads: Vec<u32>) -> Self {
        let target = now - Duration::hours(LATEST_CYCLE_DELAY_HOURS);
        RunRequest::Cycle {
            date: target.date_naive(),
            cycle_hour: target.hour(),
            leads,
        }
    }
}

/// One (cycle, lead) computation and the key its artifacts are stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    pub selection: CycleSelection,
    pub key: ArtifactKey,
    /// Stamp the unit's tiles are published under, shared by the batch.
    pub run: RunStamp,
}

impl WorkUnit {
    pub fn new(selection: CycleSelection, key: ArtifactKey) -> Self {
        Self {
            selection,
            key,
            run: key.run(),
        }
    }

    pub fn with_run(mut self, run: RunStamp) -> Self {
        self.run = run;
        self
    }

    /// Storage path of one of this unit's tiles.
    pub fn tile_path(&self, coord: &TileCoord) -> String {
        self.run.tile_path(self.key.forecast_hour, coord)
    }

    /// A unit whose key follows directly from its cycle and lead.
    pub fn from_selection(selection: CycleSelection) -> Self {
        Self::new(selection, ArtifactKey::from_selection(&selection))
    }
}

/// Expand `request` into units.
///
/// A unit that cannot be planned (no feasible cycle, invalid cycle hour)
/// is returned as an error in place so the batch can count it as skipped.
///
/// All planned units share the run stamp of the first one, so a batch whose
/// valid times resolve to different cycles still publishes its tiles under
/// one directory.
pub fn plan_units(request: &RunRequest, resolver: &CycleResolver) -> Vec<Result<WorkUnit>> {
    let mut units: Vec<Result<WorkUnit>> = match request {
        RunRequest::ValidTime { base, offsets } => offsets
            .iter()
            .map(|&offset| {
                let valid_time = *base + Duration::hours(offset as i64);
                let selection = resolver.resolve(valid_time)?;
                let key = ArtifactKey::new(
                    valid_time.date_naive(),
                    selection.cycle_hour(),
                    offset,
                );
                Ok(WorkUnit::new(selection, key))
            })
            .collect(),
        RunRequest::Cycle {
            date,
            cycle_hour,
            leads,
        } => leads
            .iter()
            .map(|&lead| {
                let selection = CycleSelection::from_date(*date, *cycle_hour, lead)?;
                Ok(WorkUnit::from_selection(selection))
            })
            .collect(),
        RunRequest::LocalFiles(files) => {
            if !files.is_empty() {
                warn!("Local files are processed without checking cycle availability");
            }
            files
                .iter()
                .map(|file| Ok(WorkUnit::new(file.selection()?, file.key)))
                .collect()
        }
    };

    let runs: BTreeSet<RunStamp> = units
        .iter()
        .filter_map(|u| u.as_ref().ok().map(|u| u.key.run()))
        .collect();
    if let Some(shared) = units.iter().find_map(|u| u.as_ref().ok().map(|u| u.run)) {
        if runs.len() > 1 {
            warn!(
                run = %shared,
                cycles = runs.len(),
                "Units span several cycles; tiles share one run stamp"
            );
        }
        for unit in units.iter_mut().flatten() {
            unit.run = shared;
        }
    }

    debug!(
        planned = units.iter().filter(|u| u.is_ok()).count(),
        failed = units.iter().filter(|u| u.is_err()).count(),
        "Planned units"
    );
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wind_common::CycleResolverConfig;

    fn resolver() -> CycleResolver {
        CycleResolver::new(CycleResolverConfig::default())
    }

    #[test]
    fn test_valid_time_units_use_offset_naming() {
        let base = Utc.with_ymd_and_hms(2026, 2, 26, 15, 30, 0).unwrap();
        let request = RunRequest::ValidTime {
            base,
            offsets: vec![0, 2],
        };

        let units: Vec<WorkUnit> = plan_units(&request, &resolver())
            .into_iter()
            .map(|u| u.unwrap())
            .collect();

        assert_eq!(units.len(), 2);
        assert_eq!(
            units[0].selection.cycle_time,
            Utc.with_ymd_and_hms(2026, 2, 26, 14, 0, 0).unwrap()
        );
        assert_eq!(units[0].selection.lead_hours, 1);
        assert_eq!(units[0].key.basename(), "20260226_t14z_f00");

        // 17:30 resolves to 16z + 1
        assert_eq!(units[1].selection.lead_hours, 1);
        assert_eq!(units[1].key.basename(), "20260226_t16z_f02");

        // Tiles of both offsets live under the first unit's run
        assert_eq!(units[0].run, units[1].run);
        assert_eq!(units[1].run.to_string(), "20260226T14z");
        assert_eq!(
            units[1].tile_path(&TileCoord::new(0, 0, 0)),
            "wind-particles/20260226T14z/02/0/0/0.png"
        );
    }

    #[test]
    fn test_valid_time_naming_uses_valid_date() {
        let base = Utc.with_ymd_and_hms(2026, 2, 27, 0, 10, 0).unwrap();
        let request = RunRequest::ValidTime {
            base,
            offsets: vec![0],
        };
        let unit = plan_units(&request, &resolver()).remove(0).unwrap();
        // Cycle is 23z on the 26th, the name carries the valid date
        assert_eq!(unit.selection.cycle_date(), NaiveDate::from_ymd_opt(2026, 2, 26).unwrap());
        assert_eq!(unit.key.basename(), "20260227_t23z_f00");
    }

    #[test]
    fn test_cycle_units() {
        let request = RunRequest::Cycle {
            date: NaiveDate::from_ymd_opt(2026, 2, 26).unwrap(),
            cycle_hour: 12,
            leads: vec![0, 1, 2],
        };
        let keys: Vec<String> = plan_units(&request, &resolver())
            .into_iter()
            .map(|u| u.unwrap().key.basename())
            .collect();
        assert_eq!(
            keys,
            vec!["20260226_t12z_f00", "20260226_t12z_f01", "20260226_t12z_f02"]
        );
    }

    #[test]
    fn test_invalid_cycle_hour_fails_per_unit() {
        let request = RunRequest::Cycle {
            date: NaiveDate::from_ymd_opt(2026, 2, 26).unwrap(),
            cycle_hour: 25,
            leads: vec![0],
        };
        let units = plan_units(&request, &resolver());
        assert_eq!(units.len(), 1);
        assert!(units[0].is_err());
    }

    #[test]
    fn test_latest_is_three_hours_back() {
        let now = Utc.with_ymd_and_hms(2026, 2, 26, 1, 45, 0).unwrap();
        match RunRequest::latest(now, vec![0]) {
            RunRequest::Cycle {
                date, cycle_hour, ..
            } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 2, 25).unwrap());
                assert_eq!(cycle_hour, 22);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }
}
