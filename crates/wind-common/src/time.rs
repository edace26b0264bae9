//! Model cycle selection for a requested valid time.
//!
//! Forecast products are published some time after their nominal cycle, so
//! the most recent cycle is usually not available yet. The resolver walks
//! back from the requested valid time and picks the first cycle whose lead
//! time covers it.

use crate::error::{WindError, WindResult};
use chrono::{DateTime, Duration, DurationRound, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A model run and the forecast offset to read from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleSelection {
    /// Model run time, always on the hour
    pub cycle_time: DateTime<Utc>,
    /// Forecast offset from the cycle, in hours
    pub lead_hours: u32,
}

impl CycleSelection {
    /// Build a selection from an explicit run; the cycle is truncated to the hour.
    pub fn new(cycle_time: DateTime<Utc>, lead_hours: u32) -> Self {
        Self {
            cycle_time: truncate_to_hour(cycle_time),
            lead_hours,
        }
    }

    /// Build a selection from a run date and cycle hour.
    pub fn from_date(date: NaiveDate, cycle_hour: u32, lead_hours: u32) -> WindResult<Self> {
        let naive = date
            .and_hms_opt(cycle_hour, 0, 0)
            .ok_or_else(|| WindError::InvalidTime(format!("invalid cycle hour {}", cycle_hour)))?;
        Ok(Self::new(Utc.from_utc_datetime(&naive), lead_hours))
    }

    /// Time the selected forecast is valid for.
    pub fn valid_time(&self) -> DateTime<Utc> {
        self.cycle_time + Duration::hours(self.lead_hours as i64)
    }

    pub fn cycle_date(&self) -> NaiveDate {
        self.cycle_time.date_naive()
    }

    pub fn cycle_hour(&self) -> u32 {
        use chrono::Timelike;
        self.cycle_time.hour()
    }
}

/// Deterministic cycle used when no candidate in the look-back window fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackCycle {
    pub hours_back: u32,
    pub lead_hours: u32,
}

/// Look-back window and lead limits for cycle resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleResolverConfig {
    pub min_hours_back: u32,
    pub max_hours_back: u32,
    pub max_lead_hours: u32,
    pub fallback: Option<FallbackCycle>,
}

impl Default for CycleResolverConfig {
    fn default() -> Self {
        Self {
            min_hours_back: 1,
            max_hours_back: 5,
            max_lead_hours: 18,
            fallback: Some(FallbackCycle {
                hours_back: 2,
                lead_hours: 0,
            }),
        }
    }
}

impl CycleResolverConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_hours_back > self.max_hours_back {
            return Err(format!(
                "min_hours_back ({}) must not exceed max_hours_back ({})",
                self.min_hours_back, self.max_hours_back
            ));
        }
        Ok(())
    }
}

/// Chooses a (cycle, lead) pair for a target valid time.
///
/// Pure: the caller supplies the valid time, the resolver never reads the
/// clock.
#[derive(Debug, Clone, Default)]
pub struct CycleResolver {
    config: CycleResolverConfig,
}

impl CycleResolver {
    pub fn new(config: CycleResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CycleResolverConfig {
        &self.config
    }

    /// Pick the most recent cycle, at least `min_hours_back` old, whose lead
    /// time to `valid_time` is within `max_lead_hours`.
    ///
    /// Lead hours are whole hours, truncated, so `cycle + lead` equals the
    /// valid time truncated to the hour.
    pub fn resolve(&self, valid_time: DateTime<Utc>) -> WindResult<CycleSelection> {
        for hours_back in self.config.min_hours_back..=self.config.max_hours_back {
            let candidate =
                truncate_to_hour(valid_time - Duration::hours(hours_back as i64));
            let lead = (valid_time - candidate).num_hours();

            if (0..=self.config.max_lead_hours as i64).contains(&lead) {
                return Ok(CycleSelection {
                    cycle_time: candidate,
                    lead_hours: lead as u32,
                });
            }
        }

        match self.config.fallback {
            Some(fallback) => {
                let cycle_time =
                    truncate_to_hour(valid_time - Duration::hours(fallback.hours_back as i64));
                tracing::warn!(
                    valid_time = %valid_time,
                    cycle = %cycle_time,
                    "No cycle in look-back window, using fallback"
                );
                Ok(CycleSelection {
                    cycle_time,
                    lead_hours: fallback.lead_hours,
                })
            }
            None => Err(WindError::NoFeasibleCycle {
                valid_time,
                max_hours_back: self.config.max_hours_back,
            }),
        }
    }
}

/// Truncate a timestamp to the start of its hour.
pub fn truncate_to_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    time.duration_trunc(Duration::hours(1)).unwrap_or(time)
}

/// Parse an ISO 8601 timestamp, assuming UTC when no offset is given.
pub fn parse_valid_time(s: &str) -> WindResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(WindError::InvalidTime(s.to_string()))
}

/// Parse a forecast hour selection: `"6"`, `"0,3,6"`, `"0-12"` (inclusive)
/// or a mix such as `"0-3,6"`. The result is sorted and de-duplicated.
pub fn parse_hour_list(s: &str) -> WindResult<Vec<u32>> {
    let parse = |part: &str| -> WindResult<u32> {
        part.trim()
            .parse::<u32>()
            .map_err(|_| WindError::InvalidTime(format!("invalid forecast hour '{}'", part)))
    };

    let mut hours = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if start > end {
                    return Err(WindError::InvalidTime(format!(
                        "forecast hour range '{}' is reversed",
                        part
                    )));
                }
                hours.extend(start..=end);
            }
            None => hours.push(parse(part)?),
        }
    }

    if hours.is_empty() {
        return Err(WindError::InvalidTime(format!("no forecast hours in '{}'", s)));
    }
    hours.sort_unstable();
    hours.dedup();
    Ok(hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_resolve_half_past() {
        let resolver = CycleResolver::default();
        let selection = resolver.resolve(utc(2026, 2, 26, 15, 30)).unwrap();
        assert_eq!(selection.cycle_time, utc(2026, 2, 26, 14, 0));
        assert_eq!(selection.lead_hours, 1);
    }

    #[test]
    fn test_resolve_on_the_hour() {
        let resolver = CycleResolver::default();
        let selection = resolver.resolve(utc(2026, 2, 26, 0, 0)).unwrap();
        assert_eq!(selection.cycle_time, utc(2026, 2, 25, 23, 0));
        assert_eq!(selection.lead_hours, 1);
    }

    #[test]
    fn test_cycle_plus_lead_is_truncated_valid_time() {
        let resolver = CycleResolver::default();
        for minute in [0, 1, 29, 59] {
            let valid = utc(2026, 7, 4, 9, minute);
            let selection = resolver.resolve(valid).unwrap();
            assert_eq!(selection.valid_time(), truncate_to_hour(valid));
            assert!(selection.lead_hours <= 18);
        }
    }

    #[test]
    fn test_fallback_when_window_infeasible() {
        let config = CycleResolverConfig {
            max_lead_hours: 0,
            ..Default::default()
        };
        let selection = CycleResolver::new(config)
            .resolve(utc(2026, 2, 26, 15, 30))
            .unwrap();
        assert_eq!(selection.cycle_time, utc(2026, 2, 26, 13, 0));
        assert_eq!(selection.lead_hours, 0);
    }

    #[test]
    fn test_no_feasible_cycle_without_fallback() {
        let config = CycleResolverConfig {
            max_lead_hours: 0,
            fallback: None,
            ..Default::default()
        };
        let result = CycleResolver::new(config).resolve(utc(2026, 2, 26, 15, 30));
        assert!(matches!(result, Err(WindError::NoFeasibleCycle { .. })));
    }

    #[test]
    fn test_parse_hour_list() {
        assert_eq!(parse_hour_list("6").unwrap(), vec![6]);
        assert_eq!(parse_hour_list("0,3,6").unwrap(), vec![0, 3, 6]);
        assert_eq!(parse_hour_list("0-3").unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(parse_hour_list("6, 0-2 ,1").unwrap(), vec![0, 1, 2, 6]);
        assert!(parse_hour_list("5-2").is_err());
        assert!(parse_hour_list("a,b").is_err());
        assert!(parse_hour_list("-3").is_err());
        assert!(parse_hour_list("").is_err());
    }

    #[test]
    fn test_parse_valid_time() {
        assert_eq!(
            parse_valid_time("2026-02-26T15:30:00Z").unwrap(),
            utc(2026, 2, 26, 15, 30)
        );
        assert_eq!(
            parse_valid_time("2026-02-26T15:30").unwrap(),
            utc(2026, 2, 26, 15, 30)
        );
        assert!(parse_valid_time("yesterday").is_err());
    }

    #[test]
    fn test_selection_from_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        let selection = CycleSelection::from_date(date, 12, 3).unwrap();
        assert_eq!(selection.cycle_hour(), 12);
        assert_eq!(selection.valid_time(), utc(2026, 2, 26, 15, 0));
        assert!(CycleSelection::from_date(date, 24, 0).is_err());
    }
}
