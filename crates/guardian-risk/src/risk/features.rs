use crate::config::RiskSettings;

use super::domain::{ModelInput, SituationReport};
use super::engine::InvalidInput;

/// Validates raw situation reports and derives the contextual flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SituationPolicy {
    night_start_hour: u8,
    night_end_hour: u8,
    isolation_poi_threshold: u32,
    night_isolation_poi_threshold: u32,
}

impl Default for SituationPolicy {
    fn default() -> Self {
        Self::from_settings(&RiskSettings::default())
    }
}

impl SituationPolicy {
    pub fn from_settings(settings: &RiskSettings) -> Self {
        Self {
            night_start_hour: settings.night_start_hour,
            night_end_hour: settings.night_end_hour,
            isolation_poi_threshold: settings.isolation_poi_threshold,
            night_isolation_poi_threshold: settings.night_isolation_poi_threshold,
        }
    }

    /// Night window is inclusive on both ends and may wrap past midnight.
    pub fn is_night(&self, hour: u8) -> bool {
        if self.night_start_hour <= self.night_end_hour {
            hour >= self.night_start_hour && hour <= self.night_end_hour
        } else {
            hour >= self.night_start_hour || hour <= self.night_end_hour
        }
    }

    pub fn is_isolated(&self, poi_count: u32, is_night: bool) -> bool {
        poi_count < self.isolation_poi_threshold
            || (is_night && poi_count < self.night_isolation_poi_threshold)
    }

    pub fn normalize(&self, report: &SituationReport) -> Result<ModelInput, InvalidInput> {
        check_range("latitude", report.latitude, -90.0, 90.0)?;
        check_range("longitude", report.longitude, -180.0, 180.0)?;
        if report.hour > 23 {
            return Err(InvalidInput::new(
                "hour",
                format!("{} is not an hour between 0 and 23", report.hour),
            ));
        }
        let crime_density =
            InvalidInput::check_unit_interval("crime_density", report.crime_density)?;

        let is_night = report
            .is_night
            .unwrap_or_else(|| self.is_night(report.hour));
        let is_isolated = report
            .is_isolated
            .unwrap_or_else(|| self.is_isolated(report.poi_count, is_night));

        Ok(ModelInput {
            latitude: report.latitude,
            longitude: report.longitude,
            hour: report.hour,
            crime_density,
            poi_count: report.poi_count,
            is_night,
            is_isolated,
        })
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, InvalidInput> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(InvalidInput::new(
            field,
            format!("{value} is outside [{min}, {max}]"),
        ))
    }
}
