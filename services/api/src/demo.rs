use crate::infra::{build_assessment_service, AssessmentService};
use clap::Args;
use guardian_risk::config::AppConfig;
use guardian_risk::error::AppError;
use guardian_risk::risk::{
    Decision, FeatureRecord, RiskDecisionEngine, RiskServiceError, SituationReport,
};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Normalized crime density in [0, 1]
    #[arg(long)]
    pub(crate) crime_density: f64,
    /// Local hour of the situation (0-23)
    #[arg(long)]
    pub(crate) hour: u8,
    /// Points of interest around the location
    #[arg(long, default_value_t = 0)]
    pub(crate) poi_count: u32,
    /// Force the night flag instead of deriving it from the hour
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub(crate) night: Option<bool>,
    /// Force the isolation flag instead of deriving it from the POI count
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub(crate) isolated: Option<bool>,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub(crate) latitude: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub(crate) longitude: f64,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV with latitude, longitude, hour, crime_density, poi_count and optional isNight/isIsolated columns
    pub(crate) csv: PathBuf,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_assessment_service(&config.risk)?;

    let report = SituationReport {
        user_id: None,
        username: None,
        latitude: args.latitude,
        longitude: args.longitude,
        hour: args.hour,
        crime_density: args.crime_density,
        poi_count: args.poi_count,
        is_night: args.night,
        is_isolated: args.isolated,
    };

    let decision = service.predict(&report)?;
    let rendered = serde_json::to_string_pretty(&decision)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_assessment_service(&config.risk)?;
    let file = File::open(&args.csv)?;

    let lines = score_csv(file, &service)?;
    let mut rejected = 0usize;
    for line in &lines {
        match &line.outcome {
            Ok(decision) => println!(
                "row {:>4}: {:>3} {:<6} ({:?})",
                line.row,
                decision.result.score(),
                decision.result.level(),
                decision.basis
            ),
            Err(detail) => {
                rejected += 1;
                println!("row {:>4}: rejected: {detail}", line.row);
            }
        }
    }
    println!(
        "\nScored {} situation(s), rejected {}.",
        lines.len() - rejected,
        rejected
    );
    Ok(())
}

pub(crate) struct BatchLine {
    pub(crate) row: usize,
    pub(crate) outcome: Result<Decision, String>,
}

/// Rows that fail validation are reported individually; malformed CSV aborts.
pub(crate) fn score_csv<R: Read>(
    reader: R,
    service: &AssessmentService,
) -> Result<Vec<BatchLine>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut lines = Vec::new();

    for (index, row) in csv_reader.deserialize::<SituationReport>().enumerate() {
        let report = row.map_err(|err| AppError::Batch(err.to_string()))?;
        let outcome = match service.predict(&report) {
            Ok(decision) => Ok(decision),
            Err(RiskServiceError::InvalidInput(err)) => Err(err.to_string()),
            Err(other) => return Err(other.into()),
        };
        lines.push(BatchLine {
            row: index + 1,
            outcome,
        });
    }

    Ok(lines)
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let engine = RiskDecisionEngine::new();
    let scenarios = [
        ("dense hotspot at night", 0.9, true, true, 0.1),
        ("isolated street after dark", 0.65, true, true, 0.05),
        ("busy street after dark", 0.65, true, false, 0.9),
        ("quiet area, model alarmed", 0.1, false, false, 0.8),
        ("quiet area, model uneasy", 0.1, false, false, 0.5),
        ("quiet area, model calm", 0.1, false, false, 0.2),
    ];

    println!("=== Risk decision walkthrough ===");
    println!(
        "{:<28} {:>7} {:>5} {:>8} {:>6}  {:>5} {:<6} basis",
        "scenario", "density", "night", "isolated", "p(HIGH)", "score", "level"
    );

    for (label, crime_density, is_night, is_isolated, high_prob) in scenarios {
        let decision = engine
            .explain(
                &FeatureRecord {
                    crime_density,
                    is_night,
                    is_isolated,
                },
                high_prob,
            )
            .map_err(RiskServiceError::from)?;
        println!(
            "{:<28} {:>7.2} {:>5} {:>8} {:>6.2}  {:>5} {:<6} {:?}",
            label,
            crime_density,
            is_night,
            is_isolated,
            high_prob,
            decision.result.score(),
            decision.result.level(),
            decision.basis
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_risk::config::RiskSettings;
    use guardian_risk::risk::RiskLevel;
    use std::io::Cursor;

    #[test]
    fn score_csv_reports_each_row() {
        let service = build_assessment_service(&RiskSettings::default()).expect("service builds");
        let csv = "latitude,longitude,hour,crime_density,poi_count,isNight,isIsolated\n\
                   12.97,77.59,23,0.9,2,,\n\
                   12.97,77.59,23,0.65,2,true,true\n\
                   12.97,77.59,14,1.7,20,,\n";

        let lines = score_csv(Cursor::new(csv), &service).expect("csv parses");

        assert_eq!(lines.len(), 3);
        let first = lines[0].outcome.as_ref().expect("first row scores");
        assert_eq!(first.result.score(), 95);
        let second = lines[1].outcome.as_ref().expect("second row scores");
        assert_eq!(second.result.level(), RiskLevel::High);
        assert_eq!(second.result.score(), 90);
        let rejected = lines[2].outcome.as_ref().expect_err("third row rejected");
        assert!(rejected.contains("crime_density"));
    }

    #[test]
    fn score_csv_aborts_on_malformed_rows() {
        let service = build_assessment_service(&RiskSettings::default()).expect("service builds");
        let csv = "latitude,longitude,hour,crime_density,poi_count\nnorth,77.59,14,0.1,20\n";

        assert!(matches!(
            score_csv(Cursor::new(csv), &service),
            Err(AppError::Batch(_))
        ));
    }

    #[test]
    fn demo_runs_all_scenarios() {
        run_demo().expect("demo succeeds");
    }
}
