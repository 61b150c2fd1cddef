//! Fixed-order cleaning pipeline:
//! preprocess → confidence → outliers → interpolation.
//!
//! Order matters. Outlier detection must see confidence gaps already nulled,
//! and interpolation runs last so it never fills data an earlier stage still
//! has to judge.

pub mod batch;
pub mod report;

pub use batch::{BatchResult, CleanedTable, CleaningJob};
pub use report::{CleaningOutcome, CleaningReport};

use tracing::{info, instrument};

use trackclean_core::config::CleaningConfig;
use trackclean_core::errors::{ConfigError, PipelineError};

use crate::confidence::{apply_confidence_filter, ConfidenceSettings};
use crate::interpolation::{apply_interpolation, DisplacementCeiling, InterpolationSettings};
use crate::outliers::{filter_position_outliers, OutlierSettings};
use crate::preprocess::{preprocess, PreprocessSettings};
use crate::table::FrameTable;

/// Typed settings for every stage. A `None` stage is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSettings {
    pub preprocess: Option<PreprocessSettings>,
    pub confidence: Option<ConfidenceSettings>,
    pub outliers: Option<OutlierSettings>,
    pub interpolation: Option<InterpolationSettings>,
    pub ceiling: Option<DisplacementCeiling>,
}

impl PipelineSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(c) = &self.confidence {
            c.validate()?;
        }
        if let Some(o) = &self.outliers {
            o.validate()?;
        }
        if let Some(i) = &self.interpolation {
            i.validate()?;
        }
        if let Some(c) = &self.ceiling {
            c.validate()?;
        }
        Ok(())
    }

    /// Convert string-typed config into stage settings, failing on unknown names.
    pub fn from_config(config: &CleaningConfig) -> Result<Self, ConfigError> {
        CleaningConfig::validate(config)?;
        Ok(Self {
            preprocess: PreprocessSettings::from_config(&config.preprocess)?,
            confidence: ConfidenceSettings::from_config(&config.confidence)?,
            outliers: OutlierSettings::from_config(&config.outliers)?,
            interpolation: InterpolationSettings::from_config(&config.interpolation)?,
            ceiling: DisplacementCeiling::from_config(&config.interpolation)?,
        })
    }
}

/// Validated stage settings; holds no state between runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn from_config(config: &CleaningConfig) -> Result<Self, ConfigError> {
        Self::new(PipelineSettings::from_config(config)?)
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Clean one table.
    #[instrument(skip_all, fields(rows = table.len(), columns = table.column_names().len()))]
    pub fn run(&self, table: FrameTable) -> Result<CleaningOutcome, PipelineError> {
        let mut report = CleaningReport {
            rows_in: table.len(),
            column_warnings: table.model().warnings().to_vec(),
            ..Default::default()
        };

        let mut table = table;
        if let Some(settings) = &self.settings.preprocess {
            let (t, r) = preprocess(table, settings);
            table = t;
            report.preprocess = Some(r);
        }
        if let Some(settings) = &self.settings.confidence {
            let (t, r) = apply_confidence_filter(table, settings)?;
            table = t;
            report.confidence = Some(r);
        }
        if let Some(settings) = &self.settings.outliers {
            let (t, r) = filter_position_outliers(table, settings)?;
            table = t;
            report.outliers = Some(r);
        }
        if let Some(settings) = &self.settings.interpolation {
            let (t, r) = apply_interpolation(table, settings, self.settings.ceiling.as_ref())?;
            table = t;
            report.interpolation = Some(r);
        }

        report.rows_out = table.len();
        report.missing_coordinates = CleaningReport::count_missing(&table);
        info!(
            rows_out = report.rows_out,
            missing = report.missing_coordinates,
            "table cleaned"
        );
        Ok(CleaningOutcome { table, report })
    }
}
