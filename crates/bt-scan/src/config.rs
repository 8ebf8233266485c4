use std::path::Path;

use bt_blob::{BlobConfig, LabelTable};
use bt_core::{BorderMode, ConfigError, Error};
use bt_signal::{BandConfig, PeriodConfig, ProfileConfig};
use bt_track::TrackConfig;
use serde::{Deserialize, Serialize};

/// Every threshold of a scan in one place.
///
/// Missing fields in a JSON document take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Length `N` of the cross-section sampled in every column.
    pub samples_per_column: usize,
    /// Run the per-column stage on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
    /// Out-of-image handling while sampling columns.
    pub border: BorderMode,
    pub profile: ProfileConfig,
    pub period: PeriodConfig,
    pub band: BandConfig,
    pub track: TrackConfig,
    pub blob: BlobConfig,
    pub labels: LabelTable,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            samples_per_column: 100,
            parallel: true,
            border: BorderMode::Clamp,
            profile: ProfileConfig::default(),
            period: PeriodConfig::default(),
            band: BandConfig::default(),
            track: TrackConfig::default(),
            blob: BlobConfig::default(),
            labels: LabelTable::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| ConfigError::Document(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Document(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.samples_per_column < self.band.score_taps.max(2) {
            return Err(Error::invalid_parameter(
                "samples_per_column",
                format!(
                    "{} is too short for {} scoring taps",
                    self.samples_per_column, self.band.score_taps
                ),
            ));
        }

        let p = &self.profile;
        if !(p.gradient_sigma.is_finite() && p.gradient_sigma > 0.0) {
            return Err(Error::invalid_parameter(
                "profile.gradient_sigma",
                "must be > 0 and finite",
            ));
        }
        if p.blur_taps % 2 == 0 {
            return Err(Error::invalid_parameter("profile.blur_taps", "must be odd"));
        }
        if !p.intensity_max.is_finite() {
            return Err(Error::invalid_parameter(
                "profile.intensity_max",
                "must be finite",
            ));
        }

        let f = &self.period;
        if !f.fft_size.is_power_of_two() || f.fft_size < 4 {
            return Err(Error::invalid_parameter(
                "period.fft_size",
                format!("{} is not a power of two >= 4", f.fft_size),
            ));
        }
        if f.min_bucket >= f.fft_size / 2 {
            return Err(Error::invalid_parameter(
                "period.min_bucket",
                format!("must be below fft_size/2 = {}", f.fft_size / 2),
            ));
        }
        if !f.phase_rotation.is_finite() {
            return Err(Error::invalid_parameter(
                "period.phase_rotation",
                "must be finite",
            ));
        }

        if self.band.score_taps % 2 == 0 {
            return Err(Error::invalid_parameter("band.score_taps", "must be odd"));
        }

        let t = &self.track;
        if !(t.gate.is_finite() && t.gate >= 0.0) {
            return Err(Error::invalid_parameter("track.gate", "must be >= 0"));
        }
        if !(t.smoothing > 0.0 && t.smoothing <= 1.0) {
            return Err(Error::invalid_parameter(
                "track.smoothing",
                "must be in (0, 1]",
            ));
        }

        self.blob.validate()?;
        self.labels.validate()
    }
}

#[cfg(test)]
mod tests {
    use bt_core::{ConfigError, Error};

    use super::ScanConfig;

    #[test]
    fn defaults_are_valid() {
        let cfg = ScanConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.samples_per_column, 100);
        assert_eq!(cfg.period.fft_size, 2048);
        assert_eq!(cfg.period.min_bucket, 20);
        assert_eq!(cfg.track.gate, 4.0);
        assert_eq!(cfg.labels.len(), 17);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg = ScanConfig::from_json_str(
            r#"{ "samples_per_column": 64, "track": { "gate": 3.0 }, "blob": { "threshold": 100.0 } }"#,
        )
        .expect("valid document");
        assert_eq!(cfg.samples_per_column, 64);
        assert_eq!(cfg.track.gate, 3.0);
        assert_eq!(cfg.track.smoothing, 0.25);
        assert_eq!(cfg.blob.threshold, 100.0);
        assert_eq!(cfg.blob.width, 10..=40);
        assert_eq!(cfg.period.fft_size, 2048);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = ScanConfig::default();
        let back = ScanConfig::from_json_str(&cfg.to_json_string().expect("serialize"))
            .expect("round trip");
        assert_eq!(back, cfg);
    }

    #[test]
    fn invalid_values_name_the_parameter() {
        let mut cfg = ScanConfig::default();
        cfg.period.fft_size = 1000;
        match cfg.validate() {
            Err(Error::Configuration(ConfigError::InvalidParameter { name, .. })) => {
                assert_eq!(name, "period.fft_size");
            }
            other => panic!("unexpected: {other:?}"),
        }

        let mut cfg = ScanConfig::default();
        cfg.profile.blur_taps = 4;
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::default();
        cfg.track.smoothing = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::default();
        cfg.samples_per_column = 3;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_document_is_a_configuration_error() {
        let err = ScanConfig::from_json_str("{ not json").expect_err("must fail");
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::Document(_))
        ));
    }
}
