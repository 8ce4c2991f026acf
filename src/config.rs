use crate::core::CoreError;
use crate::core::curve::TransposeDomain;
use crate::core::overlap::OverlapModel;
use crate::core::roughness::RoughnessModel;
use crate::core::spectrum::IntervalKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_out_dir")]
    pub out_dir: String,
    #[serde(default = "OutputConfig::default_width")]
    pub width: u32,
    #[serde(default = "OutputConfig::default_height")]
    pub height: u32,
    #[serde(default = "OutputConfig::default_write_csv")]
    pub write_csv: bool,
}

impl OutputConfig {
    fn default_out_dir() -> String {
        "target/plots/figures".to_string()
    }
    fn default_width() -> u32 {
        1200
    }
    fn default_height() -> u32 {
        700
    }
    fn default_write_csv() -> bool {
        true
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: Self::default_out_dir(),
            width: Self::default_width(),
            height: Self::default_height(),
            write_csv: Self::default_write_csv(),
        }
    }
}

/// Model selection for the custom `--sweep` plot. Names go through the
/// same parsers as everywhere else, so "SETHARES", "CBW", "PARNCUTT",
/// "HELMHOLTZ" and "BELL", "COS", "CBW", "PARNCUTT_BELL" are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "ModelConfig::default_roughness")]
    pub roughness: String,
    #[serde(default = "ModelConfig::default_overlap")]
    pub overlap: String,
    #[serde(default = "ModelConfig::default_original_constants")]
    pub original_constants: bool,
}

impl ModelConfig {
    fn default_roughness() -> String {
        "SETHARES".to_string()
    }
    fn default_overlap() -> String {
        "BELL".to_string()
    }
    fn default_original_constants() -> bool {
        false
    }

    /// Resolve the configured roughness model with default parameters,
    /// honoring `original_constants` for the Sethares variant.
    pub fn roughness_model(&self) -> Result<RoughnessModel, CoreError> {
        let kind: crate::core::roughness::RoughnessModelKind = self.roughness.parse()?;
        let mut model = kind.default_model();
        if let RoughnessModel::Sethares(params) = &mut model {
            params.original = self.original_constants;
        }
        Ok(model)
    }

    pub fn overlap_model(&self) -> Result<OverlapModel, CoreError> {
        let kind: crate::core::overlap::OverlapModelKind = self.overlap.parse()?;
        Ok(kind.default_model())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            roughness: Self::default_roughness(),
            overlap: Self::default_overlap(),
            original_constants: Self::default_original_constants(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "SweepConfig::default_partials")]
    pub partials: usize,
    #[serde(default = "SweepConfig::default_fund_hz")]
    pub fund_hz: f64,
    #[serde(default = "SweepConfig::default_start")]
    pub start: f64,
    #[serde(default = "SweepConfig::default_stop")]
    pub stop: f64,
    #[serde(default = "SweepConfig::default_steps")]
    pub steps: usize,
    #[serde(default = "SweepConfig::default_kind")]
    pub kind: String,
    #[serde(default = "SweepConfig::default_normalize")]
    pub normalize: bool,
}

impl SweepConfig {
    fn default_partials() -> usize {
        7
    }
    fn default_fund_hz() -> f64 {
        220.0
    }
    fn default_start() -> f64 {
        -0.5
    }
    fn default_stop() -> f64 {
        12.5
    }
    fn default_steps() -> usize {
        1301
    }
    fn default_kind() -> String {
        "ST_DIFF".to_string()
    }
    fn default_normalize() -> bool {
        true
    }

    pub fn interval_kind(&self) -> Result<IntervalKind, CoreError> {
        self.kind.parse()
    }

    /// Panics if `steps < 2`, like `TransposeDomain::new`.
    pub fn domain(&self) -> Result<TransposeDomain, CoreError> {
        Ok(TransposeDomain::new(
            self.start,
            self.stop,
            self.steps,
            self.interval_kind()?,
        ))
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            partials: Self::default_partials(),
            fund_hz: Self::default_fund_hz(),
            start: Self::default_start(),
            stop: Self::default_stop(),
            steps: Self::default_steps(),
            kind: Self::default_kind(),
            normalize: Self::default_normalize(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlotConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl PlotConfig {
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        eprintln!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    eprintln!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        // File does not exist: write commented defaults and return them.
        let default_cfg = Self::default();
        if let Ok(text) = toml::to_string_pretty(&default_cfg) {
            let mut commented = String::new();
            for line in text.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    commented.push('\n');
                } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                    commented.push_str(line);
                    commented.push('\n');
                } else {
                    commented.push_str("# ");
                    commented.push_str(line);
                    commented.push('\n');
                }
            }
            if let Err(err) = fs::write(path_obj, commented) {
                eprintln!("Failed to write default config to {path}: {err}");
            }
        } else {
            eprintln!("Failed to serialize default config; continuing with defaults");
        }
        default_cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::roughness::RoughnessModelKind;
    use std::fs;

    fn unique_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "rugosity_config_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn load_or_default_writes_defaults_cleanly() {
        let path = unique_path("defaults.toml");
        let path_str = path.to_string_lossy().to_string();
        let _ = fs::remove_file(&path);

        let cfg = PlotConfig::load_or_default(&path_str);
        assert!(path.exists(), "config file should be created");
        assert_eq!(cfg.output.out_dir, "target/plots/figures");
        assert_eq!(cfg.output.width, 1200);
        assert_eq!(cfg.output.height, 700);
        assert!(cfg.output.write_csv);
        assert_eq!(cfg.models.roughness, "SETHARES");
        assert_eq!(cfg.models.overlap, "BELL");
        assert_eq!(cfg.sweep.partials, 7);
        assert_eq!(cfg.sweep.fund_hz, 220.0);
        assert_eq!(cfg.sweep.steps, 1301);

        let contents = fs::read_to_string(&path).expect("read written config");
        assert!(contents.contains("[output]"));
        assert!(contents.contains("# width = 1200"));
        assert!(contents.contains("# roughness = \"SETHARES\""));
        assert!(contents.contains("# kind = \"ST_DIFF\""));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_or_default_reads_existing() {
        let path = unique_path("custom.toml");
        let path_str = path.to_string_lossy().to_string();
        let custom = PlotConfig {
            output: OutputConfig {
                out_dir: "target/elsewhere".to_string(),
                width: 800,
                height: 500,
                write_csv: false,
            },
            models: ModelConfig {
                roughness: "PARNCUTT".to_string(),
                overlap: "COS".to_string(),
                original_constants: true,
            },
            sweep: SweepConfig {
                partials: 3,
                fund_hz: 261.63,
                start: 0.0,
                stop: 24.0,
                steps: 97,
                kind: "SCALE_FACTOR".to_string(),
                normalize: false,
            },
        };
        let text = toml::to_string_pretty(&custom).unwrap();
        fs::write(&path, text).unwrap();

        let cfg = PlotConfig::load_or_default(&path_str);
        assert_eq!(cfg.output.out_dir, "target/elsewhere");
        assert_eq!(cfg.output.width, 800);
        assert!(!cfg.output.write_csv);
        assert_eq!(cfg.models.roughness, "PARNCUTT");
        assert!(cfg.models.original_constants);
        assert_eq!(cfg.sweep.partials, 3);
        assert_eq!(cfg.sweep.steps, 97);
        assert_eq!(cfg.sweep.interval_kind().unwrap(), IntervalKind::ScaleFactor);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn model_names_resolve_through_the_shared_parsers() {
        let cfg = ModelConfig::default();
        let model = cfg.roughness_model().unwrap();
        assert_eq!(model.kind(), RoughnessModelKind::Sethares);
        assert!(cfg.overlap_model().is_ok());

        let strict = ModelConfig {
            original_constants: true,
            ..ModelConfig::default()
        };
        match strict.roughness_model().unwrap() {
            RoughnessModel::Sethares(params) => assert!(params.original),
            other => panic!("expected Sethares, got {:?}", other.kind()),
        }

        let bad = ModelConfig {
            roughness: "SPLINE".to_string(),
            ..ModelConfig::default()
        };
        assert!(matches!(
            bad.roughness_model(),
            Err(CoreError::InvalidModel(_))
        ));
    }

    #[test]
    fn sweep_domain_spans_the_configured_range() {
        let sweep = SweepConfig::default();
        let domain = sweep.domain().unwrap();
        assert_eq!(domain.len(), 1301);
        assert_eq!(domain.positions()[0], -0.5);
        assert_eq!(*domain.positions().last().unwrap(), 12.5);
        assert_eq!(domain.kind(), IntervalKind::SemitoneDiff);
    }
}
