//! Configuration structures for the dispensary simulator
//!
//! This module contains the run parameters, the command line arguments, the
//! partial configuration file overlay and the validation logic applied before
//! any parameter reaches the simulation core.

use super::{AdjustmentAnchor, SamplingMode};
use crate::calendar::OpeningHours;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Fixed constants of the dispensary model
pub mod model {
    /// Length of every simulation run in hours (one week)
    pub const RUN_HORIZON_HOURS: f64 = 168.0;

    /// Number of concurrent courier processes by default
    pub const DEFAULT_PICKUP_INSTANCES: usize = 6;
}

/// Serde for hour values that may be infinite
///
/// JSON has no infinity, so `f64::INFINITY` is written as the string `"inf"`.
/// Finite values stay plain numbers.
pub mod hours_or_infinity {
    use serde::{Deserialize, Deserializer, Serializer};

    const INFINITY_TEXT: &str = "inf";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hours {
        Number(f64),
        Text(String),
    }

    impl Hours {
        fn into_hours<E: serde::de::Error>(self) -> Result<f64, E> {
            match self {
                Hours::Number(value) => Ok(value),
                Hours::Text(text) => match text.trim().to_lowercase().as_str() {
                    "inf" | "+inf" | "infinity" | "+infinity" => Ok(f64::INFINITY),
                    other => other
                        .parse::<f64>()
                        .map_err(|_| E::custom(format!("expected hours or \"inf\", got \"{}\"", text))),
                },
            }
        }
    }

    /// Write infinity as `"inf"`, anything else as a number
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() && value.is_sign_positive() {
            serializer.serialize_str(INFINITY_TEXT)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    /// Accept a number or `"inf"`
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Hours::deserialize(deserializer)?.into_hours()
    }

    /// Same encoding for optional fields
    pub mod option {
        use super::Hours;
        use serde::{Deserialize, Deserializer, Serializer};

        /// Write `None` as null
        pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(hours) => super::serialize(hours, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Accept null, a number or `"inf"`
        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
            Option::<Hours>::deserialize(deserializer)?
                .map(Hours::into_hours)
                .transpose()
        }
    }

    #[cfg(test)]
    mod tests {
        #[derive(Debug, serde::Serialize, serde::Deserialize)]
        struct Gap {
            #[serde(with = "crate::types::config::hours_or_infinity")]
            hours: f64,
        }

        #[test]
        fn test_infinity_is_written_as_text() {
            let json = serde_json::to_string(&Gap { hours: f64::INFINITY }).unwrap();
            assert_eq!(json, r#"{"hours":"inf"}"#);
            let parsed: Gap = serde_json::from_str(&json).unwrap();
            assert!(parsed.hours.is_infinite());
        }

        #[test]
        fn test_numbers_and_spellings_are_accepted() {
            let parsed: Gap = serde_json::from_str(r#"{"hours":0.25}"#).unwrap();
            assert_eq!(parsed.hours, 0.25);
            let parsed: Gap = serde_json::from_str(r#"{"hours":"Infinity"}"#).unwrap();
            assert_eq!(parsed.hours, f64::INFINITY);
            assert!(serde_json::from_str::<Gap>(r#"{"hours":"soon"}"#).is_err());
        }
    }
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dispensary-delivery-simulator",
    version = "0.1.0",
    about = "Dispensary Simulator - Simulates prescription flow from arrival to ward delivery",
    long_about = "Runs a one-week discrete-event simulation of a hospital pharmacy dispensary: prescriptions arrive during opening hours, pass verification, labelling, dispensing and final checking, wait in a holding store and are collected by couriers at scheduled pickup times.

EXAMPLES:
    # Run with default settings
    dispensary-delivery-simulator

    # Use a configuration file
    dispensary-delivery-simulator --config config.json

    # Override staffing and pickup times
    dispensary-delivery-simulator --num-pharmacists 2 --weekday-pickup-times 10,14,17

    # Reproducible run with exported tables
    dispensary-delivery-simulator --seed 42 --output-directory results

    # Generate configuration template
    dispensary-delivery-simulator --print-config > my-config.json

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Mean duration of each processing step in hours
    #[arg(
        long,
        help = "Mean duration of each processing step (hours)",
        long_help = "Mean of the exponential duration of each of the four processing steps, in hours. Default: 0.25"
    )]
    pub average_step_duration: Option<f64>,

    /// Mean time between prescription arrivals in hours
    #[arg(
        long,
        help = "Mean time between new prescriptions (hours)",
        long_help = "Mean of the exponential inter-arrival time of prescriptions during opening hours, in hours. Use 'inf' for a single arrival at the first opening. Default: 0.0833"
    )]
    pub interarrival_time: Option<f64>,

    /// Number of pharmacists working
    #[arg(long, help = "Number of pharmacists working")]
    pub num_pharmacists: Option<usize>,

    /// Number of labellers working
    #[arg(long, help = "Number of labellers working")]
    pub num_labellers: Option<usize>,

    /// Number of dispensers working
    #[arg(long, help = "Number of dispensers working")]
    pub num_dispensers: Option<usize>,

    /// Number of final checkers working
    #[arg(long, help = "Number of final checkers working")]
    pub num_final_checkers: Option<usize>,

    /// Mean transport duration in hours
    #[arg(long, help = "Mean transport duration to the wards (hours)")]
    pub average_transport_duration: Option<f64>,

    /// Standard deviation of the transport duration in hours
    #[arg(long, help = "Standard deviation of the transport duration (hours)")]
    pub transport_duration_std_dev: Option<f64>,

    /// Pickup times on weekdays (hours of the day)
    #[arg(
        long,
        num_args = 1..,
        value_delimiter = ',',
        help = "Pickup times on weekdays, e.g. 10,12,15,17"
    )]
    pub weekday_pickup_times: Option<Vec<f64>>,

    /// Pickup times on weekends (hours of the day)
    #[arg(
        long,
        num_args = 1..,
        value_delimiter = ',',
        help = "Pickup times on weekends, e.g. 12"
    )]
    pub weekend_pickup_times: Option<Vec<f64>>,

    /// Opening hours Monday to Friday as `open,close`
    #[arg(
        long,
        num_args = 2,
        value_delimiter = ',',
        value_names = ["OPEN", "CLOSE"],
        help = "Weekday opening hours, e.g. 9,17.5"
    )]
    pub weekday_opening_hours: Option<Vec<f64>>,

    /// Opening hours Saturday and Sunday as `open,close`
    #[arg(
        long,
        num_args = 2,
        value_delimiter = ',',
        value_names = ["OPEN", "CLOSE"],
        help = "Weekend opening hours, e.g. 9,13"
    )]
    pub weekend_opening_hours: Option<Vec<f64>>,

    /// Number of concurrent courier processes
    #[arg(long, help = "Number of concurrent couriers collecting from the store")]
    pub pickup_instances: Option<usize>,

    /// Time anchor used when adjusting stage durations for closing time
    #[arg(
        long,
        help = "Adjustment anchor (arrival or stage_start)",
        long_help = "Which time of day anchors the closing-time adjustment of each stage. 'arrival' reuses the prescription's arrival time for all four stages; 'stage_start' uses the time each stage begins. Default: arrival"
    )]
    pub adjustment_anchor: Option<AdjustmentAnchor>,

    /// Sampling mode for random durations
    #[arg(long, help = "Sampling mode (stochastic or deterministic)")]
    pub sampling: Option<SamplingMode>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Directory for the exported tables and summary
    #[arg(long, help = "Directory to write CSV tables and the JSON summary to")]
    pub output_directory: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Mean duration of each processing step in hours
    pub average_step_duration: Option<f64>,

    /// Mean time between prescription arrivals in hours
    #[serde(default, with = "hours_or_infinity::option")]
    pub interarrival_time: Option<f64>,

    /// Number of pharmacists working
    pub num_pharmacists: Option<usize>,

    /// Number of labellers working
    pub num_labellers: Option<usize>,

    /// Number of dispensers working
    pub num_dispensers: Option<usize>,

    /// Number of final checkers working
    pub num_final_checkers: Option<usize>,

    /// Mean transport duration in hours
    pub average_transport_duration: Option<f64>,

    /// Standard deviation of the transport duration in hours
    pub transport_duration_std_dev: Option<f64>,

    /// Pickup times on weekdays
    pub weekday_pickup_times: Option<Vec<f64>>,

    /// Pickup times on weekends
    pub weekend_pickup_times: Option<Vec<f64>>,

    /// Opening hours Monday to Friday
    pub weekday_opening_hours: Option<OpeningHours>,

    /// Opening hours Saturday and Sunday
    pub weekend_opening_hours: Option<OpeningHours>,

    /// Number of concurrent courier processes
    pub pickup_instances: Option<usize>,

    /// Time anchor for the closing-time adjustment
    pub adjustment_anchor: Option<AdjustmentAnchor>,

    /// Sampling mode for random durations
    pub sampling: Option<SamplingMode>,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Directory for exported results
    pub output_directory: Option<String>,
}

/// Parameters of one simulation run
///
/// Constructed once before the run and never mutated while it executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Mean duration of each processing step in hours
    pub average_step_duration: f64,

    /// Mean time between prescription arrivals in hours
    #[serde(with = "hours_or_infinity")]
    pub interarrival_time: f64,

    /// Number of pharmacists working
    pub num_pharmacists: usize,

    /// Number of labellers working
    pub num_labellers: usize,

    /// Number of dispensers working
    pub num_dispensers: usize,

    /// Number of final checkers working
    pub num_final_checkers: usize,

    /// Mean transport duration in hours
    pub average_transport_duration: f64,

    /// Standard deviation of the transport duration in hours
    pub transport_duration_std_dev: f64,

    /// Pickup times on weekdays (hours of the day, ascending)
    pub weekday_pickup_times: Vec<f64>,

    /// Pickup times on weekends (hours of the day, ascending)
    pub weekend_pickup_times: Vec<f64>,

    /// Opening hours Monday to Friday
    pub weekday_opening_hours: OpeningHours,

    /// Opening hours Saturday and Sunday
    pub weekend_opening_hours: OpeningHours,

    /// Number of concurrent courier processes
    pub pickup_instances: usize,

    /// Time anchor for the closing-time adjustment
    pub adjustment_anchor: AdjustmentAnchor,

    /// Sampling mode for random durations
    pub sampling: SamplingMode,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Directory for exported results
    pub output_directory: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for run parameters
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// A duration is negative, NaN or infinite
    #[error("Invalid duration for {field}: {value} (must be a finite number >= 0)")]
    InvalidDuration {
        /// Name of the offending field
        field: String,
        /// The rejected value
        value: f64,
    },

    /// Inter-arrival time is not strictly positive
    #[error("Inter-arrival time must be greater than 0, got {0}")]
    InvalidInterarrivalTime(f64),

    /// A staff group has nobody working
    #[error("Staff count for {field} must be at least 1, got {value}")]
    InvalidStaffCount {
        /// Name of the staff group field
        field: String,
        /// The rejected count
        value: usize,
    },

    /// No courier process would run
    #[error("Pickup instances must be at least 1, got {0}")]
    InvalidPickupInstances(usize),

    /// Pickup times are out of range or not strictly ascending
    #[error("Invalid pickup times for {field}: {reason}")]
    InvalidPickupTimes {
        /// Name of the pickup list field
        field: String,
        /// What is wrong with the list
        reason: String,
    },

    /// Opening interval is empty or outside the day
    #[error("Invalid opening hours for {field}: [{open}, {close}] (need 0 <= open < close < 24)")]
    InvalidOpeningHours {
        /// Name of the opening hours field
        field: String,
        /// Opening time
        open: f64,
        /// Closing time
        close: f64,
    },
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            average_step_duration: 15.0 / 60.0,
            interarrival_time: 5.0 / 60.0,
            num_pharmacists: 3,
            num_labellers: 3,
            num_dispensers: 3,
            num_final_checkers: 3,
            average_transport_duration: 1.0,
            transport_duration_std_dev: 12.0 / 60.0,
            weekday_pickup_times: vec![10.0, 12.0, 15.0, 17.0],
            weekend_pickup_times: vec![12.0],
            weekday_opening_hours: OpeningHours::WEEKDAY_DEFAULT,
            weekend_opening_hours: OpeningHours::WEEKEND_DEFAULT,
            pickup_instances: model::DEFAULT_PICKUP_INSTANCES,
            adjustment_anchor: AdjustmentAnchor::Arrival,
            sampling: SamplingMode::Stochastic,
            seed: None,
            output_directory: None,
        }
    }
}

impl RunParameters {
    /// Create a new configuration from command line arguments and optional config file
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::from_cli_args(args)
    }

    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            average_step_duration: config_file
                .average_step_duration
                .unwrap_or(defaults.average_step_duration),
            interarrival_time: config_file.interarrival_time.unwrap_or(defaults.interarrival_time),
            num_pharmacists: config_file.num_pharmacists.unwrap_or(defaults.num_pharmacists),
            num_labellers: config_file.num_labellers.unwrap_or(defaults.num_labellers),
            num_dispensers: config_file.num_dispensers.unwrap_or(defaults.num_dispensers),
            num_final_checkers: config_file
                .num_final_checkers
                .unwrap_or(defaults.num_final_checkers),
            average_transport_duration: config_file
                .average_transport_duration
                .unwrap_or(defaults.average_transport_duration),
            transport_duration_std_dev: config_file
                .transport_duration_std_dev
                .unwrap_or(defaults.transport_duration_std_dev),
            weekday_pickup_times: config_file
                .weekday_pickup_times
                .unwrap_or(defaults.weekday_pickup_times),
            weekend_pickup_times: config_file
                .weekend_pickup_times
                .unwrap_or(defaults.weekend_pickup_times),
            weekday_opening_hours: config_file
                .weekday_opening_hours
                .unwrap_or(defaults.weekday_opening_hours),
            weekend_opening_hours: config_file
                .weekend_opening_hours
                .unwrap_or(defaults.weekend_opening_hours),
            pickup_instances: config_file.pickup_instances.unwrap_or(defaults.pickup_instances),
            adjustment_anchor: config_file.adjustment_anchor.unwrap_or(defaults.adjustment_anchor),
            sampling: config_file.sampling.unwrap_or(defaults.sampling),
            seed: config_file.seed.or(defaults.seed),
            output_directory: config_file.output_directory.or(defaults.output_directory),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.average_step_duration {
            config.average_step_duration = value;
        }
        if let Some(value) = args.interarrival_time {
            config.interarrival_time = value;
        }
        if let Some(value) = args.num_pharmacists {
            config.num_pharmacists = value;
        }
        if let Some(value) = args.num_labellers {
            config.num_labellers = value;
        }
        if let Some(value) = args.num_dispensers {
            config.num_dispensers = value;
        }
        if let Some(value) = args.num_final_checkers {
            config.num_final_checkers = value;
        }
        if let Some(value) = args.average_transport_duration {
            config.average_transport_duration = value;
        }
        if let Some(value) = args.transport_duration_std_dev {
            config.transport_duration_std_dev = value;
        }
        if let Some(value) = args.weekday_pickup_times {
            config.weekday_pickup_times = value;
        }
        if let Some(value) = args.weekend_pickup_times {
            config.weekend_pickup_times = value;
        }
        if let Some([open, close]) = args.weekday_opening_hours.as_deref() {
            config.weekday_opening_hours = OpeningHours::new(*open, *close);
        }
        if let Some([open, close]) = args.weekend_opening_hours.as_deref() {
            config.weekend_opening_hours = OpeningHours::new(*open, *close);
        }
        if let Some(value) = args.pickup_instances {
            config.pickup_instances = value;
        }
        if let Some(value) = args.adjustment_anchor {
            config.adjustment_anchor = value;
        }
        if let Some(value) = args.sampling {
            config.sampling = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if let Some(value) = args.output_directory {
            config.output_directory = Some(value);
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the run parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.validate_duration("average_step_duration", self.average_step_duration)?;
        self.validate_duration("average_transport_duration", self.average_transport_duration)?;
        self.validate_duration("transport_duration_std_dev", self.transport_duration_std_dev)?;

        // Infinity is allowed: it switches arrivals off after the first of each shift
        if self.interarrival_time.is_nan() || self.interarrival_time <= 0.0 {
            return Err(ConfigValidationError::InvalidInterarrivalTime(self.interarrival_time));
        }

        self.validate_staff("num_pharmacists", self.num_pharmacists)?;
        self.validate_staff("num_labellers", self.num_labellers)?;
        self.validate_staff("num_dispensers", self.num_dispensers)?;
        self.validate_staff("num_final_checkers", self.num_final_checkers)?;

        if self.pickup_instances == 0 {
            return Err(ConfigValidationError::InvalidPickupInstances(self.pickup_instances));
        }

        self.validate_opening_hours("weekday_opening_hours", &self.weekday_opening_hours)?;
        self.validate_opening_hours("weekend_opening_hours", &self.weekend_opening_hours)?;

        self.validate_pickup_times("weekday_pickup_times", &self.weekday_pickup_times)?;
        self.validate_pickup_times("weekend_pickup_times", &self.weekend_pickup_times)?;

        Ok(())
    }

    fn validate_duration(&self, field: &str, value: f64) -> Result<(), ConfigValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigValidationError::InvalidDuration {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    fn validate_staff(&self, field: &str, value: usize) -> Result<(), ConfigValidationError> {
        if value == 0 {
            return Err(ConfigValidationError::InvalidStaffCount {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    fn validate_opening_hours(
        &self,
        field: &str,
        hours: &OpeningHours,
    ) -> Result<(), ConfigValidationError> {
        let valid = hours.open.is_finite()
            && hours.close.is_finite()
            && hours.open >= 0.0
            && hours.open < hours.close
            && hours.close < 24.0;
        if !valid {
            return Err(ConfigValidationError::InvalidOpeningHours {
                field: field.to_string(),
                open: hours.open,
                close: hours.close,
            });
        }
        Ok(())
    }

    fn validate_pickup_times(&self, field: &str, times: &[f64]) -> Result<(), ConfigValidationError> {
        if let Some(bad) = times.iter().find(|t| !(0.0..24.0).contains(*t)) {
            return Err(ConfigValidationError::InvalidPickupTimes {
                field: field.to_string(),
                reason: format!("{} is outside [0, 24)", bad),
            });
        }
        if times.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigValidationError::InvalidPickupTimes {
                field: field.to_string(),
                reason: "times must be strictly ascending".to_string(),
            });
        }
        Ok(())
    }

    /// Staffing of each stage in pipeline order
    pub fn staffing(&self) -> [usize; 4] {
        [
            self.num_pharmacists,
            self.num_labellers,
            self.num_dispensers,
            self.num_final_checkers,
        ]
    }

    /// Total number of staff across all four stages
    pub fn total_staff(&self) -> usize {
        self.staffing().iter().sum()
    }
}
