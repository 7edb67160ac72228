use clap::Parser;
use std::path::PathBuf;

/// Scrapes the WordPress.org support forum admin pages and appends the counters to a CSV log.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON configuration file.
    #[clap(long, value_name = "FILE", env = "WPORG_STATS_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Optional site URL to override the configuration file.
    #[clap(long, value_name = "URL")]
    pub site: Option<String>,

    /// Optional schedule (hourly, daily, weekly) to override the configuration file.
    #[clap(long, value_name = "NAME")]
    pub schedule: Option<String>,

    /// Optional CSV output path to override the configuration file.
    #[clap(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Collect a single snapshot and exit instead of running on the schedule.
    #[clap(long, action)]
    pub once: bool,

    /// Also append log output to this file.
    #[clap(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level.
    #[clap(short, long, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(site) = &self.site {
                cache.insert("site".to_string(), site.clone().into());
            }
            if let Some(schedule) = &self.schedule {
                cache.insert("schedule".to_string(), schedule.clone().into());
            }
            if let Some(output) = &self.output {
                cache.insert("output".to_string(), output.display().to_string().into());
            }
            Ok(cache)
        }
    }
}
