use std::path::Path;

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

pub const LOG_CONFIG_FILE: &str = "./log-config.yml";

/// Initialise log4rs from `./log-config.yml`, or a plain console logger when the file is absent.
pub fn init() -> Result<(), String> {
    if Path::new(LOG_CONFIG_FILE).exists() {
        return log4rs::init_file(LOG_CONFIG_FILE, Default::default()).map_err(|e| e.to_string());
    }

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .map_err(|e| e.to_string())?;
    log4rs::init_config(config)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
