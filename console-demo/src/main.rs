mod session;

use std::env;
use std::error::Error;
use std::fs::File;

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use session::Session;

fn init_logging() -> Result<(), Box<dyn Error>> {
    let level = match env::var("CONSOLE_DEMO_LOG") {
        Ok(level) => level.parse::<LevelFilter>()?,
        Err(_) => LevelFilter::Info,
    };

    match env::var("CONSOLE_DEMO_LOG_FILE") {
        Ok(path) => {
            let log_file = File::create(path)?;
            WriteLogger::init(level, Config::default(), log_file)?;
        }
        Err(_) => {
            TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;
    Session::new()?.run()
}
