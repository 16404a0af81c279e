//! Logger factory usage
//!
//! Writes `logger_factory_demo.log` and `logger_factory_demo.error.log` in the
//! current directory and echoes every record to the console.

use logger_factory::prelude::*;
use logger_factory::info;

fn main() -> logger_factory::Result<()> {
    let factory = LoggerFactory::new("logger_factory_demo")?;
    let logger = factory.get_logger("factory_usage", LogLevel::Debug)?;

    logger.debug("This is a debug message.");
    logger.info("Hello world!");
    logger.warning("This is a warning message.");
    logger.error("This is an error message.");
    logger.critical("This is a critical message.");

    // Asking again returns the same logger without new sinks
    let again = factory.get_logger("factory_usage", LogLevel::Info)?;
    info!(again, "Still {} sinks after a second get_logger", again.sink_count());

    if let Err(e) = "forty-two".parse::<i32>() {
        logger.exception("An exception occurred", &e);
    }

    logger.flush()?;
    println!(
        "\nWrote {} and {}",
        factory.log_file_path().display(),
        factory.error_log_file_path().display()
    );
    Ok(())
}
