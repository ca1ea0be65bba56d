#![warn(clippy::unwrap_used)]

use iapdf_fixture::{error::GenerationError, fixture};

/// Generates the fixture in the working directory and returns the number of pages written.
fn run() -> Result<usize, GenerationError> {
    let document = fixture::generate(fixture::FIXTURE_PATH)?;
    if log::log_enabled!(log::Level::Debug) {
        match serde_json::to_string_pretty(&document) {
            Ok(document_json) => log::debug!("Generated document: {}", document_json),
            Err(error) => log::warn!("Unable to serialize the generated document: {}", error),
        }
    }

    Ok(document.page_count())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(page_count) => {
            log::info!("Wrote {} pages to {}", page_count, fixture::FIXTURE_PATH);
            println!("✅ Test PDF created successfully");
        }
        Err(error) => {
            log::error!("{:?}", error);
            println!("❌ {}", error);
            if let Some(hint) = error.hint() {
                println!("💡 Try: {}", hint);
            }
        }
    }
}
