use crate::core::{config::ResilienceConfig, error::Result, severity_label, ErrorClassifier};
use colored::*;

const CLI_SOURCE: &str = "<command line>";

/// Print how a single parse failure with `message` on `source_text` would be handled.
pub fn execute_classify(config: &ResilienceConfig, message: &str, source_text: &str) -> Result<()> {
    let mut classifier = ErrorClassifier::new(config.classifier.clone());
    let error = classifier.record_error(CLI_SOURCE, "error", message, source_text);

    let yes_no = |flag: bool| if flag { "yes".green() } else { "no".bright_black() };

    println!("\n{} {}", "Severity:".white(), severity_label(error.severity));
    println!(
        "{} {}",
        "Reset read position:".white(),
        yes_no(classifier.should_reset_position(CLI_SOURCE, &error))
    );
    println!(
        "{} {}\n",
        "Retry:".white(),
        yes_no(classifier.should_retry(CLI_SOURCE, &error))
    );
    Ok(())
}
