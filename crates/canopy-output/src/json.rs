use crate::envelope::QueryEnvelope;
use crate::OutputFormatter;

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, envelope: &QueryEnvelope) -> String {
        serde_json::to_string_pretty(envelope).unwrap_or_default()
    }
}
