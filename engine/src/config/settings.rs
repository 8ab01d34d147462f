// Report settings, loaded from a JSON file or taken from the defaults below.
// The defaults are the column labels of the shipment sheet the tool was built for.
use serde::Deserialize;
use std::path::Path;

use crate::error::EngineError;

/// Names of the sheet columns the pipeline reads.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FieldMap {
    /// Column holding the shipment date; parsed for the window filter and rewritten in
    /// the display views.
    pub date: String,
    /// Column whose raw text decides the display format of `date`.
    pub date_hint: String,
    pub client: String,
    pub price: String,
    pub tracking: String,
    pub destination: String,
    pub weight: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        FieldMap {
            date: "日期".to_string(),
            date_hint: "DATE".to_string(),
            client: "CLIENT".to_string(),
            price: "PRIX".to_string(),
            tracking: "NUMÉRO DE SUIVI".to_string(),
            destination: "DESTINATION".to_string(),
            weight: "VOLUME POIDS".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReportSettings {
    pub fields: FieldMap,
    /// Appended to the weight in the text summary.
    pub weight_unit: String,
    pub csv_delimiter: char,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            fields: FieldMap::default(),
            weight_unit: "kg".to_string(),
            csv_delimiter: ',',
        }
    }
}

impl ReportSettings {
    /// Reads settings from a JSON file. Missing keys keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        let settings: ReportSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        tracing::info!(path = %path.display(), "Loaded report settings");
        Ok(settings)
    }

    /// The CSV reader takes a single byte delimiter.
    pub fn csv_delimiter_byte(&self) -> Result<u8, EngineError> {
        u8::try_from(self.csv_delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                EngineError::ConfigError(format!(
                    "CSV delimiter '{}' must be a single ASCII character",
                    self.csv_delimiter
                ))
            })
    }

    fn validate(&self) -> Result<(), EngineError> {
        self.csv_delimiter_byte()?;
        let fields = &self.fields;
        let labels = [
            ("date", &fields.date),
            ("date_hint", &fields.date_hint),
            ("client", &fields.client),
            ("price", &fields.price),
            ("tracking", &fields.tracking),
            ("destination", &fields.destination),
            ("weight", &fields.weight),
        ];
        match labels.iter().find(|(_, label)| label.trim().is_empty()) {
            Some((name, _)) => Err(EngineError::ConfigError(format!("Field label '{}' is empty", name))),
            None => Ok(()),
        }
    }
}
