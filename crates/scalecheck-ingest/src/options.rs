use serde::{Deserialize, Serialize};

use crate::errors::{IngestError, Result};

/// Options that control how a response file is read and cleaned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    /// Field delimiter; must be a single ASCII character.
    pub delimiter: char,
    /// Lowest valid answer on the response scale.
    pub response_min: i64,
    /// Highest valid answer on the response scale.
    pub response_max: i64,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            response_min: 1,
            response_max: 5,
        }
    }
}

impl CleaningOptions {
    pub(crate) fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(IngestError::InvalidInput(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )))
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if self.response_min > self.response_max {
            return Err(IngestError::InvalidInput(format!(
                "response range is empty: {}..={}",
                self.response_min, self.response_max
            )));
        }
        Ok(())
    }

    /// Whether `value` is one of the discrete answers on the scale.
    pub fn is_valid_response(&self, value: f64) -> bool {
        value.fract() == 0.0
            && value >= self.response_min as f64
            && value <= self.response_max as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_accepts_integral_one_to_five() {
        let options = CleaningOptions::default();

        assert!(options.is_valid_response(1.0));
        assert!(options.is_valid_response(5.0));
        assert!(!options.is_valid_response(0.0));
        assert!(!options.is_valid_response(6.0));
        assert!(!options.is_valid_response(2.5));
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let options = CleaningOptions {
            delimiter: '§',
            ..CleaningOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let options = CleaningOptions {
            response_min: 7,
            response_max: 1,
            ..CleaningOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
