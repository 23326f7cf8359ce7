//! Telegram line decoding
//!
//! Transmission type is sSN LMDscandata, CoLa A, hex-encoded. Each raw line
//! carries an optional wall-clock prefix followed by a `<`-delimited payload:
//! hex -> ASCII -> whitespace-separated fields -> base-16 data points.

use contracts::{Measurement, TelegramConfig};

use crate::error::{IngestionError, Result};

/// Stateless telegram line parser
#[derive(Debug, Clone)]
pub struct TelegramParser {
    config: TelegramConfig,
}

impl TelegramParser {
    /// Create a parser for the given telegram grammar
    pub fn new(config: TelegramConfig) -> Self {
        Self { config }
    }

    /// Grammar in use
    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Decode one raw log line into a measurement row
    ///
    /// # Errors
    /// Any deviation from the grammar fails the line; callers log and skip.
    pub fn parse_line(&self, line: &str) -> Result<Measurement> {
        let payload = Self::extract_payload(line)?;
        let ascii = Self::decode_hex_ascii(&payload)?;
        self.decode_fields(&ascii)
    }

    /// Isolate the hex payload: everything from the first '<' with the
    /// delimiters stripped
    fn extract_payload(line: &str) -> Result<String> {
        let start = line.find('<').ok_or(IngestionError::MissingPayload)?;
        let payload: String = line[start..]
            .chars()
            .filter(|c| *c != '<' && *c != '>' && !c.is_whitespace())
            .collect();
        Ok(payload)
    }

    /// Hex-decode the payload and require ASCII text
    fn decode_hex_ascii(payload: &str) -> Result<String> {
        if !payload.is_ascii() {
            return Err(IngestionError::NonAsciiPayload);
        }
        if payload.len() % 2 != 0 {
            return Err(IngestionError::OddHexLength(payload.len()));
        }

        let mut bytes = Vec::with_capacity(payload.len() / 2);
        for i in (0..payload.len()).step_by(2) {
            let pair = &payload[i..i + 2];
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|_| IngestionError::InvalidHexByte(pair.to_string()))?;
            bytes.push(byte);
        }

        if !bytes.is_ascii() {
            return Err(IngestionError::NonAsciiPayload);
        }

        String::from_utf8(bytes).map_err(|_| IngestionError::NonAsciiPayload)
    }

    /// Split the decoded telegram into fields and extract the data points
    fn decode_fields(&self, ascii: &str) -> Result<Measurement> {
        let fields: Vec<&str> = ascii.split_whitespace().collect();

        if fields.len() != self.config.expected_fields {
            return Err(IngestionError::FieldCount {
                expected: self.config.expected_fields,
                actual: fields.len(),
            });
        }

        // The last header field declares the data point count, in hex
        let count_field = fields[self.config.header_fields - 1];
        let declared = usize::from_str_radix(count_field, 16).map_err(|_| {
            IngestionError::InvalidPoint {
                index: self.config.header_fields - 1,
                text: count_field.to_string(),
            }
        })?;

        let actual = fields.len() - self.config.header_fields - self.config.trailer_fields;
        if declared != actual {
            return Err(IngestionError::PointCount { declared, actual });
        }

        let data_fields = &fields[self.config.header_fields..fields.len() - self.config.trailer_fields];
        let mut values = Vec::with_capacity(data_fields.len());
        for (i, field) in data_fields.iter().enumerate() {
            let value =
                u32::from_str_radix(field, 16).map_err(|_| IngestionError::InvalidPoint {
                    index: self.config.header_fields + i,
                    text: field.to_string(),
                })?;
            values.push(value);
        }

        Ok(Measurement::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hex-encode an ASCII telegram and wrap it in line delimiters
    fn encode_line(prefix: &str, telegram: &str) -> String {
        let hex: String = telegram.bytes().map(|b| format!("{b:02X}")).collect();
        format!("{prefix}<{hex}>")
    }

    /// A telegram with the given data points under a small test grammar:
    /// 3 header fields (last one the count), data, 2 trailer fields
    fn make_telegram(points: &[u32]) -> String {
        let mut fields = vec!["sSN".to_string(), "LMDscandata".to_string()];
        fields.push(format!("{:X}", points.len()));
        fields.extend(points.iter().map(|p| format!("{p:X}")));
        fields.push("0".to_string());
        fields.push("0".to_string());
        fields.join(" ")
    }

    fn test_config(data_points: usize) -> TelegramConfig {
        TelegramConfig {
            expected_fields: 3 + data_points + 2,
            header_fields: 3,
            trailer_fields: 2,
        }
    }

    #[test]
    fn test_parse_valid_line() {
        let points = [0x10u32, 0x2F, 0xFFFF, 0];
        let line = encode_line("2019-06-12 13:45:01.123 ", &make_telegram(&points));
        let parser = TelegramParser::new(test_config(points.len()));

        let measurement = parser.parse_line(&line).unwrap();
        assert_eq!(measurement.values, vec![0x10, 0x2F, 0xFFFF, 0]);
    }

    #[test]
    fn test_parse_without_prefix() {
        let points = [1u32, 2, 3];
        let line = encode_line("", &make_telegram(&points));
        let parser = TelegramParser::new(test_config(points.len()));
        assert!(parser.parse_line(&line).is_ok());
    }

    #[test]
    fn test_missing_delimiter() {
        let parser = TelegramParser::new(test_config(1));
        let err = parser.parse_line("no payload here").unwrap_err();
        assert!(matches!(err, IngestionError::MissingPayload));
    }

    #[test]
    fn test_odd_hex_length() {
        let parser = TelegramParser::new(test_config(1));
        let err = parser.parse_line("<ABC>").unwrap_err();
        assert!(matches!(err, IngestionError::OddHexLength(3)));
    }

    #[test]
    fn test_invalid_hex_byte() {
        let parser = TelegramParser::new(test_config(1));
        let err = parser.parse_line("<ZZ>").unwrap_err();
        assert!(matches!(err, IngestionError::InvalidHexByte(_)));
    }

    #[test]
    fn test_non_ascii_payload() {
        let parser = TelegramParser::new(test_config(1));
        // 0xFF is not ASCII
        let err = parser.parse_line("<FF>").unwrap_err();
        assert!(matches!(err, IngestionError::NonAsciiPayload));
    }

    #[test]
    fn test_field_count_mismatch() {
        let points = [1u32, 2, 3];
        let line = encode_line("", &make_telegram(&points));
        // Parser expects one more data point than the line carries
        let parser = TelegramParser::new(test_config(points.len() + 1));
        let err = parser.parse_line(&line).unwrap_err();
        assert!(matches!(
            err,
            IngestionError::FieldCount {
                expected: 9,
                actual: 8
            }
        ));
    }

    #[test]
    fn test_point_count_mismatch() {
        // Declared count says 2 but the layout holds 3
        let telegram = "sSN LMDscandata 2 A B C 0 0";
        let line = encode_line("", telegram);
        let parser = TelegramParser::new(test_config(3));
        let err = parser.parse_line(&line).unwrap_err();
        assert!(matches!(
            err,
            IngestionError::PointCount {
                declared: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_invalid_data_point() {
        let telegram = "sSN LMDscandata 2 A XYZ 0 0";
        let line = encode_line("", telegram);
        let parser = TelegramParser::new(test_config(2));
        let err = parser.parse_line(&line).unwrap_err();
        assert!(matches!(err, IngestionError::InvalidPoint { index: 4, .. }));
    }
}
