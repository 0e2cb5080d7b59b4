//! Telemetry record parsing.
//!
//! The control firmware logs one CSV row per control cycle over its serial
//! link. Banner text, boot messages, and debug prints are interleaved on the
//! same channel, so the parser has to distinguish data rows from everything
//! else without treating the noise as a fault.

use serde::Serialize;

/// The CSV header emitted by the control logger.
///
/// Field order is a stable contract with the firmware; `Kp`/`Ki` are carried
/// but never interpreted here.
pub const HEADER: &str = "ms,setF,T_out_raw,T_out_filt,ratio,u,Kp,Ki,flow_lpm,link_ok";

/// Minimum number of comma-separated fields in a valid data row.
pub const MIN_FIELDS: usize = 10;

/// One parsed telemetry observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Milliseconds since the controller booted. Non-decreasing in a session.
    pub timestamp_ms: u64,
    /// Commanded outlet temperature (°F).
    pub setpoint: f64,
    /// Raw outlet thermistor reading (°F).
    pub outlet_raw: f64,
    /// Filtered outlet temperature (°F).
    pub outlet_filtered: f64,
    /// Mix valve position, 0..1.
    pub ratio: f64,
    /// PI controller output.
    pub control_output: f64,
    /// Measured flow (L/min).
    pub flow_lpm: f64,
    /// Whether the ESP-NOW link to the UI unit was up for this cycle.
    pub link_ok: bool,
    /// Proportional gain, if the firmware logged it.
    pub kp: Option<f64>,
    /// Integral gain, if the firmware logged it.
    pub ki: Option<f64>,
}

/// Why a raw line was not turned into a [`Sample`].
///
/// Every variant is expected, non-fatal input: rejections are counted and
/// dropped, never surfaced as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRejection {
    /// Empty or whitespace-only line.
    EmptyLine,
    /// The CSV header row the firmware re-emits on reconnect.
    HeaderLine,
    /// First field is not all digits - banner or log text, not telemetry.
    NotDataLine,
    /// A data-framed line with fewer than [`MIN_FIELDS`] fields.
    TooFewFields,
    /// A required field failed to parse; carries the field index.
    FieldParse { index: usize },
}

impl RecordRejection {
    /// Short label for counters and the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            RecordRejection::EmptyLine => "empty",
            RecordRejection::HeaderLine => "header",
            RecordRejection::NotDataLine => "not-data",
            RecordRejection::TooFewFields => "short",
            RecordRejection::FieldParse { .. } => "bad-field",
        }
    }
}

/// Parse one raw line into a [`Sample`].
///
/// Deterministic and side-effect free. Malformed input is an expected case
/// and comes back as a [`RecordRejection`], never a panic.
pub fn parse_record(line: &str) -> Result<Sample, RecordRejection> {
    let line = line.trim();
    if line.is_empty() {
        return Err(RecordRejection::EmptyLine);
    }
    if line.starts_with(HEADER) {
        return Err(RecordRejection::HeaderLine);
    }

    // Lenient framing check inherited from the logger protocol: a row is
    // telemetry iff its first field is all digits. Anything else on the
    // channel is boot chatter.
    let first = line.split(',').next().unwrap_or("");
    if first.is_empty() || !first.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecordRejection::NotDataLine);
    }

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return Err(RecordRejection::TooFewFields);
    }

    let timestamp_ms = parse_field::<u64>(&fields, 0)?;
    let setpoint = parse_field::<f64>(&fields, 1)?;
    let outlet_raw = parse_field::<f64>(&fields, 2)?;
    let outlet_filtered = parse_field::<f64>(&fields, 3)?;
    let ratio = parse_field::<f64>(&fields, 4)?;
    let control_output = parse_field::<f64>(&fields, 5)?;
    // Gains are opaque passengers: keep them when they parse, drop otherwise.
    let kp = fields.get(6).and_then(|s| s.trim().parse().ok());
    let ki = fields.get(7).and_then(|s| s.trim().parse().ok());
    let flow_lpm = parse_field::<f64>(&fields, 8)?;
    let link_ok = parse_field::<i64>(&fields, 9)? != 0;

    Ok(Sample {
        timestamp_ms,
        setpoint,
        outlet_raw,
        outlet_filtered,
        ratio,
        control_output,
        flow_lpm,
        link_ok,
        kp,
        ki,
    })
}

fn parse_field<T: std::str::FromStr>(
    fields: &[&str],
    index: usize,
) -> Result<T, RecordRejection> {
    fields
        .get(index)
        .and_then(|s| s.trim().parse().ok())
        .ok_or(RecordRejection::FieldParse { index })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_LINE: &str = "1500,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,1";

    #[test]
    fn test_parse_valid_line() {
        let sample = parse_record(GOOD_LINE).unwrap();
        assert_eq!(sample.timestamp_ms, 1500);
        assert_eq!(sample.setpoint, 105.0);
        assert_eq!(sample.outlet_raw, 103.2);
        assert_eq!(sample.outlet_filtered, 103.5);
        assert_eq!(sample.ratio, 0.42);
        assert_eq!(sample.control_output, 0.40);
        assert_eq!(sample.flow_lpm, 6.3);
        assert!(sample.link_ok);
        assert_eq!(sample.kp, Some(2.0));
        assert_eq!(sample.ki, Some(0.1));
    }

    #[test]
    fn test_parse_link_down() {
        let sample = parse_record("1600,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,0").unwrap();
        assert!(!sample.link_ok);
    }

    #[test]
    fn test_empty_line_rejected() {
        assert_eq!(parse_record(""), Err(RecordRejection::EmptyLine));
        assert_eq!(parse_record("   \t"), Err(RecordRejection::EmptyLine));
    }

    #[test]
    fn test_header_line_rejected() {
        assert_eq!(parse_record(HEADER), Err(RecordRejection::HeaderLine));
    }

    #[test]
    fn test_banner_text_rejected() {
        // Headerless garbage with a non-numeric first field
        assert_eq!(parse_record("abc,1,2"), Err(RecordRejection::NotDataLine));
        assert_eq!(
            parse_record("[boot] ESP32 control node up"),
            Err(RecordRejection::NotDataLine)
        );
    }

    #[test]
    fn test_negative_timestamp_is_not_data() {
        // A leading minus sign fails the all-digits framing check
        assert_eq!(
            parse_record("-100,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,1"),
            Err(RecordRejection::NotDataLine)
        );
    }

    #[test]
    fn test_too_few_fields_rejected() {
        assert_eq!(
            parse_record("1500,105.0,103.2"),
            Err(RecordRejection::TooFewFields)
        );
    }

    #[test]
    fn test_bad_field_carries_index() {
        assert_eq!(
            parse_record("1500,105.0,oops,103.5,0.42,0.40,2.0,0.1,6.3,1"),
            Err(RecordRejection::FieldParse { index: 2 })
        );
        assert_eq!(
            parse_record("1500,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,up"),
            Err(RecordRejection::FieldParse { index: 9 })
        );
    }

    #[test]
    fn test_missing_gains_tolerated() {
        // Gains that fail to parse become None; the row is still accepted
        let sample = parse_record("1500,105.0,103.2,103.5,0.42,0.40,-,-,6.3,1").unwrap();
        assert_eq!(sample.kp, None);
        assert_eq!(sample.ki, None);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(parse_record(GOOD_LINE), parse_record(GOOD_LINE));
    }
}
