//! Report value rendering.
//!
//! Info maps are string tables read by operators and downstream tooling,
//! so every value type has exactly one rendering.
use crate::frame::{FixQuality, TalkerId};

/// Significant digits of a rendered double
const PRECISION: i32 = 6;

/// Implement this trait to store a value in a report info map.
pub trait ReportValue {
    /// Renders self, an empty string standing for "unset".
    fn to_report_string(&self) -> String;
}

impl<T: ReportValue> ReportValue for Option<T> {
    fn to_report_string(&self) -> String {
        match self {
            Some(value) => value.to_report_string(),
            None => String::new(),
        }
    }
}

impl ReportValue for f64 {
    fn to_report_string(&self) -> String {
        format_double(*self)
    }
}

impl ReportValue for u16 {
    fn to_report_string(&self) -> String {
        self.to_string()
    }
}

impl ReportValue for u32 {
    fn to_report_string(&self) -> String {
        self.to_string()
    }
}

impl ReportValue for &str {
    fn to_report_string(&self) -> String {
        self.to_string()
    }
}

impl ReportValue for String {
    fn to_report_string(&self) -> String {
        self.clone()
    }
}

impl ReportValue for FixQuality {
    fn to_report_string(&self) -> String {
        format!("{} ({})", self.name(), self.indicator())
    }
}

impl ReportValue for TalkerId {
    fn to_report_string(&self) -> String {
        self.constellation().to_string()
    }
}

/// Renders a double the way a default `ostream` does: 6 significant
/// digits, trailing zeros dropped, scientific notation for exponents
/// below -4 or above 5.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // exponent is taken after rounding, 999999.5 is 1e+06
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent = exponent.parse::<i32>().unwrap_or_default();

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
