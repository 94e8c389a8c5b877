use chrono::{DateTime, Local};

// Get current local timestamp as a formatted string
pub fn current_local_timestamp_str(format_str: &str) -> String {
    let now: DateTime<Local> = Local::now();
    now.format(format_str).to_string()
}

/// Filename stem for a frame: the device timestamp with six decimals and the
/// decimal point removed, so `1234.5` becomes `1234500000`.
pub fn frame_timestamp_stem(device_timestamp: f64) -> String {
    format!("{:.6}", device_timestamp).replace('.', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_is_purely_numeric() {
        assert_eq!(frame_timestamp_stem(1234.5), "1234500000");
        assert_eq!(frame_timestamp_stem(1700000000.25), "1700000000250000");
        assert_eq!(frame_timestamp_stem(0.0), "0000000");
    }

    #[test]
    fn stem_rounds_to_six_decimals() {
        assert_eq!(frame_timestamp_stem(1.0000004), "1000000");
        assert_eq!(frame_timestamp_stem(1.0000006), "1000001");
    }
}
