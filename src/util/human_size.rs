//! Human readable byte counts for progress output.

const UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];

/// Formats a byte count with binary (1024-based) prefixes and one decimal.
///
/// The value is divided by 1024 while it is at least 1024 and a larger unit
/// is available, so anything from a petabyte up is still reported in `TB`.
pub(crate) fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = UNITS[0];

    for &next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }

    format!("{value:.1} {unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes() {
        assert_eq!(format_size(0), "0.0 bytes");
    }

    #[test]
    fn below_one_kilobyte_stays_in_bytes() {
        assert_eq!(format_size(10), "10.0 bytes");
        assert_eq!(format_size(1023), "1023.0 bytes");
    }

    #[test]
    fn exact_unit_boundaries() {
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1_073_741_824), "1.0 GB");
        assert_eq!(format_size(1024u64.pow(4)), "1.0 TB");
    }

    #[test]
    fn fractional_values_round_to_one_decimal() {
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024 * 3 / 2), "1.5 MB");
        assert_eq!(format_size(900 * 1024), "900.0 KB");
    }

    #[test]
    fn terabytes_is_the_largest_unit() {
        assert_eq!(format_size(1024u64.pow(5)), "1024.0 TB");
    }
}
