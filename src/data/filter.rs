// ---------------------------------------------------------------------------
// Row and column acceptance rules for the World Bank wide layout
// ---------------------------------------------------------------------------

/// First year column in the value table; columns 0..4 are name, code,
/// indicator name and indicator code.
pub const FIRST_YEAR_COLUMN: usize = 4;

/// Keep a value-table row only if its code has exactly three characters.
///
/// This is a heuristic, not a classifier. It drops malformed or non-ISO codes
/// of other lengths, but World Bank aggregates ("WLD", "EMU", "HIC", ...) also
/// use three-letter codes and pass straight through.
pub fn accepts_country_code(code: &str) -> bool {
    code.chars().count() == 3
}

/// Year of a header cell, if the column is a year column.
pub fn year_column(index: usize, header: &str) -> Option<i32> {
    if index < FIRST_YEAR_COLUMN {
        return None;
    }
    header.trim().parse::<i32>().ok()
}

/// Parse a year cell. Blank or unparseable cells mean "no data".
pub fn parse_value(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REAL_ISO3: &[&str] = &["USA", "LUX", "DEU", "CHN", "BRA", "ZAF", "XKX"];

    /// World Bank aggregate codes as they appear in the value table.
    const AGGREGATES: &[&str] = &["WLD", "EMU", "EUU", "ARB", "HIC", "LMY", "OED", "SSF", "AFE"];

    #[test]
    fn real_codes_are_accepted() {
        for code in REAL_ISO3 {
            assert!(accepts_country_code(code), "{code}");
        }
    }

    #[test]
    fn aggregates_with_three_letter_codes_pass_the_length_rule() {
        for code in AGGREGATES {
            assert!(accepts_country_code(code), "{code}");
        }
    }

    #[test]
    fn codes_of_other_lengths_are_rejected() {
        for code in ["", "XK", "WORLD", "EUU1", "Country Code"] {
            assert!(!accepts_country_code(code), "{code:?}");
        }
    }

    #[test]
    fn year_columns_start_at_index_four() {
        assert_eq!(year_column(3, "1960"), None);
        assert_eq!(year_column(4, "1960"), Some(1960));
        assert_eq!(year_column(10, " 2022 "), Some(2022));
        assert_eq!(year_column(68, ""), None);
        assert_eq!(year_column(5, "Indicator Code"), None);
    }

    #[test]
    fn blank_and_garbage_cells_are_no_data() {
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("  "), None);
        assert_eq!(parse_value(".."), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
        assert_eq!(parse_value("0"), Some(0.0));
        assert_eq!(parse_value("25462700000000"), Some(2.54627e13));
    }
}
