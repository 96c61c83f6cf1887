//! WebSocket close-code normalization

/// Normal closure
pub const NORMAL: u16 = 1000;

/// Endpoint going away (server shutdown, page navigation)
pub const GOING_AWAY: u16 = 1001;

/// A close frame arrived without a status code
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// The connection dropped without a close frame
pub const ABNORMAL: u16 = 1006;

/// Codes that must never appear in a close frame on the wire
pub const RESERVED: [u16; 4] = [1004, NO_STATUS_RECEIVED, ABNORMAL, 1015];

/// Map a close code to one that is legal to send.
///
/// Reserved codes and anything outside `1000..=4999` become [`NORMAL`];
/// every other code passes through unchanged.
pub fn safe_close_code(code: u16) -> u16 {
    if RESERVED.contains(&code) || !(1000..=4999).contains(&code) {
        NORMAL
    } else {
        code
    }
}

/// Whether a closure is an ordinary end of session rather than a failure.
pub fn is_expected_closure(code: u16) -> bool {
    code == NORMAL || code == GOING_AWAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_codes_become_normal() {
        for code in RESERVED {
            assert_eq!(safe_close_code(code), NORMAL, "code {code}");
        }
    }

    #[test]
    fn test_out_of_range_codes_become_normal() {
        for code in [0, 1, 999, 5000, u16::MAX] {
            assert_eq!(safe_close_code(code), NORMAL, "code {code}");
        }
    }

    #[test]
    fn test_valid_codes_pass_through() {
        for code in [1000, 1001, 1002, 1003, 1007, 1008, 1011, 3000, 4000, 4999] {
            assert_eq!(safe_close_code(code), code);
        }
    }

    #[test]
    fn test_expected_closures() {
        assert!(is_expected_closure(NORMAL));
        assert!(is_expected_closure(GOING_AWAY));
        assert!(!is_expected_closure(ABNORMAL));
        assert!(!is_expected_closure(4000));
    }
}
