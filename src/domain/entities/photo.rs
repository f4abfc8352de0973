use serde::{Deserialize, Serialize};

/// Verdict returned by the external photo-quality collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoVerdict {
    pub is_valid: bool,
    pub feedback: String,
}

/// Whether a client should enable OTP submission.
///
/// Advisory only: completion is gated on the OTP itself.
pub fn otp_submission_ready(verdict: Option<&PhotoVerdict>, otp_input: &str) -> bool {
    let well_formed = otp_input.len() == 4 && otp_input.bytes().all(|b| b.is_ascii_digit());
    verdict.map(|v| v.is_valid).unwrap_or(false) && well_formed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(is_valid: bool) -> PhotoVerdict {
        PhotoVerdict {
            is_valid,
            feedback: "Tyre repair looks clean".to_string(),
        }
    }

    #[test]
    fn test_ready_with_valid_photo_and_four_digits() {
        assert!(otp_submission_ready(Some(&verdict(true)), "4821"));
    }

    #[test]
    fn test_not_ready_without_verdict() {
        assert!(!otp_submission_ready(None, "4821"));
    }

    #[test]
    fn test_not_ready_with_rejected_photo() {
        assert!(!otp_submission_ready(Some(&verdict(false)), "4821"));
    }

    #[test]
    fn test_not_ready_with_malformed_input() {
        let ok = verdict(true);
        assert!(!otp_submission_ready(Some(&ok), "482"));
        assert!(!otp_submission_ready(Some(&ok), "48215"));
        assert!(!otp_submission_ready(Some(&ok), "48a1"));
        assert!(!otp_submission_ready(Some(&ok), ""));
    }
}
