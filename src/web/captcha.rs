//! reCAPTCHA siteverify client.

use serde::Deserialize;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Provider verdict for one CAPTCHA answer.
#[derive(Debug, Deserialize)]
pub struct CaptchaOutcome {
    pub success: bool,

    /// Hostname of the site where the challenge was solved.
    pub hostname: Option<String>,

    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
}

/// Ask the provider whether `answer` solves a CAPTCHA for our site.
pub async fn verify(
    http: &reqwest::Client,
    secret: &str,
    answer: &str,
) -> anyhow::Result<CaptchaOutcome> {
    let response = http
        .post(SITEVERIFY_URL)
        .form(&[("secret", secret), ("response", answer)])
        .send()
        .await?;
    if !response.status().is_success() {
        anyhow::bail!("siteverify returned HTTP {}", response.status());
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_response() {
        let outcome: CaptchaOutcome =
            serde_json::from_str(r#"{"success": true, "hostname": "example.com"}"#).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.hostname.as_deref(), Some("example.com"));
        assert!(outcome.error_codes.is_empty());
    }

    #[test]
    fn parses_failure_response() {
        let outcome: CaptchaOutcome =
            serde_json::from_str(r#"{"success": false, "error-codes": ["invalid-input-secret"]}"#)
                .unwrap();
        assert!(!outcome.success);
        assert!(outcome.hostname.is_none());
        assert_eq!(outcome.error_codes, vec!["invalid-input-secret"]);
    }
}
