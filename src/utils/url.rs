//! URL helpers for building Workers AI endpoints.

/// Strip trailing slashes so endpoint paths can be appended safely.
///
/// ```
/// use chatbox::utils::url::normalize_base_url;
///
/// assert_eq!(
///     normalize_base_url("https://api.cloudflare.com/client/v4//"),
///     "https://api.cloudflare.com/client/v4"
/// );
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Endpoint for running `model` on behalf of `account_id`. Model identifiers
/// keep their `@cf/...` slashes; they are part of the path.
pub fn run_model_url(base_url: &str, account_id: &str, model: &str) -> String {
    construct_api_url(
        base_url,
        &format!(
            "accounts/{}/ai/run/{}",
            account_id.trim(),
            model.trim_start_matches('/')
        ),
    )
}
