//! Request policy -> transport settings (timeouts and redirects).

use reqwest::redirect::Policy;
use reqwest::ClientBuilder;

use crate::config::RequestPolicy;

/// Builds the redirect policy: none, or up to `max_redirects` hops with an
/// optional guard against revisiting a URL.
pub fn redirect_policy(policy: &RequestPolicy) -> Policy {
    if !policy.redirects_enabled {
        return Policy::none();
    }

    let max_redirects = policy.max_redirects;
    let circular_allowed = policy.circular_redirects_allowed;
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            let error = format!("too many redirects (limit {max_redirects})");
            attempt.error(error)
        } else if !circular_allowed && attempt.previous().contains(attempt.url()) {
            let error = format!("circular redirect to {}", attempt.url());
            attempt.error(error)
        } else {
            attempt.follow()
        }
    })
}

/// Applies timeouts and the redirect policy.
pub(crate) fn apply_request_policy(builder: ClientBuilder, policy: &RequestPolicy) -> ClientBuilder {
    builder
        .connect_timeout(policy.connect_timeout)
        .read_timeout(policy.socket_timeout)
        .redirect(redirect_policy(policy))
}
