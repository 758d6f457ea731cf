//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for malformed
//! `host:port` addresses, a primary that points back at the listener,
//! and duplicate shadow targets. Returns every [`ValidationError`] found,
//! not just the first.

use std::collections::HashSet;

use super::model::{Config, Target};
use crate::error::ValidationError;

/// Validate a single `host:port` address. Returns `Ok(())` or a human-readable error.
pub fn validate_target(target: &Target) -> Result<(), String> {
    let raw = target.as_str();
    if raw.is_empty() {
        return Err("address cannot be empty".into());
    }
    if raw.contains("://") {
        return Err(format!("'{raw}' must be host:port, not a URL"));
    }
    let Some((host, port)) = target.split() else {
        return Err(format!("'{raw}' is missing a port"));
    };
    if host.chars().any(char::is_whitespace) {
        return Err(format!("host '{host}' contains whitespace"));
    }
    match port.parse::<u16>() {
        Ok(_) => Ok(()),
        Err(_) => Err(format!("'{port}' is not a valid port (expected 0-65535)")),
    }
}

fn suggest_for(target: &Target) -> Option<String> {
    let raw = target.as_str();
    if let Some((_, rest)) = raw.split_once("://") {
        let trimmed = rest.trim_end_matches('/');
        return Some(format!("did you mean '{trimmed}'?"));
    }
    if target.split().is_none() && !raw.is_empty() {
        return Some(format!("did you mean '{raw}:80'?"));
    }
    None
}

/// Lowercased host with the local-machine aliases folded together.
fn canonical_host(host: &str) -> String {
    match host.to_ascii_lowercase().as_str() {
        "" | "localhost" => "127.0.0.1".into(),
        "[::1]" => "::1".into(),
        "[::]" => "::".into(),
        other => other.into(),
    }
}

fn is_wildcard(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::")
}

fn is_loopback(host: &str) -> bool {
    host.starts_with("127.") || host == "::1"
}

/// Whether dialing `target` would reach the listener bound at `listen`.
///
/// A wildcard listener answers on every loopback address, so any local
/// host on the same port counts. Remote hosts that happen to resolve to
/// this machine are not detected.
pub fn points_at_listener(listen: &Target, target: &Target) -> bool {
    let (Some((listen_host, listen_port)), Some((host, port))) = (listen.split(), target.split())
    else {
        return false;
    };
    // Port 0 binds an ephemeral port, which nothing can name in advance.
    if listen_port != port || listen_port == "0" {
        return false;
    }

    // An empty listen host binds every interface.
    let listen_host = if listen_host.is_empty() {
        "0.0.0.0".into()
    } else {
        canonical_host(listen_host)
    };
    let host = canonical_host(host);
    if listen_host == host {
        return true;
    }
    is_wildcard(&listen_host) && (is_loopback(&host) || is_wildcard(&host))
}

fn check(errors: &mut Vec<ValidationError>, field: String, target: &Target) {
    if let Err(message) = validate_target(target) {
        errors.push(ValidationError {
            field,
            message,
            suggestion: suggest_for(target),
        });
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check(&mut errors, "Listen".into(), &config.listen);
    check(&mut errors, "Proxy".into(), &config.proxy);

    if points_at_listener(&config.listen, &config.proxy) {
        errors.push(ValidationError {
            field: "Proxy".into(),
            message: "primary target is the listen address; every request would loop".into(),
            suggestion: None,
        });
    }

    let mut seen = HashSet::new();
    for (i, target) in config.forwards.iter().enumerate() {
        let field = format!("Forwards[{i}]");
        check(&mut errors, field.clone(), target);

        if !seen.insert(target) {
            errors.push(ValidationError {
                field: field.clone(),
                message: format!("duplicate shadow target '{target}'"),
                suggestion: None,
            });
        }

        if points_at_listener(&config.listen, target) {
            errors.push(ValidationError {
                field,
                message: "shadow target is the listen address; every request would loop".into(),
                suggestion: None,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let mut lines = vec![
        format!("  listen:  {}", config.listen),
        format!("  primary: {}", config.proxy),
    ];

    if config.forwards.is_empty() {
        lines.push("  shadows: none".into());
    } else {
        lines.push(format!("  shadows: {}", config.forwards.len()));
        for target in &config.forwards {
            lines.push(format!("    - {target}"));
        }
    }

    let timeout = config
        .timeout
        .map_or_else(|| "none".to_string(), |t| format!("{t}ms"));
    lines.push(format!("  timeout: {timeout}"));

    format!("{} is valid\n{}", path, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> Config {
        Config::new(":8080", "localhost:9000").with_forwards(["localhost:9001"])
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn no_shadows_is_valid() {
        assert!(validate(&Config::new(":8080", "localhost:9000")).is_ok());
    }

    #[test]
    fn missing_port_fails_with_suggestion() {
        let config = Config::new(":8080", "backend");
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "Proxy");
        assert_eq!(
            errors[0].suggestion.as_deref(),
            Some("did you mean 'backend:80'?")
        );
    }

    #[test]
    fn url_instead_of_address_fails() {
        let config = Config::new(":8080", "http://backend:9000/");
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("not a URL")));
        assert!(errors
            .iter()
            .any(|e| e.suggestion.as_deref() == Some("did you mean 'backend:9000'?")));
    }

    #[test]
    fn bad_port_fails() {
        let config = Config::new(":8080", "backend:99999");
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("not a valid port")));
    }

    #[test]
    fn primary_equal_to_listen_fails() {
        let config = Config::new("127.0.0.1:8080", ":8080");
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("loop")));
    }

    #[test]
    fn localhost_primary_on_listen_port_fails() {
        let config = Config::new(":8080", "localhost:8080");
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "Proxy");
    }

    #[test]
    fn wildcard_listener_catches_loopback_targets() {
        let listen = Target::new("0.0.0.0:8080");
        assert!(points_at_listener(&listen, &Target::new("127.0.0.1:8080")));
        assert!(points_at_listener(&listen, &Target::new("LOCALHOST:8080")));
        assert!(points_at_listener(&listen, &Target::new("[::1]:8080")));
        assert!(!points_at_listener(&listen, &Target::new("10.0.0.5:8080")));
        assert!(!points_at_listener(&listen, &Target::new("127.0.0.1:8081")));
    }

    #[test]
    fn specific_listener_only_matches_its_own_host() {
        let listen = Target::new("127.0.0.1:8080");
        assert!(points_at_listener(&listen, &Target::new("localhost:8080")));
        assert!(!points_at_listener(&listen, &Target::new("10.0.0.5:8080")));
        assert!(!points_at_listener(&Target::new("127.0.0.1:0"), &Target::new("localhost:0")));
    }

    #[test]
    fn shadow_on_listen_port_fails() {
        let config = Config::new("0.0.0.0:8080", "backend:9000").with_forwards(["127.0.0.1:8080"]);
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "Forwards[0]");
    }

    #[test]
    fn duplicate_shadows_fail() {
        let config = Config::new(":8080", "a:1").with_forwards(["b:2", "c:3", "b:2"]);
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "Forwards[2]");
    }

    #[test]
    fn every_error_is_reported() {
        let config = Config::new("", "nope").with_forwards(["x:y"]);
        let errors = validate(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }

    #[test]
    fn report_lists_shadows() {
        let report = format_validation_report("config.json", &minimal_config());
        assert!(report.starts_with("config.json is valid"));
        assert!(report.contains("primary: localhost:9000"));
        assert!(report.contains("- localhost:9001"));
        assert!(report.contains("timeout: none"));
    }
}
