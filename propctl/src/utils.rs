//! Common utilities and helper functions.

/// Replaces `${env:VAR_NAME}` placeholders with environment variable values.
///
/// Unset variables expand to an empty string. Anything that is not a
/// complete `${env:...}` placeholder is kept verbatim.
///
/// # Example
///
/// ```rust
/// use propctl::utils::replace_env_placeholders;
///
/// unsafe { std::env::set_var("PROPCTL_DOC_TOKEN", "s3cr3t"); }
/// let token = replace_env_placeholders("${env:PROPCTL_DOC_TOKEN}");
/// assert_eq!(token, "s3cr3t");
/// ```
pub fn replace_env_placeholders(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // unterminated: keep the remainder as-is
            result.push_str(&rest[start..]);
            return result;
        };
        let placeholder = &after[..end];
        match placeholder.strip_prefix("env:") {
            Some(name) => {
                let value = std::env::var(name).unwrap_or_default();
                debug!("expanded ${{env:{name}}}");
                result.push_str(&value);
            }
            None => {
                result.push_str("${");
                result.push_str(placeholder);
                result.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_replace_env_placeholders() {
        unsafe {
            env::set_var("PROPCTL_TEST_HOST", "example.org");
            env::set_var("PROPCTL_TEST_PORT", "8000");
        }

        assert_eq!(
            replace_env_placeholders("${env:PROPCTL_TEST_HOST}"),
            "example.org"
        );
        assert_eq!(
            replace_env_placeholders("http://${env:PROPCTL_TEST_HOST}:${env:PROPCTL_TEST_PORT}/"),
            "http://example.org:8000/"
        );
        assert_eq!(replace_env_placeholders("${env:PROPCTL_NOT_SET}"), "");
        assert_eq!(replace_env_placeholders("plain"), "plain");
        assert_eq!(replace_env_placeholders(""), "");
    }

    #[test]
    fn test_malformed_placeholders() {
        assert_eq!(replace_env_placeholders("${"), "${");
        assert_eq!(replace_env_placeholders("${env:X"), "${env:X");
        assert_eq!(replace_env_placeholders("${other:x}"), "${other:x}");
        assert_eq!(replace_env_placeholders("$env:X}"), "$env:X}");
        unsafe {
            env::set_var("PROPCTL_TEST_VAR", "value");
        }
        assert_eq!(replace_env_placeholders("${env:PROPCTL_TEST_VAR}}"), "value}");
    }
}
