//! String-shape predicates
//!
//! Pattern-backed shapes compile their regex once, on first use. The same
//! pattern sources are exported so that emitted source can declare identical
//! matchers.
//!
//! Letters are Unicode category `L` and digits category `Nd`; other numerals
//! such as `½` or `Ⅷ` are neither.

use std::net::IpAddr;

use lazy_static::lazy_static;
use regex::Regex;

pub const ALPHA_PATTERN: &str = r"^\p{L}*$";

pub const ALPHANUMERIC_PATTERN: &str = r"^[\p{L}\p{Nd}]*$";

pub const NUMERIC_PATTERN: &str = r"^\p{Nd}*$";

pub const HEXADECIMAL_PATTERN: &str = r"^[0-9a-fA-F]+$";

pub const BASE64_PATTERN: &str =
    r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=|[A-Za-z0-9+/]{4})$";

pub const UUID_PATTERN: &str =
    r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

pub const EMAIL_PATTERN: &str = r#"^(?:(?:(?:(?:[a-zA-Z]|\d|[!#$%&'*+\-/=?\^_`{|}~]|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])+(?:\.(?:[a-zA-Z]|\d|[!#$%&'*+\-/=?\^_`{|}~]|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])+)*)|(?:(?:\x22)(?:(?:(?:(?:\x20|\x09)*(?:\x0d\x0a))?(?:\x20|\x09)+)?(?:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x7f]|\x21|[\x23-\x5b]|[\x5d-\x7e]|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])|(?:(?:[\x01-\x09\x0b\x0c\x0d-\x7f]|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}]))))*(?:(?:(?:\x20|\x09)*(?:\x0d\x0a))?(?:\x20|\x09)+)?(?:\x22))))@(?:(?:(?:[a-zA-Z]|\d|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])|(?:(?:[a-zA-Z]|\d|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])(?:[a-zA-Z]|\d|-|\.|~|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])*(?:[a-zA-Z]|\d|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])))\.)+(?:(?:[a-zA-Z]|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])|(?:(?:[a-zA-Z]|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])(?:[a-zA-Z]|\d|-|\.|~|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])*(?:[a-zA-Z]|[\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])))\.?$"#;

lazy_static! {
    static ref ALPHA: Regex = compile(ALPHA_PATTERN);
    static ref ALPHANUMERIC: Regex = compile(ALPHANUMERIC_PATTERN);
    static ref NUMERIC: Regex = compile(NUMERIC_PATTERN);
    static ref HEXADECIMAL: Regex = compile(HEXADECIMAL_PATTERN);
    static ref BASE64: Regex = compile(BASE64_PATTERN);
    static ref UUID: Regex = compile(UUID_PATTERN);
    static ref EMAIL: Regex = compile(EMAIL_PATTERN);
}

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => panic!("built-in pattern failed to compile: {err}"),
    }
}

pub fn is_alpha(s: &str) -> bool {
    ALPHA.is_match(s)
}

pub fn is_alphanumeric(s: &str) -> bool {
    ALPHANUMERIC.is_match(s)
}

pub fn is_numeric(s: &str) -> bool {
    NUMERIC.is_match(s)
}

pub fn is_hexadecimal(s: &str) -> bool {
    HEXADECIMAL.is_match(s)
}

pub fn is_email(s: &str) -> bool {
    EMAIL.is_match(s)
}

/// Absolute URL with a scheme.
pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).map_or(false, |u| !u.scheme().is_empty())
}

pub fn is_base64(s: &str) -> bool {
    BASE64.is_match(s)
}

pub fn is_uuid(s: &str) -> bool {
    UUID.is_match(s)
}

pub fn is_ip(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok()
}

/// Dotted IPv4, or an IPv4-mapped IPv6 address.
pub fn is_ipv4(s: &str) -> bool {
    match s.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => true,
        Ok(IpAddr::V6(v6)) => v6.to_ipv4_mapped().is_some(),
        Err(_) => false,
    }
}

pub fn is_ipv6(s: &str) -> bool {
    match s.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => v6.to_ipv4_mapped().is_none(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(check: fn(&str) -> bool, cases: &[(&str, bool)]) {
        for &(input, ok) in cases {
            assert_eq!(check(input), ok, "input {input:?}");
        }
    }

    #[test]
    fn alpha() {
        table(
            is_alpha,
            &[
                ("skjhfdkjfhsdkjf", true),
                ("sdfsdfs.", false),
                ("slkfjslkfjdss3fdksljf", false),
            ],
        );
    }

    #[test]
    fn alphanumeric() {
        table(
            is_alphanumeric,
            &[
                ("skjhfdkjfhsdkjf", true),
                ("sdfsdfs.", false),
                ("sdfs3dfs.", false),
                ("slkfjslkfjdss3fdksljf", true),
                ("2189372137", true),
            ],
        );
    }

    #[test]
    fn numeric() {
        table(
            is_numeric,
            &[
                ("12345.6", false),
                ("12xd.", false),
                ("0xbeef.", false),
                ("32490823", true),
                ("1", true),
            ],
        );
    }

    #[test]
    fn letters_and_decimal_digits_only() {
        table(is_alpha, &[("", true), ("héllo", true), ("Ⅷ", false), ("\u{0301}", false)]);
        table(is_alphanumeric, &[("日本3", true), ("½", false), ("a²", false)]);
        table(is_numeric, &[("", true), ("٣٤", true), ("½", false), ("Ⅷ", false), ("²", false)]);
    }

    #[test]
    fn hexadecimal() {
        table(
            is_hexadecimal,
            &[
                ("beefad", true),
                ("1239801.", false),
                ("beef", true),
                ("32490823", true),
                ("avcdejkh", false),
            ],
        );
    }

    #[test]
    fn email() {
        table(
            is_email,
            &[
                ("foo@foo.bar", true),
                ("foo.bar+baz@example.co", true),
                ("foo@foo", false),
                ("foo", false),
            ],
        );
    }

    #[test]
    fn url() {
        table(
            is_url,
            &[
                ("https://example.com/foo.bar", true),
                ("example.com/foo.bar", false),
            ],
        );
    }

    #[test]
    fn base64() {
        table(is_base64, &[("Zm9vYmFy", true), ("Zm9vYg==", true), ("ljkfdasdja9039482", false)]);
    }

    #[test]
    fn uuid() {
        table(
            is_uuid,
            &[
                ("123e4567-e89b-12d3-a456-426655440000", true),
                ("123e4567-e89b-12d3-a456", false),
                ("123E4567-E89B-12D3-A456-426655440000", false),
            ],
        );
    }

    #[test]
    fn ip_families() {
        table(is_ipv4, &[("127.0.0.1", true), ("127.0.0", false), ("::ffff:10.0.0.1", true)]);
        table(
            is_ipv6,
            &[
                ("2001:0db8:85a3:08d3:1319:8a2e:0370:7334", true),
                ("2001:0db8:85a3:08d3:1319:8a2e:0370", false),
                ("127.0.0.1", false),
                ("::ffff:10.0.0.1", false),
            ],
        );
        table(
            is_ip,
            &[
                ("127.0.0.1", true),
                ("2001:0db8:85a3:08d3:1319:8a2e:0370:7334", true),
                ("localhost", false),
            ],
        );
    }
}
