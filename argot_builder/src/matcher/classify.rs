use crate::constant::*;

/// The syntactic shape of a single command line token.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'t> {
    /// `@name`: splice the tokens of `name` into the stream.
    Include(&'t str),
    /// `--`: everything afterwards is a free argument.
    EndOfOptions,
    /// `--body`, where the body may carry `=value` or a forwarded list.
    Long(&'t str),
    /// `-x` or `-x=value`.
    Short(char, Option<&'t str>),
    /// `-xyz` or `-xyz=value`: a cluster of short options.
    Cluster(&'t str, Option<&'t str>),
    /// An option value, a sub-command name or a free argument.
    Value(&'t str),
}

/// Classify `token`.
///
/// `accepting` signals an option is currently consuming values, and `has_short` reports
/// whether a single character short option exists.
/// Both are only used to disambiguate negative numbers.
pub(crate) fn classify<'t>(
    token: &'t str,
    accepting: bool,
    has_short: impl Fn(char) -> bool,
) -> Token<'t> {
    if let Some(name) = token.strip_prefix(INCLUDE_PREFIX) {
        if !name.is_empty() {
            return Token::Include(name);
        }

        return Token::Value(token);
    }

    if token == END_OF_OPTIONS {
        return Token::EndOfOptions;
    }

    if let Some(body) = token.strip_prefix(LONG_PREFIX) {
        return Token::Long(body);
    }

    let body = match token.strip_prefix(OPTION_PREFIX) {
        Some(body) if !body.is_empty() => body,
        _ => return Token::Value(token),
    };

    if is_number(body) {
        if accepting {
            return Token::Value(token);
        }

        let mut characters = body.chars();
        return match (characters.next(), characters.next()) {
            (Some(single), None) if has_short(single) => Token::Short(single, None),
            _ => Token::Value(token),
        };
    }

    let (names, inline) = split_inline(body);
    let mut characters = names.chars();
    match (characters.next(), characters.next()) {
        (None, _) => Token::Value(token),
        (Some(single), None) => Token::Short(single, inline),
        (Some(_), Some(_)) => Token::Cluster(names, inline),
    }
}

/// Split `body` on the first `=`.
pub(crate) fn split_inline(body: &str) -> (&str, Option<&str>) {
    match body.split_once(INLINE_DELIMITER) {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

/// Split the text following `--name,` into forwarded values.
///
/// Runs of empty segments between two values join them with a literal `,`.
/// Leading and trailing empty segments are dropped.
pub(crate) fn split_forwarded(text: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::default();
    let mut joining = false;

    for segment in text.split(FORWARD_DELIMITER) {
        if segment.is_empty() {
            joining = !values.is_empty();
            continue;
        }

        match values.last_mut() {
            Some(last) if joining => {
                last.push(FORWARD_DELIMITER);
                last.push_str(segment);
            }
            _ => values.push(segment.to_string()),
        }

        joining = false;
    }

    values
}

/// Whether `text` reads as an unsigned number: decimal (with optional fraction and exponent),
/// or `0b`/`0o`/`0x` prefixed integer.
pub(crate) fn is_number(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();

    if let Some(digits) = lower.strip_prefix("0x") {
        return all_of(digits, |c| c.is_ascii_hexdigit());
    }

    if let Some(digits) = lower.strip_prefix("0o") {
        return all_of(digits, |c| ('0'..='7').contains(&c));
    }

    if let Some(digits) = lower.strip_prefix("0b") {
        return all_of(digits, |c| c == '0' || c == '1');
    }

    is_decimal(&lower)
}

fn is_decimal(text: &str) -> bool {
    let (mantissa, exponent) = match text.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (text, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (mantissa, ""),
    };
    let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());

    if !digits(whole) || !digits(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return false;
    }

    match exponent {
        Some(exponent) => {
            let exponent = exponent
                .strip_prefix(|c: char| c == '+' || c == '-')
                .unwrap_or(exponent);
            all_of(exponent, |c| c.is_ascii_digit())
        }
        None => true,
    }
}

fn all_of(text: &str, predicate: impl Fn(char) -> bool) -> bool {
    !text.is_empty() && text.chars().all(predicate)
}
