//! Decoding of Go string and rune literal bodies.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EscapeError {
    /// Unknown escape letter or malformed numeric escape.
    Invalid,
    /// Numeric escape outside the Unicode range.
    OutOfRange,
    /// Rune literal without exactly one character.
    RuneLength,
}

/// Decode the body of an interpreted string (without the quotes).
pub fn unescape_string(body: &str) -> Result<String, EscapeError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(decode_escape(&mut chars, '"')?);
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Decode the body of a rune literal (without the quotes).
pub fn unescape_rune(body: &str) -> Result<char, EscapeError> {
    let mut chars = body.chars();
    let c = match chars.next() {
        Some('\\') => decode_escape(&mut chars, '\'')?,
        Some(c) => c,
        None => return Err(EscapeError::RuneLength),
    };
    if chars.next().is_some() {
        return Err(EscapeError::RuneLength);
    }
    Ok(c)
}

/// Raw strings drop carriage returns and keep everything else verbatim.
pub fn raw_string_value(body: &str) -> String {
    body.chars().filter(|&c| c != '\r').collect()
}

fn decode_escape(chars: &mut std::str::Chars<'_>, quote: char) -> Result<char, EscapeError> {
    let c = chars.next().ok_or(EscapeError::Invalid)?;
    let simple = match c {
        'a' => Some('\u{7}'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{b}'),
        '\\' => Some('\\'),
        c if c == quote => Some(c),
        _ => None,
    };
    if let Some(decoded) = simple {
        return Ok(decoded);
    }
    let (radix, digits, first) = match c {
        '0'..='7' => (8, 2, Some(c)),
        'x' => (16, 2, None),
        'u' => (16, 4, None),
        'U' => (16, 8, None),
        _ => return Err(EscapeError::Invalid),
    };
    let mut value = first.and_then(|d| d.to_digit(8)).unwrap_or(0);
    for _ in 0..digits {
        let d = chars
            .next()
            .and_then(|d| d.to_digit(radix))
            .ok_or(EscapeError::Invalid)?;
        value = value * radix + d;
    }
    if radix == 8 && value > 255 {
        return Err(EscapeError::OutOfRange);
    }
    char::from_u32(value).ok_or(EscapeError::OutOfRange)
}

#[cfg(test)]
mod tests;
