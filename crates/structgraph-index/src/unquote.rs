//! Go string and rune literal unquoting.
//!
//! Accepts interpreted (`"..."`), raw (`` `...` ``) and rune (`'x'`) literals
//! and decodes every escape Go accepts.

use structgraph_core::StructgraphError;

/// Decode a quoted Go literal into its value.
pub fn unquote(literal: &str) -> Result<String, StructgraphError> {
    let err = |msg: &str| StructgraphError::Unquote(format!("{msg}: {literal}"));

    let mut chars = literal.chars();
    let quote = chars.next().ok_or_else(|| err("empty literal"))?;
    if literal.len() < 2 || !literal.ends_with(quote) {
        return Err(err("unterminated literal"));
    }
    let body = &literal[quote.len_utf8()..literal.len() - quote.len_utf8()];

    match quote {
        '`' => {
            if body.contains('`') {
                return Err(err("backquote inside raw string"));
            }
            Ok(body.replace('\r', ""))
        }
        '"' => decode(body, '"').map_err(|msg| err(&msg)),
        '\'' => {
            let value = decode(body, '\'').map_err(|msg| err(&msg))?;
            if value.chars().count() != 1 {
                return Err(err("rune literal must hold exactly one character"));
            }
            Ok(value)
        }
        _ => Err(err("not a quoted literal")),
    }
}

fn decode(body: &str, quote: char) -> Result<String, String> {
    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {}
            '\n' => return Err("newline in literal".to_string()),
            c if c == quote => return Err("unescaped quote in literal".to_string()),
            c => {
                push_char(&mut out, c);
                continue;
            }
        }

        let esc = chars.next().ok_or("trailing backslash")?;
        match esc {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '\'' | '"' if esc == quote => out.push(esc as u8),
            'x' => {
                let byte = take_hex(&mut chars, 2)?;
                out.push(byte as u8);
            }
            'u' | 'U' => {
                let digits = if esc == 'u' { 4 } else { 8 };
                let code = take_hex(&mut chars, digits)?;
                let c = char::from_u32(code).ok_or("invalid unicode escape")?;
                push_char(&mut out, c);
            }
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    let digit = chars
                        .next()
                        .and_then(|d| d.to_digit(8))
                        .ok_or("invalid octal escape")?;
                    value = value * 8 + digit;
                }
                if value > 255 {
                    return Err("octal escape out of range".to_string());
                }
                out.push(value as u8);
            }
            other => return Err(format!("unknown escape sequence \\{other}")),
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn take_hex(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<u32, String> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or("invalid hex escape")?;
        value = value * 16 + digit;
    }
    Ok(value)
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}
