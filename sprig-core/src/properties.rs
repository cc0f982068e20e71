//! Java 风格的 properties 文件解析
//!
//! 支持的语法：
//! - `#` 或 `!` 开头的注释行、空行
//! - `=`、`:` 或空白作为键值分隔符
//! - 行尾奇数个反斜杠表示续行，续行的前导空白被忽略
//! - 转义序列 `\t` `\n` `\r` `\f` `\\` `\uXXXX`，其余 `\c` 视为 `c`

/// 解析失败时的位置与原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PropertiesSyntaxError {
    pub line: usize,
    pub message: String,
}

/// 将 properties 文本解析为按出现顺序排列的键值对
///
/// 重复的键会按顺序全部返回，由调用方决定覆盖语义
pub(crate) fn parse(content: &str) -> Result<Vec<(String, String)>, PropertiesSyntaxError> {
    let mut pairs = Vec::new();
    let mut lines = split_lines(content).into_iter().enumerate();

    while let Some((index, raw)) = lines.next() {
        let trimmed = raw.trim_start_matches(is_whitespace);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let line_number = index + 1;
        let mut logical = trimmed.to_string();
        while has_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_whitespace)),
                None => break,
            }
        }

        let (raw_key, raw_value) = split_key_value(&logical);
        let key = unescape(raw_key).map_err(|message| PropertiesSyntaxError {
            line: line_number,
            message,
        })?;
        let value = unescape(raw_value).map_err(|message| PropertiesSyntaxError {
            line: line_number,
            message,
        })?;
        pairs.push((key, value));
    }

    Ok(pairs)
}

/// 按 `\n`、`\r\n` 或单独的 `\r` 切分物理行
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(idx) => {
                lines.push(&rest[..idx]);
                let terminator = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + terminator..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// 行尾是否存在未被转义的反斜杠
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// 在第一个未转义的 `=`、`:` 或空白处切分键和值
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut end = line.len();

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                end = idx;
                break;
            }
            c if is_whitespace(c) => {
                end = idx;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..end];
    let rest = line[end..].trim_start_matches(is_whitespace);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (key, rest.trim_start_matches(is_whitespace))
}

fn unescape(input: &str) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let unit = read_hex_unit(&mut chars)?;
                out.push(decode_unit(unit, &mut chars)?);
            }
            Some(other) => out.push(other),
            // 孤立的行尾反斜杠直接丢弃
            None => {}
        }
    }

    Ok(out)
}

fn read_hex_unit(chars: &mut std::str::Chars<'_>) -> Result<u32, String> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.chars().count() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Malformed \\uxxxx encoding: '\\u{}'", hex));
    }
    u32::from_str_radix(&hex, 16).map_err(|_| format!("Malformed \\uxxxx encoding: '\\u{}'", hex))
}

/// 解码一个 UTF-16 码元，高位代理项需要紧跟一个 `\uXXXX` 低位代理项
fn decode_unit(unit: u32, chars: &mut std::str::Chars<'_>) -> Result<char, String> {
    if (0xD800..0xDC00).contains(&unit) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            let low = read_hex_unit(&mut lookahead)?;
            if (0xDC00..0xE000).contains(&low) {
                *chars = lookahead;
                let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(combined)
                    .ok_or_else(|| format!("Invalid surrogate pair \\u{:04X}\\u{:04X}", unit, low));
            }
        }
        return Err(format!("Unpaired surrogate \\u{:04X}", unit));
    }

    char::from_u32(unit).ok_or_else(|| format!("Invalid code point \\u{:04X}", unit))
}
