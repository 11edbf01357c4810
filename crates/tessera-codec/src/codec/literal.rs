//! CQL 字面量的词法辅助函数：字符串引号转义与集合字面量的顶层切分。

use crate::error::{CodecError, Result};

/// 以单引号包裹文本，内部单引号加倍转义。
pub(crate) fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            quoted.push('\'');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}

/// 去除单引号包裹并还原转义；未加引号或引号不成对时报错。
pub(crate) fn unquote(literal: &str) -> Result<String> {
    let trimmed = literal.trim();
    let inner = trimmed
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .ok_or_else(|| CodecError::invalid_literal(literal, "expected a single-quoted string"))?;

    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            match chars.next() {
                Some('\'') => text.push('\''),
                _ => {
                    return Err(CodecError::invalid_literal(
                        literal,
                        "unescaped quote inside string",
                    ));
                }
            }
        } else {
            text.push(ch);
        }
    }
    Ok(text)
}

/// 剥离集合定界符并按顶层逗号切分元素。
///
/// 引号内与嵌套括号内的逗号不参与切分；空集合返回空列表。
pub(crate) fn split_collection(literal: &str, open: char, close: char) -> Result<Vec<&str>> {
    let trimmed = literal.trim();
    let inner = trimmed
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .ok_or_else(|| {
            CodecError::invalid_literal(literal, format!("expected `{open}...{close}`"))
        })?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let items = split_top_level(inner, ',')
        .map_err(|cause| CodecError::invalid_literal(literal, cause))?;
    if items.iter().any(|item| item.is_empty()) {
        return Err(CodecError::invalid_literal(literal, "empty collection element"));
    }
    Ok(items)
}

/// 将映射条目 `key:value` 按顶层冒号切分为键与值。
pub(crate) fn split_entry(entry: &str) -> Result<(&str, &str)> {
    let parts =
        split_top_level(entry, ':').map_err(|cause| CodecError::invalid_literal(entry, cause))?;
    match parts.as_slice() {
        [key, value] if !key.is_empty() && !value.is_empty() => Ok((key, value)),
        _ => Err(CodecError::invalid_literal(entry, "expected `key:value`")),
    }
}

fn split_top_level(text: &str, separator: char) -> core::result::Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match ch {
            // 转义的 `''` 会让状态连续翻转两次，结果仍在引号内。
            '\'' => in_quote = !in_quote,
            '[' | '{' | '(' if !in_quote => depth += 1,
            ']' | '}' | ')' if !in_quote => {
                depth = depth.checked_sub(1).ok_or("unbalanced brackets")?;
            }
            c if c == separator && !in_quote && depth == 0 => {
                parts.push(text[start..idx].trim());
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }

    if in_quote {
        return Err("unterminated string");
    }
    if depth != 0 {
        return Err("unbalanced brackets");
    }
    parts.push(text[start..].trim());
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_and_unquote_are_inverse() {
        let quoted = quote("it's");
        assert_eq!(quoted, "'it''s'");
        assert_eq!(unquote(&quoted).unwrap(), "it's");
        assert!(unquote("'dangling ' quote'").is_err());
        assert!(unquote("bare").is_err());
    }

    #[test]
    fn split_respects_quotes_and_nesting() {
        let items = split_collection("[ 'a,b' , [1,2], {'k':'v'} ]", '[', ']').unwrap();
        assert_eq!(items, vec!["'a,b'", "[1,2]", "{'k':'v'}"]);
        assert!(split_collection("[]", '[', ']').unwrap().is_empty());
        assert!(split_collection("[1,,2]", '[', ']').is_err());
        assert!(split_collection("[1,2", '[', ']').is_err());
    }

    #[test]
    fn split_entry_ignores_colons_in_strings() {
        let (key, value) = split_entry("'::1' : '2015-01-01T00:00:00.000Z'").unwrap();
        assert_eq!(key, "'::1'");
        assert_eq!(value, "'2015-01-01T00:00:00.000Z'");
        assert!(split_entry("1:2:3").is_err());
    }
}
