//! 不可信输入清洗
//!
//! 去除 HTML/XML 标记并裁剪首尾空白，结果为空时由调用方按字段报告校验错误。

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("static markup pattern must compile"));

/// 清洗一段用户输入：去掉形如 `<tag ...>` / `</tag>` 的标签，再去掉首尾空白。
pub fn strip_markup(input: &str) -> String {
    MARKUP.replace_all(input, "").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_whitespace() {
        assert_eq!(strip_markup("  <b>alice</b> "), "alice");
        assert_eq!(strip_markup("<script>alert(1)</script>hi"), "alert(1)hi");
    }

    #[test]
    fn keeps_plain_text() {
        assert_eq!(strip_markup("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
        assert_eq!(strip_markup("a <3 b"), "a <3 b");
        assert_eq!(strip_markup("olá, tudo bem?"), "olá, tudo bem?");
    }

    #[test]
    fn markup_only_becomes_empty() {
        assert!(strip_markup("<br/>   <p></p>").is_empty());
    }
}
