//! 文本清洗工具
//!
//! - `clean_text`：抓取后对原始行做规范化
//! - `sanitize`：作为选项使用前的二次清洗

/// 选项两端需要去掉的项目符号和破折号
const OPTION_MARKERS: &[char] = &['•', '-', '–', '—', ' '];

/// 清洗后短于该长度的选项会被丢弃
pub const MIN_OPTION_LEN: usize = 10;

/// 规范化抓取到的文本行
///
/// - 去掉首尾空白
/// - 不换行空格转为普通空格，去掉零宽空格和 BOM
/// - 去掉开头的非字母数字噪声（如 ¶）
/// - 去掉结尾的非字母数字噪声，保留 `)` 和 `]`
/// - 合并连续空白
pub fn clean_text(s: &str) -> String {
    let s = s
        .trim()
        .replace('\u{00A0}', " ")
        .replace(['\u{200B}', '\u{FEFF}'], "");
    let s = s.trim_start_matches(|c: char| !c.is_alphanumeric());
    let s = s.trim_end_matches(|c: char| !(c.is_alphanumeric() || c == ')' || c == ']'));
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 清洗一条事实，用作正确答案或干扰项
///
/// 结果短于 [`MIN_OPTION_LEN`] 个字符时返回空字符串
pub fn sanitize(s: &str) -> String {
    let s = s.trim().trim_matches(OPTION_MARKERS);
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.chars().count() < MIN_OPTION_LEN {
        return String::new();
    }
    s.to_string()
}

/// 判断一行事实的长度是否落在 `[min, max)` 内（按字符计）
pub fn within_fact_length(s: &str, min: usize, max: usize) -> bool {
    let len = s.chars().count();
    len >= min && len < max
}
