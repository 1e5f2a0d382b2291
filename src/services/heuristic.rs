//! 题目起始行启发式计数
//!
//! 只用于估计一个批次里大概有多少道题，决定是否值得调用 LLM，不是精确计数。

use std::sync::LazyLock;

use regex::Regex;

/// 题号格式，每条都要求题号后还有内容
const QUESTION_START_PATTERNS: [&str; 5] = [
    r"^\d+\.\s*.+",              // 1. 题干
    r"^Q\d+[.:]?\s*.+",          // Q1: / Q1. 题干
    r"^Question\s*\d+[.:]?\s*.+", // Question 1: 题干
    r"^\(\d+\)\s*.+",            // (1) 题干
    r"^\d+\)\s*.+",              // 1) 题干
];

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    QUESTION_START_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("题号正则无效"))
        .collect()
});

/// 单行是否像一道题的开头（行首锚定，大小写不敏感）
pub fn is_question_start(line: &str) -> bool {
    PATTERNS.iter().any(|re| re.is_match(line))
}

/// 统计文本中疑似题目起始行的数量，每行最多计 1 次
pub fn count_question_starts(text: &str) -> usize {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && is_question_start(line))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(PATTERNS.len(), QUESTION_START_PATTERNS.len());
    }

    #[test]
    fn test_each_enumeration_style_counts() {
        assert!(is_question_start("1. Who wrote Indulekha?"));
        assert!(is_question_start("Q12: Capital of Kerala?"));
        assert!(is_question_start("q3. lower case prefix"));
        assert!(is_question_start("Question 4 Which is the largest district?"));
        assert!(is_question_start("QUESTION7: shouting"));
        assert!(is_question_start("(5) Match the following"));
        assert!(is_question_start("6) Arrange in order"));
    }

    #[test]
    fn test_non_question_lines() {
        assert!(!is_question_start("A) Periyar"));
        assert!(!is_question_start("The answer is 1."));
        assert!(!is_question_start("1."));
        assert!(!is_question_start("--- Page 3 ---"));
        assert!(!is_question_start(""));
    }

    #[test]
    fn test_line_counts_once_even_if_several_patterns_match() {
        // "Q1. ..." 同时满足 Q 模式；"1) 2. x" 同时满足两个数字模式
        let text = "Q1. first\n1) 2. second\n";
        assert_eq!(count_question_starts(text), 2);
    }

    #[test]
    fn test_lines_are_trimmed_and_blank_lines_ignored() {
        let text = "\n   1. indented question\n\n\t(2) tabbed\n   \nplain text\n";
        assert_eq!(count_question_starts(text), 2);
    }

    #[test]
    fn test_count_does_not_depend_on_pattern_order() {
        let text = "1. a\nQ2: b\nQuestion 3 c\n(4) d\n5) e\nnothing\n";
        let forward = count_question_starts(text);

        let reversed: Vec<Regex> = PATTERNS.iter().rev().cloned().collect();
        let backward = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && reversed.iter().any(|re| re.is_match(line)))
            .count();

        assert_eq!(forward, 5);
        assert_eq!(forward, backward);
    }
}
