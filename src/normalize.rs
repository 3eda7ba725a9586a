use std::collections::HashSet;

/// Default stopword characters removed before n-gram emission.
///
/// These are high-frequency function characters (的, 了, 是, ...) that glue
/// sentences together but almost never start or end a content word. Treating
/// them as sentence breaks keeps them out of every n-gram.
pub const DEFAULT_STOPWORDS: &str = "的很了么呢是嘛个都也比还这于不与才上用就好在和对挺去后没说";

/// Returns true if `c` lies in the Chinese ideograph code-point range.
///
/// The range 19968..=171941 covers the CJK Unified Ideographs block plus the
/// supplementary extension planes.
pub fn is_chinese(c: char) -> bool {
    let v = c as u32;
    (19968..=171941).contains(&v)
}

/// Returns true if `s` is non-empty and every character is a Chinese ideograph.
pub fn all_chinese(s: &str) -> bool {
    !s.trim().is_empty() && s.chars().all(is_chinese)
}

/// Splits one raw corpus line into clean runs of Chinese text.
///
/// Stopword characters, punctuation, whitespace, and control characters all
/// act as delimiters; the pieces between them are kept only if they consist
/// purely of Chinese ideographs. One line may yield zero or many runs.
///
/// # Example
/// ```
/// use word_discovery::normalize::{clean_runs, stopword_set};
/// let stop = stopword_set(None);
/// let runs = clean_runs("我爱北京，abc，天安门！", &stop);
/// assert_eq!(runs, vec!["我爱北京".to_string(), "天安门".to_string()]);
/// ```
pub fn clean_runs(line: &str, stopwords: &HashSet<char>) -> Vec<String> {
    line.split(|c: char| is_delimiter(c, stopwords))
        .map(str::trim)
        .filter(|run| all_chinese(run))
        .map(String::from)
        .collect()
}

/// Builds the delimiter set: the default stopwords plus any extra characters.
pub fn stopword_set(extra: Option<&str>) -> HashSet<char> {
    let mut set: HashSet<char> = DEFAULT_STOPWORDS.chars().collect();
    if let Some(extra) = extra {
        set.extend(extra.chars());
    }
    set
}

fn is_delimiter(c: char, stopwords: &HashSet<char>) -> bool {
    stopwords.contains(&c) || c.is_whitespace() || c.is_control() || is_punctuation(c)
}

/// True for any character in the Unicode punctuation categories
/// (Pc, Pd, Ps, Pe, Pi, Pf, Po).
///
/// Punctuation only delimits; other non-Chinese characters (Latin letters,
/// digits, kana, ...) are left in place and later disqualify the whole run
/// via [`all_chinese`]. An interpunct inside a transliterated name
/// (马克·吐温) must therefore split the run, not sink it.
fn is_punctuation(c: char) -> bool {
    let v = c as u32;
    if v < 0x80 {
        return c.is_ascii_punctuation();
    }
    PUNCTUATION_RANGES
        .binary_search_by(|&(start, end)| {
            if v < start {
                std::cmp::Ordering::Greater
            } else if v > end {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

// Inclusive code-point ranges with Unicode general category P*, sorted for
// binary search. Derived from the UCD; ASCII is handled separately above.
const PUNCTUATION_RANGES: &[(u32, u32)] = &[
    (0x00A1, 0x00A1),
    (0x00A7, 0x00A7),
    (0x00AB, 0x00AB),
    (0x00B6, 0x00B7),
    (0x00BB, 0x00BB),
    (0x00BF, 0x00BF),
    (0x037E, 0x037E),
    (0x0387, 0x0387),
    (0x055A, 0x055F),
    (0x0589, 0x058A),
    (0x05BE, 0x05BE),
    (0x05C0, 0x05C0),
    (0x05C3, 0x05C3),
    (0x05C6, 0x05C6),
    (0x05F3, 0x05F4),
    (0x0609, 0x060A),
    (0x060C, 0x060D),
    (0x061B, 0x061B),
    (0x061D, 0x061F),
    (0x066A, 0x066D),
    (0x06D4, 0x06D4),
    (0x0700, 0x070D),
    (0x07F7, 0x07F9),
    (0x0830, 0x083E),
    (0x085E, 0x085E),
    (0x0964, 0x0965),
    (0x0970, 0x0970),
    (0x09FD, 0x09FD),
    (0x0A76, 0x0A76),
    (0x0AF0, 0x0AF0),
    (0x0C77, 0x0C77),
    (0x0C84, 0x0C84),
    (0x0DF4, 0x0DF4),
    (0x0E4F, 0x0E4F),
    (0x0E5A, 0x0E5B),
    (0x0F04, 0x0F12),
    (0x0F14, 0x0F14),
    (0x0F3A, 0x0F3D),
    (0x0F85, 0x0F85),
    (0x0FD0, 0x0FD4),
    (0x0FD9, 0x0FDA),
    (0x104A, 0x104F),
    (0x10FB, 0x10FB),
    (0x1360, 0x1368),
    (0x1400, 0x1400),
    (0x166E, 0x166E),
    (0x169B, 0x169C),
    (0x16EB, 0x16ED),
    (0x1735, 0x1736),
    (0x17D4, 0x17D6),
    (0x17D8, 0x17DA),
    (0x1800, 0x180A),
    (0x1944, 0x1945),
    (0x1A1E, 0x1A1F),
    (0x1AA0, 0x1AA6),
    (0x1AA8, 0x1AAD),
    (0x1B5A, 0x1B60),
    (0x1B7D, 0x1B7E),
    (0x1BFC, 0x1BFF),
    (0x1C3B, 0x1C3F),
    (0x1C7E, 0x1C7F),
    (0x1CC0, 0x1CC7),
    (0x1CD3, 0x1CD3),
    (0x2010, 0x2027),
    (0x2030, 0x2043),
    (0x2045, 0x2051),
    (0x2053, 0x205E),
    (0x207D, 0x207E),
    (0x208D, 0x208E),
    (0x2308, 0x230B),
    (0x2329, 0x232A),
    (0x2768, 0x2775),
    (0x27C5, 0x27C6),
    (0x27E6, 0x27EF),
    (0x2983, 0x2998),
    (0x29D8, 0x29DB),
    (0x29FC, 0x29FD),
    (0x2CF9, 0x2CFC),
    (0x2CFE, 0x2CFF),
    (0x2D70, 0x2D70),
    (0x2E00, 0x2E2E),
    (0x2E30, 0x2E4F),
    (0x2E52, 0x2E5D),
    (0x3001, 0x3003),
    (0x3008, 0x3011),
    (0x3014, 0x301F),
    (0x3030, 0x3030),
    (0x303D, 0x303D),
    (0x30A0, 0x30A0),
    (0x30FB, 0x30FB),
    (0xA4FE, 0xA4FF),
    (0xA60D, 0xA60F),
    (0xA673, 0xA673),
    (0xA67E, 0xA67E),
    (0xA6F2, 0xA6F7),
    (0xA874, 0xA877),
    (0xA8CE, 0xA8CF),
    (0xA8F8, 0xA8FA),
    (0xA8FC, 0xA8FC),
    (0xA92E, 0xA92F),
    (0xA95F, 0xA95F),
    (0xA9C1, 0xA9CD),
    (0xA9DE, 0xA9DF),
    (0xAA5C, 0xAA5F),
    (0xAADE, 0xAADF),
    (0xAAF0, 0xAAF1),
    (0xABEB, 0xABEB),
    (0xFD3E, 0xFD3F),
    (0xFE10, 0xFE19),
    (0xFE30, 0xFE52),
    (0xFE54, 0xFE61),
    (0xFE63, 0xFE63),
    (0xFE68, 0xFE68),
    (0xFE6A, 0xFE6B),
    (0xFF01, 0xFF03),
    (0xFF05, 0xFF0A),
    (0xFF0C, 0xFF0F),
    (0xFF1A, 0xFF1B),
    (0xFF1F, 0xFF20),
    (0xFF3B, 0xFF3D),
    (0xFF3F, 0xFF3F),
    (0xFF5B, 0xFF5B),
    (0xFF5D, 0xFF5D),
    (0xFF5F, 0xFF65),
    (0x10100, 0x10102),
    (0x1039F, 0x1039F),
    (0x103D0, 0x103D0),
    (0x1056F, 0x1056F),
    (0x10857, 0x10857),
    (0x1091F, 0x1091F),
    (0x1093F, 0x1093F),
    (0x10A50, 0x10A58),
    (0x10A7F, 0x10A7F),
    (0x10AF0, 0x10AF6),
    (0x10B39, 0x10B3F),
    (0x10B99, 0x10B9C),
    (0x10EAD, 0x10EAD),
    (0x10F55, 0x10F59),
    (0x10F86, 0x10F89),
    (0x11047, 0x1104D),
    (0x110BB, 0x110BC),
    (0x110BE, 0x110C1),
    (0x11140, 0x11143),
    (0x11174, 0x11175),
    (0x111C5, 0x111C8),
    (0x111CD, 0x111CD),
    (0x111DB, 0x111DB),
    (0x111DD, 0x111DF),
    (0x11238, 0x1123D),
    (0x112A9, 0x112A9),
    (0x1144B, 0x1144F),
    (0x1145A, 0x1145B),
    (0x1145D, 0x1145D),
    (0x114C6, 0x114C6),
    (0x115C1, 0x115D7),
    (0x11641, 0x11643),
    (0x11660, 0x1166C),
    (0x116B9, 0x116B9),
    (0x1173C, 0x1173E),
    (0x1183B, 0x1183B),
    (0x11944, 0x11946),
    (0x119E2, 0x119E2),
    (0x11A3F, 0x11A46),
    (0x11A9A, 0x11A9C),
    (0x11A9E, 0x11AA2),
    (0x11B00, 0x11B09),
    (0x11C41, 0x11C45),
    (0x11C70, 0x11C71),
    (0x11EF7, 0x11EF8),
    (0x11F43, 0x11F4F),
    (0x11FFF, 0x11FFF),
    (0x12470, 0x12474),
    (0x12FF1, 0x12FF2),
    (0x16A6E, 0x16A6F),
    (0x16AF5, 0x16AF5),
    (0x16B37, 0x16B3B),
    (0x16B44, 0x16B44),
    (0x16E97, 0x16E9A),
    (0x16FE2, 0x16FE2),
    (0x1BC9F, 0x1BC9F),
    (0x1DA87, 0x1DA8B),
    (0x1E95E, 0x1E95F),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chinese_range() {
        assert!(is_chinese('我'));
        assert!(is_chinese('一')); // code point 19968, range start
        assert!(!is_chinese('a'));
        assert!(!is_chinese('$'));
        assert!(!is_chinese('。'));
    }

    #[test]
    fn splits_on_stopwords_and_punctuation() {
        let stop = stopword_set(None);
        // 的 is a stopword and must break the run.
        let runs = clean_runs("我们的朋友", &stop);
        assert_eq!(runs, vec!["我们".to_string(), "朋友".to_string()]);
    }

    #[test]
    fn discards_runs_with_non_chinese() {
        let stop = stopword_set(None);
        assert!(clean_runs("abc123", &stop).is_empty());
        assert!(clean_runs("", &stop).is_empty());
        // Latin glued directly to Chinese taints the whole run.
        assert!(clean_runs("北京abc", &stop).is_empty());
    }

    #[test]
    fn wide_punctuation_delimits() {
        let stop = stopword_set(None);
        let runs = clean_runs("北京，天安门。広場　测试", &stop);
        assert_eq!(
            runs,
            vec![
                "北京".to_string(),
                "天安门".to_string(),
                "広場".to_string(),
                "测试".to_string()
            ]
        );
    }

    #[test]
    fn interpunct_splits_transliterated_names() {
        let stop = stopword_set(None);
        // U+00B7 between the name parts delimits; it must not sink the run.
        assert_eq!(
            clean_runs("马克·吐温", &stop),
            vec!["马克".to_string(), "吐温".to_string()]
        );
        // Same for the katakana middle dot U+30FB.
        assert_eq!(
            clean_runs("马克・吐温", &stop),
            vec!["马克".to_string(), "吐温".to_string()]
        );
    }

    #[test]
    fn non_cjk_punctuation_delimits() {
        let stop = stopword_set(None);
        assert_eq!(clean_runs("«论语»", &stop), vec!["论语".to_string()]);
        assert_eq!(
            clean_runs("¡北京¿广州", &stop),
            vec!["北京".to_string(), "广州".to_string()]
        );
        // En/em dashes from the general punctuation block.
        assert_eq!(
            clean_runs("北京\u{2013}广州\u{2014}深圳", &stop),
            vec!["北京".to_string(), "广州".to_string(), "深圳".to_string()]
        );
    }

    #[test]
    fn letters_still_taint_instead_of_delimiting() {
        let stop = stopword_set(None);
        // Kana and Latin letters are not punctuation: the run is discarded
        // whole, exactly as before.
        assert!(clean_runs("天安门あ广场", &stop).is_empty());
        assert!(clean_runs("北京abc", &stop).is_empty());
    }

    #[test]
    fn extra_stopwords_extend_defaults() {
        let stop = stopword_set(Some("京"));
        let runs = clean_runs("我爱北京天安门", &stop);
        assert_eq!(runs, vec!["我爱北".to_string(), "天安门".to_string()]);
    }
}
