//! Canonical key forms for prefecture names and tags. Every comparison the
//! query engine makes between a post's prefecture (or a course's) and a
//! filter value goes through [`normalize_prefecture`] first, so `東京都`,
//! ` 東京 ` and `とうきょう` all select the same posts.

/// The administrative suffixes that may trail a prefecture name. At most one
/// is stripped.
const SUFFIXES: [char; 4] = ['都', '道', '府', '県'];

/// Converts a free-text prefecture name into its canonical key. Surrounding
/// and interior whitespace is removed, one trailing administrative suffix is
/// stripped, and known kana spellings are mapped onto their kanji names.
///
/// The function is total and idempotent: unrecognized input comes back
/// cleaned but otherwise untouched, and empty input yields `""`.
///
/// ```
/// use komtabi::normalize::normalize_prefecture;
///
/// assert_eq!(normalize_prefecture("東京都"), "東京");
/// assert_eq!(normalize_prefecture(" さいたま "), "埼玉");
/// assert_eq!(normalize_prefecture("北海道"), "北海道");
/// ```
pub fn normalize_prefecture(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bare = match compact.strip_suffix(&SUFFIXES[..]) {
        Some(bare) => bare,
        None => &compact,
    };
    match alias(bare) {
        Some(canonical) => canonical.to_owned(),
        None => bare.to_owned(),
    }
}

/// Maps alternate spellings onto the canonical name. `北海` and `京` are
/// what `北海道` and `京都` become after suffix stripping.
fn alias(name: &str) -> Option<&'static str> {
    match name {
        "さいたま" | "サイタマ" => Some("埼玉"),
        "とうきょう" | "トウキョウ" => Some("東京"),
        "おおさか" | "オオサカ" => Some("大阪"),
        "ほっかいどう" | "ホッカイドウ" | "北海" => Some("北海道"),
        "京" => Some("京都"),
        _ => None,
    }
}

/// Trims a tag. Tags are otherwise case- and whitespace-sensitive.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_owned()
}

/// Normalizes every tag in `tags`, dropping the ones that end up empty.
pub fn normalized_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter()
        .map(|t| normalize_tag(t.as_ref()))
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_strips_one_suffix() {
        assert_eq!(normalize_prefecture("東京都"), "東京");
        assert_eq!(normalize_prefecture("大阪府"), "大阪");
        assert_eq!(normalize_prefecture("埼玉県"), "埼玉");
        assert_eq!(normalize_prefecture("京都府"), "京都");
        assert_eq!(normalize_prefecture("京都"), "京都");
    }

    #[test]
    fn test_removes_whitespace() {
        assert_eq!(normalize_prefecture("  神奈川 県 "), "神奈川");
        assert_eq!(normalize_prefecture("長\u{3000}野"), "長野");
    }

    #[test]
    fn test_aliases() {
        for (input, wanted) in [
            ("さいたま", "埼玉"),
            ("サイタマ", "埼玉"),
            ("とうきょう", "東京"),
            ("トウキョウ", "東京"),
            ("おおさか", "大阪"),
            ("オオサカ", "大阪"),
            ("ほっかいどう", "北海道"),
            ("ホッカイドウ", "北海道"),
            ("北海道", "北海道"),
        ] {
            assert_eq!(normalize_prefecture(input), wanted, "input: {}", input);
        }
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "東京都", "北海道", "京都府", "大阪府", "沖縄県", "さいたま", "Tokyo", "",
            " 県 ",
        ] {
            let once = normalize_prefecture(input);
            assert_eq!(normalize_prefecture(&once), once, "input: {}", input);
        }
    }

    const PREFECTURES: [&str; 47] = [
        "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県", "茨城県",
        "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県", "新潟県", "富山県",
        "石川県", "福井県", "山梨県", "長野県", "岐阜県", "静岡県", "愛知県", "三重県",
        "滋賀県", "京都府", "大阪府", "兵庫県", "奈良県", "和歌山県", "鳥取県", "島根県",
        "岡山県", "広島県", "山口県", "徳島県", "香川県", "愛媛県", "高知県", "福岡県",
        "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
    ];

    #[test]
    fn test_idempotent_for_every_prefecture() {
        for name in PREFECTURES {
            let once = normalize_prefecture(name);
            assert!(!once.is_empty(), "input: {}", name);
            assert_eq!(normalize_prefecture(&once), once, "input: {}", name);
            // The bare and the suffixed form select the same posts.
            assert_eq!(normalize_prefecture(&once), normalize_prefecture(name));
        }
        assert_eq!(normalize_prefecture("北海道"), "北海道");
        assert_eq!(normalize_prefecture("京都府"), "京都");
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(normalize_prefecture(""), "");
        assert_eq!(normalize_prefecture("   "), "");
        assert_eq!(normalize_prefecture("Tokyo"), "Tokyo");
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  temple "), "temple");
        assert_eq!(normalize_tag("Temple"), "Temple");
        assert_eq!(normalized_tags(&["a", " ", " b"]), vec!["a", "b"]);
    }
}
