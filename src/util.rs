//! Small utility helpers used across modules.

/// True if unicode char belongs to the Japanese script ranges we care about:
/// CJK punctuation, hiragana, katakana, full-width forms, and the common kanji block.
pub fn is_japanese(ch: char) -> bool {
  matches!(ch,
    '\u{3000}'..='\u{303F}'
      | '\u{3040}'..='\u{309F}'
      | '\u{30A0}'..='\u{30FF}'
      | '\u{FF00}'..='\u{FFEF}'
      | '\u{4E00}'..='\u{9FAF}')
}

/// True if the string contains at least one Japanese-script character.
pub fn contains_japanese(s: &str) -> bool {
  s.chars().any(is_japanese)
}

/// Log-safe truncation for large strings (char-boundary safe).
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn japanese_detection_covers_kana_and_kanji() {
    assert!(contains_japanese("ひらがな"));
    assert!(contains_japanese("カタカナ"));
    assert!(contains_japanese("漢字"));
    assert!(contains_japanese("mixed 教材 line"));
    assert!(!contains_japanese("plain ascii only"));
  }

  #[test]
  fn trunc_is_char_safe() {
    let s = "あいうえおかきくけこ";
    let t = trunc_for_log(s, 3);
    assert!(t.starts_with("あいう"));
  }
}
