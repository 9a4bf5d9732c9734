//! Small utility helpers used across modules.

/// Five-slot star rating, e.g. `3` -> "★★★☆☆". Values are clamped to `0..=5`.
pub fn difficulty_stars(level: u8) -> String {
  let filled = level.min(5) as usize;
  format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Trim a user id; blank ids share the "anonymous" profile.
pub fn normalize_user_id(raw: &str) -> String {
  let t = raw.trim();
  if t.is_empty() { "anonymous".to_string() } else { t.to_string() }
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with whole problem statements.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stars_are_clamped() {
    assert_eq!(difficulty_stars(0), "☆☆☆☆☆");
    assert_eq!(difficulty_stars(3), "★★★☆☆");
    assert_eq!(difficulty_stars(9), "★★★★★");
  }

  #[test]
  fn blank_user_ids_become_anonymous() {
    assert_eq!(normalize_user_id("  ana "), "ana");
    assert_eq!(normalize_user_id("   "), "anonymous");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let t = trunc_for_log("অ্যারে array", 4);
    assert!(t.ends_with("bytes total)"));
  }
}
