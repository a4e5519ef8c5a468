//! Small formatting helpers shared by the protocol layer.

/// Remaining time as zero-padded `MM:SS`. Minutes are not wrapped at 60.
pub fn format_clock(seconds: u32) -> String {
  format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Display letter for an option: 0 -> "a", 1 -> "b", ...
/// Past "z" it falls back to the 1-based number.
pub fn option_label(index: usize) -> String {
  match u8::try_from(index) {
    Ok(i) if i < 26 => char::from(b'a' + i).to_string(),
    _ => (index + 1).to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clock_is_zero_padded() {
    assert_eq!(format_clock(1800), "30:00");
    assert_eq!(format_clock(65), "01:05");
    assert_eq!(format_clock(9), "00:09");
    assert_eq!(format_clock(0), "00:00");
    assert_eq!(format_clock(6000), "100:00");
  }

  #[test]
  fn option_labels() {
    assert_eq!(option_label(0), "a");
    assert_eq!(option_label(3), "d");
    assert_eq!(option_label(25), "z");
    assert_eq!(option_label(26), "27");
  }
}
