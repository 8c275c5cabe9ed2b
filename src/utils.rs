pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn cookie(name: &str, value: &str, secure: bool) -> String {
    let secure_attr = if secure { " Secure;" } else { "" };
    format!("{name}={value}; HttpOnly; Max-Age=86400; Path=/;{secure_attr} SameSite=Strict")
}

pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; Max-Age=0; Path=/; SameSite=Strict")
}

/// Format a second count as `MM:SS`.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_pads_both_fields() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(30 * 60), "30:00");
    }

    #[test]
    fn cookie_includes_secure_only_when_asked() {
        assert!(cookie("s", "v", true).contains("Secure"));
        assert!(!cookie("s", "v", false).contains("Secure"));
    }
}
