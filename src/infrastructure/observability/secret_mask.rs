const VISIBLE_PREFIX: usize = 4;

/// Renders a credential for logs: a short prefix plus its length.
pub fn mask_secret(secret: &str) -> String {
    let trimmed = secret.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let char_count = trimmed.chars().count();
    if char_count <= VISIBLE_PREFIX * 2 {
        return format!("[REDACTED] ({} chars)", char_count);
    }

    let prefix: String = trimmed.chars().take(VISIBLE_PREFIX).collect();
    format!("{}… ({} chars)", prefix, char_count)
}
