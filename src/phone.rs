// Phone number helpers for seller contact details

use once_cell::sync::Lazy;

pub const DEFAULT_DIAL_CODE: &str = "+225";

// Dial codes offered by the profile form, longest first so that prefix
// matching picks "+225" over "+2"
static DIAL_CODES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut codes = vec![
        "+1", "+7", "+20", "+27", "+33", "+32", "+34", "+39", "+41", "+44", "+49", "+212", "+213",
        "+216", "+221", "+223", "+224", "+225", "+226", "+227", "+228", "+229", "+231", "+233",
        "+234", "+237", "+241", "+242", "+243", "+250", "+254", "+255", "+256", "+971", "+972",
        "+992", "+993", "+994", "+995", "+996",
    ];
    codes.sort_by_key(|code| std::cmp::Reverse(code.len()));
    codes
});

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

// Keeps digits and '+', and turns an international "00" prefix into '+'
pub fn clean_phone(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    match cleaned.strip_prefix("00") {
        Some(rest) => format!("+{}", rest),
        None => cleaned,
    }
}

// wa.me link for a WhatsApp number, None when no digits remain
pub fn whatsapp_link(raw: &str) -> Option<String> {
    let cleaned = clean_phone(raw);
    let number = cleaned.trim_start_matches('+');
    if number.is_empty() {
        None
    } else {
        Some(format!("https://wa.me/{}", number))
    }
}

pub fn build_full_phone(dial_code: &str, local: &str) -> String {
    let digits = digits_only(local);
    if digits.is_empty() {
        String::new()
    } else {
        format!("{}{}", dial_code, digits)
    }
}

// Splits a stored number into (dial code, local digits) for editing.
// Unknown or missing prefixes fall back to DEFAULT_DIAL_CODE.
pub fn split_dial_code(phone: &str) -> (String, String) {
    let cleaned = clean_phone(phone);
    if let Some(code) = DIAL_CODES.iter().find(|code| cleaned.starts_with(**code)) {
        let local = digits_only(&cleaned[code.len()..]);
        return (code.to_string(), local.trim_start_matches('0').to_string());
    }
    (DEFAULT_DIAL_CODE.to_string(), digits_only(&cleaned))
}
