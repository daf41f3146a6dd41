/// Case folding used by name fields (`joão` becomes `JOÃO`).
pub fn to_upper(value: &str) -> String {
    value.to_uppercase()
}

pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

pub fn contains_uppercase(value: &str) -> bool {
    value.chars().any(char::is_uppercase)
}
