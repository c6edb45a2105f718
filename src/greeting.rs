/// Format the greeting for `name`.
pub fn greet(name: &str) -> String {
    format!("Hello, {}!", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greet_user() {
        assert_eq!(greet("User1"), "Hello, User1!");
    }

    #[test]
    fn test_greet_keeps_name_verbatim() {
        for name in ["", " ", "Ünïcødé", "a, b!", "{name}"] {
            assert_eq!(greet(name), format!("Hello, {}!", name));
        }
    }
}
