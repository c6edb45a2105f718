use serde::Serialize;

/// Holds a single value handed in at construction. The value cannot be
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dummy<T> {
    value: T,
}

impl<T> Dummy<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_returned_unchanged() {
        let dummy = Dummy::new(7);
        assert_eq!(*dummy.value(), 7);
    }

    #[test]
    fn test_non_copy_value() {
        let dummy = Dummy::new(String::from("seven"));
        assert_eq!(dummy.value(), "seven");
        assert_eq!(dummy.into_value(), "seven");
    }
}
