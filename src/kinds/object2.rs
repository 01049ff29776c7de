//! Reversing kind.

use super::Object;

pub const NAME: &str = "Object2";

crate::registry_kind!(
    name = "Object2",
    factory = create,
    description = "Reverses each input",
);

#[cfg(linked_table)]
crate::link_kind!(OBJECT2_ENTRY, "Object2", create, "Reverses each input");

#[derive(Debug, Default)]
pub struct Object2 {
    handled: usize,
}

impl Object2 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Object for Object2 {
    fn kind(&self) -> &'static str {
        NAME
    }

    fn handle(&mut self, input: &str) -> String {
        self.handled += 1;
        input.chars().rev().collect()
    }

    fn handled(&self) -> usize {
        self.handled
    }
}

pub fn create() -> Box<dyn Object> {
    Box::new(Object2::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverses_and_counts() {
        let mut object = create();
        assert_eq!(object.kind(), "Object2");
        assert_eq!(object.handle("abc"), "cba");
        assert_eq!(object.handle(""), "");
        assert_eq!(object.handled(), 2);
    }
}
