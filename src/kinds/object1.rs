//! Upper-casing kind.

use super::Object;

pub const NAME: &str = "Object1";

crate::registry_kind!(name = "Object1", factory = create, description = "Upper-cases each input");

#[cfg(linked_table)]
crate::link_kind!(OBJECT1_ENTRY, "Object1", create, "Upper-cases each input");

#[derive(Debug, Default)]
pub struct Object1 {
    handled: usize,
}

impl Object1 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Object for Object1 {
    fn kind(&self) -> &'static str {
        NAME
    }

    fn handle(&mut self, input: &str) -> String {
        self.handled += 1;
        input.to_uppercase()
    }

    fn handled(&self) -> usize {
        self.handled
    }
}

pub fn create() -> Box<dyn Object> {
    Box::new(Object1::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_cases_and_counts() {
        let mut object = create();
        assert_eq!(object.kind(), "Object1");
        assert_eq!(object.handle("mixed Case"), "MIXED CASE");
        assert_eq!(object.handled(), 1);
    }
}
