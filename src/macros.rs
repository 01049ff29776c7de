//! Declaration macros for registry kinds.

/// Marks a kind for the generated discovery table.
///
/// At compile time this only checks that `factory` is a
/// `fn() -> Box<dyn Object>`. The build script reads the marker from source
/// and turns it into a row of the generated table, so the marker must be
/// written with literal arguments on a line of its own.
///
/// ```rust
/// use ferrous_registry::kinds::Object;
///
/// struct Echo;
///
/// impl Object for Echo {
///     fn kind(&self) -> &'static str { "Echo" }
///     fn handle(&mut self, input: &str) -> String { input.to_string() }
///     fn handled(&self) -> usize { 0 }
/// }
///
/// fn create() -> Box<dyn Object> {
///     Box::new(Echo)
/// }
///
/// ferrous_registry::registry_kind!(name = "Echo", factory = create, description = "Echoes input");
/// ```
#[macro_export]
macro_rules! registry_kind {
    (name = $name:literal, factory = $factory:path $(, description = $description:literal)? $(,)?) => {
        const _: (&str, fn() -> ::std::boxed::Box<dyn $crate::kinds::Object>) = ($name, $factory);
    };
}

/// Places a kind into the link-time collected table.
///
/// Available with the `link-collected` feature on targets that support it.
/// `$slot` names the hidden static that holds the entry.
#[cfg(linked_table)]
#[macro_export]
macro_rules! link_kind {
    ($slot:ident, $name:literal, $factory:path) => {
        $crate::link_kind!($slot, $name, $factory, "");
    };
    ($slot:ident, $name:literal, $factory:path, $description:literal) => {
        #[$crate::__private::linkme::distributed_slice($crate::discovery::linked::LINKED_KINDS)]
        #[linkme(crate = $crate::__private::linkme)]
        static $slot: $crate::discovery::KindEntry = $crate::discovery::KindEntry {
            name: $name,
            description: $description,
            factory: $factory,
        };
    };
}
