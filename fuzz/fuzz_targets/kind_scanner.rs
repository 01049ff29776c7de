#![no_main]

use ferrous_registry::discovery::scan;
use libfuzzer_sys::fuzz_target;

// The marker scanner must never panic, whatever the source text.
fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        let outcome = scan::scan_source("crate::kinds::fuzz", source);
        for decl in &outcome.declarations {
            assert!(!decl.name.is_empty());
            assert!(decl.factory.starts_with("crate::") || decl.factory.starts_with("::"));
        }
        let _ = scan::render_table("fuzz", &outcome.declarations);
    }
});
