//! Generates the discovery table and selects the discovery backend.

use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[allow(dead_code)]
#[path = "src/discovery/scan.rs"]
mod scan;

const SCAN_DIR_ENV: &str = "FERROUS_REGISTRY_SCAN_DIR";
const DEFAULT_SCAN_DIR: &str = "src/kinds";
const GENERATED_FILE: &str = "generated_kinds.rs";

// Targets where linkme can collect distributed slices.
const LINKED_TARGETS: &[&str] = &["linux", "android", "macos", "ios", "windows", "freebsd", "illumos"];

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rustc-check-cfg=cfg(linked_table)");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/discovery/scan.rs");
    println!("cargo:rerun-if-env-changed={}", SCAN_DIR_ENV);

    select_backend();
    generate_table()
}

fn select_backend() {
    if env::var_os("CARGO_FEATURE_LINK_COLLECTED").is_none() {
        return;
    }
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if LINKED_TARGETS.contains(&target_os.as_str()) {
        println!("cargo:rustc-cfg=linked_table");
    } else {
        println!(
            "cargo:warning=link-collected is not supported on target os `{}`; using the generated kind table",
            target_os
        );
    }
}

fn generate_table() -> Result<(), Box<dyn Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let src_root = manifest_dir.join("src");
    let relative_dir = env::var(SCAN_DIR_ENV).unwrap_or_else(|_| DEFAULT_SCAN_DIR.to_string());
    let scan_dir = manifest_dir.join(&relative_dir);
    println!("cargo:rerun-if-changed={}", scan_dir.display());

    let mut declarations = Vec::new();
    if scan_dir.is_dir() {
        for file in source_files(&scan_dir) {
            println!("cargo:rerun-if-changed={}", file.display());
            let module = module_for(&src_root, &file)?;
            let source = fs::read_to_string(&file)?;
            let outcome = scan::scan_source(&module, &source);
            for issue in &outcome.issues {
                println!("cargo:warning={}:{}: {}", file.display(), issue.line, issue.message);
            }
            declarations.extend(outcome.declarations);
        }
    } else {
        println!(
            "cargo:warning=kind scan directory {} does not exist; the generated kind table is empty",
            scan_dir.display()
        );
    }

    for name in scan::duplicate_names(&declarations) {
        println!(
            "cargo:warning=kind `{}` is declared more than once; the first declaration wins",
            name
        );
    }

    let rendered = scan::render_table(&relative_dir, &declarations);
    let out_file = PathBuf::from(env::var("OUT_DIR")?).join(GENERATED_FILE);
    // Skip the write when nothing changed so dependents are not rebuilt.
    if fs::read_to_string(&out_file).ok().as_deref() != Some(rendered.as_str()) {
        fs::write(&out_file, rendered)?;
    }
    Ok(())
}

fn source_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|entry| entry.into_path())
        .collect()
}

fn module_for(src_root: &Path, file: &Path) -> Result<String, Box<dyn Error>> {
    let relative = file
        .strip_prefix(src_root)
        .map_err(|_| format!("{} is outside {}", file.display(), src_root.display()))?;
    let components: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    let components: Vec<&str> = components.iter().map(String::as_str).collect();
    Ok(scan::module_path(&components))
}
