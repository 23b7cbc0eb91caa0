use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use std::{env, fs};

const DEFAULT_LOCALE: &str = "en-US";
const LOCALES_DIR: &str = "locales";

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(nested) => flatten(&path, nested, out),
            toml::Value::String(text) => {
                out.insert(path, text.clone());
            }
            other => panic!("locale entry `{path}` must be a string, found {other}"),
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed={LOCALES_DIR}");

    let mut locales = BTreeMap::new();
    let entries = fs::read_dir(LOCALES_DIR).expect("locales directory is readable");
    for entry in entries {
        let path = entry.expect("locale entry is readable").path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        println!("cargo:rerun-if-changed={}", path.display());

        let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let content = fs::read_to_string(&path).expect("locale file is readable");
        let table = content
            .parse::<toml::Table>()
            .unwrap_or_else(|error| panic!("invalid locale file {}: {error}", path.display()));

        let mut messages = BTreeMap::new();
        flatten("", &table, &mut messages);
        locales.insert(locale.to_string(), messages);
    }

    let mut generated = String::new();
    writeln!(generated, "pub const DEFAULT_LOCALE: &str = {DEFAULT_LOCALE:?};").unwrap();
    writeln!(generated, "pub const LOCALES: &[(&str, &[(&str, &str)])] = &[").unwrap();
    for (locale, messages) in &locales {
        writeln!(generated, "    ({locale:?}, &[").unwrap();
        for (key, text) in messages {
            writeln!(generated, "        ({key:?}, {text:?}),").unwrap();
        }
        writeln!(generated, "    ]),").unwrap();
    }
    writeln!(generated, "];").unwrap();

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    fs::write(Path::new(&out_dir).join("tagbox_i18n_generated.rs"), generated)
        .expect("generated catalog is writable");
}
