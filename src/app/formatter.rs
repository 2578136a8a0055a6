use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::sync::LazyLock;

/// Object keys spelled `include_`, `include__`, ... at the start of a line.
/// Pretty output puts every key first on its line, so string values never match.
static PLACEHOLDER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^([ ]*)"include_+":"#).expect("placeholder key pattern is valid")
});

pub struct OutputGenerator;

impl OutputGenerator {
    /// Pretty-prints `value` with 4-space indentation and folds placeholder
    /// include keys back to `include`.
    pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        value
            .serialize(&mut ser)
            .context("Failed to serialize JSON")?;
        let text = String::from_utf8(buf).context("Serialized JSON is not valid UTF-8")?;

        let mut out = PLACEHOLDER_KEY
            .replace_all(&text, r#"${1}"include":"#)
            .into_owned();
        out.push('\n');
        Ok(out)
    }

    /// Flattens `(prefix, values)` pairs into `prefix+value` tokens joined by spaces,
    /// e.g. `[("-D", ["A", "B"])]` becomes `-DA -DB`.
    pub fn options_string(options: &[(&str, &[String])]) -> String {
        options
            .iter()
            .flat_map(|(prefix, values)| values.iter().map(move |v| format!("{}{}", prefix, v)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
