use anyhow::{Context, Result, bail};
use argkit::{ArgError, ArgKind, ArgParser, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCHEMA_NAME: &str = "argkit.json";

/// JSON declaration of a program's arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<HelpDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpDef {
    pub short: String,
    pub long: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgDef {
    /// `string`, `int` or `bool`.
    pub kind: String,
    pub long: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub positional: bool,
    #[serde(default)]
    pub multi_value: bool,
    /// Implies `multiValue`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_values: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl Schema {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("schema not found: {}", path.display());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse schema JSON: {}", path.display()))
    }

    /// Configure a parser from this schema.
    ///
    /// Modifiers are applied in the order multi-value, positional, default,
    /// so a default on a multi-value argument is repeated `minValues` times.
    pub fn build(&self) -> Result<ArgParser> {
        let mut parser = ArgParser::new(self.name.as_str());

        if let Some(help) = &self.help {
            parser
                .add_help(short_char(&help.short)?, &help.long, &help.description)
                .with_context(|| format!("failed to declare help trigger '--{}'", help.long))?;
        }

        for def in &self.args {
            declare(&mut parser, def)
                .with_context(|| format!("failed to declare argument '--{}'", def.long))?;
        }

        tracing::debug!(
            name = %self.name,
            arguments = self.args.len(),
            "configured parser from schema"
        );
        Ok(parser)
    }
}

fn declare(parser: &mut ArgParser, def: &ArgDef) -> Result<(), ArgError> {
    let kind: ArgKind = def.kind.parse()?;
    let short = def.short.as_deref().map(short_char).transpose()?;
    parser.add_argument_of_kind(kind, (short, def.long.clone()), &def.description)?;

    match def.min_values {
        Some(min) => {
            parser.multi_value_min(min)?;
        }
        None if def.multi_value => {
            parser.multi_value()?;
        }
        None => {}
    }
    if def.positional {
        parser.positional()?;
    }
    if let Some(default) = &def.default {
        parser.default(json_to_value(default)?)?;
    }
    Ok(())
}

/// Accepts `v` or `-v`.
fn short_char(raw: &str) -> Result<char, ArgError> {
    let trimmed = raw.trim();
    let name = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ArgError::Configuration(format!(
            "short name must be a single character, got '{raw}'"
        ))),
    }
}

fn json_to_value(json: &serde_json::Value) -> Result<Value, ArgError> {
    match json {
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::Int)
            .ok_or_else(|| ArgError::Configuration(format!("default {n} is not a 32-bit integer"))),
        other => Err(ArgError::Configuration(format!(
            "unsupported default value: {other}"
        ))),
    }
}

pub fn write_default_schema(project_dir: &Path, overwrite: bool) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_SCHEMA_NAME);
    if dest.exists() && !overwrite {
        bail!("{} already exists", dest.display());
    }

    let schema = Schema {
        name: "my-program".to_string(),
        help: Some(HelpDef {
            short: "h".to_string(),
            long: "help".to_string(),
            description: "Describe what my-program does".to_string(),
        }),
        args: vec![
            ArgDef {
                kind: "string".to_string(),
                long: "input".to_string(),
                short: Some("i".to_string()),
                description: "Files to read".to_string(),
                positional: true,
                min_values: Some(1),
                ..Default::default()
            },
            ArgDef {
                kind: "int".to_string(),
                long: "jobs".to_string(),
                short: Some("j".to_string()),
                description: "Worker count".to_string(),
                default: Some(serde_json::Value::from(1)),
                ..Default::default()
            },
            ArgDef {
                kind: "bool".to_string(),
                long: "verbose".to_string(),
                short: Some("v".to_string()),
                description: "Print progress".to_string(),
                ..Default::default()
            },
        ],
    };

    let bytes = serde_json::to_vec_pretty(&schema).context("failed to serialize schema")?;
    let mut out = String::from_utf8(bytes).context("schema is not valid UTF-8")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if overwrite && dest.exists() {
        fs::remove_file(&dest).with_context(|| format!("failed to remove {}", dest.display()))?;
    }
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}
