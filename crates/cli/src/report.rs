use argkit::{ArgParser, ParseOutcome, Value};
use indexmap::IndexMap;
use serde::Serialize;

/// What a parse produced, per argument, in registration order.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
    pub values: IndexMap<String, ArgReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rest: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgReport {
    pub kind: &'static str,
    pub initialized: bool,
    pub value: serde_json::Value,
}

fn to_json(value: Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s),
        Value::Int(n) => serde_json::Value::from(n),
        Value::Bool(b) => serde_json::Value::Bool(b),
    }
}

impl ParseReport {
    pub fn new(parser: &ArgParser, outcome: &ParseOutcome) -> Self {
        let outcome_name = match outcome {
            ParseOutcome::Valid => "valid",
            ParseOutcome::Help => "help",
            ParseOutcome::Invalid(_) => "invalid",
        };

        let values = parser
            .arguments()
            .map(|arg| {
                let snapshot = arg.cell().snapshot();
                let value = if arg.is_multi_value() {
                    let items = if arg.count() == 0 {
                        Vec::new()
                    } else {
                        snapshot.into_iter().map(to_json).collect()
                    };
                    serde_json::Value::Array(items)
                } else {
                    snapshot
                        .into_iter()
                        .next()
                        .map(to_json)
                        .unwrap_or(serde_json::Value::Null)
                };
                let report = ArgReport {
                    kind: arg.kind().as_str(),
                    initialized: arg.is_initialized(),
                    value,
                };
                (arg.long_name().to_string(), report)
            })
            .collect();

        Self {
            outcome: outcome_name,
            failures: outcome.failures().iter().map(ToString::to_string).collect(),
            values,
            rest: parser.rest().to_vec(),
        }
    }

    /// One `name = value` line per argument, failures last.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (name, arg) in &self.values {
            let marker = if arg.initialized { "" } else { " (unset)" };
            out.push_str(&format!("{name} = {}{marker}\n", arg.value));
        }
        for extra in &self.rest {
            out.push_str(&format!("unused token: {extra}\n"));
        }
        for failure in &self.failures {
            out.push_str(&format!("error: {failure}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_values_in_registration_order() {
        let mut parser = ArgParser::new("app");
        parser
            .add_int_argument("n", "")
            .unwrap()
            .multi_value()
            .unwrap()
            .add_string_argument("name", "")
            .unwrap()
            .add_flag("quiet", "")
            .unwrap();
        let outcome = parser.parse(["--n=1", "--n=2", "--quiet", "extra"]).unwrap();
        let report = ParseReport::new(&parser, &outcome);

        assert_eq!(report.outcome, "invalid");
        assert_eq!(report.failures, ["argument '--name' requires a value"]);
        let names: Vec<&str> = report.values.keys().map(String::as_str).collect();
        assert_eq!(names, ["n", "name", "quiet"]);
        assert_eq!(report.values["n"].value, serde_json::json!([1, 2]));
        assert_eq!(report.values["name"].value, serde_json::json!(""));
        assert!(!report.values["name"].initialized);
        assert_eq!(report.rest, ["extra"]);

        let text = report.to_text();
        assert!(text.starts_with("n = [1,2]\nname = \"\" (unset)\nquiet = true\n"));
        assert!(text.ends_with("error: argument '--name' requires a value\n"));
    }
}
