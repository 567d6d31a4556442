//! Plan and outcome rendering

use std::collections::HashMap;

use colored::Colorize;
use userpool_core::effect::Effect;
use userpool_core::plan::Plan;
use userpool_core::resource::Value;
use userpool_core::schema::ResourceSchema;

pub const SENSITIVE: &str = "(sensitive)";

pub fn print_plan(plan: &Plan, schemas: &HashMap<String, ResourceSchema>) {
    if plan.is_empty() {
        println!("{}", "No changes. Clients are up-to-date.".green());
        return;
    }

    println!("{}", "Execution Plan:".cyan().bold());
    println!();

    for effect in plan.effects() {
        let schema = schemas.get(&effect.resource_id().resource_type);
        print_effect(effect, schema);
    }

    println!();
    let summary = plan.summary();
    println!(
        "Plan: {} to create, {} to update, {} to replace, {} to delete.",
        summary.create.to_string().green(),
        summary.update.to_string().yellow(),
        summary.replace.to_string().magenta(),
        summary.delete.to_string().red()
    );
}

fn print_effect(effect: &Effect, schema: Option<&ResourceSchema>) {
    let symbol = match effect {
        Effect::Create(_) => "+".green().bold(),
        Effect::Update { .. } => "~".yellow().bold(),
        Effect::Replace { .. } => "-/+".magenta().bold(),
        Effect::Delete { .. } => "-".red().bold(),
    };
    println!(
        "  {} {}",
        symbol,
        effect.resource_id().to_string().cyan().bold()
    );

    match effect {
        Effect::Create(resource) => {
            for key in sorted_keys(resource.attributes.keys()) {
                let value = format_attribute(schema, key, &resource.attributes[key]);
                println!("      {}: {}", key, value.green());
            }
        }
        Effect::Update {
            from,
            to,
            changed_attributes,
            ..
        }
        | Effect::Replace {
            from,
            to,
            changed_attributes,
        } => {
            for key in changed_attributes {
                let old = from
                    .attributes
                    .get(key)
                    .map(|v| format_attribute(schema, key, v))
                    .unwrap_or_else(|| "(none)".to_string());
                let new = to
                    .attributes
                    .get(key)
                    .map(|v| format_attribute(schema, key, v))
                    .unwrap_or_else(|| "(none)".to_string());
                let forces = if schema.is_some_and(|s| s.is_force_new(key)) {
                    " (forces replacement)".magenta().to_string()
                } else {
                    String::new()
                };
                println!("      {}: {} → {}{}", key, old.red(), new.green(), forces);
            }
        }
        Effect::Delete { identifier, .. } => {
            println!("      identifier: {}", identifier.red());
        }
    }
}

/// `name` first, then alphabetical; internal `_` keys are hidden
fn sorted_keys<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<&'a String> {
    let mut keys: Vec<_> = keys.filter(|k| !k.starts_with('_')).collect();
    keys.sort_by(|a, b| match (a.as_str(), b.as_str()) {
        ("name", _) => std::cmp::Ordering::Less,
        (_, "name") => std::cmp::Ordering::Greater,
        _ => a.cmp(b),
    });
    keys
}

/// Render a value for the terminal, masking sensitive attributes
pub fn format_attribute(schema: Option<&ResourceSchema>, key: &str, value: &Value) -> String {
    if schema.is_some_and(|s| s.is_sensitive(key)) {
        SENSITIVE.to_string()
    } else {
        format_value(value)
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let strs: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", strs.join(", "))
        }
        Value::Map(map) => {
            let mut strs: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            strs.sort();
            format!("{{{}}}", strs.join(", "))
        }
    }
}

pub fn format_effect(effect: &Effect) -> String {
    let verb = match effect {
        Effect::Create(_) => "Create",
        Effect::Update { .. } => "Update",
        Effect::Replace { .. } => "Replace",
        Effect::Delete { .. } => "Delete",
    };
    format!("{} {}", verb, effect.resource_id())
}
