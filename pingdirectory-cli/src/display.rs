//! Terminal rendering of plans and states

use std::collections::HashMap;

use colored::Colorize;
use pingdirectory_core::effect::Effect;
use pingdirectory_core::plan::Plan;
use pingdirectory_core::resource::{State, Value};

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Unknown => "(known after apply)".to_string(),
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Set(items) => {
            let strs: Vec<_> = items.iter().map(|s| format!("\"{}\"", s)).collect();
            format!("[{}]", strs.join(", "))
        }
    }
}

pub fn format_effect(effect: &Effect) -> String {
    match effect {
        Effect::Read(r) => format!("Read {}", r.id),
        Effect::Create(r) => format!("Create {}", r.id),
        Effect::Update { id, .. } => format!("Update {}", id),
        Effect::Replace { id, .. } => format!("Replace {}", id),
        Effect::Delete { id, .. } => format!("Delete {}", id),
    }
}

fn sorted(attributes: &HashMap<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = attributes.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Attribute lines shown for a created resource
fn create_lines(attributes: &HashMap<String, Value>) -> Vec<String> {
    sorted(attributes)
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| format!("{}: {}", k, format_value(v)))
        .collect()
}

/// Attribute lines shown for an updated resource
fn change_lines(from: &State, to: &HashMap<String, Value>, changed: &[String]) -> Vec<String> {
    changed
        .iter()
        .map(|name| {
            let after = to.get(name).unwrap_or(&Value::Null);
            format!(
                "{}: {} → {}",
                name,
                format_value(from.attribute(name)),
                format_value(after)
            )
        })
        .collect()
}

pub fn print_plan(plan: &Plan) {
    if plan.has_no_changes() {
        println!("{}", "No changes. Configuration is up-to-date.".green());
        return;
    }

    println!("{}", "Execution Plan:".cyan().bold());
    println!();

    for effect in plan.effects() {
        match effect {
            Effect::Read(resource) => {
                println!("  {} {}", "<=".cyan().bold(), resource.id);
            }
            Effect::Create(resource) => {
                println!("  {} {}", "+".green().bold(), resource.id);
                for line in create_lines(&resource.attributes) {
                    println!("      {}", line.green());
                }
            }
            Effect::Update {
                id,
                from,
                to,
                changed_attributes,
            } => {
                println!("  {} {}", "~".yellow().bold(), id);
                for line in change_lines(from, &to.attributes, changed_attributes) {
                    println!("      {}", line.yellow());
                }
            }
            Effect::Replace { id, to, .. } => {
                println!("  {} {} (forces replacement)", "-/+".magenta().bold(), id);
                for line in create_lines(&to.attributes) {
                    println!("      {}", line.magenta());
                }
            }
            Effect::Delete { id, identifier } => {
                println!("  {} {} ({})", "-".red().bold(), id, identifier);
            }
        }
    }

    println!();
    println!("{}", plan.summary().to_string().bold());
}

pub fn print_state(state: &State) {
    println!("{}", state.id.to_string().bold());
    if let Some(identifier) = &state.identifier {
        println!("  {}: {}", "identifier".dimmed(), identifier);
    }
    for (key, value) in sorted(&state.attributes) {
        println!("  {} = {}", key, format_value(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pingdirectory_core::resource::ResourceId;

    #[test]
    fn values_render_like_configuration() {
        assert_eq!(format_value(&Value::string("Email")), "\"Email\"");
        assert_eq!(format_value(&Value::Int(5)), "5");
        assert_eq!(format_value(&Value::Unknown), "(known after apply)");
        assert_eq!(format_value(&Value::set(["uid", "mail"])), "[\"mail\", \"uid\"]");
    }

    #[test]
    fn create_lines_skip_nulls() {
        let mut attributes = HashMap::new();
        attributes.insert("id".to_string(), Value::string("Email"));
        attributes.insert("description".to_string(), Value::Null);
        attributes.insert("last_updated".to_string(), Value::Unknown);

        assert_eq!(
            create_lines(&attributes),
            vec![
                "id: \"Email\"".to_string(),
                "last_updated: (known after apply)".to_string()
            ]
        );
    }

    #[test]
    fn change_lines_show_before_and_after() {
        let id = ResourceId::new("pingdirectory_identity_mapper", "email");
        let mut prior = HashMap::new();
        prior.insert("enabled".to_string(), Value::Bool(true));
        let from = State::existing(id, prior);

        let mut to = HashMap::new();
        to.insert("enabled".to_string(), Value::Bool(false));

        assert_eq!(
            change_lines(&from, &to, &["enabled".to_string()]),
            vec!["enabled: true → false".to_string()]
        );
    }

    #[test]
    fn effects_name_their_resource() {
        let effect = Effect::Delete {
            id: ResourceId::new("pingdirectory_identity_mapper", "old"),
            identifier: "Old".to_string(),
        };
        assert_eq!(
            format_effect(&effect),
            "Delete pingdirectory_identity_mapper.old"
        );
    }
}
