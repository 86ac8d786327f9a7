//! Fixture resolution.
//!
//! Fixtures are the input data every action on one path shares. They are
//! resolved once per runner and never change while it runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::action::Action;
use crate::error::{IntegratorError, IntegratorResult};

/// Resolved fixture values, with the action that owns each key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixtures {
    values: BTreeMap<String, Value>,
    #[serde(default)]
    owners: BTreeMap<String, String>,
}

impl Fixtures {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Name of the action that last set `key`.
    pub fn owner(&self, key: &str) -> Option<&str> {
        self.owners.get(key).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The fixtures `action` declares, with the value resolved for each.
    pub fn relevant_to<S>(&self, action: &Action<S>) -> Vec<(String, Option<Value>)> {
        action
            .fixture_keys()
            .map(|key| (key.to_string(), self.values.get(key).cloned()))
            .collect()
    }

    /// Plain JSON object of the resolved values.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

/// Build the fixtures for an action path.
///
/// The path is walked backwards so the most specific action (the target)
/// claims a key first; resolvers of less specific actions then see that value
/// and may keep it. Two actions computing different values for the same key
/// is a conflict.
pub fn build_fixtures<S>(action_path: &[Arc<Action<S>>]) -> IntegratorResult<Fixtures> {
    let mut fixtures = Fixtures::default();

    for action in action_path.iter().rev() {
        for (key, spec) in action.fixture_specs() {
            let existing = fixtures.values.get(key);
            let value = spec.evaluate(existing);

            if let Some(existing) = existing {
                if *existing != value {
                    return Err(IntegratorError::FixtureConflict {
                        key: key.clone(),
                        owner: fixtures.owners.get(key).cloned().unwrap_or_default(),
                        conflicting: action.name().to_string(),
                    });
                }
            }

            debug!(fixture = %key, action = %action.name(), value = %value, "Resolved fixture");
            fixtures.values.insert(key.clone(), value);
            fixtures
                .owners
                .insert(key.clone(), action.name().to_string());
        }
    }

    Ok(fixtures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::FixtureSpec;
    use serde_json::json;

    fn path(actions: Vec<Action<()>>) -> Vec<Arc<Action<()>>> {
        actions.into_iter().map(Arc::new).collect()
    }

    #[test]
    fn test_conflicting_literals_name_both_actions() {
        let actions = path(vec![
            Action::new("X").fixture("user", FixtureSpec::literal("tom")),
            Action::new("Y")
                .depends_on(["X"])
                .fixture("user", FixtureSpec::literal("wally")),
        ]);

        match build_fixtures(&actions).unwrap_err() {
            IntegratorError::FixtureConflict {
                key,
                owner,
                conflicting,
            } => {
                assert_eq!(key, "user");
                assert_eq!(owner, "Y");
                assert_eq!(conflicting, "X");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_equal_literals_agree() {
        let actions = path(vec![
            Action::new("X").fixture("user", FixtureSpec::literal("tom")),
            Action::new("Y")
                .depends_on(["X"])
                .fixture("user", FixtureSpec::literal("tom")),
        ]);

        let fixtures = build_fixtures(&actions).unwrap();
        assert_eq!(fixtures.get("user"), Some(&json!("tom")));
        assert_eq!(fixtures.owner("user"), Some("X"));
    }

    #[test]
    fn test_default_yields_to_more_specific_action() {
        let actions = path(vec![
            Action::new("write").fixture("text", FixtureSpec::default_to("Hello, world!")),
            Action::new("try empty")
                .depends_on(["write"])
                .fixture("text", FixtureSpec::literal("")),
        ]);

        let fixtures = build_fixtures(&actions).unwrap();
        assert_eq!(fixtures.get("text"), Some(&json!("")));

        let fallback = build_fixtures(&actions[..1]).unwrap();
        assert_eq!(fallback.get("text"), Some(&json!("Hello, world!")));
    }

    #[test]
    fn test_resolver_sees_accumulated_value() {
        let actions = path(vec![
            Action::new("root").fixture(
                "count",
                FixtureSpec::resolve(|existing: Option<&Value>| {
                    existing.cloned().unwrap_or(json!(1))
                }),
            ),
            Action::new("leaf")
                .depends_on(["root"])
                .fixture("count", FixtureSpec::literal(3))
                .fixture("user", FixtureSpec::literal("tom")),
        ]);

        let fixtures = build_fixtures(&actions).unwrap();
        assert_eq!(fixtures.to_value(), json!({ "count": 3, "user": "tom" }));
        assert_eq!(
            fixtures.relevant_to(&actions[0]),
            vec![("count".to_string(), Some(json!(3)))]
        );
    }

    #[test]
    fn test_forcing_resolver_conflicts() {
        let actions = path(vec![
            Action::new("root").fixture("mode", FixtureSpec::resolve(|_: Option<&Value>| json!("fast"))),
            Action::new("leaf")
                .depends_on(["root"])
                .fixture("mode", FixtureSpec::literal("slow")),
        ]);

        assert!(matches!(
            build_fixtures(&actions),
            Err(IntegratorError::FixtureConflict { .. })
        ));
    }
}
