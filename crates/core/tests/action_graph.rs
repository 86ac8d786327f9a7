//! Path and transition planning over a larger action graph.
//!
//! Two disconnected components: A..J (diamonds and a multi-parent join) and
//! K..N, joined again by O.

use integrator_core::{
    build_action_path, build_fixtures, common_prefix, plan, Action, FixtureSpec, IntegratorError,
    Suite,
};
use serde_json::json;
use test_case::test_case;

fn arbitrary_complex_graph() -> Suite<()> {
    Suite::new(
        [
            Action::new("A"),
            Action::new("B").depends_on(["A"]),
            Action::new("C").depends_on(["A"]),
            Action::new("D").depends_on(["B"]),
            Action::new("E").depends_on(["B"]),
            Action::new("F").depends_on(["E", "C"]),
            Action::new("G").depends_on(["F"]),
            Action::new("H").depends_on(["E"]),
            Action::new("I").depends_on(["D", "H"]),
            Action::new("J").depends_on(["H"]),
            Action::new("K"),
            Action::new("L").depends_on(["K"]),
            Action::new("M").depends_on(["K"]),
            Action::new("N").depends_on(["L", "M"]),
            Action::new("O").depends_on(["J", "G", "N"]),
        ],
        json!({}),
    )
    .expect("valid suite")
}

#[test_case("A", &["A"])]
#[test_case("B", &["A", "B"])]
#[test_case("C", &["A", "C"])]
#[test_case("D", &["A", "B", "D"])]
#[test_case("E", &["A", "B", "E"])]
#[test_case("F", &["A", "B", "E", "C", "F"])]
#[test_case("G", &["A", "B", "E", "C", "F", "G"])]
#[test_case("H", &["A", "B", "E", "H"])]
#[test_case("I", &["A", "B", "D", "E", "H", "I"])]
#[test_case("J", &["A", "B", "E", "H", "J"])]
#[test_case("K", &["K"])]
#[test_case("L", &["K", "L"])]
#[test_case("M", &["K", "M"])]
#[test_case("N", &["K", "L", "M", "N"])]
#[test_case("O", &["A", "B", "E", "H", "J", "C", "F", "G", "K", "L", "M", "N", "O"])]
fn action_path(target: &str, expected: &[&str]) {
    let suite = arbitrary_complex_graph();
    let path = build_action_path(suite.registry(), target).unwrap();
    assert_eq!(path.as_slice(), expected);
}

#[test]
fn action_paths_are_topologically_valid() {
    let suite = arbitrary_complex_graph();
    for action in suite.actions() {
        let path = build_action_path(suite.registry(), action.name()).unwrap();
        let position = |name: &str| path.iter().position(|n| n == name).unwrap();

        assert_eq!(path.as_slice().last().map(String::as_str), Some(action.name()));
        for step in path.iter() {
            let step = suite.action(step).unwrap();
            for dependency in step.dependencies() {
                assert!(
                    position(dependency.as_str()) < position(step.name()),
                    "{} must come before {} on the path to {}",
                    dependency,
                    step.name(),
                    action.name()
                );
            }
        }
    }
}

#[test]
fn action_paths_are_deterministic() {
    let first = build_action_path(arbitrary_complex_graph().registry(), "O").unwrap();
    let second = build_action_path(arbitrary_complex_graph().registry(), "O").unwrap();
    assert_eq!(first, second);
}

#[test_case("C", "D", &["D", "B"], &["C"])]
#[test_case("E", "D", &["D"], &["E"])]
#[test_case("I", "G", &["G", "F", "C", "E"], &["D", "E", "H", "I"])]
#[test_case("J", "H", &[], &["J"])]
#[test_case("H", "J", &["J"], &[])]
#[test_case("N", "M", &["M"], &["L", "M", "N"])]
#[test_case("K", "O", &["O", "N", "M", "L", "K", "G", "F", "C", "J", "H", "E", "B", "A"], &["K"])]
fn minimal_action_paths(target: &str, previous: &str, teardown: &[&str], setup: &[&str]) {
    let suite = arbitrary_complex_graph();
    let target = suite.runner(target).unwrap();
    let previous = suite.runner(previous).unwrap();

    let plan = plan(&target, Some(&previous));
    assert_eq!(plan.teardown, teardown);
    assert_eq!(plan.setup, setup);
}

#[test]
fn common_prefix_examples() {
    assert_eq!(common_prefix(&[1, 2, 3], &[1, 2, 4]), vec![1, 2]);
    assert_eq!(common_prefix(&[2, 2, 3], &[1, 2, 4]), Vec::<i32>::new());
    assert_eq!(common_prefix::<i32>(&[], &[]), Vec::<i32>::new());
}

#[test]
fn unknown_dependency_is_reported_with_its_parent() {
    let suite: Suite<()> = Suite::new(
        [Action::new("A"), Action::new("F").depends_on(["A", "Z"])],
        json!({}),
    )
    .unwrap();

    let err = suite.runner("F").unwrap_err();
    match err {
        IntegratorError::UnknownAction { name, required_by } => {
            assert_eq!(name, "Z");
            assert_eq!(required_by.as_deref(), Some("F"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_action_names_are_rejected() {
    let err = Suite::<()>::new([Action::new("A"), Action::new("A")], json!({})).unwrap_err();
    assert!(matches!(err, IntegratorError::DuplicateAction(name) if name == "A"));
}

#[test]
fn fixture_conflicts_name_both_actions() {
    let suite: Suite<()> = Suite::new(
        [
            Action::new("login as tom").fixture("user", FixtureSpec::literal("tom")),
            Action::new("login as wally")
                .depends_on(["login as tom"])
                .fixture("user", FixtureSpec::literal("wally")),
            Action::new("greet tom")
                .depends_on(["login as tom"])
                .fixture("user", FixtureSpec::literal("tom")),
        ],
        json!({}),
    )
    .unwrap();

    let err = suite.runner("login as wally").unwrap_err();
    assert_eq!(
        err.to_string(),
        "The required \"user\" fixture for action \"login as tom\" conflicts with action \"login as wally\""
    );

    let runner = suite.runner("greet tom").unwrap();
    assert_eq!(runner.fixtures().get("user"), Some(&json!("tom")));
    assert_eq!(runner.fixtures().owner("user"), Some("login as tom"));

    let fixtures = build_fixtures(runner.action_path()).unwrap();
    assert_eq!(fixtures.to_value(), json!({ "user": "tom" }));
}
