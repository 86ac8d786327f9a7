//! Action definitions: dependencies, fixture requirements and phase functions.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fixtures::Fixtures;
use crate::ordered_set::OrderedSet;

/// The four lifecycle phases of an action.
///
/// Forward phases run on the way to a target:
/// - `setup`: act on the subject and mirror the change in the model.
/// - `assert`: check the subject against the model.
///
/// Reverse phases run while moving away from a target:
/// - `teardown`: undo `setup` on the subject and in the model.
/// - `done`: check the subject tore down correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Setup,
    Assert,
    Teardown,
    Done,
}

impl PhaseName {
    pub const FORWARD: [PhaseName; 2] = [PhaseName::Setup, PhaseName::Assert];
    pub const REVERSE: [PhaseName; 2] = [PhaseName::Teardown, PhaseName::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::Setup => "setup",
            PhaseName::Assert => "assert",
            PhaseName::Teardown => "teardown",
            PhaseName::Done => "done",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a phase function is handed.
pub struct PhaseContext<S> {
    /// The model as it stood before this phase.
    pub model: Value,
    pub fixtures: Arc<Fixtures>,
    /// Opaque handle on the subject under test.
    pub session: S,
}

impl<S> PhaseContext<S> {
    pub fn fixture(&self, key: &str) -> Option<&Value> {
        self.fixtures.get(key)
    }

    pub fn fixture_str(&self, key: &str) -> Option<&str> {
        self.fixtures.get(key).and_then(Value::as_str)
    }
}

/// A phase function: takes the current model and returns the next one.
///
/// Closures of the shape `Fn(PhaseContext<S>) -> impl Future<Output =
/// anyhow::Result<Value>>` implement this trait.
#[async_trait]
pub trait Phase<S>: Send + Sync {
    async fn run(&self, ctx: PhaseContext<S>) -> anyhow::Result<Value>;
}

#[async_trait]
impl<S, F, Fut> Phase<S> for F
where
    S: Send + 'static,
    F: Fn(PhaseContext<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn run(&self, ctx: PhaseContext<S>) -> anyhow::Result<Value> {
        (self)(ctx).await
    }
}

/// Wrap a side-effect-only phase so it hands the incoming model on unchanged.
///
/// ```ignore
/// Action::new("open app").assert(effect(|ctx: PhaseContext<Session>| async move {
///     anyhow::ensure!(ctx.session.is_open(), "App did not open");
///     Ok(())
/// }))
/// ```
pub fn effect<S, F, Fut>(
    f: F,
) -> impl Fn(PhaseContext<S>) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync + 'static
where
    S: Send + 'static,
    F: Fn(PhaseContext<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    move |ctx: PhaseContext<S>| {
        let model = ctx.model.clone();
        let pending = f(ctx);
        async move {
            pending.await?;
            Ok(model)
        }
        .boxed()
    }
}

/// The phases of one action. A missing phase is the identity transform.
pub struct PhaseSet<S> {
    setup: Option<Arc<dyn Phase<S>>>,
    assert: Option<Arc<dyn Phase<S>>>,
    teardown: Option<Arc<dyn Phase<S>>>,
    done: Option<Arc<dyn Phase<S>>>,
}

impl<S> PhaseSet<S> {
    pub fn get(&self, phase: PhaseName) -> Option<&Arc<dyn Phase<S>>> {
        match phase {
            PhaseName::Setup => self.setup.as_ref(),
            PhaseName::Assert => self.assert.as_ref(),
            PhaseName::Teardown => self.teardown.as_ref(),
            PhaseName::Done => self.done.as_ref(),
        }
    }

    fn slot(&mut self, phase: PhaseName) -> &mut Option<Arc<dyn Phase<S>>> {
        match phase {
            PhaseName::Setup => &mut self.setup,
            PhaseName::Assert => &mut self.assert,
            PhaseName::Teardown => &mut self.teardown,
            PhaseName::Done => &mut self.done,
        }
    }

    pub fn defined(&self) -> Vec<PhaseName> {
        PhaseName::FORWARD
            .into_iter()
            .chain(PhaseName::REVERSE)
            .filter(|phase| self.get(*phase).is_some())
            .collect()
    }
}

impl<S> Default for PhaseSet<S> {
    fn default() -> Self {
        Self {
            setup: None,
            assert: None,
            teardown: None,
            done: None,
        }
    }
}

impl<S> fmt::Debug for PhaseSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.defined()).finish()
    }
}

/// How an action computes the value of one fixture key.
#[derive(Clone)]
pub enum FixtureSpec {
    /// Always this value.
    Literal(Value),
    /// Computed from the value set by a more specific action, if any.
    Resolve(Arc<dyn Fn(Option<&Value>) -> Value + Send + Sync>),
}

impl FixtureSpec {
    pub fn literal(value: impl Into<Value>) -> Self {
        FixtureSpec::Literal(value.into())
    }

    /// Keep whatever a more specific action asked for, else use `value`.
    pub fn default_to(value: impl Into<Value>) -> Self {
        let value = value.into();
        FixtureSpec::Resolve(Arc::new(move |existing: Option<&Value>| {
            existing.cloned().unwrap_or_else(|| value.clone())
        }))
    }

    pub fn resolve<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>) -> Value + Send + Sync + 'static,
    {
        FixtureSpec::Resolve(Arc::new(f))
    }

    pub fn evaluate(&self, existing: Option<&Value>) -> Value {
        match self {
            FixtureSpec::Literal(value) => value.clone(),
            FixtureSpec::Resolve(f) => f(existing),
        }
    }
}

impl fmt::Debug for FixtureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureSpec::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            FixtureSpec::Resolve(_) => f.write_str("Resolve(..)"),
        }
    }
}

/// A named unit of test behaviour.
///
/// Built once when the suite is defined and never changed afterwards:
///
/// ```ignore
/// Action::new("write a new list item")
///     .depends_on(["open app"])
///     .fixture("text", FixtureSpec::default_to("Hello, world!"))
///     .setup(|ctx| async move { ... })
/// ```
pub struct Action<S> {
    name: String,
    dependencies: OrderedSet<String>,
    phases: PhaseSet<S>,
    fixtures: Vec<(String, FixtureSpec)>,
}

impl<S: Send + 'static> Action<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: OrderedSet::new(),
            phases: PhaseSet::default(),
            fixtures: Vec::new(),
        }
    }

    /// Add dependencies, keeping declaration order and dropping repeats.
    pub fn depends_on<I, N>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Declare a fixture requirement. Re-declaring a key replaces it in place.
    pub fn fixture(mut self, key: impl Into<String>, spec: FixtureSpec) -> Self {
        let key = key.into();
        match self.fixtures.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = spec,
            None => self.fixtures.push((key, spec)),
        }
        self
    }

    pub fn phase(mut self, phase: PhaseName, f: impl Phase<S> + 'static) -> Self {
        *self.phases.slot(phase) = Some(Arc::new(f));
        self
    }

    pub fn setup<F, Fut>(self, f: F) -> Self
    where
        F: Fn(PhaseContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.phase(PhaseName::Setup, f)
    }

    pub fn assert<F, Fut>(self, f: F) -> Self
    where
        F: Fn(PhaseContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.phase(PhaseName::Assert, f)
    }

    pub fn teardown<F, Fut>(self, f: F) -> Self
    where
        F: Fn(PhaseContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.phase(PhaseName::Teardown, f)
    }

    pub fn done<F, Fut>(self, f: F) -> Self
    where
        F: Fn(PhaseContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.phase(PhaseName::Done, f)
    }
}

impl<S> Action<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &OrderedSet<String> {
        &self.dependencies
    }

    /// Root actions have no dependencies.
    pub fn is_root(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn phases(&self) -> &PhaseSet<S> {
        &self.phases
    }

    pub fn fixture_specs(&self) -> &[(String, FixtureSpec)] {
        &self.fixtures
    }

    pub fn fixture_keys(&self) -> impl Iterator<Item = &str> {
        self.fixtures.iter().map(|(key, _)| key.as_str())
    }
}

impl<S> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("phases", &self.phases)
            .field("fixtures", &self.fixtures)
            .finish()
    }
}
