//! In-memory list app and the suite that drives it.
//!
//! The app has a text input, a submit button that turns the input into a list
//! item, and a remove button per item. Empty input is ignored and input longer
//! than the configured maximum is refused and left in place.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, ensure, Result};
use integrator_core::{effect, Action, FixtureSpec, IntegratorResult, PhaseContext, Suite};
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::config::TargetConfig;

pub const APP_TITLE: &str = "List App";
pub const DEFAULT_MAX_ITEM_LENGTH: usize = 40;

/// Target settings the demo app understands.
#[derive(Debug, Clone)]
pub struct DemoSettings {
    /// Simulated delay per command.
    pub latency: Duration,
    pub max_item_length: usize,
    /// Fault injection: accept items over the maximum length.
    pub accept_long_items: bool,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            latency: Duration::ZERO,
            max_item_length: DEFAULT_MAX_ITEM_LENGTH,
            accept_long_items: false,
        }
    }
}

impl DemoSettings {
    pub fn from_target(target: &TargetConfig) -> Self {
        let defaults = Self::default();
        Self {
            latency: target
                .get_u64("latency_ms")
                .map(Duration::from_millis)
                .unwrap_or(defaults.latency),
            max_item_length: target
                .get_u64("max_item_length")
                .map(|n| n as usize)
                .unwrap_or(defaults.max_item_length),
            accept_long_items: target
                .get_bool("accept_long_items")
                .unwrap_or(defaults.accept_long_items),
        }
    }
}

#[derive(Debug, Default)]
struct ListApp {
    open: bool,
    create_text: String,
    items: Vec<String>,
}

/// Handle on one running list app. Clones share the app.
#[derive(Debug, Clone)]
pub struct ListAppSession {
    app: Arc<Mutex<ListApp>>,
    settings: Arc<DemoSettings>,
}

impl ListAppSession {
    pub fn new(settings: DemoSettings) -> Self {
        Self {
            app: Arc::new(Mutex::new(ListApp::default())),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &DemoSettings {
        &self.settings
    }

    async fn command<T>(&self, f: impl FnOnce(&mut ListApp) -> Result<T>) -> Result<T> {
        if !self.settings.latency.is_zero() {
            tokio::time::sleep(self.settings.latency).await;
        }
        let mut app = self.app.lock();
        f(&mut app)
    }

    async fn open_command<T>(&self, f: impl FnOnce(&mut ListApp) -> Result<T>) -> Result<T> {
        self.command(|app| {
            ensure!(app.open, "App is not open");
            f(app)
        })
        .await
    }

    /// Load the app fresh.
    pub async fn open(&self) -> Result<()> {
        self.command(|app| {
            *app = ListApp {
                open: true,
                ..ListApp::default()
            };
            Ok(())
        })
        .await
    }

    pub async fn close(&self) -> Result<()> {
        self.command(|app| {
            app.open = false;
            Ok(())
        })
        .await
    }

    pub async fn title(&self) -> Result<String> {
        self.open_command(|_| Ok(APP_TITLE.to_string())).await
    }

    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.open_command(|app| {
            app.create_text.push_str(text);
            Ok(())
        })
        .await
    }

    pub async fn clear_text(&self) -> Result<()> {
        self.open_command(|app| {
            app.create_text.clear();
            Ok(())
        })
        .await
    }

    pub async fn create_text(&self) -> Result<String> {
        self.open_command(|app| Ok(app.create_text.clone())).await
    }

    pub async fn submit(&self) -> Result<()> {
        let max = self.settings.max_item_length;
        let accept_long = self.settings.accept_long_items;
        self.open_command(|app| {
            let length = app.create_text.chars().count();
            if length == 0 || (length > max && !accept_long) {
                return Ok(());
            }
            let item = std::mem::take(&mut app.create_text);
            app.items.push(item);
            Ok(())
        })
        .await
    }

    pub async fn items(&self) -> Result<Vec<String>> {
        self.open_command(|app| Ok(app.items.clone())).await
    }

    pub async fn remove_last(&self) -> Result<()> {
        self.open_command(|app| {
            if app.items.pop().is_none() {
                bail!("No list item to remove");
            }
            Ok(())
        })
        .await
    }
}

type Ctx = PhaseContext<ListAppSession>;

pub fn initial_model() -> Value {
    json!({ "create_text": "", "list": [] })
}

fn model_text(model: &Value) -> &str {
    model["create_text"].as_str().unwrap_or_default()
}

fn model_list(model: &Value) -> Vec<String> {
    model["list"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

async fn compare_create_text(ctx: Ctx) -> Result<()> {
    let text = ctx.session.create_text().await?;
    ensure!(
        text == model_text(&ctx.model),
        "Create text is wrong: app has {:?}, model has {:?}",
        text,
        model_text(&ctx.model)
    );
    Ok(())
}

async fn compare_list(ctx: Ctx) -> Result<()> {
    let items = ctx.session.items().await?;
    let expected = model_list(&ctx.model);
    ensure!(
        items == expected,
        "Rendered list items do not match model: app has {:?}, model has {:?}",
        items,
        expected
    );
    Ok(())
}

/// The list app scenarios.
pub fn suite() -> IntegratorResult<Suite<ListAppSession>> {
    Suite::new(
        [
            Action::new("open app")
                .setup(effect(|ctx: Ctx| async move { ctx.session.open().await }))
                .assert(effect(|ctx: Ctx| async move {
                    let title = ctx.session.title().await?;
                    ensure!(title.trim() == APP_TITLE, "Title is wrong: {:?}", title);
                    Ok(())
                })),
            Action::new("write a new list item")
                .depends_on(["open app"])
                .fixture("text", FixtureSpec::default_to("Hello, world!"))
                .setup(|ctx: Ctx| async move {
                    let text = ctx.fixture_str("text").unwrap_or_default().to_string();
                    ctx.session.type_text(&text).await?;
                    let mut model = ctx.model;
                    model["create_text"] = json!(text);
                    Ok(model)
                })
                .assert(effect(compare_create_text))
                .teardown(|ctx: Ctx| async move {
                    ctx.session.clear_text().await?;
                    let mut model = ctx.model;
                    model["create_text"] = json!("");
                    Ok(model)
                })
                .done(effect(compare_create_text)),
            Action::new("add new list item")
                .depends_on(["write a new list item"])
                .setup(|ctx: Ctx| async move {
                    ctx.session.submit().await?;
                    let max = ctx.session.settings().max_item_length;
                    let text = model_text(&ctx.model).to_string();
                    let length = text.chars().count();

                    let mut model = ctx.model;
                    if length > max {
                        return Ok(model);
                    }
                    if length > 0 {
                        if let Some(list) = model["list"].as_array_mut() {
                            list.push(json!(text));
                        }
                    }
                    model["create_text"] = json!("");
                    Ok(model)
                })
                .assert(effect(compare_create_text)),
            Action::new("try adding empty item")
                .depends_on(["add new list item"])
                .fixture("text", FixtureSpec::literal(""))
                .assert(effect(compare_list)),
            Action::new("try adding too-long item")
                .depends_on(["add new list item"])
                .fixture(
                    "text",
                    FixtureSpec::literal("This item is too long and will not be accepted"),
                )
                .assert(effect(compare_list)),
            Action::new("remove the last list item")
                .depends_on(["add new list item"])
                .fixture("text", FixtureSpec::literal("Will be removed!"))
                .setup(|ctx: Ctx| async move {
                    ctx.session.remove_last().await?;
                    let mut model = ctx.model;
                    if let Some(list) = model["list"].as_array_mut() {
                        list.pop();
                    }
                    Ok(model)
                })
                .assert(effect(compare_list)),
        ],
        initial_model(),
    )
}
