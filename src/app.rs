//! Interactive shell: the presentation layer over the store and the advisor.
//!
//! All state the screen shows lives in one [`AppState`] value owned by the
//! loop in [`run_shell`]. Store calls run inline on the loop. Recipe requests
//! run on a spawned task that reports back with a single
//! [`AppEvent::RecipeFinished`]; only [`apply_event`] writes the result into
//! the state and re-enables generation.
//!
//! ```text
//! stdin lines ──► handle_line ──► store / dispatch_generation ──► tokio::spawn
//!                     ▲                                              │
//!                     └──────── apply_event ◄── mpsc ◄───────────────┘
//! ```

use anyhow::Result;
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use pantry_core::advisor::{Advisor, IN_PROGRESS_MESSAGE};
use pantry_core::models::{Ingredient, IngredientFields};
use pantry_core::store::IngredientStore;
use pantry_core::PantryError;

use crate::config::Config;
use crate::inventory::{local_today, render_table};
use crate::recipe::build_advisor;
use crate::sqlite_store::SqliteIngredientStore;

const RECIPE_PLACEHOLDER: &str = "Type `generate` and the advisor will suggest a recipe here.";

const HELP: &str = "\
commands:
  list                                          show the inventory
  select <id>                                   select a row for update/delete
  add <name> | <qty> | <purchased> | <expires>  add an ingredient
  update <name> | <qty> | <purchased> | <expires>
                                                overwrite the selected row
  delete                                        delete the selected row (asks y/N)
  generate                                      ask the advisor for a recipe
  recipe                                        show the latest recipe
  help                                          this text
  quit                                          leave the shell
dates are YYYY-MM-DD; fields after the name may be left empty";

/// Everything the shell renders.
#[derive(Debug, Clone)]
pub struct AppState {
    pub inventory: Vec<Ingredient>,
    pub selected: Option<i64>,
    /// Row awaiting a `y` answer before it is deleted.
    pub pending_delete: Option<i64>,
    pub recipe_text: String,
    pub generate_enabled: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            inventory: Vec::new(),
            selected: None,
            pending_delete: None,
            recipe_text: RECIPE_PLACEHOLDER.to_string(),
            generate_enabled: true,
        }
    }
}

impl AppState {
    pub fn selected_row(&self) -> Option<&Ingredient> {
        let id = self.selected?;
        self.inventory.iter().find(|row| row.id == id)
    }
}

/// Posted by background tasks to the shell loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Recipe text or a diagnostic; either way the request is over.
    RecipeFinished(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Select(i64),
    Add(IngredientFields),
    Update(IngredientFields),
    Delete,
    Generate,
    Recipe,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parse one shell line. Errors are user-facing messages.
pub fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "" => Ok(Command::Empty),
        "list" | "ls" => Ok(Command::List),
        "select" | "sel" => rest
            .parse::<i64>()
            .map(Command::Select)
            .map_err(|_| format!("expected a numeric id, got '{}'", rest)),
        "add" => Ok(Command::Add(parse_fields(rest))),
        "update" => Ok(Command::Update(parse_fields(rest))),
        "delete" | "rm" => Ok(Command::Delete),
        "generate" | "gen" => Ok(Command::Generate),
        "recipe" => Ok(Command::Recipe),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}'; type `help`", other)),
    }
}

/// `name | quantity | purchased | expires`, trailing fields optional.
fn parse_fields(rest: &str) -> IngredientFields {
    let mut parts = rest.splitn(4, '|').map(|p| p.trim().to_string());
    let name = parts.next().unwrap_or_default();
    IngredientFields::new(name, parts.next(), parts.next(), parts.next())
}

/// Start a recipe request unless one is already running.
///
/// Returns `None` without side effects while generation is disabled.
pub fn dispatch_generation(
    state: &mut AppState,
    advisor: &Arc<Advisor>,
    events: &mpsc::UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    if !state.generate_enabled {
        return None;
    }
    state.generate_enabled = false;
    state.recipe_text = IN_PROGRESS_MESSAGE.to_string();

    let advisor = Arc::clone(advisor);
    let events = events.clone();
    Some(tokio::spawn(async move {
        let text = advisor.advise().await;
        if events.send(AppEvent::RecipeFinished(text)).is_err() {
            debug!("shell exited before the recipe arrived");
        }
    }))
}

pub fn apply_event(state: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::RecipeFinished(text) => {
            state.recipe_text = text;
            state.generate_enabled = true;
        }
    }
}

pub fn render_recipe(state: &AppState) -> String {
    format!("---- recipe ----\n{}\n----------------\n", state.recipe_text)
}

/// Command handling for one shell session.
pub struct Shell {
    store: Arc<dyn IngredientStore>,
    advisor: Arc<Advisor>,
    events: mpsc::UnboundedSender<AppEvent>,
    today: NaiveDate,
}

impl Shell {
    pub fn new(
        store: Arc<dyn IngredientStore>,
        advisor: Arc<Advisor>,
        events: mpsc::UnboundedSender<AppEvent>,
        today: NaiveDate,
    ) -> Self {
        Self {
            store,
            advisor,
            events,
            today,
        }
    }

    /// Reload the inventory from the store. A failed read keeps the old rows.
    pub async fn refresh(&self, state: &mut AppState) -> Result<(), PantryError> {
        state.inventory = self.store.list_all().await?;
        if state.selected_row().is_none() {
            state.selected = None;
        }
        Ok(())
    }

    /// Handle one line of input, appending anything to show to `out`.
    pub async fn handle_line(&self, state: &mut AppState, line: &str, out: &mut String) -> Flow {
        if let Some(id) = state.pending_delete.take() {
            let answer = line.trim().to_lowercase();
            if answer == "y" || answer == "yes" {
                self.delete(state, id, out).await;
            } else {
                let _ = writeln!(out, "delete cancelled");
            }
            return Flow::Continue;
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(msg) => {
                let _ = writeln!(out, "{}", msg);
                return Flow::Continue;
            }
        };

        match command {
            Command::Empty => {}
            Command::Quit => return Flow::Quit,
            Command::Help => {
                let _ = writeln!(out, "{}", HELP);
            }
            Command::List => {
                if let Err(err) = self.refresh(state).await {
                    report(out, &err);
                }
                out.push_str(&render_table(&state.inventory, self.today));
            }
            Command::Select(id) => {
                state.selected = state.inventory.iter().any(|r| r.id == id).then_some(id);
                match state.selected_row() {
                    Some(row) => {
                        let _ = writeln!(
                            out,
                            "selected [{}] {} | {} | {} | {}",
                            row.id,
                            row.name,
                            row.quantity.as_deref().unwrap_or(""),
                            row.purchase_date.as_deref().unwrap_or(""),
                            row.expiry_date.as_deref().unwrap_or("")
                        );
                    }
                    None => {
                        let _ = writeln!(out, "warning: no ingredient with id {}", id);
                    }
                }
            }
            Command::Add(fields) => {
                if let Err(err) = fields.validate() {
                    report(out, &err);
                    return Flow::Continue;
                }
                match self.store.add(&fields).await {
                    Ok(row) => {
                        let _ = writeln!(out, "added [{}] {}", row.id, row.name);
                        self.refresh_and_render(state, out).await;
                    }
                    Err(err) => report(out, &err),
                }
            }
            Command::Update(fields) => {
                let Some(id) = state.selected else {
                    report(out, &no_selection());
                    return Flow::Continue;
                };
                if let Err(err) = fields.validate() {
                    report(out, &err);
                    return Flow::Continue;
                }
                match self.store.update(id, &fields).await {
                    Ok(()) => {
                        let _ = writeln!(out, "updated [{}] {}", id, fields.name);
                        self.refresh_and_render(state, out).await;
                    }
                    Err(err) => report(out, &err),
                }
            }
            Command::Delete => {
                let target = state.selected_row().map(|row| (row.id, row.name.clone()));
                match target {
                    Some((id, name)) => {
                        let _ = writeln!(out, "delete '{}'? [y/N]", name);
                        state.pending_delete = Some(id);
                    }
                    None => report(out, &no_selection()),
                }
            }
            Command::Generate => {
                if dispatch_generation(state, &self.advisor, &self.events).is_some() {
                    out.push_str(&render_recipe(state));
                } else {
                    let _ = writeln!(out, "a recipe is already being generated");
                }
            }
            Command::Recipe => out.push_str(&render_recipe(state)),
        }
        Flow::Continue
    }

    async fn delete(&self, state: &mut AppState, id: i64, out: &mut String) {
        match self.store.delete(id).await {
            Ok(()) => {
                let _ = writeln!(out, "deleted [{}]", id);
                state.selected = None;
                self.refresh_and_render(state, out).await;
            }
            Err(err) => report(out, &err),
        }
    }

    async fn refresh_and_render(&self, state: &mut AppState, out: &mut String) {
        if let Err(err) = self.refresh(state).await {
            report(out, &err);
        }
        out.push_str(&render_table(&state.inventory, self.today));
    }
}

fn no_selection() -> PantryError {
    PantryError::Validation("select an ingredient first (`select <id>`)".to_string())
}

fn report(out: &mut String, err: &PantryError) {
    match err {
        PantryError::Validation(msg) => {
            let _ = writeln!(out, "warning: {}", msg);
        }
        other => {
            error!(error = %other, "inventory operation abandoned");
            let _ = writeln!(out, "error: {}", other);
        }
    }
}

/// CLI entry point for `pantry shell`.
pub async fn run_shell(config: &Config) -> Result<()> {
    let sqlite = SqliteIngredientStore::open(&config.db.path).await?;
    sqlite.initialize().await?;
    let store: Arc<dyn IngredientStore> = Arc::new(sqlite);
    let advisor = Arc::new(build_advisor(config, Arc::clone(&store)).await);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let shell = Shell::new(store, advisor, tx, local_today());
    let mut state = AppState::default();

    let mut out = String::new();
    if let Err(err) = shell.refresh(&mut state).await {
        report(&mut out, &err);
    }
    out.push_str(&render_table(&state.inventory, shell.today));
    out.push_str(&render_recipe(&state));
    out.push_str("type `help` for commands\n");
    emit(&mut out)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&state)?;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // Input closed: let a running request finish before exiting.
                    if !state.generate_enabled {
                        if let Some(event) = rx.recv().await {
                            apply_event(&mut state, event);
                            out.push_str(&render_recipe(&state));
                            emit(&mut out)?;
                        }
                    }
                    break;
                };
                let flow = shell.handle_line(&mut state, &line, &mut out).await;
                emit(&mut out)?;
                if flow == Flow::Quit {
                    break;
                }
            }
            Some(event) = rx.recv() => {
                apply_event(&mut state, event);
                out.push('\n');
                out.push_str(&render_recipe(&state));
                emit(&mut out)?;
            }
        }
    }
    Ok(())
}

fn prompt(state: &AppState) -> Result<()> {
    let mut stdout = std::io::stdout();
    match state.selected {
        Some(id) => write!(stdout, "pantry[{}]> ", id)?,
        None => write!(stdout, "pantry> ")?,
    }
    stdout.flush()?;
    Ok(())
}

fn emit(out: &mut String) -> Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(out.as_bytes())?;
    stdout.flush()?;
    out.clear();
    Ok(())
}
