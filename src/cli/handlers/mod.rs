use std::cell::RefCell;
use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::persistence::PersistenceAdapter;
use crate::io::recovery;
use crate::io::storage::DirStore;
use crate::model::ack::{Acknowledgement, Severity};
use crate::model::category::{CategoryDraft, DEFAULT_CATEGORY_COLOR};
use crate::model::config::{AppConfig, Theme};
use crate::model::task::{Priority, TaskDraft};
use crate::model::view::ViewKey;
use crate::ops::store::{CategoryRemoval, StoreEvent, TaskStore};

type CmdResult = Result<(), Box<dyn Error>>;

/// Everything a command needs besides its own args.
struct Context {
    data_dir: PathBuf,
    config: AppConfig,
    json: bool,
}

/// A store for one command, with the acknowledgements it emitted.
struct Session {
    store: TaskStore<DirStore>,
    acks: Rc<RefCell<Vec<Acknowledgement>>>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref());
    let (config, _) = config_io::read_config(&data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), "starting");
    let ctx = Context {
        data_dir,
        config,
        json: cli.json,
    };

    match cli.command {
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args),
        Commands::Edit(args) => cmd_edit(&ctx, args),
        Commands::Done(args) => cmd_done(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Mv(args) => cmd_mv(&ctx, args),
        Commands::Category(cmd) => match cmd.action {
            CategoryAction::List => cmd_category_list(&ctx),
            CategoryAction::Add { name, color } => cmd_category_add(&ctx, name, color),
            CategoryAction::Edit {
                category,
                name,
                color,
            } => cmd_category_edit(&ctx, category, name, color),
            CategoryAction::Rm { category } => cmd_category_rm(&ctx, category),
        },
        Commands::Theme(args) => cmd_theme(&ctx, args),
        Commands::Recovery(args) => cmd_recovery(&ctx, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_session(ctx: &Context) -> Session {
    let medium = DirStore::new(&ctx.data_dir);
    let adapter = PersistenceAdapter::new(medium).with_keys(ctx.config.storage.clone());
    let mut store = TaskStore::open(adapter);

    let acks = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&acks);
    store.subscribe(move |event| {
        if let StoreEvent::Acknowledged(ack) = event {
            sink.borrow_mut().push(ack.clone());
        }
    });
    Session { store, acks }
}

/// Print acknowledgements and flush the store.
fn finish(ctx: &Context, session: Session) -> CmdResult {
    for ack in session.acks.borrow().iter() {
        match ack.severity {
            Severity::Destructive => eprintln!("{}", format_ack(ack)),
            Severity::Info if !ctx.json => println!("{}", format_ack(ack)),
            Severity::Info => {}
        }
    }
    session.store.close()?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_priority(s: &str) -> Result<Priority, Box<dyn Error>> {
    Priority::parse_priority(s)
        .ok_or_else(|| format!("invalid priority '{}' (expected low, medium or high)", s).into())
}

/// Accept a bare date (midnight UTC) or a full RFC 3339 timestamp.
fn parse_due(s: &str) -> Result<DateTime<Utc>, Box<dyn Error>> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("invalid due date '{}' (expected YYYY-MM-DD)", s).into())
}

fn resolve_view(store: &TaskStore<DirStore>, key: &str) -> Result<ViewKey, Box<dyn Error>> {
    match ViewKey::parse(key) {
        ViewKey::Category(query) => Ok(ViewKey::Category(store.resolve_category_id(&query)?)),
        view => Ok(view),
    }
}

fn view_title(store: &TaskStore<DirStore>, view: &ViewKey) -> String {
    match view {
        ViewKey::All => "All tasks".to_string(),
        ViewKey::Completed => "Completed".to_string(),
        ViewKey::Category(id) => store
            .category(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.clone()),
    }
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let mut session = open_session(ctx);
    let store = &mut session.store;

    let category_id = match &args.category {
        Some(query) => store.resolve_category_id(query)?,
        None => store
            .resolve_category_id(&ctx.config.ui.default_category)
            .unwrap_or_else(|_| ctx.config.ui.default_category.clone()),
    };
    let priority = match &args.priority {
        Some(p) => parse_priority(p)?,
        None => ctx.config.ui.default_priority,
    };

    let mut draft = TaskDraft::new(args.title)
        .with_category(category_id)
        .with_priority(priority);
    if let Some(desc) = args.description {
        draft = draft.with_description(desc);
    }
    if let Some(due) = &args.due {
        draft = draft.with_due_date(parse_due(due)?);
    }

    let Some(id) = store.add_task(draft) else {
        return Err("task title cannot be blank".into());
    };

    if ctx.json {
        if let Some(task) = store.task(&id) {
            print_json(&task_to_json(task, store.categories()))?;
        }
    } else {
        println!("{}", id);
    }
    finish(ctx, session)
}

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let session = open_session(ctx);
    let store = &session.store;
    let view = resolve_view(store, &args.view)?;
    let tasks = store.filter_by_view(&view);

    if ctx.json {
        let out = ViewJson {
            view: view.as_str(),
            tasks: tasks
                .iter()
                .map(|t| task_to_json(t, store.categories()))
                .collect(),
        };
        print_json(&out)?;
    } else {
        println!("{} ({})", view_title(store, &view), tasks.len());
        if tasks.is_empty() {
            println!("  No tasks here yet.");
        }
        for task in &tasks {
            println!("{}", format_task_line(task, store.categories()));
        }
    }
    finish(ctx, session)
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> CmdResult {
    let session = open_session(ctx);
    let store = &session.store;
    let id = store.resolve_task_id(&args.id)?;
    if let Some(task) = store.task(&id) {
        if ctx.json {
            print_json(&task_to_json(task, store.categories()))?;
        } else {
            print!("{}", format_task_detail(task, store.categories()));
        }
    }
    finish(ctx, session)
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let mut session = open_session(ctx);
    let store = &mut session.store;
    let id = store.resolve_task_id(&args.id)?;
    let mut task = store
        .task(&id)
        .cloned()
        .ok_or_else(|| format!("task not found: {}", id))?;

    if let Some(title) = args.title {
        if title.trim().is_empty() {
            return Err("task title cannot be blank".into());
        }
        task.title = title;
    }
    if let Some(desc) = args.description {
        task.description = Some(desc).filter(|d| !d.is_empty());
    }
    if let Some(p) = &args.priority {
        task.priority = parse_priority(p)?;
    }
    if let Some(query) = &args.category {
        task.category_id = store.resolve_category_id(query)?;
    }
    if let Some(due) = &args.due {
        task.due_date = Some(parse_due(due)?);
    }
    if args.clear_due {
        task.due_date = None;
    }

    store.update_task(task);
    if ctx.json {
        if let Some(task) = store.task(&id) {
            print_json(&task_to_json(task, store.categories()))?;
        }
    }
    finish(ctx, session)
}

fn cmd_done(ctx: &Context, args: IdArgs) -> CmdResult {
    let mut session = open_session(ctx);
    let id = session.store.resolve_task_id(&args.id)?;
    let completed = session.store.complete_task(&id);
    if ctx.json {
        print_json(&serde_json::json!({ "id": id, "completed": completed }))?;
    }
    finish(ctx, session)
}

fn cmd_rm(ctx: &Context, args: IdArgs) -> CmdResult {
    let mut session = open_session(ctx);
    let id = session.store.resolve_task_id(&args.id)?;
    session.store.delete_task(&id);
    if ctx.json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    }
    finish(ctx, session)
}

fn cmd_mv(ctx: &Context, args: MvArgs) -> CmdResult {
    let mut session = open_session(ctx);
    let store = &mut session.store;
    let dragged = store.resolve_task_id(&args.dragged)?;
    let target = store.resolve_task_id(&args.target)?;
    let view = resolve_view(store, &args.view)?;

    if !store.move_task(&view, &dragged, &target) {
        return Err(format!(
            "cannot move: both tasks must be different and shown in view '{}'",
            view
        )
        .into());
    }

    if ctx.json {
        let tasks = store.filter_by_view(&view);
        let out = ViewJson {
            view: view.as_str(),
            tasks: tasks
                .iter()
                .map(|t| task_to_json(t, store.categories()))
                .collect(),
        };
        print_json(&out)?;
    } else {
        for task in store.filter_by_view(&view) {
            println!("{}", format_task_line(task, store.categories()));
        }
    }
    finish(ctx, session)
}

// ---------------------------------------------------------------------------
// Category commands
// ---------------------------------------------------------------------------

fn cmd_category_list(ctx: &Context) -> CmdResult {
    let session = open_session(ctx);
    let store = &session.store;

    if ctx.json {
        let out: Vec<CategoryJson> = store
            .categories()
            .iter()
            .map(|c| CategoryJson {
                id: &c.id,
                name: &c.name,
                color: &c.color,
                open: store.view_count(&ViewKey::Category(c.id.clone())),
                total: store.tasks_by_category(&c.id).len(),
            })
            .collect();
        print_json(&out)?;
    } else {
        for c in store.categories() {
            let open = store.view_count(&ViewKey::Category(c.id.clone()));
            println!("{}", format_category_line(c, open));
        }
        let orphans = store.uncategorized_tasks().len();
        if orphans > 0 {
            println!("(uncategorized) ({})", orphans);
        }
    }
    finish(ctx, session)
}

fn cmd_category_add(ctx: &Context, name: String, color: Option<String>) -> CmdResult {
    if name.trim().is_empty() {
        return Err("category name cannot be blank".into());
    }
    let mut session = open_session(ctx);
    let color = color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());
    let id = session.store.add_category(CategoryDraft::new(name, color));
    if ctx.json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("{}", id);
    }
    finish(ctx, session)
}

fn cmd_category_edit(
    ctx: &Context,
    query: String,
    name: Option<String>,
    color: Option<String>,
) -> CmdResult {
    let mut session = open_session(ctx);
    let store = &mut session.store;
    let id = store.resolve_category_id(&query)?;
    let mut category = store
        .category(&id)
        .cloned()
        .ok_or_else(|| format!("category not found: {}", id))?;
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err("category name cannot be blank".into());
        }
        category.name = name;
    }
    if let Some(color) = color {
        category.color = color;
    }
    store.update_category(category);
    finish(ctx, session)
}

fn cmd_category_rm(ctx: &Context, query: String) -> CmdResult {
    let mut session = open_session(ctx);
    let id = session.store.resolve_category_id(&query)?;
    let removal = session.store.delete_category(&id);
    if let CategoryRemoval::InUse { .. } = removal {
        // reported once, through the error below
        session.acks.borrow_mut().clear();
    }
    if ctx.json {
        let (deleted, tasks) = match removal {
            CategoryRemoval::Deleted => (true, 0),
            CategoryRemoval::NotFound => (false, 0),
            CategoryRemoval::InUse { tasks } => (false, tasks),
        };
        print_json(&serde_json::json!({ "id": id, "deleted": deleted, "tasks": tasks }))?;
    }
    finish(ctx, session)?;
    match removal {
        CategoryRemoval::InUse { tasks } => {
            Err(format!(
                "category '{}' not deleted: it still has {} task(s), move or delete them first",
                query, tasks
            )
            .into())
        }
        CategoryRemoval::NotFound => Err(format!("category not found: {}", query).into()),
        CategoryRemoval::Deleted => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Theme / recovery
// ---------------------------------------------------------------------------

fn cmd_theme(ctx: &Context, args: ThemeArgs) -> CmdResult {
    let current = ctx.config.ui.theme;
    let theme = match args.mode.as_deref() {
        None => current,
        Some("toggle") => current.toggle(),
        Some(mode) => Theme::parse_theme(mode)
            .ok_or_else(|| format!("invalid theme '{}' (expected toggle, light or dark)", mode))?,
    };

    if theme != current {
        let (_, mut doc) = config_io::read_config(&ctx.data_dir)?;
        config_io::set_theme(&mut doc, theme);
        config_io::write_config(&ctx.data_dir, &doc)?;
        tracing::debug!(theme = theme.as_str(), "theme changed");
    }

    if ctx.json {
        print_json(&serde_json::json!({ "theme": theme.as_str() }))?;
    } else {
        println!("{}", theme.as_str());
    }
    Ok(())
}

fn cmd_recovery(ctx: &Context, args: RecoveryArgs) -> CmdResult {
    if args.prune {
        let cutoff = Utc::now() - chrono::Duration::days(recovery::PRUNE_AGE_DAYS);
        let removed = recovery::prune_recovery(&ctx.data_dir, cutoff)?;
        if ctx.json {
            print_json(&serde_json::json!({ "removed": removed }))?;
        } else {
            println!("removed {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
        }
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(&ctx.data_dir, args.limit);
    if ctx.json {
        let out: Vec<_> = entries.iter().map(recovery_entry_to_json).collect();
        print_json(&out)?;
    } else if entries.is_empty() {
        println!("recovery log is empty");
    } else {
        for entry in &entries {
            println!("{}", format_recovery_entry(entry));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn due_dates_accept_plain_dates_and_timestamps() {
        assert_eq!(
            parse_due("2025-04-10").unwrap(),
            Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_due("2025-04-10T09:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 4, 10, 7, 30, 0).unwrap()
        );
        assert!(parse_due("next tuesday").is_err());
    }

    #[test]
    fn priority_errors_name_the_input() {
        let err = parse_priority("urgent").unwrap_err();
        assert!(err.to_string().contains("urgent"));
    }
}
