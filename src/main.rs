//! pagedesk - account and page lifecycle manager CLI
//!
//! Main entry point for the pagedesk command-line tool.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use pagedesk::config::Config;
use pagedesk::*;

fn main() {
    let cli = Cli::parse();
    let config = Config::load();

    // Setup logging; the config file can ask for quiet too
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet || config.output.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.into())
        )
        .with_target(false)
        .without_time()
        .init();

    if !config.output.colors {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&cli, &config) {
        eprintln!("{} {e:#}", "✗".red().bold());
        if let Some(hint) = e
            .downcast_ref::<PagedeskError>()
            .and_then(PagedeskError::suggestion)
        {
            eprintln!("  {} {hint}", "Hint:".cyan());
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Account(cmd) => match cmd {
            AccountCmd::Add(args) => cmd_account_add(cli, config, args),
            AccountCmd::Edit(args) => cmd_account_edit(cli, config, args),
            AccountCmd::Note(args) => cmd_note(cli, config, ItemKind::Account, args),
            AccountCmd::List(args) => cmd_account_list(cli, config, args),
            AccountCmd::Show(args) => cmd_account_show(cli, config, args),
            AccountCmd::Import(args) => cmd_account_import(cli, config, args),
        },
        Commands::Page(cmd) => match cmd {
            PageCmd::Add(args) => cmd_page_add(cli, config, args),
            PageCmd::BulkAdd(args) => cmd_page_bulk_add(cli, config, args),
            PageCmd::Edit(args) => cmd_page_edit(cli, config, args),
            PageCmd::Note(args) => cmd_note(cli, config, ItemKind::Page, args),
            PageCmd::List(args) => cmd_page_list(cli, config, args),
            PageCmd::Show(args) => cmd_page_show(cli, config, args),
            PageCmd::UseFolder(args) => cmd_page_use_folder(cli, config, args),
        },
        Commands::BulkEdit(args) => cmd_bulk_edit(cli, config, args),
        Commands::QuickEdit(args) => cmd_quick_edit(cli, config, args),
        Commands::Delete(args) => cmd_delete(cli, config, args),
        Commands::Bin(cmd) => match cmd {
            BinCmd::List => cmd_bin_list(cli, config),
            BinCmd::Restore(args) => cmd_bin_restore(cli, config, args),
            BinCmd::Purge(args) => cmd_bin_purge(cli, config, args),
        },
        Commands::Backup(args) => cmd_backup(cli, config, args),
        Commands::Restore(args) => cmd_restore(cli, config, args),
        Commands::Completions(args) => cmd_completions(args.clone()),
    }
}

fn get_db_path(cli: &Cli, config: &Config) -> PathBuf {
    cli.db.clone().unwrap_or_else(|| config.db_path())
}

fn open_storage(cli: &Cli, config: &Config) -> Result<Storage> {
    let db_path = get_db_path(cli, config);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    Ok(Storage::open(&db_path)?)
}

fn cmd_account_add(cli: &Cli, config: &Config, args: &cli::AccountAddArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let id = storage.create_account(&NewAccount {
        profile_id: args.profile_id.clone(),
        account_name: args.name.clone(),
        uid: args.uid.clone(),
        account_category: args.category.clone(),
    })?;
    println!("{} Account added with id {}", "✓".green(), id.to_string().bold());
    Ok(())
}

fn cmd_account_edit(cli: &Cli, config: &Config, args: &cli::AccountEditArgs) -> Result<()> {
    if args.name.is_none()
        && args.category.is_none()
        && args.monetization.is_none()
        && args.proxy.is_none()
        && args.proxy_location.is_none()
        && args.note.is_none()
    {
        anyhow::bail!("nothing to change; pass at least one --flag");
    }

    let storage = open_storage(cli, config)?;
    let current = storage.account_details(args.id)?;
    let edit = AccountEdit {
        account_name: args.name.clone().unwrap_or(current.account_name),
        account_category: args.category.clone().unwrap_or(current.account_category),
        monetization: args.monetization.clone().unwrap_or(current.monetization),
        proxy: args.proxy.clone().unwrap_or(current.proxy),
        proxy_location: args.proxy_location.clone().unwrap_or(current.proxy_location),
        note: args.note.clone().unwrap_or(current.note),
    };
    storage.update_account(args.id, &edit)?;
    println!("{} Account {} updated", "✓".green(), args.id);
    Ok(())
}

fn cmd_note(cli: &Cli, config: &Config, kind: ItemKind, args: &cli::NoteArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    storage.update_note(kind, args.id, &args.text)?;
    println!("{} Note saved", "✓".green());
    Ok(())
}

fn cmd_account_list(cli: &Cli, config: &Config, args: &cli::AccountListArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let filter = AccountFilter {
        search: args.search.clone(),
        category: args.category.clone(),
        limit: Some(args.limit.unwrap_or(config.listing.default_limit)),
        offset: args.offset,
    };
    let accounts = storage.list_accounts(&filter)?;
    let total = storage.count_accounts(&filter)?;

    if accounts.is_empty() {
        println!("{}", "No accounts found.".yellow());
        return Ok(());
    }

    println!(
        "{:>5}  {:<14} {:<24} {:<14} {}",
        "ID".bold(),
        "PROFILE".bold(),
        "NAME".bold(),
        "CATEGORY".bold(),
        "STATUS".bold()
    );
    for account in &accounts {
        println!(
            "{:>5}  {:<14} {:<24} {:<14} {}",
            account.account_id,
            account.profile_id,
            account.account_name,
            account.account_category,
            account.status.dimmed()
        );
    }
    println!();
    println!("{} of {} accounts", accounts.len(), format_number(total).cyan());
    Ok(())
}

fn cmd_account_show(cli: &Cli, config: &Config, args: &cli::ShowArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let account = storage.account_details(args.id)?;

    println!("{}", "─".repeat(CONTENT_DIVIDER_WIDTH));
    println!("{} {}", account.account_name.bold(), format!("(#{})", account.account_id).dimmed());
    println!("{}", "─".repeat(CONTENT_DIVIDER_WIDTH));
    println!("  {:<16} {}", "Profile ID:", account.profile_id);
    println!("  {:<16} {}", "UID:", account.uid);
    println!("  {:<16} {}", "Category:", account.account_category);
    println!("  {:<16} {}", "Monetization:", account.monetization);
    println!("  {:<16} {}", "Proxy:", account.proxy);
    println!("  {:<16} {}", "Proxy location:", account.proxy_location);
    println!("  {:<16} {}", "Status:", account.status);
    if account.is_deleted {
        println!("  {:<16} {}", "Deleted:", "yes (in recycle bin)".red());
    }
    if !account.note.is_empty() {
        println!("  {:<16} {}", "Note:", account.note);
    }
    Ok(())
}

fn cmd_account_import(cli: &Cli, config: &Config, args: &cli::ImportArgs) -> Result<()> {
    let records = parser::read_import_records(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let total = records.len();

    let mut storage = open_storage(cli, config)?;
    let imported = storage.bulk_import_accounts(&records)?;
    let skipped = total - imported;

    println!(
        "{} Imported {} of {} accounts ({} skipped as duplicates or incomplete)",
        "✓".green(),
        imported.to_string().bold(),
        total,
        skipped
    );
    Ok(())
}

fn cmd_page_add(cli: &Cli, config: &Config, args: &cli::PageAddArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let account_id = resolve_account(&storage, &args.account)?;

    let id = storage.create_page(&NewPage {
        page_name: args.name.clone(),
        uid_page_id: args.uid_page_id.clone(),
        category: args.category.clone(),
        monetization: args.monetization.clone(),
        linked_account_id: account_id,
    })?;
    println!("{} Page added with id {}", "✓".green(), id.to_string().bold());
    Ok(())
}

/// Resolve a profile id to an account id, matching exactly first and
/// case-insensitively as a fallback.
fn resolve_account(storage: &Storage, profile_id: &str) -> Result<i64> {
    let wanted = profile_id.trim();
    let brief = storage.accounts_brief()?;

    if let Some((id, _, _)) = brief.iter().find(|(_, pid, _)| pid == wanted) {
        return Ok(*id);
    }
    let upper = wanted.to_uppercase();
    if let Some((id, _, _)) = brief.iter().find(|(_, pid, _)| pid.to_uppercase() == upper) {
        return Ok(*id);
    }
    anyhow::bail!("no account with profile id '{wanted}'");
}

fn cmd_page_bulk_add(cli: &Cli, config: &Config, args: &cli::BulkAddArgs) -> Result<()> {
    let rows = parser::read_bulk_page_rows(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let total = rows.len();

    let mut storage = open_storage(cli, config)?;
    let created = storage.bulk_create_pages(&rows)?;
    let skipped = total - created;

    println!(
        "{} Created {} of {} pages ({} skipped for unknown accounts)",
        "✓".green(),
        created.to_string().bold(),
        total,
        skipped
    );
    Ok(())
}

fn cmd_page_edit(cli: &Cli, config: &Config, args: &cli::PageEditArgs) -> Result<()> {
    let mut fields: Vec<(PageField, FieldValue)> = Vec::new();
    let text = |s: &String| FieldValue::Text(s.clone());

    if let Some(v) = &args.name {
        fields.push((PageField::Name, text(v)));
    }
    if let Some(v) = &args.uid_page_id {
        fields.push((PageField::UidPageId, text(v)));
    }
    if let Some(v) = &args.category {
        fields.push((PageField::Category, text(v)));
    }
    if let Some(v) = &args.monetization {
        fields.push((PageField::Monetization, text(v)));
    }
    if let Some(v) = args.account_id {
        fields.push((PageField::LinkedAccountId, FieldValue::Int(v)));
    }
    if let Some(v) = &args.content_folder {
        fields.push((PageField::ContentFolder, text(v)));
    }
    if let Some(v) = args.video_date {
        fields.push((PageField::VideoScheduleDate, FieldValue::Date(v)));
    }
    if let Some(v) = args.video_per_day {
        fields.push((PageField::VideoPostsPerDay, FieldValue::Int(v)));
    }
    if let Some(v) = &args.video_folder {
        fields.push((PageField::VideoFolder, text(v)));
    }
    if let Some(v) = args.reels_date {
        fields.push((PageField::ReelsScheduleDate, FieldValue::Date(v)));
    }
    if let Some(v) = args.reels_per_day {
        fields.push((PageField::ReelsPostsPerDay, FieldValue::Int(v)));
    }
    if let Some(v) = &args.reels_folder {
        fields.push((PageField::ReelsFolder, text(v)));
    }
    if let Some(v) = args.photo_date {
        fields.push((PageField::PhotoScheduleDate, FieldValue::Date(v)));
    }
    if let Some(v) = args.photo_per_day {
        fields.push((PageField::PhotoPostsPerDay, FieldValue::Int(v)));
    }
    if let Some(v) = &args.photo_folder {
        fields.push((PageField::PhotoFolder, text(v)));
    }
    if let Some(v) = &args.followers {
        fields.push((PageField::Followers, text(v)));
    }
    if let Some(v) = &args.last_interaction {
        fields.push((PageField::LastInteraction, text(v)));
    }

    if fields.is_empty() {
        anyhow::bail!("nothing to change; pass at least one --flag");
    }

    let storage = open_storage(cli, config)?;
    storage.update_page(args.id, &fields)?;
    println!("{} Page {} updated", "✓".green(), args.id);
    Ok(())
}

fn cmd_page_list(cli: &Cli, config: &Config, args: &cli::PageListArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let listings = storage.list_pages(&PageFilter {
        search: args.search.clone(),
        category: args.category.clone(),
    })?;

    if listings.is_empty() {
        println!("{}", "No pages found.".yellow());
        return Ok(());
    }

    println!(
        "{:>5}  {:<24} {:<14} {:<14} {}",
        "ID".bold(),
        "PAGE".bold(),
        "ACCOUNT".bold(),
        "CATEGORY".bold(),
        "STATUS".bold()
    );
    for listing in &listings {
        println!(
            "{:>5}  {:<24} {:<14} {:<14} {}",
            listing.page.page_id,
            listing.page.page_name,
            listing.profile_id,
            listing.page.category,
            listing.page.status.dimmed()
        );
    }
    println!();
    println!("{} pages", listings.len());
    Ok(())
}

fn cmd_page_show(cli: &Cli, config: &Config, args: &cli::ShowArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let page = storage.page_details(args.id)?;

    println!("{}", "─".repeat(CONTENT_DIVIDER_WIDTH));
    println!("{} {}", page.page_name.bold(), format!("(#{})", page.page_id).dimmed());
    println!("{}", "─".repeat(CONTENT_DIVIDER_WIDTH));
    println!("  {:<18} {}", "Page ID:", page.uid_page_id);
    println!("  {:<18} {}", "Account ID:", page.linked_account_id);
    println!("  {:<18} {}", "Category:", page.category);
    println!("  {:<18} {}", "Monetization:", page.monetization);
    println!("  {:<18} {}", "Status:", page.status);
    println!("  {:<18} {}", "Content folder:", page.content_folder);
    print_schedule("Video:", page.video_schedule_date, page.video_posts_per_day, &page.video_folder);
    print_schedule("Reels:", page.reels_schedule_date, page.reels_posts_per_day, &page.reels_folder);
    print_schedule("Photos:", page.photo_schedule_date, page.photo_posts_per_day, &page.photo_folder);
    if !page.followers.is_empty() {
        println!("  {:<18} {}", "Followers:", page.followers);
    }
    if !page.last_interaction.is_empty() {
        println!("  {:<18} {}", "Last interaction:", page.last_interaction);
    }
    if !page.used_folders.is_empty() {
        println!("  {:<18} {}", "Used folders:", page.used_folders.join(", "));
    }
    if page.is_deleted {
        println!("  {:<18} {}", "Deleted:", "yes (in recycle bin)".red());
    }
    if !page.note.is_empty() {
        println!("  {:<18} {}", "Note:", page.note);
    }
    Ok(())
}

fn print_schedule(
    label: &str,
    date: Option<chrono::NaiveDate>,
    per_day: Option<i64>,
    folder: &str,
) {
    if date.is_none() && per_day.is_none() && folder.is_empty() {
        return;
    }
    let date = date.map_or_else(|| "-".to_string(), |d| d.format(DATE_FORMAT).to_string());
    let per_day = per_day.map_or_else(|| "-".to_string(), |n| n.to_string());
    println!("  {label:<18} {date} @ {per_day}/day  {folder}");
}

fn cmd_page_use_folder(cli: &Cli, config: &Config, args: &cli::UseFolderArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    if storage.append_used_folder(args.id, &args.folder)? {
        println!(
            "{} Recorded folder '{}' for page {}",
            "✓".green(),
            args.folder,
            args.id
        );
    } else {
        println!(
            "Folder '{}' is already recorded for page {}",
            args.folder, args.id
        );
    }
    Ok(())
}

fn cmd_bulk_edit(cli: &Cli, config: &Config, args: &cli::BulkEditArgs) -> Result<()> {
    let mut storage = open_storage(cli, config)?;

    let applied = match args.kind {
        KindArg::Account => {
            let updates = parser::read_account_updates(&args.file)
                .with_context(|| format!("reading {}", args.file.display()))?;
            storage.bulk_update_accounts_partial(&updates)?
        }
        KindArg::Page => {
            let updates = parser::read_page_updates(&args.file)
                .with_context(|| format!("reading {}", args.file.display()))?;
            storage.bulk_update_pages_partial(&updates)?
        }
    };

    println!("{} Updated {} records", "✓".green(), applied.to_string().bold());
    Ok(())
}

fn cmd_quick_edit(cli: &Cli, config: &Config, args: &cli::QuickEditArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;

    let changed = match args.kind {
        KindArg::Account => {
            let field = AccountField::from_column(&args.field).ok_or_else(|| {
                unknown_column_error("account", &args.field, AccountField::ALL.map(AccountField::column))
            })?;
            storage.quick_edit_accounts(&args.ids, field, &FieldValue::Text(args.value.clone()))?
        }
        KindArg::Page => {
            let field = PageField::from_column(&args.field).ok_or_else(|| {
                unknown_column_error("page", &args.field, PageField::ALL.map(PageField::column))
            })?;
            let value = page_quick_value(field, &args.value)?;
            storage.quick_edit_pages(&args.ids, field, &value)?
        }
    };

    println!("{} Updated {} records", "✓".green(), changed.to_string().bold());
    Ok(())
}

fn unknown_column_error<const N: usize>(
    kind: &str,
    field: &str,
    columns: [&'static str; N],
) -> anyhow::Error {
    anyhow::anyhow!(
        "unknown {kind} column '{field}'; valid columns: {}",
        columns.join(", ")
    )
}

/// Coerce a quick-edit value to the column's storage type.
fn page_quick_value(field: PageField, value: &str) -> Result<FieldValue> {
    match field {
        PageField::VideoPostsPerDay
        | PageField::ReelsPostsPerDay
        | PageField::PhotoPostsPerDay
        | PageField::LinkedAccountId => {
            let n: i64 = value
                .parse()
                .with_context(|| format!("'{}' needs an integer value", field.column()))?;
            Ok(FieldValue::Int(n))
        }
        _ => Ok(FieldValue::Text(value.to_string())),
    }
}

fn cmd_delete(cli: &Cli, config: &Config, args: &cli::DeleteArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let kind = ItemKind::from(args.kind);

    for id in &args.ids {
        storage.soft_delete(kind, *id)?;
    }
    println!(
        "{} Moved {} {}(s) to the recycle bin",
        "✓".green(),
        args.ids.len(),
        kind.label()
    );
    Ok(())
}

fn cmd_bin_list(cli: &Cli, config: &Config) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let items = storage.list_deleted()?;

    if items.is_empty() {
        println!("{}", "Recycle bin is empty.".yellow());
        return Ok(());
    }

    println!("{:<9} {:>5}  {:<20} {}", "KIND".bold(), "ID".bold(), "NAME".bold(), "DETAIL".bold());
    for item in &items {
        println!(
            "{:<9} {:>5}  {:<20} {}",
            item.kind.label(),
            item.id,
            item.display_name,
            item.detail.dimmed()
        );
    }
    Ok(())
}

fn cmd_bin_restore(cli: &Cli, config: &Config, args: &cli::BinRestoreArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let kind = ItemKind::from(args.kind);

    for id in &args.ids {
        storage.restore(kind, *id)?;
    }
    println!("{} Restored {} {}(s)", "✓".green(), args.ids.len(), kind.label());
    Ok(())
}

fn cmd_bin_purge(cli: &Cli, config: &Config, args: &cli::PurgeArgs) -> Result<()> {
    if args.accounts.is_empty() && args.pages.is_empty() {
        anyhow::bail!("nothing to purge; pass --account <id> and/or --page <id>");
    }

    let mut storage = open_storage(cli, config)?;
    let dependents = storage.count_dependent_pages(&args.accounts)?;

    if !args.yes {
        println!(
            "{} This permanently deletes {} account(s) and {} page(s).",
            "!".yellow().bold(),
            args.accounts.len(),
            args.pages.len()
        );
        if dependents > 0 {
            println!(
                "{} {} linked page(s) will be deleted with their accounts.",
                "!".yellow().bold(),
                dependents
            );
        }
        println!("Re-run with {} to confirm.", "--yes".bold());
        return Ok(());
    }

    let mut items: Vec<(ItemKind, i64)> = Vec::new();
    items.extend(args.accounts.iter().map(|id| (ItemKind::Account, *id)));
    items.extend(args.pages.iter().map(|id| (ItemKind::Page, *id)));
    storage.permanently_delete(&items)?;

    println!(
        "{} Permanently deleted {} record(s){}",
        "✓".green(),
        items.len(),
        if dependents > 0 {
            format!(" and {dependents} linked page(s)")
        } else {
            String::new()
        }
    );
    Ok(())
}

fn cmd_backup(cli: &Cli, config: &Config, args: &cli::BackupArgs) -> Result<()> {
    let base = match &args.path {
        Some(path) => path.clone(),
        None => {
            let Some(dir) = config.paths.backup_dir.clone() else {
                anyhow::bail!(
                    "no backup path given; pass one or set paths.backup_dir (or PAGEDESK_BACKUP_DIR)"
                );
            };
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating backup directory {}", dir.display()))?;
            dir.join(format!(
                "pagedesk-{}",
                chrono::Local::now().format("%Y%m%d-%H%M%S")
            ))
        }
    };

    let storage = open_storage(cli, config)?;
    let (accounts_path, pages_path) = backup::write_backup(&storage, &base)?;

    println!("{} Backup written:", "✓".green());
    println!("  {}", accounts_path.display());
    println!("  {}", pages_path.display());
    Ok(())
}

fn cmd_restore(cli: &Cli, config: &Config, args: &cli::RestoreArgs) -> Result<()> {
    if !args.yes {
        println!(
            "{} Restore replaces {} in the database with the backup contents.",
            "!".yellow().bold(),
            "everything".bold()
        );
        println!("Re-run with {} to confirm.", "--yes".bold());
        return Ok(());
    }

    let mut storage = open_storage(cli, config)?;
    backup::restore_backup(&mut storage, &args.path)?;
    println!("{} Restore complete", "✓".green());
    Ok(())
}

fn cmd_completions(args: cli::CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "pagedesk", &mut io::stdout());
    Ok(())
}
