//! Bookmark Browser - Entry Point

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use bookmark_browser::model::AppError;
use bookmark_browser::pagination::{layout_items, PaginationItem};
use bookmark_browser::view::ResultItem;
use bookmark_browser::{page_skeleton, App, Mode};
use clap::Parser;
use tracing::info;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest title column before truncation.
const MAX_TITLE_WIDTH: usize = 48;

/// Bookmark Browser - browse, search and page through a bookmark tree
#[derive(Parser, Debug)]
#[command(name = "bmb")]
#[command(version)]
#[command(about = "Print a page of bookmarks from a bookmark tree JSON file")]
pub struct Args {
    /// Path to the bookmark JSON file (defaults to the configured data path)
    pub file: Option<PathBuf>,

    /// Search titles and URLs for a keyword
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page to show (must be positive)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,

    /// Viewport width in CSS pixels, selecting the page-size profile
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Open the folder with this index id
    #[arg(long)]
    pub folder: Option<usize>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the local cache
    #[arg(long)]
    pub no_cache: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Load(err)) => {
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("bmb: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = bookmark_browser::config::load_config_with_precedence(args.config.clone())?;
        let merged = bookmark_browser::config::merge_config(config_file);
        let with_env = bookmark_browser::config::apply_env_overrides(merged);
        let cache_override = args.no_cache.then_some(false);
        bookmark_browser::config::apply_cli_overrides(
            with_env,
            args.file.clone(),
            args.width,
            cache_override,
        )
    };

    let _log_guard = bookmark_browser::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let mut app = App::create(config, page_skeleton(false)?)?;
    app.load()?;

    if let Some(folder) = args.folder {
        if !app.open_folder(Some(folder)) {
            eprintln!("bmb: no folder with id {folder}; showing the top level");
        }
    }
    if let Some(keyword) = args.search.as_deref() {
        app.search(keyword)?;
    }
    if let Some(page) = args.page {
        let page = page as usize;
        if page != app.state().current_page && !app.go_to_page(page) {
            eprintln!(
                "bmb: page {page} is outside 1..={}",
                app.state().total_pages.max(1)
            );
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_listing(&app, &mut out)?;
    app.dispose();
    Ok(())
}

fn print_listing(app: &App, out: &mut impl Write) -> io::Result<()> {
    match app.mode() {
        Mode::Search(keyword) => writeln!(out, "Search \"{keyword}\": {} results", app.items().len())?,
        Mode::Folder(_) => {
            let crumbs: Vec<&str> = app.breadcrumb().iter().map(|e| e.title.as_str()).collect();
            if crumbs.is_empty() {
                writeln!(out, "(top level)")?;
            } else {
                writeln!(out, "{}", crumbs.join(" / "))?;
            }
        }
    }
    writeln!(out)?;

    let items = app.page_items();
    let width = items
        .iter()
        .map(|item| item.title.width())
        .max()
        .unwrap_or(0)
        .min(MAX_TITLE_WIDTH);
    for item in items {
        writeln!(out, "{}", format_row(item, width))?;
    }

    let state = app.state();
    if state.total_pages > 1 {
        writeln!(out)?;
        writeln!(out, "{}", pagination_line(app))?;
    }
    writeln!(
        out,
        "Page {}/{} ({} items)",
        state.current_page,
        state.total_pages.max(1),
        state.total_items
    )
}

fn format_row(item: &ResultItem, width: usize) -> String {
    match item.url.as_deref() {
        Some(url) => format!("    {}  {url}", fit(&item.title, width)),
        None => {
            let id = item.id.map(|id| format!("#{id} ")).unwrap_or_default();
            format!("[+] {}  {id}({} items)", fit(&item.title, width), item.children_count)
        }
    }
}

fn pagination_line(app: &App) -> String {
    layout_items(app.state(), app.pagination_config())
        .iter()
        .map(|item| match *item {
            PaginationItem::Prev { .. } => "‹".to_string(),
            PaginationItem::Next { .. } => "›".to_string(),
            PaginationItem::Page { page, current: true } => format!("[{page}]"),
            PaginationItem::Page { page, .. } => page.to_string(),
            PaginationItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pad or truncate `text` to exactly `width` terminal columns.
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    if text.width() <= width {
        out.push_str(text);
        used = text.width();
    } else if width > 0 {
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w + 1 > width {
                break;
            }
            out.push(c);
            used += w;
        }
        out.push('…');
        used += 1;
    }
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmark_browser::model::index::EntryKind;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["bmb", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["bmb"]);
        assert_eq!(args.file, None);
        assert_eq!(args.search, None);
        assert_eq!(args.page, None);
        assert_eq!(args.width, None);
        assert_eq!(args.folder, None);
        assert!(!args.no_cache);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from([
            "bmb", "data.json", "-s", "rust", "-p", "3", "-w", "400", "--folder", "7", "--no-cache",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("data.json")));
        assert_eq!(args.search.as_deref(), Some("rust"));
        assert_eq!(args.page, Some(3));
        assert_eq!(args.width, Some(400));
        assert_eq!(args.folder, Some(7));
        assert!(args.no_cache);
    }

    #[test]
    fn test_page_rejects_zero() {
        let err = Args::try_parse_from(["bmb", "--page", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn fit_pads_and_truncates_by_display_width() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("书签管理", 6), "书签… ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("abc", 0), "");
    }

    #[test]
    fn rows_show_url_or_child_count() {
        let bookmark = ResultItem {
            kind: EntryKind::Bookmark,
            id: Some(1),
            title: "Rust".into(),
            url: Some("https://rust-lang.org".into()),
            path: "Dev".into(),
            children_count: 0,
        };
        assert_eq!(format_row(&bookmark, 6), "    Rust    https://rust-lang.org");

        let folder = ResultItem {
            kind: EntryKind::Folder,
            id: Some(0),
            title: "Dev".into(),
            url: None,
            path: String::new(),
            children_count: 2,
        };
        assert_eq!(format_row(&folder, 4), "[+] Dev   #0 (2 items)");
    }
}
