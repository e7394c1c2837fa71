//! Interactive command shell over a live session.
//!
//! One command per line; double quotes group arguments containing spaces.
//! The shell only parses, resolves paths against the current directory, and
//! renders. Every remote round-trip goes through the session.

use std::io::Write as _;
use std::path::Path;

use tokio::io::{self, AsyncBufReadExt, BufReader, Lines};

use crate::api::types::{Entry, UploadFile, ROOT_PATH};
use crate::api::RemoteApi;
use crate::error::{AppError, Result};
use crate::session::Session;
use crate::view::tree::TreeNode;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    Find(String),
    ChangeDir(String),
    PrintPath,
    Tree,
    MakeDir(String),
    Link { name: String, target: String },
    Move { path: String, new_name: String },
    Remove(String),
    Put(Vec<String>),
    Refresh,
    Help,
    Quit,
}

/// Run the prompt loop until `quit` or end of input.
///
/// Startup performs the initial sync: listing of the root, then the tree.
/// Either may fail without aborting the shell; `refresh` retries both.
pub async fn run<A: RemoteApi>(session: &Session<A>, confirm_delete: bool) -> Result<()> {
    if let Err(e) = session.navigate_to(ROOT_PATH).await {
        eprintln!("error: initial listing failed: {e}");
    }
    if let Err(e) = session.refresh_tree().await {
        eprintln!("error: initial tree fetch failed: {e}");
    }

    println!("Type 'help' for commands.");
    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        print!("{} > ", display_path(&session.current_path()));
        let _ = std::io::stdout().flush();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let tokens = tokenize(&line);
        if tokens.is_empty() {
            continue;
        }
        match parse(&tokens) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(e) = execute(session, &mut lines, confirm_delete, command).await {
                    eprintln!("error: {e}");
                }
            }
            Err(usage) => eprintln!("{usage}"),
        }
    }
    Ok(())
}

async fn execute<A: RemoteApi>(
    session: &Session<A>,
    lines: &mut Lines<BufReader<io::Stdin>>,
    confirm_delete: bool,
    command: Command,
) -> Result<()> {
    match command {
        Command::List => {
            let entries = session.listing(None);
            if entries.is_empty() {
                println!("(empty)");
            }
            for entry in &entries {
                println!("{}", render_entry(entry));
            }
        }
        Command::Find(term) => {
            let hits = session.listing(Some(term.as_str()));
            if hits.is_empty() {
                println!("no matches");
            }
            for entry in &hits {
                println!("{}", render_entry(entry));
            }
        }
        Command::ChangeDir(arg) => {
            let target = resolve_path(&session.current_path(), &arg);
            session.navigate_to(&target).await?;
        }
        Command::PrintPath => {
            println!("{}", display_path(&session.current_path()));
        }
        Command::Tree => match session.tree() {
            Some(root) => {
                let trail = session
                    .active_trail()
                    .unwrap_or_else(|| vec![ROOT_PATH.to_string()]);
                for line in tree_lines(&root, &trail) {
                    println!("{line}");
                }
            }
            None => println!("no tree cached; run 'refresh'"),
        },
        Command::MakeDir(name) => {
            let current = session.current_path();
            session.create_directory(&current, &name).await?;
            println!("created {}", display_path(&join_path(&current, name.trim())));
        }
        Command::Link { name, target } => {
            let current = session.current_path();
            session.create_symlink(&current, &name, &target).await?;
            println!("linked {} -> {}", name.trim(), target.trim());
        }
        Command::Move { path, new_name } => {
            let old_path = resolve_path(&session.current_path(), &path);
            session.rename(&old_path, &new_name).await?;
            println!("renamed {} to {}", display_path(&old_path), new_name.trim());
        }
        Command::Remove(path) => {
            let target = resolve_path(&session.current_path(), &path);
            if confirm_delete && !confirm(lines, &target).await? {
                println!("cancelled");
                return Ok(());
            }
            session.delete(&target).await?;
            println!("deleted {}", display_path(&target));
        }
        Command::Put(paths) => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                let name = Path::new(path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| AppError::Validation(format!("not a file name: {path}")))?
                    .to_string();
                let bytes = tokio::fs::read(path).await?;
                files.push(UploadFile { name, bytes });
            }
            let current = session.current_path();
            let outcome = session.upload(&current, &files).await?;
            if outcome.success && outcome.errors.is_empty() {
                println!("uploaded {} file(s)", files.len());
            } else if outcome.errors.is_empty() {
                println!("upload failed");
            } else {
                for message in &outcome.errors {
                    println!("upload error: {message}");
                }
            }
        }
        Command::Refresh => {
            let current = session.current_path();
            session.navigate_to(&current).await?;
            session.refresh_tree().await?;
        }
        Command::Help => print_help(),
        Command::Quit => unreachable!("handled by the loop"),
    }
    Ok(())
}

async fn confirm(lines: &mut Lines<BufReader<io::Stdin>>, target: &str) -> Result<bool> {
    print!("delete {}? [y/N] ", display_path(target));
    let _ = std::io::stdout().flush();
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

// ── Command parsing ──

fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse(tokens: &[String]) -> std::result::Result<Command, String> {
    let Some(head) = tokens.first() else {
        return Err("empty command".to_string());
    };
    match (head.as_str(), tokens.len()) {
        ("ls", 1) => Ok(Command::List),
        ("ls", _) => Err("usage: ls".into()),
        ("find", 2) => Ok(Command::Find(tokens[1].clone())),
        ("find", _) => Err("usage: find <term>".into()),
        ("cd", 1) => Ok(Command::ChangeDir("/".into())),
        ("cd", 2) => Ok(Command::ChangeDir(tokens[1].clone())),
        ("cd", _) => Err("usage: cd <path>".into()),
        ("pwd", 1) => Ok(Command::PrintPath),
        ("pwd", _) => Err("usage: pwd".into()),
        ("tree", 1) => Ok(Command::Tree),
        ("tree", _) => Err("usage: tree".into()),
        ("mkdir", 2) => Ok(Command::MakeDir(tokens[1].clone())),
        ("mkdir", _) => Err("usage: mkdir <name>".into()),
        ("ln", 3) => Ok(Command::Link {
            name: tokens[1].clone(),
            target: tokens[2].clone(),
        }),
        ("ln", _) => Err("usage: ln <name> <target>".into()),
        ("mv", 3) => Ok(Command::Move {
            path: tokens[1].clone(),
            new_name: tokens[2].clone(),
        }),
        ("mv", _) => Err("usage: mv <path> <new-name>".into()),
        ("rm", 2) => Ok(Command::Remove(tokens[1].clone())),
        ("rm", _) => Err("usage: rm <path>".into()),
        ("put", n) if n >= 2 => Ok(Command::Put(tokens[1..].to_vec())),
        ("put", _) => Err("usage: put <file> [<file>...]".into()),
        ("refresh", _) => Ok(Command::Refresh),
        ("help", _) => Ok(Command::Help),
        ("quit" | "exit", _) => Ok(Command::Quit),
        (other, _) => Err(format!("unknown command: {other} (try 'help')")),
    }
}

// ── Path resolution ──

/// Resolve a command argument against the current directory. `..` walks up,
/// a leading `/` (or `.`) addresses from the root, anything else descends.
fn resolve_path(current: &str, arg: &str) -> String {
    let arg = arg.trim();
    if arg.is_empty() || arg == "/" || arg == ROOT_PATH {
        return ROOT_PATH.to_string();
    }
    if arg == ".." {
        return parent_path(current);
    }
    if let Some(rest) = arg.strip_prefix('/') {
        let rest = rest.trim_matches('/');
        return if rest.is_empty() {
            ROOT_PATH.to_string()
        } else {
            rest.to_string()
        };
    }
    join_path(current, arg.trim_end_matches('/'))
}

fn parent_path(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => parent.to_string(),
        _ => ROOT_PATH.to_string(),
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base == ROOT_PATH {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

// ── Rendering ──

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// The root path renders as `/`; everything else gets a leading slash.
fn display_path(path: &str) -> String {
    if path == ROOT_PATH {
        "/".to_string()
    } else {
        format!("/{path}")
    }
}

/// Humanize a byte count in powers of 1024, trailing zeros trimmed.
fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut exp = ((bytes as f64).log(1024.0).floor() as usize).min(SIZE_UNITS.len() - 1);
    let mut value = bytes as f64 / 1024f64.powi(exp as i32);
    // Guard against the log ratio landing just under a whole power.
    if value >= 1024.0 && exp < SIZE_UNITS.len() - 1 {
        exp += 1;
        value = bytes as f64 / 1024f64.powi(exp as i32);
    }
    let mut text = format!("{value:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    format!("{text} {}", SIZE_UNITS[exp])
}

fn format_time(secs: i64) -> String {
    match chrono::DateTime::from_timestamp(secs, 0) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn render_entry(entry: &Entry) -> String {
    let marker = if entry.is_dir {
        'd'
    } else if entry.is_symlink {
        'l'
    } else {
        '-'
    };
    let size = if entry.is_dir {
        "-".to_string()
    } else {
        format_size(entry.size)
    };
    let mut label = entry.name.clone();
    if entry.is_symlink {
        if let Some(target) = &entry.symlink_target {
            label.push_str(&format!(" -> {target}"));
        }
    }
    format!("{marker}  {size:>10}  {}  {label}", format_time(entry.mod_time))
}

/// Render the tree with children expanded only along `trail`; the last
/// trail element is flagged as the current directory.
fn tree_lines(root: &TreeNode, trail: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    push_tree_lines(root, 0, trail, &mut lines);
    lines
}

fn push_tree_lines(node: &TreeNode, depth: usize, trail: &[String], lines: &mut Vec<String>) {
    let flag = if trail.last().is_some_and(|p| p == &node.path) {
        '*'
    } else {
        ' '
    };
    let mut label = node.name.clone();
    if node.is_symlink {
        if let Some(target) = &node.symlink_target {
            label.push_str(&format!(" -> {target}"));
        }
    }
    lines.push(format!("{flag} {}{label}", "  ".repeat(depth)));
    if trail.iter().any(|p| p == &node.path) {
        for child in node.children.values() {
            push_tree_lines(child, depth + 1, trail, lines);
        }
    }
}

fn print_help() {
    println!(
        "\
ls                      list the current directory
find <term>             filter the listing by name, case-insensitive
cd <path>               enter a directory; '..' goes up, '/' returns to the root
pwd                     show the current directory
tree                    show the directory tree, expanded along the current path
mkdir <name>            create a directory in the current directory
ln <name> <target>      create a symlink in the current directory
mv <path> <new-name>    rename a file or directory
rm <path>               delete a file or directory
put <file> [<file>...]  upload local files into the current directory
refresh                 refetch the listing and the tree
help                    show this help
quit                    exit"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tree;

    fn cmd(line: &str) -> std::result::Result<Command, String> {
        parse(&tokenize(line))
    }

    fn dir(name: &str, path: &str) -> Entry {
        Entry {
            name: name.to_string(),
            path: path.to_string(),
            is_dir: true,
            ..Default::default()
        }
    }

    #[test]
    fn tokenize_splits_on_runs_of_whitespace() {
        assert_eq!(tokenize("ls"), vec!["ls"]);
        assert_eq!(tokenize("  mv  a.txt   b.txt "), vec!["mv", "a.txt", "b.txt"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn tokenize_groups_double_quoted_arguments() {
        assert_eq!(tokenize(r#"mkdir "my docs""#), vec!["mkdir", "my docs"]);
        assert_eq!(
            tokenize(r#"mv "old name.txt" "new name.txt""#),
            vec!["mv", "old name.txt", "new name.txt"]
        );
        // Quotes glue onto the surrounding token instead of starting a new one.
        assert_eq!(tokenize(r#"cd pro"ject s"1"#), vec!["cd", "project s1"]);
    }

    #[test]
    fn parse_recognizes_each_command() {
        assert_eq!(cmd("ls"), Ok(Command::List));
        assert_eq!(cmd("find notes"), Ok(Command::Find("notes".into())));
        assert_eq!(cmd("cd docs"), Ok(Command::ChangeDir("docs".into())));
        assert_eq!(cmd("cd"), Ok(Command::ChangeDir("/".into())));
        assert_eq!(cmd("pwd"), Ok(Command::PrintPath));
        assert_eq!(cmd("tree"), Ok(Command::Tree));
        assert_eq!(cmd(r#"mkdir "my docs""#), Ok(Command::MakeDir("my docs".into())));
        assert_eq!(
            cmd("ln data /mnt/data"),
            Ok(Command::Link {
                name: "data".into(),
                target: "/mnt/data".into()
            })
        );
        assert_eq!(
            cmd("mv a.txt b.txt"),
            Ok(Command::Move {
                path: "a.txt".into(),
                new_name: "b.txt".into()
            })
        );
        assert_eq!(cmd("rm old"), Ok(Command::Remove("old".into())));
        assert_eq!(
            cmd("put a.bin b.bin"),
            Ok(Command::Put(vec!["a.bin".into(), "b.bin".into()]))
        );
        assert_eq!(cmd("refresh"), Ok(Command::Refresh));
        assert_eq!(cmd("help"), Ok(Command::Help));
        assert_eq!(cmd("quit"), Ok(Command::Quit));
        assert_eq!(cmd("exit"), Ok(Command::Quit));
    }

    #[test]
    fn parse_reports_usage_for_wrong_arity() {
        assert!(cmd("find").unwrap_err().starts_with("usage:"));
        assert!(cmd("mv only-one").unwrap_err().starts_with("usage:"));
        assert!(cmd("put").unwrap_err().starts_with("usage:"));
        assert!(cmd("ls extra").unwrap_err().starts_with("usage:"));
    }

    #[test]
    fn parse_rejects_unknown_commands() {
        assert!(cmd("frobnicate").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn parent_walks_one_level_toward_root() {
        assert_eq!(parent_path("docs/api/v2"), "docs/api");
        assert_eq!(parent_path("docs"), ROOT_PATH);
        assert_eq!(parent_path(ROOT_PATH), ROOT_PATH);
    }

    #[test]
    fn targets_resolve_against_the_current_directory() {
        assert_eq!(resolve_path(ROOT_PATH, "docs"), "docs");
        assert_eq!(resolve_path("docs", "api"), "docs/api");
        assert_eq!(resolve_path("docs", "api/v2"), "docs/api/v2");
        assert_eq!(resolve_path("docs/api", ".."), "docs");
        assert_eq!(resolve_path(ROOT_PATH, ".."), ROOT_PATH);
        assert_eq!(resolve_path("docs", "/"), ROOT_PATH);
        assert_eq!(resolve_path("docs", "."), ROOT_PATH);
        assert_eq!(resolve_path("docs", "/media/raw"), "media/raw");
        assert_eq!(resolve_path("docs", "api/"), "docs/api");
    }

    #[test]
    fn root_displays_as_slash() {
        assert_eq!(display_path(ROOT_PATH), "/");
        assert_eq!(display_path("docs/api"), "/docs/api");
    }

    #[test]
    fn sizes_humanize_in_powers_of_1024() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1), "1 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
        assert_eq!(format_size(123_456_789), "117.74 MB");
        assert_eq!(format_size(5 * 1024u64.pow(4)), "5 TB");
    }

    #[test]
    fn times_render_as_utc_minutes() {
        assert_eq!(format_time(0), "1970-01-01 00:00");
        assert_eq!(format_time(1_700_000_000), "2023-11-14 22:13");
        assert_eq!(format_time(i64::MAX), "-");
    }

    #[test]
    fn listing_rows_show_kind_size_and_symlink_target() {
        let file = Entry {
            name: "notes.txt".to_string(),
            path: "docs/notes.txt".to_string(),
            size: 1536,
            mod_time: 1_700_000_000,
            ..Default::default()
        };
        let row = render_entry(&file);
        assert!(row.starts_with('-'));
        assert!(row.contains("1.5 KB"));
        assert!(row.contains("2023-11-14 22:13"));
        assert!(row.ends_with("notes.txt"));

        let row = render_entry(&dir("api", "docs/api"));
        assert!(row.starts_with('d'));
        assert!(row.ends_with("api"));

        let link = Entry {
            name: "data".to_string(),
            path: "data".to_string(),
            is_symlink: true,
            symlink_target: Some("/mnt/data".to_string()),
            ..Default::default()
        };
        let row = render_entry(&link);
        assert!(row.starts_with('l'));
        assert!(row.ends_with("data -> /mnt/data"));
    }

    #[test]
    fn tree_expands_only_along_the_trail() {
        let entries = vec![
            dir("docs", "docs"),
            dir("api", "docs/api"),
            dir("media", "media"),
        ];
        let root = tree::build(&entries);

        let trail = vec![ROOT_PATH.to_string(), "docs".to_string()];
        assert_eq!(
            tree_lines(&root, &trail),
            vec!["  /", "*   docs", "      api", "    media"]
        );
    }

    #[test]
    fn tree_flags_the_root_when_it_is_current() {
        let link = Entry {
            name: "link".to_string(),
            path: "link".to_string(),
            is_symlink: true,
            symlink_target: Some("/mnt".to_string()),
            ..Default::default()
        };
        let entries = vec![dir("docs", "docs"), dir("api", "docs/api"), link];
        let root = tree::build(&entries);

        let trail = vec![ROOT_PATH.to_string()];
        assert_eq!(
            tree_lines(&root, &trail),
            vec!["* /", "    docs", "    link -> /mnt"]
        );
    }
}
