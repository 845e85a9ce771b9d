use anyhow::Result;
use markdown_trellis_config::{Config, FileFilter, PatternSet};
use markdown_trellis_engine::{LineTree, io};
use std::{env, path::PathBuf, process};

struct CliArgs {
    notes_path: Option<PathBuf>,
    patterns: Vec<String>,
    html: bool,
}

fn parse_args(args: &[String]) -> Option<CliArgs> {
    let mut cli = CliArgs {
        notes_path: None,
        patterns: Vec::new(),
        html: false,
    };

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--html" => cli.html = true,
            "--pattern" => cli.patterns.push(rest.next()?.clone()),
            flag if flag.starts_with('-') => return None,
            path => {
                if cli.notes_path.is_some() {
                    return None;
                }
                cli.notes_path = Some(PathBuf::from(path));
            }
        }
    }

    Some(cli)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [--html] [--pattern <regex>]... [notes-folder-path]");
}

fn to_html(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(cli) = parse_args(&args) else {
        print_usage(&args[0]);
        process::exit(1);
    };

    // Determine notes path from CLI args or config file
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let notes_path;
    let from_config;

    if let Some(path) = cli.notes_path {
        notes_path = path;
        from_config = false;
    } else if let Some(config) = &config {
        notes_path = config.notes_path.clone();
        from_config = true;
    } else {
        eprintln!("Error: No notes path provided and no config file found");
        print_usage(&args[0]);
        eprintln!("Or create a config file at {}", config_path.display());
        process::exit(1);
    }

    // Validate notes directory using engine
    if let Err(e) = io::validate_notes_dir(&notes_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Notes path '{}'{} is invalid: {e}",
            notes_path.display(),
            source
        );
        process::exit(1);
    }

    // CLI patterns override the configured ones entirely
    let pattern_sources = if cli.patterns.is_empty() {
        config.as_ref().map(|c| c.patterns.clone()).unwrap_or_default()
    } else {
        cli.patterns
    };
    if pattern_sources.is_empty() {
        eprintln!("Error: No line patterns to search for");
        eprintln!("Pass --pattern <regex> or add a patterns list to the config file");
        process::exit(1);
    }
    let patterns = PatternSet::compile(&pattern_sources);
    if patterns.is_empty() {
        eprintln!("Error: None of the line patterns compiled");
        process::exit(1);
    }

    let filter = match &config {
        Some(config) => FileFilter::from_config(config),
        None => FileFilter::new(&[], &[]),
    };

    let files = io::scan_notes_dir(&notes_path)?;
    let mut matched_files = 0usize;

    for rel_path in &files {
        if !filter.matches(rel_path.as_str()) {
            continue;
        }

        let content = match io::read_file(rel_path, &notes_path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("skipping {rel_path}: {e}");
                continue;
            }
        };

        let lines = patterns.match_lines(&content);
        if lines.is_empty() {
            continue;
        }

        let tree = LineTree::parse(&content);
        let excerpt = tree.context_of_lines(&lines);

        if matched_files > 0 {
            println!();
        }
        println!("## {rel_path}");
        if cli.html {
            print!("{}", to_html(&excerpt));
        } else {
            print!("{excerpt}");
        }
        matched_files += 1;
    }

    log::info!("matched {matched_files} of {} scanned files", files.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        std::iter::once("markdown-trellis-cli")
            .chain(parts.iter().copied())
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_parse_args_with_path_and_flags() {
        let cli = parse_args(&args(&["--html", "--pattern", "TODO", "/tmp/notes"])).unwrap();

        assert!(cli.html);
        assert_eq!(cli.patterns, vec!["TODO".to_string()]);
        assert_eq!(cli.notes_path, Some(PathBuf::from("/tmp/notes")));
    }

    #[test]
    fn test_parse_args_allows_repeated_patterns() {
        let cli = parse_args(&args(&["--pattern", "TODO", "--pattern", "DONE"])).unwrap();

        assert_eq!(cli.patterns, vec!["TODO".to_string(), "DONE".to_string()]);
        assert_eq!(cli.notes_path, None);
        assert!(!cli.html);
    }

    #[test]
    fn test_parse_args_rejects_unknown_flag() {
        assert!(parse_args(&args(&["--frobnicate"])).is_none());
    }

    #[test]
    fn test_parse_args_rejects_second_path() {
        assert!(parse_args(&args(&["/tmp/a", "/tmp/b"])).is_none());
    }

    #[test]
    fn test_parse_args_rejects_pattern_without_value() {
        assert!(parse_args(&args(&["--pattern"])).is_none());
    }

    #[test]
    fn test_to_html_renders_list_markup() {
        let html = to_html("- goals\n  - ship parser\n");

        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>"));
        assert!(html.contains("goals"));
    }
}
