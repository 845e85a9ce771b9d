// Benchmark helpers; dead-code analysis cannot see uses from sibling bench
// targets, hence the allows.
#[allow(dead_code)]
pub fn generate_notes_content(size: usize) -> String {
    let base = "- goals\n  - first task\n    - a deeper note\n  - second task\n\n> [!note] Caveats\n> - main risk\n>   - detail on the risk\n\n| col a | col b |\n|---|---|\n| 1 | 2 |\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_deep_lists(sections: usize, depth: usize) -> String {
    let mut content = String::new();

    for section in 0..sections {
        content.push_str(&format!("- section {}\n", section));
        for level in 1..=depth {
            content.push_str(&"  ".repeat(level));
            content.push_str(&format!("- item at level {}\n", level));
        }
        content.push('\n');
    }

    content
}
