//! Parsing of terminal input.

/// Resolve a choice field entry: a 1-based option number or the option text
/// (case-insensitive).
pub fn parse_choice(input: &str, options: &[&'static str]) -> Option<&'static str> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input))
        .copied()
}

/// Parse option numbers such as `1,3` or `2 4` into 0-based indices.
///
/// Duplicates are dropped, first occurrence wins. `None` if any entry is
/// not a number in `1..=count` or nothing was entered.
pub fn parse_selection(input: &str, count: usize) -> Option<Vec<usize>> {
    let mut picked = Vec::new();
    for part in input.split([',', ' ']).filter(|p| !p.is_empty()) {
        let n = part.parse::<usize>().ok()?;
        if n == 0 || n > count {
            return None;
        }
        if !picked.contains(&(n - 1)) {
            picked.push(n - 1);
        }
    }
    (!picked.is_empty()).then_some(picked)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    Confirm,
    /// 0-based section index.
    Edit(usize),
    Quit,
    Unknown,
}

/// Review sheet commands: Enter confirms, `e <n>` edits section `n`, `q` quits.
pub fn parse_review_command(input: &str, sections: usize) -> ReviewCommand {
    let input = input.trim();
    match input {
        "" => ReviewCommand::Confirm,
        "q" | "quit" => ReviewCommand::Quit,
        _ => {
            let Some(rest) = input.strip_prefix('e') else {
                return ReviewCommand::Unknown;
            };
            match rest.trim().parse::<usize>() {
                Ok(n) if (1..=sections).contains(&n) => ReviewCommand::Edit(n - 1),
                _ => ReviewCommand::Unknown,
            }
        }
    }
}

/// Which report formats to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportChoice {
    pub pdf: bool,
    pub docx: bool,
}

pub fn parse_export_choice(input: &str) -> Option<ExportChoice> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "n" | "none" => Some(ExportChoice::default()),
        "p" | "pdf" => Some(ExportChoice { pdf: true, docx: false }),
        "d" | "docx" => Some(ExportChoice { pdf: false, docx: true }),
        "b" | "both" => Some(ExportChoice { pdf: true, docx: true }),
        _ => None,
    }
}
