//! Treeviz formatter for syntax trees
//!
//! One line per node, nesting drawn with box connectors:
//!
//!     <prefix><connector> <icon> <label> (label truncated to 30 characters)
//!
//! Example:
//!
//!     ⧉ Module
//!     ├─ ƒ FunctionDef f
//!     │ ├─ ○ Parameters
//!     │ └─ ▤ Suite
//!     │   └─ ○ Pass
//!     └─ ⚠ Error x = = 1
//!
//! Icons
//!     Module: ⧉
//!     Suite: ▤
//!     FunctionDef, Lambda: ƒ
//!     ClassDef: §
//!     If, Elif, Else, While, For, Try, ExceptHandler, Finally, With: ⑂
//!     Name: ◦
//!     Num, Str: "
//!     Call: ⇥
//!     Error: ⚠
//!     everything else: ○

use crate::pysyn::ast::{snapshot_from_node, AstSnapshot, Node};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        "Module" => "⧉",
        "Suite" => "▤",
        "FunctionDef" | "Lambda" => "ƒ",
        "ClassDef" => "§",
        "If" | "Elif" | "Else" | "While" | "For" | "Try" | "ExceptHandler" | "Finally"
        | "With" => "⑂",
        "Name" => "◦",
        "Num" | "Str" => "\"",
        "Call" => "⇥",
        "Error" => "⚠",
        _ => "○",
    }
}

fn line_label(snapshot: &AstSnapshot) -> String {
    let label = snapshot.label.replace('\n', "↵");
    if label.is_empty() {
        snapshot.node_type.clone()
    } else {
        format!("{} {}", snapshot.node_type, truncate(&label, 30))
    }
}

fn format_snapshot(snapshot: &AstSnapshot, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    output.push_str(&format!(
        "{}{} {} {}\n",
        prefix,
        connector,
        get_icon(&snapshot.node_type),
        line_label(snapshot)
    ));

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let child_count = snapshot.children.len();
    for (i, child) in snapshot.children.iter().enumerate() {
        format_snapshot(child, &child_prefix, i == child_count - 1, output);
    }
}

pub fn to_treeviz_str(node: &Node) -> String {
    let snapshot = snapshot_from_node(node);
    let mut output = format!("{} {}\n", get_icon(&snapshot.node_type), line_label(&snapshot));
    let child_count = snapshot.children.len();
    for (i, child) in snapshot.children.iter().enumerate() {
        format_snapshot(child, "", i == child_count - 1, &mut output);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pysyn::grammar::GrammarVersion;
    use crate::pysyn::session::{parse, ParseOptions};

    #[test]
    fn test_treeviz_layout() {
        let result = parse(
            "def f():\n    pass\nx\n",
            GrammarVersion::LATEST,
            &ParseOptions::default(),
        )
        .unwrap();
        let expected = "\
⧉ Module
├─ ƒ FunctionDef f
│ ├─ ○ Parameters
│ └─ ▤ Suite
│   └─ ○ Pass
└─ ○ Expr
  └─ ◦ Name x
";
        assert_eq!(to_treeviz_str(&result.tree), expected);
    }

    #[test]
    fn test_long_labels_are_truncated() {
        let name = "a".repeat(40);
        let result = parse(&format!("{name}\n"), GrammarVersion::LATEST, &ParseOptions::default()).unwrap();
        let output = to_treeviz_str(&result.tree);
        assert!(output.contains(&format!("Name {}...", "a".repeat(30))));
    }
}
