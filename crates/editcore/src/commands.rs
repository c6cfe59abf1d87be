//! The editor's command surface: every toolbar/keyboard trigger, its name on
//! the command line and, for markup commands, the transform it runs.

use std::fmt;
use std::str::FromStr;

use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Bold,
    Italic,
    BoldItalic,
    InlineCode,
    Link,
    Image,
    Quote,
    ListItem,
    Heading1,
    Heading2,
    Heading3,
    Rule,
    Table,
    TaskItem,
    Footnote,
    Definition,
    Strikethrough,
    Highlight,
    Subscript,
    Superscript,
    Undo,
    Redo,
    Clear,
    Save,
}

const TABLE: &str = "| Column 1 | Column 2 |\n| -------- | -------- |\n| Cell 1   | Cell 2   |";

impl Command {
    pub const ALL: [Command; 24] = [
        Command::Bold,
        Command::Italic,
        Command::BoldItalic,
        Command::InlineCode,
        Command::Link,
        Command::Image,
        Command::Quote,
        Command::ListItem,
        Command::Heading1,
        Command::Heading2,
        Command::Heading3,
        Command::Rule,
        Command::Table,
        Command::TaskItem,
        Command::Footnote,
        Command::Definition,
        Command::Strikethrough,
        Command::Highlight,
        Command::Subscript,
        Command::Superscript,
        Command::Undo,
        Command::Redo,
        Command::Clear,
        Command::Save,
    ];

    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Bold => "bold",
            Command::Italic => "italic",
            Command::BoldItalic => "bold-italic",
            Command::InlineCode => "code",
            Command::Link => "link",
            Command::Image => "image",
            Command::Quote => "quote",
            Command::ListItem => "list",
            Command::Heading1 => "h1",
            Command::Heading2 => "h2",
            Command::Heading3 => "h3",
            Command::Rule => "rule",
            Command::Table => "table",
            Command::TaskItem => "task",
            Command::Footnote => "footnote",
            Command::Definition => "definition",
            Command::Strikethrough => "strike",
            Command::Highlight => "highlight",
            Command::Subscript => "sub",
            Command::Superscript => "sup",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Clear => "clear",
            Command::Save => "save",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Command::Bold => "Bold",
            Command::Italic => "Italic",
            Command::BoldItalic => "Bold italic",
            Command::InlineCode => "Inline code",
            Command::Link => "Link",
            Command::Image => "Image",
            Command::Quote => "Quote",
            Command::ListItem => "List item",
            Command::Heading1 => "Heading 1",
            Command::Heading2 => "Heading 2",
            Command::Heading3 => "Heading 3",
            Command::Rule => "Horizontal rule",
            Command::Table => "Table",
            Command::TaskItem => "Task",
            Command::Footnote => "Footnote",
            Command::Definition => "Definition",
            Command::Strikethrough => "Strikethrough",
            Command::Highlight => "Highlight",
            Command::Subscript => "Subscript",
            Command::Superscript => "Superscript",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::Clear => "Clear document",
            Command::Save => "Save",
        }
    }

    /// The markup edit behind this command, `None` for the non-markup ones.
    pub fn transform(&self) -> Option<Transform> {
        let op = match self {
            Command::Bold => Transform::wrap("**", "**"),
            Command::Italic => Transform::wrap("*", "*"),
            Command::BoldItalic => Transform::wrap("***", "***"),
            Command::InlineCode => Transform::wrap("`", "`"),
            Command::Link => Transform::wrap("[", "](https://)"),
            Command::Image => Transform::insert("![alt text](https://)"),
            Command::Quote => Transform::block("> Quote"),
            Command::ListItem => Transform::block("- List item"),
            Command::Heading1 => Transform::block("# Heading"),
            Command::Heading2 => Transform::block("## Heading"),
            Command::Heading3 => Transform::block("### Heading"),
            Command::Rule => Transform::block("---"),
            Command::Table => Transform::block(TABLE),
            Command::TaskItem => Transform::insert("- [ ] Task"),
            Command::Footnote => Transform::block("[^1]: Footnote"),
            Command::Definition => Transform::insert("Term\n: Definition"),
            Command::Strikethrough => Transform::insert("~~text~~"),
            Command::Highlight => Transform::insert("==text=="),
            Command::Subscript => Transform::insert("~sub~"),
            Command::Superscript => Transform::insert("^sup^"),
            Command::Undo | Command::Redo | Command::Clear | Command::Save => return None,
        };
        Some(op)
    }

    /// Commands that must be confirmed by the user before they run.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Command::Clear)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command: {}", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Command::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownCommand(name.to_string()))
    }
}
