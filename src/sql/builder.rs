//! Command builder: accumulates statement text and cuts it into batches

use super::MigrationCommand;

const INDENT: &str = "    ";

/// Builds the ordered list of command batches for one compilation
#[derive(Debug, Default)]
pub struct CommandBuilder {
    commands: Vec<MigrationCommand>,
    current: String,
    indent: usize,
    at_line_start: bool,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self {
            at_line_start: true,
            ..Self::default()
        }
    }

    /// Append text, indenting it when it starts a line
    pub fn append(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        if self.at_line_start {
            for _ in 0..self.indent {
                self.current.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        self.current.push_str(text);
        self
    }

    pub fn append_line(&mut self, text: &str) -> &mut Self {
        self.append(text);
        self.current.push('\n');
        self.at_line_start = true;
        self
    }

    /// Append multi-line text, indenting every line
    pub fn append_lines(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            self.append_line(line);
        }
        self
    }

    pub fn increment_indent(&mut self) -> &mut Self {
        self.indent += 1;
        self
    }

    pub fn decrement_indent(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self
    }

    /// Close the current batch. Empty batches are discarded.
    pub fn end_command(&mut self, suppress_transaction: bool) -> &mut Self {
        let sql = self.current.trim_end().to_string();
        if !sql.is_empty() {
            self.commands.push(MigrationCommand {
                sql,
                suppress_transaction,
            });
        }
        self.current.clear();
        self.at_line_start = true;
        self.indent = 0;
        self
    }

    pub fn into_commands(mut self) -> Vec<MigrationCommand> {
        self.end_command(false);
        self.commands
    }
}
