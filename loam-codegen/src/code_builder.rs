//! Code builder utility for templates that emit indented text.

/// Indentation style for generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// Spaces with the specified width.
    Spaces(u8),
    /// Tab character.
    Tab,
}

impl Indent {
    /// 2-space indentation (TypeScript, JSON).
    pub const TYPESCRIPT: Self = Self::Spaces(2);

    /// 2-space indentation for SQL column lists.
    pub const SQL: Self = Self::Spaces(2);

    /// Convert to the string representation for one indent level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spaces(2) => "  ",
            Self::Spaces(4) => "    ",
            Self::Spaces(8) => "        ",
            // Fallback to 4 whitespaces
            Self::Spaces(_) => "    ",
            Self::Tab => "\t",
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::TYPESCRIPT
    }
}

/// Fluent API for building code with proper indentation.
///
/// Every method consumes the builder and returns it, so output reads top to
/// bottom in the order it is emitted.
///
/// ```
/// use loam_codegen::CodeBuilder;
///
/// let code = CodeBuilder::typescript()
///     .block_with_close("export interface User {", "}", |b| {
///         b.line("email: string;")
///     })
///     .build();
///
/// assert_eq!(code, "export interface User {\n  email: string;\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    indent_level: usize,
    indent: Indent,
    buffer: String,
}

impl CodeBuilder {
    /// Create a new CodeBuilder with the specified indentation.
    pub fn new(indent: Indent) -> Self {
        Self {
            indent_level: 0,
            indent,
            buffer: String::new(),
        }
    }

    /// Create a new CodeBuilder with 2-space indentation (JS/TS default).
    pub fn typescript() -> Self {
        Self::new(Indent::TYPESCRIPT)
    }

    /// Create a new CodeBuilder for SQL scripts.
    pub fn sql() -> Self {
        Self::new(Indent::SQL)
    }

    /// Add a line of code with current indentation.
    pub fn line(mut self, s: &str) -> Self {
        self.write_indent();
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Add a blank line (no indentation).
    pub fn blank(mut self) -> Self {
        self.buffer.push('\n');
        self
    }

    /// Increase indentation level.
    pub fn indent(mut self) -> Self {
        self.indent_level += 1;
        self
    }

    /// Decrease indentation level.
    pub fn dedent(mut self) -> Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    /// Add a block with a closing line.
    pub fn block_with_close<F>(self, header: &str, close: &str, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let builder = self.line(header).indent();
        f(builder).dedent().line(close)
    }

    /// Add a comment line with the given prefix (e.g. `//` or `--`).
    pub fn doc(mut self, prefix: &str, text: &str) -> Self {
        self.write_indent();
        self.buffer.push_str(prefix);
        self.buffer.push(' ');
        self.buffer.push_str(text);
        self.buffer.push('\n');
        self
    }

    /// Conditionally add content.
    pub fn when<F>(self, condition: bool, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if condition { f(self) } else { self }
    }

    /// Iterate and add content for each item.
    pub fn each<T, I, F>(mut self, items: I, f: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(Self, T) -> Self,
    {
        for item in items {
            self = f(self, item);
        }
        self
    }

    /// Consume the builder and return the generated code.
    pub fn build(self) -> String {
        self.buffer
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(self.indent.as_str());
        }
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::typescript()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let code = CodeBuilder::typescript()
            .line("function main() {")
            .indent()
            .line("return 1;")
            .dedent()
            .line("}")
            .build();

        assert_eq!(code, "function main() {\n  return 1;\n}\n");
    }

    #[test]
    fn test_block() {
        let code = CodeBuilder::sql()
            .block_with_close("CREATE TABLE users (", ");", |b| b.line("id TEXT"))
            .build();

        assert_eq!(code, "CREATE TABLE users (\n  id TEXT\n);\n");
    }

    #[test]
    fn test_blank_and_doc() {
        let code = CodeBuilder::sql()
            .doc("--", "generated")
            .blank()
            .line("SELECT 1;")
            .build();

        assert_eq!(code, "-- generated\n\nSELECT 1;\n");
    }

    #[test]
    fn test_conditional() {
        let with = CodeBuilder::typescript()
            .when(true, |b| b.doc("//", "Requires auth"))
            .line("list();")
            .build();
        let without = CodeBuilder::typescript()
            .when(false, |b| b.doc("//", "Requires auth"))
            .line("list();")
            .build();

        assert_eq!(with, "// Requires auth\nlist();\n");
        assert_eq!(without, "list();\n");
    }

    #[test]
    fn test_each() {
        let code = CodeBuilder::typescript()
            .block_with_close("export type Status =", "", |b| {
                b.each(["draft", "live"], |b, v| b.line(&format!("| '{}'", v)))
            })
            .build();

        assert_eq!(code, "export type Status =\n  | 'draft'\n  | 'live'\n\n");
    }

    #[test]
    fn test_indent_as_str() {
        assert_eq!(Indent::Spaces(2).as_str(), "  ");
        assert_eq!(Indent::Spaces(4).as_str(), "    ");
        assert_eq!(Indent::Tab.as_str(), "\t");
        assert_eq!(Indent::default(), Indent::TYPESCRIPT);
    }
}
