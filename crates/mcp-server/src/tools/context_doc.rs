/// Minimal `.context` document helpers.
///
/// Every tool answers with a short text document: one `A:` answer line,
/// `N:` notes, and optional `R:` reference lines for files written or read.
pub(crate) struct ContextDocBuilder {
    out: String,
}

impl ContextDocBuilder {
    const QUOTE_PREFIX: &'static str = " ";

    #[must_use]
    pub(crate) fn new() -> Self {
        let mut out = String::new();
        out.push_str("[CONTENT]\n");
        Self { out }
    }

    #[must_use]
    pub(crate) fn finish(self) -> String {
        self.out
    }

    pub(crate) fn push_line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    pub(crate) fn push_answer(&mut self, text: &str) {
        self.push_line(&format!("A: {text}"));
    }

    pub(crate) fn push_note(&mut self, text: &str) {
        self.push_line(&format!("N: {text}"));
    }

    pub(crate) fn push_ref(&mut self, path: &str, label: Option<&str>) {
        match label {
            Some(label) if !label.trim().is_empty() => {
                self.push_line(&format!("R: {path} {label}"));
            }
            _ => self.push_line(&format!("R: {path}")),
        }
    }

    fn line_needs_quoting(line: &str) -> bool {
        let trimmed = line.trim_start();
        ["[CONTENT]", "A:", "N:", "R:"]
            .iter()
            .any(|marker| trimmed.starts_with(marker))
    }

    /// Push a multi-line block, quoting only lines that would read as
    /// envelope markers.
    pub(crate) fn push_block_smart(&mut self, block: &str) {
        for line in block.lines() {
            if Self::line_needs_quoting(line) {
                self.out.push_str(Self::QUOTE_PREFIX);
            }
            self.out.push_str(line);
            self.out.push('\n');
        }
    }
}
