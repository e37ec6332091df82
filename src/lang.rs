use once_cell::sync::Lazy;
use regex::Regex;

/// How a language marks the end of a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryStyle {
    /// Body closes when the net `{`/`}` count returns to zero.
    Brace,
    /// Body ends at the first substantive line dedented to the header's level.
    Indent,
}

/// Heuristic profile for one language family: ordered header patterns plus
/// the boundary style used to find where a matched function ends.
pub struct LanguageProfile {
    pub name: &'static str,
    pub style: BoundaryStyle,
    /// Tried in order against each line; the first match wins and capture
    /// group 1 is the function name.
    pub headers: Vec<Regex>,
}

static JAVASCRIPT: Lazy<LanguageProfile> = Lazy::new(|| LanguageProfile {
    name: "javascript",
    style: BoundaryStyle::Brace,
    headers: vec![
        // function declaration: function name() {
        Regex::new(r"^\s*function\s+(\w+)\s*\(").unwrap(),
        // arrow function: const name = () => {
        Regex::new(r"^\s*(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s*)?\([^)]*\)\s*=>").unwrap(),
        // bare method: name() {
        Regex::new(r"^\s*(?:async\s+)?(\w+)\s*\([^)]*\)\s*\{").unwrap(),
        // modified method: public async name() {
        Regex::new(r"^\s*(?:public|private|protected|static)?\s*(?:async\s+)?(\w+)\s*\([^)]*\)\s*\{")
            .unwrap(),
    ],
});

static JAVA: Lazy<LanguageProfile> = Lazy::new(|| LanguageProfile {
    name: "java",
    style: BoundaryStyle::Brace,
    headers: vec![
        // [modifiers] returnType methodName(params) [throws ...] {
        Regex::new(
            r"^\s*(?:public|private|protected)?\s*(?:static)?\s*(?:final)?\s*(?:synchronized)?\s*[\w<>\[\]]+\s+(\w+)\s*\([^)]*\)\s*(?:throws\s+[\w\s,]+)?\s*\{",
        )
        .unwrap(),
    ],
});

static PYTHON: Lazy<LanguageProfile> = Lazy::new(|| LanguageProfile {
    name: "python",
    style: BoundaryStyle::Indent,
    headers: vec![Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)\s*\(").unwrap()],
});

/// Maps a file extension (without the dot) to its scanning profile.
/// Unknown extensions are not scanned.
pub fn profile_for_extension(ext: &str) -> Option<&'static LanguageProfile> {
    match ext {
        "js" | "jsx" | "ts" | "tsx" | "mjs" => Some(&JAVASCRIPT),
        "java" => Some(&JAVA),
        "py" => Some(&PYTHON),
        _ => None,
    }
}

/// All extensions the walker should pick up.
pub const SCANNED_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "java", "py"];
