//! Hand-rolled argument parsing (spec.md §6.1), mirroring the original
//! tool's `command_line.{hpp,cpp}` `ParameterName`/`Arguments` shape: every
//! flag is recognized by a long form and a short alias, matched linearly
//! rather than through a derive-based parser (the teacher workspace has no
//! CLI argument crate to borrow for this single-command surface).

use std::path::PathBuf;

/// The long and short spelling a single flag is recognized by.
struct ParameterName {
    long: &'static str,
    short: &'static str,
}

impl ParameterName {
    const fn new(long: &'static str, short: &'static str) -> Self {
        Self { long, short }
    }

    fn matches(&self, arg: &str) -> bool {
        arg == self.long || arg == self.short
    }
}

const HELP: ParameterName = ParameterName::new("--help", "-h");
const PATH: ParameterName = ParameterName::new("--path", "-p");
const PATH_FILE: ParameterName = ParameterName::new("--path-file", "-pf");
const SHOW_AST: ParameterName = ParameterName::new("--show-ast", "-sa");
const SHOW_VAR_TYPES: ParameterName = ParameterName::new("--show-var-types", "-sv");
const SHOW_FN_TYPES: ParameterName = ParameterName::new("--show-function-types", "-sf");
const HIDE_FN_TYPES: ParameterName = ParameterName::new("--hide-function-types", "-hf");
const ARROW_FN_TYPES: ParameterName = ParameterName::new("--arrow-function-types", "-aft");
const MATLAB_FN_TYPES: ParameterName = ParameterName::new("--matlab-function-types", "-mft");
const SHOW_VISITED: ParameterName = ParameterName::new("--show-visited-files", "-svf");
const SHOW_DIST: ParameterName = ParameterName::new("--show-dist", "-sd");
const EXPLICIT_DT: ParameterName = ParameterName::new("--explicit-dt", "-edt");
const EXPLICIT_ALIASES: ParameterName = ParameterName::new("--explicit-aliases", "-ea");
const PLAIN_TEXT: ParameterName = ParameterName::new("--plain-text", "-pt");
const SHOW_ERRORS: ParameterName = ParameterName::new("--show-errors", "-he");
const SHOW_WARNINGS: ParameterName = ParameterName::new("--show-warnings", "-hw");
const SHOW_DIAGNOSTICS: ParameterName = ParameterName::new("--show-diagnostics", "-sdi");
/// Supplemented (not in spec.md's table): the original's
/// `initial_store_capacity` tuning knob, carried over since it shapes the
/// type pool's preallocation (§4.B).
const STORE_CAPACITY: ParameterName = ParameterName::new("--store-capacity", "-sc");

pub struct CliOptions {
    pub search_path: Option<String>,
    pub path_file: Option<PathBuf>,
    pub root_identifiers: Vec<String>,

    pub show_ast: bool,
    pub show_local_variable_types: bool,
    pub show_local_function_types: bool,
    pub use_arrow_function_notation: bool,
    pub show_visited_external_files: bool,
    pub show_type_distribution: bool,
    pub show_explicit_destructured_tuples: bool,
    pub show_explicit_aliases: bool,
    pub rich_text: bool,
    pub show_errors: bool,
    pub show_warnings: bool,
    pub show_diagnostics: bool,
    pub show_help_text: bool,
    pub store_capacity: usize,

    /// Set when parsing the command line itself fails — an unknown flag or
    /// a value-flag missing its value. Drives the `-1` exit code the same
    /// way the original's `had_parse_error` does.
    pub had_parse_error: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            search_path: None,
            path_file: None,
            root_identifiers: Vec::new(),
            show_ast: false,
            show_local_variable_types: false,
            show_local_function_types: true,
            use_arrow_function_notation: false,
            show_visited_external_files: false,
            show_type_distribution: false,
            show_explicit_destructured_tuples: false,
            show_explicit_aliases: false,
            rich_text: true,
            show_errors: true,
            show_warnings: true,
            show_diagnostics: true,
            show_help_text: false,
            store_capacity: 100_000,
            had_parse_error: false,
        }
    }
}

impl CliOptions {
    pub fn parse(args: &[String]) -> Self {
        let mut opts = Self::default();
        let mut i = 0;

        while i < args.len() {
            let arg = args[i].as_str();

            if HELP.matches(arg) {
                opts.show_help_text = true;
            } else if PATH.matches(arg) {
                match args.get(i + 1) {
                    Some(v) => {
                        opts.search_path = Some(v.clone());
                        i += 1;
                    }
                    None => opts.had_parse_error = true,
                }
            } else if PATH_FILE.matches(arg) {
                match args.get(i + 1) {
                    Some(v) => {
                        opts.path_file = Some(PathBuf::from(v));
                        i += 1;
                    }
                    None => opts.had_parse_error = true,
                }
            } else if STORE_CAPACITY.matches(arg) {
                match args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                    Some(v) => {
                        opts.store_capacity = v;
                        i += 1;
                    }
                    None => opts.had_parse_error = true,
                }
            } else if SHOW_AST.matches(arg) {
                opts.show_ast = true;
            } else if SHOW_VAR_TYPES.matches(arg) {
                opts.show_local_variable_types = true;
            } else if SHOW_FN_TYPES.matches(arg) {
                opts.show_local_function_types = true;
            } else if HIDE_FN_TYPES.matches(arg) {
                opts.show_local_function_types = false;
            } else if ARROW_FN_TYPES.matches(arg) {
                opts.use_arrow_function_notation = true;
            } else if MATLAB_FN_TYPES.matches(arg) {
                opts.use_arrow_function_notation = false;
            } else if SHOW_VISITED.matches(arg) {
                opts.show_visited_external_files = true;
            } else if SHOW_DIST.matches(arg) {
                opts.show_type_distribution = true;
            } else if EXPLICIT_DT.matches(arg) {
                opts.show_explicit_destructured_tuples = true;
            } else if EXPLICIT_ALIASES.matches(arg) {
                opts.show_explicit_aliases = true;
            } else if PLAIN_TEXT.matches(arg) {
                opts.rich_text = false;
            } else if SHOW_ERRORS.matches(arg) {
                opts.show_errors = !opts.show_errors;
            } else if SHOW_WARNINGS.matches(arg) {
                opts.show_warnings = !opts.show_warnings;
            } else if SHOW_DIAGNOSTICS.matches(arg) {
                opts.show_diagnostics = !opts.show_diagnostics;
            } else if arg.starts_with('-') {
                opts.had_parse_error = true;
            } else {
                opts.root_identifiers.push(arg.to_string());
            }

            i += 1;
        }

        opts
    }

    pub fn usage() -> &'static str {
        "usage: mtype [options] <root-ident> [<root-ident>...]"
    }

    pub fn help() -> String {
        let mut out = String::from(Self::usage());
        out.push_str("\n\noptions:\n");
        for (flag, desc) in [
            ("--help, -h", "print this help and exit"),
            ("--path, -p <str>", "colon-delimited search path"),
            ("--path-file, -pf <file>", "newline-delimited path file"),
            ("--show-ast, -sa", "dump the parsed AST"),
            ("--show-var-types, -sv", "print inferred variable types"),
            ("--show-function-types, -sf", "print local function types (default)"),
            ("--hide-function-types, -hf", "suppress local function types"),
            ("--arrow-function-types, -aft", "render function types as (in) -> out"),
            ("--matlab-function-types, -mft", "render function types as [out] = (in) (default)"),
            ("--show-visited-files, -svf", "list every file visited"),
            ("--show-dist, -sd", "print the type distribution"),
            ("--explicit-dt, -edt", "expand destructured tuples when printing"),
            ("--explicit-aliases, -ea", "expand aliases when printing"),
            ("--plain-text, -pt", "disable ANSI styling"),
            ("--show-errors, -he", "toggle error printing"),
            ("--show-warnings, -hw", "toggle warning printing"),
            ("--show-diagnostics, -sdi", "toggle the diagnostics summary"),
            ("--store-capacity, -sc <n>", "initial type store capacity"),
        ] {
            out.push_str(&format!("  {flag:<32}{desc}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_bare_args_as_root_identifiers() {
        let opts = CliOptions::parse(&["widget".to_string(), "gadget".to_string()]);
        assert_eq!(opts.root_identifiers, vec!["widget", "gadget"]);
        assert!(!opts.had_parse_error);
    }

    #[test]
    fn path_flag_consumes_its_value() {
        let opts = CliOptions::parse(&["-p".to_string(), "/a:/b".to_string(), "widget".to_string()]);
        assert_eq!(opts.search_path.as_deref(), Some("/a:/b"));
        assert_eq!(opts.root_identifiers, vec!["widget".to_string()]);
    }

    #[test]
    fn path_file_flag_consumes_its_value() {
        let opts = CliOptions::parse(&["--path-file".to_string(), "/tmp/paths.txt".to_string()]);
        assert_eq!(opts.path_file, Some(PathBuf::from("/tmp/paths.txt")));
    }

    #[test]
    fn hide_function_types_overrides_the_default() {
        let opts = CliOptions::parse(&["--hide-function-types".to_string()]);
        assert!(!opts.show_local_function_types);
    }

    #[test]
    fn show_errors_toggles_off_the_default() {
        let opts = CliOptions::parse(&["-he".to_string()]);
        assert!(!opts.show_errors);
    }

    #[test]
    fn store_capacity_parses_a_number() {
        let opts = CliOptions::parse(&["-sc".to_string(), "42".to_string()]);
        assert_eq!(opts.store_capacity, 42);
    }

    #[test]
    fn an_unknown_flag_is_a_parse_error() {
        let opts = CliOptions::parse(&["--nope".to_string()]);
        assert!(opts.had_parse_error);
    }

    #[test]
    fn a_value_flag_missing_its_value_is_a_parse_error() {
        let opts = CliOptions::parse(&["--path".to_string()]);
        assert!(opts.had_parse_error);
    }
}
