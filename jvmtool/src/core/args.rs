//! Argument-list materialization for the argument file.
//!
//! JDK tools accept `@<file>` to read their command line from a file, one
//! argument per line (sidestepping OS command-length limits). These helpers
//! build and render that list. Rendering performs no quoting or escaping
//! beyond line separation: each line is exactly one argument.

/// Build the final argument list: base arguments followed by the free-form
/// arguments, appended verbatim in declaration order.
pub fn materialize(base: Vec<String>, free_args: &[String]) -> Vec<String> {
    let mut args = base;
    args.extend(free_args.iter().cloned());
    args
}

/// Render an argument list as argument-file content (newline-joined).
pub fn render_args_file(args: &[String]) -> String {
    args.join("\n")
}

/// Split argument-file content back into the argument list.
///
/// Inverse of [`render_args_file`] for lists of non-empty arguments.
pub fn parse_args_file(contents: &str) -> Vec<String> {
    if contents.is_empty() {
        return Vec::new();
    }
    contents.split('\n').map(str::to_string).collect()
}
