//! Call-site metadata attached to every log line, and call-stack capture for error records.

use std::{
    fmt,
    path::Path,
    sync::atomic::{AtomicU64, Ordering},
};

/// The source location a record was emitted from.
///
/// Locations are captured at compile time by the logging macros (see [`here!`](crate::here)), so
/// the reported location is always the original call site regardless of how many wrapper layers
/// the record passes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    file: &'static str,
    function: &'static str,
    line: u32,
}

impl Location {
    /// Creates a location from its raw parts.
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            file,
            function,
            line,
        }
    }

    /// The file path as recorded by the compiler.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// The last component of the file path.
    pub fn file_name(&self) -> &'static str {
        base_name(self.file)
    }

    /// Name of the enclosing function, without its module path.
    pub fn function(&self) -> &'static str {
        self.function
    }

    /// Line number of the call site.
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Renders the `<file:line function()>` tag.
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}:{} {}()>",
            self.file_name(),
            self.line,
            self.function
        )
    }
}

fn base_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Reduces a fully qualified function path to the bare function name.
///
/// Used by [`function_name!`](crate::function_name); strips the helper item suffix, any closure
/// segments and the module path.
#[doc(hidden)]
pub fn short_function_name(path: &'static str) -> &'static str {
    last_segment(path.strip_suffix("::__here").unwrap_or(path))
}

static NEXT_ROUTINE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static ROUTINE_ID: u64 = NEXT_ROUTINE_ID.fetch_add(1, Ordering::Relaxed);
}

/// A small process-unique number identifying the calling thread.
///
/// Ids are handed out in the order threads first log something.
pub fn routine_id() -> u64 {
    ROUTINE_ID.with(|id| *id)
}

/// Maximum number of frames rendered in a call-stack block.
pub(crate) const CALL_STACK_DEPTH: usize = 10;

/// One resolved frame of a captured call stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StackFrame {
    file: String,
    line: u32,
    function: String,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}();", self.file, self.line, self.function)
    }
}

/// Captures up to `depth` frames of the current call stack.
///
/// Frames are counted from the caller of this function; the first `skip` of them are dropped so
/// every public entry point can pass the number of internal layers between itself and this call.
/// Inlined frames are resolved as separate entries.
#[inline(never)]
pub(crate) fn capture_call_stack(skip: usize, depth: usize) -> Vec<StackFrame> {
    let mut frames = Vec::with_capacity(depth);
    let mut past_marker = false;
    let mut remaining_skip = skip;

    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if frames.len() >= depth {
                return;
            }
            let function = symbol
                .name()
                .map(|name| format!("{name:#}"))
                .unwrap_or_else(|| "?".to_string());

            if !past_marker {
                past_marker = function.ends_with("capture_call_stack");
                return;
            }
            if remaining_skip > 0 {
                remaining_skip -= 1;
                return;
            }

            let file = symbol
                .filename()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "?".to_string());

            frames.push(StackFrame {
                file,
                line: symbol.lineno().unwrap_or(0),
                function: last_segment(&function).to_string(),
            });
        });
        frames.len() < depth
    });

    frames
}

/// Reduces a symbol path to its last segment, after dropping trailing closure segments and
/// generic argument lists.
fn last_segment(function: &str) -> &str {
    let mut name = function;
    loop {
        let trimmed = strip_generic_args(strip_closure(name));
        if trimmed == name {
            break;
        }
        name = trimmed;
    }
    name.rsplit("::").next().unwrap_or(name)
}

/// Drops one trailing `::{{closure}}` (legacy mangling) or `::{closure#N}` (v0 mangling).
fn strip_closure(name: &str) -> &str {
    if let Some(stripped) = name.strip_suffix("::{{closure}}") {
        return stripped;
    }
    match name.rfind("::{closure#") {
        Some(start) if name.ends_with('}') => name.get(..start).unwrap_or(name),
        _ => name,
    }
}

/// Drops one trailing generic argument list: `name<T>` or `name::<T>`.
fn strip_generic_args(name: &str) -> &str {
    if !name.ends_with('>') {
        return name;
    }
    let mut depth = 0_usize;
    for (index, ch) in name.char_indices().rev() {
        match ch {
            // `->` inside a function pointer type is not a closing bracket
            '>' if name.get(..index).is_some_and(|head| head.ends_with('-')) => {}
            '>' => depth += 1,
            '<' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let head = name.get(..index).unwrap_or_default();
                    let head = head.strip_suffix("::").unwrap_or(head);
                    return if head.is_empty() { name } else { head };
                }
            }
            _ => {}
        }
    }
    name
}

/// Renders captured frames as a `###CALLSTACK###` block.
pub(crate) fn render_call_stack(frames: &[StackFrame]) -> String {
    let mut block = String::from("\t###CALLSTACK### { ");
    for frame in frames {
        block.push_str(&frame.to_string());
        block.push(' ');
    }
    block.push('}');
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_tag_uses_the_file_base_name() {
        let location = Location::new("crates/app/src/server.rs", "handle", 42);
        assert_eq!(location.file_name(), "server.rs");
        assert_eq!(location.to_string(), "<server.rs:42 handle()>");
    }

    #[test]
    fn short_function_name_strips_paths_and_closures() {
        assert_eq!(short_function_name("app::server::handle::__here"), "handle");
        assert_eq!(
            short_function_name("app::server::handle::{{closure}}::{{closure}}::__here"),
            "handle"
        );
        assert_eq!(
            short_function_name("<app::Server as app::Service>::call::__here"),
            "call"
        );
        assert_eq!(short_function_name("main"), "main");
    }

    #[test]
    fn frame_names_drop_generic_arguments() {
        assert_eq!(
            last_segment("core::ptr::drop_in_place<alloc::vec::Vec<alloc::string::String>>"),
            "drop_in_place"
        );
        assert_eq!(
            last_segment("core::ops::function::FnOnce::call_once<{closure#1}, ()>"),
            "call_once"
        );
        assert_eq!(last_segment("std::rt::lang_start::<()>::{{closure}}"), "lang_start");
        assert_eq!(
            last_segment("app::run::{closure#0}::{closure#1}"),
            "run"
        );
        assert_eq!(
            last_segment("core::ops::function::FnOnce::call_once<fn() -> i32, ()>"),
            "call_once"
        );
        assert_eq!(
            last_segment("<alloc::vec::Vec<u8> as core::ops::drop::Drop>::drop"),
            "drop"
        );
        assert_eq!(last_segment("<Foo as Bar>"), "<Foo as Bar>");
    }

    #[test]
    fn function_name_macro_resolves_the_enclosing_function() {
        assert_eq!(
            crate::function_name!(),
            "function_name_macro_resolves_the_enclosing_function"
        );
        let from_closure = || crate::function_name!();
        assert_eq!(
            from_closure(),
            "function_name_macro_resolves_the_enclosing_function"
        );
    }

    #[test]
    fn routine_ids_differ_between_threads() {
        let here = routine_id();
        assert_eq!(here, routine_id());
        let other = std::thread::spawn(routine_id)
            .join()
            .expect("thread should not panic");
        assert_ne!(here, other);
    }

    #[test]
    fn call_stack_block_is_bounded_and_well_formed() {
        let frames = capture_call_stack(0, 3);
        assert!(frames.len() <= 3);
        let block = render_call_stack(&frames);
        assert!(block.starts_with("\t###CALLSTACK### { "));
        assert!(block.ends_with('}'));
    }
}
