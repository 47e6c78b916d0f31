//! Public entry points. Every macro captures its call site with [`here!`] and forwards to a
//! [`Logger`](crate::Logger) method.
//!
//! Three formatting families exist for each level:
//! - `info!(logger, a, b, ..)` joins the `Display` form of its arguments with spaces.
//! - `infof!(logger, "pattern {}", a)` applies [`format!`] substitution.
//! - `infow!(logger, a, b, ..)` joins the `Debug` form of its arguments with spaces, accepting
//!   any `Debug` value.
//!
//! The `error` and `fatal` macros evaluate to a [`LoggedError`](crate::LoggedError).

/// Evaluates to the unqualified name of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        $crate::__private::short_function_name(__type_name_of(__here))
    }};
}

/// Evaluates to the [`Location`](crate::Location) of the macro invocation.
#[macro_export]
macro_rules! here {
    () => {
        $crate::Location::new(
            ::core::file!(),
            $crate::function_name!(),
            ::core::line!(),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __spread {
    ($($arg:expr),+ $(,)?) => {
        $crate::__private::spread(&[$(&$arg as &dyn ::core::fmt::Display),+])
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __weak {
    ($($arg:expr),+ $(,)?) => {
        $crate::__private::weak_join(&[$(&$arg as &dyn ::core::fmt::Debug),+])
    };
}

/// Logs at [`Level::Trace`](crate::Level::Trace), joining the arguments with spaces.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit($crate::Level::Trace, $crate::here!(), &$crate::__spread!($($arg),+))
    };
}

/// Logs at [`Level::Trace`](crate::Level::Trace) using a format string.
#[macro_export]
macro_rules! tracef {
    ($logger:expr, $($arg:tt)+) => {
        $logger.emit($crate::Level::Trace, $crate::here!(), &::std::format!($($arg)+))
    };
}

/// Logs at [`Level::Trace`](crate::Level::Trace), joining the `Debug` form of the arguments.
#[macro_export]
macro_rules! tracew {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit($crate::Level::Trace, $crate::here!(), &$crate::__weak!($($arg),+))
    };
}

/// Logs at [`Level::Debug`](crate::Level::Debug), joining the arguments with spaces.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit($crate::Level::Debug, $crate::here!(), &$crate::__spread!($($arg),+))
    };
}

/// Logs at [`Level::Debug`](crate::Level::Debug) using a format string.
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.emit($crate::Level::Debug, $crate::here!(), &::std::format!($($arg)+))
    };
}

/// Logs at [`Level::Debug`](crate::Level::Debug), joining the `Debug` form of the arguments.
#[macro_export]
macro_rules! debugw {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit($crate::Level::Debug, $crate::here!(), &$crate::__weak!($($arg),+))
    };
}

/// Logs at [`Level::Info`](crate::Level::Info), joining the arguments with spaces.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit($crate::Level::Info, $crate::here!(), &$crate::__spread!($($arg),+))
    };
}

/// Logs at [`Level::Info`](crate::Level::Info) using a format string.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.emit($crate::Level::Info, $crate::here!(), &::std::format!($($arg)+))
    };
}

/// Logs at [`Level::Info`](crate::Level::Info), joining the `Debug` form of the arguments.
#[macro_export]
macro_rules! infow {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit($crate::Level::Info, $crate::here!(), &$crate::__weak!($($arg),+))
    };
}

/// Logs at [`Level::Warn`](crate::Level::Warn), joining the arguments with spaces.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit($crate::Level::Warn, $crate::here!(), &$crate::__spread!($($arg),+))
    };
}

/// Logs at [`Level::Warn`](crate::Level::Warn) using a format string.
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.emit($crate::Level::Warn, $crate::here!(), &::std::format!($($arg)+))
    };
}

/// Logs at [`Level::Warn`](crate::Level::Warn), joining the `Debug` form of the arguments.
#[macro_export]
macro_rules! warnw {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit($crate::Level::Warn, $crate::here!(), &$crate::__weak!($($arg),+))
    };
}

/// Alias of [`warn!`].
#[macro_export]
macro_rules! warning {
    ($($arg:tt)+) => {
        $crate::warn!($($arg)+)
    };
}

/// Alias of [`warnf!`].
#[macro_export]
macro_rules! warningf {
    ($($arg:tt)+) => {
        $crate::warnf!($($arg)+)
    };
}

/// Alias of [`warnw!`].
#[macro_export]
macro_rules! warningw {
    ($($arg:tt)+) => {
        $crate::warnw!($($arg)+)
    };
}

/// Logs at [`Level::Error`](crate::Level::Error), joining the arguments with spaces, and
/// evaluates to the message as a [`LoggedError`](crate::LoggedError).
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit_error($crate::Level::Error, $crate::here!(), $crate::__spread!($($arg),+))
    };
}

/// Logs at [`Level::Error`](crate::Level::Error) using a format string, and evaluates to the
/// message as a [`LoggedError`](crate::LoggedError).
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.emit_error($crate::Level::Error, $crate::here!(), ::std::format!($($arg)+))
    };
}

/// Logs at [`Level::Error`](crate::Level::Error), joining the `Debug` form of the arguments, and
/// evaluates to the message as a [`LoggedError`](crate::LoggedError).
#[macro_export]
macro_rules! errorw {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit_error($crate::Level::Error, $crate::here!(), $crate::__weak!($($arg),+))
    };
}

/// Logs at [`Level::Fatal`](crate::Level::Fatal), joining the arguments with spaces, and
/// evaluates to the message as a [`LoggedError`](crate::LoggedError).
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit_error($crate::Level::Fatal, $crate::here!(), $crate::__spread!($($arg),+))
    };
}

/// Logs at [`Level::Fatal`](crate::Level::Fatal) using a format string, and evaluates to the
/// message as a [`LoggedError`](crate::LoggedError).
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.emit_error($crate::Level::Fatal, $crate::here!(), ::std::format!($($arg)+))
    };
}

/// Logs at [`Level::Fatal`](crate::Level::Fatal), joining the `Debug` form of the arguments, and
/// evaluates to the message as a [`LoggedError`](crate::LoggedError).
#[macro_export]
macro_rules! fatalw {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit_error($crate::Level::Fatal, $crate::here!(), $crate::__weak!($($arg),+))
    };
}

/// Logs at [`Level::Panic`](crate::Level::Panic), joining the arguments with spaces, then
/// panics the calling thread with the same message.
#[macro_export]
macro_rules! log_panic {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit_and_panic($crate::here!(), $crate::__spread!($($arg),+))
    };
}

/// Logs at [`Level::Panic`](crate::Level::Panic) using a format string, then panics the calling
/// thread with the same message.
#[macro_export]
macro_rules! log_panicf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.emit_and_panic($crate::here!(), ::std::format!($($arg)+))
    };
}

/// Logs at [`Level::Panic`](crate::Level::Panic), joining the `Debug` form of the arguments,
/// then panics the calling thread with the same message.
#[macro_export]
macro_rules! log_panicw {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.emit_and_panic($crate::here!(), $crate::__weak!($($arg),+))
    };
}

/// Formats a message and logs it at the given level, cut to at most `limit` bytes.
///
/// `truncate!(logger, Level::Info, 16, "payload {}", body)`
#[macro_export]
macro_rules! truncate {
    ($logger:expr, $level:expr, $limit:expr, $($arg:tt)+) => {
        $logger.emit_truncated($level, $crate::here!(), $limit, ::std::format!($($arg)+))
    };
}

/// Starts timing the enclosing function and logs `enter`, followed by the optional arguments.
#[macro_export]
macro_rules! enter {
    ($logger:expr) => {
        $logger.enter($crate::here!(), "")
    };
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.enter($crate::here!(), &$crate::__spread!($($arg),+))
    };
}

/// Stops timing the enclosing function, logs the elapsed time and evaluates to
/// `Option<Elapsed>` (`None` if [`enter!`] was not called).
#[macro_export]
macro_rules! leave {
    ($logger:expr) => {
        $logger.leave($crate::here!())
    };
}

/// Times the enclosing function until the returned guard is dropped.
///
/// `let _timing = timed!(logger);`
#[macro_export]
macro_rules! timed {
    ($logger:expr) => {
        $logger.timed($crate::here!())
    };
}

/// Logs each value as tab-indented JSON between separator lines, at the
/// [`Level::Json`](crate::Level::Json) pseudo-level.
#[macro_export]
macro_rules! dump {
    ($logger:expr, $($value:expr),+ $(,)?) => {{
        let mut __dump = ::std::string::String::new();
        $( __dump.push_str(&$crate::dump::json_block(&$value)); )+
        __dump.push_str(&$crate::dump::closing_separator());
        $logger.emit($crate::Level::Json, $crate::here!(), &__dump)
    }};
}

/// Logs the field tree of a serializable value at [`Level::Debug`](crate::Level::Debug).
#[macro_export]
macro_rules! dump_struct {
    ($logger:expr, $value:expr) => {
        $logger.emit(
            $crate::Level::Debug,
            $crate::here!(),
            &$crate::dump::struct_tree(::core::stringify!($value), &$value),
        )
    };
}
