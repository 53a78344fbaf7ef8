//! Structured diagnostics for recoverable generation problems.
//!
//! A search that gives up, criteria that are loosened to get any result at
//! all, and a table that breaks its sort order are all reported as
//! [`Violation`] records. By default they go to `tracing` through
//! [`TracingObserver`]; a [`Generator`](crate::Generator) can be handed its
//! own [`ViolationObserver`] instead, and tests use [`CollectingObserver`] to
//! assert on exactly what was reported.
//!
//! ```
//! use shadowseed::telemetry::{CollectingObserver, ViolationKind};
//! use std::sync::Arc;
//!
//! let observer = Arc::new(CollectingObserver::new());
//! assert!(!observer.has_violation(ViolationKind::SeedSearch));
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

/// How bad a violation is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    /// Generation continued with looser criteria or a substitute value.
    Warning,
    /// The caller did not get what they asked for.
    Error,
    /// A structural invariant is broken; anything built on it is suspect.
    Critical,
}

impl ViolationSeverity {
    /// Label used in log fields and serialized output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a violation came from.
///
/// Marked `#[non_exhaustive]`; match with a wildcard arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ViolationKind {
    /// A bounded seed search ran out of attempts or fell back to looser criteria.
    SeedSearch,
    /// A lock chain was malformed or could not be honored.
    LockChain,
    /// A learnset table was malformed.
    Learnset,
    /// An argument that can never produce the requested result.
    Configuration,
    /// A code path that should be unreachable.
    InternalError,
    /// An [`InvariantChecker`] failed.
    Invariant,
}

impl ViolationKind {
    /// Label used in log fields and serialized output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SeedSearch => "seed_search",
            Self::LockChain => "lock_chain",
            Self::Learnset => "learnset",
            Self::Configuration => "configuration",
            Self::InternalError => "internal_error",
            Self::Invariant => "invariant",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem.
///
/// ```
/// use shadowseed::telemetry::{Violation, ViolationKind, ViolationSeverity};
///
/// let violation = Violation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::SeedSearch,
///     "search exhausted",
///     "search.rs:42",
/// )
/// .with_seed(0xDEAD_BEEF)
/// .with_context("attempts", 100_000);
///
/// let text = violation.to_string();
/// assert!(text.contains("seed=0xDEADBEEF"));
/// assert!(text.contains("attempts=100000"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    /// How bad it is.
    pub severity: ViolationSeverity,
    /// Where it came from.
    pub kind: ViolationKind,
    /// What went wrong.
    pub message: String,
    /// `file:line` of the report.
    pub location: &'static str,
    /// Generator state under examination, if any.
    pub seed: Option<u32>,
    /// Extra named values, in insertion order.
    pub context: SmallVec<[(&'static str, String); 2]>,
}

impl Violation {
    /// Creates a violation with no seed and no context.
    #[must_use]
    pub fn new(
        severity: ViolationSeverity,
        kind: ViolationKind,
        message: impl Into<String>,
        location: &'static str,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            location,
            seed: None,
            context: SmallVec::new(),
        }
    }

    /// Attaches the seed under examination.
    #[must_use]
    pub fn with_seed(self, seed: u32) -> Self {
        self.with_optional_seed(Some(seed))
    }

    /// Attaches a seed if there is one.
    #[must_use]
    pub fn with_optional_seed(mut self, seed: Option<u32>) -> Self {
        self.seed = seed;
        self
    }

    /// Appends a named value.
    #[must_use]
    pub fn with_context(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Looks up a context value by name.
    #[must_use]
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Serializes to a JSON string.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Serializes to an indented JSON string.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json_pretty(&self) -> Option<String> {
        serde_json::to_string_pretty(self).ok()
    }
}

/// Renders an optional seed as `0xXXXXXXXX`, or `-` when absent.
struct SeedField(Option<u32>);

impl fmt::Display for SeedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(seed) => write!(f, "0x{seed:08X}"),
            None => f.write_str("-"),
        }
    }
}

/// Renders context pairs as space-separated `key=value`.
struct ContextField<'a>(&'a [(&'static str, String)]);

impl fmt::Display for ContextField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} @ {}",
            self.severity, self.kind, self.message, self.location
        )?;
        if self.seed.is_some() {
            write!(f, " seed={}", SeedField(self.seed))?;
        }
        if !self.context.is_empty() {
            write!(f, " {}", ContextField(&self.context))?;
        }
        Ok(())
    }
}

/// Receives violations.
///
/// With the `sync-send` feature, observers must be `Send + Sync` so a
/// generator holding one can be shared across threads.
#[cfg(feature = "sync-send")]
pub trait ViolationObserver: Send + Sync {
    /// Handles one violation. Called inline on the generating thread.
    fn on_violation(&self, violation: &Violation);
}

/// Receives violations.
#[cfg(not(feature = "sync-send"))]
pub trait ViolationObserver {
    /// Handles one violation. Called inline on the generating thread.
    fn on_violation(&self, violation: &Violation);
}

/// Logs violations through `tracing`.
///
/// Warnings go to `warn!`; errors and critical violations go to `error!`.
/// Seed and context are emitted as structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    /// Creates a tracing observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ViolationObserver for TracingObserver {
    fn on_violation(&self, violation: &Violation) {
        let seed = SeedField(violation.seed);
        let context = ContextField(&violation.context);
        if violation.severity == ViolationSeverity::Warning {
            tracing::warn!(
                kind = violation.kind.as_str(),
                location = violation.location,
                seed = %seed,
                context = %context,
                "{}",
                violation.message
            );
        } else {
            tracing::error!(
                severity = violation.severity.as_str(),
                kind = violation.kind.as_str(),
                location = violation.location,
                seed = %seed,
                context = %context,
                "{}",
                violation.message
            );
        }
    }
}

/// Keeps every violation it sees, for assertions in tests.
///
/// ```
/// use shadowseed::telemetry::{
///     CollectingObserver, Violation, ViolationKind, ViolationObserver, ViolationSeverity,
/// };
///
/// let observer = CollectingObserver::new();
/// observer.on_violation(&Violation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::Learnset,
///     "unsorted",
///     "test.rs:1",
/// ));
/// assert_eq!(observer.len(), 1);
/// assert!(observer.has_violation(ViolationKind::Learnset));
/// ```
#[derive(Debug, Default)]
pub struct CollectingObserver {
    seen: Mutex<Vec<Violation>>,
}

impl CollectingObserver {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inspect<R>(&self, f: impl FnOnce(&[Violation]) -> R) -> R {
        f(&self.seen.lock())
    }

    /// Copies out everything collected so far.
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        self.inspect(<[Violation]>::to_vec)
    }

    /// Removes and returns everything collected so far.
    pub fn take(&self) -> Vec<Violation> {
        std::mem::take(&mut *self.seen.lock())
    }

    /// Number collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inspect(<[Violation]>::len)
    }

    /// `true` if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if any collected violation has `kind`.
    #[must_use]
    pub fn has_violation(&self, kind: ViolationKind) -> bool {
        self.inspect(|seen| seen.iter().any(|v| v.kind == kind))
    }

    /// `true` if any collected violation has `severity`.
    #[must_use]
    pub fn has_severity(&self, severity: ViolationSeverity) -> bool {
        self.inspect(|seen| seen.iter().any(|v| v.severity == severity))
    }

    /// Collected violations of one kind.
    #[must_use]
    pub fn violations_of_kind(&self, kind: ViolationKind) -> Vec<Violation> {
        self.inspect(|seen| seen.iter().filter(|v| v.kind == kind).cloned().collect())
    }

    /// Drops everything collected.
    pub fn clear(&self) {
        self.seen.lock().clear();
    }
}

impl ViolationObserver for CollectingObserver {
    fn on_violation(&self, violation: &Violation) {
        self.seen.lock().push(violation.clone());
    }
}

/// Fans each violation out to several observers, in the order they were added.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ViolationObserver>>,
}

impl CompositeObserver {
    /// Creates a composite with no children.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a child observer.
    pub fn add(&mut self, observer: Arc<dyn ViolationObserver>) {
        self.observers.push(observer);
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.add(observer);
        self
    }
}

impl ViolationObserver for CompositeObserver {
    fn on_violation(&self, violation: &Violation) {
        self.observers
            .iter()
            .for_each(|observer| observer.on_violation(violation));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Sends `violation` to `observer`, or to [`TracingObserver`] when there is none.
pub fn report_to_observer<O: ViolationObserver + ?Sized>(
    observer: Option<&Arc<O>>,
    violation: &Violation,
) {
    if let Some(observer) = observer {
        observer.on_violation(violation);
    } else {
        TracingObserver.on_violation(violation);
    }
}

/// Logs a violation through [`TracingObserver`], tagged with the call site.
///
/// ```text
/// report_violation!(severity, kind, "format {}", args);
/// ```
#[macro_export]
macro_rules! report_violation {
    ($severity:expr, $kind:expr, $($message:tt)+) => {{
        let violation = $crate::telemetry::Violation::new(
            $severity,
            $kind,
            format!($($message)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::report_to_observer::<$crate::telemetry::TracingObserver>(
            None,
            &violation,
        );
    }};
}

/// Like [`report_violation!`], routed through an `Option<Arc<dyn ViolationObserver>>`
/// and tagged with an optional seed.
///
/// ```text
/// report_violation_to!(observer, seed, severity, kind, "format {}", args);
/// ```
#[macro_export]
macro_rules! report_violation_to {
    ($observer:expr, $seed:expr, $severity:expr, $kind:expr, $($message:tt)+) => {{
        let violation = $crate::telemetry::Violation::new(
            $severity,
            $kind,
            format!($($message)+),
            concat!(file!(), ":", line!()),
        )
        .with_optional_seed($seed);
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};
}

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct InvariantViolation {
    /// Type whose invariant broke.
    pub type_name: &'static str,
    /// The invariant, stated as what should hold.
    pub invariant: String,
    /// Where it broke, if known.
    pub details: Option<String>,
}

impl InvariantViolation {
    /// Creates an invariant violation without details.
    #[must_use]
    pub fn new(type_name: &'static str, invariant: impl Into<String>) -> Self {
        Self {
            type_name,
            invariant: invariant.into(),
            details: None,
        }
    }

    /// Records where the invariant broke.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} must satisfy: {}", self.type_name, self.invariant)?;
        match &self.details {
            Some(details) => write!(f, " ({details})"),
            None => Ok(()),
        }
    }
}

/// Types with structural invariants that can be re-checked at runtime.
///
/// [`debug_check_invariants!`] runs the check in debug builds, or in any
/// build with the `paranoid` feature.
pub trait InvariantChecker {
    /// `Ok(())` if every invariant holds, otherwise the first one that doesn't.
    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}

/// Runs [`InvariantChecker::check_invariants`] and reports a failure as a
/// critical [`ViolationKind::Invariant`].
#[macro_export]
#[cfg(any(debug_assertions, feature = "paranoid"))]
macro_rules! debug_check_invariants {
    ($value:expr) => {
        $crate::debug_check_invariants!($value, "unspecified")
    };
    ($value:expr, $site:expr) => {{
        use $crate::telemetry::InvariantChecker as _;
        if let Err(broken) = $value.check_invariants() {
            $crate::report_violation!(
                $crate::telemetry::ViolationSeverity::Critical,
                $crate::telemetry::ViolationKind::Invariant,
                "{} [checked in {}]",
                broken,
                $site
            );
        }
    }};
}

/// Compiled out without `debug_assertions` or `paranoid`.
#[macro_export]
#[cfg(not(any(debug_assertions, feature = "paranoid")))]
macro_rules! debug_check_invariants {
    ($value:expr) => {{}};
    ($value:expr, $site:expr) => {{}};
}
