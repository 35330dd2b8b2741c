use std::cell::Cell;

use log::warn;

use super::*;

/// What solution concepts use in place of an unset coalition value.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum DefaultValue {
    /// [`DEFAULT_VALUE`], with a warning the first time it is needed.
    #[default]
    Implicit,
    /// A value chosen by the caller, substituted silently.
    Explicit(Value),
}

impl DefaultValue {
    pub fn value(&self) -> Value {
        match self {
            DefaultValue::Implicit => DEFAULT_VALUE,
            DefaultValue::Explicit(v) => *v,
        }
    }
}

impl From<Option<Value>> for DefaultValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(DefaultValue::Implicit, DefaultValue::Explicit)
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Explicit(value)
    }
}

/// Reads game values and fills gaps according to a [`DefaultValue`] policy.
///
/// An implicit substitution is reported once per lookup.
pub(crate) struct ValueLookup<'a> {
    game: &'a Game,
    default: DefaultValue,
    warned: Cell<bool>,
}

impl<'a> ValueLookup<'a> {
    pub(crate) fn new(game: &'a Game, default: DefaultValue) -> Self {
        ValueLookup {
            game,
            default,
            warned: Cell::new(false),
        }
    }

    pub(crate) fn game(&self) -> &'a Game {
        self.game
    }

    pub(crate) fn get(&self, coalition: Coalition) -> Value {
        let value = self.game[coalition];
        if !value.is_nan() {
            return value;
        }
        if self.default == DefaultValue::Implicit && !self.warned.replace(true) {
            warn!("Unchanged default value {DEFAULT_VALUE} is used for unset {coalition} and possibly others");
        }
        self.default.value()
    }

    /// `(S, v(S ∪ {i}) - v(S))` for every coalition `S` without `player`, in ascending order.
    pub(crate) fn marginal_contributions(&self, player: Player) -> impl Iterator<Item = (Coalition, Value)> + '_ {
        (self.game.grand_coalition() - player)
            .all_subcoalitions()
            .map(move |s| (s, self.get(s + player) - self.get(s)))
    }

    /// Returns `true` once an implicit default has been substituted.
    #[cfg(test)]
    pub(crate) fn warned(&self) -> bool {
        self.warned.get()
    }
}

/// Records the warnings logged on the current thread; each test runs on its own thread.
#[cfg(test)]
pub(crate) mod captured {
    use std::cell::RefCell;
    use std::sync::Once;

    use log::{Level, LevelFilter, Log, Metadata, Record};

    thread_local! {
        static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    struct ThreadLogger;

    impl Log for ThreadLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Warn
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                WARNINGS.with_borrow_mut(|warnings| warnings.push(record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: ThreadLogger = ThreadLogger;
    static INIT: Once = Once::new();

    /// Runs `f` and returns its result with the warnings it logged.
    pub(crate) fn warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        INIT.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(LevelFilter::Warn);
            }
        });
        WARNINGS.with_borrow_mut(Vec::clear);
        let result = f();
        (result, WARNINGS.take())
    }
}
