use std::cell::Cell;
use std::fmt::{self, Write as _};
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::format::{DelayedFormat, Item, StrftimeItems};
use chrono::{Local, Locale, NaiveDateTime, TimeDelta, Timelike};

const NANOS_PER_SEC: u32 = 1_000_000_000;
const TICK_PERIOD: Duration = Duration::from_secs(1);

// ── configuration ─────────────────────────────────────────────────────────

/// Invalid clock configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The date pattern contains a malformed strftime specifier.
    InvalidDatePattern(String),
    /// No date names are available for this locale tag.
    UnknownLocale(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDatePattern(p) => write!(f, "invalid date pattern {p:?}"),
            ConfigError::UnknownLocale(tag) => write!(f, "unknown locale {tag:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// How the hour digits are derived from the wall clock.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum HourCycle {
    /// 00–23.
    #[default]
    H24,
    /// 01–12.
    H12,
}

/// A validated strftime pattern for the date label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern(String);

impl DatePattern {
    /// Long English date, e.g. "Wednesday, December 24, 2025".
    pub const LONG: &'static str = "%A, %B %-d, %Y";

    /// Long date layout for a language code ("en", "fr", "ja").
    pub fn long(language: &str) -> Self {
        let pattern = match language {
            "en" | "POSIX" => Self::LONG,
            "ja" | "zh" => "%Y年%-m月%-d日 %A",
            "ko" => "%Y년 %-m월 %-d일 %A",
            _ => "%A %-d %B %Y",
        };
        Self(pattern.to_owned())
    }

    pub fn new(pattern: impl Into<String>) -> Result<Self, ConfigError> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidDatePattern(pattern));
        }
        Ok(Self(pattern))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats `wall` with this pattern, taking day and month names from
    /// `locale`.
    ///
    /// Specifiers that need a time zone (`%Z`, `%z`) cannot be rendered from
    /// a local wall time; the label is then empty.
    pub fn format(&self, wall: &NaiveDateTime, locale: Locale) -> String {
        let items = StrftimeItems::new_with_locale(&self.0, locale);
        let label = DelayedFormat::new_with_locale(Some(wall.date()), Some(wall.time()), items, locale);
        let mut out = String::new();
        if write!(out, "{label}").is_err() {
            log::warn!("date pattern {:?} cannot be rendered; date label left empty", self.0);
            out.clear();
        }
        out
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        Self(Self::LONG.to_owned())
    }
}

/// Formatting options for published [`ClockTime`]s.
///
/// The default is the English long date in the POSIX locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat {
    pub hour_cycle: HourCycle,
    pub date: DatePattern,
    pub locale: Locale,
}

impl TimeFormat {
    /// Long date in the language of a locale tag such as `"fr-FR"` or
    /// `"ja_JP.UTF-8"`.
    pub fn for_locale(tag: &str) -> Result<Self, ConfigError> {
        let name = tag.split(['.', '@']).next().unwrap_or(tag).replace('-', "_");
        let locale = Locale::try_from(name.as_str())
            .map_err(|_| ConfigError::UnknownLocale(tag.to_owned()))?;
        let language = name.split('_').next().unwrap_or_default();
        Ok(Self {
            hour_cycle: HourCycle::default(),
            date: DatePattern::long(language),
            locale,
        })
    }

    /// Long date in the user's locale, or the default when the system locale
    /// is missing or has no date names.
    pub fn system() -> Self {
        let Some(tag) = sys_locale::get_locale() else {
            log::debug!("no system locale; using the English date");
            return Self::default();
        };
        Self::for_locale(&tag).unwrap_or_else(|e| {
            log::debug!("{e}; using the English date");
            Self::default()
        })
    }
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self {
            hour_cycle: HourCycle::default(),
            date: DatePattern::default(),
            locale: Locale::POSIX,
        }
    }
}

// ── ClockTime ─────────────────────────────────────────────────────────────

/// Snapshot published once per second.
///
/// `hour`, `minute` and `second` are always two ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: String,
    pub minute: String,
    pub second: String,
    pub date_label: String,
}

impl ClockTime {
    pub fn from_datetime(wall: &NaiveDateTime, format: &TimeFormat) -> Self {
        let hour = match format.hour_cycle {
            HourCycle::H24 => wall.hour(),
            HourCycle::H12 => wall.hour12().1,
        };
        Self {
            hour: format!("{hour:02}"),
            minute: format!("{:02}", wall.minute()),
            second: format!("{:02}", wall.second()),
            date_label: format.date.format(wall, format.locale),
        }
    }

    /// The six digit characters in slot order: H-tens, H-ones, M-tens,
    /// M-ones, S-tens, S-ones.
    pub fn digits(&self) -> [char; 6] {
        let mut out = ['0'; 6];
        let chars = self.hour.chars().chain(self.minute.chars()).chain(self.second.chars());
        for (slot, c) in out.iter_mut().zip(chars) {
            *slot = c;
        }
        out
    }
}

// ── clock collaborator ────────────────────────────────────────────────────

/// Source of local wall-clock time.
pub trait WallClock {
    fn now(&self) -> NaiveDateTime;
}

/// The system's local time zone.
#[derive(Debug, Copy, Clone, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    #[inline]
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock(Rc<Cell<NaiveDateTime>>);

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn set(&self, wall: NaiveDateTime) {
        self.0.set(wall);
    }

    pub fn advance(&self, by: TimeDelta) {
        self.0.set(self.0.get() + by);
    }
}

impl WallClock for ManualClock {
    #[inline]
    fn now(&self) -> NaiveDateTime {
        self.0.get()
    }
}

/// Delay from a wall time with `nanos` past the second to the next second
/// boundary. Exactly on a boundary the next one is a full second away.
pub fn delay_to_next_second(nanos: u32) -> Duration {
    // chrono encodes a leap second as nanos >= 1e9.
    match nanos % NANOS_PER_SEC {
        0 => TICK_PERIOD,
        frac => Duration::from_nanos(u64::from(NANOS_PER_SEC - frac)),
    }
}

// ── observers ─────────────────────────────────────────────────────────────

/// Receives every published [`ClockTime`].
pub trait TimeObserver {
    fn on_tick(&mut self, time: &ClockTime);
}

impl<F> TimeObserver for F
where
    F: FnMut(&ClockTime),
{
    #[inline]
    fn on_tick(&mut self, time: &ClockTime) {
        self(time)
    }
}

/// Handle returned by [`TimeSource::subscribe`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ObserverId(u64);

// ── TimeSource ────────────────────────────────────────────────────────────

/// Samples the wall clock once per second, on second boundaries, and pushes
/// each snapshot to its observers.
///
/// The source never sleeps itself. The host calls [`poll`](Self::poll) when
/// it wakes up and uses [`next_tick`](Self::next_tick) to decide how long it
/// may sleep.
pub struct TimeSource<C: WallClock = SystemClock> {
    clock: C,
    format: TimeFormat,
    current: Option<ClockTime>,
    /// Whole wall-clock second of `current`.
    published: Option<i64>,
    next_tick: Option<Instant>,
    observers: Vec<(ObserverId, Box<dyn TimeObserver>)>,
    next_observer: u64,
}

impl TimeSource<SystemClock> {
    pub fn system(format: TimeFormat) -> Self {
        Self::new(SystemClock, format)
    }
}

impl<C: WallClock> TimeSource<C> {
    pub fn new(clock: C, format: TimeFormat) -> Self {
        Self {
            clock,
            format,
            current: None,
            published: None,
            next_tick: None,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn subscribe(&mut self, observer: impl TimeObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    /// Publishes the current time and schedules the first tick on the next
    /// second boundary. `now` is the monotonic time of the call.
    pub fn start(&mut self, now: Instant) {
        let wall = self.clock.now();
        self.publish(&wall);

        let delay = delay_to_next_second(wall.nanosecond());
        self.next_tick = Some(now + delay);
        log::debug!("time source started at {wall}; first tick in {delay:?}");
    }

    /// Publishes a new snapshot if the tick deadline has passed.
    ///
    /// Returns `true` when a snapshot was published. Every deadline is taken
    /// from the wall time read at the tick, so a deadline that fires before
    /// the wall clock reaches the next second publishes nothing and waits for
    /// the boundary instead. Ticks missed while the host was not polling are
    /// dropped, not replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.next_tick else { return false; };
        if now < deadline {
            return false;
        }

        let wall = self.clock.now();
        self.next_tick = Some(now + delay_to_next_second(wall.nanosecond()));

        if self.published == Some(whole_second(&wall)) {
            log::trace!("tick woke at {wall}, before the boundary");
            return false;
        }
        let behind = now - deadline;
        if behind >= TICK_PERIOD {
            log::debug!("time source missed {} tick(s); re-aligning", behind.as_secs());
        }
        self.publish(&wall);
        true
    }

    /// Deadline of the next tick; `None` before [`start`](Self::start).
    #[inline]
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Most recently published snapshot.
    #[inline]
    pub fn current(&self) -> Option<&ClockTime> {
        self.current.as_ref()
    }

    #[inline]
    pub fn format(&self) -> &TimeFormat {
        &self.format
    }

    fn publish(&mut self, wall: &NaiveDateTime) {
        let time = ClockTime::from_datetime(wall, &self.format);
        log::trace!("tick {}:{}:{}", time.hour, time.minute, time.second);
        for (_, observer) in &mut self.observers {
            observer.on_tick(&time);
        }
        self.current = Some(time);
        self.published = Some(whole_second(wall));
    }
}

fn whole_second(wall: &NaiveDateTime) -> i64 {
    wall.and_utc().timestamp()
}
