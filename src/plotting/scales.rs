//! Scales mapping data values onto pixel ranges.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Fraction added above the observed maximum of a linear value domain.
pub const HEADROOM: f64 = 0.1;

/// Evenly spaced bands for categorical values.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// `padding` is used for both the inner and the outer padding, as a
    /// fraction of the step.
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        let padding = padding.clamp(0.0, 1.0);
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        Self {
            domain,
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Left edge of the band at `index`.
    pub fn position(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }

    /// Left edge of the band for `value`, if it is in the domain.
    pub fn map(&self, value: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == value)
            .map(|i| self.position(i))
    }

    /// Horizontal center of the band at `index`.
    pub fn center(&self, index: usize) -> f64 {
        self.position(index) + self.bandwidth / 2.0
    }
}

/// Continuous linear mapping from a value domain to a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Domain `[0, max * (1 + HEADROOM)]`; `[0, 1]` when there is nothing
    /// positive to show.
    pub fn with_headroom(max: f64, range: (f64, f64)) -> Self {
        let top = if max.is_finite() && max > 0.0 {
            max * (1.0 + HEADROOM)
        } else {
            1.0
        };
        Self::new((0.0, top), range)
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0 + (r1 - r0) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Roughly `count` round-numbered ticks inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut start, mut stop) = self.domain;
        if count == 0 || !start.is_finite() || !stop.is_finite() {
            return Vec::new();
        }
        if start == stop {
            return vec![start];
        }
        if stop < start {
            std::mem::swap(&mut start, &mut stop);
        }

        let Some((i1, i2, increment)) = tick_spec(start, stop, count as f64) else {
            return Vec::new();
        };
        (i1..=i2)
            .map(|i| {
                if increment < 0.0 {
                    i as f64 / -increment
                } else {
                    i as f64 * increment
                }
            })
            .collect()
    }
}

/// Integer tick bounds and increment; a negative increment is an inverse
/// step, which keeps fractional ticks exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, increment);
    if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        i1 = (start * inc).round() as i64;
        i2 = (stop * inc).round() as i64;
        if (i1 as f64) / inc < start {
            i1 += 1;
        }
        if (i2 as f64) / inc > stop {
            i2 -= 1;
        }
        increment = -inc;
    } else {
        let inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round() as i64;
        i2 = (stop / inc).round() as i64;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
        increment = inc;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i2 >= i1).then_some((i1, i2, increment))
}

/// Calendar interval used for time-axis ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInterval {
    Hours(u32),
    Days(u32),
    Weeks,
    Months(u32),
    Years,
}

impl TimeInterval {
    const CANDIDATES: [TimeInterval; 10] = [
        TimeInterval::Hours(1),
        TimeInterval::Hours(3),
        TimeInterval::Hours(6),
        TimeInterval::Hours(12),
        TimeInterval::Days(1),
        TimeInterval::Days(2),
        TimeInterval::Weeks,
        TimeInterval::Months(1),
        TimeInterval::Months(3),
        TimeInterval::Years,
    ];

    /// Approximate length in seconds, used only to pick an interval.
    fn approx_seconds(&self) -> f64 {
        const DAY: f64 = 86_400.0;
        match self {
            TimeInterval::Hours(n) => *n as f64 * 3_600.0,
            TimeInterval::Days(n) => *n as f64 * DAY,
            TimeInterval::Weeks => 7.0 * DAY,
            TimeInterval::Months(n) => *n as f64 * 30.0 * DAY,
            TimeInterval::Years => 365.0 * DAY,
        }
    }

    /// Interval whose length is closest (by ratio) to `target_seconds`.
    pub fn for_target(target_seconds: f64) -> TimeInterval {
        let candidates = &Self::CANDIDATES;
        let i = candidates
            .iter()
            .position(|c| c.approx_seconds() > target_seconds)
            .unwrap_or(candidates.len());
        if i == 0 {
            return candidates[0];
        }
        if i == candidates.len() {
            return TimeInterval::Years;
        }
        let below = candidates[i - 1];
        let above = candidates[i];
        if target_seconds / below.approx_seconds() < above.approx_seconds() / target_seconds {
            below
        } else {
            above
        }
    }

    /// First boundary of this interval at or after `t`.
    fn ceil(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0);
        let day_start = |t: NaiveDateTime| {
            if t.num_seconds_from_midnight() == 0 && t.nanosecond() == 0 {
                Some(t)
            } else {
                midnight(t.date().succ_opt()?)
            }
        };
        match self {
            TimeInterval::Hours(n) => {
                let floored = t.date().and_hms_opt(t.hour() - t.hour() % n, 0, 0)?;
                let mut candidate = floored;
                while candidate < t {
                    candidate += Duration::hours(*n as i64);
                }
                Some(candidate)
            }
            TimeInterval::Days(_) => day_start(t),
            TimeInterval::Weeks => {
                let mut day = day_start(t)?;
                while day.weekday() != Weekday::Sun {
                    day += Duration::days(1);
                }
                Some(day)
            }
            TimeInterval::Months(n) => {
                let mut month = NaiveDate::from_ymd_opt(t.year(), t.month(), 1)?;
                loop {
                    let candidate = midnight(month)?;
                    if candidate >= t && month.month0() % n == 0 {
                        return Some(candidate);
                    }
                    month = add_months(month, 1)?;
                }
            }
            TimeInterval::Years => {
                let jan1 = midnight(NaiveDate::from_ymd_opt(t.year(), 1, 1)?)?;
                if jan1 >= t {
                    Some(jan1)
                } else {
                    midnight(NaiveDate::from_ymd_opt(t.year() + 1, 1, 1)?)
                }
            }
        }
    }

    fn advance(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            TimeInterval::Hours(n) => Some(t + Duration::hours(*n as i64)),
            TimeInterval::Days(n) => Some(t + Duration::days(*n as i64)),
            TimeInterval::Weeks => Some(t + Duration::days(7)),
            TimeInterval::Months(n) => add_months(t.date(), *n)?.and_hms_opt(0, 0, 0),
            TimeInterval::Years => add_months(t.date(), 12)?.and_hms_opt(0, 0, 0),
        }
    }

    /// Label format for ticks at this interval.
    pub fn label_format(&self) -> &'static str {
        match self {
            TimeInterval::Hours(_) => "%H:%M",
            TimeInterval::Years => "%Y",
            _ => "%b %-d",
        }
    }
}

fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = date.year() * 12 + date.month0() as i32 + months as i32;
    NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1)
}

/// Linear mapping of timestamps onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub domain: (NaiveDateTime, NaiveDateTime),
    pub range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (NaiveDateTime, NaiveDateTime), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Scale over the extent of `dates`; `None` when empty.
    pub fn from_extent<I>(dates: I, range: (f64, f64)) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDateTime>,
    {
        let mut iter = dates.into_iter();
        let first = iter.next()?;
        let (lo, hi) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self::new((lo, hi), range))
    }

    pub fn map(&self, value: NaiveDateTime) -> f64 {
        let (d0, d1) = self.domain;
        let span = (d1 - d0).num_milliseconds() as f64;
        let (r0, r1) = self.range;
        if span == 0.0 {
            return r0 + (r1 - r0) / 2.0;
        }
        r0 + (value - d0).num_milliseconds() as f64 / span * (r1 - r0)
    }

    /// About `count` ticks on calendar boundaries, with the interval used.
    pub fn ticks(&self, count: usize) -> (TimeInterval, Vec<NaiveDateTime>) {
        let (d0, d1) = self.domain;
        let span = (d1 - d0).num_seconds() as f64;
        if span <= 0.0 || count == 0 {
            return (TimeInterval::Days(1), vec![d0]);
        }

        let interval = TimeInterval::for_target(span / count as f64);
        let mut ticks = Vec::new();
        let mut current = interval.ceil(d0);
        while let Some(t) = current {
            if t > d1 {
                break;
            }
            ticks.push(t);
            current = interval.advance(t);
        }
        (interval, ticks)
    }
}
