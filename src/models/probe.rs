// Tagged probe result: a real measurement or the documented zero value.

/// Outcome of one probe call. Both variants carry a value; the stored row is the
/// same either way, the tag only records whether the measurement succeeded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe<T> {
    Ok(T),
    Degraded(T),
}

impl<T: Default> Probe<T> {
    pub fn degraded() -> Self {
        Probe::Degraded(T::default())
    }
}

impl<T> Probe<T> {
    pub fn value(self) -> T {
        match self {
            Probe::Ok(v) | Probe::Degraded(v) => v,
        }
    }

    pub fn as_ref(&self) -> &T {
        match self {
            Probe::Ok(v) | Probe::Degraded(v) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Probe::Degraded(_))
    }
}
