//! Dispatcher status codes.
//!
//! Every handler in the priority list, and every sub-step it calls into,
//! reports one of these. `Eagain` is reserved for the dispatcher's
//! priority short-circuit (see [`crate::hsm`]) — nothing else should
//! return it casually.

use crate::error::ControlError;

/// Outcome of a single cooperative handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Success, with more work possibly remaining for a later cycle.
    Ok,
    /// Success; there was nothing to do this cycle.
    Noop,
    /// Not finished; call me again on the next dispatcher cycle. Short-
    /// circuits every lower-priority handler for the remainder of this
    /// cycle.
    Eagain,
    /// The input source is exhausted.
    Eof,
    /// A hard or soft fault occurred.
    Err(ControlError),
}

impl Status {
    /// `true` for [`Status::Eagain`] — the one status that stops the
    /// dispatcher from running any lower-priority handler this cycle.
    #[inline]
    pub fn is_eagain(self) -> bool {
        matches!(self, Status::Eagain)
    }

    /// `true` for [`Status::Err`].
    #[inline]
    pub fn is_err(self) -> bool {
        matches!(self, Status::Err(_))
    }
}

impl From<ControlError> for Status {
    fn from(e: ControlError) -> Self {
        Status::Err(e)
    }
}

impl From<Result<(), ControlError>> for Status {
    fn from(r: Result<(), ControlError>) -> Self {
        match r {
            Ok(()) => Status::Ok,
            Err(e) => Status::Err(e),
        }
    }
}

/// Evaluate an assertion-like expression producing a [`Status`]; on
/// anything other than `Ok`/`Noop`, raise a hard alarm on the given
/// controller and return that status from the enclosing function
/// immediately.
///
/// Mirrors the single "emergency-propagation" macro the original firmware
/// uses to wrap every integrity check: a one-byte memory corruption must
/// provoke a deterministic, observable alarm rather than silent
/// misbehavior.
#[macro_export]
macro_rules! emergency {
    ($controller:expr, $check:expr) => {{
        let status = $check;
        match status {
            $crate::status::Status::Ok | $crate::status::Status::Noop => {}
            other => {
                $controller.raise_hard_alarm();
                return other;
            }
        }
    }};
}
