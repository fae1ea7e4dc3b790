use kaddon_common::addon_type::AddonType;
use kaddon_common::status::AddonStatus;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A programming error in the addon, detected while dispatching an instance request.
///
/// These are never reported to the host as a status: the dispatcher logs them, then unwinds with
/// the defect as the panic payload. At the C boundary, they abort the process.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DispatchDefect {
    /// A factory reported a status other than `NotImplemented`, but produced no instance.
    MissingInstance {
        requested: AddonType,
        status: AddonStatus,
    },
    /// A factory produced an instance of another type than the one requested.
    CreatedTypeMismatch {
        requested: AddonType,
        produced: AddonType,
    },
    /// The host asked to destroy an instance under another type than the one it has.
    DestroyedTypeMismatch {
        requested: AddonType,
        present: AddonType,
    },
}

impl Display for DispatchDefect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchDefect::MissingInstance { requested, status } => write!(
                f,
                "Instance factory for type {requested} reported '{status}' without creating an instance"
            ),
            DispatchDefect::CreatedTypeMismatch {
                requested,
                produced,
            } => write!(
                f,
                "Instance type mismatch: created an instance of type {produced}, but {requested} was requested"
            ),
            DispatchDefect::DestroyedTypeMismatch { requested, present } => write!(
                f,
                "Instance type mismatch: asked to destroy an instance of type {requested}, but it has type {present}"
            ),
        }
    }
}

impl Error for DispatchDefect {}

impl DispatchDefect {
    /// Logs this defect and unwinds with it as the payload.
    #[cold]
    pub(crate) fn raise(self) -> ! {
        log::error!("{self}");
        std::panic::panic_any(self)
    }
}
