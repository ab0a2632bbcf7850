use strum::{EnumIs, EnumTryAs};
use thiserror::Error;
use uuid::Uuid;

use crate::modules::operand::{Label, Name};

#[derive(Debug, PartialEq, Eq, Hash, EnumIs, EnumTryAs, Error)]
pub enum Error {
    /// Multiple operations share a destination name.
    #[error(
        "Multiple operations with shared destination target violate SSA requirements. The name `{duplicate}` is defined more than once within the same function."
    )]
    DuplicateSSAName { duplicate: Name },

    /// No basic block with the entrypoint label was found.
    #[error(
        "By convention, the entrypoint basic block of a function must have label `%block_0`. No such basic block was found."
    )]
    MissingEntryBlock,

    /// An operand refers to an unresolved name.
    #[error(
        "An operand refers to an undefined name: `{undefined}`. This name was never defined in the function."
    )]
    UndefinedSSAName { undefined: Name },

    /// The basic block referenced cannot be found within the function.
    #[error(
        "The basic block `{label}` referenced in function `{function}` is not defined within the function."
    )]
    UndefinedBasicBlock { function: String, label: Label },

    /// A type definition was supplied for a typeref that was never reserved.
    #[error(
        "The typeref `{typeref}` was never reserved. Forward type definitions must reserve an identity before defining it."
    )]
    UnreservedTyperef { typeref: Uuid },

    /// A reserved typeref was defined twice.
    #[error("The typeref `{typeref}` already carries a type definition.")]
    TypeAlreadyDefined { typeref: Uuid },
}
