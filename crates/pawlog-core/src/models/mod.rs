//! Data models for pawlog

mod body_condition;
mod logs;
mod pet;
pub mod wire;

pub use body_condition::{BodyCondition, RecordedCondition};
pub use logs::{
    BodyConditionLog, LogEntry, LogId, LogKind, LogPayload, VetVisitLog, WeightLog,
};
pub use pet::{NewPet, Pet, PetAge, PetForm, PetId};
