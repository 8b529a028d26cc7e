pub mod classify;
pub mod inspect;
