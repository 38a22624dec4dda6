pub mod form_responses;
pub mod identity;
pub mod merge;
pub mod squad_sheet;
pub mod store;
pub mod teams;
