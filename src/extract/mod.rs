pub mod article;
pub mod classify;
pub mod layout;

pub use layout::{OutletLayout, SelectorChain, POLITICS_SECTION_ID};
