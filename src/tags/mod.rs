pub mod alias;
pub mod store;

pub use alias::{AliasEntry, AliasTable};
pub use store::{TagMap, lookup_tag, merge_tags, validate_tag_name};
