pub(crate) mod human_size;
pub(crate) mod slash_path;
